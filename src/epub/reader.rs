use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

use crate::epub::archive::EpubArchive;
use crate::epub::content::{ArchiveContentLoader, ContentDownloader, ContentReader, ContentRef, LocalByteContentFileRef, LocalTextContentFileRef};
use crate::epub::error::Result;
use crate::epub::navigation::{NavigationItemRef, NavigationReader};
use crate::epub::options::ReaderOptions;
use crate::epub::schema::{Schema, SchemaReader};
use crate::epub::spine::SpineReader;

/// 表示一个已打开的EPUB文件
///
/// 打开时只读取结构文件（container.xml、OPF、NCX、导航文档、SMIL），
/// 内容文件在调用引用的 `read_content` 时才从归档中读取。
pub struct Epub {
    schema: Schema,
    content: ContentRef,
    options: ReaderOptions,
}

impl Epub {
    /// 从文件路径打开EPUB
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    /// * `options` - 读取选项
    ///
    /// # 返回值
    /// * `Result<Option<Epub>>` - container.xml或OPF文件缺失且被选项忽略时返回 `None`
    pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Option<Epub>> {
        tracing::debug!("打开EPUB文件: {}", path.as_ref().display());
        let file = File::open(path)?;
        Self::from_reader(file, options)
    }

    /// 从任意可随机访问的数据源打开EPUB
    pub fn from_reader<R>(reader: R, options: ReaderOptions) -> Result<Option<Epub>>
    where
        R: Read + Seek + Send + 'static,
    {
        let archive = ZipArchive::new(reader)?;
        Self::from_archive(Box::new(archive), options, None)
    }

    /// 从归档打开EPUB，可选地提供远程内容下载器
    ///
    /// # 参数
    /// * `archive` - EPUB归档，之后由内容加载器持有
    /// * `options` - 读取选项
    /// * `downloader` - 远程内容下载器
    pub fn from_archive(
        mut archive: Box<dyn EpubArchive + Send>,
        options: ReaderOptions,
        downloader: Option<Box<dyn ContentDownloader>>,
    ) -> Result<Option<Epub>> {
        let Some(schema) = SchemaReader::new(&options).read_schema(archive.as_mut())? else {
            tracing::warn!("EPUB文件中没有可用的OPF包");
            return Ok(None);
        };

        let mut loader = ArchiveContentLoader::new(archive, options.content.clone());
        if let Some(downloader) = downloader {
            loader = loader.with_downloader(downloader);
        }
        let content = ContentReader::new(&options).read_content_ref(&schema, Arc::new(loader))?;

        Ok(Some(Epub {
            schema,
            content,
            options,
        }))
    }

    /// 书的结构
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// 所有内容文件的引用
    pub fn content(&self) -> &ContentRef {
        &self.content
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// 第一个标题
    pub fn title(&self) -> Option<&str> {
        self.schema.package.metadata.title()
    }

    /// 作者列表
    pub fn authors(&self) -> Vec<&str> {
        self.schema
            .package
            .metadata
            .creators
            .iter()
            .map(|creator| creator.name.as_str())
            .collect()
    }

    /// 导航树，书中没有对应版本的导航时返回 `None`
    pub fn navigation(&self) -> Result<Option<Vec<NavigationItemRef>>> {
        NavigationReader::new(&self.options.navigation).get_navigation_items(&self.schema, &self.content)
    }

    /// 按spine顺序排列的HTML文件
    pub fn reading_order(&self) -> Result<Vec<LocalTextContentFileRef>> {
        SpineReader::new(&self.options.spine).get_reading_order(&self.schema, &self.content)
    }

    /// 封面图片
    pub fn cover(&self) -> Option<&LocalByteContentFileRef> {
        self.content.cover.as_ref()
    }
}
