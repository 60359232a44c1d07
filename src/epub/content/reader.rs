//! 内容映射读取
//!
//! 根据清单为每个文件建立内容引用，并按类别（HTML、CSS、图片、字体、音频）分组。

use std::sync::Arc;

use crate::epub::content::collection::ContentCollection;
use crate::epub::content::file::{
    AnyLocalContentFileRef, AnyRemoteContentFileRef, ContentFileMetadata, ContentLoader, ContentType,
    LocalByteContentFileRef, LocalTextContentFileRef, RemoteByteContentFileRef, RemoteTextContentFileRef,
};
use crate::epub::cover::BookCoverReader;
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::EpubVersion;
use crate::epub::options::ReaderOptions;
use crate::epub::path;
use crate::epub::schema::Schema;

pub type TextContentCollection = ContentCollection<LocalTextContentFileRef, RemoteTextContentFileRef>;
pub type ByteContentCollection = ContentCollection<LocalByteContentFileRef, RemoteByteContentFileRef>;
pub type AllContentCollection = ContentCollection<AnyLocalContentFileRef, AnyRemoteContentFileRef>;

/// 书中所有内容文件的引用
#[derive(Debug, Clone, Default)]
pub struct ContentRef {
    pub cover: Option<LocalByteContentFileRef>,
    /// EPUB 3导航文档
    pub navigation_html_file: Option<LocalTextContentFileRef>,
    pub html: TextContentCollection,
    pub css: TextContentCollection,
    pub images: ByteContentCollection,
    pub fonts: ByteContentCollection,
    pub audio: ByteContentCollection,
    pub all_files: AllContentCollection,
}

struct Buckets<L, R> {
    local: Vec<L>,
    remote: Vec<R>,
}

impl<L, R> Default for Buckets<L, R> {
    fn default() -> Self {
        Self {
            local: Vec::new(),
            remote: Vec::new(),
        }
    }
}

/// 内容映射读取器
pub struct ContentReader<'a> {
    options: &'a ReaderOptions,
}

impl<'a> ContentReader<'a> {
    pub fn new(options: &'a ReaderOptions) -> Self {
        Self { options }
    }

    /// 根据清单建立内容映射
    ///
    /// # 参数
    /// * `schema` - 已读取的EPUB结构
    /// * `loader` - 所有引用共享的内容加载器
    pub fn read_content_ref(&self, schema: &Schema, loader: Arc<dyn ContentLoader>) -> Result<ContentRef> {
        let mut html: Buckets<LocalTextContentFileRef, RemoteTextContentFileRef> = Buckets::default();
        let mut css: Buckets<LocalTextContentFileRef, RemoteTextContentFileRef> = Buckets::default();
        let mut images: Buckets<LocalByteContentFileRef, RemoteByteContentFileRef> = Buckets::default();
        let mut fonts: Buckets<LocalByteContentFileRef, RemoteByteContentFileRef> = Buckets::default();
        let mut audio: Buckets<LocalByteContentFileRef, RemoteByteContentFileRef> = Buckets::default();
        let mut all: Buckets<AnyLocalContentFileRef, AnyRemoteContentFileRef> = Buckets::default();

        for item in &schema.package.manifest.items {
            let metadata = ContentFileMetadata::new(&item.href, &item.media_type);
            let content_type = metadata.content_type;

            if path::is_local_path(&item.href) {
                let file_path = path::combine_str(&schema.content_directory_path, &item.href);
                if content_type.is_text() {
                    let file = LocalTextContentFileRef::new(metadata, file_path, Arc::clone(&loader));
                    match content_type {
                        ContentType::Xhtml11 => html.local.push(file.clone()),
                        ContentType::Css => css.local.push(file.clone()),
                        _ => {}
                    }
                    all.local.push(AnyLocalContentFileRef::Text(file));
                } else {
                    let file = LocalByteContentFileRef::new(metadata, file_path, Arc::clone(&loader));
                    if content_type.is_image() {
                        images.local.push(file.clone());
                    } else if content_type.is_font() {
                        fonts.local.push(file.clone());
                    } else if content_type.is_audio() {
                        audio.local.push(file.clone());
                    }
                    all.local.push(AnyLocalContentFileRef::Byte(file));
                }
            } else if content_type.is_text() {
                let file = RemoteTextContentFileRef::new(metadata, Arc::clone(&loader));
                match content_type {
                    ContentType::Xhtml11 => html.remote.push(file.clone()),
                    ContentType::Css => css.remote.push(file.clone()),
                    _ => {}
                }
                all.remote.push(AnyRemoteContentFileRef::Text(file));
            } else {
                let file = RemoteByteContentFileRef::new(metadata, Arc::clone(&loader));
                if content_type.is_image() {
                    images.remote.push(file.clone());
                } else if content_type.is_font() {
                    fonts.remote.push(file.clone());
                } else if content_type.is_audio() {
                    audio.remote.push(file.clone());
                }
                all.remote.push(AnyRemoteContentFileRef::Byte(file));
            }
        }

        let content_options = &self.options.content;
        let html = ContentCollection::new(html.local, html.remote, content_options)?;
        let images = ContentCollection::new(images.local, images.remote, content_options)?;
        let navigation_html_file = self.read_navigation_html_file(schema, &html)?;
        let cover = BookCoverReader::new(&self.options.book_cover).read_book_cover(schema, &images)?;

        Ok(ContentRef {
            cover,
            navigation_html_file,
            html,
            css: ContentCollection::new(css.local, css.remote, content_options)?,
            images,
            fonts: ContentCollection::new(fonts.local, fonts.remote, content_options)?,
            audio: ContentCollection::new(audio.local, audio.remote, content_options)?,
            all_files: ContentCollection::new(all.local, all.remote, content_options)?,
        })
    }

    fn read_navigation_html_file(
        &self,
        schema: &Schema,
        html: &TextContentCollection,
    ) -> Result<Option<LocalTextContentFileRef>> {
        if schema.package.epub_version == EpubVersion::Epub2 {
            return Ok(None);
        }
        let Some(nav_item) = schema.package.manifest.find_nav_item() else {
            return Ok(None);
        };
        if !path::is_local_path(&nav_item.href) {
            if self.options.content.ignore_remote_epub3_navigation_file_error {
                tracing::warn!("EPUB 3导航文档是远程文件: {}", nav_item.href);
                return Ok(None);
            }
            return Err(EpubError::package(format!("EPUB 3导航文档不能是远程文件: {}", nav_item.href)));
        }
        match html.find_local_file_ref_by_key(&nav_item.href) {
            Some(file) => Ok(Some(file.clone())),
            None if self.options.content.ignore_epub3_navigation_file_is_not_html_error => {
                tracing::warn!("EPUB 3导航文档 {} 不是HTML文件", nav_item.href);
                Ok(None)
            }
            None => Err(EpubError::package(format!(
                "EPUB 3导航文档 {} 不是HTML文件",
                nav_item.href
            ))),
        }
    }
}
