//! 封面图片定位
//!
//! EPUB 3优先使用清单中带 `cover-image` 属性的项；找不到时退回EPUB 2的做法：
//! 先看 `<meta name="cover">`，再看guide中 `type="cover"` 的引用。

use crate::epub::content::{ByteContentCollection, LocalByteContentFileRef};
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::EpubVersion;
use crate::epub::options::BookCoverReaderOptions;
use crate::epub::schema::Schema;

/// 在图片集合中查找封面的结果
enum CoverLookup {
    Found(LocalByteContentFileRef),
    /// 封面是远程文件，且该错误被忽略
    Remote,
    Missing,
}

/// 封面读取器
pub struct BookCoverReader<'a> {
    options: &'a BookCoverReaderOptions,
}

impl<'a> BookCoverReader<'a> {
    pub fn new(options: &'a BookCoverReaderOptions) -> Self {
        Self { options }
    }

    /// 读取封面图片引用
    ///
    /// # 参数
    /// * `schema` - 已读取的EPUB结构
    /// * `images` - 图片内容集合
    ///
    /// # 返回值
    /// * `Result<Option<LocalByteContentFileRef>>` - 所有策略都没有找到封面时返回 `None`
    pub fn read_book_cover(
        &self,
        schema: &Schema,
        images: &ByteContentCollection,
    ) -> Result<Option<LocalByteContentFileRef>> {
        if schema.package.epub_version != EpubVersion::Epub2 {
            if let Some(cover) = self.read_epub3_cover(schema, images)? {
                return Ok(Some(cover));
            }
        }
        if let Some(cover) = self.read_epub2_cover_from_metadata(schema, images)? {
            return Ok(Some(cover));
        }
        Ok(read_epub2_cover_from_guide(schema, images))
    }

    fn read_epub3_cover(
        &self,
        schema: &Schema,
        images: &ByteContentCollection,
    ) -> Result<Option<LocalByteContentFileRef>> {
        let Some(cover_item) = schema.package.manifest.find_cover_image_item() else {
            return Ok(None);
        };
        match self.find_cover_image(images, &cover_item.href)? {
            CoverLookup::Found(cover) => Ok(Some(cover)),
            CoverLookup::Remote => Ok(None),
            CoverLookup::Missing if self.options.epub3_ignore_missing_content_file => {
                tracing::warn!("封面图片 {} 不在图片内容中", cover_item.href);
                Ok(None)
            }
            CoverLookup::Missing => Err(EpubError::package(format!("清单中href为 {} 的封面图片不存在", cover_item.href))),
        }
    }

    fn read_epub2_cover_from_metadata(
        &self,
        schema: &Schema,
        images: &ByteContentCollection,
    ) -> Result<Option<LocalByteContentFileRef>> {
        let Some(cover_meta) = schema.package.metadata.find_meta_by_name("cover") else {
            return Ok(None);
        };

        let Some(cover_id) = cover_meta.content.as_deref().filter(|content| !content.trim().is_empty()) else {
            if self.options.epub2_metadata_ignore_missing_content {
                tracing::warn!("cover元数据缺少content");
                return Ok(None);
            }
            return Err(EpubError::package("cover元数据缺少content"));
        };

        let Some(cover_item) = schema.package.manifest.find_by_id_ignore_case(cover_id) else {
            if self.options.epub2_metadata_ignore_missing_manifest_item {
                tracing::warn!("cover元数据引用的清单项 {} 不存在", cover_id);
                return Ok(None);
            }
            return Err(EpubError::package(format!("cover元数据引用的清单项 {} 不存在", cover_id)));
        };

        // 远程封面在这一步只当作没有匹配，继续尝试guide
        if images.contains_remote_file_ref_with_url(&cover_item.href) {
            tracing::debug!("cover元数据指向远程图片 {}，忽略", cover_item.href);
            return Ok(None);
        }
        match self.find_cover_image(images, &cover_item.href)? {
            CoverLookup::Found(cover) => Ok(Some(cover)),
            CoverLookup::Remote => Ok(None),
            CoverLookup::Missing if self.options.epub2_metadata_ignore_missing_content_file => {
                tracing::warn!("封面图片 {} 不在图片内容中", cover_item.href);
                Ok(None)
            }
            CoverLookup::Missing => Err(EpubError::package(format!("清单中href为 {} 的封面图片不存在", cover_item.href))),
        }
    }

    fn find_cover_image(&self, images: &ByteContentCollection, href: &str) -> Result<CoverLookup> {
        if images.contains_remote_file_ref_with_url(href) {
            if self.options.ignore_remote_content_file_error {
                tracing::warn!("封面图片是远程文件: {}", href);
                return Ok(CoverLookup::Remote);
            }
            return Err(EpubError::package(format!("封面图片不能是远程文件: {}", href)));
        }
        Ok(match images.find_local_file_ref_by_key(href) {
            Some(cover) => CoverLookup::Found(cover.clone()),
            None => CoverLookup::Missing,
        })
    }
}

/// guide只作为最后的尝试，任何解析失败都不报错
fn read_epub2_cover_from_guide(schema: &Schema, images: &ByteContentCollection) -> Option<LocalByteContentFileRef> {
    let guide = schema.package.guide.as_ref()?;
    guide
        .items
        .iter()
        .filter(|reference| reference.reference_type.eq_ignore_ascii_case("cover"))
        .find_map(|reference| images.find_local_file_ref_by_key(&reference.href))
        .cloned()
}
