//! 阅读顺序
//!
//! 把spine中的idref按顺序解析为HTML内容文件引用。

use crate::epub::content::{ContentRef, LocalTextContentFileRef};
use crate::epub::error::{EpubError, Result};
use crate::epub::options::SpineReaderOptions;
use crate::epub::path;
use crate::epub::schema::Schema;

/// 阅读顺序读取器
pub struct SpineReader<'a> {
    options: &'a SpineReaderOptions,
}

impl<'a> SpineReader<'a> {
    pub fn new(options: &'a SpineReaderOptions) -> Self {
        Self { options }
    }

    /// 获取阅读顺序
    ///
    /// # 参数
    /// * `schema` - 已读取的EPUB结构
    /// * `content` - 内容映射
    ///
    /// # 返回值
    /// * `Result<Vec<LocalTextContentFileRef>>` - 与spine顺序一致，被跳过的项直接省略
    pub fn get_reading_order(&self, schema: &Schema, content: &ContentRef) -> Result<Vec<LocalTextContentFileRef>> {
        let mut reading_order = Vec::new();
        for item_ref in &schema.package.spine.items {
            let Some(manifest_item) = schema.package.manifest.find_by_id(&item_ref.idref) else {
                if self.options.ignore_missing_manifest_items {
                    tracing::warn!("跳过清单中不存在的spine项: {}", item_ref.idref);
                    continue;
                }
                return Err(EpubError::package(format!("spine项 {} 在清单中不存在", item_ref.idref)));
            };

            if !path::is_local_path(&manifest_item.href) {
                if self.options.skip_spine_items_referencing_remote_content {
                    tracing::warn!("跳过指向远程资源的spine项: {}", manifest_item.href);
                    continue;
                }
                return Err(EpubError::package(format!(
                    "spine项 {} 不能指向远程资源 {}",
                    item_ref.idref, manifest_item.href
                )));
            }

            let Some(html_file) = content.html.find_local_file_ref_by_key(&manifest_item.href) else {
                if self.options.ignore_missing_content_files {
                    tracing::warn!("跳过HTML内容中不存在的spine项: {}", manifest_item.href);
                    continue;
                }
                return Err(EpubError::package(format!(
                    "spine项 {} 指向的文件 {} 不在HTML内容中",
                    item_ref.idref, manifest_item.href
                )));
            };
            reading_order.push(html_file.clone());
        }
        Ok(reading_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::opf::{EpubVersion, ManifestItem, SpineItemRef};
    use crate::epub::test_support::{html_collection, package_with, schema_with};

    const REMOTE_URL: &str = "https://example.com/books/123/chapter3.html";

    fn schema(idrefs: &[&str]) -> Schema {
        let mut package = package_with(EpubVersion::Epub3, Vec::new());
        package.spine.items = idrefs.iter().map(|idref| SpineItemRef::new(*idref)).collect();
        schema_with(
            package,
            vec![
                ManifestItem::new("item-1", "chapter1.html", "application/xhtml+xml"),
                ManifestItem::new("item-2", "chapter2.html", "application/xhtml+xml"),
                ManifestItem::new("item-3", REMOTE_URL, "application/xhtml+xml"),
                ManifestItem::new("item-4", "chapter4.html", "application/xhtml+xml"),
            ],
        )
    }

    fn content() -> ContentRef {
        ContentRef {
            html: html_collection(
                &[
                    ("chapter1.html", "OEBPS/chapter1.html"),
                    ("chapter2.html", "OEBPS/chapter2.html"),
                ],
                &[REMOTE_URL],
            ),
            ..ContentRef::default()
        }
    }

    fn read(idrefs: &[&str], options: &SpineReaderOptions) -> Result<Vec<LocalTextContentFileRef>> {
        SpineReader::new(options).get_reading_order(&schema(idrefs), &content())
    }

    fn keys(files: &[LocalTextContentFileRef]) -> Vec<&str> {
        files.iter().map(|file| file.key()).collect()
    }

    #[test]
    fn test_reading_order_follows_spine() {
        let files = read(&["item-2", "item-1"], &SpineReaderOptions::default()).unwrap();
        assert_eq!(keys(&files), vec!["chapter2.html", "chapter1.html"]);
    }

    #[test]
    fn test_missing_manifest_item() {
        let idrefs = ["item-1", "item-missing", "item-2"];
        let err = read(&idrefs, &SpineReaderOptions::default()).unwrap_err();
        assert!(matches!(err, EpubError::Package { .. }));

        let options = SpineReaderOptions {
            ignore_missing_manifest_items: true,
            ..Default::default()
        };
        let files = read(&idrefs, &options).unwrap();
        assert_eq!(keys(&files), vec!["chapter1.html", "chapter2.html"]);
    }

    #[test]
    fn test_remote_content() {
        let idrefs = ["item-3", "item-1"];
        assert!(read(&idrefs, &SpineReaderOptions::default()).is_err());

        let options = SpineReaderOptions {
            skip_spine_items_referencing_remote_content: true,
            ..Default::default()
        };
        assert_eq!(keys(&read(&idrefs, &options).unwrap()), vec!["chapter1.html"]);
    }

    #[test]
    fn test_missing_content_file() {
        let idrefs = ["item-4", "item-2"];
        assert!(read(&idrefs, &SpineReaderOptions::default()).is_err());

        // 只忽略清单缺失不影响内容文件缺失的检查
        let options = SpineReaderOptions {
            ignore_missing_manifest_items: true,
            ..Default::default()
        };
        assert!(read(&idrefs, &options).is_err());

        let options = SpineReaderOptions {
            ignore_missing_content_files: true,
            ..Default::default()
        };
        assert_eq!(keys(&read(&idrefs, &options).unwrap()), vec!["chapter2.html"]);
    }
}
