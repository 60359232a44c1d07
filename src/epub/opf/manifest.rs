//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义。

/// 清单项信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 文件路径(相对于OPF文件，已做百分号解码)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)
    pub properties: Vec<String>,
    /// 对应的媒体覆盖（SMIL）清单项ID
    pub media_overlay: Option<String>,
    /// 回退清单项ID
    pub fallback: Option<String>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: Vec::new(),
            media_overlay: None,
            fallback: None,
        }
    }

    /// 创建带属性的清单项
    pub fn with_properties(mut self, properties: &str) -> Self {
        self.properties = properties.split_whitespace().map(str::to_string).collect();
        self
    }

    /// 检查是否包含指定属性
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p.eq_ignore_ascii_case(property))
    }

    /// 检查是否为导航文档
    pub fn is_nav(&self) -> bool {
        self.has_property("nav")
    }

    /// 检查是否为封面图片
    pub fn is_cover_image(&self) -> bool {
        self.has_property("cover-image")
    }
}

/// 清单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub items: Vec<ManifestItem>,
}

impl Manifest {
    pub fn new(items: Vec<ManifestItem>) -> Self {
        Self { items }
    }

    /// 按ID查找清单项
    pub fn find_by_id(&self, id: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 按ID查找清单项（不区分大小写）
    pub fn find_by_id_ignore_case(&self, id: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.id.eq_ignore_ascii_case(id))
    }

    /// 查找EPUB 3导航文档
    pub fn find_nav_item(&self) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.is_nav())
    }

    /// 查找EPUB 3封面图片
    pub fn find_cover_image_item(&self) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.is_cover_image())
    }

    /// 指定媒体类型的所有清单项（按清单顺序）
    pub fn items_with_media_type<'a>(&'a self, media_type: &'a str) -> impl Iterator<Item = &'a ManifestItem> {
        self.items
            .iter()
            .filter(move |item| item.media_type.eq_ignore_ascii_case(media_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lookup() {
        let manifest = Manifest::new(vec![
            ManifestItem::new("ncx", "toc.ncx", "application/x-dtbncx+xml"),
            ManifestItem::new("nav", "nav.xhtml", "application/xhtml+xml").with_properties("nav scripted"),
            ManifestItem::new("cover", "cover.jpg", "image/jpeg").with_properties("cover-image"),
            ManifestItem::new("mo1", "c1.smil", "application/smil+xml"),
        ]);

        assert_eq!(manifest.find_by_id("ncx").map(|i| i.href.as_str()), Some("toc.ncx"));
        assert!(manifest.find_by_id("NCX").is_none());
        assert!(manifest.find_by_id_ignore_case("NCX").is_some());
        assert_eq!(manifest.find_nav_item().map(|i| i.id.as_str()), Some("nav"));
        assert_eq!(manifest.find_cover_image_item().map(|i| i.id.as_str()), Some("cover"));
        assert_eq!(manifest.items_with_media_type("application/smil+xml").count(), 1);
        assert!(manifest.items[1].has_property("scripted"));
    }
}
