//! 脊柱模块
//!
//! 提供EPUB包中阅读顺序（脊柱）和指南（guide）的结构定义。

/// 脊柱项信息(阅读顺序)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItemRef {
    pub id: Option<String>,
    /// 引用的清单项ID
    pub idref: String,
    /// 是否线性阅读
    pub linear: bool,
    pub properties: Vec<String>,
}

impl SpineItemRef {
    /// 创建新的脊柱项
    pub fn new(idref: impl Into<String>) -> Self {
        Self {
            id: None,
            idref: idref.into(),
            linear: true,
            properties: Vec::new(),
        }
    }

    /// 创建指定线性属性的脊柱项
    pub fn with_linear(mut self, linear: bool) -> Self {
        self.linear = linear;
        self
    }
}

/// 脊柱
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spine {
    pub id: Option<String>,
    pub page_progression_direction: Option<String>,
    /// 目录（NCX）清单项ID
    pub toc: Option<String>,
    pub items: Vec<SpineItemRef>,
}

/// 指南中的引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideReference {
    pub reference_type: String,
    pub title: Option<String>,
    pub href: String,
}

/// 指南（EPUB 2）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guide {
    pub items: Vec<GuideReference>,
}

impl Guide {
    /// 查找指定类型的引用（不区分大小写）
    pub fn find_by_type(&self, reference_type: &str) -> Option<&GuideReference> {
        self.items
            .iter()
            .find(|item| item.reference_type.eq_ignore_ascii_case(reference_type))
    }
}
