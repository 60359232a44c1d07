//! EPUB 3导航文档数据结构

use crate::epub::semantics::StructuralSemanticsProperty;

/// 导航文档中的超链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavAnchor {
    /// 已做百分号解码；`None` 表示纯标题
    pub href: Option<String>,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub types: Option<Vec<StructuralSemanticsProperty>>,
    pub text: String,
}

/// 导航文档中的无链接标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSpan {
    pub title: Option<String>,
    pub alt: Option<String>,
    pub text: String,
}

/// 列表项，带链接或不带链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Li {
    Anchor { anchor: NavAnchor, child_ol: Option<Ol> },
    Span { span: NavSpan, child_ol: Option<Ol> },
}

impl Li {
    /// 嵌套的子列表
    pub fn child_ol(&self) -> Option<&Ol> {
        match self {
            Li::Anchor { child_ol, .. } | Li::Span { child_ol, .. } => child_ol.as_ref(),
        }
    }

    /// 依次取text、title、alt中第一个非空的值
    pub fn display_title(&self) -> &str {
        let (text, title, alt) = match self {
            Li::Anchor { anchor, .. } => (anchor.text.as_str(), anchor.title.as_deref(), anchor.alt.as_deref()),
            Li::Span { span, .. } => (span.text.as_str(), span.title.as_deref(), span.alt.as_deref()),
        };
        [Some(text), title, alt]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}

/// 有序列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ol {
    pub is_hidden: bool,
    pub items: Vec<Li>,
}

/// body下的一个nav元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nav {
    pub nav_type: StructuralSemanticsProperty,
    pub is_hidden: bool,
    /// 第一个h1..h6标题的文本
    pub head: Option<String>,
    pub ol: Ol,
}

/// 导航文档解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavDocument {
    pub file_path: String,
    pub navs: Vec<Nav>,
}

impl NavDocument {
    /// 第一个目录（`toc`）导航
    pub fn toc_nav(&self) -> Option<&Nav> {
        self.find_nav(&StructuralSemanticsProperty::Toc)
    }

    pub fn find_nav(&self, nav_type: &StructuralSemanticsProperty) -> Option<&Nav> {
        self.navs.iter().find(|nav| &nav.nav_type == nav_type)
    }
}
