//! XML文档加载模块
//!
//! 把归档中的XML条目读取为不可变的元素树。元素名和属性名都带有解析后的命名空间，
//! 各个读取器在这棵树上递归地解析各自的XML方言。

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use serde::{Deserialize, Serialize};
use std::string::FromUtf8Error;
use thiserror::Error;

use crate::epub::archive::{EpubArchive, MAX_ENTRY_LENGTH};
use crate::epub::error::Result;
use crate::epub::options::ReaderOptionsPreset;

/// XML解析错误
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML语法错误: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("XML文档不是有效的UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    #[error("XML文档没有根元素")]
    MissingRootElement,

    #[error("XML文档包含多个根元素")]
    MultipleRootElements,

    #[error("元素未闭合: {0}")]
    UnclosedElement(String),
}

/// XML读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlReaderOptions {
    /// 解析前跳过XML声明（`<?xml ... ?>`），用于容忍错误的声明
    pub skip_xml_headers: bool,
}

impl XmlReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::Strict | ReaderOptionsPreset::Relaxed => Self::default(),
            ReaderOptionsPreset::IgnoreAllErrors => Self { skip_xml_headers: true },
        }
    }
}

/// 元素属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

/// 元素的子节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// XML元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub local_name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    fn new(namespace: Option<String>, local_name: String) -> Self {
        Self {
            namespace,
            local_name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 判断元素是否具有指定的命名空间和本地名称
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name == local_name
    }

    /// 忽略大小写和命名空间比较本地名称
    pub fn has_local_name(&self, local_name: &str) -> bool {
        self.local_name.eq_ignore_ascii_case(local_name)
    }

    /// 所有子元素（按文档顺序）
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// 指定名称的所有子元素
    pub fn elements_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.is(namespace, local_name))
    }

    /// 指定名称的第一个子元素
    pub fn element(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(namespace, local_name))
    }

    /// 无命名空间的属性
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// 带命名空间的属性
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// 忽略命名空间和大小写查找属性
    pub fn attribute_ignore_case(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name.eq_ignore_ascii_case(local_name))
            .map(|a| a.value.as_str())
    }

    /// 元素内所有后代文本节点的拼接
    pub fn text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, result: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => result.push_str(text),
                XmlNode::Element(element) => element.collect_text(result),
            }
        }
    }
}

/// 已解析的XML文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// 根元素为指定名称时返回根元素
    pub fn root_named(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        Some(&self.root).filter(|root| root.is(namespace, local_name))
    }

    /// 从字节解析XML文档
    ///
    /// # 参数
    /// * `bytes` - 文档原始内容（UTF-8，可带BOM）
    /// * `options` - XML读取选项
    pub fn parse_bytes(bytes: &[u8], options: &XmlReaderOptions) -> std::result::Result<Self, XmlError> {
        let content = String::from_utf8(bytes.to_vec())?;
        Self::parse_str(&content, options)
    }

    /// 从字符串解析XML文档
    pub fn parse_str(content: &str, options: &XmlReaderOptions) -> std::result::Result<Self, XmlError> {
        let mut content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if options.skip_xml_headers {
            content = skip_xml_declaration(content);
        }

        let mut reader = NsReader::from_str(content);
        reader.config_mut().expand_empty_elements = true;

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let (namespace, event) = reader.read_resolved_event()?;
            let namespace = resolved_namespace(namespace);
            match event {
                Event::Start(ref e) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(XmlError::MultipleRootElements);
                    }
                    let local_name = String::from_utf8(e.local_name().as_ref().to_vec())?;
                    let mut element = XmlElement::new(namespace, local_name);

                    for attr_result in e.attributes() {
                        let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
                        // xmlns声明本身不作为属性保留
                        if attr.key.as_namespace_binding().is_some() {
                            continue;
                        }
                        let (attr_namespace, attr_local_name) = reader.resolve_attribute(attr.key);
                        let attr_namespace = resolved_namespace(attr_namespace);
                        let attr_local_name = String::from_utf8(attr_local_name.as_ref().to_vec())?;
                        element.attributes.push(XmlAttribute {
                            namespace: attr_namespace,
                            local_name: attr_local_name,
                            value: attr.unescape_value()?.to_string(),
                        });
                    }

                    stack.push(element);
                }
                Event::End(_) => {
                    if let Some(mut element) = stack.pop() {
                        trim_trailing_whitespace(&mut element);
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(XmlNode::Element(element)),
                            None => root = Some(element),
                        }
                    }
                }
                Event::Text(ref e) => {
                    let text = e.unescape()?;
                    push_text(&mut stack, &text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8(e.into_inner().to_vec())?;
                    push_text(&mut stack, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(element) = stack.pop() {
            return Err(XmlError::UnclosedElement(element.local_name));
        }

        root.map(|root| XmlDocument { root })
            .ok_or(XmlError::MissingRootElement)
    }
}

/// 从归档加载XML条目时的结果
#[derive(Debug)]
pub enum XmlEntry {
    /// 条目不存在
    Missing,
    /// 条目超过大小上限
    TooLarge,
    /// 条目不是有效的XML
    Invalid(XmlError),
    Document(XmlDocument),
}

/// 从归档加载一个XML条目
///
/// 缺失、超限、无效三种情况分别返回，由调用方依据各自的选项决定是否报错。
/// 读取过程中的IO错误直接向上传播。
pub fn load_entry(
    archive: &mut dyn EpubArchive,
    path: &str,
    options: &XmlReaderOptions,
) -> Result<XmlEntry> {
    let Some(length) = archive.entry_length(path) else {
        return Ok(XmlEntry::Missing);
    };
    if length > MAX_ENTRY_LENGTH {
        return Ok(XmlEntry::TooLarge);
    }
    let bytes = archive.read_entry(path)?;
    Ok(match XmlDocument::parse_bytes(&bytes, options) {
        Ok(document) => XmlEntry::Document(document),
        Err(err) => XmlEntry::Invalid(err),
    })
}

fn resolved_namespace(result: ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(namespace) => Some(String::from_utf8_lossy(namespace.as_ref()).into_owned()),
        _ => None,
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    // 空白文本只在兄弟节点之间保留，行内元素之间的空格属于文本内容
    if text.trim().is_empty() && parent.children.is_empty() {
        return;
    }
    parent.children.push(XmlNode::Text(text.to_string()));
}

/// 去掉元素末尾的空白文本节点
fn trim_trailing_whitespace(element: &mut XmlElement) {
    while let Some(XmlNode::Text(text)) = element.children.last() {
        if !text.trim().is_empty() {
            break;
        }
        element.children.pop();
    }
}

fn skip_xml_declaration(content: &str) -> &str {
    let trimmed = content.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    content
}
