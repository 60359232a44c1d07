//! 元数据模块
//!
//! 只做字面捕获：保留各元素的文本和属性，不做Dublin Core语义解释。

use crate::epub::xml::XmlElement;

/// 创建者信息(作者、编辑者等)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Creator {
    /// 创建者姓名
    pub name: String,
    /// 元素ID（用于关联refines元数据）
    pub id: Option<String>,
    /// 角色(如aut、edt等)
    pub role: Option<String>,
    /// 排序用名称
    pub file_as: Option<String>,
}

/// 标识符信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifier {
    /// 标识符值
    pub value: String,
    pub id: Option<String>,
    /// 标识符类型(如ISBN、UUID等)
    pub scheme: Option<String>,
}

/// 日期
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataDate {
    pub date: String,
    pub event: Option<String>,
}

/// meta元素
///
/// EPUB 2使用 `name`/`content` 属性，EPUB 3使用 `property` 属性并把值写在元素文本中，
/// 后者的文本同样存入 `content`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaItem {
    pub name: Option<String>,
    pub content: Option<String>,
    pub property: Option<String>,
    pub refines: Option<String>,
    pub id: Option<String>,
    pub scheme: Option<String>,
}

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub titles: Vec<String>,
    pub creators: Vec<Creator>,
    pub contributors: Vec<Creator>,
    pub identifiers: Vec<Identifier>,
    pub languages: Vec<String>,
    pub publishers: Vec<String>,
    pub subjects: Vec<String>,
    pub descriptions: Vec<String>,
    pub dates: Vec<MetadataDate>,
    pub rights: Vec<String>,
    pub meta_items: Vec<MetaItem>,
}

impl Metadata {
    /// 从metadata元素读取元数据
    pub(crate) fn from_element(element: &XmlElement) -> Self {
        let mut metadata = Metadata::default();
        for child in element.elements() {
            match child.local_name.to_ascii_lowercase().as_str() {
                "title" => metadata.titles.push(child.text()),
                "creator" => metadata.creators.push(read_creator(child)),
                "contributor" => metadata.contributors.push(read_creator(child)),
                "identifier" => metadata.identifiers.push(Identifier {
                    value: child.text(),
                    id: child.attribute("id").map(str::to_string),
                    scheme: child.attribute_ignore_case("scheme").map(str::to_string),
                }),
                "language" => metadata.languages.push(child.text()),
                "publisher" => metadata.publishers.push(child.text()),
                "subject" => metadata.subjects.push(child.text()),
                "description" => metadata.descriptions.push(child.text()),
                "date" => metadata.dates.push(MetadataDate {
                    date: child.text(),
                    event: child.attribute_ignore_case("event").map(str::to_string),
                }),
                "rights" => metadata.rights.push(child.text()),
                "meta" => metadata.meta_items.push(read_meta(child)),
                _ => {}
            }
        }
        metadata
    }

    /// 获取第一个标题
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }

    /// 按name查找meta项（不区分大小写）
    pub fn find_meta_by_name(&self, name: &str) -> Option<&MetaItem> {
        self.meta_items
            .iter()
            .find(|meta| meta.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }
}

fn read_creator(element: &XmlElement) -> Creator {
    Creator {
        name: element.text(),
        id: element.attribute("id").map(str::to_string),
        role: element.attribute_ignore_case("role").map(str::to_string),
        file_as: element.attribute_ignore_case("file-as").map(str::to_string),
    }
}

fn read_meta(element: &XmlElement) -> MetaItem {
    let text = element.text();
    MetaItem {
        name: element.attribute("name").map(str::to_string),
        content: element
            .attribute("content")
            .map(str::to_string)
            .or_else(|| (!text.is_empty()).then_some(text)),
        property: element.attribute("property").map(str::to_string),
        refines: element.attribute("refines").map(str::to_string),
        id: element.attribute("id").map(str::to_string),
        scheme: element.attribute("scheme").map(str::to_string),
    }
}
