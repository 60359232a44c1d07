//! NCX解析器模块
//!
//! 递归解析EPUB 2的NCX导航文件。每条校验规则都由 [`NcxReaderOptions`] 中的一个字段单独控制。

use crate::epub::archive::EpubArchive;
use crate::epub::error::{EpubError, Result};
use crate::epub::ncx::navigation::{
    NavigationLabel, NavigationList, NavigationMap, NavigationPoint, NavigationTarget, Ncx, NcxContent, NcxHead,
    NcxMeta, PageList, PageTarget, PageTargetType,
};
use crate::epub::opf::Package;
use crate::epub::options::NcxReaderOptions;
use crate::epub::path;
use crate::epub::xml::{self, XmlElement, XmlEntry, XmlReaderOptions};

pub const NCX_NAMESPACE: &str = "http://www.daisy.org/z3986/2005/ncx/";

/// NCX读取器
pub struct NcxReader<'a> {
    options: &'a NcxReaderOptions,
    xml_options: &'a XmlReaderOptions,
}

impl<'a> NcxReader<'a> {
    pub fn new(options: &'a NcxReaderOptions, xml_options: &'a XmlReaderOptions) -> Self {
        Self { options, xml_options }
    }

    /// 读取spine的toc属性指向的NCX文件
    ///
    /// # 参数
    /// * `archive` - EPUB归档
    /// * `content_directory_path` - OPF文件所在目录
    /// * `package` - 已解析的OPF包
    ///
    /// # 返回值
    /// * `Result<Option<Ncx>>` - 没有toc引用，或文件级错误被忽略时返回 `None`
    pub fn read_ncx(
        &self,
        archive: &mut dyn EpubArchive,
        content_directory_path: &str,
        package: &Package,
    ) -> Result<Option<Ncx>> {
        let Some(toc_id) = package.spine.toc.as_deref().filter(|toc| !toc.is_empty()) else {
            tracing::debug!("spine没有toc引用，跳过NCX");
            return Ok(None);
        };

        let Some(toc_item) = package.manifest.find_by_id_ignore_case(toc_id) else {
            if self.options.ignore_missing_toc_manifest_item_error {
                tracing::warn!("清单中未找到toc引用的项: {}", toc_id);
                return Ok(None);
            }
            return Err(EpubError::ncx(format!("清单中未找到toc引用的项: {}", toc_id)));
        };

        let file_path = path::combine_str(content_directory_path, &toc_item.href);
        let document = match xml::load_entry(archive, &file_path, self.xml_options)? {
            XmlEntry::Document(document) => document,
            XmlEntry::Missing => {
                if self.options.ignore_missing_toc_file_error {
                    tracing::warn!("EPUB文件中未找到NCX文件: {}", file_path);
                    return Ok(None);
                }
                return Err(EpubError::ncx(format!("EPUB文件中未找到NCX文件: {}", file_path)));
            }
            XmlEntry::TooLarge => {
                if self.options.ignore_toc_file_is_too_large_error {
                    tracing::warn!("NCX文件超过2 GiB: {}", file_path);
                    return Ok(None);
                }
                return Err(EpubError::ncx(format!("NCX文件超过2 GiB: {}", file_path)));
            }
            XmlEntry::Invalid(err) => {
                if self.options.ignore_toc_file_is_not_valid_xml_error {
                    tracing::warn!("NCX文件 {} 不是有效的XML: {}", file_path, err);
                    return Ok(None);
                }
                return Err(EpubError::Ncx {
                    message: format!("NCX文件 {} 不是有效的XML", file_path),
                    source: Some(err),
                });
            }
        };

        let Some(ncx_node) = document.root_named(NCX_NAMESPACE, "ncx") else {
            if self.options.ignore_missing_ncx_element_error {
                tracing::warn!("NCX文件缺少ncx元素: {}", file_path);
                return Ok(None);
            }
            return Err(EpubError::ncx("NCX文件缺少ncx元素"));
        };

        self.parse_ncx(file_path, ncx_node).map(Some)
    }

    /// 解析ncx元素
    pub fn parse_ncx(&self, file_path: String, ncx_node: &XmlElement) -> Result<Ncx> {
        let head = match ncx_node.element(NCX_NAMESPACE, "head") {
            Some(head_node) => self.read_head(head_node)?,
            None if self.options.ignore_missing_head_element_error => NcxHead::default(),
            None => return Err(EpubError::ncx("NCX文件缺少head元素")),
        };

        let doc_title = match ncx_node.element(NCX_NAMESPACE, "docTitle") {
            Some(doc_title_node) => first_text(doc_title_node),
            None if self.options.ignore_missing_doc_title_element_error => None,
            None => return Err(EpubError::ncx("NCX文件缺少docTitle元素")),
        };

        let doc_authors = ncx_node
            .elements_named(NCX_NAMESPACE, "docAuthor")
            .filter_map(first_text)
            .collect();

        let navigation_map = match ncx_node.element(NCX_NAMESPACE, "navMap") {
            Some(nav_map_node) => self.read_navigation_map(nav_map_node)?,
            None if self.options.ignore_missing_nav_map_element_error => NavigationMap::default(),
            None => return Err(EpubError::ncx("NCX文件缺少navMap元素")),
        };

        let page_list = match ncx_node.element(NCX_NAMESPACE, "pageList") {
            Some(page_list_node) => Some(self.read_page_list(page_list_node)?),
            None => None,
        };

        let mut navigation_lists = Vec::new();
        for nav_list_node in ncx_node.elements_named(NCX_NAMESPACE, "navList") {
            navigation_lists.push(self.read_navigation_list(nav_list_node)?);
        }

        Ok(Ncx {
            file_path,
            head,
            doc_title,
            doc_authors,
            navigation_map,
            page_list,
            navigation_lists,
        })
    }

    fn read_head(&self, head_node: &XmlElement) -> Result<NcxHead> {
        let mut head = NcxHead::default();
        for meta_node in head_node.elements().filter(|e| e.has_local_name("meta")) {
            let name = meta_node.attribute_ignore_case("name");
            let content = meta_node.attribute_ignore_case("content");
            let (Some(name), Some(content)) = (name, content) else {
                if self.options.skip_invalid_meta_elements {
                    tracing::warn!("跳过缺少name或content的meta元素");
                    continue;
                }
                return Err(EpubError::ncx("meta元素缺少name或content属性"));
            };
            head.items.push(NcxMeta {
                name: name.to_string(),
                content: content.to_string(),
                scheme: meta_node.attribute_ignore_case("scheme").map(str::to_string),
            });
        }
        Ok(head)
    }

    fn read_navigation_map(&self, nav_map_node: &XmlElement) -> Result<NavigationMap> {
        let mut items = Vec::new();
        for nav_point_node in nav_map_node.elements().filter(|e| e.has_local_name("navPoint")) {
            if let Some(point) = self.read_navigation_point(nav_point_node)? {
                items.push(point);
            }
        }
        Ok(NavigationMap { items })
    }

    fn read_navigation_point(&self, nav_point_node: &XmlElement) -> Result<Option<NavigationPoint>> {
        let Some(id) = nav_point_node.attribute_ignore_case("id") else {
            if self.options.skip_navigation_points_with_missing_ids {
                tracing::warn!("跳过缺少id的navPoint");
                return Ok(None);
            }
            return Err(EpubError::ncx("navPoint元素缺少id属性"));
        };

        let mut navigation_labels = Vec::new();
        let mut content = None;
        let mut content_node_present = false;
        let mut child_navigation_points = Vec::new();
        for child in nav_point_node.elements() {
            match child.local_name.to_ascii_lowercase().as_str() {
                "navlabel" => {
                    if let Some(label) = self.read_navigation_label(child)? {
                        navigation_labels.push(label);
                    }
                }
                "content" => {
                    content_node_present = true;
                    content = self.read_content(child)?;
                }
                "navpoint" => {
                    if let Some(point) = self.read_navigation_point(child)? {
                        child_navigation_points.push(point);
                    }
                }
                _ => {}
            }
        }

        if navigation_labels.is_empty() && !self.options.allow_navigation_points_without_labels {
            return Err(EpubError::ncx(format!("navPoint {} 缺少navLabel元素", id)));
        }

        let Some(content) = content else {
            if content_node_present {
                tracing::warn!("navPoint {} 的content无效，跳过该导航点", id);
                return Ok(None);
            }
            if self.options.ignore_missing_content_for_navigation_points {
                tracing::warn!("navPoint {} 缺少content元素，跳过该导航点", id);
                return Ok(None);
            }
            return Err(EpubError::ncx(format!("navPoint {} 缺少content元素", id)));
        };

        Ok(Some(NavigationPoint {
            id: id.to_string(),
            class: nav_point_node.attribute_ignore_case("class").map(str::to_string),
            play_order: nav_point_node.attribute_ignore_case("playOrder").map(str::to_string),
            navigation_labels,
            content,
            child_navigation_points,
        }))
    }

    fn read_navigation_label(&self, nav_label_node: &XmlElement) -> Result<Option<NavigationLabel>> {
        match nav_label_node.elements().find(|e| e.has_local_name("text")) {
            Some(text_node) => Ok(Some(NavigationLabel { text: text_node.text() })),
            None if self.options.skip_invalid_navigation_labels => {
                tracing::warn!("跳过缺少text元素的navLabel");
                Ok(None)
            }
            None => Err(EpubError::ncx("navLabel元素缺少text子元素")),
        }
    }

    fn read_content(&self, content_node: &XmlElement) -> Result<Option<NcxContent>> {
        match content_node.attribute_ignore_case("src") {
            Some(src) => Ok(Some(NcxContent {
                id: content_node.attribute_ignore_case("id").map(str::to_string),
                source: path::unescape(src),
            })),
            None if self.options.skip_invalid_navigation_content => {
                tracing::warn!("跳过缺少src的content元素");
                Ok(None)
            }
            None => Err(EpubError::ncx("content元素缺少src属性")),
        }
    }

    fn read_page_list(&self, page_list_node: &XmlElement) -> Result<PageList> {
        let mut page_list = PageList {
            id: page_list_node.attribute_ignore_case("id").map(str::to_string),
            class: page_list_node.attribute_ignore_case("class").map(str::to_string),
            ..PageList::default()
        };
        for child in page_list_node.elements() {
            match child.local_name.to_ascii_lowercase().as_str() {
                "navlabel" => {
                    if let Some(label) = self.read_navigation_label(child)? {
                        page_list.navigation_labels.push(label);
                    }
                }
                "pagetarget" => page_list.items.push(self.read_page_target(child)?),
                _ => {}
            }
        }
        Ok(page_list)
    }

    fn read_page_target(&self, page_target_node: &XmlElement) -> Result<PageTarget> {
        let target_type = match page_target_node.attribute_ignore_case("type") {
            Some(target_type) => PageTargetType::parse(target_type),
            None if self.options.replace_missing_page_target_types_with_unknown => PageTargetType::Unknown,
            None => return Err(EpubError::ncx("pageTarget元素缺少type属性")),
        };

        let (navigation_labels, content) = self.read_labels_and_content(page_target_node)?;
        if navigation_labels.is_empty() && !self.options.allow_navigation_page_targets_without_labels {
            return Err(EpubError::ncx("pageTarget元素缺少navLabel元素"));
        }

        Ok(PageTarget {
            id: page_target_node.attribute_ignore_case("id").map(str::to_string),
            value: page_target_node.attribute_ignore_case("value").map(str::to_string),
            target_type,
            class: page_target_node.attribute_ignore_case("class").map(str::to_string),
            play_order: page_target_node.attribute_ignore_case("playOrder").map(str::to_string),
            navigation_labels,
            content,
        })
    }

    fn read_navigation_list(&self, nav_list_node: &XmlElement) -> Result<NavigationList> {
        let mut navigation_labels = Vec::new();
        let mut navigation_targets = Vec::new();
        for child in nav_list_node.elements() {
            match child.local_name.to_ascii_lowercase().as_str() {
                "navlabel" => {
                    if let Some(label) = self.read_navigation_label(child)? {
                        navigation_labels.push(label);
                    }
                }
                "navtarget" => {
                    if let Some(target) = self.read_navigation_target(child)? {
                        navigation_targets.push(target);
                    }
                }
                _ => {}
            }
        }

        if navigation_labels.is_empty() && !self.options.allow_navigation_lists_without_labels {
            return Err(EpubError::ncx("navList元素缺少navLabel元素"));
        }

        Ok(NavigationList {
            id: nav_list_node.attribute_ignore_case("id").map(str::to_string),
            class: nav_list_node.attribute_ignore_case("class").map(str::to_string),
            navigation_labels,
            navigation_targets,
        })
    }

    fn read_navigation_target(&self, nav_target_node: &XmlElement) -> Result<Option<NavigationTarget>> {
        let Some(id) = nav_target_node.attribute_ignore_case("id") else {
            if self.options.skip_invalid_navigation_targets {
                tracing::warn!("跳过缺少id的navTarget");
                return Ok(None);
            }
            return Err(EpubError::ncx("navTarget元素缺少id属性"));
        };

        let (navigation_labels, content) = self.read_labels_and_content(nav_target_node)?;
        if navigation_labels.is_empty() && !self.options.allow_navigation_targets_without_labels {
            return Err(EpubError::ncx(format!("navTarget {} 缺少navLabel元素", id)));
        }

        Ok(Some(NavigationTarget {
            id: id.to_string(),
            class: nav_target_node.attribute_ignore_case("class").map(str::to_string),
            value: nav_target_node.attribute_ignore_case("value").map(str::to_string),
            play_order: nav_target_node.attribute_ignore_case("playOrder").map(str::to_string),
            navigation_labels,
            content,
        }))
    }

    fn read_labels_and_content(&self, node: &XmlElement) -> Result<(Vec<NavigationLabel>, Option<NcxContent>)> {
        let mut navigation_labels = Vec::new();
        let mut content = None;
        for child in node.elements() {
            if child.has_local_name("navLabel") {
                if let Some(label) = self.read_navigation_label(child)? {
                    navigation_labels.push(label);
                }
            } else if child.has_local_name("content") {
                content = self.read_content(child)?;
            }
        }
        Ok((navigation_labels, content))
    }
}

/// 第一个text子元素的文本
fn first_text(node: &XmlElement) -> Option<String> {
    node.elements().find(|e| e.has_local_name("text")).map(XmlElement::text)
}
