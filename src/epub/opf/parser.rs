//! OPF解析器模块
//!
//! 读取OPF包文件，生成 [`Package`]。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::epub::archive::EpubArchive;
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{
    manifest::{Manifest, ManifestItem},
    metadata::Metadata,
    spine::{Guide, GuideReference, Spine, SpineItemRef},
};
use crate::epub::options::PackageReaderOptions;
use crate::epub::path;
use crate::epub::xml::{self, XmlElement, XmlEntry, XmlReaderOptions};

pub const OPF_NAMESPACE: &str = "http://www.idpf.org/2007/opf";

/// EPUB版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpubVersion {
    Epub2,
    Epub3,
    Epub3_1,
}

impl EpubVersion {
    /// 解析package元素的version属性
    pub fn parse(version: &str) -> Option<Self> {
        match version.trim() {
            "2.0" | "2.0.1" => Some(Self::Epub2),
            "3.0" | "3.0.1" | "3.2" | "3.3" => Some(Self::Epub3),
            "3.1" => Some(Self::Epub3_1),
            _ => None,
        }
    }
}

impl fmt::Display for EpubVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Epub2 => "EPUB 2",
            Self::Epub3 => "EPUB 3",
            Self::Epub3_1 => "EPUB 3.1",
        };
        f.write_str(name)
    }
}

/// OPF文件解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub unique_identifier: Option<String>,
    /// EPUB版本
    pub epub_version: EpubVersion,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项(文件列表)
    pub manifest: Manifest,
    /// 脊柱(阅读顺序)
    pub spine: Spine,
    pub guide: Option<Guide>,
}

impl Package {
    /// 创建只有版本信息的空包
    pub fn new(epub_version: EpubVersion) -> Self {
        Self {
            unique_identifier: None,
            epub_version,
            metadata: Metadata::default(),
            manifest: Manifest::default(),
            spine: Spine::default(),
            guide: None,
        }
    }
}

/// OPF包文件读取器
pub struct PackageReader<'a> {
    options: &'a PackageReaderOptions,
    xml_options: &'a XmlReaderOptions,
}

impl<'a> PackageReader<'a> {
    pub fn new(options: &'a PackageReaderOptions, xml_options: &'a XmlReaderOptions) -> Self {
        Self { options, xml_options }
    }

    /// 从归档读取OPF包文件
    ///
    /// # 参数
    /// * `archive` - EPUB归档
    /// * `package_file_path` - OPF文件在归档中的路径
    ///
    /// # 返回值
    /// * `Result<Option<Package>>` - 文件缺失或无效且对应选项开启时返回 `None`
    pub fn read_package(&self, archive: &mut dyn EpubArchive, package_file_path: &str) -> Result<Option<Package>> {
        let document = match xml::load_entry(archive, package_file_path, self.xml_options)? {
            XmlEntry::Document(document) => document,
            XmlEntry::Missing | XmlEntry::TooLarge => {
                if self.options.ignore_missing_package_file {
                    tracing::warn!("OPF文件不存在: {}", package_file_path);
                    return Ok(None);
                }
                return Err(EpubError::package(format!("EPUB文件中未找到OPF文件: {}", package_file_path)));
            }
            XmlEntry::Invalid(err) => {
                if self.options.ignore_package_file_is_not_valid_xml_error {
                    tracing::warn!("OPF文件不是有效的XML: {}", err);
                    return Ok(None);
                }
                return Err(EpubError::Package {
                    message: "OPF文件不是有效的XML".to_string(),
                    source: Some(err),
                });
            }
        };

        let Some(package_node) = document.root_named(OPF_NAMESPACE, "package") else {
            if self.options.ignore_missing_package_node {
                tracing::warn!("OPF文件缺少package元素");
                return Ok(None);
            }
            return Err(EpubError::package("OPF文件缺少package元素"));
        };

        self.parse_package(package_node).map(Some)
    }

    /// 解析package元素
    pub fn parse_package(&self, package_node: &XmlElement) -> Result<Package> {
        let epub_version = self.parse_version(package_node.attribute("version"))?;
        let mut package = Package::new(epub_version);
        package.unique_identifier = package_node.attribute("unique-identifier").map(str::to_string);

        match package_node.element(OPF_NAMESPACE, "metadata") {
            Some(metadata_node) => package.metadata = Metadata::from_element(metadata_node),
            None if self.options.ignore_missing_metadata_node => {
                tracing::warn!("OPF文件缺少metadata元素");
            }
            None => return Err(EpubError::package("OPF文件缺少metadata元素")),
        }

        match package_node.element(OPF_NAMESPACE, "manifest") {
            Some(manifest_node) => package.manifest = self.parse_manifest(manifest_node)?,
            None if self.options.ignore_missing_manifest_node => {
                tracing::warn!("OPF文件缺少manifest元素");
            }
            None => return Err(EpubError::package("OPF文件缺少manifest元素")),
        }

        match package_node.element(OPF_NAMESPACE, "spine") {
            Some(spine_node) => package.spine = self.parse_spine(spine_node, epub_version)?,
            None if self.options.ignore_missing_spine_node => {
                tracing::warn!("OPF文件缺少spine元素");
            }
            None => return Err(EpubError::package("OPF文件缺少spine元素")),
        }

        if let Some(guide_node) = package_node.element(OPF_NAMESPACE, "guide") {
            package.guide = Some(self.parse_guide(guide_node)?);
        }

        Ok(package)
    }

    fn parse_version(&self, version: Option<&str>) -> Result<EpubVersion> {
        if let Some(parsed) = version.and_then(EpubVersion::parse) {
            return Ok(parsed);
        }
        match self.options.fallback_epub_version {
            Some(fallback) => {
                tracing::warn!("无法识别的EPUB版本 {:?}，使用 {}", version, fallback);
                Ok(fallback)
            }
            None => match version {
                Some(version) => Err(EpubError::package(format!("不支持的EPUB版本: {}", version))),
                None => Err(EpubError::package("package元素缺少version属性")),
            },
        }
    }

    fn parse_manifest(&self, manifest_node: &XmlElement) -> Result<Manifest> {
        let mut items = Vec::new();
        let mut ids = HashSet::new();
        let mut hrefs = HashSet::new();

        for item_node in manifest_node.elements_named(OPF_NAMESPACE, "item") {
            let (Some(id), Some(href), Some(media_type)) = (
                item_node.attribute("id"),
                item_node.attribute("href"),
                item_node.attribute("media-type"),
            ) else {
                if self.options.skip_invalid_manifest_items {
                    tracing::warn!("跳过缺少id、href或media-type的清单项");
                    continue;
                }
                return Err(EpubError::package("清单项缺少id、href或media-type属性"));
            };

            let href = path::unescape(href);
            if ids.contains(id) {
                if self.options.skip_duplicate_manifest_item_ids {
                    tracing::warn!("跳过ID重复的清单项: {}", id);
                    continue;
                }
                return Err(EpubError::package(format!("清单项ID重复: {}", id)));
            }
            if hrefs.contains(&href) {
                if self.options.skip_duplicate_manifest_hrefs {
                    tracing::warn!("跳过href重复的清单项: {}", href);
                    continue;
                }
                return Err(EpubError::package(format!("清单项href重复: {}", href)));
            }
            ids.insert(id.to_string());
            hrefs.insert(href.clone());

            let mut item = ManifestItem::new(id, href, media_type);
            if let Some(properties) = item_node.attribute("properties") {
                item = item.with_properties(properties);
            }
            item.media_overlay = item_node.attribute("media-overlay").map(str::to_string);
            item.fallback = item_node.attribute("fallback").map(str::to_string);
            items.push(item);
        }

        Ok(Manifest::new(items))
    }

    fn parse_spine(&self, spine_node: &XmlElement, epub_version: EpubVersion) -> Result<Spine> {
        let toc = spine_node.attribute("toc").map(str::to_string);
        if epub_version == EpubVersion::Epub2 && toc.as_deref().is_none_or(|t| t.trim().is_empty()) {
            if !self.options.ignore_missing_toc {
                return Err(EpubError::package("EPUB 2的spine元素缺少toc属性"));
            }
            tracing::warn!("EPUB 2的spine元素缺少toc属性");
        }

        let mut items = Vec::new();
        for itemref_node in spine_node.elements_named(OPF_NAMESPACE, "itemref") {
            let Some(idref) = itemref_node.attribute("idref") else {
                if self.options.skip_invalid_spine_items {
                    tracing::warn!("跳过缺少idref的spine项");
                    continue;
                }
                return Err(EpubError::package("spine项缺少idref属性"));
            };
            let linear = !itemref_node
                .attribute("linear")
                .is_some_and(|linear| linear.eq_ignore_ascii_case("no"));
            let mut item = SpineItemRef::new(idref).with_linear(linear);
            item.id = itemref_node.attribute("id").map(str::to_string);
            item.properties = itemref_node
                .attribute("properties")
                .map(|p| p.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            items.push(item);
        }

        Ok(Spine {
            id: spine_node.attribute("id").map(str::to_string),
            page_progression_direction: spine_node.attribute("page-progression-direction").map(str::to_string),
            toc,
            items,
        })
    }

    fn parse_guide(&self, guide_node: &XmlElement) -> Result<Guide> {
        let mut items = Vec::new();
        for reference_node in guide_node.elements_named(OPF_NAMESPACE, "reference") {
            let (Some(reference_type), Some(href)) = (reference_node.attribute("type"), reference_node.attribute("href"))
            else {
                if self.options.skip_invalid_guide_references {
                    tracing::warn!("跳过缺少type或href的guide引用");
                    continue;
                }
                return Err(EpubError::package("guide引用缺少type或href属性"));
            };
            items.push(GuideReference {
                reference_type: reference_type.to_string(),
                title: reference_node.attribute("title").map(str::to_string),
                href: path::unescape(href),
            });
        }
        Ok(Guide { items })
    }
}
