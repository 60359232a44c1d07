//! 读取选项模块
//!
//! 每个读取器都有自己的选项结构，每个字段独立控制一条校验规则。
//! 默认值即严格模式：所有校验都会报错。选项可以从预设生成，也可以从YAML文件加载。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::EpubVersion;
use crate::epub::xml::XmlReaderOptions;

/// 选项预设
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReaderOptionsPreset {
    /// 所有校验都报错
    #[default]
    Strict,
    /// 只放宽现实文件中最常见的几类问题
    Relaxed,
    /// 忽略所有可恢复的错误
    IgnoreAllErrors,
}

/// container.xml读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerFileReaderOptions {
    pub ignore_missing_container_file: bool,
    pub ignore_container_file_is_not_valid_xml_error: bool,
    pub ignore_missing_package_file_path_error: bool,
}

impl ContainerFileReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                ignore_missing_container_file: true,
                ignore_container_file_is_not_valid_xml_error: true,
                ignore_missing_package_file_path_error: true,
            },
            _ => Self::default(),
        }
    }
}

/// OPF包文件读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageReaderOptions {
    pub ignore_missing_package_file: bool,
    pub ignore_package_file_is_not_valid_xml_error: bool,
    pub ignore_missing_package_node: bool,
    /// 版本缺失或无法识别时使用的版本
    pub fallback_epub_version: Option<EpubVersion>,
    pub ignore_missing_metadata_node: bool,
    pub ignore_missing_manifest_node: bool,
    pub ignore_missing_spine_node: bool,
    /// EPUB 2的spine缺少toc属性
    pub ignore_missing_toc: bool,
    pub skip_invalid_manifest_items: bool,
    pub skip_duplicate_manifest_item_ids: bool,
    pub skip_duplicate_manifest_hrefs: bool,
    pub skip_invalid_spine_items: bool,
    pub skip_invalid_guide_references: bool,
}

impl PackageReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::Strict => Self::default(),
            ReaderOptionsPreset::Relaxed => Self {
                fallback_epub_version: Some(EpubVersion::Epub2),
                ignore_missing_toc: true,
                ..Self::default()
            },
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                ignore_missing_package_file: true,
                ignore_package_file_is_not_valid_xml_error: true,
                ignore_missing_package_node: true,
                fallback_epub_version: Some(EpubVersion::Epub2),
                ignore_missing_metadata_node: true,
                ignore_missing_manifest_node: true,
                ignore_missing_spine_node: true,
                ignore_missing_toc: true,
                skip_invalid_manifest_items: true,
                skip_duplicate_manifest_item_ids: true,
                skip_duplicate_manifest_hrefs: true,
                skip_invalid_spine_items: true,
                skip_invalid_guide_references: true,
            },
        }
    }
}

/// NCX读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NcxReaderOptions {
    pub ignore_missing_toc_manifest_item_error: bool,
    pub ignore_missing_toc_file_error: bool,
    pub ignore_toc_file_is_too_large_error: bool,
    pub ignore_toc_file_is_not_valid_xml_error: bool,
    pub ignore_missing_ncx_element_error: bool,
    pub ignore_missing_head_element_error: bool,
    pub ignore_missing_doc_title_element_error: bool,
    pub ignore_missing_nav_map_element_error: bool,
    pub skip_invalid_meta_elements: bool,
    pub skip_navigation_points_with_missing_ids: bool,
    pub allow_navigation_points_without_labels: bool,
    pub ignore_missing_content_for_navigation_points: bool,
    pub skip_invalid_navigation_labels: bool,
    pub skip_invalid_navigation_content: bool,
    pub replace_missing_page_target_types_with_unknown: bool,
    pub allow_navigation_page_targets_without_labels: bool,
    pub allow_navigation_lists_without_labels: bool,
    pub skip_invalid_navigation_targets: bool,
    pub allow_navigation_targets_without_labels: bool,
}

impl NcxReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::Strict => Self::default(),
            ReaderOptionsPreset::Relaxed => Self {
                skip_navigation_points_with_missing_ids: true,
                ..Self::default()
            },
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                ignore_missing_toc_manifest_item_error: true,
                ignore_missing_toc_file_error: true,
                ignore_toc_file_is_too_large_error: true,
                ignore_toc_file_is_not_valid_xml_error: true,
                ignore_missing_ncx_element_error: true,
                ignore_missing_head_element_error: true,
                ignore_missing_doc_title_element_error: true,
                ignore_missing_nav_map_element_error: true,
                skip_invalid_meta_elements: true,
                skip_navigation_points_with_missing_ids: true,
                allow_navigation_points_without_labels: true,
                ignore_missing_content_for_navigation_points: true,
                skip_invalid_navigation_labels: true,
                skip_invalid_navigation_content: true,
                replace_missing_page_target_types_with_unknown: true,
                allow_navigation_page_targets_without_labels: true,
                allow_navigation_lists_without_labels: true,
                skip_invalid_navigation_targets: true,
                allow_navigation_targets_without_labels: true,
            },
        }
    }
}

/// EPUB 3导航文档读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavDocumentReaderOptions {
    pub ignore_missing_nav_manifest_item_error: bool,
    pub ignore_missing_nav_file_error: bool,
    pub ignore_nav_file_is_too_large_error: bool,
    pub ignore_nav_file_is_not_valid_xml_error: bool,
    pub ignore_missing_html_element_error: bool,
    pub ignore_missing_body_element_error: bool,
    pub skip_navs_with_missing_ol_elements: bool,
    pub skip_invalid_li_elements: bool,
}

impl NavDocumentReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                ignore_missing_nav_manifest_item_error: true,
                ignore_missing_nav_file_error: true,
                ignore_nav_file_is_too_large_error: true,
                ignore_nav_file_is_not_valid_xml_error: true,
                ignore_missing_html_element_error: true,
                ignore_missing_body_element_error: true,
                skip_navs_with_missing_ol_elements: true,
                skip_invalid_li_elements: true,
            },
            _ => Self::default(),
        }
    }
}

/// SMIL读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmilReaderOptions {
    pub ignore_missing_smil_file_error: bool,
    pub ignore_smil_file_is_too_large_error: bool,
    pub ignore_smil_file_is_not_valid_xml_error: bool,
    pub ignore_missing_smil_element_error: bool,
    pub ignore_missing_smil_version_error: bool,
    pub ignore_unsupported_smil_version_error: bool,
    pub ignore_missing_body_element_error: bool,
    pub ignore_body_missing_seq_or_par_elements_error: bool,
    pub ignore_seq_missing_seq_or_par_elements_error: bool,
    pub skip_pars_without_text_elements: bool,
    pub skip_texts_without_src_attributes: bool,
    pub skip_audios_without_src_attributes: bool,
}

impl SmilReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                ignore_missing_smil_file_error: true,
                ignore_smil_file_is_too_large_error: true,
                ignore_smil_file_is_not_valid_xml_error: true,
                ignore_missing_smil_element_error: true,
                ignore_missing_smil_version_error: true,
                ignore_unsupported_smil_version_error: true,
                ignore_missing_body_element_error: true,
                ignore_body_missing_seq_or_par_elements_error: true,
                ignore_seq_missing_seq_or_par_elements_error: true,
                skip_pars_without_text_elements: true,
                skip_texts_without_src_attributes: true,
                skip_audios_without_src_attributes: true,
            },
            _ => Self::default(),
        }
    }
}

/// 导航树读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationReaderOptions {
    pub allow_epub2_navigation_items_with_empty_titles: bool,
    pub skip_remote_navigation_items: bool,
    pub skip_navigation_items_referencing_missing_content: bool,
}

impl NavigationReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::Strict => Self::default(),
            ReaderOptionsPreset::Relaxed => Self {
                skip_navigation_items_referencing_missing_content: true,
                ..Self::default()
            },
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                allow_epub2_navigation_items_with_empty_titles: true,
                skip_remote_navigation_items: true,
                skip_navigation_items_referencing_missing_content: true,
            },
        }
    }
}

/// 阅读顺序读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineReaderOptions {
    pub ignore_missing_manifest_items: bool,
    pub skip_spine_items_referencing_remote_content: bool,
    pub ignore_missing_content_files: bool,
}

impl SpineReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                ignore_missing_manifest_items: true,
                skip_spine_items_referencing_remote_content: true,
                ignore_missing_content_files: true,
            },
            _ => Self::default(),
        }
    }
}

/// 封面读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookCoverReaderOptions {
    pub epub2_metadata_ignore_missing_content: bool,
    pub epub2_metadata_ignore_missing_manifest_item: bool,
    pub epub2_metadata_ignore_missing_content_file: bool,
    pub epub3_ignore_missing_content_file: bool,
    pub ignore_remote_content_file_error: bool,
}

impl BookCoverReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::Strict => Self::default(),
            ReaderOptionsPreset::Relaxed => Self {
                epub2_metadata_ignore_missing_manifest_item: true,
                ..Self::default()
            },
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                epub2_metadata_ignore_missing_content: true,
                epub2_metadata_ignore_missing_manifest_item: true,
                epub2_metadata_ignore_missing_content_file: true,
                epub3_ignore_missing_content_file: true,
                ignore_remote_content_file_error: true,
            },
        }
    }
}

/// 内容读取选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentReaderOptions {
    pub ignore_missing_file_error: bool,
    pub ignore_file_is_too_large_error: bool,
    pub ignore_remote_epub3_navigation_file_error: bool,
    /// 导航文档的媒体类型不是HTML时不报错
    pub ignore_epub3_navigation_file_is_not_html_error: bool,
    pub skip_items_with_duplicate_hrefs: bool,
    pub skip_items_with_duplicate_file_paths: bool,
    pub skip_items_with_duplicate_urls: bool,
}

impl ContentReaderOptions {
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        match preset {
            ReaderOptionsPreset::IgnoreAllErrors => Self {
                ignore_missing_file_error: true,
                ignore_file_is_too_large_error: true,
                ignore_remote_epub3_navigation_file_error: true,
                ignore_epub3_navigation_file_is_not_html_error: true,
                skip_items_with_duplicate_hrefs: true,
                skip_items_with_duplicate_file_paths: true,
                skip_items_with_duplicate_urls: true,
            },
            _ => Self::default(),
        }
    }
}

/// 全部读取器的选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub container: ContainerFileReaderOptions,
    pub package: PackageReaderOptions,
    pub ncx: NcxReaderOptions,
    pub nav: NavDocumentReaderOptions,
    pub smil: SmilReaderOptions,
    pub navigation: NavigationReaderOptions,
    pub spine: SpineReaderOptions,
    pub book_cover: BookCoverReaderOptions,
    pub content: ContentReaderOptions,
    pub xml: XmlReaderOptions,
}

impl ReaderOptions {
    /// 根据预设生成完整的选项
    pub fn from_preset(preset: ReaderOptionsPreset) -> Self {
        Self {
            container: ContainerFileReaderOptions::from_preset(preset),
            package: PackageReaderOptions::from_preset(preset),
            ncx: NcxReaderOptions::from_preset(preset),
            nav: NavDocumentReaderOptions::from_preset(preset),
            smil: SmilReaderOptions::from_preset(preset),
            navigation: NavigationReaderOptions::from_preset(preset),
            spine: SpineReaderOptions::from_preset(preset),
            book_cover: BookCoverReaderOptions::from_preset(preset),
            content: ContentReaderOptions::from_preset(preset),
            xml: XmlReaderOptions::from_preset(preset),
        }
    }

    /// 从YAML字符串加载选项，未出现的字段取默认值
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 从YAML文件加载选项
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    /// * `Result<Self>` - 加载成功返回选项，失败返回配置错误
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| EpubError::ConfigError(format!("无法读取配置文件: {}", e)))?;
        Self::from_yaml_str(&content)
    }

    /// 序列化为YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self)
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))
    }

    /// 把指定预设的选项写入YAML文件
    pub fn generate_config<P: AsRef<Path>>(path: P, preset: ReaderOptionsPreset) -> Result<()> {
        let yaml_content = Self::from_preset(preset).to_yaml()?;
        let content_with_header = format!(
            "# EPUB读取选项配置文件\n# 每个字段控制一条独立的校验规则，true表示放宽该规则\n\n{}",
            yaml_content
        );
        fs::write(path.as_ref(), content_with_header)
            .map_err(|e| EpubError::ConfigError(format!("写入配置文件失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_strict_is_default() {
        assert_eq!(ReaderOptions::from_preset(ReaderOptionsPreset::Strict), ReaderOptions::default());
    }

    #[test]
    fn test_relaxed_preset() {
        let options = ReaderOptions::from_preset(ReaderOptionsPreset::Relaxed);
        assert_eq!(options.package.fallback_epub_version, Some(EpubVersion::Epub2));
        assert!(options.package.ignore_missing_toc);
        assert!(!options.package.ignore_missing_package_file);
        assert!(options.ncx.skip_navigation_points_with_missing_ids);
        assert!(!options.ncx.allow_navigation_points_without_labels);
        assert!(options.navigation.skip_navigation_items_referencing_missing_content);
        assert!(!options.navigation.skip_remote_navigation_items);
        assert!(options.book_cover.epub2_metadata_ignore_missing_manifest_item);
        assert_eq!(options.smil, SmilReaderOptions::default());
        assert_eq!(options.spine, SpineReaderOptions::default());
        assert_eq!(options.container, ContainerFileReaderOptions::default());
    }

    #[test]
    fn test_ignore_all_preset() {
        let options = ReaderOptions::from_preset(ReaderOptionsPreset::IgnoreAllErrors);
        assert!(options.container.ignore_missing_container_file);
        assert!(options.ncx.allow_navigation_targets_without_labels);
        assert!(options.nav.skip_invalid_li_elements);
        assert!(options.smil.skip_audios_without_src_attributes);
        assert!(options.spine.ignore_missing_content_files);
        assert!(options.content.skip_items_with_duplicate_urls);
        assert!(options.content.ignore_epub3_navigation_file_is_not_html_error);
        assert!(options.xml.skip_xml_headers);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
ncx:
  skip_invalid_meta_elements: true
package:
  fallback_epub_version: Epub3
"#;
        let options = ReaderOptions::from_yaml_str(yaml).unwrap();
        assert!(options.ncx.skip_invalid_meta_elements);
        assert!(!options.ncx.skip_invalid_navigation_labels);
        assert_eq!(options.package.fallback_epub_version, Some(EpubVersion::Epub3));
        assert_eq!(options.nav, NavDocumentReaderOptions::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ReaderOptions::from_yaml_str("ncx: [1, 2");
        assert!(matches!(result, Err(EpubError::ConfigError(_))));
    }

    #[test]
    fn test_generate_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.yaml");
        ReaderOptions::generate_config(&path, ReaderOptionsPreset::Relaxed).unwrap();

        let loaded = ReaderOptions::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, ReaderOptions::from_preset(ReaderOptionsPreset::Relaxed));

        let missing = ReaderOptions::from_yaml_file(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(EpubError::ConfigError(_))));
    }
}
