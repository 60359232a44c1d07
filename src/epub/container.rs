//! container.xml读取
//!
//! 从 `META-INF/container.xml` 中取出OPF包文件的路径。

use crate::epub::archive::EpubArchive;
use crate::epub::error::{EpubError, Result};
use crate::epub::options::ContainerFileReaderOptions;
use crate::epub::xml::{self, XmlEntry, XmlReaderOptions};

pub const CONTAINER_FILE_PATH: &str = "META-INF/container.xml";
pub const CONTAINER_NAMESPACE: &str = "urn:oasis:names:tc:opendocument:xmlns:container";

/// container.xml读取器
pub struct ContainerFileReader<'a> {
    options: &'a ContainerFileReaderOptions,
    xml_options: &'a XmlReaderOptions,
}

impl<'a> ContainerFileReader<'a> {
    pub fn new(options: &'a ContainerFileReaderOptions, xml_options: &'a XmlReaderOptions) -> Self {
        Self { options, xml_options }
    }

    /// 获取OPF包文件路径
    ///
    /// # 参数
    /// * `archive` - EPUB归档
    ///
    /// # 返回值
    /// * `Result<Option<String>>` - `container/rootfiles/rootfile/@full-path` 的值
    pub fn get_package_file_path(&self, archive: &mut dyn EpubArchive) -> Result<Option<String>> {
        let document = match xml::load_entry(archive, CONTAINER_FILE_PATH, self.xml_options)? {
            XmlEntry::Document(document) => document,
            XmlEntry::Missing | XmlEntry::TooLarge => {
                if self.options.ignore_missing_container_file {
                    tracing::warn!("EPUB文件中未找到 {}", CONTAINER_FILE_PATH);
                    return Ok(None);
                }
                return Err(EpubError::container(format!("EPUB文件中未找到 {}", CONTAINER_FILE_PATH)));
            }
            XmlEntry::Invalid(err) => {
                if self.options.ignore_container_file_is_not_valid_xml_error {
                    tracing::warn!("container.xml不是有效的XML: {}", err);
                    return Ok(None);
                }
                return Err(EpubError::Container {
                    message: "container.xml不是有效的XML".to_string(),
                    source: Some(err),
                });
            }
        };

        let full_path = document
            .root_named(CONTAINER_NAMESPACE, "container")
            .and_then(|container| container.element(CONTAINER_NAMESPACE, "rootfiles"))
            .and_then(|rootfiles| rootfiles.element(CONTAINER_NAMESPACE, "rootfile"))
            .and_then(|rootfile| rootfile.attribute("full-path"));

        match full_path {
            Some(full_path) => Ok(Some(full_path.to_string())),
            None if self.options.ignore_missing_package_file_path_error => {
                tracing::warn!("container.xml中未找到OPF文件路径");
                Ok(None)
            }
            None => Err(EpubError::container("container.xml中未找到OPF文件路径")),
        }
    }
}
