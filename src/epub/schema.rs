//! EPUB结构读取
//!
//! 依次读取container.xml、OPF包文件、NCX、导航文档和所有SMIL文档。

use crate::epub::archive::EpubArchive;
use crate::epub::container::ContainerFileReader;
use crate::epub::error::Result;
use crate::epub::nav::{NavDocument, NavDocumentReader};
use crate::epub::ncx::{Ncx, NcxReader};
use crate::epub::opf::{Package, PackageReader};
use crate::epub::options::ReaderOptions;
use crate::epub::path;
use crate::epub::smil::{Smil, SmilReader};

/// 一本书的完整结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub package: Package,
    /// EPUB 2导航，EPUB 3中可能作为兼容文件同时存在
    pub ncx: Option<Ncx>,
    pub nav_document: Option<NavDocument>,
    pub media_overlays: Vec<Smil>,
    /// OPF文件所在目录，清单中的href都相对于它
    pub content_directory_path: String,
}

/// 结构读取器
pub struct SchemaReader<'a> {
    options: &'a ReaderOptions,
}

impl<'a> SchemaReader<'a> {
    pub fn new(options: &'a ReaderOptions) -> Self {
        Self { options }
    }

    /// 读取EPUB结构
    ///
    /// # 参数
    /// * `archive` - EPUB归档
    ///
    /// # 返回值
    /// * `Result<Option<Schema>>` - container.xml或OPF文件缺失且被忽略时返回 `None`
    pub fn read_schema(&self, archive: &mut dyn EpubArchive) -> Result<Option<Schema>> {
        let options = self.options;
        let xml_options = &options.xml;

        let Some(package_file_path) =
            ContainerFileReader::new(&options.container, xml_options).get_package_file_path(archive)?
        else {
            return Ok(None);
        };
        let content_directory_path = path::directory_path(&package_file_path).to_string();
        tracing::debug!("OPF文件: {}，内容目录: {:?}", package_file_path, content_directory_path);

        let Some(package) = PackageReader::new(&options.package, xml_options).read_package(archive, &package_file_path)?
        else {
            return Ok(None);
        };

        let ncx = NcxReader::new(&options.ncx, xml_options).read_ncx(archive, &content_directory_path, &package)?;
        let nav_document =
            NavDocumentReader::new(&options.nav, xml_options).read_nav_document(archive, &content_directory_path, &package)?;
        let media_overlays =
            SmilReader::new(&options.smil, xml_options).read_all_smil_documents(archive, &content_directory_path, &package)?;

        Ok(Some(Schema {
            package,
            ncx,
            nav_document,
            media_overlays,
            content_directory_path,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::archive::MemoryArchive;
    use crate::epub::container::CONTAINER_FILE_PATH;
    use crate::epub::opf::EpubVersion;
    use crate::epub::options::ReaderOptionsPreset;

    const CONTAINER_XML: &str = r#"<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#;

    const PACKAGE_XML: &str = r#"<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Test</dc:title></metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="chapter1" href="chapter1.html" media-type="application/xhtml+xml" media-overlay="smil1"/>
    <item id="smil1" href="chapter1.smil" media-type="application/smil+xml"/>
  </manifest>
  <spine toc="ncx"><itemref idref="chapter1"/></spine>
</package>"#;

    const NCX_XML: &str = r#"<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/"><head/><docTitle><text>Test</text></docTitle><navMap/></ncx>"#;

    const NAV_XHTML: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops"><body>
  <nav epub:type="toc"><ol><li><a href="chapter1.html">Chapter 1</a></li></ol></nav>
</body></html>"#;

    const SMIL_XML: &str = r#"<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0"><body><par><text src="chapter1.html#p1"/></par></body></smil>"#;

    fn archive() -> MemoryArchive {
        MemoryArchive::new()
            .with_entry(CONTAINER_FILE_PATH, CONTAINER_XML)
            .with_entry("OEBPS/content.opf", PACKAGE_XML)
            .with_entry("OEBPS/toc.ncx", NCX_XML)
            .with_entry("OEBPS/nav.xhtml", NAV_XHTML)
            .with_entry("OEBPS/chapter1.smil", SMIL_XML)
    }

    #[test]
    fn test_read_schema() {
        let options = ReaderOptions::default();
        let schema = SchemaReader::new(&options).read_schema(&mut archive()).unwrap().unwrap();
        assert_eq!(schema.content_directory_path, "OEBPS");
        assert_eq!(schema.package.epub_version, EpubVersion::Epub3);
        assert_eq!(schema.ncx.unwrap().doc_title.as_deref(), Some("Test"));
        assert_eq!(schema.nav_document.unwrap().navs.len(), 1);
        assert_eq!(schema.media_overlays.len(), 1);
    }

    #[test]
    fn test_missing_container() {
        let options = ReaderOptions::default();
        assert!(SchemaReader::new(&options).read_schema(&mut MemoryArchive::new()).is_err());

        let options = ReaderOptions::from_preset(ReaderOptionsPreset::IgnoreAllErrors);
        let schema = SchemaReader::new(&options).read_schema(&mut MemoryArchive::new()).unwrap();
        assert!(schema.is_none());
    }

    #[test]
    fn test_missing_optional_documents_with_relaxed_files() {
        let mut archive = MemoryArchive::new()
            .with_entry(CONTAINER_FILE_PATH, CONTAINER_XML)
            .with_entry("OEBPS/content.opf", PACKAGE_XML)
            .with_entry("OEBPS/nav.xhtml", NAV_XHTML);
        let mut options = ReaderOptions::default();
        assert!(SchemaReader::new(&options).read_schema(&mut archive).is_err());

        options.ncx.ignore_missing_toc_file_error = true;
        options.smil.ignore_missing_smil_file_error = true;
        let schema = SchemaReader::new(&options).read_schema(&mut archive).unwrap().unwrap();
        assert!(schema.ncx.is_none());
        assert!(schema.nav_document.is_some());
        assert!(schema.media_overlays.is_empty());
    }
}
