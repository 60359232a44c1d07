//! EPUB 3导航文档解析器

use crate::epub::archive::EpubArchive;
use crate::epub::error::{EpubError, Result};
use crate::epub::nav::document::{Li, Nav, NavAnchor, NavDocument, NavSpan, Ol};
use crate::epub::opf::{EpubVersion, Package};
use crate::epub::options::NavDocumentReaderOptions;
use crate::epub::path;
use crate::epub::semantics::StructuralSemanticsProperty;
use crate::epub::xml::{self, XmlElement, XmlEntry, XmlReaderOptions};

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const OPS_NAMESPACE: &str = "http://www.idpf.org/2007/ops";

const HEADING_NAMES: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// 导航文档读取器
pub struct NavDocumentReader<'a> {
    options: &'a NavDocumentReaderOptions,
    xml_options: &'a XmlReaderOptions,
}

impl<'a> NavDocumentReader<'a> {
    pub fn new(options: &'a NavDocumentReaderOptions, xml_options: &'a XmlReaderOptions) -> Self {
        Self { options, xml_options }
    }

    /// 读取清单中带 `nav` 属性的导航文档
    ///
    /// # 参数
    /// * `archive` - EPUB归档
    /// * `content_directory_path` - OPF文件所在目录
    /// * `package` - 已解析的OPF包
    ///
    /// # 返回值
    /// * `Result<Option<NavDocument>>` - EPUB 2没有导航文档时总是返回 `None`
    pub fn read_nav_document(
        &self,
        archive: &mut dyn EpubArchive,
        content_directory_path: &str,
        package: &Package,
    ) -> Result<Option<NavDocument>> {
        let Some(nav_item) = package.manifest.find_nav_item() else {
            if package.epub_version == EpubVersion::Epub2 {
                return Ok(None);
            }
            if self.options.ignore_missing_nav_manifest_item_error {
                tracing::warn!("清单中没有带nav属性的项");
                return Ok(None);
            }
            return Err(EpubError::nav("EPUB 3清单中没有带nav属性的项"));
        };

        let file_path = path::combine_str(content_directory_path, &nav_item.href);
        let document = match xml::load_entry(archive, &file_path, self.xml_options)? {
            XmlEntry::Document(document) => document,
            XmlEntry::Missing => {
                if self.options.ignore_missing_nav_file_error {
                    tracing::warn!("EPUB文件中未找到导航文件: {}", file_path);
                    return Ok(None);
                }
                return Err(EpubError::nav(format!("EPUB文件中未找到导航文件: {}", file_path)));
            }
            XmlEntry::TooLarge => {
                if self.options.ignore_nav_file_is_too_large_error {
                    tracing::warn!("导航文件超过2 GiB: {}", file_path);
                    return Ok(None);
                }
                return Err(EpubError::nav(format!("导航文件超过2 GiB: {}", file_path)));
            }
            XmlEntry::Invalid(err) => {
                if self.options.ignore_nav_file_is_not_valid_xml_error {
                    tracing::warn!("导航文件 {} 不是有效的XML: {}", file_path, err);
                    return Ok(None);
                }
                return Err(EpubError::Nav {
                    message: format!("导航文件 {} 不是有效的XML", file_path),
                    source: Some(err),
                });
            }
        };

        let Some(html_node) = document.root_named(XHTML_NAMESPACE, "html") else {
            if self.options.ignore_missing_html_element_error {
                tracing::warn!("导航文件缺少html元素: {}", file_path);
                return Ok(None);
            }
            return Err(EpubError::nav("导航文件缺少html元素"));
        };
        let Some(body_node) = html_node.element(XHTML_NAMESPACE, "body") else {
            if self.options.ignore_missing_body_element_error {
                tracing::warn!("导航文件缺少body元素: {}", file_path);
                return Ok(None);
            }
            return Err(EpubError::nav("导航文件缺少body元素"));
        };

        let mut navs = Vec::new();
        for nav_node in body_node.elements_named(XHTML_NAMESPACE, "nav") {
            if let Some(nav) = self.read_nav(nav_node)? {
                navs.push(nav);
            }
        }
        Ok(Some(NavDocument { file_path, navs }))
    }

    fn read_nav(&self, nav_node: &XmlElement) -> Result<Option<Nav>> {
        // 没有epub:type的nav不参与导航
        let Some(nav_type) = nav_node.attribute_ns(OPS_NAMESPACE, "type") else {
            return Ok(None);
        };
        let nav_type = StructuralSemanticsProperty::parse(nav_type.split_whitespace().next().unwrap_or_default());

        let head = nav_node
            .elements()
            .find(|e| HEADING_NAMES.iter().any(|name| e.has_local_name(name)))
            .map(|heading| heading.text().trim().to_string());

        let Some(ol_node) = nav_node.elements().find(|e| e.has_local_name("ol")) else {
            if self.options.skip_navs_with_missing_ol_elements {
                tracing::warn!("跳过缺少ol元素的nav: {}", nav_type);
                return Ok(None);
            }
            return Err(EpubError::nav(format!("nav元素 {} 缺少ol元素", nav_type)));
        };

        Ok(Some(Nav {
            nav_type,
            is_hidden: nav_node.attribute("hidden").is_some(),
            head,
            ol: self.read_ol(ol_node)?,
        }))
    }

    fn read_ol(&self, ol_node: &XmlElement) -> Result<Ol> {
        let mut items = Vec::new();
        for li_node in ol_node.elements().filter(|e| e.has_local_name("li")) {
            if let Some(li) = self.read_li(li_node)? {
                items.push(li);
            }
        }
        Ok(Ol {
            is_hidden: ol_node.attribute("hidden").is_some(),
            items,
        })
    }

    fn read_li(&self, li_node: &XmlElement) -> Result<Option<Li>> {
        let mut anchor = None;
        let mut span = None;
        let mut child_ol = None;
        for child in li_node.elements() {
            match child.local_name.to_ascii_lowercase().as_str() {
                "a" if anchor.is_none() && span.is_none() => anchor = Some(read_anchor(child)),
                "span" if anchor.is_none() && span.is_none() => span = Some(read_span(child)),
                "ol" if child_ol.is_none() => child_ol = Some(self.read_ol(child)?),
                _ => {}
            }
        }

        match (anchor, span) {
            (Some(anchor), _) => Ok(Some(Li::Anchor { anchor, child_ol })),
            (None, Some(span)) => Ok(Some(Li::Span { span, child_ol })),
            (None, None) if self.options.skip_invalid_li_elements => {
                tracing::warn!("跳过既没有a也没有span的li元素");
                Ok(None)
            }
            (None, None) => Err(EpubError::nav("li元素既没有a也没有span子元素")),
        }
    }
}

fn read_anchor(anchor_node: &XmlElement) -> NavAnchor {
    NavAnchor {
        href: anchor_node.attribute("href").map(path::unescape),
        title: anchor_node.attribute("title").map(str::to_string),
        alt: anchor_node.attribute("alt").map(str::to_string),
        types: anchor_node
            .attribute_ns(OPS_NAMESPACE, "type")
            .map(StructuralSemanticsProperty::parse_list),
        text: anchor_node.text(),
    }
}

fn read_span(span_node: &XmlElement) -> NavSpan {
    NavSpan {
        title: span_node.attribute("title").map(str::to_string),
        alt: span_node.attribute("alt").map(str::to_string),
        text: span_node.text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::archive::{MAX_ENTRY_LENGTH, MemoryArchive};
    use crate::epub::opf::ManifestItem;
    use crate::epub::test_support::{CONTENT_DIRECTORY, package_with};

    const NAV_PATH: &str = "OEBPS/nav.xhtml";

    const MINIMAL_NAV: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body/></html>"#;

    const FULL_NAV: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
  <head><title>Navigation</title></head>
  <body>
    <nav epub:type="toc">
      <h1>Contents</h1>
      <ol>
        <li><a href="chapter%31.html">Chapter 1</a>
          <ol>
            <li><a href="chapter1.html#section-1" title="Section title" epub:type="subchapter">Section 1</a></li>
          </ol>
        </li>
        <li><span title="Part title">Part 2</span>
          <ol hidden="">
            <li><a href="chapter2.html"><img alt="Chapter 2"/></a></li>
          </ol>
        </li>
        <li><a>Heading only</a></li>
      </ol>
    </nav>
    <nav epub:type="landmarks" hidden="">
      <ol>
        <li><a epub:type="bodymatter" href="chapter1.html">Start</a></li>
      </ol>
    </nav>
    <nav>
      <ol><li><a href="ignored.html">Ignored</a></li></ol>
    </nav>
    <section>
      <nav epub:type="page-list"><ol><li><a href="p.html">1</a></li></ol></nav>
    </section>
  </body>
</html>"#;

    fn package() -> Package {
        package_with(
            EpubVersion::Epub3,
            vec![ManifestItem::new("nav", "nav.xhtml", "application/xhtml+xml").with_properties("nav")],
        )
    }

    fn read_with(archive: &mut MemoryArchive, options: &NavDocumentReaderOptions) -> Result<Option<NavDocument>> {
        NavDocumentReader::new(options, &XmlReaderOptions::default()).read_nav_document(
            archive,
            CONTENT_DIRECTORY,
            &package(),
        )
    }

    fn read(xhtml: &str, options: &NavDocumentReaderOptions) -> Result<Option<NavDocument>> {
        read_with(&mut MemoryArchive::new().with_entry(NAV_PATH, xhtml), options)
    }

    fn read_strict(xhtml: &str) -> Result<Option<NavDocument>> {
        read(xhtml, &NavDocumentReaderOptions::default())
    }

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops"><body>{}</body></html>"#,
            body
        )
    }

    #[test]
    fn test_minimal_nav_document() {
        let document = read_strict(MINIMAL_NAV).unwrap().unwrap();
        assert_eq!(
            document,
            NavDocument {
                file_path: NAV_PATH.to_string(),
                navs: Vec::new(),
            }
        );
    }

    #[test]
    fn test_full_nav_document() {
        let document = read_strict(FULL_NAV).unwrap().unwrap();
        assert_eq!(document.navs.len(), 2);

        let toc = &document.navs[0];
        assert_eq!(toc.nav_type, StructuralSemanticsProperty::Toc);
        assert!(!toc.is_hidden);
        assert_eq!(toc.head.as_deref(), Some("Contents"));
        assert_eq!(toc.ol.items.len(), 3);

        let Li::Anchor { anchor, child_ol } = &toc.ol.items[0] else {
            panic!("第一项应为链接");
        };
        assert_eq!(anchor.href.as_deref(), Some("chapter1.html"));
        assert_eq!(anchor.text, "Chapter 1");
        let nested = child_ol.as_ref().unwrap();
        let Li::Anchor { anchor: section, .. } = &nested.items[0] else {
            panic!("嵌套项应为链接");
        };
        assert_eq!(section.title.as_deref(), Some("Section title"));
        assert_eq!(section.types, Some(vec![StructuralSemanticsProperty::Subchapter]));

        let Li::Span { span, child_ol } = &toc.ol.items[1] else {
            panic!("第二项应为span");
        };
        assert_eq!(span.text, "Part 2");
        assert!(child_ol.as_ref().unwrap().is_hidden);

        let Li::Anchor { anchor: heading, child_ol } = &toc.ol.items[2] else {
            panic!("第三项应为链接");
        };
        assert_eq!(heading.href, None);
        assert!(child_ol.is_none());

        let landmarks = &document.navs[1];
        assert_eq!(landmarks.nav_type, StructuralSemanticsProperty::Landmarks);
        assert!(landmarks.is_hidden);
        assert_eq!(landmarks.head, None);
    }

    #[test]
    fn test_epub2_without_nav_item() {
        let package = package_with(EpubVersion::Epub2, Vec::new());
        let options = NavDocumentReaderOptions::default();
        let result = NavDocumentReader::new(&options, &XmlReaderOptions::default())
            .read_nav_document(&mut MemoryArchive::new(), CONTENT_DIRECTORY, &package)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_epub3_without_nav_item() {
        let package = package_with(EpubVersion::Epub3, Vec::new());
        let xml_options = XmlReaderOptions::default();
        let strict = NavDocumentReaderOptions::default();
        let result = NavDocumentReader::new(&strict, &xml_options).read_nav_document(
            &mut MemoryArchive::new(),
            CONTENT_DIRECTORY,
            &package,
        );
        assert!(matches!(result, Err(EpubError::Nav { .. })));

        let options = NavDocumentReaderOptions {
            ignore_missing_nav_manifest_item_error: true,
            ..Default::default()
        };
        let result = NavDocumentReader::new(&options, &xml_options)
            .read_nav_document(&mut MemoryArchive::new(), CONTENT_DIRECTORY, &package)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_file_level_errors() {
        let mut missing = MemoryArchive::new();
        assert!(read_with(&mut missing, &NavDocumentReaderOptions::default()).is_err());
        let options = NavDocumentReaderOptions {
            ignore_missing_nav_file_error: true,
            ..Default::default()
        };
        assert!(read_with(&mut missing, &options).unwrap().is_none());

        let mut too_large = MemoryArchive::new();
        too_large.add_entry_with_length(NAV_PATH, MINIMAL_NAV, MAX_ENTRY_LENGTH + 1);
        assert!(read_with(&mut too_large, &NavDocumentReaderOptions::default()).is_err());
        let options = NavDocumentReaderOptions {
            ignore_nav_file_is_too_large_error: true,
            ..Default::default()
        };
        assert!(read_with(&mut too_large, &options).unwrap().is_none());

        let err = read_strict("<html>").unwrap_err();
        assert!(matches!(err, EpubError::Nav { source: Some(_), .. }));
        let options = NavDocumentReaderOptions {
            ignore_nav_file_is_not_valid_xml_error: true,
            ..Default::default()
        };
        assert!(read("<html>", &options).unwrap().is_none());
    }

    #[test]
    fn test_missing_html_and_body() {
        let no_html = r#"<div xmlns="http://www.w3.org/1999/xhtml"/>"#;
        let no_body = r#"<html xmlns="http://www.w3.org/1999/xhtml"><head/></html>"#;
        assert!(read_strict(no_html).is_err());
        assert!(read_strict(no_body).is_err());

        let options = NavDocumentReaderOptions {
            ignore_missing_html_element_error: true,
            ..Default::default()
        };
        assert!(read(no_html, &options).unwrap().is_none());
        assert!(read(no_body, &options).is_err());

        let options = NavDocumentReaderOptions {
            ignore_missing_body_element_error: true,
            ..Default::default()
        };
        assert!(read(no_body, &options).unwrap().is_none());
    }

    #[test]
    fn test_nav_without_ol() {
        let xhtml = wrap_body(r#"<nav epub:type="toc"><h2>Contents</h2></nav><nav epub:type="landmarks"><ol/></nav>"#);
        assert!(read_strict(&xhtml).is_err());
        let options = NavDocumentReaderOptions {
            skip_navs_with_missing_ol_elements: true,
            ..Default::default()
        };
        let document = read(&xhtml, &options).unwrap().unwrap();
        assert_eq!(document.navs.len(), 1);
        assert_eq!(document.navs[0].nav_type, StructuralSemanticsProperty::Landmarks);
    }

    #[test]
    fn test_invalid_li() {
        let xhtml = wrap_body(r#"<nav epub:type="toc"><ol><li>Plain text</li><li><a href="a.html">A</a></li></ol></nav>"#);
        assert!(read_strict(&xhtml).is_err());
        let options = NavDocumentReaderOptions {
            skip_invalid_li_elements: true,
            ..Default::default()
        };
        let document = read(&xhtml, &options).unwrap().unwrap();
        assert_eq!(document.navs[0].ol.items.len(), 1);
    }

    #[test]
    fn test_inline_text_keeps_spaces() {
        let xhtml = wrap_body(
            r#"<nav epub:type="toc"><ol>
  <li><a href="c.html"><span>1</span> <span>Intro</span></a></li>
  <li><span><b>Part</b> <i>One</i></span></li>
</ol></nav>"#,
        );
        let document = read_strict(&xhtml).unwrap().unwrap();
        let items = &document.navs[0].ol.items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].display_title(), "1 Intro");
        assert_eq!(items[1].display_title(), "Part One");
    }
}
