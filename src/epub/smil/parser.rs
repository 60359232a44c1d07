//! SMIL媒体覆盖文档解析器

use crate::epub::archive::EpubArchive;
use crate::epub::error::{EpubError, Result};
use crate::epub::nav::OPS_NAMESPACE;
use crate::epub::opf::Package;
use crate::epub::options::SmilReaderOptions;
use crate::epub::path;
use crate::epub::semantics::StructuralSemanticsProperty;
use crate::epub::smil::model::{
    Smil, SmilAudio, SmilBody, SmilHead, SmilMetadata, SmilPar, SmilSeq, SmilText, SmilVersion,
};
use crate::epub::xml::{self, XmlElement, XmlEntry, XmlReaderOptions};

pub const SMIL_NAMESPACE: &str = "http://www.w3.org/ns/SMIL";
pub const SMIL_MEDIA_TYPE: &str = "application/smil+xml";

/// SMIL读取器
pub struct SmilReader<'a> {
    options: &'a SmilReaderOptions,
    xml_options: &'a XmlReaderOptions,
}

impl<'a> SmilReader<'a> {
    pub fn new(options: &'a SmilReaderOptions, xml_options: &'a XmlReaderOptions) -> Self {
        Self { options, xml_options }
    }

    /// 按清单顺序读取所有SMIL文档
    ///
    /// 被选项忽略的文档不会出现在结果中。
    pub fn read_all_smil_documents(
        &self,
        archive: &mut dyn EpubArchive,
        content_directory_path: &str,
        package: &Package,
    ) -> Result<Vec<Smil>> {
        let mut documents = Vec::new();
        for item in package.manifest.items_with_media_type(SMIL_MEDIA_TYPE) {
            let file_path = path::combine_str(content_directory_path, &item.href);
            if let Some(smil) = self.read_smil(archive, &file_path)? {
                documents.push(smil);
            }
        }
        tracing::debug!("读取了 {} 个SMIL文档", documents.len());
        Ok(documents)
    }

    /// 读取单个SMIL文档
    ///
    /// # 参数
    /// * `archive` - EPUB归档
    /// * `file_path` - 文档在归档中的绝对路径
    ///
    /// # 返回值
    /// * `Result<Option<Smil>>` - 文档级错误被忽略时返回 `None`
    pub fn read_smil(&self, archive: &mut dyn EpubArchive, file_path: &str) -> Result<Option<Smil>> {
        let document = match xml::load_entry(archive, file_path, self.xml_options)? {
            XmlEntry::Document(document) => document,
            XmlEntry::Missing => {
                if self.options.ignore_missing_smil_file_error {
                    tracing::warn!("EPUB文件中未找到SMIL文件: {}", file_path);
                    return Ok(None);
                }
                return Err(EpubError::smil(format!("EPUB文件中未找到SMIL文件: {}", file_path)));
            }
            XmlEntry::TooLarge => {
                if self.options.ignore_smil_file_is_too_large_error {
                    tracing::warn!("SMIL文件超过2 GiB: {}", file_path);
                    return Ok(None);
                }
                return Err(EpubError::smil(format!("SMIL文件超过2 GiB: {}", file_path)));
            }
            XmlEntry::Invalid(err) => {
                if self.options.ignore_smil_file_is_not_valid_xml_error {
                    tracing::warn!("SMIL文件 {} 不是有效的XML: {}", file_path, err);
                    return Ok(None);
                }
                return Err(EpubError::Smil {
                    message: format!("SMIL文件 {} 不是有效的XML", file_path),
                    source: Some(err),
                });
            }
        };

        let Some(smil_node) = document.root_named(SMIL_NAMESPACE, "smil") else {
            if self.options.ignore_missing_smil_element_error {
                tracing::warn!("SMIL文件缺少smil元素: {}", file_path);
                return Ok(None);
            }
            return Err(EpubError::smil(format!("SMIL文件缺少smil元素: {}", file_path)));
        };
        self.parse_smil(smil_node)
    }

    /// 解析smil元素，body缺失且被忽略时返回 `None`
    pub fn parse_smil(&self, smil_node: &XmlElement) -> Result<Option<Smil>> {
        let version = self.read_version(smil_node)?;

        let head = smil_node.element(SMIL_NAMESPACE, "head").map(|head_node| SmilHead {
            metadata: head_node
                .element(SMIL_NAMESPACE, "metadata")
                .map(|metadata_node| SmilMetadata {
                    items: metadata_node.elements().cloned().collect(),
                }),
        });

        let Some(body_node) = smil_node.element(SMIL_NAMESPACE, "body") else {
            if self.options.ignore_missing_body_element_error {
                tracing::warn!("SMIL文件缺少body元素");
                return Ok(None);
            }
            return Err(EpubError::smil("SMIL文件缺少body元素"));
        };
        let body: SmilBody = self.read_seq(body_node, true)?;

        Ok(Some(Smil {
            id: smil_node.attribute("id").map(str::to_string),
            version,
            epub_prefix: smil_node.attribute_ns(OPS_NAMESPACE, "prefix").map(str::to_string),
            head,
            body,
        }))
    }

    fn read_version(&self, smil_node: &XmlElement) -> Result<SmilVersion> {
        match smil_node.attribute("version") {
            Some("3.0") => Ok(SmilVersion::Smil3),
            Some(version) => {
                if self.options.ignore_unsupported_smil_version_error {
                    tracing::warn!("不支持的SMIL版本 {}，按3.0处理", version);
                    return Ok(SmilVersion::Smil3);
                }
                Err(EpubError::smil(format!("不支持的SMIL版本: {}", version)))
            }
            None => {
                if self.options.ignore_missing_smil_version_error {
                    tracing::warn!("SMIL文件缺少version属性，按3.0处理");
                    return Ok(SmilVersion::Smil3);
                }
                Err(EpubError::smil("smil元素缺少version属性"))
            }
        }
    }

    /// 读取body或seq元素
    fn read_seq(&self, seq_node: &XmlElement, is_body: bool) -> Result<SmilSeq> {
        let mut seq = SmilSeq {
            id: seq_node.attribute("id").map(str::to_string),
            epub_types: read_epub_types(seq_node),
            epub_text_ref: seq_node.attribute_ns(OPS_NAMESPACE, "textref").map(str::to_string),
            ..SmilSeq::default()
        };
        for child in seq_node.elements() {
            if child.is(SMIL_NAMESPACE, "seq") {
                seq.seqs.push(self.read_seq(child, false)?);
            } else if child.is(SMIL_NAMESPACE, "par") {
                if let Some(par) = self.read_par(child)? {
                    seq.pars.push(par);
                }
            }
        }

        if seq.seqs.is_empty() && seq.pars.is_empty() {
            let (tolerated, element_name) = if is_body {
                (self.options.ignore_body_missing_seq_or_par_elements_error, "body")
            } else {
                (self.options.ignore_seq_missing_seq_or_par_elements_error, "seq")
            };
            if !tolerated {
                return Err(EpubError::smil(format!("{}元素既没有seq也没有par子元素", element_name)));
            }
            tracing::warn!("{}元素既没有seq也没有par子元素", element_name);
        }
        Ok(seq)
    }

    fn read_par(&self, par_node: &XmlElement) -> Result<Option<SmilPar>> {
        let text = match par_node.element(SMIL_NAMESPACE, "text") {
            Some(text_node) => self.read_text(text_node)?,
            None => None,
        };
        let Some(text) = text else {
            if self.options.skip_pars_without_text_elements {
                tracing::warn!("跳过缺少text元素的par");
                return Ok(None);
            }
            return Err(EpubError::smil("par元素缺少text子元素"));
        };

        let audio = match par_node.element(SMIL_NAMESPACE, "audio") {
            Some(audio_node) => self.read_audio(audio_node)?,
            None => None,
        };

        Ok(Some(SmilPar {
            id: par_node.attribute("id").map(str::to_string),
            epub_types: read_epub_types(par_node),
            text,
            audio,
        }))
    }

    fn read_text(&self, text_node: &XmlElement) -> Result<Option<SmilText>> {
        let Some(src) = text_node.attribute("src") else {
            if self.options.skip_texts_without_src_attributes {
                tracing::warn!("跳过缺少src属性的text元素");
                return Ok(None);
            }
            return Err(EpubError::smil("text元素缺少src属性"));
        };
        Ok(Some(SmilText {
            id: text_node.attribute("id").map(str::to_string),
            src: src.to_string(),
        }))
    }

    fn read_audio(&self, audio_node: &XmlElement) -> Result<Option<SmilAudio>> {
        let Some(src) = audio_node.attribute("src") else {
            if self.options.skip_audios_without_src_attributes {
                tracing::warn!("跳过缺少src属性的audio元素");
                return Ok(None);
            }
            return Err(EpubError::smil("audio元素缺少src属性"));
        };
        Ok(Some(SmilAudio {
            id: audio_node.attribute("id").map(str::to_string),
            src: src.to_string(),
            clip_begin: audio_node.attribute("clipBegin").map(str::to_string),
            clip_end: audio_node.attribute("clipEnd").map(str::to_string),
        }))
    }
}

fn read_epub_types(node: &XmlElement) -> Option<Vec<StructuralSemanticsProperty>> {
    node.attribute_ns(OPS_NAMESPACE, "type")
        .map(StructuralSemanticsProperty::parse_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::archive::{MAX_ENTRY_LENGTH, MemoryArchive};
    use crate::epub::opf::{EpubVersion, ManifestItem};
    use crate::epub::test_support::package_with;

    const SMIL_PATH: &str = "Content/chapter1.smil";

    const MINIMAL_SMIL: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0">
    <body>
        <par>
            <text src="chapter1.html#paragraph1" />
            <audio src="audio.mp3" clipBegin="0s" clipEnd="10s" />
        </par>
    </body>
</smil>"#;

    const FULL_SMIL: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<smil xmlns="http://www.w3.org/ns/SMIL" xmlns:epub="http://www.idpf.org/2007/ops" id="smil" version="3.0" epub:prefix="test: http://example.com/test/spec/">
    <head>
        <metadata>
            <item1>value1</item1>
            <item2>value2</item2>
        </metadata>
    </head>
    <body id="body" epub:type="bodymatter" epub:textref="chapter1.html">
        <seq id="seq1" epub:type="chapter" epub:textref="chapter1.html#section1">
            <seq id="seq2" epub:textref="chapter1.html#figure1">
                <par id="par3" epub:type="figure">
                    <text id="text3" src="chapter1.html#photo" />
                    <audio id="audio3" src="audio.mp3" clipBegin="0:24:18.123" clipEnd="0:24:28.764" />
                </par>
            </seq>
            <par id="par1">
                <text src="chapter1.html#paragraph1" />
                <audio src="audio.mp3" clipBegin="0:23:34.221" clipEnd="0:23:59.003" />
            </par>
        </seq>
    </body>
</smil>"#;

    fn read(smil: &str, options: &SmilReaderOptions) -> Result<Option<Smil>> {
        let mut archive = MemoryArchive::new().with_entry(SMIL_PATH, smil);
        SmilReader::new(options, &XmlReaderOptions::default()).read_smil(&mut archive, SMIL_PATH)
    }

    fn read_strict(smil: &str) -> Result<Option<Smil>> {
        read(smil, &SmilReaderOptions::default())
    }

    fn minimal_par() -> SmilPar {
        SmilPar {
            id: None,
            epub_types: None,
            text: SmilText {
                id: None,
                src: "chapter1.html#paragraph1".to_string(),
            },
            audio: Some(SmilAudio {
                id: None,
                src: "audio.mp3".to_string(),
                clip_begin: Some("0s".to_string()),
                clip_end: Some("10s".to_string()),
            }),
        }
    }

    fn smil_with_body(body: SmilBody, head: Option<SmilHead>) -> Smil {
        Smil {
            id: None,
            version: SmilVersion::Smil3,
            epub_prefix: None,
            head,
            body,
        }
    }

    #[test]
    fn test_minimal_smil() {
        let smil = read_strict(MINIMAL_SMIL).unwrap().unwrap();
        let body = SmilBody {
            pars: vec![minimal_par()],
            ..SmilBody::default()
        };
        assert_eq!(smil, smil_with_body(body, None));
    }

    #[test]
    fn test_full_smil() {
        let smil = read_strict(FULL_SMIL).unwrap().unwrap();
        assert_eq!(smil.id.as_deref(), Some("smil"));
        assert_eq!(smil.epub_prefix.as_deref(), Some("test: http://example.com/test/spec/"));

        let metadata = smil.head.unwrap().metadata.unwrap();
        assert_eq!(metadata.items.len(), 2);
        assert_eq!(metadata.items[0].local_name, "item1");
        assert_eq!(metadata.items[1].text(), "value2");

        let body = &smil.body;
        assert_eq!(body.id.as_deref(), Some("body"));
        assert_eq!(body.epub_types, Some(vec![StructuralSemanticsProperty::BodyMatter]));
        assert_eq!(body.epub_text_ref.as_deref(), Some("chapter1.html"));
        assert!(body.pars.is_empty());

        let seq1 = &body.seqs[0];
        assert_eq!(seq1.epub_types, Some(vec![StructuralSemanticsProperty::Chapter]));
        assert_eq!(seq1.seqs[0].epub_types, None);
        assert_eq!(seq1.pars[0].id.as_deref(), Some("par1"));

        let par3 = &seq1.seqs[0].pars[0];
        assert_eq!(par3.text.id.as_deref(), Some("text3"));
        assert_eq!(par3.audio.as_ref().unwrap().clip_end.as_deref(), Some("0:24:28.764"));
        assert_eq!(body.all_pars().len(), 2);
    }

    #[test]
    fn test_read_all_smil_documents() {
        let package = package_with(
            EpubVersion::Epub3,
            vec![
                ManifestItem::new("smil1", "chapter1.smil", SMIL_MEDIA_TYPE),
                ManifestItem::new("chapter1", "chapter1.html", "application/xhtml+xml"),
                ManifestItem::new("smil2", "chapter2.smil", SMIL_MEDIA_TYPE),
            ],
        );
        let mut archive = MemoryArchive::new()
            .with_entry("Content/chapter1.smil", MINIMAL_SMIL)
            .with_entry("Content/chapter2.smil", FULL_SMIL);
        let options = SmilReaderOptions::default();
        let documents = SmilReader::new(&options, &XmlReaderOptions::default())
            .read_all_smil_documents(&mut archive, "Content", &package)
            .unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].id, None);
        assert_eq!(documents[1].id.as_deref(), Some("smil"));
    }

    #[test]
    fn test_file_level_errors() {
        let options = SmilReaderOptions::default();
        let xml_options = XmlReaderOptions::default();
        let reader = SmilReader::new(&options, &xml_options);
        assert!(reader.read_smil(&mut MemoryArchive::new(), SMIL_PATH).is_err());

        let lenient = SmilReaderOptions {
            ignore_missing_smil_file_error: true,
            ignore_smil_file_is_too_large_error: true,
            ..Default::default()
        };
        let lenient_reader = SmilReader::new(&lenient, &xml_options);
        assert!(lenient_reader.read_smil(&mut MemoryArchive::new(), SMIL_PATH).unwrap().is_none());

        let mut too_large = MemoryArchive::new();
        too_large.add_entry_with_length(SMIL_PATH, MINIMAL_SMIL, MAX_ENTRY_LENGTH + 1);
        assert!(reader.read_smil(&mut too_large, SMIL_PATH).is_err());
        assert!(lenient_reader.read_smil(&mut too_large, SMIL_PATH).unwrap().is_none());

        let err = read_strict("<smil>").unwrap_err();
        assert!(matches!(err, EpubError::Smil { source: Some(_), .. }));
        let options = SmilReaderOptions {
            ignore_smil_file_is_not_valid_xml_error: true,
            ..Default::default()
        };
        assert!(read("<smil>", &options).unwrap().is_none());
    }

    #[test]
    fn test_missing_smil_element() {
        let xml = "<?xml version='1.0' encoding='utf-8'?><test />";
        assert!(read_strict(xml).is_err());
        let options = SmilReaderOptions {
            ignore_missing_smil_element_error: true,
            ..Default::default()
        };
        assert!(read(xml, &options).unwrap().is_none());
    }

    #[test]
    fn test_smil_version() {
        let missing = MINIMAL_SMIL.replace(r#" version="3.0""#, "");
        let wrong = MINIMAL_SMIL.replace(r#"version="3.0""#, r#"version="2.0""#);
        assert!(read_strict(&missing).is_err());
        assert!(read_strict(&wrong).is_err());

        let options = SmilReaderOptions {
            ignore_missing_smil_version_error: true,
            ..Default::default()
        };
        assert_eq!(read(&missing, &options).unwrap().unwrap().version, SmilVersion::Smil3);
        assert!(read(&wrong, &options).is_err());

        let options = SmilReaderOptions {
            ignore_unsupported_smil_version_error: true,
            ..Default::default()
        };
        assert_eq!(read(&wrong, &options).unwrap().unwrap().version, SmilVersion::Smil3);
    }

    #[test]
    fn test_missing_body() {
        let xml = r#"<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0"><test /></smil>"#;
        assert!(read_strict(xml).is_err());
        let options = SmilReaderOptions {
            ignore_missing_body_element_error: true,
            ..Default::default()
        };
        assert!(read(xml, &options).unwrap().is_none());
    }

    #[test]
    fn test_non_metadata_head_elements_are_ignored() {
        let xml = MINIMAL_SMIL.replace("<body>", "<head><test1 /><test2 /></head><body>");
        let smil = read_strict(&xml).unwrap().unwrap();
        assert_eq!(smil.head, Some(SmilHead { metadata: None }));
    }

    #[test]
    fn test_empty_body_and_seq() {
        let empty_body = r#"<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0"><body /></smil>"#;
        let empty_seq = r#"<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0"><body><seq /></body></smil>"#;
        assert!(read_strict(empty_body).is_err());
        assert!(read_strict(empty_seq).is_err());

        let options = SmilReaderOptions {
            ignore_body_missing_seq_or_par_elements_error: true,
            ..Default::default()
        };
        assert_eq!(read(empty_body, &options).unwrap().unwrap().body, SmilBody::default());
        assert!(read(empty_seq, &options).is_err());

        let options = SmilReaderOptions {
            ignore_seq_missing_seq_or_par_elements_error: true,
            ..Default::default()
        };
        let smil = read(empty_seq, &options).unwrap().unwrap();
        assert_eq!(smil.body.seqs, vec![SmilSeq::default()]);
    }

    #[test]
    fn test_par_without_text() {
        let xml = r#"<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0"><body><par /></body></smil>"#;
        assert!(read_strict(xml).is_err());
        let options = SmilReaderOptions {
            skip_pars_without_text_elements: true,
            ignore_body_missing_seq_or_par_elements_error: true,
            ..Default::default()
        };
        assert_eq!(read(xml, &options).unwrap().unwrap().body, SmilBody::default());
    }

    #[test]
    fn test_text_without_src() {
        let xml = r#"<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0"><body><par><text /></par></body></smil>"#;
        assert!(read_strict(xml).is_err());
        let options = SmilReaderOptions {
            skip_texts_without_src_attributes: true,
            skip_pars_without_text_elements: true,
            ignore_body_missing_seq_or_par_elements_error: true,
            ..Default::default()
        };
        assert!(read(xml, &options).unwrap().unwrap().body.pars.is_empty());
    }

    #[test]
    fn test_audio_without_src() {
        let xml = r#"<smil xmlns="http://www.w3.org/ns/SMIL" version="3.0"><body><par><text src="chapter1.html#paragraph1" /><audio /></par></body></smil>"#;
        assert!(read_strict(xml).is_err());
        let options = SmilReaderOptions {
            skip_audios_without_src_attributes: true,
            ..Default::default()
        };
        let smil = read(xml, &options).unwrap().unwrap();
        assert_eq!(smil.body.pars[0].audio, None);
        assert_eq!(smil.body.pars[0].text.src, "chapter1.html#paragraph1");
    }
}
