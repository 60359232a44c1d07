//! EPUB 3结构语义词汇（`epub:type` 属性值）

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// `epub:type` 中的一个结构语义属性
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructuralSemanticsProperty {
    Cover,
    FrontMatter,
    BodyMatter,
    BackMatter,
    Volume,
    Part,
    Chapter,
    Subchapter,
    Division,
    Abstract,
    Foreword,
    Preface,
    Prologue,
    Introduction,
    Preamble,
    Conclusion,
    Epilogue,
    Afterword,
    Epigraph,
    Toc,
    TocBrief,
    Landmarks,
    Loa,
    Loi,
    Lot,
    Lov,
    Appendix,
    Colophon,
    Credits,
    Keywords,
    Index,
    Glossary,
    Bibliography,
    TitlePage,
    HalfTitlePage,
    CopyrightPage,
    Seriespage,
    Acknowledgments,
    Imprint,
    Imprimatur,
    Contributors,
    OtherCredits,
    Errata,
    Dedication,
    RevisionHistory,
    CaseStudy,
    Help,
    Marginalia,
    Notice,
    Pullquote,
    Sidebar,
    Tip,
    Warning,
    Halftitle,
    Fulltitle,
    Covertitle,
    Title,
    Subtitle,
    Label,
    Ordinal,
    Bridgehead,
    Learning,
    Assessment,
    Qna,
    Footnote,
    Endnote,
    Endnotes,
    Footnotes,
    Noteref,
    Backlink,
    Biblioref,
    Glossref,
    PageList,
    Pagebreak,
    Figure,
    Table,
    List,
    ListItem,
    /// 词汇表之外的值，保留原始文本
    Unknown(String),
}

static PROPERTY_NAMES: Lazy<HashMap<&'static str, StructuralSemanticsProperty>> = Lazy::new(|| {
    use StructuralSemanticsProperty::*;
    HashMap::from([
        ("cover", Cover),
        ("frontmatter", FrontMatter),
        ("bodymatter", BodyMatter),
        ("backmatter", BackMatter),
        ("volume", Volume),
        ("part", Part),
        ("chapter", Chapter),
        ("subchapter", Subchapter),
        ("division", Division),
        ("abstract", Abstract),
        ("foreword", Foreword),
        ("preface", Preface),
        ("prologue", Prologue),
        ("introduction", Introduction),
        ("preamble", Preamble),
        ("conclusion", Conclusion),
        ("epilogue", Epilogue),
        ("afterword", Afterword),
        ("epigraph", Epigraph),
        ("toc", Toc),
        ("toc-brief", TocBrief),
        ("landmarks", Landmarks),
        ("loa", Loa),
        ("loi", Loi),
        ("lot", Lot),
        ("lov", Lov),
        ("appendix", Appendix),
        ("colophon", Colophon),
        ("credits", Credits),
        ("keywords", Keywords),
        ("index", Index),
        ("glossary", Glossary),
        ("bibliography", Bibliography),
        ("titlepage", TitlePage),
        ("halftitlepage", HalfTitlePage),
        ("copyright-page", CopyrightPage),
        ("seriespage", Seriespage),
        ("acknowledgments", Acknowledgments),
        ("imprint", Imprint),
        ("imprimatur", Imprimatur),
        ("contributors", Contributors),
        ("other-credits", OtherCredits),
        ("errata", Errata),
        ("dedication", Dedication),
        ("revision-history", RevisionHistory),
        ("case-study", CaseStudy),
        ("help", Help),
        ("marginalia", Marginalia),
        ("notice", Notice),
        ("pullquote", Pullquote),
        ("sidebar", Sidebar),
        ("tip", Tip),
        ("warning", Warning),
        ("halftitle", Halftitle),
        ("fulltitle", Fulltitle),
        ("covertitle", Covertitle),
        ("title", Title),
        ("subtitle", Subtitle),
        ("label", Label),
        ("ordinal", Ordinal),
        ("bridgehead", Bridgehead),
        ("learning-objective", Learning),
        ("assessment", Assessment),
        ("qna", Qna),
        ("footnote", Footnote),
        ("endnote", Endnote),
        ("endnotes", Endnotes),
        ("footnotes", Footnotes),
        ("noteref", Noteref),
        ("backlink", Backlink),
        ("biblioref", Biblioref),
        ("glossref", Glossref),
        ("page-list", PageList),
        ("pagebreak", Pagebreak),
        ("figure", Figure),
        ("table", Table),
        ("list", List),
        ("list-item", ListItem),
    ])
});

impl StructuralSemanticsProperty {
    /// 解析单个属性值（不区分大小写），无法识别时返回 `Unknown`
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        PROPERTY_NAMES
            .get(value.to_ascii_lowercase().as_str())
            .cloned()
            .unwrap_or_else(|| Self::Unknown(value.to_string()))
    }

    /// 解析以空白分隔的属性列表
    pub fn parse_list(value: &str) -> Vec<Self> {
        value.split_whitespace().map(Self::parse).collect()
    }

    /// 属性在 `epub:type` 中的写法
    pub fn name(&self) -> &str {
        if let Self::Unknown(raw) = self {
            return raw;
        }
        PROPERTY_NAMES
            .iter()
            .find(|(_, property)| *property == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

impl fmt::Display for StructuralSemanticsProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(StructuralSemanticsProperty::parse("toc"), StructuralSemanticsProperty::Toc);
        assert_eq!(StructuralSemanticsProperty::parse("Page-List"), StructuralSemanticsProperty::PageList);
        assert_eq!(
            StructuralSemanticsProperty::parse("custom"),
            StructuralSemanticsProperty::Unknown("custom".to_string())
        );
    }

    #[test]
    fn test_parse_list() {
        let properties = StructuralSemanticsProperty::parse_list("  bodymatter\tchapter ");
        assert_eq!(
            properties,
            vec![StructuralSemanticsProperty::BodyMatter, StructuralSemanticsProperty::Chapter]
        );
        assert!(StructuralSemanticsProperty::parse_list("").is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(StructuralSemanticsProperty::Landmarks.name(), "landmarks");
        assert_eq!(StructuralSemanticsProperty::Unknown("x-y".to_string()).to_string(), "x-y");
    }
}
