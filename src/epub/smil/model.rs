//! SMIL媒体覆盖文档数据结构

use crate::epub::semantics::StructuralSemanticsProperty;
use crate::epub::xml::XmlElement;

/// SMIL版本，目前只支持3.0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmilVersion {
    Smil3,
}

/// head/metadata中的原始元素
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmilMetadata {
    pub items: Vec<XmlElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmilHead {
    /// 没有metadata元素时为 `None`
    pub metadata: Option<SmilMetadata>,
}

/// 指向文本片段的引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmilText {
    pub id: Option<String>,
    pub src: String,
}

/// 音频片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmilAudio {
    pub id: Option<String>,
    pub src: String,
    pub clip_begin: Option<String>,
    pub clip_end: Option<String>,
}

/// 并行播放的文本与音频
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmilPar {
    pub id: Option<String>,
    pub epub_types: Option<Vec<StructuralSemanticsProperty>>,
    pub text: SmilText,
    pub audio: Option<SmilAudio>,
}

/// 顺序容器，可以嵌套
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmilSeq {
    pub id: Option<String>,
    pub epub_types: Option<Vec<StructuralSemanticsProperty>>,
    pub epub_text_ref: Option<String>,
    pub seqs: Vec<SmilSeq>,
    pub pars: Vec<SmilPar>,
}

impl SmilSeq {
    /// 深度优先遍历本容器及所有嵌套容器中的par
    pub fn all_pars(&self) -> Vec<&SmilPar> {
        let mut pars: Vec<&SmilPar> = Vec::new();
        for seq in &self.seqs {
            pars.extend(seq.all_pars());
        }
        pars.extend(self.pars.iter());
        pars
    }
}

/// body与seq结构相同
pub type SmilBody = SmilSeq;

/// SMIL文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smil {
    pub id: Option<String>,
    pub version: SmilVersion,
    pub epub_prefix: Option<String>,
    pub head: Option<SmilHead>,
    pub body: SmilBody,
}
