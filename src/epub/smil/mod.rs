//! SMIL媒体覆盖模块

pub mod model;
pub mod parser;

pub use model::{Smil, SmilAudio, SmilBody, SmilHead, SmilMetadata, SmilPar, SmilSeq, SmilText, SmilVersion};
pub use parser::{SMIL_MEDIA_TYPE, SMIL_NAMESPACE, SmilReader};
