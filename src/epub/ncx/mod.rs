//! NCX（Navigation Control file for XML）文件解析模块
//!
//! EPUB 2使用NCX文件描述目录结构，EPUB 3中它仅作为向后兼容的可选文件。

pub mod navigation;
pub mod parser;

pub use navigation::{
    NavigationLabel, NavigationList, NavigationMap, NavigationPoint, NavigationTarget, Ncx, NcxContent, NcxHead,
    NcxMeta, PageList, PageTarget, PageTargetType,
};
pub use parser::{NCX_NAMESPACE, NcxReader};
