//! EPUB 3 XHTML导航文档模块

pub mod document;
pub mod parser;

pub use document::{Li, Nav, NavAnchor, NavDocument, NavSpan, Ol};
pub use parser::{NavDocumentReader, OPS_NAMESPACE, XHTML_NAMESPACE};
