use std::io;
use thiserror::Error;

use crate::epub::xml::XmlError;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub相关的错误类型
///
/// 每种读取器都有自己的错误变体；XML解析失败时底层错误作为 `source` 保留。
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("container.xml解析错误: {message}")]
    Container {
        message: String,
        #[source]
        source: Option<XmlError>,
    },

    #[error("OPF文件解析错误: {message}")]
    Package {
        message: String,
        #[source]
        source: Option<XmlError>,
    },

    #[error("NCX文件解析错误: {message}")]
    Ncx {
        message: String,
        #[source]
        source: Option<XmlError>,
    },

    #[error("NAV文档解析错误: {message}")]
    Nav {
        message: String,
        #[source]
        source: Option<XmlError>,
    },

    #[error("SMIL文件解析错误: {message}")]
    Smil {
        message: String,
        #[source]
        source: Option<XmlError>,
    },

    #[error("内容集合错误: {0}")]
    ContentCollection(String),

    #[error("内容读取错误: {0}")]
    Content(String),

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}

impl EpubError {
    pub fn container(message: impl Into<String>) -> Self {
        Self::Container { message: message.into(), source: None }
    }

    pub fn package(message: impl Into<String>) -> Self {
        Self::Package { message: message.into(), source: None }
    }

    pub fn ncx(message: impl Into<String>) -> Self {
        Self::Ncx { message: message.into(), source: None }
    }

    pub fn nav(message: impl Into<String>) -> Self {
        Self::Nav { message: message.into(), source: None }
    }

    pub fn smil(message: impl Into<String>) -> Self {
        Self::Smil { message: message.into(), source: None }
    }

    /// 返回包装在错误中的XML解析错误（如果有）
    pub fn xml_source(&self) -> Option<&XmlError> {
        match self {
            Self::Container { source, .. }
            | Self::Package { source, .. }
            | Self::Ncx { source, .. }
            | Self::Nav { source, .. }
            | Self::Smil { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_messages() {
        let err = EpubError::ncx("缺少navMap元素");
        assert_eq!(err.to_string(), "NCX文件解析错误: 缺少navMap元素");
        assert!(err.source().is_none());

        let err = EpubError::ContentCollection("未找到键: a.html".to_string());
        assert_eq!(err.to_string(), "内容集合错误: 未找到键: a.html");
    }

    #[test]
    fn test_xml_source_is_exposed() {
        let err = EpubError::Smil {
            message: "不是有效的XML".to_string(),
            source: Some(XmlError::MissingRootElement),
        };
        assert!(err.source().is_some());
        assert!(matches!(err.xml_source(), Some(XmlError::MissingRootElement)));
    }
}
