//! 内容文件引用
//!
//! 引用只保存文件的身份信息（键、路径、媒体类型）和加载器，
//! 只有在调用 `read_content` 时才真正读取内容。

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::epub::error::{EpubError, Result};

/// 由清单媒体类型得出的内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Xhtml11,
    Dtbook,
    DtbookNcx,
    Oeb1Document,
    Xml,
    Css,
    Oeb1Css,
    ImageGif,
    ImageJpeg,
    ImagePng,
    ImageSvg,
    ImageWebp,
    FontTruetype,
    FontOpentype,
    FontSfnt,
    FontWoff,
    FontWoff2,
    Smil,
    Script,
    AudioMp3,
    AudioMp4,
    AudioOgg,
    VideoMp4,
    Other,
}

impl ContentType {
    /// 根据媒体类型判断内容类型（不区分大小写）
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "application/xhtml+xml" => Self::Xhtml11,
            "application/x-dtbook+xml" => Self::Dtbook,
            "application/x-dtbncx+xml" => Self::DtbookNcx,
            "text/x-oeb1-document" => Self::Oeb1Document,
            "application/xml" => Self::Xml,
            "text/css" => Self::Css,
            "text/x-oeb1-css" => Self::Oeb1Css,
            "image/gif" => Self::ImageGif,
            "image/jpeg" => Self::ImageJpeg,
            "image/png" => Self::ImagePng,
            "image/svg+xml" => Self::ImageSvg,
            "image/webp" => Self::ImageWebp,
            "font/truetype" | "font/ttf" | "application/x-font-truetype" => Self::FontTruetype,
            "font/opentype" | "font/otf" | "application/vnd.ms-opentype" => Self::FontOpentype,
            "font/sfnt" | "application/font-sfnt" => Self::FontSfnt,
            "font/woff" | "application/font-woff" => Self::FontWoff,
            "font/woff2" => Self::FontWoff2,
            "application/smil+xml" => Self::Smil,
            "application/javascript" | "application/ecmascript" | "text/javascript" => Self::Script,
            "audio/mpeg" => Self::AudioMp3,
            "audio/mp4" => Self::AudioMp4,
            "audio/ogg" | "audio/ogg; codecs=opus" => Self::AudioOgg,
            "video/mp4" => Self::VideoMp4,
            _ => Self::Other,
        }
    }

    /// 是否按文本读取
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Xhtml11
                | Self::Dtbook
                | Self::DtbookNcx
                | Self::Oeb1Document
                | Self::Xml
                | Self::Css
                | Self::Oeb1Css
                | Self::Smil
                | Self::Script
        )
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Self::ImageGif | Self::ImageJpeg | Self::ImagePng | Self::ImageSvg | Self::ImageWebp
        )
    }

    pub fn is_font(&self) -> bool {
        matches!(
            self,
            Self::FontTruetype | Self::FontOpentype | Self::FontSfnt | Self::FontWoff | Self::FontWoff2
        )
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::AudioMp3 | Self::AudioMp4 | Self::AudioOgg)
    }
}

/// 内容文件的身份信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFileMetadata {
    /// 本地文件为清单href，远程文件为URL
    pub key: String,
    pub content_type: ContentType,
    pub content_mime_type: String,
}

impl ContentFileMetadata {
    pub fn new(key: impl Into<String>, content_mime_type: impl Into<String>) -> Self {
        let content_mime_type = content_mime_type.into();
        Self {
            key: key.into(),
            content_type: ContentType::from_media_type(&content_mime_type),
            content_mime_type,
        }
    }
}

/// 内容加载能力
///
/// 每个内容文件引用都持有一个加载器，只在真正需要内容时调用。
pub trait ContentLoader: Send + Sync {
    /// 读取本地文件（`file_path` 为归档内的绝对路径）
    fn load_local(&self, metadata: &ContentFileMetadata, file_path: &str) -> Result<Vec<u8>>;

    /// 读取远程文件
    fn load_remote(&self, metadata: &ContentFileMetadata, url: &str) -> Result<Vec<u8>>;
}

/// 内容的读取形式
pub trait ContentKind {
    type Content;

    fn decode(bytes: Vec<u8>) -> Result<Self::Content>;
}

/// 文本内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextContent;

/// 二进制内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteContent;

impl ContentKind for TextContent {
    type Content = String;

    fn decode(bytes: Vec<u8>) -> Result<String> {
        let text = String::from_utf8(bytes)
            .map_err(|e| EpubError::Content(format!("内容不是有效的UTF-8文本: {}", e)))?;
        Ok(match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        })
    }
}

impl ContentKind for ByteContent {
    type Content = Vec<u8>;

    fn decode(bytes: Vec<u8>) -> Result<Vec<u8>> {
        Ok(bytes)
    }
}

/// 可以按键和文件路径索引的本地文件
pub trait LocalContentFile {
    fn key(&self) -> &str;
    fn file_path(&self) -> &str;
}

/// 可以按URL索引的远程文件
pub trait RemoteContentFile {
    fn url(&self) -> &str;
}

/// 本地内容文件引用
pub struct LocalContentFileRef<K: ContentKind> {
    metadata: ContentFileMetadata,
    file_path: String,
    loader: Arc<dyn ContentLoader>,
    kind: PhantomData<K>,
}

impl<K: ContentKind> LocalContentFileRef<K> {
    pub fn new(metadata: ContentFileMetadata, file_path: impl Into<String>, loader: Arc<dyn ContentLoader>) -> Self {
        Self {
            metadata,
            file_path: file_path.into(),
            loader,
            kind: PhantomData,
        }
    }

    pub fn metadata(&self) -> &ContentFileMetadata {
        &self.metadata
    }

    pub fn key(&self) -> &str {
        &self.metadata.key
    }

    /// 归档内的绝对路径
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn content_type(&self) -> ContentType {
        self.metadata.content_type
    }

    pub fn content_mime_type(&self) -> &str {
        &self.metadata.content_mime_type
    }

    /// 读取内容
    pub fn read_content(&self) -> Result<K::Content> {
        K::decode(self.loader.load_local(&self.metadata, &self.file_path)?)
    }
}

impl<K: ContentKind> Clone for LocalContentFileRef<K> {
    fn clone(&self) -> Self {
        Self {
            metadata: self.metadata.clone(),
            file_path: self.file_path.clone(),
            loader: Arc::clone(&self.loader),
            kind: PhantomData,
        }
    }
}

impl<K: ContentKind> fmt::Debug for LocalContentFileRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalContentFileRef")
            .field("key", &self.metadata.key)
            .field("file_path", &self.file_path)
            .field("content_type", &self.metadata.content_type)
            .finish()
    }
}

impl<K: ContentKind> LocalContentFile for LocalContentFileRef<K> {
    fn key(&self) -> &str {
        &self.metadata.key
    }

    fn file_path(&self) -> &str {
        &self.file_path
    }
}

/// 远程内容文件引用
pub struct RemoteContentFileRef<K: ContentKind> {
    metadata: ContentFileMetadata,
    loader: Arc<dyn ContentLoader>,
    kind: PhantomData<K>,
}

impl<K: ContentKind> RemoteContentFileRef<K> {
    pub fn new(metadata: ContentFileMetadata, loader: Arc<dyn ContentLoader>) -> Self {
        Self {
            metadata,
            loader,
            kind: PhantomData,
        }
    }

    pub fn metadata(&self) -> &ContentFileMetadata {
        &self.metadata
    }

    pub fn url(&self) -> &str {
        &self.metadata.key
    }

    pub fn content_type(&self) -> ContentType {
        self.metadata.content_type
    }

    /// 下载内容
    pub fn download_content(&self) -> Result<K::Content> {
        K::decode(self.loader.load_remote(&self.metadata, &self.metadata.key)?)
    }
}

impl<K: ContentKind> Clone for RemoteContentFileRef<K> {
    fn clone(&self) -> Self {
        Self {
            metadata: self.metadata.clone(),
            loader: Arc::clone(&self.loader),
            kind: PhantomData,
        }
    }
}

impl<K: ContentKind> fmt::Debug for RemoteContentFileRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteContentFileRef")
            .field("url", &self.metadata.key)
            .field("content_type", &self.metadata.content_type)
            .finish()
    }
}

impl<K: ContentKind> RemoteContentFile for RemoteContentFileRef<K> {
    fn url(&self) -> &str {
        &self.metadata.key
    }
}

pub type LocalTextContentFileRef = LocalContentFileRef<TextContent>;
pub type LocalByteContentFileRef = LocalContentFileRef<ByteContent>;
pub type RemoteTextContentFileRef = RemoteContentFileRef<TextContent>;
pub type RemoteByteContentFileRef = RemoteContentFileRef<ByteContent>;

/// 任意类型的本地文件引用，用于汇总所有文件
#[derive(Debug, Clone)]
pub enum AnyLocalContentFileRef {
    Text(LocalTextContentFileRef),
    Byte(LocalByteContentFileRef),
}

impl AnyLocalContentFileRef {
    pub fn metadata(&self) -> &ContentFileMetadata {
        match self {
            Self::Text(file) => file.metadata(),
            Self::Byte(file) => file.metadata(),
        }
    }
}

impl LocalContentFile for AnyLocalContentFileRef {
    fn key(&self) -> &str {
        &self.metadata().key
    }

    fn file_path(&self) -> &str {
        match self {
            Self::Text(file) => file.file_path(),
            Self::Byte(file) => file.file_path(),
        }
    }
}

/// 任意类型的远程文件引用
#[derive(Debug, Clone)]
pub enum AnyRemoteContentFileRef {
    Text(RemoteTextContentFileRef),
    Byte(RemoteByteContentFileRef),
}

impl RemoteContentFile for AnyRemoteContentFileRef {
    fn url(&self) -> &str {
        match self {
            Self::Text(file) => file.url(),
            Self::Byte(file) => file.url(),
        }
    }
}
