//! 单元测试共用的构造函数

use std::sync::Arc;

use crate::epub::content::{
    ContentCollection, ContentFileMetadata, ContentLoader, LocalByteContentFileRef, LocalTextContentFileRef,
    RemoteByteContentFileRef, RemoteTextContentFileRef, TextContentCollection, ByteContentCollection,
};
use crate::epub::error::Result;
use crate::epub::opf::{EpubVersion, Manifest, ManifestItem, Package};
use crate::epub::options::ContentReaderOptions;
use crate::epub::schema::Schema;

pub const CONTENT_DIRECTORY: &str = "OEBPS";

/// 总是返回空内容的加载器
pub struct NullLoader;

impl ContentLoader for NullLoader {
    fn load_local(&self, _metadata: &ContentFileMetadata, _file_path: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn load_remote(&self, _metadata: &ContentFileMetadata, _url: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

pub fn package_with(epub_version: EpubVersion, items: Vec<ManifestItem>) -> Package {
    let mut package = Package::new(epub_version);
    package.manifest = Manifest::new(items);
    package
}

pub fn schema_with(mut package: Package, items: Vec<ManifestItem>) -> Schema {
    package.manifest = Manifest::new(items);
    Schema {
        package,
        ncx: None,
        nav_document: None,
        media_overlays: Vec::new(),
        content_directory_path: CONTENT_DIRECTORY.to_string(),
    }
}

/// 由 (键, 绝对路径) 列表和远程URL列表构造HTML集合
pub fn html_collection(local: &[(&str, &str)], remote: &[&str]) -> TextContentCollection {
    let loader: Arc<dyn ContentLoader> = Arc::new(NullLoader);
    let local = local
        .iter()
        .map(|(key, path)| {
            LocalTextContentFileRef::new(
                ContentFileMetadata::new(*key, "application/xhtml+xml"),
                *path,
                Arc::clone(&loader),
            )
        })
        .collect();
    let remote = remote
        .iter()
        .map(|url| RemoteTextContentFileRef::new(ContentFileMetadata::new(*url, "application/xhtml+xml"), Arc::clone(&loader)))
        .collect();
    ContentCollection::new(local, remote, &ContentReaderOptions::default()).unwrap()
}

/// 由 (键, 绝对路径) 列表和远程URL列表构造图片集合
pub fn image_collection(local: &[(&str, &str)], remote: &[&str]) -> ByteContentCollection {
    let loader: Arc<dyn ContentLoader> = Arc::new(NullLoader);
    let local = local
        .iter()
        .map(|(key, path)| {
            LocalByteContentFileRef::new(ContentFileMetadata::new(*key, "image/jpeg"), *path, Arc::clone(&loader))
        })
        .collect();
    let remote = remote
        .iter()
        .map(|url| RemoteByteContentFileRef::new(ContentFileMetadata::new(*url, "image/jpeg"), Arc::clone(&loader)))
        .collect();
    ContentCollection::new(local, remote, &ContentReaderOptions::default()).unwrap()
}
