//! 基于归档的内容加载器

use std::sync::Mutex;

use crate::epub::archive::{EpubArchive, MAX_ENTRY_LENGTH};
use crate::epub::content::file::{ContentFileMetadata, ContentLoader};
use crate::epub::error::{EpubError, Result};
use crate::epub::options::ContentReaderOptions;

/// 远程内容下载能力
pub trait ContentDownloader: Send + Sync {
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// 从EPUB归档中读取本地文件的加载器
///
/// 归档在所有引用之间共享，读取时加锁。
pub struct ArchiveContentLoader {
    archive: Mutex<Box<dyn EpubArchive + Send>>,
    options: ContentReaderOptions,
    downloader: Option<Box<dyn ContentDownloader>>,
}

impl ArchiveContentLoader {
    pub fn new(archive: Box<dyn EpubArchive + Send>, options: ContentReaderOptions) -> Self {
        Self {
            archive: Mutex::new(archive),
            options,
            downloader: None,
        }
    }

    /// 设置远程内容下载器
    pub fn with_downloader(mut self, downloader: Box<dyn ContentDownloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }
}

impl ContentLoader for ArchiveContentLoader {
    fn load_local(&self, metadata: &ContentFileMetadata, file_path: &str) -> Result<Vec<u8>> {
        let mut archive = self
            .archive
            .lock()
            .map_err(|_| EpubError::Content("归档锁已损坏".to_string()))?;

        let Some(length) = archive.entry_length(file_path) else {
            if self.options.ignore_missing_file_error {
                tracing::warn!("EPUB文件中未找到内容文件 {}，返回空内容", file_path);
                return Ok(Vec::new());
            }
            return Err(EpubError::Content(format!(
                "EPUB文件中未找到内容文件: {} (键: {})",
                file_path, metadata.key
            )));
        };
        if length > MAX_ENTRY_LENGTH {
            if self.options.ignore_file_is_too_large_error {
                tracing::warn!("内容文件 {} 超过2 GiB，返回空内容", file_path);
                return Ok(Vec::new());
            }
            return Err(EpubError::Content(format!("内容文件超过2 GiB: {}", file_path)));
        }
        archive.read_entry(file_path)
    }

    fn load_remote(&self, _metadata: &ContentFileMetadata, url: &str) -> Result<Vec<u8>> {
        match &self.downloader {
            Some(downloader) => downloader.download(url),
            None => Err(EpubError::Content(format!("未启用远程内容下载: {}", url))),
        }
    }
}
