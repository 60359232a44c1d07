//! 内容集合
//!
//! 本地文件按键和绝对路径索引，远程文件按URL索引。

use std::collections::HashMap;

use crate::epub::content::file::{LocalContentFile, RemoteContentFile};
use crate::epub::error::{EpubError, Result};
use crate::epub::options::ContentReaderOptions;

/// 本地与远程内容文件的集合
#[derive(Debug, Clone)]
pub struct ContentCollection<L, R> {
    local: Vec<L>,
    remote: Vec<R>,
    local_by_key: HashMap<String, usize>,
    local_by_file_path: HashMap<String, usize>,
    remote_by_url: HashMap<String, usize>,
}

impl<L, R> Default for ContentCollection<L, R> {
    fn default() -> Self {
        Self {
            local: Vec::new(),
            remote: Vec::new(),
            local_by_key: HashMap::new(),
            local_by_file_path: HashMap::new(),
            remote_by_url: HashMap::new(),
        }
    }
}

impl<L: LocalContentFile, R: RemoteContentFile> ContentCollection<L, R> {
    /// 创建内容集合
    ///
    /// 键重复和路径重复是两项独立的检查，分别由各自的选项决定跳过还是报错；
    /// 跳过时只保留第一次出现的文件。
    ///
    /// # 参数
    /// * `local` - 本地文件（按清单顺序）
    /// * `remote` - 远程文件（按清单顺序）
    /// * `options` - 重复处理策略
    pub fn new(local: Vec<L>, remote: Vec<R>, options: &ContentReaderOptions) -> Result<Self> {
        let mut collection = Self::default();

        for file in local {
            if collection.local_by_key.contains_key(file.key()) {
                if options.skip_items_with_duplicate_hrefs {
                    tracing::warn!("跳过键重复的本地文件: {}", file.key());
                    continue;
                }
                return Err(EpubError::package(format!("内容文件键重复: {}", file.key())));
            }
            if collection.local_by_file_path.contains_key(file.file_path()) {
                if options.skip_items_with_duplicate_file_paths {
                    tracing::warn!("跳过路径重复的本地文件: {}", file.file_path());
                    continue;
                }
                return Err(EpubError::package(format!("内容文件路径重复: {}", file.file_path())));
            }
            let index = collection.local.len();
            collection.local_by_key.insert(file.key().to_string(), index);
            collection.local_by_file_path.insert(file.file_path().to_string(), index);
            collection.local.push(file);
        }

        for file in remote {
            if collection.remote_by_url.contains_key(file.url()) {
                if options.skip_items_with_duplicate_urls {
                    tracing::warn!("跳过URL重复的远程文件: {}", file.url());
                    continue;
                }
                return Err(EpubError::package(format!("远程内容文件URL重复: {}", file.url())));
            }
            collection.remote_by_url.insert(file.url().to_string(), collection.remote.len());
            collection.remote.push(file);
        }

        Ok(collection)
    }

    /// 所有本地文件（按清单顺序）
    pub fn local(&self) -> &[L] {
        &self.local
    }

    /// 所有远程文件（按清单顺序）
    pub fn remote(&self) -> &[R] {
        &self.remote
    }

    pub fn contains_local_file_ref_with_key(&self, key: &str) -> bool {
        self.local_by_key.contains_key(key)
    }

    pub fn get_local_file_ref_by_key(&self, key: &str) -> Result<&L> {
        self.find_local_file_ref_by_key(key)
            .ok_or_else(|| EpubError::ContentCollection(format!("未找到键为 {} 的本地文件", key)))
    }

    pub fn find_local_file_ref_by_key(&self, key: &str) -> Option<&L> {
        self.local_by_key.get(key).map(|&index| &self.local[index])
    }

    pub fn contains_local_file_ref_with_file_path(&self, file_path: &str) -> bool {
        self.local_by_file_path.contains_key(file_path)
    }

    pub fn get_local_file_ref_by_file_path(&self, file_path: &str) -> Result<&L> {
        self.find_local_file_ref_by_file_path(file_path)
            .ok_or_else(|| EpubError::ContentCollection(format!("未找到路径为 {} 的本地文件", file_path)))
    }

    pub fn find_local_file_ref_by_file_path(&self, file_path: &str) -> Option<&L> {
        self.local_by_file_path.get(file_path).map(|&index| &self.local[index])
    }

    pub fn contains_remote_file_ref_with_url(&self, url: &str) -> bool {
        self.remote_by_url.contains_key(url)
    }

    pub fn get_remote_file_ref_by_url(&self, url: &str) -> Result<&R> {
        self.find_remote_file_ref_by_url(url)
            .ok_or_else(|| EpubError::ContentCollection(format!("未找到URL为 {} 的远程文件", url)))
    }

    pub fn find_remote_file_ref_by_url(&self, url: &str) -> Option<&R> {
        self.remote_by_url.get(url).map(|&index| &self.remote[index])
    }
}
