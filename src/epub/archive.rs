//! 归档访问抽象
//!
//! 读取器只通过 [`EpubArchive`] 访问EPUB中的条目，既可以是真实的ZIP文件，
//! 也可以是测试用的内存归档。

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use zip::ZipArchive;

use crate::epub::error::Result;

/// 单个条目允许的最大长度（2 GiB）
pub const MAX_ENTRY_LENGTH: u64 = i32::MAX as u64;

/// EPUB归档的条目访问接口
pub trait EpubArchive {
    /// 返回条目的未压缩长度，条目不存在时返回 `None`
    fn entry_length(&mut self, path: &str) -> Option<u64>;

    /// 打开条目的读取流
    fn open_entry(&mut self, path: &str) -> Result<Box<dyn Read + '_>>;

    /// 读取条目的全部内容
    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut reader = self.open_entry(path)?;
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

impl<R: Read + Seek> EpubArchive for ZipArchive<R> {
    fn entry_length(&mut self, path: &str) -> Option<u64> {
        self.by_name(path).ok().map(|file| file.size())
    }

    fn open_entry(&mut self, path: &str) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.by_name(path)?))
    }
}

/// 内存中的归档
///
/// 主要用于测试；条目可以声明一个与实际内容不同的长度，以模拟超大文件。
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: HashMap<String, (Vec<u8>, u64)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加条目
    pub fn add_entry(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> &mut Self {
        let content = content.into();
        let length = content.len() as u64;
        self.entries.insert(path.into(), (content, length));
        self
    }

    /// 添加条目并声明其长度
    pub fn add_entry_with_length(
        &mut self,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
        declared_length: u64,
    ) -> &mut Self {
        self.entries.insert(path.into(), (content.into(), declared_length));
        self
    }

    pub fn with_entry(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.add_entry(path, content);
        self
    }
}

impl EpubArchive for MemoryArchive {
    fn entry_length(&mut self, path: &str) -> Option<u64> {
        self.entries.get(path).map(|(_, length)| *length)
    }

    fn open_entry(&mut self, path: &str) -> Result<Box<dyn Read + '_>> {
        match self.entries.get(path) {
            Some((content, _)) => Ok(Box::new(Cursor::new(content.as_slice()))),
            None => Err(zip::result::ZipError::FileNotFound.into()),
        }
    }
}
