pub mod epub;

// === 核心API重新导出 ===

/// EPUB文件读取器（主要接口）
pub use epub::Epub;

/// 错误处理
pub use epub::{EpubError, Result};

/// 读取选项
pub use epub::{ReaderOptions, ReaderOptionsPreset};

// === 结构与导航 ===

pub use epub::{Schema, SchemaReader};
pub use epub::{EpubVersion, Package};
pub use epub::{NavDocument, Ncx, Smil};
pub use epub::{NavigationItemRef, NavigationLink, format_navigation_tree};

// === 内容 ===

pub use epub::{ContentRef, LocalByteContentFileRef, LocalTextContentFileRef};

/// 归档抽象（高级用法）
pub use epub::{EpubArchive, MemoryArchive};

// === 库信息 ===

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库的描述
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

// === 便捷函数 ===

/// 使用默认选项快速打开EPUB文件
///
/// 这是 `Epub::open` 的便捷包装函数。
///
/// # 参数
/// * `path` - EPUB文件路径
///
/// # 返回值
/// * `Result<Option<Epub>>` - EPUB实例，没有可用的OPF包时为 `None`
///
/// # 示例
///
/// ```no_run
/// let epub = epubforge::open("book.epub")?;
/// if let Some(epub) = epub {
///     println!("书名: {}", epub.title().unwrap_or("<无>"));
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Option<Epub>> {
    Epub::open(path, ReaderOptions::default())
}
