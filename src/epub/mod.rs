pub mod archive;
pub mod container;
pub mod content;
pub mod cover;
pub mod error;
pub mod nav;
pub mod navigation;
pub mod ncx;
pub mod opf;
pub mod options;
pub mod path;
pub mod reader;
pub mod schema;
pub mod semantics;
pub mod smil;
pub mod spine;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_support;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出EPUB读取器
pub use reader::Epub;
pub use schema::{Schema, SchemaReader};

// 重新导出归档
pub use archive::{EpubArchive, MemoryArchive};

// 重新导出选项
pub use options::{
    BookCoverReaderOptions, ContainerFileReaderOptions, ContentReaderOptions, NavDocumentReaderOptions,
    NavigationReaderOptions, NcxReaderOptions, PackageReaderOptions, ReaderOptions, ReaderOptionsPreset,
    SmilReaderOptions, SpineReaderOptions,
};

// 重新导出OPF相关
pub use opf::{EpubVersion, Manifest, ManifestItem, Metadata, Package, Spine, SpineItemRef};

// 重新导出导航相关
pub use nav::NavDocument;
pub use navigation::{NavigationItemRef, NavigationLink, format_navigation_tree};
pub use ncx::Ncx;
pub use smil::Smil;

// 重新导出内容相关
pub use content::{ContentDownloader, ContentRef, LocalByteContentFileRef, LocalTextContentFileRef};
