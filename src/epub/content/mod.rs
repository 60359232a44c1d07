//! 内容文件模块
//!
//! 内容文件引用、内容集合以及根据清单建立内容映射的读取器。

mod collection;
mod file;
mod loader;
mod reader;

pub use collection::ContentCollection;
pub use file::{
    AnyLocalContentFileRef, AnyRemoteContentFileRef, ByteContent, ContentFileMetadata, ContentKind, ContentLoader,
    ContentType, LocalByteContentFileRef, LocalContentFile, LocalContentFileRef, LocalTextContentFileRef,
    RemoteByteContentFileRef, RemoteContentFile, RemoteContentFileRef, RemoteTextContentFileRef, TextContent,
};
pub use loader::{ArchiveContentLoader, ContentDownloader};
pub use reader::{AllContentCollection, ByteContentCollection, ContentReader, ContentRef, TextContentCollection};
