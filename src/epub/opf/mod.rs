//! OPF（Open Packaging Format）文件解析模块
//!
//! 此模块提供EPUB文件中OPF包文件的解析功能，包括元数据、清单、脊柱和指南的提取。

mod manifest;
mod metadata;
mod parser;
mod spine;

// 重新导出公共类型
pub use manifest::{Manifest, ManifestItem};
pub use metadata::{Creator, Identifier, MetaItem, Metadata, MetadataDate};
pub use parser::{EpubVersion, OPF_NAMESPACE, Package, PackageReader};
pub use spine::{Guide, GuideReference, Spine, SpineItemRef};
