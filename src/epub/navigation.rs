//! 统一导航树
//!
//! EPUB 2使用NCX导航地图，EPUB 3使用导航文档中的 `toc` 导航。两者都被转换为
//! [`NavigationItemRef`] 树，每个链接节点都解析到HTML内容集合中的一个本地文件。

use crate::epub::content::{ContentRef, LocalTextContentFileRef};
use crate::epub::error::{EpubError, Result};
use crate::epub::nav::{Li, Nav, NavDocument, Ol};
use crate::epub::ncx::{NavigationPoint, Ncx};
use crate::epub::opf::EpubVersion;
use crate::epub::options::NavigationReaderOptions;
use crate::epub::path;
use crate::epub::schema::Schema;

/// 导航项指向的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLink {
    /// `#` 之前的部分
    pub content_file_url: String,
    /// `#` 之后的锚点
    pub anchor: Option<String>,
    /// 内容文件在归档中的绝对路径
    pub content_file_path: String,
}

impl NavigationLink {
    /// 拆分href并相对导航文件所在目录求出绝对路径
    ///
    /// # 参数
    /// * `href` - 已解码的链接地址，可带锚点
    /// * `base_directory_path` - NCX或导航文档所在目录
    pub fn new(href: &str, base_directory_path: &str) -> Self {
        let (content_file_url, anchor) = match href.split_once('#') {
            Some((url, anchor)) => (url, Some(anchor.to_string())),
            None => (href, None),
        };
        Self {
            content_file_url: content_file_url.to_string(),
            anchor,
            content_file_path: path::combine_str(base_directory_path, content_file_url),
        }
    }

    /// 带锚点的完整地址
    pub fn content_file_url_with_anchor(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}#{}", self.content_file_url, anchor),
            None => self.content_file_url.clone(),
        }
    }
}

/// 统一导航树中的一个节点
#[derive(Debug, Clone)]
pub enum NavigationItemRef {
    /// 指向某个HTML文件的链接
    Link {
        title: String,
        link: NavigationLink,
        html_content_file: LocalTextContentFileRef,
        nested_items: Vec<NavigationItemRef>,
    },
    /// 没有目标的标题
    Header {
        title: String,
        nested_items: Vec<NavigationItemRef>,
    },
}

impl NavigationItemRef {
    pub fn title(&self) -> &str {
        match self {
            Self::Link { title, .. } | Self::Header { title, .. } => title,
        }
    }

    pub fn nested_items(&self) -> &[NavigationItemRef] {
        match self {
            Self::Link { nested_items, .. } | Self::Header { nested_items, .. } => nested_items,
        }
    }

    pub fn link(&self) -> Option<&NavigationLink> {
        match self {
            Self::Link { link, .. } => Some(link),
            Self::Header { .. } => None,
        }
    }

    pub fn html_content_file(&self) -> Option<&LocalTextContentFileRef> {
        match self {
            Self::Link { html_content_file, .. } => Some(html_content_file),
            Self::Header { .. } => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link { .. })
    }

    /// 深度优先平铺整棵子树（包括自身）
    pub fn flatten(&self) -> Vec<&NavigationItemRef> {
        let mut items = vec![self];
        for item in self.nested_items() {
            items.extend(item.flatten());
        }
        items
    }
}

/// 导航树读取器
pub struct NavigationReader<'a> {
    options: &'a NavigationReaderOptions,
}

impl<'a> NavigationReader<'a> {
    pub fn new(options: &'a NavigationReaderOptions) -> Self {
        Self { options }
    }

    /// 根据EPUB版本从NCX或导航文档生成导航树
    ///
    /// # 参数
    /// * `schema` - 已读取的EPUB结构
    /// * `content` - 内容映射，用于解析链接目标
    ///
    /// # 返回值
    /// * `Result<Option<Vec<NavigationItemRef>>>` - 对应的导航来源不存在时返回 `None`
    pub fn get_navigation_items(
        &self,
        schema: &Schema,
        content: &ContentRef,
    ) -> Result<Option<Vec<NavigationItemRef>>> {
        if schema.package.epub_version == EpubVersion::Epub2 {
            return match &schema.ncx {
                Some(ncx) => self.items_from_ncx(ncx, content).map(Some),
                None => Ok(None),
            };
        }
        let Some(nav_document) = &schema.nav_document else {
            return Ok(None);
        };
        self.items_from_nav_document(nav_document, content)
    }

    /// 由NCX导航地图生成导航树
    pub fn items_from_ncx(&self, ncx: &Ncx, content: &ContentRef) -> Result<Vec<NavigationItemRef>> {
        let base_directory_path = path::directory_path(&ncx.file_path);
        self.read_navigation_points(&ncx.navigation_map.items, base_directory_path, content)
    }

    /// 由导航文档的 `toc` 导航生成导航树，没有 `toc` 导航时返回 `None`
    pub fn items_from_nav_document(
        &self,
        nav_document: &NavDocument,
        content: &ContentRef,
    ) -> Result<Option<Vec<NavigationItemRef>>> {
        let Some(toc_nav) = nav_document.toc_nav() else {
            tracing::debug!("导航文档中没有toc导航");
            return Ok(None);
        };
        let base_directory_path = path::directory_path(&nav_document.file_path);
        self.read_nav(toc_nav, base_directory_path, content).map(Some)
    }

    fn read_navigation_points(
        &self,
        points: &[NavigationPoint],
        base_directory_path: &str,
        content: &ContentRef,
    ) -> Result<Vec<NavigationItemRef>> {
        let mut items = Vec::new();
        for point in points {
            let title = match point.title() {
                Some(title) => title.to_string(),
                None if self.options.allow_epub2_navigation_items_with_empty_titles => String::new(),
                None => {
                    return Err(EpubError::ncx(format!("导航点 {} 至少需要一个导航标签", point.id)));
                }
            };

            let source = &point.content.source;
            if !path::is_local_path(source) {
                if self.options.skip_remote_navigation_items {
                    tracing::warn!("跳过指向远程资源的导航点: {}", source);
                    continue;
                }
                return Err(EpubError::ncx(format!("导航点的内容 {} 不能是远程资源", source)));
            }

            let link = NavigationLink::new(source, base_directory_path);
            let Some(html_content_file) = find_html_file(content, &link) else {
                if self.options.skip_navigation_items_referencing_missing_content {
                    tracing::warn!("跳过引用了缺失内容的导航点: {}", source);
                    continue;
                }
                return Err(EpubError::ncx(format!("导航点的内容 {} 不在清单中", source)));
            };

            let nested_items =
                self.read_navigation_points(&point.child_navigation_points, base_directory_path, content)?;
            items.push(NavigationItemRef::Link {
                title,
                link,
                html_content_file,
                nested_items,
            });
        }
        Ok(items)
    }

    fn read_nav(&self, nav: &Nav, base_directory_path: &str, content: &ContentRef) -> Result<Vec<NavigationItemRef>> {
        let items = self.read_ol(&nav.ol, base_directory_path, content)?;
        Ok(match &nav.head {
            Some(head) => vec![NavigationItemRef::Header {
                title: head.clone(),
                nested_items: items,
            }],
            None => items,
        })
    }

    fn read_ol(&self, ol: &Ol, base_directory_path: &str, content: &ContentRef) -> Result<Vec<NavigationItemRef>> {
        let mut items = Vec::new();
        for li in &ol.items {
            let title = li.display_title().to_string();
            let nested_items = match li.child_ol() {
                Some(child_ol) => self.read_ol(child_ol, base_directory_path, content)?,
                None => Vec::new(),
            };

            let href = match li {
                Li::Anchor { anchor, .. } => anchor.href.as_deref(),
                Li::Span { .. } => None,
            };
            let Some(href) = href else {
                items.push(NavigationItemRef::Header { title, nested_items });
                continue;
            };

            if !path::is_local_path(href) {
                if self.options.skip_remote_navigation_items {
                    tracing::warn!("跳过指向远程资源的导航项: {}", href);
                    continue;
                }
                return Err(EpubError::nav(format!("导航项的链接 {} 不能是远程资源", href)));
            }

            let link = NavigationLink::new(href, base_directory_path);
            let Some(html_content_file) = find_html_file(content, &link) else {
                if self.options.skip_navigation_items_referencing_missing_content {
                    tracing::warn!("跳过引用了缺失内容的导航项: {}", href);
                    continue;
                }
                return Err(EpubError::nav(format!("导航项的链接 {} 不在清单中", href)));
            };

            items.push(NavigationItemRef::Link {
                title,
                link,
                html_content_file,
                nested_items,
            });
        }
        Ok(items)
    }
}

fn find_html_file(content: &ContentRef, link: &NavigationLink) -> Option<LocalTextContentFileRef> {
    content
        .html
        .find_local_file_ref_by_file_path(&link.content_file_path)
        .cloned()
}

/// 按 `缩进 + 标题` 的格式打印导航树，每层缩进两个空格
pub fn format_navigation_tree(items: &[NavigationItemRef]) -> String {
    fn write_items(items: &[NavigationItemRef], depth: usize, output: &mut String) {
        for item in items {
            output.push_str(&"  ".repeat(depth));
            output.push_str(item.title());
            output.push('\n');
            write_items(item.nested_items(), depth + 1, output);
        }
    }

    let mut output = String::new();
    write_items(items, 0, &mut output);
    output
}
