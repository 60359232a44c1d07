//! NCX导航元素数据结构定义
//!
//! 定义NCX文件中的各种导航元素，包括导航点、导航标签、内容引用等。

/// head中的一个meta元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NcxMeta {
    pub name: String,
    pub content: String,
    pub scheme: Option<String>,
}

/// NCX头部信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NcxHead {
    pub items: Vec<NcxMeta>,
}

impl NcxHead {
    /// 按名称获取meta内容
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|meta| meta.name == name)
            .map(|meta| meta.content.as_str())
    }

    /// 唯一标识符（dtb:uid）
    pub fn uid(&self) -> Option<&str> {
        self.get("dtb:uid")
    }

    /// 导航深度（dtb:depth）
    pub fn depth(&self) -> Option<u32> {
        self.get("dtb:depth").and_then(|depth| depth.trim().parse().ok())
    }

    /// 总页数（dtb:totalPageCount）
    pub fn total_page_count(&self) -> Option<u32> {
        self.get("dtb:totalPageCount").and_then(|count| count.trim().parse().ok())
    }
}

/// 导航标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLabel {
    /// 标签文本
    pub text: String,
}

/// 导航内容引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NcxContent {
    pub id: Option<String>,
    /// 源文件路径（已做百分号解码，可带锚点）
    pub source: String,
}

/// 导航点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPoint {
    /// 唯一标识符
    pub id: String,
    /// CSS类名（可选）
    pub class: Option<String>,
    /// 播放顺序（原样保留）
    pub play_order: Option<String>,
    pub navigation_labels: Vec<NavigationLabel>,
    /// 内容引用
    pub content: NcxContent,
    /// 子导航点
    pub child_navigation_points: Vec<NavigationPoint>,
}

impl NavigationPoint {
    /// 播放顺序的数值
    pub fn play_order_number(&self) -> Option<u32> {
        self.play_order.as_deref().and_then(|order| order.trim().parse().ok())
    }

    /// 第一个标签的文本
    pub fn title(&self) -> Option<&str> {
        self.navigation_labels.first().map(|label| label.text.as_str())
    }

    /// 获取所有导航点（包括子导航点）的平铺列表
    pub fn all_navigation_points(&self) -> Vec<&NavigationPoint> {
        let mut points = vec![self];
        for child in &self.child_navigation_points {
            points.extend(child.all_navigation_points());
        }
        points
    }
}

/// 导航地图
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationMap {
    pub items: Vec<NavigationPoint>,
}

/// 页面目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTargetType {
    Front,
    Normal,
    Special,
    Unknown,
}

impl PageTargetType {
    /// 解析type属性，无法识别的值一律视为 `Unknown`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "front" => Self::Front,
            "normal" => Self::Normal,
            "special" => Self::Special,
            _ => Self::Unknown,
        }
    }
}

/// 页面目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub id: Option<String>,
    pub value: Option<String>,
    pub target_type: PageTargetType,
    pub class: Option<String>,
    pub play_order: Option<String>,
    pub navigation_labels: Vec<NavigationLabel>,
    pub content: Option<NcxContent>,
}

/// 页面列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageList {
    pub id: Option<String>,
    pub class: Option<String>,
    pub navigation_labels: Vec<NavigationLabel>,
    pub items: Vec<PageTarget>,
}

/// 导航目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub id: String,
    pub class: Option<String>,
    pub value: Option<String>,
    pub play_order: Option<String>,
    pub navigation_labels: Vec<NavigationLabel>,
    pub content: Option<NcxContent>,
}

/// 导航列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationList {
    pub id: Option<String>,
    pub class: Option<String>,
    pub navigation_labels: Vec<NavigationLabel>,
    pub navigation_targets: Vec<NavigationTarget>,
}

/// NCX文件解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ncx {
    /// NCX文件在归档中的路径
    pub file_path: String,
    pub head: NcxHead,
    pub doc_title: Option<String>,
    pub doc_authors: Vec<String>,
    pub navigation_map: NavigationMap,
    pub page_list: Option<PageList>,
    pub navigation_lists: Vec<NavigationList>,
}

impl Ncx {
    /// 获取所有导航点的平铺列表（深度优先）
    pub fn all_navigation_points(&self) -> Vec<&NavigationPoint> {
        self.navigation_map
            .items
            .iter()
            .flat_map(|point| point.all_navigation_points())
            .collect()
    }

    /// 按ID查找导航点
    pub fn find_navigation_point_by_id(&self, id: &str) -> Option<&NavigationPoint> {
        self.all_navigation_points().into_iter().find(|point| point.id == id)
    }
}
