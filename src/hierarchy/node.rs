//! Arena-based UI element tree
//!
//! One `HierarchySnapshot` owns every node of one inspected screen. Nodes are
//! addressed by index and store a parent index plus ordered child indices, so
//! the tree can be walked in both directions without ownership cycles. A
//! snapshot is never mutated after capture.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Index of a node inside its snapshot's arena
pub type NodeId = usize;

/// Source platform of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

/// Screen-coordinate bounds of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Get the center point of the bounds
    pub fn center(&self) -> (i32, i32) {
        let x = (self.left + self.right) / 2;
        let y = (self.top + self.bottom) / 2;
        (x, y)
    }

    /// Check if this bounds contains another bounds entirely
    pub fn contains(&self, other: &Bounds) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// Parse bounds from string like "[0,0][1080,1920]"
    pub fn from_string(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split("][").collect();
        if parts.len() != 2 {
            return None;
        }

        let left_top = parts[0].trim_start_matches('[');
        let right_bottom = parts[1].trim_end_matches(']');

        let lt: Vec<i32> = left_top.split(',').filter_map(|s| s.parse().ok()).collect();
        let rb: Vec<i32> = right_bottom
            .split(',')
            .filter_map(|s| s.parse().ok())
            .collect();

        if lt.len() == 2 && rb.len() == 2 {
            Some(Bounds {
                left: lt[0],
                top: lt[1],
                right: rb[0],
                bottom: rb[1],
            })
        } else {
            None
        }
    }
}

/// One UI element inside a snapshot
#[derive(Debug, Clone)]
pub struct ElementNode {
    /// Platform type name (e.g. "android.widget.Button", "XCUIElementTypeButton")
    pub type_name: String,
    /// Stable identifier (resource-id / accessibility identifier)
    pub stable_id: Option<String>,
    /// Accessibility label / content description
    pub label: Option<String>,
    /// Visible text
    pub text: Option<String>,
    pub bounds: Bounds,
    pub enabled: bool,
    pub visible: bool,
    pub interactable: bool,
    /// Parent arena index; `None` for the root
    pub parent: Option<NodeId>,
    /// Child arena indices, in on-screen order
    pub children: Vec<NodeId>,
}

impl ElementNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            stable_id: None,
            label: None,
            text: None,
            bounds: Bounds::default(),
            enabled: true,
            visible: true,
            interactable: false,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Immutable tree of elements captured from one screen
#[derive(Debug, Clone)]
pub struct HierarchySnapshot {
    nodes: Vec<ElementNode>,
    pub platform: Platform,
    pub captured_at: DateTime<Utc>,
    /// Screen / route name supplied by the capturing collaborator
    pub screen: String,
}

impl HierarchySnapshot {
    pub fn new(platform: Platform, screen: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            platform,
            captured_at: Utc::now(),
            screen: screen.into(),
        }
    }

    /// Append a node under `parent` (or as root) and return its id.
    ///
    /// Used by the platform adapters while building; once the adapter hands
    /// the snapshot out it is treated as read-only.
    pub fn push_node(&mut self, parent: Option<NodeId>, mut node: ElementNode) -> NodeId {
        let id = self.nodes.len();
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&ElementNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in arena (pre-order insertion) order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Ancestor ids of `id`, root first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(p) = current {
            chain.push(p);
            current = self.node(p).and_then(|n| n.parent);
        }
        chain.reverse();
        chain
    }

    /// Position of `id` among its parent's children. Parentless nodes are
    /// ranked among themselves in arena order, so multiple roots still get
    /// distinct positions.
    pub fn sibling_index(&self, id: NodeId) -> usize {
        match self.node(id).and_then(|n| n.parent) {
            Some(p) => self.nodes[p]
                .children
                .iter()
                .position(|&c| c == id)
                .unwrap_or(0),
            None => self
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.parent.is_none())
                .position(|(i, _)| i == id)
                .unwrap_or(0),
        }
    }

    /// Number of ancestors above `id`
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Coarse types of the ancestors of `id`, root first
    pub fn ancestor_coarse_types(&self, id: NodeId) -> Vec<String> {
        self.ancestors(id)
            .iter()
            .filter_map(|&a| self.node(a))
            .map(|n| coarse_type(&n.type_name))
            .collect()
    }
}

/// Syntactic short form of a platform type name.
///
/// "android.widget.Button" -> "Button", "XCUIElementTypeButton" -> "Button".
/// Used for path candidates, where the exact (but package-free) type matters.
pub fn short_type(type_name: &str) -> &str {
    let last = type_name.rsplit('.').next().unwrap_or(type_name);
    last.strip_prefix("XCUIElementType").unwrap_or(last)
}

/// Semantic coarse type of a platform type name.
///
/// Maps both native vocabularies onto one small set so signatures captured on
/// either platform compare the same way.
pub fn coarse_type(type_name: &str) -> String {
    let short = short_type(type_name);
    let lower = short.to_lowercase();
    if lower.contains("button") {
        "Button".to_string()
    } else if lower.contains("edittext") || lower.contains("textfield") || lower.contains("input") {
        "Input".to_string()
    } else if lower.contains("textview")
        || lower.contains("statictext")
        || lower.contains("label")
        || lower == "text"
    {
        "Text".to_string()
    } else if lower.contains("image") || lower.contains("icon") {
        "Image".to_string()
    } else if lower.contains("checkbox") {
        "Checkbox".to_string()
    } else if lower.contains("switch") || lower.contains("toggle") {
        "Switch".to_string()
    } else if lower.contains("spinner") || lower.contains("picker") || lower.contains("dropdown") {
        "Dropdown".to_string()
    } else if lower.contains("recyclerview")
        || lower.contains("listview")
        || lower.contains("table")
        || lower.contains("collectionview")
        || lower == "list"
    {
        "List".to_string()
    } else if lower.contains("cell") || lower.contains("listitem") {
        "Cell".to_string()
    } else {
        short.to_string()
    }
}

/// Whether elements of this coarse type carry meaningful visible text
pub fn is_text_bearing(coarse: &str) -> bool {
    matches!(
        coarse,
        "Text" | "Button" | "Input" | "Checkbox" | "Switch" | "Dropdown" | "Cell"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> HierarchySnapshot {
        let mut snap = HierarchySnapshot::new(Platform::Android, "login");
        let root = snap.push_node(None, ElementNode::new("android.widget.FrameLayout"));
        let form = snap.push_node(Some(root), ElementNode::new("android.widget.LinearLayout"));
        snap.push_node(Some(form), ElementNode::new("android.widget.EditText"));
        snap.push_node(Some(form), ElementNode::new("android.widget.Button"));
        snap
    }

    #[test]
    fn test_push_node_links_parent_and_children() {
        let snap = sample_snapshot();
        assert_eq!(snap.len(), 4);
        assert_eq!(snap.node(1).unwrap().parent, Some(0));
        assert_eq!(snap.node(1).unwrap().children, vec![2, 3]);
        assert_eq!(snap.node(3).unwrap().parent, Some(1));
    }

    #[test]
    fn test_ancestors_root_first() {
        let snap = sample_snapshot();
        assert_eq!(snap.ancestors(3), vec![0, 1]);
        assert!(snap.ancestors(0).is_empty());
        assert_eq!(snap.depth(3), 2);
    }

    #[test]
    fn test_sibling_index() {
        let snap = sample_snapshot();
        assert_eq!(snap.sibling_index(2), 0);
        assert_eq!(snap.sibling_index(3), 1);
        assert_eq!(snap.sibling_index(0), 0);
    }

    #[test]
    fn test_sibling_index_distinguishes_multiple_roots() {
        let mut snap = HierarchySnapshot::new(Platform::Ios, "list");
        snap.push_node(None, ElementNode::new("Button"));
        snap.push_node(None, ElementNode::new("Button"));
        let child = snap.push_node(Some(1), ElementNode::new("StaticText"));
        snap.push_node(None, ElementNode::new("Button"));

        assert_eq!(snap.sibling_index(0), 0);
        assert_eq!(snap.sibling_index(1), 1);
        assert_eq!(snap.sibling_index(3), 2);
        assert_eq!(snap.sibling_index(child), 0);
    }

    #[test]
    fn test_short_type() {
        assert_eq!(short_type("android.widget.Button"), "Button");
        assert_eq!(short_type("XCUIElementTypeStaticText"), "StaticText");
        assert_eq!(short_type("View"), "View");
    }

    #[test]
    fn test_coarse_type_cross_platform() {
        assert_eq!(coarse_type("android.widget.Button"), "Button");
        assert_eq!(coarse_type("XCUIElementTypeButton"), "Button");
        assert_eq!(coarse_type("android.widget.TextView"), "Text");
        assert_eq!(coarse_type("XCUIElementTypeStaticText"), "Text");
        assert_eq!(coarse_type("android.widget.EditText"), "Input");
        assert_eq!(coarse_type("XCUIElementTypeTextField"), "Input");
        assert_eq!(coarse_type("androidx.recyclerview.widget.RecyclerView"), "List");
    }

    #[test]
    fn test_bounds_parse_and_center() {
        let b = Bounds::from_string("[0,0][100,200]").unwrap();
        assert_eq!(b.center(), (50, 100));
        assert!(Bounds::from_string("not-bounds").is_none());
    }
}
