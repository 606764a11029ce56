//! iOS accessibility hierarchy adapter
//!
//! Converts the JSON emitted by `idb ui describe-all` into a
//! [`HierarchySnapshot`]. idb output varies between a single object, an array,
//! and line-delimited JSON; all three are handled.

use anyhow::Result;
use serde::Deserialize;

use super::node::{Bounds, ElementNode, HierarchySnapshot, NodeId, Platform};

/// Frame of an iOS UI element
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IosFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl IosFrame {
    fn to_bounds(&self) -> Bounds {
        Bounds {
            left: self.x as i32,
            top: self.y as i32,
            right: (self.x + self.width) as i32,
            bottom: (self.y + self.height) as i32,
        }
    }
}

/// Raw accessibility-tree element as reported by idb
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IosElement {
    /// Accessibility label
    #[serde(default, alias = "AXLabel")]
    pub label: Option<String>,

    /// Accessibility identifier
    #[serde(default, alias = "AXUniqueId")]
    pub identifier: Option<String>,

    /// Element type (e.g. "Button", "TextField", "StaticText")
    #[serde(rename = "type", default)]
    pub element_type: Option<String>,

    /// Accessibility value (visible text for many controls)
    #[serde(default, alias = "AXValue")]
    pub value: Option<String>,

    #[serde(default)]
    pub frame: IosFrame,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default)]
    pub children: Vec<IosElement>,
}

fn default_true() -> bool {
    true
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

/// Parse idb describe-all output into a snapshot for the given screen name
pub fn parse_hierarchy(json_output: &str, screen: &str) -> Result<HierarchySnapshot> {
    let roots = parse_elements(json_output)?;

    let mut snapshot = HierarchySnapshot::new(Platform::Ios, screen);
    match roots.as_slice() {
        [root] => {
            insert_element(&mut snapshot, None, root);
        }
        // array and line-delimited output carry no enclosing element, so
        // synthesize one to keep the snapshot single-rooted
        _ => {
            let root = snapshot.push_node(None, ElementNode::new("Application"));
            for element in &roots {
                insert_element(&mut snapshot, Some(root), element);
            }
        }
    }
    Ok(snapshot)
}

fn parse_elements(json_output: &str) -> Result<Vec<IosElement>> {
    // idb output can be a single object or array
    if let Ok(elements) = serde_json::from_str::<Vec<IosElement>>(json_output) {
        return Ok(elements);
    }

    if let Ok(element) = serde_json::from_str::<IosElement>(json_output) {
        return Ok(vec![element]);
    }

    // Fall back to line-by-line JSON
    let mut elements = Vec::new();
    for line in json_output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(element) = serde_json::from_str::<IosElement>(line) {
            elements.push(element);
        }
    }

    if elements.is_empty() {
        anyhow::bail!("Failed to parse UI hierarchy JSON");
    }

    Ok(elements)
}

fn insert_element(
    snapshot: &mut HierarchySnapshot,
    parent: Option<NodeId>,
    element: &IosElement,
) -> NodeId {
    let type_name = element
        .element_type
        .clone()
        .unwrap_or_else(|| "Other".to_string());

    let mut node = ElementNode::new(type_name);
    node.stable_id = non_empty(element.identifier.clone());
    node.label = non_empty(element.label.clone());
    node.text = non_empty(element.value.clone());
    node.bounds = element.frame.to_bounds();
    node.enabled = element.enabled;
    node.visible = element.visible;
    node.interactable = element.enabled && element.visible;

    let id = snapshot.push_node(parent, node);
    for child in &element.children {
        insert_element(snapshot, Some(id), child);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "type": "Application",
        "frame": {"x": 0, "y": 0, "width": 390, "height": 844},
        "children": [
            {
                "type": "Button",
                "AXLabel": "Log In",
                "AXUniqueId": "login_btn",
                "frame": {"x": 20, "y": 700, "width": 350, "height": 44},
                "enabled": true
            },
            {
                "type": "StaticText",
                "AXValue": "Welcome back",
                "frame": {"x": 20, "y": 100, "width": 350, "height": 30}
            }
        ]
    }"#;

    #[test]
    fn test_parse_single_object() {
        let snap = parse_hierarchy(TREE, "login").unwrap();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.node(0).unwrap().type_name, "Application");
        assert_eq!(snap.node(1).unwrap().parent, Some(0));
    }

    #[test]
    fn test_parse_maps_accessibility_fields() {
        let snap = parse_hierarchy(TREE, "login").unwrap();
        let btn = snap.node(1).unwrap();
        assert_eq!(btn.stable_id.as_deref(), Some("login_btn"));
        assert_eq!(btn.label.as_deref(), Some("Log In"));
        assert!(btn.interactable);

        let text = snap.node(2).unwrap();
        assert_eq!(text.text.as_deref(), Some("Welcome back"));
        assert_eq!(text.stable_id, None);
    }

    #[test]
    fn test_frame_to_bounds() {
        let snap = parse_hierarchy(TREE, "login").unwrap();
        let btn = snap.node(1).unwrap();
        assert_eq!(btn.bounds.left, 20);
        assert_eq!(btn.bounds.right, 370);
        assert_eq!(btn.bounds.bottom, 744);
    }

    #[test]
    fn test_parse_line_delimited_gets_single_root() {
        let lines = r#"{"type": "Button", "AXLabel": "A", "frame": {"x":0,"y":0,"width":10,"height":10}}
{"type": "Button", "AXLabel": "B", "frame": {"x":0,"y":10,"width":10,"height":10}}"#;
        let snap = parse_hierarchy(lines, "list").unwrap();
        assert_eq!(snap.len(), 3);
        // line-delimited elements become siblings under a synthesized root
        assert_eq!(snap.node(0).unwrap().type_name, "Application");
        assert_eq!(snap.node(1).unwrap().parent, Some(0));
        assert_eq!(snap.node(2).unwrap().parent, Some(0));
        assert_eq!(snap.sibling_index(2), 1);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_hierarchy("not json at all", "x").is_err());
    }
}
