//! Pluggable semantic element classifier
//!
//! The engine consumes only this interface; the model behind it (if any) is
//! a collaborator's concern. When no classifier is injected the no-op default
//! keeps healing fully functional with the base similarity weights.

use crate::hierarchy::{Bounds, HierarchySnapshot, NodeId};

/// Attribute subset handed to the classifier
#[derive(Debug, Clone, Default)]
pub struct ElementAttributes {
    pub type_name: String,
    pub stable_id: Option<String>,
    pub label: Option<String>,
    pub text: Option<String>,
    pub bounds: Bounds,
    pub enabled: bool,
    pub interactable: bool,
}

impl ElementAttributes {
    /// Extract the attributes of `id` from `snapshot`
    pub fn from_node(snapshot: &HierarchySnapshot, id: NodeId) -> Option<Self> {
        let node = snapshot.node(id)?;
        Some(Self {
            type_name: node.type_name.clone(),
            stable_id: node.stable_id.clone(),
            label: node.label.clone(),
            text: node.text.clone(),
            bounds: node.bounds,
            enabled: node.enabled,
            interactable: node.interactable,
        })
    }
}

/// Predicted semantic type with model confidence in [0, 1]
#[derive(Debug, Clone)]
pub struct Classification {
    pub semantic_type: String,
    pub score: f64,
}

/// Optional semantic-type predictor, used as a tie-break signal during
/// generation and healing
pub trait ElementClassifier: Send + Sync {
    /// `None` means the classifier has no opinion on this element
    fn classify(&self, attributes: &ElementAttributes) -> Option<Classification>;
}

/// Default classifier with no opinion; healing then runs on the base
/// similarity weights alone
#[derive(Debug, Default)]
pub struct NoopClassifier;

impl ElementClassifier for NoopClassifier {
    fn classify(&self, _attributes: &ElementAttributes) -> Option<Classification> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{ElementNode, Platform};

    #[test]
    fn test_noop_has_no_opinion() {
        let c = NoopClassifier;
        assert!(c.classify(&ElementAttributes::default()).is_none());
    }

    #[test]
    fn test_attributes_from_node() {
        let mut snap = HierarchySnapshot::new(Platform::Ios, "login");
        let mut btn = ElementNode::new("Button");
        btn.label = Some("Log In".to_string());
        btn.interactable = true;
        let id = snap.push_node(None, btn);

        let attrs = ElementAttributes::from_node(&snap, id).unwrap();
        assert_eq!(attrs.type_name, "Button");
        assert_eq!(attrs.label.as_deref(), Some("Log In"));
        assert!(attrs.interactable);
        assert!(ElementAttributes::from_node(&snap, 99).is_none());
    }
}
