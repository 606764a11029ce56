//! Android UI hierarchy adapter
//!
//! Parses the XML produced by `uiautomator dump` into a [`HierarchySnapshot`].
//! Nesting is preserved: each `<node>` start pushes onto a parent stack so the
//! arena ends up with real parent/child links, which the path candidates need.

use anyhow::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::sync::LazyLock;

use super::node::{Bounds, ElementNode, HierarchySnapshot, NodeId, Platform};

static DECIMAL_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());
static HEX_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#x([0-9A-Fa-f]+);").unwrap());

/// Decode common HTML entities in a string
/// Handles: &amp; &lt; &gt; &quot; &apos; &#NNN; (decimal) &#xHHH; (hex)
fn decode_html_entities(s: &str) -> String {
    let mut result = s.to_string();

    // Named entities
    result = result.replace("&amp;", "&");
    result = result.replace("&lt;", "<");
    result = result.replace("&gt;", ">");
    result = result.replace("&quot;", "\"");
    result = result.replace("&apos;", "'");
    result = result.replace("&nbsp;", " ");

    result = DECIMAL_ENTITY
        .replace_all(&result, |caps: &regex::Captures| {
            if let Ok(code) = caps[1].parse::<u32>() {
                if let Some(c) = char::from_u32(code) {
                    return c.to_string();
                }
            }
            caps[0].to_string()
        })
        .to_string();

    result = HEX_ENTITY
        .replace_all(&result, |caps: &regex::Captures| {
            if let Ok(code) = u32::from_str_radix(&caps[1], 16) {
                if let Some(c) = char::from_u32(code) {
                    return c.to_string();
                }
            }
            caps[0].to_string()
        })
        .to_string();

    result
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse a uiautomator XML dump into a snapshot for the given screen name
pub fn parse_hierarchy(xml: &str, screen: &str) -> Result<HierarchySnapshot> {
    let mut snapshot = HierarchySnapshot::new(Platform::Android, screen);
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut open_elements = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"node" {
                    let id = snapshot.push_node(stack.last().copied(), node_from_attrs(e)?);
                    stack.push(id);
                }
                open_elements += 1;
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"node" => {
                snapshot.push_node(stack.last().copied(), node_from_attrs(e)?);
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"node" {
                    stack.pop();
                }
                open_elements = open_elements.saturating_sub(1);
            }
            // quick-xml reports EOF inside a truncated document as a plain
            // Eof event, so unclosed elements have to be caught here
            Ok(Event::Eof) => {
                if open_elements > 0 {
                    anyhow::bail!(
                        "truncated XML at byte {}: {} unclosed element(s)",
                        reader.buffer_position(),
                        open_elements
                    );
                }
                break;
            }
            Err(e) => anyhow::bail!(
                "XML parse error at byte {}: {:?}",
                reader.buffer_position(),
                e
            ),
            _ => {}
        }
        buf.clear();
    }

    Ok(snapshot)
}

fn node_from_attrs(e: &quick_xml::events::BytesStart<'_>) -> Result<ElementNode> {
    let mut node = ElementNode::new("android.view.View");

    for attr in e.attributes().filter_map(|a| a.ok()) {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let value = String::from_utf8_lossy(&attr.value);

        match key.as_ref() {
            "class" => {
                if !value.is_empty() {
                    node.type_name = value.to_string();
                }
            }
            "text" => node.text = non_empty(decode_html_entities(&value)),
            "resource-id" => node.stable_id = non_empty(value.to_string()),
            "content-desc" => node.label = non_empty(decode_html_entities(&value)),
            "bounds" => {
                if let Some(b) = Bounds::from_string(&value) {
                    node.bounds = b;
                }
            }
            "clickable" => node.interactable = value == "true",
            "enabled" => node.enabled = value == "true",
            "visible-to-user" => node.visible = value == "true",
            _ => {}
        }
    }

    Ok(node)
}
