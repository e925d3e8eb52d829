//! Point-in-time capture of the card's capture-sensitive inline styles
//!
//! The orchestrator mutates exactly four inline properties to put the card
//! into a canonical capture state; the snapshot records their prior values
//! (including absence) and puts back exactly those four, nothing else.

use crate::dom::{Document, NodeId};
use crate::Result;

/// Inline values of the four tracked properties; `None` means the
/// property was not set inline.
#[derive(Debug, Clone, PartialEq)]
pub struct CardStyleSnapshot {
    pub transform: Option<String>,
    pub box_shadow: Option<String>,
    pub position: Option<String>,
    pub z_index: Option<String>,
}

/// Read the tracked properties. No side effects.
pub fn capture(doc: &Document, node: NodeId) -> CardStyleSnapshot {
    let style = &doc.node(node).style;
    CardStyleSnapshot {
        transform: style.get("transform").map(str::to_string),
        box_shadow: style.get("box-shadow").map(str::to_string),
        position: style.get("position").map(str::to_string),
        z_index: style.get("z-index").map(str::to_string),
    }
}

/// Write the tracked properties back verbatim; properties that were
/// absent at capture time are removed again.
pub fn restore(doc: &mut Document, node: NodeId, snapshot: &CardStyleSnapshot) {
    let style = &mut doc.node_mut(node).style;
    let pairs = [
        ("transform", &snapshot.transform),
        ("box-shadow", &snapshot.box_shadow),
        ("position", &snapshot.position),
        ("z-index", &snapshot.z_index),
    ];
    for (property, value) in pairs {
        match value {
            Some(v) => style.set(property, v),
            None => {
                style.remove(property);
            }
        }
    }
}

/// Put the card into the canonical capture state
pub fn prepare_for_capture(doc: &mut Document, node: NodeId) {
    let style = &mut doc.node_mut(node).style;
    style.set("transform", "none");
    style.set("box-shadow", "none");
    style.set("position", "relative");
    style.set("z-index", "9999");
}

/// Scoped acquisition: capture, run the body, and always restore,
/// including on the error path.
pub fn with_captured_styles<T>(
    doc: &mut Document,
    node: NodeId,
    body: impl FnOnce(&mut Document) -> Result<T>,
) -> Result<T> {
    let snapshot = capture(doc, node);
    let result = body(doc);
    restore(doc, node, &snapshot);
    result
}
