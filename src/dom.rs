//! A small mutable element arena for card documents
//!
//! The capture pipeline needs to mutate, clone, and re-flow a styled
//! subtree, so the crate owns its document model: elements live in an
//! index arena (tag, id, classes, attributes, text, inline styles, parent
//! link), and the document carries a flat rule list plus the viewport the
//! media conditions are evaluated against. Detached whole-document clones
//! stand in for the rasterizer's internal clone; subtree clones stand in
//! for the mobile offscreen copy.

use crate::style::{MediaQuery, StyleMap, StyleRule};
use crate::Viewport;

/// Index of an element inside its document arena
pub type NodeId = usize;

/// Style properties inherited down the tree when a node does not set them
const INHERITED: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "line-height",
    "letter-spacing",
    "text-align",
];

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    /// Direct text content of this element (children carry their own)
    pub text: String,
    pub style: StyleMap,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            text: String::new(),
            style: StyleMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    rules: Vec<StyleRule>,
    pub viewport: Viewport,
}

impl Document {
    /// Create a document with a synthetic `body` root
    pub fn new(viewport: Viewport) -> Self {
        let body = Element::new("body");
        Document { nodes: vec![body], root: 0, rules: Vec::new(), viewport }
    }

    pub fn body(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Element {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id]
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        self.nodes.len() - 1
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Insert `new` into `parent` immediately before `reference`.
    /// Falls back to appending when the reference is not a child.
    pub fn insert_before(&mut self, parent: NodeId, new: NodeId, reference: NodeId) {
        self.detach(new);
        self.nodes[new].parent = Some(parent);
        let children = &mut self.nodes[parent].children;
        match children.iter().position(|&c| c == reference) {
            Some(pos) => children.insert(pos, new),
            None => children.push(new),
        }
    }

    /// Detach a node from its parent. The arena slot stays live so other
    /// NodeIds remain valid; a detached node is simply unreachable.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node].parent.take() {
            self.nodes[parent].children.retain(|&c| c != node);
        }
    }

    /// Depth-first walk of a subtree in document order
    pub fn walk(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// First element with the given id, in document order
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.walk(self.root)
            .into_iter()
            .find(|&n| self.nodes[n].id.as_deref() == Some(id))
    }

    /// First descendant of `scope` matching the selector (scope excluded)
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let sel = crate::style::Selector::parse(selector);
        self.walk(scope).into_iter().skip(1).find(|&n| {
            let el = &self.nodes[n];
            sel.matches(&el.tag, el.id.as_deref(), &el.classes)
        })
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let sel = crate::style::Selector::parse(selector);
        self.walk(scope)
            .into_iter()
            .skip(1)
            .filter(|&n| {
                let el = &self.nodes[n];
                sel.matches(&el.tag, el.id.as_deref(), &el.classes)
            })
            .collect()
    }

    /// Concatenated text of a subtree, document order
    pub fn text_content(&self, from: NodeId) -> String {
        self.walk(from)
            .into_iter()
            .map(|n| self.nodes[n].text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn add_rule(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// The cascade for a single node without inheritance:
    /// matching rules in order, inline styles, then important rules, then
    /// important inline declarations.
    fn cascade(&self, node: NodeId) -> StyleMap {
        let el = &self.nodes[node];
        let mut out = StyleMap::new();
        let matching: Vec<&StyleRule> = self
            .rules
            .iter()
            .filter(|r| {
                r.media.map(|m| m.applies(self.viewport.width)).unwrap_or(true)
                    && r.selector.matches(&el.tag, el.id.as_deref(), &el.classes)
            })
            .collect();

        for rule in &matching {
            for (prop, decl) in rule.decls.iter() {
                if !decl.important {
                    out.set(prop, &decl.value);
                }
            }
        }
        for (prop, decl) in el.style.iter() {
            if !decl.important {
                out.set(prop, &decl.value);
            }
        }
        for rule in &matching {
            for (prop, decl) in rule.decls.iter() {
                if decl.important {
                    out.set_important(prop, &decl.value);
                }
            }
        }
        for (prop, decl) in el.style.iter() {
            if decl.important {
                out.set_important(prop, &decl.value);
            }
        }
        out
    }

    /// Resolved style for a node, with inherited properties filled in from
    /// the ancestor chain.
    pub fn computed_style(&self, node: NodeId) -> StyleMap {
        let mut resolved = self.cascade(node);
        let mut cursor = self.nodes[node].parent;
        while let Some(ancestor) = cursor {
            let ancestor_style = self.cascade(ancestor);
            for prop in INHERITED {
                if resolved.get(prop).is_none() {
                    if let Some(value) = ancestor_style.get(prop) {
                        resolved.set(prop, value);
                    }
                }
            }
            cursor = self.nodes[ancestor].parent;
        }
        resolved
    }

    /// True when the node or an ancestor is `display: none`
    pub fn is_hidden(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if self.cascade(id).get("display") == Some("none") {
                return true;
            }
            cursor = self.nodes[id].parent;
        }
        false
    }

    /// Deep-clone a subtree under a new parent within this document
    pub fn clone_subtree(&mut self, node: NodeId, new_parent: NodeId) -> NodeId {
        let cloned = self.clone_into_self(node);
        self.append_child(new_parent, cloned);
        cloned
    }

    fn clone_into_self(&mut self, node: NodeId) -> NodeId {
        let mut copy = self.nodes[node].clone();
        let children = std::mem::take(&mut copy.children);
        copy.parent = None;
        self.nodes.push(copy);
        let new_id = self.nodes.len() - 1;
        for child in children {
            let new_child = self.clone_into_self(child);
            self.nodes[new_child].parent = Some(new_id);
            self.nodes[new_id].children.push(new_child);
        }
        new_id
    }

    /// Detached whole-document clone with its own viewport, the analog of
    /// the rasterizer's internal clone.
    pub fn clone_detached(&self, viewport: Viewport) -> Document {
        let mut clone = self.clone();
        clone.viewport = viewport;
        clone
    }

    /// Serialize a subtree as markup (used by the SVG export path).
    /// Inline styles only; rule-derived styling must be baked onto the
    /// elements first.
    pub fn serialize(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(node, &mut out);
        out
    }

    fn serialize_into(&self, node: NodeId, out: &mut String) {
        let el = &self.nodes[node];
        out.push('<');
        out.push_str(&el.tag);
        if let Some(id) = &el.id {
            out.push_str(&format!(" id=\"{}\"", escape_attr(id)));
        }
        if !el.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape_attr(&el.classes.join(" "))));
        }
        for (name, value) in &el.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
        }
        if !el.style.is_empty() {
            out.push_str(&format!(" style=\"{}\"", escape_attr(&el.style.to_css())));
        }
        out.push('>');
        out.push_str(&escape_text(&el.text));
        for &child in &el.children {
            self.serialize_into(child, out);
        }
        out.push_str(&format!("</{}>", el.tag));
    }
}

fn escape_text(input: &str) -> String {
    input.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}

/// Convenience: add a plain rule from (property, value) pairs
pub fn rule(selector: &str, decls: &[(&str, &str)]) -> StyleRule {
    let mut map = StyleMap::new();
    for (prop, value) in decls {
        map.set(prop, value);
    }
    StyleRule::new(selector, map)
}

/// Convenience: add a max-width media rule from (property, value) pairs
pub fn media_rule(selector: &str, max_width: u32, decls: &[(&str, &str)]) -> StyleRule {
    let mut map = StyleMap::new();
    for (prop, value) in decls {
        map.set(prop, value);
    }
    StyleRule::with_media(selector, map, MediaQuery::MaxWidth(max_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(Viewport { width: 1280, height: 720 })
    }

    #[test]
    fn tree_ops_preserve_document_order() {
        let mut d = doc();
        let a = d.create_element("div");
        let b = d.create_element("div");
        let c = d.create_element("span");
        d.append_child(d.body(), a);
        d.append_child(a, b);
        d.append_child(a, c);
        let order = d.walk(d.body());
        assert_eq!(order, vec![d.body(), a, b, c]);

        let inserted = d.create_element("em");
        d.insert_before(a, inserted, c);
        assert_eq!(d.node(a).children, vec![b, inserted, c]);
    }

    #[test]
    fn get_element_by_id_returns_first_in_order() {
        let mut d = doc();
        let first = d.create_element("div");
        d.node_mut(first).id = Some("card".into());
        let second = d.create_element("div");
        d.node_mut(second).id = Some("card".into());
        d.append_child(d.body(), first);
        d.append_child(d.body(), second);
        assert_eq!(d.get_element_by_id("card"), Some(first));
    }

    #[test]
    fn computed_style_cascade_and_inheritance() {
        let mut d = doc();
        d.add_rule(rule("card", &[("color", "#333333"), ("padding", "40px")]));
        let card = d.create_element("card");
        let text = d.create_element("div");
        d.append_child(d.body(), card);
        d.append_child(card, text);

        // color inherits, padding does not
        let cs = d.computed_style(text);
        assert_eq!(cs.get("color"), Some("#333333"));
        assert_eq!(cs.get("padding"), None);

        // inline beats rule, important rule beats inline
        d.node_mut(card).style.set("color", "#000000");
        assert_eq!(d.computed_style(card).get("color"), Some("#000000"));
        let mut important = StyleMap::new();
        important.set_important("color", "#ff0000");
        d.add_rule(StyleRule::new("card", important));
        assert_eq!(d.computed_style(card).get("color"), Some("#ff0000"));
    }

    #[test]
    fn media_rules_follow_the_viewport() {
        let mut d = doc();
        d.add_rule(media_rule("div", 768, &[("transform", "scale(0.4)")]));
        let el = d.create_element("div");
        d.append_child(d.body(), el);
        assert_eq!(d.computed_style(el).get("transform"), None);

        let narrow = d.clone_detached(Viewport { width: 375, height: 667 });
        assert_eq!(narrow.computed_style(el).get("transform"), Some("scale(0.4)"));
    }

    #[test]
    fn subtree_clone_is_deep_and_detachable() {
        let mut d = doc();
        let a = d.create_element("div");
        let b = d.create_element("span");
        d.node_mut(b).text = "hi".into();
        d.append_child(d.body(), a);
        d.append_child(a, b);

        let holder = d.create_element("div");
        d.append_child(d.body(), holder);
        let copy = d.clone_subtree(a, holder);
        assert_ne!(copy, a);
        assert_eq!(d.text_content(copy), "hi");

        // mutating the clone leaves the original alone
        let copy_child = d.node(copy).children[0];
        d.node_mut(copy_child).text = "bye".into();
        assert_eq!(d.text_content(a), "hi");

        d.detach(holder);
        assert!(!d.walk(d.body()).contains(&copy));
    }

    #[test]
    fn serialize_escapes_text_and_attributes() {
        let mut d = doc();
        let el = d.create_element("div");
        d.node_mut(el).text = "a < b & c".into();
        d.node_mut(el).style.set("color", "#fff");
        d.append_child(d.body(), el);
        let markup = d.serialize(el);
        assert!(markup.contains("a &lt; b &amp; c"));
        assert!(markup.contains("style=\"color: #fff;\""));
    }
}
