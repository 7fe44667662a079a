//! Minimal owned node tree for component content.
//!
//! Templates are parsed with `scraper` once and converted into this owned
//! representation so rendered views can be deep-cloned, mutated (attribute
//! binding) and serialized without holding on to the parser's arena.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A node of a rendered fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    fn find_first(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        find_in(&self.children, tag)
    }

    fn find_first_mut(&mut self, tag: &str) -> Option<&mut Element> {
        if self.tag == tag {
            return Some(self);
        }
        find_in_mut(&mut self.children, tag)
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_into(v, true, out);
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl Node {
    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text(t) => escape_into(t, false, out),
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Node::Text(t) => out.push_str(t),
        }
    }
}

/// An ordered list of sibling nodes, the unit a template clones into a view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First element with the given tag name in document order
    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        find_in(&self.nodes, tag)
    }

    pub fn find_first_mut(&mut self, tag: &str) -> Option<&mut Element> {
        find_in_mut(&mut self.nodes, tag)
    }

    /// Move all nodes of `other` to the end of this fragment
    pub fn append(&mut self, other: Fragment) {
        self.nodes.extend(other.nodes);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Serialize back to HTML markup
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    /// Concatenated text content
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }
}

fn find_in<'a>(nodes: &'a [Node], tag: &str) -> Option<&'a Element> {
    nodes.iter().find_map(|n| match n {
        Node::Element(el) => el.find_first(tag),
        Node::Text(_) => None,
    })
}

fn find_in_mut<'a>(nodes: &'a mut [Node], tag: &str) -> Option<&'a mut Element> {
    nodes.iter_mut().find_map(|n| match n {
        Node::Element(el) => el.find_first_mut(tag),
        Node::Text(_) => None,
    })
}

fn escape_into(s: &str, attr: bool, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attr => out.push_str("&lt;"),
            '>' if !attr => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn convert_children(parent: NodeRef<'_, scraper::Node>, out: &mut Vec<Node>) {
    for child in parent.children() {
        match child.value() {
            scraper::Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push(Node::Element(convert_element(child_el)));
                }
            }
            scraper::Node::Text(t) => {
                let s: &str = t;
                out.push(Node::Text(s.to_string()));
            }
            // <template> content lives under a fragment node; splice it in place
            scraper::Node::Fragment => convert_children(child, out),
            // Comments, doctypes and processing instructions are dropped
            _ => {}
        }
    }
}

fn convert_element(el: ElementRef<'_>) -> Element {
    let mut children = Vec::new();
    convert_children(*el, &mut children);
    Element {
        tag: el.value().name().to_string(),
        attrs: el
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
    }
}

/// Parse `html` as a fragment and return the content of its first `<template>`.
///
/// Returns `Ok(None)` when no `<template>` element is present.
pub fn extract_template(html: &str) -> Result<Option<Fragment>> {
    let document = Html::parse_fragment(html.trim());
    let template_sel = Selector::parse("template")
        .map_err(|e| Error::Other(format!("Invalid selector: {:?}", e)))?;

    Ok(document
        .select(&template_sel)
        .next()
        .map(|tpl| {
            let mut nodes = Vec::new();
            convert_children(*tpl, &mut nodes);
            Fragment::new(nodes)
        }))
}
