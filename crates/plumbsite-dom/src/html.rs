//! Loading page templates and writing hydrated pages back out.

use std::fmt::Write as _;

use scraper::{ElementRef, Html};

use crate::document::{Document, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parses an HTML document into a [`Document`].
///
/// Parsing is lenient (html5ever error recovery), so the result always has
/// `<html>`, `<head>` and `<body>`. Comments and the doctype are dropped.
#[must_use]
pub fn parse_html(source: &str) -> Document {
    let parsed = Html::parse_document(source);
    let mut doc = Document::empty();
    let root = doc.root();
    import_element(&mut doc, root, parsed.root_element());
    doc
}

fn import_element(doc: &mut Document, parent: NodeId, source: ElementRef<'_>) {
    let element = source.value();
    let id = doc.create_element(element.name());
    for (name, value) in element.attrs() {
        doc.set_attr(id, name, value);
    }
    doc.append_child(parent, id);

    for child in source.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            import_element(doc, id, child_element);
        } else if let scraper::Node::Text(text) = child.value() {
            doc.append_text(id, text);
        }
    }
}

/// Serializes `doc` as HTML5 with a leading doctype.
#[must_use]
pub fn to_html(doc: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for child in doc.children(doc.root()) {
        write_node(doc, *child, false, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, raw_text: bool, out: &mut String) {
    match &doc.node(node).kind {
        NodeKind::Document => {}
        NodeKind::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                out.push_str(&escape(text, false));
            }
        }
        NodeKind::Element(element) => {
            let tag = element.tag_name.as_str();
            out.push('<');
            out.push_str(tag);
            for (name, value) in &element.attrs {
                let _ = write!(out, " {name}=\"{}\"", escape(value, true));
            }
            if let Some(style) = doc.style_attr(node) {
                let _ = write!(out, " style=\"{}\"", escape(&style, true));
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&tag);
            for child in doc.children(node) {
                write_node(doc, *child, raw, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}
