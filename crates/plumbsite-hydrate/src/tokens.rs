//! `{fieldName}` placeholder substitution for token-style templates.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use plumbsite_dom::{Document, NodeId};
use regex::{Captures, Regex};

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid regex"));

/// Replaces known tokens in `text`; returns the new text and how many
/// tokens were replaced. Unknown tokens are kept verbatim.
fn substitute(text: &str, fields: &BTreeMap<String, String>) -> (String, usize) {
    let mut replaced = 0;
    let out = TOKEN_RE.replace_all(text, |caps: &Captures<'_>| match fields.get(&caps[1]) {
        Some(value) => {
            replaced += 1;
            value.clone()
        }
        None => caps[0].to_owned(),
    });
    (out.into_owned(), replaced)
}

fn elements_under(doc: &Document, node: NodeId, out: &mut Vec<NodeId>) {
    for child in doc.element_children(node) {
        out.push(child);
        elements_under(doc, child, out);
    }
}

/// Substitutes tokens in every text node and attribute value under
/// `<body>`, then applies a `title` field to the document title.
///
/// Returns the number of tokens replaced.
pub fn substitute_tokens(doc: &mut Document, fields: &BTreeMap<String, String>) -> usize {
    let Some(body) = doc.body() else {
        return 0;
    };
    let mut replaced = 0;

    for node in doc.text_nodes(body) {
        let Some(text) = doc.text(node) else {
            continue;
        };
        let (updated, count) = substitute(text, fields);
        if count > 0 {
            doc.set_text(node, updated);
            replaced += count;
        }
    }

    let mut elements = vec![body];
    elements_under(doc, body, &mut elements);
    for node in elements {
        let updates: Vec<(String, String)> = doc
            .attrs(node)
            .iter()
            .filter_map(|(name, value)| {
                let (updated, count) = substitute(value, fields);
                (count > 0).then(|| {
                    replaced += count;
                    (name.clone(), updated)
                })
            })
            .collect();
        for (name, value) in updates {
            doc.set_attr(node, &name, &value);
        }
    }

    if let Some(title) = fields.get("title").filter(|t| !t.is_empty()) {
        doc.set_title(title);
    }
    tracing::debug!(replaced, "placeholder tokens substituted");
    replaced
}
