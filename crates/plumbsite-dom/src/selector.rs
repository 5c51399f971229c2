//! The CSS selector subset used by page templates.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`,
//! `[attr=value]` (bare, single- or double-quoted), descendant combinators
//! (whitespace) and selector lists (`,`). Anything else is rejected with
//! [`DomError::UnsupportedSelector`] instead of silently matching nothing.

use crate::error::DomError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttrCondition {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
}

/// One compound selector such as `div.slide[data-hero-cta="0"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrCondition>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Each group is a descendant chain, outermost compound first.
    pub(crate) groups: Vec<Vec<Compound>>,
}

impl Selector {
    /// Parses a selector list.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnsupportedSelector`] for empty input, unbalanced
    /// brackets or quotes, and any syntax outside the supported subset.
    pub fn parse(selector: &str) -> Result<Self, DomError> {
        let fail = |reason: &str| DomError::UnsupportedSelector {
            selector: selector.to_owned(),
            reason: reason.to_owned(),
        };

        let mut groups = Vec::new();
        for group in split_top_level(selector, |c| c == ',').map_err(|r| fail(&r))? {
            let parts = split_top_level(&group, char::is_whitespace).map_err(|r| fail(&r))?;
            let chain = parts
                .iter()
                .filter(|part| !part.is_empty())
                .map(|part| parse_compound(part))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|r| fail(&r))?;
            if chain.is_empty() {
                return Err(fail("empty selector"));
            }
            groups.push(chain);
        }
        Ok(Self { groups })
    }
}

/// Splits `src` on characters matching `is_sep` outside brackets and quotes.
fn split_top_level(src: &str, is_sep: impl Fn(char) -> bool) -> Result<Vec<String>, String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in src.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '[' => {
                    depth += 1;
                    current.push(c);
                }
                ']' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| "unbalanced ']'".to_owned())?;
                    current.push(c);
                }
                c if depth == 0 && is_sep(c) => parts.push(std::mem::take(&mut current)),
                c => current.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".into());
    }
    if depth != 0 {
        return Err("unbalanced '['".into());
    }
    parts.push(current);
    Ok(parts.into_iter().map(|p| p.trim().to_owned()).collect())
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let end = chars[start..]
        .iter()
        .position(|c| !is_ident_char(*c))
        .map_or(chars.len(), |offset| start + offset);
    (chars[start..end].iter().collect(), end)
}

fn parse_compound(src: &str) -> Result<Compound, String> {
    let chars: Vec<char> = src.chars().collect();
    let mut compound = Compound::default();
    let mut universal = false;
    let mut i = 0;

    if chars.first() == Some(&'*') {
        universal = true;
        i = 1;
    } else {
        let (ident, next) = read_ident(&chars, 0);
        if !ident.is_empty() {
            compound.tag = Some(ident.to_ascii_lowercase());
            i = next;
        }
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (ident, next) = read_ident(&chars, i + 1);
                if ident.is_empty() {
                    return Err("expected identifier after '#'".into());
                }
                compound.id = Some(ident);
                i = next;
            }
            '.' => {
                let (ident, next) = read_ident(&chars, i + 1);
                if ident.is_empty() {
                    return Err("expected class name after '.'".into());
                }
                compound.classes.push(ident);
                i = next;
            }
            '[' => {
                let close = find_closing_bracket(&chars, i)?;
                let inner: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr_condition(&inner)?);
                i = close + 1;
            }
            other => return Err(format!("unexpected '{other}'")),
        }
    }

    let is_empty = compound.tag.is_none()
        && compound.id.is_none()
        && compound.classes.is_empty()
        && compound.attrs.is_empty();
    if is_empty && !universal {
        return Err("empty compound selector".into());
    }
    Ok(compound)
}

fn find_closing_bracket(chars: &[char], open: usize) -> Result<usize, String> {
    let mut quote: Option<char> = None;
    for (offset, c) in chars[open + 1..].iter().enumerate() {
        match (quote, *c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(*c),
            (None, ']') => return Ok(open + 1 + offset),
            (None, _) => {}
        }
    }
    Err("unbalanced '['".into())
}

fn parse_attr_condition(inner: &str) -> Result<AttrCondition, String> {
    let inner = inner.trim();
    let Some((name, raw_value)) = inner.split_once('=') else {
        if inner.is_empty() || !inner.chars().all(is_ident_char) {
            return Err(format!("invalid attribute name \"{inner}\""));
        }
        return Ok(AttrCondition {
            name: inner.to_ascii_lowercase(),
            value: None,
        });
    };

    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(format!("unsupported attribute matcher \"{inner}\""));
    }

    let raw_value = raw_value.trim();
    let value = match raw_value.chars().next() {
        Some(q @ ('"' | '\'')) => raw_value
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .ok_or_else(|| format!("unterminated attribute value in \"{inner}\""))?
            .to_owned(),
        _ if !raw_value.is_empty() && raw_value.chars().all(is_ident_char) => {
            raw_value.to_owned()
        }
        _ => return Err(format!("invalid attribute value in \"{inner}\"")),
    };

    Ok(AttrCondition {
        name: name.to_ascii_lowercase(),
        value: Some(value),
    })
}
