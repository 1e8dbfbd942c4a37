//! Author stylesheets: `<style>` contents reduced to simple selectors.
//!
//! Supported selectors are compounds of an optional tag name (or `*`) followed by
//! any number of `.class` and `#id` parts. Rules using combinators, pseudo-classes
//! or attribute selectors are skipped with a warning, and `@`-rules are ignored.

use css_style_attr::{Declaration, parse_style_attribute};
use dom::{Document, NodeKey};
use log::warn;

/// Selector specificity as (ids, classes, types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Inline style outranks every selector.
    pub const INLINE: Self = Self(u32::MAX, u32::MAX, u32::MAX);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleSelector {
    /// `None` for `*` or an omitted type selector.
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
}

impl SimpleSelector {
    /// Parse a compound selector, returning `None` for anything unsupported.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut selector = Self::default();
        let mut rest = text;
        let tag_len = rest
            .find(|character: char| character == '.' || character == '#')
            .unwrap_or(rest.len());
        let tag = &rest[..tag_len];
        if !tag.is_empty() && tag != "*" {
            if !is_name(tag) {
                return None;
            }
            selector.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_len..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body
                .find(|character: char| character == '.' || character == '#')
                .unwrap_or(body.len());
            let name = &body[..end];
            if !is_name(name) {
                return None;
            }
            if marker == '#' {
                selector.ids.push(name.to_owned());
            } else {
                selector.classes.push(name.to_owned());
            }
            rest = &body[end..];
        }
        Some(selector)
    }

    pub fn specificity(&self) -> Specificity {
        Specificity(
            u32::try_from(self.ids.len()).unwrap_or(u32::MAX),
            u32::try_from(self.classes.len()).unwrap_or(u32::MAX),
            u32::from(self.tag.is_some()),
        )
    }

    pub fn matches(&self, document: &Document, node: NodeKey) -> bool {
        let Some(tag) = document.tag(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|wanted| wanted != tag) {
            return false;
        }
        let id = document.attribute(node, "id");
        if !self.ids.iter().all(|wanted| id == Some(wanted.as_str())) {
            return false;
        }
        let class_attr = document.attribute(node, "class").unwrap_or_default();
        self.classes.iter().all(|wanted| {
            class_attr
                .split_ascii_whitespace()
                .any(|class| class == wanted)
        })
    }
}

fn is_name(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(|character| {
            character.is_ascii_alphanumeric() || character == '-' || character == '_'
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: SimpleSelector,
    pub declarations: Vec<Declaration>,
    pub source_order: u32,
}

/// Parse a stylesheet into rules, appending to `rules` and numbering them from `order`.
/// Returns the next free source order.
pub fn parse_stylesheet(css: &str, rules: &mut Vec<Rule>, mut order: u32) -> u32 {
    let css = strip_comments(css);
    let mut rest = css.as_str();
    while let Some(open) = rest.find('{') {
        let prelude = rest[..open].trim();
        let Some(close) = matching_close(&rest[open..]) else {
            break;
        };
        let body = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];
        if prelude.starts_with('@') {
            continue;
        }
        let declarations = parse_style_attribute(body);
        for part in prelude.split(',') {
            let Some(selector) = SimpleSelector::parse(part) else {
                warn!("unsupported selector skipped: {}", part.trim());
                continue;
            };
            rules.push(Rule {
                selector,
                declarations: declarations.clone(),
                source_order: order,
            });
            order = order.saturating_add(1);
        }
    }
    order
}

/// Offset of the brace closing the block opened at `block[0]`.
fn matching_close(block: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (index, character) in block.char_indices() {
        match character {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
