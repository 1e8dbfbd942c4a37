#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use anyhow::{Result, anyhow};
use dom::{Document, NodeKey};
use overlay::{Adjustment, OverlayConfig, OverlayEngine};

pub const ARTICLE: &str = include_str!("../fixtures/article.html");
pub const FEED: &str = include_str!("../fixtures/feed.html");

pub fn init_logging() {
    let _log_init: Result<(), _> = env_logger::builder().is_test(true).try_init();
}

pub fn attach(html: &str) -> Result<OverlayEngine> {
    init_logging();
    Ok(OverlayEngine::attach(
        Document::parse_html(html)?,
        OverlayConfig::default(),
    ))
}

pub fn by_id(document: &Document, id: &str) -> Result<NodeKey> {
    document
        .descendants(document.root())
        .into_iter()
        .find(|node| document.attribute(*node, "id") == Some(id))
        .ok_or_else(|| anyhow!("no element with id {id}"))
}

pub fn style_of(engine: &OverlayEngine, id: &str) -> Result<Option<String>> {
    let document = engine.document();
    let node = by_id(document, id)?;
    Ok(document.attribute(node, "style").map(str::to_owned))
}

/// Concatenated text of every text node below the element with `id`.
pub fn text_of(engine: &OverlayEngine, id: &str) -> Result<String> {
    let document = engine.document();
    let node = by_id(document, id)?;
    Ok(document
        .descendants(node)
        .into_iter()
        .filter_map(|descendant| document.text(descendant))
        .collect())
}

pub fn body_html(engine: &OverlayEngine) -> Result<String> {
    let document = engine.document();
    let body = document.body().ok_or_else(|| anyhow!("document has no body"))?;
    Ok(document.outer_html(body))
}

pub const fn adjustment(
    font_size: i32,
    line_height: f64,
    letter_spacing: f64,
    spacing: Option<bool>,
) -> Adjustment {
    Adjustment {
        font_size_delta: font_size,
        line_height_delta: line_height,
        letter_spacing_delta: letter_spacing,
        spacing,
    }
}

pub const fn identity() -> Adjustment {
    adjustment(0, 0.0, 0.0, Some(false))
}
