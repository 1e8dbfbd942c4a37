mod common;

use core::time::Duration;
use std::time::Instant;

use anyhow::{Result, anyhow};
use common::{FEED, adjustment, attach, by_id, identity, style_of};
use dom::{DOMSubscriber as _, DOMUpdate, NodeKey};
use overlay::OverlayEngine;

const DELAY: Duration = Duration::from_millis(100);

/// Append `<p id=..>text</p>` to the feed through the document API.
fn append_post(engine: &mut OverlayEngine, id: &str, text: &str) -> Result<NodeKey> {
    let feed = by_id(engine.document(), "feed")?;
    let document = engine.document_mut();
    let post = document.create_element("p");
    document.set_attribute(post, "id", id)?;
    let content = document.create_text(text);
    document.append_child(post, content)?;
    document.append_child(feed, post)?;
    Ok(post)
}

#[test]
fn inserted_content_is_adjusted_after_the_quiet_period() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(2, 4.0, 0.0, None))?;
    assert_eq!(engine.observe(start), 0);

    append_post(&mut engine, "third", "Third post")?;
    assert_eq!(engine.observe(start), 1);
    assert_eq!(engine.next_deadline(), Some(start + DELAY));

    assert!(!engine.poll(start + Duration::from_millis(50))?);
    assert_eq!(style_of(&engine, "third")?, None);

    assert!(engine.poll(start + DELAY)?);
    assert_eq!(style_of(&engine, "third")?, style_of(&engine, "first")?);
    assert!(style_of(&engine, "third")?.is_some());
    assert_eq!(engine.next_deadline(), None);
    Ok(())
}

#[test]
fn a_burst_of_insertions_restarts_the_timer() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(1, 0.0, 0.0, None))?;
    engine.observe(start);

    append_post(&mut engine, "a", "A")?;
    engine.observe(start);
    append_post(&mut engine, "b", "B")?;
    engine.observe(start + Duration::from_millis(60));

    assert!(!engine.poll(start + DELAY)?);
    assert_eq!(style_of(&engine, "a")?, None);
    assert!(engine.poll(start + Duration::from_millis(160))?);
    assert!(style_of(&engine, "a")?.is_some());
    assert!(style_of(&engine, "b")?.is_some());
    Ok(())
}

#[test]
fn idle_state_ignores_mutations() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    append_post(&mut engine, "third", "Third post")?;
    assert_eq!(engine.observe(start), 1);
    assert_eq!(engine.next_deadline(), None);
    assert!(!engine.poll(start + DELAY)?);
    assert_eq!(style_of(&engine, "third")?, None);
    Ok(())
}

#[test]
fn attribute_writes_do_not_schedule_reconciliation() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(2, 0.0, 0.0, None))?;
    assert!(engine.document().has_pending_updates());
    assert_eq!(engine.observe(start), 0);
    assert_eq!(engine.next_deadline(), None);

    let first = by_id(engine.document(), "first")?;
    engine
        .document_mut()
        .set_attribute(first, "class", "highlight")?;
    assert_eq!(engine.observe(start), 0);
    assert_eq!(engine.next_deadline(), None);
    Ok(())
}

#[test]
fn a_new_request_clears_the_pending_timer() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(2, 0.0, 0.0, None))?;
    append_post(&mut engine, "third", "Third post")?;
    engine.observe(start);
    assert!(engine.next_deadline().is_some());

    // The new request itself covers the inserted post.
    engine.set_adjustment(adjustment(3, 0.0, 0.0, None))?;
    assert_eq!(engine.next_deadline(), None);
    assert_eq!(
        style_of(&engine, "third")?.as_deref(),
        Some(
            "font-size: 19px !important; line-height: 19.2px !important; letter-spacing: 0px !important;"
        )
    );

    engine.set_adjustment(identity())?;
    assert!(!engine.poll(start + Duration::from_secs(1))?);
    assert_eq!(style_of(&engine, "third")?, None);
    Ok(())
}

#[test]
fn removed_nodes_drop_their_snapshots() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(2, 0.0, 0.0, None))?;
    let first = by_id(engine.document(), "first")?;
    assert!(engine.style_snapshots().has(first));

    engine.document_mut().remove_node(first)?;
    assert_eq!(engine.observe(start), 1);
    assert!(!engine.style_snapshots().has(first));
    assert!(engine.next_deadline().is_some());
    Ok(())
}

#[test]
fn external_records_are_mirrored_and_reconciled() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(2, 0.0, 0.0, None))?;
    engine.observe(start);

    let feed = by_id(engine.document(), "feed")?;
    let post = NodeKey(10_000);
    engine.apply_update(DOMUpdate::InsertElement {
        parent: feed,
        node: post,
        tag: "P".to_owned(),
        pos: 0,
    })?;
    engine.apply_update(DOMUpdate::InsertText {
        parent: post,
        node: NodeKey(10_001),
        text: "Pushed from outside".to_owned(),
        pos: 0,
    })?;
    assert_eq!(engine.observe(start), 2);
    assert!(engine.poll(start + DELAY)?);

    let style = engine
        .document()
        .attribute(post, "style")
        .ok_or_else(|| anyhow!("external post was not adjusted"))?;
    assert!(style.starts_with("font-size: 18px !important;"));
    let unknown = DOMUpdate::RemoveNode {
        parent: feed,
        node: NodeKey(99_999),
    };
    assert!(engine.apply_update(unknown).is_err());
    Ok(())
}

#[test]
fn new_content_does_not_get_spacing_automatically() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(1, 0.0, 0.0, Some(true)))?;
    engine.observe(start);

    append_post(&mut engine, "late", "新的post")?;
    engine.observe(start);
    assert!(engine.poll(start + DELAY)?);
    assert!(style_of(&engine, "late")?.is_some());
    assert_eq!(common::text_of(&engine, "late")?, "新的post");
    Ok(())
}

#[test]
fn a_removed_key_cannot_carry_its_snapshot_to_new_content() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(2, 0.0, 0.0, None))?;
    let feed = by_id(engine.document(), "feed")?;

    let insert = |node: NodeKey, tag: &str| DOMUpdate::InsertElement {
        parent: feed,
        node,
        tag: tag.to_owned(),
        pos: usize::MAX,
    };
    let text = |parent: NodeKey, node: NodeKey| DOMUpdate::InsertText {
        parent,
        node,
        text: "Streamed".to_owned(),
        pos: 0,
    };
    engine.apply_update(insert(NodeKey(500), "p"))?;
    engine.apply_update(text(NodeKey(500), NodeKey(501)))?;
    engine.observe(start);
    assert!(engine.poll(start + DELAY)?);
    assert!(engine.style_snapshots().has(NodeKey(500)));

    engine.apply_update(DOMUpdate::RemoveNode {
        parent: feed,
        node: NodeKey(500),
    })?;
    assert!(engine.apply_update(insert(NodeKey(500), "h1")).is_err());
    engine.apply_update(insert(NodeKey(502), "h1"))?;
    engine.apply_update(text(NodeKey(502), NodeKey(503)))?;
    assert_eq!(engine.observe(start + DELAY), 3);
    assert!(!engine.style_snapshots().has(NodeKey(500)));

    assert!(engine.poll(start + DELAY * 2)?);
    let style = engine
        .document()
        .attribute(NodeKey(502), "style")
        .ok_or_else(|| anyhow!("streamed heading was not adjusted"))?;
    assert!(style.starts_with("font-size: 34px !important;"));
    Ok(())
}

#[test]
fn removals_outside_the_body_do_not_schedule() -> Result<()> {
    let mut engine = attach(FEED)?;
    let start = Instant::now();
    engine.set_adjustment(adjustment(2, 0.0, 0.0, None))?;
    engine.observe(start);

    let document = engine.document();
    let head = document
        .descendants(document.root())
        .into_iter()
        .find(|node| document.tag(*node) == Some("head"))
        .ok_or_else(|| anyhow!("feed has no head"))?;
    let tree = engine.document_mut();
    let meta = tree.create_element("meta");
    tree.append_child(head, meta)?;
    tree.remove_node(meta)?;
    assert_eq!(engine.observe(start), 0);
    assert_eq!(engine.next_deadline(), None);
    Ok(())
}
