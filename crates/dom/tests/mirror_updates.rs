use anyhow::{Error, anyhow};
use dom::{DOMSubscriber as _, DOMUpdate, Document, NodeKey};

const FIXTURE: &str = include_str!("fixtures/mirror.html");

fn init_logging() {
    let _log_init: Result<(), _> = env_logger::builder().is_test(true).try_init();
}

fn by_id(doc: &Document, id: &str) -> Result<NodeKey, Error> {
    doc.descendants(doc.root())
        .into_iter()
        .find(|node| doc.attribute(*node, "id") == Some(id))
        .ok_or_else(|| anyhow!("no element with id {id}"))
}

#[test]
fn replayed_records_reproduce_the_source_tree() -> Result<(), Error> {
    init_logging();
    let mut source = Document::parse_html(FIXTURE)?;
    let mut mirror = Document::parse_html(FIXTURE)?;
    assert_eq!(source.to_html(), mirror.to_html());

    let list = by_id(&source, "list")?;
    let one = by_id(&source, "one")?;
    let two = by_id(&source, "two")?;

    // Attach before filling so every node gets its own record.
    let three = source.create_element("p");
    source.insert_child(list, three, 0)?;
    let text = source.create_text("Three");
    source.append_child(three, text)?;
    source.set_attribute(one, "style", "font-size: 18px !important;")?;
    source.remove_attribute(one, "STYLE")?;
    source.set_text(text, "Three & more")?;
    source.remove_node(two)?;

    let updates = source.take_updates();
    assert!(updates.iter().any(DOMUpdate::is_structural));
    for update in updates {
        mirror.apply_update(update)?;
    }
    assert_eq!(mirror.to_html(), source.to_html());
    assert!(!mirror.contains(two));
    assert!(mirror.to_html().contains("<p>Three &amp; more</p>"));
    Ok(())
}

#[test]
fn conflicting_records_are_rejected() -> Result<(), Error> {
    init_logging();
    let mut doc = Document::parse_html(FIXTURE)?;
    let one = by_id(&doc, "one")?;
    let list = by_id(&doc, "list")?;

    let reused = DOMUpdate::InsertElement {
        parent: list,
        node: one,
        tag: "p".to_owned(),
        pos: 0,
    };
    assert!(doc.apply_update(reused).is_err());
    assert!(
        doc.apply_update(DOMUpdate::SetText {
            node: one,
            text: "x".to_owned()
        })
        .is_err()
    );
    assert!(
        doc.apply_update(DOMUpdate::RemoveNode {
            parent: NodeKey::ROOT,
            node: NodeKey::ROOT
        })
        .is_err()
    );
    Ok(())
}
