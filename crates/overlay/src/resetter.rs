use anyhow::Error;
use css_style_attr::StyleDeclarationBlock;
use dom::Document;
use log::{debug, trace};

use crate::snapshots::StyleSnapshotStore;

/// Inline properties the overlay may own. Height properties are included so overrides
/// written by older engine versions are cleaned up too.
pub const MANAGED_PROPERTIES: &[&str] = &[
    "font-size",
    "line-height",
    "letter-spacing",
    "height",
    "min-height",
    "max-height",
];

/// Strips overlay-managed declarations from every snapshotted element.
#[derive(Debug, Default, Clone, Copy)]
pub struct StyleResetter;

impl StyleResetter {
    /// Restore every snapshotted element and drop its snapshot. Returns how many
    /// elements had their `style` attribute changed.
    ///
    /// # Errors
    /// Returns an error if the document rejects an attribute write.
    pub fn reset(
        &self,
        document: &mut Document,
        store: &mut StyleSnapshotStore,
    ) -> Result<usize, Error> {
        let mut restored = 0_usize;
        for node in store.keys() {
            let Some(snapshot) = store.forget(node) else {
                continue;
            };
            if !document.contains(node) {
                continue;
            }
            let current = document.attribute(node, "style").map(str::to_owned);
            let target = restored_style(
                current.as_deref(),
                snapshot.original_inline_style.as_deref(),
            );
            if current == target {
                continue;
            }
            if let Some(text) = target {
                trace!("{node:?} style restored -> {text}");
                document.set_attribute(node, "style", &text)?;
            } else {
                trace!("{node:?} style attribute removed");
                document.remove_attribute(node, "style")?;
            }
            restored += 1;
        }
        debug!("reset restored {restored} elements");
        Ok(restored)
    }
}

/// The `style` attribute an element should carry after reset, `None` for no attribute.
///
/// Managed properties go back to their original inline declarations. When the result
/// matches the original block the original text is returned unchanged.
pub fn restored_style(current: Option<&str>, original: Option<&str>) -> Option<String> {
    let original_block = StyleDeclarationBlock::parse(original.unwrap_or_default());
    let mut block = StyleDeclarationBlock::parse(current.unwrap_or_default());
    for property in MANAGED_PROPERTIES {
        block.remove_property(property);
        if let Some(declaration) = original_block.get(property) {
            block.set_property(&declaration.property, &declaration.value, declaration.important);
        }
    }
    if same_declarations(&block, &original_block) {
        return original.map(str::to_owned);
    }
    if block.is_empty() && original.is_none() {
        return None;
    }
    Some(block.to_css_text())
}

/// Order-insensitive equality of two blocks.
fn same_declarations(left: &StyleDeclarationBlock, right: &StyleDeclarationBlock) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|declaration| right.get(&declaration.property) == Some(declaration))
}
