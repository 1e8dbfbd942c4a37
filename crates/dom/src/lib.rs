#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! Arena-backed document tree with stable node keys and mutation records.
//!
//! The tree is what the overlay engine adjusts: element `style` attributes and
//! text node contents are the only things it writes. Every mutation performed on
//! a connected node is recorded as a [`DOMUpdate`] so observers can react to it
//! the way a `MutationObserver` would.

pub mod document;
pub mod parser;
pub mod printing;
pub mod updating;

pub use document::{DOMNode, Document, NodeKind};
pub use updating::{DOMSubscriber, DOMUpdate, NodeKey};
