//! The render-tree algebra and its two consumers.
//!
//! [`RenderNode`] is the single intermediate representation between the
//! formatter and any output surface. [`json`] and [`html`] are the only
//! two flatteners; both consume the same tree, so representable cases
//! cannot silently diverge between them.

pub mod html;
pub mod json;
mod node;

pub use node::RenderNode;
