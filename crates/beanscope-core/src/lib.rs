//! Introspection and invocation engine behind the `beanscope` CLI.
//!
//! This crate owns the descriptor model, coercion, invocation, and
//! rendering logic for the workspace:
//!
//! - **[`TypeDescriptor`]** — Explicit capability surface of a managed
//!   type: the methods it exposes, built once through a typed builder at
//!   registration. [`derive_attributes`] and [`derive_operations`] project
//!   it into the logical attribute/operation model by naming convention.
//!
//! - **[`TypeCodecRegistry`]** — String⇄value codecs keyed by exact
//!   [`TypeRef`], with a single opt-in raw-text fallback for the generic
//!   `object` type. All coercion and scalar rendering goes through it.
//!
//! - **[`InvocationGateway`]** — Entry point for get/set/call requests.
//!   Resolves members against the descriptor, gates writes and calls on
//!   an [`AccessPolicy`], coerces arguments, invokes, and formats the
//!   result.
//!
//! - **[`ValueFormatter`]** / **[`RenderNode`]** — Recursive formatting of
//!   runtime [`Value`]s into a render tree, consumed by exactly two
//!   flatteners ([`render::json`], [`render::html`]) so the surfaces never
//!   diverge on representable cases.
//!
//! - **[`ManagedObjectProvider`]** — The seam to wherever objects live:
//!   the in-process [`LocalRegistry`], or a [`ConnectionScope`] opening a
//!   per-request handle to a remote target.

pub mod attribute;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod gateway;
pub mod ignore;
pub mod provider;
pub mod render;
pub mod signature;
pub mod value;

// ── Primary re-exports ──────────────────────────────────────────────
pub use attribute::{AccessKind, Attribute, derive_attributes};
pub use codec::{TypeCodec, TypeCodecRegistry};
pub use descriptor::{ManagedObject, MethodDescriptor, TypeDescriptor, TypeRef};
pub use error::{InvocationFault, ProbeError, cause_chain};
pub use format::ValueFormatter;
pub use gateway::{
    AccessPolicy, ArgInput, AttributeReading, AttributeRow, CallOutcome, InvocationGateway,
    SetOutcome,
};
pub use ignore::IgnoreList;
pub use provider::{ConnectionScope, LocalRegistry, ManagedObjectProvider, ServerRef};
pub use render::RenderNode;
pub use signature::{OperationSignature, derive_operations};
pub use value::{ObjectValue, RecordSchema, RecordValue, Value};
