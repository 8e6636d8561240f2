//! Engine error taxonomy.
//!
//! Every variant is a recoverable, per-request condition reported back
//! through the same `Result` channel as success — nothing here escapes the
//! engine boundary as an opaque panic or process-fatal failure. The one
//! exception is [`ProbeError::IgnoreEntry`], which surfaces during startup
//! construction of the ignore list and aborts startup at the composition
//! root rather than running with a partially built index.

use thiserror::Error;

/// Unified error type for the engine.
#[derive(Debug, Error)]
pub enum ProbeError {
    // ── Resolution ──────────────────────────────────────────────────
    /// No managed object registered under the requested name.
    #[error("No managed object named '{name}'")]
    ObjectNotFound { name: String },

    /// The attribute is absent, or present but not readable/writable for
    /// the requested direction.
    #[error("No attribute '{name}' on {object}")]
    AttributeNotFound { object: String, name: String },

    /// Signature resolution matched no member. Ignore-listed members are
    /// invisible to resolution, so they report here rather than as a
    /// policy rejection.
    #[error("No operation matching '{signature}'")]
    MemberNotFound { signature: String },

    /// Signature resolution matched more than one member — only possible
    /// under malformed descriptor registration.
    #[error("Signature '{signature}' matches {count} members")]
    MemberAmbiguous { signature: String, count: usize },

    /// The signature text could not be parsed.
    #[error("Malformed signature '{text}': {reason}")]
    MalformedSignature { text: String, reason: String },

    /// The caller supplied a different number of arguments than the
    /// resolved operation declares. Checked before any coercion runs, so
    /// a surplus argument can never be silently discarded.
    #[error("Operation {signature} takes {expected} argument(s), got {got}")]
    ArityMismatch {
        signature: String,
        expected: usize,
        got: usize,
    },

    // ── Policy ──────────────────────────────────────────────────────
    /// A policy gate rejected the request before any member was touched.
    #[error("Access denied: {action} is disabled")]
    AccessDenied { action: String },

    // ── Coercion ────────────────────────────────────────────────────
    /// Free-form text could not be decoded to the target type. Carries
    /// the offending text so the caller can echo it back.
    #[error("Cannot coerce '{text}' to {target}: {reason}")]
    Coercion {
        text: String,
        target: String,
        reason: String,
    },

    // ── Invocation ──────────────────────────────────────────────────
    /// The underlying call raised. The original cause is preserved for
    /// diagnostic rendering; the call is never retried.
    #[error("Invocation of {member} failed")]
    Invocation {
        member: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The connection-scope provider timed out. Kept distinct from
    /// [`ProbeError::Invocation`] so a slow remote target is never
    /// mistaken for a raising one.
    #[error("Remote call timed out")]
    Timeout,

    /// The connection-scope provider cancelled the call.
    #[error("Remote call cancelled")]
    Cancelled,

    /// A connection to a remote target could not be opened.
    #[error("Cannot connect to {server}: {reason}")]
    ConnectionFailed { server: String, reason: String },

    // ── Startup ─────────────────────────────────────────────────────
    /// An ignore-list extension entry failed to parse. Fatal at startup.
    #[error("Invalid ignore-list entry '{entry}': {reason}")]
    IgnoreEntry { entry: String, reason: String },
}

/// What a method closure reports when the underlying call fails.
///
/// Descriptors return this instead of a bare boxed error so the gateway
/// can tell an interrupted remote call apart from a raising target.
#[derive(Debug, Error)]
pub enum InvocationFault {
    /// The call itself raised; the cause chain is preserved.
    #[error(transparent)]
    Raised(Box<dyn std::error::Error + Send + Sync>),

    /// The connection scope timed out mid-call.
    #[error("call timed out")]
    Timeout,

    /// The connection scope cancelled the call.
    #[error("call cancelled")]
    Cancelled,

    /// The descriptor was invoked against an object of the wrong
    /// concrete type. Indicates a registration bug, not caller error.
    #[error("target object is not a {expected}")]
    WrongTarget { expected: String },

    /// Argument vector did not match the declared parameter list.
    #[error("expected {expected} argument(s), got {got}")]
    ArityMismatch { expected: usize, got: usize },
}

impl InvocationFault {
    /// Wrap an arbitrary error as a raised cause.
    pub fn raised<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Raised(Box::new(cause))
    }

    /// Wrap a plain message as a raised cause.
    pub fn message(text: impl Into<String>) -> Self {
        Self::Raised(text.into().into())
    }
}

/// Render an error and its full `source()` chain as a single line.
///
/// This is the text the JSON surface emits under `"exception"` and the
/// HTML surface prints inline.
pub fn cause_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}
