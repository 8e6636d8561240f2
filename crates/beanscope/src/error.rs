//! CLI error types with miette diagnostics.
//!
//! Maps `ProbeError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use beanscope_config::ConfigError;
use beanscope_core::ProbeError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const COERCION: i32 = 6;
    pub const INVOCATION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resolution ───────────────────────────────────────────────────
    #[error("No managed object named '{name}'")]
    #[diagnostic(
        code(beanscope::object_not_found),
        help("Run: beanscope objects to see registered objects")
    )]
    ObjectNotFound { name: String },

    #[error("No attribute '{name}' on {object}")]
    #[diagnostic(
        code(beanscope::attribute_not_found),
        help("Run: beanscope attrs {object} to see its attributes")
    )]
    AttributeNotFound { object: String, name: String },

    #[error("No operation matching '{signature}'")]
    #[diagnostic(
        code(beanscope::operation_not_found),
        help("Run: beanscope ops <object> to see callable operations")
    )]
    OperationNotFound { signature: String },

    #[error("Signature '{signature}' matches {count} operations")]
    #[diagnostic(code(beanscope::ambiguous))]
    Ambiguous { signature: String, count: usize },

    #[error("Malformed signature '{text}': {reason}")]
    #[diagnostic(
        code(beanscope::malformed_signature),
        help("Signatures look like: name(type,type) — e.g. submit(string,int)")
    )]
    MalformedSignature { text: String, reason: String },

    #[error("Operation {signature} takes {expected} argument(s), got {got}")]
    #[diagnostic(
        code(beanscope::arity_mismatch),
        help("Run: beanscope ops <object> to see the declared parameter list")
    )]
    ArityMismatch {
        signature: String,
        expected: usize,
        got: usize,
    },

    // ── Policy ───────────────────────────────────────────────────────
    #[error("Access denied: {action} is disabled")]
    #[diagnostic(
        code(beanscope::access_denied),
        help(
            "Enable it in the config [defaults] section, or drop the \
             --deny-write / --deny-call flag."
        )
    )]
    AccessDenied { action: String },

    // ── Coercion ─────────────────────────────────────────────────────
    #[error("Cannot coerce '{text}' to {target}: {reason}")]
    #[diagnostic(code(beanscope::coercion))]
    Coercion {
        text: String,
        target: String,
        reason: String,
    },

    // ── Invocation ───────────────────────────────────────────────────
    #[error("Invocation of {member} failed")]
    #[diagnostic(code(beanscope::invocation))]
    Invocation {
        member: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Remote call timed out")]
    #[diagnostic(code(beanscope::timeout))]
    Timeout,

    #[error("Remote call cancelled")]
    #[diagnostic(code(beanscope::cancelled))]
    Cancelled,

    #[error("Cannot connect to {server}: {reason}")]
    #[diagnostic(code(beanscope::connection_failed))]
    ConnectionFailed { server: String, reason: String },

    // ── Targets ──────────────────────────────────────────────────────
    #[error("Target '{target}' is a remote server, which this build cannot reach")]
    #[diagnostic(
        code(beanscope::remote_unsupported),
        help(
            "Only the in-process sample registry ships today; remote \
             connectors plug in behind the connection-scope seam."
        )
    )]
    RemoteUnsupported { target: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(beanscope::config))]
    Config(#[from] ConfigError),

    // ── Other engine errors ──────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(beanscope::engine))]
    Engine(ProbeError),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ObjectNotFound { .. }
            | Self::AttributeNotFound { .. }
            | Self::OperationNotFound { .. } => exit_code::NOT_FOUND,
            Self::AccessDenied { .. } => exit_code::PERMISSION,
            Self::Coercion { .. } => exit_code::COERCION,
            Self::Invocation { .. } | Self::ConnectionFailed { .. } => exit_code::INVOCATION,
            Self::Timeout | Self::Cancelled => exit_code::TIMEOUT,
            Self::MalformedSignature { .. }
            | Self::Ambiguous { .. }
            | Self::ArityMismatch { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ProbeError → CliError mapping ────────────────────────────────────

impl From<ProbeError> for CliError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::ObjectNotFound { name } => CliError::ObjectNotFound { name },

            ProbeError::AttributeNotFound { object, name } => {
                CliError::AttributeNotFound { object, name }
            }

            ProbeError::MemberNotFound { signature } => {
                CliError::OperationNotFound { signature }
            }

            ProbeError::MemberAmbiguous { signature, count } => {
                CliError::Ambiguous { signature, count }
            }

            ProbeError::MalformedSignature { text, reason } => {
                CliError::MalformedSignature { text, reason }
            }

            ProbeError::ArityMismatch {
                signature,
                expected,
                got,
            } => CliError::ArityMismatch {
                signature,
                expected,
                got,
            },

            ProbeError::AccessDenied { action } => CliError::AccessDenied { action },

            ProbeError::Coercion {
                text,
                target,
                reason,
            } => CliError::Coercion {
                text,
                target,
                reason,
            },

            ProbeError::Invocation { member, cause } => CliError::Invocation {
                member,
                source: cause,
            },

            ProbeError::Timeout => CliError::Timeout,
            ProbeError::Cancelled => CliError::Cancelled,

            ProbeError::ConnectionFailed { server, reason } => {
                CliError::ConnectionFailed { server, reason }
            }

            other => CliError::Engine(other),
        }
    }
}
