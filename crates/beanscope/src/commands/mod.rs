//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod config_cmd;
pub mod probe;

use std::sync::Arc;

use beanscope_config::Config;
use beanscope_core::{
    AccessPolicy, InvocationGateway, LocalRegistry, TypeCodecRegistry,
};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::samples;

/// Everything a probe handler needs, resolved once per invocation.
pub struct Context {
    pub gateway: InvocationGateway,
    pub registry: LocalRegistry,
    pub policy: AccessPolicy,
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Context {
    /// Build the engine context from config plus CLI overrides.
    pub fn build(config: &Config, global: &GlobalOpts) -> Result<Self, CliError> {
        // Only the in-process sample registry ships; a configured remote
        // target is recognized but not reachable from this build.
        if let Some(name) = global.target.as_deref() {
            if name != "local" {
                config.target(Some(name))?;
                return Err(CliError::RemoteUnsupported {
                    target: name.to_owned(),
                });
            }
        }

        let mut policy = config.access_policy();
        if global.deny_write {
            policy.attribute_write_allowed = false;
        }
        if global.deny_call {
            policy.operation_call_allowed = false;
        }
        if let Some(max_length) = global.max_length {
            policy.max_length = max_length;
        }

        let format = match global.output {
            Some(format) => format,
            None => parse_output(&config.defaults.output)?,
        };

        let ignore = config.ignore_list()?;
        let gateway = InvocationGateway::new(
            Arc::new(TypeCodecRegistry::new()),
            Arc::new(ignore),
        );

        Ok(Self {
            gateway,
            registry: samples::registry(),
            policy,
            format,
            color: output::should_color(global.color),
            quiet: global.quiet,
        })
    }
}

fn parse_output(name: &str) -> Result<OutputFormat, CliError> {
    match name {
        "tree" => Ok(OutputFormat::Tree),
        "json" => Ok(OutputFormat::Json),
        "html" => Ok(OutputFormat::Html),
        other => Err(CliError::Config(beanscope_config::ConfigError::Validation {
            field: "defaults.output".into(),
            reason: format!("expected 'tree', 'json', or 'html', got '{other}'"),
        })),
    }
}

/// Dispatch an engine-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Objects => probe::objects(ctx),
        Command::Attrs(args) => probe::attrs(ctx, &args),
        Command::Ops(args) => probe::ops(ctx, &args),
        Command::Get(args) => probe::get(ctx, &args),
        Command::Set(args) => probe::set(ctx, &args),
        Command::Call(args) => probe::call(ctx, &args),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
