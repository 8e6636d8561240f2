//! Handlers for the introspection and invocation subcommands.

use beanscope_core::{ArgInput, ManagedObjectProvider, TypeRef};

use crate::cli::{CallArgs, GetArgs, ObjectArgs, SetArgs};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

pub fn objects(ctx: &Context) -> Result<(), CliError> {
    let names = ctx.registry.names();
    output::print_output(&output::render_names(ctx.format, &names), ctx.quiet);
    Ok(())
}

pub fn attrs(ctx: &Context, args: &ObjectArgs) -> Result<(), CliError> {
    let object = ctx.registry.resolve(&args.object)?;
    let rows = ctx.gateway.attributes(object.as_ref(), &ctx.policy);
    output::print_output(
        &output::render_attr_rows(ctx.format, &rows, ctx.color),
        ctx.quiet,
    );
    Ok(())
}

pub fn ops(ctx: &Context, args: &ObjectArgs) -> Result<(), CliError> {
    let object = ctx.registry.resolve(&args.object)?;
    let signatures: Vec<String> = ctx
        .gateway
        .operations(object.as_ref())
        .iter()
        .map(ToString::to_string)
        .collect();
    output::print_output(&output::render_operations(ctx.format, &signatures), ctx.quiet);
    Ok(())
}

pub fn get(ctx: &Context, args: &GetArgs) -> Result<(), CliError> {
    let object = ctx.registry.resolve(&args.object)?;
    let reading = ctx
        .gateway
        .get_attribute(object.as_ref(), &args.attribute, &ctx.policy)?;
    output::print_output(
        &output::render_node(ctx.format, &reading.node, reading.writable),
        ctx.quiet,
    );
    Ok(())
}

pub fn set(ctx: &Context, args: &SetArgs) -> Result<(), CliError> {
    let object = ctx.registry.resolve(&args.object)?;
    ctx.gateway
        .set_attribute(object.as_ref(), &args.attribute, &args.value, &ctx.policy)?;
    if !ctx.quiet {
        eprintln!("OK - attribute '{}' set", args.attribute);
    }
    Ok(())
}

pub fn call(ctx: &Context, args: &CallArgs) -> Result<(), CliError> {
    let object = ctx.registry.resolve(&args.object)?;

    let overrides = parse_arg_types(args.arg_types.as_deref())?;
    let inputs: Vec<ArgInput> = args
        .args
        .iter()
        .enumerate()
        .map(|(i, text)| match overrides.get(i).cloned().flatten() {
            Some(type_override) => ArgInput::with_override(text, type_override),
            None => ArgInput::new(text),
        })
        .collect();

    let outcome = ctx
        .gateway
        .call_operation(object.as_ref(), &args.signature, &inputs, &ctx.policy)?;
    output::print_output(
        &output::render_node(ctx.format, &outcome.node, false),
        ctx.quiet,
    );
    Ok(())
}

/// Parse the `--arg-types` token list. A `_` keeps the declared type for
/// that position; positions past the end of the list are unoverridden.
fn parse_arg_types(spec: Option<&str>) -> Result<Vec<Option<TypeRef>>, CliError> {
    let Some(spec) = spec else {
        return Ok(Vec::new());
    };
    spec.split(',')
        .map(|token| {
            let token = token.trim();
            if token == "_" {
                return Ok(None);
            }
            TypeRef::from_token(token)
                .map(Some)
                .ok_or_else(|| CliError::MalformedSignature {
                    text: spec.to_owned(),
                    reason: format!("empty type token in '{token}'"),
                })
        })
        .collect()
}
