//! `plugins` and `describe` commands

use anyhow::Result;
use clap::Args;

use crate::output::{OutputContext, json};
use crate::plugins::registry;

/// Arguments for the describe command.
#[derive(Args)]
pub struct DescribeArgs {
    /// Registered provisioner name, e.g. `react-provisioner`
    pub plugin: String,
}

/// List registered provisioners.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn list(ctx: &OutputContext, as_json: bool) -> Result<()> {
    let names: Vec<&str> = registry::names().collect();
    if as_json {
        println!("{}", json::format(&names)?);
        return Ok(());
    }
    ctx.header("Provisioners");
    for name in names {
        ctx.kv("-", name);
    }
    Ok(())
}

/// Print the configuration keys a provisioner understands.
///
/// # Errors
///
/// Returns an error if the provisioner is not registered.
pub fn describe(ctx: &OutputContext, args: &DescribeArgs, as_json: bool) -> Result<()> {
    let plugin = registry::lookup(&args.plugin)?;
    let spec = plugin.config_spec();
    if as_json {
        println!("{}", json::format(&spec)?);
        return Ok(());
    }
    ctx.header(plugin.name());
    for field in spec {
        let requirement = if field.required { "required" } else { "optional" };
        ctx.kv(
            &format!("{:<32}", field.name),
            &format!("{requirement}  {}", field.description),
        );
    }
    Ok(())
}
