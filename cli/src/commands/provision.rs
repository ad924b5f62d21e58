//! `provision` command

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde_yaml::{Mapping, Value};

use crate::application::{Cancellation, RemoteExecutor, provision};
use crate::domain::{BackoffPolicy, ServicePlan};
use crate::infra::TargetCommunicator;
use crate::infra::config::YamlConfigStore;
use crate::output::{OutputContext, TerminalUi, json};
use crate::plugins::registry;

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Provisioning file [default: $PROVISIO_CONFIG or ./provisio.yaml]
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Override a provisioner setting (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Print the plan without connecting to the target
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn overrides(pairs: &[(String, String)]) -> Value {
    let mut map = Mapping::new();
    for (key, value) in pairs {
        map.insert(Value::from(key.as_str()), Value::from(value.as_str()));
    }
    Value::Mapping(map)
}

/// Load the provisioning file, then plan or run the selected provisioner.
///
/// # Errors
///
/// Returns an error if loading, configuring or provisioning fails. A
/// cancelled run surfaces as `ProvisionError::Cancelled`.
pub async fn run(
    ctx: &OutputContext,
    args: ProvisionArgs,
    as_json: bool,
    cancel: &Cancellation,
) -> Result<()> {
    let config = YamlConfigStore::new(args.file).load()?;
    let mut plugin = registry::lookup(&config.provisioner)?;
    plugin
        .prepare(&[config.config.clone(), overrides(&args.set)])
        .with_context(|| format!("configuring {}", config.provisioner))?;

    if args.dry_run {
        let plan = plugin.plan()?;
        if as_json {
            println!("{}", json::format(&plan)?);
        } else {
            print_plan(ctx, &plan);
        }
        return Ok(());
    }

    let communicator = TargetCommunicator::new(
        &config.target,
        Duration::from_secs(config.exec_timeout_secs),
    );
    let policy = BackoffPolicy::from(&config.retry);
    let mut executor = RemoteExecutor::new(&config.scratch_dir);
    if let Some(dir) = &config.staging_dir {
        executor = executor.with_staging_dir(dir);
    }
    let ui = TerminalUi::new(ctx);

    ctx.header(&format!("Provisioning with {}", plugin.name()));
    provision(
        cancel,
        &ui,
        &communicator,
        &policy,
        &executor,
        plugin.as_ref(),
        &config.generated,
    )
    .await?;
    ctx.success("Provisioning complete");
    Ok(())
}

fn print_plan(ctx: &OutputContext, plan: &ServicePlan) {
    ctx.header(&format!("Plan for {}", plan.service));
    for (i, flow) in plan.flows.iter().enumerate() {
        ctx.info(&format!("flow {}: {}", i + 1, flow.name));
        for task in &flow.transfers {
            ctx.kv(
                "  upload",
                &format!("{} => {}", task.source.describe(), task.destination),
            );
        }
        for command in &flow.commands {
            ctx.kv("  run   ", command);
        }
    }
}
