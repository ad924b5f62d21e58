//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::application::Cancellation;
use crate::commands;
use crate::output::OutputContext;

/// Provision freshly built machine images over a remote execution channel
#[derive(Parser)]
#[command(
    name = "provisio",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output. `NO_COLOR` counts when set to any non-empty value.
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a provisioner against the configured target
    Provision(commands::provision::ProvisionArgs),

    /// List registered provisioners
    Plugins,

    /// Show the configuration keys of a provisioner
    Describe(commands::plugins::DescribeArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self, cancel: &Cancellation) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
            ..
        } = self;
        let ctx = OutputContext::new(no_color, quiet);
        match command {
            Command::Provision(args) => commands::provision::run(&ctx, args, json, cancel).await,
            Command::Plugins => commands::plugins::list(&ctx, json),
            Command::Describe(args) => commands::plugins::describe(&ctx, &args, json),
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
        }
    }
}
