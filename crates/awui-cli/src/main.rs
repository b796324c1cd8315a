// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

mod commands;

use anyhow::Result;
use awui_normalizer::NamedScope;
use clap::{Parser, Subcommand};
use commands::{RenderKind, ReportInput};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "awui", version, about = "Awareness UI dialog and error toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging, overriding the configured `log_level`.
    #[arg(long, global = true)]
    debug: bool,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the error catalog.
    Categories {
        /// Only show one family (network, auth, validation, ...).
        #[arg(long)]
        family: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the category an HTTP status maps to.
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// Show the user-facing message for a catalog key.
    Lookup {
        /// Catalog key, e.g. `MODULE_LOCKED`.
        key: String,

        /// Fail on unknown keys instead of falling back.
        #[arg(long)]
        strict: bool,
    },

    /// Print the markup a dialog preset renders.
    Render {
        /// Dialog preset.
        #[arg(value_enum)]
        kind: RenderKind,

        /// Dialog title.
        #[arg(long)]
        title: String,

        /// Dialog message.
        #[arg(long)]
        message: Option<String>,

        /// Confirm or acknowledge button label.
        #[arg(long)]
        confirm_text: Option<String>,

        /// Cancel button label (confirm only).
        #[arg(long)]
        cancel_text: Option<String>,
    },

    /// Classify a failure and deliver its record to the configured collector.
    Report {
        /// HTTP status to classify.
        #[arg(long, conflicts_with = "key")]
        status: Option<u16>,

        /// Catalog key to classify in a workflow scope.
        #[arg(long, required_unless_present = "status")]
        key: Option<String>,

        /// Scope for `--key`: `assessment` or `module`.
        #[arg(long, default_value = "module")]
        scope: String,

        /// Context recorded with the failure.
        #[arg(long, default_value = "awui report")]
        context: String,

        /// Request URL recorded with an HTTP failure.
        #[arg(long, default_value = "")]
        url: String,

        /// Page the failure is attributed to.
        #[arg(long, default_value = "about:blank")]
        page_url: String,

        /// Print the full record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration.
    Config {
        /// Print the JSON schema instead.
        #[arg(long)]
        schema: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load(cli.config.as_deref())?;

    let filter = if cli.debug {
        EnvFilter::new("awui=debug")
    } else {
        let level = config.log_level.as_deref().unwrap_or("info");
        EnvFilter::try_new(format!("awui={level}")).unwrap_or_else(|_| EnvFilter::new("awui=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Categories { family, json } => {
            let family = family.as_deref().map(commands::parse_family).transpose()?;
            println!("{}", commands::categories(family, json)?);
        }
        Commands::Status { code } => println!("{}", commands::status(code)),
        Commands::Lookup { key, strict } => println!("{}", commands::lookup(&key, strict)?),
        Commands::Render {
            kind,
            title,
            message,
            confirm_text,
            cancel_text,
        } => {
            println!(
                "{}",
                commands::render(
                    kind,
                    &title,
                    message.as_deref(),
                    confirm_text.as_deref(),
                    cancel_text.as_deref(),
                )
            );
        }
        Commands::Report {
            status,
            key,
            scope,
            context,
            url,
            page_url,
            json,
        } => {
            let input = match (status, key) {
                (Some(code), _) => ReportInput::Status { code, url },
                (None, Some(key)) => ReportInput::Named {
                    key,
                    scope: parse_scope(&scope)?,
                },
                (None, None) => anyhow::bail!("either --status or --key is required"),
            };
            let outcome = commands::report(config, &page_url, input, &context).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.record)?);
            } else {
                println!("{}", outcome.message);
            }
        }
        Commands::Config { schema } => {
            if schema {
                println!("{}", commands::config_schema()?);
            } else {
                print!("{}", commands::config_report(&config)?);
            }
        }
    }

    Ok(())
}

fn parse_scope(name: &str) -> Result<NamedScope> {
    match name {
        "assessment" => Ok(NamedScope::Assessment),
        "module" => Ok(NamedScope::Module),
        other => anyhow::bail!("unknown scope '{other}' (expected assessment or module)"),
    }
}
