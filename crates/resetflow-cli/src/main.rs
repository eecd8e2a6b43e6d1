//! Resetflow command-line interface: request a reset link, redeem a token, and
//! check configuration files.

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use resetflow_core::{
    logging, FlowOutcome, FlowSnapshot, ResetClient, ResetToken, ResetflowConfig, SubmitStatus,
};
use resetflow_http::HttpResetTransport;
use rpassword::prompt_password;
use schemars::schema_for;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zeroize::Zeroizing;

const REQUEST_SUCCESS: &str = "A link to reset your password has been sent to your email.";
const CONFIRM_SUCCESS: &str = "Your password has been reset successfully. You can now log in.";

/// Top-level command-line options shared by every subcommand.
#[derive(Parser, Debug)]
#[command(
    name = "resetflow",
    version,
    about = "Request and confirm account password resets."
)]
struct Cli {
    /// Path to a TOML or YAML configuration file; built-in defaults otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.base_url` from the configuration.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the server to email a reset link for an account.
    Request {
        /// Account email address.
        identifier: String,
    },

    /// Set a new password using the token from a reset link.
    Confirm {
        /// Reset token as issued by the server.
        #[arg(long, conflicts_with = "link")]
        token: Option<String>,

        /// Full reset link; the token is taken from it.
        #[arg(long)]
        link: Option<String>,

        /// New password. Prompted for (twice) when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Validate a configuration file or emit the config schema.
    Validate {
        /// Path to the configuration file to validate.
        #[arg(short = 'f', long, required_unless_present = "schema")]
        file: Option<PathBuf>,

        /// Output the JSON schema instead of validating a file.
        #[arg(long)]
        schema: bool,
    },
}

/// Entry point: exit non-zero on errors and on flows that did not succeed.
fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    logging::init("warn");
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file, schema } => {
            if schema {
                let schema = schema_for!(ResetflowConfig);
                println!("{}", to_string_pretty(&schema)?);
                return Ok(true);
            }

            let file = file.context("a configuration file is required")?;
            let cfg = ResetflowConfig::load(&file)
                .with_context(|| format!("failed to load configuration from {}", file.display()))?;

            let issues = cfg.validate();
            if issues.is_empty() {
                println!("Configuration valid (server {}).", cfg.server.base_url);
                Ok(true)
            } else {
                eprintln!("Configuration validation failed:");
                for issue in issues {
                    eprintln!("  - {issue}");
                }
                Ok(false)
            }
        }
        Commands::Request { identifier } => {
            let client = build_client(cli.config.as_deref(), cli.base_url)?;
            let flow = client.request_flow();
            flow.set_identifier(identifier);

            let status = block_on(flow.submit())?;
            Ok(report(status, &flow.snapshot(), REQUEST_SUCCESS))
        }
        Commands::Confirm {
            token,
            link,
            password,
        } => {
            let client = build_client(cli.config.as_deref(), cli.base_url)?;
            let flow = client.confirm_flow(resolve_token(token, link.as_deref()));

            let password = match password {
                Some(value) => Zeroizing::new(value),
                None => prompt_new_password()?,
            };
            flow.set_new_credential(password.as_str());

            let status = block_on(flow.submit())?;
            Ok(report(status, &flow.snapshot(), CONFIRM_SUCCESS))
        }
    }
}

/// Load configuration (or defaults), apply overrides, and refuse invalid setups.
fn load_config(path: Option<&Path>, base_url: Option<String>) -> Result<ResetflowConfig> {
    let mut config = match path {
        Some(path) => ResetflowConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ResetflowConfig::default(),
    };

    if let Some(base_url) = base_url {
        config.server.base_url = base_url;
    }

    let issues = config.validate();
    if !issues.is_empty() {
        bail!("invalid configuration: {}", issues.join("; "));
    }
    Ok(config)
}

fn build_client(
    path: Option<&Path>,
    base_url: Option<String>,
) -> Result<ResetClient<HttpResetTransport>> {
    let config = load_config(path, base_url)?;
    let transport = HttpResetTransport::from_config(&config)?;
    debug!("using reset server {}", config.server.base_url);
    Ok(ResetClient::new(Arc::new(config), Arc::new(transport)))
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Pick the token from `--token`, else from `--link`; absent otherwise.
fn resolve_token(token: Option<String>, link: Option<&str>) -> ResetToken {
    match (token, link) {
        (Some(token), _) => ResetToken::new(token),
        (None, Some(link)) => ResetToken::from_link(link),
        (None, None) => ResetToken::default(),
    }
}

fn prompt_new_password() -> Result<Zeroizing<String>> {
    let first = Zeroizing::new(prompt_password("New password: ")?);
    let second = Zeroizing::new(prompt_password("Repeat new password: ")?);
    confirm_entries(first, &second)
}

/// Both prompt entries must agree before anything is submitted.
fn confirm_entries(first: Zeroizing<String>, second: &str) -> Result<Zeroizing<String>> {
    ensure!(first.as_str() == second, "passwords do not match");
    Ok(first)
}

/// Print the result of a submission and report whether the flow succeeded.
fn report(status: SubmitStatus, snapshot: &FlowSnapshot, success: &str) -> bool {
    if status == SubmitStatus::Invalid {
        eprintln!("Please correct the following:");
        for (field, _) in snapshot.field_errors.iter() {
            if let Some(message) = snapshot.field_errors.message(field) {
                eprintln!("  - {field}: {message}");
            }
        }
        return false;
    }

    match &snapshot.outcome {
        FlowOutcome::Succeeded => {
            println!("{success}");
            true
        }
        FlowOutcome::Failed(detail) => {
            eprintln!("{detail}");
            false
        }
        FlowOutcome::Idle | FlowOutcome::Submitting => false,
    }
}
