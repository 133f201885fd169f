//! CLI entry point for datto-rmm — a Datto RMM REST API client.
//!
//! Authenticates with an API key/secret pair, then dispatches one API
//! operation per invocation based on the chosen subcommand. Collection
//! results are printed as pretty JSON on stdout.
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (auth failure, API error, rate-limit exhaustion)
//! - 2: argument validation error (clap handles this automatically)

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use datto_rmm::audit::fetch_fleet_software;
use datto_rmm::auth::TokenProvider;
use datto_rmm::client::{RmmClient, DEFAULT_API_URL};
use datto_rmm::devices::{fetch_devices, fetch_site_devices, set_udf, UdfUpdate};
use datto_rmm::jobs::{fetch_jobs, quick_job, JobComponent, JobVariable, QuickJobRequest};
use datto_rmm::retry::RetryPolicy;
use datto_rmm::sites::{
    create_site_variable, fetch_site_variables, fetch_sites, update_site_variable,
    SiteVariableRequest,
};
use datto_rmm::users::fetch_users;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Datto RMM API key (username half of the credential pair).
    #[arg(long, env = "RMM_API_KEY")]
    api_key: String,

    /// Datto RMM API secret. Prefer setting via the RMM_API_SECRET
    /// environment variable to avoid exposing the secret in process
    /// listings and shell history.
    #[arg(long, env = "RMM_API_SECRET")]
    api_secret: String,

    /// Platform base URL. Defaults to the zinfandel platform; set to
    /// your account's regional platform (pinotage, merlot, concord, ...).
    #[arg(long, env = "RMM_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Maximum requests per call before a sustained rate limit becomes
    /// an error.
    #[arg(long, default_value_t = 10)]
    retry_attempts: u32,

    /// Pause in seconds between rate-limited attempts.
    #[arg(long, default_value_t = 60)]
    retry_backoff_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every device on the account.
    Devices,
    /// List every site on the account.
    Sites,
    /// List every user on the account.
    Users,
    /// List the account's jobs.
    Jobs,
    /// List the devices belonging to one site.
    SiteDevices {
        /// UID of the site.
        site_uid: String,
    },
    /// List the variables defined on one site.
    SiteVariables {
        /// UID of the site.
        site_uid: String,
    },
    /// Retrieve the software audit for one or more devices. Devices
    /// without audit data (404) are skipped with a warning.
    Software {
        /// UIDs of the devices to audit.
        #[arg(required = true)]
        device_uids: Vec<String>,
    },
    /// Write user-defined fields on a device.
    SetUdf {
        /// UID of the device.
        device_uid: String,
        /// Slot assignment in the form SLOT=VALUE (e.g. `3=patch-ring`).
        /// Repeatable; slots run 1 through 30.
        #[arg(long = "set", value_name = "SLOT=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Dispatch a quick job (run one component) against a device.
    QuickJob {
        /// UID of the target device.
        device_uid: String,
        /// Display name for the dispatched job.
        #[arg(long)]
        name: String,
        /// UID of the component to run.
        #[arg(long)]
        component: String,
        /// Component input variable in the form NAME=VALUE. Repeatable.
        #[arg(long = "var", value_name = "NAME=VALUE")]
        variables: Vec<String>,
    },
    /// Create a site variable, or update one when --id is given.
    SetSiteVariable {
        /// UID of the site.
        site_uid: String,
        /// Variable name.
        #[arg(long)]
        name: String,
        /// Variable value.
        #[arg(long)]
        value: String,
        /// Hide the value in the platform UI.
        #[arg(long)]
        masked: bool,
        /// Numeric id of an existing variable to update. Omit to create.
        #[arg(long)]
        id: Option<i64>,
    },
}

/// Splits a `KEY=VALUE` argument at the first `=`.
fn parse_pair(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

/// Parses a `SLOT=VALUE` UDF assignment; slots run 1 through 30.
fn parse_udf_assignment(raw: &str) -> Result<(u8, &str), String> {
    let (slot, value) = parse_pair(raw)?;
    let slot: u8 = slot
        .parse()
        .map_err(|_| format!("UDF slot must be a number, got '{slot}'"))?;
    if !(1..=30).contains(&slot) {
        return Err(format!("UDF slot must be 1..=30, got {slot}"));
    }
    Ok((slot, value))
}

fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(args: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let provider = TokenProvider::with_api_url(
        &args.api_key,
        SecretString::new(args.api_secret.clone()),
        &args.api_url,
    );
    let token = provider.authenticate().await?;
    let client = RmmClient::with_base_url(token, &args.api_url).with_retry_policy(
        RetryPolicy::new(
            args.retry_attempts,
            Duration::from_secs(args.retry_backoff_secs),
        ),
    );

    match args.command {
        Command::Devices => print_json(&fetch_devices(&client).await?)?,
        Command::Sites => print_json(&fetch_sites(&client).await?)?,
        Command::Users => print_json(&fetch_users(&client).await?)?,
        Command::Jobs => print_json(&fetch_jobs(&client).await?)?,
        Command::SiteDevices { site_uid } => {
            print_json(&fetch_site_devices(&client, &site_uid).await?)?;
        }
        Command::SiteVariables { site_uid } => {
            print_json(&fetch_site_variables(&client, &site_uid).await?)?;
        }
        Command::Software { device_uids } => {
            let audits = fetch_fleet_software(&client, &device_uids).await?;
            let report: Vec<serde_json::Value> = audits
                .iter()
                .map(|(uid, records)| {
                    serde_json::json!({ "deviceUid": uid, "software": records })
                })
                .collect();
            print_json(&report)?;
        }
        Command::SetUdf {
            device_uid,
            assignments,
        } => {
            let mut update = UdfUpdate::new();
            for raw in &assignments {
                let (slot, value) = parse_udf_assignment(raw)?;
                update = update.slot(slot, value);
            }
            set_udf(&client, &device_uid, &update).await?;
            println!("UDFs updated on {device_uid}");
        }
        Command::QuickJob {
            device_uid,
            name,
            component,
            variables,
        } => {
            let mut vars = Vec::with_capacity(variables.len());
            for raw in &variables {
                let (var_name, var_value) = parse_pair(raw)?;
                vars.push(JobVariable {
                    name: var_name.to_string(),
                    value: var_value.to_string(),
                });
            }
            let request = QuickJobRequest {
                job_name: name,
                job_component: JobComponent {
                    component_uid: component,
                    variables: vars,
                },
            };
            let job = quick_job(&client, &device_uid, &request).await?;
            print_json(&job)?;
        }
        Command::SetSiteVariable {
            site_uid,
            name,
            value,
            masked,
            id,
        } => {
            let request = SiteVariableRequest {
                name,
                value,
                masked: masked.then_some(true),
            };
            let variable = match id {
                Some(variable_id) => {
                    update_site_variable(&client, &site_uid, variable_id, &request).await?
                }
                None => create_site_variable(&client, &site_uid, &request).await?,
            };
            print_json(&variable)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Default to warnings only; RUST_LOG overrides (e.g. RUST_LOG=debug
    // shows every page fetch and backoff decision).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
