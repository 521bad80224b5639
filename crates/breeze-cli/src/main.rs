//! Breeze smoke test - exercises the trading API end to end.
//!
//! Runs configuration validation, authentication, then each read operation
//! in turn, printing results. Logout always runs at the end, even when an
//! earlier step failed.
//!
//! Usage:
//!   breeze-smoke [--remember] [--forget] [--days N]

use std::io;

use anyhow::{bail, Result};
use breeze_core::{ApiResult, Config, CredentialStore, TradingApiClient};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ============================================================================
// Constants
// ============================================================================

/// Default lookback passed to the order history check
const DEFAULT_HISTORY_DAYS: u32 = 7;

/// File name prefix for the rolling log written when `BREEZE_LOG_DIR` is set
const LOG_FILE_PREFIX: &str = "breeze-smoke.log";

#[derive(Debug, Default)]
struct Args {
    remember: bool,
    forget: bool,
    days: Option<u32>,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Args::default();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--remember" => args.remember = true,
                "--forget" => args.forget = true,
                "--days" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--days requires a value"))?;
                    args.days = Some(value.parse()?);
                }
                other => bail!("Unknown argument: {}", other),
            }
        }
        Ok(args)
    }
}

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard, which must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var("BREEZE_LOG_DIR") {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn print_separator(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!(" {}", title);
    println!("{}", "=".repeat(50));
}

fn print_json<T: Serialize>(title: &str, data: &T) {
    println!("\n{}:", title);
    println!("{}", "-".repeat(30));
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("<unprintable: {}>", e),
    }
}

/// Print the outcome of one check, handing back the data on success
fn report<T: Serialize>(title: &str, result: ApiResult<T>) -> Option<T> {
    match result {
        Ok(data) => {
            print_json(title, &data);
            Some(data)
        }
        Err(e) => {
            println!("❌ {} failed: {}", title, e);
            None
        }
    }
}

fn check_configuration(config: &Config) -> bool {
    print_separator("Testing Configuration");

    println!("Configuration loaded:");
    let summary = config.summary();
    println!("  base_url: {}", summary.base_url);
    println!("  account_id: {}", summary.account_id.as_deref().unwrap_or("<unset>"));
    println!("  environment: {}", summary.environment);

    match config.validate() {
        Ok(()) => {
            println!("✅ Configuration is valid");
            true
        }
        Err(e) => {
            println!("❌ {}", e);
            false
        }
    }
}

/// Resolve the trading password: env var, then OS keychain, then prompt
fn resolve_password(user_id: &str) -> Result<String> {
    if let Ok(password) = std::env::var("BREEZE_PASSWORD") {
        if !password.is_empty() {
            return Ok(password);
        }
    }
    match CredentialStore::get_password(user_id) {
        Ok(password) => {
            info!("Using password from keychain");
            Ok(password)
        }
        Err(_) => Ok(rpassword::prompt_password("Password: ")?),
    }
}

async fn authenticate(client: &TradingApiClient, config: &Config, args: &Args) -> Result<()> {
    print_separator("Testing Authentication");

    let user_id = std::env::var("BREEZE_USER_ID").ok().filter(|u| !u.is_empty());

    let established = match (user_id, &config.session_token) {
        (Some(user_id), _) => {
            if args.forget {
                if let Err(e) = CredentialStore::delete(&user_id) {
                    warn!(error = %e, "Failed to delete stored password");
                }
            }
            let password = resolve_password(&user_id)?;
            let established = client.generate_session(&user_id, &password).await?;
            if args.remember {
                if let Err(e) = CredentialStore::store(&user_id, &password) {
                    warn!(error = %e, "Failed to store password");
                }
            }
            established
        }
        (None, Some(token)) => {
            println!("No BREEZE_USER_ID set, using BREEZE_SESSION_TOKEN");
            client.resume_session(token).await?
        }
        (None, None) => bail!("Set BREEZE_USER_ID or BREEZE_SESSION_TOKEN"),
    };

    println!("✅ Authentication successful!");
    println!("Account: {}", client.session().account_id().unwrap_or("<unset>"));
    println!("Session expires at {}", established.expires_at);
    Ok(())
}

async fn run_checks(client: &TradingApiClient, days: u32) {
    print_separator("Testing Account Balance");
    if let Some(funds) = report("Account Balance", client.get_account_balance().await) {
        if funds.is_empty() {
            println!("No balance data returned");
        }
    }

    print_separator("Testing Portfolio");
    if let Some(holdings) = report("Portfolio Holdings", client.get_portfolio().await) {
        println!("Total holdings: {}", holdings.len());
    }

    print_separator("Testing Open Orders");
    if !client.orders_enabled() {
        println!("(orders endpoint disabled by BREEZE_ORDERS_ENABLED)");
    }
    if let Some(orders) = report("Open Orders", client.get_open_orders().await) {
        println!("Total open orders: {}", orders.len());
    }

    print_separator("Testing Order History");
    let title = format!("Order History (Last {} days)", days);
    if let Some(orders) = report(&title, client.get_order_history(days).await) {
        println!("Total orders: {}", orders.len());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();
    let args = Args::parse()?;
    info!("Breeze smoke test starting");

    println!("🚀 Breeze API Smoke Test");

    let config = Config::from_env()?;
    if !check_configuration(&config) {
        println!("\n❌ Configuration check failed. Please check your .env file.");
        return Ok(());
    }

    let client = TradingApiClient::new(&config)?;

    if let Err(e) = authenticate(&client, &config, &args).await {
        println!("❌ Authentication failed: {}", e);
        println!("\nLogging out...");
        client.logout().await;
        return Ok(());
    }

    run_checks(&client, args.days.unwrap_or(DEFAULT_HISTORY_DAYS)).await;

    print_separator("Test Summary");
    println!("✅ All checks completed");

    println!("\nLogging out...");
    client.logout().await;
    println!("✅ Logged out");

    info!("Breeze smoke test finished");
    Ok(())
}
