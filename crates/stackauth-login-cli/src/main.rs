//! stackauth-login - log in to Stack Auth from a terminal.
//!
//! Starts a CLI auth session, opens the app's confirmation page in a
//! browser, and prints the refresh token once the user approves.

mod config;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stackauth_login_core::{
    BrowserOpener, CliLogin, HttpTransport, LoginOptions, NoopOpener, Opener,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{mask_secret, Config};

#[derive(Parser)]
#[command(name = "stackauth-login")]
#[command(about = "Log in to Stack Auth through a browser confirmation")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    project: ProjectArgs,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args)]
struct ProjectArgs {
    /// Stack Auth API URL
    #[arg(long, env = "STACK_API_URL", global = true)]
    base_url: Option<String>,

    /// URL of the app that serves the confirmation page
    #[arg(long, env = "STACK_APP_URL", global = true)]
    app_url: Option<String>,

    #[arg(long, env = "STACK_PROJECT_ID", global = true)]
    project_id: Option<String>,

    #[arg(long, env = "STACK_PUBLISHABLE_CLIENT_KEY", global = true, hide_env_values = true)]
    publishable_client_key: Option<String>,
}

impl ProjectArgs {
    fn to_config(&self) -> Config {
        Config {
            base_url: self.base_url.clone(),
            app_url: self.app_url.clone(),
            project_id: self.project_id.clone(),
            publishable_client_key: self.publishable_client_key.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the browser login and print the refresh token (default)
    Login(LoginArgs),
    /// Save the given project settings to the config file
    Configure,
    /// Show the effective project settings
    ShowConfig,
}

#[derive(Args, Default)]
struct LoginArgs {
    /// Only print the confirmation URL, do not launch a browser
    #[arg(long)]
    no_browser: bool,

    /// Requested lifetime of the pending login, in milliseconds
    #[arg(long)]
    expires_in_ms: Option<u64>,

    /// Wait between poll requests, in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Give up after this many poll requests
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl LoginArgs {
    fn to_options(&self) -> LoginOptions {
        let defaults = LoginOptions::default();
        LoginOptions {
            expires_in: self
                .expires_in_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.expires_in),
            poll_interval: self
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Serialize)]
struct LoginOutput<'a> {
    refresh_token: &'a str,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // RUST_LOG wins over --verbose when set
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let saved = Config::load()?;
    let effective = saved.merged(&cli.project.to_config());

    match cli.command.unwrap_or_else(|| Command::Login(LoginArgs::default())) {
        Command::Login(args) => login(&effective, &args).await,
        Command::Configure => configure(&saved, &cli.project.to_config()),
        Command::ShowConfig => {
            show_config(&effective);
            Ok(())
        }
    }
}

async fn login(config: &Config, args: &LoginArgs) -> Result<()> {
    let client_config = config.to_client_config();
    let transport = HttpTransport::new().context("Failed to create HTTP client")?;
    let opener: Box<dyn Opener> = if args.no_browser {
        Box::new(NoopOpener)
    } else {
        Box::new(BrowserOpener)
    };

    let login = CliLogin::new(&client_config, transport, opener)
        .context("Invalid project settings")?
        .with_options(args.to_options());

    info!(base_url = %client_config.base_url, "Starting CLI login");
    let refresh_token = login.login().await.context("CLI login failed")?;

    if args.json {
        let output = LoginOutput {
            refresh_token: &refresh_token,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        eprintln!("Login successful.");
        println!("{}", refresh_token);
    }
    Ok(())
}

fn configure(saved: &Config, overrides: &Config) -> Result<()> {
    let updated = saved.merged(overrides);
    let path = updated.save()?;
    eprintln!("Saved settings to {}", path.display());
    Ok(())
}

fn show_config(config: &Config) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
    let client = config.to_client_config();

    println!("base_url:               {}", client.base_url);
    println!("app_url:                {}", show(&config.app_url));
    println!("project_id:             {}", show(&config.project_id));
    println!(
        "publishable_client_key: {}",
        config
            .publishable_client_key
            .as_deref()
            .map(mask_secret)
            .unwrap_or_else(|| "(not set)".to_string())
    );
}
