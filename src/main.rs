use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File, FileFormat};
use log::{LevelFilter, info};
use serde::Deserialize;
use tokio::net::TcpListener;

use trackify::api;
use trackify::auth;
use trackify::db;
use trackify::mail::{MailConfig, Mailer};

const APP_NAME: &str = "trackify";

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.common);

    let settings = load_settings(cli.common.config.as_deref())?;

    match cli.command {
        Command::Serve(cmd) => run_serve(settings, cmd),
    }
}

#[tokio::main]
async fn run_serve(settings: Settings, cmd: ServeCommand) -> Result<()> {
    handle_serve(settings, cmd).await
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Trackify - school-bus tracking backend server.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable trace logging (overrides other levels)
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP API and relay server
    Serve(ServeCommand),
}

#[derive(Debug, Clone, Args)]
struct ServeCommand {
    /// Host address to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Settings {
    server: ServerConfig,
    database: DatabaseConfig,
    auth: auth::AuthConfig,
    smtp: Option<MailConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: auth::AuthConfig::default(),
            smtp: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServerConfig {
    host: String,
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DatabaseConfig {
    path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/trackify.db"),
        }
    }
}

fn init_logging(common: &CommonOpts) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    if common.quiet {
        log::set_max_level(LevelFilter::Off);
        return;
    }

    let level = effective_log_level(common);
    let level_str = match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{APP_NAME}={level_str},tower_http={level_str}"))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();

    // Also init env_logger for compatibility with log crate users
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.filter_level(level);
    builder.try_init().ok();
}

fn effective_log_level(common: &CommonOpts) -> LevelFilter {
    if common.trace {
        LevelFilter::Trace
    } else if common.debug {
        LevelFilter::Debug
    } else {
        match common.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn load_settings(config_path: Option<&std::path::Path>) -> Result<Settings> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    } else {
        builder = builder.add_source(
            File::with_name("trackify")
                .format(FileFormat::Toml)
                .required(false),
        );
    }

    let built = builder
        .add_source(Environment::with_prefix("TRACKIFY").separator("__"))
        .build()
        .context("loading configuration")?;

    built.try_deserialize().context("parsing configuration")
}

async fn handle_serve(settings: Settings, cmd: ServeCommand) -> Result<()> {
    info!("Starting {} server...", APP_NAME);

    info!("Database path: {}", settings.database.path.display());
    let database = db::Database::new(&settings.database.path).await?;

    let auth_config = settings.auth.clone();
    auth_config
        .validate()
        .context("Invalid auth configuration")?;
    let auth_state = auth::AuthState::new(auth_config);

    let mailer = match &settings.smtp {
        Some(smtp) => {
            let mailer = Mailer::from_config(smtp).context("Invalid SMTP configuration")?;
            info!("SMTP relay configured: {}", smtp.smtp_host);
            Some(mailer)
        }
        None => {
            log::warn!("No SMTP settings; OTP and contact emails will not be delivered");
            None
        }
    };

    let state = api::AppState::new(&database, auth_state, mailer);
    let app = api::create_router(state);

    let host = cmd.host.unwrap_or(settings.server.host);
    let port = cmd.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{host}:{port}").parse().context("invalid address")?;

    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await.context("binding to address")?;

    let shutdown_signal = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("running server")?;

    Ok(())
}
