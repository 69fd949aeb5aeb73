//! ExpenseGenie API Server
//!
//! REST API for the ExpenseGenie expense tracker: accounts with email
//! verification, expenses, budgets, savings goals and AI-assisted
//! categorization and budget plans.
//!
//! # Usage
//!
//! ```bash
//! # Local run without PostgreSQL
//! expensegenie-api-server --dev-mode --in-memory
//!
//! # Start with custom config
//! expensegenie-api-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! EXPENSEGENIE__SERVER__PORT=8080 expensegenie-api-server
//! ```

mod config;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::{signal, sync::Notify};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use expensegenie_api::{create_router, AppState};
use expensegenie_auth::AuthService;
use expensegenie_db::Database;
use expensegenie_llm::BudgetAdvisor;
use expensegenie_mail::{EmailService, MailTransport};

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// ExpenseGenie API Server
#[derive(Parser, Debug)]
#[command(name = "expensegenie-api-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "EXPENSEGENIE_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Use in-memory stores instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,

    /// JWT secret key
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Email transport (log, smtp, gmail)
    #[arg(long, env = "EMAIL_SERVICE")]
    email_service: Option<String>,

    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT")]
    smtp_port: Option<u16>,

    #[arg(long, env = "SMTP_USER")]
    smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// Sender address for account emails
    #[arg(long, env = "EMAIL_FROM")]
    email_from: Option<String>,

    /// Base URL used in verification and reset links
    #[arg(long, env = "FRONTEND_URL")]
    frontend_url: Option<String>,

    /// Enable development mode (allows the placeholder JWT secret)
    #[arg(long, env = "EXPENSEGENIE_DEV_MODE")]
    dev_mode: bool,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    let dev_mode = args.dev_mode;
    apply_args(&mut server_config, args)?;

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting ExpenseGenie API Server"
    );

    validate_config(&server_config, dev_mode)?;

    let state = Arc::new(build_state(&server_config).await?);
    let app = create_router(state, server_config.api.clone());

    if server_config.metrics.enabled {
        start_metrics_exporter(server_config.metrics.port)?;
    }

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "Server listening");

    serve(listener, app, server_config.server.shutdown_timeout()).await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// CLI flags and their environment variables win over every config layer
fn apply_args(config: &mut ServerConfig, args: Args) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if args.in_memory {
        config.database.in_memory = true;
    }

    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    if let Some(key) = args.openai_api_key {
        config.llm.openai.api_key = Some(key);
    }
    if let Some(key) = args.gemini_api_key {
        config.llm.gemini.api_key = Some(key);
    }

    if let Some(service) = args.email_service {
        config.email.transport = MailTransport::from_str(&service)
            .ok_or_else(|| anyhow::anyhow!("unknown EMAIL_SERVICE {:?}", service))?;
    }
    if let Some(host) = args.smtp_host {
        config.email.smtp_host = Some(host);
    }
    if let Some(port) = args.smtp_port {
        config.email.smtp_port = port;
    }
    if let Some(user) = args.smtp_user {
        config.email.smtp_user = Some(user);
    }
    if let Some(password) = args.smtp_password {
        config.email.smtp_password = Some(password);
    }
    if let Some(from) = args.email_from {
        config.email.from_address = from;
    }
    if let Some(url) = args.frontend_url {
        config.email.frontend_url = url;
    }

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}

fn validate_config(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<()> {
    let report = config.validate(dev_mode);

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    if !report.errors.is_empty() {
        for error in &report.errors {
            tracing::error!("{}", error);
        }
        anyhow::bail!("invalid configuration: {}", report.errors.join("; "));
    }

    Ok(())
}

async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let db = Database::connect(&config.database)
        .await
        .context("database connection failed")?;

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }
    tracing::info!(backend = health.backend, "Database ready");

    let auth = AuthService::new(config.auth.to_auth_config());

    let router = config.llm.build_router()?;
    tracing::info!(providers = ?router.kinds(), "AI providers configured");
    let advisor = BudgetAdvisor::new(router);

    let email = EmailService::from_config(&config.email).context("email transport setup failed")?;

    Ok(AppState::new(
        Arc::new(db),
        Arc::new(auth),
        Arc::new(advisor),
        Arc::new(email),
    ))
}

/// Install the Prometheus recorder and its scrape listener
fn start_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("failed to start metrics exporter")?;

    tracing::info!(port, "Metrics exporter started");
    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Serve until a shutdown signal, then give in-flight requests `timeout` to finish
async fn serve(
    listener: tokio::net::TcpListener,
    app: axum::Router,
    timeout: std::time::Duration,
) -> anyhow::Result<()> {
    let signalled = Arc::new(Notify::new());
    let notify = signalled.clone();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            notify.notify_one();
        })
        .into_future();

    let deadline = async {
        signalled.notified().await;
        tokio::time::sleep(timeout).await;
    };

    tokio::select! {
        result = server => result?,
        _ = deadline => {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "Shutdown timeout elapsed, dropping open connections"
            );
        }
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from([
            "expensegenie-api-server",
            "--port",
            "8080",
            "--in-memory",
            "--dev-mode",
        ]);
        assert_eq!(args.port, Some(8080));
        assert!(args.in_memory);
        assert!(args.dev_mode);
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "expensegenie-api-server",
            "--host",
            "127.0.0.1",
            "--jwt-secret",
            "from-the-command-line",
            "--gemini-api-key",
            "g-key",
            "--email-service",
            "gmail",
            "--smtp-user",
            "genie@gmail.com",
            "--frontend-url",
            "https://app.example.com",
        ]);
        let mut config = ServerConfig::default();
        apply_args(&mut config, args).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.jwt_secret, "from-the-command-line");
        assert_eq!(config.llm.gemini.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.email.transport, MailTransport::Gmail);
        assert_eq!(config.email.smtp_user.as_deref(), Some("genie@gmail.com"));
        assert_eq!(config.email.frontend_url, "https://app.example.com");
    }

    #[test]
    fn test_unknown_email_service() {
        let args = Args::parse_from(["expensegenie-api-server", "--email-service", "pigeon"]);
        let mut config = ServerConfig::default();
        assert!(apply_args(&mut config, args).is_err());
    }

    #[test]
    fn test_placeholder_secret_rejected_outside_dev_mode() {
        let mut config = ServerConfig::development();
        assert!(validate_config(&config, true).is_ok());
        assert!(validate_config(&config, false).is_err());

        config.auth.jwt_secret = "a-long-production-secret".to_string();
        assert!(validate_config(&config, false).is_ok());
    }

    #[tokio::test]
    async fn test_build_state_in_memory() {
        let config = ServerConfig::development();
        let state = build_state(&config).await.unwrap();

        assert_eq!(state.db.backend(), "memory");
        assert!(!state.advisor.is_configured());
    }
}
