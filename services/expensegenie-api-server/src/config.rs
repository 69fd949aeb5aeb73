//! Server Configuration
//!
//! Layered configuration for the ExpenseGenie API server: built-in defaults,
//! `config/default.*`, `config/local.*`, an optional `--config` file and
//! `EXPENSEGENIE__SECTION__KEY` environment variables, in that order.
//! CLI flags are applied on top by `main`.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use expensegenie_api::ApiConfig;
use expensegenie_auth::{
    config::{CodeConfig, JwtConfig, PasswordConfig},
    AuthConfig,
};
use expensegenie_db::DatabaseConfig;
use expensegenie_llm::{GeminiConfig, LLMRouter, OpenAIConfig, ProviderKind};
use expensegenie_mail::MailConfig;

/// Placeholder secret shipped in the defaults; refused outside dev mode
pub const PLACEHOLDER_JWT_SECRET: &str = "change-me-in-production";

/// Server configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthSettings,

    /// AI provider keys and priority
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub email: MailConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Grace period for in-flight requests after a shutdown signal
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid host {:?}: {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Authentication settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,

    /// Bearer token lifetime in seconds
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,

    /// Server-side secret mixed into password hashes
    #[serde(default)]
    pub password_pepper: Option<String>,

    /// Argon2 memory cost in KiB
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,

    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    #[serde(default = "default_code_lifetime")]
    pub verification_code_lifetime_secs: u64,

    #[serde(default = "default_verification_token_lifetime")]
    pub verification_token_lifetime_secs: u64,

    #[serde(default = "default_reset_token_lifetime")]
    pub reset_token_lifetime_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_jwt_issuer(),
            token_lifetime_secs: default_token_lifetime(),
            password_pepper: None,
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            min_password_length: default_min_password_length(),
            verification_code_lifetime_secs: default_code_lifetime(),
            verification_token_lifetime_secs: default_verification_token_lifetime(),
            reset_token_lifetime_secs: default_reset_token_lifetime(),
        }
    }
}

impl AuthSettings {
    pub fn to_auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt: JwtConfig {
                secret: self.jwt_secret.clone(),
                token_lifetime: Duration::from_secs(self.token_lifetime_secs),
                issuer: self.jwt_issuer.clone(),
            },
            password: PasswordConfig {
                memory_cost: self.argon2_memory_kib,
                time_cost: self.argon2_iterations,
                pepper: self.password_pepper.clone().filter(|p| !p.is_empty()),
                min_password_length: self.min_password_length,
                ..PasswordConfig::default()
            },
            codes: CodeConfig {
                verification_code_lifetime: Duration::from_secs(self.verification_code_lifetime_secs),
                verification_token_lifetime: Duration::from_secs(
                    self.verification_token_lifetime_secs,
                ),
                reset_token_lifetime: Duration::from_secs(self.reset_token_lifetime_secs),
            },
        }
    }
}

/// One completion provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Overrides the provider's default model
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderSettings {
    fn key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// AI provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Provider names in priority order (`gemini`, `openai`)
    #[serde(default = "default_provider_order")]
    pub order: Vec<String>,

    #[serde(default)]
    pub openai: ProviderSettings,

    #[serde(default)]
    pub gemini: ProviderSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            order: default_provider_order(),
            openai: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
        }
    }
}

impl LlmSettings {
    pub fn provider_order(&self) -> anyhow::Result<Vec<ProviderKind>> {
        self.order
            .iter()
            .map(|name| {
                ProviderKind::from_str(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown LLM provider {:?}", name))
            })
            .collect()
    }

    /// Router over every provider that has an API key
    pub fn build_router(&self) -> anyhow::Result<LLMRouter> {
        let mut builder = LLMRouter::builder().with_order(self.provider_order()?);

        if let Some(key) = self.openai.key() {
            let mut config = OpenAIConfig::new(key);
            if let Some(model) = &self.openai.model {
                config.model = model.clone();
            }
            if let Some(url) = &self.openai.base_url {
                config.base_url = url.clone();
            }
            builder = builder.with_openai(config);
        }

        if let Some(key) = self.gemini.key() {
            let mut config = GeminiConfig::new(key);
            if let Some(model) = &self.gemini.model {
                config.model = model.clone();
            }
            if let Some(url) = &self.gemini.base_url {
                config.base_url = url.clone();
            }
            builder = builder.with_gemini(config);
        }

        Ok(builder.build())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Port of the Prometheus scrape listener
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_jwt_issuer() -> String {
    "expensegenie".to_string()
}

fn default_token_lifetime() -> u64 {
    86_400 // 1 day
}

fn default_argon2_memory() -> u32 {
    19_456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_min_password_length() -> usize {
    6
}

fn default_code_lifetime() -> u64 {
    15 * 60
}

fn default_verification_token_lifetime() -> u64 {
    24 * 60 * 60
}

fn default_reset_token_lifetime() -> u64 {
    60 * 60
}

fn default_provider_order() -> Vec<String> {
    vec!["gemini".to_string(), "openai".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from files and environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("EXPENSEGENIE")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("llm.order")
                .with_list_parse_key("api.cors_origins"),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Local development: in-memory stores, debug logs, no metrics listener
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig {
                in_memory: true,
                ..DatabaseConfig::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            metrics: MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            },
            ..Self::default()
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Problems found at startup; any `errors` stop the server
#[derive(Debug, Default)]
pub struct ConfigReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ServerConfig {
    pub fn validate(&self, dev_mode: bool) -> ConfigReport {
        let mut report = ConfigReport::default();

        if self.auth.jwt_secret.trim().is_empty() {
            report.errors.push("JWT_SECRET is not set".to_string());
        } else if self.auth.jwt_secret == PLACEHOLDER_JWT_SECRET && !dev_mode {
            report
                .errors
                .push("JWT secret must be changed in production. Set JWT_SECRET.".to_string());
        }

        if !self.database.in_memory && self.database.url.trim().is_empty() {
            report
                .errors
                .push("DATABASE_URL is not set (use --in-memory for local runs)".to_string());
        }

        if let Err(e) = self.llm.provider_order() {
            report.errors.push(e.to_string());
        }

        if !self.email.is_deliverable() {
            report.warnings.push(format!(
                "Email transport {:?} cannot deliver mail; messages will only be logged",
                self.email.transport
            ));
        }
        if self.email.frontend_url.trim().is_empty() {
            report
                .warnings
                .push("FRONTEND_URL is not set; email links will be relative".to_string());
        }

        if self.llm.openai.key().is_none() && self.llm.gemini.key().is_none() {
            report.warnings.push(
                "No AI provider key set; categorization and plans use the built-in rules"
                    .to_string(),
            );
        }

        report
    }
}
