use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) server: ServerSettings,
    pub(super) runtime: RuntimeSettings,
    pub(super) api: ApiSettings,
    pub(super) security: SecuritySettings,
    pub(super) cors: CorsSettings,
    pub(super) database: DatabaseSettings,
    pub(super) redis: RedisSettings,
    pub(super) telemetry: TelemetrySettings,
}

/// Listen address; the host is never blank and the port never zero.
#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) api_v1_str: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SecuritySettings {
    pub(crate) secret_key: String,
    pub(crate) token_ttl_minutes: u64,
    pub(crate) algorithm: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

/// Postgres connection, resolved once from `DATABASE_URL` or the `POSTGRES_*` parts.
#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) url: String,
    pub(crate) max_connections: u32,
    /// False when the URL was assembled from parts without a password.
    pub(crate) has_credentials: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RedisSettings {
    pub(crate) url: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    /// Lenient: unknown labels fall back to development.
    pub(crate) fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" => Self::Staging,
            "test" | "testing" => Self::Test,
            _ => Self::Development,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid listen address {host}:{port}")]
    InvalidAddress { host: String, port: String },
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid cors origins: {0}")]
    InvalidCors(String),
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

impl ServerSettings {
    pub(super) fn parse(host: String, port: String) -> Result<Self, ConfigError> {
        match port.parse::<u16>() {
            Ok(parsed) if parsed != 0 && !host.trim().is_empty() => {
                Ok(Self { host, port: parsed })
            }
            _ => Err(ConfigError::InvalidAddress { host, port }),
        }
    }

    pub(crate) fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Pieces of a Postgres DSN when no full URL is configured.
pub(super) struct PostgresParts {
    pub(super) server: String,
    pub(super) port: u16,
    pub(super) user: String,
    pub(super) password: String,
    pub(super) db: String,
}

impl DatabaseSettings {
    pub(super) fn resolve(
        url: Option<String>,
        parts: PostgresParts,
        max_connections: u32,
    ) -> Self {
        match url {
            Some(url) => Self { url, max_connections, has_credentials: true },
            None => Self {
                has_credentials: !parts.password.is_empty(),
                url: format!(
                    "postgresql://{}:{}@{}:{}/{}",
                    parts.user, parts.password, parts.server, parts.port, parts.db
                ),
                max_connections,
            },
        }
    }
}

impl RedisSettings {
    pub(super) fn from_parts(host: &str, port: u16, db: u16, password: &str) -> Self {
        let auth = if password.is_empty() { String::new() } else { format!(":{password}@") };
        Self { url: format!("redis://{auth}{host}:{port}/{db}") }
    }
}
