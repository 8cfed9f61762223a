use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_u16,
    parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, PostgresParts, RedisSettings,
    RuntimeSettings, SecuritySettings, ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("QBANK_HOST", "0.0.0.0");
        let port = env_or_default("QBANK_PORT", "8000");

        let environment =
            parse_environment(env_optional("QBANK_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("QBANK_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Question Bank API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let token_ttl_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let database = DatabaseSettings::resolve(
            env_optional("DATABASE_URL"),
            PostgresParts {
                server: env_or_default("POSTGRES_SERVER", "localhost"),
                port: parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?,
                user: env_or_default("POSTGRES_USER", "question_bank"),
                password: env_or_default("POSTGRES_PASSWORD", ""),
                db: env_or_default("POSTGRES_DB", "question_bank"),
            },
            parse_u32(
                "QBANK_DB_MAX_CONNECTIONS",
                env_or_default("QBANK_DB_MAX_CONNECTIONS", "20"),
            )?,
        );

        let redis = RedisSettings::from_parts(
            &env_or_default("REDIS_HOST", "localhost"),
            parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?,
            parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?,
            &env_or_default("REDIS_PASSWORD", ""),
        );

        let log_level = env_or_default("QBANK_LOG_LEVEL", "info");
        let json = env_optional("QBANK_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings::parse(host, port)?,
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, token_ttl_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database,
            redis,
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server(&self) -> &ServerSettings {
        &self.server
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.token_ttl_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if !self.database.has_credentials {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.security.secret_key.len() < 32 {
            return Err(ConfigError::InvalidValue {
                field: "SECRET_KEY",
                value: "<too short>".to_string(),
            });
        }

        Ok(())
    }
}
