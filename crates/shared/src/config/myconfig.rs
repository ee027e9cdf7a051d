use anyhow::{Context, Result, anyhow};

/// Payment gateway connection settings. The secret key is mandatory because
/// every confirm/cancel call authenticates with it.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub secret_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub run_migrations: bool,
    pub port: u16,
    pub db_max_conn: u32,
    pub db_min_conn: u32,
    pub otel_endpoint: String,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn init() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("Missing environment variable: DATABASE_URL")?;
        let run_migrations_str = std::env::var("RUN_MIGRATIONS")
            .context("Missing environment variable: RUN_MIGRATIONS")?;
        let port_str = std::env::var("PORT").context("Missing environment variable: PORT")?;

        let run_migrations = match run_migrations_str.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let db_max_conn: u32 = std::env::var("DB_MAX_CONNECTION")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("Unable to parse DB_MAX_CONNECTION as u32")?;

        let db_min_conn: u32 = std::env::var("DB_MIN_CONNECTION")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .context("Unable to parse DB_MIN_CONNECTION as u32")?;

        let port = port_str
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let otel_endpoint = std::env::var("OTEL_ENDPOINT")
            .unwrap_or_else(|_| "http://otel-collector:4317".to_string());

        let gateway_base_url = std::env::var("PAYMENT_GATEWAY_URL")
            .context("Missing environment variable: PAYMENT_GATEWAY_URL")?;
        let gateway_secret_key = std::env::var("PAYMENT_GATEWAY_SECRET")
            .context("Missing environment variable: PAYMENT_GATEWAY_SECRET")?;
        let gateway_timeout_secs: u64 = std::env::var("PAYMENT_GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("Unable to parse PAYMENT_GATEWAY_TIMEOUT_SECS as u64")?;

        Ok(Self {
            database_url,
            run_migrations,
            port,
            db_max_conn,
            db_min_conn,
            otel_endpoint,
            gateway: GatewayConfig {
                base_url: gateway_base_url,
                secret_key: gateway_secret_key,
                timeout_secs: gateway_timeout_secs,
            },
        })
    }
}
