use anyhow::Context;
use axum::http::HeaderValue;

const DEFAULT_CORS_ORIGINS: &str = "https://mern-intern-2025.vercel.app,http://localhost:3000";

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
        )?;

        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>().with_context(|| format!("invalid APP_PORT {v:?}"))?,
            Err(_) => 8001,
        };

        Ok(Self {
            database_url,
            jwt: JwtConfig { secret },
            cors_origins,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
        })
    }
}

/// Splits a comma-separated origin list, dropping blanks. Every entry has to be
/// usable as an `Access-Control-Allow-Origin` value. The `*` wildcard is refused:
/// credentials are allowed, and CORS forbids a wildcard alongside them.
pub fn parse_origins(raw: &str) -> anyhow::Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            anyhow::ensure!(o != "*", "wildcard CORS origin is not allowed with credentials");
            HeaderValue::from_str(o)
                .map(|_| o.to_string())
                .with_context(|| format!("invalid CORS origin {o:?}"))
        })
        .collect()
}
