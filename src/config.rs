use std::env;

use chrono_tz::Tz;

/// Hourly.
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_audience: Option<String>,

    /// Timezone that decides "today" and which month the snapshot job targets.
    pub reference_timezone: Tz,

    pub snapshot_scheduler_enabled: bool,
    pub snapshot_check_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|extra| {
                    extra
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_audience: env::var("JWT_AUDIENCE").ok().filter(|s| !s.is_empty()),

            reference_timezone: env::var("REFERENCE_TIMEZONE")
                .unwrap_or_else(|_| "Europe/Amsterdam".into())
                .parse()
                .expect("REFERENCE_TIMEZONE must be an IANA timezone name"),

            snapshot_scheduler_enabled: env::var("SNAPSHOT_SCHEDULER_ENABLED")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
            snapshot_check_interval_secs: check_interval_secs(
                env::var("SNAPSHOT_CHECK_INTERVAL_SECS").ok().as_deref(),
            ),
        }
    }

    /// Settings for tests and local tooling; no environment access.
    pub fn for_secret(jwt_secret: &str) -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:5173".into(),
            cors_extra_origins: Vec::new(),
            jwt_secret: jwt_secret.to_string(),
            jwt_audience: None,
            reference_timezone: chrono_tz::Europe::Amsterdam,
            snapshot_scheduler_enabled: false,
            snapshot_check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Zero, negative or unparsable intervals fall back to the default; the
/// scheduler's timer cannot tick at a zero period.
fn check_interval_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS)
}
