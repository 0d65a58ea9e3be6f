use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// immutable afterwards; handlers reach it through the shared `AppState` via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Upper bound for the sqlx connection pool.
    pub db_max_connections: u32,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Runtime environment marker. Controls log format and which settings are mandatory.
    pub env: Env,
    // Optional account created at startup when both halves are present.
    pub seed_username: Option<String>,
    pub seed_password: Option<String>,
}

/// Env
///
/// The runtime context: `Local` favours convenience (pretty logs, optional database),
/// `Production` fails fast on missing settings and logs JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for test scaffolding: local, in-memory, no seed user.
    fn default() -> Self {
        Self {
            db_url: None,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: "127.0.0.1:0".to_string(),
            env: Env::Local,
            seed_username: None,
            seed_password: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from the environment (after `.env` has been applied by main).
    ///
    /// # Panics
    /// Panics when `DATABASE_URL` is missing in production, or when
    /// `DB_MAX_CONNECTIONS` is set but not a positive integer. Starting half-configured
    /// is worse than not starting.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = match env {
            Env::Production => Some(
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production"),
            ),
            Env::Local => env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
        };

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .expect("FATAL: DB_MAX_CONNECTIONS must be a positive integer"),
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Self {
            db_url,
            db_max_connections,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            env,
            seed_username: env::var("SEED_USERNAME").ok().filter(|s| !s.is_empty()),
            seed_password: env::var("SEED_PASSWORD").ok().filter(|s| !s.is_empty()),
        }
    }

    /// The seed account, if both username and password were configured.
    pub fn seed_credentials(&self) -> Option<(&str, &str)> {
        match (&self.seed_username, &self.seed_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}
