use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub ingestion: IngestionConfig,
    pub docs: DocsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Retry settings for store interactions, read once at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestionConfig {
    /// Total attempts per store operation (first try included)
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts
    pub retry_backoff: Duration,
}

/// OpenAPI document settings
#[derive(Debug, Clone)]
pub struct DocsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            ingestion: IngestionConfig::from_env()?,
            docs: DocsConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024; // 1MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// `DATABASE_URL` wins when set; otherwise the URL is assembled from the
    /// discrete `PG_*` variables with local development defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
            Some(url) => url,
            None => {
                let host = lookup("PG_HOST").unwrap_or_else(|| "localhost".to_string());
                let port = lookup("PG_PORT")
                    .unwrap_or_else(|| "5432".to_string())
                    .parse::<u16>()
                    .map_err(|_| "PG_PORT must be a valid port number".to_string())?;
                let db = lookup("PG_DB").unwrap_or_else(|| "postgres".to_string());
                let user = lookup("PG_USER").unwrap_or_else(|| "postgres".to_string());
                let password = lookup("PG_PASSWORD").unwrap_or_else(|| "root".to_string());
                format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, db)
            }
        };

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?;
        let min_connections = parse_or(&lookup, "DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?;
        let acquire_timeout_secs = parse_or(
            &lookup,
            "DB_ACQUIRE_TIMEOUT_SECS",
            Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )?;
        let idle_timeout_secs =
            parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?;
        let max_lifetime_secs =
            parse_or(&lookup, "DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }

    /// Connection URL with the password masked, for logging
    pub fn redacted_url(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(mut parsed) if parsed.password().is_some() => {
                let _ = parsed.set_password(Some("***"));
                parsed.to_string()
            }
            Ok(parsed) => parsed.to_string(),
            Err(_) => "<unparseable database url>".to_string(),
        }
    }
}

impl IngestionConfig {
    const DEFAULT_MAX_RETRIES: u32 = 3;
    const DEFAULT_RETRY_BACKOFF_SECS: f64 = 0.5;

    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_retries = parse_or(&lookup, "MAX_RETRIES", Self::DEFAULT_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err("MAX_RETRIES must be at least 1".to_string());
        }

        let backoff_secs = parse_or(&lookup, "RETRY_BACKOFF", Self::DEFAULT_RETRY_BACKOFF_SECS)?;
        let retry_backoff = Duration::try_from_secs_f64(backoff_secs)
            .map_err(|_| "RETRY_BACKOFF must be a non-negative number of seconds".to_string())?;

        Ok(Self {
            max_retries,
            retry_backoff,
        })
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_secs_f64(Self::DEFAULT_RETRY_BACKOFF_SECS),
        }
    }
}

impl DocsConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("DOCS_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("DOCS_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("DOCS_TITLE").unwrap_or_else(|_| "Hotel Upload API".to_string());
        let version = env::var("DOCS_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("DOCS_DESCRIPTION")
            .unwrap_or_else(|_| "Hotel invoice upload ingestion".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
