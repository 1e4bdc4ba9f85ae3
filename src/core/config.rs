use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub identity_m2m: IdentityM2MConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Optional file holding a rotating database password/token. Re-read on
    /// every connection-cache rebuild so rotated credentials are picked up.
    pub auth_token_file: Option<String>,
    pub cache_ttl_secs: u64,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Machine-to-machine credentials for the identity provider's management API.
/// User mutations are mirrored there after the local commit succeeds.
#[derive(Debug, Clone)]
pub struct IdentityM2MConfig {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub token_url: String,
    pub api_base_url: String,
}

/// S3-compatible storage configuration for load document uploads
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Endpoint URL of the S3-compatible service
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket holding load documents
    pub bucket: String,
    /// Region (for S3 compatibility)
    pub region: String,
    /// Presigned upload URL expiry in seconds
    pub upload_url_expiry_secs: u32,
    /// Presigned download URL expiry in seconds
    pub download_url_expiry_secs: u32,
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
            swagger: SwaggerConfig::from_env()?,
            identity_m2m: IdentityM2MConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl AppConfig {
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

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Conservative pool defaults for small-medium deployments
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    /// Cached handles are rebuilt after this long; the embedded auth token
    /// expires shortly after.
    const DEFAULT_CACHE_TTL_SECS: u64 = 600; // 10 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let auth_token_file = env::var("DB_AUTH_TOKEN_FILE").ok().filter(|s| !s.is_empty());

        let cache_ttl_secs = env::var("DB_CACHE_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_CACHE_TTL_SECS must be a valid number".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            auth_token_file,
            cache_ttl_secs,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Freightline API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for Freightline".to_string());

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

impl IdentityM2MConfig {
    pub fn from_env() -> Result<Self, String> {
        let client_id = env::var("IDENTITY_M2M_CLIENT_ID")
            .map_err(|_| "IDENTITY_M2M_CLIENT_ID environment variable is required".to_string())?;

        let client_secret = env::var("IDENTITY_M2M_CLIENT_SECRET").map_err(|_| {
            "IDENTITY_M2M_CLIENT_SECRET environment variable is required".to_string()
        })?;

        let scope = env::var("IDENTITY_M2M_SCOPE").unwrap_or_else(|_| "all".to_string());

        let issuer = env::var("IDENTITY_ISSUER")
            .map_err(|_| "IDENTITY_ISSUER environment variable is required".to_string())?;
        let token_url = format!("{}/token", issuer);

        // Management API lives next to the issuer (strip the /oidc suffix if present)
        let api_base_url = issuer.trim_end_matches("/oidc").to_string();

        Ok(Self {
            client_id,
            client_secret,
            scope,
            token_url,
            api_base_url,
        })
    }
}

impl StorageConfig {
    const DEFAULT_UPLOAD_URL_EXPIRY_SECS: u32 = 900; // 15 minutes
    const DEFAULT_DOWNLOAD_URL_EXPIRY_SECS: u32 = 3600; // 1 hour
    const MAX_UPLOAD_URL_EXPIRY_SECS: u32 = 3600;

    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key =
            env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key =
            env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("STORAGE_BUCKET").unwrap_or_else(|_| "freightline-files".to_string());

        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let upload_url_expiry_secs = env::var("STORAGE_UPLOAD_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_UPLOAD_URL_EXPIRY_SECS.to_string())
            .parse::<u32>()
            .map_err(|_| "STORAGE_UPLOAD_URL_EXPIRY_SECS must be a valid number".to_string())?;

        if upload_url_expiry_secs == 0 || upload_url_expiry_secs > Self::MAX_UPLOAD_URL_EXPIRY_SECS
        {
            return Err(format!(
                "STORAGE_UPLOAD_URL_EXPIRY_SECS must be between 1 and {}",
                Self::MAX_UPLOAD_URL_EXPIRY_SECS
            ));
        }

        let download_url_expiry_secs = env::var("STORAGE_DOWNLOAD_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_DOWNLOAD_URL_EXPIRY_SECS.to_string())
            .parse::<u32>()
            .map_err(|_| "STORAGE_DOWNLOAD_URL_EXPIRY_SECS must be a valid number".to_string())?;

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            upload_url_expiry_secs,
            download_url_expiry_secs,
        })
    }
}
