use serde::Deserialize;
use std::env::vars;
use std::fmt::Display;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub enum Env {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "prod")]
    Prod,
    #[serde(rename = "test")]
    Test,
}

impl Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Prod => write!(f, "prod"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Bucket used for inbound-mail attachment blobs when none is configured.
const DEFAULT_ATTACHMENT_BUCKET: &str = "liaison-email";

// The final, validated configuration struct.
#[derive(Debug, Clone)]
pub struct Config {
    env: Env,
    database_url: String,
    server_addr: String,
    port: u16,
    // Object storage configuration (optional outside prod)
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    s3_access_key_id: Option<String>,
    s3_secret_access_key: Option<String>,
    attachment_bucket: String,
}

// An intermediate struct for deserializing environment variables
// where the defaults have not been applied yet.
#[derive(Deserialize)]
struct RawConfig {
    env: Env,
    database_url: String,
    server_addr: Option<String>,
    port: Option<u16>,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    s3_access_key_id: Option<String>,
    s3_secret_access_key: Option<String>,
    attachment_bucket: Option<String>,
}

impl Config {
    /// Create a test configuration with default values.
    ///
    /// Available to integration tests as well; not for production code.
    pub fn new_for_test() -> Self {
        Self {
            env: Env::Test,
            database_url: "postgres://localhost:5432/test".to_owned(),
            server_addr: "127.0.0.1".to_owned(),
            port: 8080,
            s3_region: None,
            s3_endpoint: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
            attachment_bucket: DEFAULT_ATTACHMENT_BUCKET.to_owned(),
        }
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_local(&self) -> bool {
        matches!(self.env, Env::Local)
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn s3_access_key_id(&self) -> Option<&str> {
        self.s3_access_key_id.as_deref()
    }

    pub fn s3_secret_access_key(&self) -> Option<&str> {
        self.s3_secret_access_key.as_deref()
    }

    pub fn attachment_bucket(&self) -> &str {
        &self.attachment_bucket
    }

    /// Initializes configuration by reading from environment variables
    /// and applying environment-aware defaults.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            env,
            database_url,
            server_addr,
            port,
            s3_region,
            s3_endpoint,
            s3_access_key_id,
            s3_secret_access_key,
            attachment_bucket,
        } = raw_config;

        let server_addr = match server_addr {
            Some(addr) => {
                info!("Using provided SERVER_ADDR: {}", addr);
                addr
            }
            None => {
                let default_addr = match env {
                    Env::Local | Env::Test => "127.0.0.1",
                    Env::Prod => "0.0.0.0",
                };
                info!(
                    "SERVER_ADDR not set, defaulting to {} for {} environment",
                    default_addr, env
                );
                default_addr.to_owned()
            }
        };

        let port = match port {
            Some(port) => port,
            None if matches!(env, Env::Local | Env::Test) => {
                info!("PORT not set, defaulting to 5000 for {} environment", env);
                5000
            }
            None => anyhow::bail!("PORT must be set for {} environment", env),
        };

        // Object storage credentials are required outside local and test
        if matches!(env, Env::Prod) {
            if s3_region.is_none() {
                anyhow::bail!("S3_REGION must be set for {} environment", env);
            }
            if s3_access_key_id.is_none() {
                anyhow::bail!("S3_ACCESS_KEY_ID must be set for {} environment", env);
            }
            if s3_secret_access_key.is_none() {
                anyhow::bail!("S3_SECRET_ACCESS_KEY must be set for {} environment", env);
            }
            info!("Object storage credentials validated for {} environment", env);
        }

        let attachment_bucket =
            attachment_bucket.unwrap_or_else(|| DEFAULT_ATTACHMENT_BUCKET.to_owned());

        Ok(Self {
            env,
            database_url,
            server_addr,
            port,
            s3_region,
            s3_endpoint,
            s3_access_key_id,
            s3_secret_access_key,
            attachment_bucket,
        })
    }
}
