//! Configuration management for the catalog gateway.
//!
//! This module provides a CLI built on clap that supports:
//! - Command-line arguments
//! - Environment variables with `CATALOG_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Commands
//!
//! - `serve` (default) - run the HTTP gateway
//! - `resolve <path>` - show how a request path is routed and which storage key it reads
//! - `check` - test connectivity to the backing stores
//!
//! # Environment Variables
//!
//! - `CATALOG_HOST` - Server bind address (default: 0.0.0.0)
//! - `CATALOG_PORT` - Server port (default: 3000)
//! - `CATALOG_S3_BUCKET` - Blob store bucket (required)
//! - `CATALOG_KV_BUCKET` - Key-value store bucket (default: the blob bucket)
//! - `CATALOG_S3_ENDPOINT` - Custom endpoint for S3-compatible services
//! - `CATALOG_S3_REGION` - Region (default: us-east-1)
//! - `CATALOG_KEY_ROOT` - First segment of every storage key (default: catalog)
//! - `CATALOG_LEGACY_PREFIX` - Legacy mount prefix (default: /catalog)
//! - `CATALOG_PAGE_URL` - Target of the `/` redirect (required)
//! - `CATALOG_WORKER_NAME` - Identity reported by `/_health`
//! - `CATALOG_INGEST_ENABLED` - Feature flag for the ingest webhook
//! - `CATALOG_REGISTRY_MAX_AGE` / `CATALOG_LATEST_MAX_AGE` / `CATALOG_ARTIFACT_MAX_AGE`
//! - `CATALOG_CORS_ORIGIN` - Value of `Access-Control-Allow-Origin` (default: *)

use clap::{Args, Parser, Subcommand};
use http::HeaderValue;

use crate::key::DEFAULT_KEY_ROOT;
use crate::server::envelope::{
    DEFAULT_ARTIFACT_MAX_AGE, DEFAULT_LATEST_MAX_AGE, DEFAULT_REGISTRY_MAX_AGE,
};
use crate::server::path::DEFAULT_LEGACY_PREFIX;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default worker identity.
pub const DEFAULT_WORKER_NAME: &str = "catalog-gateway";

/// Default `Access-Control-Allow-Origin`.
pub const DEFAULT_CORS_ORIGIN: &str = "*";

// =============================================================================
// CLI
// =============================================================================

/// Catalog Gateway - versioned read access to a catalog of artifacts.
///
/// Resolves `/{kind}/{id}/{version}/{file}` URLs onto a blob store, serves
/// registry listings and redirects `latest` aliases to concrete versions.
#[derive(Parser, Debug, Clone)]
#[command(name = "catalog-gateway")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// The selected command, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP gateway
    Serve(ServeConfig),

    /// Show the route and storage key for a request path (offline)
    Resolve(ResolveConfig),

    /// Test connectivity to the backing stores
    Check(CheckConfig),
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Backing store settings shared by `serve` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreConfig {
    /// Bucket holding versioned artifacts.
    #[arg(long, env = "CATALOG_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Bucket holding registry listings and latest pointers.
    ///
    /// Defaults to the artifact bucket.
    #[arg(long, env = "CATALOG_KV_BUCKET")]
    pub kv_bucket: Option<String>,

    /// Custom endpoint URL for S3-compatible services (MinIO, R2, etc.).
    #[arg(long, env = "CATALOG_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "CATALOG_S3_REGION")]
    pub s3_region: String,

    /// First segment of every storage key.
    #[arg(long, default_value = DEFAULT_KEY_ROOT, env = "CATALOG_KEY_ROOT")]
    pub key_root: String,
}

impl StoreConfig {
    /// Validate the store settings.
    pub fn validate(&self) -> Result<(), String> {
        match self.s3_bucket.as_deref() {
            Some(bucket) if !bucket.trim().is_empty() => {}
            _ => {
                return Err(
                    "S3 bucket name is required. Set --s3-bucket or CATALOG_S3_BUCKET".to_string(),
                )
            }
        }

        if matches!(self.kv_bucket.as_deref(), Some(b) if b.trim().is_empty()) {
            return Err("kv_bucket must not be empty when set".to_string());
        }

        if self.key_root.trim_matches('/').is_empty() {
            return Err("key_root must contain at least one segment".to_string());
        }

        Ok(())
    }

    /// Artifact bucket (empty if unset; call validate() first).
    pub fn blob_bucket(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or("")
    }

    /// Listing/pointer bucket, falling back to the artifact bucket.
    pub fn kv_bucket(&self) -> &str {
        self.kv_bucket.as_deref().unwrap_or_else(|| self.blob_bucket())
    }
}

// =============================================================================
// Serve Configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "CATALOG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "CATALOG_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub store: StoreConfig,

    /// Legacy mount prefix accepted ahead of every route. Empty disables it.
    #[arg(long, default_value = DEFAULT_LEGACY_PREFIX, env = "CATALOG_LEGACY_PREFIX")]
    pub legacy_prefix: String,

    /// Human-facing catalog page that `/` redirects to.
    #[arg(long, env = "CATALOG_PAGE_URL")]
    pub catalog_page_url: Option<String>,

    /// Identity reported by the health check.
    #[arg(long, default_value = DEFAULT_WORKER_NAME, env = "CATALOG_WORKER_NAME")]
    pub worker_name: String,

    /// Enable the ingest webhook (still answers 501 until the pipeline exists).
    #[arg(long, env = "CATALOG_INGEST_ENABLED")]
    pub ingest_enabled: bool,

    /// Cache-Control max-age for registry listings, in seconds.
    #[arg(long, default_value_t = DEFAULT_REGISTRY_MAX_AGE, env = "CATALOG_REGISTRY_MAX_AGE")]
    pub registry_max_age: u32,

    /// Cache-Control max-age for latest redirects, in seconds.
    #[arg(long, default_value_t = DEFAULT_LATEST_MAX_AGE, env = "CATALOG_LATEST_MAX_AGE")]
    pub latest_max_age: u32,

    /// Cache-Control max-age for versioned artifacts, in seconds.
    #[arg(long, default_value_t = DEFAULT_ARTIFACT_MAX_AGE, env = "CATALOG_ARTIFACT_MAX_AGE")]
    pub artifact_max_age: u32,

    /// Value of Access-Control-Allow-Origin on every response.
    #[arg(long, default_value = DEFAULT_CORS_ORIGIN, env = "CATALOG_CORS_ORIGIN")]
    pub cors_origin: String,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.store.validate()?;

        match self.catalog_page_url.as_deref() {
            Some(url) if !url.trim().is_empty() => {
                if HeaderValue::from_str(url).is_err() {
                    return Err("catalog_page_url is not a valid header value".to_string());
                }
            }
            _ => {
                return Err(
                    "Catalog page URL is required. Set --catalog-page-url or CATALOG_PAGE_URL"
                        .to_string(),
                )
            }
        }

        if self.worker_name.trim().is_empty() {
            return Err("worker_name must not be empty".to_string());
        }

        if HeaderValue::from_str(&self.cors_origin).is_err() {
            return Err("cors_origin is not a valid header value".to_string());
        }

        if self.artifact_max_age == 0 {
            return Err("artifact_max_age must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Catalog page URL (empty if unset; call validate() first).
    pub fn catalog_page_url_or_empty(&self) -> &str {
        self.catalog_page_url.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Resolve Configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ResolveConfig {
    /// Request path to resolve (e.g. /catalog/tools/x/latest/pkg.tar.gz).
    pub path: String,

    /// HTTP method of the request.
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Legacy mount prefix. Empty disables it.
    #[arg(long, default_value = DEFAULT_LEGACY_PREFIX, env = "CATALOG_LEGACY_PREFIX")]
    pub legacy_prefix: String,

    /// First segment of every storage key.
    #[arg(long, default_value = DEFAULT_KEY_ROOT, env = "CATALOG_KEY_ROOT")]
    pub key_root: String,

    /// Print the result as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl ResolveConfig {
    /// Parse the configured method.
    pub fn parse_method(&self) -> Result<http::Method, String> {
        self.method
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| format!("Invalid HTTP method: {}", self.method))
    }
}

// =============================================================================
// Check Configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub store: StoreConfig,

    /// Also fetch the registry listing for this kind.
    #[arg(long)]
    pub kind: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
