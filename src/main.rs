//! Catalog Gateway - versioned read access to a catalog of artifacts.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_gateway::{
    catalog::CatalogService,
    config::{CheckConfig, Cli, Command, ResolveConfig, ServeConfig},
    key::CatalogKeys,
    server::{create_router, normalize, normalize_prefix, CachePolicy, CorsPolicy, Route, RouterConfig},
    store::{create_s3_client, KvStore, S3BlobStore, S3KvStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Resolve(config) => run_resolve(config),
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let router_config = match build_router_config(&config) {
        Ok(router_config) => router_config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Catalog Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Blob bucket: {}", config.store.blob_bucket());
    info!("  KV bucket: {}", config.store.kv_bucket());
    if let Some(ref endpoint) = config.store.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.store.s3_region);
    info!("  Key root: {}", config.store.key_root);
    match router_config.legacy_prefix {
        Some(ref prefix) => info!("  Legacy prefix: {}", prefix),
        None => info!("  Legacy prefix: disabled"),
    }
    info!(
        "  Cache: registry {}s, latest {}s, artifacts {}s",
        config.registry_max_age, config.latest_max_age, config.artifact_max_age
    );
    if config.ingest_enabled {
        warn!("  Ingest: flag set, but the publish pipeline is not implemented (501)");
    } else {
        info!("  Ingest: disabled");
    }

    let client = create_s3_client(config.store.s3_endpoint.as_deref(), &config.store.s3_region).await;
    let kv = S3KvStore::new(client.clone(), config.store.kv_bucket());
    let blobs = S3BlobStore::new(client, config.store.blob_bucket());

    let catalog = CatalogService::new(Arc::new(kv), Arc::new(blobs))
        .with_keys(CatalogKeys::new(config.store.key_root.clone()));

    let router = create_router(catalog, router_config);

    let addr = config.bind_address();
    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/_health", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "catalog_gateway=debug,tower_http=debug"
    } else {
        "catalog_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> Result<RouterConfig, String> {
    let cors = CorsPolicy::permissive()
        .with_allow_origin(&config.cors_origin)
        .map_err(|e| format!("invalid cors origin: {}", e))?;

    Ok(RouterConfig::new(config.catalog_page_url_or_empty())
        .with_legacy_prefix(&config.legacy_prefix)
        .with_worker_name(config.worker_name.clone())
        .with_ingest_enabled(config.ingest_enabled)
        .with_cache_policy(CachePolicy {
            registry_max_age: config.registry_max_age,
            latest_max_age: config.latest_max_age,
            artifact_max_age: config.artifact_max_age,
        })
        .with_cors(cors)
        .with_tracing(!config.no_tracing))
}

// =============================================================================
// Resolve Command
// =============================================================================

fn run_resolve(config: ResolveConfig) -> ExitCode {
    let method = match config.parse_method() {
        Ok(method) => method,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let prefix = normalize_prefix(&config.legacy_prefix);
    let raw_path = config.path.split('?').next().unwrap_or("");
    let normalized = normalize(raw_path, prefix.as_deref());
    let keys = CatalogKeys::new(config.key_root.clone());

    let route = match Route::classify(&method, normalized.path) {
        Ok(route) => route,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let key = match &route {
        Route::Registry { kind } => Some(keys.registry(kind)),
        Route::LatestAlias { kind, id, .. } => Some(keys.latest(kind, id)),
        Route::Artifact {
            kind,
            id,
            version,
            file,
        } => Some(keys.artifact(kind, id, version, file)),
        _ => None,
    };

    if config.json {
        let json = serde_json::json!({
            "path": config.path,
            "normalized": normalized.path,
            "legacy_prefix": normalized.legacy,
            "route": route.name(),
            "key": key,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("Path:       {}", config.path);
        println!("Normalized: {}", normalized.path);
        println!("Legacy:     {}", normalized.legacy);
        println!("Route:      {}", route.name());
        match key {
            Some(key) => println!("Key:        {}", key),
            None => println!("Key:        (none)"),
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Catalog Gateway Configuration Check");
    println!("═══════════════════════════════════");
    println!();

    if let Err(e) = config.store.validate() {
        println!("✗ {}", e);
        return ExitCode::FAILURE;
    }

    let blob_bucket = config.store.blob_bucket();
    let kv_bucket = config.store.kv_bucket();
    println!("✓ Blob bucket: {}", blob_bucket);
    println!("✓ KV bucket: {}", kv_bucket);
    if let Some(ref endpoint) = config.store.s3_endpoint {
        println!("✓ Endpoint: {}", endpoint);
    }
    println!("✓ Region: {}", config.store.s3_region);
    println!();

    let client = create_s3_client(config.store.s3_endpoint.as_deref(), &config.store.s3_region).await;

    let mut buckets = vec![blob_bucket];
    if kv_bucket != blob_bucket {
        buckets.push(kv_bucket);
    }

    for bucket in buckets {
        print!("Testing bucket '{}'... ", bucket);
        match client.head_bucket().bucket(bucket).send().await {
            Ok(_) => println!("✓ success"),
            Err(e) => {
                println!("✗ failed");
                println!();
                println!("Error: {}", e);
                println!();
                println!("Please check:");
                println!("  - Your credentials are configured correctly");
                println!("  - The bucket '{}' exists and is accessible", bucket);
                if config.store.s3_endpoint.is_some() {
                    println!("  - The S3 endpoint is correct and reachable");
                }
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(ref kind) = config.kind {
        let keys = CatalogKeys::new(config.store.key_root.clone());
        let key = keys.registry(kind);
        let kv = S3KvStore::new(client, kv_bucket);

        println!();
        print!("Fetching '{}'... ", key);
        match kv.get(&key).await {
            Ok(Some(body)) => println!("✓ {} bytes", body.len()),
            Ok(None) => {
                println!("✗ not found");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                println!("✗ {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("═══════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
