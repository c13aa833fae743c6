//! Database connection management
//!
//! Builds the connection pool for the record store.

pub mod queries;
mod store;

pub use store::{PgRecordStore, RecordStore};

#[cfg(test)]
pub(crate) use store::testing;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::info;

/// Create a connection pool and verify the database answers
pub async fn connect(config: &DatabaseConfig) -> AppResult<Pool> {
    let pool = create_pool(config)?;

    // Test connection
    let client = pool.get().await?;
    client.query_one("SELECT 1", &[]).await?;
    drop(client);

    info!(
        "Database connection established ({}:{}/{}, TLS: {})",
        config.host, config.port, config.database, config.use_tls
    );
    Ok(pool)
}

/// Create a connection pool with given configuration
fn create_pool(config: &DatabaseConfig) -> AppResult<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_pool_size));

    if config.use_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
        cfg.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| AppError::Config(format!("Failed to create TLS pool: {}", e)))
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| AppError::Config(format!("Failed to create pool: {}", e)))
    }
}
