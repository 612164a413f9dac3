use anyhow::{Context, Result};
use std::sync::Arc;

use crate::domain::a001_order::memory::InMemoryOrderRepository;
use crate::domain::a001_order::repository::SeaOrmOrderRepository;
use crate::domain::a001_order::OrderRepository;
use crate::shared::config::{get_database_path, Config, StorageBackend};
use crate::shared::data::db::initialize_database;

/// Создание хранилища заказов по настройкам из config.toml
pub async fn initialize_storage(config: &Config) -> Result<Arc<dyn OrderRepository>> {
    match config.database.backend {
        StorageBackend::Sqlite => {
            let db_path = get_database_path(config);
            let conn = initialize_database(&db_path)
                .await
                .with_context(|| format!("db init failed: {}", db_path.display()))?;
            tracing::info!("Using SQLite storage: {}", db_path.display());
            Ok(Arc::new(SeaOrmOrderRepository::new(conn)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, orders are lost on restart");
            Ok(Arc::new(InMemoryOrderRepository::new()))
        }
    }
}
