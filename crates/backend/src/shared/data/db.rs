use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

const CREATE_ORDER_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS a001_order (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        table_number INTEGER NOT NULL CHECK (table_number > 0),
        items TEXT NOT NULL,
        total_price REAL NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'ready', 'paid')),
        created_at TEXT NOT NULL
    );
"#;

const CREATE_ORDER_INDEXES_SQL: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_a001_order_table_number ON a001_order (table_number);",
    "CREATE INDEX IF NOT EXISTS idx_a001_order_status ON a001_order (status);",
];

/// Строка подключения SQLite для файла БД
fn sqlite_url(db_file: &Path) -> anyhow::Result<String> {
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

/// Подключение к БД и создание схемы, если её ещё нет
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = sqlite_url(db_file)?;
    tracing::info!("Connecting to database: {}", db_url);
    let conn = Database::connect(&db_url).await?;

    let order_table_exists = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name='a001_order';"
                .to_string(),
        ))
        .await?;

    if order_table_exists.is_empty() {
        tracing::info!("Creating a001_order table");
    }

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        CREATE_ORDER_TABLE_SQL.to_string(),
    ))
    .await?;

    for sql in CREATE_ORDER_INDEXES_SQL {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }

    Ok(conn)
}
