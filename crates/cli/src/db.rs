//! Database initialization and status

use crate::error::CliResult;
use ganacert_persistence::Database;
use std::path::Path;

/// Initialize the database with schema
pub async fn init_database(db_path: &Path, force: bool) -> CliResult<()> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path)?;
        println!("🗑️  Removed existing database");
    }

    let db = open(db_path).await?;
    db.init().await?;
    db.close().await;
    tracing::info!(path = %db_path.display(), "schema initialized");
    Ok(())
}

/// Show database status
pub async fn show_status(db_path: &Path) -> CliResult<()> {
    if !db_path.exists() {
        println!("❌ Database not found at {:?}", db_path);
        println!("   Run 'ganacert init' to create the database");
        return Ok(());
    }

    let db = open(db_path).await?;
    println!("📊 Database Status");
    println!("   Path: {:?}", db_path);
    println!();

    for (label, table) in [
        ("Records:      ", "records"),
        ("Audit entries:", "audit_trail"),
        ("Snapshots:    ", "kpi_snapshots"),
        ("Logos:        ", "logos"),
    ] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap_or((0,));
        println!("   {} {}", label, count.0);
    }

    db.close().await;
    Ok(())
}

/// Open the database, creating parent directories as needed
pub async fn open(db_path: &Path) -> CliResult<Database> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    Ok(Database::open(db_path).await?)
}
