//! Dashboard command.

use crate::commands::kpi::print_snapshot;
use crate::db;
use crate::error::CliResult;
use ganacert_business::DashboardComposer;
use ganacert_core::AlertSeverity;
use std::path::Path;
use std::sync::Arc;

pub async fn show(db_path: &Path) -> CliResult<()> {
    let database = db::open(db_path).await?;
    let store = Arc::new(database.store());
    let composer = DashboardComposer::new(store.clone(), store.clone());

    let view = composer.compose().await;
    database.close().await;
    let view = view?;

    println!("📊 Dashboard ({})", view.generated_at.format("%Y-%m-%d %H:%M"));
    println!(
        "   Queue now: {} pending, {} in review",
        view.live.pending, view.live.in_review
    );
    println!();

    match &view.snapshot {
        Some(snapshot) => print_snapshot(snapshot),
        None => println!("ℹ️  No KPI snapshot computed yet - run 'ganacert compute-daily-kpi'"),
    }

    if !view.alerts.is_empty() {
        println!();
        println!("Alerts:");
        for alert in &view.alerts {
            let marker = match alert.severity {
                AlertSeverity::Warning => "⚠️ ",
                AlertSeverity::Error => "❌",
            };
            println!("  {} {}: {}", marker, alert.title, alert.message);
        }
    }

    Ok(())
}
