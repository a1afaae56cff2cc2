//! KPI commands: the compute-daily-kpi cron surface.

use crate::db;
use crate::error::CliResult;
use chrono::{NaiveDate, Utc};
use ganacert_business::{CancelToken, MetricsAggregator};
use ganacert_core::KPISnapshot;
use std::path::Path;
use std::sync::Arc;

pub async fn compute(
    db_path: &Path,
    date: Option<NaiveDate>,
    range: Option<(NaiveDate, NaiveDate)>,
) -> CliResult<()> {
    let database = db::open(db_path).await?;
    let store = Arc::new(database.store());
    let aggregator = MetricsAggregator::new(store.clone(), store.clone(), store.clone());

    let result = match range {
        Some((start, end)) => {
            let outcome = aggregator
                .compute_range(start, end, &CancelToken::new())
                .await;
            match outcome {
                Ok(outcome) => {
                    println!(
                        "✅ {} snapshot(s) computed, {} failed",
                        outcome.computed.len(),
                        outcome.failed.len()
                    );
                    for (date, err) in &outcome.failed {
                        println!("  ❌ {}: {}", date, err);
                    }
                    Ok(())
                }
                Err(err) => Err(err.into()),
            }
        }
        None => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            aggregator
                .compute_snapshot(date)
                .await
                .map(|snapshot| print_snapshot(&snapshot))
                .map_err(Into::into)
        }
    };

    database.close().await;
    result
}

pub fn print_snapshot(snapshot: &KPISnapshot) {
    println!("📈 KPI snapshot {}", snapshot.date);
    println!(
        "   Registered: {} (approved {}, rejected {}, pending {})",
        snapshot.registered, snapshot.approved, snapshot.rejected, snapshot.pending
    );
    println!("   Approval rate:     {:.1}%", snapshot.approval_rate);
    println!(
        "   Processing hours:  {:.1} average",
        snapshot.average_processing_hours
    );
    println!(
        "   Head count:        {} total, {:.1} per brand",
        snapshot.total_head_count, snapshot.average_head_per_brand
    );
    println!(
        "   Purpose:           meat {}, dairy {}, dual {}, breeding {}",
        snapshot.purposes.meat,
        snapshot.purposes.dairy,
        snapshot.purposes.dual_purpose,
        snapshot.purposes.breeding
    );
    println!(
        "   Departments:       Santa Cruz {}, Beni {}, La Paz {}, other {}",
        snapshot.departments.santa_cruz,
        snapshot.departments.beni,
        snapshot.departments.la_paz,
        snapshot.departments.other
    );
    println!(
        "   Logos:             {} generated, {:.1}% success, {:.1}s average",
        snapshot.logo_count,
        snapshot.logo_success_rate,
        snapshot.average_logo_generation_seconds
    );
}
