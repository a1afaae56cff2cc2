//! Audit trail commands.

use crate::db;
use crate::error::{CliError, CliResult};
use chrono::{NaiveDate, NaiveTime};
use ganacert_business::AuditTrailStore;
use ganacert_core::AuditEntry;
use std::path::Path;

pub async fn run(
    db_path: &Path,
    record_id: Option<String>,
    since: Option<NaiveDate>,
    by_actor: bool,
    by_day: bool,
) -> CliResult<()> {
    let database = db::open(db_path).await?;
    let store = database.store();
    let result = dispatch(&store, record_id, since, by_actor, by_day).await;
    database.close().await;
    result
}

async fn dispatch(
    store: &dyn AuditTrailStore,
    record_id: Option<String>,
    since: Option<NaiveDate>,
    by_actor: bool,
    by_day: bool,
) -> CliResult<()> {
    if by_actor {
        let counts = store.aggregate_by_actor().await?;
        let mut rows: Vec<(String, u64)> = counts.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        println!("{:<20} {:>8}", "ACTOR", "CHANGES");
        for (actor, count) in rows {
            println!("{:<20} {:>8}", actor, count);
        }
        return Ok(());
    }

    if by_day {
        let since = since.ok_or_else(|| {
            CliError::InvalidArgument("--by-day requires --since".to_string())
        })?;
        let since = since.and_time(NaiveTime::MIN).and_utc();
        let counts = store.aggregate_by_day(since).await?;

        println!("{:<12} {:>8}", "DATE", "CHANGES");
        for daily in counts {
            println!("{:<12} {:>8}", daily.date, daily.count);
        }
        return Ok(());
    }

    let entries = match (&record_id, since) {
        (Some(record_id), _) => store.list_for_record(record_id).await?,
        (None, Some(since)) => {
            store
                .list_recent(since.and_time(NaiveTime::MIN).and_utc())
                .await?
        }
        (None, None) => {
            return Err(CliError::InvalidArgument(
                "pass a record id, --since, --by-actor, or --by-day".to_string(),
            ));
        }
    };

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    println!(
        "{:<18} {:<10} {:<12} {:<12} {:<12}",
        "CHANGED AT", "RECORD", "FROM", "TO", "ACTOR"
    );
    println!("{}", "-".repeat(68));
    for entry in &entries {
        print_entry(entry);
    }
    println!("({} entries)", entries.len());

    Ok(())
}

fn print_entry(entry: &AuditEntry) {
    println!(
        "{:<18} {:<10} {:<12} {:<12} {:<12}",
        entry.changed_at.format("%Y-%m-%d %H:%M"),
        entry.record_id,
        entry.previous_status.as_str(),
        entry.new_status.as_str(),
        entry.actor
    );
}
