//! Record commands: create, list, show, transition, bulk approve/reject.

use crate::error::CliResult;
use crate::{db, RecordAction};
use chrono::Utc;
use ganacert_business::{
    AuditTrailStore, BatchOutcome, CancelToken, RecordFilter, RecordStore, StateTransitionEngine,
};
use ganacert_core::{BrandStatus, CertificationRecord};
use ganacert_persistence::SqliteStore;
use std::path::Path;
use std::sync::Arc;

pub async fn handle(db_path: &Path, action: RecordAction) -> CliResult<()> {
    let database = db::open(db_path).await?;
    let store = Arc::new(database.store());
    let result = dispatch(&store, action).await;
    database.close().await;
    result
}

async fn dispatch(store: &Arc<SqliteStore>, action: RecordAction) -> CliResult<()> {
    match action {
        RecordAction::Create {
            brand_number,
            owner,
            national_id,
            breed,
            purpose,
            head_count,
            department,
            municipality,
            amount,
            phone,
            community,
            notes,
            created_by,
        } => {
            let next = store.count_by(&RecordFilter::new()).await? + 1;
            let mut record = CertificationRecord::new(
                CertificationRecord::generate_id(next),
                brand_number,
                owner,
                national_id,
                breed.to_core(),
                purpose.to_core(),
                head_count,
                department.to_core(),
                municipality,
                amount,
                Utc::now(),
            )
            .map_err(ganacert_business::BusinessError::from)?;
            record.phone = phone;
            record.community = community;
            record.notes = notes;
            record.created_by = created_by;

            store.save(&record).await?;
            println!("✅ Registered {} (brand {})", record.id, record.brand_number);
        }

        RecordAction::List {
            status,
            department,
            limit,
            offset,
        } => {
            let mut filter = RecordFilter::new();
            if let Some(status) = status {
                filter = filter.with_status(status.to_core());
            }
            if let Some(department) = department {
                filter = filter.in_department(department.to_core());
            }

            let records = store.list(&filter, limit, offset).await?;
            if records.is_empty() {
                println!("No records found.");
                return Ok(());
            }

            println!(
                "{:<10} {:<12} {:<22} {:>6} {:<12} {:<10}",
                "ID", "BRAND", "OWNER", "HEAD", "DEPARTMENT", "STATUS"
            );
            println!("{}", "-".repeat(78));
            for record in &records {
                println!(
                    "{:<10} {:<12} {:<22} {:>6} {:<12} {:<10}",
                    record.id,
                    record.brand_number,
                    truncate(&record.owner_name, 22),
                    record.head_count,
                    record.department,
                    record.status
                );
            }
            println!("({} shown)", records.len());
        }

        RecordAction::Show { record_id } => {
            let record = store.get(&record_id).await?;
            println!("📋 {}", record);
            println!("   Owner:      {} (CI {})", record.owner_name, record.national_id);
            println!("   Breed:      {} / {}", record.breed, record.purpose);
            println!("   Location:   {}, {}", record.municipality, record.department);
            println!("   Amount:     {} Bs", record.certification_amount);
            println!("   Registered: {}", record.registered_at.format("%Y-%m-%d %H:%M"));
            if let Some(processed_at) = record.processed_at {
                println!(
                    "   Processed:  {} ({} h)",
                    processed_at.format("%Y-%m-%d %H:%M"),
                    record.processing_hours.unwrap_or(0)
                );
            }

            let trail = store.list_for_record(&record_id).await?;
            if !trail.is_empty() {
                println!("\n   History:");
                for entry in trail {
                    println!(
                        "   {} {} -> {} by {}",
                        entry.changed_at.format("%Y-%m-%d %H:%M"),
                        entry.previous_status,
                        entry.new_status,
                        entry.actor
                    );
                }
            }
        }

        RecordAction::Transition {
            record_id,
            status,
            actor,
            notes,
        } => {
            let engine = StateTransitionEngine::new(store.clone(), store.clone());
            let entry = engine
                .transition(&record_id, status.to_core(), &actor, notes.as_deref())
                .await?;
            println!(
                "✅ {} {} -> {} (audit {})",
                record_id, entry.previous_status, entry.new_status, entry.id
            );
        }

        RecordAction::Approve {
            record_ids,
            actor,
            notes,
        } => {
            bulk(store, &record_ids, BrandStatus::Approved, &actor, notes.as_deref()).await?;
        }

        RecordAction::Reject {
            record_ids,
            actor,
            notes,
        } => {
            bulk(store, &record_ids, BrandStatus::Rejected, &actor, notes.as_deref()).await?;
        }
    }

    Ok(())
}

async fn bulk(
    store: &Arc<SqliteStore>,
    record_ids: &[String],
    status: BrandStatus,
    actor: &str,
    notes: Option<&str>,
) -> CliResult<()> {
    let engine = StateTransitionEngine::new(store.clone(), store.clone());
    let outcome = engine
        .transition_many(record_ids, status, actor, notes, &CancelToken::new())
        .await?;
    print_outcome(&outcome, status);
    Ok(())
}

fn print_outcome(outcome: &BatchOutcome, status: BrandStatus) {
    println!(
        "{} applied, {} failed ({})",
        outcome.applied.len(),
        outcome.failed.len(),
        status
    );
    for (record_id, err) in &outcome.failed {
        println!("  ❌ {}: {} ({})", record_id, err, err.kind());
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
