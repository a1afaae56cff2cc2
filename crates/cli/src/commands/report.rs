//! Report command: the generate-report cron surface.

use crate::db;
use crate::error::CliResult;
use crate::FormatArg;
use chrono::NaiveDate;
use ganacert_core::ReportType;
use ganacert_reports::{CsvExporter, JsonExporter, MarkdownExporter, ReportExport, ReportGenerator};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub async fn generate(
    db_path: &Path,
    start: NaiveDate,
    end: NaiveDate,
    report_type: ReportType,
    format: FormatArg,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let database = db::open(db_path).await?;
    let store = Arc::new(database.store());
    let generator = ReportGenerator::new(store.clone(), store.clone(), store.clone());

    let report = generator.generate(start, end, report_type).await;
    database.close().await;
    let report = report?;

    if report.empty {
        println!("ℹ️  No records or snapshots in {} to {}", start, end);
    }

    let content = match format {
        FormatArg::Csv => CsvExporter::new().export(&report),
        FormatArg::Json => JsonExporter::new().export(&report),
        FormatArg::Markdown => MarkdownExporter::new().export(&report),
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)?;
            println!("✅ Report written to {:?}", path);
        }
        None => println!("{content}"),
    }

    Ok(())
}
