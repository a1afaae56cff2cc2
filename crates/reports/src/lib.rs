//! # Ganacert Reports
//!
//! Period-scoped aggregate reports over the certification stores, plus
//! export backends.
//!
//! ## Reports
//!
//! - Period summary - counts, head totals, certification amounts, trend.
//! - Department comparison - per-department rows, busiest first.
//! - Producer report - one producer's registrations and audit history.
//!
//! ## Exporters
//!
//! - [`CsvExporter`] - CSV with proper escaping
//! - [`JsonExporter`] - JSON (pretty or compact)
//! - [`MarkdownExporter`] - Markdown tables

pub mod export;
pub mod generator;

pub use export::{CsvExporter, JsonExporter, MarkdownExporter, ReportExport};
pub use generator::ReportGenerator;
