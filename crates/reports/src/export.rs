//! Report exporters - CSV, JSON, Markdown.
//!
//! [`ReportExport`] consumes a [`ReportData`] and produces a downloadable
//! artifact; which backend runs is the caller's choice.

use ganacert_core::{ReportData, ReportType};

/// Trait for exporting reports to different formats
pub trait ReportExport {
    /// Export to the target format
    fn export(&self, report: &ReportData) -> String;

    /// Get the file extension for this format
    fn extension(&self) -> &'static str;

    /// Get the MIME type for this format
    fn mime_type(&self) -> &'static str;
}

fn title(report: &ReportData) -> String {
    let kind = match report.report_type {
        ReportType::PeriodSummary => "Period Summary",
        ReportType::DepartmentComparison => "Department Comparison",
        ReportType::Producer { .. } => "Producer Report",
    };
    format!("{} {} to {}", kind, report.start, report.end)
}

/// Tabular section of a report: department rows for the comparison,
/// per-registration rows for the producer report, one totals row
/// otherwise.
fn table(report: &ReportData) -> (Vec<String>, Vec<Vec<String>>) {
    if !report.departments.is_empty() {
        let headers = [
            "Department",
            "Registered",
            "Approved",
            "Rejected",
            "Head Count",
            "Amount",
            "Approval Rate",
        ]
        .map(String::from)
        .to_vec();
        let rows = report
            .departments
            .iter()
            .map(|row| {
                vec![
                    row.department.as_str().to_string(),
                    row.registered.to_string(),
                    row.approved.to_string(),
                    row.rejected.to_string(),
                    row.head_count.to_string(),
                    row.certification_amount.to_string(),
                    format!("{:.1}%", row.approval_rate),
                ]
            })
            .collect();
        return (headers, rows);
    }

    if let Some(producer) = &report.producer {
        let headers = ["Record", "Brand", "Status", "Head Count", "Department", "Registered At"]
            .map(String::from)
            .to_vec();
        let rows = producer
            .records
            .iter()
            .map(|row| {
                vec![
                    row.record_id.clone(),
                    row.brand_number.clone(),
                    row.status.to_string(),
                    row.head_count.to_string(),
                    row.department.as_str().to_string(),
                    row.registered_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();
        return (headers, rows);
    }

    let headers = ["Registered", "Approved", "Rejected", "Pending", "Head Count", "Amount"]
        .map(String::from)
        .to_vec();
    let totals = &report.totals;
    let rows = vec![vec![
        totals.registered.to_string(),
        totals.approved.to_string(),
        totals.rejected.to_string(),
        totals.pending.to_string(),
        totals.total_head_count.to_string(),
        totals.total_certification_amount.to_string(),
    ]];
    (headers, rows)
}

fn summary(report: &ReportData) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("Period".to_string(), format!("{} to {}", report.start, report.end)),
        ("Type".to_string(), report.report_type.as_str().to_string()),
        ("Empty".to_string(), report.empty.to_string()),
        ("Registered".to_string(), report.totals.registered.to_string()),
        ("Approved".to_string(), report.totals.approved.to_string()),
        ("Rejected".to_string(), report.totals.rejected.to_string()),
        ("Pending".to_string(), report.totals.pending.to_string()),
        (
            "Total head count".to_string(),
            report.totals.total_head_count.to_string(),
        ),
        (
            "Certification amount".to_string(),
            report.totals.total_certification_amount.to_string(),
        ),
        (
            "Average processing hours".to_string(),
            format!("{:.1}", report.totals.average_processing_hours),
        ),
    ];
    if let Some(trend) = report.trend {
        pairs.push(("Trend".to_string(), trend.as_str().to_string()));
    }
    pairs
}

// ============================================================================
// CSV Exporter
// ============================================================================

/// CSV format exporter
pub struct CsvExporter {
    delimiter: char,
    include_header: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    fn escape_field(&self, field: &str) -> String {
        if field.contains(self.delimiter) || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

impl ReportExport for CsvExporter {
    fn export(&self, report: &ReportData) -> String {
        let (headers, rows) = table(report);
        let delimiter = self.delimiter.to_string();
        let mut output = String::new();

        if self.include_header {
            let escaped: Vec<String> = headers.iter().map(|h| self.escape_field(h)).collect();
            output.push_str(&escaped.join(&delimiter));
            output.push('\n');
        }

        for row in rows {
            let escaped: Vec<String> = row.iter().map(|f| self.escape_field(f)).collect();
            output.push_str(&escaped.join(&delimiter));
            output.push('\n');
        }

        output
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn mime_type(&self) -> &'static str {
        "text/csv"
    }
}

// ============================================================================
// JSON Exporter
// ============================================================================

/// JSON format exporter; serializes the typed report directly.
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl ReportExport for JsonExporter {
    fn export(&self, report: &ReportData) -> String {
        if self.pretty {
            serde_json::to_string_pretty(report).unwrap_or_default()
        } else {
            serde_json::to_string(report).unwrap_or_default()
        }
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }
}

// ============================================================================
// Markdown Exporter
// ============================================================================

/// Markdown format exporter
pub struct MarkdownExporter {
    include_summary: bool,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self {
            include_summary: true,
        }
    }
}

impl MarkdownExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_summary(mut self) -> Self {
        self.include_summary = false;
        self
    }
}

impl ReportExport for MarkdownExporter {
    fn export(&self, report: &ReportData) -> String {
        let mut output = String::new();
        output.push_str(&format!("# {}\n\n", title(report)));

        if self.include_summary {
            output.push_str("## Summary\n\n");
            for (key, value) in summary(report) {
                output.push_str(&format!("- **{}**: {}\n", key, value));
            }
            output.push('\n');
        }

        output.push_str("## Data\n\n");
        let (headers, rows) = table(report);
        output.push_str("| ");
        output.push_str(&headers.join(" | "));
        output.push_str(" |\n| ");
        output.push_str(&headers.iter().map(|_| "---").collect::<Vec<_>>().join(" | "));
        output.push_str(" |\n");
        for row in rows {
            output.push_str("| ");
            output.push_str(&row.join(" | "));
            output.push_str(" |\n");
        }

        output
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn mime_type(&self) -> &'static str {
        "text/markdown"
    }
}
