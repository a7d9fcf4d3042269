pub mod chart;
pub mod html;
pub mod pdf;
pub mod report;

pub use report::Report;

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Html,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Html, ExportFormat::Pdf];

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Html => "market_trends_report.html",
            ExportFormat::Pdf => "market_trends_report.pdf",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn render(&self, report: &Report) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Html => Ok(html::render_html(report).into_bytes()),
            ExportFormat::Pdf => pdf::render_pdf(report),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Html => write!(f, "HTML"),
            ExportFormat::Pdf => write!(f, "PDF"),
        }
    }
}

/// Renders one format and writes it into `dir`, returning the written path.
pub fn write_report(report: &Report, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let bytes = format
        .render(report)
        .with_context(|| format!("Failed to render {format} report"))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(format.file_name());
    fs::write(&path, bytes)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!(format = %format, path = %path.display(), "Report written");
    Ok(path)
}

/// Writes every requested format. A failing format never stops the others.
pub fn write_reports(
    report: &Report,
    formats: &[ExportFormat],
    dir: &Path,
) -> Vec<(ExportFormat, Result<PathBuf>)> {
    formats
        .iter()
        .map(|format| {
            let result = write_report(report, *format, dir);
            if let Err(e) = &result {
                warn!(format = %format, error = %e, "Report export failed");
            }
            (*format, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn empty_report() -> Report {
        Report {
            title: "Market Trends".to_string(),
            generated_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            sections: vec![],
            charts: None,
        }
    }

    #[test]
    fn test_write_reports_keeps_going_after_a_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory in place of the PDF file makes that write fail
        fs::create_dir(dir.path().join(ExportFormat::Pdf.file_name())).unwrap();

        let results = write_reports(&empty_report(), &ExportFormat::ALL, dir.path());
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(dir.path().join("market_trends_report.html").is_file());
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Html.mime(), "text/html");
        assert_eq!(ExportFormat::Pdf.mime(), "application/pdf");
        assert_eq!(ExportFormat::Pdf.file_name(), "market_trends_report.pdf");
    }
}
