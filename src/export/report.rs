use crate::core::dashboard::Dashboard;
use crate::core::format::trend_summary;
use crate::core::returns::ReturnTable;
use chrono::NaiveDateTime;

pub const REPORT_TITLE: &str = "Market Trends Report: US & KR";

#[derive(Debug, Clone)]
pub struct ReportSection {
    pub caption: String,
    pub table: ReturnTable,
    pub summary: String,
}

/// A rasterised line chart, 8-bit RGB, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartPanel {
    Images(Vec<ChartImage>),
    /// Chart production failed; the note is shown instead of every chart.
    Unavailable(String),
}

/// Everything an exporter needs, captured once per export action.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub sections: Vec<ReportSection>,
    pub charts: Option<ChartPanel>,
}

impl Report {
    pub fn from_dashboard(dashboard: &Dashboard, generated_at: NaiveDateTime) -> Self {
        let sections = dashboard
            .sections()
            .into_iter()
            .map(|(caption, table)| ReportSection {
                caption: caption.to_string(),
                table: table.clone(),
                summary: trend_summary(table),
            })
            .collect();
        Report {
            title: REPORT_TITLE.to_string(),
            generated_at,
            sections,
            charts: None,
        }
    }

    pub fn with_charts(mut self, charts: ChartPanel) -> Self {
        self.charts = Some(charts);
        self
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
