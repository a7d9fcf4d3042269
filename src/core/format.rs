//! Shared cell formatting for the terminal view and the exporters.

use crate::core::lookback::Lookback;
use crate::core::returns::ReturnTable;

/// Placeholder for "not available" cells.
pub const NOT_AVAILABLE: &str = "-";

/// Sign category of a return cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn of(value: Option<f64>) -> Trend {
        match value {
            Some(v) if v > 0.0 => Trend::Up,
            Some(v) if v < 0.0 => Trend::Down,
            _ => Trend::Flat,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }

    /// Colors follow the KR market convention: rising red, falling blue.
    pub fn css_color(&self) -> &'static str {
        match self {
            Trend::Up => "red",
            Trend::Down => "deepskyblue",
            Trend::Flat => "gray",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Trend::Up => (255, 0, 0),
            Trend::Down => (0, 191, 255),
            Trend::Flat => (128, 128, 128),
        }
    }
}

/// A formatted return cell: visible text plus its sign category.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedCell {
    pub text: String,
    pub trend: Trend,
}

pub fn format_percent(value: f64) -> String {
    format!("{value:+.2}%")
}

pub fn format_cell(value: Option<f64>) -> FormattedCell {
    FormattedCell {
        text: value.map_or_else(|| NOT_AVAILABLE.to_string(), format_percent),
        trend: Trend::of(value),
    }
}

/// A table with every cell formatted, shared by all renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedTable {
    pub header: Vec<String>,
    pub rows: Vec<(String, Vec<FormattedCell>)>,
}

pub fn format_table(table: &ReturnTable) -> FormattedTable {
    FormattedTable {
        header: table.columns().iter().map(Lookback::to_string).collect(),
        rows: table
            .rows()
            .iter()
            .map(|row| {
                let cells = row.values.iter().map(|v| format_cell(*v)).collect();
                (row.name.clone(), cells)
            })
            .collect(),
    }
}

/// "<top> (+x.xx%) leads; <bottom> (-y.yy%) lags" over the 1D column.
///
/// Empty when the table has no 1D column or it holds no values. Ties go to
/// the first row in table order.
pub fn trend_summary(table: &ReturnTable) -> String {
    let Some(column) = table.column(Lookback::OneDay) else {
        return String::new();
    };
    let available: Vec<(&str, f64)> = column
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
        .collect();

    let mut iter = available.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let (mut top, mut bottom) = (first, first);
    for entry in iter {
        if entry.1 > top.1 {
            top = entry;
        }
        if entry.1 < bottom.1 {
            bottom = entry;
        }
    }

    format!(
        "{} ({}) leads; {} ({}) lags",
        top.0,
        format_percent(top.1),
        bottom.0,
        format_percent(bottom.1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cell() {
        assert_eq!(
            format_cell(Some(1.23)),
            FormattedCell {
                text: "+1.23%".to_string(),
                trend: Trend::Up
            }
        );
        assert_eq!(format_cell(Some(-0.45)).text, "-0.45%");
        assert_eq!(format_cell(Some(-0.45)).trend, Trend::Down);
        assert_eq!(format_cell(Some(0.0)).text, "+0.00%");
        assert_eq!(format_cell(Some(0.0)).trend, Trend::Flat);
        assert_eq!(format_cell(None).text, "-");
        assert_eq!(format_cell(None).trend, Trend::Flat);
    }

    #[test]
    fn test_trend_classifier_treats_nan_as_flat() {
        assert_eq!(Trend::of(Some(f64::NAN)), Trend::Flat);
        assert_eq!(Trend::Up.css_class(), "up");
        assert_eq!(Trend::Down.css_color(), "deepskyblue");
    }

    #[test]
    fn test_trend_summary() {
        let mut table = ReturnTable::new(&[Lookback::OneDay, Lookback::OneWeek]);
        table.push_row("A", "Alpha", vec![Some(0.5), Some(9.0)]);
        table.push_row("B", "Beta", vec![Some(1.25), Some(-9.0)]);
        table.push_row("C", "Gamma", vec![None, None]);
        table.push_row("D", "Delta", vec![Some(-2.0), None]);

        assert_eq!(
            trend_summary(&table),
            "Beta (+1.25%) leads; Delta (-2.00%) lags"
        );
    }

    #[test]
    fn test_trend_summary_empty_cases() {
        let mut no_one_day = ReturnTable::new(&[Lookback::OneWeek]);
        no_one_day.push_row("A", "Alpha", vec![Some(1.0)]);
        assert_eq!(trend_summary(&no_one_day), "");

        let mut all_missing = ReturnTable::new(&[Lookback::OneDay]);
        all_missing.push_row("A", "Alpha", vec![None]);
        assert_eq!(trend_summary(&all_missing), "");

        assert_eq!(trend_summary(&ReturnTable::new(&[Lookback::OneDay])), "");
    }

    #[test]
    fn test_format_table_keeps_order() {
        let mut table = ReturnTable::new(&[Lookback::OneDay, Lookback::YearToDate]);
        table.push_row("Z", "Zulu", vec![Some(3.0), None]);
        table.push_row("A", "Alpha", vec![Some(-1.5), Some(0.0)]);

        let formatted = format_table(&table);
        assert_eq!(formatted.header, vec!["1D", "YTD"]);
        assert_eq!(formatted.rows[0].0, "Zulu");
        assert_eq!(formatted.rows[0].1[1].text, "-");
        assert_eq!(formatted.rows[1].1[0].text, "-1.50%");
    }
}
