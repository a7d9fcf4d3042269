//! Trailing percentage returns over fixed lookback windows.

use crate::core::lookback::Lookback;
use crate::core::price::{PriceSeries, PriceTable};
use crate::core::universe::SymbolGroup;
use chrono::{Datelike, NaiveDate};

/// One row of a [`ReturnTable`]. `None` marks a "not available" cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRow {
    /// Ticker symbol or basket key the row was computed from.
    pub key: String,
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Returns in percent, rounded to 2 decimals, rows in declared group order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnTable {
    columns: Vec<Lookback>,
    rows: Vec<ReturnRow>,
}

impl ReturnTable {
    pub fn new(columns: &[Lookback]) -> Self {
        ReturnTable {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, rounding every value to 2 decimals.
    pub fn push_row(&mut self, key: &str, name: &str, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.push(ReturnRow {
            key: key.to_string(),
            name: name.to_string(),
            values: values.into_iter().map(|v| v.map(round2)).collect(),
        });
    }

    pub fn columns(&self) -> &[Lookback] {
        &self.columns
    }

    pub fn rows(&self) -> &[ReturnRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, lookback: Lookback) -> Option<usize> {
        self.columns.iter().position(|c| *c == lookback)
    }

    /// The `(row name, value)` pairs of one column; `None` if the column is absent.
    pub fn column(&self, lookback: Lookback) -> Option<Vec<(&str, Option<f64>)>> {
        let idx = self.column_index(lookback)?;
        Some(
            self.rows
                .iter()
                .map(|row| (row.name.as_str(), row.values[idx]))
                .collect(),
        )
    }

    pub fn get(&self, name: &str, lookback: Lookback) -> Option<f64> {
        let idx = self.column_index(lookback)?;
        self.rows
            .iter()
            .find(|row| row.name == name)
            .and_then(|row| row.values[idx])
    }
}

/// Rounds to 2 decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round_ties_even() / 100.0;
    // Avoid rendering "-0.00".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// `(latest / base - 1) * 100`, or `None` when the ratio is not finite.
pub fn percent_change(latest: f64, base: f64) -> Option<f64> {
    let change = (latest / base - 1.0) * 100.0;
    change.is_finite().then_some(change)
}

/// Computes the unrounded return of one series for each lookback.
///
/// Offsets count rows of the series, not calendar days. YTD is anchored on the
/// first row dated in the calendar year of `as_of`.
pub fn series_returns(
    series: &PriceSeries,
    lookbacks: &[Lookback],
    as_of: NaiveDate,
) -> Vec<Option<f64>> {
    let Some(latest) = series.latest() else {
        return vec![None; lookbacks.len()];
    };

    lookbacks
        .iter()
        .map(|lookback| {
            let base = match lookback.trading_days() {
                Some(offset) => series.back(offset),
                None => series.first_in_year(as_of.year()),
            };
            base.and_then(|b| percent_change(latest, b))
        })
        .collect()
}

/// Builds the return table of a symbol group.
///
/// Rows follow the group's declared order; symbols without a column in
/// `prices` are omitted.
pub fn compute_returns(
    prices: &PriceTable,
    group: &SymbolGroup,
    lookbacks: &[Lookback],
    as_of: NaiveDate,
) -> ReturnTable {
    let mut table = ReturnTable::new(lookbacks);
    for (symbol, name) in &group.symbols {
        let Some(series) = prices.series(symbol) else {
            continue;
        };
        table.push_row(symbol, name, series_returns(&series, lookbacks, as_of));
    }
    table
}
