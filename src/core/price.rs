//! Price history abstractions and core types

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Inclusive calendar date range requested from a quote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        DateRange {
            start: end - Duration::days(days),
            end,
        }
    }
}

/// The observed closes of one symbol (or basket), ascending by date, gaps removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    /// Builds a series from points in any order. Later duplicates of a date win.
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Self {
        let deduped: BTreeMap<NaiveDate, f64> = points.into_iter().collect();
        PriceSeries {
            points: deduped.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.last().map(|(_, v)| *v)
    }

    /// Close `offset` rows before the latest one.
    pub fn back(&self, offset: usize) -> Option<f64> {
        let len = self.points.len();
        if len < offset + 1 {
            return None;
        }
        Some(self.points[len - 1 - offset].1)
    }

    /// First close dated within `year`.
    pub fn first_in_year(&self, year: i32) -> Option<f64> {
        self.points
            .iter()
            .find(|(date, _)| date.year() == year)
            .map(|(_, v)| *v)
    }

    /// The trailing `n` observations.
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(n);
        PriceSeries {
            points: self.points[start..].to_vec(),
        }
    }
}

/// Closing prices keyed by trading date (ascending, unique), one column per symbol.
///
/// Cells are `None` where a symbol did not trade, e.g. on a cross-market holiday.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl PriceTable {
    /// Aligns per-symbol observations on the union of their dates.
    ///
    /// A symbol with no observations still gets an (empty) column.
    pub fn from_series<I>(series: I) -> Self
    where
        I: IntoIterator<Item = (String, PriceSeries)>,
    {
        let series: Vec<(String, PriceSeries)> = series.into_iter().collect();
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, s)| s.points().iter().map(|(d, _)| *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let row_of: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut columns = HashMap::new();
        for (symbol, s) in series {
            let mut column = vec![None; dates.len()];
            for (date, value) in s.points() {
                column[row_of[date]] = Some(*value);
            }
            columns.insert(symbol, column);
        }

        PriceTable { dates, columns }
    }

    /// Builds a table from already aligned columns.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            bail!("Price table dates must be strictly ascending");
        }
        let mut map = HashMap::new();
        for (symbol, column) in columns {
            if column.len() != dates.len() {
                bail!(
                    "Column {} has {} rows, expected {}",
                    symbol,
                    column.len(),
                    dates.len()
                );
            }
            map.insert(symbol, column);
        }
        Ok(PriceTable {
            dates,
            columns: map,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.columns.contains_key(symbol)
    }

    pub fn column(&self, symbol: &str) -> Option<&[Option<f64>]> {
        self.columns.get(symbol).map(Vec::as_slice)
    }

    /// The non-missing closes of `symbol`; `None` when the symbol has no column.
    pub fn series(&self, symbol: &str) -> Option<PriceSeries> {
        let column = self.columns.get(symbol)?;
        let points = self
            .dates
            .iter()
            .zip(column)
            .filter_map(|(date, &value)| value.filter(|v| v.is_finite()).map(|v| (*date, v)))
            .collect();
        Some(PriceSeries { points })
    }
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetches adjusted daily closes for `symbols` over `range` in one batch.
    async fn fetch_history(&self, symbols: &[String], range: DateRange) -> Result<PriceTable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_from_series_aligns_on_union_of_dates() {
        let table = PriceTable::from_series(vec![
            (
                "US".to_string(),
                PriceSeries::new(vec![(d(2024, 1, 2), 10.0), (d(2024, 1, 3), 11.0)]),
            ),
            (
                "KR".to_string(),
                PriceSeries::new(vec![(d(2024, 1, 4), 20.0), (d(2024, 1, 2), 19.0)]),
            ),
            ("EMPTY".to_string(), PriceSeries::default()),
        ]);

        assert_eq!(table.dates(), &[d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(table.column("US").unwrap(), &[Some(10.0), Some(11.0), None]);
        assert_eq!(table.column("KR").unwrap(), &[Some(19.0), None, Some(20.0)]);
        assert_eq!(table.column("EMPTY").unwrap(), &[None, None, None]);
        assert!(!table.contains("MISSING"));
    }

    #[test]
    fn test_series_drops_gaps() {
        let table = PriceTable::from_columns(
            vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)],
            vec![("A".to_string(), vec![Some(1.0), None, Some(3.0)])],
        )
        .unwrap();
        let series = table.series("A").unwrap();
        assert_eq!(series.points(), &[(d(2024, 1, 2), 1.0), (d(2024, 1, 4), 3.0)]);
        assert!(table.series("B").is_none());
    }

    #[test]
    fn test_from_columns_validates_shape() {
        let unordered = PriceTable::from_columns(vec![d(2024, 1, 3), d(2024, 1, 2)], vec![]);
        assert!(unordered.is_err());

        let short = PriceTable::from_columns(
            vec![d(2024, 1, 2), d(2024, 1, 3)],
            vec![("A".to_string(), vec![Some(1.0)])],
        );
        assert_eq!(
            short.unwrap_err().to_string(),
            "Column A has 1 rows, expected 2"
        );
    }

    #[test]
    fn test_series_navigation() {
        let series = PriceSeries::new(vec![
            (d(2023, 12, 29), 90.0),
            (d(2024, 1, 2), 100.0),
            (d(2024, 1, 3), 105.0),
            (d(2024, 1, 3), 110.0),
        ]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.latest(), Some(110.0));
        assert_eq!(series.back(1), Some(100.0));
        assert_eq!(series.back(2), Some(90.0));
        assert_eq!(series.back(3), None);
        assert_eq!(series.first_in_year(2024), Some(100.0));
        assert_eq!(series.first_in_year(2025), None);
        assert_eq!(series.tail(2).values(), vec![100.0, 110.0]);
    }
}
