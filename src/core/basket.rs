//! Equal-weight theme baskets.

use crate::core::lookback::Lookback;
use crate::core::price::{PriceSeries, PriceTable};
use crate::core::returns::{ReturnTable, series_returns};
use crate::core::universe::ThemeBasket;
use chrono::NaiveDate;
use tracing::debug;

/// Averages the members' closes per date.
///
/// Missing member closes are left out of that date's mean; dates where no
/// member traded are dropped. Returns `None` when no member has any data.
pub fn aggregate_basket(prices: &PriceTable, theme: &ThemeBasket) -> Option<(String, PriceSeries)> {
    let columns: Vec<&[Option<f64>]> = theme
        .members
        .iter()
        .filter_map(|m| prices.column(m))
        .collect();

    let points: Vec<(NaiveDate, f64)> = prices
        .dates()
        .iter()
        .enumerate()
        .filter_map(|(row, date)| {
            let observed: Vec<f64> = columns
                .iter()
                .filter_map(|c| c[row])
                .filter(|v| v.is_finite())
                .collect();
            if observed.is_empty() {
                return None;
            }
            let mean = observed.iter().sum::<f64>() / observed.len() as f64;
            Some((*date, mean))
        })
        .collect();

    if points.is_empty() {
        debug!(theme = %theme.key, "No member data, basket excluded");
        return None;
    }
    Some((theme.name.clone(), PriceSeries::new(points)))
}

/// Aggregates every basket and computes its returns, in declared order.
///
/// Baskets without data get no row. Also returns the aggregated series for charting.
pub fn basket_returns(
    prices: &PriceTable,
    themes: &[ThemeBasket],
    lookbacks: &[Lookback],
    as_of: NaiveDate,
) -> (ReturnTable, Vec<(String, PriceSeries)>) {
    let mut table = ReturnTable::new(lookbacks);
    let mut series_list = Vec::new();
    for theme in themes {
        if let Some((name, series)) = aggregate_basket(prices, theme) {
            table.push_row(&theme.key, &name, series_returns(&series, lookbacks, as_of));
            series_list.push((name, series));
        }
    }
    (table, series_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dates() -> Vec<NaiveDate> {
        vec![d(2024, 5, 2), d(2024, 5, 3), d(2024, 5, 6), d(2024, 5, 7)]
    }

    #[test]
    fn test_member_without_data_degenerates_to_other_member() {
        let prices = PriceTable::from_columns(
            dates(),
            vec![
                ("A".to_string(), vec![Some(10.0), Some(11.0), Some(12.5), Some(13.0)]),
                ("B".to_string(), vec![None, None, None, None]),
            ],
        )
        .unwrap();
        let theme = ThemeBasket::new("t", "Theme", &["A", "B"]);

        let (name, series) = aggregate_basket(&prices, &theme).unwrap();

        assert_eq!(name, "Theme");
        assert_eq!(series, prices.series("A").unwrap());
    }

    #[test]
    fn test_missing_values_are_excluded_not_zero() {
        let prices = PriceTable::from_columns(
            dates(),
            vec![
                ("A".to_string(), vec![Some(10.0), Some(20.0), None, None]),
                ("B".to_string(), vec![Some(30.0), None, None, Some(40.0)]),
            ],
        )
        .unwrap();
        let theme = ThemeBasket::new("t", "Theme", &["A", "B", "NOT_FETCHED"]);

        let (_, series) = aggregate_basket(&prices, &theme).unwrap();

        // 2024-05-06 has no member data and is dropped.
        assert_eq!(
            series.points(),
            &[(d(2024, 5, 2), 20.0), (d(2024, 5, 3), 20.0), (d(2024, 5, 7), 40.0)]
        );
    }

    #[test]
    fn test_basket_without_any_data_is_excluded() {
        let prices = PriceTable::from_columns(
            dates(),
            vec![("A".to_string(), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])],
        )
        .unwrap();
        let themes = vec![
            ThemeBasket::new("empty", "Empty", &["X", "Y"]),
            ThemeBasket::new("full", "Full", &["A"]),
        ];

        assert!(aggregate_basket(&prices, &themes[0]).is_none());

        let (table, series) = basket_returns(&prices, &themes, &[Lookback::OneDay], d(2024, 5, 7));
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].name, "Full");
        assert_eq!(table.rows()[0].key, "full");
        assert_eq!(table.get("Full", Lookback::OneDay), Some(33.33));
        assert_eq!(series.len(), 1);
    }
}
