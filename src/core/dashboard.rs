//! One render pass worth of computed tables.

use crate::core::basket::basket_returns;
use crate::core::lookback::Lookback;
use crate::core::price::{PriceSeries, PriceTable};
use crate::core::returns::{ReturnTable, compute_returns};
use crate::core::universe::{SymbolGroup, Universe};
use chrono::NaiveDate;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GroupTable {
    pub group: SymbolGroup,
    pub table: ReturnTable,
}

/// Immutable output of the computation stage.
///
/// Built once from a fetched [`PriceTable`]; the terminal view and both
/// exporters read from it.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub lookbacks: Vec<Lookback>,
    pub groups: Vec<GroupTable>,
    pub themes_title: String,
    pub themes: ReturnTable,
    pub theme_series: Vec<(String, PriceSeries)>,
    prices: PriceTable,
}

impl Dashboard {
    pub fn build(
        prices: PriceTable,
        universe: &Universe,
        lookbacks: &[Lookback],
        as_of: NaiveDate,
    ) -> Self {
        let lookbacks = Lookback::normalize(lookbacks);
        let groups = universe
            .groups
            .iter()
            .map(|group| GroupTable {
                group: group.clone(),
                table: compute_returns(&prices, group, &lookbacks, as_of),
            })
            .collect();
        let (themes, theme_series) = basket_returns(&prices, &universe.themes, &lookbacks, as_of);
        debug!(
            rows = prices.len(),
            baskets = theme_series.len(),
            "Dashboard computed"
        );

        Dashboard {
            as_of,
            lookbacks,
            groups,
            themes_title: universe.themes_title.clone(),
            themes,
            theme_series,
            prices,
        }
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// The captioned tables in display order. The basket table is left out when empty.
    pub fn sections(&self) -> Vec<(&str, &ReturnTable)> {
        let mut sections: Vec<(&str, &ReturnTable)> = self
            .groups
            .iter()
            .map(|g| (g.group.title.as_str(), &g.table))
            .collect();
        if !self.themes.is_empty() {
            sections.push((self.themes_title.as_str(), &self.themes));
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::universe::ThemeBasket;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn universe() -> Universe {
        Universe {
            groups: vec![
                SymbolGroup::new("Indices", "Index", &[("IDX", "Index One")]),
                SymbolGroup::new("Sectors", "Sector", &[("SEC", "Sector One")]),
            ],
            themes_title: "Themes".to_string(),
            themes: vec![ThemeBasket::new("t", "Theme One", &["M1", "M2"])],
        }
    }

    #[test]
    fn test_build_computes_every_section() {
        let prices = PriceTable::from_columns(
            vec![d(2024, 1, 2), d(2024, 1, 3)],
            vec![
                ("IDX".to_string(), vec![Some(100.0), Some(110.0)]),
                ("SEC".to_string(), vec![Some(10.0), Some(9.0)]),
                ("M1".to_string(), vec![Some(10.0), Some(12.0)]),
                ("M2".to_string(), vec![Some(30.0), None]),
            ],
        )
        .unwrap();

        let dashboard = Dashboard::build(
            prices,
            &universe(),
            &[Lookback::YearToDate, Lookback::OneDay],
            d(2024, 1, 3),
        );

        assert_eq!(dashboard.lookbacks, vec![Lookback::OneDay, Lookback::YearToDate]);
        assert_eq!(dashboard.groups[0].table.get("Index One", Lookback::OneDay), Some(10.0));
        assert_eq!(dashboard.groups[1].table.get("Sector One", Lookback::OneDay), Some(-10.0));
        // Basket: mean(10, 30) = 20 then 12 alone.
        assert_eq!(dashboard.themes.get("Theme One", Lookback::OneDay), Some(-40.0));

        let captions: Vec<&str> = dashboard.sections().iter().map(|(c, _)| *c).collect();
        assert_eq!(captions, vec!["Indices", "Sectors", "Themes"]);
    }

    #[test]
    fn test_empty_prices_keep_group_sections_but_drop_baskets() {
        let dashboard = Dashboard::build(
            PriceTable::default(),
            &universe(),
            &Lookback::defaults(),
            d(2024, 1, 3),
        );
        let sections = dashboard.sections();
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|(_, t)| t.is_empty()));
        assert!(dashboard.theme_series.is_empty());
    }
}
