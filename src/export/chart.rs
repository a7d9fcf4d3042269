//! Chart selection and off-screen rendering for the PDF report.

use crate::core::dashboard::Dashboard;
use crate::core::lookback::Lookback;
use crate::core::price::PriceSeries;
use crate::core::returns::{round2, series_returns};
use crate::export::report::{ChartImage, ChartPanel};
use anyhow::{Result, anyhow, bail};
use plotters::prelude::*;
use tracing::{debug, warn};

pub const CHARTS_UNAVAILABLE_NOTE: &str = "Chart images could not be generated.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub label: String,
    pub series: PriceSeries,
}

/// Produces a raster image for one chart request.
pub trait ChartRenderer {
    fn render(&self, request: &ChartRequest) -> Result<ChartImage>;
}

/// Picks the top `per_group` symbols of each group by 1-day return.
///
/// The ranking uses 1-day returns even when 1D is not a displayed column.
/// Each chart plots the trailing `points` closes of its symbol.
pub fn select_charts(dashboard: &Dashboard, per_group: usize, points: usize) -> Vec<ChartRequest> {
    let mut requests = Vec::new();
    for group_table in &dashboard.groups {
        let group = &group_table.group;
        let mut ranked: Vec<(&str, PriceSeries, f64)> = group
            .symbols
            .iter()
            .filter_map(|(symbol, name)| {
                let series = dashboard.prices().series(symbol)?;
                let change = series_returns(&series, &[Lookback::OneDay], dashboard.as_of)[0]?;
                Some((name.as_str(), series, round2(change)))
            })
            .collect();
        ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

        for (name, series, _) in ranked.into_iter().take(per_group) {
            requests.push(ChartRequest {
                label: format!("{}: {}", group.chart_label, name),
                series: series.tail(points),
            });
        }
    }
    debug!(charts = requests.len(), "Selected charts");
    requests
}

/// Renders every request, or falls back to a single note if any render fails.
pub fn render_charts(renderer: &dyn ChartRenderer, requests: &[ChartRequest]) -> ChartPanel {
    let rendered: Result<Vec<ChartImage>> = requests.iter().map(|r| renderer.render(r)).collect();
    match rendered {
        Ok(images) => ChartPanel::Images(images),
        Err(e) => {
            warn!(error = %e, "Chart rendering failed, using fallback note");
            ChartPanel::Unavailable(CHARTS_UNAVAILABLE_NOTE.to_string())
        }
    }
}

/// Draws line charts into an in-memory RGB bitmap.
pub struct BitmapChartRenderer {
    width: u32,
    height: u32,
}

impl BitmapChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        BitmapChartRenderer { width, height }
    }
}

fn value_bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        let pad = (min.abs() * 0.01).max(1.0);
        return (min - pad, max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

impl ChartRenderer for BitmapChartRenderer {
    fn render(&self, request: &ChartRequest) -> Result<ChartImage> {
        let values = request.series.values();
        if values.len() < 2 {
            bail!("Not enough data to chart {}", request.label);
        }
        if self.width == 0 || self.height == 0 {
            bail!("Chart size must be non-zero");
        }

        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("Chart drawing failed: {e}"))?;

            let (low, high) = value_bounds(&values);
            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .build_cartesian_2d(0..values.len() - 1, low..high)
                .map_err(|e| anyhow!("Chart drawing failed: {e}"))?;

            chart
                .draw_series(LineSeries::new(
                    values.iter().copied().enumerate(),
                    RGBColor(52, 141, 193).stroke_width(3),
                ))
                .map_err(|e| anyhow!("Chart drawing failed: {e}"))?;

            root.present()
                .map_err(|e| anyhow!("Chart drawing failed: {e}"))?;
        }

        Ok(ChartImage {
            label: request.label.clone(),
            width: self.width,
            height: self.height,
            rgb: buffer,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::price::PriceTable;
    use crate::core::universe::{SymbolGroup, Universe};
    use chrono::{Duration, NaiveDate};

    pub(crate) struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&self, _request: &ChartRequest) -> Result<ChartImage> {
            Err(anyhow!("Image export service unavailable"))
        }
    }

    fn dashboard() -> Dashboard {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..200).map(|i| start + Duration::days(i)).collect();
        let ramp = |last: f64| -> Vec<Option<f64>> {
            (0..200)
                .map(|i| Some(if i == 199 { last } else { 100.0 }))
                .collect()
        };
        let prices = PriceTable::from_columns(
            dates,
            vec![
                ("A".to_string(), ramp(101.0)),
                ("B".to_string(), ramp(105.0)),
                ("C".to_string(), ramp(99.0)),
                ("D".to_string(), ramp(103.0)),
                ("E".to_string(), ramp(102.0)),
                ("SHORT".to_string(), {
                    let mut v = vec![None; 200];
                    v[199] = Some(50.0);
                    v
                }),
            ],
        )
        .unwrap();
        let universe = Universe {
            groups: vec![SymbolGroup::new(
                "Sectors",
                "Sector",
                &[
                    ("A", "Alpha"),
                    ("B", "Beta"),
                    ("C", "Gamma"),
                    ("D", "Delta"),
                    ("E", "Epsilon"),
                    ("SHORT", "Short"),
                ],
            )],
            themes_title: "Themes".to_string(),
            themes: vec![],
        };
        Dashboard::build(
            prices,
            &universe,
            &[Lookback::OneWeek],
            NaiveDate::from_ymd_opt(2024, 9, 16).unwrap(),
        )
    }

    #[test]
    fn test_select_charts_takes_top_movers_by_one_day() {
        let requests = select_charts(&dashboard(), 4, 120);
        let labels: Vec<&str> = requests.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Sector: Beta", "Sector: Delta", "Sector: Epsilon", "Sector: Alpha"]
        );
        assert!(requests.iter().all(|r| r.series.len() == 120));
    }

    #[test]
    fn test_bitmap_renderer_draws_line() {
        let request = select_charts(&dashboard(), 1, 30).remove(0);
        let image = BitmapChartRenderer::new(200, 100).render(&request).unwrap();
        assert_eq!(image.label, "Sector: Beta");
        assert_eq!(image.rgb.len(), 200 * 100 * 3);
        assert!(image.rgb.iter().any(|b| *b != 255));
    }

    #[test]
    fn test_render_failure_falls_back_to_note() {
        let requests = select_charts(&dashboard(), 2, 30);
        assert_eq!(
            render_charts(&FailingRenderer, &requests),
            ChartPanel::Unavailable(CHARTS_UNAVAILABLE_NOTE.to_string())
        );

        let panel = render_charts(&BitmapChartRenderer::new(64, 32), &requests);
        assert!(matches!(panel, ChartPanel::Images(images) if images.len() == 2));
    }

    #[test]
    fn test_value_bounds_pads_flat_series() {
        assert_eq!(value_bounds(&[5.0, 5.0]), (4.0, 6.0));
        let (low, high) = value_bounds(&[10.0, 20.0]);
        assert!(low < 10.0 && high > 20.0);
    }
}
