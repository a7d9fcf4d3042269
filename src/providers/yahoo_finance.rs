use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::core::price::{DateRange, PriceSeries, PriceTable, QuoteSource};
use crate::providers::util::with_retry;

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

fn to_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Converts one chart result into trading-date closes.
///
/// Split/dividend adjusted closes are preferred over raw closes. Dates are
/// taken in the exchange's local time; null closes are skipped.
fn extract_closes(item: &PriceChartItem) -> PriceSeries {
    let Some(timestamps) = item.timestamp.as_ref() else {
        return PriceSeries::default();
    };
    let closes = item.indicators.as_ref().and_then(|inds| {
        inds.adjclose
            .as_ref()
            .and_then(|a| a.first())
            .and_then(|a| a.adjclose.as_ref())
            .or_else(|| inds.quote.first().and_then(|q| q.close.as_ref()))
    });
    let Some(closes) = closes else {
        return PriceSeries::default();
    };

    let offset = item.meta.gmtoffset.unwrap_or(0);
    let points = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, &close)| {
            let close = close.filter(|c| c.is_finite())?;
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some((date, close))
        })
        .collect();
    PriceSeries::new(points)
}

/// Daily price history from the Yahoo Finance chart API.
pub struct YahooQuoteSource {
    base_url: String,
    client: reqwest::Client,
}

impl YahooQuoteSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("market-trends/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(YahooQuoteSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    #[instrument(name = "YahooHistoryFetch", skip_all, fields(symbol = %symbol))]
    async fn fetch_symbol(&self, symbol: &str, range: DateRange) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplits",
            self.base_url,
            symbol,
            to_timestamp(range.start),
            to_timestamp(range.end + Duration::days(1)),
        );
        debug!("Requesting price history from {}", url);

        let response = with_retry(|| self.client.get(&url).send(), RETRIES, RETRY_DELAY_MS)
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        let status = response.status();
        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                anyhow!("Failed to parse JSON response for {}: {}", symbol, e)
            } else {
                anyhow!("HTTP error: {} for symbol: {}", status, symbol)
            }
        })?;

        if let Some(err) = data.chart.error {
            return Err(anyhow!(
                "Yahoo error for symbol {}: {}",
                symbol,
                err.description.unwrap_or(err.code)
            ));
        }
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for symbol: {}", status, symbol));
        }

        let item = data
            .chart
            .result
            .as_ref()
            .and_then(|r| r.first())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        let series = extract_closes(item);
        debug!(points = series.len(), "Parsed price history");
        Ok(series)
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Option<Vec<PriceChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct PriceChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    /// Symbols that fail to load are logged and come back as empty columns.
    async fn fetch_history(&self, symbols: &[String], range: DateRange) -> Result<PriceTable> {
        let futures = symbols.iter().map(|symbol| async move {
            let series = match self.fetch_symbol(symbol, range).await {
                Ok(series) => series,
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Price history unavailable");
                    PriceSeries::default()
                }
            };
            (symbol.clone(), series)
        });

        let results = join_all(futures).await;
        Ok(PriceTable::from_series(results))
    }
}
