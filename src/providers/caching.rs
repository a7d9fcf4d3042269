use crate::core::cache::Cache;
use crate::core::price::{DateRange, PriceTable, QuoteSource};
use crate::store::memory::MemoryCache;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::debug;

/// Identifies one batched fetch: the symbol set and the requested date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    symbols: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl FetchKey {
    pub fn new(symbols: &[String], range: DateRange) -> Self {
        let mut symbols = symbols.to_vec();
        symbols.sort();
        symbols.dedup();
        FetchKey {
            symbols,
            start: range.start,
            end: range.end,
        }
    }
}

/// Memoizes a [`QuoteSource`] for a freshness window. Failures are not cached.
pub struct CachingQuoteSource<T: QuoteSource> {
    inner: T,
    cache: MemoryCache<FetchKey, PriceTable>,
}

impl<T: QuoteSource> CachingQuoteSource<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            cache: MemoryCache::new(Some(ttl)),
        }
    }
}

#[async_trait]
impl<T: QuoteSource> QuoteSource for CachingQuoteSource<T> {
    async fn fetch_history(&self, symbols: &[String], range: DateRange) -> Result<PriceTable> {
        let key = FetchKey::new(symbols, range);
        if let Some(table) = self.cache.get(&key).await {
            debug!(symbols = symbols.len(), "Reusing fresh price history");
            return Ok(table);
        }
        let table = self.inner.fetch_history(symbols, range).await?;
        self.cache.put(key, table.clone()).await;
        Ok(table)
    }
}
