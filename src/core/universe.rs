//! The compiled-in symbol universe shown on the dashboard.

/// One dashboard section: ticker symbols with their display names, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGroup {
    pub title: String,
    /// Short prefix used for chart headings, e.g. "Sector".
    pub chart_label: String,
    pub symbols: Vec<(String, String)>,
}

impl SymbolGroup {
    pub fn new(title: &str, chart_label: &str, symbols: &[(&str, &str)]) -> Self {
        SymbolGroup {
            title: title.to_string(),
            chart_label: chart_label.to_string(),
            symbols: symbols
                .iter()
                .map(|(s, n)| (s.to_string(), n.to_string()))
                .collect(),
        }
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(|(s, _)| s.as_str())
    }
}

/// A named equal-weight basket of related tickers.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeBasket {
    pub key: String,
    pub name: String,
    pub members: Vec<String>,
}

impl ThemeBasket {
    pub fn new(key: &str, name: &str, members: &[&str]) -> Self {
        ThemeBasket {
            key: key.to_string(),
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub groups: Vec<SymbolGroup>,
    pub themes_title: String,
    pub themes: Vec<ThemeBasket>,
}

impl Universe {
    /// Every ticker needed for one render pass, de-duplicated, in declaration order.
    pub fn all_tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = Vec::new();
        let group_tickers = self.groups.iter().flat_map(|g| g.tickers());
        let theme_tickers = self
            .themes
            .iter()
            .flat_map(|t| t.members.iter().map(String::as_str));
        for ticker in group_tickers.chain(theme_tickers) {
            if !tickers.iter().any(|t| t == ticker) {
                tickers.push(ticker.to_string());
            }
        }
        tickers
    }
}

impl Default for Universe {
    fn default() -> Self {
        Universe {
            groups: vec![
                SymbolGroup::new(
                    "Major Indices (US/KR)",
                    "Index",
                    &[
                        ("^GSPC", "S&P 500"),
                        ("^IXIC", "NASDAQ"),
                        ("^DJI", "Dow Jones"),
                        ("^KS11", "KOSPI"),
                        ("^KQ11", "KOSDAQ"),
                    ],
                ),
                SymbolGroup::new(
                    "US Sectors (SPDR)",
                    "Sector",
                    &[
                        ("XLB", "Materials"),
                        ("XLE", "Energy"),
                        ("XLF", "Financials"),
                        ("XLI", "Industrials"),
                        ("XLK", "Technology"),
                        ("XLP", "Consumer Staples"),
                        ("XLRE", "Real Estate"),
                        ("XLU", "Utilities"),
                        ("XLV", "Health Care"),
                        ("XLY", "Consumer Discretionary"),
                        ("XLC", "Communication Services"),
                    ],
                ),
                SymbolGroup::new(
                    "Commodities / FX",
                    "Commodities/FX",
                    &[
                        ("GC=F", "Gold Futures"),
                        ("CL=F", "WTI Crude"),
                        ("BZ=F", "Brent Crude"),
                        ("DX-Y.NYB", "US Dollar Index"),
                        ("KRW=X", "USD/KRW"),
                    ],
                ),
            ],
            themes_title: "KR Themes (Equal-Weight Baskets)".to_string(),
            themes: vec![
                ThemeBasket::new(
                    "KR_Shipbuilding",
                    "KR Shipbuilding",
                    &["329180.KS", "010140.KS", "042660.KS", "267250.KS"],
                ),
                ThemeBasket::new(
                    "KR_Semiconductors",
                    "KR Semiconductors",
                    &["005930.KS", "000660.KS"],
                ),
                ThemeBasket::new(
                    "KR_SecondaryBatteries",
                    "KR Secondary Batteries",
                    &["373220.KS", "006400.KS", "096770.KS"],
                ),
                ThemeBasket::new("KR_Internet", "KR Internet", &["035420.KS", "035720.KS"]),
                ThemeBasket::new("KR_Biotech", "KR Biotech", &["068270.KS", "207940.KS"]),
            ],
        }
    }
}
