//! Simulated market data: a fixed set of tradable tickers with a bounded
//! random walk around a base price, and a dividend calendar computed from
//! per-ticker payment offsets. Prices are regenerated on every call and are
//! never persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::Rng;

use crate::domain::Cents;

/// Largest single-call deviation from the base price, as a fraction.
const MAX_VARIATION: f64 = 0.02;

struct Listing {
    ticker: &'static str,
    name: &'static str,
    base_price_cents: Cents,
    dividend: Option<DividendTerms>,
}

struct DividendTerms {
    per_share_cents: Cents,
    offset_days: i64,
}

/// Not every tradable ticker pays dividends (AAPL34 does not).
const LISTINGS: &[Listing] = &[
    Listing {
        ticker: "AAPL34",
        name: "Apple BDR",
        base_price_cents: 4580,
        dividend: None,
    },
    Listing {
        ticker: "ITUB4",
        name: "Itaú Unibanco",
        base_price_cents: 3210,
        dividend: Some(DividendTerms {
            per_share_cents: 35,
            offset_days: 15,
        }),
    },
    Listing {
        ticker: "PETR4",
        name: "Petrobras",
        base_price_cents: 3550,
        dividend: Some(DividendTerms {
            per_share_cents: 145,
            offset_days: 0,
        }),
    },
    Listing {
        ticker: "VALE3",
        name: "Vale",
        base_price_cents: 6820,
        dividend: Some(DividendTerms {
            per_share_cents: 90,
            offset_days: 5,
        }),
    },
    Listing {
        ticker: "WEGE3",
        name: "WEG",
        base_price_cents: 4000,
        dividend: Some(DividendTerms {
            per_share_cents: 20,
            offset_days: 30,
        }),
    },
];

/// A point-in-time price for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub ticker: String,
    pub name: String,
    pub price_cents: Cents,
    /// Deviation from the base price, in percent, rounded to 2 decimals.
    pub change_pct: f64,
}

/// An upcoming or due dividend payment for one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividendEntry {
    pub per_share_cents: Cents,
    pub payment_date: NaiveDate,
    pub status: String,
}

/// Market data source for the ledger. Stateless: quotes are drawn fresh on
/// every call and the dividend calendar is derived from the date passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Market;

impl Market {
    pub fn new() -> Self {
        Self
    }

    /// Current quotes for every listed ticker.
    pub fn quotes(&self) -> BTreeMap<String, Quote> {
        let mut rng = rand::thread_rng();
        LISTINGS
            .iter()
            .map(|listing| {
                let variation = rng.gen_range(-MAX_VARIATION..=MAX_VARIATION);
                let price_cents =
                    (listing.base_price_cents as f64 * (1.0 + variation)).round() as Cents;
                (
                    listing.ticker.to_string(),
                    Quote {
                        ticker: listing.ticker.to_string(),
                        name: listing.name.to_string(),
                        price_cents,
                        change_pct: (variation * 10_000.0).round() / 100.0,
                    },
                )
            })
            .collect()
    }

    /// Current quote for a single ticker, if it is listed.
    pub fn quote(&self, ticker: &str) -> Option<Quote> {
        self.quotes().remove(ticker)
    }

    pub fn is_listed(&self, ticker: &str) -> bool {
        LISTINGS.iter().any(|listing| listing.ticker == ticker)
    }

    /// Dividend calendar relative to `today`. Tickers without dividend terms
    /// are absent from the map.
    pub fn dividend_schedule(&self, today: NaiveDate) -> BTreeMap<String, DividendEntry> {
        LISTINGS
            .iter()
            .filter_map(|listing| {
                let terms = listing.dividend.as_ref()?;
                let payment_date = today + chrono::Duration::days(terms.offset_days);
                let status = if terms.offset_days == 0 {
                    "Today".to_string()
                } else {
                    format!("In {} days", terms.offset_days)
                };
                Some((
                    listing.ticker.to_string(),
                    DividendEntry {
                        per_share_cents: terms.per_share_cents,
                        payment_date,
                        status,
                    },
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn test_quotes_cover_all_listings() {
        let quotes = Market::new().quotes();
        assert_eq!(quotes.len(), 5);
        for ticker in ["PETR4", "VALE3", "ITUB4", "AAPL34", "WEGE3"] {
            assert!(quotes.contains_key(ticker), "missing {ticker}");
        }
    }

    #[test]
    fn test_quote_stays_within_bounds() {
        let market = Market::new();
        for _ in 0..100 {
            let quote = market.quote("PETR4").unwrap();
            let base = 3550.0;
            let lower = (base * (1.0 - MAX_VARIATION)).floor() as Cents;
            let upper = (base * (1.0 + MAX_VARIATION)).ceil() as Cents;
            assert!(
                (lower..=upper).contains(&quote.price_cents),
                "price {} out of bounds",
                quote.price_cents
            );
            assert!(quote.change_pct.abs() <= 2.0);
        }
    }

    #[test]
    fn test_unknown_ticker_has_no_quote() {
        assert!(Market::new().quote("XXXX9").is_none());
        assert!(!Market::new().is_listed("XXXX9"));
    }

    #[test]
    fn test_schedule_skips_tickers_without_terms() {
        let schedule = Market::new().dividend_schedule(today());
        assert_eq!(schedule.len(), 4);
        assert!(!schedule.contains_key("AAPL34"));
    }

    #[test]
    fn test_schedule_dates_follow_offsets() {
        let schedule = Market::new().dividend_schedule(today());

        let petr = &schedule["PETR4"];
        assert_eq!(petr.payment_date, today());
        assert_eq!(petr.per_share_cents, 145);
        assert_eq!(petr.status, "Today");

        let vale = &schedule["VALE3"];
        assert_eq!(vale.payment_date, today() + chrono::Duration::days(5));
        assert_eq!(vale.status, "In 5 days");
    }
}
