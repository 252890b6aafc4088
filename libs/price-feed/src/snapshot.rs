//! Price snapshot construction
//!
//! Collapses a raw feed of timestamped price records into a single
//! authoritative price per symbol. The most recent observation wins.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A single timestamped price observation from the upstream feed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    /// Asset symbol (e.g. "ETH")
    pub symbol: String,
    /// When the upstream observed this price
    pub observed_at: DateTime<Utc>,
    /// Price in USD
    pub price: f64,
}

impl PriceRecord {
    /// Create a new price record
    pub fn new(symbol: impl Into<String>, observed_at: DateTime<Utc>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            observed_at,
            price,
        }
    }
}

/// Current best-known mapping from asset symbol to price.
pub type PriceSnapshot = HashMap<String, f64>;

/// Reduce raw records to one price per symbol.
///
/// The record with the latest `observed_at` wins. Records sharing an exact
/// timestamp resolve to whichever appears later in input order.
///
/// Pure and synchronous; records may arrive in any order and may repeat
/// symbols freely.
pub fn build_snapshot(records: &[PriceRecord]) -> PriceSnapshot {
    let mut latest: HashMap<&str, (f64, DateTime<Utc>)> =
        HashMap::with_capacity(records.len());

    for record in records {
        match latest.get(record.symbol.as_str()) {
            // Keep the stored entry only while it is strictly newer
            Some((_, seen)) if record.observed_at < *seen => {}
            _ => {
                latest.insert(record.symbol.as_str(), (record.price, record.observed_at));
            }
        }
    }

    latest
        .into_iter()
        .map(|(symbol, (price, _))| (symbol.to_string(), price))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, date: &str, price: f64) -> PriceRecord {
        let observed_at = DateTime::parse_from_rfc3339(date)
            .unwrap()
            .with_timezone(&Utc);
        PriceRecord::new(symbol, observed_at, price)
    }

    #[test]
    fn test_empty_input_yields_empty_snapshot() {
        assert!(build_snapshot(&[]).is_empty());
    }

    #[test]
    fn test_most_recent_record_wins() {
        let records = vec![
            record("ETH", "2024-01-01T00:00:00Z", 2000.0),
            record("ETH", "2024-01-02T00:00:00Z", 2200.0),
            record("BTC", "2024-01-01T00:00:00Z", 40000.0),
        ];

        let snapshot = build_snapshot(&records);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["ETH"], 2200.0);
        assert_eq!(snapshot["BTC"], 40000.0);
    }

    #[test]
    fn test_out_of_order_records() {
        let records = vec![
            record("SOL", "2024-03-05T12:00:00Z", 150.0),
            record("SOL", "2024-03-01T12:00:00Z", 120.0),
            record("SOL", "2024-03-03T12:00:00Z", 135.0),
        ];

        let snapshot = build_snapshot(&records);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["SOL"], 150.0);
    }

    #[test]
    fn test_one_entry_per_distinct_symbol() {
        let records = vec![
            record("ETH", "2024-01-01T00:00:00Z", 2000.0),
            record("BTC", "2024-01-01T00:00:00Z", 40000.0),
            record("ETH", "2024-01-01T06:00:00Z", 2100.0),
            record("USDC", "2024-01-01T00:00:00Z", 1.0),
            record("BTC", "2024-01-01T03:00:00Z", 41000.0),
        ];

        let snapshot = build_snapshot(&records);

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot["ETH"], 2100.0);
        assert_eq!(snapshot["BTC"], 41000.0);
        assert_eq!(snapshot["USDC"], 1.0);
    }

    #[test]
    fn test_reordering_without_ties_is_invariant() {
        let a = record("ETH", "2024-01-01T00:00:00Z", 2000.0);
        let b = record("ETH", "2024-01-02T00:00:00Z", 2200.0);
        let c = record("BTC", "2024-01-01T00:00:00Z", 40000.0);

        let forward = build_snapshot(&[a.clone(), b.clone(), c.clone()]);
        let reversed = build_snapshot(&[c, b, a]);

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_equal_timestamps_resolve_to_later_record() {
        let records = vec![
            record("ETH", "2024-01-01T00:00:00Z", 2000.0),
            record("ETH", "2024-01-01T00:00:00Z", 2050.0),
        ];

        let snapshot = build_snapshot(&records);

        assert_eq!(snapshot["ETH"], 2050.0);
    }

    #[test]
    fn test_fractional_second_precision() {
        let records = vec![
            record("XRP", "2024-06-01T00:00:00.500Z", 0.52),
            record("XRP", "2024-06-01T00:00:00.250Z", 0.51),
        ];

        let snapshot = build_snapshot(&records);

        assert_eq!(snapshot["XRP"], 0.52);
    }
}
