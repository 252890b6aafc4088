//! Swap conversion quotes
//!
//! Derives the receive amount for a swap from the current snapshot:
//! `amount * price[from] / price[to]`, fixed to six decimal places.

use crate::snapshot::PriceSnapshot;

/// Decimal places in a formatted receive amount.
pub const QUOTE_DECIMALS: usize = 6;

/// Returned whenever a conversion cannot be computed.
pub const EMPTY_QUOTE: &str = "0.0";

/// Raw cross rate between two symbols, if both have usable prices.
pub fn exchange_rate(prices: &PriceSnapshot, from: &str, to: &str) -> Option<f64> {
    let from_price = usable_price(prices, from)?;
    let to_price = usable_price(prices, to)?;
    Some(from_price / to_price)
}

/// Receive amount for swapping `amount` of `from` into `to`.
///
/// Returns `"0.0"` when the amount is non-positive or not a number,
/// either symbol is missing from the snapshot, or either price is
/// unusable. A missing price is "cannot compute", never a failure.
pub fn receive_amount(prices: &PriceSnapshot, amount: f64, from: &str, to: &str) -> String {
    if !amount.is_finite() || amount <= 0.0 {
        return EMPTY_QUOTE.to_string();
    }

    match exchange_rate(prices, from, to) {
        Some(rate) => format!("{:.*}", QUOTE_DECIMALS, amount * rate),
        None => EMPTY_QUOTE.to_string(),
    }
}

/// Symbols with a published price, sorted for stable display.
pub fn listed_symbols(prices: &PriceSnapshot) -> Vec<String> {
    let mut symbols: Vec<String> = prices.keys().cloned().collect();
    symbols.sort();
    symbols
}

fn usable_price(prices: &PriceSnapshot, symbol: &str) -> Option<f64> {
    prices
        .get(symbol)
        .copied()
        .filter(|price| price.is_finite() && *price > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, f64)]) -> PriceSnapshot {
        entries
            .iter()
            .map(|(symbol, price)| (symbol.to_string(), *price))
            .collect()
    }

    #[test]
    fn test_receive_amount_formats_six_decimals() {
        let prices = snapshot(&[("ETH", 2000.0), ("USDC", 1.0)]);
        assert_eq!(receive_amount(&prices, 1.5, "ETH", "USDC"), "3000.000000");
    }

    #[test]
    fn test_reverse_direction() {
        let prices = snapshot(&[("ETH", 2000.0), ("USDC", 1.0)]);
        assert_eq!(receive_amount(&prices, 100.0, "USDC", "ETH"), "0.050000");
    }

    #[test]
    fn test_missing_symbol_cannot_compute() {
        let prices = snapshot(&[("ETH", 2000.0)]);
        assert_eq!(receive_amount(&prices, 1.5, "ETH", "USDC"), "0.0");
        assert_eq!(receive_amount(&prices, 1.5, "DOGE", "ETH"), "0.0");
    }

    #[test]
    fn test_non_positive_amount() {
        let prices = snapshot(&[("ETH", 2000.0), ("USDC", 1.0)]);
        assert_eq!(receive_amount(&prices, 0.0, "ETH", "USDC"), "0.0");
        assert_eq!(receive_amount(&prices, -1.0, "ETH", "USDC"), "0.0");
        assert_eq!(receive_amount(&prices, f64::NAN, "ETH", "USDC"), "0.0");
    }

    #[test]
    fn test_non_positive_price_is_unusable() {
        let prices = snapshot(&[("ETH", 2000.0), ("BAD", 0.0), ("NEG", -3.0)]);
        assert_eq!(receive_amount(&prices, 1.0, "ETH", "BAD"), "0.0");
        assert_eq!(receive_amount(&prices, 1.0, "NEG", "ETH"), "0.0");
    }

    #[test]
    fn test_exchange_rate() {
        let prices = snapshot(&[("ETH", 2000.0), ("BTC", 40000.0)]);
        let rate = exchange_rate(&prices, "ETH", "BTC").unwrap();
        assert!((rate - 0.05).abs() < 1e-12);
        assert!(exchange_rate(&prices, "ETH", "SOL").is_none());
    }

    #[test]
    fn test_listed_symbols_sorted() {
        let prices = snapshot(&[("USDC", 1.0), ("BTC", 40000.0), ("ETH", 2000.0)]);
        assert_eq!(listed_symbols(&prices), vec!["BTC", "ETH", "USDC"]);
    }
}
