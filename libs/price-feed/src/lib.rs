//! Live token price feed
//!
//! Ingests a third-party price feed, collapses duplicate entries to the
//! most recent observation per symbol, keeps the result fresh on a fixed
//! schedule, and publishes it (with loading/refetching/error flags) to any
//! number of subscribers. The [`quote`] module derives swap receive
//! amounts from the published snapshot.

pub mod config;
pub mod logging;
pub mod quote;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod utils;

pub use config::{ConfigError, FeedConfig};
pub use quote::{exchange_rate, listed_symbols, receive_amount};
pub use snapshot::{build_snapshot, PriceRecord, PriceSnapshot};
pub use source::{FeedError, HttpPriceSource, PriceSource};
pub use store::{FeedState, PriceFeedStore};
pub use utils::{Heartbeat, ShutdownManager};
