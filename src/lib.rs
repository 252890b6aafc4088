//! Swap pricer - main library
//!
//! Root crate for the swap pricing service: re-exports the core
//! `price-feed` library and hosts utilities shared by the binaries.
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use swap_pricer::bin_common::{load_config_from_env, ConfigType};
//!
//! let path = load_config_from_env(ConfigType::Feed);
//! ```

// Re-export the workspace library for convenience
pub use price_feed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
}
