//! Market data models
//!
//! This module contains the core data types for quote retrieval:
//! - `ticker` - Configured ticker identity (TickerSpec) and the default list
//! - `quote` - Retrieval results (Quote, QuoteSource, QuoteSet)

mod quote;
mod ticker;

pub use quote::{Quote, QuoteSet, QuoteSource, PLACEHOLDER};
pub use ticker::{default_tickers, parse_tickers_json, TickerSpec};
