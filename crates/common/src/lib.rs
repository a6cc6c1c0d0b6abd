//! Shared types for the exchange lifecycle engine.

mod types;

pub use types::ExchangeId;
