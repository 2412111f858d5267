//! Infrastructure layer: stores, locking, the cart engine, config.
//!
//! The engine composes the store traits and contains no IO of its own, so
//! tests run it over the in-memory stores and production over Postgres.

pub mod cart_engine;
pub mod checkout;
pub mod config;
pub mod error;
pub mod locks;
pub mod seed;
pub mod store;


pub use cart_engine::CartEngine;
pub use config::{ConfigError, StorefrontConfig};
pub use error::CartError;
pub use locks::KeyedLocks;
