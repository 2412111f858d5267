//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, ShortfallContext, StockShortfall};
pub use id::{CartLineId, ProductId, UserId};
pub use value_object::ValueObject;
