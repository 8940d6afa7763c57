//! Shared domain types for Vitrina.
//!
//! This crate contains the domain types used across the catalog bot:
//! Product, Price, Category, the chat boundary shapes (inbound events and
//! outbound replies), configuration, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror,
//! rust_decimal and secrecy.

pub mod config;
pub mod error;
pub mod event;
pub mod price;
pub mod product;
pub mod reply;
