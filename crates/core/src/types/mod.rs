//! Core types for Voltfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;

pub use cart::{CartLineItem, LineKey};
pub use id::*;
