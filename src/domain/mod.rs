//! Core domain types and logic.

pub mod series;
pub mod resolver;
pub mod cache;
pub mod acquisition;
pub mod strategy;
pub mod simulation;
pub mod summary;
pub mod error;
