//! Core domain types and logic.

pub mod config_validation;
pub mod currency;
pub mod error;
pub mod evaluator;
pub mod indicator;
pub mod liquidity;
pub mod ohlcv;
pub mod plan;
pub mod rule;
pub mod rule_eval;
pub mod rule_parser;
pub mod scan;
pub mod score;
pub mod universe;
