//! Server-side core of the dinhgia property-valuation web app.
//!
//! The front-end talks to three concerns that live here: a thin proxy over
//! the Guland map-service detail-layer endpoint, the AI market-search
//! orchestration (proxy server primary, Perplexity fallback), and the radar
//! scoring that feeds the result panel's chart.

pub mod config;
pub mod error;
pub mod logger;
pub mod mapservice;
pub mod scoring;
pub mod search;
pub mod server;

pub use error::AppError;
