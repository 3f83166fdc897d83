//! Named entity detection for Indonesian news text, plus a multi-strategy article scraper.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod nlp;
pub mod scrape;
#[cfg(feature = "askama")]
pub mod ui;
