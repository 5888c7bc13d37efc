//! # ticketfeed
//!
//! Aggregates event listings from eight Taiwanese ticketing platforms into
//! one store that a front end can read and filter.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline → SourceAdapter ×8 (via Fetcher) → Normalizer → EventStore
//! ```
//!
//! - [`fetcher`]: HTTP / stealth / headless-browser fetch with retries and
//!   block detection
//! - [`sources`]: per-platform listing extraction
//! - [`normalizer`]: canonical records, acceptance bar, dedup by URL
//! - [`store`]: SQLite full-refresh writes and the read interface
//! - [`pipeline`]: bounded-parallel orchestration with a deadline
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL=sqlite://events.db
//!
//! # Scrape once
//! ticketfeed
//!
//! # Browse what was stored
//! ticketfeed list --platform kktix --type concert
//!
//! # Keep it fresh
//! ticketfeed daemon --interval 6h
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher, normalizer and pipeline.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration file and environment settings.
pub mod config;

/// Foreground periodic runner.
pub mod daemon;

/// Core domain models: [`RawEvent`](domain::RawEvent),
/// [`EventRecord`](domain::EventRecord), [`Platform`](domain::Platform).
pub mod domain;

/// Fetch client.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait with strategy fallback
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`ChromeRenderer`](fetcher::ChromeRenderer): chromiumoxide-based rendering
pub mod fetcher;

/// Normalization and dedup.
pub mod normalizer;

/// Orchestrator.
pub mod pipeline;

/// Randomised politeness delays.
pub mod politeness;

/// Source adapters, one per platform.
pub mod sources;

/// SQLite persistence layer.
///
/// - [`EventStore`](store::EventStore): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
