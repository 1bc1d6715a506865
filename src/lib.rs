//! # Skywatch
//!
//! Celestial observation service: position, phase, and rise/set timing of
//! the Moon and Mars for an optional observer location.
//!
//! The crate computes everything from series embedded in or shipped with
//! the repository — a tiered lunar periodic-term table and the VSOP87D
//! planetary theory — and exposes the results over a REST API via Axum.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) for API requests and responses
//! - [`astro`]: the computation pipeline — time scales, observer frames,
//!   ephemeris, constellation resolution, event searches
//! - [`services`]: per-body calculators and response assembly
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Request flow
//!
//! incoming request → time normalization + observer frame → body calculator
//! → constellation resolver → response assembler → payload
//!
//! All per-request computation is sequential (later fields depend on earlier
//! ones); the only shared state is the read-only ephemeris loaded once at
//! startup, so concurrent requests need no coordination.

pub mod api;

pub mod astro;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
