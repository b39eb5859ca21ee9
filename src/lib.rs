//! Setaccio: a caching proxy that filters form submissions fetched from an
//! upstream forms API.
//!
//! The interesting parts live in [`application::filter`] (the predicate
//! engine) and [`cache`] (the TTL store). Everything else is the plumbing
//! that turns one HTTP request into one upstream fetch, one filter pass
//! and one cache write.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
