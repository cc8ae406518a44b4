//! HTTP client for the station API.
//!
//! The API serves the full station list as a JSON array from a single
//! unauthenticated endpoint. Every way a request can fail (transport error,
//! non-success status, unparseable body) surfaces as an [`ApiError`].

pub mod client;
pub mod error;

pub use client::StationApiClient;
pub use error::ApiError;
