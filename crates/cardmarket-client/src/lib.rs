//! Cardmarket API client with OAuth 1.0a request signing.
//!
//! This crate provides:
//! - [`oauth`]: the HMAC-SHA1 signing pipeline (encoding, parameter
//!   normalization, base string, signature, `Authorization` header)
//! - [`CardmarketClient`]: sync HTTP client for the `/ws/v2.0` REST API
//!
//! # API Client
//!
//! ```ignore
//! use cardmarket_client::CardmarketClient;
//! use cardmarket_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let client = CardmarketClient::from_config(&config)?;
//!
//! let query = vec![("search".to_owned(), "Edgar Markov".to_owned())];
//! if let Some(body) = client.get("/products/find", &query)? {
//!     println!("{body}");
//! }
//! ```

// API client
mod client;
pub use client::{CardmarketClient, ClientOptions};

// OAuth
pub mod oauth;
pub use oauth::{Credentials, OAuth1Auth};

// Request/response types
mod types;
pub use types::{HttpMethod, ResponseBody, SignedRequest};

// Errors
pub mod error;
pub use error::ClientError;

pub use cardmarket_config::{Environment, ResponseFormat};
