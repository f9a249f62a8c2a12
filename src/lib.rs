pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::LocationCache;
pub use client::SwissPostClient;
pub use config::SwissPostConfig;
pub use error::SearchError;
pub use provider::LocalityProvider;
pub use service::{LocationSearch, Lookup};
pub use types::{LocalityQuery, Location, SearchType};
