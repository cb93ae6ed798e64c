//! Client for the X (Twitter) v2 API.
//!
//! Resolves a bearer credential through an ordered cascade of strategies,
//! caches it in a single shared slot, looks up a user profile and pages
//! through the user's recent posts up to a bounded sample size.

pub mod client;
pub mod credentials;
pub mod error;
pub mod token_cache;
pub mod types;

pub use client::{XClient, XClientConfig};
pub use credentials::{
    AccessToken, CredentialChain, CredentialStrategy, StaticBearer, TokenGrant, TokenSource,
};
pub use error::XApiError;
pub use token_cache::TokenCache;
pub use types::SubjectSnapshot;
