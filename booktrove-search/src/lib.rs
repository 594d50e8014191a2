//! Online book lookup: the registry of search sites, per-site engines,
//! and a coordinator that queries several sites at once and merges what
//! they return.

pub mod accumulator;
pub mod client;
pub mod coordinator;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod googlebooks;
pub mod openlibrary;
pub mod site;
pub mod types;

pub use accumulator::ResultsAccumulator;
pub use client::SiteClient;
pub use coordinator::{SearchCoordinator, SearchOutcome};
pub use credentials::{CredentialSource, Credentials, credential_source, save_to_file};
pub use engine::{EngineId, SearchEngine, create_engine};
pub use error::SearchError;
pub use site::{Site, SiteList, SiteType, enabled_pref_key, order_pref_key};
pub use types::{BookCandidate, CoverSize, SearchQuery, normalize_date};
