pub mod accounts;
pub mod algebra;
pub mod cache;
pub mod clock;
pub mod config;
pub mod demo;
pub mod error;
pub mod events;
pub mod export;
pub mod filter;
pub mod models;
pub mod notifications;
pub mod persistence;
pub mod report;
pub mod scoring;
pub mod store;
pub mod validation;

pub use error::{PersistenceError, StoreError, StoreResult, ValidationError};
pub use store::MembershipStore;
