pub mod analyzers;
pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod mutation;
pub mod output;
pub mod query;
pub mod record;
pub mod source;
pub mod store;
