//! lingbot-services — remote service clients and configuration.
//!
//! Implements `lingbot-core`'s capability traits against the real learning
//! service and the Datamuse synonym API, and owns settings loading.

pub mod config;
pub mod datamuse;
pub mod instaling;
pub mod mock;

pub use config::{load_settings, load_settings_from, Settings};
pub use datamuse::DatamuseClient;
pub use instaling::InstalingClient;
