//! Harness configuration
//!
//! Named network environments (node and compiler endpoints) and the ordered
//! default wallets that drive the actors of a scenario. Both are plain values
//! handed to session constructors; nothing here is global state.

mod error;
pub mod harness;
pub mod logging;
pub mod network;

pub use error::{ConfigError, ConfigResult};
pub use harness::{network_name_from, HarnessConfig, NETWORK_ENV};
pub use logging::{LogFormat, LoggingConfig};
pub use network::{NetworkConfig, NetworkMap, DEFAULT_NETWORK, DEFAULT_NETWORK_ID};
