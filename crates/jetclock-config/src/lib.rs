//! JetClock updater configuration.
//!
//! Reads the device's YAML settings file. Every field has a default, so a
//! partial or missing file still yields a usable [`AppConfig`].

pub mod port;
pub mod schema;
pub mod validation;
pub mod yaml_loader;

pub use port::{resolve_port, DEFAULT_PORT, PORT_ENV_VAR};
pub use schema::AppConfig;
pub use yaml_loader::{load_from_path, load_or_default};
