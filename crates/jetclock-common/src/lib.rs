pub mod errors;
pub mod state;
pub mod status;

pub use errors::{
    ConfigError, ConnectivityError, DisplayError, HotspotError, PortalError, SystemError,
    UpdateError, UpdaterError,
};
pub use state::ProcessState;
pub use status::StatusImage;
