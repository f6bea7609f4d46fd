pub mod crash_report;
pub mod images;
pub mod paths;
pub mod pidfile;
pub mod system;

pub use images::ImageSet;
pub use paths::Paths;
pub use pidfile::PidFile;
