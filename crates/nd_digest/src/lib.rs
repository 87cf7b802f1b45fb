pub mod delivery;
pub mod logging;
pub mod manager;
pub mod profile;
pub mod render;
pub mod sources;

pub use logging::{init_logging, Logger};
pub use manager::{DigestManager, RunOptions, RunOutcome};
pub use profile::{load_profile, Profile, SheetLocations};

pub mod prelude {
    pub use super::delivery::{ConsoleSender, SmtpConfig, SmtpSender};
    pub use super::sources::{GoogleNewsSource, SheetSource};
    pub use super::{init_logging, load_profile, DigestManager, Logger, RunOptions, RunOutcome, SheetLocations};
    pub use nd_core::{Error, Result};
}
