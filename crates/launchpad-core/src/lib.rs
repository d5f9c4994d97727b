pub mod account;
pub mod chain;
pub mod collab;
pub mod constants;
pub mod error;
pub mod params;
pub mod request;
pub mod types;
pub mod validation;

pub use account::*;
pub use chain::*;
pub use collab::{IdentityRegistry, ShareLedger};
pub use constants::*;
pub use error::{ErrorKind, LaunchpadError};
pub use params::LaunchParams;
pub use request::*;
pub use types::*;
pub use validation::validate_content;
