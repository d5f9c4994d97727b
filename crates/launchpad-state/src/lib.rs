pub mod db;
pub mod engine;
pub mod query;
pub mod registry;
pub mod requests;

pub use db::StateDb;
pub use engine::{LaunchEngine, ValidatorCandidate};
pub use query::LaunchQuery;
pub use registry::{ChainRegistry, NewChain};
pub use requests::RequestStore;
