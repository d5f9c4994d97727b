//! Coordinator profiles: the identity registry the launch engine consults
//! for coordinator authority.

pub mod coordinator;
pub mod genesis;

pub use coordinator::{Coordinator, CoordinatorBook, Description};
pub use genesis::{CoordinatorByAddress, ProfileGenesis};
