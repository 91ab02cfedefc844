//! Consensus engine integration.
//!
//! The consensus algorithm itself (leader election, log replication, quorum
//! commitment) is an external collaborator consumed through the
//! [`ConsensusEngine`] trait; this crate implements the callback surface the
//! engine drives ([`StateMachine`]) and ships a single-node engine for
//! development and tests.

mod engine;
mod standalone;

pub use engine::{
    Configuration, ConsensusEngine, Member, Role, SnapshotHandle, StateMachine,
};
pub use standalone::StandaloneEngine;
