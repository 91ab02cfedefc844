//! One node of a raft-replicated key-value store.
//!
//! Clients read and write over HTTP; writes are submitted through a
//! consensus engine for cluster-wide ordering and durability, committed
//! entries are applied to local storage by a deterministic state machine,
//! and membership is controlled through the engine's configuration API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        raftkv node                       │
//! │                                                          │
//! │   HTTP API ──► WriteCoordinator ──► ConsensusEngine      │
//! │      │                                    │ (commit)     │
//! │      │                                    ▼              │
//! │      │                            StoreStateMachine      │
//! │      │                                    │              │
//! │      └────────── LocalReader ──────► StorageEngine       │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The consensus algorithm (election, replication, quorum) is an external
//! collaborator behind the [`raft::ConsensusEngine`] trait; this crate
//! implements the state-machine callbacks the engine drives and the
//! leader-gated write and membership protocol on top of it. Reads bypass
//! consensus and are served from local storage.

pub mod api;
pub mod command;
pub mod config;
pub mod error;
pub mod raft;
pub mod service;
pub mod state;
pub mod store;

pub use command::{CommandPayload, Operation};
pub use config::NodeConfig;
pub use error::{KvError, KvResult};
pub use raft::{ConsensusEngine, Role, StandaloneEngine};
pub use state::{ApplyResult, StoreStateMachine};
pub use store::{SledStore, StorageEngine};
