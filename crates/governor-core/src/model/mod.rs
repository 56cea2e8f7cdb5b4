//! Data model shared by the observer and controller loops.
//!
//! - [`container`]: immutable [`container::ContainerSpec`] read from config.
//! - [`state`]: controller-private [`state::ResourceState`] mutated per tick.
//! - [`event`]: event journal records ([`event::Event`]).
//! - [`sample`]: sample journal records ([`sample::AgentSample`], [`sample::ControllerSample`]).

pub mod container;
pub mod event;
pub mod sample;
pub mod state;

pub use container::{ContainerSpec, CpuSpec, IoSpec, MemorySpec};
pub use event::{Event, EventData, Source};
pub use sample::{AgentSample, ControllerSample};
pub use state::{PendingEval, ResourceState, clamped_delta};
