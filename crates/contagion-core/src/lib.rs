pub mod graph;
pub mod state;
pub mod noise;
pub mod config;
pub mod control;
pub mod transition;
pub mod error;

// Core types
pub type NodeId = usize;
pub type F = f64;

pub use graph::Network;
pub use state::{NodeStatus, Statuses};
pub use noise::TrialRng;
pub use error::{ContagionError, Result};

// Simulation parameters
pub use config::{NodeSelection, SimulationConfig, UpdateOrder};

// Control policy and state machine
pub use control::ControlOverlay;
pub use transition::{advance, TransitionRule};
