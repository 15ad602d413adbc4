pub mod error;
pub mod loader;
pub mod config;
pub mod output;
pub mod cli;

pub use error::{IoError, Result};
pub use loader::{load_adjacency, read_adjacency};
pub use config::{OrderingSpec, RobustnessSettings, RunConfig, ScenarioSpec};
pub use output::{
    read_json, write_json, OrderingResult, Outcome, RobustnessOutput, RunManifest, SimulationOutput,
};
