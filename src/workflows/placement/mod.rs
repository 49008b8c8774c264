pub mod domain;
pub mod intake;
pub mod report;

mod allocator;
mod scoring;

pub use allocator::{allocate, CapRelaxation, PlacementOutcome, SUPERVISOR_CAP};
pub use intake::{IntakeError, PlacementIntake};
pub use scoring::{score, InvalidWeights, Weights, PROXIMITY_MARKER};
