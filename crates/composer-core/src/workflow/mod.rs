//! Article wizard state machine
//!
//! [`WorkflowCoordinator`] walks Keywords → Research → Source Review → Draft →
//! Score & Refine → Final, calling the automation backend at each step or
//! fabricating the result in simulation mode.

mod coordinator;
pub mod simulation;
mod state;
mod step;

pub use coordinator::{CoordinatorConfig, StepOutcome, WorkflowCoordinator, SIMULATED_EXECUTION_PREFIX};
pub use simulation::SimulationConfig;
pub use state::{StepPayload, WorkflowState};
pub use step::{Operation, Step, StepSequence};
