//!
//! Composer Core - workflow coordinator for the article wizard
//!
//! Domain model, backend contract, progress channel and the step state
//! machine. Transports live in `composer-client`; link checking lives in
//! `composer-links`.

#![forbid(unsafe_code)]

/// Payload shapes exchanged with the automation backend
pub mod domain;

/// Error types
pub mod error;

/// Backend contract and response envelope
pub mod backend;

/// Progress events and per-execution subscriptions
pub mod progress;

/// Deep-research response normalisation
pub mod normalize;

/// Export formats and local rendering
pub mod export;

/// Step state machine
pub mod workflow;

#[cfg(feature = "testing")]
pub mod testing;

pub use backend::{Accepted, AutomationBackend, CancelAck, ExecutionStatus, WorkflowResponse};
pub use error::{ComposerError, ComposerResult};
pub use export::{ArtifactBody, ExportArtifact, ExportFormat, RemoteExport};
pub use progress::{ProgressChannel, ProgressListener, ProgressStatus, ProgressUpdate};
pub use workflow::{
    CoordinatorConfig, Operation, SimulationConfig, Step, StepOutcome, StepPayload, StepSequence,
    WorkflowCoordinator, WorkflowState,
};
