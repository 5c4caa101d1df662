//! Wizard state controller.
//!
//! Holds the user's selections across five linear steps and gates each
//! step on its requirements:
//!
//! ```text
//! Mode → Settings → Files → Processing → Results
//! ```
//!
//! `request_advance` only navigates between the first three steps.
//! `begin_run` leaves Files (snapshotting the configuration and building
//! jobs) and `complete_run` stores the outcome and shows Results.

mod errors;
mod state;
mod types;

pub use errors::{WizardError, WizardResult};
pub use state::WizardState;
pub use types::{EngineStatus, RunPlan, WizardStep};
