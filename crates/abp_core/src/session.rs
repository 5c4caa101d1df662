//! Run composition: wizard → driver → wizard.

use thiserror::Error;

use crate::driver::{DriverError, ProcessingDriver, RunReport};
use crate::engine::MediaEngine;
use crate::wizard::{WizardError, WizardState};

/// Why a run could not start or finish.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The wizard refused to start.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// The driver failed before processing any file.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Start a run from the Files step and carry it through to Results.
///
/// On a run-level driver error the wizard goes back to Files with its
/// selections intact. Per-file failures are part of the returned report.
pub fn start_run<'w, E: MediaEngine + ?Sized>(
    wizard: &'w mut WizardState,
    engine: &mut E,
    driver: &ProcessingDriver,
) -> Result<&'w RunReport, SessionError> {
    let plan = wizard.begin_run(driver.builder())?;

    match driver.run(engine, &plan.jobs, &plan.config) {
        Ok(report) => {
            wizard.complete_run(report);
            Ok(wizard.report())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            wizard.abandon_run();
            Err(e.into())
        }
    }
}
