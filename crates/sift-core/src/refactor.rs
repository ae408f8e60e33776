//! Composite refactoring coordination.
//!
//! A [`CompositeRefactoring`] owns a fixed, ordered collection of
//! [`RefactoringUnit`]s for the duration of one coordinated run and drives
//! them through three strictly sequential phases:
//!
//! 1. **initial conditions** — every unit, selected or not (an unselected
//!    unit may still surface diagnostics the caller needs);
//! 2. **final conditions** — selected units only;
//! 3. **change creation** — selected units only, aggregated into a
//!    [`CompositeChange`] in unit-list order.
//!
//! A unit failure aborts its phase immediately. For the check phases the
//! statuses already merged from earlier units ride along on the error.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::change::{Change, CompositeChange};
use crate::progress::{Cancelled, ProgressSink};
use crate::status::RefactoringStatus;

/// The coordinator phase a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Final,
    Change,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initial => write!(f, "initial condition checking"),
            Phase::Final => write!(f, "final condition checking"),
            Phase::Change => write!(f, "change creation"),
        }
    }
}

/// Failure raised by a single refactoring unit.
#[derive(Debug, Error)]
pub enum UnitError {
    /// Cancellation observed while the unit was running.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// The unit could not complete its work.
    #[error("{0}")]
    Failed(String),
}

impl UnitError {
    /// Create a failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        UnitError::Failed(message.into())
    }
}

/// A self-contained refactoring transformation.
///
/// The `selected` flag is set exclusively by the embedding layer (a UI, a
/// batch driver) between the initial and final phases; the coordinator
/// reads it but never infers it. Units start unselected.
pub trait RefactoringUnit {
    /// Human-readable name, used in diagnostics and failure reports.
    fn name(&self) -> &str;

    /// Whether this unit participates in the final check and change phases.
    fn is_selected(&self) -> bool;

    /// Set the selection flag.
    fn set_selected(&mut self, selected: bool);

    /// Early feasibility check. Runs for every unit regardless of selection.
    fn check_initial_conditions(
        &mut self,
        pm: &dyn ProgressSink,
    ) -> Result<RefactoringStatus, UnitError>;

    /// Full precondition check. Runs only for selected units.
    fn check_final_conditions(
        &mut self,
        pm: &dyn ProgressSink,
    ) -> Result<RefactoringStatus, UnitError>;

    /// Produce this unit's change. Runs only for selected units.
    fn create_change(&mut self, pm: &dyn ProgressSink) -> Result<Box<dyn Change>, UnitError>;
}

/// A unit failure wrapped with its position in the run.
///
/// `partial` carries the statuses merged from units that completed earlier
/// in the same phase; it is empty for the change phase, where partially
/// built composites are discarded.
#[derive(Debug, Error)]
#[error("unit '{name}' (index {index}) failed during {phase}: {source}")]
pub struct CompositeError {
    pub phase: Phase,
    pub index: usize,
    pub name: String,
    pub partial: RefactoringStatus,
    #[source]
    pub source: UnitError,
}

/// Coordinator for an ordered collection of refactoring units.
///
/// Callers run the phases in order: `check_initial_conditions`, then
/// (after adjusting selection) `check_final_conditions`, then
/// `create_change`.
pub struct CompositeRefactoring {
    name: String,
    units: Vec<Box<dyn RefactoringUnit>>,
}

impl CompositeRefactoring {
    /// Create a coordinator over the given units. Unit order is preserved
    /// through every phase and in the final composite change.
    pub fn new(name: impl Into<String>, units: Vec<Box<dyn RefactoringUnit>>) -> Self {
        CompositeRefactoring {
            name: name.into(),
            units,
        }
    }

    /// The coordinator's name, also used as the composite change name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The units in run order.
    pub fn units(&self) -> &[Box<dyn RefactoringUnit>] {
        &self.units
    }

    /// Mutable access to the units, for adjusting selection between phases.
    pub fn units_mut(&mut self) -> &mut [Box<dyn RefactoringUnit>] {
        &mut self.units
    }

    /// Phase one: run `check_initial_conditions` on every unit and merge
    /// the statuses. Selection is ignored here on purpose — an unselected
    /// unit's blocking diagnostics must still reach the caller.
    pub fn check_initial_conditions(
        &mut self,
        pm: &dyn ProgressSink,
    ) -> Result<RefactoringStatus, CompositeError> {
        self.run_check_phase(Phase::Initial, pm, |_| true)
    }

    /// Phase two: run `check_final_conditions` on the selected units and
    /// merge the statuses.
    pub fn check_final_conditions(
        &mut self,
        pm: &dyn ProgressSink,
    ) -> Result<RefactoringStatus, CompositeError> {
        self.run_check_phase(Phase::Final, pm, |unit| unit.is_selected())
    }

    /// Phase three: create each selected unit's change and aggregate them,
    /// in unit-list order, into one composite change.
    pub fn create_change(
        &mut self,
        pm: &dyn ProgressSink,
    ) -> Result<CompositeChange, CompositeError> {
        let mut composite = CompositeChange::new(self.name.clone());
        for (index, unit) in self.units.iter_mut().enumerate() {
            if !unit.is_selected() {
                continue;
            }
            if let Err(cancelled) = pm.check_cancelled() {
                return Err(CompositeError {
                    phase: Phase::Change,
                    index,
                    name: unit.name().to_string(),
                    partial: RefactoringStatus::new(),
                    source: cancelled.into(),
                });
            }
            match unit.create_change(pm) {
                Ok(change) => composite.add(change),
                Err(source) => {
                    return Err(CompositeError {
                        phase: Phase::Change,
                        index,
                        name: unit.name().to_string(),
                        partial: RefactoringStatus::new(),
                        source,
                    });
                }
            }
            pm.worked(1);
        }
        debug!(
            name = %self.name,
            changes = composite.len(),
            "composite change created"
        );
        Ok(composite)
    }

    fn run_check_phase(
        &mut self,
        phase: Phase,
        pm: &dyn ProgressSink,
        include: impl Fn(&dyn RefactoringUnit) -> bool,
    ) -> Result<RefactoringStatus, CompositeError> {
        let mut status = RefactoringStatus::new();
        for (index, unit) in self.units.iter_mut().enumerate() {
            if !include(unit.as_ref()) {
                continue;
            }
            if let Err(cancelled) = pm.check_cancelled() {
                return Err(CompositeError {
                    phase,
                    index,
                    name: unit.name().to_string(),
                    partial: status,
                    source: cancelled.into(),
                });
            }
            let checked = match phase {
                Phase::Initial => unit.check_initial_conditions(pm),
                _ => unit.check_final_conditions(pm),
            };
            match checked {
                Ok(unit_status) => status.merge(unit_status),
                Err(source) => {
                    return Err(CompositeError {
                        phase,
                        index,
                        name: unit.name().to_string(),
                        partial: status,
                        source,
                    });
                }
            }
            pm.worked(1);
        }
        Ok(status)
    }
}
