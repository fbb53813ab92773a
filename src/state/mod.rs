// Termination state machine
//
// A kill request moves Requested → Verified → Confirmed → Executed, or drops to
// Aborted at either gate. Transitions are pure: the process service feeds in
// check results, the console feeds in the operator's answer, and the kill
// command is only issued while the request sits in Confirmed.

use crate::models::ProcessRecord;
use thiserror::Error;

/// Operator answer that authorises a kill (compared case-insensitively)
pub const AFFIRMATION_TOKEN: &str = "yes";

/// Where a termination request currently stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationState {
    /// PID received, nothing checked yet
    Requested { pid: u32 },

    /// The check command still reports the PID
    Verified { target: ProcessRecord },

    /// The operator answered with the affirmation token
    Confirmed { target: ProcessRecord },

    /// The kill command ran (terminal)
    Executed {
        target: ProcessRecord,
        outcome: ExecutionOutcome,
    },

    /// Stopped before any kill command was issued (terminal)
    Aborted { pid: u32, reason: AbortReason },
}

impl TerminationState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Requested { .. } => "Requested",
            Self::Verified { .. } => "Verified",
            Self::Confirmed { .. } => "Confirmed",
            Self::Executed { .. } => "Executed",
            Self::Aborted { .. } => "Aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed { .. } | Self::Aborted { .. })
    }
}

/// Result of the kill command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    /// Non-zero exit or spawn error, message kept verbatim for the operator
    Failure(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// The check command returned no record for the PID
    NotFound,
    /// The operator did not answer with the affirmation token
    Declined,
    /// The check command itself could not run
    CheckFailed(String),
}

/// Attempted transition that the current state does not allow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {attempted} a termination request in state {from}")]
pub struct TransitionError {
    pub from: &'static str,
    pub attempted: &'static str,
}

/// One termination request and the states it went through
#[derive(Clone, Debug)]
pub struct TerminationRequest {
    pid: u32,
    state: TerminationState,
    history: Vec<TerminationState>,
}

impl TerminationRequest {
    pub fn new(pid: u32) -> Self {
        let state = TerminationState::Requested { pid };
        Self {
            pid,
            history: vec![state.clone()],
            state,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn state(&self) -> &TerminationState {
        &self.state
    }

    /// Every state visited, starting with `Requested`
    pub fn history(&self) -> &[TerminationState] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The verified process, once the check step has found it
    pub fn target(&self) -> Option<&ProcessRecord> {
        match &self.state {
            TerminationState::Verified { target }
            | TerminationState::Confirmed { target }
            | TerminationState::Executed { target, .. } => Some(target),
            TerminationState::Requested { .. } | TerminationState::Aborted { .. } => None,
        }
    }

    /// Requested → Verified when `records` contains the PID, otherwise Aborted(NotFound).
    pub fn verify(&mut self, records: &[ProcessRecord]) -> Result<(), TransitionError> {
        self.expect_state("Requested", "verify")?;

        let next = match records.iter().find(|record| record.pid == self.pid) {
            Some(target) => TerminationState::Verified {
                target: target.clone(),
            },
            None => TerminationState::Aborted {
                pid: self.pid,
                reason: AbortReason::NotFound,
            },
        };
        self.transition(next);
        Ok(())
    }

    /// Requested → Aborted(CheckFailed) when the check command could not run.
    pub fn fail_check(&mut self, detail: impl Into<String>) -> Result<(), TransitionError> {
        self.expect_state("Requested", "fail the check of")?;
        self.transition(TerminationState::Aborted {
            pid: self.pid,
            reason: AbortReason::CheckFailed(detail.into()),
        });
        Ok(())
    }

    /// Verified → Confirmed on the affirmation token, otherwise Aborted(Declined).
    pub fn confirm(&mut self, response: &str) -> Result<(), TransitionError> {
        let TerminationState::Verified { target } = &self.state else {
            return Err(self.reject("confirm"));
        };

        let next = if is_affirmative(response) {
            TerminationState::Confirmed {
                target: target.clone(),
            }
        } else {
            TerminationState::Aborted {
                pid: self.pid,
                reason: AbortReason::Declined,
            }
        };
        self.transition(next);
        Ok(())
    }

    /// The target to kill, only while the request is Confirmed.
    pub fn kill_target(&self) -> Option<&ProcessRecord> {
        match &self.state {
            TerminationState::Confirmed { target } => Some(target),
            _ => None,
        }
    }

    /// Confirmed → Executed with the kill command's outcome.
    pub fn complete(&mut self, outcome: ExecutionOutcome) -> Result<(), TransitionError> {
        let Some(target) = self.kill_target().cloned() else {
            return Err(self.reject("complete"));
        };
        self.transition(TerminationState::Executed { target, outcome });
        Ok(())
    }

    fn expect_state(&self, expected: &str, attempted: &'static str) -> Result<(), TransitionError> {
        if self.state.name() == expected {
            Ok(())
        } else {
            Err(self.reject(attempted))
        }
    }

    fn reject(&self, attempted: &'static str) -> TransitionError {
        tracing::warn!(
            "Rejected '{}' on termination request for PID {} in state {}",
            attempted,
            self.pid,
            self.state.name()
        );
        TransitionError {
            from: self.state.name(),
            attempted,
        }
    }

    fn transition(&mut self, next: TerminationState) {
        tracing::debug!(
            "Termination request for PID {}: {} -> {}",
            self.pid,
            self.state.name(),
            next.name()
        );
        self.history.push(next.clone());
        self.state = next;
    }
}

/// Whether an operator response authorises the kill.
pub fn is_affirmative(response: &str) -> bool {
    response.trim().eq_ignore_ascii_case(AFFIRMATION_TOKEN)
}
