use crate::error::{OpsError, OpsResult};
use crate::models::ProcessRecord;
use crate::services::command::{CommandRunner, OsCommandAdapter, ProcessOperation};
use crate::state::{ExecutionOutcome, TerminationRequest, TransitionError};
use std::sync::Arc;

/// Number of processes listed when the operator gives no usable count
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Parse an operator-supplied list count.
///
/// Empty or non-numeric input falls back to [`DEFAULT_LIST_LIMIT`].
pub fn parse_limit(input: &str) -> usize {
    input.trim().parse().unwrap_or(DEFAULT_LIST_LIMIT)
}

/// Parse an operator-supplied PID.
///
/// PID 0 is rejected: `kill -9 0` signals the caller's whole process group.
pub fn parse_pid(input: &str) -> OpsResult<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Err(OpsError::InvalidInput("PID is empty".to_string()));
    }
    match input.parse() {
        Ok(0) => Err(OpsError::InvalidInput("PID 0 is not a process".to_string())),
        Ok(pid) => Ok(pid),
        Err(_) => Err(OpsError::InvalidInput(format!("'{}' is not a valid PID", input))),
    }
}

/// Process Directory: enumeration and keyword filtering over a fresh snapshot.
///
/// Nothing is cached between calls; every query spawns the listing command again.
pub struct ProcessDirectory<R> {
    adapter: Arc<OsCommandAdapter<R>>,
}

impl<R: CommandRunner> ProcessDirectory<R> {
    pub fn new(adapter: Arc<OsCommandAdapter<R>>) -> Self {
        Self { adapter }
    }

    /// First `limit` processes in the order the OS reported them.
    pub async fn enumerate(&self, limit: usize) -> OpsResult<Vec<ProcessRecord>> {
        let mut records = self.adapter.query(ProcessOperation::List).await?;
        records.truncate(limit);

        tracing::info!("Listed {} processes (limit {})", records.len(), limit);
        Ok(records)
    }

    /// Every process whose name contains `keyword`, ignoring case.
    ///
    /// # Errors
    /// [`OpsError::InvalidInput`] for an empty keyword; it never means "match all".
    pub async fn filter(&self, keyword: &str) -> OpsResult<Vec<ProcessRecord>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(OpsError::InvalidInput("search keyword is empty".to_string()));
        }

        let needle = keyword.to_lowercase();
        let records: Vec<ProcessRecord> = self
            .adapter
            .query(ProcessOperation::FilterCandidates)
            .await?
            .into_iter()
            .filter(|record| record.name_contains_lowercase(&needle))
            .collect();

        tracing::info!("Filter '{}' matched {} processes", keyword, records.len());
        Ok(records)
    }
}

/// Source of the operator's answer at the confirmation gate
pub trait Confirmer {
    /// Show the verified target and return the raw response.
    fn confirm(&mut self, target: &ProcessRecord) -> String;
}

impl<F> Confirmer for F
where
    F: FnMut(&ProcessRecord) -> String,
{
    fn confirm(&mut self, target: &ProcessRecord) -> String {
        self(target)
    }
}

/// Process Terminator: check, confirm, then kill.
///
/// The check and the kill are separate commands, so the process can exit (and
/// its PID can even be reused) in between. That window is accepted; a failed
/// kill is reported, never retried.
pub struct ProcessTerminator<R> {
    adapter: Arc<OsCommandAdapter<R>>,
}

impl<R: CommandRunner> ProcessTerminator<R> {
    pub fn new(adapter: Arc<OsCommandAdapter<R>>) -> Self {
        Self { adapter }
    }

    /// Open a request for `pid` and run the check step.
    ///
    /// The returned request is `Verified` when the PID still exists, otherwise
    /// `Aborted` (not found, or the check command failed).
    pub async fn verify(&self, pid: u32) -> TerminationRequest {
        let mut request = TerminationRequest::new(pid);

        let checked = match self
            .adapter
            .query(ProcessOperation::TerminateCheck { pid })
            .await
        {
            Ok(records) => request.verify(&records),
            Err(e) => {
                tracing::warn!("Check for PID {} failed: {}", pid, e);
                request.fail_check(e.to_string())
            }
        };
        if let Err(e) = checked {
            tracing::error!("{}", e);
        }

        request
    }

    /// Issue the kill command for a `Confirmed` request.
    ///
    /// # Errors
    /// [`TransitionError`] if the request is not `Confirmed`; no command runs then.
    pub async fn execute(&self, request: &mut TerminationRequest) -> Result<(), TransitionError> {
        let Some(target) = request.kill_target().cloned() else {
            return Err(TransitionError {
                from: request.state().name(),
                attempted: "execute",
            });
        };

        let outcome = match self
            .adapter
            .execute(ProcessOperation::TerminateKill { pid: target.pid })
            .await
        {
            Ok(_) => {
                tracing::info!("Terminated process {} ({})", target.pid, target.name);
                ExecutionOutcome::Success
            }
            Err(e) => {
                tracing::warn!("Termination of PID {} failed: {}", target.pid, e);
                ExecutionOutcome::Failure(e.to_string())
            }
        };

        request.complete(outcome)
    }

    /// Run the full protocol, asking `confirmer` at the confirmation gate.
    pub async fn terminate<C: Confirmer>(&self, pid: u32, confirmer: &mut C) -> TerminationRequest {
        let mut request = self.verify(pid).await;

        if let Some(target) = request.target().cloned() {
            let response = confirmer.confirm(&target);
            if request.confirm(&response).is_ok() && request.kill_target().is_some() {
                let _ = self.execute(&mut request).await;
            }
        }

        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_defaults() {
        assert_eq!(parse_limit(""), DEFAULT_LIST_LIMIT);
        assert_eq!(parse_limit("abc"), DEFAULT_LIST_LIMIT);
        assert_eq!(parse_limit("-3"), DEFAULT_LIST_LIMIT);
        assert_eq!(parse_limit(" 25 \n"), 25);
        assert_eq!(parse_limit("0"), 0);
    }

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid(" 4242\n").unwrap(), 4242);
        assert!(matches!(parse_pid(""), Err(OpsError::InvalidInput(_))));
        assert!(matches!(parse_pid("12ab"), Err(OpsError::InvalidInput(_))));
        assert!(matches!(parse_pid("0"), Err(OpsError::InvalidInput(_))));
        assert!(matches!(parse_pid(" 000 "), Err(OpsError::InvalidInput(_))));
        assert!(matches!(parse_pid("-1"), Err(OpsError::InvalidInput(_))));
    }
}
