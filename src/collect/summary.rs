//! Final per-repository report.

use std::fmt;
use std::time::Duration;

use super::worker::RepositoryOutcome;

/// Outcomes of a whole run plus its wall time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    outcomes: Vec<RepositoryOutcome>,
    elapsed: Duration,
}

impl RunSummary {
    /// Builds a summary; outcomes are ordered by repository for display.
    #[must_use]
    pub fn new(mut outcomes: Vec<RepositoryOutcome>, elapsed: Duration) -> Self {
        outcomes.sort_by_key(|outcome| outcome.repository.to_string());
        Self { outcomes, elapsed }
    }

    /// Outcomes, ordered by repository.
    #[must_use]
    pub fn outcomes(&self) -> &[RepositoryOutcome] {
        &self.outcomes
    }

    /// Repositories that finished without error.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }

    /// Repositories that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len().saturating_sub(self.succeeded())
    }

    /// Records written across all repositories.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.records).sum()
    }

    /// Wall time of the run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.error {
                None => writeln!(f, "{}: {} records", outcome.repository, outcome.records)?,
                Some(error) => writeln!(f, "{}: error: {error}", outcome.repository)?,
            }
        }
        write!(
            f,
            "{} repositories: {} succeeded, {} failed, {} records in {:.1}s",
            self.outcomes.len(),
            self.succeeded(),
            self.failed(),
            self.total_records(),
            self.elapsed.as_secs_f64()
        )
    }
}
