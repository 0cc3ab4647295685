//! Per-session run context.
//!
//! A [`Session`] owns the loaded dataset, the active source filter, the
//! credential and the state of the latest batch run. Changing the filter only
//! re-derives the view; classification runs happen exclusively through
//! [`Session::trigger`]. A completed run is tied to the filter and key it ran
//! with and stops being reusable once either changes.

use super::batch::{BatchRun, BatchRunner};
use crate::cache::credential_fingerprint;
use crate::dataset::{Dataset, SourceFilter};
use crate::error::SessionError;
use crate::report::DashboardView;

/// Where the session's batch run stands.
#[derive(Debug, Clone, Default)]
pub enum RunState {
    /// Nothing has been run yet.
    #[default]
    Idle,
    /// A run is underway.
    Running { completed: usize, total: usize },
    /// The latest run finished; its results back the view.
    Completed(BatchRun),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// What [`Session::trigger`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new batch run was executed.
    Ran,
    /// The stored run still matches the filter and key; no classification
    /// happened.
    Reused,
    /// No credential is set, so classification is disabled.
    Disabled,
}

/// Filter and key fingerprint a completed run was produced with.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunBasis {
    filter: SourceFilter,
    fingerprint: String,
}

pub struct Session {
    dataset: Dataset,
    filter: SourceFilter,
    credential: Option<String>,
    state: RunState,
    basis: Option<RunBasis>,
}

impl Session {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            filter: SourceFilter::all(),
            credential: None,
            state: RunState::Idle,
            basis: None,
        }
    }

    /// Set or clear the API key. Blank keys count as no key.
    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = credential.filter(|c| !c.trim().is_empty());
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filter(&self) -> &SourceFilter {
        &self.filter
    }

    /// Change the source filter. The stored run still backs the view, but the
    /// next [`Session::trigger`] runs again.
    pub fn set_filter(&mut self, filter: SourceFilter) {
        tracing::debug!("Source filter changed: {:?}", filter.selected());
        self.filter = filter;
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// The latest completed run, if any.
    pub fn latest_run(&self) -> Option<&BatchRun> {
        match &self.state {
            RunState::Completed(run) => Some(run),
            _ => None,
        }
    }

    /// Classify the filtered reviews.
    ///
    /// From `Completed`, the stored run is reused unless `fresh` is set or the
    /// filter or key changed since it ran. Rows already classified with the
    /// same key come from the cache. Without a credential the runner is never
    /// called.
    pub async fn trigger<F>(
        &mut self,
        runner: &BatchRunner,
        fresh: bool,
        mut on_progress: F,
    ) -> Result<TriggerOutcome, SessionError>
    where
        F: FnMut(usize, usize),
    {
        if let RunState::Running { completed, total } = self.state {
            return Err(SessionError::RunInProgress { completed, total });
        }
        let Some(credential) = self.credential.as_deref() else {
            tracing::info!("No API key configured, classification disabled");
            return Ok(TriggerOutcome::Disabled);
        };
        let basis = RunBasis {
            filter: self.filter.clone(),
            fingerprint: credential_fingerprint(credential),
        };
        if matches!(self.state, RunState::Completed(_)) && !fresh {
            if self.basis.as_ref() == Some(&basis) {
                return Ok(TriggerOutcome::Reused);
            }
            tracing::debug!("Filter or API key changed since the last run, running again");
        }

        let reviews = self.dataset.filter(&self.filter);
        let total = reviews.len();
        self.state = RunState::Running {
            completed: 0,
            total,
        };

        let state = &mut self.state;
        let run = runner
            .run(&reviews, credential, |completed, total| {
                *state = RunState::Running { completed, total };
                on_progress(completed, total);
            })
            .await;

        self.state = RunState::Completed(run);
        self.basis = Some(basis);
        Ok(TriggerOutcome::Ran)
    }

    /// Join the dataset, the filter and the latest run.
    pub fn view(&self) -> DashboardView {
        DashboardView::build(&self.dataset, &self.filter, self.latest_run())
    }
}
