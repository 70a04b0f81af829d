//! One-shot asynchronous load of the post list with loading/error status.
//!
//! Every activation is tagged with a generation. A completion is committed
//! only when its generation is still the current one and the hook has not
//! been torn down, so late results from an abandoned load are dropped
//! without touching state. The underlying I/O is never aborted.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::posts::Post;

use super::metrics::METRIC_FETCH_FAILURES;
use super::repos::{PostsRepo, RepoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct FetchState {
    pub data: Vec<Post>,
    pub fetch_error: Option<String>,
    pub phase: FetchPhase,
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            fetch_error: None,
            phase: FetchPhase::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// An activated load, detached from the hook so it can run on its own task.
pub struct PendingFetch {
    ticket: FetchTicket,
    source: Arc<dyn PostsRepo>,
}

impl PendingFetch {
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    pub async fn load(self) -> FetchCompletion {
        let result = self.source.load_posts().await;
        FetchCompletion {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct FetchCompletion {
    ticket: FetchTicket,
    result: Result<Vec<Post>, RepoError>,
}

pub struct FetchHook {
    source: Arc<dyn PostsRepo>,
    generation: u64,
    mounted: bool,
    state: FetchState,
}

impl FetchHook {
    pub fn new(source: Arc<dyn PostsRepo>) -> Self {
        Self {
            source,
            generation: 0,
            mounted: true,
            state: FetchState::default(),
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Starts a new load, orphaning any load still in flight.
    pub fn activate(&mut self) -> PendingFetch {
        self.generation += 1;
        self.mounted = true;
        self.state.phase = FetchPhase::Loading;
        debug!(generation = self.generation, "post fetch activated");

        PendingFetch {
            ticket: FetchTicket {
                generation: self.generation,
            },
            source: Arc::clone(&self.source),
        }
    }

    /// Commits a finished load. Returns `false` when the completion is stale.
    pub fn complete(&mut self, completion: FetchCompletion) -> bool {
        let FetchCompletion { ticket, result } = completion;
        if !self.mounted || ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                mounted = self.mounted,
                "discarding stale post fetch"
            );
            return false;
        }

        match result {
            Ok(posts) => {
                debug!(count = posts.len(), "post fetch loaded");
                self.state.data = posts;
                self.state.fetch_error = None;
                self.state.phase = FetchPhase::Loaded;
            }
            Err(err) => {
                warn!(error = %err, "post fetch failed");
                counter!(METRIC_FETCH_FAILURES).increment(1);
                self.state.data = Vec::new();
                self.state.fetch_error = Some(err.to_string());
                self.state.phase = FetchPhase::Failed;
            }
        }
        true
    }

    pub fn teardown(&mut self) {
        self.mounted = false;
        self.generation += 1;
        if self.state.phase == FetchPhase::Loading {
            self.state.phase = FetchPhase::Idle;
        }
    }

    pub async fn fetch(&mut self) -> &FetchState {
        let pending = self.activate();
        let completion = pending.load().await;
        self.complete(completion);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::posts::PostId;

    struct FixedSource(Vec<Post>);

    #[async_trait]
    impl PostsRepo for FixedSource {
        async fn load_posts(&self) -> Result<Vec<Post>, RepoError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl PostsRepo for BrokenSource {
        async fn load_posts(&self) -> Result<Vec<Post>, RepoError> {
            Err(RepoError::server(500, "down"))
        }
    }

    fn sample() -> Vec<Post> {
        vec![Post::new(PostId::new(1), "A", "x", "d")]
    }

    #[tokio::test]
    async fn successful_fetch_loads_data() {
        let mut hook = FetchHook::new(Arc::new(FixedSource(sample())));
        assert_eq!(hook.state().phase, FetchPhase::Idle);

        let state = hook.fetch().await;
        assert_eq!(state.phase, FetchPhase::Loaded);
        assert_eq!(state.data, sample());
        assert!(state.fetch_error.is_none());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn failed_fetch_reports_message_and_empties_data() {
        let mut hook = FetchHook::new(Arc::new(BrokenSource));
        let state = hook.fetch().await;
        assert_eq!(state.phase, FetchPhase::Failed);
        assert!(state.data.is_empty());
        assert_eq!(
            state.fetch_error.as_deref(),
            Some("server responded with status 500: down")
        );
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn loading_only_while_in_flight() {
        let mut hook = FetchHook::new(Arc::new(FixedSource(sample())));
        let pending = hook.activate();
        assert!(hook.state().is_loading());

        let completion = pending.load().await;
        assert!(hook.complete(completion));
        assert!(!hook.state().is_loading());
    }

    #[tokio::test]
    async fn completion_after_teardown_is_ignored() {
        let mut hook = FetchHook::new(Arc::new(FixedSource(sample())));
        let pending = hook.activate();
        let task = tokio::spawn(pending.load());

        hook.teardown();
        let completion = task.await.expect("load task");

        assert!(!hook.complete(completion));
        assert!(hook.state().data.is_empty());
        assert_eq!(hook.state().phase, FetchPhase::Idle);
    }

    #[tokio::test]
    async fn newer_activation_orphans_older_load() {
        let mut hook = FetchHook::new(Arc::new(FixedSource(sample())));
        let first = hook.activate();
        let second = hook.activate();
        assert_ne!(first.ticket(), second.ticket());

        let stale = first.load().await;
        assert!(!hook.complete(stale));
        assert!(hook.state().is_loading());

        let fresh = second.load().await;
        assert!(hook.complete(fresh));
        assert_eq!(hook.state().phase, FetchPhase::Loaded);
    }
}
