use std::sync::Arc;

use shared::{
    domain::{CollectionSnapshot, InterviewId, InterviewSummary, OwnedInterviewSummary},
    protocol::{InterviewFilter, InterviewRecord},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod config;
mod gateway;

pub use gateway::{ApiFailure, HttpInterviewGateway, InterviewGateway};

pub const FETCH_FAILURE_NOTICE: &str = "Failed to fetch interviews. Please try again.";
pub const MISSING_SESSION_NOTICE: &str = "No token found. Please log in again.";
pub const DELETE_AUTH_NOTICE: &str = "Authentication required. Please log in again.";
pub const DELETE_SUCCESS_NOTICE: &str = "Interview experience deleted successfully";
pub const DELETE_FAILURE_NOTICE: &str = "Failed to delete interview. Please try again.";

/// Read-only source of the ambient bearer credential. The controllers never
/// write it; session setup happens elsewhere.
pub trait SessionProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

pub struct MissingSession;

impl SessionProvider for MissingSession {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

pub struct StaticSession(pub Option<String>);

impl StaticSession {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }
}

impl SessionProvider for StaticSession {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Fire-and-forget toast surface; write-only from the controllers.
pub trait NotificationSink: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

pub struct MissingNotificationSink;

impl NotificationSink for MissingNotificationSink {
    fn success(&self, message: &str) {
        debug!("notification sink missing, dropped success: {message}");
    }

    fn failure(&self, message: &str) {
        debug!("notification sink missing, dropped failure: {message}");
    }
}

/// Route surface for the edit action; write-only, fire-and-forget.
pub trait Navigator: Send + Sync {
    fn open_edit(&self, interview_id: &InterviewId);
}

pub struct MissingNavigator;

impl Navigator for MissingNavigator {
    fn open_edit(&self, interview_id: &InterviewId) {
        warn!(interview_id = %interview_id, "navigator missing, edit route dropped");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Error(String),
    Ready(CollectionSnapshot<T>),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&CollectionSnapshot<T>> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BrowseEvent {
    StateChanged(FetchState<InterviewSummary>),
}

struct BrowserState {
    filter: InterviewFilter,
    fetch_epoch: u64,
    view: FetchState<InterviewSummary>,
}

/// Public browse view controller: resolves the active filter into a
/// collection snapshot through loading / error / ready states.
pub struct InterviewBrowser {
    gateway: Arc<dyn InterviewGateway>,
    inner: Mutex<BrowserState>,
    events: broadcast::Sender<BrowseEvent>,
}

impl InterviewBrowser {
    pub fn new(gateway: Arc<dyn InterviewGateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(BrowserState {
                filter: InterviewFilter::default(),
                fetch_epoch: 0,
                view: FetchState::Loading,
            }),
            events,
        })
    }

    /// Makes `filter` current and fetches for it. Any in-flight fetch for an
    /// older filter is superseded: its response will be discarded on arrival.
    pub async fn apply_filter(&self, filter: InterviewFilter) {
        let epoch = {
            let mut guard = self.inner.lock().await;
            guard.filter = filter.clone();
            guard.fetch_epoch += 1;
            guard.view = FetchState::Loading;
            let _ = self
                .events
                .send(BrowseEvent::StateChanged(guard.view.clone()));
            guard.fetch_epoch
        };

        let outcome = self.gateway.list_interviews(&filter).await;
        self.complete_fetch(epoch, outcome).await;
    }

    /// Re-runs the fetch for the current filter unchanged.
    pub async fn retry(&self) {
        let filter = { self.inner.lock().await.filter.clone() };
        self.apply_filter(filter).await;
    }

    async fn complete_fetch(
        &self,
        epoch: u64,
        outcome: Result<Vec<InterviewRecord>, ApiFailure>,
    ) {
        let mut guard = self.inner.lock().await;
        if guard.fetch_epoch != epoch {
            debug!(
                epoch,
                current = guard.fetch_epoch,
                "browse: discarding stale fetch response"
            );
            return;
        }

        guard.view = match outcome {
            Ok(records) => {
                let snapshot = CollectionSnapshot::new(
                    records.into_iter().map(InterviewSummary::from).collect(),
                );
                info!(entries = snapshot.len(), "browse: fetch completed");
                FetchState::Ready(snapshot)
            }
            Err(err) => {
                warn!("browse: fetch failed: {err}");
                FetchState::Error(FETCH_FAILURE_NOTICE.to_string())
            }
        };
        let _ = self
            .events
            .send(BrowseEvent::StateChanged(guard.view.clone()));
    }

    pub async fn state(&self) -> FetchState<InterviewSummary> {
        self.inner.lock().await.view.clone()
    }

    pub async fn current_filter(&self) -> InterviewFilter {
        self.inner.lock().await.filter.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<BrowseEvent> {
        self.events.subscribe()
    }
}

/// Single-slot deletion lifecycle. The tagged phases make "deleting with no
/// armed id" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionPhase {
    Idle,
    Confirming(InterviewId),
    Deleting(InterviewId),
}

#[derive(Debug, Clone)]
pub enum ManageEvent {
    StateChanged(FetchState<OwnedInterviewSummary>),
    DeletionChanged(DeletionPhase),
}

struct ManagerState {
    fetch_epoch: u64,
    view: FetchState<OwnedInterviewSummary>,
    deletion: DeletionPhase,
}

/// Authenticated "my interviews" controller: caller-scoped fetches plus the
/// request -> confirm -> commit/cancel delete workflow.
pub struct OwnedInterviewManager {
    gateway: Arc<dyn InterviewGateway>,
    session: Arc<dyn SessionProvider>,
    notifications: Arc<dyn NotificationSink>,
    navigator: Arc<dyn Navigator>,
    inner: Mutex<ManagerState>,
    events: broadcast::Sender<ManageEvent>,
}

impl OwnedInterviewManager {
    pub fn new(
        gateway: Arc<dyn InterviewGateway>,
        session: Arc<dyn SessionProvider>,
        notifications: Arc<dyn NotificationSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            gateway,
            session,
            notifications,
            navigator,
            inner: Mutex::new(ManagerState {
                fetch_epoch: 0,
                view: FetchState::Loading,
                deletion: DeletionPhase::Idle,
            }),
            events,
        })
    }

    /// Fetches the caller's own interviews. A missing credential
    /// short-circuits to the unauthenticated error state without touching
    /// the network.
    pub async fn refresh(&self) {
        let Some(token) = self.session.bearer_token() else {
            let mut guard = self.inner.lock().await;
            // Supersede any in-flight fetch so its response cannot land on
            // top of the unauthenticated error.
            guard.fetch_epoch += 1;
            guard.view = FetchState::Error(MISSING_SESSION_NOTICE.to_string());
            warn!("manage: fetch skipped, no session token");
            let _ = self
                .events
                .send(ManageEvent::StateChanged(guard.view.clone()));
            return;
        };

        let epoch = {
            let mut guard = self.inner.lock().await;
            guard.fetch_epoch += 1;
            guard.view = FetchState::Loading;
            let _ = self
                .events
                .send(ManageEvent::StateChanged(guard.view.clone()));
            guard.fetch_epoch
        };

        let outcome = self.gateway.list_owned_interviews(&token).await;

        let mut guard = self.inner.lock().await;
        if guard.fetch_epoch != epoch {
            debug!(
                epoch,
                current = guard.fetch_epoch,
                "manage: discarding stale fetch response"
            );
            return;
        }

        guard.view = match outcome {
            Ok(records) => {
                let snapshot = CollectionSnapshot::new(
                    records
                        .into_iter()
                        .map(OwnedInterviewSummary::from)
                        .collect(),
                );
                info!(entries = snapshot.len(), "manage: fetch completed");
                FetchState::Ready(snapshot)
            }
            Err(err) => {
                warn!("manage: fetch failed: {err}");
                FetchState::Error(FETCH_FAILURE_NOTICE.to_string())
            }
        };
        let _ = self
            .events
            .send(ManageEvent::StateChanged(guard.view.clone()));
    }

    pub async fn retry(&self) {
        self.refresh().await;
    }

    /// Arms `interview_id` for deletion. Only one identity can be armed at a
    /// time; requests made while confirming or deleting are ignored.
    pub async fn request_delete(&self, interview_id: InterviewId) {
        let mut guard = self.inner.lock().await;
        if guard.deletion != DeletionPhase::Idle {
            debug!(
                interview_id = %interview_id,
                "manage: delete request ignored, slot already armed"
            );
            return;
        }
        guard.deletion = DeletionPhase::Confirming(interview_id);
        let _ = self
            .events
            .send(ManageEvent::DeletionChanged(guard.deletion.clone()));
    }

    /// Disarms a pending confirmation. Has no effect once the delete is in
    /// flight.
    pub async fn cancel_delete(&self) {
        let mut guard = self.inner.lock().await;
        if !matches!(guard.deletion, DeletionPhase::Confirming(_)) {
            debug!("manage: cancel ignored outside confirmation");
            return;
        }
        guard.deletion = DeletionPhase::Idle;
        let _ = self
            .events
            .send(ManageEvent::DeletionChanged(guard.deletion.clone()));
    }

    /// Commits the armed deletion. On success the item is removed from the
    /// local snapshot with order preserved; on failure the collection is
    /// left untouched. Either way the slot clears - failure never re-arms.
    pub async fn confirm_delete(&self) {
        let armed = {
            let guard = self.inner.lock().await;
            match &guard.deletion {
                DeletionPhase::Confirming(id) => id.clone(),
                other => {
                    debug!(phase = ?other, "manage: confirm ignored outside confirmation");
                    return;
                }
            }
        };

        // Local synchronous guard; the confirmation stays armed so the user
        // can retry after signing back in.
        let Some(token) = self.session.bearer_token() else {
            warn!(interview_id = %armed, "manage: delete blocked, no session token");
            self.notifications.failure(DELETE_AUTH_NOTICE);
            return;
        };

        {
            let mut guard = self.inner.lock().await;
            if guard.deletion != DeletionPhase::Confirming(armed.clone()) {
                return;
            }
            guard.deletion = DeletionPhase::Deleting(armed.clone());
            let _ = self
                .events
                .send(ManageEvent::DeletionChanged(guard.deletion.clone()));
        }

        let outcome = self.gateway.delete_interview(&token, &armed).await;

        let mut guard = self.inner.lock().await;
        match outcome {
            Ok(()) => {
                if let FetchState::Ready(snapshot) = &mut guard.view {
                    snapshot.remove(&armed);
                    let _ = self
                        .events
                        .send(ManageEvent::StateChanged(guard.view.clone()));
                }
                info!(interview_id = %armed, "manage: interview deleted");
                self.notifications.success(DELETE_SUCCESS_NOTICE);
            }
            Err(err) => {
                warn!(interview_id = %armed, "manage: delete failed: {err}");
                self.notifications.failure(DELETE_FAILURE_NOTICE);
            }
        }
        guard.deletion = DeletionPhase::Idle;
        let _ = self
            .events
            .send(ManageEvent::DeletionChanged(guard.deletion.clone()));
    }

    /// Pure navigation side effect; never touches the deletion slot.
    pub fn edit(&self, interview_id: &InterviewId) {
        self.navigator.open_edit(interview_id);
    }

    pub async fn state(&self) -> FetchState<OwnedInterviewSummary> {
        self.inner.lock().await.view.clone()
    }

    pub async fn deletion(&self) -> DeletionPhase {
        self.inner.lock().await.deletion.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ManageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
