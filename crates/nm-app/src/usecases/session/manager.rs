//! Long-lived owner of the session read model.
//!
//! Every transition goes through [`SessionStateMachine`]; the resulting
//! [`SessionSnapshot`] is published on a `watch` channel.
//!
//! 会话读模型的唯一持有者：所有状态迁移都经过纯状态机，结果通过 watch 通道发布。

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use nm_core::auth::{SessionAction, SessionEvent, SessionStateMachine};
use nm_core::ports::IdentityProviderPort;
use nm_core::{SessionChange, SessionEventKind, SessionSnapshot, User};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use super::onboarding::CheckOnboardingStatus;
use super::sign_out::{SignOut, SignOutError};
use crate::context::AppContext;
use crate::usecases::purge::PurgeReport;

pub struct SessionManagerDeps {
    pub context: Arc<AppContext>,
    pub identity: Arc<dyn IdentityProviderPort>,
    pub check_onboarding: Arc<CheckOnboardingStatus>,
    pub sign_out: Arc<SignOut>,
}

pub struct SessionManager {
    context: Arc<AppContext>,
    identity: Arc<dyn IdentityProviderPort>,
    check_onboarding: Arc<CheckOnboardingStatus>,
    sign_out: Arc<SignOut>,
    init_timeout: Duration,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    /// Serializes session changes so they are handled one at a time.
    dispatch_lock: Mutex<()>,
    tasks: StdMutex<Vec<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(deps: SessionManagerDeps, init_timeout: Duration) -> Self {
        let SessionManagerDeps {
            context,
            identity,
            check_onboarding,
            sign_out,
        } = deps;
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());

        Self {
            context,
            identity,
            check_onboarding,
            sign_out,
            init_timeout,
            snapshot_tx,
            dispatch_lock: Mutex::new(()),
            tasks: StdMutex::new(Vec::new()),
        }
    }

    /// Start session tracking. Runs at most once per [`AppContext`]; later
    /// calls return `false` and do nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn initialize(self: &Arc<Self>) -> bool {
        if !self.context.mark_session_initialized() {
            debug!("session manager already initialized");
            return false;
        }

        info!(
            timeout_ms = self.init_timeout.as_millis() as u64,
            "initializing session"
        );
        self.apply(SessionEvent::InitializeStarted);

        // Subscribe before the initial fetch so no change is missed.
        let tasks = vec![
            self.spawn_loading_timeout(),
            self.spawn_session_listener(),
            self.spawn_reconnect_listener(),
            self.spawn_initial_fetch(),
        ];
        self.lock_tasks().extend(tasks);
        true
    }

    /// Single entry point for every session transition.
    pub async fn handle_session_change(&self, change: SessionChange) {
        let span = info_span!(
            "usecase.session_manager.handle_session_change",
            kind = %change.kind,
            has_session = change.session.is_some(),
        );
        async {
            let _dispatch_guard = self.dispatch_lock.lock().await;
            let actions = self.apply(SessionEvent::SessionChanged(change));
            self.execute_actions(actions).await;
        }
        .instrument(span)
        .await
    }

    /// Resolve onboarding for `user_override`, else the current user, else
    /// whoever the provider says is signed in. Always clears loading.
    pub async fn check_onboarding_status(&self, user_override: Option<User>) -> bool {
        let user = match user_override.or_else(|| self.snapshot().user().cloned()) {
            Some(user) => Some(user),
            None => match self.identity.get_user().await {
                Ok(user) => user,
                Err(err) => {
                    warn!(error = %err, "failed to query current user");
                    None
                }
            },
        };

        match user {
            Some(user) => self.resolve_onboarding(&user).await,
            None => {
                debug!("no user to check onboarding for");
                self.apply(SessionEvent::OnboardingSkipped);
                false
            }
        }
    }

    /// Sign out through the provider and purge local data. The read model
    /// changes only when the provider reports `SIGNED_OUT`.
    pub async fn sign_out(&self) -> Result<PurgeReport, SignOutError> {
        self.sign_out.execute().await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Wait until loading has cleared and return that snapshot.
    pub async fn wait_until_ready(&self) -> SessionSnapshot {
        let mut rx = self.snapshot_tx.subscribe();
        let ready = match rx.wait_for(|snapshot| !snapshot.loading).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        ready
    }

    pub fn is_online(&self) -> bool {
        self.context.is_online()
    }

    /// Stop background listeners.
    pub fn shutdown(&self) {
        for task in self.lock_tasks().drain(..) {
            task.abort();
        }
    }

    fn apply(&self, event: SessionEvent) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        self.snapshot_tx.send_modify(|snapshot| {
            let current = std::mem::take(snapshot);
            let from = current.state.label();
            let (next, next_actions) = SessionStateMachine::transition(current, event);
            info!(
                from,
                to = next.state.label(),
                loading = next.loading,
                "session state transition"
            );
            *snapshot = next;
            actions = next_actions;
        });
        actions
    }

    async fn execute_actions(&self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::CheckOnboarding { user } => {
                    self.resolve_onboarding(&user).await;
                }
            }
        }
    }

    async fn resolve_onboarding(&self, user: &User) -> bool {
        let onboarded = self.check_onboarding.execute(&user.id).await;
        self.apply(SessionEvent::OnboardingResolved {
            user_id: user.id.clone(),
            onboarded,
        });
        onboarded
    }

    async fn fetch_session(&self, kind: SessionEventKind) {
        match self.identity.get_session().await {
            Ok(session) => {
                self.handle_session_change(SessionChange::new(kind, session))
                    .await
            }
            Err(err) if kind == SessionEventKind::InitialFetch => {
                warn!(error = %err, "initial session fetch failed");
                let _dispatch_guard = self.dispatch_lock.lock().await;
                self.apply(SessionEvent::InitialFetchFailed);
            }
            Err(err) => {
                warn!(error = %err, kind = %kind, "session re-fetch failed");
            }
        }
    }

    fn spawn_loading_timeout(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let timeout = self.init_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if manager.snapshot().loading {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "session still loading after timeout, forcing loading off"
                );
                manager.apply(SessionEvent::LoadingTimedOut);
            }
        })
    }

    fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut subscription = self.identity.subscribe();
        let manager = Arc::clone(self);
        tokio::spawn(
            async move {
                while let Some(change) = subscription.recv().await {
                    manager.handle_session_change(change).await;
                }
                debug!("identity subscription closed");
            }
            .instrument(info_span!("usecase.session_manager.session_listener")),
        )
    }

    fn spawn_reconnect_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut reconnects = self.context.subscribe_reconnect();
        let manager = Arc::clone(self);
        tokio::spawn(
            async move {
                loop {
                    match reconnects.recv().await {
                        Ok(event) => {
                            info!(at = %event.at, "reconnected, re-fetching session");
                            manager.fetch_session(SessionEventKind::Reconnected).await;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "reconnect events lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            .instrument(info_span!("usecase.session_manager.reconnect_listener")),
        )
    }

    fn spawn_initial_fetch(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(
            async move {
                manager.fetch_session(SessionEventKind::InitialFetch).await;
            }
            .instrument(info_span!("usecase.session_manager.initial_fetch")),
        )
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
