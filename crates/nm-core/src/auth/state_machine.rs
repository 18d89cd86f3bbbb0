//! Session state machine.
//!
//! Defines a pure state transition function for session and onboarding
//! tracking. Side effects are returned as [`SessionAction`]s and executed by
//! the application layer.

use super::session::{SessionChange, User, UserId};
use super::state::{AuthState, SessionSnapshot};

/// Events that drive the session state.
///
/// 驱动会话状态的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Initialization began.
    ///
    /// 开始初始化。
    InitializeStarted,
    /// A session change arrived (initial fetch, provider push or reconnect).
    ///
    /// 会话变更（初始获取、服务端推送或重连重试）。
    SessionChanged(SessionChange),
    /// Onboarding lookup finished for `user_id`.
    ///
    /// 引导状态查询完成。
    OnboardingResolved { user_id: UserId, onboarded: bool },
    /// Onboarding check ran without any resolvable user.
    ///
    /// 引导检查时没有可用用户。
    OnboardingSkipped,
    /// The initial session fetch failed outright.
    ///
    /// 初始会话获取失败。
    InitialFetchFailed,
    /// The initialization timeout elapsed.
    ///
    /// 初始化超时。
    LoadingTimedOut,
}

/// Side-effects produced by state transitions.
///
/// 状态迁移产生的副作用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Look up the onboarding flag for this user.
    ///
    /// 查询该用户的引导状态。
    CheckOnboarding { user: User },
}

/// Pure session state machine.
///
/// 纯状态机：不包含副作用。
pub struct SessionStateMachine;

impl SessionStateMachine {
    pub fn transition(
        snapshot: SessionSnapshot,
        event: SessionEvent,
    ) -> (SessionSnapshot, Vec<SessionAction>) {
        let SessionSnapshot { state, loading } = snapshot;

        match event {
            SessionEvent::InitializeStarted => {
                let state = match state {
                    AuthState::Uninitialized => AuthState::Initializing,
                    other => other,
                };
                (SessionSnapshot { state, loading }, Vec::new())
            }
            SessionEvent::SessionChanged(change) => match change.session {
                Some(session) => {
                    // Keep the known flag across refreshes of the same user;
                    // a different user starts from `false` until checked.
                    let onboarded = match &state {
                        AuthState::Authenticated {
                            session: previous,
                            onboarded,
                        } if previous.user_id() == session.user_id() => *onboarded,
                        _ => false,
                    };
                    let user = session.user.clone();
                    (
                        SessionSnapshot {
                            state: AuthState::Authenticated { session, onboarded },
                            loading,
                        },
                        vec![SessionAction::CheckOnboarding { user }],
                    )
                }
                None => (
                    SessionSnapshot {
                        state: AuthState::Anonymous,
                        loading: false,
                    },
                    Vec::new(),
                ),
            },
            SessionEvent::OnboardingResolved { user_id, onboarded } => {
                let state = match state {
                    AuthState::Authenticated { session, .. } if session.user_id() == &user_id => {
                        AuthState::Authenticated { session, onboarded }
                    }
                    // Stale result for a user that is no longer current.
                    other => other,
                };
                (
                    SessionSnapshot {
                        state,
                        loading: false,
                    },
                    Vec::new(),
                )
            }
            SessionEvent::OnboardingSkipped => (
                SessionSnapshot {
                    state,
                    loading: false,
                },
                Vec::new(),
            ),
            SessionEvent::InitialFetchFailed => {
                let state = match state {
                    AuthState::Uninitialized | AuthState::Initializing => AuthState::Anonymous,
                    other => other,
                };
                (
                    SessionSnapshot {
                        state,
                        loading: false,
                    },
                    Vec::new(),
                )
            }
            SessionEvent::LoadingTimedOut => (
                SessionSnapshot {
                    state,
                    loading: false,
                },
                Vec::new(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Session, SessionEventKind};

    fn session_for(user_id: &str) -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_at: None,
            user: User::new(user_id),
        }
    }

    fn initializing() -> SessionSnapshot {
        SessionStateMachine::transition(SessionSnapshot::default(), SessionEvent::InitializeStarted)
            .0
    }

    #[test]
    fn initialize_moves_uninitialized_to_initializing_and_keeps_loading() {
        let (next, actions) =
            SessionStateMachine::transition(SessionSnapshot::default(), SessionEvent::InitializeStarted);

        assert_eq!(next.state, AuthState::Initializing);
        assert!(next.loading);
        assert!(actions.is_empty());
    }

    #[test]
    fn session_present_requests_onboarding_check_and_stays_loading() {
        let change = SessionChange::new(SessionEventKind::InitialFetch, Some(session_for("u1")));
        let (next, actions) =
            SessionStateMachine::transition(initializing(), SessionEvent::SessionChanged(change));

        assert!(next.is_authenticated());
        assert!(!next.is_onboarded());
        assert!(next.loading);
        assert_eq!(
            actions,
            vec![SessionAction::CheckOnboarding {
                user: User::new("u1")
            }]
        );
    }

    #[test]
    fn session_absent_goes_anonymous_and_clears_loading() {
        let change = SessionChange::new(SessionEventKind::InitialFetch, None);
        let (next, actions) =
            SessionStateMachine::transition(initializing(), SessionEvent::SessionChanged(change));

        assert_eq!(next.state, AuthState::Anonymous);
        assert!(!next.loading);
        assert!(!next.is_onboarded());
        assert!(actions.is_empty());
    }

    #[test]
    fn onboarding_resolved_for_current_user_sets_flag_and_clears_loading() {
        let change = SessionChange::new(SessionEventKind::SignedIn, Some(session_for("u1")));
        let (authed, _) =
            SessionStateMachine::transition(initializing(), SessionEvent::SessionChanged(change));

        let (next, _) = SessionStateMachine::transition(
            authed,
            SessionEvent::OnboardingResolved {
                user_id: UserId::from("u1"),
                onboarded: true,
            },
        );

        assert!(next.is_onboarded());
        assert!(!next.loading);
        assert_eq!(next.state.label(), "authenticated_onboarded");
    }

    #[test]
    fn stale_onboarding_result_is_discarded_but_loading_clears() {
        let change = SessionChange::new(SessionEventKind::SignedIn, Some(session_for("u2")));
        let (authed, _) =
            SessionStateMachine::transition(initializing(), SessionEvent::SessionChanged(change));

        let (next, _) = SessionStateMachine::transition(
            authed,
            SessionEvent::OnboardingResolved {
                user_id: UserId::from("u1"),
                onboarded: true,
            },
        );

        assert!(!next.is_onboarded());
        assert_eq!(next.user().map(|u| u.id.as_str()), Some("u2"));
        assert!(!next.loading);
    }

    #[test]
    fn token_refresh_for_same_user_keeps_onboarded_flag() {
        let signed_in = SessionChange::new(SessionEventKind::SignedIn, Some(session_for("u1")));
        let (authed, _) =
            SessionStateMachine::transition(initializing(), SessionEvent::SessionChanged(signed_in));
        let (onboarded, _) = SessionStateMachine::transition(
            authed,
            SessionEvent::OnboardingResolved {
                user_id: UserId::from("u1"),
                onboarded: true,
            },
        );

        let refreshed =
            SessionChange::new(SessionEventKind::TokenRefreshed, Some(session_for("u1")));
        let (next, actions) =
            SessionStateMachine::transition(onboarded, SessionEvent::SessionChanged(refreshed));

        assert!(next.is_onboarded());
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn different_user_starts_not_onboarded() {
        let signed_in = SessionChange::new(SessionEventKind::SignedIn, Some(session_for("u1")));
        let (authed, _) =
            SessionStateMachine::transition(initializing(), SessionEvent::SessionChanged(signed_in));
        let (onboarded, _) = SessionStateMachine::transition(
            authed,
            SessionEvent::OnboardingResolved {
                user_id: UserId::from("u1"),
                onboarded: true,
            },
        );

        let other = SessionChange::new(SessionEventKind::SignedIn, Some(session_for("u2")));
        let (next, _) =
            SessionStateMachine::transition(onboarded, SessionEvent::SessionChanged(other));

        assert!(!next.is_onboarded());
    }

    #[test]
    fn sign_out_returns_to_anonymous() {
        let signed_in = SessionChange::new(SessionEventKind::SignedIn, Some(session_for("u1")));
        let (authed, _) =
            SessionStateMachine::transition(initializing(), SessionEvent::SessionChanged(signed_in));

        let signed_out = SessionChange::new(SessionEventKind::SignedOut, None);
        let (next, _) =
            SessionStateMachine::transition(authed, SessionEvent::SessionChanged(signed_out));

        assert_eq!(next.state, AuthState::Anonymous);
        assert!(next.session().is_none());
    }

    #[test]
    fn initial_fetch_failure_clears_loading_and_goes_anonymous() {
        let (next, _) =
            SessionStateMachine::transition(initializing(), SessionEvent::InitialFetchFailed);

        assert_eq!(next.state, AuthState::Anonymous);
        assert!(!next.loading);
    }

    #[test]
    fn timeout_clears_loading_without_touching_state() {
        let (next, _) = SessionStateMachine::transition(initializing(), SessionEvent::LoadingTimedOut);

        assert_eq!(next.state, AuthState::Initializing);
        assert!(!next.loading);
    }

    #[test]
    fn skipped_onboarding_clears_loading() {
        let (next, actions) =
            SessionStateMachine::transition(initializing(), SessionEvent::OnboardingSkipped);

        assert!(!next.loading);
        assert!(actions.is_empty());
    }
}
