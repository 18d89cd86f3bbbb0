use super::session::{Session, User};

/// Session lifecycle state.
///
/// 会话生命周期状态。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Nothing has run yet.
    ///
    /// 尚未初始化。
    #[default]
    Uninitialized,
    /// Initial session resolution is outstanding.
    ///
    /// 正在解析初始会话。
    Initializing,
    /// No session.
    ///
    /// 未登录。
    Anonymous,
    /// A session exists; `onboarded` mirrors the backend flag.
    ///
    /// 已登录；`onboarded` 对应后端的引导完成标记。
    Authenticated { session: Session, onboarded: bool },
}

impl AuthState {
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Uninitialized => "uninitialized",
            AuthState::Initializing => "initializing",
            AuthState::Anonymous => "anonymous",
            AuthState::Authenticated {
                onboarded: false, ..
            } => "authenticated_not_onboarded",
            AuthState::Authenticated { onboarded: true, .. } => "authenticated_onboarded",
        }
    }
}

/// Read model exposed to the rest of the application.
///
/// `loading` is tracked separately from [`AuthState`] because the
/// initialization timeout may clear it while resolution is still pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: AuthState,
    pub loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: AuthState::Uninitialized,
            loading: true,
        }
    }
}

impl SessionSnapshot {
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            AuthState::Authenticated { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|session| &session.user)
    }

    /// Onboarding is only meaningful while a session exists.
    pub fn is_onboarded(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { onboarded: true, .. })
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
