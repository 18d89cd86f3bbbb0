//! Authentication domain models.
//!
//! Sessions are issued by the identity provider; this module only describes
//! them and the pure state machine that tracks session and onboarding state.

mod session;
mod state;
mod state_machine;

pub use session::{Session, SessionChange, SessionEventKind, User, UserId};
pub use state::{AuthState, SessionSnapshot};
pub use state_machine::{SessionAction, SessionEvent, SessionStateMachine};
