//! Session and onboarding tracking.

mod manager;
mod onboarding;
mod sign_out;

pub use manager::{SessionManager, SessionManagerDeps};
pub use onboarding::CheckOnboardingStatus;
pub use sign_out::{SignOut, SignOutError};
