//! Identity provider adapters.

mod gotrue;

pub use gotrue::{GoTrueConfig, GoTrueIdentityProvider, SignUpOutcome, SESSION_STORAGE_KEY};
