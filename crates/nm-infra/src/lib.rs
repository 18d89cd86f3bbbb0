pub mod fs;
pub mod http;
pub mod identity;
pub mod profile;
pub mod storage;
pub mod time;

pub use fs::{FsCacheStorage, FsLocalStoreRegistry};
pub use http::ReqwestTransport;
pub use identity::{GoTrueConfig, GoTrueIdentityProvider, SignUpOutcome};
pub use profile::PostgrestProfileRepository;
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
pub use time::SystemClock;
