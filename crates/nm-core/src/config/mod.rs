//! # Configuration DTOs / 配置数据结构
//!
//! TOML → DTO mapping only. Missing sections and keys fall back to the
//! documented defaults; environment overrides and credential inspection
//! happen at bootstrap, not here.
//!
//! 仅负责 TOML → DTO 映射。缺失的段落或键使用默认值；
//! 环境变量覆盖与凭据检查在启动阶段完成。

mod app_config;

pub use app_config::{
    AppConfig, BackendConfig, ConnectivityConfig, QueryConfig, RequestConfig, SessionConfig,
    StorageConfig,
};
