//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `REEL__*` 覆盖（双下划线表示嵌套，如 `REEL__BACKEND__API_URL=...`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub stream: StreamSection,
}

/// [backend] 段：REST 与 WebSocket 端点
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSection {
    /// REST 基地址（含版本前缀）
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// WebSocket 基地址（任务流路径 /ws/task/{task_id} 挂在其下）
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// 可选 X-API-Key；未设置时请求不携带
    pub api_key: Option<String>,
}

fn default_api_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8000".to_string()
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ws_url: default_ws_url(),
            api_key: None,
        }
    }
}

/// [stream] 段：状态轮询与请求超时
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSection {
    /// REST 状态轮询间隔（秒）
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// 单次 REST 请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendSection::default(),
            stream: StreamSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 REEL__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 REEL__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("REEL")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
