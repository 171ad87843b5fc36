//! 统一配置中心
//!
//! 加载顺序（后者覆盖前者）：
//! - 内置默认值
//! - `APP_CONFIG_FILE` 指定的 TOML 文件，未指定时读取 `config/default.toml`（不存在则跳过）
//! - `APP_` 前缀的环境变量，层级用 `__` 分隔，例如 `APP_SERVER__PORT=9000`

use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

pub const CONFIG_FILE_ENV: &str = "APP_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
}

/// WebSocket 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WebSocketConfig {
    /// 每条连接出站队列的容量
    #[validate(range(min = 1))]
    pub outbound_buffer: usize,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// `RUST_LOG` 未设置时使用的过滤规则
    #[validate(length(min = 1))]
    pub filter: String,
    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

/// 全局应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub websocket: WebSocketConfig,
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8080,
            },
            websocket: WebSocketConfig {
                outbound_buffer: 256,
            },
            logging: LoggingConfig {
                filter: "info".into(),
                json: false,
            },
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error("invalid listen address: {0}")]
    InvalidAddress(String),
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        ConfigError::Load(Box::new(value))
    }
}

impl AppConfig {
    /// 按默认值 -> 配置文件 -> 环境变量的顺序加载并校验
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::figment(Some(Path::new(&path))).extract_validated()
    }

    /// 从 TOML 字符串加载（未给出的字段取默认值）
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(s))
            .extract_validated()
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut fig = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = file {
            // Toml::file 在文件不存在时不产生任何值
            fig = fig.merge(Toml::file(path));
        }
        fig.merge(Env::prefixed("APP_").split("__"))
    }

    /// 监听地址
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

trait ExtractValidated {
    fn extract_validated(self) -> Result<AppConfig, ConfigError>;
}

impl ExtractValidated for Figment {
    fn extract_validated(self) -> Result<AppConfig, ConfigError> {
        let cfg: AppConfig = self.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.websocket.outbound_buffer, 256);
        assert_eq!(config.logging.filter, "info");
        assert!(!config.logging.json);
        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let result = AppConfig::from_toml_str(
            r#"
            [websocket]
            outbound_buffer = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = AppConfig::from_toml_str(
            r#"
            [server]
            port = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "gateway.toml",
                r#"
                [server]
                host = "0.0.0.0"
                port = 7000
                "#,
            )?;
            jail.set_env("APP_CONFIG_FILE", "gateway.toml");
            jail.set_env("APP_SERVER__PORT", "9100");
            jail.set_env("APP_LOGGING__FILTER", "debug");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.logging.filter, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_missing_default_file_is_skipped() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }
}
