//! 运行时配置
//!
//! 配置以环境变量 / `.env` 文件的形式提供，格式：
//! ```text
//! ENVIRONMENT=staging
//! DB_URL=file:///var/lib/whisper/staging
//! DB_KEY_PREFIX=s:
//! DB_USERNAME=admin
//! DB_PASSWORD=...
//! ```
//!
//! 进程启动时由 [`Config::from_env`] 读出基础配置，放到 [`ConfigStack`] 栈底；
//! 之后可以用 [`ConfigStack::push_env_file`] 临时切换到别的环境。

pub mod stack;

pub use stack::{ConfigStack, ScopedConfig};

use crate::error::{ConfigError, Result};
use dotenv::dotenv;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

const KEY_ENVIRONMENT: &str = "ENVIRONMENT";
const KEY_DB_URL: &str = "DB_URL";
const KEY_DB_KEY_PREFIX: &str = "DB_KEY_PREFIX";
const KEY_DB_USERNAME: &str = "DB_USERNAME";
const KEY_DB_PASSWORD: &str = "DB_PASSWORD";

const DEFAULT_ENVIRONMENT: &str = "development";

/// 一份不可变的运行时配置快照
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// 环境名（development / staging / production ...）
    pub environment: String,
    /// 存储后端地址，决定使用哪种 [`Storage`](crate::storage::Storage)
    pub db_url: String,
    /// 所有存储 key 的前缀
    pub key_prefix: String,
    pub db_username: Option<String>,
    #[serde(skip_serializing)]
    pub db_password: Option<String>,
}

impl Config {
    /// 从进程环境（以及当前目录的 `.env`）读取基础配置
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// 从指定的 env 文件读取配置，不修改进程环境变量
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let mut vars = HashMap::new();
        for item in dotenv::from_path_iter(path)? {
            let (key, value) = item.map_err(|e| {
                ConfigError::ParseFailed(format!("{}: {}", path.display(), e))
            })?;
            vars.insert(key, value);
        }
        Self::from_vars(&vars)
    }

    /// 从键值表构建并校验配置
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            vars.get(key)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .ok_or_else(|| ConfigError::MissingField(key.to_string()).into())
        };
        let optional = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let config = Config {
            environment: optional(KEY_ENVIRONMENT)
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            db_url: required(KEY_DB_URL)?,
            key_prefix: required(KEY_DB_KEY_PREFIX)?,
            db_username: optional(KEY_DB_USERNAME),
            db_password: optional(KEY_DB_PASSWORD),
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验字段取值
    pub fn validate(&self) -> Result<()> {
        match self.db_url.split_once("://") {
            Some((scheme, _)) if !scheme.is_empty() => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: KEY_DB_URL.to_string(),
                    message: format!("'{}' is not of the form scheme://...", self.db_url),
                }
                .into());
            }
        }
        if self.key_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: KEY_DB_KEY_PREFIX.to_string(),
                message: "must not contain whitespace".to_string(),
            }
            .into());
        }
        if self.db_password.is_some() && self.db_username.is_none() {
            return Err(ConfigError::MissingField(KEY_DB_USERNAME.to_string()).into());
        }
        Ok(())
    }

    /// `db_url` 的 scheme 部分
    pub fn db_scheme(&self) -> &str {
        self.db_url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or_default()
    }
}
