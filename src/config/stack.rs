//! 配置栈
//!
//! 栈底是进程启动时的基础配置，栈顶是当前生效的配置。
//! `push` 要么完整成功，要么栈保持原样；`pop` 永远不会弹出基础配置。
//!
//! ```rust,no_run
//! use whisper_admin::config::{Config, ConfigStack};
//!
//! # fn example() -> whisper_admin::error::Result<()> {
//! let mut stack = ConfigStack::new(Config::from_env()?);
//! {
//!     let staging = stack.scoped_env_file(".env.staging")?;
//!     println!("临时切换到 {}", staging.environment);
//! } // 离开作用域自动恢复
//! # Ok(())
//! # }
//! ```

use super::Config;
use crate::error::{AdminError, Result};
use std::ops::Deref;
use std::path::Path;
use tracing::{debug, info, warn};

/// 调用方持有的配置快照栈，永不为空
#[derive(Debug, Clone)]
pub struct ConfigStack {
    snapshots: Vec<Config>,
}

impl ConfigStack {
    pub fn new(base: Config) -> Self {
        Self {
            snapshots: vec![base],
        }
    }

    /// 当前生效的配置（栈顶）
    pub fn current(&self) -> &Config {
        self.snapshots
            .last()
            .unwrap_or_else(|| unreachable!("config stack is never empty"))
    }

    pub fn base(&self) -> &Config {
        &self.snapshots[0]
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    /// 校验并压入一份已构建好的配置
    pub fn push(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        info!(
            environment = %config.environment,
            depth = self.snapshots.len() + 1,
            "📥 切换配置"
        );
        self.snapshots.push(config);
        Ok(())
    }

    /// 从 env 文件加载配置并压栈；失败时栈不变
    pub fn push_env_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config = Config::from_env_file(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "配置加载失败，保持当前配置");
        })?;
        self.push(config)
    }

    /// 弹出栈顶配置，恢复上一份
    pub fn pop(&mut self) -> Result<()> {
        if self.snapshots.len() <= 1 {
            return Err(AdminError::StackUnderflow);
        }
        if let Some(popped) = self.snapshots.pop() {
            debug!(
                environment = %popped.environment,
                restored = %self.current().environment,
                "📤 恢复上一份配置"
            );
        }
        Ok(())
    }

    /// 压入 env 文件配置，返回的守卫在 drop 时自动弹出
    pub fn scoped_env_file(&mut self, path: impl AsRef<Path>) -> Result<ScopedConfig<'_>> {
        self.push_env_file(path)?;
        Ok(ScopedConfig { stack: self })
    }

    /// 压入一份配置，返回的守卫在 drop 时自动弹出
    pub fn scoped(&mut self, config: Config) -> Result<ScopedConfig<'_>> {
        self.push(config)?;
        Ok(ScopedConfig { stack: self })
    }
}

/// 作用域内的临时配置，离开作用域时恢复上一份
pub struct ScopedConfig<'a> {
    stack: &'a mut ConfigStack,
}

impl ScopedConfig<'_> {
    pub fn stack(&self) -> &ConfigStack {
        self.stack
    }
}

impl Deref for ScopedConfig<'_> {
    type Target = Config;

    fn deref(&self) -> &Config {
        self.stack.current()
    }
}

impl Drop for ScopedConfig<'_> {
    fn drop(&mut self) {
        // 守卫只在 push 成功后创建，深度至少为 2
        let _ = self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_config() -> Config {
        Config {
            environment: "test".to_string(),
            db_url: "memory://test".to_string(),
            key_prefix: "t:".to_string(),
            db_username: None,
            db_password: None,
        }
    }

    fn staging_env() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ENVIRONMENT=staging\nDB_URL=memory://staging\nDB_KEY_PREFIX=s:\n")
            .unwrap();
        file
    }

    #[test]
    fn test_initial_config_is_base() {
        let stack = ConfigStack::new(base_config());
        assert_eq!(*stack.current(), base_config());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_push_then_pop_restores_base() {
        let env = staging_env();
        let mut stack = ConfigStack::new(base_config());

        stack.push_env_file(env.path()).unwrap();
        assert_eq!(stack.depth(), 2);
        assert_ne!(*stack.current(), base_config(), "压栈后应切换到 staging 配置");
        assert_eq!(stack.current().environment, "staging");

        stack.pop().unwrap();
        assert_eq!(*stack.current(), base_config());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_failed_push_leaves_stack_unchanged() {
        let mut stack = ConfigStack::new(base_config());

        assert!(stack.push_env_file(".no-such-environment-file").is_err());
        assert_eq!(*stack.current(), base_config());
        assert_eq!(stack.depth(), 1);

        // 失败的 push 不能留下可弹出的东西
        assert!(matches!(stack.pop(), Err(AdminError::StackUnderflow)));
        assert_eq!(*stack.current(), base_config());
    }

    #[test]
    fn test_failed_push_on_deeper_stack() {
        let env = staging_env();
        let mut stack = ConfigStack::new(base_config());
        stack.push_env_file(env.path()).unwrap();
        let staging = stack.current().clone();

        assert!(stack.push_env_file(".no-such-environment-file").is_err());
        assert_eq!(stack.depth(), 2);
        assert_eq!(*stack.current(), staging);
    }

    #[test]
    fn test_push_invalid_config_rejected() {
        let mut stack = ConfigStack::new(base_config());
        let mut bad = base_config();
        bad.db_url = "nowhere".to_string();
        assert!(stack.push(bad).is_err());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_pop_base_fails() {
        let mut stack = ConfigStack::new(base_config());
        assert!(matches!(stack.pop(), Err(AdminError::StackUnderflow)));
        assert_eq!(*stack.current(), base_config());
    }

    #[test]
    fn test_scoped_config_restores_on_drop() {
        let env = staging_env();
        let mut stack = ConfigStack::new(base_config());
        {
            let scoped = stack.scoped_env_file(env.path()).unwrap();
            assert_eq!(scoped.environment, "staging");
            assert_eq!(scoped.stack().depth(), 2);
        }
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), base_config());
    }

    #[test]
    fn test_nested_scopes() {
        let env = staging_env();
        let mut stack = ConfigStack::new(base_config());
        let mut other = base_config();
        other.environment = "other".to_string();

        stack.push_env_file(env.path()).unwrap();
        {
            let scoped = stack.scoped(other.clone()).unwrap();
            assert_eq!(*scoped, other);
        }
        assert_eq!(stack.current().environment, "staging");
        stack.pop().unwrap();
        assert_eq!(*stack.base(), base_config());
    }
}
