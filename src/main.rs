//! whisper-admin —— 数据迁移管理工具
//!
//! ```bash
//! # 把导出文件写入当前环境的存储
//! whisper-admin import backup.json
//!
//! # 临时切换到 staging 环境导入（从标准输入读取）
//! cat backup.json | whisper-admin --env-file .env.staging import -
//!
//! # 重新规范化一份导出文件
//! whisper-admin convert old-dump new-dump
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use whisper_admin::config::{Config, ConfigStack, ScopedConfig};
use whisper_admin::dump::{Location, dump_objects, load_objects};
use whisper_admin::error::Result;
use whisper_admin::save::{ConsoleReporter, save_object_map};
use whisper_admin::storage::{PersistContext, open_storage};

#[derive(Debug, Parser)]
#[command(name = "whisper-admin", version, about = "Whisper 服务端数据迁移工具")]
struct Cli {
    /// 本次运行临时使用的 env 文件（覆盖基础配置）
    #[arg(long, global = true, env = "WHISPER_ADMIN_ENV_FILE")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 读取导出文件并写入存储（`-` 表示标准输入）
    Import { source: String },
    /// 读取导出文件并重新导出（`-` 表示标准输入 / 输出）
    Convert { source: String, dest: String },
    /// 打印当前生效的配置（不含密码）
    ShowConfig,
}

// ── 入口 ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "whisper_admin=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Convert { source, dest } => convert(source, dest),
        Command::Import { source } => {
            let mut stack = ConfigStack::new(Config::from_env()?);
            let config = scoped_config(&mut stack, cli.env_file.as_deref())?;
            import(source, &config).await
        }
        Command::ShowConfig => {
            let mut stack = ConfigStack::new(Config::from_env()?);
            let config = scoped_config(&mut stack, cli.env_file.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&*config)?);
            Ok(())
        }
    }
}

/// 有 `--env-file` 时压入该文件的配置，否则沿用基础配置；guard 释放时出栈
fn scoped_config<'a>(
    stack: &'a mut ConfigStack,
    env_file: Option<&Path>,
) -> Result<ScopedConfig<'a>> {
    match env_file {
        Some(path) => stack.scoped_env_file(path),
        None => {
            let base = stack.current().clone();
            stack.scoped(base)
        }
    }
}

// ── 子命令 ────────────────────────────────────────────────────────────────────

async fn import(source: &str, config: &Config) -> Result<()> {
    let objects = load_objects(&Location::parse(source))?;
    let storage = open_storage(config)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，取消保存");
            ctrl_c.cancel();
        }
    });

    let ctx = PersistContext::new(config.clone()).with_cancel(cancel);
    let mut reporter = ConsoleReporter::stderr();
    let saved = save_object_map(storage.as_ref(), &ctx, &objects, &mut reporter).await?;
    info!(environment = %config.environment, saved, "🏁 导入完成");
    Ok(())
}

fn convert(source: &str, dest: &str) -> Result<()> {
    let objects = load_objects(&Location::parse(source))?;
    let written = dump_objects(&objects, &Location::parse(dest))?;
    if let Location::Path(_) = written {
        println!("Objects dumped to {}", written);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use whisper_admin::testing::fixtures;

    #[test]
    fn test_scoped_config_without_env_file() {
        let mut stack = ConfigStack::new(fixtures::config());
        {
            let config = scoped_config(&mut stack, None).unwrap();
            assert_eq!(*config, fixtures::config());
        }
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_scoped_config_with_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ENVIRONMENT=staging").unwrap();
        writeln!(file, "DB_URL=memory://staging").unwrap();
        writeln!(file, "DB_KEY_PREFIX=s:").unwrap();

        let mut stack = ConfigStack::new(fixtures::config());
        {
            let config = scoped_config(&mut stack, Some(file.path())).unwrap();
            assert_eq!(config.environment, "staging");
        }
        assert_eq!(stack.current(), &fixtures::config());
    }
}
