//! 保存进度回调
//!
//! 保存流程不直接写终端，而是把进度事件交给 [`SaveObserver`]：
//!
//! | 事件 | 触发时机 |
//! |------|----------|
//! | `batch_started` | 某类型记录数 ≥ 10 时，开始前一次 |
//! | `batch_progress` | 每成功保存 10 条 |
//! | `batch_finished` | 某类型全部保存完毕 |
//! | `unknown_type` | 遇到未知类型名，整组跳过 |
//! | `summary` | 全部类型处理完毕 |

use std::io::Write;

/// 记录数达到该值时才报告开始与阶段进度
pub const PROGRESS_INTERVAL: usize = 10;

/// 保存进度观察者
pub trait SaveObserver: Send {
    fn batch_started(&mut self, _name: &str, _total: usize) {}

    fn batch_progress(&mut self, _name: &str, _saved: usize) {}

    fn batch_finished(&mut self, _name: &str, _saved: usize, _reported_progress: bool) {}

    fn unknown_type(&mut self, _name: &str, _skipped: usize) {}

    fn summary(&mut self, _total: usize) {}
}

/// 忽略所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SaveObserver for NullObserver {}

/// 数量为 1 时去掉复数名词的最后一个字符
pub fn pluralize(count: usize, plural: &str) -> String {
    if count == 1 {
        let mut chars = plural.chars();
        chars.next_back();
        format!("1 {}", chars.as_str())
    } else {
        format!("{} {}", count, plural)
    }
}

/// 把进度写到 stderr（或任意 writer）的观察者，输出面向操作员
pub struct ConsoleReporter<W: Write + Send = std::io::Stderr> {
    out: W,
}

impl ConsoleReporter {
    pub fn stderr() -> Self {
        Self {
            out: std::io::stderr(),
        }
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// 终端输出只是提示，写失败不影响保存结果
impl<W: Write + Send> SaveObserver for ConsoleReporter<W> {
    fn batch_started(&mut self, name: &str, _total: usize) {
        let _ = write!(self.out, "Starting to save {}...", name);
    }

    fn batch_progress(&mut self, name: &str, saved: usize) {
        let _ = write!(self.out, "\nSaved {} {}...", saved, name);
    }

    fn batch_finished(&mut self, name: &str, saved: usize, reported_progress: bool) {
        if reported_progress {
            let _ = writeln!(self.out);
        }
        let _ = writeln!(self.out, "Saved {}.", pluralize(saved, name));
    }

    fn unknown_type(&mut self, name: &str, _skipped: usize) {
        let _ = writeln!(self.out, "Skipping objects of unknown type: {}", name);
    }

    fn summary(&mut self, total: usize) {
        let _ = writeln!(self.out, "Saved {}.", pluralize(total, "objects"));
    }
}
