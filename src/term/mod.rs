//! 终端命令入口
//!
//! 把一行文本解析成固定命令集，再对当前设备执行。只有 `ping` 会向仿真发包，
//! 其余命令都是基于设备状态的只读报告。

mod command;
mod terminal;

pub use command::{Command, CommandError};
pub use terminal::{LineKind, TermLine, Terminal};
