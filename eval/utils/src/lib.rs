//! 评估程序依赖的通用组件.

use log::LevelFilter;
use simple_logger::SimpleLogger;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 向 `w` 写入一条简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 安装日志输出. 默认级别为 `Info`, 可通过 `$RUST_LOG` 覆盖.
pub fn init_logger() -> Result<(), log::SetLoggerError> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
}
