//! 对某个 fold 的预测结果逐病例计算 Dice 和 HD95, 结果追加写入
//! `<root>/inferTs/<fold>/dice_pre.txt`.
//!
//! 数据集根目录取自 `$SEG_EVAL_ROOT`, 未设置时为 `$HOME/dataset/predict_tumor`.

mod result;
mod runner;

use clap::Parser;

/// 分割结果评估.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// fold 名, 即 `<root>/inferTs` 下预测结果所在的子目录名.
    fold: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    utils::init_logger()?;

    let report = runner::run(&cli.fold)?;
    result::describe(&report)?;
    println!("done");
    Ok(())
}
