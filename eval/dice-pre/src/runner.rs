//! 程序运行函数.

use anyhow::Context;
use log::info;
use seg_berry::report::RunReport;
use utils::loader;

/// 实际运行.
pub fn run(fold: &str) -> anyhow::Result<RunReport> {
    let evaluator = loader::evaluator_from_env_or_home().with_context(|| {
        format!(
            "cannot locate dataset root, set `${}` explicitly",
            loader::ROOT_ENV
        )
    })?;

    let cfg = evaluator.config();
    info!("Evaluating fold `{fold}` under {}", cfg.root.display());
    evaluator
        .evaluate_fold(fold)
        .with_context(|| format!("evaluation of fold `{fold}` aborted"))
}
