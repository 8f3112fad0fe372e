//! 对 `seg-berry` 评估器的更一层封装. 从环境中确定数据集位置.

use seg_berry::dataset::home_dataset_dir_with;
use seg_berry::evaluator::{EvalConfig, Evaluator};
use std::env;
use std::path::PathBuf;

/// 指定数据集根目录的环境变量.
pub const ROOT_ENV: &str = "SEG_EVAL_ROOT";

/// 获取评估数据集根目录.
///
/// 1. 若环境变量 `$SEG_EVAL_ROOT` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/predict_tumor`. 无法确定用户主目录时返回 `None`.
pub fn root_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var_os(ROOT_ENV) {
        Some(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["predict_tumor"]),
    }
}

/// 以默认配置创建评估器, 数据集根目录由 [`root_dir_from_env_or_home`] 确定.
pub fn evaluator_from_env_or_home() -> Option<Evaluator> {
    root_dir_from_env_or_home().map(|root| Evaluator::new(EvalConfig::new(root)))
}
