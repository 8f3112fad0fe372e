//! 真值文件与预测文件的配对策略.

use std::path::PathBuf;

use itertools::{EitherOrBoth, Itertools};
use log::warn;

use super::file_name;
use crate::error::{EvalError, EvalResult};

/// 一对待评估的真值文件和预测文件.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePair {
    /// 真值标签路径.
    pub gt: PathBuf,
    /// 预测结果路径.
    pub pred: PathBuf,
}

impl CasePair {
    /// 病例名, 即预测文件的文件名. 报告中以此标识每个病例.
    #[inline]
    pub fn name(&self) -> String {
        file_name(&self.pred)
    }
}

/// 配对策略.
///
/// 两个输入序列都已按文件名字典序排好. 实现者决定如何把它们组合成病例对,
/// 以及如何处理落单的文件.
pub trait PairingStrategy {
    /// 策略名, 用于日志.
    fn name(&self) -> &'static str;

    /// 将真值文件序列 `gt` 与预测文件序列 `pred` 配对.
    fn pair(&self, gt: Vec<PathBuf>, pred: Vec<PathBuf>) -> EvalResult<Vec<CasePair>>;
}

/// 按排序后的位置配对: 第 N 个真值文件对应第 N 个预测文件.
///
/// 文件名本身不参与匹配. 两侧个数不一致时, 多出的尾部被直接丢弃
/// (与 `zip` 的截断行为一致), 只记录一条警告日志. 两侧文件顺序不对应时,
/// 结果会被静默地错配.
#[derive(Debug, Clone, Copy, Default)]
pub struct Positional;

impl PairingStrategy for Positional {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn pair(&self, gt: Vec<PathBuf>, pred: Vec<PathBuf>) -> EvalResult<Vec<CasePair>> {
        if gt.len() != pred.len() {
            warn!(
                "{} ground-truth files vs {} predictions, only the first {} pairs are evaluated",
                gt.len(),
                pred.len(),
                gt.len().min(pred.len())
            );
        }
        Ok(gt
            .into_iter()
            .zip(pred)
            .map(|(gt, pred)| CasePair { gt, pred })
            .collect())
    }
}

/// 按文件名完全一致配对. 任何一侧存在落单文件时返回 `Err(EvalError::Unmatched)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByFilename;

impl PairingStrategy for ByFilename {
    fn name(&self) -> &'static str {
        "by-filename"
    }

    fn pair(&self, gt: Vec<PathBuf>, pred: Vec<PathBuf>) -> EvalResult<Vec<CasePair>> {
        gt.into_iter()
            .map(|p| (file_name(&p), p))
            .merge_join_by(pred.into_iter().map(|p| (file_name(&p), p)), |a, b| {
                a.0.cmp(&b.0)
            })
            .map(|either| match either {
                EitherOrBoth::Both((_, gt), (_, pred)) => Ok(CasePair { gt, pred }),
                EitherOrBoth::Left((name, _)) | EitherOrBoth::Right((name, _)) => {
                    Err(EvalError::Unmatched { name })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ByFilename, CasePair, PairingStrategy, Positional};
    use crate::error::EvalError;
    use std::path::PathBuf;

    fn paths(dir: &str, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(dir).join(n)).collect()
    }

    #[test]
    fn test_positional_ignores_names() {
        let pairs = Positional
            .pair(paths("gt", &["a", "b"]), paths("pred", &["x", "y"]))
            .unwrap();
        assert_eq!(
            pairs,
            [
                CasePair {
                    gt: "gt/a".into(),
                    pred: "pred/x".into()
                },
                CasePair {
                    gt: "gt/b".into(),
                    pred: "pred/y".into()
                },
            ]
        );
        assert_eq!(pairs[1].name(), "y");
    }

    #[test]
    fn test_positional_truncates() {
        let pairs = Positional
            .pair(paths("gt", &["a", "b", "c"]), paths("pred", &["a", "b"]))
            .unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].gt, PathBuf::from("gt/b"));

        let pairs = Positional.pair(vec![], paths("pred", &["a"])).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_by_filename_matches_identity() {
        let pairs = ByFilename
            .pair(paths("gt", &["a", "b"]), paths("pred", &["a", "b"]))
            .unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].gt, PathBuf::from("gt/a"));
        assert_eq!(pairs[0].pred, PathBuf::from("pred/a"));
    }

    #[test]
    fn test_by_filename_reports_orphans() {
        let err = ByFilename
            .pair(paths("gt", &["a", "b", "c"]), paths("pred", &["a", "c"]))
            .unwrap_err();
        assert!(matches!(err, EvalError::Unmatched { name } if name == "b"));

        let err = ByFilename
            .pair(paths("gt", &["a"]), paths("pred", &["a", "z"]))
            .unwrap_err();
        assert!(matches!(err, EvalError::Unmatched { name } if name == "z"));
    }
}
