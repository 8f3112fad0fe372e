//! 病例对加载器.
//!
//! 提供迭代器风格的数据获取模式, 每次迭代只在内存中保留一对标签.

use super::CasePair;
use crate::error::EvalResult;
use crate::SegLabel;

/// 从配对结果创建加载器. 迭代顺序与 `pairs` 一致.
pub fn pair_loader<I: IntoIterator<Item = CasePair>>(pairs: I) -> PairLoader {
    let mut data: Vec<CasePair> = pairs.into_iter().collect();
    data.reverse();
    PairLoader { data_rev: data }
}

/// 依次加载 (真值, 预测) 标签对的加载器.
///
/// 任一文件打开失败时, 该次迭代返回 `Err`, 但迭代本身不会终止.
#[derive(Debug)]
pub struct PairLoader {
    data_rev: Vec<CasePair>,
}

impl Iterator for PairLoader {
    type Item = (CasePair, EvalResult<(SegLabel, SegLabel)>);

    fn next(&mut self) -> Option<Self::Item> {
        let pair = self.data_rev.pop()?;
        let data = SegLabel::open(&pair.gt).and_then(|gt| Ok((gt, SegLabel::open(&pair.pred)?)));
        Some((pair, data))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.data_rev.len(), Some(self.data_rev.len()))
    }
}

impl ExactSizeIterator for PairLoader {
    #[inline]
    fn len(&self) -> usize {
        self.data_rev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::pair_loader;
    use crate::dataset::CasePair;
    use crate::error::EvalError;

    #[test]
    fn test_loader_reports_missing_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let pairs = ["a", "b"].map(|n| CasePair {
            gt: dir.path().join(format!("gt_{n}.nii.gz")),
            pred: dir.path().join(format!("pred_{n}.nii.gz")),
        });

        let mut loader = pair_loader(pairs);
        assert_eq!(loader.len(), 2);

        let (pair, data) = loader.next().unwrap();
        assert_eq!(pair.name(), "pred_a.nii.gz");
        assert!(matches!(data, Err(EvalError::Nifti { .. })));

        let (pair, _) = loader.next().unwrap();
        assert_eq!(pair.name(), "pred_b.nii.gz");
        assert!(loader.next().is_none());
    }
}
