//! 分割质量指标.
//!
//! 目前提供 Dice 相似系数和基于表面距离的 Hausdorff 距离 (HD95 / HD).
//! 所有函数均以 `pred` (预测) 在前, `gt` (真值) 在后的顺序接受参数,
//! 形状不一致时返回 `Err(EvalError::ShapeMismatch)`.
//!
//! # 约定
//!
//! 1. 两掩膜均为空时, Dice 为 1 ("没有目标, 也没有预测出目标").
//! 2. 任一掩膜为空时, HD95 / HD 为 0. 这只是一个约定, 并非真正的距离:
//!   当另一侧非空时它会低估误差.

mod edt;

pub use edt::distance_transform;

use crate::consts::HD95_PERCENTILE;
use crate::data::BinaryMask;
use crate::error::EvalResult;

/// Dice 相似系数, 取值范围 `[0, 1]`.
pub fn dice(pred: &BinaryMask, gt: &BinaryMask) -> EvalResult<f64> {
    let inter = gt.intersection_count(pred)?;
    let total = pred.count() + gt.count();
    if total == 0 {
        return Ok(1.0);
    }
    Ok(2.0 * inter as f64 / total as f64)
}

/// 95 分位 Hausdorff 距离, 以 `gt` 的体素分辨率为物理单位.
pub fn hd95(pred: &BinaryMask, gt: &BinaryMask) -> EvalResult<f64> {
    hausdorff_percentile(pred, gt, HD95_PERCENTILE)
}

/// (最大) Hausdorff 距离, 以 `gt` 的体素分辨率为物理单位.
pub fn hd(pred: &BinaryMask, gt: &BinaryMask) -> EvalResult<f64> {
    hausdorff_percentile(pred, gt, 100.0)
}

/// 对称表面距离分布的 `q` 分位数.
fn hausdorff_percentile(pred: &BinaryMask, gt: &BinaryMask, q: f64) -> EvalResult<f64> {
    gt.check_shape(pred)?;
    if pred.is_empty() || gt.is_empty() {
        return Ok(0.0);
    }
    let spacing = gt.spacing();
    let mut sds = surface_distances(pred, gt, spacing);
    sds.extend(surface_distances(gt, pred, spacing));
    Ok(percentile(&mut sds, q))
}

/// 有向表面距离: `from` 的每个表面体素到 `to` 的最近表面体素的欧氏距离.
///
/// 结果按 `from` 表面体素的行优先顺序排列. 调用者需保证两者形状一致.
/// 若 `to` 为空, 则所有距离均为正无穷.
pub fn surface_distances(from: &BinaryMask, to: &BinaryMask, spacing: [f64; 3]) -> Vec<f64> {
    debug_assert_eq!(from.shape(), to.shape());
    let dt = distance_transform(to.border().data(), spacing);
    let from_border = from.border();
    dt.iter()
        .zip(from_border.data().iter())
        .filter_map(|(d, b)| b.then_some(*d))
        .collect()
}

/// 计算 `values` 的 `q` (`0 <= q <= 100`) 分位数. 在相邻秩之间线性插值.
///
/// 函数会对 `values` 原地排序. `values` 为空时返回 `NaN`.
pub fn percentile(values: &mut [f64], q: f64) -> f64 {
    debug_assert!((0.0..=100.0).contains(&q));
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_unstable_by(f64::total_cmp);

    let rank = q / 100.0 * (values.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    let frac = rank - lo as f64;
    values[lo] + (values[hi] - values[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::{dice, hd, hd95, percentile, surface_distances};
    use crate::data::BinaryMask;
    use ndarray::Array3;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// `n * n * n` 的体数据中, 以 `from` 为起点, 边长为 `side` 的立方体前景.
    fn cube(n: usize, from: (usize, usize, usize), side: usize) -> BinaryMask {
        let (z0, h0, w0) = from;
        let data = Array3::from_shape_fn((n, n, n), |(z, h, w)| {
            (z0..z0 + side).contains(&z)
                && (h0..h0 + side).contains(&h)
                && (w0..w0 + side).contains(&w)
        });
        BinaryMask::new(data, [1.0; 3])
    }

    fn empty(n: usize) -> BinaryMask {
        BinaryMask::empty((n, n, n), [1.0; 3])
    }

    #[test]
    fn test_dice_conventions() {
        let a = cube(8, (1, 1, 1), 3);
        assert!(f64_eq(dice(&a, &a).unwrap(), 1.0));
        assert!(f64_eq(dice(&empty(8), &empty(8)).unwrap(), 1.0));
        assert!(f64_eq(dice(&a, &empty(8)).unwrap(), 0.0));
        assert!(f64_eq(dice(&empty(8), &a).unwrap(), 0.0));
    }

    #[test]
    fn test_dice_partial_overlap() {
        // 27 + 27 体素, 重叠 2 * 3 * 3 = 18.
        let a = cube(8, (0, 0, 0), 3);
        let b = cube(8, (1, 0, 0), 3);
        let d = dice(&a, &b).unwrap();
        assert!(f64_eq(d, 2.0 * 18.0 / 54.0));
        assert!(f64_eq(d, dice(&b, &a).unwrap()));
        assert!((0.0..=1.0).contains(&d));
    }

    #[test]
    fn test_dice_shape_mismatch() {
        assert!(dice(&cube(4, (0, 0, 0), 2), &cube(5, (0, 0, 0), 2)).is_err());
        assert!(hd95(&cube(4, (0, 0, 0), 2), &cube(5, (0, 0, 0), 2)).is_err());
    }

    #[test]
    fn test_hd95_degenerate_is_zero() {
        let a = cube(6, (0, 0, 0), 3);
        assert_eq!(hd95(&a, &empty(6)).unwrap(), 0.0);
        assert_eq!(hd95(&empty(6), &a).unwrap(), 0.0);
        assert_eq!(hd95(&empty(6), &empty(6)).unwrap(), 0.0);
        assert_eq!(hd(&a, &empty(6)).unwrap(), 0.0);
    }

    #[test]
    fn test_hd95_identical_is_zero() {
        let a = cube(6, (1, 1, 1), 3);
        assert_eq!(hd95(&a, &a).unwrap(), 0.0);
        assert_eq!(hd(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_hd_single_voxels() {
        let a = cube(10, (0, 0, 0), 1);
        let b = cube(10, (0, 0, 4), 1);
        assert!(f64_eq(hd95(&a, &b).unwrap(), 4.0));
        assert!(f64_eq(hd(&b, &a).unwrap(), 4.0));

        let b = b.with_spacing([1.0, 1.0, 0.5]);
        let a = a.with_spacing([1.0, 1.0, 0.5]);
        assert!(f64_eq(hd95(&a, &b).unwrap(), 2.0));
    }

    #[test]
    fn test_hd95_symmetric() {
        let a = cube(12, (0, 0, 0), 4);
        let b = cube(12, (2, 3, 1), 6);
        let ab = hd95(&a, &b).unwrap();
        let ba = hd95(&b, &a).unwrap();
        assert!(f64_eq(ab, ba));
        assert!(ab > 0.0);
        assert!(ab <= hd(&a, &b).unwrap());
    }

    #[test]
    fn test_surface_distances_shifted_cube() {
        // 同样大小的立方体沿 w 平移 1: 所有距离不超过 1.
        let a = cube(8, (1, 1, 1), 4);
        let b = cube(8, (1, 1, 2), 4);
        let sds = surface_distances(&a, &b, [1.0; 3]);
        assert_eq!(sds.len(), a.border().count());
        assert!(sds.iter().all(|d| *d <= 1.0));
        assert!(sds.iter().any(|d| *d == 1.0));
    }

    #[test]
    fn test_percentile_interpolation() {
        let mut v = vec![4.0, 1.0, 3.0, 2.0, 5.0];
        assert!(f64_eq(percentile(&mut v, 0.0), 1.0));
        assert!(f64_eq(percentile(&mut v, 50.0), 3.0));
        assert!(f64_eq(percentile(&mut v, 100.0), 5.0));
        // rank = 0.95 * 4 = 3.8
        assert!(f64_eq(percentile(&mut v, 95.0), 4.8));
        assert!(percentile(&mut [], 95.0).is_nan());
    }
}
