//! 精确欧氏距离变换.
//!
//! 对每个轴依次做一次一维平方距离变换 (抛物线下包络), 三次之后即得到
//! 到最近特征体素的平方欧氏距离. 各轴的体素分辨率在一维变换中直接参与计算,
//! 因此结果以物理单位 (毫米) 表示.

use ndarray::{Array3, ArrayView3, ArrayViewMut1, Axis, Zip};

/// 一维变换的工作区. 在同一轴的多条 lane 之间复用.
struct LaneWorkspace {
    /// 输入拷贝.
    f: Vec<f64>,
    /// 下包络中的抛物线顶点下标.
    v: Vec<usize>,
    /// 每条抛物线在下包络中的左边界 (物理坐标).
    z: Vec<f64>,
}

impl LaneWorkspace {
    fn new(n: usize) -> Self {
        Self {
            f: Vec::with_capacity(n),
            v: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
        }
    }

    /// 对 `lane` 原地做一维平方距离变换, 相邻元素的间距为 `s`.
    ///
    /// 取值为正无穷的元素不参与构造下包络. 如果整条 lane 都是正无穷, 则保持不变.
    fn transform(&mut self, mut lane: ArrayViewMut1<f64>, s: f64) {
        self.f.clear();
        self.f.extend(lane.iter().copied());
        self.v.clear();
        self.z.clear();

        for (q, &fq) in self.f.iter().enumerate() {
            if !fq.is_finite() {
                continue;
            }
            let xq = q as f64 * s;
            while let Some(&p) = self.v.last() {
                let xp = p as f64 * s;
                let sect = ((fq + xq * xq) - (self.f[p] + xp * xp)) / (2.0 * (xq - xp));
                if sect <= self.z[self.z.len() - 1] {
                    self.v.pop();
                    self.z.pop();
                } else {
                    self.v.push(q);
                    self.z.push(sect);
                    break;
                }
            }
            if self.v.is_empty() {
                self.v.push(q);
                self.z.push(f64::NEG_INFINITY);
            }
        }
        if self.v.is_empty() {
            return;
        }

        let mut k = 0usize;
        for (i, out) in lane.iter_mut().enumerate() {
            let x = i as f64 * s;
            while k + 1 < self.v.len() && self.z[k + 1] < x {
                k += 1;
            }
            let p = self.v[k];
            let d = x - p as f64 * s;
            *out = self.f[p] + d * d;
        }
    }
}

/// 沿 `axis` 对 `dt` 的每条 lane 做一维变换.
fn pass(dt: &mut Array3<f64>, axis: usize, s: f64) {
    let n = dt.len_of(Axis(axis));
    if n == 0 {
        return;
    }

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::from(dt.lanes_mut(Axis(axis)))
                .par_for_each(|lane| LaneWorkspace::new(n).transform(lane, s));
        } else {
            let mut ws = LaneWorkspace::new(n);
            Zip::from(dt.lanes_mut(Axis(axis))).for_each(|lane| ws.transform(lane, s));
        }
    }
}

/// 计算每个体素到最近特征体素 (`features` 中为 `true` 的体素) 的欧氏距离.
///
/// `spacing` 为 `[z, h, w]` 三个方向的体素分辨率. 如果不存在任何特征体素,
/// 则结果全为正无穷.
pub fn distance_transform(features: ArrayView3<'_, bool>, spacing: [f64; 3]) -> Array3<f64> {
    let mut dt = features.mapv(|f| if f { 0.0 } else { f64::INFINITY });
    for (axis, s) in spacing.into_iter().enumerate() {
        pass(&mut dt, axis, s);
    }
    dt.mapv_inplace(f64::sqrt);
    dt
}

#[cfg(test)]
mod tests {
    use super::distance_transform;
    use ndarray::Array3;

    /// 暴力计算每个体素到最近特征体素的距离.
    fn brute_force(features: &Array3<bool>, spacing: [f64; 3]) -> Array3<f64> {
        let seeds: Vec<_> = features
            .indexed_iter()
            .filter_map(|(p, f)| f.then_some(p))
            .collect();
        let mut out = Array3::from_elem(features.dim(), f64::INFINITY);
        for ((z, h, w), o) in out.indexed_iter_mut() {
            for &(a, b, c) in seeds.iter() {
                let dz = (z as f64 - a as f64) * spacing[0];
                let dh = (h as f64 - b as f64) * spacing[1];
                let dw = (w as f64 - c as f64) * spacing[2];
                *o = o.min((dz * dz + dh * dh + dw * dw).sqrt());
            }
        }
        out
    }

    fn assert_close(a: &Array3<f64>, b: &Array3<f64>) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9, "{x} != {y}");
        }
    }

    /// 一个确定性的稀疏特征分布.
    fn scattered(dim: (usize, usize, usize)) -> Array3<bool> {
        Array3::from_shape_fn(dim, |(z, h, w)| (z * 7 + h * 13 + w * 29) % 17 == 0)
    }

    #[test]
    fn test_edt_isotropic_matches_brute_force() {
        let f = scattered((6, 7, 8));
        let spacing = [1.0; 3];
        assert_close(&distance_transform(f.view(), spacing), &brute_force(&f, spacing));
    }

    #[test]
    fn test_edt_anisotropic_matches_brute_force() {
        let f = scattered((5, 9, 6));
        let spacing = [2.5, 0.75, 0.75];
        assert_close(&distance_transform(f.view(), spacing), &brute_force(&f, spacing));
    }

    #[test]
    fn test_edt_single_seed() {
        let mut f = Array3::from_elem((3, 3, 3), false);
        f[(0, 0, 0)] = true;
        let dt = distance_transform(f.view(), [1.0; 3]);
        assert_eq!(dt[(0, 0, 0)], 0.0);
        assert_eq!(dt[(0, 0, 2)], 2.0);
        assert!((dt[(2, 2, 2)] - 12f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_edt_without_features() {
        let f = Array3::from_elem((2, 2, 2), false);
        let dt = distance_transform(f.view(), [1.0; 3]);
        assert!(dt.iter().all(|d| d.is_infinite()));
    }
}
