//! 3D 二值掩膜.

use ndarray::{Array3, ArrayView, Axis, Ix3, Zip};

use crate::error::{EvalError, EvalResult};
use crate::Idx3d;

/// 3D 二值掩膜, 数据按 `(z, h, w)` 组织, `true` 代表前景.
///
/// 掩膜同时记录了体素分辨率 (毫米, 同样按 `[z, h, w]` 顺序),
/// 以便计算带物理尺度的表面距离.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    data: Array3<bool>,
    spacing: [f64; 3],
}

impl BinaryMask {
    /// 从布尔数组和体素分辨率创建掩膜.
    #[inline]
    pub fn new(data: Array3<bool>, spacing: [f64; 3]) -> Self {
        Self { data, spacing }
    }

    /// 创建全背景掩膜.
    #[cfg(test)]
    pub(crate) fn empty(shape: Idx3d, spacing: [f64; 3]) -> Self {
        Self::new(Array3::from_elem(shape, false), spacing)
    }

    /// 替换体素分辨率.
    #[inline]
    pub fn with_spacing(mut self, spacing: [f64; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取体素分辨率, `[z, h, w]`.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, bool, Ix3> {
        self.data.view()
    }

    /// 前景体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|p| **p).count()
    }

    /// 是否不含任何前景体素?
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|p| *p)
    }

    /// 检查两掩膜形状是否一致. `self` 视作真值.
    pub fn check_shape(&self, pred: &Self) -> EvalResult<()> {
        if self.shape() == pred.shape() {
            Ok(())
        } else {
            Err(EvalError::ShapeMismatch {
                gt: self.shape(),
                pred: pred.shape(),
            })
        }
    }

    /// 两掩膜逐体素逻辑与之后的前景个数.
    ///
    /// 形状不一致时返回 `Err(EvalError::ShapeMismatch)`.
    pub fn intersection_count(&self, other: &Self) -> EvalResult<usize> {
        self.check_shape(other)?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .filter(|(a, b)| **a && **b)
            .count())
    }

    /// 提取表面 (边缘) 体素.
    ///
    /// 表面体素是至少有一个钻石型 (6-) 邻居为背景的前景体素.
    /// 数据范围以外一律视作背景, 因此贴着体数据边界的前景也属于表面.
    pub fn border(&self) -> Self {
        let (z, h, w) = self.shape();
        let mut border = Array3::from_elem((z, h, w), false);
        Zip::indexed(&mut border)
            .and(&self.data)
            .for_each(|pos, b, &fg| *b = fg && self.touches_background(pos));
        Self::new(border, self.spacing)
    }

    /// `pos` 的六个钻石型邻居中是否存在背景 (含越界).
    fn touches_background(&self, (z, h, w): Idx3d) -> bool {
        let (zn, hn, wn) = self.shape();
        if z == 0 || h == 0 || w == 0 || z + 1 == zn || h + 1 == hn || w + 1 == wn {
            return true;
        }
        [
            (z - 1, h, w),
            (z + 1, h, w),
            (z, h - 1, w),
            (z, h + 1, w),
            (z, h, w - 1),
            (z, h, w + 1),
        ]
        .into_iter()
        .any(|p| !self.data[p])
    }

    /// 沿 `axis` 方向的前景切片个数. 仅用于日志中的简要描述.
    pub(crate) fn extent(&self, axis: usize) -> usize {
        self.data
            .axis_iter(Axis(axis))
            .filter(|s| s.iter().any(|p| *p))
            .count()
    }
}
