use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, NiftiType, ReaderOptions};

use crate::error::{EvalError, EvalResult};
use crate::Idx3d;

mod mask;

pub use mask::BinaryMask;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 体素间距缺失 (非正数或非有限值) 时按 1 处理.
#[inline]
fn sanitize_spacing(v: f32) -> f64 {
    if v.is_finite() && v > 0.0 {
        v as f64
    } else {
        1.0
    }
}

/// 经 scl 变换后的体素值恰好是 `u8` 标签时返回该标签.
#[inline]
fn exact_label(v: f64) -> Option<u8> {
    (v.fract() == 0.0 && (0.0..=255.0).contains(&v)).then_some(v as u8)
}

/// header 声明的数据可以不经转换直接按 `u8` 读取?
#[inline]
fn is_plain_u8(h: &NiftiHeader) -> bool {
    matches!(h.data_type(), Ok(NiftiType::Uint8))
        && (h.scl_slope == 0.0 || h.scl_slope == 1.0)
        && h.scl_inter == 0.0
}

/// 3D nii 文件 header 的共用属性.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    ///
    /// header 中缺失的分量按 1 处理.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z, h, w].map(sanitize_spacing)
    }
}

/// nii 格式 3D 分割标签, 包括 header 和标签数据. 标签值以 `u8` 保存.
///
/// 真值标签和网络预测结果都用该结构表示.
#[derive(Debug, Clone)]
pub struct SegLabel {
    header: BoxedHeader,
    data: Array3<u8>,
}

impl NiftiHeaderAttr for SegLabel {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for SegLabel {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl SegLabel {
    /// 打开 nii (或 nii.gz) 文件格式的 3D 标签. `path` 为文件的本地路径.
    ///
    /// 非 `u8` 存储 (或带 scl 变换) 的文件先按 `f64` 读取并做 scl 变换,
    /// 变换后的每个体素值都必须是 `0..=255` 内的整数, 否则返回
    /// `Err(EvalError::LabelValue)`. 第四维长度为 1 的文件也被视为 3D 体数据.
    pub fn open<P: AsRef<Path>>(path: P) -> EvalResult<Self> {
        let path = path.as_ref();
        let obj = ReaderOptions::new()
            .read_file(path)
            .map_err(EvalError::nifti(path))?;
        let header = Box::new(obj.header().clone());
        let shape = get_shape_from_header(&header);

        let volume = obj.into_volume();
        let data = if is_plain_u8(&header) {
            volume.into_ndarray::<u8>().map_err(EvalError::nifti(path))?
        } else {
            let wide = volume
                .into_ndarray::<f64>()
                .map_err(EvalError::nifti(path))?;
            if let Some(&value) = wide.iter().find(|v| exact_label(**v).is_none()) {
                return Err(EvalError::LabelValue {
                    path: path.to_owned(),
                    value,
                });
            }
            wide.mapv(|v| v as u8)
        };

        // [W, H, z, (t)] -> [(t), z, H, W]
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = data.reversed_axes();

        // The nature of nifti data field layout.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };

        let not_3d = || EvalError::NotVolume3d {
            path: path.to_owned(),
            dim: header.dim,
        };
        if data.len() != shape.0 * shape.1 * shape.2 {
            return Err(not_3d());
        }
        let data = Array3::from_shape_vec(shape, data.into_raw_vec()).map_err(|_| not_3d())?;

        Ok(Self { header, data })
    }

    /// 根据裸标签数据和体素分辨率直接创建 `SegLabel` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 nifti 惯用标准以 \[w, h, z\] 格式存储.
    /// 2. `pix_dim` 按照 \[w, h, z\] 格式存储, 单位为毫米.
    pub fn from_raw(data: Array3<u8>, pix_dim: [f32; 3]) -> Self {
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        let (z, h, w) = data.dim();
        let mut header = Box::<NiftiHeader>::default();
        header.dim = [3, w as u16, h as u16, z as u16, 1, 1, 1, 1];
        let [_, pw, ph, pz, ..] = &mut header.pixdim;
        let [w, h, z] = pix_dim;
        (*pw, *ph, *pz) = (w, h, z);

        Self { header, data }
    }

    /// 获得数据的一份不可变 shallow copy. 数据按 `(z, h, w)` 组织.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 获取 3D 标签中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 将值为 `label` 的体素二值化为前景, 其余均为背景.
    ///
    /// 返回的掩膜携带本标签的体素分辨率.
    pub fn mask(&self, label: u8) -> BinaryMask {
        BinaryMask::new(self.data.mapv(|p| p == label), self.pix_dim())
    }
}
