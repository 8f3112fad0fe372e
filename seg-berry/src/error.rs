//! 运行时错误.

use std::path::PathBuf;

use crate::Idx3d;

/// 评估过程中的运行时错误.
///
/// 任何一种错误都会终止整个评估批次, 已写入报告的病例保持不变.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// 打开或解码 nifti 文件失败.
    #[error("failed to read nifti file `{}`", path.display())]
    Nifti {
        /// 出错文件路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: nifti::NiftiError,
    },

    /// 目录遍历或报告写入时的底层 I/O 错误.
    #[error("I/O error at `{}`", path.display())]
    Io {
        /// 出错路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: std::io::Error,
    },

    /// nifti 文件不是单通道 3D 体数据.
    #[error("`{}` is not a 3D volume (dim = {dim:?})", path.display())]
    NotVolume3d {
        /// 出错文件路径.
        path: PathBuf,
        /// header 中记录的维度信息.
        dim: [u16; 8],
    },

    /// 体素值不是 `0..=255` 范围内的整数标签.
    #[error("`{}` holds voxel value {value}, not an integer label in 0..=255", path.display())]
    LabelValue {
        /// 出错文件路径.
        path: PathBuf,
        /// 第一个越界的体素值 (经 scl 变换后).
        value: f64,
    },

    /// 配对的两个掩膜形状不一致.
    #[error("mask shape mismatch: ground truth {gt:?}, prediction {pred:?}")]
    ShapeMismatch {
        /// 真值形状, `(z, h, w)`.
        gt: Idx3d,
        /// 预测形状, `(z, h, w)`.
        pred: Idx3d,
    },

    /// 按文件名配对时, 某文件找不到同名的另一半.
    #[error("`{name}` has no counterpart in the other directory")]
    Unmatched {
        /// 落单的文件名.
        name: String,
    },
}

impl EvalError {
    /// 便于 `map_err` 的构造器.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// 便于 `map_err` 的构造器.
    pub(crate) fn nifti(path: impl Into<PathBuf>) -> impl FnOnce(nifti::NiftiError) -> Self {
        let path = path.into();
        move |source| Self::Nifti { path, source }
    }
}

/// 评估运行时结果.
pub type EvalResult<T> = Result<T, EvalError>;
