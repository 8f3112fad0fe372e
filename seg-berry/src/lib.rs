#![warn(missing_docs)]

//! 核心库. 对 nifti 格式的 3D 分割预测结果与真值标签逐病例计算 Dice 和 HD95,
//! 并输出文本报告.
//!
//! # 数据布局
//!
//! ```text
//! <root>/labelTs/*.nii.gz           真值标签
//! <root>/inferTs/<fold>/*.nii.gz    某个 fold 的预测结果
//! <root>/inferTs/<fold>/dice_pre.txt 评估报告 (默认追加写入)
//! ```
//!
//! # 注意
//!
//! 1. 默认按排序后的位置配对真值与预测 ([`dataset::Positional`]),
//!   文件名本身不参与匹配. 两个目录的文件个数或顺序不一致时,
//!   结果会被静默地错配. 需要按文件名严格匹配时请使用 [`dataset::ByFilename`].
//! 2. 任一掩膜为空时 HD95 记为 0, 这会低估另一侧非空时的误差.
//! 3. 所有数据按 `(z, h, w)` 访问, 与 nifti 文件中的 `[w, h, z]` 相反.

/// 三维索引, `(z, h, w)`.
pub type Idx3d = (usize, usize, usize);

mod data;

pub use data::{BinaryMask, NiftiHeaderAttr, SegLabel};

pub mod consts;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod prelude;
pub mod report;
