//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::data::{BinaryMask, NiftiHeaderAttr, SegLabel};

pub use crate::consts::gray::{LABEL_BACKGROUND, LABEL_TARGET};
pub use crate::consts::layout::{INFER_DIR, LABEL_DIR, NII_GZ_SUFFIX, REPORT_NAME};

pub use crate::dataset::{ByFilename, CasePair, PairingStrategy, Positional};
pub use crate::error::{EvalError, EvalResult};
pub use crate::evaluator::{EvalConfig, Evaluator, SpacingMode};
pub use crate::metrics::{dice, hd, hd95};
pub use crate::report::{CaseResult, ReportMode, RunReport};
