//! 通用常量.

/// 标签体素值.
pub mod gray {
    /// 背景的体素值.
    pub const LABEL_BACKGROUND: u8 = 0;

    /// 默认评估目标 (ABM) 的体素值.
    pub const LABEL_TARGET: u8 = 1;
}

/// 数据集目录布局.
pub mod layout {
    /// 真值标签所在子目录名.
    pub const LABEL_DIR: &str = "labelTs";

    /// 预测结果所在子目录名. 其下每个 fold 各占一个子目录.
    pub const INFER_DIR: &str = "inferTs";

    /// 默认参与评估的文件后缀.
    pub const NII_GZ_SUFFIX: &str = "nii.gz";

    /// 默认评估报告文件名, 位于 fold 目录下.
    pub const REPORT_NAME: &str = "dice_pre.txt";
}

/// 评估报告中的分隔线.
pub const REPORT_SEP: &str = "********************";

/// HD95 所取的分位数.
pub const HD95_PERCENTILE: f64 = 95.0;
