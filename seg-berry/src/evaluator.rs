//! 分割结果评估器.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::consts::{gray::LABEL_TARGET, layout};
use crate::data::BinaryMask;
use crate::dataset::{self, pair_loader, PairingStrategy, Positional};
use crate::error::EvalResult;
use crate::metrics;
use crate::report::{CaseResult, ReportMode, ReportWriter, RunReport};
use crate::SegLabel;

/// 计算表面距离时使用的体素分辨率.
///
/// 已有的 `dice_pre.txt` 报告中的 HD95 是在丢弃几何信息的数组上计算的,
/// 以体素为单位. 默认的 `Header` 以毫米为单位, 在各向异性数据上
/// `hd_ABM` 与这些历史报告不可直接比较; 需要对比时使用 `Voxel`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpacingMode {
    /// 使用真值标签 header 中的体素分辨率, 距离以毫米为单位.
    #[default]
    Header,

    /// 所有方向的分辨率均视作 1, 距离以体素为单位.
    Voxel,
}

/// 评估配置.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalConfig {
    /// 数据集根目录, 其下有 `labelTs` 和 `inferTs` 两个子目录.
    pub root: PathBuf,
    /// 被二值化为前景的标签值.
    pub target_label: u8,
    /// 参与评估的文件后缀.
    pub suffix: String,
    /// fold 目录下的报告文件名.
    pub report_name: String,
    /// 报告文件打开方式.
    pub mode: ReportMode,
    /// 距离计算使用的体素分辨率.
    pub spacing: SpacingMode,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            target_label: LABEL_TARGET,
            suffix: layout::NII_GZ_SUFFIX.to_string(),
            report_name: layout::REPORT_NAME.to_string(),
            mode: ReportMode::default(),
            spacing: SpacingMode::default(),
        }
    }
}

impl EvalConfig {
    /// 以 `root` 为数据集根目录, 其余均取默认值.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// 设置目标标签值.
    #[inline]
    pub fn with_target_label(mut self, label: u8) -> Self {
        self.target_label = label;
        self
    }

    /// 设置文件后缀.
    #[inline]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// 设置报告文件名.
    #[inline]
    pub fn with_report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    /// 设置报告文件打开方式.
    #[inline]
    pub fn with_mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    /// 设置距离计算使用的体素分辨率.
    #[inline]
    pub fn with_spacing(mut self, spacing: SpacingMode) -> Self {
        self.spacing = spacing;
        self
    }

    /// 真值目录, `<root>/labelTs`.
    pub fn label_dir(&self) -> PathBuf {
        self.root.join(layout::LABEL_DIR)
    }

    /// 预测目录, `<root>/inferTs/<fold>`.
    pub fn fold_dir(&self, fold: &str) -> PathBuf {
        self.root.join(layout::INFER_DIR).join(fold)
    }

    /// 报告路径, `<root>/inferTs/<fold>/<report_name>`.
    pub fn report_path(&self, fold: &str) -> PathBuf {
        self.fold_dir(fold).join(&self.report_name)
    }
}

/// 评估器. 持有配置和配对策略, 本身不保存任何运行状态.
pub struct Evaluator {
    config: EvalConfig,
    pairing: Box<dyn PairingStrategy>,
}

impl Evaluator {
    /// 使用按位置配对的默认策略.
    pub fn new(config: EvalConfig) -> Self {
        Self::with_pairing(config, Positional)
    }

    /// 使用指定的配对策略.
    pub fn with_pairing<S: PairingStrategy + 'static>(config: EvalConfig, pairing: S) -> Self {
        Self {
            config,
            pairing: Box::new(pairing),
        }
    }

    /// 获取配置.
    #[inline]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// 按照 `<root>/labelTs` 与 `<root>/inferTs/<fold>` 的目录布局评估一个 fold,
    /// 报告写入 `<root>/inferTs/<fold>/<report_name>`.
    pub fn evaluate_fold(&self, fold: &str) -> EvalResult<RunReport> {
        let cfg = &self.config;
        self.evaluate(cfg.label_dir(), cfg.fold_dir(fold), cfg.report_path(fold))
    }

    /// 评估 `gt_dir` 与 `pred_dir` 中的全部病例, 并把文本报告写入 `out_path`.
    ///
    /// 两个目录中的文件分别按文件名排序后, 由配对策略组合成病例对,
    /// 然后逐对加载, 计算 Dice 和 HD95, 每完成一个病例就写入一个报告块.
    /// 所有病例结束后写入汇总块.
    ///
    /// # 错误
    ///
    /// 任何目录读取, 文件解码, 形状不一致或报告写入的错误都会立即终止评估.
    /// 此前已写入报告的病例块保持不变. 没有任何病例时不会报错,
    /// 汇总块中的平均值为 `nan`.
    pub fn evaluate<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        &self,
        gt_dir: P,
        pred_dir: Q,
        out_path: R,
    ) -> EvalResult<RunReport> {
        let cfg = &self.config;
        let gt = dataset::discover(gt_dir.as_ref(), &cfg.suffix)?;
        let pred = dataset::discover(pred_dir.as_ref(), &cfg.suffix)?;
        info!(
            "Loaded {} ground-truth files and {} predictions",
            gt.len(),
            pred.len()
        );

        let pairs = self.pairing.pair(gt, pred)?;
        info!("Pairing `{}`: {} cases", self.pairing.name(), pairs.len());

        let mut writer = ReportWriter::create(out_path.as_ref(), cfg.mode)?;
        let mut report = RunReport::new();
        for (pair, data) in pair_loader(pairs) {
            info!(
                "{} <-> {}",
                dataset::file_name(&pair.gt),
                dataset::file_name(&pair.pred)
            );
            let (gt, pred) = data?;
            let case = self.evaluate_case(pair.name(), &gt, &pred)?;
            writer.write_case(&case)?;
            report.push(case);
        }
        writer.finish(&report)?;

        info!(
            "Done: {} cases, mean Dice {:.4}, mean HD95 {:.4}",
            report.len(),
            report.mean_dice(),
            report.mean_hd95()
        );
        Ok(report)
    }

    /// 评估单个病例.
    pub fn evaluate_case(
        &self,
        name: String,
        gt: &SegLabel,
        pred: &SegLabel,
    ) -> EvalResult<CaseResult> {
        let (gt, pred) = self.masks(gt, pred);
        debug!(
            "{name}: {} / {} foreground voxels over {} / {} slices",
            gt.count(),
            pred.count(),
            gt.extent(0),
            pred.extent(0)
        );

        let dice = metrics::dice(&pred, &gt)?;
        let hd95 = metrics::hd95(&pred, &gt)?;
        debug!("{name}: dice = {dice:.4}, hd95 = {hd95:.4}");
        Ok(CaseResult { name, dice, hd95 })
    }

    /// 二值化一对标签. 两个掩膜共用真值的体素分辨率.
    fn masks(&self, gt: &SegLabel, pred: &SegLabel) -> (BinaryMask, BinaryMask) {
        let gt = gt.mask(self.config.target_label);
        let spacing = match self.config.spacing {
            SpacingMode::Header => gt.spacing(),
            SpacingMode::Voxel => [1.0; 3],
        };
        let pred = pred.mask(self.config.target_label).with_spacing(spacing);
        (gt.with_spacing(spacing), pred)
    }
}
