//! 评估结果与文本报告.
//!
//! 报告格式与已有的 `dice_pre.txt` 保持兼容. 每个病例一个块:
//!
//! ```text
//! ********************
//! case_001.nii.gz
//! Dice_ABM: 0.9132
//! hd_ABM: 3.1623
//! DSC:0.9132231404958677
//! hd:3.1622776601683795
//! ```
//!
//! 全部病例之后是汇总块, 给出 Dice 和 HD95 的算术平均值.
//! `DSC:` / `hd:` 两行只是按完整精度重复上面的数值.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::consts::REPORT_SEP;
use crate::error::{EvalError, EvalResult};

/// 单个病例的评估结果.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseResult {
    /// 病例名 (预测文件名).
    pub name: String,
    /// Dice 相似系数, `[0, 1]`.
    pub dice: f64,
    /// 95 分位 Hausdorff 距离.
    pub hd95: f64,
}

/// 一次评估运行的全部结果, 按评估顺序排列.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    cases: Vec<CaseResult>,
}

impl RunReport {
    /// 创建空结果.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个病例.
    #[inline]
    pub fn push(&mut self, case: CaseResult) {
        self.cases.push(case);
    }

    /// 全部病例结果.
    #[inline]
    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    /// 病例个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// 是否没有任何病例?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Dice 的算术平均值. 没有病例时为 `NaN`.
    pub fn mean_dice(&self) -> f64 {
        mean(self.cases.iter().map(|c| c.dice))
    }

    /// HD95 的算术平均值. 没有病例时为 `NaN`.
    pub fn mean_hd95(&self) -> f64 {
        mean(self.cases.iter().map(|c| c.hd95))
    }
}

/// 成对求和时的分块大小.
const PAIRWISE_BLOCK: usize = 128;

/// 与 numpy `add.reduce` 相同顺序的成对求和, 保证汇总值与已有报告逐位一致.
///
/// 少于 8 个元素时顺序累加; 不超过分块大小时用 8 路累加器;
/// 否则在 8 的整数倍处一分为二后递归.
fn pairwise_sum(a: &[f64]) -> f64 {
    let n = a.len();
    if n < 8 {
        a.iter().fold(0.0, |acc, v| acc + v)
    } else if n <= PAIRWISE_BLOCK {
        let mut r = [0.0; 8];
        r.copy_from_slice(&a[..8]);
        let tail = n - n % 8;
        for chunk in a[8..tail].chunks_exact(8) {
            for (acc, v) in r.iter_mut().zip(chunk) {
                *acc += v;
            }
        }
        let res = ((r[0] + r[1]) + (r[2] + r[3])) + ((r[4] + r[5]) + (r[6] + r[7]));
        a[tail..].iter().fold(res, |acc, v| acc + v)
    } else {
        let half = n / 2;
        let half = half - half % 8;
        pairwise_sum(&a[..half]) + pairwise_sum(&a[half..])
    }
}

/// 算术平均值, 空序列得到 `NaN`.
fn mean<I: Iterator<Item = f64>>(it: I) -> f64 {
    let values: Vec<f64> = it.collect();
    pairwise_sum(&values) / values.len() as f64
}

/// 按最短可往返的十进制表示输出浮点数, 并总是带小数部分
/// (`1.0`, `0.8571428571428571`, `1e-05`, `nan`).
pub fn repr_f64(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{v:?}");
    match s.split_once('e') {
        None => s,
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            let mantissa = mantissa.strip_suffix(".0").unwrap_or(mantissa);
            format!("{mantissa}e{sign}{digits:0>2}")
        }
    }
}

/// 报告文件的打开方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportMode {
    /// 追加到已有内容之后. 同一 fold 多次评估的结果会累积在同一个文件中.
    #[default]
    Append,

    /// 清空已有内容后再写入.
    Truncate,
}

/// 文本报告写入器.
///
/// 每写完一个病例块就 flush 一次, 因此运行中途失败时,
/// 已完成的病例仍然保留在报告中.
pub struct ReportWriter<W: Write> {
    w: W,
    path: PathBuf,
}

impl ReportWriter<BufWriter<File>> {
    /// 按 `mode` 打开 `path` 处的报告文件. 父目录不存在时会被创建.
    pub fn create<P: AsRef<Path>>(path: P, mode: ReportMode) -> EvalResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(EvalError::io(parent))?;
        }

        let mut options = OpenOptions::new();
        match mode {
            ReportMode::Append => options.append(true),
            ReportMode::Truncate => options.write(true).truncate(true),
        };
        let file = options
            .create(true)
            .open(path)
            .map_err(EvalError::io(path))?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl<W: Write> ReportWriter<W> {
    /// 包装任意写入目标. `path` 只用于错误信息.
    pub fn new(w: W, path: impl Into<PathBuf>) -> Self {
        Self {
            w,
            path: path.into(),
        }
    }

    /// 写入一个病例块并 flush.
    pub fn write_case(&mut self, case: &CaseResult) -> EvalResult<()> {
        let CaseResult { name, dice, hd95 } = case;
        let w = &mut self.w;
        writeln!(w, "{REPORT_SEP}")
            .and_then(|_| writeln!(w, "{name}"))
            .and_then(|_| writeln!(w, "Dice_ABM: {dice:.4}"))
            .and_then(|_| writeln!(w, "hd_ABM: {hd95:.4}"))
            .and_then(|_| writeln!(w, "DSC:{}", repr_f64(*dice)))
            .and_then(|_| writeln!(w, "hd:{}", repr_f64(*hd95)))
            .and_then(|_| w.flush())
            .map_err(EvalError::io(&self.path))
    }

    /// 写入汇总块并 flush, 然后交还底层写入目标.
    pub fn finish(mut self, report: &RunReport) -> EvalResult<W> {
        let (dice, hd95) = (repr_f64(report.mean_dice()), repr_f64(report.mean_hd95()));
        let w = &mut self.w;
        writeln!(w, "{REPORT_SEP}")
            .and_then(|_| writeln!(w, "Mean_Dice"))
            .and_then(|_| writeln!(w, "Dice_ABM{dice}"))
            .and_then(|_| writeln!(w, "Mean_hd"))
            .and_then(|_| writeln!(w, "hd_ABM{hd95}"))
            .and_then(|_| writeln!(w, "{REPORT_SEP}"))
            .and_then(|_| writeln!(w, "dsc:{dice}"))
            .and_then(|_| writeln!(w, "hd:{hd95}"))
            .and_then(|_| w.flush())
            .map_err(EvalError::io(&self.path))?;
        Ok(self.w)
    }
}
