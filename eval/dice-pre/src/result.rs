//! 终端结果摘要.

use seg_berry::report::{repr_f64, RunReport};
use std::io::{self, Write};

/// 将 `report` 的逐病例结果和平均值写进 `w` 中.
fn describe_into<W: Write>(report: &RunReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    utils::sep_to(&mut *w)?;
    for case in report.cases() {
        writeln!(
            w,
            "{S4}{:<32} dice {:.4}{S4}hd95 {:.4}",
            case.name, case.dice, case.hd95
        )?;
    }
    utils::sep_to(&mut *w)?;
    writeln!(w, "{S4}Cases: {}", report.len())?;
    writeln!(w, "{S4}Mean dice: {}", repr_f64(report.mean_dice()))?;
    writeln!(w, "{S4}Mean hd95: {}", repr_f64(report.mean_hd95()))?;
    Ok(())
}

/// 在标准输出上打印评估摘要.
pub fn describe(report: &RunReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    describe_into(report, &mut lock)
}
