//! 数据集操作: 文件发现, 真值/预测配对与按对加载.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EvalError, EvalResult};

mod loader;
mod pairing;

pub use loader::{pair_loader, PairLoader};
pub use pairing::{ByFilename, CasePair, PairingStrategy, Positional};

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 列出 `dir` 下所有文件名以 `suffix` 结尾的普通文件, 并按文件名的字典序排序.
///
/// 以 `.` 开头的隐藏文件 (如 `._case_0.nii.gz`) 被忽略. 不递归子目录. `dir` 不存在或无法读取时返回 `Err(EvalError::Io)`.
pub fn discover<P: AsRef<Path>>(dir: P, suffix: &str) -> EvalResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut ans = Vec::new();
    for entry in fs::read_dir(dir).map_err(EvalError::io(dir))? {
        let entry = entry.map_err(EvalError::io(dir))?;
        let path = entry.path();
        let name = file_name(&path);
        if path.is_file() && !name.starts_with('.') && name.ends_with(suffix) {
            ans.push(path);
        }
    }
    ans.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(ans)
}

/// 路径的文件名部分. 非 UTF-8 字符被有损替换.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{discover, file_name};
    use std::fs;
    use std::path::Path;

    #[test]
    fn test_discover_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["case_10.nii.gz", "case_02.nii.gz", "notes.txt", "case_01.nii"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.nii.gz")).unwrap();

        let found: Vec<_> = discover(dir.path(), "nii.gz")
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(found, ["case_02.nii.gz", "case_10.nii.gz"]);
    }

    #[test]
    fn test_discover_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["._case_0.nii.gz", "case_0.nii.gz", ".nii.gz"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let found: Vec<_> = discover(dir.path(), "nii.gz")
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(found, ["case_0.nii.gz"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path().join("absent"), "nii.gz").is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/a/b/c.nii.gz")), "c.nii.gz");
        assert_eq!(file_name(Path::new("/")), "");
    }
}
