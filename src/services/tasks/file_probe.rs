// ファイルプローブ - ファイルのメタデータを非同期に読むタスク

use crate::core::Task;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 1ファイル分のプローブ結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileProbe {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub readonly: bool,
}

impl fmt::Display for FileProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.size)?;
        if let Some(modified) = self.modified {
            write!(f, ", modified {}", modified.format("%Y-%m-%d %H:%M:%S"))?;
        }
        Ok(())
    }
}

/// ディレクトリ以下の通常ファイルを列挙（`extensions` が空なら全て）
pub fn discover_files(directory: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut file_paths = Vec::new();

    for entry in WalkDir::new(directory) {
        let entry = entry.with_context(|| format!("failed to walk {}", directory.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if extensions.is_empty() || has_extension(entry.path(), extensions) {
            file_paths.push(entry.path().to_path_buf());
        }
    }

    file_paths.sort();
    Ok(file_paths)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

/// `path` のメタデータを読むタスク
pub fn probe_file_task(path: PathBuf) -> Task<FileProbe> {
    let key = path.display().to_string();
    Task::new(key, move || async move {
        let metadata = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("failed to stat {}", path.display()))?;
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        Ok(FileProbe {
            size: metadata.len(),
            modified,
            readonly: metadata.permissions().readonly(),
            path,
        })
    })
}
