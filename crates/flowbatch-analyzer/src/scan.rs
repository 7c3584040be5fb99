//! Input discovery and report naming.

use std::path::{Path, PathBuf};

use crate::TRACING_TARGET_BATCH;
use crate::error::{Error, Result};

/// A file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Full path of the input.
    pub path: PathBuf,
    /// File name with the input extension removed.
    pub stem: String,
}

/// Lists regular files directly inside `dir` whose name ends in `.{extension}`.
///
/// The match is case-sensitive and non-recursive; a leading dot on
/// `extension` is ignored. Results are sorted by file name.
pub async fn scan_inputs(dir: &Path, extension: &str) -> Result<Vec<InputFile>> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let read_dir_error = |source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_error)?;
    let mut inputs = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::warn!(
                target: TRACING_TARGET_BATCH,
                path = %entry.path().display(),
                "skipping entry with non UTF-8 name"
            );
            continue;
        };

        let Some(stem) = name.strip_suffix(&suffix) else {
            continue;
        };

        // Follows symlinks, so a link to an input counts as an input.
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        // A bare ".apk" has no extension to strip.
        let stem = if stem.is_empty() { name } else { stem };
        inputs.push(InputFile {
            path: entry.path(),
            stem: stem.to_string(),
        });
    }

    inputs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(inputs)
}

/// Returns `output_dir/<stem>.<report_extension>`.
pub fn report_path(output_dir: &Path, input: &InputFile, report_extension: &str) -> PathBuf {
    let extension = report_extension.trim_start_matches('.');
    output_dir.join(format!("{}.{extension}", input.stem))
}
