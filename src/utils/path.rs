//! Path utilities for input discovery and output naming

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::domain::model::{TargetFormat, SUPPORTED_INPUT_EXTENSIONS};
use crate::error::{VidConvError, VidConvResult};

/// Path helpers for batch planning
pub struct PathUtils;

impl PathUtils {
    /// Lowercased extension without the dot
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Whether the file carries one of the accepted video extensions
    pub fn has_supported_extension(path: &Path) -> bool {
        Self::get_extension(path)
            .map(|ext| SUPPORTED_INPUT_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Resolve against the current directory without touching symlinks
    pub fn absolutize(path: &Path) -> VidConvResult<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }

    /// `<output_dir>/<input stem>.<format>`
    pub fn output_path_for(
        input: &Path,
        output_dir: &Path,
        format: TargetFormat,
    ) -> VidConvResult<PathBuf> {
        let stem = input.file_stem().ok_or_else(|| {
            VidConvError::invalid_job(format!("Input has no file name: {}", input.display()))
        })?;

        let mut name = stem.to_os_string();
        name.push(".");
        name.push(format.extension());
        Ok(output_dir.join(name))
    }

    /// Expand the user's selection into a flat file list.
    ///
    /// Files are kept as given, in order. Directories are walked recursively
    /// and contribute their supported video files in sorted order.
    pub fn collect_inputs(inputs: &[PathBuf]) -> VidConvResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                let mut found: Vec<PathBuf> = WalkDir::new(input)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_file())
                    .map(|entry| entry.into_path())
                    .filter(|path| Self::has_supported_extension(path))
                    .collect();
                found.sort();
                debug!(dir = %input.display(), count = found.len(), "Scanned input directory");
                files.extend(found);
            } else {
                files.push(input.clone());
            }
        }

        Ok(files)
    }
}
