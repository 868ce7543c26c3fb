use anyhow::{Result, Context};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::AppError;
use crate::source::is_markdown_path;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path of a rendered document
    // @params: output_dir, source path (`/`-separated), prefix stripped from its start
    pub fn output_path_for<P: AsRef<Path>>(output_dir: P, source_path: &str, prefix_to_remove: &str) -> Result<PathBuf, AppError> {
        let relative = if prefix_to_remove.is_empty() {
            source_path
        } else {
            source_path.strip_prefix(prefix_to_remove).unwrap_or(source_path)
        };
        let relative = Path::new(relative.trim_start_matches('/'));

        if relative.as_os_str().is_empty()
            || relative.components().any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::File(format!("Refusing to write outside the output directory: {}", source_path)));
        }

        Ok(output_dir.as_ref().join(relative))
    }

    /// Find markdown files (`.md`, `.mdx`) in a directory, sorted
    pub fn find_markdown_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && is_markdown_path(&path.to_string_lossy()) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
