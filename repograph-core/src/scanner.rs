//! Scanned-file descriptors and the reference filesystem scanner.
//!
//! The pipeline only depends on the [`ScannedFile`] descriptor and the
//! [`FileScanner`](crate::collaborators::FileScanner) trait. [`FsScanner`]
//! is the implementation used by the CLI: gitignore-aware traversal via the
//! `ignore` crate, parallel per-file work with rayon, xxh3 content digests
//! and fast newline counting.
//!
//! # Features
//!
//! - Native `.gitignore` support at all levels
//! - Custom `.repographignore` file support
//! - Binary detection (NUL byte in the first 8 KiB)
//! - Optional capture of raw text content

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::collaborators::FileScanner;

/// Bytes inspected when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Ignore file honoured in addition to `.gitignore`.
pub const IGNORE_FILENAME: &str = ".repographignore";

/// Errors reported by a file scanner.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Information about a scanned file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedFile {
    /// Relative path from scan root, `/`-separated.
    pub path: String,

    /// File extension without the dot (may be empty).
    pub extension: String,

    /// File size in bytes.
    pub size_bytes: u64,

    /// Whether the content looks binary.
    pub is_binary: bool,

    /// Hex content digest.
    pub content_hash: String,

    /// Number of lines, when counted (text files only).
    #[serde(default)]
    pub line_count: Option<u64>,

    /// Raw text content, when captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ScannedFile {
    /// Descriptor for a text file with a known line count.
    pub fn text(path: &str, size_bytes: u64, content_hash: &str, line_count: u64) -> Self {
        Self {
            path: path.to_string(),
            extension: extension_of(path),
            size_bytes,
            is_binary: false,
            content_hash: content_hash.to_string(),
            line_count: Some(line_count),
            content: None,
        }
    }

    /// Descriptor for a binary file.
    pub fn binary(path: &str, size_bytes: u64, content_hash: &str) -> Self {
        Self {
            path: path.to_string(),
            extension: extension_of(path),
            size_bytes,
            is_binary: true,
            content_hash: content_hash.to_string(),
            line_count: None,
            content: None,
        }
    }
}

/// Extension of the last path component, without the dot.
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Compute the xxh3 digest of file content as lowercase hex.
pub fn content_digest(content: &[u8]) -> String {
    format!("{:016x}", xxh3_64(content))
}

/// Count lines; a trailing line without a newline still counts.
pub fn count_lines(content: &[u8]) -> u64 {
    let newlines = bytecount::count(content, b'\n') as u64;
    match content.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

fn looks_binary(content: &[u8]) -> bool {
    content[..content.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

/// Gitignore-aware filesystem scanner.
#[derive(Clone, Debug, Default)]
pub struct FsScanner {
    ignore_patterns: Vec<String>,
    skip_hidden: bool,
    follow_symlinks: bool,
    max_file_size_bytes: Option<u64>,
    capture_content: bool,
}

impl FsScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additional glob patterns to ignore (beyond .gitignore).
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Skip dot-files and dot-directories. Off by default so CI
    /// configuration such as `.github/workflows` is seen.
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Files larger than this are skipped.
    pub fn max_file_size_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_file_size_bytes = limit;
        self
    }

    /// Keep raw text content on each descriptor.
    pub fn capture_content(mut self, capture: bool) -> Self {
        self.capture_content = capture;
        self
    }

    fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(self.skip_hidden)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false)
            .follow_links(self.follow_symlinks)
            .add_custom_ignore_filename(IGNORE_FILENAME)
            .filter_entry(|entry| entry.file_name() != ".git");

        if !self.ignore_patterns.is_empty() {
            let mut override_builder = ignore::overrides::OverrideBuilder::new(root);
            for pattern in &self.ignore_patterns {
                // The ! prefix turns an override into an exclusion.
                if let Err(e) = override_builder.add(&format!("!{}", pattern)) {
                    warn!("Invalid ignore pattern '{}': {}", pattern, e);
                }
            }
            match override_builder.build() {
                Ok(overrides) => {
                    builder.overrides(overrides);
                }
                Err(e) => warn!("Failed to build ignore overrides: {}", e),
            }
        }

        builder
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
            .collect()
    }

    fn describe(&self, root: &Path, path: &Path) -> std::io::Result<Option<ScannedFile>> {
        let metadata = fs::metadata(path)?;
        if let Some(limit) = self.max_file_size_bytes {
            if metadata.len() > limit {
                return Ok(None);
            }
        }

        let content = fs::read(path)?;
        let rel_path = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let is_binary = looks_binary(&content);
        let line_count = (!is_binary).then(|| count_lines(&content));
        let text = if self.capture_content && !is_binary {
            Some(String::from_utf8_lossy(&content).into_owned())
        } else {
            None
        };

        Ok(Some(ScannedFile {
            extension: extension_of(&rel_path),
            path: rel_path,
            size_bytes: metadata.len(),
            is_binary,
            content_hash: content_digest(&content),
            line_count,
            content: text,
        }))
    }
}

impl FileScanner for FsScanner {
    fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>, ScanError> {
        let start = Instant::now();

        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let paths = self.walk(root);
        let skipped = AtomicUsize::new(0);
        let errors = AtomicUsize::new(0);

        let files: Vec<ScannedFile> = paths
            .par_iter()
            .filter_map(|path| match self.describe(root, path) {
                Ok(Some(file)) => Some(file),
                Ok(None) => {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    errors.fetch_add(1, Ordering::Relaxed);
                    None
                }
            })
            .collect();

        debug!(
            files = files.len(),
            skipped = skipped.load(Ordering::Relaxed),
            errors = errors.load(Ordering::Relaxed),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Scanned {}",
            root.display()
        );

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        File::create(dir.path().join("main.py"))
            .unwrap()
            .write_all(b"def main():\n    pass\n")
            .unwrap();

        File::create(dir.path().join("logo.png"))
            .unwrap()
            .write_all(&[0x89, b'P', b'N', b'G', 0, 0, 1, 2])
            .unwrap();

        fs::create_dir(dir.path().join("src")).unwrap();
        File::create(dir.path().join("src/lib.rs"))
            .unwrap()
            .write_all(b"fn lib() {}")
            .unwrap();

        File::create(dir.path().join(".gitignore"))
            .unwrap()
            .write_all(b"*.log\n")
            .unwrap();

        File::create(dir.path().join("debug.log"))
            .unwrap()
            .write_all(b"log data\n")
            .unwrap();

        dir
    }

    fn scan(dir: &TempDir, scanner: FsScanner) -> Vec<ScannedFile> {
        let mut files = scanner.scan(dir.path()).unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    #[test]
    fn test_scan_directory_basic() {
        let dir = create_test_dir();
        let files = scan(&dir, FsScanner::new());
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();

        // debug.log is gitignored
        assert_eq!(paths, vec![".gitignore", "logo.png", "main.py", "src/lib.rs"]);
    }

    #[test]
    fn test_scan_detects_binary_and_counts_lines() {
        let dir = create_test_dir();
        let files = scan(&dir, FsScanner::new());

        let png = files.iter().find(|f| f.path == "logo.png").unwrap();
        assert!(png.is_binary);
        assert_eq!(png.line_count, None);
        assert_eq!(png.extension, "png");

        let py = files.iter().find(|f| f.path == "main.py").unwrap();
        assert!(!py.is_binary);
        assert_eq!(py.line_count, Some(2));

        // No trailing newline still counts as one line
        let rs = files.iter().find(|f| f.path == "src/lib.rs").unwrap();
        assert_eq!(rs.line_count, Some(1));
    }

    #[test]
    fn test_scan_digest_is_stable_hex() {
        let dir = create_test_dir();
        let first = scan(&dir, FsScanner::new());
        let second = scan(&dir, FsScanner::new());

        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|f| f.content_hash.len() == 16
                && f.content_hash.chars().all(|c| c.is_ascii_hexdigit())));
    }

    #[test]
    fn test_scan_custom_ignore_file() {
        let dir = create_test_dir();
        File::create(dir.path().join(IGNORE_FILENAME))
            .unwrap()
            .write_all(b"*.png\n")
            .unwrap();

        let files = scan(&dir, FsScanner::new());
        assert!(!files.iter().any(|f| f.path.ends_with(".png")));
    }

    #[test]
    fn test_scan_ignore_patterns_and_size_limit() {
        let dir = create_test_dir();
        let files = scan(
            &dir,
            FsScanner::new()
                .with_ignore_patterns(vec!["src/".to_string()])
                .max_file_size_bytes(Some(10)),
        );
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();

        // main.py is 21 bytes and src/ is excluded
        assert_eq!(paths, vec![".gitignore", "logo.png"]);
    }

    #[test]
    fn test_scan_skip_hidden() {
        let dir = create_test_dir();
        let files = scan(&dir, FsScanner::new().skip_hidden(true));
        assert!(!files.iter().any(|f| f.path.starts_with('.')));
    }

    #[test]
    fn test_scan_capture_content() {
        let dir = create_test_dir();
        let files = scan(&dir, FsScanner::new().capture_content(true));

        let py = files.iter().find(|f| f.path == "main.py").unwrap();
        assert_eq!(py.content.as_deref(), Some("def main():\n    pass\n"));
        let png = files.iter().find(|f| f.path == "logo.png").unwrap();
        assert!(png.content.is_none());
    }

    #[test]
    fn test_scan_nonexistent() {
        let result = FsScanner::new().scan(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(FsScanner::new().scan(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"line1\nline2\nline3\n"), 3);
        assert_eq!(count_lines(b"line1\nline2"), 2);
    }
}
