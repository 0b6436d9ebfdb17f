//! File node builder: scanned descriptors to graph file nodes.

use std::cmp::Ordering;
use tracing::warn;

use crate::ordering::cmp_ignore_case;
use crate::rules::{normalize_extension, AnalysisRules};
use crate::scanner::{extension_of, ScannedFile};
use crate::types::RepositoryFileNode;

/// Normalize a relative path: `/` separators, no leading `./` or `/`, no
/// trailing `/.`. A bare `.` is the repository root and becomes empty.
pub fn normalize_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let mut rest = unified.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_suffix("/.") {
            rest = stripped;
        } else {
            break;
        }
    }
    if rest == "." {
        rest = "";
    }
    rest.to_string()
}

/// Total order used for file nodes: path ignoring case, then size, then digest.
pub fn cmp_file_nodes(a: &RepositoryFileNode, b: &RepositoryFileNode) -> Ordering {
    cmp_ignore_case(&a.path, &b.path)
        .then_with(|| a.size_bytes.cmp(&b.size_bytes))
        .then_with(|| a.content_hash.cmp(&b.content_hash))
}

/// Map a scanned file into a file node with its detected language.
pub fn build_file_node(file: &ScannedFile, rules: &AnalysisRules) -> RepositoryFileNode {
    let path = normalize_path(&file.path);
    let extension = if file.extension.trim().is_empty() {
        extension_of(&path)
    } else {
        normalize_extension(&file.extension)
    };
    let language = rules.language_for_extension(&extension).map(str::to_string);

    RepositoryFileNode {
        path,
        extension: normalize_extension(&extension),
        size_bytes: file.size_bytes,
        is_binary: file.is_binary,
        content_hash: file.content_hash.clone(),
        line_count: file.line_count,
        language,
        project_id: None,
    }
}

/// Build the ordered, path-unique set of file nodes.
///
/// Descriptors with a blank path are dropped. When two descriptors share a
/// path the one that sorts first by size and digest wins, so the result
/// does not depend on enumeration order.
pub fn build_file_nodes(files: &[ScannedFile], rules: &AnalysisRules) -> Vec<RepositoryFileNode> {
    let mut nodes: Vec<RepositoryFileNode> = files
        .iter()
        .map(|f| build_file_node(f, rules))
        .filter(|node| {
            if node.path.is_empty() {
                warn!("Dropping scanned file with a blank path");
                return false;
            }
            true
        })
        .collect();

    nodes.sort_by(cmp_file_nodes);
    nodes.dedup_by(|later, earlier| {
        let duplicate = later.path == earlier.path;
        if duplicate {
            warn!("Duplicate scanned path {}, keeping first", later.path);
        }
        duplicate
    });
    nodes
}
