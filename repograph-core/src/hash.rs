//! Repository content hash for change detection.
//!
//! The digest covers the `(path, size, digest)` triple of every file node
//! and nothing else. Nodes are fed in case-insensitive path order, so any
//! permutation of the same file set hashes identically.

use sha2::{Digest, Sha256};

use crate::nodes::cmp_file_nodes;
use crate::types::RepositoryFileNode;

/// Compute the lowercase hex SHA-256 repository hash.
///
/// Each node contributes one `path|size|digest\n` line.
pub fn compute_repository_hash(files: &[RepositoryFileNode]) -> String {
    let mut ordered: Vec<&RepositoryFileNode> = files.iter().collect();
    ordered.sort_by(|a, b| cmp_file_nodes(a, b));

    let mut hasher = Sha256::new();
    for node in ordered {
        hasher.update(node.path.as_bytes());
        hasher.update(b"|");
        hasher.update(node.size_bytes.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(node.content_hash.as_bytes());
        hasher.update(b"\n");
    }

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
