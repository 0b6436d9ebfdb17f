//! File-to-project linking.
//!
//! The linking rule belongs to a collaborator; [`PrefixProjectLinker`] is
//! the rule the CLI uses. [`link_files`] applies any linker and enforces
//! that every assigned id names a detected project.

use std::collections::HashSet;
use tracing::warn;

use crate::collaborators::ProjectLinker;
use crate::nodes::normalize_path;
use crate::ordering::{cmp_ignore_case, eq_ignore_case, starts_with_ignore_case};
use crate::types::{ProjectDescriptor, RepositoryFileNode};

/// Longest matching directory prefix of the project's root path.
///
/// A project rooted at `r` owns path `p` when `r` is empty, `p == r`, or `p`
/// starts with `r/` (all ignoring case). Longest root wins; equal roots are
/// settled by project id. Projects without a root path never match.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrefixProjectLinker;

impl PrefixProjectLinker {
    fn owns(root: &str, path: &str) -> bool {
        if root.is_empty() {
            return true;
        }
        if eq_ignore_case(root, path) {
            return true;
        }
        starts_with_ignore_case(path, &format!("{}/", root))
    }
}

impl ProjectLinker for PrefixProjectLinker {
    fn link(&self, file: &RepositoryFileNode, projects: &[ProjectDescriptor]) -> Option<String> {
        projects
            .iter()
            .filter_map(|project| {
                let root = project.root_path.as_deref()?;
                let root = normalize_path(root);
                let root = root.trim_end_matches('/').to_string();
                Self::owns(&root, &file.path).then_some((root, project))
            })
            .max_by(|(a_root, a), (b_root, b)| {
                a_root
                    .chars()
                    .count()
                    .cmp(&b_root.chars().count())
                    // Reverse so the smaller id wins the max.
                    .then_with(|| cmp_ignore_case(&b.id, &a.id))
            })
            .map(|(_, project)| project.id.clone())
    }
}

/// Assign project ids to file nodes.
///
/// Ids that do not name a detected project are discarded and the file stays
/// unassigned.
pub fn link_files(
    files: Vec<RepositoryFileNode>,
    projects: &[ProjectDescriptor],
    linker: &dyn ProjectLinker,
) -> Vec<RepositoryFileNode> {
    let known: HashSet<&str> = projects.iter().map(|p| p.id.as_str()).collect();

    files
        .into_iter()
        .map(|mut file| {
            file.project_id = linker.link(&file, projects).filter(|id| {
                let exists = known.contains(id.as_str());
                if !exists {
                    warn!("Linker assigned {} to unknown project {}", file.path, id);
                }
                exists
            });
            file
        })
        .collect()
}
