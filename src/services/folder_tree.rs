use crate::models::{Document, Folder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FolderTreeError {
    #[error("Folder {0} appears more than once")]
    DuplicateFolder(String),
    #[error("Folder {0} is its own ancestor")]
    Cycle(String),
}

#[derive(Debug, Clone)]
struct FolderNode {
    folder: Folder,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Folder hierarchy stored as an arena: nodes refer to their parent and
/// children by index. Folders carry no `subfolders` once inside the tree.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    nodes: Vec<FolderNode>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// `None` for the DMS home entry.
    pub id: Option<String>,
    pub name: String,
}

/// A visible row of the folder sidebar.
#[derive(Debug, Clone, Copy)]
pub struct FolderRow<'a> {
    pub depth: usize,
    pub folder: &'a Folder,
    pub has_children: bool,
    pub expanded: bool,
}

impl FolderTree {
    /// Build from the nested shape returned by `/dms/folders`.
    pub fn from_nested(folders: Vec<Folder>) -> Result<Self, FolderTreeError> {
        let mut tree = FolderTree::default();
        let mut stack: Vec<(Folder, Option<usize>)> = folders.into_iter().rev().map(|f| (f, None)).collect();

        while let Some((mut folder, parent)) = stack.pop() {
            let subfolders = std::mem::take(&mut folder.subfolders);
            let idx = tree.insert(folder, parent)?;
            stack.extend(subfolders.into_iter().rev().map(|f| (f, Some(idx))));
        }

        Ok(tree)
    }

    /// Build from a flat list linked by parent id. Folders whose parent is
    /// not in the list become roots.
    pub fn from_flat(folders: Vec<Folder>) -> Result<Self, FolderTreeError> {
        let mut tree = FolderTree::default();
        let mut parent_ids = Vec::with_capacity(folders.len());

        for mut folder in folders {
            folder.subfolders.clear();
            parent_ids.push(folder.parent().map(str::to_string));
            if tree.index.contains_key(&folder.id) {
                return Err(FolderTreeError::DuplicateFolder(folder.id));
            }
            tree.index.insert(folder.id.clone(), tree.nodes.len());
            tree.nodes.push(FolderNode { folder, parent: None, children: Vec::new() });
        }

        for (idx, parent_id) in parent_ids.into_iter().enumerate() {
            let parent = parent_id.as_deref().and_then(|id| tree.index.get(id).copied());
            if parent_id.is_some() && parent.is_none() {
                tracing::warn!(
                    "Folder {} references missing parent {:?}, treating it as a root",
                    tree.nodes[idx].folder.id,
                    parent_id
                );
            }
            tree.nodes[idx].parent = parent;
            match parent {
                Some(p) => tree.nodes[p].children.push(idx),
                None => tree.roots.push(idx),
            }
        }

        tree.check_acyclic()?;
        Ok(tree)
    }

    fn insert(&mut self, folder: Folder, parent: Option<usize>) -> Result<usize, FolderTreeError> {
        if self.index.contains_key(&folder.id) {
            return Err(FolderTreeError::DuplicateFolder(folder.id));
        }
        let idx = self.nodes.len();
        self.index.insert(folder.id.clone(), idx);
        self.nodes.push(FolderNode { folder, parent, children: Vec::new() });
        match parent {
            Some(p) => self.nodes[p].children.push(idx),
            None => self.roots.push(idx),
        }
        Ok(idx)
    }

    fn check_acyclic(&self) -> Result<(), FolderTreeError> {
        for start in 0..self.nodes.len() {
            let mut steps = 0;
            let mut current = self.nodes[start].parent;
            while let Some(idx) = current {
                steps += 1;
                if idx == start || steps > self.nodes.len() {
                    return Err(FolderTreeError::Cycle(self.nodes[start].folder.id.clone()));
                }
                current = self.nodes[idx].parent;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Folder> {
        self.index.get(id).map(|&idx| &self.nodes[idx].folder)
    }

    pub fn parent(&self, id: &str) -> Option<&Folder> {
        let idx = *self.index.get(id)?;
        self.nodes[idx].parent.map(|p| &self.nodes[p].folder)
    }

    pub fn roots(&self) -> Vec<&Folder> {
        self.roots.iter().map(|&idx| &self.nodes[idx].folder).collect()
    }

    pub fn children(&self, id: &str) -> Vec<&Folder> {
        self.index
            .get(id)
            .map(|&idx| self.nodes[idx].children.iter().map(|&c| &self.nodes[c].folder).collect())
            .unwrap_or_default()
    }

    /// Ancestors of `id` from the root down, excluding `id` itself.
    pub fn ancestors(&self, id: &str) -> Vec<&Folder> {
        let mut chain = Vec::new();
        let mut current = self.index.get(id).and_then(|&idx| self.nodes[idx].parent);
        while let Some(idx) = current {
            chain.push(&self.nodes[idx].folder);
            current = self.nodes[idx].parent;
        }
        chain.reverse();
        chain
    }

    /// `Home` followed by each folder from the root down to `current`.
    pub fn breadcrumbs(&self, current: Option<&str>) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb { id: None, name: "Home".to_string() }];
        let Some(folder) = current.and_then(|id| self.get(id)) else {
            return crumbs;
        };
        for ancestor in self.ancestors(&folder.id) {
            crumbs.push(Breadcrumb { id: Some(ancestor.id.clone()), name: ancestor.name.clone() });
        }
        crumbs.push(Breadcrumb { id: Some(folder.id.clone()), name: folder.name.clone() });
        crumbs
    }

    /// Ids of `id` and every folder below it.
    pub fn subtree_ids(&self, id: &str) -> Vec<&str> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            ids.push(self.nodes[idx].folder.id.as_str());
            stack.extend(self.nodes[idx].children.iter().rev());
        }
        ids
    }

    /// Documents reported for `id` and all of its subfolders.
    pub fn total_document_count(&self, id: &str) -> u64 {
        self.subtree_ids(id).into_iter().filter_map(|f| self.get(f)).map(|f| f.document_count).sum()
    }

    /// Sidebar rows in depth-first order. Children are listed only under
    /// folders whose id is in `expanded`.
    pub fn visible_rows(&self, expanded: &HashSet<String>) -> Vec<FolderRow<'_>> {
        let mut rows = Vec::new();
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&idx| (idx, 0)).collect();
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            let is_expanded = expanded.contains(&node.folder.id);
            rows.push(FolderRow {
                depth,
                folder: &node.folder,
                has_children: !node.children.is_empty(),
                expanded: is_expanded,
            });
            if is_expanded {
                stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        rows
    }

    /// Documents whose `folder_id` names a folder missing from the tree.
    pub fn dangling_documents<'a>(&self, documents: &'a [Document]) -> Vec<&'a Document> {
        documents
            .iter()
            .filter(|doc| doc.folder_id.as_deref().is_some_and(|id| !self.contains(id)))
            .collect()
    }
}
