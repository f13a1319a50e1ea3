use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::skeleton::tree::BoneTree;

/// Hash of a slash-delimited bone path (CRC-32/IEEE of its UTF-8 bytes).
#[inline]
#[must_use]
pub fn bone_path_hash(path: &str) -> u32 {
    crc32fast::hash(path.as_bytes())
}

/// Lookup from bone path hash to full bone path.
///
/// Built once per skeleton. When two paths hash to the same key the first
/// one visited in pre-order is kept; shadowed paths are counted and logged.
#[derive(Debug, Clone, Default)]
pub struct SkeletonPathMap {
    paths: FxHashMap<u32, String>,
    collisions: usize,
}

impl SkeletonPathMap {
    /// Walks `tree` and records `hash(path) -> path` for every node.
    ///
    /// The root's path is its own name; every other node appends
    /// `"/" + name` to its parent's path.
    pub fn build(tree: &BoneTree) -> Result<Self> {
        let mut map = Self::default();

        tree.walk(|_, node, parent_path: Option<&String>| {
            let path = match parent_path {
                Some(parent) => format!("{parent}/{}", node.name),
                None => node.name.clone(),
            };
            map.insert(&path);
            Ok(path)
        })?;

        if map.collisions > 0 {
            log::warn!(
                "Bone path map: {} path(s) shadowed by hash collisions",
                map.collisions
            );
        }
        Ok(map)
    }

    fn insert(&mut self, path: &str) {
        let hash = bone_path_hash(path);
        match self.paths.get(&hash) {
            Some(existing) if existing != path => {
                log::warn!("Bone path hash {hash:#010x} of '{path}' collides with '{existing}'");
                self.collisions += 1;
            }
            Some(_) => {}
            None => {
                self.paths.insert(hash, path.to_string());
            }
        }
    }

    /// Full path for `hash`.
    #[must_use]
    pub fn path(&self, hash: u32) -> Option<&str> {
        self.paths.get(&hash).map(String::as_str)
    }

    /// Last path segment for `hash`, i.e. the bone's own name.
    #[must_use]
    pub fn bone_name(&self, hash: u32) -> Option<&str> {
        self.path(hash)
            .map(|p| p.rsplit_once('/').map_or(p, |(_, name)| name))
    }

    /// Number of paths that were shadowed by an earlier path with the same hash.
    #[inline]
    #[must_use]
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
