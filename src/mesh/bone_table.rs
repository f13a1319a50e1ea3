use crate::errors::{Result, RigError};
use crate::skeleton::SkeletonPathMap;

/// Bone names addressed by the mesh's bone table index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoneTable {
    names: Vec<String>,
}

impl BoneTable {
    #[must_use]
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Maps every hash of a mesh's bone table to its bone name.
    ///
    /// A single unresolved hash fails the whole table.
    pub fn resolve(hashes: &[u32], paths: &SkeletonPathMap, mesh_name: &str) -> Result<Self> {
        let names = hashes
            .iter()
            .enumerate()
            .map(|(slot, &hash)| {
                paths.bone_name(hash).map(str::to_string).ok_or_else(|| {
                    RigError::unresolved(
                        "bone name hash",
                        format!("{hash:#010x} (bone table slot {slot}) in mesh '{mesh_name}'"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { names })
    }

    #[must_use]
    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
