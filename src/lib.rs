//! # rigport
//!
//! Rebuilds skeletons, skinned meshes, material textures and audio samples
//! from a decoded game asset graph.
//!
//! The binary bundle parser and the interactive 3D host are external: the
//! crate reads objects through [`source::AssetGraphProvider`] and writes
//! scene entities through [`host::SceneHost`]. Textures and audio go straight
//! to the filesystem.
//!
//! ```rust,ignore
//! use rigport::{BatchImporter, BundleSource, ImportConfig, MemoryHost, MemoryProvider};
//!
//! let provider = MemoryProvider::load_dir("dumps")?;
//! let config = ImportConfig::new(BundleSource::Directory("dumps".into()), "out");
//! let mut host = MemoryHost::new();
//! let report = BatchImporter::new(&provider, &mut host, &config).run()?;
//! ```

#![allow(clippy::too_many_arguments)]

pub mod audio;
pub mod config;
pub mod errors;
pub mod host;
pub mod import;
pub mod material;
pub mod mesh;
pub mod skeleton;
pub mod source;

pub use config::{BundleSource, ImportConfig};
pub use errors::{ErrorKind, Result, RigError};
pub use host::{MemoryHost, SceneHost};
pub use import::{BatchImporter, BatchReport, ImportContext};
pub use mesh::{AssembledSubmesh, SubmeshBuffers, assemble_submesh};
pub use skeleton::{BoneTree, ReconstructedSkeleton, SkeletonOptions, SkeletonPathMap};
pub use source::{AssetGraphProvider, MemoryProvider};
