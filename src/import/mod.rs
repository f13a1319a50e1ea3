//! Object import pipelines
//!
//! [`skinned_mesh`] and [`audio_clip`] import a single source object through
//! an [`ImportContext`]; [`batch`] dispatches every candidate of the asset
//! graph by class id and isolates failures per object.

pub mod audio_clip;
pub mod batch;
pub mod context;
pub mod skinned_mesh;

pub use audio_clip::{AudioClipReport, audio_output_base, import_audio_clip};
pub use batch::{BatchImporter, BatchReport, ImportedObject, ObjectFailure};
pub use context::ImportContext;
pub use skinned_mesh::{
    MaterialReport, SkinnedMeshReport, import_skinned_mesh, reconstruct_skeleton,
};
