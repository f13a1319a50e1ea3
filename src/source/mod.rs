//! Asset graph boundary
//!
//! The bundle parser lives outside this crate. It is reached through
//! [`AssetGraphProvider`], whose generic records are decoded into the typed
//! structs of [`records`] before any reconstruction code touches them.

pub mod memory;
pub mod provider;
pub mod records;

pub use memory::{GraphDump, ImageEntry, MemoryProvider, ObjectEntry};
pub use provider::{AssetGraphProvider, ClassId, DecodedImage, ObjectRef, PPtr};
