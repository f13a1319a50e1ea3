use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, RigError};
use crate::mesh::SubmeshBuffers;
use crate::source::provider::{AssetGraphProvider, ClassId, DecodedImage, ObjectRef, PPtr};

/// Texture payload as stored in a graph dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub width: u32,
    pub height: u32,
    /// Base64 encoded RGBA8 pixels.
    pub rgba: String,
}

/// One object of a graph dump, with any decoded payloads attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    pub file_id: i64,
    pub path_id: i64,
    pub class_id: ClassId,
    pub record: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submeshes: Option<Vec<SubmeshBuffers>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageEntry>,
    /// Base64 encoded audio container bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl ObjectEntry {
    #[must_use]
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            file_id: self.file_id,
            path_id: self.path_id,
            class_id: self.class_id,
        }
    }
}

/// Serialized form of a decoded asset graph, as written by the bundle parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDump {
    pub objects: Vec<ObjectEntry>,
}

/// In-memory [`AssetGraphProvider`].
///
/// Object iteration follows insertion order.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    order: Vec<(i64, i64)>,
    objects: FxHashMap<(i64, i64), ObjectEntry>,
}

impl MemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an object and returns its reference.
    pub fn insert(&mut self, entry: ObjectEntry) -> ObjectRef {
        let key = (entry.file_id, entry.path_id);
        let object = entry.object_ref();
        if self.objects.insert(key, entry).is_none() {
            self.order.push(key);
        }
        object
    }

    /// Adds a bare record.
    pub fn insert_record(&mut self, path_id: i64, class_id: ClassId, record: Value) -> ObjectRef {
        self.insert(ObjectEntry {
            file_id: 0,
            path_id,
            class_id,
            record,
            container: None,
            submeshes: None,
            image: None,
            audio: None,
        })
    }

    fn entry_mut(&mut self, object: ObjectRef) -> Result<&mut ObjectEntry> {
        self.objects
            .get_mut(&(object.file_id, object.path_id))
            .ok_or_else(|| RigError::unresolved("object", object.to_string()))
    }

    pub fn set_container(&mut self, object: ObjectRef, container: impl Into<String>) -> Result<()> {
        self.entry_mut(object)?.container = Some(container.into());
        Ok(())
    }

    pub fn set_submeshes(&mut self, mesh: ObjectRef, submeshes: Vec<SubmeshBuffers>) -> Result<()> {
        self.entry_mut(mesh)?.submeshes = Some(submeshes);
        Ok(())
    }

    pub fn set_image(&mut self, texture: ObjectRef, image: &DecodedImage) -> Result<()> {
        self.entry_mut(texture)?.image = Some(ImageEntry {
            width: image.width,
            height: image.height,
            rgba: BASE64.encode(&image.rgba),
        });
        Ok(())
    }

    pub fn set_audio(&mut self, clip: ObjectRef, data: &[u8]) -> Result<()> {
        self.entry_mut(clip)?.audio = Some(BASE64.encode(data));
        Ok(())
    }

    /// Merges every object of `dump`.
    pub fn extend(&mut self, dump: GraphDump) {
        for entry in dump.objects {
            self.insert(entry);
        }
    }

    /// Loads one JSON graph dump.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut provider = Self::new();
        provider.add_file(path)?;
        Ok(provider)
    }

    /// Loads every `*.json` graph dump below `dir`, in sorted path order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut files = Vec::new();
        collect_json_files(dir.as_ref(), &mut files)?;
        files.sort();

        let mut provider = Self::new();
        for file in &files {
            provider.add_file(file)?;
        }
        log::info!(
            "Loaded {} graph dump(s) with {} objects from {}",
            files.len(),
            provider.order.len(),
            dir.as_ref().display()
        );
        Ok(provider)
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = fs::read_to_string(path.as_ref())?;
        let dump: GraphDump = serde_json::from_str(&text)?;
        log::debug!(
            "Read {} objects from {}",
            dump.objects.len(),
            path.as_ref().display()
        );
        self.extend(dump);
        Ok(())
    }

    /// Snapshot of the current contents.
    #[must_use]
    pub fn to_dump(&self) -> GraphDump {
        GraphDump {
            objects: self
                .order
                .iter()
                .filter_map(|key| self.objects.get(key).cloned())
                .collect(),
        }
    }

    fn entry(&self, object: ObjectRef) -> Result<&ObjectEntry> {
        self.objects
            .get(&(object.file_id, object.path_id))
            .ok_or_else(|| RigError::unresolved("object", object.to_string()))
    }
}

fn collect_json_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            out.push(path);
        }
    }
    Ok(())
}

impl AssetGraphProvider for MemoryProvider {
    fn object_refs(&self, filter: Option<ClassId>) -> Vec<ObjectRef> {
        self.order
            .iter()
            .filter_map(|key| self.objects.get(key))
            .map(ObjectEntry::object_ref)
            .filter(|o| filter.is_none_or(|class| o.class_id == class))
            .collect()
    }

    fn record(&self, object: ObjectRef) -> Option<Value> {
        self.objects
            .get(&(object.file_id, object.path_id))
            .map(|e| e.record.clone())
    }

    fn resolve(&self, ptr: PPtr) -> Option<ObjectRef> {
        if ptr.is_null() {
            return None;
        }
        self.objects
            .get(&(ptr.file_id, ptr.path_id))
            .map(ObjectEntry::object_ref)
    }

    fn container_name(&self, object: ObjectRef) -> Option<String> {
        self.objects
            .get(&(object.file_id, object.path_id))
            .and_then(|e| e.container.clone())
    }

    fn submesh_count(&self, mesh: ObjectRef) -> Result<usize> {
        Ok(self.entry(mesh)?.submeshes.as_ref().map_or(0, Vec::len))
    }

    fn submesh_buffers(&self, mesh: ObjectRef, submesh: usize) -> Result<SubmeshBuffers> {
        self.entry(mesh)?
            .submeshes
            .as_ref()
            .and_then(|s| s.get(submesh))
            .cloned()
            .ok_or_else(|| RigError::unresolved("submesh", format!("#{submesh} of {mesh}")))
    }

    fn texture_image(&self, texture: ObjectRef) -> Result<DecodedImage> {
        let image = self
            .entry(texture)?
            .image
            .as_ref()
            .ok_or_else(|| RigError::unresolved("texture image data", texture.to_string()))?;
        Ok(DecodedImage {
            width: image.width,
            height: image.height,
            rgba: BASE64.decode(&image.rgba)?,
        })
    }

    fn audio_data(&self, clip: ObjectRef) -> Result<Vec<u8>> {
        let data = self
            .entry(clip)?
            .audio
            .as_ref()
            .ok_or_else(|| RigError::unresolved("audio data", clip.to_string()))?;
        Ok(BASE64.decode(data)?)
    }
}
