use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ImportConfig;
use crate::errors::{ErrorKind, Result, RigError};
use crate::host::SceneHost;
use crate::import::audio_clip::{AudioClipReport, clip_name, import_audio_clip};
use crate::import::skinned_mesh::{SkinnedMeshReport, import_skinned_mesh, renderer_name};
use crate::import::ImportContext;
use crate::source::{AssetGraphProvider, ClassId, ObjectRef};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImportedObject {
    SkinnedMesh(SkinnedMeshReport),
    AudioClip(AudioClipReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFailure {
    pub object: ObjectRef,
    /// Object name when it could be read.
    pub name: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub imported: Vec<ImportedObject>,
    /// Candidates rejected by the name filter.
    pub skipped: usize,
    pub failures: Vec<ObjectFailure>,
}

impl BatchReport {
    /// Failure count per error kind.
    #[must_use]
    pub fn failure_counts(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Drives every skinned mesh renderer and audio clip of the graph.
///
/// Each object is one unit of failure: with `continue_on_error` its error is
/// logged and recorded and the batch moves on, otherwise the first error is
/// returned.
pub struct BatchImporter<'a> {
    ctx: ImportContext<'a>,
}

impl<'a> BatchImporter<'a> {
    pub fn new(
        provider: &'a dyn AssetGraphProvider,
        host: &'a mut dyn SceneHost,
        config: &'a ImportConfig,
    ) -> Self {
        Self {
            ctx: ImportContext::new(provider, host, config),
        }
    }

    pub fn run(&mut self) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let candidates: Vec<ObjectRef> = self
            .ctx
            .provider
            .object_refs(None)
            .into_iter()
            .filter(|o| {
                matches!(
                    o.class_id,
                    ClassId::SKINNED_MESH_RENDERER | ClassId::AUDIO_CLIP
                )
            })
            .collect();
        log::info!("Importing up to {} objects", candidates.len());

        for object in candidates {
            let name = match self.object_name(object) {
                Ok(name) => name,
                Err(err) => {
                    self.record_failure(&mut report, object, None, err)?;
                    continue;
                }
            };
            if !self.ctx.config.accepts(&name) {
                log::debug!("Skipping '{name}' {object}: not in name filter");
                report.skipped += 1;
                continue;
            }

            match self.import_one(object) {
                Ok(imported) => report.imported.push(imported),
                Err(err) => self.record_failure(&mut report, object, Some(name), err)?,
            }
        }

        log::info!(
            "Batch finished: {} imported, {} skipped, {} failed",
            report.imported.len(),
            report.skipped,
            report.failures.len()
        );
        Ok(report)
    }

    fn object_name(&self, object: ObjectRef) -> Result<String> {
        match object.class_id {
            ClassId::SKINNED_MESH_RENDERER => renderer_name(self.ctx.provider, object),
            _ => clip_name(self.ctx.provider, object),
        }
    }

    fn import_one(&mut self, object: ObjectRef) -> Result<ImportedObject> {
        match object.class_id {
            ClassId::SKINNED_MESH_RENDERER => {
                import_skinned_mesh(&mut self.ctx, object).map(ImportedObject::SkinnedMesh)
            }
            _ => import_audio_clip(&self.ctx, object).map(ImportedObject::AudioClip),
        }
    }

    fn record_failure(
        &self,
        report: &mut BatchReport,
        object: ObjectRef,
        name: Option<String>,
        err: RigError,
    ) -> Result<()> {
        log::error!(
            "Failed to import {} {object}: {err}",
            name.as_deref().unwrap_or("<unnamed>")
        );
        if !self.ctx.config.continue_on_error {
            return Err(err);
        }
        report.failures.push(ObjectFailure {
            object,
            name,
            kind: err.kind(),
            message: err.to_string(),
        });
        Ok(())
    }
}
