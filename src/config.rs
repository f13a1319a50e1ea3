//! Import Configuration
//!
//! [`ImportConfig`] is the explicit context handed to every import call:
//! where the decoded bundle comes from, where files go, which objects to
//! import and how failures are treated.
//!
//! ```rust,ignore
//! use rigport::config::{BundleSource, ImportConfig};
//!
//! let config = ImportConfig::new(BundleSource::Directory("dumps".into()), "out")
//!     .with_names(["Hero", "Sword"])
//!     .with_continue_on_error(false);
//! config.validate()?;
//! ```
//!
//! On disk the same structure is JSON with camelCase keys:
//!
//! ```json
//! {
//!   "bundleSource": { "directory": "dumps" },
//!   "outputDir": "out",
//!   "nameFilter": ["Hero"],
//!   "continueOnError": true,
//!   "skeleton": { "boneLength": 0.05, "fixBindPoseAxes": false }
//! }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RigError};
use crate::skeleton::SkeletonOptions;

/// Where decoded bundle dumps are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BundleSource {
    File(PathBuf),
    Directory(PathBuf),
}

impl BundleSource {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            BundleSource::File(path) | BundleSource::Directory(path) => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    pub bundle_source: BundleSource,
    pub output_dir: PathBuf,
    /// Object names to import; `None` imports everything.
    #[serde(default)]
    pub name_filter: Option<BTreeSet<String>>,
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,
    #[serde(default)]
    pub skeleton: SkeletonOptions,
}

fn default_continue_on_error() -> bool {
    true
}

impl ImportConfig {
    #[must_use]
    pub fn new(bundle_source: BundleSource, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundle_source,
            output_dir: output_dir.into(),
            name_filter: None,
            continue_on_error: true,
            skeleton: SkeletonOptions::default(),
        }
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bundle_source.path().as_os_str().is_empty() {
            return Err(RigError::Config("bundle source path is empty".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(RigError::Config("output directory is empty".into()));
        }
        if let Some(filter) = &self.name_filter {
            if filter.is_empty() {
                return Err(RigError::Config(
                    "name filter is present but empty; omit it to import everything".into(),
                ));
            }
        }
        let length = self.skeleton.bone_length;
        if !length.is_finite() || length <= 0.0 {
            return Err(RigError::Config(format!(
                "bone length must be positive, got {length}"
            )));
        }
        Ok(())
    }

    /// `true` if `name` passes the allow-list.
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        self.name_filter
            .as_ref()
            .is_none_or(|names| names.contains(name))
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Adds names to the allow-list, creating it if absent.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_filter
            .get_or_insert_with(BTreeSet::new)
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn with_skeleton(mut self, skeleton: SkeletonOptions) -> Self {
        self.skeleton = skeleton;
        self
    }
}
