use crate::config::ImportConfig;
use crate::host::SceneHost;
use crate::source::AssetGraphProvider;

/// Everything one import call needs, threaded explicitly.
///
/// The host is borrowed mutably for the whole pass; imports run on the
/// thread that owns it.
pub struct ImportContext<'a> {
    pub provider: &'a dyn AssetGraphProvider,
    pub host: &'a mut dyn SceneHost,
    pub config: &'a ImportConfig,
}

impl<'a> ImportContext<'a> {
    pub fn new(
        provider: &'a dyn AssetGraphProvider,
        host: &'a mut dyn SceneHost,
        config: &'a ImportConfig,
    ) -> Self {
        Self {
            provider,
            host,
            config,
        }
    }
}
