//! Contracts for collaborators outside the dispatch core
//!
//! Each contract ships with an offline default so the assistant runs with
//! nothing configured; real providers are plugged in through [`Services`].

pub mod features;
pub mod plugins;
pub mod system;

pub use features::{
    FeatureProvider, FeatureRequest, FeatureResponse, MediaService, OfflineProviders, VolumeChange,
};
pub use plugins::{NoPlugins, PluginHost, PluginInfo, PluginOutput};
pub use system::{ShellSystem, SystemCapability};

/// External service handles owned by the session
pub struct Services {
    pub features: Box<dyn FeatureProvider>,
    pub system: Box<dyn SystemCapability>,
    pub plugins: Box<dyn PluginHost>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            features: Box::new(OfflineProviders),
            system: Box::new(ShellSystem),
            plugins: Box::new(NoPlugins),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
