//! Plugin loader contract

use serde::{Deserialize, Serialize};

use crate::core::error::{HeraldError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub title: String,
    pub version: String,
    pub description: String,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginOutput {
    pub message: Option<String>,
    pub data: Option<serde_json::Value>,
}

pub trait PluginHost: Send + Sync {
    fn list(&self) -> Vec<PluginInfo>;

    fn load(&mut self, name: &str) -> Result<PluginInfo>;

    /// Run `command` of a loaded plugin; `args` is the rest of the input line
    fn execute(&mut self, plugin: &str, command: &str, args: Option<&str>) -> Result<PluginOutput>;
}

/// Host with no plugins installed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlugins;

impl PluginHost for NoPlugins {
    fn list(&self) -> Vec<PluginInfo> {
        Vec::new()
    }

    fn load(&mut self, name: &str) -> Result<PluginInfo> {
        Err(HeraldError::external(
            "plugins",
            format!("no plugin named '{}' is installed", name),
        ))
    }

    fn execute(&mut self, plugin: &str, _command: &str, _args: Option<&str>) -> Result<PluginOutput> {
        Err(HeraldError::external(
            "plugins",
            format!("plugin '{}' is not loaded", plugin),
        ))
    }
}
