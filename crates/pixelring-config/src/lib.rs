//! Layout configuration: YAML input, variables and expression evaluation.

mod config;
mod error;
mod eval;
mod expr;
mod vars;

use std::path::Path;

pub use config::{
    BoardParams, LayoutConfig, OutlineConfig, RawConfig, RoutingConfig, Spoke, SpokeParams,
};
pub use error::ConfigError;
pub use eval::eval_in_context;
pub use expr::ScalarExpr;
pub use vars::Variables;

impl LayoutConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        Self::resolve(&raw)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded layout config");
        Ok(cfg)
    }
}
