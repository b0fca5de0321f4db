//! Runtime configuration.
//!
//! Everything has a default matching the SaC compiler's naming scheme, so a
//! config file only needs to name the fields it overrides.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub naming: NamingScheme,
    pub session: SessionOptions,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

/// How high-level names map onto the symbols the compiled binary exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingScheme {
    /// Leading segment of every mangled function (`SACf`).
    pub function_prefix: String,
    /// Namespace used when a query does not name one.
    pub main_namespace: String,
    /// Primitive type name -> overload code.
    pub type_codes: BTreeMap<String, String>,
    /// Per-iteration copies introduced by the compiler (`SACp_emal_5_x`).
    pub iteration_prefix: String,
    /// Renamed user-level locals (`SACl_x`).
    pub local_prefix: String,
    /// Substrings marking array descriptor bookkeeping (shape, size, ...).
    pub descriptor_markers: Vec<String>,
    /// Token introducing a query block, followed directly by `(`.
    pub sentinel: String,
    /// Literal marker for an open dimension. Unset repeats the element code.
    pub open_dimension_marker: Option<String>,
}

impl Default for NamingScheme {
    fn default() -> Self {
        let type_codes = [("int", "i"), ("float", "f"), ("double", "d"), ("bool", "b")]
            .into_iter()
            .map(|(name, code)| (name.to_string(), code.to_string()))
            .collect();

        Self {
            function_prefix: "SACf".to_string(),
            main_namespace: "MAIN".to_string(),
            type_codes,
            iteration_prefix: "SACp_emal".to_string(),
            local_prefix: "SACl_".to_string(),
            descriptor_markers: ["__sz", "__dim", "__desc", "__shp"]
                .into_iter()
                .map(String::from)
                .collect(),
            sentinel: "*sac".to_string(),
            open_dimension_marker: None,
        }
    }
}

impl NamingScheme {
    /// `SACf__` - the prefix every mangled function name starts with.
    pub fn function_marker(&self) -> String {
        format!("{}__", self.function_prefix)
    }

    /// The sentinel together with its opening parenthesis (`*sac(`).
    pub fn block_opener(&self) -> String {
        format!("{}(", self.sentinel)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Ask the host to fall back to software watchpoints during `init`.
    /// One watchpoint is installed per visible local, which quickly
    /// exhausts the hardware debug registers.
    pub disable_hw_watchpoints: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            disable_hw_watchpoints: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "naming": { "open_dimension_marker": "P" } }"#).unwrap();
        assert_eq!(config.naming.open_dimension_marker.as_deref(), Some("P"));
        assert_eq!(config.naming.function_prefix, "SACf");
        assert_eq!(config.naming.type_codes.get("float").map(String::as_str), Some("f"));
        assert!(config.session.disable_hw_watchpoints);
    }
}
