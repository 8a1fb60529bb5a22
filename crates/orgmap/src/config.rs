//! The `orgmap.yaml` configuration file.
//!
//! Every key is optional:
//!
//! ```yaml
//! output-dir: graphs
//! pretty: true
//! link-fields-to-objects: true
//! link-objects-to-triggers: false
//! filter:
//!   include-types: [ApexClass, ApexTrigger]
//!   exclude-namespaces: [""]      # "" means "no namespace"
//!   exclude-states: [deleted]
//! ```
//!
//! Command-line flags are applied on top with [`OrgmapConfig::apply`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::FilterSpec;
use crate::graph::BuildOptions;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "orgmap.yaml";

/// Output directory used when neither the file nor the flags set one
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct OrgmapConfig {
    /// Where graph documents are written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Which entities become nodes
    pub filter: FilterSpec,
    /// Link custom fields to their objects
    pub link_fields_to_objects: bool,
    /// Link objects back to the triggers that reference them
    pub link_objects_to_triggers: bool,
    /// Indent the JSON output
    pub pretty: bool,
}

/// Values given on the command line. Set values win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--output-dir`
    pub output_dir: Option<PathBuf>,
    /// Filter flags; a dimension set here replaces the file's dimension
    pub filter: FilterSpec,
    /// `--link-fields`
    pub link_fields_to_objects: bool,
    /// `--link-triggers`
    pub link_objects_to_triggers: bool,
    /// `--pretty`
    pub pretty: bool,
}

impl OrgmapConfig {
    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if it is not valid configuration YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load `explicit` if given, else `orgmap.yaml` in `dir` if it exists,
    /// else defaults.
    ///
    /// # Errors
    ///
    /// Fails if the chosen file cannot be loaded. A missing explicit file is
    /// an error; a missing default file is not.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading configuration");
            return Self::load(path);
        }
        let default_path = dir.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            debug!(path = %default_path.display(), "loading configuration");
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn apply(self, overrides: Overrides) -> Self {
        Self {
            output_dir: overrides.output_dir.or(self.output_dir),
            filter: self.filter.overlay(overrides.filter),
            link_fields_to_objects: self.link_fields_to_objects
                || overrides.link_fields_to_objects,
            link_objects_to_triggers: self.link_objects_to_triggers
                || overrides.link_objects_to_triggers,
            pretty: self.pretty || overrides.pretty,
        }
    }

    /// Output directory, defaulting to the working directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        self.output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR))
    }

    /// The graph build options this configuration describes.
    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            filter: self.filter.clone(),
            link_fields_to_objects: self.link_fields_to_objects,
            link_objects_to_triggers: self.link_objects_to_triggers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::NamespaceMatch;
    use crate::model::{EntityType, ManageableState};
    use tempfile::TempDir;

    #[test]
    fn full_file_parses() {
        let yaml = r#"
output-dir: graphs
pretty: true
link-fields-to-objects: true
filter:
  include-types: [ApexClass, ApexTrigger]
  exclude-namespaces: [""]
  exclude-states: [deleted]
"#;
        let config: OrgmapConfig = serde_yaml::from_str(yaml).expect("valid config");

        assert_eq!(config.output_dir(), Path::new("graphs"));
        assert!(config.pretty);
        assert!(config.link_fields_to_objects);
        assert!(!config.link_objects_to_triggers);
        assert_eq!(
            config.filter.include_types,
            Some(vec![EntityType::ApexClass, EntityType::ApexTrigger])
        );
        assert_eq!(
            config.filter.exclude_namespaces,
            Some(vec![NamespaceMatch::NoNamespace])
        );
        assert_eq!(
            config.filter.exclude_states,
            Some(vec![ManageableState::Deleted])
        );
    }

    #[test]
    fn unknown_key_is_a_config_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "output-directory: out\n").expect("writable");

        assert!(matches!(OrgmapConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let config = OrgmapConfig::discover(None, dir.path()).expect("no file is fine");

        assert_eq!(config, OrgmapConfig::default());
        assert_eq!(config.output_dir(), Path::new("."));
    }

    #[test]
    fn discover_reads_default_file() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "pretty: true\n").expect("writable");

        let config = OrgmapConfig::discover(None, dir.path()).expect("valid file");
        assert!(config.pretty);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("other.yaml");

        assert!(matches!(
            OrgmapConfig::discover(Some(&missing), dir.path()),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = OrgmapConfig {
            output_dir: Some(PathBuf::from("out")),
            filter: FilterSpec::include_types([EntityType::CustomField]),
            link_objects_to_triggers: true,
            ..OrgmapConfig::default()
        };

        config.save(&path).expect("writable");
        assert_eq!(OrgmapConfig::load(&path).expect("readable"), config);
    }

    #[test]
    fn flags_override_file_values() {
        let file = OrgmapConfig {
            output_dir: Some(PathBuf::from("from-file")),
            filter: FilterSpec {
                include_types: Some(vec![EntityType::ApexClass]),
                exclude_states: Some(vec![ManageableState::Deleted]),
                ..FilterSpec::default()
            },
            ..OrgmapConfig::default()
        };
        let overrides = Overrides {
            filter: FilterSpec::include_types([EntityType::ApexTrigger]),
            link_fields_to_objects: true,
            ..Overrides::default()
        };

        let merged = file.apply(overrides);
        assert_eq!(merged.output_dir(), Path::new("from-file"));
        assert_eq!(merged.filter.include_types, Some(vec![EntityType::ApexTrigger]));
        assert_eq!(
            merged.filter.exclude_states,
            Some(vec![ManageableState::Deleted])
        );

        let options = merged.build_options();
        assert!(options.link_fields_to_objects);
        assert!(!options.link_objects_to_triggers);
    }
}
