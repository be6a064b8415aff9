//! Name-based loader construction.
//!
//! Hosts that let users pick loaders by name (command-line flags, config
//! files) build them through a `LoaderRegistry`. Descriptors have the form
//! `name`, `name=path`, `name?`, or `name?=path`; the `?` suffix turns on
//! error suppression for file loaders.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::Loader;
use super::error::ConfigError;
use super::file::FileSource;

/// A parsed loader descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderDescriptor {
    pub name: String,
    pub path: Option<PathBuf>,
    pub suppress_errors: bool,
    raw: String,
}

impl LoaderDescriptor {
    /// Parse `name[?][=path]`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (head, path) = match raw.split_once('=') {
            Some((head, path)) => (head.trim(), Some(PathBuf::from(path.trim()))),
            None => (raw.trim(), None),
        };
        let (name, suppress_errors) = match head.strip_suffix('?') {
            Some(name) => (name, true),
            None => (head, false),
        };
        if name.is_empty() {
            return Err(ConfigError::InvalidLoader {
                descriptor: raw.to_string(),
                message: "loader name is empty".to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            path,
            suppress_errors,
            raw: raw.to_string(),
        })
    }

    /// The file source this descriptor names, required by file loaders.
    pub fn file_source(&self) -> Result<FileSource, ConfigError> {
        let path = self.path.clone().ok_or_else(|| ConfigError::InvalidLoader {
            descriptor: self.raw.clone(),
            message: format!("the {} loader needs a path ({}=<FILE>)", self.name, self.name),
        })?;
        Ok(FileSource::new(path).suppress_errors(self.suppress_errors))
    }
}

/// Builds a loader from a parsed descriptor.
pub type LoaderFactory =
    Box<dyn Fn(&LoaderDescriptor) -> Result<Loader, ConfigError> + Send + Sync>;

/// Registry of loader variants addressable by name.
pub struct LoaderRegistry {
    factories: BTreeMap<String, LoaderFactory>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("null", |_| Ok(Loader::Null));
        registry.register("default", |_| Ok(Loader::DefaultValue));
        registry.register("env", |_| Ok(Loader::Env));
        registry.register("cmd-args", |_| Ok(Loader::cmd_args()));
        registry.register("json", |d| Ok(Loader::JsonFile(d.file_source()?)));
        registry.register("yaml", |d| Ok(Loader::YamlFile(d.file_source()?)));
        registry.register("dotenv", |d| Ok(Loader::DotenvFile(d.file_source()?)));
        registry.register("validation", |_| Ok(Loader::Validation));
        registry
    }
}

impl LoaderRegistry {
    /// A registry with no loaders.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&LoaderDescriptor) -> Result<Loader, ConfigError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered loader names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build one loader from a descriptor.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownLoader` for unregistered names and
    /// `ConfigError::InvalidLoader` for malformed descriptors.
    pub fn build(&self, descriptor: &str) -> Result<Loader, ConfigError> {
        let parsed = LoaderDescriptor::parse(descriptor)?;
        let factory = self
            .factories
            .get(&parsed.name)
            .ok_or_else(|| ConfigError::UnknownLoader(parsed.name.clone()))?;
        factory(&parsed)
    }

    /// Build a loader sequence, failing fast on the first bad descriptor.
    pub fn build_all<S: AsRef<str>>(&self, descriptors: &[S]) -> Result<Vec<Loader>, ConfigError> {
        descriptors.iter().map(|d| self.build(d.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LeafPolicy;
    use std::path::Path;

    #[test]
    fn test_default_registry_builds_builtin_loaders() {
        let registry = LoaderRegistry::default();
        let loaders = registry
            .build_all(&["default", "env", "cmd-args", "json=app.json"])
            .unwrap();

        let names: Vec<&str> = loaders.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["default", "env", "cmd-args", "json"]);
    }

    #[test]
    fn test_suppress_suffix_sets_file_policy() {
        let loader = LoaderRegistry::default().build("yaml?=conf/app.yaml").unwrap();
        let Loader::YamlFile(source) = loader else {
            panic!("expected a yaml loader");
        };
        assert_eq!(source.path(), Path::new("conf/app.yaml"));
        assert!(source.suppresses_errors());
    }

    #[test]
    fn test_unknown_loader_fails_fast() {
        let result = LoaderRegistry::default().build_all(&["default", "toml=app.toml", "env"]);
        assert!(matches!(result, Err(ConfigError::UnknownLoader(name)) if name == "toml"));
    }

    #[test]
    fn test_file_loader_without_path_is_rejected() {
        let result = LoaderRegistry::default().build("dotenv");
        assert!(matches!(result, Err(ConfigError::InvalidLoader { .. })));
    }

    #[test]
    fn test_custom_factory_can_be_registered() {
        let mut registry = LoaderRegistry::empty();
        registry.register("defaults-only", |_| Ok(Loader::DefaultValue));

        assert!(registry.build("defaults-only").is_ok());
        assert!(matches!(
            registry.build("env"),
            Err(ConfigError::UnknownLoader(_))
        ));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["defaults-only"]);
    }
}
