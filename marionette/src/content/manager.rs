use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, info};
use serde::Deserialize;

use super::ContentReader;
use crate::{binary_reader::BinaryReader, model::Model, ContentError, ContentResult};

/// Settings for a [`ContentManager`]. Can be read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentConfig {
    /// Asset names are resolved relative to this directory
    pub root_directory: PathBuf,
    /// Keep loaded models so that loading the same asset twice returns the same model
    pub cache_models: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::from("."),
            cache_models: true,
        }
    }
}

impl ContentConfig {
    /// Read a config file. Missing fields take their default values.
    pub fn load(path: &Path) -> ContentResult<Self> {
        let bytes = BinaryReader::open(path)?.read_to_end()?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Builder for a [`ContentManager`]
#[derive(Debug, Clone, Default)]
pub struct ContentManagerBuilder {
    config: ContentConfig,
}

impl ContentManagerBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn root_directory(&mut self, root_directory: impl Into<PathBuf>) -> &mut Self {
        self.config.root_directory = root_directory.into();
        self
    }

    pub fn cache_models(&mut self, cache_models: bool) -> &mut Self {
        self.config.cache_models = cache_models;
        self
    }

    pub fn build(&self) -> ContentManager {
        ContentManager::new(self.config.clone())
    }
}

/// Loads models by asset name from under a content root.
#[derive(Debug, Default)]
pub struct ContentManager {
    config: ContentConfig,
    models: HashMap<String, Rc<Model>>,
}

impl ContentManager {
    pub fn builder() -> ContentManagerBuilder {
        ContentManagerBuilder::new()
    }

    pub fn new(config: ContentConfig) -> Self {
        Self {
            config,
            models: Default::default(),
        }
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Where the document for `asset_name` lives. Names without an extension get `.gltf`.
    pub fn asset_path(&self, asset_name: &str) -> PathBuf {
        let path = self.config.root_directory.join(asset_name);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension("gltf")
        }
    }

    /// Load `asset_name`, or return the cached model if it has already been loaded.
    ///
    /// A failed load leaves nothing behind: the next attempt reads the document from scratch.
    pub fn load(&mut self, asset_name: &str) -> ContentResult<Rc<Model>> {
        if let Some(model) = self.models.get(asset_name) {
            debug!("[MARIONETTE_CONTENT] {asset_name} is already loaded");
            return Ok(model.clone());
        }

        let path = self.asset_path(asset_name);
        if !path.is_file() {
            return Err(ContentError::AssetNotFoundError(path));
        }

        let model = Rc::new(ContentReader::open(&path, &self.config.root_directory)?.read_asset()?);
        info!("[MARIONETTE_CONTENT] Loaded {asset_name} from {path:?}");

        if self.config.cache_models {
            self.models.insert(asset_name.to_string(), model.clone());
        }
        Ok(model)
    }

    /// Forget a loaded model. Returns true if it was loaded.
    pub fn unload(&mut self, asset_name: &str) -> bool {
        self.models.remove(asset_name).is_some()
    }

    pub fn is_loaded(&self, asset_name: &str) -> bool {
        self.models.contains_key(asset_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::skinned_arm;
    use std::fs;

    #[test]
    pub fn test_load_and_cache() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("arm.gltf"),
            serde_json::to_vec(&skinned_arm()).unwrap(),
        )
        .unwrap();

        let mut manager = ContentManager::builder().root_directory(root.path()).build();
        let first = manager.load("arm").unwrap();
        let second = manager.load("arm").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.name, "arm");

        assert!(manager.unload("arm"));
        assert!(!manager.is_loaded("arm"));
        let third = manager.load("arm.gltf").unwrap();
        assert!(!Rc::ptr_eq(&first, &third));
    }

    #[test]
    pub fn test_no_cache() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("arm.gltf"),
            serde_json::to_vec(&skinned_arm()).unwrap(),
        )
        .unwrap();

        let mut manager = ContentManager::builder()
            .root_directory(root.path())
            .cache_models(false)
            .build();
        let first = manager.load("arm").unwrap();
        let second = manager.load("arm").unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert!(!manager.is_loaded("arm"));
    }

    #[test]
    pub fn test_missing_asset() {
        let root = tempfile::tempdir().unwrap();
        let mut manager = ContentManager::builder().root_directory(root.path()).build();
        let err = manager.load("nothing").unwrap_err();
        assert!(err.is_not_found_error());
    }

    #[test]
    pub fn test_config_file() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("content.json");
        fs::write(&path, r#"{ "rootDirectory": "assets" }"#).unwrap();

        let config = ContentConfig::load(&path).unwrap();
        assert_eq!(config.root_directory, PathBuf::from("assets"));
        assert!(config.cache_models);
    }
}
