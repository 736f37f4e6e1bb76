//! A collection of configuration models, by architecture.

use std::{collections::BTreeMap, path::Path};

use crate::{
    misc::log::targets::{self},
    model::{cnf::CnfModel, preset::PresetList, rsf::RsfModel, ConfigurationModel},
    types::err::{self, ErrorKind},
};

/// Extensions of model files, with RSF models preferred.
const MODEL_EXTENSIONS: [&str; 2] = ["model", "cnf"];

/// Configuration models, by architecture, and the main architecture.
#[derive(Default)]
pub struct ModelContainer {
    models: BTreeMap<String, Box<dyn ConfigurationModel>>,
    main: Option<String>,
}

impl ModelContainer {
    /// Loads every model of the directory `dir`.
    ///
    /// Files are taken in order of name, RSF models first, and the first model of an architecture is kept.
    pub fn load_models(dir: &Path) -> Result<Self, ErrorKind> {
        if !dir.is_dir() {
            return Err(err::ModelError::MissingDirectory(dir.display().to_string()).into());
        }

        let mut paths = Vec::default();
        for extension in MODEL_EXTENSIONS {
            let pattern = format!("{}/*.{extension}", dir.display());
            let entries = match glob::glob(&pattern) {
                Ok(entries) => entries,
                Err(_) => return Err(err::ModelError::MissingDirectory(dir.display().to_string()).into()),
            };
            let mut found: Vec<_> = entries.flatten().collect();
            found.sort();
            paths.extend(found);
        }

        let mut container = ModelContainer::default();
        for path in paths {
            let Some(arch) = path.file_stem().map(|stem| stem.to_string_lossy().to_string()) else {
                continue;
            };
            if container.models.contains_key(&arch) {
                continue;
            }
            match load_model_file(&path) {
                Ok(model) => container.insert(model),
                Err(e) => log::error!(target: targets::MODEL, "Skipped {}: {e}", path.display()),
            }
        }

        match container.models.is_empty() {
            true => Err(err::ModelError::NoModels(dir.display().to_string()).into()),
            false => {
                log::info!(target: targets::MODEL, "Found {} models", container.models.len());
                Ok(container)
            }
        }
    }

    /// Loads the model of architecture `arch` from the directory `dir`.
    pub fn load_model(dir: &Path, arch: &str) -> Result<Self, ErrorKind> {
        let mut container = ModelContainer::default();

        for extension in MODEL_EXTENSIONS {
            let path = dir.join(format!("{arch}.{extension}"));
            if path.exists() {
                container.insert(load_model_file(&path)?);
                return Ok(container);
            }
        }

        Err(err::ModelError::MissingArchitecture(arch.to_string()).into())
    }

    /// Adds `model`, replacing any model of the same name.
    pub fn insert(&mut self, model: Box<dyn ConfigurationModel>) {
        self.models.insert(model.name().to_string(), model);
    }

    pub fn lookup(&self, arch: &str) -> Option<&dyn ConfigurationModel> {
        self.models.get(arch).map(|model| model.as_ref())
    }

    /// Sets the main architecture, which must have a model.
    pub fn set_main(&mut self, arch: &str) -> Result<(), ErrorKind> {
        match self.models.contains_key(arch) {
            true => {
                self.main = Some(arch.to_string());
                Ok(())
            }
            false => Err(err::ModelError::MissingArchitecture(arch.to_string()).into()),
        }
    }

    pub fn main_arch(&self) -> Option<&str> {
        self.main.as_deref()
    }

    /// The model of the main architecture, or with no main architecture set the first model.
    pub fn main_model(&self) -> Option<&dyn ConfigurationModel> {
        match &self.main {
            Some(arch) => self.lookup(arch),
            None => self.models.values().next().map(|model| model.as_ref()),
        }
    }

    /// Models, in order of architecture.
    pub fn models(&self) -> impl Iterator<Item = &dyn ConfigurationModel> {
        self.models
            .values()
            .map(|model| -> &dyn ConfigurationModel { model.as_ref() })
    }

    pub fn architectures(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(|arch| arch.as_str())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Forces the features of `whitelist` on, and of `blacklist` off, in every model.
    pub fn apply_presets(&mut self, whitelist: &PresetList, blacklist: &PresetList) {
        for model in self.models.values_mut() {
            for feature in whitelist.iter() {
                model.add_feature_to_whitelist(feature);
            }
            for feature in blacklist.iter() {
                match feature.strip_prefix('!') {
                    Some(feature) => model.add_feature_to_blacklist(feature),
                    None => model.add_feature_to_whitelist(feature),
                }
            }
        }
    }
}

/// The model of the file at `path`, by extension.
pub fn load_model_file(path: &Path) -> Result<Box<dyn ConfigurationModel>, ErrorKind> {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("model") => Ok(Box::new(RsfModel::read_file(path)?)),
        Some("cnf") => Ok(Box::new(CnfModel::read_file(path)?)),
        _ => Err(err::ModelError::UnknownFormat(path.display().to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("undertaker_models_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loading() {
        let dir = model_dir("loading");
        std::fs::write(dir.join("x86.model"), "Item A boolean\n").unwrap();
        std::fs::write(dir.join("x86.cnf"), "c var CONFIG_A 1\np cnf 1 0\n").unwrap();
        std::fs::write(dir.join("arm.cnf"), "c sym A 1\nc var CONFIG_A 1\np cnf 1 1\n1 0\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "").unwrap();

        let mut container = ModelContainer::load_models(&dir).unwrap();
        assert_eq!(container.architectures().collect::<Vec<_>>(), vec!["arm", "x86"]);
        assert!(container.lookup("x86").is_some_and(|model| model.base().is_none()));
        assert!(container.lookup("arm").is_some_and(|model| model.base().is_some()));
        assert_eq!(container.main_model().map(|model| model.name()), Some("arm"));

        assert!(container.set_main("x86").is_ok());
        assert_eq!(container.main_model().map(|model| model.name()), Some("x86"));
        assert!(container.set_main("mips").is_err());

        let single = ModelContainer::load_model(&dir, "arm").unwrap();
        assert_eq!(single.len(), 1);
        assert!(ModelContainer::load_model(&dir, "mips").is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_models() {
        let dir = model_dir("missing");
        assert_eq!(
            ModelContainer::load_models(&dir).err(),
            Some(ErrorKind::Model(err::ModelError::NoModels(dir.display().to_string())))
        );
        let absent = dir.join("absent");
        assert!(matches!(
            ModelContainer::load_models(&absent),
            Err(ErrorKind::Model(err::ModelError::MissingDirectory(_)))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn presets() {
        let mut container = ModelContainer::default();
        container.insert(Box::new(RsfModel::read("x86", "Item A boolean\n".as_bytes()).unwrap()));

        let mut whitelist = PresetList::default();
        whitelist.add_to_whitelist("CONFIG_A");
        let mut blacklist = PresetList::default();
        blacklist.add_to_blacklist("CONFIG_B");
        container.apply_presets(&whitelist, &blacklist);

        let model = container.lookup("x86").unwrap();
        assert_eq!(model.whitelist(), ["CONFIG_A".to_string()].as_slice());
        assert_eq!(model.blacklist(), ["CONFIG_B".to_string()].as_slice());
    }
}
