//! Loading and saving `settings.toml`.
//!
//! - Whole-file saves regenerate the file with section comments
//! - `update_section` rewrites one table in place with `toml_edit`, leaving
//!   the rest of the file (including user comments) untouched
//! - Every write goes to `<file>.tmp` first and is renamed over the target

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table};

use super::settings::{ConfigSection, Settings};

/// Errors from reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to edit config: {0}")]
    Edit(#[from] toml_edit::TomlError),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings file and the in-memory `Settings`.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path`. Holds defaults until `load` or
    /// `load_or_create` is called.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory only until `save` or `update_section`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load an existing file. Missing keys take their defaults.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }
        let content = self.read_file()?;
        self.settings = self.parse(&content)?;
        Ok(())
    }

    /// Load the file, or write defaults if there is none.
    ///
    /// A file with unknown sections or keys, or with missing keys, is
    /// rewritten from the loaded settings.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            tracing::info!("Creating default config at {}", self.config_path.display());
            self.settings = Settings::default();
            return self.save();
        }

        let content = self.read_file()?;
        self.settings = self.parse(&content)?;

        let doc: DocumentMut = content.parse()?;
        if !self.matches_schema(&doc)? {
            tracing::debug!("Normalizing config {}", self.config_path.display());
            self.save()?;
        }
        Ok(())
    }

    /// Create the output, temp and logs folders.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        for dir in [self.output_folder(), self.temp_root(), self.logs_folder()] {
            fs::create_dir_all(&dir).map_err(|source| ConfigError::Write { path: dir, source })?;
        }
        Ok(())
    }

    pub fn output_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.output_folder)
    }

    pub fn temp_root(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.temp_root)
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Regenerate and write the whole file.
    pub fn save(&self) -> ConfigResult<()> {
        let mut output = String::from(
            "# Audio Batch Processor Configuration\n\
             # This file is auto-generated. Comments may be preserved on section updates.\n",
        );
        for section in ConfigSection::ALL {
            output.push_str(&format!(
                "\n# {}\n[{}]\n",
                section.comment(),
                section.table_name()
            ));
            output.push_str(&self.section_toml(section)?);
        }
        self.atomic_write(&output)
    }

    /// Write one section into the file on disk, keeping everything else.
    ///
    /// The file is re-read first so other sections keep their on-disk
    /// values even if the in-memory copy differs.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let mut doc = if self.config_path.exists() {
            self.read_file()?.parse::<DocumentMut>()?
        } else {
            DocumentMut::new()
        };

        let mut table = self.section_table(section)?;
        if let Some(existing) = doc.get(section.table_name()).and_then(Item::as_table) {
            // Keep the comment above the header
            *table.decor_mut() = existing.decor().clone();
        }
        doc[section.table_name()] = Item::Table(table);
        self.atomic_write(&doc.to_string())
    }

    fn read_file(&self) -> ConfigResult<String> {
        fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Read {
            path: self.config_path.clone(),
            source,
        })
    }

    fn parse(&self, content: &str) -> ConfigResult<Settings> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })
    }

    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let content = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
            ConfigSection::Processing => toml::to_string_pretty(&self.settings.processing)?,
            ConfigSection::Ui => toml::to_string_pretty(&self.settings.ui)?,
        };
        Ok(content)
    }

    fn section_table(&self, section: ConfigSection) -> ConfigResult<Table> {
        let doc: DocumentMut = self.section_toml(section)?.parse()?;
        Ok(doc.as_table().clone())
    }

    /// Whether `doc` has exactly the known sections and keys.
    fn matches_schema(&self, doc: &DocumentMut) -> ConfigResult<bool> {
        let known_sections = doc.iter().all(|(name, _)| {
            ConfigSection::ALL
                .iter()
                .any(|section| section.table_name() == name)
        });
        if !known_sections {
            return Ok(false);
        }

        for section in ConfigSection::ALL {
            let Some(on_disk) = doc.get(section.table_name()).and_then(Item::as_table) else {
                return Ok(false);
            };
            let expected = self.section_table(section)?;
            let same_keys = on_disk.len() == expected.len()
                && expected.iter().all(|(key, _)| on_disk.contains_key(key));
            if !same_keys {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn atomic_write(&self, content: &str) -> ConfigResult<()> {
        let write_err = |source| ConfigError::Write {
            path: self.config_path.clone(),
            source,
        };

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");
        {
            let mut file = fs::File::create(&temp_path).map_err(write_err)?;
            file.write_all(content.as_bytes()).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }
        fs::rename(&temp_path, &self.config_path).map_err(write_err)?;
        Ok(())
    }
}
