use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use choreo_core::{ChoreoError, ChoreoResult};
use choreo_ir::CompiledMovie;

use crate::manifest::{ActorSettings, CameraSettings, Manifest};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const TIMELINE_FILE: &str = "timeline.json";
pub const TRANSFORM_FILE: &str = "transform.json";
pub const ANIMATION_FILE: &str = "animation.json";
pub const CAMERA_SETTINGS_FILE: &str = "camera_settings.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// What an export wrote.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub directory: PathBuf,
    pub manifest: Manifest,
    pub files: Vec<PathBuf>,
}

/// Writes compiled movies as folders of JSON files under one root.
pub struct MovieExporter {
    root: PathBuf,
    pretty: bool,
}

impl MovieExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder a movie called `name` is written to.
    pub fn movie_dir(&self, name: &str) -> PathBuf {
        self.root.join(folder_name(name))
    }

    /// Export `compiled` to `<root>/<movie>/`, replacing a previous export.
    pub fn export(&self, compiled: &CompiledMovie) -> ChoreoResult<ExportReport> {
        check_folder_names(compiled)?;
        let directory = self.movie_dir(&compiled.name);
        if directory.is_file() {
            return Err(ChoreoError::Export(format!(
                "{} exists and is not a directory",
                directory.display()
            )));
        }
        if directory.exists() {
            tracing::debug!("clearing previous export at {}", directory.display());
            std::fs::remove_dir_all(&directory)?;
        }
        std::fs::create_dir_all(&directory)?;

        let manifest = Manifest::for_movie(compiled)?;
        let mut files = Vec::new();
        files.push(self.write_json(&directory.join(MANIFEST_FILE), &manifest)?);
        files.push(self.write_json(&directory.join(TIMELINE_FILE), &compiled.timeline)?);

        for tracks in &compiled.actors {
            let dir = self.entity_dir(&directory, &tracks.actor.name)?;
            files.push(self.write_json(&dir.join(TRANSFORM_FILE), &tracks.transform)?);
            files.push(self.write_json(&dir.join(ANIMATION_FILE), &tracks.animation)?);
            files.push(self.write_json(
                &dir.join(SETTINGS_FILE),
                &ActorSettings::from(&tracks.actor),
            )?);
        }

        for tracks in &compiled.cameras {
            let dir = self.entity_dir(&directory, &tracks.camera.name)?;
            files.push(self.write_json(&dir.join(TRANSFORM_FILE), &tracks.transform)?);
            files.push(self.write_json(&dir.join(CAMERA_SETTINGS_FILE), &tracks.settings)?);
            files.push(self.write_json(
                &dir.join(SETTINGS_FILE),
                &CameraSettings::from(&tracks.camera),
            )?);
        }

        for light in &compiled.lights {
            let dir = self.entity_dir(&directory, &light.name)?;
            files.push(self.write_json(&dir.join(SETTINGS_FILE), light)?);
        }

        tracing::info!(
            "exported '{}' to {} ({} files, hash {})",
            compiled.name,
            directory.display(),
            files.len(),
            &manifest.content_hash[..12]
        );
        Ok(ExportReport {
            directory,
            manifest,
            files,
        })
    }

    fn entity_dir(&self, movie_dir: &Path, name: &str) -> ChoreoResult<PathBuf> {
        let dir = movie_dir.join(folder_name(name));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> ChoreoResult<PathBuf> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        std::fs::write(path, json)?;
        tracing::debug!("wrote {}", path.display());
        Ok(path.to_path_buf())
    }
}

/// Fail when two entities would share one folder after sanitizing.
fn check_folder_names(compiled: &CompiledMovie) -> ChoreoResult<()> {
    let names = compiled
        .actors
        .iter()
        .map(|a| &a.actor.name)
        .chain(compiled.cameras.iter().map(|c| &c.camera.name))
        .chain(compiled.lights.iter().map(|l| &l.name));
    let mut folders: HashMap<String, &str> = HashMap::new();
    for name in names {
        let folder = folder_name(name);
        if let Some(other) = folders.insert(folder.clone(), name) {
            return Err(ChoreoError::Export(format!(
                "'{}' and '{}' both export to folder '{}'",
                other, name, folder
            )));
        }
    }
    Ok(())
}

/// Filesystem-safe folder name for an entity or movie.
pub fn folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}
