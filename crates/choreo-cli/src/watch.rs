//! `choreo watch`: recompile and re-export on every save.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Result;
use notify::{EventKind, RecursiveMode, Watcher};

use choreo_export::MovieExporter;
use choreo_plan::{CacheKey, CompileCache, Planner};

struct WatchState {
    cache: CompileCache,
    exporter: MovieExporter,
    last_key: Option<CacheKey>,
}

impl WatchState {
    fn new(output: PathBuf, planner: Planner) -> Self {
        Self {
            cache: CompileCache::new(planner),
            exporter: MovieExporter::new(output),
            last_key: None,
        }
    }

    /// Recompile and export `file`. Only the latest compile stays cached.
    fn rebuild(&mut self, file: &Path) -> Result<()> {
        let movie = crate::load_movie(file)?;
        let key = self.cache.key_for(&movie)?;
        if self.last_key == Some(key) {
            tracing::debug!("{} unchanged ({})", file.display(), key);
            return Ok(());
        }
        if let Some(previous) = self.last_key.take() {
            self.cache.invalidate(&previous);
        }

        let compiled = self.cache.get_or_compile(&movie)?;
        crate::print_diagnostics(&compiled.diagnostics);
        let report = self.exporter.export(&compiled)?;
        self.last_key = Some(key);
        println!(
            "   ✓ {} frames exported to {}",
            compiled.duration_frames + 1,
            report.directory.display()
        );
        Ok(())
    }
}

pub fn run(file: PathBuf, output: PathBuf, planner: Planner) -> Result<()> {
    let mut state = WatchState::new(output, planner);

    println!("🎬 Compiling {}", file.display());
    if let Err(e) = state.rebuild(&file) {
        println!("   ✗ {:#}", e);
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })?;
    let dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    println!("👀 Watching {} (Ctrl+C to stop)", file.display());

    let target = file.file_name().map(|n| n.to_os_string());
    for res in rx {
        match res {
            Ok(event) => {
                let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == target);
                if !relevant {
                    continue;
                }
                println!("🔄 File changed, recompiling...");
                if let Err(e) = state.rebuild(&file) {
                    println!("   ✗ Recompile failed: {:#}", e);
                }
            }
            Err(e) => tracing::warn!("watch error: {:?}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo_core::ChoreoConfig;
    use choreo_plan::PlanOptions;

    #[test]
    fn test_rebuild_keeps_only_latest_compile() {
        let dir = std::env::temp_dir().join(format!("choreo_watch_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("movie.json");

        let mut config = ChoreoConfig::default();
        let write = |config: &ChoreoConfig| {
            let json = crate::demo::demo_movie(config).to_json_string().unwrap();
            std::fs::write(&file, json).unwrap();
        };
        let mut state = WatchState::new(dir.join("out"), Planner::new(PlanOptions::default()));

        write(&config);
        state.rebuild(&file).unwrap();
        assert_eq!(state.cache.len(), 1);

        config.project.default_fps = 24.0;
        write(&config);
        state.rebuild(&file).unwrap();
        assert_eq!(state.cache.len(), 1);

        config.camera.default_focal_length = 50.0;
        write(&config);
        state.rebuild(&file).unwrap();
        state.rebuild(&file).unwrap();
        assert_eq!(state.cache.len(), 1);
        assert!(dir.join("out").join("Demo").join("manifest.json").is_file());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
