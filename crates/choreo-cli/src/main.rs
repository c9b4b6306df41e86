mod demo;
mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use choreo_core::{ChoreoConfig, Diagnostic, DiagnosticSeverity};
use choreo_export::MovieExporter;
use choreo_ir::{CompiledMovie, MovieDefinition};
use choreo_plan::{PlanOptions, Planner};

const CONFIG_FILE: &str = "choreo.toml";

#[derive(Parser)]
#[command(
    name = "choreo",
    version,
    about = "Choreo: motion choreography compiler",
    long_about = "Choreo compiles declarative actor and camera scripts into per-frame\n\
                  transform, animation and camera tracks for an engine to play back."
)]
struct Cli {
    /// Path to a choreo.toml (default: ./choreo.toml when it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a movie file and export its tracks
    Compile {
        /// Path to the movie JSON file
        #[arg()]
        file: PathBuf,

        /// Export root (default: `project.output_dir` from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write minified JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Validate and compile a movie without writing anything
    Check {
        #[arg()]
        file: PathBuf,
    },
    /// Print the compiled state of one actor or camera
    Inspect {
        #[arg()]
        file: PathBuf,

        /// Actor or camera name
        #[arg(short, long)]
        entity: String,

        /// Frame to sample (default: print a summary of the whole track)
        #[arg(short, long)]
        frame: Option<u64>,
    },
    /// Recompile and re-export whenever the movie file changes
    Watch {
        #[arg()]
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a default choreo.toml and a demo movie
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Show version and effective settings
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = load_config(cli.config.as_deref())?;
    init_logging(&config.logging.level);
    if let Some(path) = &config_path {
        tracing::debug!("loaded config from {}", path.display());
    }

    match cli.command {
        Commands::Compile {
            file,
            output,
            compact,
        } => cmd_compile(&config, file, output, compact),
        Commands::Check { file } => cmd_check(&config, file),
        Commands::Inspect {
            file,
            entity,
            frame,
        } => cmd_inspect(&config, file, &entity, frame),
        Commands::Watch { file, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.project.output_dir));
            watch::run(file, output, planner_for(&config))
        }
        Commands::Init { path } => cmd_init(&path),
        Commands::Info => cmd_info(&config, config_path.as_deref()),
    }
}

/// `RUST_LOG` wins, then `[logging] level`, then `info`.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<(ChoreoConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(CONFIG_FILE);
            if !local.is_file() {
                return Ok((ChoreoConfig::default(), None));
            }
            local
        }
    };
    let config = ChoreoConfig::load_from_file(&path)
        .with_context(|| format!("failed to load config: {}", path.display()))?;
    Ok((config, Some(path)))
}

fn planner_for(config: &ChoreoConfig) -> Planner {
    Planner::new(PlanOptions::from(config))
}

pub(crate) fn load_movie(file: &Path) -> Result<MovieDefinition> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    MovieDefinition::from_json_str(&source)
        .with_context(|| format!("failed to parse movie: {}", file.display()))
}

fn compile_file(config: &ChoreoConfig, file: &Path) -> Result<CompiledMovie> {
    let movie = load_movie(file)?;
    planner_for(config)
        .compile(&movie)
        .with_context(|| format!("failed to compile {}", file.display()))
}

pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        let icon = match diag.severity {
            DiagnosticSeverity::Warning => "⚠️",
            DiagnosticSeverity::Info => "ℹ️",
        };
        println!("   {} {}", icon, diag);
    }
}

fn cmd_compile(
    config: &ChoreoConfig,
    file: PathBuf,
    output: Option<PathBuf>,
    compact: bool,
) -> Result<()> {
    println!("🎬 Compiling {}", file.display());
    let compiled = compile_file(config, &file)?;
    print_diagnostics(&compiled.diagnostics);

    let root = output.unwrap_or_else(|| PathBuf::from(&config.project.output_dir));
    let report = MovieExporter::new(&root)
        .with_pretty(!compact)
        .export(&compiled)
        .with_context(|| format!("failed to export to {}", root.display()))?;

    println!(
        "   ✓ {} frames at {} ({} actors, {} cameras)",
        compiled.duration_frames + 1,
        compiled.fps,
        compiled.actors.len(),
        compiled.cameras.len()
    );
    println!(
        "   ✓ Wrote {} files to {}",
        report.files.len(),
        report.directory.display()
    );
    println!("   Hash: {}", report.manifest.content_hash);
    Ok(())
}

fn cmd_check(config: &ChoreoConfig, file: PathBuf) -> Result<()> {
    println!("🔍 Checking {}", file.display());

    let movie = load_movie(&file)?;
    println!("   ✓ Parse OK");

    choreo_ir::validate_movie(&movie).map_err(|errors| {
        let msgs: Vec<String> = errors.into_iter().map(|e| e.to_string()).collect();
        anyhow::anyhow!("Validation errors:\n  {}", msgs.join("\n  "))
    })?;
    println!("   ✓ Validate OK");

    let compiled = planner_for(config)
        .compile(&movie)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("   ✓ Compile OK");
    print_diagnostics(&compiled.diagnostics);

    let warnings = compiled
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Warning)
        .count();
    println!();
    if warnings == 0 {
        println!("   ✅ No problems found.");
    } else {
        println!("   ✅ Compiled with {} warning(s).", warnings);
    }
    Ok(())
}

fn cmd_inspect(
    config: &ChoreoConfig,
    file: PathBuf,
    entity: &str,
    frame: Option<u64>,
) -> Result<()> {
    let compiled = compile_file(config, &file)?;
    if let Some(frame) = frame {
        if frame > compiled.duration_frames {
            println!(
                "   ⚠️ frame {} is past the last frame ({}); showing held values",
                frame, compiled.duration_frames
            );
        }
    }

    if let Some(tracks) = compiled.actor(entity) {
        println!("🏃 Actor '{}'", entity);
        match frame {
            Some(frame) => {
                let transform = tracks
                    .transform
                    .sample(frame)
                    .with_context(|| format!("'{}' has no transform keys", entity))?;
                println!("   Frame:     {} ({})", frame, compiled.fps.timecode(frame));
                println!("   Location:  {}", transform.location);
                println!(
                    "   Rotation:  pitch {:.2}  yaw {:.2}  roll {:.2}",
                    transform.rotation.pitch, transform.rotation.yaw, transform.rotation.roll
                );
                match tracks.animation.active_at(frame) {
                    Some(segment) => println!(
                        "   Animation: {} x{} (frames {}..={})",
                        segment.name,
                        segment.speed_multiplier,
                        segment.start_frame,
                        segment.end_frame
                    ),
                    None => println!("   Animation: none"),
                }
            }
            None => {
                println!("   Keys:      {}", tracks.transform.len());
                let keys = tracks.transform.keys();
                if let (Some(first), Some(last)) = (keys.first(), keys.last()) {
                    println!("   Start:     {}", first.location());
                    println!("   End:       {} (frame {})", last.location(), last.frame);
                }
                for segment in tracks.animation.keys() {
                    println!(
                        "   {:>5}..={:<5} {} x{}",
                        segment.start_frame,
                        segment.end_frame,
                        segment.name,
                        segment.speed_multiplier
                    );
                }
            }
        }
        return Ok(());
    }

    if let Some(tracks) = compiled.camera(entity) {
        println!("🎥 Camera '{}'", entity);
        match frame {
            Some(frame) => {
                let transform = tracks
                    .transform
                    .sample(frame)
                    .with_context(|| format!("'{}' has no transform keys", entity))?;
                println!("   Frame:     {} ({})", frame, compiled.fps.timecode(frame));
                println!("   Location:  {}", transform.location);
                println!(
                    "   Rotation:  pitch {:.2}  yaw {:.2}",
                    transform.rotation.pitch, transform.rotation.yaw
                );
                let settings = tracks.settings.keys().iter().rev().find(|k| k.frame <= frame);
                if let Some(settings) = settings {
                    println!("   Focal:     {:.2} mm", settings.focal_length);
                    if let Some(focus) = settings.focus_distance {
                        println!("   Focus:     {:.1} cm", focus);
                    }
                }
            }
            None => {
                println!("   Keys:      {}", tracks.transform.len());
                let focal = tracks.settings.keys().iter().map(|k| k.focal_length);
                let (min, max) = focal.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
                    (lo.min(f), hi.max(f))
                });
                if min.is_finite() {
                    println!("   Focal:     {:.2}..{:.2} mm", min, max);
                }
            }
        }
        return Ok(());
    }

    anyhow::bail!("no actor or camera named '{}' in {}", entity, file.display())
}

fn cmd_init(path: &Path) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);
    let demo_path = path.join(demo::DEMO_FILE);
    if config_path.exists() {
        anyhow::bail!("'{}' already exists", config_path.display());
    }
    if demo_path.exists() {
        anyhow::bail!("'{}' already exists", demo_path.display());
    }

    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))?;

    let config = ChoreoConfig::default();
    config
        .save_to_file(&config_path)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    let movie = demo::demo_movie(&config);
    let json = movie.to_json_string()?;
    std::fs::write(&demo_path, json)
        .with_context(|| format!("failed to write {}", demo_path.display()))?;

    println!("✨ Initialized choreo project in {}", path.display());
    println!("   {}", config_path.display());
    println!("   {}", demo_path.display());
    println!();
    println!("   Next: choreo compile {}", demo_path.display());
    Ok(())
}

fn cmd_info(config: &ChoreoConfig, config_path: Option<&Path>) -> Result<()> {
    let options = PlanOptions::from(config);
    println!("🎬 Choreo");
    println!("   Version:   {}", env!("CARGO_PKG_VERSION"));
    match config_path {
        Some(path) => println!("   Config:    {}", path.display()),
        None => println!("   Config:    defaults (no {} found)", CONFIG_FILE),
    }
    println!("   Output:    {}", config.project.output_dir);
    println!("   Corridor:  {:?}", options.corridor_anchor);
    println!("   Spline:    {} samples per segment", options.samples_per_segment);
    println!(
        "   Zoom:      {}..{} mm, occupancy {}",
        options.min_focal_length, options.max_focal_length, options.default_occupancy
    );
    println!("   Sensor:    {} mm", config.camera.sensor_height_mm);
    Ok(())
}
