use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use glyphgrid::{
    App, AppSettings, CallbackHost, FontBank, FontRasterizer, FontRef, GlyphgridError,
    HeadlessDisplay, ProjectConfig, SolidRasterizer, TileRasterizer, block_size, link,
    load_project, scaffold_project,
};

mod demo;

#[derive(Parser, Debug)]
#[command(name = "glyphgrid", version)]
struct Cli {
    /// Project directory containing settings.json.
    project_dir: PathBuf,

    /// Scaffold a new project directory with default settings, then exit.
    #[arg(long)]
    create: bool,

    /// Stitch recorded frames into out/movie.mp4 (requires `ffmpeg` on
    /// PATH), then exit.
    #[arg(long)]
    movie: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if is_config_failure(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Configuration and usage problems exit 2; runtime failures exit 1.
fn is_config_failure(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<GlyphgridError>(),
        Some(GlyphgridError::Config(_)) | Some(GlyphgridError::Validation(_))
    )
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.create {
        scaffold_project(&cli.project_dir)?;
        eprintln!("created project at {}", cli.project_dir.display());
        return Ok(());
    }

    let config = load_project(&cli.project_dir)?;
    config.validate()?;

    if cli.movie {
        return stitch_movie(&config, &cli.project_dir);
    }
    run_demo(&config, &cli.project_dir)
}

fn run_demo(config: &ProjectConfig, project_dir: &Path) -> anyhow::Result<()> {
    let settings = AppSettings::from_config(config, project_dir);
    let rasterizer = build_rasterizer(config, project_dir)?;

    // Headless demo ticks are bounded so a project without a configured
    // quit frame still terminates.
    let max_ticks = config.quit.unwrap_or((config.fps as u64 * 10).max(30));
    let font = demo_font(config);
    let scene = demo::DemoScene::new(config.shape, font, max_ticks);

    let (producer, consumer) = link(64);
    let handle = CallbackHost::new(scene, producer).spawn();
    let app = App::new(settings, rasterizer, Box::new(HeadlessDisplay::new()), consumer);
    let summary = app.run(handle)?;
    tracing::info!(
        frames = summary.frames,
        tiles = summary.cache.rasterized,
        hits = summary.cache.hits,
        "demo finished"
    );
    Ok(())
}

fn demo_font(config: &ProjectConfig) -> FontRef {
    match config.fonts.first() {
        Some(spec) => {
            let size = spec.sizes.first().copied().unwrap_or(16);
            FontRef::new(spec.family.clone(), size)
        }
        None => FontRef::new("default", 16),
    }
}

fn build_rasterizer(
    config: &ProjectConfig,
    project_dir: &Path,
) -> anyhow::Result<Box<dyn TileRasterizer>> {
    let block = block_size(config.full_res, config.shape);
    if config.fonts.is_empty() {
        tracing::warn!("no fonts configured, falling back to solid blocks");
        return Ok(Box::new(SolidRasterizer::new(block, config.backcolor)));
    }
    let mut bank = FontBank::new();
    bank.load_manifest(project_dir, &config.fonts)?;
    Ok(Box::new(FontRasterizer::new(bank, block, config.backcolor)))
}

fn stitch_movie(config: &ProjectConfig, project_dir: &Path) -> anyhow::Result<()> {
    let out_dir = config.resolved_out_dir(project_dir);
    let pattern = out_dir.join("frame_%05d.png");
    let out_path = out_dir.join("movie.mp4");

    // The system ffmpeg binary keeps us free of native FFmpeg dev
    // header/lib requirements.
    let status = std::process::Command::new("ffmpeg")
        .arg("-y")
        .args(["-loglevel", "error"])
        .args(["-framerate", &config.fps.to_string()])
        .arg("-i")
        .arg(&pattern)
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
        .arg(&out_path)
        .status()
        .with_context(|| "failed to spawn ffmpeg (is it installed and on PATH?)")?;

    if !status.success() {
        anyhow::bail!("ffmpeg exited with status {status}");
    }
    eprintln!("wrote {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_scaffolds_then_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("demo");
        run(Cli {
            project_dir: project.clone(),
            create: true,
            movie: false,
        })
        .unwrap();
        assert!(project.join("settings.json").exists());

        let again = run(Cli {
            project_dir: project,
            create: true,
            movie: false,
        });
        assert!(again.is_err());
    }

    #[test]
    fn missing_project_is_a_config_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(Cli {
            project_dir: dir.path().join("nope"),
            create: false,
            movie: false,
        })
        .unwrap_err();
        assert!(is_config_failure(&err));
    }

    #[test]
    fn demo_runs_headless_on_a_scaffolded_project() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("demo");
        scaffold_project(&project).unwrap();

        let mut config = load_project(&project).unwrap();
        // Keep the test fast: a handful of ticks, no pacing.
        config.quit = Some(3);
        config.real_time = false;
        std::fs::write(
            project.join("settings.json"),
            serde_json::to_vec_pretty(&config).unwrap(),
        )
        .unwrap();

        run(Cli {
            project_dir: project,
            create: false,
            movie: false,
        })
        .unwrap();
    }
}
