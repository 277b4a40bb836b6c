use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{FrameRange, GridShape, PixelSize, Rgba8};
use crate::foundation::error::{GlyphgridError, GlyphgridResult};

/// One entry of the project's font manifest.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// Family name dots reference through `FontRef`.
    pub family: String,
    /// Font file path, resolved relative to the project directory.
    pub path: PathBuf,
    /// Point sizes the scene intends to use (advisory; rasterization accepts
    /// any size).
    #[serde(default)]
    pub sizes: Vec<u32>,
}

/// Parsed `settings.json` of a project directory.
///
/// Every field has a default, so a minimal project can ship an empty object
/// and override selectively.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Grid size in cells (columns x rows).
    pub shape: GridShape,
    /// Internal canvas resolution in pixels.
    pub full_res: PixelSize,
    /// Window/presentation size in pixels.
    pub render_size: PixelSize,
    pub fps: u32,
    pub backcolor: Rgba8,
    /// Frame range captured to PNG files, if any.
    pub record: Option<FrameRange>,
    /// Auto-stop after this frame, if set.
    pub quit: Option<u64>,
    /// When set, the consumer does not block waiting for producer frames.
    pub real_time: bool,
    /// Frame capture directory, resolved relative to the project directory.
    pub out_dir: PathBuf,
    pub fonts: Vec<FontSpec>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            shape: GridShape { cols: 16, rows: 8 },
            full_res: PixelSize::new(512, 512),
            render_size: PixelSize::new(720, 720),
            fps: 30,
            backcolor: Rgba8::BLACK,
            record: None,
            quit: None,
            real_time: false,
            out_dir: PathBuf::from("out"),
            fonts: Vec::new(),
        }
    }
}

impl ProjectConfig {
    pub fn validate(&self) -> GlyphgridResult<()> {
        if self.shape.cols == 0 || self.shape.rows == 0 {
            return Err(GlyphgridError::validation("shape must be non-empty"));
        }
        if self.full_res.width == 0 || self.full_res.height == 0 {
            return Err(GlyphgridError::validation("full_res must be non-zero"));
        }
        if self.render_size.width == 0 || self.render_size.height == 0 {
            return Err(GlyphgridError::validation("render_size must be non-zero"));
        }
        if self.fps == 0 {
            return Err(GlyphgridError::validation("fps must be > 0"));
        }
        Ok(())
    }

    /// Capture directory with a relative `out_dir` anchored at the project.
    pub fn resolved_out_dir(&self, project_dir: &Path) -> PathBuf {
        if self.out_dir.is_absolute() {
            self.out_dir.clone()
        } else {
            project_dir.join(&self.out_dir)
        }
    }
}

/// Load and validate `settings.json` from a project directory.
///
/// Missing or malformed settings are a startup-time `Config` error; the tool
/// prints the diagnostic and aborts rather than failing mid-frame.
pub fn load_project(project_dir: &Path) -> GlyphgridResult<ProjectConfig> {
    if !project_dir.is_dir() {
        return Err(GlyphgridError::config(format!(
            "project directory '{}' does not exist",
            project_dir.display()
        )));
    }
    let settings = project_dir.join("settings.json");
    let raw = std::fs::read_to_string(&settings).map_err(|e| {
        GlyphgridError::config(format!("read settings '{}': {e}", settings.display()))
    })?;
    let config: ProjectConfig = serde_json::from_str(&raw).map_err(|e| {
        GlyphgridError::config(format!("malformed settings '{}': {e}", settings.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Scaffold a new project directory: default `settings.json` plus the capture
/// directory.
pub fn scaffold_project(project_dir: &Path) -> GlyphgridResult<()> {
    let settings = project_dir.join("settings.json");
    if settings.exists() {
        return Err(GlyphgridError::config(format!(
            "'{}' already exists, refusing to overwrite",
            settings.display()
        )));
    }
    std::fs::create_dir_all(project_dir)
        .with_context(|| format!("create project dir '{}'", project_dir.display()))?;

    let config = ProjectConfig::default();
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| GlyphgridError::config(format!("serialize default settings: {e}")))?;
    std::fs::write(&settings, json)
        .with_context(|| format!("write settings '{}'", settings.display()))?;
    std::fs::create_dir_all(config.resolved_out_dir(project_dir))
        .with_context(|| format!("create out dir under '{}'", project_dir.display()))?;
    Ok(())
}
