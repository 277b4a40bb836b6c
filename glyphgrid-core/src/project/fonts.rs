use std::collections::HashMap;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::foundation::error::{GlyphgridError, GlyphgridResult};
use crate::project::config::FontSpec;

/// Loaded fonts by family name.
///
/// fontdue parses a font once and rasterizes at any pixel size, so the bank
/// keys on family only; the size lives in each dot's `FontRef`.
#[derive(Default)]
pub struct FontBank {
    fonts: HashMap<String, Font>,
}

impl FontBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Parse already-loaded font bytes under a family name.
    pub fn load_bytes(&mut self, family: impl Into<String>, bytes: &[u8]) -> GlyphgridResult<()> {
        let family = family.into();
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| GlyphgridError::config(format!("parse font '{family}': {e}")))?;
        self.fonts.insert(family, font);
        Ok(())
    }

    /// Load one manifest entry, resolving a relative path against
    /// `project_dir`.
    pub fn load(&mut self, project_dir: &Path, spec: &FontSpec) -> GlyphgridResult<()> {
        let path = if spec.path.is_absolute() {
            spec.path.clone()
        } else {
            project_dir.join(&spec.path)
        };
        let bytes = std::fs::read(&path).map_err(|e| {
            GlyphgridError::config(format!("read font file '{}': {e}", path.display()))
        })?;
        self.load_bytes(spec.family.clone(), &bytes)
    }

    /// Load the whole font manifest of a project.
    pub fn load_manifest(&mut self, project_dir: &Path, specs: &[FontSpec]) -> GlyphgridResult<()> {
        for spec in specs {
            self.load(project_dir, spec)?;
        }
        Ok(())
    }

    pub fn get(&self, family: &str) -> Option<&Font> {
        self.fonts.get(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_font_file_is_a_config_error() {
        let mut bank = FontBank::new();
        let spec = FontSpec {
            family: "mono".to_string(),
            path: PathBuf::from("does-not-exist.ttf"),
            sizes: vec![8],
        };
        let err = bank.load(Path::new("/tmp"), &spec).unwrap_err();
        assert!(matches!(err, GlyphgridError::Config(_)));
    }

    #[test]
    fn garbage_bytes_are_a_config_error() {
        let mut bank = FontBank::new();
        let err = bank.load_bytes("mono", b"not a font").unwrap_err();
        assert!(matches!(err, GlyphgridError::Config(_)));
    }
}
