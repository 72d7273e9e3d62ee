//! Name/path parsing for scene identifiers.
//!
//! Every parser is total over its input: a string either matches a known
//! naming convention and yields a [`ParsedReference`](crate::types::ParsedReference),
//! or it yields `None`. Malformed input never produces an error.
//!
//! ## Conventions
//!
//! ```text
//! /Game/Assets/<AssetType>/<Asset>[/<Step>]        asset path (step defaults to MDL)
//! /Game/Scenes/<Scene>/<Shot>/<Step>[/...]         shot path
//! <Scene>_<Shot>_<Step>[_sub]                      sequence name
//! <Scene>_<Shot>[_<Step or Task>].<mov|mp4>        rendered movie
//! <Name> v<digits>                                 versioned display name
//! ```
//!
//! The fixed markers live in [`NamingConvention`], whose `Default` carries
//! the studio constants.

pub mod path;
pub mod name;
pub mod version;

use serde::{Deserialize, Serialize};

pub use version::{get_version, set_version, up_version, split_version};
pub use name::{parse_entity_url, sanitize_asset_name, strip_publish_version};

/// Error raised when a naming convention cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    /// A marker or default is empty.
    #[error("Naming convention field '{0}' must not be empty")]
    EmptyField(&'static str),
    /// A marker contains a path separator.
    #[error("Naming convention field '{0}' must be a single path segment")]
    NotASegment(&'static str),
}

/// Fixed markers and defaults shared by all parsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Content root mount point (`Game`).
    pub content_root: String,
    /// Folder holding assets under the content root (`Assets`).
    pub assets_dir: String,
    /// Folder holding scenes under the content root (`Scenes`).
    pub scenes_dir: String,
    /// Step used when an asset path does not name one.
    pub default_asset_step: String,
    /// Step used when a rendered movie name does not name one.
    pub default_shot_step: String,
    /// Suffix marking a per-shot sub-sequence.
    pub subsequence_suffix: String,
    /// Accepted rendered-media extensions, lower case, without dot.
    pub media_extensions: Vec<String>,
    /// Index of the scene segment in a level path split on `/`.
    pub level_offset: usize,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            content_root: "Game".to_string(),
            assets_dir: "Assets".to_string(),
            scenes_dir: "Scenes".to_string(),
            default_asset_step: "MDL".to_string(),
            default_shot_step: "UE".to_string(),
            subsequence_suffix: "_sub".to_string(),
            media_extensions: vec!["mov".to_string(), "mp4".to_string()],
            level_offset: 3,
        }
    }
}

impl NamingConvention {
    /// Load the convention from environment variables, falling back to the
    /// studio defaults.
    ///
    /// - `PIPELINE_CONTENT_ROOT`
    /// - `PIPELINE_ASSETS_DIR`
    /// - `PIPELINE_SCENES_DIR`
    /// - `PIPELINE_DEFAULT_ASSET_STEP`
    /// - `PIPELINE_DEFAULT_SHOT_STEP`
    /// - `PIPELINE_SUBSEQUENCE_SUFFIX`
    /// - `PIPELINE_MEDIA_EXTENSIONS` (comma separated)
    /// - `PIPELINE_LEVEL_OFFSET`
    pub fn from_env() -> Result<Self, NamingError> {
        let defaults = Self::default();
        let var = |key: &str, default: String| std::env::var(key).unwrap_or(default);

        let convention = Self {
            content_root: var("PIPELINE_CONTENT_ROOT", defaults.content_root),
            assets_dir: var("PIPELINE_ASSETS_DIR", defaults.assets_dir),
            scenes_dir: var("PIPELINE_SCENES_DIR", defaults.scenes_dir),
            default_asset_step: var("PIPELINE_DEFAULT_ASSET_STEP", defaults.default_asset_step),
            default_shot_step: var("PIPELINE_DEFAULT_SHOT_STEP", defaults.default_shot_step),
            subsequence_suffix: var("PIPELINE_SUBSEQUENCE_SUFFIX", defaults.subsequence_suffix),
            media_extensions: std::env::var("PIPELINE_MEDIA_EXTENSIONS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                        .filter(|ext| !ext.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.media_extensions),
            level_offset: std::env::var("PIPELINE_LEVEL_OFFSET")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.level_offset),
        };

        convention.validate()?;
        Ok(convention)
    }

    /// Check that markers are usable single segments and defaults are set.
    pub fn validate(&self) -> Result<(), NamingError> {
        let segments = [
            ("content_root", &self.content_root),
            ("assets_dir", &self.assets_dir),
            ("scenes_dir", &self.scenes_dir),
            ("default_asset_step", &self.default_asset_step),
            ("default_shot_step", &self.default_shot_step),
        ];
        for (field, value) in segments {
            if value.is_empty() {
                return Err(NamingError::EmptyField(field));
            }
            if value.contains('/') {
                return Err(NamingError::NotASegment(field));
            }
        }
        if self.media_extensions.is_empty() {
            return Err(NamingError::EmptyField("media_extensions"));
        }
        Ok(())
    }

    /// Whether `ext` (without dot, any case) is an accepted media extension.
    pub fn is_media_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.media_extensions.iter().any(|e| *e == ext)
    }
}
