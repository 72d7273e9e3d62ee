//! Slash-delimited content path parsers.

use crate::types::ParsedReference;
use super::NamingConvention;

impl NamingConvention {
    /// Parse an asset content path.
    ///
    /// `/Game/Assets/Prop/SM_Gun` gives `("Prop", "SM_Gun", "MDL")`,
    /// `/Game/Assets/Prop/SM_Gun/LAY` gives `("Prop", "SM_Gun", "LAY")`.
    /// The root markers are compared case-insensitively.
    pub fn parse_asset_path(&self, path: &str) -> Option<ParsedReference> {
        let rest = self.segments_under(path, &self.assets_dir)?;

        let (asset_type, code) = match rest.as_slice() {
            [asset_type, code, ..] if !asset_type.is_empty() && !code.is_empty() => (*asset_type, *code),
            _ => return None,
        };
        let step = rest
            .get(2)
            .copied()
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_asset_step.as_str());

        Some(ParsedReference::asset(asset_type, code, step))
    }

    /// Parse a shot content path: `/Game/Scenes/<scene>/<shot>/<step>`.
    ///
    /// Fewer than three segments after the scenes marker never match;
    /// deeper paths (objects inside the step folder) use the first three.
    pub fn parse_shot_path(&self, path: &str) -> Option<ParsedReference> {
        let rest = self.segments_under(path, &self.scenes_dir)?;

        match rest.as_slice() {
            [scene, shot, step, ..] if !scene.is_empty() && !shot.is_empty() && !step.is_empty() => {
                Some(ParsedReference::shot(*scene, *shot, *step))
            }
            _ => None,
        }
    }

    /// Parse the path of a level/map into a shot reference.
    ///
    /// Takes the three segments at `level_offset` as `(scene, shot, step)`
    /// without checking the root markers.
    pub fn parse_level_path(&self, path: &str) -> Option<ParsedReference> {
        let segments: Vec<&str> = path.split('/').collect();
        let end = self.level_offset.checked_add(3)?;
        let window = segments.get(self.level_offset..end)?;

        match window {
            [scene, shot, step] if !scene.is_empty() && !shot.is_empty() && !step.is_empty() => {
                Some(ParsedReference::shot(*scene, *shot, *step))
            }
            _ => None,
        }
    }

    /// Try the asset convention, then the shot convention.
    pub fn parse_object_path(&self, path: &str) -> Option<ParsedReference> {
        self.parse_asset_path(path)
            .or_else(|| self.parse_shot_path(path))
    }

    /// Segments following `/<content_root>/<dir>/`, or `None` when the path
    /// is not rooted there.
    fn segments_under<'a>(&self, path: &'a str, dir: &str) -> Option<Vec<&'a str>> {
        let mut segments = path.split('/');

        if !segments.next()?.is_empty() {
            return None;
        }
        if !segments.next()?.eq_ignore_ascii_case(&self.content_root) {
            return None;
        }
        if !segments.next()?.eq_ignore_ascii_case(dir) {
            return None;
        }

        Some(segments.collect())
    }
}
