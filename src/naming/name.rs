//! Underscore-delimited name parsers and name sanitising helpers.

use regex_lite::Regex;
use std::sync::OnceLock;

use crate::types::ParsedReference;
use super::NamingConvention;

/// `.v001`-style publish version token.
fn publish_version_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\.v[0-9]{3,}").expect("static regex"))
}

impl NamingConvention {
    /// Parse a shot sub-sequence name: `<scene>_<shot>_<step>[<suffix>]`.
    ///
    /// `SCN_010_LAY_sub` gives `("SCN", "SCN_010", "LAY")`. Only one trailing
    /// suffix is removed; any other token count is no match.
    pub fn parse_sequence_name(&self, name: &str) -> Option<ParsedReference> {
        let name = if self.subsequence_suffix.is_empty() {
            name
        } else {
            name.strip_suffix(self.subsequence_suffix.as_str()).unwrap_or(name)
        };

        let parts: Vec<&str> = name.split('_').collect();
        match parts.as_slice() {
            [scene, shot, step] if !scene.is_empty() && !shot.is_empty() && !step.is_empty() => {
                Some(ParsedReference::shot(*scene, format!("{}_{}", scene, shot), *step))
            }
            _ => None,
        }
    }

    /// Parse a rendered movie file name: `<scene>_<shot>[_<hint>].<ext>`.
    ///
    /// Directories are ignored and the extension must be in
    /// `media_extensions`. The optional third part is both the step hint and
    /// the task name guess, since studios name movies after either; without
    /// it the step falls back to `default_shot_step` and there is no task hint.
    pub fn parse_media_file(&self, file: &str) -> Option<ParsedReference> {
        let file_name = file.rsplit(['/', '\\']).next().unwrap_or(file);
        let (stem, ext) = file_name.rsplit_once('.')?;
        if !self.is_media_extension(ext) {
            return None;
        }

        let parts: Vec<&str> = stem.splitn(3, '_').collect();
        let (scene, shot) = match parts.as_slice() {
            [scene, shot, ..] if !scene.is_empty() && !shot.is_empty() => (*scene, *shot),
            _ => return None,
        };
        let code = format!("{}_{}", scene, shot);

        match parts.get(2).filter(|hint| !hint.is_empty()) {
            Some(hint) => Some(ParsedReference::shot(scene, code, *hint).with_task_hint(*hint)),
            None => Some(ParsedReference::shot(scene, code, self.default_shot_step.as_str())),
        }
    }
}

/// Extract `(entity_type, id)` from a tracking-site URL
/// (`https://site/detail/Shot/1234`).
pub fn parse_entity_url(url: &str) -> Option<(String, u64)> {
    let tokens: Vec<&str> = url.trim_end_matches('/').split('/').collect();
    if tokens.len() <= 3 {
        return None;
    }

    match &tokens[tokens.len() - 3..] {
        ["detail", entity_type, id] if !entity_type.is_empty() => {
            let id = id.parse().ok()?;
            Some((entity_type.to_string(), id))
        }
        _ => None,
    }
}

/// Make a published file name usable as a content asset name.
///
/// Drops the `.vNNN` publish token and replaces remaining dots with
/// underscores.
pub fn sanitize_asset_name(name: &str) -> String {
    publish_version_token().replace_all(name, "").replace('.', "_")
}

/// Published base name for a versioned file name (`SCN_010.v001.mov` gives
/// `SCN_010.mov`).
pub fn strip_publish_version(file_name: &str) -> String {
    publish_version_token().replace(file_name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convention() -> NamingConvention {
        NamingConvention::default()
    }

    #[test]
    fn test_sequence_name() {
        let r = convention().parse_sequence_name("SCN_010_LAY_sub").unwrap();
        assert_eq!(r.as_tuple(), ("SCN", "SCN_010", "LAY"));

        let r = convention().parse_sequence_name("SCN_020_ANM").unwrap();
        assert_eq!(r.as_tuple(), ("SCN", "SCN_020", "ANM"));
    }

    #[test]
    fn test_sequence_name_keeps_step_letters() {
        // Suffix removal must not eat trailing letters of the step.
        let r = convention().parse_sequence_name("SCN_010_sub_sub").unwrap();
        assert_eq!(r.as_tuple(), ("SCN", "SCN_010", "sub"));
    }

    #[test]
    fn test_sequence_name_wrong_token_count() {
        let c = convention();
        assert!(c.parse_sequence_name("Master").is_none());
        assert!(c.parse_sequence_name("SCN_010").is_none());
        assert!(c.parse_sequence_name("SCN_010_LAY_v2").is_none());
        assert!(c.parse_sequence_name("SCN__LAY").is_none());
        assert!(c.parse_sequence_name("").is_none());
    }

    #[test]
    fn test_media_file_with_hint() {
        let r = convention().parse_media_file("C:\\renders\\SCN_010_Lighting.mov").unwrap();
        assert_eq!(r.as_tuple(), ("SCN", "SCN_010", "Lighting"));
        assert_eq!(r.task_hint.as_deref(), Some("Lighting"));
    }

    #[test]
    fn test_media_file_without_hint() {
        let r = convention().parse_media_file("/renders/SCN_010.MP4").unwrap();
        assert_eq!(r.as_tuple(), ("SCN", "SCN_010", "UE"));
        assert_eq!(r.task_hint, None);
    }

    #[test]
    fn test_media_file_keeps_rest_in_hint() {
        let r = convention().parse_media_file("SCN_010_LGT_v2.mov").unwrap();
        assert_eq!(r.step, "LGT_v2");
    }

    #[test]
    fn test_media_file_rejects() {
        let c = convention();
        assert!(c.parse_media_file("SCN_010.exr").is_none());
        assert!(c.parse_media_file("SCN.mov").is_none());
        assert!(c.parse_media_file("SCN_010").is_none());
        assert!(c.parse_media_file("_010.mov").is_none());
    }

    #[test]
    fn test_entity_url() {
        assert_eq!(
            parse_entity_url("https://studio.example.com/detail/Shot/1234"),
            Some(("Shot".to_string(), 1234))
        );
        assert_eq!(parse_entity_url("https://studio.example.com/detail/Shot/abc"), None);
        assert_eq!(parse_entity_url("https://studio.example.com/page/42"), None);
        assert_eq!(parse_entity_url("detail/Shot/1"), None);
    }

    #[test]
    fn test_sanitize_asset_name() {
        assert_eq!(sanitize_asset_name("SM_Gun.v003.fbx"), "SM_Gun_fbx");
        assert_eq!(sanitize_asset_name("cache.main"), "cache_main");
        assert_eq!(sanitize_asset_name("Hero"), "Hero");
    }

    #[test]
    fn test_strip_publish_version() {
        assert_eq!(strip_publish_version("SCN_010_LGT.v001.mov"), "SCN_010_LGT.mov");
        assert_eq!(strip_publish_version("SCN_010_LGT.mov"), "SCN_010_LGT.mov");
    }
}
