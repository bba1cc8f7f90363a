#![forbid(unsafe_code)]

use pictor_core::{CropMode, Gravity, OutputFormat, Quality, TransformSpec};

/// Emission order for known token keys. Existing tokens with keys outside
/// this list keep their original relative order after these.
pub(crate) const KEY_ORDER: [&str; 6] = ["w", "h", "c", "g", "q", "f"];

/// Per-field `auto` behavior.
///
/// The service applies different defaults per field: for `format`, `auto`
/// is itself an instruction (content negotiation) and the token is
/// emitted; for `quality`, `crop` and `gravity`, `auto` means "use the
/// service default" and the token is suppressed. Width and height are
/// numeric-only, so the question does not arise for them.
fn crop_value(c: CropMode) -> Option<&'static str> {
    match c {
        CropMode::Auto => None,
        CropMode::Fill => Some("fill"),
        CropMode::Fit => Some("fit"),
        CropMode::Scale => Some("scale"),
        CropMode::Thumb => Some("thumb"),
        CropMode::Limit => Some("limit"),
    }
}

fn gravity_value(g: Gravity) -> Option<&'static str> {
    match g {
        Gravity::Auto => None,
        Gravity::Face => Some("face"),
        Gravity::Center => Some("center"),
        Gravity::North => Some("north"),
        Gravity::South => Some("south"),
    }
}

fn quality_value(q: Quality) -> Option<String> {
    match q {
        Quality::Auto => None,
        Quality::Level(level) => Some(level.to_string()),
    }
}

fn format_value(f: OutputFormat) -> &'static str {
    match f {
        OutputFormat::Auto => "auto",
        OutputFormat::Webp => "webp",
        OutputFormat::Avif => "avif",
        OutputFormat::Jpg => "jpg",
        OutputFormat::Png => "png",
    }
}

/// Serialize a spec into `(key, token)` pairs, e.g. `("w", "w_300")`.
pub(crate) fn spec_tokens(spec: &TransformSpec) -> Vec<(String, String)> {
    let mut out = Vec::new();
    if let Some(w) = spec.width {
        out.push(("w".to_string(), format!("w_{w}")));
    }
    if let Some(h) = spec.height {
        out.push(("h".to_string(), format!("h_{h}")));
    }
    if let Some(value) = spec.crop.and_then(crop_value) {
        out.push(("c".to_string(), format!("c_{value}")));
    }
    if let Some(value) = spec.gravity.and_then(gravity_value) {
        out.push(("g".to_string(), format!("g_{value}")));
    }
    if let Some(value) = spec.quality.and_then(quality_value) {
        out.push(("q".to_string(), format!("q_{value}")));
    }
    if let Some(f) = spec.format {
        out.push(("f".to_string(), format!("f_{}", format_value(f))));
    }
    out
}

/// Split a candidate transform segment into `(key, token)` pairs.
///
/// A valid segment is a comma-joined list of `key_value` tokens where the
/// key is one to three lowercase ASCII letters and the value is non-empty.
/// Returns `None` when the segment is not a transform segment (it is then
/// part of the public identifier).
pub(crate) fn parse_segment(segment: &str) -> Option<Vec<(String, String)>> {
    if segment.is_empty() {
        return None;
    }
    let mut out = Vec::new();
    for token in segment.split(',') {
        let (key, value) = token.split_once('_')?;
        if key.is_empty()
            || key.len() > 3
            || !key.bytes().all(|b| b.is_ascii_lowercase())
            || value.is_empty()
        {
            return None;
        }
        out.push((key.to_string(), token.to_string()));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_format_emits_token() {
        let spec = TransformSpec {
            format: Some(OutputFormat::Auto),
            ..TransformSpec::default()
        };
        assert_eq!(
            spec_tokens(&spec),
            vec![("f".to_string(), "f_auto".to_string())]
        );
    }

    #[test]
    fn auto_quality_crop_gravity_suppress_tokens() {
        let spec = TransformSpec {
            quality: Some(Quality::Auto),
            crop: Some(CropMode::Auto),
            gravity: Some(Gravity::Auto),
            ..TransformSpec::default()
        };
        assert!(spec_tokens(&spec).is_empty());
    }

    #[test]
    fn tokens_emitted_in_stable_order() {
        let spec = TransformSpec {
            width: Some(300),
            height: Some(450),
            quality: Some(Quality::Level(80)),
            crop: Some(CropMode::Fill),
            gravity: Some(Gravity::Face),
            format: Some(OutputFormat::Webp),
        };
        let tokens: Vec<String> = spec_tokens(&spec).into_iter().map(|(_, t)| t).collect();
        assert_eq!(tokens, ["w_300", "h_450", "c_fill", "g_face", "q_80", "f_webp"]);
    }

    #[test]
    fn parse_segment_accepts_token_lists() {
        let parsed = parse_segment("w_300,q_80,dpr_2").unwrap();
        assert_eq!(parsed[0], ("w".to_string(), "w_300".to_string()));
        assert_eq!(parsed[2], ("dpr".to_string(), "dpr_2".to_string()));
    }

    #[test]
    fn parse_segment_rejects_plain_path_segments() {
        assert!(parse_segment("books").is_none());
        assert!(parse_segment("cover_art").is_none()); // key too long
        assert!(parse_segment("w_").is_none());
        assert!(parse_segment("").is_none());
        assert!(parse_segment("W_300").is_none());
    }
}
