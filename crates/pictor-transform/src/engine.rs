#![forbid(unsafe_code)]

use pictor_core::TransformSpec;
use tracing::debug;
use url::Url;

use crate::tokens::{parse_segment, spec_tokens, KEY_ORDER};

/// Outcome of a transform attempt.
///
/// External behavior is "never throw": a URL that does not match the
/// service grammar comes back unchanged. The tag lets callers and tests
/// distinguish "optimized" from "unmodified" without string inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformOutcome {
    /// The URL matched the grammar and was rewritten (or canonically
    /// re-serialized, for an empty spec).
    Transformed(String),
    /// The URL is foreign or malformed; returned exactly as given.
    PassThrough(String),
}

impl TransformOutcome {
    pub fn url(&self) -> &str {
        match self {
            TransformOutcome::Transformed(u) | TransformOutcome::PassThrough(u) => u,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            TransformOutcome::Transformed(u) | TransformOutcome::PassThrough(u) => u,
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self, TransformOutcome::Transformed(_))
    }
}

/// Structural pieces of a transformable upload URL.
struct UploadUrl {
    origin: String,
    account: String,
    existing: Vec<(String, String)>,
    public_id: String,
    query: Option<String>,
}

fn parse_upload_url(raw: &str) -> Option<UploadUrl> {
    let url = Url::parse(raw).ok()?;
    if url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?;
    // Grammar requires `{sub}.{service}`: at least two non-empty labels.
    if host.split('.').filter(|l| !l.is_empty()).count() < 2 || host.split('.').any(str::is_empty) {
        return None;
    }

    let path = url.path();
    // Only the first `/upload/` after the account segment is structural;
    // later occurrences belong to the public identifier.
    let (account_part, rest) = path.split_once("/upload/")?;
    let account = account_part.trim_start_matches('/');
    if account.is_empty() || rest.is_empty() {
        return None;
    }

    let (existing, public_id) = match rest.split_once('/') {
        Some((first, remainder)) if !remainder.is_empty() => match parse_segment(first) {
            Some(tokens) => (tokens, remainder.to_string()),
            None => (Vec::new(), rest.to_string()),
        },
        _ => (Vec::new(), rest.to_string()),
    };

    let origin = match url.port() {
        Some(port) => format!("https://{host}:{port}"),
        None => format!("https://{host}"),
    };

    Some(UploadUrl {
        origin,
        account: account.to_string(),
        existing,
        public_id,
        query: url.query().map(str::to_string),
    })
}

impl UploadUrl {
    fn assemble(&self, tokens: &[String]) -> String {
        let mut out = format!("{}/{}/upload/", self.origin, self.account);
        if !tokens.is_empty() {
            out.push_str(&tokens.join(","));
            out.push('/');
        }
        out.push_str(&self.public_id);
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        out
    }
}

/// Whether the URL belongs to a host/path shape the transform service
/// understands.
pub fn is_transformable(url: &str) -> bool {
    parse_upload_url(url).is_some()
}

/// Rewrite `url` with the parameters of `spec`.
///
/// Tokens from a pre-existing transform segment are preserved unless the
/// spec overrides the same key; the merged list is re-emitted as a single
/// comma-joined segment in stable key order. Malformed or foreign URLs
/// pass through unchanged.
pub fn transform(url: &str, spec: &TransformSpec) -> TransformOutcome {
    let Some(parsed) = parse_upload_url(url) else {
        debug!(url, "URL outside transform grammar, passing through");
        return TransformOutcome::PassThrough(url.to_string());
    };

    let new_tokens = spec_tokens(spec);

    let mut merged: Vec<String> = Vec::new();
    for key in KEY_ORDER {
        if let Some((_, token)) = new_tokens.iter().find(|(k, _)| k == key) {
            merged.push(token.clone());
        } else if let Some((_, token)) = parsed.existing.iter().rev().find(|(k, _)| k == key) {
            merged.push(token.clone());
        }
    }
    // Unknown keys from the existing segment survive in original order.
    for (key, token) in &parsed.existing {
        if !KEY_ORDER.contains(&key.as_str()) {
            merged.push(token.clone());
        }
    }

    TransformOutcome::Transformed(parsed.assemble(&merged))
}

/// Canonical re-serialization of a transformable URL, or `None` when the
/// URL is outside the grammar.
pub fn canonicalize(url: &str) -> Option<String> {
    match transform(url, &TransformSpec::default()) {
        TransformOutcome::Transformed(u) => Some(u),
        TransformOutcome::PassThrough(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use pictor_core::{CropMode, Gravity, OutputFormat, Quality};
    use rstest::rstest;

    use super::*;

    const BARE: &str = "https://res.imghost.com/author-site/upload/books/cover.jpg";

    fn spec(width: Option<u32>, quality: Option<u8>) -> TransformSpec {
        TransformSpec {
            width,
            quality: quality.map(Quality::Level),
            ..TransformSpec::default()
        }
    }

    #[test]
    fn rewrites_bare_upload_url() {
        let out = transform(BARE, &spec(Some(300), Some(80)));
        assert_eq!(
            out,
            TransformOutcome::Transformed(
                "https://res.imghost.com/author-site/upload/w_300,q_80/books/cover.jpg".into()
            )
        );
    }

    #[test]
    fn empty_spec_is_canonical_reserialization() {
        let out = transform(BARE, &TransformSpec::default());
        assert_eq!(out, TransformOutcome::Transformed(BARE.to_string()));
        assert_eq!(canonicalize(BARE).as_deref(), Some(BARE));
    }

    #[test]
    fn chained_transform_preserves_non_overridden_tokens() {
        let first = transform(BARE, &spec(Some(300), Some(80))).into_url();
        let second = transform(
            &first,
            &TransformSpec {
                width: Some(150),
                format: Some(OutputFormat::Webp),
                ..TransformSpec::default()
            },
        );
        assert_eq!(
            second.url(),
            "https://res.imghost.com/author-site/upload/w_150,q_80,f_webp/books/cover.jpg"
        );
    }

    #[test]
    fn unknown_existing_tokens_survive() {
        let url = "https://res.imghost.com/acct/upload/w_100,e_grayscale/img.jpg";
        let out = transform(url, &spec(Some(200), None));
        assert_eq!(
            out.url(),
            "https://res.imghost.com/acct/upload/w_200,e_grayscale/img.jpg"
        );
    }

    #[test]
    fn public_id_with_upload_substring_is_not_misparsed() {
        let url = "https://res.imghost.com/acct/upload/media/upload/nested.jpg";
        let out = transform(url, &spec(Some(64), None));
        assert_eq!(
            out.url(),
            "https://res.imghost.com/acct/upload/w_64/media/upload/nested.jpg"
        );
    }

    #[test]
    fn full_spec_token_order() {
        let out = transform(
            BARE,
            &TransformSpec {
                width: Some(300),
                height: Some(450),
                quality: Some(Quality::Level(80)),
                crop: Some(CropMode::Fill),
                gravity: Some(Gravity::Face),
                format: Some(OutputFormat::Auto),
            },
        );
        assert_eq!(
            out.url(),
            "https://res.imghost.com/author-site/upload/w_300,h_450,c_fill,g_face,q_80,f_auto/books/cover.jpg"
        );
    }

    #[rstest]
    #[case::foreign_host_shape("https://imghost/acct/upload/img.jpg")]
    #[case::http_scheme("http://res.imghost.com/acct/upload/img.jpg")]
    #[case::no_upload_segment("https://res.imghost.com/acct/images/img.jpg")]
    #[case::no_account_segment("https://res.imghost.com/upload/img.jpg")]
    #[case::empty_public_id("https://res.imghost.com/acct/upload/")]
    #[case::not_a_url("not a url at all")]
    #[case::relative_path("/images/local.png")]
    fn foreign_urls_pass_through_unchanged(#[case] url: &str) {
        assert!(!is_transformable(url));
        let out = transform(url, &spec(Some(300), Some(80)));
        assert_eq!(out, TransformOutcome::PassThrough(url.to_string()));
        assert_eq!(canonicalize(url), None);
    }

    #[test]
    fn query_string_is_preserved() {
        let url = "https://res.imghost.com/acct/upload/img.jpg?v=3";
        let out = transform(url, &spec(Some(100), None));
        assert_eq!(
            out.url(),
            "https://res.imghost.com/acct/upload/w_100/img.jpg?v=3"
        );
    }

    #[test]
    fn transform_segment_without_public_id_is_public_id_itself() {
        // `w_300` as the only trailing segment is the public identifier,
        // not a transform segment.
        let url = "https://res.imghost.com/acct/upload/w_300";
        let out = transform(url, &TransformSpec::default());
        assert_eq!(
            out,
            TransformOutcome::Transformed("https://res.imghost.com/acct/upload/w_300".into())
        );
    }
}
