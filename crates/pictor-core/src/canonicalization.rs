#![forbid(unsafe_code)]

use crate::errors::{CoreError, CoreResult};

/// Canonicalize a URL for cache keying: drop the fragment, keep the query,
/// lowercase scheme and host, strip default ports.
///
/// Two requests that differ only in fragment hit the same partition entry;
/// requests that differ in query (or in a transform path segment) do not.
pub fn canonicalize_for_resource(url: &url::Url) -> CoreResult<String> {
    let mut canonical = url.clone();

    canonical.set_fragment(None);

    let scheme = canonical.scheme();
    let scheme_lower = scheme.to_lowercase();
    if scheme != scheme_lower {
        let _ = canonical.set_scheme(&scheme_lower);
    }

    if let Some(host) = canonical.host_str() {
        let host_lower = host.to_lowercase();
        if host != host_lower {
            canonical
                .set_host(Some(&host_lower))
                .map_err(|e| CoreError::Canonicalization(e.to_string()))?;
        }
    }

    match (canonical.scheme(), canonical.port()) {
        ("https", Some(443)) | ("http", Some(80)) => {
            let _ = canonical.set_port(None);
        }
        _ => {}
    }

    Ok(canonical.to_string())
}
