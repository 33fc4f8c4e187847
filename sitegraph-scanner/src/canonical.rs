//! URL canonicalization.
//!
//! Every URL that enters the crawl graph or the visited set goes through
//! [`canonicalize`] first, so equivalent spellings of the same page collapse
//! to one identity.

use url::Url;

/// Normalize a URL into its canonical, comparable form.
///
/// - host is lowercased and a leading `www.` label is removed
/// - a path whose last segment has no `.` gets a trailing `/`
/// - query string and fragment are dropped
///
/// Input that does not parse as an absolute URL is normalized on a best-effort
/// basis instead of failing. Applying the function twice yields the same value.
pub fn canonicalize(url: &str) -> String {
    let url = url.trim();
    match Url::parse(url) {
        Ok(parsed) => canonicalize_parsed(parsed),
        Err(_) => canonicalize_raw(url),
    }
}

fn canonicalize_parsed(mut url: Url) -> String {
    url.set_query(None);
    url.set_fragment(None);

    // mailto:, javascript: and friends have no host or hierarchical path
    if url.cannot_be_a_base() {
        return url.to_string();
    }

    if let Some(host) = url.host_str().map(str::to_string) {
        let lowered = host.to_lowercase();
        let normalized = strip_www(&lowered).unwrap_or(&lowered);
        if normalized != host && url.set_host(Some(normalized)).is_err() {
            return canonicalize_raw(url.as_str());
        }
    }

    let path = url.path().to_string();
    if needs_trailing_slash(&path) {
        url.set_path(&format!("{}/", path));
    }

    url.to_string()
}

/// Fallback for strings the URL parser rejects (relative references, garbage).
fn canonicalize_raw(url: &str) -> String {
    let url = url.split('#').next().unwrap_or_default();
    let url = url.split('?').next().unwrap_or_default();

    let (prefix, path) = match url.split_once("://") {
        Some((scheme, rest)) => {
            let (netloc, path) = match rest.find('/') {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            };
            let netloc = netloc.to_lowercase();
            let netloc = strip_www(&netloc).unwrap_or(&netloc).to_string();
            (format!("{}://{}", scheme.to_lowercase(), netloc), path.to_string())
        }
        None => (String::new(), url.to_string()),
    };

    let path = if needs_trailing_slash(&path) {
        format!("{}/", path)
    } else {
        path
    };

    format!("{}{}", prefix, path)
}

/// Host with every leading `www.` label removed, if it had any.
pub(crate) fn strip_www(host: &str) -> Option<&str> {
    let mut rest = host.strip_prefix("www.").filter(|rest| !rest.is_empty())?;
    while let Some(next) = rest.strip_prefix("www.").filter(|next| !next.is_empty()) {
        rest = next;
    }
    Some(rest)
}

fn needs_trailing_slash(path: &str) -> bool {
    if path.ends_with('/') {
        return false;
    }
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    !last_segment.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_trailing_slash_to_directory_paths() {
        assert_eq!(canonicalize("https://example.com/about"), "https://example.com/about/");
        assert_eq!(canonicalize("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_keeps_file_paths_as_is() {
        assert_eq!(
            canonicalize("https://example.com/docs/index.html"),
            "https://example.com/docs/index.html"
        );
    }

    #[test]
    fn test_strips_query_and_fragment() {
        assert_eq!(
            canonicalize("https://example.com/blog?page=2#comments"),
            "https://example.com/blog/"
        );
    }

    #[test]
    fn test_host_case_and_www_insensitive() {
        assert_eq!(
            canonicalize("https://WWW.Example.com/a"),
            canonicalize("https://example.com/a/")
        );
    }

    #[test]
    fn test_repeated_www_labels_are_stripped() {
        assert_eq!(
            canonicalize("https://www.www.example.com/a"),
            "https://example.com/a/"
        );
        assert_eq!(strip_www("www.www.example.com"), Some("example.com"));
        assert_eq!(strip_www("www."), None);
    }

    #[test]
    fn test_lowercases_host_of_unknown_scheme() {
        assert_eq!(canonicalize("foo://Example.COM/a"), "foo://example.com/a/");
    }

    #[test]
    fn test_only_leading_www_label_is_stripped() {
        assert_eq!(
            canonicalize("https://shop.www.example.com/"),
            "https://shop.www.example.com/"
        );
    }

    #[test]
    fn test_keeps_explicit_port() {
        assert_eq!(
            canonicalize("http://127.0.0.1:8080/page"),
            "http://127.0.0.1:8080/page/"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://WWW.Example.com/a?b=c#d",
            "https://www.www.example.com/a",
            "foo://Example.COM/a",
            "https://example.com",
            "https://example.com/file.pdf",
            "http://127.0.0.1:3000/x/y",
            "mailto:someone@example.com",
            "javascript:void(0)",
            "relative/path",
            "/absolute/path?x=1",
            "",
            "ht!tp://%%%",
        ];
        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_malformed_input_degrades() {
        assert_eq!(canonicalize("relative/path?q=1"), "relative/path/");
        assert_eq!(canonicalize(""), "/");
    }

    #[test]
    fn test_opaque_schemes_untouched() {
        assert_eq!(
            canonicalize("mailto:foo@bar.com"),
            "mailto:foo@bar.com"
        );
    }
}
