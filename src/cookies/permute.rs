//! Domain and path permutations.
//!
//! A cookie stored under `example.com` is visible to `a.example.com`, and a
//! cookie stored under `/a` is visible to `/a/b`. Lookups therefore probe
//! every ancestor domain and path of the request.

use crate::cookies::psl::cookie_base_domain;

/// Every domain whose cookies are visible to `domain`.
///
/// Starts at the base domain (see [`cookie_base_domain`]) and adds one label
/// at a time up to `domain` itself: `a.b.example.com` yields
/// `["example.com", "b.example.com", "a.b.example.com"]`.
///
/// Returns `None` when `domain` has no base domain (a public suffix, or a
/// special-use name that is not allowed).
pub fn permute_domain(domain: &str, allow_special_use_domain: bool) -> Option<Vec<String>> {
    let base = cookie_base_domain(domain, allow_special_use_domain)?;
    let domain = domain.trim_end_matches('.').to_lowercase();

    if base == domain {
        return Some(vec![base]);
    }

    let prefix = domain.strip_suffix(base.as_str())?.strip_suffix('.')?;
    let mut permutations = vec![base.clone()];
    let mut current = base;
    for label in prefix.split('.').rev() {
        current = format!("{}.{}", label, current);
        permutations.push(current.clone());
    }
    Some(permutations)
}

/// Every path whose cookies are visible to `path`, longest first.
///
/// `"/a/b"` yields `["/a/b", "/a", "/"]`. The root always comes last, so an
/// empty or relative path still probes `/`.
pub fn permute_path(path: &str) -> Vec<String> {
    if path == "/" {
        return vec!["/".to_string()];
    }

    let mut permutations = vec![path.to_string()];
    let mut current = path;
    while current.len() > 1 {
        current = match current.rfind('/') {
            Some(0) => break,
            Some(idx) => &current[..idx],
            None => "",
        };
        permutations.push(current.to_string());
    }
    permutations.push("/".to_string());
    permutations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permute_domain_subdomains() {
        assert_eq!(
            permute_domain("a.b.example.com", false),
            Some(vec![
                "example.com".to_string(),
                "b.example.com".to_string(),
                "a.b.example.com".to_string(),
            ])
        );
    }

    #[test]
    fn test_permute_domain_registrable() {
        assert_eq!(
            permute_domain("example.co.uk", false),
            Some(vec!["example.co.uk".to_string()])
        );
    }

    #[test]
    fn test_permute_domain_public_suffix() {
        assert_eq!(permute_domain("co.uk", false), None);
    }

    #[test]
    fn test_permute_domain_special_use() {
        assert_eq!(permute_domain("api.app.localhost", false), None);
        assert_eq!(
            permute_domain("api.app.localhost", true),
            Some(vec!["app.localhost".to_string(), "api.app.localhost".to_string()])
        );
    }

    #[test]
    fn test_permute_path_root() {
        assert_eq!(permute_path("/"), vec!["/"]);
    }

    #[test]
    fn test_permute_path_nested() {
        assert_eq!(permute_path("/a/b"), vec!["/a/b", "/a", "/"]);
        assert_eq!(permute_path("/a/b/"), vec!["/a/b/", "/a/b", "/a", "/"]);
    }

    #[test]
    fn test_permute_path_empty_and_relative() {
        assert_eq!(permute_path(""), vec!["", "/"]);
        assert_eq!(permute_path("abc"), vec!["abc", "", "/"]);
    }
}
