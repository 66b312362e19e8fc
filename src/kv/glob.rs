//! Redis `MATCH` glob patterns.
//!
//! Supported syntax, byte-wise like Redis' `stringmatchlen`:
//! - `*` any run of bytes, `?` exactly one byte
//! - `[abc]`, `[^abc]`, `[a-z]` byte classes
//! - `\x` matches `x` literally

/// Returns true when `subject` matches `pattern` in full.
pub fn glob_match(pattern: &str, subject: &str) -> bool {
    match_bytes(pattern.as_bytes(), subject.as_bytes())
}

fn match_bytes(mut p: &[u8], mut s: &[u8]) -> bool {
    while let Some(&pc) = p.first() {
        match pc {
            b'*' => {
                while p.len() > 1 && p[1] == b'*' {
                    p = &p[1..];
                }
                if p.len() == 1 {
                    return true;
                }
                return (0..=s.len()).any(|i| match_bytes(&p[1..], &s[i..]));
            }
            b'?' => {
                if s.is_empty() {
                    return false;
                }
                s = &s[1..];
                p = &p[1..];
            }
            b'[' => {
                let Some(&c) = s.first() else {
                    return false;
                };
                let (matched, rest) = match_class(&p[1..], c);
                if !matched {
                    return false;
                }
                s = &s[1..];
                p = rest;
            }
            b'\\' if p.len() >= 2 => {
                if s.first() != Some(&p[1]) {
                    return false;
                }
                s = &s[1..];
                p = &p[2..];
            }
            _ => {
                if s.first() != Some(&pc) {
                    return false;
                }
                s = &s[1..];
                p = &p[1..];
            }
        }
    }
    s.is_empty()
}

/// Matches `c` against the class body following `[`. Returns the result and
/// the pattern remaining after the closing `]` (or the end of the pattern if
/// the class is unterminated).
fn match_class(class: &[u8], c: u8) -> (bool, &[u8]) {
    let mut i = 0;
    let negate = class.first() == Some(&b'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < class.len() && class[i] != b']' {
        if class[i] == b'\\' && i + 1 < class.len() {
            matched |= class[i + 1] == c;
            i += 2;
        } else if i + 2 < class.len() && class[i + 1] == b'-' {
            let (lo, hi) = if class[i] <= class[i + 2] {
                (class[i], class[i + 2])
            } else {
                (class[i + 2], class[i])
            };
            matched |= (lo..=hi).contains(&c);
            i += 3;
        } else {
            matched |= class[i] == c;
            i += 1;
        }
    }

    let rest: &[u8] = if i < class.len() { &class[i + 1..] } else { &[] };
    (matched != negate, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        assert!(glob_match("cookie-store:default:cookie:x.com:/", "cookie-store:default:cookie:x.com:/"));
        assert!(!glob_match("cookie-store:default:cookie:x.com:/", "cookie-store:default:cookie:x.com:/a"));
    }

    #[test]
    fn test_star() {
        assert!(glob_match("cookie-store:default:cookie:*", "cookie-store:default:cookie:a.com:/"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(glob_match("a**", "a"));
        assert!(!glob_match("a*b", "aXXc"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_star_crosses_separators() {
        assert!(glob_match("p:*:*", "p:x.com:/a/b"));
        assert!(!glob_match("p:*:*", "p:x.com"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob_match("h?llo", "hello"));
        assert!(!glob_match("h?llo", "hllo"));
    }

    #[test]
    fn test_classes() {
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("h[a-b]llo", "hbllo"));
        assert!(glob_match("h[b-a]llo", "hallo"));
    }

    #[test]
    fn test_escape() {
        assert!(glob_match(r"a\*b", "a*b"));
        assert!(!glob_match(r"a\*b", "aXb"));
        assert!(glob_match(r"[\]]", "]"));
    }
}
