//! Full-match regex and back-reference template expansion (spec §4.C).
//!
//! `expand` computes how many `\k` (`k >= 1`) back-references appear in a
//! replacement template, requires them to be dense (`1..N` with no gaps,
//! `\0` rejected), runs a capturing full match with that many groups, and
//! substitutes. `\\` escapes a literal backslash.

use crate::error::{Error, Result};
use regex::Regex as ReRegex;
use std::collections::BTreeSet;

/// Full-match `s` against `pattern`.
pub fn is_match(s: &str, pattern: &str) -> Result<bool> {
    let re = compile_full(pattern)?;
    Ok(re.is_match(s))
}

/// Expand `template`'s `\1..\N` back-references using the capture groups of
/// a full match of `pattern` against `s`. Fails if the template's
/// back-references are not dense `1..N`, or if the match fails.
pub fn expand(s: &str, pattern: &str, template: &str) -> Result<String> {
    let n = backreference_count(template)?;
    let re = compile_full(pattern)?;
    let caps = re
        .captures(s)
        .ok_or_else(|| Error::InvalidHookTemplate(template.to_string()))?;

    let mut groups = Vec::with_capacity(n);
    for i in 1..=n {
        let g = caps
            .get(i)
            .ok_or_else(|| Error::InvalidHookTemplate(template.to_string()))?;
        groups.push(g.as_str().to_string());
    }
    Ok(substitute(template, &groups))
}

/// Confirm `template`'s back-references don't exceed the number of capture
/// groups `pattern` actually has — used to validate a `Hook` at model-load
/// time, before any instance ever reaches it.
pub fn validate_hook_template(pattern: &str, template: &str) -> Result<()> {
    let re = compile_full(pattern)?;
    let available = re.captures_len().saturating_sub(1);
    let needed = backreference_count(template)?;
    if needed > available {
        return Err(Error::InvalidHookTemplate(format!(
            "{template} references \\{needed} but pattern only has {available} group(s)"
        )));
    }
    Ok(())
}

fn compile_full(pattern: &str) -> Result<ReRegex> {
    let anchored = format!("^(?:{pattern})$");
    ReRegex::new(&anchored).map_err(|source| Error::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Count the distinct back-references `\k` (`k >= 1`) in `template`,
/// requiring them to form a dense `1..N` set. `\0` is always rejected.
fn backreference_count(template: &str) -> Result<usize> {
    let mut occurrences = BTreeSet::new();
    let mut escaped = false;
    for c in template.chars() {
        if escaped {
            if let Some(d) = c.to_digit(10) {
                occurrences.insert(d as usize);
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        }
    }
    if escaped {
        return Err(Error::InvalidHookTemplate(template.to_string()));
    }
    if occurrences.contains(&0) {
        return Err(Error::InvalidHookTemplate(template.to_string()));
    }
    if !occurrences.is_empty() && occurrences.len() != *occurrences.iter().max().unwrap() {
        return Err(Error::InvalidHookTemplate(template.to_string()));
    }
    Ok(occurrences.len())
}

fn substitute(template: &str, groups: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut escaped = false;
    for c in template.chars() {
        if escaped {
            if let Some(d) = c.to_digit(10) {
                if d >= 1 {
                    out.push_str(&groups[d as usize - 1]);
                }
            } else if c == '\\' {
                out.push('\\');
            } else {
                out.push(c);
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_match_semantics() {
        assert!(is_match("abc", "abc").unwrap());
        assert!(!is_match("abcd", "abc").unwrap());
    }

    #[test]
    fn expands_single_group() {
        let out = expand("http://x", r"^http://(.*)$", r"https://\1").unwrap();
        assert_eq!(out, "https://x");
    }

    #[test]
    fn expands_multiple_groups_in_order() {
        let out = expand("a-b", r"^(\w)-(\w)$", r"\2\1").unwrap();
        assert_eq!(out, "ba");
    }

    #[test]
    fn rejects_non_dense_backreferences() {
        assert!(expand("a-b", r"^(\w)-(\w)$", r"\1\3").is_err());
    }

    #[test]
    fn rejects_backreference_zero() {
        assert!(expand("a", r"^(\w)$", r"\0").is_err());
    }

    #[test]
    fn roundtrips_full_match_template() {
        // A template whose back-references cover the full match reproduces
        // the literal input (spec §8 "Round trips").
        let out = expand("hello", r"^(h)(ello)$", r"\1\2").unwrap();
        assert_eq!(out, "hello");
    }
}
