//! Banned-name matching with glob patterns.
//!
//! Patterns are matched per path component, case-insensitively:
//! - `SYNOFILE_THUMB_*.*` bans any file or directory with a matching name
//! - `@eaDir/` (trailing slash) bans only directories, i.e. whole subtrees
//! - patterns containing an inner `/` are anchored at the tree root

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{Result, ScanError};

/// Build a case-insensitive glob matcher from a pattern.
pub fn build_matcher(glob_pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(glob_pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| ScanError::Pattern(format!("{}: {}", glob_pattern, e)))
}

#[derive(Debug, Clone)]
struct NameRule {
    raw: String,
    matcher: GlobMatcher,
    dir_only: bool,
    anchored: bool,
}

/// Compiled list of banned-name patterns
#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    rules: Vec<NameRule>,
}

impl NameMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let dir_only = raw.ends_with('/');
            let body = raw.trim_start_matches('/').trim_end_matches('/');
            if body.is_empty() {
                return Err(ScanError::Pattern(format!("{}: empty pattern", raw)));
            }
            rules.push(NameRule {
                raw: raw.to_string(),
                matcher: build_matcher(body)?,
                dir_only,
                anchored: body.contains('/'),
            });
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Raw patterns, in declaration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.raw.as_str())
    }

    /// Match a file path relative to its tree root.
    pub fn matches(&self, path: &str) -> bool {
        self.matching_pattern(path).is_some()
    }

    /// The first pattern banning `path`, if any.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        let path = path.trim_start_matches("./").trim_start_matches('/');
        let components: Vec<&str> = path
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();
        if components.is_empty() {
            return None;
        }
        // every component but the last one is a directory
        let dir_count = components.len() - 1;

        self.rules
            .iter()
            .find(|rule| {
                let candidates = if rule.dir_only {
                    dir_count
                } else {
                    components.len()
                };
                if rule.anchored {
                    (1..=candidates).any(|n| rule.matcher.is_match(components[..n].join("/")))
                } else {
                    components[..candidates]
                        .iter()
                        .any(|c| rule.matcher.is_match(c))
                }
            })
            .map(|rule| rule.raw.as_str())
    }
}
