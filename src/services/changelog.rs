// src/services/changelog.rs

//! Changelog extraction from release descriptions.
//!
//! Release notes list one commit per bullet:
//!
//! ```text
//! * 1f0e…40 hex… New: Added foo
//! * 9a7c…40 hex… (fix): Bar crash
//! ```
//!
//! A bullet must open its line, optionally indented. Features and fixes are
//! matched by two independent patterns. Lines that match neither are
//! ignored; extraction never fails.

use std::sync::LazyLock;

use regex::Regex;

static FEATURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\*\s+[0-9a-f]{40}\s+(?:New:|\(?feat\)?.*:)\s*(?P<text>.*?)\r*$")
        .expect("feature pattern is valid")
});

static FIX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\*\s+[0-9a-f]{40}\s+(?:Fix(?:ed)?:|\(?fix\)?.*:)\s*(?P<text>.*?)\r*$")
        .expect("fix pattern is valid")
});

/// Categorised changelog lines, in the order they appear in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
    pub features: Vec<String>,
    pub fixes: Vec<String>,
}

impl Changelog {
    /// Extract feature and fix lines from a release description.
    pub fn extract(text: &str) -> Self {
        Self {
            features: captures(&FEATURE_LINE, text),
            fixes: captures(&FIX_LINE, text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.fixes.is_empty()
    }
}

fn captures(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.name("text"))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
