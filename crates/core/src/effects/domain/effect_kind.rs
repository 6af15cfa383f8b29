use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown effect '{0}' (expected one of: blur, change-background, recolor, replace, highlight-edges, pixelate)")]
pub struct EffectParseError(pub String);

/// The closed set of face effects.
///
/// Variant order is the canonical application order: later effects may
/// overwrite the output of earlier ones in the same region, so the order is
/// fixed regardless of how the user selected them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    Blur,
    ChangeBackground,
    Recolor,
    Replace,
    HighlightEdges,
    Pixelate,
}

impl EffectKind {
    pub const CANONICAL_ORDER: [EffectKind; 6] = [
        EffectKind::Blur,
        EffectKind::ChangeBackground,
        EffectKind::Recolor,
        EffectKind::Replace,
        EffectKind::HighlightEdges,
        EffectKind::Pixelate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Blur => "blur",
            EffectKind::ChangeBackground => "change-background",
            EffectKind::Recolor => "recolor",
            EffectKind::Replace => "replace",
            EffectKind::HighlightEdges => "highlight-edges",
            EffectKind::Pixelate => "pixelate",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = EffectParseError;

    /// Accepts the kebab-case names plus the UI's labels
    /// (e.g. `"Blur faces"`, `"Change face color"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();
        match normalized.as_str() {
            "blur" | "blur-faces" | "blur-face" => Ok(EffectKind::Blur),
            "change-background" | "background" | "change-bg" => Ok(EffectKind::ChangeBackground),
            "recolor" | "recolor-face" | "recolor-faces" | "change-face-color" => {
                Ok(EffectKind::Recolor)
            }
            "replace" | "replace-face" | "replace-faces" => Ok(EffectKind::Replace),
            "highlight-edges" | "edges" | "edge-highlight" => Ok(EffectKind::HighlightEdges),
            "pixelate" | "pixelate-faces" | "pixelate-face" => Ok(EffectKind::Pixelate),
            _ => Err(EffectParseError(s.to_string())),
        }
    }
}

/// The effects selected for a run.
///
/// Backed by an ordered set, so iteration always follows
/// [`EffectKind::CANONICAL_ORDER`] no matter the insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrategySet(BTreeSet<EffectKind>);

impl StrategySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EffectKind) -> bool {
        self.0.insert(kind)
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EffectKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<EffectKind> for StrategySet {
    fn from_iter<T: IntoIterator<Item = EffectKind>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for StrategySet {
    type Err = EffectParseError;

    /// Parses a comma-separated list; blank entries are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(EffectKind::from_str)
            .collect()
    }
}
