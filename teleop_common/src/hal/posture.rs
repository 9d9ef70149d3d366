//! Predefined robot postures and operator-facing name normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of postures the robot can transition to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Posture {
    Stand,
    StandInit,
    StandZero,
    Crouch,
    Sit,
    SitRelax,
    LyingBelly,
    LyingBack,
}

/// Every posture, in declaration order.
pub const ALL_POSTURES: [Posture; 8] = [
    Posture::Stand,
    Posture::StandInit,
    Posture::StandZero,
    Posture::Crouch,
    Posture::Sit,
    Posture::SitRelax,
    Posture::LyingBelly,
    Posture::LyingBack,
];

/// Short operator aliases on top of the lowercased canonical names.
const ALIASES: [(&str, Posture); 2] = [("belly", Posture::LyingBelly), ("back", Posture::LyingBack)];

impl Posture {
    /// Canonical identifier.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stand => "Stand",
            Self::StandInit => "StandInit",
            Self::StandZero => "StandZero",
            Self::Crouch => "Crouch",
            Self::Sit => "Sit",
            Self::SitRelax => "SitRelax",
            Self::LyingBelly => "LyingBelly",
            Self::LyingBack => "LyingBack",
        }
    }

    /// Normalize an operator-supplied name.
    ///
    /// Surrounding whitespace is ignored, then the canonical name is tried
    /// verbatim, then with inner spaces removed and case folded, then the
    /// alias table. Returns `None` for anything else, including empty input.
    pub fn normalize(raw: &str) -> Option<Self> {
        let key = raw.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(p) = ALL_POSTURES.iter().find(|p| p.name() == key) {
            return Some(*p);
        }
        let folded: String = key
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        ALL_POSTURES
            .iter()
            .copied()
            .find(|p| p.name().to_lowercase() == folded)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == folded)
                    .map(|(_, p)| *p)
            })
    }

    /// Canonical names sorted alphabetically, for error messages.
    pub fn valid_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = ALL_POSTURES.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
