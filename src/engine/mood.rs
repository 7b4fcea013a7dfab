use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::AudioFeatures;

/// Strictly above this a feature counts as high
pub const HIGH_THRESHOLD: f64 = 0.7;
/// Strictly below this a feature counts as low
pub const LOW_THRESHOLD: f64 = 0.3;

/// Mood buckets, each a fixed predicate on one raw feature.
///
/// Values in `[LOW_THRESHOLD, HIGH_THRESHOLD]` belong to neither side of a
/// pair: a song with valence 0.5 is neither `Happy` nor `Sad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown mood: {0}")]
pub struct UnknownMood(pub String);

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Sad, Mood::Energetic, Mood::Calm];

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
            Mood::Calm => "Calm",
        }
    }

    /// Human readable form of the predicate
    pub fn rule(&self) -> &'static str {
        match self {
            Mood::Happy => "valence > 0.7",
            Mood::Sad => "valence < 0.3",
            Mood::Energetic => "energy > 0.7",
            Mood::Calm => "energy < 0.3",
        }
    }

    pub fn matches(&self, features: &AudioFeatures) -> bool {
        match self {
            Mood::Happy => features.valence > HIGH_THRESHOLD,
            Mood::Sad => features.valence < LOW_THRESHOLD,
            Mood::Energetic => features.energy > HIGH_THRESHOLD,
            Mood::Calm => features.energy < LOW_THRESHOLD,
        }
    }
}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| UnknownMood(label.to_string()))
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
