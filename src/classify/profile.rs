//! Accent labels and the reference profile table

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Accent labels, declared in tie-break precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    American,
    British,
    Australian,
    Indian,
    Canadian,
}

impl Accent {
    /// All accents in precedence order
    pub const ALL: [Accent; 5] = [
        Accent::American,
        Accent::British,
        Accent::Australian,
        Accent::Indian,
        Accent::Canadian,
    ];

    /// Position in [`Accent::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase identifier used in JSON
    pub fn as_str(self) -> &'static str {
        match self {
            Accent::American => "american",
            Accent::British => "british",
            Accent::Australian => "australian",
            Accent::Indian => "indian",
            Accent::Canadian => "canadian",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Accent::American => "American",
            Accent::British => "British",
            Accent::Australian => "Australian",
            Accent::Indian => "Indian",
            Accent::Canadian => "Canadian",
        }
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference feature values for one accent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccentProfile {
    pub accent: Accent,
    pub formant_ratios: [f64; 3],
    pub pitch_variance: f64,
    /// Onsets per minute
    pub speaking_rate: f64,
}

impl AccentProfile {
    fn validate(&self) -> Result<()> {
        let name = self.accent.as_str();
        if !self.formant_ratios.iter().all(|r| r.is_finite() && *r > 0.0) {
            anyhow::bail!("{}: formant ratios must be finite and positive", name);
        }
        if !(self.pitch_variance.is_finite() && self.pitch_variance >= 0.0) {
            anyhow::bail!("{}: pitch variance must be finite and non-negative", name);
        }
        if !(self.speaking_rate.is_finite() && self.speaking_rate >= 0.0) {
            anyhow::bail!("{}: speaking rate must be finite and non-negative", name);
        }
        Ok(())
    }
}

/// One profile per accent, indexed by [`Accent::index`]
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    profiles: [AccentProfile; 5],
}

const BUILTIN_PROFILES: [AccentProfile; 5] = [
    AccentProfile {
        accent: Accent::American,
        formant_ratios: [1.2, 1.8, 2.4],
        pitch_variance: 0.15,
        speaking_rate: 150.0,
    },
    AccentProfile {
        accent: Accent::British,
        formant_ratios: [1.1, 1.6, 2.2],
        pitch_variance: 0.12,
        speaking_rate: 140.0,
    },
    AccentProfile {
        accent: Accent::Australian,
        formant_ratios: [1.3, 1.9, 2.5],
        pitch_variance: 0.18,
        speaking_rate: 160.0,
    },
    AccentProfile {
        accent: Accent::Indian,
        formant_ratios: [1.0, 1.4, 2.0],
        pitch_variance: 0.20,
        speaking_rate: 130.0,
    },
    AccentProfile {
        accent: Accent::Canadian,
        formant_ratios: [1.15, 1.7, 2.3],
        pitch_variance: 0.14,
        speaking_rate: 145.0,
    },
];

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    /// The built-in reference table
    pub fn builtin() -> Self {
        Self {
            profiles: BUILTIN_PROFILES,
        }
    }

    /// Build a table from profiles in any order
    ///
    /// Each accent must appear exactly once with valid values.
    pub fn from_profiles(profiles: Vec<AccentProfile>) -> Result<Self> {
        let mut slots: [Option<AccentProfile>; 5] = [None; 5];
        for profile in profiles {
            profile.validate()?;
            let slot = &mut slots[profile.accent.index()];
            if slot.is_some() {
                anyhow::bail!("duplicate profile for {}", profile.accent.as_str());
            }
            *slot = Some(profile);
        }

        let mut table = BUILTIN_PROFILES;
        for accent in Accent::ALL {
            table[accent.index()] = slots[accent.index()]
                .with_context(|| format!("missing profile for {}", accent.as_str()))?;
        }
        Ok(Self { profiles: table })
    }

    /// Load a JSON array of profiles
    pub fn from_json_str(json: &str) -> Result<Self> {
        let profiles: Vec<AccentProfile> =
            serde_json::from_str(json).context("Failed to parse profile table JSON")?;
        Self::from_profiles(profiles)
    }

    /// Load a JSON profile table from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile table: {:?}", path))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid profile table: {:?}", path))
    }

    pub fn get(&self, accent: Accent) -> &AccentProfile {
        &self.profiles[accent.index()]
    }

    /// Profiles in precedence order
    pub fn iter(&self) -> impl Iterator<Item = &AccentProfile> {
        self.profiles.iter()
    }
}
