use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of completed cycles that ends a session, for every preset.
pub const SESSION_CYCLES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
}

impl Phase {
    /// Next phase in the cycle: Inhale -> Hold -> Exhale -> Inhale.
    pub fn next(self) -> Self {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Inhale,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::Hold => "Hold",
            Phase::Exhale => "Exhale",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seconds spent in each phase of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub inhale_secs: u32,
    pub hold_secs: u32,
    pub exhale_secs: u32,
}

impl PhaseDurations {
    pub const fn new(inhale_secs: u32, hold_secs: u32, exhale_secs: u32) -> Self {
        Self {
            inhale_secs,
            hold_secs,
            exhale_secs,
        }
    }

    pub fn for_phase(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale_secs,
            Phase::Hold => self.hold_secs,
            Phase::Exhale => self.exhale_secs,
        }
    }

    /// Ticks needed for one full cycle.
    pub fn cycle_secs(&self) -> u32 {
        self.inhale_secs
            .saturating_add(self.hold_secs)
            .saturating_add(self.exhale_secs)
    }
}

/// The three fixed breathing exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Calm,
    BoxBreathing,
    Coffee,
}

impl Preset {
    /// Menu order.
    pub const ALL: [Preset; 3] = [Preset::Calm, Preset::BoxBreathing, Preset::Coffee];

    pub fn durations(self) -> PhaseDurations {
        match self {
            Preset::Calm => PhaseDurations::new(6, 7, 8),
            Preset::BoxBreathing => PhaseDurations::new(4, 4, 4),
            // No hold: the clock skips straight from inhale to exhale.
            Preset::Coffee => PhaseDurations::new(6, 0, 2),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Preset::Calm => "Calm",
            Preset::BoxBreathing => "Box Breathing",
            Preset::Coffee => "Coffee",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Calm => "Calm breathing exercise description",
            Preset::BoxBreathing => "Box breathing exercise description",
            Preset::Coffee => "Coffee breathing exercise description",
        }
    }

    /// Stable identifier, matching the serialized form.
    pub fn key(self) -> &'static str {
        match self {
            Preset::Calm => "calm",
            Preset::BoxBreathing => "box-breathing",
            Preset::Coffee => "coffee",
        }
    }

    pub fn cycle_secs(self) -> u32 {
        self.durations().cycle_secs()
    }

    /// Ticks for a complete session of [`SESSION_CYCLES`] cycles.
    pub fn session_secs(self) -> u32 {
        self.cycle_secs().saturating_mul(SESSION_CYCLES)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Preset {
    type Err = CoreError;

    /// Accepts `BoxBreathing`, `box-breathing`, `box_breathing` and
    /// `Box Breathing`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "calm" => Ok(Preset::Calm),
            "boxbreathing" | "box" => Ok(Preset::BoxBreathing),
            "coffee" => Ok(Preset::Coffee),
            _ => Err(CoreError::UnknownPreset(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_table_matches_fixed_constants() {
        assert_eq!(Preset::Calm.durations(), PhaseDurations::new(6, 7, 8));
        assert_eq!(Preset::BoxBreathing.durations(), PhaseDurations::new(4, 4, 4));
        assert_eq!(Preset::Coffee.durations(), PhaseDurations::new(6, 0, 2));
    }

    #[test]
    fn session_length() {
        assert_eq!(Preset::BoxBreathing.session_secs(), 72);
        assert_eq!(Preset::Coffee.session_secs(), 48);
        assert_eq!(Preset::Calm.session_secs(), 126);
    }

    #[test]
    fn phase_order_is_cyclic() {
        assert_eq!(Phase::Inhale.next(), Phase::Hold);
        assert_eq!(Phase::Hold.next(), Phase::Exhale);
        assert_eq!(Phase::Exhale.next(), Phase::Inhale);
    }

    #[test]
    fn parse_accepts_common_spellings() {
        for name in ["BoxBreathing", "box-breathing", "box_breathing", "Box Breathing", " BOX "] {
            assert_eq!(name.parse::<Preset>().unwrap(), Preset::BoxBreathing, "{name}");
        }
        assert_eq!("Calm".parse::<Preset>().unwrap(), Preset::Calm);
        assert_eq!("coffee".parse::<Preset>().unwrap(), Preset::Coffee);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "tea".parse::<Preset>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownPreset(ref n) if n == "tea"));
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Preset::BoxBreathing).unwrap();
        assert_eq!(json, "\"box-breathing\"");
        for preset in Preset::ALL {
            assert_eq!(
                serde_json::to_string(&preset).unwrap(),
                format!("\"{}\"", preset.key())
            );
        }
    }
}
