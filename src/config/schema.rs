//! Configuration schema types
//!
//! Deserialized from the ceremony YAML file. Durations are human strings
//! (`"2500ms"`, `"15s"`, `"1m 30s"`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for a ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct CeremonyConfig {
    /// Timing profile
    #[serde(default)]
    pub timing: Timing,

    /// Combined championship slide definition
    #[serde(default)]
    pub combined_slide: CombinedSlideConfig,

    /// Whether autoplay starts enabled
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
}

const fn default_autoplay() -> bool {
    true
}

// ============================================================================
// Timing
// ============================================================================

/// Every delay and duration the sequencer schedules against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Timing {
    /// Intro dwell before autoplay moves on
    #[serde(with = "human_duration")]
    pub intro_duration: Duration,

    /// Dwell of a RegularSeason or Playoffs slide under autoplay
    #[serde(with = "human_duration")]
    pub slide_duration: Duration,

    /// Award entry → trophy title and finalists heading shown
    #[serde(with = "human_duration")]
    pub trophy_title_delay: Duration,

    /// Heading shown → finalist cadence starts
    #[serde(with = "human_duration")]
    pub finalists_heading_delay: Duration,

    /// Gap between consecutive finalists
    #[serde(with = "human_duration")]
    pub finalist_delay: Duration,

    /// Last finalist → winner reveal
    #[serde(with = "human_duration")]
    pub winner_reveal_delay: Duration,

    /// Winner reveal → auto-advance
    #[serde(with = "human_duration")]
    pub winner_view_duration: Duration,

    /// Autoplay suppression after a manual interaction
    #[serde(with = "human_duration")]
    pub manual_override_cooldown: Duration,

    /// Navigation lock hold after a transition
    #[serde(with = "human_duration")]
    pub settle_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            intro_duration: Duration::from_secs(8),
            slide_duration: Duration::from_secs(10),
            trophy_title_delay: Duration::from_millis(1500),
            finalists_heading_delay: Duration::from_secs(1),
            finalist_delay: Duration::from_millis(2500),
            winner_reveal_delay: Duration::from_secs(3),
            winner_view_duration: Duration::from_secs(8),
            manual_override_cooldown: Duration::from_secs(15),
            settle_delay: Duration::from_secs(1),
        }
    }
}

impl Timing {
    /// Offset from award entry at which finalist `k` (zero-based) appears.
    #[must_use]
    pub fn finalist_offset(&self, k: usize) -> Duration {
        let steps = u32::try_from(k.saturating_add(1)).unwrap_or(u32::MAX);
        self.heading_offset()
            .saturating_add(self.finalist_delay.saturating_mul(steps))
    }

    /// Offset from award entry at which the winner is revealed, given `n` finalists.
    #[must_use]
    pub fn winner_offset(&self, n: usize) -> Duration {
        let steps = u32::try_from(n).unwrap_or(u32::MAX);
        self.heading_offset()
            .saturating_add(self.finalist_delay.saturating_mul(steps))
            .saturating_add(self.winner_reveal_delay)
    }

    fn heading_offset(&self) -> Duration {
        self.trophy_title_delay
            .saturating_add(self.finalists_heading_delay)
    }

    /// Named fields, for validation messages and environment overrides.
    pub(crate) fn fields_mut(&mut self) -> [(&'static str, &mut Duration); 9] {
        [
            ("intro_duration", &mut self.intro_duration),
            ("slide_duration", &mut self.slide_duration),
            ("trophy_title_delay", &mut self.trophy_title_delay),
            ("finalists_heading_delay", &mut self.finalists_heading_delay),
            ("finalist_delay", &mut self.finalist_delay),
            ("winner_reveal_delay", &mut self.winner_reveal_delay),
            ("winner_view_duration", &mut self.winner_view_duration),
            ("manual_override_cooldown", &mut self.manual_override_cooldown),
            ("settle_delay", &mut self.settle_delay),
        ]
    }
}

// ============================================================================
// Combined Slide
// ============================================================================

/// Which underlying playoff awards fold into the combined championship slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct CombinedSlideConfig {
    /// Ids of the two conference championships and the cup, in list order
    pub award_ids: [String; 3],
}

impl Default for CombinedSlideConfig {
    fn default() -> Self {
        Self {
            award_ids: [
                "prince-of-wales".to_string(),
                "campbell-bowl".to_string(),
                "stanley-cup".to_string(),
            ],
        }
    }
}

// ============================================================================
// Duration (de)serialization
// ============================================================================

pub(crate) mod human_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let timing = Timing::default();
        assert_eq!(timing.finalist_delay, Duration::from_millis(2500));
        assert_eq!(timing.manual_override_cooldown, Duration::from_secs(15));
        assert_eq!(timing.settle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_offsets_strictly_increase() {
        let timing = Timing::default();
        let mut last = timing.trophy_title_delay;
        for k in 0..5 {
            let offset = timing.finalist_offset(k);
            assert!(offset > last);
            last = offset;
        }
        assert!(timing.winner_offset(5) > last);
    }

    #[test]
    fn test_winner_offset_value() {
        let timing = Timing::default();
        // 1.5s + 1s + 3 * 2.5s + 3s
        assert_eq!(timing.winner_offset(3), Duration::from_millis(13_000));
    }

    #[test]
    fn test_offsets_saturate() {
        let timing = Timing {
            trophy_title_delay: Duration::MAX,
            finalist_delay: Duration::MAX,
            ..Timing::default()
        };
        assert_eq!(timing.finalist_offset(usize::MAX), Duration::MAX);
        assert_eq!(timing.winner_offset(3), Duration::MAX);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = "timing:\n  finalist_delay: 2s\n  settle_delay: 750ms\nautoplay: false\n";
        let config: CeremonyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.timing.finalist_delay, Duration::from_secs(2));
        assert_eq!(config.timing.settle_delay, Duration::from_millis(750));
        assert_eq!(config.timing.slide_duration, Duration::from_secs(10));
        assert!(!config.autoplay);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: CeremonyConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.autoplay);
        assert_eq!(config.timing, Timing::default());
        assert_eq!(config.combined_slide, CombinedSlideConfig::default());
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result: Result<CeremonyConfig, _> =
            serde_yaml::from_str("timing:\n  finalist_delay: soon\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<CeremonyConfig, _> = serde_yaml::from_str("timing:\n  finalist: 2s\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_round_trip_format() {
        let yaml = serde_yaml::to_string(&Timing::default()).unwrap();
        assert!(yaml.contains("finalist_delay: 2s 500ms"));
    }
}
