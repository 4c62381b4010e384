//! Calibration constants for the audit heuristics.
//!
//! None of these numbers has a derivation behind it. They are empirical
//! anchors, so every one of them can be overridden from a TOML file:
//!
//! ```toml
//! [entropy]
//! anchor = 4.0
//! scale = 0.8
//!
//! [weights]
//! perplexity = 0.3
//! readability = 0.05
//! ```
//!
//! Sections and keys that are left out keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightConfig {
    /// Sub-score used whenever a statistic has no data to work with.
    pub neutral_score: f64,
    /// Modules scoring below this get a line of advice.
    pub advice_threshold: f64,
    /// Number of keywords listed in the report.
    pub keyword_limit: usize,
    /// Run the strict normalizer (drops symbols and emoji) before tokenizing.
    pub strict_normalize: bool,
    pub entropy: EntropyParams,
    pub burstiness: BurstinessParams,
    pub repetition: RepetitionParams,
    pub lexical: LexicalParams,
    pub readability: ReadabilityParams,
    pub phrasing: PhrasingParams,
    pub weights: ScoreWeights,
    pub verdict: VerdictBands,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            neutral_score: 5.0,
            advice_threshold: 5.0,
            keyword_limit: 10,
            strict_normalize: false,
            entropy: EntropyParams::default(),
            burstiness: BurstinessParams::default(),
            repetition: RepetitionParams::default(),
            lexical: LexicalParams::default(),
            readability: ReadabilityParams::default(),
            phrasing: PhrasingParams::default(),
            weights: ScoreWeights::default(),
            verdict: VerdictBands::default(),
        }
    }
}

/// Affine map from n-gram entropy (bits) to the perplexity sub-score:
/// `(entropy - anchor) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntropyParams {
    pub anchor: f64,
    pub scale: f64,
    /// Entropy assumed when the text is shorter than the n-gram size.
    pub fallback: f64,
}

impl Default for EntropyParams {
    fn default() -> Self {
        Self {
            anchor: 4.0,
            scale: 0.8,
            fallback: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BurstinessParams {
    /// Multiplier applied to the sentence-length standard deviation (words).
    pub sentence_factor: f64,
    /// Multiplier applied to the word-length standard deviation (chars).
    pub word_factor: f64,
    /// Average sentence length assumed when no sentence boundary is found.
    pub fallback_sentence_length: f64,
}

impl Default for BurstinessParams {
    fn default() -> Self {
        Self {
            sentence_factor: 1.0,
            word_factor: 4.0,
            fallback_sentence_length: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepetitionParams {
    /// Multiplier on the max n-gram count per 100 words.
    pub scale: f64,
}

impl Default for RepetitionParams {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexicalParams {
    pub diversity_divisor: f64,
    pub hapax_multiplier: f64,
}

impl Default for LexicalParams {
    fn default() -> Self {
        Self {
            diversity_divisor: 10.0,
            hapax_multiplier: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadabilityParams {
    /// Syllables per word assumed for text without words.
    pub fallback_syllables_per_word: f64,
    pub bands: ReadabilityBands,
}

impl Default for ReadabilityParams {
    fn default() -> Self {
        Self {
            fallback_syllables_per_word: 1.5,
            bands: ReadabilityBands::default(),
        }
    }
}

/// Lower bounds of the Flesch bands. Anything under `fair` is poor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadabilityBands {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl Default for ReadabilityBands {
    fn default() -> Self {
        Self {
            excellent: 80.0,
            good: 60.0,
            fair: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadabilityBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ReadabilityBands {
    pub fn band_for(&self, flesch: f64) -> ReadabilityBand {
        if flesch >= self.excellent {
            ReadabilityBand::Excellent
        } else if flesch >= self.good {
            ReadabilityBand::Good
        } else if flesch >= self.fair {
            ReadabilityBand::Fair
        } else {
            ReadabilityBand::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhrasingParams {
    /// Points taken off the sub-score per stock phrase per 100 words.
    pub penalty_per_100_words: f64,
}

impl Default for PhrasingParams {
    fn default() -> Self {
        Self {
            penalty_per_100_words: 2.0,
        }
    }
}

/// Relative weight of each module in the headline score.
///
/// Weights don't need to sum to 1; the aggregate divides by their sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    pub perplexity: f64,
    pub burstiness: f64,
    pub repetition: f64,
    pub vocabulary: f64,
    pub hapax: f64,
    pub readability: f64,
    pub phrasing: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            perplexity: 0.25,
            burstiness: 0.15,
            repetition: 0.15,
            vocabulary: 0.10,
            hapax: 0.10,
            readability: 0.10,
            phrasing: 0.15,
        }
    }
}

impl ScoreWeights {
    /// Weight for a module name as it appears in the report, if known.
    pub fn get(&self, module: &str) -> Option<f64> {
        let w = match module {
            "perplexity" => self.perplexity,
            "burstiness" => self.burstiness,
            "repetition" => self.repetition,
            "vocabulary" => self.vocabulary,
            "hapax" => self.hapax,
            "readability" => self.readability,
            "phrasing" => self.phrasing,
            _ => return None,
        };
        Some(w)
    }

    fn all(&self) -> [(&'static str, f64); 7] {
        [
            ("perplexity", self.perplexity),
            ("burstiness", self.burstiness),
            ("repetition", self.repetition),
            ("vocabulary", self.vocabulary),
            ("hapax", self.hapax),
            ("readability", self.readability),
            ("phrasing", self.phrasing),
        ]
    }
}

/// Lower bounds of the headline verdicts, on the 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerdictBands {
    pub likely_human: f64,
    pub mixed: f64,
}

impl Default for VerdictBands {
    fn default() -> Self {
        Self {
            likely_human: 70.0,
            mixed: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    LikelyHuman,
    Mixed,
    LikelyAi,
}

impl VerdictBands {
    pub fn verdict_for(&self, score: f64) -> Verdict {
        if score >= self.likely_human {
            Verdict::LikelyHuman
        } else if score >= self.mixed {
            Verdict::Mixed
        } else {
            Verdict::LikelyAi
        }
    }
}

impl WeightConfig {
    /// Parse a config from TOML source.
    pub fn from_toml_str(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&src).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded weight config from {}", path.display());
        Ok(config)
    }

    /// Reject values the scoring functions can't use meaningfully.
    ///
    /// The engine still guards every division at analysis time; this only
    /// catches mistakes in hand-edited files early.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("entropy.scale", self.entropy.scale),
            ("lexical.diversity_divisor", self.lexical.diversity_divisor),
            (
                "burstiness.fallback_sentence_length",
                self.burstiness.fallback_sentence_length,
            ),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("burstiness.sentence_factor", self.burstiness.sentence_factor),
            ("burstiness.word_factor", self.burstiness.word_factor),
            ("repetition.scale", self.repetition.scale),
            ("lexical.hapax_multiplier", self.lexical.hapax_multiplier),
            (
                "readability.fallback_syllables_per_word",
                self.readability.fallback_syllables_per_word,
            ),
            (
                "phrasing.penalty_per_100_words",
                self.phrasing.penalty_per_100_words,
            ),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(format!(
                    "{name} must be zero or positive, got {value}"
                )));
            }
        }

        if !self.entropy.anchor.is_finite() || !self.entropy.fallback.is_finite() {
            return Err(ConfigError::invalid("entropy anchor and fallback must be finite"));
        }
        if !(0.0..=10.0).contains(&self.neutral_score) {
            return Err(ConfigError::invalid(format!(
                "neutral_score must be within 0..=10, got {}",
                self.neutral_score
            )));
        }
        if !(0.0..=10.0).contains(&self.advice_threshold) {
            return Err(ConfigError::invalid(format!(
                "advice_threshold must be within 0..=10, got {}",
                self.advice_threshold
            )));
        }

        for (name, w) in self.weights.all() {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::invalid(format!(
                    "weights.{name} must be zero or positive, got {w}"
                )));
            }
        }

        let b = &self.readability.bands;
        if !(b.excellent >= b.good && b.good >= b.fair) {
            return Err(ConfigError::invalid(
                "readability bands must satisfy excellent >= good >= fair",
            ));
        }
        if self.verdict.likely_human < self.verdict.mixed {
            return Err(ConfigError::invalid(
                "verdict bands must satisfy likely_human >= mixed",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(WeightConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = WeightConfig::from_toml_str("[entropy]\nanchor = 3.5\n").unwrap();
        assert_eq!(cfg.entropy.anchor, 3.5);
        assert_eq!(cfg.entropy.scale, 0.8);
        assert_eq!(cfg.weights, ScoreWeights::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(WeightConfig::from_toml_str("[weights]\nperplexty = 1.0\n").is_err());
    }

    #[test]
    fn zero_entropy_scale_is_invalid() {
        let mut cfg = WeightConfig::default();
        cfg.entropy.scale = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn inverted_bands_are_invalid() {
        let mut cfg = WeightConfig::default();
        cfg.readability.bands.good = 90.0;
        assert!(cfg.validate().is_err());

        let mut cfg = WeightConfig::default();
        cfg.verdict.mixed = 80.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn readability_band_edges() {
        let bands = ReadabilityBands::default();
        assert_eq!(bands.band_for(80.0), ReadabilityBand::Excellent);
        assert_eq!(bands.band_for(79.9), ReadabilityBand::Good);
        assert_eq!(bands.band_for(40.0), ReadabilityBand::Fair);
        assert_eq!(bands.band_for(-12.0), ReadabilityBand::Poor);
    }

    #[test]
    fn weight_lookup_by_module_name() {
        let w = ScoreWeights::default();
        assert_eq!(w.get("perplexity"), Some(0.25));
        assert_eq!(w.get("keywords"), None);
    }
}
