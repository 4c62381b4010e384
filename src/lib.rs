use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

pub mod config;
pub mod error;

pub use config::{ReadabilityBand, ScoreWeights, Verdict, WeightConfig};
pub use error::ConfigError;

/// Upper bound of every module sub-score.
pub const MODULE_MAX: f64 = 10.0;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One scored statistic. `raw` is the measured value in its own unit,
/// `score` is the bounded sub-score in `0..=max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleScore {
    pub name: &'static str,
    pub raw: f64,
    pub score: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseHit {
    pub phrase: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub count: usize,
    /// Share of all (strict) words, in percent.
    pub density: f64,
}

/// Supporting numbers shown next to the headline score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub syllable_count: usize,
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    pub vocabulary_diversity: f64,
    pub hapax_ratio: f64,
    pub bigram_entropy: f64,
    pub trigram_entropy: f64,
    pub max_ngram_count: usize,
    pub sentence_burstiness: f64,
    pub word_burstiness: f64,
    pub flesch_reading_ease: f64,
    pub readability_band: ReadabilityBand,
    pub stock_phrases: Vec<PhraseHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Headline score, 0-100.
    pub score: f64,
    pub verdict: Verdict,
    pub modules: Vec<ModuleScore>,
    pub stats: TextStats,
    pub keywords: Vec<Keyword>,
    pub advice: Vec<String>,
}

impl Report {
    pub fn module(&self, name: &str) -> Option<&ModuleScore> {
        self.modules.iter().find(|m| m.name == name)
    }
}

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Keeps letters, numbers, punctuation, separators and whitespace.
static NON_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\p{P}\p{Z}\s]").unwrap());

static CURLY_APOSTROPHE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{2018}\u{2019}]").unwrap());

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());

static PUNCT_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\w]+|[^\w]+$").unwrap());

static VOWEL_GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[aeiouy]+").unwrap());

static STOCK_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    let words = [
        "crucial",
        "pivotal",
        "seamless",
        "seamlessly",
        "holistic",
        "multifaceted",
        "meticulous",
        "comprehensive",
        "robust",
        "innovative",
        "cutting-edge",
        "game-changing",
        "ever-evolving",
        "delve",
        "delves",
        "delving",
        "embark",
        "elevate",
        "leverage",
        "unleash",
        "unlock",
        "navigate",
        "showcase",
        "underscore",
        "tapestry",
        "testament",
        "realm",
        "landscape",
        "paradigm",
        "furthermore",
        "moreover",
        "additionally",
        "notably",
    ];
    let alt = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)\\b({alt})\\b")).unwrap()
});

static STOCK_PHRASES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let phrases = [
        "it's worth noting",
        "it's important to note",
        "in today's fast-paced",
        "in today's digital",
        "at the end of the day",
        "let's dive in",
        "without further ado",
        "look no further",
        "to the next level",
        "whether you're",
        "in conclusion",
        "in summary",
        "i hope this helps",
        "as an ai",
    ];
    phrases
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", regex::escape(p))).unwrap())
        .collect()
});

// ---------------------------------------------------------------------------
// Stopwords
// ---------------------------------------------------------------------------

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "is", "it",
        "its", "that", "this", "with", "as", "by", "from", "was", "were", "are", "be", "been",
        "has", "have", "had", "not", "no", "do", "does", "did", "will", "would", "could",
        "should", "can", "may", "might", "if", "then", "than", "so", "up", "out", "about",
        "into", "over", "after", "before", "between", "through", "just", "also", "very", "more",
        "most", "some", "any", "each", "every", "all", "both", "few", "other", "such", "only",
        "own", "same", "too", "how", "what", "which", "who", "when", "where", "why", "you",
        "your", "we", "our", "they", "their", "he", "she", "his", "her", "i", "my", "me", "us",
        "them", "there", "here", "these", "those",
    ]
    .into_iter()
    .collect()
});

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Lowercase, fold typographic apostrophes to `'`, collapse whitespace runs
/// to one space, trim.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let folded = CURLY_APOSTROPHE_RE.replace_all(&lowered, "'");
    WHITESPACE_RE.replace_all(&folded, " ").trim().to_string()
}

/// [`normalize`], after dropping everything that is not a letter, number,
/// punctuation mark or separator (emoji, symbols, control characters).
pub fn normalize_strict(text: &str) -> String {
    normalize(&NON_TEXT_RE.replace_all(text, ""))
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Runs of text closed by `.`, `!` or `?`. Trailing text without terminal
/// punctuation is not a sentence, nor is a run with no words in it.
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !split_words(s).is_empty())
        .map(str::to_string)
        .collect()
}

/// Whitespace-separated tokens with leading and trailing punctuation removed.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|t| {
            let stripped = PUNCT_STRIP_RE.replace_all(t, "");
            if stripped.is_empty() {
                None
            } else {
                Some(stripped.into_owned())
            }
        })
        .collect()
}

/// [`split_words`] without single-character tokens.
pub fn split_words_strict(text: &str) -> Vec<String> {
    split_words(text)
        .into_iter()
        .filter(|w| w.chars().count() > 1)
        .collect()
}

/// Normalized text and its token sequences. Built once per analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedText {
    pub normalized: String,
    pub sentences: Vec<String>,
    pub words: Vec<String>,
}

impl AnalyzedText {
    pub fn new(raw: &str) -> Self {
        Self::from_normalized(normalize(raw))
    }

    pub fn new_strict(raw: &str) -> Self {
        Self::from_normalized(normalize_strict(raw))
    }

    fn from_normalized(normalized: String) -> Self {
        let sentences = split_sentences(&normalized);
        let words = split_words(&normalized);
        Self {
            normalized,
            sentences,
            words,
        }
    }

    pub fn sentence_lengths(&self) -> Vec<f64> {
        self.sentences
            .iter()
            .map(|s| split_words(s).len() as f64)
            .collect()
    }

    pub fn word_lengths(&self) -> Vec<f64> {
        self.words.iter().map(|w| w.chars().count() as f64).collect()
    }
}

// ---------------------------------------------------------------------------
// N-gram statistics
// ---------------------------------------------------------------------------

/// Occurrence counts of every n-gram in a word sequence, keyed by the
/// space-joined words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMap {
    n: usize,
    total: usize,
    counts: HashMap<String, usize>,
}

impl FrequencyMap {
    pub fn build(words: &[String], n: usize) -> Self {
        let mut counts = HashMap::new();
        if n == 0 || words.len() < n {
            return Self {
                n,
                total: 0,
                counts,
            };
        }
        for window in words.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
        Self {
            n,
            total: words.len() - n + 1,
            counts,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of windows, `word_count - n + 1`.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, gram: &str) -> usize {
        self.counts.get(gram).copied().unwrap_or(0)
    }

    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Highest-count n-gram; ties go to the lexicographically smaller one.
    pub fn most_common(&self) -> Option<(&str, usize)> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(gram, &count)| (gram.as_str(), count))
    }

    /// Shannon entropy in bits, `None` when the text is shorter than `n`.
    pub fn entropy(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let total = self.total as f64;
        // fixed summation order keeps the result bit-identical across runs
        let mut counts: Vec<usize> = self.counts.values().copied().collect();
        counts.sort_unstable();
        let h: f64 = counts
            .into_iter()
            .map(|c| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum();
        // a single distinct gram sums to -0.0
        Some(if h <= 0.0 { 0.0 } else { h })
    }
}

// ---------------------------------------------------------------------------
// Distribution statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
}

impl Distribution {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            count: values.len(),
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

// ---------------------------------------------------------------------------
// Readability
// ---------------------------------------------------------------------------

/// Syllable estimate: maximal runs of `[aeiouy]`, at least one per word.
///
/// This is the usual vowel-group approximation. It overcounts silent
/// endings ("make" -> 2) and undercounts hiatus ("poem" -> 1); the Flesch
/// figures inherit that error.
pub fn count_syllables(word: &str) -> usize {
    if word.is_empty() {
        return 0;
    }
    let lower = word.to_lowercase();
    VOWEL_GROUP_RE.find_iter(&lower).count().max(1)
}

/// Flesch Reading Ease from the two ratios it is built on.
pub fn flesch_reading_ease(words_per_sentence: f64, syllables_per_word: f64) -> f64 {
    206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word
}

// ---------------------------------------------------------------------------
// Stock phrasing and keywords
// ---------------------------------------------------------------------------

/// Stock words and phrases found in `text`, most frequent first.
pub fn find_stock_phrases(text: &str) -> Vec<PhraseHit> {
    let mut hits: BTreeMap<String, usize> = BTreeMap::new();
    for m in STOCK_WORD_RE.find_iter(text) {
        *hits.entry(m.as_str().to_lowercase()).or_insert(0) += 1;
    }
    for pat in STOCK_PHRASES.iter() {
        for m in pat.find_iter(text) {
            *hits.entry(m.as_str().to_lowercase()).or_insert(0) += 1;
        }
    }
    let mut out: Vec<PhraseHit> = hits
        .into_iter()
        .map(|(phrase, count)| PhraseHit { phrase, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
    out
}

/// Most frequent non-stopword terms among `words` (already strict-split).
pub fn keyword_density(words: &[String], limit: usize) -> Vec<Keyword> {
    if words.is_empty() || limit == 0 {
        return vec![];
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for w in words {
        if !STOPWORDS.contains(w.as_str()) {
            *counts.entry(w.as_str()).or_insert(0) += 1;
        }
    }
    let total = words.len() as f64;
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(term, count)| Keyword {
            term: term.to_string(),
            count,
            density: count as f64 / total * 100.0,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Module scoring
// ---------------------------------------------------------------------------

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MODULE_MAX)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn module(name: &'static str, raw: f64, score: f64) -> ModuleScore {
    ModuleScore {
        name,
        raw: finite_or(raw, 0.0),
        score: clamp_score(score),
        max: MODULE_MAX,
    }
}

fn entropy_score(entropy: f64, config: &WeightConfig, neutral: f64) -> f64 {
    let p = &config.entropy;
    if !(p.scale > 0.0) {
        return neutral;
    }
    clamp_score((entropy - p.anchor) / p.scale)
}

struct Scored {
    modules: Vec<ModuleScore>,
    stats: TextStats,
    top_gram: Option<(String, usize)>,
}

fn score_modules(text: &AnalyzedText, config: &WeightConfig) -> Scored {
    let neutral = clamp_score(config.neutral_score);
    let defaults = WeightConfig::default();
    let entropy_fallback = finite_or(config.entropy.fallback, defaults.entropy.fallback);
    let fallback_sentence_length = finite_or(
        config.burstiness.fallback_sentence_length,
        defaults.burstiness.fallback_sentence_length,
    );
    let fallback_syllables_per_word = finite_or(
        config.readability.fallback_syllables_per_word,
        defaults.readability.fallback_syllables_per_word,
    );
    let words = &text.words;
    let wc = words.len();

    // Perplexity: bigram and trigram entropy mapped to 0-10 and averaged.
    let bigrams = FrequencyMap::build(words, 2);
    let trigrams = FrequencyMap::build(words, 3);
    let bigram_entropy = bigrams.entropy().unwrap_or(entropy_fallback);
    let trigram_entropy = trigrams.entropy().unwrap_or(entropy_fallback);
    let perplexity = module(
        "perplexity",
        (bigram_entropy + trigram_entropy) / 2.0,
        (entropy_score(bigram_entropy, config, neutral)
            + entropy_score(trigram_entropy, config, neutral))
            / 2.0,
    );

    // Repetition: the busiest n-gram per 100 words, inverted. Text in which
    // nothing repeats never scores below neutral.
    let max_ngram_count = bigrams.max_count().max(trigrams.max_count());
    let repetition = if wc < 2 {
        module("repetition", 0.0, neutral)
    } else {
        let per_100 = max_ngram_count as f64 / (wc as f64 / 100.0) * config.repetition.scale;
        let score = MODULE_MAX - per_100;
        if max_ngram_count <= 1 {
            module("repetition", per_100, clamp_score(score).max(neutral))
        } else {
            module("repetition", per_100, score)
        }
    };
    let top_gram = bigrams
        .most_common()
        .filter(|(_, count)| *count > 1)
        .map(|(gram, count)| (gram.to_string(), count));

    // Burstiness
    let sentence_dist = Distribution::of(&text.sentence_lengths());
    let word_dist = Distribution::of(&text.word_lengths());
    let sentence_sub = sentence_dist
        .map(|d| clamp_score(d.std_dev * config.burstiness.sentence_factor))
        .unwrap_or(neutral);
    let word_sub = word_dist
        .map(|d| clamp_score(d.std_dev * config.burstiness.word_factor))
        .unwrap_or(neutral);
    let sentence_burstiness = sentence_dist.map(|d| d.std_dev).unwrap_or(0.0);
    let word_burstiness = word_dist.map(|d| d.std_dev).unwrap_or(0.0);
    let burstiness = module(
        "burstiness",
        sentence_burstiness,
        (sentence_sub + word_sub) / 2.0,
    );

    // Lexical diversity
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for w in words {
        *freq.entry(w.as_str()).or_insert(0) += 1;
    }
    let (vocabulary, hapax, vocabulary_diversity, hapax_ratio) = if wc == 0 {
        (
            module("vocabulary", 0.0, neutral),
            module("hapax", 0.0, neutral),
            0.0,
            0.0,
        )
    } else {
        let diversity = freq.len() as f64 / wc as f64 * 100.0;
        let once = freq.values().filter(|&&c| c == 1).count();
        let hapax_pct = once as f64 / wc as f64 * 100.0;
        let vocab_score = if config.lexical.diversity_divisor > 0.0 {
            diversity / config.lexical.diversity_divisor
        } else {
            neutral
        };
        (
            module("vocabulary", diversity, vocab_score),
            module(
                "hapax",
                hapax_pct,
                hapax_pct * config.lexical.hapax_multiplier,
            ),
            diversity,
            hapax_pct,
        )
    };

    // Readability
    let sentence_count = text.sentences.len();
    let syllable_count: usize = words.iter().map(|w| count_syllables(w)).sum();
    let avg_sentence_length = if sentence_count == 0 {
        fallback_sentence_length
    } else {
        wc as f64 / sentence_count as f64
    };
    let syllables_per_word = if wc == 0 {
        fallback_syllables_per_word
    } else {
        syllable_count as f64 / wc as f64
    };
    let flesch = flesch_reading_ease(avg_sentence_length, syllables_per_word);
    let readability = module("readability", flesch, flesch / 10.0);
    let readability_band = config.readability.bands.band_for(flesch);

    // Stock phrasing
    let stock_phrases = find_stock_phrases(&text.normalized);
    let phrase_hits: usize = stock_phrases.iter().map(|h| h.count).sum();
    let phrasing = if wc == 0 {
        module("phrasing", 0.0, MODULE_MAX)
    } else {
        let per_100 = phrase_hits as f64 / (wc as f64 / 100.0);
        module(
            "phrasing",
            per_100,
            MODULE_MAX - per_100 * config.phrasing.penalty_per_100_words,
        )
    };

    let stats = TextStats {
        word_count: wc,
        sentence_count,
        syllable_count,
        avg_sentence_length: finite_or(avg_sentence_length, 0.0),
        avg_word_length: finite_or(word_dist.map(|d| d.mean).unwrap_or(0.0), 0.0),
        vocabulary_diversity: finite_or(vocabulary_diversity, 0.0),
        hapax_ratio: finite_or(hapax_ratio, 0.0),
        bigram_entropy: finite_or(bigram_entropy, 0.0),
        trigram_entropy: finite_or(trigram_entropy, 0.0),
        max_ngram_count,
        sentence_burstiness: finite_or(sentence_burstiness, 0.0),
        word_burstiness: finite_or(word_burstiness, 0.0),
        flesch_reading_ease: finite_or(flesch, 0.0),
        readability_band,
        stock_phrases,
    };

    Scored {
        modules: vec![
            perplexity,
            burstiness,
            repetition,
            vocabulary,
            hapax,
            readability,
            phrasing,
        ],
        stats,
        top_gram,
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Weighted mean of the module sub-scores, scaled to 0-100 and rounded to
/// one decimal.
///
/// Modules without a weight, and negative weights, count as zero. If
/// nothing carries weight every module counts equally.
pub fn aggregate(modules: &[ModuleScore], weights: &ScoreWeights) -> f64 {
    if modules.is_empty() {
        return 0.0;
    }
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for m in modules {
        let w = weights
            .get(m.name)
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(0.0);
        weighted += w * (m.score / m.max);
        total_weight += w;
    }
    let ratio = if total_weight > 0.0 {
        weighted / total_weight
    } else {
        warn!("All score weights are zero; falling back to equal weights");
        modules.iter().map(|m| m.score / m.max).sum::<f64>() / modules.len() as f64
    };
    let score = (ratio * 100.0).clamp(0.0, 100.0);
    (score * 10.0).round() / 10.0
}

fn advice_for(scored: &Scored, threshold: f64) -> Vec<String> {
    let stats = &scored.stats;
    if stats.word_count == 0 {
        return vec![
            "No readable text found; check that the page content was extracted.".to_string(),
        ];
    }
    let mut advice = Vec::new();
    for m in scored.modules.iter().filter(|m| m.score < threshold) {
        let line = match m.name {
            "perplexity" => {
                "Word sequences are highly predictable; vary phrasing and sentence openings."
                    .to_string()
            }
            "burstiness" => {
                "Sentence lengths are too uniform; mix short sentences with longer ones."
                    .to_string()
            }
            "repetition" => match &scored.top_gram {
                Some((gram, count)) => {
                    format!("'{gram}' appears {count} times; rephrase repeated word pairs.")
                }
                None => "The text is too short to judge repetition; add more copy.".to_string(),
            },
            "vocabulary" => format!(
                "Vocabulary is narrow ({:.0}% unique words); use more specific terms.",
                stats.vocabulary_diversity
            ),
            "hapax" => format!(
                "Few words appear only once ({:.0}%); add concrete details and varied wording.",
                stats.hapax_ratio
            ),
            "readability" => format!(
                "Flesch score {:.0} is hard going; shorten sentences and prefer simpler words.",
                stats.flesch_reading_ease
            ),
            "phrasing" => match stats.stock_phrases.first() {
                Some(hit) => format!(
                    "Cut stock phrasing such as '{}'; state the point directly.",
                    hit.phrase
                ),
                None => continue,
            },
            _ => continue,
        };
        advice.push(line);
    }
    deduplicate_advice(advice)
}

fn deduplicate_advice(advice: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in advice {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }
    unique
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Audit `text` with the default calibration.
pub fn analyze(text: &str) -> Report {
    analyze_with_config(text, &WeightConfig::default())
}

/// Audit `text`. Never fails: degenerate input (empty, one word, no
/// punctuation) resolves to fallback constants and every sub-score stays
/// within its bounds.
#[tracing::instrument(skip(text, config), fields(text_len = text.len()))]
pub fn analyze_with_config(text: &str, config: &WeightConfig) -> Report {
    let analyzed = if config.strict_normalize {
        AnalyzedText::new_strict(text)
    } else {
        AnalyzedText::new(text)
    };
    let scored = score_modules(&analyzed, config);
    debug!(
        words = scored.stats.word_count,
        sentences = scored.stats.sentence_count,
        bigram_entropy = scored.stats.bigram_entropy,
        trigram_entropy = scored.stats.trigram_entropy,
        flesch = scored.stats.flesch_reading_ease,
        "computed text statistics"
    );

    let score = aggregate(&scored.modules, &config.weights);
    let verdict = config.verdict.verdict_for(score);
    let advice = advice_for(&scored, config.advice_threshold);
    let keywords = keyword_density(
        &split_words_strict(&analyzed.normalized),
        config.keyword_limit,
    );

    Report {
        score,
        verdict,
        modules: scored.modules,
        stats: scored.stats,
        keywords,
        advice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_score_maps_nan_to_zero() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(f64::INFINITY), MODULE_MAX);
        assert_eq!(clamp_score(-3.0), 0.0);
    }

    #[test]
    fn single_gram_entropy_is_positive_zero() {
        let words: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let map = FrequencyMap::build(&words, 2);
        let h = map.entropy().unwrap();
        assert_eq!(h, 0.0);
        assert!(h.is_sign_positive());
    }

    #[test]
    fn zero_entropy_scale_falls_back_to_neutral() {
        let mut config = WeightConfig::default();
        config.entropy.scale = 0.0;
        assert_eq!(entropy_score(9.0, &config, 5.0), 5.0);
    }

    #[test]
    fn advice_is_deduplicated_in_order() {
        let advice = deduplicate_advice(vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
        ]);
        assert_eq!(advice, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn repetition_advice_names_the_repeated_pair() {
        let text = "the cat the cat the cat the cat the cat the cat.";
        let analyzed = AnalyzedText::new(text);
        let scored = score_modules(&analyzed, &WeightConfig::default());
        let advice = advice_for(&scored, 5.0);
        assert!(advice.iter().any(|a| a.contains("'the cat' appears 6 times")));
    }
}
