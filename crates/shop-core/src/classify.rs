//! Number extraction and size/price classification for chat messages.
//!
//! A message like `"Quiero el 38 en 250"` yields the numbers `[38, 250]`;
//! with the default rule 38 is a size and 250 is a price.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ShopError};

/// Smallest shoe size recognised.
pub const SIZE_MIN: u64 = 0;
/// Largest shoe size recognised.
pub const SIZE_MAX: u64 = 46;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `\b` on both sides: the run must not touch a letter, digit or underscore.
    RE.get_or_init(|| Regex::new(r"\b[0-9]+\b").expect("regex is valid"))
}

/// Extract every standalone run of ASCII digits from `text`, in order.
///
/// A run glued to a letter or underscore (`talla38`, `IMG_2024.jpg`) is not a
/// standalone number; punctuation and whitespace are fine separators
/// (`38.jpg`, `38,250`). Runs that overflow `u64` are dropped.
pub fn extract_numbers(text: &str) -> Vec<u64> {
    number_regex()
        .find_iter(text)
        .filter_map(|m| match m.as_str().parse::<u64>() {
            Ok(n) => Some(n),
            Err(e) => {
                debug!("Skipping digit run {:?}: {}", m.as_str(), e);
                None
            }
        })
        .collect()
}

// ── PriceRule ─────────────────────────────────────────────────────────────────

/// Inclusive range a number must fall in to count as a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRule {
    pub lower: u64,
    /// `None` means unbounded.
    pub upper: Option<u64>,
}

impl PriceRule {
    /// 70 to 5000 inclusive. Keeps millisecond timestamps and phone numbers
    /// out of the price totals.
    pub const fn bounded() -> Self {
        Self {
            lower: 70,
            upper: Some(5000),
        }
    }

    /// 80 and above, no upper bound.
    pub const fn open_ended() -> Self {
        Self {
            lower: 80,
            upper: None,
        }
    }

    pub fn contains(&self, value: u64) -> bool {
        value >= self.lower && self.upper.map_or(true, |u| value <= u)
    }
}

impl Default for PriceRule {
    fn default() -> Self {
        Self::bounded()
    }
}

impl fmt::Display for PriceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "{}-{}", self.lower, upper),
            None => write!(f, ">={}", self.lower),
        }
    }
}

/// Named price rule selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PriceRuleKind {
    /// 70 to 5000 inclusive
    Bounded,
    /// 80 and above
    Open,
}

impl PriceRuleKind {
    pub fn rule(self) -> PriceRule {
        match self {
            PriceRuleKind::Bounded => PriceRule::bounded(),
            PriceRuleKind::Open => PriceRule::open_ended(),
        }
    }
}

impl fmt::Display for PriceRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceRuleKind::Bounded => f.write_str("bounded"),
            PriceRuleKind::Open => f.write_str("open"),
        }
    }
}

// ── ClassifierConfig ──────────────────────────────────────────────────────────

/// Everything that differs between log-processing runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub size_min: u64,
    pub size_max: u64,
    pub price: PriceRule,
    /// Look for `[archivo guardado: <millis>.<ext>]` markers.
    pub extract_attachments: bool,
}

impl ClassifierConfig {
    /// Build a config with the fixed 0–46 size range.
    ///
    /// Fails when the price range overlaps the size range or is inverted, so a
    /// number can never be both a size and a price.
    pub fn new(price: PriceRule, extract_attachments: bool) -> Result<Self> {
        if price.lower <= SIZE_MAX {
            return Err(ShopError::InvalidPriceRule(format!(
                "lower bound {} overlaps sizes {}-{}",
                price.lower, SIZE_MIN, SIZE_MAX
            )));
        }
        if let Some(upper) = price.upper {
            if upper < price.lower {
                return Err(ShopError::InvalidPriceRule(format!(
                    "upper bound {} is below lower bound {}",
                    upper, price.lower
                )));
            }
        }
        Ok(Self {
            size_min: SIZE_MIN,
            size_max: SIZE_MAX,
            price,
            extract_attachments,
        })
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            size_min: SIZE_MIN,
            size_max: SIZE_MAX,
            price: PriceRule::bounded(),
            extract_attachments: true,
        }
    }
}

// ── TokenClassifier ───────────────────────────────────────────────────────────

/// What a number in a message stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Size,
    Price,
}

/// Sizes and prices found in one message, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedTokens {
    pub sizes: Vec<u64>,
    pub prices: Vec<u64>,
}

impl ClassifiedTokens {
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty() && self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sizes.len() + self.prices.len()
    }
}

/// Applies a single [`ClassifierConfig`] to every number it sees.
#[derive(Debug, Clone, Default)]
pub struct TokenClassifier {
    config: ClassifierConfig,
}

impl TokenClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, value: u64) -> Option<TokenKind> {
        if value >= self.config.size_min && value <= self.config.size_max {
            Some(TokenKind::Size)
        } else if self.config.price.contains(value) {
            Some(TokenKind::Price)
        } else {
            None
        }
    }

    pub fn classify_text(&self, text: &str) -> ClassifiedTokens {
        let mut tokens = ClassifiedTokens::default();
        for n in extract_numbers(text) {
            match self.classify(n) {
                Some(TokenKind::Size) => tokens.sizes.push(n),
                Some(TokenKind::Price) => tokens.prices.push(n),
                None => {}
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded() -> TokenClassifier {
        TokenClassifier::new(ClassifierConfig::new(PriceRule::bounded(), true).unwrap())
    }

    fn open() -> TokenClassifier {
        TokenClassifier::new(ClassifierConfig::new(PriceRule::open_ended(), false).unwrap())
    }

    // ── extract_numbers ───────────────────────────────────────────────────────

    #[test]
    fn test_extract_numbers_simple_message() {
        assert_eq!(extract_numbers("Quiero el 38 en 250"), vec![38, 250]);
    }

    #[test]
    fn test_extract_numbers_no_digits() {
        assert!(extract_numbers("hola").is_empty());
    }

    #[test]
    fn test_extract_numbers_leading_zeros() {
        assert_eq!(extract_numbers("talla 038 precio 0250"), vec![38, 250]);
    }

    #[test]
    fn test_extract_numbers_punctuation_separates() {
        assert_eq!(extract_numbers("38,39 y 40."), vec![38, 39, 40]);
    }

    #[test]
    fn test_extract_numbers_filename_like_strings() {
        // Underscore and letters are word characters: no boundary.
        assert!(extract_numbers("foto_38.jpg").is_empty());
        assert!(extract_numbers("IMG2024.png").is_empty());
        assert!(extract_numbers("talla38").is_empty());
        // A dot is not a word character, so `38.jpg` still yields 38.
        assert_eq!(extract_numbers("mira foto 38.jpg"), vec![38]);
    }

    #[test]
    fn test_extract_numbers_attachment_marker() {
        assert_eq!(
            extract_numbers("[archivo guardado: 1729187892000.jpg]"),
            vec![1_729_187_892_000]
        );
    }

    #[test]
    fn test_extract_numbers_overflow_is_skipped() {
        assert_eq!(extract_numbers("99999999999999999999999 y 40"), vec![40]);
    }

    #[test]
    fn test_extract_numbers_never_negative() {
        assert_eq!(extract_numbers("-38"), vec![38]);
    }

    // ── PriceRule ─────────────────────────────────────────────────────────────

    #[test]
    fn test_price_rule_bounded_edges() {
        let rule = PriceRule::bounded();
        assert!(!rule.contains(69));
        assert!(rule.contains(70));
        assert!(rule.contains(5000));
        assert!(!rule.contains(5001));
    }

    #[test]
    fn test_price_rule_open_edges() {
        let rule = PriceRule::open_ended();
        assert!(!rule.contains(79));
        assert!(rule.contains(80));
        assert!(rule.contains(u64::MAX));
    }

    #[test]
    fn test_price_rule_display() {
        assert_eq!(PriceRule::bounded().to_string(), "70-5000");
        assert_eq!(PriceRule::open_ended().to_string(), ">=80");
    }

    #[test]
    fn test_price_rule_kind_maps_to_rule() {
        assert_eq!(PriceRuleKind::Bounded.rule(), PriceRule::bounded());
        assert_eq!(PriceRuleKind::Open.rule(), PriceRule::open_ended());
    }

    // ── ClassifierConfig ──────────────────────────────────────────────────────

    #[test]
    fn test_config_rejects_overlap_with_sizes() {
        let rule = PriceRule {
            lower: 46,
            upper: None,
        };
        assert!(matches!(
            ClassifierConfig::new(rule, false),
            Err(ShopError::InvalidPriceRule(_))
        ));
    }

    #[test]
    fn test_config_rejects_inverted_bounds() {
        let rule = PriceRule {
            lower: 500,
            upper: Some(100),
        };
        assert!(ClassifierConfig::new(rule, false).is_err());
    }

    #[test]
    fn test_config_default_is_bounded_with_attachments() {
        let config = ClassifierConfig::default();
        assert_eq!(config.price, PriceRule::bounded());
        assert!(config.extract_attachments);
        assert_eq!((config.size_min, config.size_max), (0, 46));
    }

    // ── TokenClassifier ───────────────────────────────────────────────────────

    #[test]
    fn test_classify_size_range() {
        let c = bounded();
        assert_eq!(c.classify(0), Some(TokenKind::Size));
        assert_eq!(c.classify(46), Some(TokenKind::Size));
        assert_eq!(c.classify(47), None);
    }

    #[test]
    fn test_classify_gap_between_sizes_and_prices() {
        assert_eq!(bounded().classify(60), None);
        assert_eq!(open().classify(75), None);
        assert_eq!(bounded().classify(75), Some(TokenKind::Price));
    }

    #[test]
    fn test_classify_text_example() {
        let tokens = bounded().classify_text("Quiero el 38 en 250");
        assert_eq!(tokens.sizes, vec![38]);
        assert_eq!(tokens.prices, vec![250]);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_classify_text_timestamp_depends_on_rule() {
        let text = "[archivo guardado: 1729187892000.jpg]";
        assert!(bounded().classify_text(text).is_empty());
        assert_eq!(open().classify_text(text).prices, vec![1_729_187_892_000]);
    }

    #[test]
    fn test_classify_text_keeps_order_and_duplicates() {
        let tokens = bounded().classify_text("40 300 38 40 120");
        assert_eq!(tokens.sizes, vec![40, 38, 40]);
        assert_eq!(tokens.prices, vec![300, 120]);
    }
}
