//! Stability classification
//!
//! Classifies how durable a candidate is expected to be across UI changes,
//! and orders candidates of equal priority. Dynamic-looking values (OTP
//! codes, dates, auto-generated ids) never change a candidate's class; they
//! only lose ties against stable-looking values of the same class.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use super::candidate::{SelectorCandidate, SelectorStrategy, StabilityClass};

/// Patterns that indicate auto-generated identifiers (less stable)
static AUTO_GENERATED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}").unwrap(), // UUID pattern
        Regex::new(r"_\d{10,}").unwrap(),                // Timestamp suffix
        Regex::new(r"[A-Za-z]+\d{5,}").unwrap(),         // Random number suffix
        Regex::new(r"^generated_").unwrap(),             // Explicit generated prefix
    ]
});

/// Text patterns that change between runs
static DYNAMIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^\d{4,6}$").unwrap(),            // OTP code
        Regex::new(r"0[0-9]{9,10}").unwrap(),         // Phone number
        Regex::new(r"\d{1,3}(,\d{3})+").unwrap(),     // Formatted number
        Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").unwrap(), // Date
        Regex::new(r"\d{1,2}:\d{2}(:\d{2})?").unwrap(), // Time
        Regex::new(r"[$€£¥]\s?\d").unwrap(),          // Currency amount
    ]
});

/// Classify one candidate.
///
/// Any ambiguous candidate is FRAGILE regardless of strategy; the indexed
/// path is FRAGILE even when unique because any sibling reorder breaks it.
pub fn classify(strategy: SelectorStrategy, uniqueness: usize, depth: usize) -> StabilityClass {
    if uniqueness != 1 || strategy == SelectorStrategy::IndexedPath {
        return StabilityClass::Fragile;
    }

    match strategy {
        SelectorStrategy::StableId | SelectorStrategy::Label => StabilityClass::High,
        SelectorStrategy::Text => StabilityClass::Medium,
        SelectorStrategy::IdPath => {
            if depth <= 3 {
                StabilityClass::Medium
            } else {
                StabilityClass::Low
            }
        }
        SelectorStrategy::TypePath => StabilityClass::Low,
        SelectorStrategy::IndexedPath => StabilityClass::Fragile,
    }
}

/// Whether a value looks auto-generated or run-dependent
pub fn looks_dynamic(value: &str) -> bool {
    AUTO_GENERATED_PATTERNS.iter().any(|p| p.is_match(value))
        || DYNAMIC_PATTERNS.iter().any(|p| p.is_match(value))
}

/// Full candidate ordering for fallback chains: strategy priority, then
/// stability class, then shorter serialized value, then fewer ancestor
/// levels, then stable-looking before dynamic-looking values.
pub fn candidate_order(a: &SelectorCandidate, b: &SelectorCandidate) -> Ordering {
    a.strategy
        .cmp(&b.strategy)
        .then(a.stability.rank().cmp(&b.stability.rank()))
        .then(a.value.len().cmp(&b.value.len()))
        .then(a.depth().cmp(&b.depth()))
        .then(looks_dynamic(&a.value).cmp(&looks_dynamic(&b.value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        use SelectorStrategy::*;
        use StabilityClass::*;

        assert_eq!(classify(StableId, 1, 0), High);
        assert_eq!(classify(Label, 1, 0), High);
        assert_eq!(classify(Text, 1, 0), Medium);
        assert_eq!(classify(IdPath, 1, 3), Medium);
        assert_eq!(classify(IdPath, 1, 4), Low);
        assert_eq!(classify(TypePath, 1, 5), Low);
        assert_eq!(classify(IndexedPath, 1, 2), Fragile);
        // any ambiguity is fragile regardless of strategy
        assert_eq!(classify(StableId, 2, 0), Fragile);
        assert_eq!(classify(Text, 0, 0), Fragile);
    }

    #[test]
    fn test_looks_dynamic() {
        assert!(looks_dynamic("123456"));
        assert!(looks_dynamic("12/31/2024"));
        assert!(looks_dynamic("14:30"));
        assert!(looks_dynamic("1,234,567"));
        assert!(looks_dynamic("$ 42"));
        assert!(looks_dynamic("generated_row"));
        assert!(looks_dynamic("cell_1700000000"));
        assert!(!looks_dynamic("Log In"));
        assert!(!looks_dynamic("com.app:id/login_btn"));
    }

    #[test]
    fn test_order_prefers_priority_then_stability() {
        let id = SelectorCandidate {
            strategy: SelectorStrategy::StableId,
            value: "login_btn".into(),
            uniqueness: 1,
            stability: StabilityClass::High,
        };
        let text = SelectorCandidate {
            strategy: SelectorStrategy::Text,
            value: "Log In".into(),
            uniqueness: 1,
            stability: StabilityClass::Medium,
        };
        assert_eq!(candidate_order(&id, &text), Ordering::Less);
    }

    #[test]
    fn test_order_tie_breaks_on_length_then_dynamic() {
        let short = SelectorCandidate {
            strategy: SelectorStrategy::Text,
            value: "Save".into(),
            uniqueness: 1,
            stability: StabilityClass::Medium,
        };
        let long = SelectorCandidate {
            strategy: SelectorStrategy::Text,
            value: "Save and continue".into(),
            uniqueness: 1,
            stability: StabilityClass::Medium,
        };
        assert_eq!(candidate_order(&short, &long), Ordering::Less);

        let stable = SelectorCandidate {
            strategy: SelectorStrategy::Text,
            value: "Done".into(),
            uniqueness: 1,
            stability: StabilityClass::Medium,
        };
        let dynamic = SelectorCandidate {
            strategy: SelectorStrategy::Text,
            value: "4321".into(),
            uniqueness: 1,
            stability: StabilityClass::Medium,
        };
        assert_eq!(candidate_order(&stable, &dynamic), Ordering::Less);
    }
}
