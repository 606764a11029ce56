/// Similarity weights for signature-based healing.
///
/// Weights sum to 1.0 by default. When no classifier is injected its
/// adjustment simply does not apply; the base weights already cover the
/// whole range.
#[derive(Debug, Clone)]
pub struct SimilarityWeights {
    /// Exact label or text match
    pub label_text: f64,

    /// Ancestor coarse-type chain sequence similarity
    pub ancestor_chain: f64,

    /// Sibling index proximity
    pub sibling_index: f64,

    /// Coarse element type match
    pub coarse_type: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            label_text: 0.40,
            ancestor_chain: 0.30,
            sibling_index: 0.15,
            coarse_type: 0.15,
        }
    }
}

/// Engine configuration
///
/// Thresholds and weights are deliberately tunable rather than hard-coded;
/// the defaults are the tested baseline.
#[derive(Debug, Clone)]
pub struct HealConfig {
    /// Timeout for one snapshot capture (ms)
    pub snapshot_timeout_ms: u64,

    /// Overall deadline for one healing attempt (ms)
    pub attempt_deadline_ms: u64,

    /// Minimum similarity score to adopt a replacement selector
    pub accept_threshold: f64,

    /// Minimum similarity score to record a suggestion without adopting it
    pub defer_threshold: f64,

    /// Maximum boost/penalty applied from classifier agreement
    pub classifier_adjustment: f64,

    /// Similarity factor weights
    pub weights: SimilarityWeights,

    /// Healing history cap per entry (oldest evicted first)
    pub history_cap: usize,

    /// Maximum accessibility-label length considered selectable
    pub max_label_len: usize,

    /// Maximum visible-text length considered selectable
    pub max_text_len: usize,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            snapshot_timeout_ms: 5000,
            attempt_deadline_ms: 15000,
            accept_threshold: 0.7,
            defer_threshold: 0.4,
            classifier_adjustment: 0.10,
            weights: SimilarityWeights::default(),
            history_cap: 25,
            max_label_len: 100,
            max_text_len: 50,
        }
    }
}
