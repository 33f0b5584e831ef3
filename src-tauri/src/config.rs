use serde::{Deserialize, Serialize};

/// Tuning knobs for the forecaster, persisted with the app settings.
///
/// The defaults are the empirically tuned values the engine shipped with.
/// They are a tuning surface, not statistically derived bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionConfig {
    /// Number of future days projected per habit.
    pub horizon_days: u32,
    /// Records required before history-derived statistics are used.
    pub min_history: usize,
    /// Paired (completion, mood) days required before a correlation is reported.
    pub min_mood_pairs: usize,
    /// Forecast probability below which a day is flagged as the next risk date.
    pub risk_threshold: f64,
    pub max_recommendations: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            horizon_days: 90,
            min_history: 7,
            min_mood_pairs: 5,
            risk_threshold: 0.4,
            max_recommendations: 5,
        }
    }
}

impl PredictionConfig {
    /// Clamp user-edited values back into ranges the engine can work with.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let sanitized = Self {
            horizon_days: self.horizon_days.clamp(28, 365),
            min_history: self.min_history.max(1),
            min_mood_pairs: self.min_mood_pairs.max(2),
            risk_threshold: if self.risk_threshold.is_finite()
                && self.risk_threshold > 0.0
                && self.risk_threshold < 1.0
            {
                self.risk_threshold
            } else {
                defaults.risk_threshold
            },
            max_recommendations: self.max_recommendations.max(1),
        };
        if sanitized != self {
            log::warn!("prediction settings out of range, using {:?}", sanitized);
        }
        sanitized
    }
}
