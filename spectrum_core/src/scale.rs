use spectrum_schema::{SCORE_MAX, SCORE_MIN};

/// Linear map from the score domain onto a horizontal pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMapper {
    range_start: f64,
    range_end: f64,
}

impl ScaleMapper {
    /// Maps the domain onto `[range_start, range_end]`.
    pub fn new(range_start: f64, range_end: f64) -> Self {
        Self {
            range_start,
            range_end,
        }
    }

    /// Usable range for a container of `width`, inset by `margin` on both sides.
    ///
    /// Containers narrower than both margins collapse to a single column at
    /// their midpoint instead of inverting.
    pub fn for_container(width: f64, margin: f64) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        if width <= 2.0 * margin {
            let mid = width / 2.0;
            return Self::new(mid, mid);
        }
        Self::new(margin, width - margin)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    pub fn span(&self) -> f64 {
        self.range_end - self.range_start
    }

    /// Scores outside the domain are clamped; NaN maps to the domain midpoint.
    pub fn to_x(&self, score: f64) -> f64 {
        let score = clamp_score(score);
        let t = (score - SCORE_MIN) / (SCORE_MAX - SCORE_MIN);
        self.range_start + t * self.span()
    }

    pub fn to_score(&self, x: f64) -> f64 {
        let span = self.span();
        if span == 0.0 {
            return (SCORE_MIN + SCORE_MAX) / 2.0;
        }
        let t = (x - self.range_start) / span;
        SCORE_MIN + t * (SCORE_MAX - SCORE_MIN)
    }
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(SCORE_MIN, SCORE_MAX)
}
