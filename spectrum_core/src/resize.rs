/// Watches container width and reports only real changes.
///
/// Height is derived by the layout, so it is never observed here.
#[derive(Debug, Clone, Default)]
pub struct ResizeObserver {
    width: Option<f64>,
}

impl ResizeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    /// Records `width` and returns it when it differs from the last observation.
    pub fn observe(&mut self, width: f64) -> Option<f64> {
        if !width.is_finite() || width < 0.0 {
            return None;
        }
        if self.width == Some(width) {
            return None;
        }
        self.width = Some(width);
        Some(width)
    }
}
