use crate::app::constants::PROGRESS_STEP_PERCENT;

/// Progress bar position. Downloads move `target`; only ticks move `percent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ProgressState {
    percent: u8,
    target: u8,
}

impl ProgressState {
    pub(crate) fn percent(&self) -> u8 {
        self.percent
    }

    pub(crate) fn ratio(&self) -> f64 {
        f64::from(self.percent) / 100.0
    }

    /// Sets the target from a byte count. Unknown totals jump straight to done.
    pub(crate) fn set_target(&mut self, transferred: u64, total: u64) {
        self.target = if total == 0 {
            100
        } else {
            (transferred.min(total).saturating_mul(100) / total) as u8
        };
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.percent == self.target
    }

    /// Advances one tick towards the target; returns whether anything moved.
    pub(crate) fn tick(&mut self) -> bool {
        if self.percent == self.target {
            return false;
        }
        self.percent = if self.percent < self.target {
            self.percent.saturating_add(PROGRESS_STEP_PERCENT).min(self.target)
        } else {
            self.target
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_alone_does_not_move_bar() {
        let mut progress = ProgressState::default();
        progress.set_target(50, 100);
        assert_eq!(progress.percent(), 0);
        assert!(!progress.is_settled());
    }

    #[test]
    fn ticks_approach_target_without_overshoot() {
        let mut progress = ProgressState::default();
        progress.set_target(3, 4);
        let mut ticks = 0;
        while progress.tick() {
            ticks += 1;
        }
        assert_eq!(progress.percent(), 75);
        assert_eq!(ticks, 75usize.div_ceil(usize::from(PROGRESS_STEP_PERCENT)));
        assert!(progress.is_settled());
    }

    #[test]
    fn empty_file_counts_as_complete() {
        let mut progress = ProgressState::default();
        progress.set_target(0, 0);
        while progress.tick() {}
        assert_eq!(progress.percent(), 100);
        assert!((progress.ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lower_target_snaps_back() {
        let mut progress = ProgressState::default();
        progress.set_target(1, 1);
        while progress.tick() {}
        progress.set_target(10, 100);
        assert!(progress.tick());
        assert_eq!(progress.percent(), 10);
        progress.reset();
        assert_eq!(progress, ProgressState::default());
    }
}
