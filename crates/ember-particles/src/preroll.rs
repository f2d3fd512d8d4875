//! First-update preroll: replay `time_shift` seconds in fixed ticks

/// Fixed tick length used while prerolling (seconds)
pub const MODELLING_STEP: f32 = 0.04;

/// Whether an emitter has run its first update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrerollState {
    #[default]
    Cold,
    Warm,
}

/// Decides how an update's delta is split into simulation ticks
#[derive(Debug, Clone, Copy, Default)]
pub struct Preroll {
    state: PrerollState,
}

impl Preroll {
    pub fn is_warm(&self) -> bool {
        self.state == PrerollState::Warm
    }

    /// Ticks to run for an update of `delta` seconds.
    ///
    /// The first call covers `max(delta, time_shift)` in `MODELLING_STEP`
    /// ticks plus a shorter remainder; every later call is one tick of `delta`.
    pub fn ticks(&mut self, delta: f32, time_shift: f32) -> TickPlan {
        match self.state {
            PrerollState::Cold => {
                self.state = PrerollState::Warm;
                let total = delta.max(time_shift);
                let steps = (total / MODELLING_STEP).floor();
                let remainder = total - steps * MODELLING_STEP;
                TickPlan {
                    steps: steps as u64,
                    remainder: (remainder > 0.0).then_some(remainder),
                }
            }
            PrerollState::Warm => TickPlan {
                steps: 0,
                remainder: Some(delta),
            },
        }
    }
}

/// Iterator over tick lengths for one update: `steps` fixed ticks, then
/// the remainder. The tick count is fixed up front so long prerolls finish.
#[derive(Debug, Clone, Copy)]
pub struct TickPlan {
    steps: u64,
    remainder: Option<f32>,
}

impl Iterator for TickPlan {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.steps > 0 {
            self.steps -= 1;
            return Some(MODELLING_STEP);
        }
        self.remainder.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_is_split_into_fixed_ticks() {
        let mut preroll = Preroll::default();
        assert!(!preroll.is_warm());

        let ticks: Vec<f32> = preroll.ticks(0.01, 0.1).collect();
        assert!(preroll.is_warm());
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0], MODELLING_STEP);
        assert_eq!(ticks[1], MODELLING_STEP);
        assert!((ticks[2] - 0.02).abs() < 1e-6);
        assert!((ticks.iter().sum::<f32>() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn first_update_uses_delta_when_longer_than_time_shift() {
        let mut preroll = Preroll::default();
        let total: f32 = preroll.ticks(0.5, 0.0).sum();
        assert!((total - 0.5).abs() < 1e-5);
    }

    #[test]
    fn short_first_update_is_a_single_tick() {
        let mut preroll = Preroll::default();
        let ticks: Vec<f32> = preroll.ticks(0.016, 0.0).collect();
        assert_eq!(ticks, vec![0.016]);
    }

    #[test]
    fn warm_updates_pass_delta_through() {
        let mut preroll = Preroll::default();
        preroll.ticks(0.0, 0.0).for_each(drop);
        let ticks: Vec<f32> = preroll.ticks(0.25, 5.0).collect();
        assert_eq!(ticks, vec![0.25]);
        let zero: Vec<f32> = preroll.ticks(0.0, 5.0).collect();
        assert_eq!(zero, vec![0.0]);
    }

    #[test]
    fn long_preroll_has_a_bounded_tick_count() {
        let mut preroll = Preroll::default();
        let plan = preroll.ticks(0.0, 2.0e6);
        assert!((49_999_000..=50_001_000).contains(&plan.steps));
        assert_eq!(plan.take(3).count(), 3);
    }
}
