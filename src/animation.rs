//! The scalar clock driving the highlight animation.

/// Animation time advanced by a fixed step every frame.
///
/// `time` stays in `[0, 1)` and cycles forever.
/// It is the only value that changes between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    time: f64,
    step: f64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(0.005)
    }
}

impl AnimationState {
    /// Start an animation at time 0 advancing by `step` per frame.
    ///
    /// `step` should be positive and less than 1.
    pub fn new(step: f64) -> Self {
        Self { time: 0., step }
    }

    /// Current animation time.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Amount of time added every frame.
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Move the animation forward one frame and return the new time.
    ///
    /// Reaching or passing 1 resets the time to exactly 0.
    pub fn advance(&mut self) -> f64 {
        self.time += self.step;
        if self.time >= 1. {
            self.time = 0.;
        }
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::relative_eq;

    #[test]
    fn wraps_to_exactly_zero() {
        let mut anim = AnimationState::new(0.25);
        let times: Vec<f64> = (0..9).map(|_| anim.advance()).collect();
        assert_eq!(times, [0.25, 0.5, 0.75, 0., 0.25, 0.5, 0.75, 0., 0.25]);
    }

    #[test]
    fn uneven_step_wraps_without_overshoot() {
        let mut anim = AnimationState::new(0.3);
        let times: Vec<f64> = (0..4).map(|_| anim.advance()).collect();
        assert!(relative_eq!(times[0], 0.3));
        assert!(relative_eq!(times[1], 0.6));
        assert!(relative_eq!(times[2], 0.9));
        // 1.2 is not carried over into the next cycle
        assert_eq!(times[3], 0.);
    }

    #[test]
    fn stays_in_unit_interval() {
        let mut anim = AnimationState::default();
        assert_eq!(anim.time(), 0.);
        assert_eq!(anim.step(), 0.005);

        let mut prev = anim.time();
        let mut wraps = 0;
        for _ in 0..10_000 {
            let t = anim.advance();
            assert!((0. ..1.).contains(&t), "time {t} out of range");
            if t < prev {
                assert_eq!(t, 0.);
                wraps += 1;
            } else {
                assert!(relative_eq!(t - prev, 0.005, epsilon = 1e-9));
            }
            prev = t;
        }
        // about 200 steps per cycle, give or take one for rounding
        assert!((49..=50).contains(&wraps), "{wraps} wraps");
    }
}
