use crate::viewport::Viewport;

/// An animated transition of the view center and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAnimation {
    pub from: Viewport,
    pub to: Viewport,
    pub start_time: f64,
    pub duration: f64, // milliseconds
}

impl ViewAnimation {
    pub fn new(from: Viewport, to: Viewport, start_time: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start_time,
            duration,
        }
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now - self.start_time >= self.duration
    }

    /// Returns the interpolated viewport at `now`; the target once finished.
    pub fn sample(&self, now: f64) -> Viewport {
        if self.duration <= 0.0 || self.is_finished(now) {
            return self.to;
        }
        let t = cubic_ease_out(((now - self.start_time) / self.duration).clamp(0.0, 1.0));
        Viewport {
            center_x: lerp(self.from.center_x, self.to.center_x, t),
            center_y: lerp(self.from.center_y, self.to.center_y, t),
            zoom: lerp(self.from.zoom, self.to.zoom, t),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic ease-out: decelerating to zero velocity.
fn cubic_ease_out(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t + 1.0
}

#[cfg(test)]
mod tests {
    use super::ViewAnimation;
    use crate::viewport::Viewport;

    fn anim() -> ViewAnimation {
        ViewAnimation::new(
            Viewport::new(0.0, 0.0, 6.0),
            Viewport::new(1000.0, -1000.0, 16.0),
            100.0,
            1000.0,
        )
    }

    #[test]
    fn starts_at_origin_view() {
        assert_eq!(anim().sample(100.0), Viewport::new(0.0, 0.0, 6.0));
    }

    #[test]
    fn ends_at_target_view() {
        let a = anim();
        assert!(a.is_finished(1100.0));
        assert_eq!(a.sample(5000.0), a.to);
    }

    #[test]
    fn ease_out_is_past_halfway_at_midpoint() {
        let mid = anim().sample(600.0);
        assert!(mid.center_x > 500.0 && mid.center_x < 1000.0);
        assert!(mid.zoom > 11.0 && mid.zoom < 16.0);
    }

    #[test]
    fn zero_duration_jumps() {
        let a = ViewAnimation::new(
            Viewport::new(0.0, 0.0, 6.0),
            Viewport::new(1.0, 1.0, 7.0),
            0.0,
            0.0,
        );
        assert_eq!(a.sample(0.0), a.to);
    }
}
