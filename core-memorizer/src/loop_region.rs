//! # A↔B Loop Region
//!
//! Holds the user-defined repeat range and decides when playback must be
//! redirected back to the A marker or pinned at the B marker.
//!
//! The region never mutates the playback clock itself; [`LoopRegion::decide`]
//! returns a command the coordinator applies to the engine. Bounds are kept
//! inside `[0, duration]` with a minimum span, and reset to product defaults
//! whenever a new source changes the duration.

/// Command produced by evaluating a position against the loop region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopDecision {
    /// Position stays inside the active range; keep playing.
    Continue,
    /// Looping is on and the position reached the B marker: seek back to the
    /// A marker and keep playing.
    Redirect { target: f64 },
    /// Stop playback and pin the clock at `position` (the B marker, or the
    /// true end of media).
    StopAt { position: f64 },
}

/// User-defined A↔B repeat range in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopRegion {
    start: f64,
    end: f64,
}

impl LoopRegion {
    /// Region spanning `[0, default_end]` clamped against `duration`.
    pub fn reset(duration: f64, default_end: f64, min_span: f64) -> Self {
        let mut region = Self {
            start: 0.0,
            end: default_end.min(duration).max(0.0),
        };
        region.enforce_min_span(duration, min_span);
        region
    }

    /// A marker in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// B marker in seconds.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns `true` when `position` lies inside the region.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position <= self.end
    }

    /// Apply a partial bounds update; either marker may be omitted.
    ///
    /// `start` clamps into `[0, duration]`, `end` into `[start, duration]`.
    /// A resulting span under `min_span` pushes the B marker out to
    /// `min(duration, start + min_span)`.
    pub fn apply(
        &mut self,
        start: Option<f64>,
        end: Option<f64>,
        duration: f64,
        min_span: f64,
    ) {
        if let Some(s) = start {
            self.start = s.clamp(0.0, duration);
        }
        if let Some(e) = end {
            self.end = e.min(duration).max(self.start);
        }
        self.enforce_min_span(duration, min_span);
    }

    /// Evaluate a clock movement from `prev` to `next` seconds.
    ///
    /// While looping, reaching or passing the B marker always snaps back to
    /// the A marker, even from a seek far past it. While not looping, only a
    /// crossing from inside the region pins at the B marker; a position
    /// already past it free-runs to the end of media.
    pub fn decide(&self, prev: f64, next: f64, looping: bool, duration: f64) -> LoopDecision {
        if looping && next >= self.end {
            return LoopDecision::Redirect { target: self.start };
        }
        if !looping && next >= self.end && prev < self.end {
            return LoopDecision::StopAt { position: self.end };
        }
        if next >= duration {
            return LoopDecision::StopAt { position: duration };
        }
        LoopDecision::Continue
    }

    fn enforce_min_span(&mut self, duration: f64, min_span: f64) {
        if self.end - self.start < min_span {
            self.end = (self.start + min_span).min(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: f64 = 600.0;
    const MIN_SPAN: f64 = 1.0;

    fn region(start: f64, end: f64) -> LoopRegion {
        let mut r = LoopRegion::reset(DURATION, 30.0, MIN_SPAN);
        r.apply(Some(start), Some(end), DURATION, MIN_SPAN);
        r
    }

    #[test]
    fn reset_installs_defaults() {
        let r = LoopRegion::reset(DURATION, 30.0, MIN_SPAN);
        assert_eq!(r.start(), 0.0);
        assert_eq!(r.end(), 30.0);
    }

    #[test]
    fn reset_clamps_to_short_durations() {
        let r = LoopRegion::reset(20.0, 30.0, MIN_SPAN);
        assert_eq!(r.start(), 0.0);
        assert_eq!(r.end(), 20.0);
    }

    #[test]
    fn narrow_span_pushes_end_marker() {
        let mut r = LoopRegion::reset(DURATION, 30.0, MIN_SPAN);
        r.apply(Some(29.5), Some(30.0), DURATION, MIN_SPAN);
        assert_eq!(r.start(), 29.5);
        assert_eq!(r.end(), 30.5);
    }

    #[test]
    fn span_pinned_at_the_track_tail() {
        let mut r = LoopRegion::reset(DURATION, 30.0, MIN_SPAN);
        r.apply(Some(599.5), Some(599.8), DURATION, MIN_SPAN);
        assert_eq!(r.start(), 599.5);
        assert_eq!(r.end(), 600.0);
    }

    #[test]
    fn partial_update_leaves_other_marker() {
        let mut r = region(5.0, 10.0);
        r.apply(None, Some(12.0), DURATION, MIN_SPAN);
        assert_eq!(r.start(), 5.0);
        assert_eq!(r.end(), 12.0);

        r.apply(Some(6.0), None, DURATION, MIN_SPAN);
        assert_eq!(r.start(), 6.0);
        assert_eq!(r.end(), 12.0);
    }

    #[test]
    fn start_past_end_drags_end_along() {
        let mut r = region(5.0, 10.0);
        r.apply(Some(50.0), None, DURATION, MIN_SPAN);
        assert_eq!(r.start(), 50.0);
        assert_eq!(r.end(), 51.0);
    }

    #[test]
    fn bounds_clamp_into_duration() {
        let mut r = region(5.0, 10.0);
        r.apply(Some(-3.0), Some(9000.0), DURATION, MIN_SPAN);
        assert_eq!(r.start(), 0.0);
        assert_eq!(r.end(), DURATION);
    }

    #[test]
    fn looping_redirects_at_end_marker() {
        let r = region(5.0, 10.0);
        let next = 9.96 + 0.05;
        assert_eq!(
            r.decide(9.96, next, true, DURATION),
            LoopDecision::Redirect { target: 5.0 }
        );
    }

    #[test]
    fn looping_snaps_back_even_from_far_past() {
        let r = region(5.0, 10.0);
        assert_eq!(
            r.decide(50.0, 50.05, true, DURATION),
            LoopDecision::Redirect { target: 5.0 }
        );
    }

    #[test]
    fn not_looping_pins_at_end_marker() {
        let r = region(5.0, 10.0);
        assert_eq!(
            r.decide(9.96, 10.01, false, DURATION),
            LoopDecision::StopAt { position: 10.0 }
        );
    }

    #[test]
    fn not_looping_past_the_marker_free_runs() {
        let r = region(5.0, 10.0);
        assert_eq!(r.decide(50.0, 50.05, false, DURATION), LoopDecision::Continue);
    }

    #[test]
    fn end_of_media_pins_at_duration() {
        let r = region(5.0, 10.0);
        assert_eq!(
            r.decide(599.99, 600.04, false, DURATION),
            LoopDecision::StopAt { position: DURATION }
        );
    }

    #[test]
    fn inside_the_region_continues() {
        let r = region(5.0, 10.0);
        assert_eq!(r.decide(7.0, 7.05, true, DURATION), LoopDecision::Continue);
        assert_eq!(r.decide(7.0, 7.05, false, DURATION), LoopDecision::Continue);
    }
}
