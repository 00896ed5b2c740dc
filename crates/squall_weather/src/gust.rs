//! # Gust Timeline
//!
//! A perpetual four-phase wind cycle:
//!
//! ```text
//! now ── base ──▶ baseEnd ── change ──▶ gustStart ── gust ──▶ gustEnd ── change ──▶ baseStart
//! ```
//!
//! Wind, drop weight and drop target are constant during the base and gust
//! phases and interpolate linearly across the two change phases. Reaching
//! `baseStart` re-arms the cycle from the current time.

use rand::Rng;
use squall_shared::Vec3;

/// Phase duration ranges, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GustTiming {
    /// Shortest base phase.
    pub base_min_ms: u32,
    /// Longest base phase.
    pub base_max_ms: u32,
    /// Shortest change phase.
    pub change_min_ms: u32,
    /// Longest change phase.
    pub change_max_ms: u32,
    /// Shortest gust phase.
    pub gust_min_ms: u32,
    /// Longest gust phase.
    pub gust_max_ms: u32,
}

impl Default for GustTiming {
    fn default() -> Self {
        Self {
            base_min_ms: 5_000,
            base_max_ms: 10_000,
            change_min_ms: 1_000,
            change_max_ms: 1_000,
            gust_min_ms: 0,
            gust_max_ms: 2_000,
        }
    }
}

/// The two wind extremes the timeline blends between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GustExtremes {
    /// Wind during the base phase.
    pub base_wind: Vec3,
    /// Wind during the gust phase.
    pub gust_wind: Vec3,
    /// Drop weight during the base phase.
    pub base_weight: f32,
    /// Drop weight during the gust phase.
    pub gust_weight: f32,
    /// Drop target during the base phase.
    pub base_drops: i32,
    /// Drop target during the gust phase.
    pub gust_drops: i32,
}

/// Wind state at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GustSample {
    /// Wind vector applied to new and falling drops.
    pub wind: Vec3,
    /// Drop weight (streak thickness).
    pub weight: f32,
    /// Target number of active drops.
    pub drops: i32,
    /// True once the cycle has run out and must be regenerated.
    pub wrapped: bool,
}

/// Phase boundaries of the current cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct GustTimeline {
    timing: GustTiming,
    extremes: GustExtremes,
    base_end: u32,
    gust_start: u32,
    gust_end: u32,
    base_start: u32,
}

/// Random duration in `[min, max)`, or exactly `min` when the range is empty.
fn pick<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max > min {
        min + rng.gen_range(0..max - min)
    } else {
        min
    }
}

impl GustTimeline {
    /// Creates a timeline whose first cycle starts at `now`.
    pub fn new<R: Rng + ?Sized>(
        timing: GustTiming,
        extremes: GustExtremes,
        now: u32,
        rng: &mut R,
    ) -> Self {
        let mut timeline = Self {
            timing,
            extremes,
            base_end: now,
            gust_start: now,
            gust_end: now,
            base_start: now,
        };
        timeline.regenerate(now, rng);
        timeline
    }

    /// Draws fresh phase boundaries starting at `now`.
    ///
    /// The base phase always lasts at least a millisecond so a regenerated
    /// cycle ends strictly after the one it replaces.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, now: u32, rng: &mut R) {
        let t = self.timing;
        self.base_end = now.saturating_add(pick(rng, t.base_min_ms, t.base_max_ms).max(1));
        self.gust_start = self
            .base_end
            .saturating_add(pick(rng, t.change_min_ms, t.change_max_ms));
        self.gust_end = self
            .gust_start
            .saturating_add(pick(rng, t.gust_min_ms, t.gust_max_ms));
        self.base_start = self
            .gust_end
            .saturating_add(pick(rng, t.change_min_ms, t.change_max_ms));

        tracing::debug!(
            "Gust timeline re-armed: base until {}, gust {}..{}, back to base at {}",
            self.base_end,
            self.gust_start,
            self.gust_end,
            self.base_start
        );
    }

    /// Evaluates the timeline at `now`.
    #[must_use]
    pub fn current(&self, now: u32) -> GustSample {
        let e = &self.extremes;
        if now < self.base_end {
            return self.blend(0.0, false);
        }
        if now < self.gust_start {
            let frac = progress(now - self.base_end, self.gust_start - self.base_end);
            return self.blend(frac, false);
        }
        if now < self.gust_end {
            return GustSample {
                wind: e.gust_wind,
                weight: e.gust_weight,
                drops: e.gust_drops,
                wrapped: false,
            };
        }
        let frac = 1.0 - progress(now - self.gust_end, self.base_start - self.gust_end);
        self.blend(frac, now >= self.base_start)
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn blend(&self, frac: f32, wrapped: bool) -> GustSample {
        let e = &self.extremes;
        GustSample {
            wind: e.base_wind.mul_add(frac, e.gust_wind - e.base_wind),
            weight: e.base_weight + (e.gust_weight - e.base_weight) * frac,
            drops: e.base_drops + ((e.gust_drops - e.base_drops) as f32 * frac) as i32,
            wrapped,
        }
    }

    /// End of the base phase.
    #[must_use]
    pub const fn base_end(&self) -> u32 {
        self.base_end
    }

    /// Start of the gust phase.
    #[must_use]
    pub const fn gust_start(&self) -> u32 {
        self.gust_start
    }

    /// End of the gust phase.
    #[must_use]
    pub const fn gust_end(&self) -> u32 {
        self.gust_end
    }

    /// Return to the base phase, where the cycle wraps.
    #[must_use]
    pub const fn base_start(&self) -> u32 {
        self.base_start
    }
}

/// Fraction of a span elapsed. An empty span counts as complete.
#[allow(clippy::cast_precision_loss)]
fn progress(elapsed: u32, span: u32) -> f32 {
    if span == 0 {
        1.0
    } else {
        (elapsed as f32 / span as f32).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn extremes() -> GustExtremes {
        GustExtremes {
            base_wind: Vec3::new(0.0, 0.0, -880.0),
            gust_wind: Vec3::new(100.0, 100.0, -880.0),
            base_weight: 0.7,
            gust_weight: 1.5,
            base_drops: 100,
            gust_drops: 300,
        }
    }

    fn fixed_timing() -> GustTiming {
        GustTiming {
            base_min_ms: 5_000,
            base_max_ms: 5_000,
            change_min_ms: 1_000,
            change_max_ms: 1_000,
            gust_min_ms: 2_000,
            gust_max_ms: 2_000,
        }
    }

    #[test]
    fn test_zero_width_ranges_are_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let timeline = GustTimeline::new(fixed_timing(), extremes(), 1_000, &mut rng);
        assert_eq!(timeline.base_end(), 6_000);
        assert_eq!(timeline.gust_start(), 7_000);
        assert_eq!(timeline.gust_end(), 9_000);
        assert_eq!(timeline.base_start(), 10_000);
    }

    #[test]
    fn test_phases_interpolate() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let timeline = GustTimeline::new(fixed_timing(), extremes(), 0, &mut rng);

        let base = timeline.current(1_000);
        assert_eq!(base.wind, Vec3::new(0.0, 0.0, -880.0));
        assert_eq!(base.drops, 100);

        // Halfway through the change into the gust.
        let rising = timeline.current(5_500);
        assert!((rising.wind.x - 50.0).abs() < 1e-3);
        assert!((rising.weight - 1.1).abs() < 1e-5);
        assert_eq!(rising.drops, 200);

        let gust = timeline.current(8_000);
        assert_eq!(gust.drops, 300);
        assert!((gust.weight - 1.5).abs() < f32::EPSILON);

        let falling = timeline.current(8_250);
        assert!((falling.wind.x - 75.0).abs() < 1e-3);
        assert!(!falling.wrapped);

        let end = timeline.current(9_000);
        assert!(end.wrapped);
        assert_eq!(end.drops, 100);
    }

    #[test]
    fn test_empty_change_phases_do_not_divide_by_zero() {
        let timing = GustTiming {
            base_min_ms: 1_000,
            base_max_ms: 1_000,
            change_min_ms: 0,
            change_max_ms: 0,
            gust_min_ms: 0,
            gust_max_ms: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let timeline = GustTimeline::new(timing, extremes(), 0, &mut rng);
        let sample = timeline.current(1_000);
        assert!(sample.wrapped);
        assert!(sample.weight.is_finite());
        assert!(sample.wind.x.is_finite());
    }

    proptest! {
        #[test]
        fn prop_regeneration_preserves_order(
            seed in any::<u64>(),
            base in (0u32..20_000, 0u32..20_000),
            change in (0u32..5_000, 0u32..5_000),
            gust in (0u32..5_000, 0u32..5_000),
            start in 0u32..1_000_000,
        ) {
            let timing = GustTiming {
                base_min_ms: base.0.min(base.1),
                base_max_ms: base.0.max(base.1),
                change_min_ms: change.0.min(change.1),
                change_max_ms: change.0.max(change.1),
                gust_min_ms: gust.0.min(gust.1),
                gust_max_ms: gust.0.max(gust.1),
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut timeline = GustTimeline::new(timing, extremes(), start, &mut rng);

            for _ in 0..4 {
                prop_assert!(timeline.base_end() <= timeline.gust_start());
                prop_assert!(timeline.gust_start() <= timeline.gust_end());
                prop_assert!(timeline.gust_end() <= timeline.base_start());

                let previous_gust_end = timeline.gust_end();
                let now = timeline.base_start();
                prop_assert!(timeline.current(now).wrapped);
                timeline.regenerate(now, &mut rng);
                prop_assert!(timeline.base_end() > previous_gust_end);
            }
        }
    }
}
