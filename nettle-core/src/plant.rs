//! Leafy canopy drawn above a nettle's anchor.
//!
//! The canopy is a fractal independent of the root skeleton. Its fork
//! counts come from a fixed per-plant table so it redraws identically
//! every frame apart from the noise-driven sway.

use crate::{
    canvas::{Canvas, map_range},
    frame::FrameContext,
    motion::{Axis, Easing, Tween},
    types::Rgb,
};
use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::FRAC_PI_3;

/// Each fork level keeps this fraction of its parent's height.
const SHRINK: f32 = 0.7;
/// Forking stops once the shrunk height drops to this.
const MIN_FORK_HEIGHT: f32 = 4.0;
const XOFF_STEP: f64 = 0.1;
/// Fork counts are drawn from `0..=MAX_FORKS`.
const MAX_FORKS: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanopyState {
    Attached,
    /// Flying away; becomes [`CanopyState::Plucked`] at `plucked_at_ms`.
    Departing { plucked_at_ms: f64 },
    Plucked,
}

/// Per-frame inputs the canopy fractal reads but does not own.
struct Walk<'a> {
    size: f32,
    z_depth: f32,
    ctx: &'a FrameContext,
}

#[derive(Clone, Debug)]
pub struct Plant {
    branch_counts: Vec<u8>,
    /// `(x, y, rotation)` added to the anchor while departing.
    offset: Vec3,
    tween: Tween<Axis>,
    state: CanopyState,
}

impl Plant {
    pub fn new(table_len: usize, rng: &mut impl Rng) -> Self {
        let counts = (0..table_len)
            .map(|_| rng.random_range(0..=MAX_FORKS))
            .collect();
        Self::from_branch_counts(counts)
    }

    pub fn from_branch_counts(branch_counts: Vec<u8>) -> Self {
        Self {
            branch_counts,
            offset: Vec3::ZERO,
            tween: Tween::new(),
            state: CanopyState::Attached,
        }
    }

    pub fn branch_counts(&self) -> &[u8] {
        &self.branch_counts
    }

    #[inline]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    #[inline]
    pub fn state(&self) -> CanopyState {
        self.state
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.state == CanopyState::Attached
    }

    #[inline]
    pub fn is_plucked(&self) -> bool {
        self.state == CanopyState::Plucked
    }

    /// Starts the fly-away animation and schedules the plucked flag.
    ///
    /// The offset moves to a random `x` in `[-30, 50)`, `y` in
    /// `(-100, 0]` and rotation in `[-1, 1)` over `motion_ms` with
    /// ease-in-quad. Independently, the canopy becomes plucked once the
    /// frame clock reaches `now_ms + delay_ms`.
    ///
    /// ### Returns
    /// `false` (and does nothing) unless the canopy is still attached.
    pub fn disappear(
        &mut self,
        now_ms: f64,
        motion_ms: f64,
        delay_ms: f64,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.is_attached() {
            return false;
        }
        let targets = [
            (Axis::X, -30.0 + rng.random::<f32>() * 80.0),
            (Axis::Y, -rng.random::<f32>() * 100.0),
            (Axis::Z, -1.0 + rng.random::<f32>() * 2.0),
        ];
        self.tween.add_motions(&targets, motion_ms, Easing::EaseInQuad);
        self.tween.start_tween(&mut self.offset, now_ms);
        self.state = CanopyState::Departing {
            plucked_at_ms: now_ms + delay_ms,
        };
        true
    }

    /// Advances the departure offset and fires the plucked deadline.
    pub fn update(&mut self, now_ms: f64) {
        self.tween.advance(&mut self.offset, now_ms);
        if let CanopyState::Departing { plucked_at_ms } = self.state
            && now_ms >= plucked_at_ms
        {
            self.state = CanopyState::Plucked;
        }
    }

    /// Draws the canopy above `anchor`, or nothing once plucked.
    ///
    /// ### Parameters
    /// - `canvas` - Surface to draw on; its transform is restored on return.
    /// - `anchor` - Seed point of the owning nettle.
    /// - `size` - Current nettle size; the first segment is half of it.
    /// - `z_depth` - Shading key darkening the green channel.
    /// - `ctx` - Frame context supplying sway noise.
    pub fn render(
        &self,
        canvas: &mut dyn Canvas,
        anchor: Vec2,
        size: f32,
        z_depth: u8,
        ctx: &FrameContext,
    ) {
        if self.is_plucked() {
            return;
        }
        let walk = Walk {
            size,
            z_depth: f32::from(z_depth),
            ctx,
        };
        canvas.push();
        canvas.translate(anchor + self.offset.truncate());
        canvas.rotate(self.offset.z);
        self.branch(canvas, &walk, size / 2.0, 0.0, 0);
        canvas.pop();
    }

    fn branch(
        &self,
        canvas: &mut dyn Canvas,
        walk: &Walk<'_>,
        mut h: f32,
        mut xoff: f64,
        mut index: usize,
    ) {
        let green = map_range(
            h,
            0.0,
            walk.size,
            255.0 - walk.z_depth,
            100.0 - walk.z_depth,
        );
        canvas.set_stroke(Rgb::green_from(green));
        canvas.set_stroke_weight(map_range(h, 2.0, 100.0, 1.0, 5.0));
        canvas.line(Vec2::ZERO, Vec2::new(0.0, -h));
        canvas.translate(Vec2::new(0.0, -h));

        h *= SHRINK;
        xoff += XOFF_STEP;
        if h <= MIN_FORK_HEIGHT {
            return;
        }

        // Indices past the table end fork no further.
        let n = self.branch_counts.get(index).copied().unwrap_or(0);
        for i in 0..n {
            index += 1;
            let sway = walk.ctx.sway(xoff + f64::from(i)) as f32;
            let mut theta = map_range(sway, 0.0, 1.0, -FRAC_PI_3, FRAC_PI_3);
            if n % 2 == 0 {
                theta = -theta;
            }
            canvas.push();
            canvas.rotate(theta);
            self.branch(canvas, walk, h / 2.0, xoff, index);
            canvas.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::{Recorder, Shape},
        frame::ConstNoise,
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn ctx(noise: f64) -> FrameContext {
        FrameContext::new(1, 0.001, Box::new(ConstNoise(noise)))
    }

    fn counts(head: &[u8]) -> Vec<u8> {
        let mut v = vec![0; 500];
        v[..head.len()].copy_from_slice(head);
        v
    }

    #[test]
    fn branch_table_has_requested_length_and_range() {
        let mut rng = StdRng::seed_from_u64(21);
        let plant = Plant::new(500, &mut rng);
        assert_eq!(plant.branch_counts().len(), 500);
        assert!(plant.branch_counts().iter().all(|&n| n <= MAX_FORKS));
        assert!(plant.branch_counts().iter().any(|&n| n == MAX_FORKS));
    }

    #[test]
    fn forks_follow_the_table_and_sway() {
        let plant = Plant::from_branch_counts(counts(&[2]));
        let mut rec = Recorder::new();
        let anchor = Vec2::new(200.0, 400.0);
        plant.render(&mut rec, anchor, 100.0, 0, &ctx(0.5));

        // Stem plus two leaf children; neither child forks (counts are zero).
        assert_eq!(rec.lines().count(), 3);

        let Shape::Line { to, color, .. } = &rec.shapes[0] else {
            panic!("expected stem line");
        };
        assert_eq!(*to, Vec2::new(200.0, 350.0));
        assert_eq!(*color, Rgb::new(0, 178, 0));

        // Mid-range noise maps to zero rotation: children keep going up.
        let Shape::Line { to, .. } = &rec.shapes[1] else {
            panic!("expected child line");
        };
        assert!((*to - Vec2::new(200.0, 332.5)).length() < 1e-3);
        assert_eq!(rec.stack_depth(), 0);
    }

    #[test]
    fn render_is_deterministic_for_fixed_noise() {
        let mut rng = StdRng::seed_from_u64(22);
        let plant = Plant::new(500, &mut rng);
        let frame = ctx(0.8);

        let mut a = Recorder::new();
        let mut b = Recorder::new();
        plant.render(&mut a, Vec2::new(50.0, 50.0), 400.0, 30, &frame);
        plant.render(&mut b, Vec2::new(50.0, 50.0), 400.0, 30, &frame);
        assert_eq!(a.shapes, b.shapes);
    }

    #[test]
    fn small_canopy_does_not_fork() {
        let plant = Plant::from_branch_counts(counts(&[5, 5, 5]));
        let mut rec = Recorder::new();
        plant.render(&mut rec, Vec2::ZERO, 10.0, 0, &ctx(0.2));
        assert_eq!(rec.lines().count(), 1);
    }

    #[test]
    fn zero_size_renders_without_nan() {
        let plant = Plant::from_branch_counts(counts(&[3]));
        let mut rec = Recorder::new();
        plant.render(&mut rec, Vec2::ZERO, 0.0, 0, &ctx(0.2));
        let Shape::Line { color, weight, .. } = &rec.shapes[0] else {
            panic!("expected stem line");
        };
        assert_eq!(*color, Rgb::new(0, 255, 0));
        assert!(weight.is_finite());
    }

    #[test]
    fn plucked_flag_waits_for_the_delay() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut plant = Plant::new(500, &mut rng);

        assert!(plant.disappear(1000.0, 1000.0, 1000.0, &mut rng));
        assert_eq!(
            plant.state(),
            CanopyState::Departing {
                plucked_at_ms: 2000.0
            }
        );

        plant.update(1999.0);
        assert!(!plant.is_plucked());
        // Still renders while departing.
        let mut rec = Recorder::new();
        plant.render(&mut rec, Vec2::ZERO, 50.0, 0, &ctx(0.5));
        assert!(!rec.shapes.is_empty());

        plant.update(2000.0);
        assert!(plant.is_plucked());
        let mut rec = Recorder::new();
        plant.render(&mut rec, Vec2::ZERO, 50.0, 0, &ctx(0.5));
        assert!(rec.shapes.is_empty());
    }

    #[test]
    fn departure_offset_lands_in_range() {
        let mut rng = StdRng::seed_from_u64(24);
        for _ in 0..50 {
            let mut plant = Plant::new(8, &mut rng);
            plant.disappear(0.0, 1000.0, 1000.0, &mut rng);
            plant.update(1000.0);
            let o = plant.offset();
            assert!((-30.0..50.0).contains(&o.x));
            assert!((-100.0..=0.0).contains(&o.y));
            assert!((-1.0..1.0).contains(&o.z));
        }
    }

    #[test]
    fn disappear_twice_is_noop() {
        let mut rng = StdRng::seed_from_u64(25);
        let mut plant = Plant::new(8, &mut rng);
        assert!(plant.disappear(0.0, 1000.0, 1000.0, &mut rng));
        assert!(!plant.disappear(500.0, 1000.0, 1000.0, &mut rng));
        assert_eq!(
            plant.state(),
            CanopyState::Departing {
                plucked_at_ms: 1000.0
            }
        );
    }
}
