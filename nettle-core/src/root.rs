//! Woody skeleton renderer.
//!
//! Walks two mirrored [`Branch`] trees below the anchor, spending the
//! nettle's current size as a length budget one level at a time, so a
//! small nettle shows only its trunk and a grown one the full skeleton.

use crate::{branch::Branch, canvas::Canvas, types::Rgb};
use glam::Vec2;
use rand::Rng;

/// Budget that must remain before a level may recurse at all.
const MIN_RECURSE_BUDGET: f32 = 3.0;

#[derive(Clone, Debug)]
pub struct Root {
    forks: [Branch; 2],
    tree_depth: u32,
    /// Stroke weight at the trunk and hard cap on recursion depth.
    depth_budget: u32,
    /// Trunk length and the budget consumed per level.
    unit_distance: f32,
}

impl Root {
    pub fn new(
        tree_depth: u32,
        depth_budget: u32,
        unit_distance: f32,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            forks: [
                Branch::generate(0, tree_depth, rng),
                Branch::generate(0, tree_depth, rng),
            ],
            tree_depth,
            depth_budget,
            unit_distance,
        }
    }

    pub fn forks(&self) -> &[Branch; 2] {
        &self.forks
    }

    #[inline]
    pub fn depth_budget(&self) -> u32 {
        self.depth_budget
    }

    /// Deepens both forks by one level.
    pub fn add_level(&mut self, rng: &mut impl Rng) {
        self.tree_depth += 1;
        for fork in &mut self.forks {
            fork.add_level(self.tree_depth, rng);
        }
    }

    /// Draws the trunk and as much of the skeleton as `size` allows.
    ///
    /// ### Parameters
    /// - `canvas` - Surface to draw on; its transform is restored on return.
    /// - `anchor` - Seed point the trunk hangs from.
    /// - `size` - Current growth amount, spent as length budget.
    /// - `z_depth` - Shading key; the stroke is `255 - z_depth` grey.
    pub fn render(&self, canvas: &mut dyn Canvas, anchor: Vec2, size: f32, z_depth: u8) {
        canvas.push();
        canvas.translate(anchor);
        canvas.set_stroke(Rgb::grey(255 - z_depth));
        self.segment(canvas, self.unit_distance, size, 0);
        if size > self.unit_distance {
            self.branch(canvas, &self.forks, size - self.unit_distance, 0);
        }
        canvas.pop();
    }

    /// Draws one segment downwards and moves the cursor to its end.
    fn segment(&self, canvas: &mut dyn Canvas, length: f32, length_left: f32, depth: u32) {
        canvas.set_stroke_weight(self.depth_budget.saturating_sub(depth) as f32);
        let len = length_left.min(length).max(0.0);
        canvas.line(Vec2::ZERO, Vec2::new(0.0, len));
        canvas.translate(Vec2::new(0.0, len));
    }

    fn branch(&self, canvas: &mut dyn Canvas, branches: &[Branch], length_left: f32, depth: u32) {
        if depth >= self.depth_budget {
            return;
        }
        for (i, b) in branches.iter().enumerate() {
            let length = self.unit_distance * b.length_multiplier;
            let angle = if i == 0 { b.angle } else { -b.angle };

            canvas.push();
            canvas.rotate(angle);
            // Deeper levels may draw relatively longer segments.
            let scale = (depth as f32 / 2.0).max(1.0);
            self.segment(canvas, length * scale, length_left, depth);
            if length_left > MIN_RECURSE_BUDGET
                && length_left > self.unit_distance
                && !b.is_terminal()
            {
                let rest = length_left - self.unit_distance;
                self.branch(canvas, &b.children, rest, depth + 1);
            }
            canvas.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Recorder, Shape};
    use rand::{SeedableRng, rngs::StdRng};

    fn root() -> Root {
        let mut rng = StdRng::seed_from_u64(11);
        Root::new(5, 5, 23.5, &mut rng)
    }

    fn weights(rec: &Recorder) -> Vec<f32> {
        rec.lines()
            .filter_map(|s| match s {
                Shape::Line { weight, .. } => Some(*weight),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn small_nettle_draws_only_trunk() {
        let root = root();
        let mut rec = Recorder::new();
        root.render(&mut rec, Vec2::new(100.0, 300.0), 10.0, 40);

        assert_eq!(rec.shapes.len(), 1);
        let Shape::Line { from, to, color, weight } = &rec.shapes[0] else {
            panic!("expected trunk line");
        };
        assert_eq!(*from, Vec2::new(100.0, 300.0));
        assert_eq!(*to, Vec2::new(100.0, 310.0));
        assert_eq!(*color, Rgb::grey(215));
        assert_eq!(*weight, 5.0);
        assert_eq!(rec.stack_depth(), 0);
    }

    #[test]
    fn trunk_is_capped_at_unit_distance() {
        let root = root();
        let mut rec = Recorder::new();
        root.render(&mut rec, Vec2::ZERO, 23.0, 0);
        root.render(&mut rec, Vec2::ZERO, 23.5, 0);
        assert_eq!(rec.shapes.len(), 2);
    }

    #[test]
    fn grown_nettle_draws_full_budgeted_skeleton() {
        let root = root();
        let mut rec = Recorder::new();
        root.render(&mut rec, Vec2::ZERO, 10_000.0, 0);

        // Trunk plus 2 + 4 + 8 + 16 + 32 branch segments.
        assert_eq!(rec.lines().count(), 63);
        let w = weights(&rec);
        assert!(w.iter().all(|&w| w >= 1.0));
        assert_eq!(w.iter().filter(|&&w| w == 1.0).count(), 32);
        assert_eq!(rec.stack_depth(), 0);
    }

    #[test]
    fn recursion_respects_depth_budget_regardless_of_size() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut root = Root::new(5, 3, 23.5, &mut rng);
        root.add_level(&mut rng);

        let mut rec = Recorder::new();
        root.render(&mut rec, Vec2::ZERO, 1.0e6, 0);
        // Trunk plus three budgeted levels.
        assert_eq!(rec.lines().count(), 1 + 2 + 4 + 8);
        assert!(weights(&rec).iter().all(|&w| w >= 1.0));
    }

    #[test]
    fn budget_unfurls_levels_gradually() {
        let root = root();
        let mut counts = Vec::new();
        for size in [20.0, 50.0, 80.0, 200.0] {
            let mut rec = Recorder::new();
            root.render(&mut rec, Vec2::ZERO, size, 0);
            counts.push(rec.lines().count());
        }
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
        assert_eq!(counts[0], 1);
    }

    #[test]
    fn add_level_deepens_both_forks() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut root = Root::new(2, 5, 23.5, &mut rng);
        root.add_level(&mut rng);
        for fork in root.forks() {
            assert_eq!(fork.node_count(), 15);
        }
    }
}
