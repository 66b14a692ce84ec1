use crate::{
    canvas::Canvas,
    config::Config,
    frame::FrameContext,
    motion::{Easing, Tween},
    plant::{CanopyState, Plant},
    root::Root,
    types::{NettleId, Rgb},
};
use glam::Vec2;
use rand::Rng;

/// Diameter of the seed marker drawn at the anchor.
const SEED_MARKER: f32 = 4.0;

/// How a new nettle picks the size it first grows to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sowing {
    /// A random fraction of the size hint, scaled up for big nettles.
    Hinted { big: bool },
    /// An explicit initial growth amount.
    Sized(f32),
}

/// One plant: a root skeleton, a canopy and the growth that drives both.
#[derive(Clone, Debug)]
pub struct Nettle {
    id: NettleId,
    anchor: Vec2,
    size: f32,
    size_tween: Tween<()>,
    max_size_hint: f32,
    depth_budget: u32,
    z_depth: u8,
    root: Root,
    plant: Plant,
}

impl Nettle {
    /// Creates a nettle at `anchor`, builds its root and canopy, and
    /// starts its first growth.
    ///
    /// ### Parameters
    /// - `id` - Identity unique within the owning population.
    /// - `anchor` - Seed point on the ground line.
    /// - `sowing` - How the initial growth amount is chosen.
    /// - `cfg` - Sketch configuration.
    /// - `rng` - Random source for shape, shading and timing.
    /// - `now_ms` - Frame clock time the growth starts at.
    pub fn new(
        id: NettleId,
        anchor: Vec2,
        sowing: Sowing,
        cfg: &Config,
        rng: &mut impl Rng,
        now_ms: f64,
    ) -> Self {
        let max_size_hint = rng.random::<f32>() * cfg.max_size_ceiling;
        let z_depth = (rng.random::<f32>() * 100.0).ceil().clamp(0.0, 100.0) as u8;
        let depth_budget = cfg.initial_max_depth;

        let mut nettle = Self {
            id,
            anchor,
            size: 0.0,
            size_tween: Tween::new(),
            max_size_hint,
            depth_budget,
            z_depth,
            root: Root::new(
                cfg.initial_max_depth,
                depth_budget,
                cfg.unit_branch_distance,
                rng,
            ),
            plant: Plant::new(cfg.canopy_table_len, rng),
        };

        let initial = match sowing {
            Sowing::Sized(amount) => amount,
            Sowing::Hinted { big } => {
                let scale = if big { 3.0 } else { 0.5 };
                rng.random::<f32>() * max_size_hint * scale
            }
        };
        nettle.grow(initial, cfg, rng, now_ms);
        nettle
    }

    #[inline]
    pub fn id(&self) -> NettleId {
        self.id
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Size the running growth is heading for, or the current size.
    pub fn target_size(&self) -> f32 {
        self.size_tween.destination(()).unwrap_or(self.size)
    }

    #[inline]
    pub fn max_size_hint(&self) -> f32 {
        self.max_size_hint
    }

    #[inline]
    pub fn depth_budget(&self) -> u32 {
        self.depth_budget
    }

    #[inline]
    pub fn z_depth(&self) -> u8 {
        self.z_depth
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    #[inline]
    pub fn canopy_state(&self) -> CanopyState {
        self.plant.state()
    }

    #[inline]
    pub fn is_plucked(&self) -> bool {
        self.plant.is_plucked()
    }

    /// Animates `size` towards `size + amount`.
    ///
    /// The duration scales with the new size, drawn per call from
    /// `cfg.growth_ms_per_unit`, and the curve is ease-out-quad. Negative
    /// amounts are treated as zero so growth never reverses.
    pub fn grow(&mut self, amount: f32, cfg: &Config, rng: &mut impl Rng, now_ms: f64) {
        let target = self.size + amount.max(0.0);
        let (lo, hi) = cfg.growth_ms_per_unit;
        let per_unit = lo + rng.random::<f32>() * (hi - lo);
        let duration = f64::from(per_unit * target);

        self.size_tween.add_motion((), target, duration, Easing::EaseOutQuad);
        self.size_tween.start_tween(&mut self.size, now_ms);
    }

    /// Grows by the rhizome increment.
    ///
    /// ### Returns
    /// `true` when the coin flip asks for a new nettle to germinate
    /// next to this one. The caller owns the population and plants it.
    pub fn grow_rhizome(
        &mut self,
        cfg: &Config,
        rng: &mut impl Rng,
        entropy: &mut impl Rng,
        now_ms: f64,
    ) -> bool {
        self.grow(cfg.rhizome_growth, cfg, rng, now_ms);
        entropy.random_bool(f64::from(cfg.germination_chance))
    }

    /// Sends the canopy flying; the nettle counts as plucked once the
    /// configured delay has passed on the frame clock.
    ///
    /// ### Returns
    /// `false` if the canopy was already departing or plucked.
    pub fn pluck(&mut self, cfg: &Config, rng: &mut impl Rng, now_ms: f64) -> bool {
        self.plant.disappear(now_ms, cfg.pluck_motion_ms, cfg.pluck_delay_ms, rng)
    }

    /// Advances growth and canopy animation to `now_ms`.
    pub fn update(&mut self, now_ms: f64) {
        self.size_tween.advance(&mut self.size, now_ms);
        self.plant.update(now_ms);
    }

    /// Draws the seed marker, the root and (unless plucked) the canopy.
    pub fn render(&self, canvas: &mut dyn Canvas, ctx: &FrameContext) {
        canvas.set_fill(Rgb::WHITE);
        canvas.ellipse(self.anchor, Vec2::splat(SEED_MARKER));
        self.root.render(canvas, self.anchor, self.size, self.z_depth);
        self.plant.render(canvas, self.anchor, self.size, self.z_depth, ctx);
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

    fn sized(size: f32, rng: &mut StdRng) -> Nettle {
        Nettle::new(
            1,
            Vec2::new(100.0, 300.0),
            Sowing::Sized(size),
            &Config::default(),
            rng,
            0.0,
        )
    }

    fn green_lines(rec: &Recorder) -> usize {
        rec.lines()
            .filter(|s| matches!(s, Shape::Line { color, .. } if color.r == 0 && color.g > 0))
            .count()
    }

    #[test]
    fn new_nettle_starts_at_zero_and_grows_to_request() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut nettle = sized(120.0, &mut rng);

        assert_eq!(nettle.size(), 0.0);
        assert_eq!(nettle.target_size(), 120.0);
        assert!(nettle.z_depth() <= 100);
        assert_eq!(nettle.depth_budget(), 5);

        // Longest possible duration is 40 ms per unit.
        nettle.update(40.0 * 120.0);
        assert_eq!(nettle.size(), 120.0);
    }

    #[test]
    fn hinted_size_respects_big_multiplier() {
        let cfg = Config::default();
        let mut rng = StdRng::seed_from_u64(32);
        for big in [false, true] {
            for _ in 0..50 {
                let n = Nettle::new(
                    0,
                    Vec2::ZERO,
                    Sowing::Hinted { big },
                    &cfg,
                    &mut rng,
                    0.0,
                );
                let scale = if big { 3.0 } else { 0.5 };
                assert!(n.target_size() <= n.max_size_hint() * scale + 1e-3);
                assert!(n.max_size_hint() < cfg.max_size_ceiling);
            }
        }
    }

    #[test]
    fn size_never_decreases() {
        let cfg = Config::default();
        let mut rng = StdRng::seed_from_u64(33);
        let mut nettle = sized(200.0, &mut rng);
        let mut last = nettle.size();
        for frame in 0..600 {
            let now = f64::from(frame) * 16.0;
            if frame == 100 || frame == 300 {
                nettle.grow(50.0, &cfg, &mut rng, now);
            }
            nettle.update(now);
            assert!(nettle.size() >= last, "shrank at frame {frame}");
            last = nettle.size();
        }
    }

    #[test]
    fn grow_rhizome_adds_fixed_increment() {
        let cfg = Config::default();
        let mut rng = StdRng::seed_from_u64(34);
        let mut entropy = StdRng::seed_from_u64(35);
        let mut nettle = sized(40.0, &mut rng);
        nettle.update(500.0);
        let before = nettle.size();

        nettle.grow_rhizome(&cfg, &mut rng, &mut entropy, 500.0);
        assert!((nettle.target_size() - (before + 300.0)).abs() < 1e-3);
    }

    #[test]
    fn rhizome_germination_rate_is_about_three_fifths() {
        let cfg = Config::default();
        let mut rng = StdRng::seed_from_u64(36);
        let mut entropy = StdRng::seed_from_u64(37);
        let mut nettle = sized(10.0, &mut rng);
        let trials = 5000;
        let hits = (0..trials)
            .filter(|_| nettle.grow_rhizome(&cfg, &mut rng, &mut entropy, 0.0))
            .count();
        let rate = hits as f64 / f64::from(trials);
        assert!((rate - 0.6).abs() < 0.03, "rate {rate}");
    }

    #[test]
    fn pluck_is_rejected_while_departing() {
        let cfg = Config::default();
        let mut rng = StdRng::seed_from_u64(38);
        let mut nettle = sized(60.0, &mut rng);

        assert!(nettle.pluck(&cfg, &mut rng, 100.0));
        assert!(!nettle.pluck(&cfg, &mut rng, 200.0));
        nettle.update(1099.0);
        assert!(!nettle.is_plucked());
        nettle.update(1100.0);
        assert!(nettle.is_plucked());
        assert!(!nettle.pluck(&cfg, &mut rng, 1200.0));
    }

    #[test]
    fn plucked_nettle_keeps_root_and_seed() {
        let cfg = Config::default();
        let mut rng = StdRng::seed_from_u64(39);
        let mut nettle = sized(200.0, &mut rng);
        nettle.update(10_000.0);
        let ctx = FrameContext::new(1, 0.001, Box::new(ConstNoise(0.5)));

        let mut before = Recorder::new();
        nettle.render(&mut before, &ctx);
        assert!(matches!(before.shapes[0], Shape::Ellipse { .. }));
        assert!(green_lines(&before) > 0);

        nettle.pluck(&cfg, &mut rng, 10_000.0);
        nettle.update(11_000.0);
        let mut after = Recorder::new();
        nettle.render(&mut after, &ctx);

        assert_eq!(green_lines(&after), 0);
        assert_eq!(
            after.lines().count(),
            before.lines().count() - green_lines(&before)
        );
    }
}
