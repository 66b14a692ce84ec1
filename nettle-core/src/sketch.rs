//! Top-level driver tying the population to a frame clock and input.
//!
//! A front end calls [`Sketch::frame`] once per display frame and
//! [`Sketch::press`] for pointer presses between frames.

use crate::{
    canvas::Canvas,
    config::{Config, ConfigError},
    frame::FrameContext,
    population::Nettles,
    types::{NettleId, Rgb},
};
use glam::Vec2;
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

#[derive(Debug)]
pub struct Sketch {
    cfg: Config,
    ctx: FrameContext,
    nettles: Nettles,
}

impl Sketch {
    /// Builds a sketch and sows the initial population.
    ///
    /// ### Parameters
    /// - `cfg` - Validated before anything is created.
    /// - `entropy_seed` - Seed for the non-repeating generator; `None`
    ///   draws one from the operating system.
    ///
    /// ### Returns
    /// - `Ok(Sketch)` ready for its first frame.
    /// - `Err(ConfigError)` if `cfg` is unusable.
    pub fn new(cfg: Config, entropy_seed: Option<u64>) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let ctx = FrameContext::with_perlin(cfg.frame_seed, cfg.noise_offset_rate);
        Ok(Self::with_context(cfg, ctx, entropy_seed))
    }

    /// Like [`Sketch::new`] but with a caller-supplied frame context.
    ///
    /// `cfg` must already be valid.
    pub fn with_context(cfg: Config, ctx: FrameContext, entropy_seed: Option<u64>) -> Self {
        let entropy = match entropy_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut nettles = Nettles::new(cfg, entropy);
        nettles.populate(ctx.now_ms());
        info!(
            count = nettles.len(),
            width = cfg.width,
            height = cfg.height,
            "sketch sown"
        );
        Self { cfg, ctx, nettles }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn nettles(&self) -> &Nettles {
        &self.nettles
    }

    pub fn frame_context(&self) -> &FrameContext {
        &self.ctx
    }

    /// Runs one frame: advances the clock and noise, reseeds the frame
    /// generator, then updates and draws the floor and every nettle.
    pub fn frame(&mut self, now_ms: f64, canvas: &mut dyn Canvas) {
        self.ctx.begin_frame(now_ms);
        self.draw_floor(canvas);
        self.nettles.update(&self.ctx);
        self.nettles.render(canvas, &self.ctx);
    }

    fn draw_floor(&self, canvas: &mut dyn Canvas) {
        let y = self.cfg.floor_height();
        canvas.set_stroke(Rgb::WHITE);
        canvas.set_stroke_weight(1.0);
        canvas.line(Vec2::new(0.0, y), Vec2::new(self.cfg.width, y));
    }

    /// Handles a pointer press at `point` in canvas coordinates.
    ///
    /// The nettle horizontally nearest to the press is plucked if its
    /// canopy is still attached and it is not the last attached nettle.
    ///
    /// ### Returns
    /// The plucked nettle's id, or `None` if nothing was plucked.
    pub fn press(&mut self, point: Vec2) -> Option<NettleId> {
        let nearest = self.nettles.find_nearest_to(point, None);
        debug_assert!(nearest.is_some(), "every nettle in the sketch was plucked");
        let id = nearest?;
        self.nettles.pluck(id, &mut self.ctx).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::{Recorder, Shape},
        frame::ConstNoise,
    };

    fn sketch() -> Sketch {
        let cfg = Config::with_canvas(800.0, 600.0);
        let ctx = FrameContext::new(cfg.frame_seed, 0.001, Box::new(ConstNoise(0.5)));
        Sketch::with_context(cfg, ctx, Some(7))
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = Config::with_canvas(10.0, 600.0);
        assert!(matches!(
            Sketch::new(cfg, Some(1)),
            Err(ConfigError::CanvasTooNarrow { .. })
        ));
    }

    #[test]
    fn frame_draws_floor_first_then_nettles() {
        let mut sketch = sketch();
        let mut rec = Recorder::new();
        sketch.frame(16.0, &mut rec);

        let floor = sketch.config().floor_height();
        assert_eq!(
            rec.shapes[0],
            Shape::Line {
                from: Vec2::new(0.0, floor),
                to: Vec2::new(800.0, floor),
                color: Rgb::WHITE,
                weight: 1.0,
            }
        );
        let seeds = rec
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Ellipse { .. }))
            .count();
        assert_eq!(seeds, 20);
        assert_eq!(rec.stack_depth(), 0);
    }

    #[test]
    fn press_plucks_nearest_and_ignores_repeat() {
        let mut sketch = sketch();
        let mut rec = Recorder::new();
        sketch.frame(16.0, &mut rec);

        let target = sketch.nettles().iter().next().map(|n| n.anchor()).unwrap();
        let id = sketch.press(target).expect("a nettle should be plucked");
        assert_eq!(sketch.nettles().get(id).unwrap().anchor(), target);
        assert!(sketch.press(target).is_none());

        rec.clear();
        sketch.frame(16.0 + 1000.0, &mut rec);
        assert!(sketch.nettles().get(id).unwrap().is_plucked());
    }

    #[test]
    fn noise_offset_advances_once_per_frame() {
        let mut sketch = sketch();
        let mut rec = Recorder::new();
        for i in 1..=10 {
            sketch.frame(f64::from(i) * 16.0, &mut rec);
        }
        assert!((sketch.frame_context().noise_offset() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn plucking_everything_leaves_one_living_nettle() {
        let mut sketch = sketch();
        let mut rec = Recorder::new();
        let mut now = 16.0;
        for _ in 0..3 {
            let targets: Vec<Vec2> = sketch.nettles().iter().map(|n| n.anchor()).collect();
            for target in targets {
                sketch.press(target);
            }
            now += 1100.0;
            rec.clear();
            sketch.frame(now, &mut rec);
            assert!(sketch.nettles().iter().any(|n| !n.is_plucked()));
        }
        assert!(sketch.nettles().plucked_count() > 0);
    }
}
