//! Interactive nettle field built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Sketch`] and the
//! [`Recorder`] its frames are drawn into, and implements [`eframe::App`]
//! to replay the recorded shapes through the egui painter and forward
//! clicks as pointer presses.

use eframe::App;
use glam::Vec2;
use nettle_core::{
    canvas::{Recorder, Shape},
    config::{Config, ConfigError},
    sketch::Sketch,
    types::{NettleId, Rgb},
};
use tracing::{error, info, warn};

/// Longest wall-clock gap fed to the sketch in one frame, in ms.
///
/// Keeps animations from jumping after the window was hidden.
const MAX_FRAME_MS: f64 = 100.0;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true`, advance the sketch clock and run one frame.
/// 3. Replay the recorded shapes onto the central panel.
///
/// ### Fields
/// - `cfg` - Configuration the sketch was (and will be re-) built from.
/// - `sketch` - Nettle population, frame clock and pointer handling.
/// - `canvas` - Shapes recorded by the last sketch frame.
///
/// - `running` - Whether the sketch clock is advancing.
/// - `clock_ms` - Sketch time; only moves while running.
/// - `last_input_time` - egui time of the previous update (seconds).
/// - `last_plucked` - Id of the most recently plucked nettle (for display only).
/// - `fitted` - Whether the canvas size has been taken from the panel.
pub struct Viewer {
    cfg: Config,
    sketch: Sketch,
    canvas: Recorder,
    fitted: bool,

    running: bool,
    clock_ms: f64,
    last_input_time: Option<f64>,
    last_plucked: Option<NettleId>,
}

impl Viewer {
    /// Creates a viewer with a freshly sown sketch.
    ///
    /// ### Returns
    /// - `Ok(Viewer)` ready to be passed to `eframe::run_native`.
    /// - `Err(ConfigError)` if `cfg` cannot drive a sketch.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        let sketch = Sketch::new(cfg, None)?;
        Ok(Self {
            cfg,
            sketch,
            canvas: Recorder::new(),
            fitted: false,
            running: true,
            clock_ms: 0.0,
            last_input_time: None,
            last_plucked: None,
        })
    }

    /// Re-sows the sketch from the stored configuration.
    ///
    /// The clock restarts at zero and the recorded frame is dropped;
    /// the running state is kept.
    fn reset(&mut self) {
        match Sketch::new(self.cfg, None) {
            Ok(sketch) => {
                self.sketch = sketch;
                self.canvas.clear();
                self.clock_ms = 0.0;
                self.last_plucked = None;
                info!("sketch reset");
            }
            Err(err) => error!(%err, "failed to reset sketch"),
        }
    }

    /// Re-sows the sketch on a canvas of the panel's `size`.
    ///
    /// A panel too small for a valid config re-sows on the previous canvas.
    fn fit_to(&mut self, size: egui::Vec2) {
        self.fitted = true;
        let cfg = Config {
            width: size.x,
            height: size.y,
            ..self.cfg
        };
        match cfg.validate() {
            Ok(()) => self.cfg = cfg,
            Err(err) => warn!(%err, "panel too small, keeping canvas"),
        }
        self.reset();
    }

    /// Advances the sketch clock by `dt_ms` and records one frame.
    fn advance(&mut self, dt_ms: f64) {
        self.clock_ms += dt_ms.clamp(0.0, MAX_FRAME_MS);
        self.canvas.clear();
        self.sketch.frame(self.clock_ms, &mut self.canvas);
    }

    /// Scale that fits the whole sketch canvas inside `rect`.
    fn scale(&self, rect: egui::Rect) -> f32 {
        (rect.width() / self.cfg.width).min(rect.height() / self.cfg.height)
    }

    /// Converts a sketch canvas position to screen-space.
    ///
    /// Canvas coordinates already grow downwards like screen space, so
    /// the mapping is a uniform scale from the rect's top-left corner.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let s = self.scale(rect);
        egui::pos2(rect.min.x + p.x * s, rect.min.y + p.y * s)
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let s = self.scale(rect);
        Vec2::new((p.x - rect.min.x) / s, (p.y - rect.min.y) / s)
    }

    /// Forwards a press at screen position `p` to the sketch.
    fn press(&mut self, p: egui::Pos2, rect: egui::Rect) {
        let world = self.screen_to_world(p, rect);
        if let Some(id) = self.sketch.press(world) {
            self.last_plucked = Some(id);
        }
    }

    fn color(c: Rgb) -> egui::Color32 {
        egui::Color32::from_rgb(c.r, c.g, c.b)
    }

    /// Builds the top panel UI (run controls).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Reset").clicked() {
                    self.fitted = false;
                }

                ui.separator();
                ui.label("Click a nettle to pluck it.");
            });
        });
    }

    /// Builds the bottom status bar (population and clock).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let nettles = self.sketch.nettles();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("t = {:.1} s", self.clock_ms / 1000.0));
                ui.label(format!(
                    "noise offset = {:.3}",
                    self.sketch.frame_context().noise_offset()
                ));
                ui.separator();
                if let Some(id) = self.last_plucked {
                    ui.label(format!("last plucked = #{id}"));
                }
                ui.label(format!("plucked = {}", nettles.plucked_count()));
                ui.label(format!("nettles = {}", nettles.len()));
            });
        });
    }

    /// Builds the central panel where the recorded frame is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
                let rect = response.rect;
                let painter = ui.painter_at(rect);

                if !self.fitted {
                    self.fit_to(rect.size());
                }

                if response.clicked()
                    && let Some(p) = response.interact_pointer_pos()
                {
                    self.press(p, rect);
                }

                let now = ctx.input(|i| i.time);
                let dt_ms = self
                    .last_input_time
                    .map_or(0.0, |last| (now - last) * 1000.0);
                self.last_input_time = Some(now);
                if self.running || self.canvas.shapes.is_empty() {
                    self.advance(if self.running { dt_ms } else { 0.0 });
                }

                let s = self.scale(rect);
                for shape in &self.canvas.shapes {
                    match shape {
                        Shape::Line {
                            from,
                            to,
                            color,
                            weight,
                        } => {
                            let a = self.world_to_screen(*from, rect);
                            let b = self.world_to_screen(*to, rect);
                            let width = weight.max(0.0) * s;
                            let stroke = egui::Stroke::new(width, Self::color(*color));
                            painter.line_segment([a, b], stroke);
                        }
                        Shape::Ellipse {
                            center,
                            size,
                            color,
                        } => {
                            let c = self.world_to_screen(*center, rect);
                            let r = 0.25 * (size.x + size.y) * s;
                            painter.circle_filled(c, r, Self::color(*color));
                        }
                    }
                }

                if self.running {
                    ctx.request_repaint();
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
