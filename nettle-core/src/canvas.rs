//! Drawing surface abstraction.
//!
//! Renderers talk to a [`Canvas`] with a p5-like immediate API: current
//! stroke state, a transform stack, and primitive shapes in local
//! coordinates. [`Recorder`] resolves those calls into world-space
//! [`Shape`]s that a front end (or a test) can consume.

use crate::types::Rgb;
use glam::{Affine2, Vec2};

pub trait Canvas {
    fn set_stroke(&mut self, color: Rgb);
    fn set_stroke_weight(&mut self, weight: f32);
    fn set_fill(&mut self, color: Rgb);

    /// Line from `from` to `to` in local coordinates.
    fn line(&mut self, from: Vec2, to: Vec2);
    /// Filled ellipse centred at `center` with full width/height `size`.
    fn ellipse(&mut self, center: Vec2, size: Vec2);

    /// Saves the current transform.
    fn push(&mut self);
    /// Restores the transform saved by the matching [`Canvas::push`].
    fn pop(&mut self);
    fn translate(&mut self, by: Vec2);
    fn rotate(&mut self, radians: f32);
}

/// A resolved primitive in canvas (world) coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgb,
        weight: f32,
    },
    Ellipse {
        center: Vec2,
        size: Vec2,
        color: Rgb,
    },
}

/// A [`Canvas`] that records every primitive it is asked to draw.
#[derive(Debug)]
pub struct Recorder {
    transform: Affine2,
    stack: Vec<Affine2>,
    stroke: Rgb,
    weight: f32,
    fill: Rgb,
    pub shapes: Vec<Shape>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            stack: Vec::with_capacity(16),
            stroke: Rgb::WHITE,
            weight: 1.0,
            fill: Rgb::WHITE,
            shapes: Vec::new(),
        }
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops recorded shapes and resets the transform for the next frame.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.stack.clear();
        self.transform = Affine2::IDENTITY;
    }

    /// Current depth of the transform stack.
    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|s| matches!(s, Shape::Line { .. }))
    }
}

impl Canvas for Recorder {
    fn set_stroke(&mut self, color: Rgb) {
        self.stroke = color;
    }

    fn set_stroke_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn set_fill(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn line(&mut self, from: Vec2, to: Vec2) {
        self.shapes.push(Shape::Line {
            from: self.transform.transform_point2(from),
            to: self.transform.transform_point2(to),
            color: self.stroke,
            weight: self.weight,
        });
    }

    fn ellipse(&mut self, center: Vec2, size: Vec2) {
        self.shapes.push(Shape::Ellipse {
            center: self.transform.transform_point2(center),
            size,
            color: self.fill,
        });
    }

    fn push(&mut self) {
        self.stack.push(self.transform);
    }

    fn pop(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, by: Vec2) {
        self.transform = self.transform * Affine2::from_translation(by);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
    }
}

/// Linearly re-maps `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// The result is not clamped. A degenerate input range maps to `out_min`.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    out_min + (value - in_min) / span * (out_max - out_min)
}
