//! Eased motion of numeric fields over time.
//!
//! A [`Tween`] is owned by whoever owns the animated value and is handed
//! that value on every call, so a scheduled motion can never outlive its
//! target. Fields are addressed through the [`Animated`] trait.

use glam::Vec3;
use std::fmt::Debug;

/// Easing curves mapping normalized time `t` in `[0, 1]` to progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseInQuad,
    EaseOutQuad,
}

impl Easing {
    /// Evaluates the curve at `t`, clamping `t` into `[0, 1]` first.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
        }
    }
}

/// A value whose scalar fields can be driven by a [`Tween`].
pub trait Animated {
    type Field: Copy + PartialEq + Debug;

    fn field(&self, field: Self::Field) -> f32;
    fn set_field(&mut self, field: Self::Field, value: f32);
}

/// A bare scalar has exactly one field.
impl Animated for f32 {
    type Field = ();

    fn field(&self, _: ()) -> f32 {
        *self
    }

    fn set_field(&mut self, _: (), value: f32) {
        *self = value;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Animated for Vec3 {
    type Field = Axis;

    fn field(&self, field: Axis) -> f32 {
        match field {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    fn set_field(&mut self, field: Axis, value: f32) {
        match field {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }
}

#[derive(Clone, Debug)]
struct Motion<F> {
    field: F,
    from: f32,
    to: f32,
    duration_ms: f64,
    easing: Easing,
    /// `None` until [`Tween::start_tween`] captures the start value.
    started_at: Option<f64>,
}

/// Independent per-field motions of one animated value.
#[derive(Clone, Debug)]
pub struct Tween<F> {
    motions: Vec<Motion<F>>,
}

impl<F> Default for Tween<F> {
    fn default() -> Self {
        Self {
            motions: Vec::new(),
        }
    }
}

impl<F: Copy + PartialEq + Debug> Tween<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `field` to move to `to` over `duration_ms`.
    ///
    /// A motion already scheduled or running for the same field is
    /// replaced, which re-targets it from wherever it currently is once
    /// [`Tween::start_tween`] is called. The motion does not move until
    /// then.
    ///
    /// ### Parameters
    /// - `field` - Which field of the target to animate.
    /// - `to` - Destination value.
    /// - `duration_ms` - Duration; `<= 0` snaps on start.
    /// - `easing` - Curve used to interpolate.
    pub fn add_motion(&mut self, field: F, to: f32, duration_ms: f64, easing: Easing) {
        self.motions.retain(|m| m.field != field);
        self.motions.push(Motion {
            field,
            from: to,
            to,
            duration_ms,
            easing,
            started_at: None,
        });
    }

    /// Schedules several fields as one motion sharing duration and easing.
    pub fn add_motions(&mut self, targets: &[(F, f32)], duration_ms: f64, easing: Easing) {
        for &(field, to) in targets {
            self.add_motion(field, to, duration_ms, easing);
        }
    }

    /// Starts every scheduled motion that is not yet running.
    ///
    /// Start values are read from `target` now. Motions with a
    /// non-positive duration are written to their destination
    /// immediately and dropped. Motions already running are untouched.
    ///
    /// ### Parameters
    /// - `target` - The animated value owning the fields.
    /// - `now_ms` - Current time on the frame clock.
    pub fn start_tween<T>(&mut self, target: &mut T, now_ms: f64)
    where
        T: Animated<Field = F>,
    {
        for m in self.motions.iter_mut().filter(|m| m.started_at.is_none()) {
            m.from = target.field(m.field);
            m.started_at = Some(now_ms);
            if m.duration_ms <= 0.0 {
                target.set_field(m.field, m.to);
            }
        }
        self.motions
            .retain(|m| m.started_at.is_none() || m.duration_ms > 0.0);
    }

    /// Writes the eased value of every running motion into `target`.
    ///
    /// Motions that reached their duration are clamped to their
    /// destination and removed.
    ///
    /// ### Returns
    /// `true` while any motion (running or scheduled) remains.
    pub fn advance<T>(&mut self, target: &mut T, now_ms: f64) -> bool
    where
        T: Animated<Field = F>,
    {
        self.motions.retain(|m| {
            let Some(start) = m.started_at else {
                return true;
            };
            let t = ((now_ms - start) / m.duration_ms).clamp(0.0, 1.0) as f32;
            if t >= 1.0 {
                target.set_field(m.field, m.to);
                return false;
            }
            let value = m.from + (m.to - m.from) * m.easing.apply(t);
            target.set_field(m.field, value);
            true
        });
        !self.motions.is_empty()
    }

    /// Destination of the motion for `field`, if one is scheduled or running.
    pub fn destination(&self, field: F) -> Option<f32> {
        self.motions
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.to)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.motions.is_empty()
    }
}
