/// Identifier for a [`crate::nettle::Nettle`] within a
/// [`crate::population::Nettles`] collection.
///
/// Ids are handed out in increasing order by the population and are
/// never reused, so they stay unique for the lifetime of the population.
pub type NettleId = u64;

/// An opaque RGB stroke or fill colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::grey(255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Grey level from an unclamped channel value, saturating at `0..=255`.
    pub fn grey_from(v: f32) -> Self {
        Self::grey(channel(v))
    }

    /// Pure green from an unclamped channel value, saturating at `0..=255`.
    pub fn green_from(v: f32) -> Self {
        Self::new(0, channel(v), 0)
    }
}

fn channel(v: f32) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}
