use thiserror::Error;

/// Errors reported by [`Config::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A length, size or duration that must be strictly positive is not.
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    /// A `(min, max)` pair where `min > max`.
    #[error("{0} range is empty")]
    EmptyRange(&'static str),
    /// A probability outside `0.0..=1.0`.
    #[error("germination chance {0} is not a probability")]
    Probability(f32),
    /// The canvas leaves no room to place a germinated nettle.
    #[error("canvas width {width} is below the {required} needed for margins and germination")]
    CanvasTooNarrow { width: f32, required: f32 },
    /// The farthest germination offset cannot get past the edge margin.
    #[error("germination offset {offset} does not reach past the edge margin {margin}")]
    OffsetWithinMargin { offset: f32, margin: f32 },
}

/// Tunable constants of the nettle sketch.
///
/// All lengths are canvas units (pixels), all durations milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub width: f32,
    pub height: f32,
    /// Ground line as a fraction of `height`, measured from the top.
    pub floor_ratio: f32,

    pub nettle_count: usize,
    /// Depth of every branch tree and the root stroke-weight budget.
    pub initial_max_depth: u32,
    /// Trunk segment length and per-level length budget of the root.
    pub unit_branch_distance: f32,
    /// Upper bound for the random per-nettle size hint.
    pub max_size_ceiling: f32,
    /// Growth duration is `size * factor`, with the factor drawn from this range.
    pub growth_ms_per_unit: (f32, f32),

    /// Seed the frame generator is reset to at the start of each frame.
    pub frame_seed: u64,
    /// Coherent-noise offset advance per frame.
    pub noise_offset_rate: f64,

    pub rhizome_growth: f32,
    /// Probability that rhizome growth also germinates a new nettle.
    pub germination_chance: f32,
    /// Horizontal distance range of a germinated nettle from its parent.
    pub germination_offset: (f32, f32),
    pub edge_margin: f32,
    /// `None` allows unbounded growth of the population.
    pub max_population: Option<usize>,

    pub pluck_motion_ms: f64,
    pub pluck_delay_ms: f64,
    /// Length of the per-canopy fork-count table.
    pub canopy_table_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            floor_ratio: 0.6,
            nettle_count: 20,
            initial_max_depth: 5,
            unit_branch_distance: 23.5,
            max_size_ceiling: 1000.0,
            growth_ms_per_unit: (20.0, 40.0),
            frame_seed: 52310,
            noise_offset_rate: 0.001,
            rhizome_growth: 300.0,
            germination_chance: 0.6,
            germination_offset: (10.0, 60.0),
            edge_margin: 20.0,
            max_population: Some(400),
            pluck_motion_ms: 1000.0,
            pluck_delay_ms: 1000.0,
            canopy_table_len: 500,
        }
    }
}

impl Config {
    /// Config for a canvas of the given size, all other values default.
    pub fn with_canvas(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Y coordinate of the ground line every anchor sits on.
    #[inline]
    pub fn floor_height(&self) -> f32 {
        self.height * self.floor_ratio
    }

    /// Checks that the sketch can run with these values.
    ///
    /// ### Returns
    /// - `Ok(())` if every constant is usable.
    /// - `Err(ConfigError)` naming the first offending value otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("width", self.width),
            ("height", self.height),
            ("floor_ratio", self.floor_ratio),
            ("unit_branch_distance", self.unit_branch_distance),
            ("max_size_ceiling", self.max_size_ceiling),
        ];
        for (name, v) in positives {
            if !(v > 0.0) {
                return Err(ConfigError::NonPositive(name));
            }
        }
        if self.nettle_count == 0 {
            return Err(ConfigError::NonPositive("nettle_count"));
        }
        if self.initial_max_depth == 0 {
            return Err(ConfigError::NonPositive("initial_max_depth"));
        }
        if self.canopy_table_len == 0 {
            return Err(ConfigError::NonPositive("canopy_table_len"));
        }

        let ranges = [
            ("growth_ms_per_unit", self.growth_ms_per_unit),
            ("germination_offset", self.germination_offset),
        ];
        for (name, (lo, hi)) in ranges {
            if !(lo <= hi) {
                return Err(ConfigError::EmptyRange(name));
            }
        }

        if !(0.0..=1.0).contains(&self.germination_chance) {
            return Err(ConfigError::Probability(self.germination_chance));
        }

        // A parent anywhere on the canvas must have one side where a
        // germination offset lands inside the margins.
        let (near, far) = self.germination_offset;
        let required = 2.0 * (self.edge_margin + near);
        if self.width < required {
            return Err(ConfigError::CanvasTooNarrow {
                width: self.width,
                required,
            });
        }
        if far < self.edge_margin {
            return Err(ConfigError::OffsetWithinMargin {
                offset: far,
                margin: self.edge_margin,
            });
        }
        Ok(())
    }
}
