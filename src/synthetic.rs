//! Synthetic growth lines
//!
//! Simulates a mother-machine channel: cells stacked from the closed end
//! (position 0) grow every frame, divide into two daughters, and are pushed
//! out of the open end. Every frame becomes a scenario frame:
//!
//! - gap-separation signal: high at the border pixel above each cell and
//!   below the last one, low noise inside cells
//! - region forest: each pair of adjacent cells as a merged root with the
//!   two cells as children; occasionally a cell is also split into two
//!   over-segmented halves
//!
//! Generation is deterministic for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::errors::TrackingError;
use crate::growth_line::GrowthLine;
use crate::scenario::{FrameJson, GrowthLineJson, RegionJson, ScenarioJson};

/// Parameters of the simulated channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Number of independent channels
    pub growth_lines: usize,
    /// Frames per channel
    pub frames: usize,
    /// Positions along the channel
    pub channel_length: usize,
    /// Cells present at the first frame
    pub initial_cells: usize,
    /// Shortest initial cell, border pixel included
    pub min_cell_length: usize,
    /// Longest initial cell, border pixel included
    pub max_cell_length: usize,
    /// Length gained per frame
    pub growth_per_frame: usize,
    /// Chance per frame that a cell of twice the minimum length divides
    pub division_probability: f64,
    /// Chance that a cell also gets an over-segmented pair of children
    pub oversegmentation_probability: f64,
    /// Signal height at cell borders
    pub border_height: f64,
    /// Standard deviation of the signal noise
    pub noise_std: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            growth_lines: 1,
            frames: 5,
            channel_length: 80,
            initial_cells: 3,
            min_cell_length: 8,
            max_cell_length: 12,
            growth_per_frame: 2,
            division_probability: 0.4,
            oversegmentation_probability: 0.2,
            border_height: 5.0,
            noise_std: 0.1,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// Default parameters with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), TrackingError> {
        let fail = |description: String| Err(TrackingError::Configuration { description });
        if self.min_cell_length < 2 || self.min_cell_length > self.max_cell_length {
            return fail(format!(
                "cell lengths must satisfy 2 <= min ({}) <= max ({})",
                self.min_cell_length, self.max_cell_length
            ));
        }
        if self.channel_length <= self.max_cell_length {
            return fail(format!(
                "channel of length {} cannot hold a cell of length {}",
                self.channel_length, self.max_cell_length
            ));
        }
        for (name, p) in [
            ("division_probability", self.division_probability),
            ("oversegmentation_probability", self.oversegmentation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return fail(format!("{} must be in [0, 1], got {}", name, p));
            }
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 || !self.border_height.is_finite() {
            return fail("noise_std and border_height must be finite, noise non-negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    length: usize,
    value: f64,
}

/// Generate a scenario
pub fn generate_scenario(config: &SyntheticConfig) -> Result<ScenarioJson, TrackingError> {
    config.validate()?;
    let noise = Normal::new(0.0, config.noise_std).map_err(|e| TrackingError::Configuration {
        description: format!("invalid noise: {}", e),
    })?;

    let growth_lines = (0..config.growth_lines)
        .map(|index| {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));
            simulate_line(config, &noise, &mut rng, index)
        })
        .collect();

    Ok(ScenarioJson { growth_lines })
}

/// Generate growth lines ready for tracking
pub fn generate_growth_lines(config: &SyntheticConfig) -> Result<Vec<GrowthLine>, TrackingError> {
    generate_scenario(config)?.to_growth_lines()
}

fn simulate_line(
    config: &SyntheticConfig,
    noise: &Normal<f64>,
    rng: &mut StdRng,
    index: usize,
) -> GrowthLineJson {
    let mut cells: Vec<Cell> = (0..config.initial_cells)
        .map(|_| Cell {
            length: rng.gen_range(config.min_cell_length..=config.max_cell_length),
            value: rng.gen_range(0.3..0.7),
        })
        .collect();

    let mut frames = Vec::with_capacity(config.frames);
    for _ in 0..config.frames {
        // cells that no longer fit have left through the open end
        let mut used = 0;
        let fitting = cells
            .iter()
            .take_while(|c| {
                used += c.length;
                used < config.channel_length
            })
            .count();
        if fitting < cells.len() {
            log::trace!("Line {}: {} cells pushed out", index, cells.len() - fitting);
        }
        cells.truncate(fitting);

        frames.push(render_frame(config, noise, rng, &cells));

        cells = cells
            .into_iter()
            .flat_map(|cell| grow(config, rng, cell))
            .collect();
    }

    GrowthLineJson {
        name: Some(format!("synthetic_{}", index)),
        frames,
    }
}

fn grow(config: &SyntheticConfig, rng: &mut StdRng, cell: Cell) -> Vec<Cell> {
    let length = cell.length + config.growth_per_frame;
    if length >= 2 * config.min_cell_length && rng.gen_bool(config.division_probability) {
        let upper = length / 2;
        let jitter = |rng: &mut StdRng| cell.value + rng.gen_range(-0.05..0.05);
        vec![
            Cell {
                length: upper,
                value: jitter(rng),
            },
            Cell {
                length: length - upper,
                value: jitter(rng),
            },
        ]
    } else {
        vec![Cell { length, ..cell }]
    }
}

fn render_frame(
    config: &SyntheticConfig,
    noise: &Normal<f64>,
    rng: &mut StdRng,
    cells: &[Cell],
) -> FrameJson {
    let mut gap_separation: Vec<f64> = (0..config.channel_length)
        .map(|_| noise.sample(rng).abs())
        .collect();

    let mut regions = Vec::with_capacity(cells.len());
    let mut top = 0;
    for cell in cells {
        let bottom = top + cell.length - 1;
        gap_separation[top] = config.border_height + noise.sample(rng);

        let mut region = RegionJson::leaf(top, bottom, cell.value);
        if cell.length >= 4 && rng.gen_bool(config.oversegmentation_probability) {
            let split = top + cell.length / 2;
            region.children = vec![
                RegionJson::leaf(top, split - 1, cell.value),
                RegionJson::leaf(split, bottom, cell.value),
            ];
        }
        regions.push(region);
        top = bottom + 1;
    }
    if top < config.channel_length {
        gap_separation[top] = config.border_height + noise.sample(rng);
    }

    let roots = pair_regions(regions);
    FrameJson {
        gap_separation,
        roots,
    }
}

/// Merge adjacent cells pairwise into under-segmented roots
fn pair_regions(regions: Vec<RegionJson>) -> Vec<RegionJson> {
    let mut roots = Vec::with_capacity(regions.len() / 2 + 1);
    let mut iter = regions.into_iter();
    while let Some(upper) = iter.next() {
        match iter.next() {
            Some(lower) => roots.push(RegionJson {
                a: upper.a,
                b: lower.b,
                value: 0.5 * (upper.value + lower.value),
                children: vec![upper, lower],
            }),
            None => roots.push(upper),
        }
    }
    roots
}
