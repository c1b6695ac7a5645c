//! Deterministic pseudo-absence sampling from an environmental raster.
//!
//! Presence-only occurrence data needs artificial absence points before a
//! presence/absence model can be fit. Sampling is restricted to the
//! environmental regions (distinct cell values: realms, ecoregions)
//! that the species actually touches, optionally narrowed further by a
//! suitable-habitat mask and steered by a sampling-bias grid.
//!
//! The RNG is a ChaCha8 stream seeded from the caller's `seed`: the same
//! inputs and seed always select the same cells.

use biotope_core::Grid;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::RasterError;

/// Options for [`sample_pseudo_absences`].
#[derive(Clone, Copy, Debug)]
pub struct PseudoAbsenceOptions<'a> {
    /// Number of pseudo-absence cells to draw.
    pub count: usize,
    /// RNG seed; identical seeds reproduce identical samples.
    pub seed: u64,
    /// Optional 0/1 grid limiting the sampling area to suitable habitat.
    pub suitable_habitat: Option<&'a Grid>,
    /// Optional nonnegative grid biasing which cells are drawn first.
    pub bias_grid: Option<&'a Grid>,
}

impl Default for PseudoAbsenceOptions<'_> {
    fn default() -> Self {
        Self {
            count: 1000,
            seed: 0,
            suitable_habitat: None,
            bias_grid: None,
        }
    }
}

/// The result of a pseudo-absence draw.
#[derive(Clone, Debug)]
pub struct PseudoAbsenceSample {
    /// Every cell that was eligible for sampling, valued with its
    /// environmental region.
    pub candidates: Grid,
    /// The drawn cells (same values), zero elsewhere. Shape matches the
    /// input grids.
    pub sampled: Grid,
}

/// Draw pseudo-absence cells from an environmental band.
///
/// `env` is the region-valued environmental band (positive class values;
/// nodata treated as unavailable). `species` is a 0/1 presence grid of
/// the same shape. The procedure:
///
/// 1. zero out nodata cells of the environment;
/// 2. keep only the regions overlapping at least one presence cell;
/// 3. remove the presence cells themselves;
/// 4. intersect with `suitable_habitat` when given;
/// 5. when a `bias_grid` is given, draw biased cells first: all of them
///    when fewer than `count` exist, else the `count` heaviest;
/// 6. draw the remainder uniformly without replacement.
///
/// When fewer candidates than `count` remain, every candidate is taken
/// and no random draw happens. When the species shares no region with
/// the environment, both returned grids are all-zero.
///
/// # Errors
///
/// - [`RasterError::ShapeMismatch`] when grid shapes differ.
/// - [`RasterError::BadSampleInput`] when `species` (or the habitat
///   grid) is not strictly 0/1.
pub fn sample_pseudo_absences(
    env: &Grid,
    nodata: Option<f32>,
    species: &Grid,
    opts: &PseudoAbsenceOptions<'_>,
) -> Result<PseudoAbsenceSample, RasterError> {
    if species.shape() != env.shape() {
        return Err(RasterError::ShapeMismatch {
            expected: env.shape(),
            got: species.shape(),
        });
    }
    if !species.is_binary() {
        return Err(RasterError::BadSampleInput {
            reason: "species grid must contain only 0/1 presence values".to_string(),
        });
    }
    if let Some(habitat) = opts.suitable_habitat {
        if habitat.shape() != env.shape() {
            return Err(RasterError::ShapeMismatch {
                expected: env.shape(),
                got: habitat.shape(),
            });
        }
        if !habitat.is_binary() {
            return Err(RasterError::BadSampleInput {
                reason: "suitable habitat grid must contain only 0/1 values".to_string(),
            });
        }
    }
    if let Some(bias) = opts.bias_grid {
        if bias.shape() != env.shape() {
            return Err(RasterError::ShapeMismatch {
                expected: env.shape(),
                got: bias.shape(),
            });
        }
    }

    info!("sampling {} pseudo-absence cells", opts.count);

    // Nodata cells of the environment are unavailable everywhere below.
    let nodata = nodata.unwrap_or(0.0);
    let mut env_cells: Vec<f32> = env.cells().to_vec();
    for v in &mut env_cells {
        if *v == nodata || v.is_nan() {
            *v = 0.0;
        }
    }

    // Regions (distinct env values) that overlap a presence cell.
    let mut regions: Vec<f32> = env_cells
        .iter()
        .zip(species.cells())
        .filter(|&(&e, &s)| s == 1.0 && e != 0.0)
        .map(|(&e, _)| e)
        .collect();
    regions.sort_by(|a, b| a.partial_cmp(b).expect("finite region values"));
    regions.dedup();

    if regions.is_empty() {
        info!("species overlaps no environmental region; nothing to sample");
        return Ok(PseudoAbsenceSample {
            candidates: Grid::zeros_like(env),
            sampled: Grid::zeros_like(env),
        });
    }
    debug!("sampling within region values {regions:?}");

    // Candidates: cells of the selected regions, minus the presences,
    // optionally narrowed to suitable habitat.
    let mut candidates: Vec<f32> = env_cells
        .iter()
        .zip(species.cells())
        .map(|(&e, &s)| {
            if s == 1.0
                || regions
                    .binary_search_by(|r| r.partial_cmp(&e).expect("finite region values"))
                    .is_err()
            {
                0.0
            } else {
                e
            }
        })
        .collect();
    if let Some(habitat) = opts.suitable_habitat {
        info!("limiting sampling area to suitable habitat");
        for (c, &h) in candidates.iter_mut().zip(habitat.cells()) {
            *c *= h;
        }
    }
    let (height, width) = env.shape();
    let candidates = Grid::from_cells(width, height, candidates)?;

    let mut sampled = Grid::zeros_like(env);
    let mut wanted = opts.count;
    let mut remaining: Vec<f32> = candidates.cells().to_vec();

    // Bias grid pass: biased cells are consumed before the uniform draw.
    if let Some(bias) = opts.bias_grid {
        let mut biased: Vec<(usize, f32)> = remaining
            .iter()
            .zip(bias.cells())
            .enumerate()
            .filter(|&(_, (&c, &b))| c > 0.0 && b > 0.0)
            .map(|(i, (_, &b))| (i, b))
            .collect();
        info!("{} biased cells available for sampling", biased.len());
        if biased.len() >= wanted && wanted > 0 {
            // More biased cells than needed: take the heaviest.
            biased.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .expect("finite bias weights")
                    .then(a.0.cmp(&b.0))
            });
            for &(i, _) in biased.iter().take(wanted) {
                sampled.cells_mut()[i] = remaining[i];
            }
            info!("sampled {wanted} cells from the bias grid alone");
            return Ok(PseudoAbsenceSample { candidates, sampled });
        }
        for &(i, _) in &biased {
            sampled.cells_mut()[i] = remaining[i];
            remaining[i] = 0.0;
        }
        wanted -= biased.len();
        debug!("{wanted} cells left to sample after the bias grid");
    }

    let positions: Vec<usize> = remaining
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0.0)
        .map(|(i, _)| i)
        .collect();
    info!("{} cells eligible for the uniform draw", positions.len());

    if positions.is_empty() {
        warn!("no cells left to sample from; the species may cover its whole range");
        return Ok(PseudoAbsenceSample { candidates, sampled });
    }

    if positions.len() <= wanted {
        warn!(
            "only {} cells available for {} requested pseudo-absences; taking all",
            positions.len(),
            wanted
        );
        for &i in &positions {
            sampled.cells_mut()[i] = remaining[i];
        }
    } else if wanted > 0 {
        let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
        let picks = rand::seq::index::sample(&mut rng, positions.len(), wanted);
        for p in picks {
            let i = positions[p];
            sampled.cells_mut()[i] = remaining[i];
        }
    }

    info!("sampled {} pseudo-absence cells", sampled.count_nonzero());
    Ok(PseudoAbsenceSample { candidates, sampled })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 10x10 environment split into two vertical region bands (1 and 2)
    /// with a nodata stripe down the middle.
    fn env() -> Grid {
        let mut g = Grid::new(10, 10).unwrap();
        for r in 0..10 {
            for c in 0..10 {
                let v = if c == 4 { -9999.0 } else if c < 5 { 1.0 } else { 2.0 };
                g.set(r, c, v).unwrap();
            }
        }
        g
    }

    fn presence_at(cells: &[(usize, usize)]) -> Grid {
        let mut g = Grid::new(10, 10).unwrap();
        for &(r, c) in cells {
            g.set(r, c, 1.0).unwrap();
        }
        g
    }

    #[test]
    fn exact_count_outside_presences() {
        let species = presence_at(&[(0, 0), (1, 1)]);
        let opts = PseudoAbsenceOptions {
            count: 10,
            seed: 7,
            ..Default::default()
        };
        let out = sample_pseudo_absences(&env(), Some(-9999.0), &species, &opts).unwrap();
        assert_eq!(out.sampled.count_nonzero(), 10);
        for (r, c, v) in out.sampled.iter() {
            if v != 0.0 {
                assert_eq!(species.get(r, c), Some(0.0), "sampled a presence cell");
                assert_ne!(c, 4, "sampled a nodata cell");
                assert!(c < 5, "sampled outside the species' region");
            }
        }
    }

    #[test]
    fn same_seed_same_sample() {
        let species = presence_at(&[(3, 2)]);
        let opts = PseudoAbsenceOptions {
            count: 12,
            seed: 42,
            ..Default::default()
        };
        let a = sample_pseudo_absences(&env(), Some(-9999.0), &species, &opts).unwrap();
        let b = sample_pseudo_absences(&env(), Some(-9999.0), &species, &opts).unwrap();
        assert_eq!(a.sampled, b.sampled);

        let other = PseudoAbsenceOptions {
            seed: 43,
            ..opts
        };
        let c = sample_pseudo_absences(&env(), Some(-9999.0), &species, &other).unwrap();
        assert_ne!(a.sampled, c.sampled, "different seeds should differ");
    }

    #[test]
    fn no_shared_region_returns_zero_grids() {
        // Presence only on the nodata stripe.
        let species = presence_at(&[(0, 4), (5, 4)]);
        let out = sample_pseudo_absences(
            &env(),
            Some(-9999.0),
            &species,
            &PseudoAbsenceOptions::default(),
        )
        .unwrap();
        assert_eq!(out.candidates.count_nonzero(), 0);
        assert_eq!(out.sampled.count_nonzero(), 0);
    }

    #[test]
    fn takes_all_when_candidates_are_short() {
        // Species covers all of region 1 except three cells.
        let mut cells = Vec::new();
        for r in 0..10 {
            for c in 0..4 {
                if !matches!((r, c), (0, 0) | (0, 1) | (0, 2)) {
                    cells.push((r, c));
                }
            }
        }
        let species = presence_at(&cells);
        let out = sample_pseudo_absences(
            &env(),
            Some(-9999.0),
            &species,
            &PseudoAbsenceOptions {
                count: 100,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(out.sampled.count_nonzero(), 3);
    }

    #[test]
    fn habitat_mask_restricts_sampling() {
        let species = presence_at(&[(0, 0)]);
        let mut habitat = Grid::new(10, 10).unwrap();
        for r in 0..10 {
            habitat.set(r, 1, 1.0).unwrap();
        }
        let out = sample_pseudo_absences(
            &env(),
            Some(-9999.0),
            &species,
            &PseudoAbsenceOptions {
                count: 100,
                suitable_habitat: Some(&habitat),
                ..Default::default()
            },
        )
        .unwrap();
        // Column 1 has 10 cells, none of which is the presence.
        assert_eq!(out.sampled.count_nonzero(), 10);
        for (_, c, v) in out.sampled.iter() {
            if v != 0.0 {
                assert_eq!(c, 1);
            }
        }
    }

    #[test]
    fn bias_grid_takes_heaviest_cells_first() {
        let species = presence_at(&[(0, 0)]);
        let mut bias = Grid::new(10, 10).unwrap();
        bias.set(2, 2, 5.0).unwrap();
        bias.set(3, 3, 9.0).unwrap();
        bias.set(6, 6, 100.0).unwrap(); // region 2: not a candidate
        let out = sample_pseudo_absences(
            &env(),
            Some(-9999.0),
            &species,
            &PseudoAbsenceOptions {
                count: 1,
                bias_grid: Some(&bias),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(out.sampled.count_nonzero(), 1);
        assert_eq!(out.sampled.get(3, 3), Some(1.0));
    }

    #[test]
    fn bias_cells_supplement_uniform_draw_when_short() {
        let species = presence_at(&[(0, 0)]);
        let mut bias = Grid::new(10, 10).unwrap();
        bias.set(2, 2, 5.0).unwrap();
        let out = sample_pseudo_absences(
            &env(),
            Some(-9999.0),
            &species,
            &PseudoAbsenceOptions {
                count: 8,
                seed: 3,
                bias_grid: Some(&bias),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(out.sampled.count_nonzero(), 8);
        assert_eq!(out.sampled.get(2, 2), Some(1.0), "biased cell always drawn");
    }

    #[test]
    fn rejects_bad_inputs() {
        let species = Grid::from_cells(10, 10, vec![0.5; 100]).unwrap();
        assert!(matches!(
            sample_pseudo_absences(&env(), None, &species, &PseudoAbsenceOptions::default()),
            Err(RasterError::BadSampleInput { .. })
        ));
        let small = Grid::new(3, 3).unwrap();
        assert!(matches!(
            sample_pseudo_absences(&env(), None, &small, &PseudoAbsenceOptions::default()),
            Err(RasterError::ShapeMismatch { .. })
        ));
    }
}
