//! Fitting encoder output to a byte budget.
//!
//! Two strategies exist. Padding builds the mandatory skeleton once and
//! routes exactly the remaining bytes into a region the format tolerates.
//! Rescaling rebuilds with a shrinking generation parameter until the output
//! fits, then pads. Both stop at the skeleton: a budget below it yields the
//! skeleton unchanged.

/// Guard on rebuild rounds. Every round strictly shrinks the parameter, so
/// this is only reached by a shrink function that converges very slowly.
pub const MAX_RESCALE_ROUNDS: usize = 24;

/// How an output relates to its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Exact,
    /// Larger than requested because the skeleton alone exceeds the budget.
    Floor,
    /// Shorter than requested. Only expected from broken encoders.
    Short,
}

impl Fit {
    pub fn of(len: usize, budget: usize) -> Self {
        match len.cmp(&budget) {
            std::cmp::Ordering::Equal   => Fit::Exact,
            std::cmp::Ordering::Greater => Fit::Floor,
            std::cmp::Ordering::Less    => Fit::Short,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Fit::Exact => "exact",
            Fit::Floor => "floor",
            Fit::Short => "short",
        }
    }
}

/// Bytes left for the extensible region, or `None` when the skeleton already
/// meets or exceeds the budget.
pub fn remaining(budget: usize, skeleton: usize) -> Option<usize> {
    budget.checked_sub(skeleton).filter(|&r| r > 0)
}

/// Append zero bytes until `bytes` is `budget` long. Never truncates.
pub fn pad_zeros(mut bytes: Vec<u8>, budget: usize) -> Vec<u8> {
    if bytes.len() < budget {
        bytes.resize(budget, 0);
    }
    bytes
}

/// Output of a rescale loop.
#[derive(Debug, Clone)]
pub struct Rescaled<P> {
    pub bytes:  Vec<u8>,
    pub param:  P,
    pub rounds: usize,
}

/// Bounded fixed-point loop.
///
/// `build` produces output for a parameter. `shrink` receives the parameter
/// and the overshooting length and returns a strictly smaller parameter, or
/// `None` once the floor is reached. When rounds run out the `floor`
/// parameter is built as a last resort.
pub fn rescale<P, E, B, S>(
    budget: usize,
    start: P,
    floor: P,
    mut build: B,
    mut shrink: S,
) -> Result<Rescaled<P>, E>
where
    P: Copy,
    B: FnMut(P) -> Result<Vec<u8>, E>,
    S: FnMut(P, usize) -> Option<P>,
{
    let mut param = start;
    for round in 1..=MAX_RESCALE_ROUNDS {
        let bytes = build(param)?;
        if bytes.len() <= budget {
            return Ok(Rescaled { bytes, param, rounds: round });
        }
        match shrink(param, bytes.len()) {
            Some(next) => param = next,
            None => return Ok(Rescaled { bytes, param, rounds: round }),
        }
    }
    Ok(Rescaled { bytes: build(floor)?, param: floor, rounds: MAX_RESCALE_ROUNDS + 1 })
}

/// Scale `value` by `sqrt(target / actual)` for two-dimensional parameters,
/// always shrinking by at least one.
pub fn shrink_2d(value: u32, actual: usize, target: usize) -> u32 {
    let ratio = (target as f64 / actual.max(1) as f64).sqrt();
    let scaled = (value as f64 * ratio * 0.98).floor() as u32;
    scaled.min(value.saturating_sub(1))
}

/// Scale `value` by `target / actual`, always shrinking by at least one.
pub fn shrink_linear(value: usize, actual: usize, target: usize) -> usize {
    let scaled = (value as f64 * target as f64 / actual.max(1) as f64 * 0.98).floor() as usize;
    scaled.min(value.saturating_sub(1))
}
