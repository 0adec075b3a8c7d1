//! Deterministic randomness for combat rolls.
//!
//! [`RngOracle`] is stateless: it maps a seed to a value. A [`RollStream`]
//! walks a cursor through seeds derived from one base seed, so every roll of
//! a resolution is reproducible from `(game_seed, nonce, actor)`.

/// Seed-to-value generator.
///
/// Implementations must be deterministic and produce the same value for the
/// same seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the entropy sources of one random event into a seed.
///
/// Use distinct `context` values for independent streams within the same
/// action (the pipeline uses `0` for damage rolls).
pub fn compute_seed(game_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // SplitMix64 avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Sequential roll source for one resolution.
pub struct RollStream<'a> {
    oracle: &'a dyn RngOracle,
    base: u64,
    cursor: u64,
}

impl<'a> RollStream<'a> {
    /// Rejected normal draws tolerated before the sample is clamped into range.
    const MAX_NORMAL_ATTEMPTS: u32 = 32;

    pub fn new(oracle: &'a dyn RngOracle, seed: u64) -> Self {
        Self {
            oracle,
            base: seed,
            cursor: 0,
        }
    }

    /// Stream for `actor`'s `nonce`-th action in the game seeded with `game_seed`.
    pub fn for_action(oracle: &'a dyn RngOracle, game_seed: u64, nonce: u64, actor_id: u32) -> Self {
        Self::new(oracle, compute_seed(game_seed, nonce, actor_id, 0))
    }

    /// Number of raw draws taken so far.
    pub fn draws(&self) -> u64 {
        self.cursor
    }

    pub fn next_u32(&mut self) -> u32 {
        let seed = compute_seed(self.base, self.cursor, 0, 0);
        self.cursor += 1;
        self.oracle.next_u32(seed)
    }

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform integer in `[min, max]`; bounds are swapped when reversed.
    pub fn uniform(&mut self, min: i32, max: i32) -> i32 {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        if min == max {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        let value = i64::from(min) + i64::from(self.next_u32()) % span;
        tracing::trace!(min, max, value, "uniform roll");
        value as i32
    }

    /// Bell-shaped integer in `[min, max]`.
    ///
    /// Draws from a normal distribution with mean `0.5` and deviation `0.25`,
    /// rejects samples outside `[0, 1]` and maps the result linearly onto the
    /// range with rounding.
    pub fn normal(&mut self, min: i32, max: i32) -> i32 {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        if min == max {
            return min;
        }

        let mut sample = 0.5;
        for attempt in 0..Self::MAX_NORMAL_ATTEMPTS {
            // Box-Muller; 1 - u keeps the logarithm finite.
            let u1 = 1.0 - self.unit();
            let u2 = self.unit();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            sample = 0.5 + 0.25 * z;
            if (0.0..=1.0).contains(&sample) {
                break;
            }
            if attempt + 1 == Self::MAX_NORMAL_ATTEMPTS {
                sample = sample.clamp(0.0, 1.0);
            }
        }

        let span = f64::from(max) - f64::from(min);
        let value = (f64::from(min) + (sample * span).round()) as i32;
        tracing::trace!(min, max, value, "normal roll");
        value
    }

    /// `true` with `percent` in 100 odds, rolled uniformly.
    pub fn chance(&mut self, percent: u16) -> bool {
        percent > 0 && self.uniform(1, 100) <= i32::from(percent)
    }

    /// `true` with roughly `percent` in 100 odds, rolled on the bell curve.
    pub fn normal_chance(&mut self, percent: u16) -> bool {
        percent > 0 && self.normal(1, 100) <= i32::from(percent)
    }
}

impl std::fmt::Debug for RollStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollStream")
            .field("base", &self.base)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(u32);

    impl RngOracle for Constant {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    #[test]
    fn pcg_is_deterministic() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn streams_replay_from_seed() {
        let rng = PcgRng;
        let mut a = RollStream::for_action(&rng, 9, 3, 1);
        let mut b = RollStream::for_action(&rng, 9, 3, 1);
        let rolls_a: Vec<_> = (0..16).map(|_| a.normal(-200, -100)).collect();
        let rolls_b: Vec<_> = (0..16).map(|_| b.normal(-200, -100)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|v| (-200..=-100).contains(v)));
    }

    #[test]
    fn zero_draw_lands_on_midpoint_and_minimum() {
        let rng = Constant(0);
        let mut stream = RollStream::new(&rng, 0);
        assert_eq!(stream.normal(0, 100), 50);
        assert_eq!(stream.normal(-100, -200), -150);
        assert_eq!(stream.uniform(1, 100), 1);
        assert!(stream.chance(1));
        assert!(!stream.chance(0));
        assert!(!stream.normal_chance(50));
        assert!(stream.normal_chance(51));
    }

    #[test]
    fn degenerate_ranges_do_not_draw() {
        let rng = PcgRng;
        let mut stream = RollStream::new(&rng, 1);
        assert_eq!(stream.normal(-40, -40), -40);
        assert_eq!(stream.uniform(3, 3), 3);
        assert_eq!(stream.draws(), 0);
    }

    #[test]
    fn uniform_covers_range() {
        let rng = PcgRng;
        let mut stream = RollStream::new(&rng, 5);
        let rolls: Vec<_> = (0..500).map(|_| stream.uniform(1, 4)).collect();
        for face in 1..=4 {
            assert!(rolls.contains(&face));
        }
    }
}
