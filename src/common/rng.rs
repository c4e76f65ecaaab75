/// Random number generator trait for deterministic filter runs.
///
/// The resampler and birth stage draw all of their randomness through this
/// trait so a run can be replayed bit-for-bit from a seed, which the
/// scenario regression tests rely on.
pub trait Rng {
    /// Generate the next uint64 value
    fn next_u64(&mut self) -> u64;

    /// Generate a random f64 in [0, 1)
    fn rand(&mut self) -> f64 {
        self.next_u64() as f64 / (u64::MAX as f64 + 1.0)
    }

    /// Generate a random f64 from standard normal distribution N(0, 1)
    /// using the Box-Muller transform
    fn randn(&mut self) -> f64 {
        let u1 = self.rand().max(f64::MIN_POSITIVE);
        let u2 = self.rand();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Generate a random f64 uniformly in [low, high)
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.rand()
    }
}

/// Simple deterministic random number generator using Xorshift64.
///
/// Minimal, fast, and deterministic: identical output for the same seed on
/// every platform. Quality is sufficient for particle jitter and birth
/// draws, which is all the filter core asks of it.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new SimpleRng with the given seed.
    /// If seed is 0, uses 1 instead to avoid degenerate state.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }
}

impl Rng for SimpleRng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

// Implement rand::RngCore so SimpleRng can also drive rand_distr
// distributions in the scenario generator and tests.
impl rand::RngCore for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        Rng::next_u64(self) as u32
    }

    fn next_u64(&mut self) -> u64 {
        Rng::next_u64(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut i = 0;
        let len = dest.len();
        while i + 8 <= len {
            let bytes = Rng::next_u64(self).to_le_bytes();
            dest[i..i + 8].copy_from_slice(&bytes);
            i += 8;
        }
        if i < len {
            let bytes = Rng::next_u64(self).to_le_bytes();
            let remaining = len - i;
            dest[i..].copy_from_slice(&bytes[..remaining]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
