//! Deterministic RNG streams derived from a user-visible seed.
//!
//! Every block set is drawn from its own stream so that a session seed
//! reproduces a whole run, and a retry never reuses the draws of a failed
//! attempt.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Domain-separated stream seed: HMAC-SHA256 keyed by the user seed.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = HmacSha256::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Seed for the `session_number`-th session started from one engine seed.
#[must_use]
pub fn session_seed(engine_seed: u64, session_number: u64) -> u64 {
    derive_stream_seed(engine_seed, format!("session:{session_number}").as_bytes())
}

/// Stream used to generate the blocks of one level; retries keep drawing from it.
#[must_use]
pub fn level_stream(session_seed: u64, level_index: usize) -> CountingRng<SmallRng> {
    let tag = format!("level:{level_index}");
    CountingRng::new(derive_stream_seed(session_seed, tag.as_bytes()))
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    /// Seeded small RNG with a zeroed draw counter.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}
