//! Seeding and instrumentation for the one random stream a game consumes.
//!
//! A user seed never reaches the generator directly. It keys an HMAC-SHA256
//! over a stream tag and the full 32-byte MAC becomes the ChaCha20 seed, so
//! seeds that differ by one bit still produce unrelated games. Every draw goes
//! through [`CountingRng`], and the count ends up in `GameResult::rng_draws`.
use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

const GAME_STREAM_TAG: &[u8] = b"hoopsim.game";

pub type GameRng = CountingRng<ChaCha20Rng>;

/// A generator that tallies how often it is asked for randomness.
///
/// `fill_bytes` counts as one draw whatever the buffer length.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    inner: R,
    draws: u64,
}

impl<R: RngCore> CountingRng<R> {
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Start counting from zero over `inner`.
    #[must_use]
    pub const fn wrap(inner: R) -> Self {
        Self { inner, draws: 0 }
    }

    fn tick(&mut self) -> &mut R {
        self.draws = self.draws.saturating_add(1);
        &mut self.inner
    }
}

impl GameRng {
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self::wrap(ChaCha20Rng::from_seed(stream_key(seed, GAME_STREAM_TAG)))
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.tick().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.tick().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.tick().fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.tick().try_fill_bytes(dest)
    }
}

fn stream_key(seed: u64, tag: &[u8]) -> [u8; 32] {
    let mut key = [0_u8; 32];
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes()) else {
        log::warn!("fallback: HMAC rejected the seed key, seeding from raw bytes");
        key[..8].copy_from_slice(&seed.to_le_bytes());
        return key;
    };
    mac.update(tag);
    key.copy_from_slice(&mac.finalize().into_bytes());
    key
}
