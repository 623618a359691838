/// Deterministic per-pet random source.
///
/// xoshiro256** seeded through SplitMix64. Each behavior scheduler owns one,
/// so a pet's idle sequence is reproducible for a given seed while pets with
/// different ids stay de-correlated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetRng {
    s: [u64; 4],
}

/// FNV-1a offset basis / prime (64-bit). Stable across runs and platforms,
/// unlike `DefaultHasher`.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Stable 64-bit hash of a pet id.
pub fn hash_id(id: &str) -> u64 {
    id.bytes().fold(FNV_OFFSET, |h, b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

impl PetRng {
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let mut s = [0u64; 4];
        for word in &mut s {
            *word = splitmix64(&mut sm);
        }
        // All-zero state is a fixed point; SplitMix never yields four zeros
        // in a row, but keep the guard for `from_state` callers.
        Self::from_state(s)
    }

    /// Build from a raw state. An all-zero state is replaced by a fixed
    /// non-zero one.
    pub fn from_state(s: [u64; 4]) -> Self {
        if s == [0; 4] {
            return Self {
                s: [0x9E37_79B9_7F4A_7C15, 1, 2, 3],
            };
        }
        Self { s }
    }

    /// Seed from a pet id. Empty ids fall back to the wall clock.
    pub fn for_pet(id: &str) -> Self {
        if id.is_empty() {
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            log::debug!("empty pet id, seeding rng from clock");
            return Self::new(nanos);
        }
        Self::new(hash_id(id))
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = self.s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn next_f32(&mut self) -> f32 {
        self.next_f64() as f32
    }

    /// Uniform in [lo, hi). Returns `lo` when the range is empty.
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.next_f32()
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_sequence() {
        let mut rng = PetRng::from_state([1, 2, 3, 4]);
        assert_eq!(rng.next_u64(), 11520);
        assert_eq!(rng.next_u64(), 0);
        assert_eq!(rng.next_u64(), 1509978240);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = PetRng::for_pet("cat-1");
        let mut b = PetRng::for_pet("cat-1");
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_ids_decorrelate() {
        let mut a = PetRng::for_pet("cat-1");
        let mut b = PetRng::for_pet("cat-2");
        let same = (0..16).filter(|_| a.next_u64() == b.next_u64()).count();
        assert!(same < 2);
    }

    #[test]
    fn floats_stay_in_unit_interval() {
        let mut rng = PetRng::new(42);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
        assert_eq!(rng.range_f32(3.0, 3.0), 3.0);
    }

    #[test]
    fn zero_state_is_replaced() {
        let mut rng = PetRng::from_state([0; 4]);
        assert!((0..4).any(|_| rng.next_u64() != 0));
    }
}
