use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Default number of shuffled 7-piece permutations appended per batch.
pub const DEFAULT_PERMUTATIONS_PER_BATCH: usize = 100;

/// Default queue length below which a new batch is generated.
pub const DEFAULT_LOW_WATER: usize = 10;

/// Lookahead queue of piece kinds fed by shuffled 7-piece permutations.
///
/// Pieces are generated in large batches: each batch appends
/// `permutations_per_batch` independently shuffled copies of all seven kinds,
/// so every aligned run of seven pieces contains each kind exactly once.
/// The session pops from the front and calls [`Self::refill_if_low`] after
/// every spawn.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, PieceQueue};
///
/// let mut queue = PieceQueue::new(10, 100);
/// assert_eq!(queue.len(), 700);
///
/// let first_run: Vec<PieceKind> = (0..7).map(|_| queue.pop_front()).collect();
/// for kind in PieceKind::ALL {
///     assert!(first_run.contains(&kind));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    queue: VecDeque<PieceKind>,
    low_water: usize,
    permutations_per_batch: usize,
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the queue's random number generator, written as a
/// 32-character hex string. The same seed always yields the same sequence.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceQueue, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = PieceQueue::with_seed(seed, 10, 100);
/// let mut b = PieceQueue::with_seed(seed, 10, 100);
/// assert_eq!(a.pop_front(), b.pop_front());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    #[display("invalid hex: expected 32 characters, got {len}")]
    InvalidLength { len: usize },
    #[display("invalid hex: {text}")]
    InvalidDigit { text: String },
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError::InvalidLength { len: s.len() });
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseSeedError::InvalidDigit {
            text: s.to_owned(),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_WATER, DEFAULT_PERMUTATIONS_PER_BATCH)
    }
}

impl PieceQueue {
    /// Creates a queue with a random seed and generates the first batch.
    #[must_use]
    pub fn new(low_water: usize, permutations_per_batch: usize) -> Self {
        Self::with_seed(rand::rng().random(), low_water, permutations_per_batch)
    }

    /// Like [`Self::new`], but with a specific seed for deterministic generation.
    ///
    /// # Panics
    ///
    /// Panics if `permutations_per_batch` is zero.
    #[must_use]
    pub fn with_seed(seed: PieceSeed, low_water: usize, permutations_per_batch: usize) -> Self {
        assert!(permutations_per_batch > 0, "a batch must hold at least one permutation");
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            queue: VecDeque::with_capacity(permutations_per_batch * PieceKind::LEN),
            low_water,
            permutations_per_batch,
        };
        this.generate();
        this
    }

    /// Appends a batch of shuffled 7-piece permutations to the tail.
    pub fn generate(&mut self) {
        for _ in 0..self.permutations_per_batch {
            let mut permutation = PieceKind::ALL;
            permutation.shuffle(&mut self.rng);
            self.queue.extend(permutation);
        }
        log::debug!(
            "generated {} pieces, queue length {}",
            self.permutations_per_batch * PieceKind::LEN,
            self.queue.len()
        );
    }

    /// Generates a new batch if fewer than `low_water` pieces remain.
    ///
    /// Returns `true` if a batch was generated.
    pub fn refill_if_low(&mut self) -> bool {
        if self.queue.len() < self.low_water {
            self.generate();
            return true;
        }
        false
    }

    /// Removes and returns the front piece.
    ///
    /// The queue is not refilled here; call [`Self::refill_if_low`] afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (never happens while refills follow pops).
    pub fn pop_front(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.generate();
        }
        self.queue
            .pop_front()
            .expect("piece queue should never be empty")
    }

    /// Returns the front piece without removing it.
    #[must_use]
    pub fn front(&self) -> Option<PieceKind> {
        self.queue.front().copied()
    }

    /// Returns an iterator over the upcoming pieces, front first.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Discards the queued pieces and generates a fresh batch.
    ///
    /// The random generator keeps its state, so the new batch continues the
    /// seeded sequence instead of repeating it.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.generate();
    }
}
