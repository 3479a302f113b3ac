use grid_arcade_core::RewardClass;
use rand::Rng;
use thiserror::Error;

/// Points awarded for a regular apple by default.
pub const DEFAULT_REGULAR_REWARD: u32 = 10;
/// Points awarded for a golden apple by default.
pub const DEFAULT_GOLDEN_REWARD: u32 = 50;
/// Chance that a freshly placed apple is golden by default.
pub const DEFAULT_GOLDEN_PROBABILITY: f64 = 0.1;

/// Errors raised when a reward table is inconsistent.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RewardTableError {
    /// A tier would award nothing.
    #[error("{class:?} apples must be worth at least one point")]
    ZeroReward {
        /// Offending tier.
        class: RewardClass,
    },
    /// The golden tier is not strictly more valuable than the regular tier.
    #[error("golden apples ({golden}) must be worth more than regular apples ({regular})")]
    GoldenNotRicher {
        /// Regular tier value.
        regular: u32,
        /// Golden tier value.
        golden: u32,
    },
    /// The golden tier is not strictly rarer than the regular tier.
    #[error("golden probability {probability} must lie in [0, 0.5)")]
    GoldenNotRarer {
        /// Requested golden probability.
        probability: f64,
    },
}

/// Two-tier reward distribution used when placing apples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardTable {
    regular: u32,
    golden: u32,
    golden_probability: f64,
}

impl RewardTable {
    /// Validates a reward table.
    ///
    /// The golden tier must be both rarer and worth more than the regular
    /// tier.
    pub fn new(regular: u32, golden: u32, golden_probability: f64) -> Result<Self, RewardTableError> {
        if regular == 0 {
            return Err(RewardTableError::ZeroReward {
                class: RewardClass::Regular,
            });
        }
        if golden <= regular {
            return Err(RewardTableError::GoldenNotRicher { regular, golden });
        }
        if !(0.0..0.5).contains(&golden_probability) {
            return Err(RewardTableError::GoldenNotRarer {
                probability: golden_probability,
            });
        }
        Ok(Self {
            regular,
            golden,
            golden_probability,
        })
    }

    /// Points awarded for the given tier.
    #[must_use]
    pub const fn reward(&self, class: RewardClass) -> u32 {
        match class {
            RewardClass::Regular => self.regular,
            RewardClass::Golden => self.golden,
        }
    }

    /// Draws the tier of the next apple.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> RewardClass {
        if rng.gen_bool(self.golden_probability) {
            RewardClass::Golden
        } else {
            RewardClass::Regular
        }
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            regular: DEFAULT_REGULAR_REWARD,
            golden: DEFAULT_GOLDEN_REWARD,
            golden_probability: DEFAULT_GOLDEN_PROBABILITY,
        }
    }
}
