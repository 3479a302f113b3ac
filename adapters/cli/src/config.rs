//! Optional TOML configuration overriding the compiled-in defaults.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use grid_arcade_core::{Difficulty, GridSize};
use grid_arcade_system_interpreter as interpreter;
use grid_arcade_system_snake::{self as snake, RewardTable};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PuzzleSection {
    difficulty: Difficulty,
    step_delay_ms: u64,
}

impl Default for PuzzleSection {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            step_delay_ms: millis(interpreter::DEFAULT_STEP_DELAY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RewardSection {
    regular: u32,
    golden: u32,
    golden_probability: f64,
}

impl Default for RewardSection {
    fn default() -> Self {
        Self {
            regular: snake::DEFAULT_REGULAR_REWARD,
            golden: snake::DEFAULT_GOLDEN_REWARD,
            golden_probability: snake::DEFAULT_GOLDEN_PROBABILITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SnakeSection {
    width: u32,
    height: u32,
    tick_interval_ms: u64,
    apples_per_level: u32,
    rewards: RewardSection,
}

impl Default for SnakeSection {
    fn default() -> Self {
        Self {
            width: snake::DEFAULT_GRID.width(),
            height: snake::DEFAULT_GRID.height(),
            tick_interval_ms: millis(snake::DEFAULT_TICK_INTERVAL),
            apples_per_level: snake::DEFAULT_APPLES_PER_LEVEL,
            rewards: RewardSection::default(),
        }
    }
}

/// Settings read from a configuration file; every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    puzzle: PuzzleSection,
    snake: SnakeSection,
}

impl FileConfig {
    /// Reads and parses the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }

    /// Parses configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if config.puzzle.step_delay_ms == 0 {
            bail!("puzzle.step_delay_ms must be at least 1");
        }
        if config.snake.tick_interval_ms == 0 {
            bail!("snake.tick_interval_ms must be at least 1");
        }
        Ok(config)
    }

    /// Interpreter settings, with an optional difficulty taking precedence over the file.
    pub(crate) fn puzzle(&self, difficulty: Option<Difficulty>) -> interpreter::Config {
        interpreter::Config::new(
            difficulty.unwrap_or(self.puzzle.difficulty),
            Duration::from_millis(self.puzzle.step_delay_ms),
        )
    }

    /// Snake settings; fails when the reward table is inconsistent.
    pub(crate) fn snake(&self) -> Result<snake::Config> {
        let section = &self.snake;
        let rewards = RewardTable::new(
            section.rewards.regular,
            section.rewards.golden,
            section.rewards.golden_probability,
        )
        .context("invalid snake.rewards table")?;
        Ok(snake::Config::new(
            GridSize::new(section.width, section.height),
            Duration::from_millis(section.tick_interval_ms),
            rewards,
            section.apples_per_level,
        ))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
