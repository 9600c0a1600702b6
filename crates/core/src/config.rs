//! Game configuration - everything the rules depend on, passed explicitly.
//!
//! Nothing in the core reads environment variables or global state; frontends
//! build a [`GameConfig`] (usually starting from `Default`) and hand it over.

use arrayvec::ArrayVec;

use crate::error::GameError;
use crate::matcher::MatchRules;
use crate::rng::RandomSource;
use crate::scoring::ScoreRules;
use crate::types::{
    JewelKind, DEFAULT_CASCADE_CAP, DEFAULT_COLS, DEFAULT_ROWS, KIND_COUNT, MAX_BOARD_DIM,
    MIN_BOARD_DIM,
};
use crate::validator::SwapRule;

/// The ordered set of kinds refills draw from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KindSet {
    kinds: ArrayVec<JewelKind, KIND_COUNT>,
}

impl KindSet {
    /// Build from an explicit list. Kinds must be distinct and the list non-empty.
    pub fn new(kinds: &[JewelKind]) -> Result<Self, GameError> {
        if kinds.is_empty() {
            return Err(GameError::InvalidConfig("kind set is empty".into()));
        }
        let mut out = ArrayVec::new();
        for &k in kinds {
            if out.contains(&k) {
                return Err(GameError::InvalidConfig(format!(
                    "kind set lists {} twice",
                    k
                )));
            }
            // Distinct kinds never exceed KIND_COUNT, so this cannot overflow.
            out.push(k);
        }
        Ok(Self { kinds: out })
    }

    /// The first `n` kinds in code order.
    pub fn first(n: usize) -> Result<Self, GameError> {
        if n == 0 || n > KIND_COUNT {
            return Err(GameError::InvalidConfig(format!(
                "kind count must be 1..={}, got {}",
                KIND_COUNT, n
            )));
        }
        Self::new(&JewelKind::ALL[..n])
    }

    /// All seven kinds.
    pub fn all() -> Self {
        Self {
            kinds: JewelKind::ALL.into_iter().collect(),
        }
    }

    pub fn as_slice(&self) -> &[JewelKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn contains(&self, kind: JewelKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Draw one kind from the set.
    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> JewelKind {
        let i = rng.next_range(self.kinds.len() as u32) as usize;
        self.kinds[i]
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Complete rule configuration for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: u8,
    pub cols: u8,
    pub kinds: KindSet,
    pub match_rules: MatchRules,
    pub swap_rule: SwapRule,
    pub score_rules: ScoreRules,
    /// Max remove/collapse/refill iterations per resolution.
    pub cascade_cap: u32,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            kinds: KindSet::all(),
            match_rules: MatchRules::default(),
            swap_rule: SwapRule::MustMatch,
            score_rules: ScoreRules::default(),
            cascade_cap: DEFAULT_CASCADE_CAP,
            seed: 1,
        }
    }
}

impl GameConfig {
    pub fn with_size(mut self, rows: u8, cols: u8) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_kinds(mut self, kinds: KindSet) -> Self {
        self.kinds = kinds;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), GameError> {
        for (name, v) in [("rows", self.rows), ("cols", self.cols)] {
            if !(MIN_BOARD_DIM..=MAX_BOARD_DIM).contains(&v) {
                return Err(GameError::InvalidConfig(format!(
                    "{} must be in {}..={}, got {}",
                    name, MIN_BOARD_DIM, MAX_BOARD_DIM, v
                )));
            }
        }
        if self.kinds.len() < 2 {
            return Err(GameError::InvalidConfig(format!(
                "need at least 2 kinds for a playable board, got {}",
                self.kinds.len()
            )));
        }
        // Runs must fit along both axes.
        let min_run = self.match_rules.min_run;
        let shorter = self.rows.min(self.cols);
        if !(2..=shorter).contains(&min_run) {
            return Err(GameError::InvalidConfig(format!(
                "min_run must be in 2..={}, got {}",
                shorter, min_run
            )));
        }
        if self.cascade_cap == 0 {
            return Err(GameError::InvalidConfig("cascade_cap must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_kind_set_rejects_duplicates() {
        let err = KindSet::new(&[JewelKind::Red, JewelKind::Red]).unwrap_err();
        assert_eq!(err.to_string(), "invalid config: kind set lists red twice");
    }

    #[test]
    fn test_kind_set_first() {
        let set = KindSet::first(3).unwrap();
        assert_eq!(
            set.as_slice(),
            &[JewelKind::Red, JewelKind::Orange, JewelKind::Yellow]
        );
        assert!(KindSet::first(0).is_err());
        assert!(KindSet::first(8).is_err());
    }

    #[test]
    fn test_kind_set_draw_uses_source() {
        let set = KindSet::all();
        let mut rng = ScriptedRng::new(vec![4, 11]);
        assert_eq!(set.draw(&mut rng), JewelKind::Blue);
        // 11 % 7 == 4
        assert_eq!(set.draw(&mut rng), JewelKind::Blue);
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        let cfg = GameConfig::default().with_size(2, 8);
        assert!(cfg.validate().is_err());
        let cfg = GameConfig::default().with_size(8, 33);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_kind_set() {
        let cfg = GameConfig::default().with_kinds(KindSet::first(1).unwrap());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_two_kinds() {
        let cfg = GameConfig::default().with_kinds(KindSet::first(2).unwrap());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_min_run_by_shorter_side() {
        let mut cfg = GameConfig::default().with_size(3, 8);
        cfg.match_rules.min_run = 3;
        assert!(cfg.validate().is_ok());
        cfg.match_rules.min_run = 8;
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: min_run must be in 2..=3, got 8"
        );
        cfg.match_rules.min_run = 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let cfg = GameConfig {
            cascade_cap: 0,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
