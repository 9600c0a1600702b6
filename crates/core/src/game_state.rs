//! Game state module - one play session
//!
//! Ties together the board, configuration, RNG, cascade engine and scoring.
//! Every public operation leaves the board full and free of matches.

use crate::board::Board;
use crate::cascade::{CascadeEngine, CascadeReport};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::generator::{generate, reshuffle};
use crate::rng::SimpleRng;
use crate::snapshot::{CascadeSummary, GameSnapshot};
use crate::types::Pos;
use crate::validator::{self, Move, SwapRule};

/// What a successful swap did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub report: CascadeReport,
    /// The board had no move left afterwards and was reshuffled.
    pub reshuffled: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    config: GameConfig,
    engine: CascadeEngine,
    rng: SimpleRng,
    score: u32,
    moves: u32,
    /// Monotonic id, bumped on every board mutation.
    board_id: u32,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    last_report: Option<CascadeReport>,
}

impl GameState {
    /// Validate `config` and deal an opening board.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = SimpleRng::new(config.seed);
        let board = generate(
            config.rows,
            config.cols,
            &config.kinds,
            config.match_rules.min_run,
            &mut rng,
        )?;
        Ok(Self {
            board,
            engine: CascadeEngine::from_config(&config),
            config,
            rng,
            score: 0,
            moves: 0,
            board_id: 0,
            episode_id: 0,
            last_report: None,
        })
    }

    /// Start from a fixed layout instead of a generated one (fixtures, replays).
    ///
    /// The layout must match the configured dimensions; matches already on it
    /// are resolved immediately without scoring.
    pub fn with_board(config: GameConfig, mut board: Board) -> Result<Self, GameError> {
        config.validate()?;
        if board.rows() != config.rows || board.cols() != config.cols {
            return Err(GameError::InvalidLayout(format!(
                "board is {}x{}, config wants {}x{}",
                board.rows(),
                board.cols(),
                config.rows,
                config.cols
            )));
        }
        if !board.is_full() {
            return Err(GameError::InvalidLayout("board has empty slots".into()));
        }
        let mut rng = SimpleRng::new(config.seed);
        let engine = CascadeEngine::from_config(&config);
        engine.resolve(&mut board, &config.kinds, &mut rng)?;
        Ok(Self {
            board,
            engine,
            config,
            rng,
            score: 0,
            moves: 0,
            board_id: 0,
            episode_id: 0,
            last_report: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn board_id(&self) -> u32 {
        self.board_id
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn last_report(&self) -> Option<&CascadeReport> {
        self.last_report.as_ref()
    }

    fn min_run(&self) -> u8 {
        self.config.match_rules.min_run
    }

    /// Swap two tiles and resolve the result.
    ///
    /// Rejected swaps leave the session untouched. Any failure after the swap
    /// is applied (cascade overflow, failed reshuffle) restores the board and
    /// RNG, and score, move count, board id and last report stay as they were.
    pub fn try_swap(&mut self, a: Pos, b: Pos) -> Result<MoveOutcome, GameError> {
        let min_run = self.min_run();
        validator::check_swap(&self.board, a, b, min_run, self.config.swap_rule)?;

        let board_before = self.board.clone();
        let rng_before = self.rng.clone();
        let (report, reshuffled) = match self.settle_swap(a, b, min_run) {
            Ok(settled) => settled,
            Err(e) => {
                self.board = board_before;
                self.rng = rng_before;
                return Err(e);
            }
        };

        self.score = self.score.saturating_add(report.score);
        self.moves += 1;
        self.board_id = self.board_id.wrapping_add(if reshuffled { 2 } else { 1 });
        self.last_report = Some(report.clone());
        Ok(MoveOutcome { report, reshuffled })
    }

    /// Apply the swap, run the cascade and reshuffle a dead board. Touches
    /// only the board and RNG.
    fn settle_swap(
        &mut self,
        a: Pos,
        b: Pos,
        min_run: u8,
    ) -> Result<(CascadeReport, bool), GameError> {
        self.board.swap(a, b)?;
        let report = self
            .engine
            .resolve(&mut self.board, &self.config.kinds, &mut self.rng)?;

        let reshuffled = !validator::has_legal_move(&self.board, min_run, SwapRule::MustMatch);
        if reshuffled {
            reshuffle(&mut self.board, &self.config.kinds, min_run, &mut self.rng)?;
        }
        Ok((report, reshuffled))
    }

    pub fn is_legal_swap(&self, a: Pos, b: Pos) -> bool {
        validator::is_legal_swap(&self.board, a, b, self.min_run(), self.config.swap_rule)
    }

    /// Swaps accepted under the configured rule.
    pub fn legal_moves(&self) -> Vec<Move> {
        validator::legal_moves(&self.board, self.min_run(), self.config.swap_rule)
    }

    /// True when some swap would create a match.
    pub fn has_legal_move(&self) -> bool {
        validator::has_legal_move(&self.board, self.min_run(), SwapRule::MustMatch)
    }

    /// First swap, row-major, that creates a match.
    pub fn hint(&self) -> Option<Move> {
        validator::legal_moves(&self.board, self.min_run(), SwapRule::MustMatch)
            .into_iter()
            .next()
    }

    /// Deal a fresh board from the continuing RNG stream.
    pub fn restart(&mut self) -> Result<(), GameError> {
        let min_run = self.min_run();
        self.board = generate(
            self.config.rows,
            self.config.cols,
            &self.config.kinds,
            min_run,
            &mut self.rng,
        )?;
        self.score = 0;
        self.moves = 0;
        self.last_report = None;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.board_id = self.board_id.wrapping_add(1);
        Ok(())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.snapshot(),
            board_id: self.board_id,
            episode_id: self.episode_id,
            seed: self.config.seed,
            score: self.score,
            moves: self.moves,
            last_cascade: self.last_report.as_ref().map(CascadeSummary::from),
            has_moves: self.has_legal_move(),
        }
    }
}
