//! Terminal jewel-match runner (default binary).
//!
//! crossterm for input, the framebuffer renderer from `jewel_match::term`,
//! and the optional TCP adapter for remote play.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};

use jewel_match::adapter::{build_observation, service, Adapter, OutboundMessage};
use jewel_match::core::{GameConfig, GameState, KindSet};
use jewel_match::engine::plan_best_swap;
use jewel_match::input::{handle_key_event, should_quit, CursorState};
use jewel_match::term::{
    AdapterStatusView, BoardOverlay, FrameBuffer, GameView, TerminalRenderer, Viewport,
};
use jewel_match::types::{GameAction, Pos, TICK_MS};

fn main() -> Result<()> {
    let config = config_from_env()?;
    let mut game = GameState::new(config).context("could not deal an opening board")?;
    let mut adapter = Adapter::start_from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut game, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// `JEWEL_SEED`, `JEWEL_ROWS`, `JEWEL_COLS` and `JEWEL_KINDS` over the defaults.
fn config_from_env() -> Result<GameConfig> {
    let seed = env_num("JEWEL_SEED")?.unwrap_or_else(clock_seed);
    let mut config = GameConfig::default().with_seed(seed);

    let rows = env_num("JEWEL_ROWS")?.unwrap_or(config.rows);
    let cols = env_num("JEWEL_COLS")?.unwrap_or(config.cols);
    config = config.with_size(rows, cols);

    if let Some(n) = env_num::<usize>("JEWEL_KINDS")? {
        config = config.with_kinds(KindSet::first(n).context("JEWEL_KINDS")?);
    }

    config.validate()?;
    Ok(config)
}

fn env_num<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{}={:?} is not a valid number", key, v)),
        _ => Ok(None),
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(1)
}

/// Frontend-only state: cursor, hint highlight and the status line.
struct Ui {
    cursor: CursorState,
    hint: Option<(Pos, Pos)>,
    message: Option<String>,
    obs_seq: u64,
}

impl Ui {
    fn new(game: &GameState) -> Self {
        Self {
            cursor: CursorState::new(game.board().rows(), game.board().cols()),
            hint: None,
            message: None,
            obs_seq: 0,
        }
    }

    /// The board changed under the cursor; stale highlights go.
    fn board_changed(&mut self) {
        self.hint = None;
        self.cursor.clear_selection();
    }
}

fn run(
    term: &mut TerminalRenderer,
    game: &mut GameState,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let view = GameView::default();
    let mut ui = Ui::new(game);
    let mut fb = FrameBuffer::new(0, 0);
    let frame = Duration::from_millis(TICK_MS as u64);

    loop {
        // Remote commands.
        if let Some(adapter) = adapter.as_deref_mut() {
            let board_id = game.board_id();
            while let Some(inbound) = adapter.try_recv() {
                for msg in service(game, inbound, &mut ui.obs_seq) {
                    adapter.send(msg);
                }
            }
            if game.board_id() != board_id {
                ui.board_changed();
                ui.message = Some("remote move".to_string());
            }
        }

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let status = adapter.as_deref().map(|a| {
            let st = a.status();
            AdapterStatusView {
                enabled: true,
                client_count: st.client_count,
                controller_id: st.controller_id,
                streaming_count: st.streaming_count,
            }
        });
        let overlay = BoardOverlay {
            cursor: Some(ui.cursor.cursor()),
            selected: ui.cursor.selected(),
            hint: ui.hint,
            message: ui.message.as_deref(),
        };
        let viewport = Viewport::new(w, h);
        view.render_into(&game.snapshot(), &overlay, status.as_ref(), viewport, &mut fb);
        term.present(&fb)?;

        // Wait at most one frame so remote commands keep flowing.
        if event::poll(frame)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        let changed = apply_local(game, &mut ui, action)?;
                        if changed {
                            if let Some(adapter) = adapter.as_deref() {
                                ui.obs_seq += 1;
                                adapter.send(OutboundMessage::BroadcastObservation {
                                    obs: build_observation(game, ui.obs_seq),
                                });
                            }
                        }
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }
    }
}

/// Apply one keyboard action. Returns true when the board changed.
fn apply_local(game: &mut GameState, ui: &mut Ui, action: GameAction) -> Result<bool> {
    match action {
        GameAction::Hint => {
            match plan_best_swap(game) {
                Some(planned) => {
                    ui.hint = Some((planned.mv.a, planned.mv.b));
                    ui.message = Some(format!("try {} (+{})", planned.mv, planned.score));
                }
                None => {
                    ui.hint = None;
                    ui.message = Some("no moves".to_string());
                }
            }
            Ok(false)
        }
        GameAction::Restart => {
            game.restart()?;
            ui.board_changed();
            ui.message = Some("new board".to_string());
            Ok(true)
        }
        _ => {
            let Some(req) = ui.cursor.apply(action) else {
                return Ok(false);
            };
            match game.try_swap(req.from, req.to) {
                Ok(outcome) => {
                    ui.board_changed();
                    let mut msg = format!("+{}", outcome.report.score);
                    if outcome.report.depth() > 1 {
                        msg.push_str(&format!(" cascade x{}", outcome.report.depth()));
                    }
                    if outcome.reshuffled {
                        msg.push_str(" reshuffled");
                    }
                    ui.message = Some(msg);
                    Ok(true)
                }
                // Rejected and overflowing swaps both leave the board as it was.
                Err(e) => {
                    ui.message = Some(e.to_string());
                    Ok(false)
                }
            }
        }
    }
}
