//! SnakeSouls entry point
//!
//! On wasm the browser front end takes over. Natively there is no window:
//! a seeded autopilot plays one run headless and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    snake_souls::platform::web::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use std::cell::RefCell;
    use std::rc::Rc;

    use snake_souls::platform::{Action, ScoreSink, ScoreSnapshot};
    use snake_souls::sim::{Body, GameEvent, GamePhase, GameState};
    use snake_souls::{Game, GameConfig, HighScores, angle_difference, angle_of};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Two hours of simulated play at most
    const MAX_FRAMES: u64 = 60 * 60 * 120;
    /// Start steering home this far from a wall
    const HOME_MARGIN: f32 = 300.0;

    /// Which way to turn: toward the nearest bonus, or home when near a wall
    fn steer(state: &GameState) -> f32 {
        let head = state.player.head();
        let target = if state.world.contains(head, -HOME_MARGIN) {
            state
                .pickups
                .items()
                .iter()
                .filter(|p| !p.kind.is_malus())
                .min_by(|a, b| head.distance_squared(a.pos).total_cmp(&head.distance_squared(b.pos)))
                .map(|p| p.pos)
                .unwrap_or_else(|| state.world.center())
        } else {
            state.world.center()
        };
        let diff = angle_difference(state.player.angle, angle_of(target - head));
        if diff.abs() < 0.05 {
            0.0
        } else {
            diff.signum()
        }
    }

    pub fn run(seed: u64) {
        let board = Rc::new(RefCell::new(HighScores::new()));
        let sink = board.clone();
        let config = GameConfig::with_seed(seed);
        let mut game = match Game::new(config, move |s: &ScoreSnapshot| sink.borrow_mut().on_change(s)) {
            Ok(game) => game,
            Err(e) => {
                log::error!("Invalid configuration: {e}");
                return;
            }
        };
        game.start();

        let mut frame = 0u64;
        while game.phase() != GamePhase::GameOver && frame < MAX_FRAMES {
            let turn = steer(game.state());
            let input = move |action: Action| match action {
                Action::TurnLeft => turn < 0.0,
                Action::TurnRight => turn > 0.0,
                _ => false,
            };
            game.frame(frame as f64 * FRAME_MS, &input);
            for event in game.take_events() {
                match event {
                    GameEvent::LevelUp { level, name } => {
                        log::info!("[{:>6.1}s] level {level} ({name})", game.state().survival_time())
                    }
                    GameEvent::LifeLost { cause, lives_left } => {
                        log::info!("[{:>6.1}s] {cause:?}, {lives_left} lives left", game.state().survival_time())
                    }
                    other => log::debug!("{other:?}"),
                }
            }
            frame += 1;
        }

        let state = game.state();
        log::info!(
            "Run over: score {} in {:.1}s, level {}, {} enemies alive",
            state.score,
            state.survival_time(),
            state.difficulty.current().level,
            state.enemies.active_count()
        );
        if let Some(best) = board.borrow().top_score() {
            log::info!("Best score: {best}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("SnakeSouls (native) starting...");
    log::info!("Native mode runs a headless autopilot - serve the wasm build for the real game");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    autopilot::run(seed);
}
