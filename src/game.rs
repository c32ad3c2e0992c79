//! Game orchestrator
//!
//! Owns the simulation state, the tile world, the camera and the frame clock.
//! Hosts feed it timestamps and an input source once per animation frame and
//! call `render` afterwards. Score changes are pushed to an injected sink.

use crate::config::GameConfig;
use crate::consts::REFERENCE_FPS;
use crate::error::ConfigError;
use crate::platform::{Action, FrameClock, InputSource, ScoreSink, ScoreSnapshot, read_tick_input};
use crate::renderer::{AssetResolver, RenderTarget, draw_scene};
use crate::sim::{Body, Camera, GameEvent, GamePhase, GameState, TileWorld, tick};

/// What a call to `Game::frame` did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Waiting for the first input
    Idle,
    Paused,
    /// Simulation advanced by this many seconds
    Stepped(f32),
    GameOver,
}

pub struct Game {
    state: GameState,
    tiles: TileWorld,
    camera: Camera,
    clock: FrameClock,
    sink: Box<dyn ScoreSink>,
    last_snapshot: Option<ScoreSnapshot>,
    /// Pause key state last frame, for edge detection
    pause_held: bool,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.state.phase)
            .field("score", &self.state.score)
            .field("lives", &self.state.lives)
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(config: GameConfig, sink: impl ScoreSink + 'static) -> Result<Self, ConfigError> {
        let tiles = TileWorld::new(config.seed, config.world.tile_size, config.world.tile_cache_max)?;
        let mut camera = Camera::new(
            config.camera.viewport_width,
            config.camera.viewport_height,
            config.camera.smoothing,
        )?;
        let clock = FrameClock::new(config.max_frame_delta);
        let state = GameState::new(config)?;
        camera.set_target(state.player.head());
        camera.snap_to_target();

        log::info!("Game created with seed {}", state.seed);
        let mut game = Self {
            state,
            tiles,
            camera,
            clock,
            sink: Box::new(sink),
            last_snapshot: None,
            pause_held: false,
        };
        game.notify();
        Ok(game)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.state.score,
            lives: self.state.lives,
            game_over: self.state.phase == GamePhase::GameOver,
            paused: self.state.phase == GamePhase::Paused,
        }
    }

    /// Push a snapshot to the sink if anything changed
    fn notify(&mut self) {
        let snapshot = self.snapshot();
        if self.last_snapshot != Some(snapshot) {
            self.sink.on_change(&snapshot);
            self.last_snapshot = Some(snapshot);
        }
    }

    /// Idle -> Running
    pub fn start(&mut self) {
        if self.state.phase != GamePhase::Idle {
            return;
        }
        self.state.phase = GamePhase::Running;
        self.clock.suspend();
        self.camera.set_target(self.state.player.head());
        self.camera.snap_to_target();
        log::info!("Run started");
        self.notify();
    }

    pub fn pause(&mut self) {
        if self.state.phase != GamePhase::Running {
            return;
        }
        self.state.phase = GamePhase::Paused;
        self.clock.suspend();
        log::info!("Paused at {:.1}s", self.state.survival_time());
        self.notify();
    }

    pub fn resume(&mut self) {
        if self.state.phase != GamePhase::Paused {
            return;
        }
        self.state.phase = GamePhase::Running;
        // The first frame after a resume steps by zero
        self.clock.suspend();
        log::info!("Resumed");
        self.notify();
    }

    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Back to Idle with the same seed
    pub fn reset(&mut self) {
        self.state.reset();
        self.after_reset();
    }

    /// Back to Idle with a new seed
    pub fn restart(&mut self, seed: u64) {
        self.state.reseed(seed);
        self.after_reset();
    }

    fn after_reset(&mut self) {
        self.tiles.set_seed(self.state.seed);
        self.clock.suspend();
        self.pause_held = false;
        self.camera.set_target(self.state.player.head());
        self.camera.snap_to_target();
        log::info!("Game reset (seed {})", self.state.seed);
        self.notify();
    }

    /// Run one animation frame at host time `now_ms`
    pub fn frame(&mut self, now_ms: f64, input: &dyn InputSource) -> FrameOutcome {
        let pause_held = input.is_held(Action::PauseToggle);
        let pause_pressed = pause_held && !self.pause_held;
        self.pause_held = pause_held;

        if self.state.phase == GamePhase::Idle {
            let any = Action::ALL
                .iter()
                .any(|&a| a != Action::PauseToggle && input.is_held(a));
            if !any {
                return FrameOutcome::Idle;
            }
            self.start();
        } else if pause_pressed {
            self.toggle_pause();
        }

        match self.state.phase {
            GamePhase::Running => {
                let dt = self.clock.tick(now_ms);
                self.step(dt, input);
                if self.state.phase == GamePhase::GameOver {
                    FrameOutcome::GameOver
                } else {
                    FrameOutcome::Stepped(dt)
                }
            }
            GamePhase::Paused => FrameOutcome::Paused,
            GamePhase::GameOver => FrameOutcome::GameOver,
            GamePhase::Idle => FrameOutcome::Idle,
        }
    }

    /// Advance the simulation by `dt` seconds of held input
    pub fn step(&mut self, dt: f32, input: &dyn InputSource) {
        let tick_input = read_tick_input(input);
        tick(&mut self.state, &tick_input, dt);

        let frames = dt.clamp(0.0, self.clock.max_delta()) * REFERENCE_FPS;
        self.camera.set_target(self.state.player.head());
        self.camera.update(frames);
        self.notify();
    }

    pub fn render(&mut self, target: &mut dyn RenderTarget, assets: &dyn AssetResolver) {
        draw_scene(&self.state, &self.camera, &mut self.tiles, target, assets);
    }

    /// Drain gameplay events since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScores;
    use crate::platform::{KeyboardState, NoInput, NullSink};
    use crate::renderer::{Blit, Color, NoAssets};
    use crate::sim::DeathCause;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::f32::consts::PI;
    use std::rc::Rc;

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.enemies.spawn_delay = 1e6;
        config.pickups.bonus_target = 0;
        config
    }

    fn recording_game() -> (Game, Rc<RefCell<Vec<ScoreSnapshot>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let game = Game::new(quiet_config(), move |s: &ScoreSnapshot| log.borrow_mut().push(*s)).unwrap();
        (game, seen)
    }

    fn hold(keys: &[&str]) -> KeyboardState {
        let mut state = KeyboardState::new();
        for key in keys {
            state.key_down(key);
        }
        state
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = GameConfig::default();
        config.player.segment_spacing = 0.0;
        assert!(Game::new(config, NullSink).is_err());
    }

    #[test]
    fn test_idle_until_input() {
        let mut game = Game::new(quiet_config(), NullSink).unwrap();
        assert_eq!(game.frame(0.0, &NoInput), FrameOutcome::Idle);
        assert_eq!(game.frame(16.0, &NoInput), FrameOutcome::Idle);
        assert_eq!(game.state().elapsed, 0.0);

        // Pause alone doesn't start a run
        assert_eq!(game.frame(32.0, &hold(&["p"])), FrameOutcome::Idle);

        let outcome = game.frame(48.0, &hold(&["ArrowLeft"]));
        assert_eq!(outcome, FrameOutcome::Stepped(0.0));
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(matches!(game.frame(64.0, &NoInput), FrameOutcome::Stepped(dt) if dt > 0.0));
    }

    #[test]
    fn test_pause_toggles_on_press_edge() {
        let mut game = Game::new(quiet_config(), NullSink).unwrap();
        game.start();
        game.frame(0.0, &NoInput);

        let pause = hold(&["Escape"]);
        assert_eq!(game.frame(16.0, &pause), FrameOutcome::Paused);
        // Still held: no toggle
        assert_eq!(game.frame(32.0, &pause), FrameOutcome::Paused);
        assert_eq!(game.frame(48.0, &NoInput), FrameOutcome::Paused);
        assert_eq!(game.frame(64.0, &pause), FrameOutcome::Stepped(0.0));
        assert_eq!(game.phase(), GamePhase::Running);
    }

    #[test]
    fn test_paused_time_is_not_replayed() {
        let mut game = Game::new(quiet_config(), NullSink).unwrap();
        game.start();
        game.frame(0.0, &NoInput);
        game.frame(16.0, &NoInput);
        let before = game.state().elapsed;

        game.pause();
        for i in 0..100 {
            game.frame(1000.0 + i as f64 * 16.0, &NoInput);
        }
        assert_eq!(game.state().elapsed, before);

        game.resume();
        assert_eq!(game.frame(60_000.0, &NoInput), FrameOutcome::Stepped(0.0));
        game.frame(60_016.0, &NoInput);
        assert!((game.state().elapsed - before - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_sink_only_sees_changes() {
        let (mut game, seen) = recording_game();
        assert_eq!(seen.borrow().len(), 1);

        game.start();
        for i in 0..10 {
            game.frame(i as f64 * 16.0, &NoInput);
        }
        // Nothing changed score, lives or flags
        assert_eq!(seen.borrow().len(), 1);

        game.pause();
        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow()[1].paused);
        game.resume();
        assert!(!seen.borrow()[2].paused);
    }

    #[test]
    fn test_game_over_reaches_leaderboard_once() {
        let board = Rc::new(RefCell::new(HighScores::new()));
        let sink = board.clone();
        let mut game = Game::new(quiet_config(), move |s: &ScoreSnapshot| sink.borrow_mut().on_change(s)).unwrap();
        game.start();
        game.state_mut().lives = 1;
        game.state_mut().score = 420;
        game.state_mut().player.reset_segments(Vec2::new(20.0, 1500.0), PI);

        let mut outcome = FrameOutcome::Idle;
        for _ in 0..20 {
            game.step(0.1, &NoInput);
            if game.phase() == GamePhase::GameOver {
                outcome = FrameOutcome::GameOver;
                break;
            }
        }
        assert_eq!(outcome, FrameOutcome::GameOver);
        assert!(game.take_events().contains(&GameEvent::LifeLost {
            cause: DeathCause::Wall,
            lives_left: 0
        }));

        // Frames after game over change nothing
        assert_eq!(game.frame(0.0, &NoInput), FrameOutcome::GameOver);
        assert_eq!(board.borrow().entries.len(), 1);
        assert_eq!(board.borrow().top_score(), Some(420));

        game.reset();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.snapshot().lives, 3);
        assert_eq!(board.borrow().entries.len(), 1);
    }

    #[test]
    fn test_restart_reseeds_tiles_and_state() {
        let mut game = Game::new(quiet_config(), NullSink).unwrap();
        game.restart(77);
        assert_eq!(game.state().seed, 77);
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_camera_follows_head() {
        let mut game = Game::new(quiet_config(), NullSink).unwrap();
        game.start();
        for _ in 0..120 {
            game.step(1.0 / 60.0, &NoInput);
        }
        let center = game.camera().pos + game.camera().viewport() * 0.5;
        assert!(center.distance(game.state().player.head()) < 30.0);
    }

    #[test]
    fn test_render_draws_something() {
        struct Count(usize);
        impl RenderTarget for Count {
            fn fill_circle(&mut self, _: Vec2, _: f32, _: Color) {
                self.0 += 1;
            }
            fn fill_rect(&mut self, _: Vec2, _: Vec2, _: Color) {
                self.0 += 1;
            }
            fn draw_image(&mut self, _: &Blit) {
                self.0 += 1;
            }
            fn draw_text(&mut self, _: &str, _: Vec2, _: f32, _: Color) {
                self.0 += 1;
            }
        }
        let mut game = Game::new(quiet_config(), NullSink).unwrap();
        let mut target = Count(0);
        game.render(&mut target, &NoAssets);
        assert!(target.0 > 10);
    }
}
