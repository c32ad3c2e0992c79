//! Browser front end
//!
//! Canvas 2D render target, image assets, keyboard listeners, DOM HUD and
//! the requestAnimationFrame loop. Pausing cancels the pending frame;
//! resuming schedules a fresh one.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use crate::config::GameConfig;
use crate::consts::{PICKUP_VARIANTS, TILE_TEXTURE_COUNT};
use crate::game::Game;
use crate::highscores::HighScores;
use crate::platform::{Action, KeyboardState, ScoreSink, ScoreSnapshot};
use crate::renderer::{AssetResolver, Blit, Color, RenderTarget, TextureHandle};
use crate::sim::{BonusKind, GameEvent, GamePhase, MalusKind, PickupKind};

const ASSET_ROOT: &str = "assets";

fn css(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3].clamp(0.0, 1.0)
    )
}

/// Sprites keyed by logical id; a handle is only issued once the image loaded
struct WebAssets {
    ids: HashMap<String, u32>,
    images: Vec<HtmlImageElement>,
}

impl WebAssets {
    fn load(ids: &[String]) -> Result<Self, JsValue> {
        let mut assets = Self {
            ids: HashMap::new(),
            images: Vec::with_capacity(ids.len()),
        };
        for id in ids {
            let image = HtmlImageElement::new()?;
            image.set_src(&format!("{ASSET_ROOT}/{id}.png"));
            assets.ids.insert(id.clone(), assets.images.len() as u32);
            assets.images.push(image);
        }
        log::info!("Requested {} sprites", assets.images.len());
        Ok(assets)
    }

    fn image(&self, handle: TextureHandle) -> Option<&HtmlImageElement> {
        self.images.get(handle.0 as usize)
    }
}

impl AssetResolver for WebAssets {
    fn texture(&self, id: &str) -> Option<TextureHandle> {
        let index = *self.ids.get(id)?;
        let image = self.images.get(index as usize)?;
        (image.complete() && image.natural_width() > 0).then_some(TextureHandle(index))
    }
}

/// Every sprite id the scene may ask for
fn asset_ids(enemy_skins: u8) -> Vec<String> {
    let mut ids: Vec<String> = (0..TILE_TEXTURE_COUNT).map(|t| format!("tile_{t}")).collect();
    ids.push("player_head".into());
    ids.push("player_body".into());
    for skin in 0..enemy_skins {
        ids.push(format!("enemy_{skin}_head"));
        ids.push(format!("enemy_{skin}_body"));
    }
    let kinds = BonusKind::ALL
        .into_iter()
        .map(PickupKind::Bonus)
        .chain(MalusKind::ALL.into_iter().map(PickupKind::Malus));
    for kind in kinds {
        for variant in 0..PICKUP_VARIANTS {
            ids.push(format!("{}_{variant}", kind.asset_id()));
        }
    }
    ids
}

struct CanvasTarget<'a> {
    ctx: &'a CanvasRenderingContext2d,
    assets: &'a WebAssets,
}

impl RenderTarget for CanvasTarget<'_> {
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, std::f64::consts::TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
    }

    fn draw_image(&mut self, blit: &Blit) {
        let Some(image) = self.assets.image(blit.texture) else {
            return;
        };
        let ctx = self.ctx;
        ctx.save();
        ctx.set_global_alpha(blit.opacity as f64);
        let placed = ctx
            .translate(blit.pos.x as f64, blit.pos.y as f64)
            .and_then(|_| ctx.rotate(blit.rotation as f64))
            .and_then(|_| ctx.scale(blit.scale.x as f64, blit.scale.y as f64))
            .and_then(|_| {
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    image,
                    (-blit.size.x * 0.5) as f64,
                    (-blit.size.y * 0.5) as f64,
                    blit.size.x as f64,
                    blit.size.y as f64,
                )
            });
        if let Err(e) = placed {
            log::warn!("drawImage failed: {:?}", e);
        }
        ctx.restore();
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, size: f32, color: Color) {
        self.ctx.set_font(&format!("{}px sans-serif", size.round()));
        self.ctx.set_fill_style_str(&css(color));
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}

fn set_text(document: &Document, selector: &str, text: &str) {
    if let Some(el) = document.query_selector(selector).ok().flatten() {
        el.set_text_content(Some(text));
    }
}

fn set_hidden(document: &Document, id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
    }
}

/// DOM HUD that also feeds the leaderboard
fn hud_sink(board: Rc<RefCell<HighScores>>) -> impl ScoreSink + 'static {
    move |snapshot: &ScoreSnapshot| {
        board.borrow_mut().on_change(snapshot);
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        set_text(&document, "#hud-score .hud-value", &snapshot.score.to_string());
        set_text(&document, "#hud-lives .hud-value", &snapshot.lives.to_string());
        if let Some(best) = board.borrow().top_score() {
            set_text(&document, "#hud-best .hud-value", &best.to_string());
        }
        set_hidden(&document, "pause-menu", !snapshot.paused);
        set_hidden(&document, "game-over", !snapshot.game_over);
        if snapshot.game_over {
            set_text(&document, "#final-score", &snapshot.score.to_string());
        }
    }
}

struct App {
    game: Game,
    keys: KeyboardState,
    ctx: CanvasRenderingContext2d,
    assets: WebAssets,
    /// Pending requestAnimationFrame id
    frame_id: Option<i32>,
}

impl App {
    fn pause(&mut self) {
        self.game.pause();
        self.keys.release_all();
        if let Some(id) = self.frame_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn render(&mut self) {
        let mut target = CanvasTarget {
            ctx: &self.ctx,
            assets: &self.assets,
        };
        self.game.render(&mut target, &self.assets);
    }
}

fn request_animation_frame(app: Rc<RefCell<App>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let handle = app.clone();
    let closure = Closure::once(move |time: f64| {
        game_loop(handle, time);
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => app.borrow_mut().frame_id = Some(id),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
    closure.forget();
}

fn game_loop(app: Rc<RefCell<App>>, time: f64) {
    let keep_going = {
        let mut a = app.borrow_mut();
        a.frame_id = None;
        let App { game, keys, .. } = &mut *a;
        game.frame(time, &*keys);
        for event in game.take_events() {
            match event {
                GameEvent::LevelUp { level, name } => log::info!("Level {level}: {name}"),
                GameEvent::GameOver { score } => log::info!("Final score {score}"),
                other => log::debug!("{:?}", other),
            }
        }
        a.render();
        a.game.phase() != GamePhase::Paused
    };
    if keep_going {
        request_animation_frame(app);
    }
}

fn setup_keyboard(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;

    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let key = event.key();
            let resume = {
                let mut a = app.borrow_mut();
                if a.keys.action_for(&key).is_some() {
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                let action = a.keys.key_down(&key);
                match a.game.phase() {
                    // The loop is stopped while paused, so resume here. The key
                    // is dropped so the next frame doesn't read it as a new press.
                    GamePhase::Paused if action == Some(Action::PauseToggle) => {
                        a.keys.key_up(&key);
                        a.game.resume();
                        true
                    }
                    GamePhase::GameOver if key == "Enter" => {
                        a.game.restart(js_sys::Date::now() as u64);
                        false
                    }
                    _ => false,
                }
            };
            if resume && app.borrow().frame_id.is_none() {
                request_animation_frame(app.clone());
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            app.borrow_mut().keys.key_up(&event.key());
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn setup_auto_pause(app: Rc<RefCell<App>>, document: &Document) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;

    // Tab hidden
    {
        let app = app.clone();
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut a = app.borrow_mut();
                if a.game.phase() == GamePhase::Running {
                    a.pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Window blur
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut a = app.borrow_mut();
            a.keys.release_all();
            if a.game.phase() == GamePhase::Running {
                a.pause();
                log::info!("Auto-paused (window blur)");
            }
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("SnakeSouls starting...");

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    set_hidden(&document, "loading", true);

    let canvas: HtmlCanvasElement = document
        .get_element_by_id("canvas")
        .ok_or("no canvas")?
        .dyn_into()?;
    let width = canvas.client_width().max(1) as u32;
    let height = canvas.client_height().max(1) as u32;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or("no 2d context")?
        .dyn_into()?;

    let mut config = GameConfig::load();
    config.seed = js_sys::Date::now() as u64;
    config.camera.viewport_width = width as f32;
    config.camera.viewport_height = height as f32;
    let skins = config.enemies.skins;

    let board = Rc::new(RefCell::new(HighScores::new()));
    let game = Game::new(config, hud_sink(board)).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let assets = WebAssets::load(&asset_ids(skins))?;

    let app = Rc::new(RefCell::new(App {
        game,
        keys: KeyboardState::new(),
        ctx,
        assets,
        frame_id: None,
    }));

    setup_keyboard(app.clone())?;
    setup_auto_pause(app.clone(), &document)?;
    set_hidden(&document, "hud", false);

    request_animation_frame(app);
    log::info!("SnakeSouls running!");
    Ok(())
}
