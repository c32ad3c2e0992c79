//! Scene drawing
//!
//! Back to front: ground tiles, walls, pickups, debris, enemies, player,
//! fog, reveal indicators, HUD. Every sprite has a primitive fallback.

use glam::Vec2;

use super::colors;
use super::{AssetResolver, Blit, Color, RenderTarget};
use crate::Rect;
use crate::sim::{Body, Camera, EffectKind, GamePhase, GameState, PickupKind, TileWorld};

const WALL_THICKNESS: f32 = 8.0;
const REVEAL_INSET: f32 = 16.0;
const REVEAL_DOT: f32 = 6.0;
const HUD_TEXT: f32 = 18.0;
const BANNER_TEXT: f32 = 40.0;
/// Debris fades out over this final fraction of its lifetime
const DEBRIS_FADE_TAIL: f32 = 0.3;

/// Blit `id` if the resolver has it, otherwise run `fallback`
fn sprite_or(
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
    id: &str,
    blit: impl FnOnce(super::TextureHandle) -> Blit,
    fallback: impl FnOnce(&mut dyn RenderTarget),
) {
    match assets.texture(id) {
        Some(handle) => target.draw_image(&blit(handle)),
        None => {
            log::trace!("texture {id} missing, drawing primitive");
            fallback(target);
        }
    }
}

/// Draw one frame of the world as seen by `camera`
pub fn draw_scene(
    state: &GameState,
    camera: &Camera,
    tiles: &mut TileWorld,
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
) {
    let viewport = camera.viewport();
    target.fill_rect(Vec2::ZERO, viewport, colors::BACKGROUND);

    draw_tiles(camera, tiles, target, assets);
    if !state.effects.is_active(EffectKind::InvisibleWalls) {
        draw_walls(state.world, camera, target);
    }
    draw_pickups(state, camera, target, assets);
    draw_debris(state, camera, target, assets);
    draw_enemies(state, camera, target, assets);
    draw_player(state, camera, target, assets);

    if let Some(radius) = state.effects.get(EffectKind::FogOfWar) {
        draw_fog(camera.world_to_screen(state.player.head()), radius, viewport, target);
    }
    if state.effects.is_active(EffectKind::PositionReveal) {
        draw_reveal(state, camera, target);
    }
    draw_hud(state, viewport, target);
}

fn draw_tiles(
    camera: &Camera,
    tiles: &mut TileWorld,
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
) {
    let size = tiles.tile_size();
    for tile in tiles.visible_tiles(camera.bounds()) {
        let min = camera.world_to_screen(tile.world_pos);
        let id = format!("tile_{}", tile.texture);
        let flip = Vec2::new(
            if tile.flip_x { -1.0 } else { 1.0 },
            if tile.flip_y { -1.0 } else { 1.0 },
        );
        sprite_or(
            target,
            assets,
            &id,
            |handle| {
                Blit::new(handle, min + Vec2::splat(size * 0.5), Vec2::splat(size))
                    .rotated(tile.rotation.radians())
                    .scaled(flip)
                    .with_opacity(tile.brightness.min(1.0))
            },
            |target| {
                let base = colors::GROUND[tile.texture as usize % colors::GROUND.len()];
                target.fill_rect(min, Vec2::splat(size), colors::shade(base, tile.brightness));
            },
        );
    }
}

fn draw_walls(world: Rect, camera: &Camera, target: &mut dyn RenderTarget) {
    let min = camera.world_to_screen(world.min);
    let size = world.size();
    let t = WALL_THICKNESS;
    target.fill_rect(min - Vec2::splat(t), Vec2::new(size.x + 2.0 * t, t), colors::WALL);
    target.fill_rect(
        Vec2::new(min.x - t, min.y + size.y),
        Vec2::new(size.x + 2.0 * t, t),
        colors::WALL,
    );
    target.fill_rect(Vec2::new(min.x - t, min.y), Vec2::new(t, size.y), colors::WALL);
    target.fill_rect(Vec2::new(min.x + size.x, min.y), Vec2::new(t, size.y), colors::WALL);
}

fn pickup_color(kind: &PickupKind) -> Color {
    match kind {
        PickupKind::Bonus(crate::sim::BonusKind::Food) => colors::FOOD,
        PickupKind::Bonus(_) => colors::POWER_UP,
        PickupKind::Malus(_) => colors::MALUS,
    }
}

fn draw_pickups(
    state: &GameState,
    camera: &Camera,
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
) {
    for pickup in state.pickups.items() {
        if !camera.is_visible(pickup.pos, pickup.radius) {
            continue;
        }
        let pos = camera.world_to_screen(pickup.pos);
        let id = format!("{}_{}", pickup.kind.asset_id(), pickup.variant);
        sprite_or(
            target,
            assets,
            &id,
            |handle| Blit::new(handle, pos, Vec2::splat(pickup.radius * 2.0)),
            |target| target.fill_circle(pos, pickup.radius, pickup_color(&pickup.kind)),
        );
    }
}

fn draw_debris(
    state: &GameState,
    camera: &Camera,
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
) {
    for debris in state.debris.particles() {
        if !camera.is_visible(debris.pos, debris.size) {
            continue;
        }
        let pos = camera.world_to_screen(debris.pos);
        let opacity = (debris.life_fraction() / DEBRIS_FADE_TAIL).min(1.0);
        let part = if debris.from_head { "head" } else { "body" };
        let id = format!("enemy_{}_{part}", debris.skin);
        sprite_or(
            target,
            assets,
            &id,
            |handle| Blit::new(handle, pos, Vec2::splat(debris.size * 2.0)).with_opacity(opacity),
            |target| target.fill_circle(pos, debris.size, colors::with_alpha(colors::DEBRIS, opacity)),
        );
    }
}

/// Draw a chain tail first so the head ends up on top
#[allow(clippy::too_many_arguments)]
fn draw_body(
    points: &[Vec2],
    radius: f32,
    skin_id: &str,
    head_color: Color,
    body_color: Color,
    opacity: f32,
    camera: &Camera,
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
) {
    let body_id = format!("{skin_id}_body");
    let head_id = format!("{skin_id}_head");
    for (i, &p) in points.iter().enumerate().rev() {
        if !camera.is_visible(p, radius) {
            continue;
        }
        let pos = camera.world_to_screen(p);
        // Segments face the point ahead of them
        let facing = match i {
            0 => points.get(1).map(|&next| p - next),
            _ => Some(points[i - 1] - p),
        }
        .map(crate::angle_of)
        .unwrap_or(0.0);
        let (id, color) = if i == 0 {
            (&head_id, head_color)
        } else {
            (&body_id, body_color)
        };
        sprite_or(
            target,
            assets,
            id,
            |handle| {
                Blit::new(handle, pos, Vec2::splat(radius * 2.0))
                    .rotated(facing)
                    .with_opacity(opacity)
            },
            |target| target.fill_circle(pos, radius, colors::with_alpha(color, opacity)),
        );
    }
}

fn draw_enemies(
    state: &GameState,
    camera: &Camera,
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
) {
    for enemy in state.enemies.enemies().iter().filter(|e| e.active) {
        let head = colors::ENEMY_HEADS[enemy.skin as usize % colors::ENEMY_HEADS.len()];
        draw_body(
            enemy.body(),
            enemy.segment_radius(),
            &format!("enemy_{}", enemy.skin),
            head,
            colors::shade(head, 0.75),
            1.0,
            camera,
            target,
            assets,
        );
    }
}

fn draw_player(
    state: &GameState,
    camera: &Camera,
    target: &mut dyn RenderTarget,
    assets: &dyn AssetResolver,
) {
    // Blink at 5 Hz while invincible
    let opacity = if state.is_invincible() && (state.elapsed * 10.0) as i64 % 2 == 1 {
        0.35
    } else {
        1.0
    };
    let points = state.player.body_points();
    draw_body(
        &points,
        state.player.segment_radius(),
        "player",
        colors::PLAYER_HEAD,
        colors::PLAYER_BODY,
        opacity,
        camera,
        target,
        assets,
    );
}

/// Darken everything outside a square of half-width `radius` around `center`
fn draw_fog(center: Vec2, radius: f32, viewport: Vec2, target: &mut dyn RenderTarget) {
    let lo = (center - Vec2::splat(radius)).clamp(Vec2::ZERO, viewport);
    let hi = (center + Vec2::splat(radius)).clamp(Vec2::ZERO, viewport);
    target.fill_rect(Vec2::ZERO, Vec2::new(viewport.x, lo.y), colors::FOG);
    target.fill_rect(Vec2::new(0.0, hi.y), Vec2::new(viewport.x, viewport.y - hi.y), colors::FOG);
    target.fill_rect(Vec2::new(0.0, lo.y), Vec2::new(lo.x, hi.y - lo.y), colors::FOG);
    target.fill_rect(Vec2::new(hi.x, lo.y), Vec2::new(viewport.x - hi.x, hi.y - lo.y), colors::FOG);
}

/// Edge markers pointing at off-screen enemies
fn draw_reveal(state: &GameState, camera: &Camera, target: &mut dyn RenderTarget) {
    let viewport = camera.viewport();
    let lo = Vec2::splat(REVEAL_INSET);
    let hi = viewport - Vec2::splat(REVEAL_INSET);
    for enemy in state.enemies.enemies().iter().filter(|e| e.active) {
        let head = enemy.head();
        if camera.is_visible(head, 0.0) {
            continue;
        }
        let marker = camera.world_to_screen(head).clamp(lo, hi);
        target.fill_circle(marker, REVEAL_DOT, colors::REVEAL);
    }
}

fn draw_hud(state: &GameState, viewport: Vec2, target: &mut dyn RenderTarget) {
    let level = state.difficulty.current();
    let lines = [
        format!("Score {}", state.score),
        format!("Lives {}", state.lives),
        format!("Niveau {} - {}", level.level, level.name),
        format!("{:.0}s", state.survival_time()),
    ];
    let mut y = HUD_TEXT + 4.0;
    for line in &lines {
        target.draw_text(line, Vec2::new(8.0, y), HUD_TEXT, colors::TEXT);
        y += HUD_TEXT + 4.0;
    }

    for (kind, _) in state.effects.iter_active() {
        let remaining = state.effects.remaining(kind, state.elapsed);
        let color = if kind.is_harmful() {
            colors::TEXT_HARMFUL
        } else {
            colors::TEXT
        };
        target.draw_text(
            &format!("{} {:.1}s", kind.label(), remaining),
            Vec2::new(8.0, y),
            HUD_TEXT,
            color,
        );
        y += HUD_TEXT + 4.0;
    }

    let banner = match state.phase {
        GamePhase::Idle => Some("Press any key"),
        GamePhase::Paused => Some("Pause"),
        GamePhase::GameOver => Some("Game Over"),
        GamePhase::Running => None,
    };
    if let Some(text) = banner {
        let width = text.chars().count() as f32 * BANNER_TEXT * 0.5;
        let pos = Vec2::new((viewport.x - width) * 0.5, viewport.y * 0.5);
        target.draw_text(text, pos, BANNER_TEXT, colors::TEXT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyConfig, GameConfig};
    use crate::renderer::{NoAssets, TextureHandle};
    use crate::sim::{Behavior, EnemySnake, EnemyTemplate};

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Circle(Vec2, f32, Color),
        Rect(Vec2, Vec2, Color),
        Image(Blit),
        Text(String),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl RenderTarget for Recorder {
        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.ops.push(Op::Circle(center, radius, color));
        }
        fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
            self.ops.push(Op::Rect(min, size, color));
        }
        fn draw_image(&mut self, blit: &Blit) {
            self.ops.push(Op::Image(*blit));
        }
        fn draw_text(&mut self, text: &str, _pos: Vec2, _size: f32, _color: Color) {
            self.ops.push(Op::Text(text.to_string()));
        }
    }

    impl Recorder {
        fn rects_with(&self, color: Color) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::Rect(_, _, c) if *c == color))
                .count()
        }
        fn circles_with(&self, color: Color) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::Circle(_, _, c) if *c == color))
                .count()
        }
        fn images(&self) -> usize {
            self.ops.iter().filter(|op| matches!(op, Op::Image(_))).count()
        }
        fn has_text(&self, needle: &str) -> bool {
            self.ops
                .iter()
                .any(|op| matches!(op, Op::Text(t) if t.contains(needle)))
        }
    }

    /// Resolves every id to the same handle
    struct AllAssets;

    impl AssetResolver for AllAssets {
        fn texture(&self, _id: &str) -> Option<TextureHandle> {
            Some(TextureHandle(7))
        }
    }

    fn setup() -> (GameState, Camera, TileWorld) {
        let config = GameConfig::default();
        let state = GameState::new(config.clone()).unwrap();
        let mut camera =
            Camera::new(config.camera.viewport_width, config.camera.viewport_height, 1.0).unwrap();
        camera.set_target(state.player.head());
        camera.snap_to_target();
        let tiles = TileWorld::new(config.seed, config.world.tile_size, config.world.tile_cache_max).unwrap();
        (state, camera, tiles)
    }

    #[test]
    fn test_missing_assets_fall_back_to_primitives() {
        let (state, camera, mut tiles) = setup();
        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &NoAssets);

        assert_eq!(rec.images(), 0);
        assert_eq!(rec.circles_with(colors::PLAYER_HEAD), 1);
        assert_eq!(rec.circles_with(colors::PLAYER_BODY), state.player.len() - 1);
        assert!(rec.ops.iter().any(|op| matches!(op, Op::Rect(_, size, _) if *size == Vec2::splat(256.0))));
    }

    fn debris_alphas(rec: &Recorder) -> Vec<f32> {
        rec.ops
            .iter()
            .filter_map(|op| match op {
                Op::Circle(_, _, c) if c[..3] == colors::DEBRIS[..3] => Some(c[3]),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_debris_is_opaque_when_fresh_and_fades_near_expiry() {
        let (mut state, mut camera, _) = setup();
        let spot = state.player.head() + Vec2::new(120.0, 0.0);
        state.debris.spawn_burst(&[spot], 2, &mut state.rng);

        let mut rec = Recorder::default();
        draw_debris(&state, &camera, &mut rec, &NoAssets);
        assert_eq!(debris_alphas(&rec), vec![1.0]);

        // Head debris lives 20 s; leave 1 s of it
        state.debris.update(19.0);
        camera.set_target(state.debris.particles()[0].pos);
        camera.snap_to_target();
        let mut rec = Recorder::default();
        draw_debris(&state, &camera, &mut rec, &NoAssets);
        let alphas = debris_alphas(&rec);
        assert_eq!(alphas.len(), 1);
        assert!(alphas[0] > 0.0 && alphas[0] < 0.5, "alpha {}", alphas[0]);
    }

    #[test]
    fn test_loaded_assets_are_blitted() {
        let (state, camera, mut tiles) = setup();
        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &AllAssets);

        assert_eq!(rec.circles_with(colors::PLAYER_HEAD), 0);
        assert!(rec.images() >= state.player.len());
    }

    #[test]
    fn test_invisible_walls_hide_the_border() {
        let (mut state, camera, mut tiles) = setup();
        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &NoAssets);
        assert_eq!(rec.rects_with(colors::WALL), 4);

        state.effects.apply(EffectKind::InvisibleWalls, 1.0, 0.0, 10.0);
        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &NoAssets);
        assert_eq!(rec.rects_with(colors::WALL), 0);
    }

    #[test]
    fn test_fog_darkens_outside_radius() {
        let (mut state, camera, mut tiles) = setup();
        state.effects.apply(EffectKind::FogOfWar, 100.0, 0.0, 8.0);
        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &NoAssets);

        assert_eq!(rec.rects_with(colors::FOG), 4);
        // Head sits at the viewport center; the top band ends 100 px above it
        let top = rec
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Rect(min, size, c) if *c == colors::FOG && *min == Vec2::ZERO => Some(*size),
                _ => None,
            })
            .unwrap();
        assert!((top.y - 200.0).abs() < 1e-3);
        assert!(rec.has_text("Fog"));
    }

    #[test]
    fn test_reveal_marks_offscreen_enemies() {
        let (mut state, camera, mut tiles) = setup();
        let template = EnemyTemplate::new(&EnemyConfig::default()).unwrap();
        let far = state.player.head() + Vec2::new(1000.0, 0.0);
        let near = state.player.head() + Vec2::new(100.0, 100.0);
        state
            .enemies
            .push(EnemySnake::spawn(1, &template, far, 0.0, 4, 1.0, Behavior::Passive, 1.0, 0));
        state
            .enemies
            .push(EnemySnake::spawn(2, &template, near, 0.0, 4, 1.0, Behavior::Passive, 1.0, 0));

        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &NoAssets);
        assert_eq!(rec.circles_with(colors::REVEAL), 0);

        state.effects.apply(EffectKind::PositionReveal, 1.0, 0.0, 8.0);
        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &NoAssets);
        assert_eq!(rec.circles_with(colors::REVEAL), 1);
        let marker = rec
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Circle(p, _, c) if *c == colors::REVEAL => Some(*p),
                _ => None,
            })
            .unwrap();
        assert_eq!(marker.x, camera.viewport().x - REVEAL_INSET);
    }

    #[test]
    fn test_hud_lines() {
        let (mut state, camera, mut tiles) = setup();
        state.score = 1234;
        let mut rec = Recorder::default();
        draw_scene(&state, &camera, &mut tiles, &mut rec, &NoAssets);
        assert!(rec.has_text("Score 1234"));
        assert!(rec.has_text("Lives 3"));
        assert!(rec.has_text("Tutoriel"));
        assert!(rec.has_text("Press any key"));
    }
}
