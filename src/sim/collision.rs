//! Collision queries
//!
//! Detection only. Every function here reads entities and reports what
//! touched what; the tick decides the consequences and their order.

use glam::Vec2;

use super::enemy::EnemySnake;
use super::pickups::Pickup;
use super::snake::{Body, PlayerSnake};
use crate::Rect;

/// Circle-circle overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

#[inline]
pub fn point_in_radius(p: Vec2, center: Vec2, radius: f32) -> bool {
    p.distance_squared(center) < radius * radius
}

/// First body point at or past `skip` that a circle at `point` overlaps
pub fn first_body_hit<B: Body>(point: Vec2, radius: f32, body: &B, skip: usize) -> Option<usize> {
    (skip..body.body_len()).find(|&i| {
        circles_overlap(point, radius, body.body_point(i), body.segment_radius())
    })
}

/// Everything the player's head ran into this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerCollision {
    pub wall: bool,
    /// Segment index the head bit into
    pub self_hit: Option<usize>,
    /// Id of the first pickup touched
    pub pickup: Option<u32>,
}

impl PlayerCollision {
    /// Whether this costs a life (before invincibility)
    pub fn is_fatal(&self) -> bool {
        self.wall || self.self_hit.is_some()
    }
}

/// Wall, self and pickup checks for the player head.
/// With `bonus_blocked`, only malus pickups can be touched.
pub fn check_player(
    player: &PlayerSnake,
    world: Rect,
    pickups: &[Pickup],
    bonus_blocked: bool,
) -> PlayerCollision {
    let head = player.head();
    let radius = player.collision_radius();

    let wall = head.x < world.min.x + radius
        || head.x > world.max.x - radius
        || head.y < world.min.y + radius
        || head.y > world.max.y - radius;

    let pickup = pickups
        .iter()
        .filter(|p| !bonus_blocked || p.kind.is_malus())
        .find(|p| circles_overlap(head, radius, p.pos, p.radius))
        .map(|p| p.id);

    PlayerCollision {
        wall,
        self_hit: player.self_collision(),
        pickup,
    }
}

/// Contact between the player and one enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyContact {
    /// Player head touched the enemy (head or body)
    PlayerHitEnemy { enemy: usize, index: usize },
    /// Enemy head touched the player's body behind the head
    EnemyHitPlayer { enemy: usize, index: usize },
}

/// Player head against enemy bodies, then enemy heads against the player body.
/// At most one contact per enemy; the player striking wins.
pub fn player_vs_enemies(player: &PlayerSnake, enemies: &[EnemySnake]) -> Vec<EnemyContact> {
    let head = player.head();
    let radius = player.collision_radius();

    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_active())
        .filter_map(|(i, enemy)| {
            if let Some(index) = first_body_hit(head, radius, enemy, 0) {
                return Some(EnemyContact::PlayerHitEnemy { enemy: i, index });
            }
            first_body_hit(enemy.head(), enemy.segment_radius(), player, 1)
                .map(|index| EnemyContact::EnemyHitPlayer { enemy: i, index })
        })
        .collect()
}

/// Contact between two enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyCollision {
    HeadToHead { a: usize, b: usize },
    HeadIntoBody { striker: usize, struck: usize, index: usize },
}

/// All enemy-enemy contacts, pairs visited in index order
pub fn enemy_pairs(enemies: &[EnemySnake]) -> Vec<EnemyCollision> {
    let mut hits = Vec::new();
    for a in 0..enemies.len() {
        if !enemies[a].is_active() {
            continue;
        }
        for b in (a + 1)..enemies.len() {
            if !enemies[b].is_active() {
                continue;
            }
            let (ea, eb) = (&enemies[a], &enemies[b]);
            let reach = ea.collision_radius().max(eb.collision_radius());
            if point_in_radius(ea.head(), eb.head(), reach) {
                hits.push(EnemyCollision::HeadToHead { a, b });
                continue;
            }
            if let Some(index) = first_body_hit(ea.head(), ea.segment_radius(), eb, 1) {
                hits.push(EnemyCollision::HeadIntoBody {
                    striker: a,
                    struck: b,
                    index,
                });
            }
            if let Some(index) = first_body_hit(eb.head(), eb.segment_radius(), ea, 1) {
                hits.push(EnemyCollision::HeadIntoBody {
                    striker: b,
                    struck: a,
                    index,
                });
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyConfig, PickupConfig, PlayerConfig};
    use crate::sim::enemy::{Behavior, EnemyTemplate};
    use crate::sim::pickups::{BonusKind, MalusKind, PickupField, PickupKind};

    fn world() -> Rect {
        Rect::new(Vec2::ZERO, Vec2::splat(3000.0))
    }

    fn player_at(x: f32, y: f32) -> PlayerSnake {
        PlayerSnake::new(Vec2::new(x, y), 0.0, &PlayerConfig::default()).unwrap()
    }

    fn enemy(id: u32, head: Vec2, angle: f32, segments: usize) -> EnemySnake {
        let template = EnemyTemplate::new(&EnemyConfig::default()).unwrap();
        EnemySnake::spawn(id, &template, head, angle, segments, 1.0, Behavior::Random, 1.0, 0)
    }

    #[test]
    fn test_bonus_contact_scenario() {
        let bonus = Vec2::new(100.0, 100.0);
        assert!(circles_overlap(Vec2::new(105.0, 100.0), 8.0, bonus, 12.0));
        assert!(!circles_overlap(Vec2::new(130.0, 100.0), 8.0, bonus, 12.0));
        // Exactly touching is a miss
        assert!(!circles_overlap(Vec2::new(120.0, 100.0), 8.0, bonus, 12.0));
    }

    #[test]
    fn test_player_picks_up_bonus() {
        let mut field = PickupField::new(&PickupConfig::default(), 1);
        let id = field.insert(PickupKind::Bonus(BonusKind::Food), Vec2::new(505.0, 500.0));
        let player = player_at(500.0, 500.0);
        let hit = check_player(&player, world(), field.items(), false);
        assert_eq!(hit.pickup, Some(id));
        assert!(!hit.is_fatal());
    }

    #[test]
    fn test_bonus_block_leaves_malus_reachable() {
        let mut field = PickupField::new(&PickupConfig::default(), 1);
        field.insert(PickupKind::Bonus(BonusKind::Food), Vec2::new(505.0, 500.0));
        let player = player_at(500.0, 500.0);
        assert_eq!(check_player(&player, world(), field.items(), true).pickup, None);

        let malus = field.insert(PickupKind::Malus(MalusKind::Freeze), Vec2::new(495.0, 500.0));
        assert_eq!(check_player(&player, world(), field.items(), true).pickup, Some(malus));
    }

    #[test]
    fn test_wall_band() {
        assert!(!check_player(&player_at(100.0, 100.0), world(), &[], false).wall);
        assert!(check_player(&player_at(5.0, 100.0), world(), &[], false).wall);
        assert!(check_player(&player_at(100.0, 2995.0), world(), &[], false).wall);
    }

    #[test]
    fn test_player_head_into_enemy_body() {
        let player = player_at(500.0, 500.0);
        // Enemy heading up, body trails below through the player's head
        let e = enemy(1, Vec2::new(500.0, 470.0), -std::f32::consts::FRAC_PI_2, 6);
        let contacts = player_vs_enemies(&player, &[e]);
        assert!(matches!(
            contacts.as_slice(),
            [EnemyContact::PlayerHitEnemy { enemy: 0, .. }]
        ));
    }

    #[test]
    fn test_enemy_head_into_player_body() {
        let player = player_at(500.0, 500.0);
        // Player body runs from x=500 back to x=410; enemy head lands between
        // segments 4 and 5, nearer the first
        let e = enemy(1, Vec2::new(450.0, 505.0), std::f32::consts::FRAC_PI_2, 3);
        let contacts = player_vs_enemies(&player, &[e]);
        assert!(matches!(
            contacts.as_slice(),
            [EnemyContact::EnemyHitPlayer { enemy: 0, index: 4 }]
        ));
    }

    #[test]
    fn test_inactive_enemies_are_ignored() {
        let player = player_at(500.0, 500.0);
        let mut e = enemy(1, Vec2::new(505.0, 500.0), 0.0, 3);
        e.active = false;
        assert!(player_vs_enemies(&player, &[e]).is_empty());
    }

    #[test]
    fn test_heads_fifteen_apart_collide() {
        let enemies = [
            enemy(1, Vec2::new(1000.0, 1000.0), 0.0, 5),
            enemy(2, Vec2::new(1015.0, 1000.0), std::f32::consts::PI, 5),
        ];
        assert_eq!(
            enemy_pairs(&enemies),
            vec![EnemyCollision::HeadToHead { a: 0, b: 1 }]
        );
    }

    #[test]
    fn test_head_into_side() {
        let enemies = [
            // Horizontal body from x=1000 back to x=940
            enemy(1, Vec2::new(1000.0, 1000.0), 0.0, 5),
            // Vertical striker whose head sits on the other's body point 3;
            // point 2 is also within reach and is found first
            enemy(2, Vec2::new(964.0, 1004.0), -std::f32::consts::FRAC_PI_2, 5),
        ];
        assert_eq!(
            enemy_pairs(&enemies),
            vec![EnemyCollision::HeadIntoBody {
                striker: 1,
                struck: 0,
                index: 2
            }]
        );
    }

    #[test]
    fn test_far_enemies_do_not_touch() {
        let enemies = [
            enemy(1, Vec2::new(500.0, 500.0), 0.0, 5),
            enemy(2, Vec2::new(900.0, 900.0), 0.0, 5),
        ];
        assert!(enemy_pairs(&enemies).is_empty());
    }
}
