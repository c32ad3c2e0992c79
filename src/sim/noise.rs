//! Deterministic position hashing
//!
//! Stateless: the same `(x, y, seed)` always produces the same value, so the
//! world looks identical across sessions sharing a seed.

/// Integer avalanche finalizer
#[inline]
fn mix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

#[inline]
fn combine(a: u32, b: u32, seed: u32) -> u32 {
    let mut h = mix(seed.wrapping_mul(0x9e37_79b9).wrapping_add(0x632b_e5ab));
    h = mix(h ^ a.wrapping_mul(0x85eb_ca6b));
    mix(h ^ b.wrapping_mul(0xc2b2_ae35))
}

/// Top 24 bits mapped to [0, 1)
#[inline]
fn to_unit(h: u32) -> f32 {
    (h >> 8) as f32 * (1.0 / 16_777_216.0)
}

/// Float bits with -0.0 folded onto 0.0
#[inline]
fn canonical_bits(v: f32) -> u32 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

/// Fold a 64-bit run seed into the 32-bit noise seed
#[inline]
pub fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Raw hash of an integer grid cell
#[inline]
pub fn hash_cell(x: i32, y: i32, seed: u32) -> u32 {
    combine(x as u32, y as u32, seed)
}

/// Value in [0, 1) for an integer grid cell on a given channel
#[inline]
pub fn cell_channel(x: i32, y: i32, seed: u32, channel: u32) -> f32 {
    to_unit(hash_cell(x, y, seed ^ mix(channel.wrapping_add(1))))
}

/// Value in [0, 1) for any world position
#[inline]
pub fn noise(x: f32, y: f32, seed: u32) -> f32 {
    to_unit(combine(canonical_bits(x), canonical_bits(y), seed))
}

/// Independent stream of `noise` for a given channel
#[inline]
pub fn noise_channel(x: f32, y: f32, seed: u32, channel: u32) -> f32 {
    noise(x, y, seed ^ mix(channel.wrapping_add(1)))
}
