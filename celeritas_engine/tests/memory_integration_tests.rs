//! Integration tests for the memory primitives
//!
//! Pool reuse and staleness, arena reuse across frames. Only the public API
//! is used. No GPU required.
//!
//! Run with: cargo test --test memory_integration_tests

use celeritas_engine::celeritas::memory::{Arena, Pool, PoolHandle};
use celeritas_engine::celeritas::Error;
use celeritas_engine::define_handle;
use serial_test::serial;

define_handle! {
    /// Handle used only by these tests
    pub struct ParticleHandle => "particle";
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Particle {
    id: u32,
    mass: f32,
    tag: char,
}

// ============================================================================
// Pool
// ============================================================================

#[test]
#[serial]
fn test_pool_reuses_released_slot() {
    let mut pool: Pool<Particle, ParticleHandle> = Pool::new("particles", 2).unwrap();

    let (first, value) = pool.alloc().unwrap();
    *value = Particle { id: 1, mass: 1.5, tag: 'a' };
    let (second, _) = pool.alloc().unwrap();
    assert!(pool.alloc().is_none());
    assert!(pool.is_full());

    pool.dealloc(first).unwrap();
    let (third, value) = pool.alloc().unwrap();
    assert_eq!(*value, Particle::default());
    assert_eq!(third.index(), first.index());
    assert_ne!(third, first);

    assert!(pool.get(second).is_ok());
    assert_eq!(pool.len(), 2);
}

#[test]
#[serial]
fn test_pool_rejects_stale_and_foreign_handles() {
    let mut pool: Pool<Particle, ParticleHandle> = Pool::new("particles", 4).unwrap();
    let handle = pool.insert(Particle { id: 9, ..Default::default() }).unwrap();
    pool.dealloc(handle).unwrap();

    assert!(matches!(pool.get(handle), Err(Error::StaleHandle(_))));
    assert!(matches!(pool.get(ParticleHandle::INVALID), Err(Error::InvalidHandle(_))));
    assert!(matches!(
        pool.get(ParticleHandle::from_parts(40, 0)),
        Err(Error::InvalidHandle(_))
    ));
}

#[test]
#[serial]
fn test_pool_free_all_invalidates_everything() {
    let mut pool: Pool<Particle, ParticleHandle> = Pool::new("particles", 3).unwrap();
    let handles: Vec<ParticleHandle> = (0..3)
        .map(|id| pool.insert(Particle { id, ..Default::default() }).unwrap())
        .collect();

    pool.free_all();
    assert!(pool.is_empty());
    for handle in handles {
        assert!(!pool.contains(handle));
    }
    assert!(pool.insert(Particle::default()).is_some());
}

#[test]
#[serial]
fn test_pool_iteration_follows_slot_order() {
    let mut pool: Pool<Particle, ParticleHandle> = Pool::new("particles", 4).unwrap();
    let a = pool.insert(Particle { id: 10, ..Default::default() }).unwrap();
    let b = pool.insert(Particle { id: 20, ..Default::default() }).unwrap();
    let c = pool.insert(Particle { id: 30, ..Default::default() }).unwrap();
    pool.dealloc(b).unwrap();

    let ids: Vec<u32> = pool.iter().map(|(_, p)| p.id).collect();
    assert_eq!(ids, [10, 30]);
    assert_eq!(pool.handles(), [a, c]);

    for (_, particle) in pool.iter_mut() {
        particle.mass = 2.0;
    }
    assert_eq!(pool.get(c).unwrap().mass, 2.0);
}

// ============================================================================
// Arena
// ============================================================================

#[test]
#[serial]
fn test_arena_per_frame_reuse() {
    let mut arena = Arena::new(128);

    for frame in 0..3u8 {
        let block = arena.push_bytes(&[frame; 48], 1).unwrap();
        assert_eq!(arena.bytes(block).unwrap(), &[frame; 48][..]);
        assert_eq!(arena.used(), 48);
        arena.free_all();
        assert!(arena.bytes(block).is_err());
    }
}

#[test]
#[serial]
fn test_arena_exhaustion_leaves_cursor() {
    let mut arena = Arena::new(64);
    arena.alloc_align(40, 1).unwrap();

    let result = arena.alloc_align(32, 1);
    assert_eq!(result, Err(Error::ArenaExhausted { requested: 32, available: 24 }));
    assert_eq!(arena.used(), 40);
    assert!(arena.alloc_align(24, 1).is_ok());
    assert_eq!(arena.remaining(), 0);
}

#[test]
#[serial]
fn test_arena_alignment_is_real() {
    let mut arena = Arena::new(256);
    arena.alloc_align(3, 1).unwrap();
    let block = arena.alloc_align(16, 64).unwrap();
    let address = arena.bytes(block).unwrap().as_ptr() as usize;
    assert_eq!(address % 64, 0);
    assert!(arena.bytes(block).unwrap().iter().all(|&b| b == 0));
}
