//! End-to-end properties of the streaming pass, driven through the public API.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wanderfield_stream::{
    CellCoord, CountingFactory, EvictionSweeper, GridKeyCodec, StreamConfig, StreamingManager,
};

fn manager() -> StreamingManager<CountingFactory> {
    StreamingManager::new(StreamConfig::default(), CountingFactory::new()).unwrap()
}

fn sweeper(config: &StreamConfig) -> EvictionSweeper {
    EvictionSweeper::new(
        GridKeyCodec::new(config.cell_size).unwrap(),
        config.eviction_radius,
    )
}

/// S=20, edge threshold 2, eviction radius 60.
#[test]
fn scripted_walk_and_jump() {
    let mut m = manager();

    m.tick(&[Vec3::new(0.0, 0.0, 0.0)]).unwrap();
    assert!(m.is_live(CellCoord::new(0, 0)));

    // local_x = 9.1 > 10 - 2
    let report = m.tick(&[Vec3::new(9.1, 0.0, 0.0)]).unwrap();
    assert!(report.created.contains(&CellCoord::new(1, 0)));
    assert!(m.is_live(CellCoord::new(1, 0)));

    let report = m.tick(&[Vec3::new(200.0, 0.0, 0.0)]).unwrap();
    assert!(report.evicted.contains(&CellCoord::new(0, 0)));
    assert!(!m.is_live(CellCoord::new(0, 0)));
    assert!(m.is_live(CellCoord::new(10, 0)));
    assert!(m.is_live(CellCoord::new(9, 0)));
    assert!(m.is_live(CellCoord::new(10, -1)));
}

#[test]
fn repeated_tick_at_same_position_creates_nothing() {
    let mut m = manager();
    let pos = Vec3::new(33.0, 0.0, -7.0);
    let first = m.tick(&[pos]).unwrap();
    assert!(!first.created.is_empty());
    let second = m.tick(&[pos]).unwrap();
    assert!(second.created.is_empty());
    assert!(second.evicted.is_empty());
}

#[test]
fn straight_walk_always_stands_on_a_tile() {
    let mut m = manager();
    let codec = GridKeyCodec::new(20.0).unwrap();
    let mut pos = Vec3::new(5.0, 0.0, 5.0);
    let step = Vec3::new(0.7, 0.0, 0.25);
    let mut visited = Vec::new();

    for _ in 0..3000 {
        pos += step;
        m.tick(&[pos]).unwrap();
        let cell = codec.to_cell(pos).unwrap();
        assert!(m.is_live(cell), "standing on missing tile {cell}");
        if visited.last() != Some(&cell) {
            visited.push(cell);
        }
    }
    assert!(visited.len() > 100);
    // The world stays bounded no matter how far the observer walks.
    assert!(m.live_tiles() < 40, "live tiles grew to {}", m.live_tiles());
}

#[test]
fn far_move_evicts_within_one_frame() {
    let config = StreamConfig::default();
    let mut m = manager();
    for i in 0..50 {
        m.tick(&[Vec3::new(i as f32 * 2.0, 0.0, 0.0)]).unwrap();
    }
    let target = Vec3::new(-5000.0, 0.0, 4000.0);
    m.tick(&[target]).unwrap();

    let sweep = sweeper(&config);
    for (cell, tile) in m.store().iter() {
        assert!(
            sweep.in_range(cell, &[target]) || tile.created_frame == m.frame(),
            "{cell} survived outside the eviction radius"
        );
    }
    assert!(!m.is_live(CellCoord::new(0, 0)));
}

#[test]
fn random_frames_never_thrash_or_duplicate() {
    let config = StreamConfig::default();
    let sweep = sweeper(&config);
    let mut m = manager();
    let mut rng = StdRng::seed_from_u64(7);
    let mut observers: Vec<Vec3> = Vec::new();

    for _ in 0..500 {
        // Observers join, leave and occasionally teleport between frames.
        if rng.gen_bool(0.1) || observers.is_empty() {
            observers.push(Vec3::new(
                rng.gen_range(-500.0..500.0),
                0.0,
                rng.gen_range(-500.0..500.0),
            ));
        }
        if rng.gen_bool(0.05) && observers.len() > 1 {
            let i = rng.gen_range(0..observers.len());
            observers.swap_remove(i);
        }
        for pos in &mut observers {
            if rng.gen_bool(0.02) {
                *pos += Vec3::new(rng.gen_range(-300.0..300.0), 0.0, rng.gen_range(-300.0..300.0));
            } else {
                *pos += Vec3::new(rng.gen_range(-1.5..1.5), 0.0, rng.gen_range(-1.5..1.5));
            }
        }

        let report = m.tick(&observers).unwrap();

        for cell in &report.created {
            assert!(m.is_live(*cell), "{cell} created and evicted in one frame");
            assert!(!report.evicted.contains(cell));
        }
        // A tile survives iff some observer is within range (or it is brand new,
        // in which case its requester is within range by construction).
        for (cell, _) in m.store().iter() {
            assert!(sweep.in_range(cell, &observers));
        }
        for cell in &report.evicted {
            assert!(!sweep.in_range(*cell, &observers));
        }
        assert_eq!(m.live_tiles(), m.factory().live());
    }
}

#[test]
fn dropping_observers_keeps_tiles_near_the_rest() {
    let config = StreamConfig::default();
    let sweep = sweeper(&config);
    let mut m = manager();
    let stay = Vec3::new(10.0, 0.0, 10.0);
    let others = [
        Vec3::new(400.0, 0.0, 0.0),
        Vec3::new(-400.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 400.0),
    ];
    let mut all = vec![stay];
    all.extend(others);
    m.tick(&all).unwrap();

    let near_stay: Vec<CellCoord> = m
        .store()
        .cells()
        .into_iter()
        .filter(|c| sweep.in_range(*c, &[stay]))
        .collect();
    assert!(!near_stay.is_empty());

    m.tick(&[stay]).unwrap();
    for cell in &near_stay {
        assert!(m.is_live(*cell), "{cell} lost although still in range");
    }
    for cell in m.store().cells() {
        assert!(sweep.in_range(cell, &[stay]));
    }
}

#[test]
fn observers_in_negative_quadrants() {
    let mut m = manager();
    let codec = GridKeyCodec::new(20.0).unwrap();
    let pos = Vec3::new(-0.5, 0.0, -19.5);
    m.tick(&[pos]).unwrap();
    assert_eq!(codec.to_cell(pos).unwrap(), CellCoord::new(-1, -1));
    assert!(m.is_live(CellCoord::new(-1, -1)));
    // Near the +x edge of cell -1.
    assert!(m.is_live(CellCoord::new(0, -1)));
}
