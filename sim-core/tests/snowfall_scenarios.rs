//! End-to-end scenarios driven through the public API.

use snow_core::{
    canvas::{Canvas, GridCanvas},
    config::{Config, PileConfig},
    pile::SnowPile,
    random::SimRng,
    scene::{Scene, Step},
    snowflake::{Snowflake, Spawn},
    types::{MAX_WEIGHT, Viewport},
};

#[test]
fn quarter_units_stack_into_one_without_spilling() {
    let mut pile = SnowPile::new(10, PileConfig::default());
    for _ in 0..4 {
        pile.deposit(3, MAX_WEIGHT).unwrap();
    }
    assert_eq!(pile.heights()[3], 1.0);
    for (i, &h) in pile.heights().iter().enumerate() {
        if i != 3 {
            assert_eq!(h, 0.0, "column {i} should be untouched");
        }
    }
}

#[test]
fn a_spike_rolls_off_and_keeps_its_mass() {
    let mut heights = vec![0.0; 10];
    heights[2] = 5.0;
    let mut pile = SnowPile::from_heights(heights, PileConfig::default());
    let before = pile.total_mass();

    pile.deposit(2, 1).unwrap();

    let h = pile.heights();
    assert_eq!(h[1], 2.0);
    assert_eq!(h[3], 1.0);
    assert!((h[2] - 2.05).abs() < 1e-9);
    assert!((pile.total_mass() - (before + 0.05)).abs() < 1e-9);
}

#[test]
fn nearest_layer_outpaces_farthest_layer() {
    let cfg = Config::default();
    let view = Viewport::new(30, 20);
    let mut rng = SimRng::seeded(0);
    let spawn = Spawn::at(10.0, 0.0).weight(2);

    let mut near = Snowflake::spawn(spawn.layer(1), view, &cfg.flake, &mut rng);
    let far_layer = spawn.layer(cfg.flake.max_layers);
    let mut far = Snowflake::spawn(far_layer, view, &cfg.flake, &mut rng);
    near.tick(0.0, 1.0, view, &cfg.flake, &mut rng);
    far.tick(0.0, 1.0, view, &cfg.flake, &mut rng);

    assert!(near.pos().y > far.pos().y);
}

#[test]
fn each_floor_crossing_reports_one_landing() {
    let cfg = Config::default();
    let view = Viewport::new(30, 20);
    let mut rng = SimRng::seeded(17);
    let spawn = Spawn::at(5.0, 0.0).layer(4).weight(3);
    let mut flake = Snowflake::spawn(spawn, view, &cfg.flake, &mut rng);

    let depth = 4.0;
    let mut crossings = 0;
    let mut landings = 0;
    for _ in 0..500 {
        let next_y = flake.pos().y + flake.fall_step(&cfg.flake);
        let would_cross = next_y >= view.height as f64 - depth;
        if would_cross {
            crossings += 1;
        }
        let landed = flake.tick(0.0, depth, view, &cfg.flake, &mut rng);
        assert_eq!(landed.is_some(), would_cross);
        if landed.is_some() {
            landings += 1;
            assert_eq!(flake.pos().y, 0.0);
        }
    }
    assert!(crossings > 0);
    assert_eq!(crossings, landings);
}

#[test]
fn scene_survives_a_series_of_resizes() {
    let mut rng = SimRng::seeded(2024);
    let mut canvas = GridCanvas::new(50, 16);
    let view = canvas.viewport().unwrap();
    let mut scene = Scene::new(Config::default(), view, &mut rng).unwrap();

    let sizes = [(50, 16), (20, 8), (80, 24), (1, 1), (33, 12)];
    for &(w, h) in &sizes {
        canvas.resize(w, h);
        let mut recovered = false;
        for _ in 0..40 {
            match scene.step(&mut canvas, &mut rng).unwrap() {
                Step::Recovered(v) => {
                    assert_eq!(v, Viewport::new(w, h));
                    recovered = true;
                }
                Step::Advanced { .. } => {}
                Step::Idle => panic!("non-empty viewport must not idle"),
            }
        }
        assert_eq!(scene.viewport(), Viewport::new(w, h));
        assert_eq!(scene.pile().width(), w);
        assert!(recovered || view == Viewport::new(w, h));
    }
}
