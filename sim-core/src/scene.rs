use std::cmp::Reverse;

use crate::{
    canvas::Canvas,
    config::Config,
    error::{ConfigError, SimError},
    phases,
    pile::SnowPile,
    random::RandomSource,
    snowflake::{Snowflake, Spawn},
    types::Viewport,
    wind::Wind,
};

/// Outcome of a single [`Scene::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A full tick ran; `landed` flakes settled into the pile.
    Advanced { landed: usize },
    /// The viewport had changed size; the scene was refitted to it and the
    /// display cleared. The next step resumes normally.
    Recovered(Viewport),
    /// The viewport has no cells; nothing was simulated.
    Idle,
}

/// Owns the whole simulation: wind, flakes and the pile.
///
/// All state is mutated synchronously inside [`Scene::step`]. The only
/// outside influence is the canvas changing size between steps, which is
/// detected and recovered from rather than prevented.
#[derive(Debug)]
pub struct Scene {
    cfg: Config,
    viewport: Viewport,
    wind: Wind,
    pile: SnowPile,
    flakes: Vec<Snowflake>,
    ticks: u64,
}

impl Scene {
    /// Creates a scene laid out for `viewport`.
    ///
    /// Flakes are spread evenly over the layers and stored farthest layer
    /// first, so nearer flakes are drawn over farther ones. Positions and
    /// weights are random.
    ///
    /// ### Parameters
    /// - `cfg` - Simulation configuration; `cfg.flake_count` defaults to one
    ///   flake per column.
    /// - `viewport` - Initial grid size.
    /// - `rng` - Source for the flakes' random placement.
    ///
    /// ### Returns
    /// - `Err(ConfigError)` if `cfg` fails [`Config::validate`].
    pub fn new(
        cfg: Config,
        viewport: Viewport,
        rng: &mut impl RandomSource,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let count = cfg.flake_count.unwrap_or(viewport.width);
        let layers = cfg.flake.max_layers;

        let mut flakes: Vec<Snowflake> = (0..count)
            .map(|i| {
                let spawn = Spawn {
                    layer: Some(layers - i % layers),
                    ..Spawn::default()
                };
                Snowflake::spawn(spawn, viewport, &cfg.flake, rng)
            })
            .collect();
        flakes.sort_by_key(|f| Reverse(f.layer()));

        log::info!(
            "scene: {} flakes over {} layers in a {}x{} viewport",
            flakes.len(),
            layers,
            viewport.width,
            viewport.height
        );

        Ok(Self {
            cfg,
            viewport,
            wind: Wind::new(cfg.wind),
            pile: SnowPile::new(viewport.width, cfg.pile),
            flakes,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Viewport the scene is currently laid out for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn wind(&self) -> &Wind {
        &self.wind
    }

    pub fn pile(&self) -> &SnowPile {
        &self.pile
    }

    pub fn pile_mut(&mut self) -> &mut SnowPile {
        &mut self.pile
    }

    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one tick, recovering from a viewport fault if one occurs.
    ///
    /// ### Returns
    /// - `Ok(Step)` describing what happened.
    /// - `Err(SimError::Io)` if the canvas itself failed. Viewport faults
    ///   never escape this function.
    pub fn step(
        &mut self,
        canvas: &mut impl Canvas,
        rng: &mut impl RandomSource,
    ) -> Result<Step, SimError> {
        match self.advance(canvas, rng) {
            Ok(Some(landed)) => Ok(Step::Advanced { landed }),
            Ok(None) => Ok(Step::Idle),
            Err(err) if err.is_viewport_fault() => {
                log::info!("recovering from viewport fault: {err}");
                let viewport = self.recover(canvas)?;
                Ok(Step::Recovered(viewport))
            }
            Err(err) => Err(err),
        }
    }

    fn advance(
        &mut self,
        canvas: &mut impl Canvas,
        rng: &mut impl RandomSource,
    ) -> Result<Option<usize>, SimError> {
        let viewport = canvas.viewport()?;
        if viewport != self.viewport {
            return Err(SimError::ViewportChanged {
                from: self.viewport,
                to: viewport,
            });
        }
        if viewport.is_empty() {
            return Ok(None);
        }

        let wind = phases::weather_phase(&mut self.wind, rng);
        phases::melt_phase(&mut self.pile, self.ticks, self.cfg.melt_period, rng);
        phases::pile_phase(&mut self.pile, canvas, viewport)?;
        let landed = phases::flake_phase(
            &mut self.flakes,
            &mut self.pile,
            wind,
            viewport,
            &self.cfg.flake,
            canvas,
            rng,
        )?;
        canvas.present()?;

        if landed > 0 {
            log::trace!("tick {}: {landed} flakes landed", self.ticks);
        }
        self.ticks += 1;
        Ok(Some(landed))
    }

    /// Refits the scene to the canvas's current size.
    ///
    /// Clears the display, resizes the pile to the new width and moves
    /// every flake back inside the new bounds.
    pub fn recover(&mut self, canvas: &mut impl Canvas) -> Result<Viewport, SimError> {
        canvas.clear()?;
        let viewport = canvas.viewport()?;
        self.pile.resize(viewport.width);
        for flake in &mut self.flakes {
            flake.reseat(viewport);
        }
        self.viewport = viewport;
        log::info!("viewport is now {}x{}", viewport.width, viewport.height);
        Ok(viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{canvas::GridCanvas, random::SimRng};

    fn scene(width: usize, height: usize, rng: &mut SimRng) -> (Scene, GridCanvas) {
        let scene = Scene::new(Config::default(), Viewport::new(width, height), rng).unwrap();
        (scene, GridCanvas::new(width, height))
    }

    #[test]
    fn new_scene_spawns_one_flake_per_column_farthest_first() {
        let mut rng = SimRng::seeded(3);
        let (scene, _) = scene(40, 12, &mut rng);

        assert_eq!(scene.flakes().len(), 40);
        assert_eq!(scene.pile().width(), 40);
        let layers: Vec<usize> = scene.flakes().iter().map(|f| f.layer()).collect();
        assert!(layers.windows(2).all(|w| w[0] >= w[1]), "{layers:?}");
        assert_eq!(layers[0], 20);
        assert_eq!(*layers.last().unwrap(), 1);
    }

    #[test]
    fn flake_count_override_is_respected() {
        let mut rng = SimRng::seeded(3);
        let cfg = Config {
            flake_count: Some(7),
            ..Config::default()
        };
        let scene = Scene::new(cfg, Viewport::new(40, 12), &mut rng).unwrap();
        assert_eq!(scene.flakes().len(), 7);
    }

    #[test]
    fn invalid_config_is_rejected_before_spawning() {
        let mut rng = SimRng::seeded(3);
        let mut cfg = Config::default();
        cfg.flake.max_layers = 0;
        let err = Scene::new(cfg, Viewport::new(10, 8), &mut rng).unwrap_err();
        assert_eq!(err.field, "flake.max_layers");

        let mut cfg = Config::default();
        cfg.pile.melt_floor = 0.0;
        let err = Scene::new(cfg, Viewport::new(10, 8), &mut rng).unwrap_err();
        assert_eq!(err.field, "pile.melt_floor");
    }

    #[test]
    fn steady_canvas_never_triggers_recovery() {
        // Melting on every tick with a one-unit floor keeps every column at
        // or above the ground, so nothing is drawn below the bottom row.
        let mut rng = SimRng::seeded(21);
        let mut cfg = Config::default();
        cfg.melt_period = 1;
        let mut scene = Scene::new(cfg, Viewport::new(6, 8), &mut rng).unwrap();
        let mut canvas = GridCanvas::new(6, 8);

        for _ in 0..3000 {
            let step = scene.step(&mut canvas, &mut rng).unwrap();
            assert!(matches!(step, Step::Advanced { .. }), "{step:?}");
            assert!(scene.pile().heights().iter().all(|&h| h >= 0.0));
        }
    }

    #[test]
    fn steps_advance_and_snow_accumulates() {
        let mut rng = SimRng::seeded(5);
        let (mut scene, mut canvas) = scene(30, 10, &mut rng);

        let mut landed = 0;
        for _ in 0..200 {
            match scene.step(&mut canvas, &mut rng).unwrap() {
                Step::Advanced { landed: n } => landed += n,
                other => panic!("unexpected step {other:?}"),
            }
        }

        assert_eq!(scene.ticks(), 200);
        assert!(landed > 0);
        assert!(scene.pile().total_mass() > 0.0);
        // The bottom row always carries pile glyphs.
        assert!(canvas.row_text(9).chars().all(|c| c != ' '));
    }

    #[test]
    fn shrinking_the_canvas_is_recovered_from() {
        let mut rng = SimRng::seeded(9);
        let (mut scene, mut canvas) = scene(30, 10, &mut rng);
        for _ in 0..20 {
            scene.step(&mut canvas, &mut rng).unwrap();
        }
        let before: Vec<f64> = scene.pile().heights()[..12].to_vec();

        canvas.resize(12, 6);
        let step = scene.step(&mut canvas, &mut rng).unwrap();
        assert_eq!(step, Step::Recovered(Viewport::new(12, 6)));
        assert_eq!(scene.viewport(), Viewport::new(12, 6));
        assert_eq!(scene.pile().heights(), &before[..]);
        for flake in scene.flakes() {
            assert!(flake.pos().x < 12.0);
            assert!(flake.row() < 6);
        }

        for _ in 0..50 {
            let step = scene.step(&mut canvas, &mut rng).unwrap();
            assert!(matches!(step, Step::Advanced { .. }), "{step:?}");
        }
    }

    #[test]
    fn growing_the_canvas_widens_the_pile() {
        let mut rng = SimRng::seeded(9);
        let (mut scene, mut canvas) = scene(10, 8, &mut rng);
        scene.step(&mut canvas, &mut rng).unwrap();

        canvas.resize(25, 8);
        assert_eq!(
            scene.step(&mut canvas, &mut rng).unwrap(),
            Step::Recovered(Viewport::new(25, 8))
        );
        assert_eq!(scene.pile().width(), 25);
        assert!(matches!(
            scene.step(&mut canvas, &mut rng).unwrap(),
            Step::Advanced { .. }
        ));
    }

    #[test]
    fn empty_canvas_idles_until_it_has_cells_again() {
        let mut rng = SimRng::seeded(1);
        let (mut scene, mut canvas) = scene(10, 8, &mut rng);

        canvas.resize(0, 0);
        assert_eq!(
            scene.step(&mut canvas, &mut rng).unwrap(),
            Step::Recovered(Viewport::new(0, 0))
        );
        assert_eq!(scene.step(&mut canvas, &mut rng).unwrap(), Step::Idle);

        canvas.resize(10, 8);
        assert!(matches!(
            scene.step(&mut canvas, &mut rng).unwrap(),
            Step::Recovered(_)
        ));
        assert!(matches!(
            scene.step(&mut canvas, &mut rng).unwrap(),
            Step::Advanced { .. }
        ));
    }

    #[test]
    fn seeded_scenes_are_reproducible() {
        let run = || {
            let mut rng = SimRng::seeded(42);
            let (mut scene, mut canvas) = scene(24, 10, &mut rng);
            for _ in 0..150 {
                scene.step(&mut canvas, &mut rng).unwrap();
            }
            scene.pile().heights().to_vec()
        };
        assert_eq!(run(), run());
    }
}
