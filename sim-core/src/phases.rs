//! Per-tick simulation phases for the wind, flake and pile system.
//!
//! A tick runs, in order:
//! 1. [`weather_phase`]: the wind advances and reports its force.
//! 2. [`melt_phase`]: every `melt_period` ticks one pile column melts.
//! 3. [`pile_phase`]: the pile draws itself.
//! 4. [`flake_phase`]: each flake reads the floor depth under it, moves,
//!    hands a landing to the pile, and draws itself.
//!
//! [`crate::scene::Scene`] owns the state and calls these in sequence.

use crate::{
    canvas::Canvas, config::FlakeConfig, error::SimError, pile::SnowPile, random::RandomSource,
    snowflake::Snowflake, types::Viewport, wind::Wind,
};

/// Advances the wind and returns the force flakes feel this tick.
pub fn weather_phase(wind: &mut Wind, rng: &mut impl RandomSource) -> f64 {
    wind.tick(rng);
    wind.force()
}

/// Melts the pile once if `tick` falls on the melt period.
///
/// ### Returns
/// The column that lost a unit, if any.
pub fn melt_phase(
    pile: &mut SnowPile,
    tick: u64,
    period: u64,
    rng: &mut impl RandomSource,
) -> Option<usize> {
    if period == 0 || tick % period != 0 {
        return None;
    }
    let melted = pile.melt(rng);
    if let Some(column) = melted {
        log::trace!("tick {tick}: column {column} melted");
    }
    melted
}

/// Draws the pile.
pub fn pile_phase(
    pile: &mut SnowPile,
    canvas: &mut impl Canvas,
    viewport: Viewport,
) -> Result<(), SimError> {
    pile.render(canvas, viewport)
}

/// Moves and draws every flake, depositing the ones that land.
///
/// Each flake queries the pile at its own column before moving, so a
/// landing always deposits into the column whose depth it was tested
/// against. The landing is consumed right after the flake's tick.
///
/// ### Parameters
/// - `flakes` - Flakes in draw order (farthest first).
/// - `pile` - Answers depth queries and receives deposits.
/// - `wind` - Force from [`weather_phase`].
///
/// ### Returns
/// The number of flakes that landed this tick.
pub fn flake_phase(
    flakes: &mut [Snowflake],
    pile: &mut SnowPile,
    wind: f64,
    viewport: Viewport,
    cfg: &FlakeConfig,
    canvas: &mut impl Canvas,
    rng: &mut impl RandomSource,
) -> Result<usize, SimError> {
    let mut landings = 0;
    for flake in flakes.iter_mut() {
        let depth = pile.depth_at(flake.column(viewport.width))?;
        if let Some(landed) = flake.tick(wind, depth, viewport, cfg, rng) {
            pile.deposit(landed.column, landed.weight)?;
            landings += 1;
        }
        flake.render(canvas, viewport, cfg)?;
    }
    Ok(landings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::GridCanvas,
        config::{Config, PileConfig},
        random::testing::Scripted,
        snowflake::Spawn,
        types::MAX_WEIGHT,
    };

    fn no_jitter() -> Scripted {
        Scripted::new(std::iter::repeat_n(1, 64))
    }

    #[test]
    fn melt_phase_only_runs_on_the_period() {
        let mut pile = SnowPile::from_heights(vec![5.0], PileConfig::default());
        let mut rng = Scripted::default();

        assert_eq!(melt_phase(&mut pile, 1, 2, &mut rng), None);
        assert_eq!(pile.heights(), &[5.0]);

        assert_eq!(melt_phase(&mut pile, 4, 2, &mut rng), Some(0));
        assert_eq!(pile.heights(), &[4.0]);
    }

    #[test]
    fn flake_phase_deposits_landing_flakes_into_their_column() {
        let cfg = Config::default();
        let view = Viewport::new(8, 6);
        let mut pile = SnowPile::new(view.width, cfg.pile);
        let mut canvas = GridCanvas::new(view.width, view.height);

        // One flake about to cross the floor at row 5, one high up.
        let mut flakes = vec![
            Snowflake::spawn(
                Spawn::at(2.0, 4.5).layer(1).weight(MAX_WEIGHT),
                view,
                &cfg.flake,
                &mut no_jitter(),
            ),
            Snowflake::spawn(
                Spawn::at(6.0, 0.0).layer(1).weight(0),
                view,
                &cfg.flake,
                &mut no_jitter(),
            ),
        ];

        let landed = flake_phase(
            &mut flakes,
            &mut pile,
            0.0,
            view,
            &cfg.flake,
            &mut canvas,
            &mut no_jitter(),
        )
        .unwrap();

        assert_eq!(landed, 1);
        assert_eq!(pile.heights()[2], 0.25);
        assert_eq!(pile.total_mass(), 0.25);
        assert_eq!(flakes[0].pos().y, 0.0);
        // Both flakes are drawn.
        assert_eq!(canvas.glyph_at(2, 0), '#');
        assert_eq!(canvas.glyph_at(6, 1), '.');
    }

    #[test]
    fn flake_phase_reports_a_pile_narrower_than_the_viewport() {
        let cfg = Config::default();
        let view = Viewport::new(8, 6);
        let mut pile = SnowPile::new(4, cfg.pile);
        let mut canvas = GridCanvas::new(8, 6);
        let mut flakes = vec![Snowflake::spawn(
            Spawn::at(6.0, 0.0),
            view,
            &cfg.flake,
            &mut no_jitter(),
        )];

        let err = flake_phase(
            &mut flakes,
            &mut pile,
            0.0,
            view,
            &cfg.flake,
            &mut canvas,
            &mut no_jitter(),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::ColumnOutOfRange { column: 6, width: 4 }));
    }
}
