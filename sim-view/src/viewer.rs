//! Windowed snowfall viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Scene`] together with
//! an in-memory [`GridCanvas`] and implements [`eframe::App`] to step the
//! scene and paint the grid as monospace text.

use eframe::App;
use snow_core::{
    canvas::GridCanvas,
    config::Config,
    error::{ConfigError, SimError},
    random::SimRng,
    scene::{Scene, Step},
    types::Viewport,
};

/// Grid size used until the first frame reports the real panel size.
const INITIAL_GRID: Viewport = Viewport::new(80, 24);

/// Main application state for the window viewer.
///
/// The typical per-frame update is:
/// 1. Handle the control panel.
/// 2. Fit the [`GridCanvas`] to the central panel. A size change is
///    picked up by the next [`Scene::step`] exactly like a terminal resize.
/// 3. If `running` and `step_interval` has passed, step the scene.
/// 4. Paint every occupied cell.
///
/// ### Fields
/// - `scene` - The simulation.
/// - `canvas` - Character grid the scene renders into.
/// - `rng` - Random source shared by every step.
///
/// - `running` - Whether the simulation is auto-advancing.
/// - `font_size` - Glyph size in points; sets the cell size.
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `landed_total` - Flakes that have settled since the last reset.
pub struct Viewer {
    scene: Scene,
    canvas: GridCanvas,
    rng: SimRng,

    running: bool,
    font_size: f32,

    step_interval: f64,
    last_step_time: f64,
    landed_total: usize,
}

impl Viewer {
    /// Creates a running viewer.
    ///
    /// ### Parameters
    /// - `cfg` - Validated simulation configuration.
    /// - `rng` - Random source for the whole run.
    /// - `fps` - Automatic steps per second.
    pub fn new(cfg: Config, mut rng: SimRng, fps: u32) -> Result<Self, ConfigError> {
        let scene = Scene::new(cfg, INITIAL_GRID, &mut rng)?;
        Ok(Self {
            scene,
            canvas: GridCanvas::new(INITIAL_GRID.width, INITIAL_GRID.height),
            rng,
            running: true,
            font_size: 16.0,
            step_interval: 1.0 / f64::from(fps.max(1)),
            last_step_time: 0.0,
            landed_total: 0,
        })
    }

    /// Starts a fresh scene with the same configuration at the current
    /// grid size. The pile and flake state is discarded.
    fn reset(&mut self) {
        let cfg = *self.scene.config();
        let viewport = self.canvas.size();
        match Scene::new(cfg, viewport, &mut self.rng) {
            Ok(scene) => self.scene = scene,
            Err(err) => {
                log::error!("reset failed: {err}");
                return;
            }
        }
        self.canvas.resize(viewport.width, viewport.height);
        self.landed_total = 0;
    }

    fn step_once(&mut self) -> Result<Step, SimError> {
        let step = self.scene.step(&mut self.canvas, &mut self.rng)?;
        if let Step::Advanced { landed } = step {
            self.landed_total += landed;
        }
        Ok(step)
    }

    /// Size of one character cell in points.
    fn cell_size(&self) -> egui::Vec2 {
        egui::vec2(self.font_size * 0.6, self.font_size * 1.2)
    }

    /// Number of whole cells that fit in `rect`.
    fn grid_for(&self, rect: egui::Rect) -> Viewport {
        let cell = self.cell_size();
        let columns = (rect.width() / cell.x).floor().max(0.0) as usize;
        let rows = (rect.height() / cell.y).floor().max(0.0) as usize;
        Viewport::new(columns, rows)
    }

    /// Screen position of the top-left corner of a cell.
    fn cell_origin(&self, column: usize, row: usize, rect: egui::Rect) -> egui::Pos2 {
        let cell = self.cell_size();
        rect.min + egui::vec2(column as f32 * cell.x, row as f32 * cell.y)
    }

    fn log_step(&mut self) {
        match self.step_once() {
            Ok(Step::Recovered(v)) => log::debug!("grid resized to {}x{}", v.width, v.height),
            Ok(_) => {}
            Err(err) => {
                log::error!("simulation step failed: {err}");
                self.running = false;
            }
        }
    }

    /// Builds the top panel UI (run controls, stepping, font size).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.005..=1.0)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    self.log_step();
                    self.last_step_time = ctx.input(|i| i.time);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.font_size, 8.0..=32.0).text("Font"));
            });
        });
    }

    /// Builds the bottom status bar (wind, pile mass, tick count).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let view = self.scene.viewport();
                ui.label(format!("grid = {}x{}", view.width, view.height));
                ui.label(format!("ticks = {}", self.scene.ticks()));
                ui.separator();
                ui.label(format!("landed = {}", self.landed_total));
                ui.label(format!("snow = {:.2}", self.scene.pile().total_mass()));
                ui.label(format!("wind = {:+.2}", self.scene.wind().force()));
            });
        });
    }

    /// Builds the central panel where the character grid is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let painter = ui.painter_at(rect);

                let grid = self.grid_for(rect);
                if grid != self.canvas.size() {
                    self.canvas.resize(grid.width, grid.height);
                }

                if self.running {
                    let now = ctx.input(|i| i.time);
                    if now - self.last_step_time >= self.step_interval {
                        self.log_step();
                        self.last_step_time = now;
                    }
                    ctx.request_repaint();
                }

                let font = egui::FontId::monospace(self.font_size);
                for (column, row, cell) in self.canvas.occupied() {
                    let color = cell.color.map_or(egui::Color32::LIGHT_GRAY, |c| {
                        egui::Color32::from_rgb(c.r, c.g, c.b)
                    });
                    painter.text(
                        self.cell_origin(column, row, rect),
                        egui::Align2::LEFT_TOP,
                        cell.glyph,
                        font.clone(),
                        color,
                    );
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}

/// Opens the viewer window and blocks until it is closed.
pub fn run(cfg: Config, rng: SimRng, fps: u32) -> anyhow::Result<()> {
    let viewer = Viewer::new(cfg, rng, fps)?;
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Snowfall",
        options,
        Box::new(move |_cc| Ok(Box::new(viewer))),
    )
    .map_err(|err| anyhow::anyhow!("window viewer failed: {err}"))
}
