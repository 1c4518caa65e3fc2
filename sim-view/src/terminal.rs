//! Terminal front-end built on crossterm.
//!
//! [`TerminalCanvas`] implements [`Canvas`] by queueing cursor moves and
//! coloured prints, flushing once per tick in [`Canvas::present`]. The
//! terminal is switched to raw mode and the alternate screen for the
//! lifetime of the canvas and restored on drop.

use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use snow_core::{
    canvas::Canvas,
    config::Config,
    error::SimError,
    random::SimRng,
    scene::{Scene, Step},
    types::{Rgb, Viewport},
};

type SizeQuery = fn() -> io::Result<(u16, u16)>;

/// [`Canvas`] that draws into a terminal through crossterm commands.
pub struct TerminalCanvas<W: Write> {
    out: W,
    size: SizeQuery,
    viewport: Viewport,
    color: Option<Rgb>,
    owns_terminal: bool,
}

impl TerminalCanvas<Stdout> {
    /// Takes over stdout: raw mode, alternate screen, hidden cursor, no
    /// line wrapping.
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            terminal::DisableLineWrap,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        let mut canvas = Self::with_writer(out, terminal::size);
        canvas.owns_terminal = true;
        Ok(canvas)
    }
}

impl<W: Write> TerminalCanvas<W> {
    /// Builds a canvas over any writer, asking `size` for the grid size.
    ///
    /// The terminal modes are left alone; only [`TerminalCanvas::open`]
    /// changes them.
    pub fn with_writer(out: W, size: SizeQuery) -> Self {
        Self {
            out,
            size,
            viewport: Viewport::new(0, 0),
            color: None,
            owns_terminal: false,
        }
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn viewport(&mut self) -> Result<Viewport, SimError> {
        let (width, height) = (self.size)()?;
        self.viewport = Viewport::new(usize::from(width), usize::from(height));
        Ok(self.viewport)
    }

    fn put(
        &mut self,
        column: usize,
        row: usize,
        glyph: char,
        color: Option<Rgb>,
    ) -> Result<(), SimError> {
        if !self.viewport.contains(column, row) {
            return Err(SimError::OutOfBounds {
                column,
                row,
                viewport: self.viewport,
            });
        }
        // `contains` bounds both by the u16 terminal size.
        queue!(self.out, cursor::MoveTo(column as u16, row as u16))?;
        if glyph != ' ' && color != self.color {
            match color {
                Some(Rgb { r, g, b }) => {
                    queue!(self.out, SetForegroundColor(Color::Rgb { r, g, b }))?
                }
                None => queue!(self.out, ResetColor)?,
            }
            self.color = color;
        }
        queue!(self.out, Print(glyph))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SimError> {
        queue!(self.out, ResetColor, terminal::Clear(ClearType::All))?;
        self.color = None;
        self.out.flush()?;
        Ok(())
    }

    fn present(&mut self) -> Result<(), SimError> {
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalCanvas<W> {
    fn drop(&mut self) {
        if !self.owns_terminal {
            return;
        }
        if let Err(err) = execute!(
            self.out,
            ResetColor,
            cursor::Show,
            terminal::EnableLineWrap,
            terminal::LeaveAlternateScreen
        ) {
            log::warn!("failed to leave the alternate screen: {err}");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            log::warn!("failed to disable raw mode: {err}");
        }
    }
}

/// Returns `true` for the keys that end the animation: `q`, `Esc` and
/// `Ctrl-C` (raw mode swallows the signal).
fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Waits up to `timeout` for input and reports whether the user asked to
/// quit. Returns early on any event, so callers keep their own clock.
fn quit_requested(timeout: Duration) -> io::Result<bool> {
    if !event::poll(timeout)? {
        return Ok(false);
    }
    Ok(matches!(event::read()?, Event::Key(key) if is_quit_key(&key)))
}

/// Runs the animation in the current terminal until a quit key is pressed.
pub fn run(cfg: Config, mut rng: SimRng, frame: Duration) -> anyhow::Result<()> {
    let mut canvas = TerminalCanvas::open().context("setting up the terminal")?;
    let viewport = canvas.viewport()?;
    let mut scene = Scene::new(cfg, viewport, &mut rng)?;

    let mut next_tick = Instant::now();
    loop {
        let now = Instant::now();
        if now >= next_tick {
            if let Step::Recovered(v) = scene.step(&mut canvas, &mut rng)? {
                log::debug!("terminal resized to {}x{}", v.width, v.height);
            }
            next_tick = now + frame;
        }
        if quit_requested(next_tick.saturating_duration_since(Instant::now()))? {
            break;
        }
    }

    log::info!(
        "stopped after {} ticks with {:.2} units of snow",
        scene.ticks(),
        scene.pile().total_mass()
    );
    Ok(())
}
