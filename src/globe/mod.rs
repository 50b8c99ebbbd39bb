//! Interactive globe: drag to rotate, autospin, day/night terminator.

pub mod astro;
pub mod engine;
pub mod orientation;
pub mod projection;
pub mod render;

use crate::canvas::{BrailleCanvas, DOTS_PER_CELL_X, DOTS_PER_CELL_Y};
use crate::colors::ColorState;
use crate::geolocate;
use crate::help;
use crate::terminal::Terminal;
use crate::zoneclock::{self, ZoneClock};
use chrono::{DateTime, Utc};
use crossterm::event::{Event, KeyCode, MouseButton, MouseEvent, MouseEventKind};
use crossterm::style::Color;
use self::engine::{AnimationIntent, GlobeEngine, DEFAULT_SPIN_SPEED};
use self::projection::GeoPoint;
use std::io;

/// Radians of tilt per keypress.
const TILT_STEP: f64 = 0.05;
/// Multiplier applied by the +/- speed keys.
const SPEED_FACTOR: f64 = 1.25;
/// Slowest non-zero autospin reachable from the keyboard.
const MIN_SPIN_SPEED: f64 = 0.0005;

const HELP: &str = "\
GLOBE
─────
drag    Rotate the globe
↑/k     Tilt up
↓/j     Tilt down
+/-     Spin speed
a       Toggle autospin
c       Center on marker
t       Toggle terminator
0-9     Color scheme (Shift)
?       Toggle help
q/Esc   Quit";

pub struct GlobeConfig {
    pub time_step: f32,
    pub tilt_deg: f64,
    pub spin_speed: f64,
    pub autorotate: bool,
    pub show_terminator: bool,
    pub location: Option<(f64, f64)>,
    pub geolocate: bool,
    pub color_scheme: u8,
    pub print: bool,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            time_step: 0.03,
            tilt_deg: 12.0,
            spin_speed: DEFAULT_SPIN_SPEED,
            autorotate: true,
            show_terminator: true,
            location: None,
            geolocate: true,
            color_scheme: 0,
            print: false,
        }
    }
}

pub fn run(config: GlobeConfig) -> io::Result<()> {
    if config.print {
        let (width, height) = crossterm::terminal::size().unwrap_or((100, 45));
        print_frame(&config, width, height);
        return Ok(());
    }

    let mut term = Terminal::new(true)?;
    // Keyboard-only is fine when the terminal has no mouse reporting.
    let mouse = term.enable_mouse().is_ok();

    let mut engine = GlobeEngine::new(
        config.tilt_deg.to_radians(),
        config.autorotate,
        config.spin_speed,
    );
    let clock = ZoneClock::subscribe(&mut engine);

    let mut note: Option<String> = None;
    let geo_rx = match config.location {
        Some((lat, lon)) => {
            engine.set_location(lat, lon);
            None
        }
        None if config.geolocate => Some(geolocate::spawn()),
        None => {
            engine.set_location(geolocate::FALLBACK.lat, geolocate::FALLBACK.lon);
            note = Some("geolocation off, marker at Greenwich".to_string());
            None
        }
    };

    let mut colors = ColorState::new(config.color_scheme);
    let mut show_terminator = config.show_terminator;
    let mut show_help = false;
    let mut drag_anchor: Option<(u16, u16)> = None;

    let (mut prev_width, mut prev_height) = term.size();
    let mut canvas = BrailleCanvas::new(prev_width, prev_height);

    loop {
        // Track terminal size every frame
        let (width, height) =
            crossterm::terminal::size().unwrap_or((prev_width, prev_height));
        if width != prev_width || height != prev_height {
            term.resize(width, height);
            term.clear_screen()?;
            canvas.resize(width, height);
            prev_width = width;
            prev_height = height;
        }

        // Drain all pending input before advancing the animation
        let mut quit = false;
        while let Some(event) = term.poll_event()? {
            match event {
                Event::Key(key) => {
                    if colors.handle_key(key.code) {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => quit = true,
                        KeyCode::Up | KeyCode::Char('k') => engine.nudge_pitch(TILT_STEP),
                        KeyCode::Down | KeyCode::Char('j') => engine.nudge_pitch(-TILT_STEP),
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            let bumped =
                                (engine.spin_speed() * SPEED_FACTOR).max(MIN_SPIN_SPEED);
                            engine.set_spin_speed(bumped);
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            let lowered = engine.spin_speed() / SPEED_FACTOR;
                            engine.set_spin_speed(if lowered < MIN_SPIN_SPEED {
                                0.0
                            } else {
                                lowered
                            });
                        }
                        KeyCode::Char('a') => engine.toggle_autorotate(),
                        KeyCode::Char('c') => engine.center_on_location(),
                        KeyCode::Char('t') => show_terminator = !show_terminator,
                        KeyCode::Char('?') => show_help = !show_help,
                        _ => {}
                    }
                }
                Event::Mouse(mouse_event) => {
                    handle_mouse(mouse_event, &mut engine, &mut drag_anchor)
                }
                Event::Resize(w, h) => {
                    term.resize(w, h);
                    term.clear_screen()?;
                    canvas.resize(w, h);
                    prev_width = w;
                    prev_height = h;
                }
                _ => {}
            }
        }
        if quit {
            break;
        }

        // A finished geolocation lookup lands here exactly once
        if let Some(rx) = &geo_rx {
            if let Ok(result) = rx.try_recv() {
                if let Err(e) = &result {
                    note = Some(format!("geolocation {}, marker at Greenwich", e));
                }
                engine.apply_geolocation(result);
            }
        }

        engine.tick();

        let now = Utc::now();
        canvas.clear();
        let (center, radius) = globe_metrics(canvas.width(), canvas.height());
        render::render_globe(
            &mut canvas,
            engine.orientation(),
            center,
            radius,
            &engine.location_state(),
            now,
            show_terminator,
        );

        term.clear();
        canvas.blit(&mut term, colors.scheme);
        draw_hud(&mut term, &engine, &clock, note.as_deref(), now, height, mouse);
        if show_help {
            help::render_help_overlay(&mut term, width, height, HELP);
        }
        term.present()?;
        term.sleep(config.time_step);
    }

    Ok(())
}

/// Render one frame into a detached buffer and print it; used by the
/// snapshot subcommand and `globe --print`.
pub fn print_frame(config: &GlobeConfig, width: u16, height: u16) {
    let mut term = Terminal::sized(width, height);
    let mut canvas = BrailleCanvas::new(width, height);
    let mut engine = GlobeEngine::new(config.tilt_deg.to_radians(), false, config.spin_speed);
    if let Some((lat, lon)) = config.location {
        engine.set_location(lat, lon);
        // Face the marker: run the damped centering to rest.
        engine.center_on_longitude(lon);
        for _ in 0..500 {
            if !matches!(engine.intent(), AnimationIntent::CenteringTo { .. }) {
                break;
            }
            engine.tick();
        }
    }

    let (center, radius) = globe_metrics(canvas.width(), canvas.height());
    render::render_globe(
        &mut canvas,
        engine.orientation(),
        center,
        radius,
        &engine.location_state(),
        Utc::now(),
        config.show_terminator,
    );
    canvas.blit(&mut term, config.color_scheme);
    term.print_to_stdout();
}

fn handle_mouse(event: MouseEvent, engine: &mut GlobeEngine, anchor: &mut Option<(u16, u16)>) {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            engine.pointer_down();
            *anchor = Some((event.column, event.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some((px, py)) = *anchor {
                // Cell deltas scale up to braille dot deltas.
                let dx = (event.column as f64 - px as f64) * DOTS_PER_CELL_X as f64;
                let dy = (event.row as f64 - py as f64) * DOTS_PER_CELL_Y as f64;
                engine.drag_move(dx, dy);
            }
            *anchor = Some((event.column, event.row));
        }
        MouseEventKind::Up(MouseButton::Left) => {
            engine.pointer_up();
            *anchor = None;
        }
        _ => {}
    }
}

fn draw_hud(
    term: &mut Terminal,
    engine: &GlobeEngine,
    clock: &ZoneClock,
    note: Option<&str>,
    now: DateTime<Utc>,
    height: u16,
    mouse: bool,
) {
    let grey = Some(Color::DarkGrey);

    if let Some(geo) = engine.location() {
        term.set_str(1, 0, &format_coords(geo), grey, false);
        if let Some(time) = clock.time_line(now) {
            let sun = zoneclock::sun_line(geo, engine.timezone_offset_minutes(), now);
            term.set_str(1, 1, &format!("{}  {}", time, sun), grey, false);
        }
    } else {
        term.set_str(1, 0, "locating\u{2026}", grey, false);
    }

    if let Some(note) = note {
        term.set_str(1, 2, note, grey, false);
    }

    let spin = if engine.autorotate_enabled() {
        format!("spin {:.4}", engine.spin_speed())
    } else {
        "spin off".to_string()
    };
    let controls = if mouse {
        "? help  drag rotate  q quit"
    } else {
        "? help  q quit"
    };
    let bottom = height.saturating_sub(1) as i32;
    term.set_str(1, bottom, &format!("{}  {}", spin, controls), grey, false);
}

fn format_coords(geo: GeoPoint) -> String {
    let ns = if geo.lat >= 0.0 { 'N' } else { 'S' };
    let ew = if geo.lon >= 0.0 { 'E' } else { 'W' };
    format!(
        "{:.2}\u{00b0}{} {:.2}\u{00b0}{}",
        geo.lat.abs(),
        ns,
        geo.lon.abs(),
        ew
    )
}

/// Globe placement on the dot grid: centered, radius 45% of the shorter
/// side.
fn globe_metrics(dot_width: usize, dot_height: usize) -> ((f64, f64), f64) {
    let w = dot_width as f64;
    let h = dot_height as f64;
    ((w / 2.0, h / 2.0), (w.min(h) * 0.45).max(4.0))
}
