//! Draws the graticule, terminator, and location marker onto a braille
//! canvas. Everything here is projection plus draw calls, no state of
//! its own.

use crate::canvas::BrailleCanvas;
use crate::colors;
use crate::globe::astro;
use crate::globe::engine::LocationState;
use crate::globe::orientation::Quat;
use crate::globe::projection::{project, GeoPoint, ScreenPoint};
use chrono::{DateTime, Utc};

const MERIDIANS: usize = 24;
const PARALLELS: usize = 13;
/// Sampling step along each arc, degrees.
const GRID_STEP_DEG: f64 = 2.0;

/// Night side, limb, and the marker's drop shadow.
const TIER_DIM: u8 = 1;
/// Regular graticule lines.
const TIER_GRID: u8 = 2;
/// Equator, prime meridian, and the terminator curve.
const TIER_STRONG: u8 = 3;

pub fn render_globe(
    canvas: &mut BrailleCanvas,
    orientation: Quat,
    center: (f64, f64),
    radius: f64,
    location: &LocationState,
    now: DateTime<Utc>,
    show_terminator: bool,
) {
    canvas.circle(center.0, center.1, radius, TIER_DIM);

    for m in 0..MERIDIANS {
        let lon = m as f64 / MERIDIANS as f64 * 360.0 - 180.0;
        let arc = project_arc(meridian_points(lon), orientation, center, radius, now, show_terminator);
        draw_arc(canvas, &arc, TIER_GRID, TIER_DIM);
    }
    for p in 0..PARALLELS {
        let lat = p as f64 / (PARALLELS - 1) as f64 * 180.0 - 90.0;
        let arc = project_arc(parallel_points(lat), orientation, center, radius, now, show_terminator);
        draw_arc(canvas, &arc, TIER_GRID, TIER_DIM);
    }

    // The equator and prime meridian read one step brighter than the grid.
    let equator = project_arc(parallel_points(0.0), orientation, center, radius, now, show_terminator);
    draw_arc(canvas, &equator, TIER_STRONG, TIER_GRID);
    let prime = project_arc(meridian_points(0.0), orientation, center, radius, now, show_terminator);
    draw_arc(canvas, &prime, TIER_STRONG, TIER_GRID);

    if show_terminator {
        let curve = astro::terminator_curve(now);
        canvas.polyline(
            curve.into_iter().map(|g| {
                let p = project(g, orientation, center, radius);
                p.visible.then_some((p.x, p.y))
            }),
            TIER_STRONG,
        );
    }

    if location.has_location {
        draw_marker(canvas, location.point, orientation, center, radius, now);
    }
}

fn meridian_points(lon: f64) -> impl Iterator<Item = GeoPoint> {
    (0..=90).map(move |i| GeoPoint::new(-90.0 + i as f64 * GRID_STEP_DEG, lon))
}

fn parallel_points(lat: f64) -> impl Iterator<Item = GeoPoint> {
    (0..=180).map(move |i| GeoPoint::new(lat, -180.0 + i as f64 * GRID_STEP_DEG))
}

/// Project every sample and tag it with daylight when shading is on.
fn project_arc(
    points: impl Iterator<Item = GeoPoint>,
    orientation: Quat,
    center: (f64, f64),
    radius: f64,
    now: DateTime<Utc>,
    shade: bool,
) -> Vec<(ScreenPoint, bool)> {
    points
        .map(|g| {
            let lit = !shade || astro::is_daylit(now, g);
            (project(g, orientation, center, radius), lit)
        })
        .collect()
}

/// Draw the lit and unlit runs of an arc at their own tiers. The pen
/// lifts wherever a sample is hidden or crosses the day/night boundary.
fn draw_arc(
    canvas: &mut BrailleCanvas,
    samples: &[(ScreenPoint, bool)],
    day_tier: u8,
    night_tier: u8,
) {
    canvas.polyline(
        samples
            .iter()
            .map(|(p, lit)| (p.visible && *lit).then_some((p.x, p.y))),
        day_tier,
    );
    if night_tier != day_tier {
        canvas.polyline(
            samples
                .iter()
                .map(|(p, lit)| (p.visible && !*lit).then_some((p.x, p.y))),
            night_tier,
        );
    }
}

/// Red crosshair through the marker's meridian and parallel, plus a
/// drop-shadowed dot when the marker itself faces the viewer.
fn draw_marker(
    canvas: &mut BrailleCanvas,
    point: GeoPoint,
    orientation: Quat,
    center: (f64, f64),
    radius: f64,
    now: DateTime<Utc>,
) {
    let meridian = project_arc(meridian_points(point.lon), orientation, center, radius, now, false);
    draw_arc(canvas, &meridian, colors::MARKER_TIER, colors::MARKER_TIER);
    let parallel = project_arc(parallel_points(point.lat), orientation, center, radius, now, false);
    draw_arc(canvas, &parallel, colors::MARKER_TIER, colors::MARKER_TIER);

    let p = project(point, orientation, center, radius);
    if p.visible {
        let r = (radius * 0.05).clamp(1.5, 4.0);
        canvas.disc(p.x + 1.0, p.y + 2.0, r + 0.5, TIER_DIM);
        canvas.disc(p.x, p.y, r, colors::MARKER_TIER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CENTER: (f64, f64) = (40.0, 40.0);
    const RADIUS: f64 = 36.0;

    fn solstice_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap()
    }

    fn no_location() -> LocationState {
        LocationState {
            point: GeoPoint::new(0.0, 0.0),
            has_location: false,
            timezone_offset_minutes: 0,
        }
    }

    fn marker_at(lat: f64, lon: f64) -> LocationState {
        LocationState {
            point: GeoPoint::new(lat, lon),
            has_location: true,
            timezone_offset_minutes: 0,
        }
    }

    fn render(location: LocationState, show_terminator: bool) -> BrailleCanvas {
        let mut canvas = BrailleCanvas::new(40, 20);
        render_globe(
            &mut canvas,
            Quat::IDENTITY,
            CENTER,
            RADIUS,
            &location,
            solstice_noon(),
            show_terminator,
        );
        canvas
    }

    fn count_tier(canvas: &BrailleCanvas, tier: u8) -> usize {
        let mut n = 0;
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.tier_at(x, y) == tier {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn graticule_covers_the_front_disc() {
        let canvas = render(no_location(), false);
        assert!(count_tier(&canvas, TIER_GRID) > 50);
        // The equator runs brighter through the screen center row.
        let strong_on_equator = (0..canvas.width())
            .filter(|&x| canvas.tier_at(x, CENTER.1 as usize) == TIER_STRONG)
            .count();
        assert!(strong_on_equator > 10);
    }

    #[test]
    fn every_dot_stays_inside_the_limb() {
        let canvas = render(no_location(), false);
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.tier_at(x, y) > 0 {
                    let dx = x as f64 - CENTER.0;
                    let dy = y as f64 - CENTER.1;
                    assert!(
                        (dx * dx + dy * dy).sqrt() <= RADIUS + 2.0,
                        "stray dot at ({}, {})",
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn renders_are_deterministic() {
        let a = render(marker_at(45.0, -90.0), true);
        let b = render(marker_at(45.0, -90.0), true);
        for y in 0..a.height() {
            for x in 0..a.width() {
                assert_eq!(a.tier_at(x, y), b.tier_at(x, y));
            }
        }
    }

    #[test]
    fn marker_disc_appears_only_on_the_near_side() {
        let front = render(marker_at(45.0, -90.0), false);
        let back = render(marker_at(45.0, 90.0), false);
        let front_dots = count_tier(&front, colors::MARKER_TIER);
        let back_dots = count_tier(&back, colors::MARKER_TIER);
        assert!(
            front_dots > back_dots + 5,
            "front {} vs back {}",
            front_dots,
            back_dots
        );
    }

    #[test]
    fn terminator_draws_a_curve_and_dims_the_night_side() {
        let plain = render(no_location(), false);
        let shaded = render(no_location(), true);

        let mut new_strong = 0;
        let mut dimmed = 0;
        for y in 0..plain.height() {
            for x in 0..plain.width() {
                if shaded.tier_at(x, y) == TIER_STRONG && plain.tier_at(x, y) == 0 {
                    new_strong += 1;
                }
                if shaded.tier_at(x, y) == TIER_DIM && plain.tier_at(x, y) == TIER_GRID {
                    dimmed += 1;
                }
            }
        }
        assert!(new_strong > 0, "terminator curve missing");
        assert!(dimmed > 0, "night side not dimmed");
    }
}
