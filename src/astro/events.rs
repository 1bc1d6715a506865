//! Event searches: lunar phase changes and horizon events.
//!
//! Phase events are zero/π crossings of the Moon−Sun elongation, bracketed
//! by a coarse scan and refined by bisection. Rise/set/transit use the
//! hour-angle method with iterative refinement: solve for the hour angle at
//! the target altitude, step the clock by the hour-angle deficit, and
//! repeat until converged.

use super::ephemeris::Ephemeris;
use super::frames::{
    apply_parallax, equatorial_to_horizontal, local_sidereal_deg, normalize_degrees, wrap_pm180,
    EARTH_RADIUS_KM,
};
use super::{AstroError, Body};
use super::timescales::TimeContext;

/// Phase event kinds reported by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    NewMoon,
    FullMoon,
}

impl PhaseKind {
    pub fn label(&self) -> &'static str {
        match self {
            PhaseKind::NewMoon => "New Moon",
            PhaseKind::FullMoon => "Full Moon",
        }
    }

    /// Elongation angle at which the event occurs.
    fn target_deg(&self) -> f64 {
        match self {
            PhaseKind::NewMoon => 0.0,
            PhaseKind::FullMoon => 180.0,
        }
    }
}

/// A phase event on the ephemeris timeline.
#[derive(Debug, Clone, Copy)]
pub struct PhaseEvent {
    pub kind: PhaseKind,
    pub jd_tdb: f64,
}

/// The four events bracketing a request instant.
///
/// An event exactly at the request instant counts as *next*, never
/// *previous*.
#[derive(Debug, Clone, Copy)]
pub struct PhaseWindow {
    pub previous_new: PhaseEvent,
    pub previous_full: PhaseEvent,
    pub next_new: PhaseEvent,
    pub next_full: PhaseEvent,
}

/// Half-width of the scan window in days; covers more than one synodic
/// month on each side so every kind occurs at least once before and after.
const SCAN_HALF_DAYS: f64 = 45.0;

/// Find the previous and next new/full moon around `jd_tdb_now`.
pub fn phase_window(eph: &Ephemeris, jd_tdb_now: f64) -> PhaseWindow {
    let new_crossings = elongation_crossings(eph, jd_tdb_now, PhaseKind::NewMoon);
    let full_crossings = elongation_crossings(eph, jd_tdb_now, PhaseKind::FullMoon);

    let pick = |crossings: &[f64], kind: PhaseKind| {
        let previous = crossings
            .iter()
            .copied()
            .filter(|&jd| jd < jd_tdb_now)
            .fold(f64::NEG_INFINITY, f64::max);
        let next = crossings
            .iter()
            .copied()
            .filter(|&jd| jd >= jd_tdb_now)
            .fold(f64::INFINITY, f64::min);
        (
            PhaseEvent { kind, jd_tdb: previous },
            PhaseEvent { kind, jd_tdb: next },
        )
    };

    let (previous_new, next_new) = pick(&new_crossings, PhaseKind::NewMoon);
    let (previous_full, next_full) = pick(&full_crossings, PhaseKind::FullMoon);

    PhaseWindow {
        previous_new,
        previous_full,
        next_new,
        next_full,
    }
}

/// All crossings of the target elongation inside the scan window, ascending.
fn elongation_crossings(eph: &Ephemeris, jd_center: f64, kind: PhaseKind) -> Vec<f64> {
    let target = kind.target_deg();
    let offset = |jd: f64| wrap_pm180(eph.ecliptic_elongation_deg(jd) - target);

    let start = jd_center - SCAN_HALF_DAYS;
    let steps = (2.0 * SCAN_HALF_DAYS) as usize;

    let mut crossings = Vec::new();
    let mut prev_jd = start;
    let mut prev_g = offset(prev_jd);
    for i in 1..=steps {
        let jd = start + i as f64;
        let g = offset(jd);
        // The elongation advances ~12°/day, so a true crossing moves the
        // offset from negative to positive by a small step; the wrap from
        // +180 to -180 moves the other way and is skipped.
        if prev_g <= 0.0 && g > 0.0 && (g - prev_g) < 90.0 {
            crossings.push(bisect(&offset, prev_jd, jd));
        }
        prev_jd = jd;
        prev_g = g;
    }
    crossings
}

/// Bisection on a bracketed sign change; resolves to well under a second.
fn bisect(f: &dyn Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..60 {
        let mid = 0.5 * (lo + hi);
        if f(mid) <= 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-8 {
            break;
        }
    }
    0.5 * (lo + hi)
}

/// A horizon crossing with the body's azimuth at that instant.
#[derive(Debug, Clone, Copy)]
pub struct HorizonEvent {
    pub jd_tdb: f64,
    pub azimuth_deg: f64,
}

/// A meridian transit with the peak altitude and azimuth.
#[derive(Debug, Clone, Copy)]
pub struct TransitEvent {
    pub jd_tdb: f64,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

/// The next rise, set and transit strictly after the request instant.
///
/// `None` entries mean the event does not occur (circumpolar geometry).
#[derive(Debug, Clone, Copy)]
pub struct RiseSetTimes {
    pub rise: Option<HorizonEvent>,
    pub set: Option<HorizonEvent>,
    pub transit: Option<TransitEvent>,
}

/// Convergence threshold in days (~0.09 s).
const CONVERGENCE_DAYS: f64 = 1e-6;

/// Maximum refinement iterations per event.
const MAX_ITERATIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
enum HorizonKind {
    Rise,
    Set,
    Transit,
}

/// Search the next rise/set/transit of `body` for a topocentric observer.
pub fn next_rise_set(
    eph: &Ephemeris,
    body: Body,
    tc: &TimeContext,
    latitude: f64,
    longitude: f64,
    height_m: f64,
) -> Result<RiseSetTimes, AstroError> {
    let jd_now = tc.jd_tdb().value();
    // UT offset for sidereal time at trial instants
    let ut_offset = jd_now - tc.jd_utc().value();

    let rise = solve_horizon(eph, body, jd_now, ut_offset, latitude, longitude, height_m, HorizonKind::Rise)?;
    let set = solve_horizon(eph, body, jd_now, ut_offset, latitude, longitude, height_m, HorizonKind::Set)?;
    let transit = solve_horizon(eph, body, jd_now, ut_offset, latitude, longitude, height_m, HorizonKind::Transit)?;

    Ok(RiseSetTimes {
        rise: rise.map(|(jd, _alt, az)| HorizonEvent { jd_tdb: jd, azimuth_deg: az }),
        set: set.map(|(jd, _alt, az)| HorizonEvent { jd_tdb: jd, azimuth_deg: az }),
        transit: transit.map(|(jd, alt, az)| TransitEvent {
            jd_tdb: jd,
            altitude_deg: alt,
            azimuth_deg: az,
        }),
    })
}

/// Hour-angle rate in degrees per day: sidereal rotation minus the body's
/// own eastward RA drift.
fn hour_angle_rate(body: Body) -> f64 {
    match body {
        Body::Moon => 347.81,
        Body::Mars => 360.5,
    }
}

/// Standard rise/set altitude in degrees: refraction term, plus the
/// parallax-dominated offset for the Moon.
fn target_altitude_deg(body: Body, distance_km: f64) -> f64 {
    match body {
        Body::Moon => {
            let parallax = (EARTH_RADIUS_KM / distance_km).asin().to_degrees();
            0.7275 * parallax - 0.5667
        }
        Body::Mars => -0.5667,
    }
}

/// Solve one event. Returns (jd, altitude, azimuth) or `None` when the
/// geometry is circumpolar for rise/set.
#[allow(clippy::too_many_arguments)]
fn solve_horizon(
    eph: &Ephemeris,
    body: Body,
    jd_now: f64,
    ut_offset: f64,
    latitude: f64,
    longitude: f64,
    height_m: f64,
    kind: HorizonKind,
) -> Result<Option<(f64, f64, f64)>, AstroError> {
    let rate = hour_angle_rate(body);
    let period = 360.0 / rate;
    let phi = latitude.to_radians();

    // Target hour angle (degrees) at a trial instant, or None if the body
    // never reaches the target altitude there.
    let target_ha = |jd: f64| -> Result<Option<f64>, AstroError> {
        match kind {
            HorizonKind::Transit => Ok(Some(0.0)),
            HorizonKind::Rise | HorizonKind::Set => {
                let (_, dec, dist) = eph.apparent_equatorial(body, jd, jd)?;
                let h0 = target_altitude_deg(body, dist).to_radians();
                let dec = dec.to_radians();
                let cos_h = (h0.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos());
                if cos_h.abs() > 1.0 {
                    return Ok(None);
                }
                let h = cos_h.acos().to_degrees();
                Ok(Some(if kind == HorizonKind::Rise { -h } else { h }))
            }
        }
    };

    let hour_angle = |jd: f64| -> Result<f64, AstroError> {
        let (ra, _, _) = eph.apparent_equatorial(body, jd, jd)?;
        let lst = local_sidereal_deg(jd - ut_offset, longitude);
        Ok(wrap_pm180(lst - ra))
    };

    // Initial estimate from the state at the request instant
    let Some(ha_target_now) = target_ha(jd_now)? else {
        return Ok(None);
    };
    let mut dt = wrap_pm180(ha_target_now - hour_angle(jd_now)?) / rate;
    if dt <= 0.0 {
        dt += period;
    }
    let mut jd = jd_now + dt;

    // Refine, re-deriving the target as the body moves; push forward by one
    // period if convergence lands at or before the request instant.
    for _attempt in 0..3 {
        for _ in 0..MAX_ITERATIONS {
            let Some(ha_target) = target_ha(jd)? else {
                return Ok(None);
            };
            let correction = wrap_pm180(ha_target - hour_angle(jd)?) / rate;
            jd += correction;
            if correction.abs() < CONVERGENCE_DAYS {
                break;
            }
        }
        if jd > jd_now + CONVERGENCE_DAYS {
            break;
        }
        jd += period;
    }

    // Altitude/azimuth at the event instant
    let (ra, dec, dist) = eph.apparent_equatorial(body, jd, jd)?;
    let lst = local_sidereal_deg(jd - ut_offset, longitude);
    let (ra_t, dec_t) = if body == Body::Moon {
        apply_parallax(ra, dec, dist, latitude, height_m, lst)
    } else {
        (ra, dec)
    };
    let (alt, az) = equatorial_to_horizontal(ra_t, dec_t, lst, latitude);

    Ok(Some((jd, alt, normalize_degrees(az))))
}
