//! Constellation resolution for ecliptic-band coordinates.
//!
//! Two methods run side by side on the same (RA, Dec) pair:
//!
//! - **basic**: nearest reference point among a fixed table of constellation
//!   centers — always available, never fails;
//! - **precise**: boundary-box lookup against `data/constellation_bounds.csv`
//!   (J2000 boxes covering the band the Moon and Mars traverse), with the
//!   input precessed from equinox of date to J2000.
//!
//! The boundary catalog is optional: a missing or unparseable file, or a
//! point outside table coverage, silently degrades to the basic name for
//! both reported fields.

use std::sync::OnceLock;

use super::ephemeris::data_dir;
use super::frames::normalize_degrees;

/// Fixed centers (name, RA°, Dec°, J2000) for the nearest-center method.
const CENTERS: [(&str, f64, f64); 16] = [
    ("Pisces", 15.0, 12.0),
    ("Cetus", 20.0, -8.0),
    ("Aries", 40.0, 20.0),
    ("Taurus", 67.5, 16.0),
    ("Orion", 83.0, 3.0),
    ("Gemini", 105.0, 22.0),
    ("Cancer", 130.0, 20.0),
    ("Leo", 160.0, 13.0),
    ("Sextans", 157.0, -2.5),
    ("Virgo", 195.0, -4.0),
    ("Libra", 229.0, -15.0),
    ("Scorpius", 245.0, -27.0),
    ("Ophiuchus", 257.0, -7.0),
    ("Sagittarius", 285.0, -27.0),
    ("Capricornus", 315.0, -18.0),
    ("Aquarius", 335.0, -10.0),
];

/// One J2000 boundary box from the catalog file.
#[derive(Debug, Clone)]
struct BoundaryBox {
    name: String,
    ra_min: f64,
    ra_max: f64,
    dec_min: f64,
    dec_max: f64,
}

/// Resolved pair; `precise` is `None` when the catalog was unavailable or
/// did not cover the point.
#[derive(Debug, Clone)]
pub struct ConstellationNames {
    pub basic: String,
    pub precise: Option<String>,
}

impl ConstellationNames {
    /// Name to report for the precise field, falling back to basic.
    pub fn precise_or_basic(&self) -> &str {
        self.precise.as_deref().unwrap_or(&self.basic)
    }
}

/// Boundary catalog loaded once per process; `None` if unavailable.
static BOUNDARIES: OnceLock<Option<Vec<BoundaryBox>>> = OnceLock::new();

fn boundary_catalog() -> Option<&'static Vec<BoundaryBox>> {
    BOUNDARIES
        .get_or_init(|| {
            let path = data_dir().join("constellation_bounds.csv");
            match std::fs::read_to_string(&path) {
                Ok(contents) => match parse_catalog(&contents) {
                    Ok(boxes) => {
                        log::info!(
                            "loaded constellation boundary catalog from {} ({} boxes)",
                            path.display(),
                            boxes.len()
                        );
                        Some(boxes)
                    }
                    Err(reason) => {
                        log::warn!(
                            "constellation boundary catalog at {} is invalid ({reason}); \
                             using the basic method only",
                            path.display()
                        );
                        None
                    }
                },
                Err(_) => {
                    log::warn!(
                        "constellation boundary catalog missing at {}; \
                         using the basic method only",
                        path.display()
                    );
                    None
                }
            }
        })
        .as_ref()
}

fn parse_catalog(contents: &str) -> Result<Vec<BoundaryBox>, String> {
    let mut boxes = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [name, ra_min, ra_max, dec_min, dec_max] = fields.as_slice() else {
            return Err(format!("line {}: expected 5 fields", lineno + 1));
        };
        let num = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| format!("line {}: bad number '{s}'", lineno + 1))
        };
        boxes.push(BoundaryBox {
            name: name.to_string(),
            ra_min: num(ra_min)?,
            ra_max: num(ra_max)?,
            dec_min: num(dec_min)?,
            dec_max: num(dec_max)?,
        });
    }
    if boxes.is_empty() {
        return Err("catalog contains no boxes".to_string());
    }
    Ok(boxes)
}

/// Resolve both constellation names for an apparent (RA, Dec) of date.
///
/// `jd_tt` fixes the equinox the input coordinates refer to, so the precise
/// lookup can precess them back to the catalog's J2000 frame.
pub fn resolve(ra_deg: f64, dec_deg: f64, jd_tt: f64) -> ConstellationNames {
    let basic = nearest_center(ra_deg, dec_deg).to_string();
    let precise = boundary_catalog().and_then(|boxes| {
        let (ra_j2000, dec_j2000) = precess_to_j2000(ra_deg, dec_deg, jd_tt);
        lookup(boxes, ra_j2000, dec_j2000)
    });
    ConstellationNames { basic, precise }
}

/// Nearest-center lookup: great-circle distance against the fixed table.
fn nearest_center(ra_deg: f64, dec_deg: f64) -> &'static str {
    let mut best = CENTERS[0].0;
    let mut best_dist = f64::MAX;
    for &(name, c_ra, c_dec) in CENTERS.iter() {
        let d = angular_distance_deg(ra_deg, dec_deg, c_ra, c_dec);
        if d < best_dist {
            best_dist = d;
            best = name;
        }
    }
    best
}

fn angular_distance_deg(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (d1, d2) = (dec1.to_radians(), dec2.to_radians());
    let dra = (ra1 - ra2).to_radians();
    let cos_d = d1.sin() * d2.sin() + d1.cos() * d2.cos() * dra.cos();
    cos_d.clamp(-1.0, 1.0).acos().to_degrees()
}

/// First-match box scan; the catalog is ordered so that enclaves (Orion,
/// Scorpius, Sextans, Ophiuchus) are listed before the large zodiacal boxes.
fn lookup(boxes: &[BoundaryBox], ra_deg: f64, dec_deg: f64) -> Option<String> {
    let ra = normalize_degrees(ra_deg);
    boxes
        .iter()
        .find(|b| {
            let in_ra = if b.ra_min <= b.ra_max {
                ra >= b.ra_min && ra < b.ra_max
            } else {
                // Box straddling RA 0
                ra >= b.ra_min || ra < b.ra_max
            };
            in_ra && dec_deg >= b.dec_min && dec_deg < b.dec_max
        })
        .map(|b| b.name.clone())
}

/// Approximate precession from equinox of date back to J2000 (linear rates,
/// adequate over a few centuries).
fn precess_to_j2000(ra_deg: f64, dec_deg: f64, jd_tt: f64) -> (f64, f64) {
    let years = (jd_tt - 2_451_545.0) / 365.25;
    let ra = ra_deg.to_radians();
    let dec = dec_deg.to_radians();
    // Annual precession rates in arcseconds
    let m = 46.124_5;
    let n = 20.043_1;
    let dra = (m + n * ra.sin() * dec.tan()) / 3_600.0;
    let ddec = n * ra.cos() / 3_600.0;
    (
        normalize_degrees(ra_deg - dra * years),
        dec_deg - ddec * years,
    )
}
