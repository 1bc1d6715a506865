//! Lunar periodic-term series (truncated ELP-style theory).
//!
//! Geocentric ecliptic longitude, latitude and distance of the Moon from the
//! classical periodic-term formulation: fundamental Delaunay arguments plus a
//! table of sine/cosine terms with an eccentricity damping factor on the
//! solar-anomaly terms.
//!
//! Two datasets back the series. The extended term table ships as
//! `data/lunar_terms.csv` and is parsed at startup; a compact table with the
//! dominant terms is compiled in as the fallback tier. Accuracy is ~0.3° in
//! longitude for the extended table, ~1° for the compact one.

use super::EclipticPosition;

/// Longitude/distance term: Delaunay multipliers and coefficients.
/// `coeff_l` in 1e-6 degrees, `coeff_r` in 1e-3 km.
#[derive(Debug, Clone, Copy)]
pub struct LongitudeTerm {
    pub d: i8,
    pub m: i8,
    pub mp: i8,
    pub f: i8,
    pub coeff_l: f64,
    pub coeff_r: f64,
}

/// Latitude term: Delaunay multipliers and coefficient in 1e-6 degrees.
#[derive(Debug, Clone, Copy)]
pub struct LatitudeTerm {
    pub d: i8,
    pub m: i8,
    pub mp: i8,
    pub f: i8,
    pub coeff_b: f64,
}

/// Compact longitude/distance table: the dominant terms, compiled in.
const COMPACT_LR: [LongitudeTerm; 10] = [
    LongitudeTerm { d: 0, m: 0, mp: 1, f: 0, coeff_l: 6_288_774.0, coeff_r: -20_905_355.0 },
    LongitudeTerm { d: 2, m: 0, mp: -1, f: 0, coeff_l: 1_274_027.0, coeff_r: -3_699_111.0 },
    LongitudeTerm { d: 2, m: 0, mp: 0, f: 0, coeff_l: 658_314.0, coeff_r: -2_955_968.0 },
    LongitudeTerm { d: 0, m: 0, mp: 2, f: 0, coeff_l: 213_618.0, coeff_r: -569_925.0 },
    LongitudeTerm { d: 0, m: 1, mp: 0, f: 0, coeff_l: -185_116.0, coeff_r: 48_888.0 },
    LongitudeTerm { d: 0, m: 0, mp: 0, f: 2, coeff_l: -114_332.0, coeff_r: -3_149.0 },
    LongitudeTerm { d: 2, m: 0, mp: -2, f: 0, coeff_l: 58_793.0, coeff_r: 246_158.0 },
    LongitudeTerm { d: 2, m: -1, mp: -1, f: 0, coeff_l: 57_066.0, coeff_r: -152_138.0 },
    LongitudeTerm { d: 2, m: 0, mp: 1, f: 0, coeff_l: 53_322.0, coeff_r: -170_733.0 },
    LongitudeTerm { d: 2, m: -1, mp: 0, f: 0, coeff_l: 45_758.0, coeff_r: -204_586.0 },
];

/// Compact latitude table.
const COMPACT_B: [LatitudeTerm; 8] = [
    LatitudeTerm { d: 0, m: 0, mp: 0, f: 1, coeff_b: 5_128_122.0 },
    LatitudeTerm { d: 0, m: 0, mp: 1, f: 1, coeff_b: 280_602.0 },
    LatitudeTerm { d: 0, m: 0, mp: 1, f: -1, coeff_b: 277_693.0 },
    LatitudeTerm { d: 2, m: 0, mp: 0, f: -1, coeff_b: 173_237.0 },
    LatitudeTerm { d: 2, m: 0, mp: -1, f: 1, coeff_b: 55_413.0 },
    LatitudeTerm { d: 2, m: 0, mp: -1, f: -1, coeff_b: 46_271.0 },
    LatitudeTerm { d: 2, m: 0, mp: 0, f: 1, coeff_b: 32_573.0 },
    LatitudeTerm { d: 0, m: 0, mp: 2, f: 1, coeff_b: 17_198.0 },
];

/// Evaluated lunar series: a pair of term tables.
#[derive(Debug, Clone)]
pub struct LunarSeries {
    lr: Vec<LongitudeTerm>,
    b: Vec<LatitudeTerm>,
}

impl LunarSeries {
    /// The compiled-in compact series.
    pub fn compact() -> Self {
        Self {
            lr: COMPACT_LR.to_vec(),
            b: COMPACT_B.to_vec(),
        }
    }

    /// Parse the extended series from the dataset file contents.
    ///
    /// Line format, comma-separated (`#` starts a comment):
    /// `lr,D,M,Mp,F,coeff_l,coeff_r` or `b,D,M,Mp,F,coeff_b`.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let mut lr = Vec::new();
        let mut b = Vec::new();

        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let parse_f64 = |s: &str| {
                s.parse::<f64>()
                    .map_err(|_| format!("line {}: bad number '{s}'", lineno + 1))
            };
            let parse_i8 = |s: &str| {
                s.parse::<i8>()
                    .map_err(|_| format!("line {}: bad multiplier '{s}'", lineno + 1))
            };
            match fields.as_slice() {
                ["lr", d, m, mp, f, cl, cr] => lr.push(LongitudeTerm {
                    d: parse_i8(d)?,
                    m: parse_i8(m)?,
                    mp: parse_i8(mp)?,
                    f: parse_i8(f)?,
                    coeff_l: parse_f64(cl)?,
                    coeff_r: parse_f64(cr)?,
                }),
                ["b", d, m, mp, f, cb] => b.push(LatitudeTerm {
                    d: parse_i8(d)?,
                    m: parse_i8(m)?,
                    mp: parse_i8(mp)?,
                    f: parse_i8(f)?,
                    coeff_b: parse_f64(cb)?,
                }),
                _ => return Err(format!("line {}: unrecognized record", lineno + 1)),
            }
        }

        if lr.is_empty() || b.is_empty() {
            return Err("term table is missing longitude or latitude records".to_string());
        }
        Ok(Self { lr, b })
    }

    /// Number of terms across both tables.
    pub fn term_count(&self) -> usize {
        self.lr.len() + self.b.len()
    }

    /// Geocentric ecliptic position of the Moon (equinox of date) at a TDB
    /// Julian date.
    pub fn geocentric(&self, jd_tdb: f64) -> EclipticPosition {
        let t = (jd_tdb - 2_451_545.0) / 36_525.0;

        let lp = mean_longitude(t);
        let d = mean_elongation(t);
        let m = sun_mean_anomaly(t);
        let mp = moon_mean_anomaly(t);
        let f = argument_of_latitude(t);

        // Eccentricity damping on the solar-anomaly terms
        let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t * t;
        let e2 = e * e;
        let damping = |mult: i8| match mult.abs() {
            1 => e,
            2 => e2,
            _ => 1.0,
        };

        let mut sum_l = 0.0;
        let mut sum_r = 0.0;
        for term in &self.lr {
            let arg = (term.d as f64 * d
                + term.m as f64 * m
                + term.mp as f64 * mp
                + term.f as f64 * f)
                .to_radians();
            let ef = damping(term.m);
            sum_l += term.coeff_l * ef * arg.sin();
            sum_r += term.coeff_r * ef * arg.cos();
        }

        let mut sum_b = 0.0;
        for term in &self.b {
            let arg = (term.d as f64 * d
                + term.m as f64 * m
                + term.mp as f64 * mp
                + term.f as f64 * f)
                .to_radians();
            sum_b += term.coeff_b * damping(term.m) * arg.sin();
        }

        // Action of Venus (A1), Jupiter (A2) and flattening (A3)
        let a1 = normalize(119.75 + 131.849 * t);
        let a2 = normalize(53.09 + 479_264.290 * t);
        let a3 = normalize(313.45 + 481_266.484 * t);

        sum_l += 3_958.0 * a1.to_radians().sin();
        sum_l += 1_962.0 * (lp - f).to_radians().sin();
        sum_l += 318.0 * a2.to_radians().sin();

        sum_b += -2_235.0 * lp.to_radians().sin();
        sum_b += 382.0 * a3.to_radians().sin();
        sum_b += 175.0 * (a1 - f).to_radians().sin();
        sum_b += 175.0 * (a1 + f).to_radians().sin();
        sum_b += 127.0 * (lp - mp).to_radians().sin();
        sum_b += -115.0 * (lp + mp).to_radians().sin();

        EclipticPosition {
            lon_deg: normalize(lp + sum_l / 1_000_000.0),
            lat_deg: sum_b / 1_000_000.0,
            distance_km: 385_000.56 + sum_r / 1_000.0,
        }
    }

    /// Moon argument of latitude F in degrees, exposed for the libration
    /// geometry.
    pub fn argument_of_latitude_deg(jd_tdb: f64) -> f64 {
        argument_of_latitude((jd_tdb - 2_451_545.0) / 36_525.0)
    }

    /// Longitude of the Moon's mean ascending node Ω in degrees.
    pub fn ascending_node_deg(jd_tdb: f64) -> f64 {
        let t = (jd_tdb - 2_451_545.0) / 36_525.0;
        normalize(125.044_552_7 - 1_934.136_261 * t + 0.002_070_8 * t * t)
    }
}

fn normalize(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Moon mean longitude L'
fn mean_longitude(t: f64) -> f64 {
    normalize(
        218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t * t
            + t * t * t / 538_841.0
            - t * t * t * t / 65_194_000.0,
    )
}

/// Moon mean elongation D
fn mean_elongation(t: f64) -> f64 {
    normalize(
        297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t * t
            + t * t * t / 545_868.0
            - t * t * t * t / 113_065_000.0,
    )
}

/// Sun mean anomaly M
fn sun_mean_anomaly(t: f64) -> f64 {
    normalize(357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t * t + t * t * t / 24_490_000.0)
}

/// Moon mean anomaly M'
fn moon_mean_anomaly(t: f64) -> f64 {
    normalize(
        134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t * t + t * t * t / 69_699.0
            - t * t * t * t / 14_712_000.0,
    )
}

/// Moon argument of latitude F
fn argument_of_latitude(t: f64) -> f64 {
    normalize(
        93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t * t - t * t * t / 3_526_000.0
            + t * t * t * t / 863_310_000.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1992 April 12, 0h TD — the classical worked example for this series.
    const EXAMPLE_JD: f64 = 2_448_724.5;

    #[test]
    fn test_compact_series_example_epoch() {
        let pos = LunarSeries::compact().geocentric(EXAMPLE_JD);
        // Expected: lon ~133.17°, lat ~-3.23°, distance ~368409 km
        assert!((pos.lon_deg - 133.17).abs() < 1.0, "lon = {}", pos.lon_deg);
        assert!((pos.lat_deg + 3.23).abs() < 1.0, "lat = {}", pos.lat_deg);
        assert!(
            (pos.distance_km - 368_409.0).abs() < 3_000.0,
            "dist = {}",
            pos.distance_km
        );
    }

    #[test]
    fn test_distance_stays_in_orbit_range() {
        let series = LunarSeries::compact();
        for k in 0..30 {
            let jd = 2_451_545.0 + k as f64;
            let pos = series.geocentric(jd);
            // Perigee ~356,500 km, apogee ~406,700 km, plus compact-series slack
            assert!(
                pos.distance_km > 353_000.0 && pos.distance_km < 409_000.0,
                "day {k}: distance {} km out of range",
                pos.distance_km
            );
        }
    }

    #[test]
    fn test_latitude_bounded_by_inclination() {
        let series = LunarSeries::compact();
        for k in 0..30 {
            let pos = series.geocentric(2_455_000.0 + k as f64);
            assert!(pos.lat_deg.abs() < 5.6, "lat {} exceeds inclination", pos.lat_deg);
        }
    }

    #[test]
    fn test_parse_roundtrip() {
        let contents = "\
# longitude/distance terms
lr, 0, 0, 1, 0, 6288774, -20905355
lr, 2, 0, -1, 0, 1274027, -3699111
# latitude terms
b, 0, 0, 0, 1, 5128122
";
        let series = LunarSeries::parse(contents).unwrap();
        assert_eq!(series.term_count(), 3);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(LunarSeries::parse("lr, x, 0, 1, 0, 1, 1").is_err());
        assert!(LunarSeries::parse("weird, 1, 2").is_err());
        assert!(LunarSeries::parse("# only comments\n").is_err());
    }

    #[test]
    fn test_sidereal_month_return() {
        // After one sidereal month the Moon returns close to the same longitude
        let series = LunarSeries::compact();
        let l0 = series.geocentric(2_451_545.0).lon_deg;
        let l1 = series.geocentric(2_451_545.0 + 27.321_661).lon_deg;
        let diff = (l1 - l0 + 180.0).rem_euclid(360.0) - 180.0;
        assert!(diff.abs() < 4.0, "longitude drift {diff}° after sidereal month");
    }

    #[test]
    fn test_node_regression_period() {
        // The ascending node regresses ~360° in 18.6 years
        let n0 = LunarSeries::ascending_node_deg(2_451_545.0);
        let n1 = LunarSeries::ascending_node_deg(2_451_545.0 + 18.6 * 365.25);
        let diff = (n0 - n1).rem_euclid(360.0);
        assert!(diff < 5.0 || diff > 355.0, "node moved {diff}° in 18.6 y");
    }
}
