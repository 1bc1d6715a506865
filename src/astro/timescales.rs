//! Time scale normalization.
//!
//! Converts a caller-supplied (or current) UTC instant into the scales the
//! ephemeris consumes: UTC, TT (Terrestrial Time) and TDB (Barycentric
//! Dynamical Time), each carried as a Julian date. The conversion is a pure
//! function of the input: TT derives from the published leap-second table,
//! TDB from the standard periodic term in the Earth's mean anomaly.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::AstroError;
use crate::models::JulianDate;

/// TAI − UTC steps since 1972, as (JD of effect, seconds).
const LEAP_SECONDS: [(f64, f64); 28] = [
    (2_441_317.5, 10.0), // 1972-01-01
    (2_441_499.5, 11.0), // 1972-07-01
    (2_441_683.5, 12.0), // 1973-01-01
    (2_442_048.5, 13.0), // 1974-01-01
    (2_442_413.5, 14.0), // 1975-01-01
    (2_442_778.5, 15.0), // 1976-01-01
    (2_443_144.5, 16.0), // 1977-01-01
    (2_443_509.5, 17.0), // 1978-01-01
    (2_443_874.5, 18.0), // 1979-01-01
    (2_444_239.5, 19.0), // 1980-01-01
    (2_444_786.5, 20.0), // 1981-07-01
    (2_445_151.5, 21.0), // 1982-07-01
    (2_445_516.5, 22.0), // 1983-07-01
    (2_446_247.5, 23.0), // 1985-07-01
    (2_447_161.5, 24.0), // 1988-01-01
    (2_447_892.5, 25.0), // 1990-01-01
    (2_448_257.5, 26.0), // 1991-01-01
    (2_448_804.5, 27.0), // 1992-07-01
    (2_449_169.5, 28.0), // 1993-07-01
    (2_449_534.5, 29.0), // 1994-07-01
    (2_450_083.5, 30.0), // 1996-01-01
    (2_450_630.5, 31.0), // 1997-07-01
    (2_451_179.5, 32.0), // 1999-01-01
    (2_453_736.5, 33.0), // 2006-01-01
    (2_454_832.5, 34.0), // 2009-01-01
    (2_456_109.5, 35.0), // 2012-07-01
    (2_457_204.5, 36.0), // 2015-07-01
    (2_457_754.5, 37.0), // 2017-01-01
];

/// TT − TAI offset in seconds (definition of TT).
const TT_MINUS_TAI: f64 = 32.184;

/// TAI − UTC in seconds at a given UTC Julian date.
///
/// Dates before 1972 use the first table entry; the table is a step function
/// so lookup picks the last entry at or before the date.
pub fn delta_at_seconds(jd_utc: f64) -> f64 {
    let mut dat = LEAP_SECONDS[0].1;
    for &(jd, secs) in LEAP_SECONDS.iter() {
        if jd_utc >= jd {
            dat = secs;
        } else {
            break;
        }
    }
    dat
}

/// TT − UTC in seconds at a given UTC Julian date.
pub fn tt_minus_utc_seconds(jd_utc: f64) -> f64 {
    delta_at_seconds(jd_utc) + TT_MINUS_TAI
}

/// TDB − TT in seconds at a given TT Julian date.
///
/// Single dominant periodic term in the Earth's mean anomaly; the remaining
/// terms are below 30 microseconds and irrelevant at this precision tier.
fn tdb_minus_tt_seconds(jd_tt: f64) -> f64 {
    let g = (357.53 + 0.985_600_3 * (jd_tt - 2_451_545.0)).to_radians();
    0.001_657 * g.sin() + 0.000_014 * (2.0 * g).sin()
}

/// Immutable bundle of one instant expressed in every scale the pipeline
/// needs. Created once per request and used read-only afterwards.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    utc: DateTime<Utc>,
    jd_utc: JulianDate,
    jd_tt: JulianDate,
    jd_tdb: JulianDate,
}

impl TimeContext {
    /// Build a context from an optional caller-supplied timestamp string,
    /// defaulting to the current instant.
    pub fn resolve(timestamp: Option<&str>) -> Result<Self, AstroError> {
        let utc = match timestamp {
            Some(raw) => parse_timestamp(raw)?,
            None => Utc::now(),
        };
        Ok(Self::from_utc(utc))
    }

    /// Build a context from a UTC instant.
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        let jd_utc = JulianDate::from_datetime(utc);
        let jd_tt = JulianDate::new(
            jd_utc.value() + tt_minus_utc_seconds(jd_utc.value()) / 86_400.0,
        );
        let jd_tdb = JulianDate::new(
            jd_tt.value() + tdb_minus_tt_seconds(jd_tt.value()) / 86_400.0,
        );
        Self {
            utc,
            jd_utc,
            jd_tt,
            jd_tdb,
        }
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    pub fn jd_utc(&self) -> JulianDate {
        self.jd_utc
    }

    pub fn jd_tt(&self) -> JulianDate {
        self.jd_tt
    }

    pub fn jd_tdb(&self) -> JulianDate {
        self.jd_tdb
    }
}

/// Convert an ephemeris-timeline instant back to a UTC datetime.
///
/// The millisecond-level TDB−TT term is ignored on the way back; event times
/// are reported to one-second resolution.
pub fn tdb_jd_to_utc(jd_tdb: f64) -> DateTime<Utc> {
    let jd_utc = jd_tdb - tt_minus_utc_seconds(jd_tdb) / 86_400.0;
    JulianDate::new(jd_utc).to_datetime()
}

/// Accepted timestamp formats: RFC 3339, or `YYYY-MM-DD HH:MM:SS` taken as
/// UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AstroError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(AstroError::InvalidTimestamp(format!(
        "could not parse '{raw}' as UTC (expected RFC 3339 or YYYY-MM-DD HH:MM:SS)"
    )))
}
