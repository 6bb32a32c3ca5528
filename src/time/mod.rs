//! Time scales for ephemeris lookups and Earth rotation
//!
//! A `Time` is built from a UTC instant and carries it as a two-part Julian
//! date in Terrestrial Time, from which TAI, TDB and UT1 are derived.
//! UTC -> TAI uses the leap second table, TT = TAI + 32.184 s, and TDB - TT
//! follows USNO Circular 179, eq. 2.6.

use std::fmt;

use chrono::{DateTime, Utc};
use crate::constants::{DAY_S, J2000, JULIAN_CENTURY, TT_MINUS_TAI, TT_MINUS_TAI_S, UNIX_EPOCH_JD};

/// UTC Julian dates at which TAI - UTC changed, with the new offset
const LEAP_SECONDS: [(f64, f64); 28] = [
    (2441317.5, 10.0), // 1972-01-01
    (2441499.5, 11.0), // 1972-07-01
    (2441683.5, 12.0), // 1973-01-01
    (2442048.5, 13.0), // 1974-01-01
    (2442413.5, 14.0), // 1975-01-01
    (2442778.5, 15.0), // 1976-01-01
    (2443144.5, 16.0), // 1977-01-01
    (2443509.5, 17.0), // 1978-01-01
    (2443874.5, 18.0), // 1979-01-01
    (2444239.5, 19.0), // 1980-01-01
    (2444786.5, 20.0), // 1981-07-01
    (2445151.5, 21.0), // 1982-07-01
    (2445516.5, 22.0), // 1983-07-01
    (2446247.5, 23.0), // 1985-07-01
    (2447161.5, 24.0), // 1988-01-01
    (2447892.5, 25.0), // 1990-01-01
    (2448257.5, 26.0), // 1991-01-01
    (2448804.5, 27.0), // 1992-07-01
    (2449169.5, 28.0), // 1993-07-01
    (2449534.5, 29.0), // 1994-07-01
    (2450083.5, 30.0), // 1996-01-01
    (2450630.5, 31.0), // 1997-07-01
    (2451179.5, 32.0), // 1999-01-01
    (2453736.5, 33.0), // 2006-01-01
    (2454832.5, 34.0), // 2009-01-01
    (2456109.5, 35.0), // 2012-07-01
    (2457204.5, 36.0), // 2015-07-01
    (2457754.5, 37.0), // 2017-01-01
];

/// Converts UTC instants into `Time` values
#[derive(Debug, Clone)]
pub struct Timescale {
    leap_seconds: Vec<(f64, f64)>,
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            leap_seconds: LEAP_SECONDS.to_vec(),
        }
    }
}

impl Timescale {
    /// Timescale with a custom leap second table of (UTC JD, TAI - UTC) rows
    pub fn with_leap_seconds(mut leap_seconds: Vec<(f64, f64)>) -> Self {
        leap_seconds.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { leap_seconds }
    }

    /// Create a time from a UTC datetime
    pub fn from_datetime(&self, dt: DateTime<Utc>) -> Time {
        let secs = dt.timestamp();
        let days = secs.div_euclid(DAY_S as i64);
        let seconds_of_day =
            secs.rem_euclid(DAY_S as i64) as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;

        let whole = UNIX_EPOCH_JD + days as f64;
        let utc_fraction = seconds_of_day / DAY_S;
        let leap = self.leap_seconds_at(whole + utc_fraction);
        let tt_fraction = utc_fraction + (leap + TT_MINUS_TAI_S) / DAY_S;
        let delta_t = self.delta_t(whole + tt_fraction);

        Time {
            whole,
            tt_fraction,
            delta_t,
        }
    }

    /// Create a time from a Julian date in TT
    pub fn tt_jd(&self, jd: f64) -> Time {
        let whole = jd.floor();
        let tt_fraction = jd - whole;
        Time {
            whole,
            tt_fraction,
            delta_t: self.delta_t(jd),
        }
    }

    /// TAI - UTC in seconds at a UTC Julian date
    ///
    /// Dates before 1972 use the first table entry.
    pub fn leap_seconds_at(&self, utc_jd: f64) -> f64 {
        let idx = self.leap_seconds.partition_point(|&(jd, _)| jd <= utc_jd);
        match idx {
            0 => self.leap_seconds.first().map_or(0.0, |&(_, offset)| offset),
            i => self.leap_seconds[i - 1].1,
        }
    }

    /// Delta T (TT - UT1) in seconds at a TT Julian date
    ///
    /// Within the leap second era UT1 is taken as UTC, which keeps the error
    /// under the 0.9 s bound on |UT1 - UTC|. Earlier dates use a polynomial fit.
    pub fn delta_t(&self, tt_jd: f64) -> f64 {
        match self.leap_seconds.first() {
            Some(&(first, _)) if tt_jd >= first => {
                TT_MINUS_TAI_S + self.leap_seconds_at(tt_jd - TT_MINUS_TAI)
            }
            _ => delta_t_approx((tt_jd - 1_721_045.0) / 365.25),
        }
    }
}

/// Approximate Delta T in seconds for a decimal year
///
/// Piecewise polynomials from Espenak & Meeus.
pub fn delta_t_approx(year: f64) -> f64 {
    if year < -500.0 {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    } else if year < 500.0 {
        let t = year / 100.0;
        10583.6 - 1014.41 * t + 33.78311 * t * t - 5.952053 * t.powi(3) - 0.1798452 * t.powi(4)
            + 0.022174192 * t.powi(5)
            + 0.0090316521 * t.powi(6)
    } else if year < 1600.0 {
        let t = (year - 1000.0) / 100.0;
        1574.2 - 556.01 * t + 71.23472 * t * t + 0.319781 * t.powi(3)
            - 0.8503463 * t.powi(4)
            - 0.005050998 * t.powi(5)
            + 0.0083572073 * t.powi(6)
    } else if year < 1700.0 {
        let t = year - 1600.0;
        120.0 - 0.9808 * t - 0.01532 * t * t + t.powi(3) / 7129.0
    } else if year < 1800.0 {
        let t = year - 1700.0;
        8.83 + 0.1603 * t - 0.0059285 * t * t + 0.00013336 * t.powi(3) - t.powi(4) / 1174000.0
    } else if year < 1860.0 {
        let t = year - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t * t + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if year < 1900.0 {
        let t = year - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t * t + 0.01680668 * t.powi(3) - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233174.0
    } else if year < 1920.0 {
        let t = year - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t * t + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4)
    } else if year < 1941.0 {
        let t = year - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t * t + 0.0020936 * t.powi(3)
    } else if year < 1961.0 {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t * t / 233.0 + t.powi(3) / 2547.0
    } else if year < 1986.0 {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t.powi(3) / 718.0
    } else if year < 2005.0 {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t * t
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if year < 2050.0 {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else if year < 2150.0 {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

/// TDB - TT in seconds (USNO Circular 179, eq. 2.6)
pub fn tdb_minus_tt(jd_tt: f64) -> f64 {
    let t = (jd_tt - J2000) / JULIAN_CENTURY;

    0.001657 * f64::sin(628.3076 * t + 6.2401)
        + 0.000022 * f64::sin(575.3385 * t + 4.2970)
        + 0.000014 * f64::sin(1256.6152 * t + 6.1969)
        + 0.000005 * f64::sin(606.9777 * t + 4.0212)
        + 0.000005 * f64::sin(52.9691 * t + 0.4444)
        + 0.000002 * f64::sin(21.3299 * t + 5.5431)
        + 0.000010 * t * f64::sin(628.3076 * t + 4.2490)
}

/// A single instant, held as a two-part TT Julian date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    /// Integer-and-a-half part of the Julian date
    whole: f64,
    /// TT fraction of day added to `whole`
    tt_fraction: f64,
    /// TT - UT1 in seconds
    delta_t: f64,
}

impl Time {
    /// Create a time from a UTC datetime with the default timescale
    pub fn new(utc: DateTime<Utc>) -> Self {
        Timescale::default().from_datetime(utc)
    }

    /// TT as a Julian date
    pub fn tt(&self) -> f64 {
        self.whole + self.tt_fraction
    }

    /// TAI as a Julian date
    pub fn tai(&self) -> f64 {
        self.whole + (self.tt_fraction - TT_MINUS_TAI)
    }

    /// TDB as a Julian date
    pub fn tdb(&self) -> f64 {
        self.whole + self.tt_fraction + tdb_minus_tt(self.tt()) / DAY_S
    }

    /// UT1 as a Julian date
    pub fn ut1(&self) -> f64 {
        self.whole + (self.tt_fraction - self.delta_t / DAY_S)
    }

    /// Delta T (TT - UT1) in seconds
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// TDB seconds since J2000, the SPK time argument
    pub fn tdb_seconds_from_j2000(&self) -> f64 {
        ((self.whole - J2000) + self.tt_fraction) * DAY_S + tdb_minus_tt(self.tt())
    }

    /// Julian centuries of TT since J2000
    pub fn tt_centuries(&self) -> f64 {
        ((self.whole - J2000) + self.tt_fraction) / JULIAN_CENTURY
    }

    /// Julian centuries of TDB since J2000
    pub fn tdb_centuries(&self) -> f64 {
        self.tdb_seconds_from_j2000() / DAY_S / JULIAN_CENTURY
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Time::new(dt)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Time tt={:.9}>", self.tt())
    }
}
