//! Earth orientation: from the celestial frame to the rotating Earth
//!
//! Builds the rotation taking a geocentric ICRS vector into the terrestrial
//! frame (ITRS without polar motion):
//!
//! ```text
//! ITRS = R3(GAST) * N * P * B * GCRS
//! ```
//!
//! where B is the ICRS frame bias, P is the Capitaine et al. (2003)
//! precession, N is nutation from the leading IAU 2000B terms, and GAST is
//! Greenwich apparent sidereal time (USNO Circular 179, Section 2.6.2).

use lazy_static::lazy_static;
use nalgebra::{Matrix3, Vector3};

use crate::constants::{ASEC2RAD, J2000, JULIAN_CENTURY, TAU};
use crate::time::Time;

/// Mean obliquity at J2000.0 in arcseconds
const EPS0: f64 = 84381.406;

/// 0.1 microarcsecond in radians
const TENTH_USEC_2_RAD: f64 = ASEC2RAD / 1e7;

/// Fixed offsets standing in for the planetary terms in IAU 2000B, in arcseconds
const PLANETARY_DPSI: f64 = -0.000135;
const PLANETARY_DEPS: f64 = 0.000388;

/// Leading lunisolar nutation terms of IAU 2000B
///
/// Each row: multipliers of (l, l', F, D, Omega), then in 0.1 microarcseconds
/// the longitude terms (sin, sin*t, cos) and obliquity terms (cos, cos*t, sin).
#[rustfmt::skip]
const NUTATION_TERMS: [([i8; 5], [f64; 6]); 15] = [
    ([ 0, 0, 0, 0, 1], [-172064161.0, -174666.0,  33386.0, 92052331.0,  9086.0, 15377.0]),
    ([ 0, 0, 2,-2, 2], [ -13170906.0,   -1675.0, -13696.0,  5730336.0, -3015.0, -4587.0]),
    ([ 0, 0, 2, 0, 2], [  -2276413.0,    -234.0,   2796.0,   978459.0,  -485.0,  1374.0]),
    ([ 0, 0, 0, 0, 2], [   2074554.0,     207.0,   -698.0,  -897492.0,   470.0,  -291.0]),
    ([ 0, 1, 0, 0, 0], [   1475877.0,   -3633.0,  11817.0,    73871.0,  -184.0, -1924.0]),
    ([ 0, 1, 2,-2, 2], [   -516821.0,    1226.0,   -524.0,   224386.0,  -677.0,  -174.0]),
    ([ 1, 0, 0, 0, 0], [    711159.0,      73.0,   -872.0,    -6750.0,     0.0,   358.0]),
    ([ 0, 0, 2, 0, 1], [   -387298.0,    -367.0,    380.0,   200728.0,    18.0,   318.0]),
    ([ 1, 0, 2, 0, 2], [   -301461.0,     -36.0,    816.0,   129025.0,   -63.0,   367.0]),
    ([ 0,-1, 2,-2, 2], [    215829.0,    -494.0,    111.0,   -95929.0,   299.0,   132.0]),
    ([ 0, 0, 2,-2, 1], [    128227.0,     137.0,    181.0,   -68982.0,    -9.0,    39.0]),
    ([-1, 0, 2, 0, 2], [    123457.0,      11.0,     19.0,   -53311.0,    32.0,    -4.0]),
    ([-1, 0, 0, 2, 0], [    156994.0,      10.0,   -168.0,    -1235.0,     0.0,    82.0]),
    ([ 1, 0, 0, 0, 1], [     63110.0,      63.0,     27.0,   -33228.0,     0.0,    -9.0]),
    ([-1, 0, 0, 0, 1], [    -57976.0,     -63.0,   -189.0,    31429.0,     0.0,   -75.0]),
];

/// Delaunay argument polynomials, arcseconds (IERS Conventions 2003)
#[rustfmt::skip]
const FA_COEFFS: [[f64; 5]; 5] = [
    // Mean anomaly of the Moon (l)
    [485868.249036, 1717915923.2178, 31.8792, 0.051635, -0.00024470],
    // Mean anomaly of the Sun (l')
    [1287104.79305, 129596581.0481, -0.5532, 0.000136, -0.00001149],
    // Mean argument of latitude of the Moon (F)
    [335779.526232, 1739527262.8478, -12.7512, -0.001037, 0.00000417],
    // Mean elongation of the Moon from the Sun (D)
    [1072260.70369, 1602961601.2090, -6.3706, 0.006593, -0.00003169],
    // Mean longitude of the Moon's ascending node (Omega)
    [450160.398036, -6962890.5431, 7.4722, 0.007702, -0.00005939],
];

lazy_static! {
    /// ICRS to J2000 dynamical frame bias (IERS 2003 Conventions, Chapter 5)
    pub static ref ICRS_TO_J2000: Matrix3<f64> = {
        let xi0 = -0.0166170 * ASEC2RAD;
        let eta0 = -0.0068192 * ASEC2RAD;
        let da0 = -0.01460 * ASEC2RAD;

        let yx = -da0;
        let zx = xi0;
        let xy = da0;
        let zy = eta0;
        let xz = -xi0;
        let yz = -eta0;

        let xx = 1.0 - 0.5 * (yx * yx + zx * zx);
        let yy = 1.0 - 0.5 * (yx * yx + zy * zy);
        let zz = 1.0 - 0.5 * (zy * zy + zx * zx);

        Matrix3::new(xx, xy, xz, yx, yy, yz, zx, zy, zz)
    };
}

/// Earth Rotation Angle for a two-part UT1 date, in rotations within [0, 1)
///
/// IAU Resolution B1.8 of 2000.
pub fn earth_rotation_angle(jd_ut1: f64, fraction_ut1: f64) -> f64 {
    let th = 0.7790572732640 + 0.00273781191135448 * (jd_ut1 - J2000 + fraction_ut1);
    (th.rem_euclid(1.0) + jd_ut1.rem_euclid(1.0) + fraction_ut1).rem_euclid(1.0)
}

/// Greenwich Mean Sidereal Time in hours
///
/// Equinox method of USNO Circular 179, Section 2.6.2, with the
/// precession-in-RA polynomial of Capitaine et al. (2003), eq. (42).
pub fn sidereal_time(jd_ut1_whole: f64, ut1_fraction: f64, tdb_centuries: f64) -> f64 {
    let theta = earth_rotation_angle(jd_ut1_whole, ut1_fraction);

    let t = tdb_centuries;
    let st = 0.014506
        + ((((-0.0000000368 * t - 0.000029956) * t - 0.00000044) * t + 1.3915817) * t
            + 4612.156534)
            * t;

    // st is in arcseconds; 54000 arcseconds per hour of angle
    (st / 54000.0 + theta * 24.0).rem_euclid(24.0)
}

/// Precession matrix from J2000 to the mean equator and equinox of date
///
/// Capitaine et al. (2003) four-angle form:
/// P = R3(chi_a) * R1(-omega_a) * R3(-psi_a) * R1(eps_0)
pub fn precession_matrix(tdb_centuries: f64) -> Matrix3<f64> {
    let t = tdb_centuries;

    let psi_a = ((((-0.0000000951 * t + 0.000132851) * t - 0.00114045) * t - 1.0790069) * t
        + 5038.481507)
        * t;
    let omega_a =
        ((((0.0000003337 * t - 0.000000467) * t - 0.00772503) * t + 0.0512623) * t - 0.025754) * t
            + EPS0;
    let chi_a = ((((-0.0000000560 * t + 0.000170663) * t - 0.00121197) * t - 2.3814292) * t
        + 10.556403)
        * t;

    let (sa, ca) = (EPS0 * ASEC2RAD).sin_cos();
    let (sb, cb) = (-psi_a * ASEC2RAD).sin_cos();
    let (sc, cc) = (-omega_a * ASEC2RAD).sin_cos();
    let (sd, cd) = (chi_a * ASEC2RAD).sin_cos();

    #[rustfmt::skip]
    let m = Matrix3::new(
        cd * cb - sb * sd * cc,
        cd * sb * ca + sd * cc * cb * ca - sa * sd * sc,
        cd * sb * sa + sd * cc * cb * sa + ca * sd * sc,

        -sd * cb - sb * cd * cc,
        -sd * sb * ca + cd * cc * cb * ca - sa * cd * sc,
        -sd * sb * sa + cd * cc * cb * sa + ca * cd * sc,

        sb * sc,
        -sc * cb * ca - sa * cc,
        -sc * cb * sa + cc * ca,
    );
    m
}

/// Mean obliquity of the ecliptic in radians (Capitaine et al. 2003)
pub fn mean_obliquity(tdb_centuries: f64) -> f64 {
    let t = tdb_centuries;
    let epsilon = ((((-0.0000000434 * t - 0.000000576) * t + 0.00200340) * t - 0.0001831) * t
        - 46.836769)
        * t
        + EPS0;
    epsilon * ASEC2RAD
}

/// Nutation in longitude and obliquity, in radians
pub fn nutation(tt_centuries: f64) -> (f64, f64) {
    let t = tt_centuries;
    let fa: Vec<f64> = FA_COEFFS
        .iter()
        .map(|c| (c[0] + (c[1] + (c[2] + (c[3] + c[4] * t) * t) * t) * t) * ASEC2RAD)
        .collect();

    let (mut d_psi, mut d_eps) = (0.0, 0.0);
    for (multipliers, k) in NUTATION_TERMS.iter() {
        let arg: f64 = multipliers
            .iter()
            .zip(fa.iter())
            .map(|(&m, &a)| f64::from(m) * a)
            .sum();
        let (sin_arg, cos_arg) = arg.sin_cos();
        d_psi += (k[0] + k[1] * t) * sin_arg + k[2] * cos_arg;
        d_eps += (k[3] + k[4] * t) * cos_arg + k[5] * sin_arg;
    }

    (
        d_psi * TENTH_USEC_2_RAD + PLANETARY_DPSI * ASEC2RAD,
        d_eps * TENTH_USEC_2_RAD + PLANETARY_DEPS * ASEC2RAD,
    )
}

/// Nutation matrix from the mean to the true equator of date
pub fn nutation_matrix(mean_obliquity_rad: f64, d_psi: f64, d_eps: f64) -> Matrix3<f64> {
    let eps_true = mean_obliquity_rad + d_eps;

    let (sobm, cobm) = mean_obliquity_rad.sin_cos();
    let (sobt, cobt) = eps_true.sin_cos();
    let (spsi, cpsi) = d_psi.sin_cos();

    #[rustfmt::skip]
    let n = Matrix3::new(
        cpsi,          -spsi * cobm,                      -spsi * sobm,
        spsi * cobt,    cpsi * cobm * cobt + sobm * sobt,  cpsi * sobm * cobt - cobm * sobt,
        spsi * sobt,    cpsi * cobm * sobt - sobm * cobt,  cpsi * sobm * sobt + cobm * cobt,
    );
    n
}

/// Earth orientation at one instant
#[derive(Debug, Clone, Copy)]
pub struct EarthOrientation {
    /// GCRS to true equator and equinox of date (N * P * B)
    pub celestial_to_true: Matrix3<f64>,
    /// Greenwich apparent sidereal time in hours
    pub gast_hours: f64,
}

impl EarthOrientation {
    /// Compute orientation for a time
    pub fn at(time: &Time) -> Self {
        let tdb_t = time.tdb_centuries();
        let (d_psi, d_eps) = nutation(time.tt_centuries());
        let eps_mean = mean_obliquity(tdb_t);

        let npb = nutation_matrix(eps_mean, d_psi, d_eps) * precession_matrix(tdb_t) * *ICRS_TO_J2000;

        // Equation of the equinoxes, radians to hours
        let eq_eq_hours = d_psi * (eps_mean + d_eps).cos() * 24.0 / TAU;

        let ut1 = time.ut1();
        let ut1_whole = ut1.floor();
        let gmst = sidereal_time(ut1_whole, ut1 - ut1_whole, tdb_t);

        Self {
            celestial_to_true: npb,
            gast_hours: (gmst + eq_eq_hours).rem_euclid(24.0),
        }
    }

    /// Rotation from GCRS into the Earth-fixed frame
    pub fn celestial_to_terrestrial(&self) -> Matrix3<f64> {
        let theta = self.gast_hours * TAU / 24.0;
        let (s, c) = theta.sin_cos();
        #[rustfmt::skip]
        let r3 = Matrix3::new(
             c,   s,   0.0,
            -s,   c,   0.0,
             0.0, 0.0, 1.0,
        );
        r3 * self.celestial_to_true
    }

    /// Rotate a geocentric GCRS vector into the Earth-fixed frame
    pub fn itrs(&self, gcrs: &Vector3<f64>) -> Vector3<f64> {
        self.celestial_to_terrestrial() * gcrs
    }
}

/// Julian centuries since J2000 for a Julian date
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000) / JULIAN_CENTURY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timescale;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_precession_at_j2000_is_identity() {
        let p = precession_matrix(0.0);
        assert_relative_eq!(p, Matrix3::identity(), epsilon = 1e-10);
    }

    #[test]
    fn test_precession_is_a_rotation() {
        let p = precession_matrix(0.24);
        assert_relative_eq!(p * p.transpose(), Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(p.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_bias_is_tiny() {
        let b = *ICRS_TO_J2000;
        assert_relative_eq!(b, Matrix3::identity(), epsilon = 1e-6);
        assert!((b - Matrix3::identity()).abs().max() > 1e-9);
    }

    #[test]
    fn test_era_at_j2000() {
        assert_relative_eq!(earth_rotation_angle(J2000, 0.0), 0.7790572732640, epsilon = 1e-12);
    }

    #[test]
    fn test_gmst_at_j2000() {
        // GMST at 2000-01-01 12:00 UT1 is 18.697374558 h
        assert_relative_eq!(sidereal_time(J2000, 0.0, 0.0), 18.697374558, epsilon = 1e-6);
    }

    #[test]
    fn test_nutation_magnitude() {
        // Within the ~17" / ~9" envelopes of the 18.6 year term
        for k in 0..40 {
            let t = centuries_since_j2000(J2000 + k as f64 * 200.0);
            let (d_psi, d_eps) = nutation(t);
            assert!(d_psi.abs() < 20.0 * ASEC2RAD);
            assert!(d_eps.abs() < 11.0 * ASEC2RAD);
        }
    }

    #[test]
    fn test_nutation_against_full_iau2000b() {
        // Full IAU 2000B at TT MJD 53736.0 (2006-01-01)
        let t = centuries_since_j2000(2400000.5 + 53736.0);
        let (d_psi, d_eps) = nutation(t);
        assert_relative_eq!(d_psi, -0.963_255_229_114_836_3e-5, epsilon = 0.01 * ASEC2RAD);
        assert_relative_eq!(d_eps, 0.406_319_710_662_115_9e-4, epsilon = 0.01 * ASEC2RAD);
    }

    #[test]
    fn test_terrestrial_rotation_is_orthonormal() {
        let time = Timescale::default()
            .from_datetime(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        let m = EarthOrientation::at(&time).celestial_to_terrestrial();
        assert_relative_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_pole_stays_near_pole() {
        let time = Timescale::default()
            .from_datetime(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        let z = EarthOrientation::at(&time).itrs(&Vector3::z());
        // Precession moves the pole about 0.1 degree over 24 years
        assert!(z.z > 0.999_99);
    }
}
