//! Calendar date and Julian date conversion functions

/// Convert Julian day number to calendar date (year, month, day)
///
/// Uses the proleptic Gregorian calendar unless `julian_before` is set to a
/// specific Julian day, in which case the Julian calendar is used for dates
/// older than that.
pub fn compute_calendar_date(jd_integer: i64, julian_before: Option<i64>) -> (i64, u32, u32) {
    let use_gregorian = match julian_before {
        None => true,
        Some(jb) => jd_integer >= jb,
    };

    // Explanatory Supplement to the Astronomical Almanac 15.11
    let mut f = jd_integer + 1401;
    if use_gregorian {
        f += (4 * jd_integer + 274277) / 146097 * 3 / 4 - 38;
    }

    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;
    let day = (h % 153) / 5 + 1;
    let month = (h / 153 + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year, month as u32, day as u32)
}

/// Convert (year, month, day) to Julian day number (proleptic Gregorian)
pub fn compute_julian_day(year: i64, month: u32, day: u32) -> i64 {
    let janfeb = i64::from(month < 3);
    let month = i64::from(month);

    1461 * (year + 4800 - janfeb) / 4 + 367 * (month - 2 + 12 * janfeb) / 12
        - 3 * ((year + 4900 - janfeb) / 100) / 4
        - 32075
        + i64::from(day)
}

/// Convert (year, month, fractional day) to a Julian date
pub fn compute_julian_date(year: i64, month: u32, day: f64) -> f64 {
    compute_julian_day(year, month, day.floor() as u32) as f64 - 0.5 + day.fract()
}

/// Format a Julian date as the calendar date it falls on (YYYY-MM-DD)
pub fn format_date(jd: f64) -> String {
    // Julian days begin at noon
    let (year, month, day) = compute_calendar_date((jd + 0.5).floor() as i64, None);
    format!("{year:04}-{month:02}-{day:02}")
}
