//! Standard SPICE target names and ID numbers
//!
//! Mappings between body names and the NAIF integer codes used in SPK segment
//! summaries.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Map from target ID numbers to canonical names (first listed name wins)
    static ref TARGET_NAMES: HashMap<i32, &'static str> = {
        let mut m = HashMap::new();
        for &(id, name) in TARGET_NAME_PAIRS.iter() {
            m.entry(id).or_insert(name);
        }
        m
    };

    /// Map from normalized target names to ID numbers
    static ref TARGET_IDS: HashMap<String, i32> = {
        let mut m = HashMap::new();
        for &(id, name) in TARGET_NAME_PAIRS.iter() {
            m.insert(normalize(name), id);
        }
        m
    };
}

fn normalize(name: &str) -> String {
    name.trim().to_uppercase().replace(['_', '-'], " ")
}

/// Get the canonical name of a target given its ID number
pub fn target_name(id: i32) -> Option<&'static str> {
    TARGET_NAMES.get(&id).copied()
}

/// Get the ID number of a target given any of its names
pub fn target_id(name: &str) -> Option<i32> {
    TARGET_IDS.get(&normalize(name)).copied()
}

/// Title-case a target name if it looks safe to do so
///
/// Names starting with a digit or with a `C`/`D` designation prefix are left
/// alone so catalogue identifiers keep their spelling.
pub fn titlecase(name: &str) -> String {
    if name.starts_with(['1', 'C', 'D']) {
        return name.to_string();
    }
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Display name for a target code, falling back to the bare number
pub fn display_name(id: i32) -> String {
    match target_name(id) {
        Some(name) => titlecase(name),
        None => format!("Body {id}"),
    }
}

/// Pairs of (id, name); the first name for each id is canonical
const TARGET_NAME_PAIRS: &[(i32, &str)] = &[
    (0, "SOLAR SYSTEM BARYCENTER"),
    (0, "SSB"),
    (1, "MERCURY BARYCENTER"),
    (2, "VENUS BARYCENTER"),
    (3, "EARTH BARYCENTER"),
    (3, "EMB"),
    (3, "EARTH MOON BARYCENTER"),
    (4, "MARS BARYCENTER"),
    (5, "JUPITER BARYCENTER"),
    (6, "SATURN BARYCENTER"),
    (7, "URANUS BARYCENTER"),
    (8, "NEPTUNE BARYCENTER"),
    (9, "PLUTO BARYCENTER"),
    (10, "SUN"),
    (199, "MERCURY"),
    (299, "VENUS"),
    (301, "MOON"),
    (399, "EARTH"),
    (401, "PHOBOS"),
    (402, "DEIMOS"),
    (499, "MARS"),
    (501, "IO"),
    (502, "EUROPA"),
    (503, "GANYMEDE"),
    (504, "CALLISTO"),
    (599, "JUPITER"),
    (606, "TITAN"),
    (699, "SATURN"),
    (799, "URANUS"),
    (801, "TRITON"),
    (899, "NEPTUNE"),
    (901, "CHARON"),
    (999, "PLUTO"),
];

/// Common target ID numbers
pub mod targets {
    /// Solar System Barycenter
    pub const SOLAR_SYSTEM_BARYCENTER: i32 = 0;
    /// Mercury Barycenter
    pub const MERCURY_BARYCENTER: i32 = 1;
    /// Venus Barycenter
    pub const VENUS_BARYCENTER: i32 = 2;
    /// Earth-Moon Barycenter
    pub const EARTH_MOON_BARYCENTER: i32 = 3;
    /// Mars Barycenter
    pub const MARS_BARYCENTER: i32 = 4;
    /// Jupiter Barycenter
    pub const JUPITER_BARYCENTER: i32 = 5;
    /// Saturn Barycenter
    pub const SATURN_BARYCENTER: i32 = 6;
    /// Uranus Barycenter
    pub const URANUS_BARYCENTER: i32 = 7;
    /// Neptune Barycenter
    pub const NEPTUNE_BARYCENTER: i32 = 8;
    /// Pluto Barycenter
    pub const PLUTO_BARYCENTER: i32 = 9;
    /// Sun
    pub const SUN: i32 = 10;
    /// Mercury
    pub const MERCURY: i32 = 199;
    /// Venus
    pub const VENUS: i32 = 299;
    /// Earth
    pub const EARTH: i32 = 399;
    /// Moon
    pub const MOON: i32 = 301;
    /// Mars
    pub const MARS: i32 = 499;
    /// Jupiter
    pub const JUPITER: i32 = 599;
    /// Saturn
    pub const SATURN: i32 = 699;
    /// Uranus
    pub const URANUS: i32 = 799;
    /// Neptune
    pub const NEPTUNE: i32 = 899;
    /// Pluto
    pub const PLUTO: i32 = 999;
}
