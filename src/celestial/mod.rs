//! Celestial body and sky-state identifiers
//!
//! A single enumeration shared by the sampler, the algorithms and the CLI. The
//! first eleven members are solar-system bodies that an ephemeris can locate;
//! the last five describe sky brightness (day/night and the twilight bands) and
//! carry no position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::jplephem::names::targets;

/// Error returned when a body name cannot be recognised
#[derive(Debug, Error, PartialEq)]
#[error("Unknown celestial body: {0}")]
pub struct UnknownBody(pub String);

/// A body or sky state, numbered in a fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelestialBody {
    Sun,
    Earth,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    DayNight,
    CivilTwilight,
    NauticalTwilight,
    AstronomicalTwilight,
    Night,
}

impl CelestialBody {
    /// Every member, in code order
    pub const ALL: [CelestialBody; 16] = [
        CelestialBody::Sun,
        CelestialBody::Earth,
        CelestialBody::Moon,
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
        CelestialBody::DayNight,
        CelestialBody::CivilTwilight,
        CelestialBody::NauticalTwilight,
        CelestialBody::AstronomicalTwilight,
        CelestialBody::Night,
    ];

    /// Stable numeric code (0 for the sun through 15 for night)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look a member up by its numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Lower-case snake_case name
    pub fn name(self) -> &'static str {
        match self {
            CelestialBody::Sun => "sun",
            CelestialBody::Earth => "earth",
            CelestialBody::Moon => "moon",
            CelestialBody::Mercury => "mercury",
            CelestialBody::Venus => "venus",
            CelestialBody::Mars => "mars",
            CelestialBody::Jupiter => "jupiter",
            CelestialBody::Saturn => "saturn",
            CelestialBody::Uranus => "uranus",
            CelestialBody::Neptune => "neptune",
            CelestialBody::Pluto => "pluto",
            CelestialBody::DayNight => "day_night",
            CelestialBody::CivilTwilight => "civil_twilight",
            CelestialBody::NauticalTwilight => "nautical_twilight",
            CelestialBody::AstronomicalTwilight => "astronomical_twilight",
            CelestialBody::Night => "night",
        }
    }

    /// NAIF ids to try, most specific first
    ///
    /// DE files ship planet-center segments only for the inner planets, so the
    /// outer planets fall back to their system barycenters. Sky states have no
    /// ids at all.
    pub fn naif_ids(self) -> &'static [i32] {
        match self {
            CelestialBody::Sun => &[targets::SUN],
            CelestialBody::Earth => &[targets::EARTH],
            CelestialBody::Moon => &[targets::MOON],
            CelestialBody::Mercury => &[targets::MERCURY, targets::MERCURY_BARYCENTER],
            CelestialBody::Venus => &[targets::VENUS, targets::VENUS_BARYCENTER],
            CelestialBody::Mars => &[targets::MARS, targets::MARS_BARYCENTER],
            CelestialBody::Jupiter => &[targets::JUPITER, targets::JUPITER_BARYCENTER],
            CelestialBody::Saturn => &[targets::SATURN, targets::SATURN_BARYCENTER],
            CelestialBody::Uranus => &[targets::URANUS, targets::URANUS_BARYCENTER],
            CelestialBody::Neptune => &[targets::NEPTUNE, targets::NEPTUNE_BARYCENTER],
            CelestialBody::Pluto => &[targets::PLUTO, targets::PLUTO_BARYCENTER],
            CelestialBody::DayNight
            | CelestialBody::CivilTwilight
            | CelestialBody::NauticalTwilight
            | CelestialBody::AstronomicalTwilight
            | CelestialBody::Night => &[],
        }
    }

    /// True for members an ephemeris can locate
    pub fn is_positional(self) -> bool {
        !self.naif_ids().is_empty()
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CelestialBody {
    type Err = UnknownBody;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        if let Ok(code) = normalized.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| UnknownBody(s.to_string()));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|body| body.name() == normalized)
            .ok_or_else(|| UnknownBody(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_codes_follow_declaration_order() {
        for (i, body) in CelestialBody::ALL.iter().enumerate() {
            assert_eq!(body.code() as usize, i);
            assert_eq!(CelestialBody::from_code(i as u8), Some(*body));
        }
        assert_eq!(CelestialBody::from_code(16), None);
        assert_eq!(CelestialBody::Sun.code(), 0);
        assert_eq!(CelestialBody::Pluto.code(), 10);
        assert_eq!(CelestialBody::Night.code(), 15);
    }

    #[rstest]
    #[case("sun", CelestialBody::Sun)]
    #[case("MOON", CelestialBody::Moon)]
    #[case(" Jupiter ", CelestialBody::Jupiter)]
    #[case("civil-twilight", CelestialBody::CivilTwilight)]
    #[case("Day Night", CelestialBody::DayNight)]
    #[case("2", CelestialBody::Moon)]
    fn test_parse(#[case] text: &str, #[case] expected: CelestialBody) {
        assert_eq!(text.parse::<CelestialBody>(), Ok(expected));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "vulcan".parse::<CelestialBody>(),
            Err(UnknownBody("vulcan".to_string()))
        );
        assert!("99".parse::<CelestialBody>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for body in CelestialBody::ALL {
            assert_eq!(body.to_string().parse::<CelestialBody>(), Ok(body));
        }
    }

    #[test]
    fn test_positional_members() {
        let positional: Vec<_> = CelestialBody::ALL
            .iter()
            .filter(|b| b.is_positional())
            .collect();
        assert_eq!(positional.len(), 11);
        assert!(!CelestialBody::Night.is_positional());
        assert_eq!(CelestialBody::Moon.naif_ids(), &[301]);
        assert_eq!(CelestialBody::Saturn.naif_ids(), &[699, 6]);
    }
}
