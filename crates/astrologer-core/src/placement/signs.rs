//! Zodiac signs and their traditional classifications.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ephemeris::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Cardinal,
    Fixed,
    Mutable,
}

const SIGNS: [ZodiacSign; 12] = [
    ZodiacSign::Aries,
    ZodiacSign::Taurus,
    ZodiacSign::Gemini,
    ZodiacSign::Cancer,
    ZodiacSign::Leo,
    ZodiacSign::Virgo,
    ZodiacSign::Libra,
    ZodiacSign::Scorpio,
    ZodiacSign::Sagittarius,
    ZodiacSign::Capricorn,
    ZodiacSign::Aquarius,
    ZodiacSign::Pisces,
];

impl ZodiacSign {
    /// Sign from a 0-based index, wrapping past Pisces
    pub fn from_index(index: u8) -> Self {
        SIGNS[usize::from(index % 12)]
    }

    /// 0-based index, Aries = 0
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    /// Three-letter abbreviation ("Ari", "Tau", ...)
    pub fn abbreviation(&self) -> &'static str {
        &self.name()[..3]
    }

    pub fn symbol(&self) -> &'static str {
        const SYMBOLS: [&str; 12] = [
            "♈", "♉", "♊", "♋", "♌", "♍", "♎", "♏", "♐", "♑", "♒", "♓",
        ];
        SYMBOLS[usize::from(self.index())]
    }

    pub fn element(&self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    pub fn quality(&self) -> Quality {
        match self.index() % 3 {
            0 => Quality::Cardinal,
            1 => Quality::Fixed,
            _ => Quality::Mutable,
        }
    }

    /// Planetary ruler, traditional or with the modern outer-planet rulers
    pub fn ruler(&self, modern: bool) -> Point {
        match self {
            ZodiacSign::Aries => Point::Mars,
            ZodiacSign::Taurus | ZodiacSign::Libra => Point::Venus,
            ZodiacSign::Gemini | ZodiacSign::Virgo => Point::Mercury,
            ZodiacSign::Cancer => Point::Moon,
            ZodiacSign::Leo => Point::Sun,
            ZodiacSign::Scorpio if modern => Point::Pluto,
            ZodiacSign::Scorpio => Point::Mars,
            ZodiacSign::Sagittarius => Point::Jupiter,
            ZodiacSign::Capricorn => Point::Saturn,
            ZodiacSign::Aquarius if modern => Point::Uranus,
            ZodiacSign::Aquarius => Point::Saturn,
            ZodiacSign::Pisces if modern => Point::Neptune,
            ZodiacSign::Pisces => Point::Jupiter,
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sign index and degree within the sign for a longitude in [0, 360).
///
/// `30 * index + degree` reproduces the input exactly.
pub fn sign_of(longitude: f64) -> (ZodiacSign, f64) {
    let index = (longitude / 30.0).floor().clamp(0.0, 11.0);
    let degree = longitude - 30.0 * index;
    (ZodiacSign::from_index(index as u8), degree)
}
