use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Color – an sRGB triple that serializes as "#rrggbb"
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Srgb<u8>);

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Color(Srgb {
            red,
            green,
            blue,
            standard: PhantomData,
        })
    }

    pub const GRAY: Color = Color::rgb(0x80, 0x80, 0x80);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

// ---------------------------------------------------------------------------
// Fixed styling
// ---------------------------------------------------------------------------

pub const MALE: Color = Color::rgb(0x1f, 0x3b, 0x73);
pub const FEMALE: Color = Color::rgb(0x4b, 0x1f, 0x62);

/// Two-colour rule for the gender chart: dark blue for men, dark purple for
/// women, grey for anything else.
pub fn sex_color(sex: &str) -> Color {
    match sex {
        "Male" => MALE,
        "Female" => FEMALE,
        _ => Color::GRAY,
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color(rgb.into_format::<u8>())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color
// ---------------------------------------------------------------------------

/// Maps the distinct values of one column to distinct colours. Built from
/// the whole dataset so a category keeps its colour under any filter.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color>,
    default_color: Color,
}

impl ColorMap {
    pub fn new(unique_values: &BTreeSet<String>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color::GRAY,
        }
    }

    pub fn color_for(&self, value: &str) -> Color {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sex_colors() {
        assert_eq!(sex_color("Male").hex(), "#1f3b73");
        assert_eq!(sex_color("Female").hex(), "#4b1f62");
        assert_eq!(sex_color("M"), Color::GRAY);
    }

    #[test]
    fn palette_is_distinct() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn first_palette_entry_is_red_hue() {
        let Color(c) = generate_palette(3)[0];
        assert!(c.red > c.green && c.red > c.blue);
    }

    #[test]
    fn color_map_falls_back_to_gray() {
        let values: BTreeSet<String> = ["Eng", "Sales"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::new(&values);
        assert_ne!(map.color_for("Eng"), map.color_for("Sales"));
        assert_eq!(map.color_for("Legal"), Color::GRAY);
    }

    #[test]
    fn serializes_as_hex() {
        let json = serde_json::to_string(&MALE).unwrap();
        assert_eq!(json, "\"#1f3b73\"");
    }
}
