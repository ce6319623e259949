//! RGBA color with CSS-style parsing

use crate::error::{LumenError, Result};
use crate::rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGBA color. Hashable so it can key render batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Hue in degrees, saturation and lightness in percent
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = (s / 100.0).clamp(0.0, 1.0);
        let l = (l / 100.0).clamp(0.0, 1.0);

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };
        Self::rgb(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b))
    }

    /// Random HSL color inside the given (min, max) ranges
    pub fn random_hsl(
        rng: &mut Rng,
        hue: (f32, f32),
        saturation: (f32, f32),
        lightness: (f32, f32),
    ) -> Self {
        let h = rng.range(hue.0, hue.1);
        let s = rng.range(saturation.0, saturation.1);
        let l = rng.range(lightness.0, lightness.1);
        Self::from_hsl(h, s, l)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: unit_to_u8(alpha),
            ..self
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Components as floats in [0, 1]
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| invalid(&s));
        }
        if let Some(args) = function_args(&s, "rgba").or_else(|| function_args(&s, "rgb")) {
            return parse_rgb_args(&args).ok_or_else(|| invalid(&s));
        }
        if let Some(args) = function_args(&s, "hsla").or_else(|| function_args(&s, "hsl")) {
            return parse_hsl_args(&args).ok_or_else(|| invalid(&s));
        }
        named(&s).ok_or_else(|| invalid(&s))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = LumenError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

fn invalid(s: &str) -> LumenError {
    LumenError::InvalidParameter(format!("unrecognized color '{s}'"))
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = digit(0)? * 17;
            let g = digit(1)? * 17;
            let b = digit(2)? * 17;
            let a = if hex.len() == 4 { digit(3)? * 17 } else { 255 };
            Some(Color::rgba(r, g, b, a))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { pair(6)? } else { 255 };
            Some(Color::rgba(pair(0)?, pair(2)?, pair(4)?, a))
        }
        _ => None,
    }
}

fn function_args(s: &str, name: &str) -> Option<Vec<String>> {
    let inner = s.strip_prefix(name)?.trim_start().strip_prefix('(')?;
    let inner = inner.strip_suffix(')')?;
    Some(
        inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Parses `50%` as 0.5 scaled to `full`, plain numbers as-is
fn component(token: &str, full: f32) -> Option<f32> {
    match token.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok().map(|v| v / 100.0 * full),
        None => token.parse::<f32>().ok(),
    }
}

fn alpha_arg(args: &[String]) -> Option<f32> {
    match args.get(3) {
        Some(a) => component(a, 1.0),
        None => Some(1.0),
    }
}

fn parse_rgb_args(args: &[String]) -> Option<Color> {
    if args.len() < 3 {
        return None;
    }
    let channel = |t: &str| component(t, 255.0).map(|v| v.round().clamp(0.0, 255.0) as u8);
    Some(Color::rgba(
        channel(&args[0])?,
        channel(&args[1])?,
        channel(&args[2])?,
        unit_to_u8(alpha_arg(args)?),
    ))
}

fn parse_hsl_args(args: &[String]) -> Option<Color> {
    if args.len() < 3 {
        return None;
    }
    let h = args[0].trim_end_matches("deg").parse::<f32>().ok()?;
    let s = args[1].trim_end_matches('%').parse::<f32>().ok()?;
    let l = args[2].trim_end_matches('%').parse::<f32>().ok()?;
    Some(Color::from_hsl(h, s, l).with_alpha(alpha_arg(args)?))
}

fn named(s: &str) -> Option<Color> {
    Some(match s {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_forms() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#FF8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(
            Color::parse("#11223344").unwrap(),
            Color::rgba(0x11, 0x22, 0x33, 0x44)
        );
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#ggg").is_err());
    }

    #[test]
    fn parse_functional_forms() {
        assert_eq!(Color::parse("rgb(10, 20, 30)").unwrap(), Color::rgb(10, 20, 30));
        assert_eq!(
            Color::parse("rgba(255,0,0,0.5)").unwrap(),
            Color::rgba(255, 0, 0, 128)
        );
        assert_eq!(Color::parse("hsl(0, 100%, 50%)").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::parse("hsl(120 100% 50%)").unwrap(), Color::rgb(0, 255, 0));
        assert_eq!(Color::parse(" White ").unwrap(), Color::WHITE);
        assert!(Color::parse("transparent").unwrap().is_transparent());
        assert!(Color::parse("rgb(1,2)").is_err());
        assert!(Color::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn hsl_grayscale_and_wraparound() {
        assert_eq!(Color::from_hsl(200.0, 0.0, 50.0), Color::rgb(128, 128, 128));
        assert_eq!(Color::from_hsl(360.0, 100.0, 50.0), Color::from_hsl(0.0, 100.0, 50.0));
    }

    #[test]
    fn display_round_trips_through_serde() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(c.to_string(), "#01020304");
        assert_eq!(Color::rgb(255, 0, 16).to_string(), "#ff0010");

        #[derive(Serialize, Deserialize)]
        struct Holder {
            color: Color,
        }
        let holder: Holder = toml::from_str("color = \"#00ff00\"").unwrap();
        assert_eq!(holder.color, Color::rgb(0, 255, 0));
        let bad: std::result::Result<Holder, _> = toml::from_str("color = \"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn random_hsl_stays_in_lightness_range() {
        let mut rng = Rng::new(5);
        for _ in 0..50 {
            let c = Color::random_hsl(&mut rng, (0.0, 360.0), (60.0, 100.0), (40.0, 80.0));
            assert_eq!(c.a, 255);
            let max = c.r.max(c.g).max(c.b);
            assert!(max > 0);
        }
    }
}
