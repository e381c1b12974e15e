use panotrail_base::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(Error::InvalidParameter(format!("bad colour: {text}")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| Error::InvalidParameter(format!("bad colour: {text}")))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn gradient(stops: &[Rgb], position: f64) -> Option<Rgb> {
        let (first, rest) = stops.split_first()?;
        if rest.is_empty() {
            return Some(*first);
        }
        let scaled = position.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 1);
        let upper = (lower + 1).min(stops.len() - 1);
        Some(stops[lower].lerp(stops[upper], scaled - lower as f64))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Rgb,
}

impl Stroke {
    pub fn new(width: f32, color: Rgb) -> Self {
        Self { width, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() -> Result<()> {
        assert_eq!(Rgb::from_hex("#ff8000")?, Rgb::new(255, 128, 0));
        assert_eq!(Rgb::from_hex("00FF7f")?, Rgb::new(0, 255, 127));
        assert_eq!(Rgb::new(1, 2, 255).to_hex(), "#0102ff");
        assert!(Rgb::from_hex("#fff").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        Ok(())
    }

    #[test]
    fn gradient_spaces_stops_evenly() {
        let stops = [Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), Rgb::new(0, 0, 255)];
        assert_eq!(Rgb::gradient(&stops, 0.0), Some(stops[0]));
        assert_eq!(Rgb::gradient(&stops, 0.5), Some(stops[1]));
        assert_eq!(Rgb::gradient(&stops, 1.0), Some(stops[2]));
        assert_eq!(Rgb::gradient(&stops, 0.25), Some(Rgb::new(128, 128, 0)));
        assert_eq!(Rgb::gradient(&[], 0.5), None);
        assert_eq!(Rgb::gradient(&stops[..1], 0.7), Some(stops[0]));
    }
}
