//! Color schemes and multi-stop interpolation engine.

use std::fmt;

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const GREY: Self = Self::new(128, 128, 128);
    pub const LIGHT_GREY: Self = Self::new(200, 200, 200);
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// `#rrggbb` form used in SVG attributes.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Black -> Purple -> Orange -> Pale yellow (channel steepness)
    Magma,
}

// ─── Color stop definitions ───────────────────────────────────────────

const MAGMA_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 0, 0, 4),
    ColorStop::new(0.125, 28, 16, 68),
    ColorStop::new(0.250, 79, 18, 123),
    ColorStop::new(0.375, 129, 37, 129),
    ColorStop::new(0.500, 181, 54, 122),
    ColorStop::new(0.625, 229, 80, 100),
    ColorStop::new(0.750, 251, 135, 97),
    ColorStop::new(0.875, 254, 194, 135),
    ColorStop::new(1.000, 252, 253, 191),
];

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let last = stops[stops.len() - 1].color;
    if t.is_nan() || t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return last;
    }
    stops
        .windows(2)
        .find(|w| t <= w[1].t)
        .map(|w| lerp_color(w[0].color, w[1].color, (t - w[0].t) / (w[1].t - w[0].t)))
        .unwrap_or(last)
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Values outside the unit interval clamp to the end colors.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Magma => multi_stop(MAGMA_STOPS, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magma_endpoints() {
        assert_eq!(evaluate(ColorScheme::Magma, 0.0), Rgb::new(0, 0, 4));
        assert_eq!(evaluate(ColorScheme::Magma, 1.0), Rgb::new(252, 253, 191));
        assert_eq!(evaluate(ColorScheme::Magma, 0.5), Rgb::new(181, 54, 122));
    }

    #[test]
    fn interpolates_between_stops() {
        // Halfway between the 0.75 and 0.875 stops.
        assert_eq!(evaluate(ColorScheme::Magma, 0.8125), Rgb::new(253, 165, 116));
    }

    #[test]
    fn clamping_out_of_range() {
        assert_eq!(evaluate(ColorScheme::Magma, -0.5), Rgb::new(0, 0, 4));
        assert_eq!(evaluate(ColorScheme::Magma, 1.5), Rgb::new(252, 253, 191));
        assert_eq!(evaluate(ColorScheme::Magma, f64::NAN), Rgb::new(0, 0, 4));
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#ff0010");
        assert_eq!(Rgb::BLACK.to_string(), "#000000");
    }
}
