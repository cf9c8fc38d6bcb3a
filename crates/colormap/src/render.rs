//! Value-to-color mapping using color schemes.

use crate::scheme::{evaluate, ColorScheme, Rgb};

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Minimum value for normalization. Values below this are clamped.
    pub min: f64,
    /// Maximum value for normalization. Values above this are clamped.
    pub max: f64,
    /// Color for missing or non-finite values.
    pub missing_color: Rgb,
}

impl ColormapParams {
    /// Params over [0, 1]; use [`auto_params`] to fit a data range.
    pub fn new(scheme: ColorScheme) -> Self {
        Self::with_range(scheme, 0.0, 1.0)
    }

    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            missing_color: Rgb::LIGHT_GREY,
        }
    }

    /// Color of a single value.
    pub fn color(&self, value: Option<f64>) -> Rgb {
        match value {
            Some(v) if v.is_finite() => {
                let range = self.max - self.min;
                let inv_range = if range.abs() > f64::EPSILON { 1.0 / range } else { 1.0 };
                evaluate(self.scheme, (v - self.min) * inv_range)
            }
            _ => self.missing_color,
        }
    }
}

/// Fit min/max to the finite values present, returning ready-to-use params.
pub fn auto_params(values: &[Option<f64>], scheme: ColorScheme) -> ColormapParams {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for v in values.iter().flatten().filter(|v| v.is_finite()) {
        min = min.min(*v);
        max = max.max(*v);
    }

    // All missing or constant values
    if !min.is_finite() || !max.is_finite() {
        min = 0.0;
        max = 1.0;
    } else if (max - min).abs() < f64::EPSILON {
        max = min + 1.0;
    }

    ColormapParams::with_range(scheme, min, max)
}

/// Map every value to a color; missing values get `params.missing_color`.
pub fn map_values(values: &[Option<f64>], params: &ColormapParams) -> Vec<Rgb> {
    values.iter().map(|&v| params.color(v)).collect()
}
