//! # rivernet Colormap
//!
//! Color schemes and value-to-color mapping for rivernet plots.
//!
//! Provides a few predefined color schemes, including matplotlib's Magma used
//! to color channel nodes by steepness, on top of a multi-stop interpolation
//! engine. The main entry point is [`map_values`].
//!
//! ## Usage
//!
//! ```
//! use rivernet_colormap::{auto_params, map_values, ColorScheme};
//!
//! let values = [Some(1.2), None, Some(2.4)];
//! let params = auto_params(&values, ColorScheme::Magma);
//! let colors = map_values(&values, &params);
//! assert_eq!(colors.len(), 3);
//! ```

mod render;
mod scheme;

pub use render::{auto_params, map_values, ColormapParams};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
