//! SVG figures for long profiles and network maps.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use rivernet_algorithms::profile::LongProfile;
use rivernet_colormap::{auto_params, map_values, ColorScheme, ColormapParams, Rgb};
use rivernet_core::node::NodeTable;
use rivernet_core::segment::Segment;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const COLORBAR_SPACE: f64 = 90.0;

pub const DISTANCE_LABEL: &str = "Downchannel distance [km]";
pub const ELEVATION_LABEL: &str = "Elevation [m]";

enum Mark {
    Line {
        points: Vec<(f64, f64)>,
        color: Rgb,
        width: f64,
    },
    Scatter {
        points: Vec<(f64, f64)>,
        colors: Vec<Rgb>,
        radius: f64,
    },
}

impl Mark {
    fn points(&self) -> &[(f64, f64)] {
        match self {
            Mark::Line { points, .. } | Mark::Scatter { points, .. } => points,
        }
    }
}

/// A single x/y plot rendered to SVG.
pub struct Figure {
    title: String,
    x_label: String,
    y_label: String,
    invert_x: bool,
    marks: Vec<Mark>,
    colorbar: Option<(ColormapParams, String)>,
}

impl Figure {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            invert_x: false,
            marks: Vec::new(),
            colorbar: None,
        }
    }

    /// Draw the x axis from high to low values.
    pub fn invert_x(mut self) -> Self {
        self.invert_x = true;
        self
    }

    pub fn line(&mut self, points: Vec<(f64, f64)>, color: Rgb, width: f64) {
        if points.len() > 1 {
            self.marks.push(Mark::Line { points, color, width });
        }
    }

    pub fn scatter(&mut self, points: Vec<(f64, f64)>, colors: Vec<Rgb>, radius: f64) {
        self.marks.push(Mark::Scatter { points, colors, radius });
    }

    pub fn colorbar(&mut self, params: ColormapParams, label: &str) {
        self.colorbar = Some((params, label.to_string()));
    }

    fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let finite = self
            .marks
            .iter()
            .flat_map(|m| m.points().iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite());
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for &(px, py) in finite {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        (pad(x), pad(y))
    }

    /// Render the figure as an SVG document.
    pub fn to_svg(&self) -> String {
        let ((x0, x1), (y0, y1)) = self.bounds();
        let right = if self.colorbar.is_some() {
            MARGIN_RIGHT + COLORBAR_SPACE
        } else {
            MARGIN_RIGHT
        };
        let plot_w = WIDTH - MARGIN_LEFT - right;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let invert = self.invert_x;
        let sx = |x: f64| {
            let t = (x - x0) / (x1 - x0);
            let u = if invert { 1.0 - t } else { t };
            MARGIN_LEFT + u * plot_w
        };
        let sy = |y: f64| MARGIN_TOP + (y1 - y) / (y1 - y0) * plot_h;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="30" font-size="18" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            escape(&self.title)
        );

        // ─── Axes and ticks ───
        let _ = writeln!(
            svg,
            r#"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w:.1}" height="{plot_h:.1}" fill="none" stroke="black"/>"#
        );
        for t in ticks(x0, x1) {
            let px = sx(t);
            let base = MARGIN_TOP + plot_h;
            let _ = writeln!(
                svg,
                r#"<line x1="{px:.1}" y1="{base:.1}" x2="{px:.1}" y2="{:.1}" stroke="black"/><text x="{px:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
                base + 5.0,
                base + 18.0,
                format_tick(t)
            );
        }
        for t in ticks(y0, y1) {
            let py = sy(t);
            let _ = writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{py:.1}" x2="{MARGIN_LEFT}" y2="{py:.1}" stroke="black"/><text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 5.0,
                MARGIN_LEFT - 8.0,
                py + 4.0,
                format_tick(t)
            );
        }
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="13" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            HEIGHT - 15.0,
            escape(&self.x_label)
        );
        let _ = writeln!(
            svg,
            r#"<text x="20" y="{:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 20 {:.1})">{}</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0,
            escape(&self.y_label)
        );

        // ─── Data ───
        for mark in &self.marks {
            match mark {
                Mark::Line { points, color, width } => {
                    let coords: Vec<String> = points
                        .iter()
                        .filter(|(x, y)| x.is_finite() && y.is_finite())
                        .map(|&(x, y)| format!("{:.2},{:.2}", sx(x), sy(y)))
                        .collect();
                    let _ = writeln!(
                        svg,
                        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round"/>"#,
                        coords.join(" "),
                        color,
                        width
                    );
                }
                Mark::Scatter { points, colors, radius } => {
                    for (&(x, y), color) in points.iter().zip(colors) {
                        if x.is_finite() && y.is_finite() {
                            let _ = writeln!(
                                svg,
                                r#"<circle cx="{:.2}" cy="{:.2}" r="{radius}" fill="{color}"/>"#,
                                sx(x),
                                sy(y)
                            );
                        }
                    }
                }
            }
        }

        if let Some((params, label)) = &self.colorbar {
            write_colorbar(&mut svg, params, label, WIDTH - right + 20.0, plot_h);
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write the figure to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_svg()).with_context(|| format!("Failed to write plot {}", path.display()))
    }
}

fn write_colorbar(svg: &mut String, params: &ColormapParams, label: &str, x: f64, plot_h: f64) {
    const STEPS: usize = 50;
    let step_h = plot_h / STEPS as f64;
    for i in 0..STEPS {
        let t = 1.0 - (i as f64 + 0.5) / STEPS as f64;
        let value = params.min + t * (params.max - params.min);
        let _ = writeln!(
            svg,
            r#"<rect x="{x:.1}" y="{:.2}" width="16" height="{:.2}" fill="{}"/>"#,
            MARGIN_TOP + i as f64 * step_h,
            step_h + 0.5,
            params.color(Some(value))
        );
    }
    for (value, y) in [(params.max, MARGIN_TOP), (params.min, MARGIN_TOP + plot_h)] {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="11">{}</text>"#,
            x + 20.0,
            y + 4.0,
            format_tick(value)
        );
    }
    let cy = MARGIN_TOP + plot_h / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{cy:.1}" font-size="12" text-anchor="middle" transform="rotate(90 {:.1} {cy:.1})">{}</text>"#,
        x + 50.0,
        x + 50.0,
        escape(label)
    );
}

fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    (lo - span * 0.03, hi + span * 0.03)
}

/// Round tick positions (1, 2 or 5 times a power of ten) inside [lo, hi].
fn ticks(lo: f64, hi: f64) -> Vec<f64> {
    let raw = (hi - lo) / 6.0;
    if !raw.is_finite() || raw <= 0.0 {
        return Vec::new();
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    let mut t = (lo / step).ceil() * step;
    let mut out = Vec::new();
    while t <= hi && out.len() < 20 {
        out.push(t);
        t += step;
    }
    out
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ─── Figures ────────────────────────────────────────────────────────────

fn profile_points(profile: &LongProfile) -> Vec<(f64, f64)> {
    profile.points.iter().map(|p| (p.distance_km, p.elevation)).collect()
}

fn map_points(profile: &LongProfile) -> Vec<(f64, f64)> {
    profile.points.iter().map(|p| (p.longitude, p.latitude)).collect()
}

fn segment_profiles(segments: &[Segment], nodes: &NodeTable) -> Result<Vec<LongProfile>> {
    segments
        .iter()
        .map(|s| LongProfile::for_segment(s, nodes).context("Failed to read segment nodes"))
        .collect()
}

/// Long profile of the path alone.
pub fn path_long_profile(path: &LongProfile, title: &str) -> Figure {
    let mut fig = Figure::new(title, DISTANCE_LABEL, ELEVATION_LABEL).invert_x();
    fig.line(profile_points(path), Rgb::BLACK, 3.0);
    fig
}

/// Every channel in grey with the path drawn over it in black.
pub fn all_channel_long_profile(segments: &[Segment], nodes: &NodeTable, path: &LongProfile, title: &str) -> Result<Figure> {
    let mut fig = Figure::new(title, DISTANCE_LABEL, ELEVATION_LABEL).invert_x();
    for profile in segment_profiles(segments, nodes)? {
        fig.line(profile_points(&profile), Rgb::GREY, 1.0);
    }
    fig.line(profile_points(path), Rgb::BLACK, 4.0);
    Ok(fig)
}

/// Every channel in grey with path nodes colored by log10 of m_chi.
pub fn ksn_long_profile(segments: &[Segment], nodes: &NodeTable, path: &LongProfile, title: &str) -> Result<Figure> {
    let mut fig = Figure::new(title, DISTANCE_LABEL, ELEVATION_LABEL).invert_x();
    for profile in segment_profiles(segments, nodes)? {
        fig.line(profile_points(&profile), Rgb::GREY, 1.0);
    }
    let log_ksn = path.log_ksn();
    let params = auto_params(&log_ksn, ColorScheme::Magma);
    fig.scatter(profile_points(path), map_values(&log_ksn, &params), 3.0);
    fig.colorbar(params, "log10(ksn)");
    Ok(fig)
}

/// Map view of the whole network with the path highlighted.
pub fn network_map(segments: &[Segment], nodes: &NodeTable, path: &LongProfile, title: &str) -> Result<Figure> {
    let mut fig = Figure::new(title, "Longitude", "Latitude");
    for profile in segment_profiles(segments, nodes)? {
        fig.line(map_points(&profile), Rgb::GREY, 1.0);
    }
    fig.line(map_points(path), Rgb::BLACK, 4.0);
    Ok(fig)
}

/// Map view of the path alone.
pub fn path_map(path: &LongProfile, title: &str) -> Figure {
    let mut fig = Figure::new(title, "Longitude", "Latitude");
    fig.line(map_points(path), Rgb::BLACK, 4.0);
    fig
}
