//! Chart Style Module
//! Color scales, palettes and the geometry helpers used by the renderer.

use plotters::style::RGBColor;

pub const TREND_LINE: RGBColor = RGBColor(31, 119, 180);
pub const GRID: RGBColor = RGBColor(200, 200, 200);
pub const NAN_CELL: RGBColor = RGBColor(220, 220, 220);

/// Wedge colors, cycled when there are more slices than entries.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Grey
    RGBColor(188, 189, 34),  // Olive
    RGBColor(23, 190, 207),  // Cyan
];

// Viridis anchor points at t = 0, 0.25, 0.5, 0.75, 1
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

// Coolwarm: blue at -1, light grey at 0, red at +1
const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

fn lerp(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Sample the viridis scale at `t` in [0, 1].
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    lerp(VIRIDIS[idx], VIRIDIS[idx + 1], scaled - idx as f64)
}

/// `n` evenly spaced viridis colors, darkest first.
pub fn viridis_palette(n: usize) -> Vec<RGBColor> {
    match n {
        0 => Vec::new(),
        1 => vec![viridis(0.0)],
        _ => (0..n).map(|i| viridis(i as f64 / (n - 1) as f64)).collect(),
    }
}

/// Diverging color for a correlation coefficient in [-1, 1].
pub fn coolwarm(value: f64) -> RGBColor {
    if value.is_nan() {
        return NAN_CELL;
    }
    let v = value.clamp(-1.0, 1.0);
    if v < 0.0 {
        lerp(NEUTRAL, COOL, -v)
    } else {
        lerp(NEUTRAL, WARM, v)
    }
}

/// Dark cells get white annotation text.
pub fn is_dark(color: &RGBColor) -> bool {
    let RGBColor(r, g, b) = *color;
    0.299 * (r as f64) + 0.587 * (g as f64) + 0.114 * (b as f64) < 128.0
}

/// Group digits in thousands: `25000` -> `25,000`.
pub fn format_count(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

/// Angular extent of one pie wedge, degrees counter-clockwise from +x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub start_deg: f64,
    pub sweep_deg: f64,
    pub fraction: f64,
}

impl PieSlice {
    pub fn mid_deg(&self) -> f64 {
        self.start_deg + self.sweep_deg / 2.0
    }

    /// Percentage label with one decimal place.
    pub fn label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

/// Lay out wedges counter-clockwise from `start_deg`.
///
/// Negative values count as zero; an all-zero input yields no slices.
pub fn pie_slices(values: &[f64], start_deg: f64) -> Vec<PieSlice> {
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut angle = start_deg;
    values
        .iter()
        .map(|v| {
            let fraction = v.max(0.0) / total;
            let slice = PieSlice {
                start_deg: angle,
                sweep_deg: fraction * 360.0,
                fraction,
            };
            angle += slice.sweep_deg;
            slice
        })
        .collect()
}

/// Point on a circle in pixel space (y grows downwards).
pub fn polar_point(center: (i32, i32), radius: f64, deg: f64) -> (i32, i32) {
    let rad = deg.to_radians();
    (
        center.0 + (radius * rad.cos()).round() as i32,
        center.1 - (radius * rad.sin()).round() as i32,
    )
}
