use ratatui::style::Color;

/// Fill for geometries with no matching feed record
pub const NO_DATA: Color = Color::Rgb(204, 204, 204);

/// Ten-color categorical palette for country lines
pub const CATEGORY10: [Color; 10] = [
    Color::Rgb(31, 119, 180),
    Color::Rgb(255, 127, 14),
    Color::Rgb(44, 160, 44),
    Color::Rgb(214, 39, 40),
    Color::Rgb(148, 103, 189),
    Color::Rgb(140, 86, 75),
    Color::Rgb(227, 119, 194),
    Color::Rgb(127, 127, 127),
    Color::Rgb(188, 189, 34),
    Color::Rgb(23, 190, 207),
];

/// Orange-red sequential ramp, light to dark
const RAMP: [(u8, u8, u8); 5] = [
    (255, 247, 236),
    (253, 212, 158),
    (252, 141, 89),
    (215, 48, 31),
    (127, 0, 0),
];

pub fn category(idx: usize) -> Color {
    CATEGORY10[idx % CATEGORY10.len()]
}

/// Map `value` in `[0, max]` onto the ramp; values past `max` saturate.
pub fn sequential(value: u64, max: u64) -> Color {
    let t = if max == 0 {
        1.0
    } else {
        (value as f64 / max as f64).clamp(0.0, 1.0)
    };
    ramp_at(t)
}

/// Ramp color at `t` in `[0, 1]`
pub fn ramp_at(t: f64) -> Color {
    let scaled = t.clamp(0.0, 1.0) * (RAMP.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(RAMP.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (RAMP[lo], RAMP[lo + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
