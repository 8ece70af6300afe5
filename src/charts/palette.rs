//! Colour palettes used by each chart kind.

use plotters::style::RGBColor;

pub const SET2: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

pub const PASTEL: [RGBColor; 10] = [
    RGBColor(161, 201, 244),
    RGBColor(255, 180, 130),
    RGBColor(141, 229, 161),
    RGBColor(255, 159, 155),
    RGBColor(208, 187, 255),
    RGBColor(222, 187, 155),
    RGBColor(250, 176, 228),
    RGBColor(207, 207, 207),
    RGBColor(255, 254, 163),
    RGBColor(185, 242, 240),
];

pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub const VIRIDIS: [RGBColor; 6] = [
    RGBColor(68, 1, 84),
    RGBColor(65, 68, 135),
    RGBColor(42, 120, 142),
    RGBColor(34, 168, 132),
    RGBColor(122, 209, 81),
    RGBColor(253, 231, 37),
];

pub const MUTED: [RGBColor; 10] = [
    RGBColor(72, 120, 208),
    RGBColor(238, 133, 74),
    RGBColor(106, 204, 100),
    RGBColor(214, 95, 95),
    RGBColor(149, 108, 180),
    RGBColor(140, 97, 60),
    RGBColor(220, 126, 192),
    RGBColor(121, 121, 121),
    RGBColor(213, 187, 103),
    RGBColor(130, 198, 226),
];

pub const TAB20: [RGBColor; 20] = [
    RGBColor(31, 119, 180),
    RGBColor(174, 199, 232),
    RGBColor(255, 127, 14),
    RGBColor(255, 187, 120),
    RGBColor(44, 160, 44),
    RGBColor(152, 223, 138),
    RGBColor(214, 39, 40),
    RGBColor(255, 152, 150),
    RGBColor(148, 103, 189),
    RGBColor(197, 176, 213),
    RGBColor(140, 86, 75),
    RGBColor(196, 156, 148),
    RGBColor(227, 119, 194),
    RGBColor(247, 182, 210),
    RGBColor(127, 127, 127),
    RGBColor(199, 199, 199),
    RGBColor(188, 189, 34),
    RGBColor(219, 219, 141),
    RGBColor(23, 190, 207),
    RGBColor(158, 218, 229),
];

pub const SET3: [RGBColor; 12] = [
    RGBColor(141, 211, 199),
    RGBColor(255, 255, 179),
    RGBColor(190, 186, 218),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
    RGBColor(217, 217, 217),
    RGBColor(188, 128, 189),
    RGBColor(204, 235, 197),
    RGBColor(255, 237, 111),
];

pub const DODGER_BLUE: RGBColor = RGBColor(30, 144, 255);

/// Anchors of the diverging blue-to-red map, evenly spaced over [-1, 1].
const COOLWARM: [(u8, u8, u8); 5] = [
    (59, 76, 192),
    (141, 176, 254),
    (221, 221, 221),
    (244, 154, 123),
    (180, 4, 38),
];

/// Colour at `index`, wrapping around the palette.
pub fn pick(palette: &[RGBColor], index: usize) -> RGBColor {
    palette[index % palette.len()]
}

/// Diverging colour for a correlation in [-1, 1]; NaN maps to the neutral midpoint.
pub fn coolwarm(value: f64) -> RGBColor {
    let t = if value.is_nan() {
        0.5
    } else {
        (value.clamp(-1.0, 1.0) + 1.0) / 2.0
    };
    let scaled = t * (COOLWARM.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(COOLWARM.len() - 2);
    let frac = scaled - lower as f64;
    let (a, b) = (COOLWARM[lower], COOLWARM[lower + 1]);
    let mix = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Dark text on light cells, white text on saturated ones.
pub fn text_on(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 150.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolwarm_hits_anchors() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(f64::NAN), coolwarm(0.0));
        assert_eq!(coolwarm(5.0), coolwarm(1.0));
    }

    #[test]
    fn pick_wraps() {
        assert_eq!(pick(&SET2, 8), SET2[0]);
        assert_eq!(pick(&TAB20, 21), TAB20[1]);
    }

    #[test]
    fn annotation_contrast() {
        assert_eq!(text_on(coolwarm(0.0)), RGBColor(0, 0, 0));
        assert_eq!(text_on(coolwarm(1.0)), RGBColor(255, 255, 255));
    }
}
