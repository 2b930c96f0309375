//! Color utility functions shared across the application.
//!
//! Hex parsing for class colors, perceived-brightness classification for
//! label text, and deterministic color generation for new classes.

use crate::constants::LIGHT_COLOR_THRESHOLD;
use crate::render::Color;

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Parse a `#rrggbb` (or `rrggbb`) string into an opaque color.
///
/// Trailing characters after the six hex digits (e.g. an alpha pair) are
/// ignored.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.trim().trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    Some(Color::rgb8(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a color as `#rrggbb`, ignoring alpha.
pub fn to_hex(color: Color) -> String {
    let [r, g, b, _] = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Perceived brightness on a 0-255 scale (weights 0.299/0.587/0.114).
pub fn perceived_brightness(color: Color) -> f32 {
    let [r, g, b, _] = color.to_rgba8();
    (f32::from(r) * 299.0 + f32::from(g) * 587.0 + f32::from(b) * 114.0) / 1000.0
}

/// Whether a background of this color needs dark (black) text.
pub fn is_light(color: Color) -> bool {
    perceived_brightness(color) >= LIGHT_COLOR_THRESHOLD
}

/// Text color that contrasts with the given background.
pub fn contrasting_text_color(background: Color) -> Color {
    if is_light(background) {
        Color::BLACK
    } else {
        Color::WHITE
    }
}

/// Deterministic class color for list position `index`.
///
/// Hues advance by the golden angle so neighbouring classes stay distinct.
pub fn generated_hex_color(index: usize) -> String {
    let hue = (index as f32 * 137.5) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    to_hex(Color::rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_to_rgb_red() {
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((r - 1.0).abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!(b.abs() < 0.01);
    }

    #[test]
    fn test_hsv_to_rgb_blue() {
        let (r, g, b) = hsv_to_rgb(240.0, 1.0, 1.0);
        assert!(r.abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!((b - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#00ff00"), Some(Color::rgb8(0, 255, 0)));
        assert_eq!(parse_hex_color("FF8000"), Some(Color::rgb8(255, 128, 0)));
        assert_eq!(parse_hex_color("#12345678"), Some(Color::rgb8(0x12, 0x34, 0x56)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_hex_roundtrip() {
        assert_eq!(to_hex(Color::rgb8(0xab, 0x01, 0xff)), "#ab01ff");
    }

    #[test]
    fn test_light_dark_threshold() {
        // Pure green: 0.587 * 255 = 149.7 -> dark background, white text
        assert!(!is_light(Color::rgb8(0, 255, 0)));
        assert_eq!(contrasting_text_color(Color::rgb8(0, 255, 0)), Color::WHITE);
        // Gray 155 sits exactly on the threshold -> light
        assert!(is_light(Color::rgb8(155, 155, 155)));
        assert!(!is_light(Color::rgb8(154, 154, 154)));
        assert_eq!(contrasting_text_color(Color::WHITE), Color::BLACK);
    }

    #[test]
    fn test_generated_color_is_valid_hex() {
        for i in 0..16 {
            let hex = generated_hex_color(i);
            assert_eq!(hex.len(), 7);
            assert!(parse_hex_color(&hex).is_some());
        }
    }
}
