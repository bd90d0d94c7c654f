//! Conversions between packed ARGB colors and CSS color strings.

use csscolorparser::Color as CssColor;
use std::str::FromStr;

/// Parse a CSS color string into a packed `0xAARRGGBB` value.
///
/// Accepts anything `csscolorparser` understands (`#rgb`, `#rrggbb`,
/// `#rrggbbaa`, `rgb(...)`, named colors). Returns `None` for empty or
/// unparseable input.
pub fn parse_color(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let c = CssColor::from_str(value).ok()?;
    let r = (c.r * 255.0).round().clamp(0.0, 255.0) as u32;
    let g = (c.g * 255.0).round().clamp(0.0, 255.0) as u32;
    let b = (c.b * 255.0).round().clamp(0.0, 255.0) as u32;
    let a = (c.a * 255.0).round().clamp(0.0, 255.0) as u32;
    Some((a << 24) | (r << 16) | (g << 8) | b)
}

/// Format a packed `0xAARRGGBB` color as a CSS hex string.
///
/// Produces `#rrggbbaa` when `with_alpha` is set and the color is not fully
/// opaque, `#rrggbb` otherwise.
pub fn format_color(argb: u32, with_alpha: bool) -> String {
    let a = argb >> 24;
    let rgb = argb & 0x00FF_FFFF;
    if with_alpha && a != 0xFF {
        format!("#{rgb:06x}{a:02x}")
    } else {
        format!("#{rgb:06x}")
    }
}
