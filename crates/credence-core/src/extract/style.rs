//! Styling analysis shared by the markup and DOCX readers.
//!
//! Decides whether a set of style declarations suppresses rendering, and
//! records which technique was used.

use serde::{Deserialize, Serialize};

/// A technique that keeps text out of the rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylingTechnique {
    ZeroOpacity,
    BackgroundColor,
    MicroscopicFont,
    OffCanvas,
    ZeroLineHeight,
    DisplayNone,
    VisibilityHidden,
    HiddenAttribute,
    VanishedRun,
}

impl StylingTechnique {
    /// Techniques that only make sense as a deliberate attempt to hide text
    /// from a human reader while keeping it machine-readable.
    pub fn is_steganographic(&self) -> bool {
        matches!(
            self,
            StylingTechnique::ZeroOpacity
                | StylingTechnique::BackgroundColor
                | StylingTechnique::MicroscopicFont
                | StylingTechnique::OffCanvas
                | StylingTechnique::ZeroLineHeight
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StylingTechnique::ZeroOpacity => "near_zero_opacity",
            StylingTechnique::BackgroundColor => "near_background_color",
            StylingTechnique::MicroscopicFont => "microscopic_font",
            StylingTechnique::OffCanvas => "off_canvas_position",
            StylingTechnique::ZeroLineHeight => "zero_line_height",
            StylingTechnique::DisplayNone => "display_none",
            StylingTechnique::VisibilityHidden => "visibility_hidden",
            StylingTechnique::HiddenAttribute => "hidden_attribute",
            StylingTechnique::VanishedRun => "vanished_run",
        }
    }
}

/// One suppressing declaration found in the styling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleHint {
    pub technique: StylingTechnique,
    /// The declaration as written (e.g. `opacity: 0.01`)
    pub declaration: String,
    /// Element or run the declaration applies to
    pub element: String,
    /// First characters of the text under the element
    pub text_preview: String,
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `#fff`, `#ffffff`, `rgb(…)`, `rgba(…)` or a few named colors.
    pub fn parse(value: &str) -> Option<Rgb> {
        let v = value.trim().to_ascii_lowercase();
        let v = v.trim_end_matches("!important").trim();

        if let Some(hex) = v.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        if let Some(inner) = v
            .strip_prefix("rgba(")
            .or_else(|| v.strip_prefix("rgb("))
            .and_then(|s| s.strip_suffix(')'))
        {
            let parts: Vec<&str> = inner.split(',').map(|p| p.trim()).collect();
            if parts.len() < 3 {
                return None;
            }
            let channel = |p: &str| p.parse::<f64>().ok().map(|c| c.clamp(0.0, 255.0) as u8);
            return Some(Rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?));
        }

        match v {
            "white" | "snow" | "ivory" | "ghostwhite" | "whitesmoke" => Some(Rgb::WHITE),
            "black" => Some(Rgb(0, 0, 0)),
            "transparent" => None,
            _ => None,
        }
    }

    /// Parse a bare hex color as used by DOCX (`FFFFFF`) or CSS (`fff`).
    pub fn parse_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim();
        let expand = |c: char| c.to_digit(16).map(|d| (d * 17) as u8);
        match hex.len() {
            3 => {
                let mut chars = hex.chars();
                Some(Rgb(expand(chars.next()?)?, expand(chars.next()?)?, expand(chars.next()?)?))
            }
            6 | 8 => {
                let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
                Some(Rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => None,
        }
    }

    /// Largest per-channel difference.
    pub fn distance(&self, other: &Rgb) -> u8 {
        let d = |a: u8, b: u8| a.abs_diff(b);
        d(self.0, other.0).max(d(self.1, other.1)).max(d(self.2, other.2))
    }

    pub fn is_near(&self, other: &Rgb) -> bool {
        self.distance(other) <= NEAR_COLOR_DISTANCE
    }
}

/// Colors closer than this on every channel are indistinguishable to a reader.
const NEAR_COLOR_DISTANCE: u8 = 16;

/// Split an inline style attribute into lowercase (property, value) pairs.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            if prop.is_empty() || value.is_empty() {
                None
            } else {
                Some((prop, value))
            }
        })
        .collect()
}

/// Parse a CSS length into pixels. Only absolute units and bare numbers.
fn length_px(value: &str) -> Option<f64> {
    let v = value.trim().trim_end_matches("!important").trim();
    let (number, factor) = if let Some(n) = v.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = v.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else if let Some(n) = v.strip_suffix("em").or_else(|| v.strip_suffix("rem")) {
        (n, 16.0)
    } else if let Some(n) = v.strip_suffix('%') {
        (n, 0.16)
    } else {
        (v, 1.0)
    };
    number.trim().parse::<f64>().ok().map(|n| n * factor)
}

/// Result of analysing one element's declarations.
#[derive(Debug, Default)]
pub struct Suppression {
    pub techniques: Vec<(StylingTechnique, String)>,
    /// Background declared on this element, inherited by its children
    pub background: Option<Rgb>,
}

impl Suppression {
    pub fn hides(&self) -> bool {
        !self.techniques.is_empty()
    }
}

/// Inspect declarations for rendering suppression.
///
/// `inherited_background` is the nearest declared ancestor background
/// (white when nothing is declared).
pub fn analyse(declarations: &[(String, String)], inherited_background: Rgb) -> Suppression {
    let mut result = Suppression::default();

    for (prop, value) in declarations {
        if prop == "background-color" || prop == "background" {
            if let Some(bg) = value.split_whitespace().find_map(Rgb::parse) {
                result.background = Some(bg);
            }
        }
    }

    let background = result.background.unwrap_or(inherited_background);
    let mut overflow_hidden = false;
    let mut zero_line_height: Option<String> = None;

    for (prop, value) in declarations {
        let decl = format!("{}: {}", prop, value);
        let technique = match prop.as_str() {
            "display" if value.starts_with("none") => Some(StylingTechnique::DisplayNone),
            "visibility" if value.starts_with("hidden") || value.starts_with("collapse") => {
                Some(StylingTechnique::VisibilityHidden)
            }
            "opacity" => value
                .trim_end_matches("!important")
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|o| *o <= 0.05)
                .map(|_| StylingTechnique::ZeroOpacity),
            "color" => Rgb::parse(value)
                .filter(|c| c.is_near(&background))
                .map(|_| StylingTechnique::BackgroundColor),
            "font-size" => length_px(value)
                .filter(|px| *px <= 1.0)
                .map(|_| StylingTechnique::MicroscopicFont),
            "left" | "top" | "right" | "margin-left" | "margin-top" | "text-indent" => length_px(value)
                .filter(|px| *px <= -999.0)
                .map(|_| StylingTechnique::OffCanvas),
            "line-height" => {
                if length_px(value).map_or(false, |px| px <= 0.0) {
                    zero_line_height = Some(decl.clone());
                }
                None
            }
            "overflow" if value.starts_with("hidden") => {
                overflow_hidden = true;
                None
            }
            _ => None,
        };

        if let Some(t) = technique {
            result.techniques.push((t, decl));
        }
    }

    if let (Some(decl), true) = (zero_line_height, overflow_hidden) {
        result.techniques.push((StylingTechnique::ZeroLineHeight, decl));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls(style: &str) -> Vec<(String, String)> {
        parse_declarations(style)
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("#FEFEFE"), Some(Rgb(254, 254, 254)));
        assert_eq!(Rgb::parse("rgb(255, 255, 250)"), Some(Rgb(255, 255, 250)));
        assert_eq!(Rgb::parse("white"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("transparent"), None);
    }

    #[test]
    fn test_white_on_white_is_hidden() {
        let s = analyse(&decls("color: #ffffff"), Rgb::WHITE);
        assert!(s.hides());
        assert_eq!(s.techniques[0].0, StylingTechnique::BackgroundColor);
    }

    #[test]
    fn test_white_on_dark_background_is_visible() {
        let s = analyse(&decls("color: #fff; background-color: #222"), Rgb::WHITE);
        assert!(!s.hides());
        assert_eq!(s.background, Some(Rgb(0x22, 0x22, 0x22)));
    }

    #[test]
    fn test_opacity_and_font_size() {
        assert!(analyse(&decls("opacity:0.01"), Rgb::WHITE).hides());
        assert!(!analyse(&decls("opacity:0.5"), Rgb::WHITE).hides());
        assert!(analyse(&decls("font-size: 0.5px"), Rgb::WHITE).hides());
        assert!(!analyse(&decls("font-size: 12px"), Rgb::WHITE).hides());
    }

    #[test]
    fn test_off_canvas() {
        let s = analyse(&decls("position:absolute; left:-9999px"), Rgb::WHITE);
        assert_eq!(s.techniques[0].0, StylingTechnique::OffCanvas);
    }

    #[test]
    fn test_zero_line_height_needs_overflow_hidden() {
        assert!(!analyse(&decls("line-height: 0"), Rgb::WHITE).hides());
        let s = analyse(&decls("line-height: 0; overflow: hidden"), Rgb::WHITE);
        assert_eq!(s.techniques[0].0, StylingTechnique::ZeroLineHeight);
    }

    #[test]
    fn test_steganographic_classification() {
        assert!(StylingTechnique::ZeroOpacity.is_steganographic());
        assert!(!StylingTechnique::DisplayNone.is_steganographic());
    }
}
