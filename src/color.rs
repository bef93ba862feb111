//! Hex color strings.

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Parses `RGB`, `RRGGBB` or `RRGGBBAA`, with an optional leading `#`.
    ///
    /// Three-digit colors expand each digit (`f` becomes `ff`). Colors without
    /// an alpha component are opaque.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        let nibbles: Vec<u8> = digits
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;

        let byte = |at: usize| (nibbles[at] << 4) | nibbles[at + 1];
        match nibbles.len() {
            3 => Some(Self {
                r: nibbles[0] * 17,
                g: nibbles[1] * 17,
                b: nibbles[2] * 17,
                a: 255,
            }),
            6 => Some(Self {
                r: byte(0),
                g: byte(2),
                b: byte(4),
                a: 255,
            }),
            8 => Some(Self {
                r: byte(0),
                g: byte(2),
                b: byte(4),
                a: byte(6),
            }),
            _ => None,
        }
    }
}

/// A floating point RGBA color in linear space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearColor {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl From<Color> for LinearColor {
    /// Converts through the sRGB transfer curve; alpha stays linear.
    fn from(color: Color) -> Self {
        Self {
            r: srgb_to_linear(color.r),
            g: srgb_to_linear(color.g),
            b: srgb_to_linear(color.b),
            a: f32::from(color.a) / 255.0,
        }
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
