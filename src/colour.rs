/// A colour, expressed in RGB or CMYK colour spaces
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceCMYK colour; c, m, y, and k range from 0.0 to 1.0
    CMYK { c: f32, m: f32, y: f32, k: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// Parse a CSS-style `#rrggbb` or `#rgb` colour, as found in inline `style`
    /// attributes of letter bodies
    pub fn from_hex(hex: &str) -> Option<Colour> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Colour::new_rgb_bytes(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Some(Colour::new_rgb_bytes(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };

    /// Hyperlinked text and its underline
    pub const LINK: Colour = Colour::RGB {
        r: 0.0,
        g: 0.2,
        b: 0.8,
    };
    /// Background of `<mark>` runs
    pub const HIGHLIGHT: Colour = Colour::RGB {
        r: 1.0,
        g: 0.95,
        b: 0.4,
    };
    /// Approved reviewer decisions
    pub const APPROVED: Colour = Colour::RGB {
        r: 0.0,
        g: 0.5,
        b: 0.0,
    };
    /// Pending or rejected reviewer decisions
    pub const NOT_APPROVED: Colour = Colour::RGB {
        r: 0.5,
        g: 0.0,
        b: 0.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(Colour::from_hex("#ff0000"), Some(Colour::new_rgb(1.0, 0.0, 0.0)));
        assert_eq!(Colour::from_hex("0f0"), Some(Colour::new_rgb(0.0, 1.0, 0.0)));
        assert_eq!(Colour::from_hex("#12"), None);
        assert_eq!(Colour::from_hex("#zzzzzz"), None);
    }
}
