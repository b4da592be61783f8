use bytemuck::{Pod, Zeroable};
use std::{fmt, str::FromStr};

/// sRGBA color with 8-bit channels, packed as u32 value (ABGR on little-endian)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Rgba(u32);

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32))
    }

    /// Fully opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn alpha(self) -> u8 {
        ((self.0 >> 24) & 0xff) as u8
    }

    pub const fn blue(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Same color with different alpha
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self::new(self.red(), self.green(), self.blue(), alpha)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub fn to_rgb(self) -> [u8; 3] {
        let [r, g, b, _] = self.to_rgba();
        [r, g, b]
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Rgba({})", self)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        if color.starts_with('#') && (color.len() == 7 || color.len() == 9) {
            // #RRGGBB(AA)
            let bytes: &[u8] = color[1..].as_ref();
            let digit = |byte| match byte {
                b'A'..=b'F' => Ok(byte - b'A' + 10),
                b'a'..=b'f' => Ok(byte - b'a' + 10),
                b'0'..=b'9' => Ok(byte - b'0'),
                _ => Err(ColorError::HexExpected),
            };
            let mut hex = bytes
                .chunks(2)
                .map(|pair| Ok((digit(pair[0])? << 4) | digit(pair[1])?));
            Ok(Rgba::new(
                hex.next().unwrap_or(Ok(0))?,
                hex.next().unwrap_or(Ok(0))?,
                hex.next().unwrap_or(Ok(0))?,
                hex.next().unwrap_or(Ok(255))?,
            ))
        } else {
            Err(ColorError::HexExpected)
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(color: String) -> Result<Self, Self::Error> {
        color.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

/// Color packed into 16 bits, 5 bits red, 6 bits green, 5 bits blue
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Rgb565 = Rgb565(0x0000);
    pub const GREY: Rgb565 = Rgb565(0x7BEF);
    pub const WHITE: Rgb565 = Rgb565(0xFFFF);
    pub const BLUE: Rgb565 = Rgb565(0x001F);
    pub const GREEN: Rgb565 = Rgb565(0x07E0);
    pub const RED: Rgb565 = Rgb565(0xF800);
    pub const CYAN: Rgb565 = Rgb565(0x07FF);
    pub const MAGENTA: Rgb565 = Rgb565(0xF81F);
    pub const YELLOW: Rgb565 = Rgb565(0xFFE0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self((((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3))
    }

    /// Raw 5-6-5 channel values
    #[inline]
    pub const fn channels(self) -> [u16; 3] {
        [(self.0 >> 11) & 0x1f, (self.0 >> 5) & 0x3f, self.0 & 0x1f]
    }

    #[inline]
    const fn from_channels(r: u16, g: u16, b: u16) -> Self {
        Self((r << 11) | (g << 5) | b)
    }

    /// Expand to 8-bit channels, replicating high bits into the low ones
    pub fn to_rgb(self) -> [u8; 3] {
        let [r, g, b] = self.channels();
        [
            ((r << 3) | (r >> 2)) as u8,
            ((g << 2) | (g >> 4)) as u8,
            ((b << 3) | (b >> 2)) as u8,
        ]
    }

    /// Blend `other` over self with opacity `alpha`
    pub fn blend(self, other: Self, alpha: u8) -> Self {
        match alpha {
            0 => self,
            255 => other,
            _ => {
                let [r0, g0, b0] = self.channels();
                let [r1, g1, b1] = other.channels();
                Self::from_channels(
                    lerp_channel(r0, r1, alpha),
                    lerp_channel(g0, g1, alpha),
                    lerp_channel(b0, b1, alpha),
                )
            }
        }
    }
}

impl From<Rgba> for Rgb565 {
    fn from(color: Rgba) -> Self {
        Self::new(color.red(), color.green(), color.blue())
    }
}

impl fmt::Debug for Rgb565 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb565({:#06x})", self.0)
    }
}

/// `a * b / 255` rounded, for 8-bit fractions
#[inline]
pub fn multiply_u8(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 0x80;
    (((t >> 8) + t) >> 8) as u8
}

/// Interpolate channel value from `p` to `q`, rounded to nearest
#[inline]
fn lerp_channel(p: u16, q: u16, alpha: u8) -> u16 {
    let (p, q, a) = (p as i32, q as i32, alpha as i32);
    let bias = if q > p { 127 } else { -127 };
    (p + ((q - p) * a + bias) / 255) as u16
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    HexExpected,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::HexExpected => {
                write!(f, "Color expected to be #RRGGBB(AA) in hexidemical format")
            }
        }
    }
}

impl std::error::Error for ColorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba() {
        let c = Rgba::new(1, 2, 3, 4);
        assert_eq!([1, 2, 3, 4], c.to_rgba());
        assert_eq!(1, c.red());
        assert_eq!(2, c.green());
        assert_eq!(3, c.blue());
        assert_eq!(4, c.alpha());
        assert_eq!(c.with_alpha(200).alpha(), 200);
        assert_eq!(c.with_alpha(200).to_rgb(), [1, 2, 3]);
    }

    #[test]
    fn test_rgba_parse() -> Result<(), ColorError> {
        assert_eq!(Rgba::new(1, 2, 3, 4), "#01020304".parse::<Rgba>()?);
        assert_eq!(Rgba::new(170, 187, 204, 255), "#aabbcc".parse::<Rgba>()?);
        assert_eq!(Rgba::new(0, 0, 0, 255), "#000000".parse::<Rgba>()?);
        assert_eq!("#aabbcc".parse::<Rgba>()?.to_string(), "#aabbcc");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
        assert!("#abc".parse::<Rgba>().is_err());
        assert!("#gg0000".parse::<Rgba>().is_err());
        Ok(())
    }

    #[test]
    fn test_rgb565_pack() {
        assert_eq!(Rgb565::from(Rgba::rgb(255, 255, 255)), Rgb565::WHITE);
        assert_eq!(Rgb565::from(Rgba::rgb(255, 0, 0)), Rgb565::RED);
        assert_eq!(Rgb565::from(Rgba::rgb(0, 255, 0)), Rgb565::GREEN);
        assert_eq!(Rgb565::from(Rgba::rgb(0, 0, 255)), Rgb565::BLUE);
        assert_eq!(Rgb565::from(Rgba::rgb(0, 255, 255)), Rgb565::CYAN);
        assert_eq!(Rgb565::new(0x80, 0x80, 0x80), Rgb565(0x8410));
        assert_eq!(Rgb565::WHITE.to_rgb(), [255, 255, 255]);
        assert_eq!(Rgb565::RED.to_rgb(), [255, 0, 0]);
        assert_eq!(Rgb565::GREY.channels(), [15, 31, 15]);
    }

    #[test]
    fn test_rgb565_blend() {
        assert_eq!(Rgb565::BLACK.blend(Rgb565::WHITE, 0), Rgb565::BLACK);
        assert_eq!(Rgb565::BLACK.blend(Rgb565::WHITE, 255), Rgb565::WHITE);
        assert_eq!(Rgb565::BLACK.blend(Rgb565::WHITE, 128).channels(), [16, 32, 16]);
        assert_eq!(Rgb565::WHITE.blend(Rgb565::BLACK, 128).channels(), [15, 31, 15]);
        assert_eq!(Rgb565::RED.blend(Rgb565::BLUE, 255), Rgb565::BLUE);
    }

    #[test]
    fn test_multiply_u8() {
        assert_eq!(multiply_u8(255, 255), 255);
        assert_eq!(multiply_u8(255, 17), 17);
        assert_eq!(multiply_u8(0, 200), 0);
        assert_eq!(multiply_u8(128, 128), 64);
        for a in 0..=255u32 {
            for b in [0u32, 1, 77, 128, 254, 255] {
                let expected = ((a * b) as f64 / 255.0).round() as u8;
                assert_eq!(multiply_u8(a as u8, b as u8), expected, "{} * {}", a, b);
            }
        }
    }
}
