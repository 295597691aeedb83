/// Packed `0x00RRGGBB` pixel value as the backbuffer stores it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    data: u32,
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.data
    }
}

impl Color {
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { data: (r as u32) << 16 | (g as u32) << 8 | b as u32 }
    }

    #[inline(always)] pub fn r(self) -> u8 { ((self.data & Self::R_MASK) >> 16) as u8 }
    #[inline(always)] pub fn g(self) -> u8 { ((self.data & Self::G_MASK) >> 8) as u8 }
    #[inline(always)] pub fn b(self) -> u8 { (self.data & Self::B_MASK) as u8 }

    /// Memory order of the pixel: blue, green, red, padding.
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.data.to_le_bytes()
    }

    pub const R_MASK: u32 = 0x00FF_0000;
    pub const G_MASK: u32 = 0x0000_FF00;
    pub const B_MASK: u32 = 0x0000_00FF;

    pub const BLACK: Self = Self { data: 0 };
}

impl From<u32> for Color {
    fn from(data: u32) -> Self {
        Self { data: data & (Self::R_MASK | Self::G_MASK | Self::B_MASK) }
    }
}
