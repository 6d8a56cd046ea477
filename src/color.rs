/// RGBA color as carried by the grid JSON

use serde::{Deserialize, Serialize};

/// Four 8-bit channels. The JSON form is `{"R":200,"G":0,"B":0,"A":255}`;
/// lowercase field names are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    #[serde(rename = "R", alias = "r")]
    pub r: u8,
    #[serde(rename = "G", alias = "g")]
    pub g: u8,
    #[serde(rename = "B", alias = "b")]
    pub b: u8,
    #[serde(rename = "A", alias = "a")]
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::rgba(px[0], px[1], px[2], px[3])
    }
}
