//! Hand-drawn 8x8 icons.
//!
//! Each icon is eight rows; bit 7 of a row is the leftmost pixel.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Folder,
    Video,
    Parent,
    Play,
    Pause,
    Loop,
    Unloop,
    Sound,
    Mute,
    Palette,
    Back,
}

impl Icon {
    pub fn bitmap(self) -> &'static [u8; 8] {
        match self {
            Icon::Folder => &FOLDER,
            Icon::Video => &VIDEO,
            Icon::Parent => &PARENT,
            Icon::Play => &PLAY,
            Icon::Pause => &PAUSE,
            Icon::Loop => &LOOP,
            Icon::Unloop => &UNLOOP,
            Icon::Sound => &SOUND,
            Icon::Mute => &MUTE,
            Icon::Palette => &PALETTE,
            Icon::Back => &BACK,
        }
    }

    /// Whether the pixel at column `x`, row `y` is set.
    pub fn pixel(self, x: usize, y: usize) -> bool {
        x < 8 && y < 8 && self.bitmap()[y] & (0x80 >> x) != 0
    }
}

const FOLDER: [u8; 8] = [
    0b0000_1111,
    0b1111_0001,
    0b1001_1111,
    0b1000_0001,
    0b1000_0001,
    0b1000_0001,
    0b1000_0001,
    0b1111_1111,
];

const VIDEO: [u8; 8] = [
    0b1111_1111,
    0b1010_1011,
    0b1111_1111,
    0b1000_0001,
    0b1000_0001,
    0b1111_1111,
    0b1101_0101,
    0b1111_1111,
];

const PARENT: [u8; 8] = [
    0b0001_0000,
    0b0011_1000,
    0b0111_1100,
    0b0001_0000,
    0b0001_0000,
    0b0001_1110,
    0b0000_0000,
    0b0000_0000,
];

const PLAY: [u8; 8] = [
    0b1110_0000,
    0b1111_1000,
    0b1111_1110,
    0b1111_1111,
    0b1111_1111,
    0b1111_1110,
    0b1111_1000,
    0b1110_0000,
];

const PAUSE: [u8; 8] = [0b0110_0110; 8];

const LOOP: [u8; 8] = [
    0b0011_1100,
    0b0100_0010,
    0b1000_0001,
    0b0000_0011,
    0b1100_0000,
    0b1000_0001,
    0b0100_0010,
    0b0011_1100,
];

// Loop arrows with a slash through them.
const UNLOOP: [u8; 8] = [
    0b0011_1101,
    0b0100_0010,
    0b1000_0101,
    0b0000_1011,
    0b1101_0000,
    0b1010_0001,
    0b0100_0010,
    0b1011_1100,
];

const SOUND: [u8; 8] = [
    0b0011_0000,
    0b0111_0001,
    0b0111_0101,
    0b1111_0101,
    0b1111_0101,
    0b0111_0101,
    0b0111_0001,
    0b0011_0000,
];

const MUTE: [u8; 8] = [
    0b0011_0000,
    0b0111_0000,
    0b0111_0000,
    0b1111_0000,
    0b1111_0000,
    0b0111_0000,
    0b0111_0000,
    0b0011_0000,
];

const PALETTE: [u8; 8] = [
    0b1111_1000,
    0b1111_1000,
    0b1111_1000,
    0b1111_1111,
    0b1111_1001,
    0b0001_0001,
    0b0001_0001,
    0b0001_1111,
];

const BACK: [u8; 8] = [
    0b0000_0000,
    0b0010_0000,
    0b0110_0000,
    0b1111_1111,
    0b1111_1111,
    0b0110_0000,
    0b0010_0000,
    0b0000_0000,
];
