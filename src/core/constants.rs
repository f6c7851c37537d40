// Constants and code tables for the FT-817 CAT command set
// Code spaces are sparse: values are wire bytes, not ordinals

use std::fmt;

/// 50 standard CTCSS tones (in Hz)
pub const TONES: [f32; 50] = [
    67.0, 69.3, 71.9, 74.4, 77.0, 79.7, 82.5, 85.4, 88.5, 91.5, 94.8, 97.4, 100.0, 103.5, 107.2,
    110.9, 114.8, 118.8, 123.0, 127.3, 131.8, 136.5, 141.3, 146.2, 151.4, 156.7, 159.8, 162.2,
    165.5, 167.9, 171.3, 173.8, 177.3, 179.9, 183.5, 186.2, 189.9, 192.8, 196.6, 199.5, 203.5,
    206.5, 210.7, 218.1, 225.7, 229.1, 233.6, 241.8, 250.3, 254.1,
];

/// Check whether a tone in 0.1 Hz units is one of the standard CTCSS tones
pub fn is_standard_tone(tone_decihz: u32) -> bool {
    TONES
        .iter()
        .any(|&t| (t * 10.0).round() as u32 == tone_decihz)
}

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Lsb = 0x00,
    Usb = 0x01,
    Cw = 0x02,
    Cwr = 0x03,
    Am = 0x04,
    Wfm = 0x06,
    Fm = 0x08,
    Dig = 0x0A,
    Pkt = 0x0C,
}

impl Mode {
    pub const ALL: [Mode; 9] = [
        Mode::Lsb,
        Mode::Usb,
        Mode::Cw,
        Mode::Cwr,
        Mode::Am,
        Mode::Wfm,
        Mode::Fm,
        Mode::Dig,
        Mode::Pkt,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.to_byte() == byte)
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Lsb => "LSB",
            Mode::Usb => "USB",
            Mode::Cw => "CW",
            Mode::Cwr => "CWR",
            Mode::Am => "AM",
            Mode::Wfm => "WFM",
            Mode::Fm => "FM",
            Mode::Dig => "DIG",
            Mode::Pkt => "PKT",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Repeater shift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RepeaterDir {
    Minus = 0x09,
    Plus = 0x49,
    Simplex = 0x89,
}

impl RepeaterDir {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepeaterDir::Minus => "-",
            RepeaterDir::Plus => "+",
            RepeaterDir::Simplex => "",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "+" | "plus" => Some(RepeaterDir::Plus),
            "-" | "minus" => Some(RepeaterDir::Minus),
            "" | "simplex" | "off" => Some(RepeaterDir::Simplex),
            _ => None,
        }
    }
}

impl fmt::Display for RepeaterDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CTCSS/DCS squelch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ToneSquelch {
    DcsEnable = 0x0A,
    CtcssEnable = 0x2A,
    CtcssDcsEnable = 0x4A,
    Disable = 0x8A,
}

impl ToneSquelch {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToneSquelch::DcsEnable => "DCS",
            ToneSquelch::CtcssEnable => "CTCSS",
            ToneSquelch::CtcssDcsEnable => "CTCSS/DCS",
            ToneSquelch::Disable => "off",
        }
    }
}

impl fmt::Display for ToneSquelch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
