// Yaesu CAT binary frame
// Every command is exactly five bytes: four parameters, then the opcode

use std::fmt;

/// Length of every CAT command frame
pub const FRAME_LEN: usize = 5;

/// Command opcodes (fifth byte of a frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Set main VFO frequency
    Tune = 0x01,
    /// Read frequency and mode
    ReadFreqMode = 0x03,
    /// Set operating mode
    SetMode = 0x07,
    /// Set repeater shift direction
    RepeaterDir = 0x09,
    /// Select CTCSS/DCS squelch mode
    CtcssDcsMode = 0x0A,
    /// Set CTCSS tone frequency
    CtcssTone = 0x0B,
    /// Status probe used as a handshake
    StatusProbe = 0xA7,
    /// Read two bytes of EEPROM
    EepromRead = 0xBB,
    /// Set repeater offset
    RepeaterOffset = 0xF9,
}

impl Opcode {
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:02X})", self, self.to_byte())
    }
}

/// CAT frame structure: <p1> <p2> <p3> <p4> <opcode>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatFrame {
    params: [u8; 4],
    opcode: Opcode,
}

impl CatFrame {
    /// Create a frame from its four parameter bytes
    pub fn new(params: [u8; 4], opcode: Opcode) -> Self {
        Self { params, opcode }
    }

    /// Frame with all parameters zero
    pub fn bare(opcode: Opcode) -> Self {
        Self::new([0; 4], opcode)
    }

    /// Frame whose leading parameter bytes come from `lead`, zero padded.
    /// At most four bytes of `lead` are used.
    pub fn with_lead(lead: &[u8], opcode: Opcode) -> Self {
        let mut params = [0u8; 4];
        let n = lead.len().min(params.len());
        params[..n].copy_from_slice(&lead[..n]);
        Self::new(params, opcode)
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn params(&self) -> &[u8; 4] {
        &self.params
    }

    /// Wire bytes for this frame
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let [b0, b1, b2, b3] = self.params;
        [b0, b1, b2, b3, self.opcode.to_byte()]
    }
}
