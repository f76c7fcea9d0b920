use std::fmt;
use thiserror::Error;

use crate::table::format_of;

//-------------------------------

#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeErr {
    #[error("Unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("No instruction table for opcode 0x{0:02x}")]
    MissingTable(u8),

    #[error("No instruction matches 0x{0:08x}")]
    NoMatch(u32),

    #[error("Reserved rounding mode {rm} in 0x{word:08x}")]
    ReservedRoundingMode { word: u32, rm: u8 },

    #[error("Reserved shift amount in 0x{0:08x}")]
    ReservedShamt(u32),

    #[error("Compressed instruction 0x{0:04x} cannot be rendered")]
    Compressed(u16),
}

pub type Result<T> = std::result::Result<T, DecodeErr>;

//-------------------------------

/// Extracts `len` bits starting at bit `lo`.
#[inline]
pub(crate) fn field(inst: u32, lo: u32, len: u32) -> u32 {
    (inst >> lo) & ((1 << len) - 1)
}

/// Sign extends from bit `bit`, ie. `bit` is the sign bit.
pub fn sign_extend(x: i32, bit: u32) -> i32 {
    let n = 31 - bit;
    x.wrapping_shl(n).wrapping_shr(n)
}

/// The uncompressed instruction layouts, as laid out in the ISA manual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    R,
    R4,
    I,
    S,
    B,
    U,
    J,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

//-------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RType {
    pub inst: u32,
    pub opcode: u32,
    pub rd: u32,
    pub funct3: u32,
    pub rs1: u32,
    pub rs2: u32,
    pub funct7: u32,
}

impl From<u32> for RType {
    fn from(inst: u32) -> Self {
        RType {
            inst,
            opcode: field(inst, 0, 7),
            rd: field(inst, 7, 5),
            funct3: field(inst, 12, 3),
            rs1: field(inst, 15, 5),
            rs2: field(inst, 20, 5),
            funct7: field(inst, 25, 7),
        }
    }
}

/// Fused multiply-add layout, rs3 lives where funct7 would be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct R4Type {
    pub inst: u32,
    pub opcode: u32,
    pub rd: u32,
    pub funct3: u32,
    pub rs1: u32,
    pub rs2: u32,
    pub funct2: u32,
    pub rs3: u32,
}

impl From<u32> for R4Type {
    fn from(inst: u32) -> Self {
        R4Type {
            inst,
            opcode: field(inst, 0, 7),
            rd: field(inst, 7, 5),
            funct3: field(inst, 12, 3),
            rs1: field(inst, 15, 5),
            rs2: field(inst, 20, 5),
            funct2: field(inst, 25, 2),
            rs3: field(inst, 27, 5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IType {
    pub inst: u32,
    pub opcode: u32,
    pub rd: u32,
    pub funct3: u32,
    pub rs1: u32,

    /// imm[11:0], sign extended.
    pub imm: i32,
}

impl From<u32> for IType {
    fn from(inst: u32) -> Self {
        IType {
            inst,
            opcode: field(inst, 0, 7),
            rd: field(inst, 7, 5),
            funct3: field(inst, 12, 3),
            rs1: field(inst, 15, 5),
            imm: (inst as i32) >> 20,
        }
    }
}

impl IType {
    /// The shift amount of SLLI and friends.  The bits above the mask
    /// are funct6/funct7 and must not be treated as a displacement.
    pub fn shamt(&self, mask: u32) -> u32 {
        (self.imm as u32) & mask
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SType {
    pub inst: u32,
    pub opcode: u32,

    /// imm[4:0]
    pub imm_a: u32,
    pub funct3: u32,
    pub rs1: u32,
    pub rs2: u32,

    /// imm[11:5], sign extended.
    pub imm_b: i32,
}

impl From<u32> for SType {
    fn from(inst: u32) -> Self {
        SType {
            inst,
            opcode: field(inst, 0, 7),
            imm_a: field(inst, 7, 5),
            funct3: field(inst, 12, 3),
            rs1: field(inst, 15, 5),
            rs2: field(inst, 20, 5),
            imm_b: (inst as i32) >> 25,
        }
    }
}

impl SType {
    pub fn imm(&self) -> i32 {
        (self.imm_b << 5) | self.imm_a as i32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BType {
    pub inst: u32,
    pub opcode: u32,

    /// imm[11]
    pub imm_a: u32,

    /// imm[4:1]
    pub imm_b: u32,
    pub funct3: u32,
    pub rs1: u32,
    pub rs2: u32,

    /// imm[10:5]
    pub imm_c: u32,

    /// imm[12], either 0 or -1.
    pub imm_d: i32,
}

impl From<u32> for BType {
    fn from(inst: u32) -> Self {
        BType {
            inst,
            opcode: field(inst, 0, 7),
            imm_a: field(inst, 7, 1),
            imm_b: field(inst, 8, 4),
            funct3: field(inst, 12, 3),
            rs1: field(inst, 15, 5),
            rs2: field(inst, 20, 5),
            imm_c: field(inst, 25, 6),
            imm_d: (inst as i32) >> 31,
        }
    }
}

impl BType {
    /// Branch offset, bit 0 is always clear.
    pub fn imm(&self) -> i32 {
        let imm = (self.imm_d << 12)
            | (self.imm_a << 11) as i32
            | (self.imm_c << 5) as i32
            | (self.imm_b << 1) as i32;
        sign_extend(imm, 12)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UType {
    pub inst: u32,
    pub opcode: u32,
    pub rd: u32,

    /// imm[31:12] as a signed 20 bit value.  It is _not_ shifted
    /// into place; objdump prints LUI/AUIPC this way too.
    pub imm: i32,
}

impl From<u32> for UType {
    fn from(inst: u32) -> Self {
        UType {
            inst,
            opcode: field(inst, 0, 7),
            rd: field(inst, 7, 5),
            imm: (inst as i32) >> 12,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JType {
    pub inst: u32,
    pub opcode: u32,
    pub rd: u32,

    /// imm[19:12]
    pub imm_a: u32,

    /// imm[11]
    pub imm_b: u32,

    /// imm[10:1]
    pub imm_c: u32,

    /// imm[20], either 0 or -1.
    pub imm_d: i32,
}

impl From<u32> for JType {
    fn from(inst: u32) -> Self {
        JType {
            inst,
            opcode: field(inst, 0, 7),
            rd: field(inst, 7, 5),
            imm_a: field(inst, 12, 8),
            imm_b: field(inst, 20, 1),
            imm_c: field(inst, 21, 10),
            imm_d: (inst as i32) >> 31,
        }
    }
}

impl JType {
    pub fn imm(&self) -> i32 {
        let imm = (self.imm_d << 20)
            | (self.imm_a << 12) as i32
            | (self.imm_b << 11) as i32
            | (self.imm_c << 1) as i32;
        sign_extend(imm, 20)
    }
}

//-------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
    R(RType),
    R4(R4Type),
    I(IType),
    S(SType),
    B(BType),
    U(UType),
    J(JType),
}

/// A single 32 bit instruction word split into the fields of its format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inst {
    bits: u32,
    payload: Payload,
}

impl Inst {
    /// Classifies `bits` by opcode and extracts its fields.  Fails if
    /// the opcode doesn't belong to any supported format.
    pub fn new(bits: u32) -> Result<Self> {
        let opcode = (bits & 0b1111111) as u8;
        let format = format_of(opcode).ok_or(DecodeErr::UnknownOpcode(opcode))?;

        let payload = match format {
            Format::R => Payload::R(RType::from(bits)),
            Format::R4 => Payload::R4(R4Type::from(bits)),
            Format::I => Payload::I(IType::from(bits)),
            Format::S => Payload::S(SType::from(bits)),
            Format::B => Payload::B(BType::from(bits)),
            Format::U => Payload::U(UType::from(bits)),
            Format::J => Payload::J(JType::from(bits)),
        };

        Ok(Inst { bits, payload })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn opcode(&self) -> u8 {
        (self.bits & 0b1111111) as u8
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn format(&self) -> Format {
        match self.payload {
            Payload::R(_) => Format::R,
            Payload::R4(_) => Format::R4,
            Payload::I(_) => Format::I,
            Payload::S(_) => Format::S,
            Payload::B(_) => Format::B,
            Payload::U(_) => Format::U,
            Payload::J(_) => Format::J,
        }
    }
}

//-------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x800, 11), -2048);
        assert_eq!(sign_extend(0x7ff, 11), 2047);
        assert_eq!(sign_extend(0x1000, 12), -4096);
        assert_eq!(sign_extend(0xfff, 12), 4095);
    }

    #[test]
    fn test_r_fields() {
        // sub a0, a1, a2
        let r = RType::from(0x40c58533);
        assert_eq!(r.opcode, 0x33);
        assert_eq!(r.rd, 10);
        assert_eq!(r.funct3, 0);
        assert_eq!(r.rs1, 11);
        assert_eq!(r.rs2, 12);
        assert_eq!(r.funct7, 0b0100000);
    }

    #[test]
    fn test_r4_fields() {
        let r4 = R4Type::from(0x80660143);
        assert_eq!(r4.opcode, 0x43);
        assert_eq!(r4.rd, 2);
        assert_eq!(r4.funct3, 0);
        assert_eq!(r4.rs1, 12);
        assert_eq!(r4.rs2, 6);
        assert_eq!(r4.funct2, 0);
        assert_eq!(r4.rs3, 16);
    }

    #[test]
    fn test_i_imm() {
        // addi a0, a0, -1
        let i = IType::from(0xfff50513);
        assert_eq!(i.imm, -1);
        assert_eq!(i.rd, 10);
        assert_eq!(i.rs1, 10);

        // srai a5, a5, 0x2f: funct6 sits above the shamt
        let i = IType::from(0x42f7d793);
        assert_eq!(i.shamt(0x3f), 0x2f);
    }

    #[test]
    fn test_s_imm() {
        // sw ra, 8(sp)
        assert_eq!(SType::from(0x00112423).imm(), 8);

        // sd s0, -16(sp)
        assert_eq!(SType::from(0xfe813823).imm(), -16);
    }

    #[test]
    fn test_b_imm() {
        assert_eq!(BType::from(0x00850463).imm(), 8);

        // Only imm[12] set.
        assert_eq!(BType::from(0x80000063).imm(), -4096);

        // beq zero, zero, -2
        assert_eq!(BType::from(0xfe000fe3).imm(), -2);
    }

    #[test]
    fn test_u_imm() {
        assert_eq!(UType::from(0x00002e17).imm, 2);
        assert_eq!(UType::from(0xfffff537).imm, -1);
    }

    #[test]
    fn test_j_imm() {
        assert_eq!(JType::from(0x0040006f).imm(), 4);
        assert_eq!(JType::from(0xee1ff0ef).imm(), -0x120);
        assert_eq!(JType::from(0x8000006f).imm(), -(1 << 20));

        // jal a3, 0x10a56
        let j = JType::from(0x257106ef);
        assert_eq!(j.rd, 13);
        assert_eq!(j.imm_a, 0x10);
        assert_eq!(j.imm_b, 1);
        assert_eq!(j.imm_c, 0x12b);
        assert_eq!(j.imm_d, 0);
        assert_eq!(j.imm(), 0x10a56);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Inst::new(0x00850463).unwrap().format(), Format::B);
        assert_eq!(Inst::new(0x00002e17).unwrap().format(), Format::U);
        assert_eq!(Inst::new(0x80660143).unwrap().format(), Format::R4);
        assert_eq!(Inst::new(0x0000000f).unwrap().format(), Format::I);
        assert_eq!(Inst::new(0x00e12423).unwrap().format(), Format::S);
        assert_eq!(Inst::new(0xee1ff0ef).unwrap().format(), Format::J);
        assert_eq!(Inst::new(0x00940133).unwrap().format(), Format::R);
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(Inst::new(0xffffffff), Err(DecodeErr::UnknownOpcode(0x7f)));
        assert_eq!(Inst::new(0x0000000b), Err(DecodeErr::UnknownOpcode(0x0b)));
    }
}
