use std::fmt;

//-------------------------------

/// The nine layouts of the 16 bit C extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CFormat {
    CR,
    CI,
    CSS,
    CIW,
    CL,
    CS,
    CA,
    CB,
    CJ,
}

impl fmt::Display for CFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn cfield(bits: u16, lo: u32, len: u32) -> u32 {
    ((bits as u32) >> lo) & ((1 << len) - 1)
}

/// Extracts a register from a 3 bit compressed field, these name x8-x15.
/// Pass in the lowest bit of the field.
fn creg_at(bits: u16, lo: u32) -> u32 {
    cfield(bits, lo, 3) + 8
}

//-------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CRType {
    pub inst: u16,
    pub op: u32,
    pub rs2: u32,
    pub rd: u32,
    pub funct4: u32,
}

impl From<u16> for CRType {
    fn from(inst: u16) -> Self {
        CRType {
            inst,
            op: cfield(inst, 0, 2),
            rs2: cfield(inst, 2, 5),
            rd: cfield(inst, 7, 5),
            funct4: cfield(inst, 12, 4),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CIType {
    pub inst: u16,
    pub op: u32,
    // imm[6:2]
    pub imm_lo: u32,
    pub rd: u32,
    // imm[12]
    pub imm_hi: u32,
    pub funct3: u32,
}

impl From<u16> for CIType {
    fn from(inst: u16) -> Self {
        CIType {
            inst,
            op: cfield(inst, 0, 2),
            imm_lo: cfield(inst, 2, 5),
            rd: cfield(inst, 7, 5),
            imm_hi: cfield(inst, 12, 1),
            funct3: cfield(inst, 13, 3),
        }
    }
}

impl CIType {
    /// The six immediate bits joined and sign extended, as used by
    /// C.ADDI, C.LI and C.ANDI.
    pub fn imm(&self) -> i32 {
        crate::decode::sign_extend(((self.imm_hi << 5) | self.imm_lo) as i32, 5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CSSType {
    pub inst: u16,
    pub op: u32,
    pub rs2: u32,
    pub imm: u32,
    pub funct3: u32,
}

impl From<u16> for CSSType {
    fn from(inst: u16) -> Self {
        CSSType {
            inst,
            op: cfield(inst, 0, 2),
            rs2: cfield(inst, 2, 5),
            imm: cfield(inst, 7, 6),
            funct3: cfield(inst, 13, 3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CIWType {
    pub inst: u16,
    pub op: u32,
    pub rd: u32,
    pub imm: u32,
    pub funct3: u32,
}

impl From<u16> for CIWType {
    fn from(inst: u16) -> Self {
        CIWType {
            inst,
            op: cfield(inst, 0, 2),
            rd: creg_at(inst, 2),
            imm: cfield(inst, 5, 8),
            funct3: cfield(inst, 13, 3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CLType {
    pub inst: u16,
    pub op: u32,
    pub rd: u32,
    // bits 6:5
    pub imm_lo: u32,
    pub rs1: u32,
    // bits 12:10
    pub imm_hi: u32,
    pub funct3: u32,
}

impl From<u16> for CLType {
    fn from(inst: u16) -> Self {
        CLType {
            inst,
            op: cfield(inst, 0, 2),
            rd: creg_at(inst, 2),
            imm_lo: cfield(inst, 5, 2),
            rs1: creg_at(inst, 7),
            imm_hi: cfield(inst, 10, 3),
            funct3: cfield(inst, 13, 3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CSType {
    pub inst: u16,
    pub op: u32,
    pub rs2: u32,
    pub imm_lo: u32,
    pub rs1: u32,
    pub imm_hi: u32,
    pub funct3: u32,
}

impl From<u16> for CSType {
    fn from(inst: u16) -> Self {
        CSType {
            inst,
            op: cfield(inst, 0, 2),
            rs2: creg_at(inst, 2),
            imm_lo: cfield(inst, 5, 2),
            rs1: creg_at(inst, 7),
            imm_hi: cfield(inst, 10, 3),
            funct3: cfield(inst, 13, 3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CAType {
    pub inst: u16,
    pub op: u32,
    pub rs2: u32,
    pub funct2: u32,
    pub rd: u32,
    pub funct6: u32,
}

impl From<u16> for CAType {
    fn from(inst: u16) -> Self {
        CAType {
            inst,
            op: cfield(inst, 0, 2),
            rs2: creg_at(inst, 2),
            funct2: cfield(inst, 5, 2),
            rd: creg_at(inst, 7),
            funct6: cfield(inst, 10, 6),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CBType {
    pub inst: u16,
    pub op: u32,
    // offset bits 6:2
    pub off_lo: u32,
    pub rs1: u32,
    // offset bits 12:10
    pub off_hi: u32,
    pub funct3: u32,
}

impl From<u16> for CBType {
    fn from(inst: u16) -> Self {
        CBType {
            inst,
            op: cfield(inst, 0, 2),
            off_lo: cfield(inst, 2, 5),
            rs1: creg_at(inst, 7),
            off_hi: cfield(inst, 10, 3),
            funct3: cfield(inst, 13, 3),
        }
    }
}

impl CBType {
    /// Branch offset for C.BEQZ/C.BNEZ, bit 0 is implicitly zero.
    pub fn branch_offset(&self) -> i32 {
        let bits = self.inst;
        let imm = (cfield(bits, 12, 1) << 8)
            | (cfield(bits, 5, 2) << 6)
            | (cfield(bits, 2, 1) << 5)
            | (cfield(bits, 10, 2) << 3)
            | (cfield(bits, 3, 2) << 1);
        crate::decode::sign_extend(imm as i32, 8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CJType {
    pub inst: u16,
    pub op: u32,
    pub target: u32,
    pub funct3: u32,
}

impl From<u16> for CJType {
    fn from(inst: u16) -> Self {
        CJType {
            inst,
            op: cfield(inst, 0, 2),
            target: cfield(inst, 2, 11),
            funct3: cfield(inst, 13, 3),
        }
    }
}

impl CJType {
    /// Jump offset for C.J/C.JAL, bit 0 is implicitly zero.
    pub fn offset(&self) -> i32 {
        let bits = self.inst;
        let imm = (cfield(bits, 12, 1) << 11)
            | (cfield(bits, 8, 1) << 10)
            | (cfield(bits, 9, 2) << 8)
            | (cfield(bits, 6, 1) << 7)
            | (cfield(bits, 7, 1) << 6)
            | (cfield(bits, 2, 1) << 5)
            | (cfield(bits, 11, 1) << 4)
            | (cfield(bits, 3, 3) << 1);
        crate::decode::sign_extend(imm as i32, 11)
    }
}

//-------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CPayload {
    CR(CRType),
    CI(CIType),
    CSS(CSSType),
    CIW(CIWType),
    CL(CLType),
    CS(CSType),
    CA(CAType),
    CB(CBType),
    CJ(CJType),
}

/// A classified 16 bit parcel.  Only the layout is recovered, these are
/// not rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CInst {
    bits: u16,
    payload: CPayload,
}

impl CInst {
    /// Classifies a parcel by quadrant and funct3 (RV64C).  Returns `None`
    /// for 32 bit encodings, the all zero illegal instruction and
    /// reserved slots.
    pub fn new(bits: u16) -> Option<Self> {
        use CFormat::*;

        if bits == 0 {
            return None;
        }

        let funct3 = cfield(bits, 13, 3);
        let format = match (bits & 0b11, funct3) {
            (0b00, 0b000) => CIW,
            (0b00, 0b100) => return None,
            (0b00, 0b001..=0b011) => CL,
            (0b00, _) => CS,

            (0b01, 0b000..=0b011) => CI,
            (0b01, 0b100) => {
                if cfield(bits, 10, 2) == 0b11 {
                    CA
                } else {
                    CB
                }
            }
            (0b01, 0b101) => CJ,
            (0b01, _) => CB,

            (0b10, 0b000..=0b011) => CI,
            (0b10, 0b100) => CR,
            (0b10, _) => CSS,

            _ => return None,
        };

        let payload = match format {
            CR => CPayload::CR(CRType::from(bits)),
            CI => CPayload::CI(CIType::from(bits)),
            CSS => CPayload::CSS(CSSType::from(bits)),
            CIW => CPayload::CIW(CIWType::from(bits)),
            CL => CPayload::CL(CLType::from(bits)),
            CS => CPayload::CS(CSType::from(bits)),
            CA => CPayload::CA(CAType::from(bits)),
            CB => CPayload::CB(CBType::from(bits)),
            CJ => CPayload::CJ(CJType::from(bits)),
        };

        Some(CInst { bits, payload })
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn quadrant(&self) -> u32 {
        cfield(self.bits, 0, 2)
    }

    pub fn payload(&self) -> &CPayload {
        &self.payload
    }

    pub fn format(&self) -> CFormat {
        use CPayload::*;
        match self.payload {
            CR(_) => CFormat::CR,
            CI(_) => CFormat::CI,
            CSS(_) => CFormat::CSS,
            CIW(_) => CFormat::CIW,
            CL(_) => CFormat::CL,
            CS(_) => CFormat::CS,
            CA(_) => CFormat::CA,
            CB(_) => CFormat::CB,
            CJ(_) => CFormat::CJ,
        }
    }
}

//-------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn format(bits: u16) -> CFormat {
        CInst::new(bits).unwrap().format()
    }

    #[test]
    fn test_not_compressed() {
        assert_eq!(CInst::new(0), None);
        assert_eq!(CInst::new(0x0513), None);
        assert_eq!(CInst::new(0xffff), None);
        // quadrant 0, funct3 100 is reserved
        assert_eq!(CInst::new(0x8000), None);
    }

    #[test]
    fn test_classify() {
        // c.addi4spn s0, sp, 16
        assert_eq!(format(0x0800), CFormat::CIW);
        // c.lw a0, 0(a0)
        assert_eq!(format(0x4108), CFormat::CL);
        // c.sd a0, 8(a1)
        assert_eq!(format(0xe588), CFormat::CS);
        // c.li a0, 0
        assert_eq!(format(0x4501), CFormat::CI);
        // c.srli a0, 1
        assert_eq!(format(0x8105), CFormat::CB);
        // c.sub a0, a1
        assert_eq!(format(0x8d0d), CFormat::CA);
        // c.j 0
        assert_eq!(format(0xa001), CFormat::CJ);
        // c.beqz a0, 0
        assert_eq!(format(0xc101), CFormat::CB);
        // c.ldsp ra, 8(sp)
        assert_eq!(format(0x60a2), CFormat::CI);
        // c.ret
        assert_eq!(format(0x8082), CFormat::CR);
        // c.sdsp ra, 8(sp)
        assert_eq!(format(0xe406), CFormat::CSS);
    }

    #[test]
    fn test_compressed_registers() {
        match CInst::new(0x8d0d).unwrap().payload() {
            CPayload::CA(ca) => {
                assert_eq!(ca.rd, 10);
                assert_eq!(ca.rs2, 11);
                assert_eq!(ca.funct2, 0);
            }
            p => panic!("unexpected payload {:?}", p),
        }

        match CInst::new(0x8082).unwrap().payload() {
            CPayload::CR(cr) => {
                assert_eq!(cr.rd, 1);
                assert_eq!(cr.rs2, 0);
                assert_eq!(cr.funct4, 0b1000);
            }
            p => panic!("unexpected payload {:?}", p),
        }
    }

    #[test]
    fn test_ci_imm() {
        assert_eq!(CIType::from(0x557d).imm(), -1); // c.li a0, -1
        assert_eq!(CIType::from(0x4515).imm(), 5); // c.li a0, 5
    }

    #[test]
    fn test_offsets() {
        // c.j -2
        assert_eq!(CJType::from(0xbffd).offset(), -2);
        // c.beqz a0, 8
        let cb = CBType::from(0xc501);
        assert_eq!(cb.rs1, 10);
        assert_eq!(cb.branch_offset(), 8);
    }
}

//-------------------------------
