use log::*;
use std::fmt;

use crate::decode::*;
use crate::disasm::Config;
use crate::registers::reg_name;
use crate::table::{lookup, Descriptor, Flags, Isa, RoundingMode};

//-------------------------------

/// How LUI/AUIPC immediates are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpperImm {
    /// The raw 20 bit field, as objdump prints it.
    Raw,

    /// The field shifted into bits 31:12, ie. the value added.
    Shifted,
}

impl Default for UpperImm {
    fn default() -> Self {
        UpperImm::Raw
    }
}

//-------------------------------

/// Lower case hex with an explicit sign, eg. `0x10` or `-0x10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedHex(pub i64);

impl fmt::Display for SignedHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-0x{:x}", self.0.unsigned_abs())
        } else {
            write!(f, "0x{:x}", self.0)
        }
    }
}

fn hex<T: Into<i64>>(v: T) -> String {
    SignedHex(v.into()).to_string()
}

fn xreg(index: u32) -> String {
    reg_name(index, false).to_string()
}

fn freg(index: u32) -> String {
    reg_name(index, true).to_string()
}

fn offset(imm: i32, base: u32) -> String {
    format!("{}({})", SignedHex(imm as i64), reg_name(base, false))
}

//-------------------------------

/// A rendered instruction: the mnemonic followed by comma separated operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub mnemonic: String,
    pub operands: Vec<String>,
}

impl Line {
    fn new(mnemonic: impl Into<String>, operands: Vec<String>) -> Self {
        Line {
            mnemonic: mnemonic.into(),
            operands,
        }
    }

    fn bare(mnemonic: impl Into<String>) -> Self {
        Line::new(mnemonic, Vec::new())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands.join(", "))?;
        }
        Ok(())
    }
}

//-------------------------------

/// Renders a decoded instruction.  Returns `Ok(None)` if the opcode is
/// known but no descriptor matches the word.
pub fn render(inst: &Inst, cfg: &Config) -> Result<Option<Line>> {
    let desc = match lookup(inst.bits(), cfg.isa)? {
        Some(desc) => desc,
        None => {
            debug!("no match for 0x{:08x}", inst.bits());
            return Ok(None);
        }
    };
    trace!("0x{:08x} -> {:?}", inst.bits(), desc);

    let line = match inst.payload() {
        Payload::R(r) => render_r(r, desc)?,
        Payload::R4(r4) => render_r4(r4, desc)?,
        Payload::I(i) => render_i(i, desc, cfg.isa)?,
        Payload::S(s) => render_s(s, desc),
        Payload::B(b) => render_b(b, desc),
        Payload::U(u) => render_u(u, desc, cfg.upper_imm),
        Payload::J(j) => render_j(j, desc),
    };

    Ok(Some(line))
}

/// Appends the rounding mode to float mnemonics that have one.
fn float_mnemonic(desc: &Descriptor, word: u32, rm: u32) -> Result<String> {
    if !desc.has_rounding_mode() {
        return Ok(desc.mnemonic.to_string());
    }

    let mode = RoundingMode::from_bits(rm).ok_or(DecodeErr::ReservedRoundingMode {
        word,
        rm: rm as u8,
    })?;
    Ok(format!("{}({})", desc.mnemonic, mode))
}

/// The pred/succ sets of a FENCE, in `iorw` order.
fn iorw(bits: u32) -> String {
    let mut s = String::new();
    for (bit, c) in [(3, 'i'), (2, 'o'), (1, 'r'), (0, 'w')] {
        if bits & (1 << bit) != 0 {
            s.push(c);
        }
    }
    s
}

fn render_fence(i: &IType, desc: &Descriptor) -> Line {
    let imm = (i.imm as u32) & 0xfff;
    if imm >> 8 != 0 {
        return Line::new("FENCE.TSO", vec!["rw".to_string(), "rw".to_string()]);
    }

    let pred = (imm >> 4) & 0xf;
    let succ = imm & 0xf;
    Line::new(desc.mnemonic, vec![iorw(pred), iorw(succ)])
}

fn render_i(i: &IType, desc: &Descriptor, isa: Isa) -> Result<Line> {
    let flags = desc.flags;

    let line = if flags.contains(Flags::FENCE) {
        render_fence(i, desc)
    } else if flags.contains(Flags::SYSTEM) {
        Line::bare(desc.mnemonic)
    } else if flags.contains(Flags::CSR_IMM) {
        let csr = (i.imm as u32) & 0xfff;
        Line::new(desc.mnemonic, vec![xreg(i.rd), hex(i.rs1), hex(csr)])
    } else if flags.contains(Flags::CSR) {
        let csr = (i.imm as u32) & 0xfff;
        Line::new(desc.mnemonic, vec![xreg(i.rd), xreg(i.rs1), hex(csr)])
    } else if flags.contains(Flags::LOAD_STORE) {
        let rd = if flags.contains(Flags::FLOAT) {
            freg(i.rd)
        } else {
            xreg(i.rd)
        };
        Line::new(desc.mnemonic, vec![rd, offset(i.imm, i.rs1)])
    } else if flags.contains(Flags::SHAMT) {
        if isa == Isa::Rv32 && (i.imm & 0x20) != 0 {
            return Err(DecodeErr::ReservedShamt(i.inst));
        }
        let shamt = i.shamt(isa.shamt_mask());
        Line::new(desc.mnemonic, vec![xreg(i.rd), xreg(i.rs1), hex(shamt)])
    } else {
        Line::new(desc.mnemonic, vec![xreg(i.rd), xreg(i.rs1), hex(i.imm)])
    };

    Ok(line)
}

fn render_r(r: &RType, desc: &Descriptor) -> Result<Line> {
    let flags = desc.flags;

    if flags.contains(Flags::ATOMIC) {
        let mut mnemonic = desc.mnemonic.to_string();
        if r.funct7 & 0b10 != 0 {
            mnemonic.push_str(".AQ");
        }
        if r.funct7 & 0b01 != 0 {
            mnemonic.push_str(".RL");
        }

        let addr = format!("({})", reg_name(r.rs1, false));

        // LR has rs2 fixed at zero, so it's part of the mask.
        if desc.mask & (0b11111 << 20) != 0 {
            return Ok(Line::new(mnemonic, vec![xreg(r.rd), addr]));
        }
        return Ok(Line::new(mnemonic, vec![xreg(r.rd), xreg(r.rs2), addr]));
    }

    if flags.contains(Flags::FLOAT) {
        let mnemonic = float_mnemonic(desc, r.inst, r.funct3)?;
        let rd = if flags.contains(Flags::INT_RD) {
            xreg(r.rd)
        } else {
            freg(r.rd)
        };
        let rs1 = if flags.contains(Flags::INT_RS1) {
            xreg(r.rs1)
        } else {
            freg(r.rs1)
        };

        if flags.contains(Flags::UNARY) {
            return Ok(Line::new(mnemonic, vec![rd, rs1]));
        }
        return Ok(Line::new(mnemonic, vec![rd, rs1, freg(r.rs2)]));
    }

    Ok(Line::new(
        desc.mnemonic,
        vec![xreg(r.rd), xreg(r.rs1), xreg(r.rs2)],
    ))
}

fn render_r4(r4: &R4Type, desc: &Descriptor) -> Result<Line> {
    let mnemonic = float_mnemonic(desc, r4.inst, r4.funct3)?;
    Ok(Line::new(
        mnemonic,
        vec![freg(r4.rd), freg(r4.rs1), freg(r4.rs2), freg(r4.rs3)],
    ))
}

fn render_s(s: &SType, desc: &Descriptor) -> Line {
    let src = if desc.flags.contains(Flags::FLOAT) {
        freg(s.rs2)
    } else {
        xreg(s.rs2)
    };
    Line::new(desc.mnemonic, vec![src, offset(s.imm(), s.rs1)])
}

fn render_b(b: &BType, desc: &Descriptor) -> Line {
    Line::new(
        desc.mnemonic,
        vec![xreg(b.rs1), xreg(b.rs2), hex(b.imm())],
    )
}

fn render_u(u: &UType, desc: &Descriptor, upper: UpperImm) -> Line {
    let imm = match upper {
        UpperImm::Raw => u.imm as i64,
        UpperImm::Shifted => (u.imm as i64) << 12,
    };
    Line::new(desc.mnemonic, vec![xreg(u.rd), SignedHex(imm).to_string()])
}

fn render_j(j: &JType, desc: &Descriptor) -> Line {
    let rd = if desc.flags.contains(Flags::FLOAT) {
        freg(j.rd)
    } else {
        xreg(j.rd)
    };
    Line::new(desc.mnemonic, vec![rd, hex(j.imm())])
}

//-------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn line(bits: u32) -> String {
        let inst = Inst::new(bits).unwrap();
        render(&inst, &Config::default()).unwrap().unwrap().to_string()
    }

    #[test]
    fn test_signed_hex() {
        assert_eq!(SignedHex(0).to_string(), "0x0");
        assert_eq!(SignedHex(0x2f).to_string(), "0x2f");
        assert_eq!(SignedHex(-16).to_string(), "-0x10");
        assert_eq!(SignedHex(i32::MIN as i64).to_string(), "-0x80000000");
    }

    #[test]
    fn test_iorw() {
        assert_eq!(iorw(0b0000), "");
        assert_eq!(iorw(0b1111), "iorw");
        assert_eq!(iorw(0b0011), "rw");
        assert_eq!(iorw(0b1000), "i");
    }

    #[test]
    fn test_line_display() {
        assert_eq!(Line::bare("ECALL").to_string(), "ECALL");
        assert_eq!(
            Line::new("FENCE", vec![String::new(), String::new()]).to_string(),
            "FENCE , "
        );
        assert_eq!(
            Line::new("ADD", vec!["a0".into(), "a1".into(), "a2".into()]).to_string(),
            "ADD a0, a1, a2"
        );
    }

    #[test]
    fn test_integer_forms() {
        assert_eq!(line(0x00850463), "BEQ a0, s0, 0x8");
        assert_eq!(line(0x00940133), "ADD sp, s0, s1");
        assert_eq!(line(0xfff50513), "ADDI a0, a0, -0x1");
        assert_eq!(line(0x00e12423), "SW a4, 0x8(sp)");
        assert_eq!(line(0x00813503), "LD a0, 0x8(sp)");
        assert_eq!(line(0xee1ff0ef), "JAL ra, -0x120");
        assert_eq!(line(0x00002e17), "AUIPC t3, 0x2");
    }

    #[test]
    fn test_rv64_word_forms() {
        assert_eq!(line(0x4027d79b), "SRAIW a5, a5, 0x2");
        assert_eq!(line(0x40f707bb), "SUBW a5, a4, a5");
    }

    #[test]
    fn test_fence() {
        assert_eq!(line(0x0000000f), "FENCE , ");
        assert_eq!(line(0x0ff0000f), "FENCE iorw, iorw");
        assert_eq!(line(0x0330000f), "FENCE rw, rw");
        assert_eq!(line(0x8330000f), "FENCE.TSO rw, rw");
        assert_eq!(line(0x0000100f), "FENCE.I");
    }

    #[test]
    fn test_system() {
        assert_eq!(line(0x00000073), "ECALL");
        assert_eq!(line(0x00100073), "EBREAK");
        assert_eq!(line(0x30200073), "MRET");
        assert_eq!(line(0xc0002573), "CSRRS a0, zero, 0xc00");
        assert_eq!(line(0x3402d073), "CSRRWI zero, 0x5, 0x340");
    }

    #[test]
    fn test_atomics() {
        assert_eq!(line(0x1e30a12f), "SC.W.AQ.RL sp, gp, (ra)");
        assert_eq!(line(0x1200a12f), "LR.W.RL sp, (ra)");
        assert_eq!(line(0x1400a12f), "LR.W.AQ sp, (ra)");
        assert_eq!(line(0x0ce5b52f), "AMOSWAP.D.AQ a0, a4, (a1)");
    }

    #[test]
    fn test_float() {
        assert_eq!(line(0x80660143), "FMADD.S(RNE) ft2, fa2, ft6, fa6");
        assert_eq!(line(0x00b57553), "FADD.S(DYN) fa0, fa0, fa1");
        assert_eq!(line(0x20b50553), "FSGNJ.S fa0, fa0, fa1");
        assert_eq!(line(0xa0b52553), "FEQ.S a0, fa0, fa1");
        assert_eq!(line(0xc0051553), "FCVT.W.S(RTZ) a0, fa0");
        assert_eq!(line(0xf0050553), "FMV.W.X fa0, a0");
        assert_eq!(line(0x00852507), "FLW fa0, 0x8(a0)");
        assert_eq!(line(0x00a53427), "FSD fa0, 0x8(a0)");
    }

    #[test]
    fn test_reserved_rounding_mode() {
        let inst = Inst::new(0x00b55553).unwrap();
        assert_eq!(
            render(&inst, &Config::default()),
            Err(DecodeErr::ReservedRoundingMode {
                word: 0x00b55553,
                rm: 5
            })
        );
    }

    #[test]
    fn test_reserved_rounding_mode_r4() {
        // fmadd.s with rm = 5
        let inst = Inst::new(0x80665143).unwrap();
        assert_eq!(
            render(&inst, &Config::default()),
            Err(DecodeErr::ReservedRoundingMode {
                word: 0x80665143,
                rm: 5
            })
        );

        let inst = Inst::new(0x80666143).unwrap();
        assert_eq!(
            render(&inst, &Config::default()),
            Err(DecodeErr::ReservedRoundingMode {
                word: 0x80666143,
                rm: 6
            })
        );
    }

    #[test]
    fn test_upper_imm() {
        let inst = Inst::new(0x12345537).unwrap();
        let raw = render(&inst, &Config::default()).unwrap().unwrap();
        assert_eq!(raw.to_string(), "LUI a0, 0x12345");

        let cfg = Config {
            upper_imm: UpperImm::Shifted,
            ..Config::default()
        };
        let shifted = render(&inst, &cfg).unwrap().unwrap();
        assert_eq!(shifted.to_string(), "LUI a0, 0x12345000");
    }
}
