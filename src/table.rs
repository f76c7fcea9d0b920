use log::*;
use std::fmt;
use std::ops::BitOr;

use crate::decode::{DecodeErr, Format, Result};

//-------------------------------

/// Target register width.  Only the shift amount width and the
/// availability of the RV64-only instructions depend on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Isa {
    Rv32,
    Rv64,
    Rv128,
}

impl Default for Isa {
    fn default() -> Self {
        Isa::Rv64
    }
}

impl Isa {
    /// Parses `rv32`, `rv64` or `rv128`, ignoring case.
    pub fn from_name(name: &str) -> Option<Isa> {
        match name.to_ascii_lowercase().as_str() {
            "rv32" => Some(Isa::Rv32),
            "rv64" => Some(Isa::Rv64),
            "rv128" => Some(Isa::Rv128),
            _ => None,
        }
    }

    pub fn shamt_mask(self) -> u32 {
        match self {
            Isa::Rv32 => 0x1f,
            Isa::Rv64 | Isa::Rv128 => 0x3f,
        }
    }

    pub fn supports(self, ext: Extension) -> bool {
        self != Isa::Rv32 || !ext.rv64_only()
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Isa::Rv32 => write!(f, "rv32"),
            Isa::Rv64 => write!(f, "rv64"),
            Isa::Rv128 => write!(f, "rv128"),
        }
    }
}

//-------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extension {
    I,
    Rv64I,
    M,
    Rv64M,
    A,
    Rv64A,
    F,
    Rv64F,
    D,
    Rv64D,
    Q,
    Rv64Q,
    Zicsr,
    Zifencei,
    Priv,
}

impl Extension {
    pub fn rv64_only(self) -> bool {
        use Extension::*;
        matches!(self, Rv64I | Rv64M | Rv64A | Rv64F | Rv64D | Rv64Q)
    }
}

//-------------------------------

/// Rendering exceptions attached to a descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u16);

impl Flags {
    pub const NONE: Flags = Flags(0);

    /// Operands are floating point registers.
    pub const FLOAT: Flags = Flags(1 << 0);

    /// A extension, has aq/rl bits.
    pub const ATOMIC: Flags = Flags(1 << 1);

    /// Renders as `reg, offset(base)`.
    pub const LOAD_STORE: Flags = Flags(1 << 2);

    /// The immediate is a CSR address.
    pub const CSR: Flags = Flags(1 << 3);

    /// rs1 is a 5 bit unsigned immediate rather than a register.
    pub const CSR_IMM: Flags = Flags(1 << 4);

    /// No operands.
    pub const SYSTEM: Flags = Flags(1 << 5);

    pub const FENCE: Flags = Flags(1 << 6);

    /// The immediate is an unsigned shift amount.
    pub const SHAMT: Flags = Flags(1 << 7);

    /// Single source float op, rs2 is part of the encoding.
    pub const UNARY: Flags = Flags(1 << 8);

    /// Float op writing an integer register.
    pub const INT_RD: Flags = Flags(1 << 9);

    /// Float op reading an integer register.
    pub const INT_RS1: Flags = Flags(1 << 10);

    pub const fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    pub const fn contains(self, other: Flags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        self.union(rhs)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 11] = [
            (Flags::FLOAT, "FLOAT"),
            (Flags::ATOMIC, "ATOMIC"),
            (Flags::LOAD_STORE, "LOAD_STORE"),
            (Flags::CSR, "CSR"),
            (Flags::CSR_IMM, "CSR_IMM"),
            (Flags::SYSTEM, "SYSTEM"),
            (Flags::FENCE, "FENCE"),
            (Flags::SHAMT, "SHAMT"),
            (Flags::UNARY, "UNARY"),
            (Flags::INT_RD, "INT_RD"),
            (Flags::INT_RS1, "INT_RS1"),
        ];

        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

//-------------------------------

/// One concrete instruction: `(bits & mask) == match_val` identifies it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub match_val: u32,
    pub mask: u32,
    pub mnemonic: &'static str,
    pub flags: Flags,
    pub ext: Extension,
}

impl Descriptor {
    pub const fn new(
        match_val: u32,
        mask: u32,
        mnemonic: &'static str,
        ext: Extension,
        flags: Flags,
    ) -> Self {
        Descriptor {
            match_val,
            mask,
            mnemonic,
            flags,
            ext,
        }
    }

    #[inline]
    pub fn matches(&self, bits: u32) -> bool {
        (bits & self.mask) == self.match_val
    }

    /// True if some word matches both descriptors.
    pub fn conflicts_with(&self, other: &Descriptor) -> bool {
        let common = self.mask & other.mask;
        (self.match_val & common) == (other.match_val & common)
    }

    /// Float ops only have a rounding mode if funct3 isn't part of the
    /// encoding.
    pub fn has_rounding_mode(&self) -> bool {
        self.flags.contains(Flags::FLOAT)
            && !self.flags.contains(Flags::LOAD_STORE)
            && (self.mask & 0x7000) == 0
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("mnemonic", &self.mnemonic)
            .field("match_val", &format_args!("0x{:08x}", self.match_val))
            .field("mask", &format_args!("0x{:08x}", self.mask))
            .field("flags", &self.flags)
            .field("ext", &self.ext)
            .finish()
    }
}

//-------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingMode {
    Rne,
    Rtz,
    Rdn,
    Rup,
    Rmm,
    Dyn,
}

impl RoundingMode {
    /// Decodes the 3 bit rm field, 0b101 and 0b110 are reserved.
    pub fn from_bits(rm: u32) -> Option<Self> {
        use RoundingMode::*;
        match rm & 0b111 {
            0b000 => Some(Rne),
            0b001 => Some(Rtz),
            0b010 => Some(Rdn),
            0b011 => Some(Rup),
            0b100 => Some(Rmm),
            0b111 => Some(Dyn),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        use RoundingMode::*;
        match self {
            Rne => "RNE",
            Rtz => "RTZ",
            Rdn => "RDN",
            Rup => "RUP",
            Rmm => "RMM",
            Dyn => "DYN",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//-------------------------------

pub const OP_LOAD: u8 = 0x03;
pub const OP_LOAD_FP: u8 = 0x07;
pub const OP_MISC_MEM: u8 = 0x0f;
pub const OP_IMM: u8 = 0x13;
pub const OP_AUIPC: u8 = 0x17;
pub const OP_IMM_32: u8 = 0x1b;
pub const OP_STORE: u8 = 0x23;
pub const OP_STORE_FP: u8 = 0x27;
pub const OP_AMO: u8 = 0x2f;
pub const OP_REG: u8 = 0x33;
pub const OP_LUI: u8 = 0x37;
pub const OP_REG_32: u8 = 0x3b;
pub const OP_MADD: u8 = 0x43;
pub const OP_MSUB: u8 = 0x47;
pub const OP_NMSUB: u8 = 0x4b;
pub const OP_NMADD: u8 = 0x4f;
pub const OP_FP: u8 = 0x53;
pub const OP_BRANCH: u8 = 0x63;
pub const OP_JALR: u8 = 0x67;
pub const OP_JAL: u8 = 0x6f;
pub const OP_SYSTEM: u8 = 0x73;

/// Every opcode with a format, in ascending order.
pub static OPCODES: [u8; 21] = [
    OP_LOAD,
    OP_LOAD_FP,
    OP_MISC_MEM,
    OP_IMM,
    OP_AUIPC,
    OP_IMM_32,
    OP_STORE,
    OP_STORE_FP,
    OP_AMO,
    OP_REG,
    OP_LUI,
    OP_REG_32,
    OP_MADD,
    OP_MSUB,
    OP_NMSUB,
    OP_NMADD,
    OP_FP,
    OP_BRANCH,
    OP_JALR,
    OP_JAL,
    OP_SYSTEM,
];

const fn build_formats() -> [Option<Format>; 128] {
    let mut formats = [None; 128];

    formats[OP_LUI as usize] = Some(Format::U);
    formats[OP_AUIPC as usize] = Some(Format::U);
    formats[OP_JAL as usize] = Some(Format::J);
    formats[OP_JALR as usize] = Some(Format::I);
    formats[OP_BRANCH as usize] = Some(Format::B);
    formats[OP_LOAD as usize] = Some(Format::I);
    formats[OP_STORE as usize] = Some(Format::S);
    formats[OP_IMM as usize] = Some(Format::I);
    formats[OP_REG as usize] = Some(Format::R);

    // FENCE is I format with the pred/succ sets packed into the immediate.
    formats[OP_MISC_MEM as usize] = Some(Format::I);
    formats[OP_SYSTEM as usize] = Some(Format::I);
    formats[OP_IMM_32 as usize] = Some(Format::I);
    formats[OP_REG_32 as usize] = Some(Format::R);
    formats[OP_AMO as usize] = Some(Format::R);

    formats[OP_LOAD_FP as usize] = Some(Format::I);
    formats[OP_STORE_FP as usize] = Some(Format::S);
    formats[OP_MADD as usize] = Some(Format::R4);
    formats[OP_MSUB as usize] = Some(Format::R4);
    formats[OP_NMSUB as usize] = Some(Format::R4);
    formats[OP_NMADD as usize] = Some(Format::R4);
    formats[OP_FP as usize] = Some(Format::R);

    formats
}

static FORMATS: [Option<Format>; 128] = build_formats();

/// The format of every instruction with this opcode.
pub fn format_of(opcode: u8) -> Option<Format> {
    FORMATS.get(opcode as usize).copied().flatten()
}

//-------------------------------

use Extension::*;

const NONE: Flags = Flags::NONE;
const FLOAT: Flags = Flags::FLOAT;
const SHAMT: Flags = Flags::SHAMT;
const LS: Flags = Flags::LOAD_STORE;
const FLS: Flags = Flags::FLOAT.union(Flags::LOAD_STORE);
const FUN: Flags = Flags::FLOAT.union(Flags::UNARY);
const FCMP: Flags = Flags::FLOAT.union(Flags::INT_RD);
const FTOX: Flags = FUN.union(Flags::INT_RD);
const XTOF: Flags = FUN.union(Flags::INT_RS1);
const AMO: Flags = Flags::ATOMIC;
const CSR: Flags = Flags::CSR;
const CSRI: Flags = Flags::CSR.union(Flags::CSR_IMM);
const SYS: Flags = Flags::SYSTEM;
const FENCE: Flags = Flags::FENCE;

const fn d(match_val: u32, mask: u32, mnemonic: &'static str, ext: Extension, flags: Flags) -> Descriptor {
    Descriptor::new(match_val, mask, mnemonic, ext, flags)
}

static BRANCH: [Descriptor; 6] = [
    d(0x63, 0x707f, "BEQ", I, NONE),
    d(0x1063, 0x707f, "BNE", I, NONE),
    d(0x4063, 0x707f, "BLT", I, NONE),
    d(0x5063, 0x707f, "BGE", I, NONE),
    d(0x6063, 0x707f, "BLTU", I, NONE),
    d(0x7063, 0x707f, "BGEU", I, NONE),
];

static JALR: [Descriptor; 1] = [d(0x67, 0x707f, "JALR", I, NONE)];

static JAL: [Descriptor; 1] = [d(0x6f, 0x7f, "JAL", I, NONE)];

static LUI: [Descriptor; 1] = [d(0x37, 0x7f, "LUI", I, NONE)];

static AUIPC: [Descriptor; 1] = [d(0x17, 0x7f, "AUIPC", I, NONE)];

static IMM: [Descriptor; 9] = [
    d(0x13, 0x707f, "ADDI", I, NONE),
    d(0x1013, 0xfc00707f, "SLLI", I, SHAMT),
    d(0x2013, 0x707f, "SLTI", I, NONE),
    d(0x3013, 0x707f, "SLTIU", I, NONE),
    d(0x4013, 0x707f, "XORI", I, NONE),
    d(0x5013, 0xfc00707f, "SRLI", I, SHAMT),
    d(0x40005013, 0xfc00707f, "SRAI", I, SHAMT),
    d(0x6013, 0x707f, "ORI", I, NONE),
    d(0x7013, 0x707f, "ANDI", I, NONE),
];

static REG: [Descriptor; 18] = [
    d(0x33, 0xfe00707f, "ADD", I, NONE),
    d(0x40000033, 0xfe00707f, "SUB", I, NONE),
    d(0x1033, 0xfe00707f, "SLL", I, NONE),
    d(0x2033, 0xfe00707f, "SLT", I, NONE),
    d(0x3033, 0xfe00707f, "SLTU", I, NONE),
    d(0x4033, 0xfe00707f, "XOR", I, NONE),
    d(0x5033, 0xfe00707f, "SRL", I, NONE),
    d(0x40005033, 0xfe00707f, "SRA", I, NONE),
    d(0x6033, 0xfe00707f, "OR", I, NONE),
    d(0x7033, 0xfe00707f, "AND", I, NONE),
    d(0x2000033, 0xfe00707f, "MUL", M, NONE),
    d(0x2001033, 0xfe00707f, "MULH", M, NONE),
    d(0x2002033, 0xfe00707f, "MULHSU", M, NONE),
    d(0x2003033, 0xfe00707f, "MULHU", M, NONE),
    d(0x2004033, 0xfe00707f, "DIV", M, NONE),
    d(0x2005033, 0xfe00707f, "DIVU", M, NONE),
    d(0x2006033, 0xfe00707f, "REM", M, NONE),
    d(0x2007033, 0xfe00707f, "REMU", M, NONE),
];

static LOAD: [Descriptor; 7] = [
    d(0x3, 0x707f, "LB", I, LS),
    d(0x1003, 0x707f, "LH", I, LS),
    d(0x2003, 0x707f, "LW", I, LS),
    d(0x4003, 0x707f, "LBU", I, LS),
    d(0x5003, 0x707f, "LHU", I, LS),
    d(0x3003, 0x707f, "LD", Rv64I, LS),
    d(0x6003, 0x707f, "LWU", Rv64I, LS),
];

static STORE: [Descriptor; 4] = [
    d(0x23, 0x707f, "SB", I, LS),
    d(0x1023, 0x707f, "SH", I, LS),
    d(0x2023, 0x707f, "SW", I, LS),
    d(0x3023, 0x707f, "SD", Rv64I, LS),
];

static MISC_MEM: [Descriptor; 2] = [
    d(0xf, 0x707f, "FENCE", I, FENCE),
    d(0x100f, 0x707f, "FENCE.I", Zifencei, SYS),
];

// The exact matches come first, the CSR ops only check funct3.
static SYSTEM: [Descriptor; 11] = [
    d(0x73, 0xffffffff, "ECALL", I, SYS),
    d(0x100073, 0xffffffff, "EBREAK", I, SYS),
    d(0x10200073, 0xffffffff, "SRET", Priv, SYS),
    d(0x30200073, 0xffffffff, "MRET", Priv, SYS),
    d(0x10500073, 0xffffffff, "WFI", Priv, SYS),
    d(0x1073, 0x707f, "CSRRW", Zicsr, CSR),
    d(0x2073, 0x707f, "CSRRS", Zicsr, CSR),
    d(0x3073, 0x707f, "CSRRC", Zicsr, CSR),
    d(0x5073, 0x707f, "CSRRWI", Zicsr, CSRI),
    d(0x6073, 0x707f, "CSRRSI", Zicsr, CSRI),
    d(0x7073, 0x707f, "CSRRCI", Zicsr, CSRI),
];

static IMM_32: [Descriptor; 4] = [
    d(0x1b, 0x707f, "ADDIW", Rv64I, NONE),
    d(0x101b, 0xfe00707f, "SLLIW", Rv64I, SHAMT),
    d(0x501b, 0xfe00707f, "SRLIW", Rv64I, SHAMT),
    d(0x4000501b, 0xfe00707f, "SRAIW", Rv64I, SHAMT),
];

static REG_32: [Descriptor; 10] = [
    d(0x3b, 0xfe00707f, "ADDW", Rv64I, NONE),
    d(0x4000003b, 0xfe00707f, "SUBW", Rv64I, NONE),
    d(0x103b, 0xfe00707f, "SLLW", Rv64I, NONE),
    d(0x503b, 0xfe00707f, "SRLW", Rv64I, NONE),
    d(0x4000503b, 0xfe00707f, "SRAW", Rv64I, NONE),
    d(0x200003b, 0xfe00707f, "MULW", Rv64M, NONE),
    d(0x200403b, 0xfe00707f, "DIVW", Rv64M, NONE),
    d(0x200503b, 0xfe00707f, "DIVUW", Rv64M, NONE),
    d(0x200603b, 0xfe00707f, "REMW", Rv64M, NONE),
    d(0x200703b, 0xfe00707f, "REMUW", Rv64M, NONE),
];

static ATOMIC: [Descriptor; 22] = [
    d(0x202f, 0xf800707f, "AMOADD.W", A, AMO),
    d(0x2000202f, 0xf800707f, "AMOXOR.W", A, AMO),
    d(0x4000202f, 0xf800707f, "AMOOR.W", A, AMO),
    d(0x6000202f, 0xf800707f, "AMOAND.W", A, AMO),
    d(0x8000202f, 0xf800707f, "AMOMIN.W", A, AMO),
    d(0xa000202f, 0xf800707f, "AMOMAX.W", A, AMO),
    d(0xc000202f, 0xf800707f, "AMOMINU.W", A, AMO),
    d(0xe000202f, 0xf800707f, "AMOMAXU.W", A, AMO),
    d(0x800202f, 0xf800707f, "AMOSWAP.W", A, AMO),
    d(0x1000202f, 0xf9f0707f, "LR.W", A, AMO),
    d(0x1800202f, 0xf800707f, "SC.W", A, AMO),
    d(0x302f, 0xf800707f, "AMOADD.D", Rv64A, AMO),
    d(0x2000302f, 0xf800707f, "AMOXOR.D", Rv64A, AMO),
    d(0x4000302f, 0xf800707f, "AMOOR.D", Rv64A, AMO),
    d(0x6000302f, 0xf800707f, "AMOAND.D", Rv64A, AMO),
    d(0x8000302f, 0xf800707f, "AMOMIN.D", Rv64A, AMO),
    d(0xa000302f, 0xf800707f, "AMOMAX.D", Rv64A, AMO),
    d(0xc000302f, 0xf800707f, "AMOMINU.D", Rv64A, AMO),
    d(0xe000302f, 0xf800707f, "AMOMAXU.D", Rv64A, AMO),
    d(0x800302f, 0xf800707f, "AMOSWAP.D", Rv64A, AMO),
    d(0x1000302f, 0xf9f0707f, "LR.D", Rv64A, AMO),
    d(0x1800302f, 0xf800707f, "SC.D", Rv64A, AMO),
];

static LOAD_FP: [Descriptor; 3] = [
    d(0x2007, 0x707f, "FLW", F, FLS),
    d(0x3007, 0x707f, "FLD", D, FLS),
    d(0x4007, 0x707f, "FLQ", Q, FLS),
];

static STORE_FP: [Descriptor; 3] = [
    d(0x2027, 0x707f, "FSW", F, FLS),
    d(0x3027, 0x707f, "FSD", D, FLS),
    d(0x4027, 0x707f, "FSQ", Q, FLS),
];

static MADD: [Descriptor; 3] = [
    d(0x43, 0x600007f, "FMADD.S", F, FLOAT),
    d(0x2000043, 0x600007f, "FMADD.D", D, FLOAT),
    d(0x6000043, 0x600007f, "FMADD.Q", Q, FLOAT),
];

static MSUB: [Descriptor; 3] = [
    d(0x47, 0x600007f, "FMSUB.S", F, FLOAT),
    d(0x2000047, 0x600007f, "FMSUB.D", D, FLOAT),
    d(0x6000047, 0x600007f, "FMSUB.Q", Q, FLOAT),
];

static NMSUB: [Descriptor; 3] = [
    d(0x4b, 0x600007f, "FNMSUB.S", F, FLOAT),
    d(0x200004b, 0x600007f, "FNMSUB.D", D, FLOAT),
    d(0x600004b, 0x600007f, "FNMSUB.Q", Q, FLOAT),
];

static NMADD: [Descriptor; 3] = [
    d(0x4f, 0x600007f, "FNMADD.S", F, FLOAT),
    d(0x200004f, 0x600007f, "FNMADD.D", D, FLOAT),
    d(0x600004f, 0x600007f, "FNMADD.Q", Q, FLOAT),
];

static FP: [Descriptor; 76] = [
    // F
    d(0x53, 0xfe00007f, "FADD.S", F, FLOAT),
    d(0x8000053, 0xfe00007f, "FSUB.S", F, FLOAT),
    d(0x10000053, 0xfe00007f, "FMUL.S", F, FLOAT),
    d(0x18000053, 0xfe00007f, "FDIV.S", F, FLOAT),
    d(0x20000053, 0xfe00707f, "FSGNJ.S", F, FLOAT),
    d(0x20001053, 0xfe00707f, "FSGNJN.S", F, FLOAT),
    d(0x20002053, 0xfe00707f, "FSGNJX.S", F, FLOAT),
    d(0x28000053, 0xfe00707f, "FMIN.S", F, FLOAT),
    d(0x28001053, 0xfe00707f, "FMAX.S", F, FLOAT),
    d(0x58000053, 0xfff0007f, "FSQRT.S", F, FUN),
    d(0xa0000053, 0xfe00707f, "FLE.S", F, FCMP),
    d(0xa0001053, 0xfe00707f, "FLT.S", F, FCMP),
    d(0xa0002053, 0xfe00707f, "FEQ.S", F, FCMP),
    d(0xc0000053, 0xfff0007f, "FCVT.W.S", F, FTOX),
    d(0xc0100053, 0xfff0007f, "FCVT.WU.S", F, FTOX),
    d(0xe0000053, 0xfff0707f, "FMV.X.W", F, FTOX),
    d(0xe0001053, 0xfff0707f, "FCLASS.S", F, FTOX),
    d(0xd0000053, 0xfff0007f, "FCVT.S.W", F, XTOF),
    d(0xd0100053, 0xfff0007f, "FCVT.S.WU", F, XTOF),
    d(0xf0000053, 0xfff0707f, "FMV.W.X", F, XTOF),
    d(0xc0200053, 0xfff0007f, "FCVT.L.S", Rv64F, FTOX),
    d(0xc0300053, 0xfff0007f, "FCVT.LU.S", Rv64F, FTOX),
    d(0xd0200053, 0xfff0007f, "FCVT.S.L", Rv64F, XTOF),
    d(0xd0300053, 0xfff0007f, "FCVT.S.LU", Rv64F, XTOF),
    // D
    d(0x2000053, 0xfe00007f, "FADD.D", D, FLOAT),
    d(0xa000053, 0xfe00007f, "FSUB.D", D, FLOAT),
    d(0x12000053, 0xfe00007f, "FMUL.D", D, FLOAT),
    d(0x1a000053, 0xfe00007f, "FDIV.D", D, FLOAT),
    d(0x22000053, 0xfe00707f, "FSGNJ.D", D, FLOAT),
    d(0x22001053, 0xfe00707f, "FSGNJN.D", D, FLOAT),
    d(0x22002053, 0xfe00707f, "FSGNJX.D", D, FLOAT),
    d(0x2a000053, 0xfe00707f, "FMIN.D", D, FLOAT),
    d(0x2a001053, 0xfe00707f, "FMAX.D", D, FLOAT),
    d(0x40100053, 0xfff0007f, "FCVT.S.D", D, FUN),
    d(0x42000053, 0xfff0007f, "FCVT.D.S", D, FUN),
    d(0x5a000053, 0xfff0007f, "FSQRT.D", D, FUN),
    d(0xa2000053, 0xfe00707f, "FLE.D", D, FCMP),
    d(0xa2001053, 0xfe00707f, "FLT.D", D, FCMP),
    d(0xa2002053, 0xfe00707f, "FEQ.D", D, FCMP),
    d(0xc2000053, 0xfff0007f, "FCVT.W.D", D, FTOX),
    d(0xc2100053, 0xfff0007f, "FCVT.WU.D", D, FTOX),
    d(0xe2001053, 0xfff0707f, "FCLASS.D", D, FTOX),
    d(0xd2000053, 0xfff0007f, "FCVT.D.W", D, XTOF),
    d(0xd2100053, 0xfff0007f, "FCVT.D.WU", D, XTOF),
    d(0xc2200053, 0xfff0007f, "FCVT.L.D", Rv64D, FTOX),
    d(0xc2300053, 0xfff0007f, "FCVT.LU.D", Rv64D, FTOX),
    d(0xe2000053, 0xfff0707f, "FMV.X.D", Rv64D, FTOX),
    d(0xd2200053, 0xfff0007f, "FCVT.D.L", Rv64D, XTOF),
    d(0xd2300053, 0xfff0007f, "FCVT.D.LU", Rv64D, XTOF),
    d(0xf2000053, 0xfff0707f, "FMV.D.X", Rv64D, XTOF),
    // Q
    d(0x6000053, 0xfe00007f, "FADD.Q", Q, FLOAT),
    d(0xe000053, 0xfe00007f, "FSUB.Q", Q, FLOAT),
    d(0x16000053, 0xfe00007f, "FMUL.Q", Q, FLOAT),
    d(0x1e000053, 0xfe00007f, "FDIV.Q", Q, FLOAT),
    d(0x26000053, 0xfe00707f, "FSGNJ.Q", Q, FLOAT),
    d(0x26001053, 0xfe00707f, "FSGNJN.Q", Q, FLOAT),
    d(0x26002053, 0xfe00707f, "FSGNJX.Q", Q, FLOAT),
    d(0x2e000053, 0xfe00707f, "FMIN.Q", Q, FLOAT),
    d(0x2e001053, 0xfe00707f, "FMAX.Q", Q, FLOAT),
    d(0x40300053, 0xfff0007f, "FCVT.S.Q", Q, FUN),
    d(0x46000053, 0xfff0007f, "FCVT.Q.S", Q, FUN),
    d(0x42300053, 0xfff0007f, "FCVT.D.Q", Q, FUN),
    d(0x46100053, 0xfff0007f, "FCVT.Q.D", Q, FUN),
    d(0x5e000053, 0xfff0007f, "FSQRT.Q", Q, FUN),
    d(0xa6000053, 0xfe00707f, "FLE.Q", Q, FCMP),
    d(0xa6001053, 0xfe00707f, "FLT.Q", Q, FCMP),
    d(0xa6002053, 0xfe00707f, "FEQ.Q", Q, FCMP),
    d(0xc6000053, 0xfff0007f, "FCVT.W.Q", Q, FTOX),
    d(0xc6100053, 0xfff0007f, "FCVT.WU.Q", Q, FTOX),
    d(0xe6001053, 0xfff0707f, "FCLASS.Q", Q, FTOX),
    d(0xd6000053, 0xfff0007f, "FCVT.Q.W", Q, XTOF),
    d(0xd6100053, 0xfff0007f, "FCVT.Q.WU", Q, XTOF),
    d(0xc6200053, 0xfff0007f, "FCVT.L.Q", Rv64Q, FTOX),
    d(0xc6300053, 0xfff0007f, "FCVT.LU.Q", Rv64Q, FTOX),
    d(0xd6200053, 0xfff0007f, "FCVT.Q.L", Rv64Q, XTOF),
    d(0xd6300053, 0xfff0007f, "FCVT.Q.LU", Rv64Q, XTOF),
];

/// The candidate instructions for an opcode, in the order they're
/// tried.  Order matters where the masks would otherwise overlap.
pub fn candidates(opcode: u8) -> Option<&'static [Descriptor]> {
    let table: &'static [Descriptor] = match opcode {
        OP_BRANCH => &BRANCH,
        OP_JALR => &JALR,
        OP_JAL => &JAL,
        OP_LUI => &LUI,
        OP_AUIPC => &AUIPC,
        OP_IMM => &IMM,
        OP_REG => &REG,
        OP_LOAD => &LOAD,
        OP_STORE => &STORE,
        OP_MISC_MEM => &MISC_MEM,
        OP_SYSTEM => &SYSTEM,
        OP_IMM_32 => &IMM_32,
        OP_REG_32 => &REG_32,
        OP_AMO => &ATOMIC,
        OP_LOAD_FP => &LOAD_FP,
        OP_STORE_FP => &STORE_FP,
        OP_MADD => &MADD,
        OP_MSUB => &MSUB,
        OP_NMSUB => &NMSUB,
        OP_NMADD => &NMADD,
        OP_FP => &FP,
        _ => return None,
    };
    Some(table)
}

/// Finds the first candidate matching `bits` that the isa provides.
/// `Ok(None)` means the opcode is known but nothing matched.
pub fn lookup(bits: u32, isa: Isa) -> Result<Option<&'static Descriptor>> {
    let opcode = (bits & 0b1111111) as u8;
    let table = candidates(opcode).ok_or(DecodeErr::MissingTable(opcode))?;

    for desc in table {
        if desc.matches(bits) {
            if isa.supports(desc.ext) {
                return Ok(Some(desc));
            }
            trace!("{} not available on {}", desc.mnemonic, isa);
        }
    }

    Ok(None)
}

/// Every descriptor in the table, paired with its opcode.
pub fn descriptors() -> impl Iterator<Item = (u8, &'static Descriptor)> {
    OPCODES.iter().flat_map(|&op| {
        candidates(op)
            .unwrap_or(&[])
            .iter()
            .map(move |desc| (op, desc))
    })
}

//-------------------------------

#[test]
fn test_format_and_match_tables_agree() {
    for op in 0..128u8 {
        assert_eq!(format_of(op).is_some(), candidates(op).is_some(), "opcode 0x{:02x}", op);
    }
    assert_eq!(format_of(0x7f), None);
    assert_eq!(format_of(200), None);
}

#[test]
fn test_descriptor_opcodes() {
    for (op, desc) in descriptors() {
        assert_eq!((desc.match_val & 0x7f) as u8, op, "{:?}", desc);
        assert_eq!(desc.mask & 0x7f, 0x7f, "{:?}", desc);
        assert_eq!(desc.match_val & !desc.mask, 0, "{:?}", desc);
    }
}

#[test]
fn test_rounding_modes() {
    assert_eq!(RoundingMode::from_bits(0), Some(RoundingMode::Rne));
    assert_eq!(RoundingMode::from_bits(4), Some(RoundingMode::Rmm));
    assert_eq!(RoundingMode::from_bits(5), None);
    assert_eq!(RoundingMode::from_bits(6), None);
    assert_eq!(RoundingMode::from_bits(7).map(|rm| rm.name()), Some("DYN"));
}

#[test]
fn test_has_rounding_mode() {
    let find = |name: &str| descriptors().find(|(_, d)| d.mnemonic == name).unwrap().1;
    assert!(find("FADD.S").has_rounding_mode());
    assert!(find("FMADD.D").has_rounding_mode());
    assert!(find("FCVT.W.S").has_rounding_mode());
    assert!(!find("FSGNJ.S").has_rounding_mode());
    assert!(!find("FMV.X.W").has_rounding_mode());
    assert!(!find("FLW").has_rounding_mode());
    assert!(!find("ADD").has_rounding_mode());
}

#[test]
fn test_isa_availability() {
    // ld a0, 0(sp)
    let ld = 0x00013503;
    assert_eq!(lookup(ld, Isa::Rv64).unwrap().map(|d| d.mnemonic), Some("LD"));
    assert_eq!(lookup(ld, Isa::Rv32).unwrap(), None);
    assert_eq!(lookup(ld, Isa::Rv128).unwrap().map(|d| d.mnemonic), Some("LD"));
}

#[test]
fn test_flags_debug() {
    assert_eq!(format!("{:?}", Flags::NONE), "NONE");
    assert_eq!(format!("{:?}", FLS), "FLOAT | LOAD_STORE");
    assert!(CSRI.contains(Flags::CSR));
    assert!(!CSR.contains(Flags::CSR_IMM));
}

#[test]
fn test_fence_descriptors() {
    let fence = lookup(0x0000000f, Isa::Rv64).unwrap().unwrap();
    assert_eq!(fence.flags, Flags::FENCE);

    // FENCE.I takes no operands, so it renders like ECALL.
    let fence_i = lookup(0x0000100f, Isa::Rv64).unwrap().unwrap();
    assert_eq!(fence_i.mnemonic, "FENCE.I");
    assert_eq!(fence_i.flags, Flags::SYSTEM);
}

#[test]
fn test_isa_names() {
    for isa in &[Isa::Rv32, Isa::Rv64, Isa::Rv128] {
        assert_eq!(Isa::from_name(&isa.to_string()), Some(*isa));
    }
    assert_eq!(Isa::from_name("RV32"), Some(Isa::Rv32));
    assert_eq!(Isa::from_name("rv16"), None);
}
