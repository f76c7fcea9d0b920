use std::fmt;

//-------------------------------

/// Integer registers, by ABI name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Reg {
    Zero = 0,
    Ra,
    Sp,
    Gp,
    Tp,
    T0,
    T1,
    T2,
    S0,
    S1,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
    S10,
    S11,
    T3,
    T4,
    T5,
    T6,
}

const XREGS: [Reg; 32] = {
    use Reg::*;
    [
        Zero, Ra, Sp, Gp, Tp, T0, T1, T2, S0, S1, A0, A1, A2, A3, A4, A5, A6, A7, S2, S3, S4, S5,
        S6, S7, S8, S9, S10, S11, T3, T4, T5, T6,
    ]
};

impl Reg {
    pub fn name(self) -> &'static str {
        use Reg::*;
        match self {
            Zero => "zero",
            Ra => "ra",
            Sp => "sp",
            Gp => "gp",
            Tp => "tp",
            T0 => "t0",
            T1 => "t1",
            T2 => "t2",
            S0 => "s0",
            S1 => "s1",
            A0 => "a0",
            A1 => "a1",
            A2 => "a2",
            A3 => "a3",
            A4 => "a4",
            A5 => "a5",
            A6 => "a6",
            A7 => "a7",
            S2 => "s2",
            S3 => "s3",
            S4 => "s4",
            S5 => "s5",
            S6 => "s6",
            S7 => "s7",
            S8 => "s8",
            S9 => "s9",
            S10 => "s10",
            S11 => "s11",
            T3 => "t3",
            T4 => "t4",
            T5 => "t5",
            T6 => "t6",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Only the low 5 bits are significant, so every index maps to a register.
impl From<u32> for Reg {
    fn from(v: u32) -> Self {
        XREGS[(v & 0b11111) as usize]
    }
}

//-------------------------------

/// Floating point registers, by ABI name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FReg {
    Ft0 = 0,
    Ft1,
    Ft2,
    Ft3,
    Ft4,
    Ft5,
    Ft6,
    Ft7,
    Fs0,
    Fs1,
    Fa0,
    Fa1,
    Fa2,
    Fa3,
    Fa4,
    Fa5,
    Fa6,
    Fa7,
    Fs2,
    Fs3,
    Fs4,
    Fs5,
    Fs6,
    Fs7,
    Fs8,
    Fs9,
    Fs10,
    Fs11,
    Ft8,
    Ft9,
    Ft10,
    Ft11,
}

const FREGS: [FReg; 32] = {
    use FReg::*;
    [
        Ft0, Ft1, Ft2, Ft3, Ft4, Ft5, Ft6, Ft7, Fs0, Fs1, Fa0, Fa1, Fa2, Fa3, Fa4, Fa5, Fa6, Fa7,
        Fs2, Fs3, Fs4, Fs5, Fs6, Fs7, Fs8, Fs9, Fs10, Fs11, Ft8, Ft9, Ft10, Ft11,
    ]
};

impl FReg {
    pub fn name(self) -> &'static str {
        use FReg::*;
        match self {
            Ft0 => "ft0",
            Ft1 => "ft1",
            Ft2 => "ft2",
            Ft3 => "ft3",
            Ft4 => "ft4",
            Ft5 => "ft5",
            Ft6 => "ft6",
            Ft7 => "ft7",
            Fs0 => "fs0",
            Fs1 => "fs1",
            Fa0 => "fa0",
            Fa1 => "fa1",
            Fa2 => "fa2",
            Fa3 => "fa3",
            Fa4 => "fa4",
            Fa5 => "fa5",
            Fa6 => "fa6",
            Fa7 => "fa7",
            Fs2 => "fs2",
            Fs3 => "fs3",
            Fs4 => "fs4",
            Fs5 => "fs5",
            Fs6 => "fs6",
            Fs7 => "fs7",
            Fs8 => "fs8",
            Fs9 => "fs9",
            Fs10 => "fs10",
            Fs11 => "fs11",
            Ft8 => "ft8",
            Ft9 => "ft9",
            Ft10 => "ft10",
            Ft11 => "ft11",
        }
    }
}

impl fmt::Display for FReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<u32> for FReg {
    fn from(v: u32) -> Self {
        FREGS[(v & 0b11111) as usize]
    }
}

//-------------------------------

/// Name of register `index`, from the integer or floating point file.
pub fn reg_name(index: u32, float: bool) -> &'static str {
    if float {
        FReg::from(index).name()
    } else {
        Reg::from(index).name()
    }
}

//-------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order() {
        for i in 0..32 {
            assert_eq!(Reg::from(i) as u32, i);
            assert_eq!(FReg::from(i) as u32, i);
        }
    }

    #[test]
    fn test_abi_names() {
        assert_eq!(Reg::from(0).to_string(), "zero");
        assert_eq!(Reg::from(2).to_string(), "sp");
        assert_eq!(Reg::from(8).to_string(), "s0");
        assert_eq!(Reg::from(10).to_string(), "a0");
        assert_eq!(Reg::from(31).to_string(), "t6");

        assert_eq!(FReg::from(0).to_string(), "ft0");
        assert_eq!(FReg::from(8).to_string(), "fs0");
        assert_eq!(FReg::from(10).to_string(), "fa0");
        assert_eq!(FReg::from(28).to_string(), "ft8");
        assert_eq!(FReg::from(31).to_string(), "ft11");
    }

    #[test]
    fn test_high_bits_ignored() {
        assert_eq!(Reg::from(0b100001), Reg::Ra);
        assert_eq!(reg_name(0xffff_ffea, false), "a0");
        assert_eq!(reg_name(0xffff_ffea, true), "fa0");
    }
}
