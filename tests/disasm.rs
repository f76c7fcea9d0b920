use rv_disasm::decode::DecodeErr;
use rv_disasm::disasm::*;

//-------------------------------

fn render_with(cfg: Config, word: u32) -> String {
    Disassembler::new(cfg)
        .disassemble(word)
        .unwrap()
        .unwrap()
        .to_string()
}

fn render(word: u32) -> String {
    render_with(Config::default(), word)
}

fn parse(cfg: Config, words: &[u32]) -> (Vec<String>, Summary) {
    let mut out = Vec::new();
    let summary = Disassembler::new(cfg)
        .parse(words.iter().cloned(), &mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    (text.lines().map(|l| l.to_string()).collect(), summary)
}

//-------------------------------

#[test]
fn test_mixed_stream() {
    let words = [
        0x0e218103, 0x00850463, 0x00002e17, 0xee1ff0ef, 0x00e12423, 0x4027d79b, 0x40f707bb,
        0x0cf2030f, 0x00940133, 0x1e30a12f, 0x1200a12f, 0x80660143, 0x257106ef, 0x55533107,
    ];

    let (lines, summary) = parse(Config::default(), &words);
    assert_eq!(
        lines,
        vec![
            "LB sp, 0xe2(gp)",
            "BEQ a0, s0, 0x8",
            "AUIPC t3, 0x2",
            "JAL ra, -0x120",
            "SW a4, 0x8(sp)",
            "SRAIW a5, a5, 0x2",
            "SUBW a5, a4, a5",
            "FENCE io, iorw",
            "ADD sp, s0, s1",
            "SC.W.AQ.RL sp, gp, (ra)",
            "LR.W.RL sp, (ra)",
            "FMADD.S(RNE) ft2, fa2, ft6, fa6",
            "JAL a3, 0x10a56",
            "FLD ft2, 0x555(t1)",
        ]
    );
    assert_eq!(summary.rendered, words.len());
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_beq_scenario() {
    let line = Disassembler::default()
        .disassemble(0x00850463)
        .unwrap()
        .unwrap();
    assert_eq!(line.mnemonic, "BEQ");
    assert_eq!(line.operands, vec!["a0", "s0", "0x8"]);
}

#[test]
fn test_branch_sign_bit() {
    assert_eq!(render(0x80000063), "BEQ zero, zero, -0x1000");
    assert_eq!(render(0xfe000fe3), "BEQ zero, zero, -0x2");
}

#[test]
fn test_shift_amounts() {
    // SRAI with raw imm 0b0100_0010_1111 keeps only the low 6 bits
    assert_eq!(render(0x42f7d793), "SRAI a5, a5, 0x2f");
    assert_eq!(render(0x00351513), "SLLI a0, a0, 0x3");
    assert_eq!(render(0x02051513), "SLLI a0, a0, 0x20");
}

#[test]
fn test_rv32() {
    let rv32 = Config {
        isa: Isa::Rv32,
        ..Config::default()
    };

    // shamt[5] is reserved on RV32
    let d = Disassembler::new(rv32);
    assert_eq!(d.disassemble(0x02051513), Err(DecodeErr::ReservedShamt(0x02051513)));
    assert_eq!(render_with(rv32, 0x01f51513), "SLLI a0, a0, 0x1f");

    // LD only exists on RV64
    assert_eq!(d.disassemble(0x00813503), Ok(None));
    assert_eq!(render(0x00813503), "LD a0, 0x8(sp)");

    let strict = Config {
        strict: true,
        ..rv32
    };
    assert_eq!(
        Disassembler::new(strict).disassemble(0x00813503),
        Err(DecodeErr::NoMatch(0x00813503))
    );
}

#[test]
fn test_fence_forms() {
    assert_eq!(render(0x0000000f), "FENCE , ");
    assert_eq!(render(0x0ff0000f), "FENCE iorw, iorw");
    assert_eq!(render(0x8330000f), "FENCE.TSO rw, rw");
    assert_eq!(render(0x0000100f), "FENCE.I");
}

#[test]
fn test_unknown_opcode() {
    let d = Disassembler::default();
    assert_eq!(d.disassemble(0xffffffff), Err(DecodeErr::UnknownOpcode(0x7f)));
    assert_eq!(d.disassemble(0x0000000b), Err(DecodeErr::UnknownOpcode(0x0b)));

    let (lines, summary) = parse(Config::default(), &[0xffffffff, 0x00000073]);
    assert_eq!(lines, vec!["ECALL"]);
    assert_eq!(summary.failed, 1);
}

#[test]
fn test_silent_no_match() {
    // OP-FP with funct7 0x7f isn't an instruction
    let word = 0xfe000053;
    let (lines, summary) = parse(Config::default(), &[word, 0x00100073]);
    assert_eq!(lines, vec!["EBREAK"]);
    assert_eq!(summary.unmatched, 1);
    assert_eq!(summary.failed, 0);

    let strict = Config {
        strict: true,
        ..Config::default()
    };
    let (lines, summary) = parse(strict, &[word, 0x00100073]);
    assert_eq!(lines, vec!["EBREAK"]);
    assert_eq!(summary.unmatched, 0);
    assert_eq!(summary.failed, 1);
}

#[test]
fn test_reserved_rounding_mode() {
    for rm in [5u32, 6] {
        let word = 0x00b50553 | (rm << 12);
        assert_eq!(
            Disassembler::default().disassemble(word),
            Err(DecodeErr::ReservedRoundingMode { word, rm: rm as u8 })
        );
    }
}

#[test]
fn test_upper_immediates() {
    let shifted = Config {
        upper_imm: UpperImm::Shifted,
        ..Config::default()
    };

    assert_eq!(render(0xfffff537), "LUI a0, -0x1");
    assert_eq!(render_with(shifted, 0xfffff537), "LUI a0, -0x1000");
    assert_eq!(render_with(shifted, 0x00002e17), "AUIPC t3, 0x2000");
}

#[test]
fn test_compressed_words() {
    let d = Disassembler::default();

    // a 32 bit word is always classified by its opcode
    assert_eq!(d.disassemble(0x00008082), Err(DecodeErr::UnknownOpcode(0x02)));
    assert_eq!(d.disassemble_parcel(0x8082), Err(DecodeErr::Compressed(0x8082)));

    // zero padding in an image is an unknown opcode, and the stream carries on
    let (lines, summary) = parse(Config::default(), &[0x00000000, 0x00000073, 0x00000001]);
    assert_eq!(lines, vec!["ECALL"]);
    assert_eq!(summary.failed, 2);
}

//-------------------------------
