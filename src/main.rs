extern crate log;
extern crate rv_disasm;

use rv_disasm::disasm::*;
use rv_disasm::input::*;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, Command};
use log::{debug, info};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::exit;

//-------------------------------

fn main() -> Result<()> {
    env_logger::init();

    let parser = Command::new("rv-disasm")
        .version("0")
        .about("Renders RISC-V instruction words as assembly")
        .arg(
            Arg::new("WORDS")
                .help("Instruction words in hex, eg. 0x00850463")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("FILE")
                .help("Read a hex listing from this file")
                .long("file")
                .short('f')
                .value_parser(clap::value_parser!(PathBuf))
                .conflicts_with("BINARY"),
        )
        .arg(
            Arg::new("BINARY")
                .help("Read a little endian binary image from this file")
                .long("binary")
                .short('b')
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ISA")
                .help("Base ISA width")
                .long("isa")
                .value_parser(["rv32", "rv64", "rv128"])
                .default_value("rv64"),
        )
        .arg(
            Arg::new("SHIFT_UPPER")
                .help("Print LUI/AUIPC immediates shifted into bits 31:12")
                .long("shift-upper")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("STRICT")
                .help("Report words that match no instruction")
                .long("strict")
                .action(ArgAction::SetTrue),
        );

    let matches = parser.get_matches();

    let mut words = Vec::new();
    if let Some(path) = matches.get_one::<PathBuf>("FILE") {
        words.extend(read_listing(path)?);
    }
    if let Some(path) = matches.get_one::<PathBuf>("BINARY") {
        words.extend(read_binary_file(path)?);
    }
    if let Some(args) = matches.get_many::<String>("WORDS") {
        let text = args.cloned().collect::<Vec<String>>().join(" ");
        words.extend(parse_listing(&text).context("bad word on command line")?);
    }

    if words.is_empty() {
        return Err(anyhow!("no instruction words given"));
    }

    // clap has already restricted the value and supplies the default.
    let isa = matches
        .get_one::<String>("ISA")
        .and_then(|s| Isa::from_name(s))
        .unwrap_or_default();

    let config = Config {
        isa,
        upper_imm: if matches.get_flag("SHIFT_UPPER") {
            UpperImm::Shifted
        } else {
            UpperImm::Raw
        },
        strict: matches.get_flag("STRICT"),
    };
    debug!("{:?}", config);

    let disasm = Disassembler::new(config);
    let stdout = io::stdout();
    let summary = disasm
        .parse(words, BufWriter::new(stdout.lock()))
        .context("couldn't write output")?;

    info!(
        "rendered {}, unmatched {}, failed {}",
        summary.rendered, summary.unmatched, summary.failed
    );

    if config.strict && summary.failed > 0 {
        eprintln!("{} of {} words failed to decode", summary.failed, summary.total());
        exit(1);
    }

    Ok(())
}

//-------------------------------
