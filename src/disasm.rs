use log::*;
use std::io::{self, Write};

use crate::compressed::CInst;
use crate::decode::*;
use crate::render::{render, Line};

pub use crate::render::UpperImm;
pub use crate::table::Isa;

//-------------------------------

/// Knobs that change how words are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub isa: Isa,
    pub upper_imm: UpperImm,

    /// Report words that match no descriptor as `DecodeErr::NoMatch`
    /// rather than silently skipping them.
    pub strict: bool,
}

/// Counts of what happened to each word passed to `Disassembler::parse`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub rendered: usize,
    pub unmatched: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.rendered + self.unmatched + self.failed
    }
}

//-------------------------------

#[derive(Clone, Debug, Default)]
pub struct Disassembler {
    config: Config,
}

impl Disassembler {
    pub fn new(config: Config) -> Self {
        Disassembler { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decodes and renders a single word.  `Ok(None)` means the opcode is
    /// known but nothing in its candidate list matched.
    pub fn disassemble(&self, word: u32) -> Result<Option<Line>> {
        let inst = match Inst::new(word) {
            Ok(inst) => inst,
            Err(e) => {
                if word & 0b11 != 0b11 {
                    if let Some(c) = CInst::new(word as u16) {
                        debug!("0x{:08x}: low half looks like a compressed {} parcel", word, c.format());
                    }
                }
                return Err(e);
            }
        };
        debug!("0x{:08x}: {} format, opcode 0x{:02x}", word, inst.format(), inst.opcode());

        match render(&inst, &self.config)? {
            Some(line) => Ok(Some(line)),
            None if self.config.strict => Err(DecodeErr::NoMatch(word)),
            None => Ok(None),
        }
    }

    /// 16 bit parcels are classified but never rendered.
    pub fn disassemble_parcel(&self, parcel: u16) -> Result<Option<Line>> {
        match CInst::new(parcel) {
            Some(c) => debug!("0x{:04x}: compressed {} parcel", parcel, c.format()),
            None => debug!("0x{:04x}: not a compressed parcel", parcel),
        }
        Err(DecodeErr::Compressed(parcel))
    }

    /// Per word results, in input order.
    pub fn lines<'a, I>(&'a self, words: I) -> impl Iterator<Item = (u32, Result<Option<Line>>)> + 'a
    where
        I: IntoIterator<Item = u32>,
        I::IntoIter: 'a,
    {
        words
            .into_iter()
            .map(move |word| (word, self.disassemble(word)))
    }

    /// Writes one line per rendered word to `sink`.  Decode errors are
    /// logged and counted, they never stop the stream.
    pub fn parse<I, W>(&self, words: I, mut sink: W) -> io::Result<Summary>
    where
        I: IntoIterator<Item = u32>,
        W: Write,
    {
        let mut summary = Summary::default();

        for (word, result) in self.lines(words) {
            match result {
                Ok(Some(line)) => {
                    writeln!(sink, "{}", line)?;
                    summary.rendered += 1;
                }
                Ok(None) => {
                    summary.unmatched += 1;
                }
                Err(e) => {
                    warn!("skipping 0x{:08x}: {}", word, e);
                    summary.failed += 1;
                }
            }
        }

        sink.flush()?;
        debug!("{:?}", summary);
        Ok(summary)
    }
}

//-------------------------------


//-------------------------------
