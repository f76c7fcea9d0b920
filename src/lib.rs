extern crate log;
extern crate thiserror;

pub mod compressed;
pub mod decode;
pub mod disasm;
pub mod input;
pub mod registers;
pub mod render;
pub mod table;

pub use crate::decode::{DecodeErr, Format, Inst};
pub use crate::disasm::{Config, Disassembler, Isa, Summary, UpperImm};
pub use crate::render::Line;
