use anyhow::{anyhow, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use log::*;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till},
    character::complete::{char, hex_digit1, multispace1},
    combinator::{eof, map_res, opt, value},
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

//-------------------------------

// A hex listing is a sequence of words, optionally prefixed with 0x,
// separated by whitespace or commas.  '#' starts a comment that runs
// to the end of the line.

fn comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = tag("#")(input)?;
    let (input, _) = take_till(|c| c == '\n')(input)?;
    Ok((input, ()))
}

#[test]
fn test_comment() {
    assert_eq!(comment("# foo\n1"), Ok(("\n1", ())));
    assert_eq!(comment("#"), Ok(("", ())));
    assert!(comment("foo").is_err());
}

fn separator(input: &str) -> IResult<&str, ()> {
    alt((value((), multispace1), value((), char(',')), comment))(input)
}

fn hex_word(input: &str) -> IResult<&str, u32> {
    preceded(
        opt(tag_no_case("0x")),
        map_res(hex_digit1, |digits: &str| u32::from_str_radix(digits, 16)),
    )(input)
}

#[test]
fn test_hex_word() {
    assert_eq!(hex_word("00850463"), Ok(("", 0x00850463)));
    assert_eq!(hex_word("0x13 "), Ok((" ", 0x13)));
    assert_eq!(hex_word("0XFFFFFFFF"), Ok(("", 0xffffffff)));
    assert_eq!(hex_word("deadbeef,"), Ok((",", 0xdeadbeef)));
    assert!(hex_word("0x100000000").is_err());
    assert!(hex_word("xyz").is_err());
}

fn listing(input: &str) -> IResult<&str, Vec<u32>> {
    let (input, _) = many0(separator)(input)?;
    let (input, words) = many0(terminated(hex_word, many0(separator)))(input)?;
    let (input, _) = eof(input)?;
    Ok((input, words))
}

#[test]
fn test_listing() {
    assert_eq!(listing(""), Ok(("", vec![])));
    assert_eq!(listing("  # nothing here\n"), Ok(("", vec![])));
    assert_eq!(
        listing("0x00850463, 0x00000073\n# ebreak\n00100073"),
        Ok(("", vec![0x00850463, 0x00000073, 0x00100073]))
    );
    assert!(listing("0x13 zz").is_err());
}

/// Parses a hex listing, reporting the line of the first bad token.
pub fn parse_listing(text: &str) -> Result<Vec<u32>> {
    match listing(text) {
        Ok((_, words)) => {
            debug!("parsed {} words", words.len());
            Ok(words)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = text.len() - e.input.len();
            let line = text[..offset].matches('\n').count() + 1;
            let token = e.input.split_whitespace().next().unwrap_or("");
            Err(anyhow!("bad hex word on line {}: '{}'", line, token))
        }
        Err(nom::Err::Incomplete(_)) => Err(anyhow!("truncated hex listing")),
    }
}

pub fn read_listing<P: AsRef<Path>>(path: P) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("couldn't read listing {}", path.display()))?;
    parse_listing(&text).with_context(|| format!("in {}", path.display()))
}

//-------------------------------

/// Reads a raw image as little endian 32 bit words.  A trailing partial
/// word is dropped.
pub fn read_binary<R: Read>(mut r: R) -> Result<Vec<u32>> {
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes)?;

    let rem = bytes.len() % 4;
    if rem != 0 {
        warn!("ignoring {} trailing byte(s)", rem);
    }

    let mut cur = Cursor::new(&bytes[..bytes.len() - rem]);
    let mut words = Vec::with_capacity(bytes.len() / 4);
    for _ in 0..bytes.len() / 4 {
        words.push(cur.read_u32::<LittleEndian>()?);
    }
    Ok(words)
}

pub fn read_binary_file<P: AsRef<Path>>(path: P) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let file = fs::File::open(path)
        .with_context(|| format!("couldn't open image {}", path.display()))?;
    read_binary(file)
}

//-------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_error_line() {
        let err = parse_listing("0x13\n0x33\n0xg3\n").unwrap_err();
        assert_eq!(err.to_string(), "bad hex word on line 3: '0xg3'");
    }

    #[test]
    fn test_read_binary() {
        let bytes: [u8; 8] = [0x63, 0x04, 0x85, 0x00, 0x73, 0x00, 0x00, 0x00];
        assert_eq!(read_binary(&bytes[..]).unwrap(), vec![0x00850463, 0x00000073]);
    }

    #[test]
    fn test_read_binary_partial() {
        let bytes: [u8; 6] = [0x73, 0x00, 0x10, 0x00, 0x01, 0x45];
        assert_eq!(read_binary(&bytes[..]).unwrap(), vec![0x00100073]);
        assert_eq!(read_binary(&[0u8; 0][..]).unwrap(), Vec::<u32>::new());
    }
}

//-------------------------------
