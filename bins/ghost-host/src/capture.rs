//! Frame capture files: one `<protocol> <hex bytes>` record per line

use core::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crossbeam_channel::Sender;
use ghost_core::Protocol;

#[derive(Debug, PartialEq)]
pub enum CaptureErr {
    MissingPayload,
    UnknownProtocol(String),
    BadHex(hex::FromHexError),
}

impl fmt::Display for CaptureErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureErr::MissingPayload => write!(f, "expected <protocol> <hex bytes>"),
            CaptureErr::UnknownProtocol(tag) => write!(f, "unknown protocol {:?}", tag),
            CaptureErr::BadHex(e) => write!(f, "bad hex payload: {}", e),
        }
    }
}

impl std::error::Error for CaptureErr {}

/// Parses one capture line. Blank lines and `#` comments yield None.
pub fn parse_line(line: &str) -> Result<Option<(Protocol, Vec<u8>)>, CaptureErr> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (tag, payload) = line.split_once(char::is_whitespace).ok_or(CaptureErr::MissingPayload)?;
    let protocol = Protocol::from_tag(tag).ok_or_else(|| CaptureErr::UnknownProtocol(tag.to_string()))?;
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let frame = hex::decode(payload).map_err(CaptureErr::BadHex)?;
    Ok(Some((protocol, frame)))
}

/// Reads the capture at `path` and sends every frame to `tx`.
/// Malformed lines are skipped. Returns the number of frames sent.
pub fn replay<P: AsRef<Path>>(path: P, tx: &Sender<(Protocol, Vec<u8>)>) -> std::io::Result<usize> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut sent = 0;
    for (lineno, line) in reader.lines().enumerate() {
        match parse_line(&line?) {
            Ok(Some(frame)) => {
                if tx.send(frame).is_err() {
                    break;
                }
                sent += 1;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}:{}: {}", path.as_ref().display(), lineno + 1, e),
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("dmr 0003 ff"), Ok(Some((Protocol::Dmr, vec![0x00, 0x03, 0xff]))));
        assert_eq!(parse_line("  # comment"), Ok(None));
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("dmr"), Err(CaptureErr::MissingPayload));
        assert_eq!(parse_line("p25 00"), Err(CaptureErr::UnknownProtocol("p25".to_string())));
        assert!(matches!(parse_line("ysf 0g"), Err(CaptureErr::BadHex(_))));
    }
}
