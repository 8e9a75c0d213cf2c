//! Telnet negotiation stripping for the inbound byte stream.
//!
//! VLC's telnet interface wraps the password prompt in `IAC WILL ECHO` /
//! `IAC WONT ECHO`. Those bytes are control data, not text, and would break
//! prompt matching if they reached the buffer.

const IAC: u8 = 255;
const DONT: u8 = 254;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
  #[default]
  Data,
  Command,
  /// WILL/WONT/DO/DONT, waiting for the option byte.
  Option,
  Subnegotiation,
  SubnegotiationIac,
}

/// Incremental IAC filter. Sequences split across reads are handled.
#[derive(Debug, Default)]
pub struct TelnetFilter {
  state: State,
}

impl TelnetFilter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append the data bytes of `input` to `out`, dropping negotiation.
  pub fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
    for &byte in input {
      self.state = match (self.state, byte) {
        (State::Data, IAC) => State::Command,
        (State::Data, _) => {
          out.push(byte);
          State::Data
        }
        // escaped 0xFF
        (State::Command, IAC) => {
          out.push(IAC);
          State::Data
        }
        (State::Command, WILL..=DONT) => State::Option,
        (State::Command, SB) => State::Subnegotiation,
        (State::Command, _) => State::Data,
        (State::Option, _) => State::Data,
        (State::Subnegotiation, IAC) => State::SubnegotiationIac,
        (State::Subnegotiation, _) => State::Subnegotiation,
        (State::SubnegotiationIac, SE) => State::Data,
        (State::SubnegotiationIac, _) => State::Subnegotiation,
      };
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filter(chunks: &[&[u8]]) -> Vec<u8> {
    let mut telnet = TelnetFilter::new();
    let mut out = Vec::new();
    for chunk in chunks {
      telnet.feed(chunk, &mut out);
    }
    out
  }

  #[test]
  fn test_plain_text_passes_through() {
    assert_eq!(filter(&[b"VLC media player\nPassword: "]), b"VLC media player\nPassword: ");
  }

  #[test]
  fn test_strips_echo_negotiation() {
    let input = b"Password: \xff\xfb\x01";
    assert_eq!(filter(&[input]), b"Password: ");

    let input = b"\xff\xfc\x01\r\nWelcome, Master\r\n> ";
    assert_eq!(filter(&[input]), b"\r\nWelcome, Master\r\n> ");
  }

  #[test]
  fn test_sequence_split_across_reads() {
    assert_eq!(filter(&[b"ab\xff", b"\xfb", b"\x01cd"]), b"abcd");
  }

  #[test]
  fn test_escaped_iac_and_subnegotiation() {
    assert_eq!(filter(&[b"a\xff\xffb"]), b"a\xffb");
    assert_eq!(filter(&[b"x\xff\xfa\x18\x01\xff\xf0y"]), b"xy");
  }

  #[test]
  fn test_two_byte_command_dropped() {
    // IAC NOP
    assert_eq!(filter(&[b"a\xff\xf1b"]), b"ab");
  }
}
