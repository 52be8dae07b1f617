//! Hex literal scanner.
//!
//! A literal is `0x`/`0X` followed by at least [`MIN_HEX_DIGITS`] hex digits.
//! The digit run is taken greedily and a literal glued to a preceding
//! identifier character (`a0x...`, `_0x...`) is ignored.

use memchr::memchr2_iter;

use super::HexAddress;

/// Shortest digit run treated as an address literal.
pub const MIN_HEX_DIGITS: usize = 7;

/// Longest digit run that still fits in a `u64`.
const MAX_HEX_DIGITS: usize = 16;

/// A hex literal located in a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexLiteral {
    /// Byte offset of the leading `0`
    pub start: usize,
    /// Byte offset one past the last digit
    pub end: usize,
    pub address: HexAddress,
    upper_prefix: bool,
    lower_digits: bool,
    digits: usize,
}

impl HexLiteral {
    /// Original text of the literal within `line`.
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }

    /// Render `address` in this literal's style: same prefix, same digit case,
    /// and at least as many digits.
    pub fn render(&self, address: HexAddress) -> String {
        let prefix = if self.upper_prefix { "0X" } else { "0x" };
        if self.lower_digits {
            format!("{}{:0width$x}", prefix, address.value(), width = self.digits)
        } else {
            format!("{}{:0width$X}", prefix, address.value(), width = self.digits)
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find every eligible hex literal in `line`, in order.
pub fn find_hex_literals(line: &str) -> Vec<HexLiteral> {
    let bytes = line.as_bytes();
    let mut literals = Vec::new();

    for x_pos in memchr2_iter(b'x', b'X', bytes) {
        if x_pos == 0 || bytes[x_pos - 1] != b'0' {
            continue;
        }
        let start = x_pos - 1;
        if start > 0 && is_ident_byte(bytes[start - 1]) {
            continue;
        }

        let digits = bytes[x_pos + 1..]
            .iter()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        if !(MIN_HEX_DIGITS..=MAX_HEX_DIGITS).contains(&digits) {
            continue;
        }

        let end = x_pos + 1 + digits;
        let digit_bytes = &bytes[x_pos + 1..end];
        let Ok(address) = HexAddress::parse(&line[x_pos + 1..end]) else {
            continue;
        };

        literals.push(HexLiteral {
            start,
            end,
            address,
            upper_prefix: bytes[x_pos] == b'X',
            lower_digits: digit_bytes.iter().any(|b| b.is_ascii_lowercase()),
            digits,
        });
    }

    literals
}
