use std::fmt::Write;

/// Number of lines a transmit run sends.
pub const LINE_COUNT: u32 = 100;

/// Bright yellow foreground.
const BRIGHT_YELLOW: &str = "\x1b[93m";

/// Build transmit line `index`, CRLF included.
pub fn test_line(index: u32) -> String {
    format!("{BRIGHT_YELLOW}{index}: This is a test message.\r\n")
}

/// Render one received byte as a bytes literal, e.g. `b'a'`, `b'\n'`, `b'\x1b'`.
pub fn byte_repr(b: u8) -> String {
    let mut s = String::with_capacity(8);
    if b == b'\'' {
        s.push_str("b\"'\"");
        return s;
    }
    s.push_str("b'");
    match b {
        b'\\' => s.push_str("\\\\"),
        b'\n' => s.push_str("\\n"),
        b'\r' => s.push_str("\\r"),
        b'\t' => s.push_str("\\t"),
        0x20..=0x7e => s.push(b as char),
        _ => {
            let _ = write!(s, "\\x{:02x}", b);
        }
    }
    s.push('\'');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_byte_exact() {
        assert_eq!(test_line(0), "\x1b[93m0: This is a test message.\r\n");
        assert_eq!(test_line(7), "\x1b[93m7: This is a test message.\r\n");
        assert_eq!(test_line(99), "\x1b[93m99: This is a test message.\r\n");
    }

    #[test]
    fn repr_table() {
        let cases: &[(u8, &str)] = &[
            (b'a', "b'a'"),
            (b' ', "b' '"),
            (b'~', "b'~'"),
            (b'"', "b'\"'"),
            (b'\'', "b\"'\""),
            (b'\\', "b'\\\\'"),
            (b'\n', "b'\\n'"),
            (b'\r', "b'\\r'"),
            (b'\t', "b'\\t'"),
            (0x00, "b'\\x00'"),
            (0x1b, "b'\\x1b'"),
            (0x7f, "b'\\x7f'"),
            (0xff, "b'\\xff'"),
        ];
        for (b, want) in cases {
            assert_eq!(byte_repr(*b), *want, "byte 0x{:02x}", b);
        }
    }
}
