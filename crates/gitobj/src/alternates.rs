//! The escape grammar for alternate object-store paths.
//!
//! Alternates arrive as a separator-joined string (from an environment-style
//! override or the `info/alternates` file). A path may be double-quoted to
//! protect literal separators; inside quotes the C-style escapes
//! `\a \b \t \n \v \f \r \\ \"`, `\xHH`, and `\OOO` (one to three octal
//! digits) are recognized, and a backslash before any other byte yields that
//! byte. Unquoted tokens are literal. Empty tokens are dropped.
//!
//! The grammar is a closed, fixed escape set, so this is a plain byte-level
//! state machine rather than anything fancier.

/// Split a separator-joined alternates string into its paths.
pub fn split_alternates(input: &str, sep: u8) -> Vec<String> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut in_quote = false;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];

        if !in_quote {
            match b {
                _ if b == sep => {
                    flush(&mut tokens, &mut current);
                    i += 1;
                }
                b'"' => {
                    in_quote = true;
                    i += 1;
                }
                _ => {
                    current.push(b);
                    i += 1;
                }
            }
            continue;
        }

        match b {
            b'"' => {
                in_quote = false;
                i += 1;
            }
            b'\\' => {
                i += 1;
                let Some(&escaped) = bytes.get(i) else {
                    break; // trailing backslash: nothing to escape
                };
                match escaped {
                    b'a' => push_byte(&mut current, 0x07, &mut i),
                    b'b' => push_byte(&mut current, 0x08, &mut i),
                    b't' => push_byte(&mut current, b'\t', &mut i),
                    b'n' => push_byte(&mut current, b'\n', &mut i),
                    b'v' => push_byte(&mut current, 0x0b, &mut i),
                    b'f' => push_byte(&mut current, 0x0c, &mut i),
                    b'r' => push_byte(&mut current, b'\r', &mut i),
                    b'x' => {
                        i += 1;
                        let mut value = 0u8;
                        let mut digits = 0;
                        while digits < 2 {
                            match bytes.get(i).and_then(|&h| hex_digit(h)) {
                                Some(d) => {
                                    value = (value << 4) | d;
                                    digits += 1;
                                    i += 1;
                                }
                                None => break,
                            }
                        }
                        if digits > 0 {
                            current.push(value);
                        }
                    }
                    b'0'..=b'7' => {
                        let mut value = 0u16;
                        let mut digits = 0;
                        while digits < 3 {
                            match bytes.get(i) {
                                Some(&o @ b'0'..=b'7') => {
                                    value = (value << 3) | u16::from(o - b'0');
                                    digits += 1;
                                    i += 1;
                                }
                                _ => break,
                            }
                        }
                        current.push(value as u8);
                    }
                    // Any other escaped byte is the byte itself.
                    other => push_byte(&mut current, other, &mut i),
                }
            }
            _ => {
                current.push(b);
                i += 1;
            }
        }
    }

    flush(&mut tokens, &mut current);
    tokens
}

fn push_byte(current: &mut Vec<u8>, byte: u8, i: &mut usize) {
    current.push(byte);
    *i += 1;
}

fn flush(tokens: &mut Vec<String>, current: &mut Vec<u8>) {
    if !current.is_empty() {
        tokens.push(String::from_utf8_lossy(current).into_owned());
        current.clear();
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> Vec<String> {
        split_alternates(input, b':')
    }

    #[test]
    fn plain_tokens() {
        assert_eq!(split("abc"), vec!["abc"]);
        assert_eq!(split("abc:def"), vec!["abc", "def"]);
    }

    #[test]
    fn quoted_token() {
        assert_eq!(split(r#""abc":def"#), vec!["abc", "def"]);
    }

    #[test]
    fn quotes_protect_separators() {
        assert_eq!(split(r#""a:b":c"#), vec!["a:b", "c"]);
    }

    #[test]
    fn single_letter_escapes() {
        assert_eq!(
            split(r#""i\alike\bcomplicated\tstrings":def"#),
            vec!["i\x07like\x08complicated\tstrings", "def"]
        );
        assert_eq!(
            split(r#"abc:"i\nlike\vcomplicated\fstrings\r":def"#),
            vec!["abc", "i\nlike\x0bcomplicated\x0cstrings\r", "def"]
        );
    }

    #[test]
    fn hex_escapes() {
        assert_eq!(
            split(r#"abc:"uni\xc2\xa9ode":def"#),
            vec!["abc", "uni\u{a9}ode", "def"]
        );
    }

    #[test]
    fn octal_escapes() {
        assert_eq!(
            split(r#"abc:"uni\302\251ode\10\0":def"#),
            vec!["abc", "uni\u{a9}ode\x08\x00", "def"]
        );
    }

    #[test]
    fn backslashed_quotes_and_backslashes_survive() {
        assert_eq!(
            split(r#"abc:"cookie\\monster\"":def"#),
            vec!["abc", "cookie\\monster\"", "def"]
        );
    }

    #[test]
    fn empty_tokens_are_dropped() {
        assert_eq!(split(""), Vec::<String>::new());
        assert_eq!(split(":::"), Vec::<String>::new());
        assert_eq!(split("a::b:"), vec!["a", "b"]);
    }

    #[test]
    fn arbitrary_escaped_byte_is_itself() {
        assert_eq!(split(r#""\q\z""#), vec!["qz"]);
    }

    #[test]
    fn quoted_and_unquoted_pieces_concatenate() {
        assert_eq!(split(r#""abc"def"#), vec!["abcdef"]);
    }
}
