//! Removes one level of JSON string escaping.
//!
//! The player configuration is embedded in the watch page as a JSON string
//! value, so every quote and unicode escape inside it is backslash-escaped
//! once more. Slicing the formats arrays out of that string yields text like
//! `{\"itag\":137,\"mimeType\":\"video\/mp4\"}` which has to be unescaped
//! before it can be fed to a JSON parser.

#[derive(thiserror::Error, Debug)]
pub enum UnescapeError {
    #[error("truncated escape sequence at end of input")]
    Truncated,
    #[error("invalid unicode escape \\u{0}")]
    InvalidUnicodeEscape(String),
    #[error("unpaired surrogate \\u{0:04x}")]
    UnpairedSurrogate(u16),
}

fn parse_hex4(chars: &mut std::str::Chars) -> Result<u16, UnescapeError> {
    let mut digits = String::with_capacity(4);
    for _ in 0..4 {
        digits.push(chars.next().ok_or(UnescapeError::Truncated)?);
    }
    // from_str_radix alone is too lenient, it accepts a leading `+`
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(UnescapeError::InvalidUnicodeEscape(digits));
    }
    u16::from_str_radix(&digits, 16).map_err(|_| UnescapeError::InvalidUnicodeEscape(digits))
}

/// Resolves backslash escape sequences into their literal characters.
///
/// Escapes JSON does not define are kept verbatim (backslash included)
/// instead of corrupting the surrounding text. A malformed `\uXXXX` or an
/// unpaired surrogate is a hard error.
pub fn unescape(input: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next().ok_or(UnescapeError::Truncated)? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'u' => {
                let hi = parse_hex4(&mut chars)?;
                let code = match hi {
                    0xD800..=0xDBFF => {
                        // High surrogate, must be followed by \uXXXX low half
                        match (chars.next(), chars.next()) {
                            (Some('\\'), Some('u')) => (),
                            (None, _) => return Err(UnescapeError::Truncated),
                            _ => return Err(UnescapeError::UnpairedSurrogate(hi)),
                        }
                        let lo = parse_hex4(&mut chars)?;
                        if !(0xDC00..=0xDFFF).contains(&lo) {
                            return Err(UnescapeError::UnpairedSurrogate(hi));
                        }
                        0x10000 + ((hi as u32 - 0xD800) << 10) + (lo as u32 - 0xDC00)
                    }
                    0xDC00..=0xDFFF => return Err(UnescapeError::UnpairedSurrogate(hi)),
                    _ => hi as u32,
                };
                out.push(char::from_u32(code).ok_or(UnescapeError::UnpairedSurrogate(hi))?);
            }
            other => {
                // Not a JSON escape, keep it as-is
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_untouched() {
        assert_eq!(unescape("no escapes here").unwrap(), "no escapes here");
    }

    #[test]
    fn quotes_and_slashes() {
        assert_eq!(
            unescape(r#"{\"mimeType\":\"video\/mp4\"}"#).unwrap(),
            r#"{"mimeType":"video/mp4"}"#
        );
    }

    #[test]
    fn control_escapes() {
        assert_eq!(unescape(r"a\nb\tc\rd").unwrap(), "a\nb\tc\rd");
        assert_eq!(unescape(r"\b\f").unwrap(), "\u{0008}\u{000C}");
    }

    #[test]
    fn unicode_escape() {
        assert_eq!(unescape(r"A\u00e9").unwrap(), "Aé");
    }

    #[test]
    fn surrogate_pair() {
        assert_eq!(unescape(r"\ud83c\udfb5").unwrap(), "\u{1F3B5}");
    }

    #[test]
    fn unknown_escape_kept_verbatim() {
        assert_eq!(unescape(r"\x41").unwrap(), r"\x41");
    }

    #[test]
    fn malformed_unicode_is_fatal() {
        assert!(matches!(
            unescape(r"\uzz99"),
            Err(UnescapeError::InvalidUnicodeEscape(_))
        ));
        // A leading sign is not a hex digit either
        assert!(matches!(
            unescape(r"\u+0bc"),
            Err(UnescapeError::InvalidUnicodeEscape(_))
        ));
        assert!(matches!(unescape(r"\u00"), Err(UnescapeError::Truncated)));
        assert!(matches!(
            unescape(r"\ud83c oops"),
            Err(UnescapeError::UnpairedSurrogate(0xd83c))
        ));
    }

    #[test]
    fn trailing_backslash_is_fatal() {
        assert!(matches!(unescape("abc\\"), Err(UnescapeError::Truncated)));
    }
}
