//! Text helpers shared by the message decoders.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static ESCAPE_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"_x([0-9A-Fa-f]{4})_"));

/// Decodes invalid UTF-8 with U+FFFD replacement and strips a leading BOM.
pub fn repair_utf8(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    strip_bom(&text).to_owned()
}

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Removes one trailing line terminator (`\r\n`, `\n` or `\r`).
pub fn chomp(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}

/// Decodes CLIXML `_xHHHH_` escapes, pairing UTF-16 surrogates.
///
/// Sequences that do not form a valid character are kept verbatim.
pub fn decode_escaped_ps_string(input: &str) -> Cow<'_, str> {
    let Ok(regex) = ESCAPE_RE.as_ref() else {
        return Cow::Borrowed(input);
    };
    if !regex.is_match(input) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut pending_high: Option<(u16, &str)> = None;
    let mut current_pos = 0;

    for captures in regex.captures_iter(input) {
        let (Some(whole), Some(hex)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        if whole.start() > current_pos {
            if let Some((_, raw)) = pending_high.take() {
                result.push_str(raw);
            }
            result.push_str(&input[current_pos..whole.start()]);
        }
        current_pos = whole.end();

        let Ok(unit) = u16::from_str_radix(hex.as_str(), 16) else {
            result.push_str(whole.as_str());
            continue;
        };

        if let Some((high, raw)) = pending_high.take() {
            if (0xDC00..=0xDFFF).contains(&unit) {
                let code_point =
                    0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                match char::from_u32(code_point) {
                    Some(ch) => result.push(ch),
                    None => {
                        result.push_str(raw);
                        result.push_str(whole.as_str());
                    }
                }
                continue;
            }
            result.push_str(raw);
        }

        if (0xD800..=0xDBFF).contains(&unit) {
            pending_high = Some((unit, whole.as_str()));
            continue;
        }

        match char::from_u32(u32::from(unit)) {
            Some(ch) => result.push(ch),
            None => result.push_str(whole.as_str()),
        }
    }

    if let Some((_, raw)) = pending_high {
        result.push_str(raw);
    }
    result.push_str(&input[current_pos..]);

    Cow::Owned(result)
}

/// Encodes a string for a CLIXML `<S>` element.
///
/// Control characters other than tab and line feed, and any literal `_x`
/// that would otherwise read back as an escape, are written as `_xHHHH_`.
pub fn encode_ps_string(input: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| c.is_control() && c != '\t' && c != '\n';
    if !input.contains("_x") && !input.chars().any(needs_escape) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' && chars.peek() == Some(&'x') {
            out.push_str("_x005F_");
        } else if needs_escape(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Converts a CamelCase property name into snake_case.
///
/// Rules, applied in order:
/// 1. an upper-case run followed by an upper-case letter and a lower-case letter
///    is split before that last upper-case letter (`PSScript` -> `PS_Script`);
/// 2. a lower-case letter or digit followed by an upper-case letter is split
///    between them (`ScriptRoot` -> `Script_Root`);
/// 3. `-` becomes `_` and `::` becomes `/`;
/// 4. the result is lower-cased.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.replace("::", "/").chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let split = (prev.is_ascii_lowercase() || prev.is_ascii_digit())
                || (prev.is_ascii_uppercase() && next_is_lower);
            if split {
                out.push('_');
            }
        }
        out.push(if c == '-' { '_' } else { c.to_ascii_lowercase() });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_escape_decodes_at_any_position() {
        assert_eq!(decode_escaped_ps_string("_x000D__x000A_a"), "\r\na");
        assert_eq!(decode_escaped_ps_string("a_x000D__x000A_b"), "a\r\nb");
        assert_eq!(decode_escaped_ps_string("a_x000D__x000A_"), "a\r\n");
    }

    #[test]
    fn text_without_escapes_is_untouched() {
        let input = "plain text\r\nwith _ and x";
        assert!(matches!(decode_escaped_ps_string(input), Cow::Borrowed(s) if s == input));
        let once = decode_escaped_ps_string("a_x000D__x000A_");
        assert_eq!(decode_escaped_ps_string(&once), once);
    }

    #[test]
    fn surrogate_pairs_combine() {
        assert_eq!(decode_escaped_ps_string("_xD83D__xDE00_"), "\u{1F600}");
        assert_eq!(decode_escaped_ps_string("_xD83D_x"), "_xD83D_x");
    }

    #[test]
    fn encode_escapes_carriage_return_and_literal_escape_prefix() {
        assert_eq!(encode_ps_string("a\r\nb"), "a_x000D_\nb");
        assert_eq!(encode_ps_string("_x0041_"), "_x005F_x0041_");
        assert_eq!(
            decode_escaped_ps_string(&encode_ps_string("x\r\n")),
            "x\r\n"
        );
    }

    #[test]
    fn repair_replaces_invalid_bytes_and_strips_bom() {
        assert_eq!(repair_utf8(b"\xEF\xBB\xBFok"), "ok");
        assert_eq!(repair_utf8(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn chomp_removes_one_terminator() {
        assert_eq!(chomp("a\r\n"), "a");
        assert_eq!(chomp("a\n\n"), "a\n");
        assert_eq!(chomp("a"), "a");
    }

    #[test]
    fn snake_case_rules() {
        assert_eq!(to_snake_case("PSScriptRoot"), "ps_script_root");
        assert_eq!(to_snake_case("MyCommand"), "my_command");
        assert_eq!(to_snake_case("PositionMessage"), "position_message");
        assert_eq!(to_snake_case("ScriptLineNumber"), "script_line_number");
        assert_eq!(to_snake_case("HistoryId"), "history_id");
        assert_eq!(to_snake_case("Line1Offset"), "line1_offset");
        assert_eq!(to_snake_case("message"), "message");
        assert_eq!(to_snake_case("IO-Error"), "io_error");
        assert_eq!(to_snake_case("PSCommandPath"), "ps_command_path");
    }
}
