//! Text box layout
//!
//! Text is broken into lines that fit the box width and written with a
//! standard Type1 font, measured with that font's published glyph widths.

use log::warn;

use super::TextStyle;

/// Advance of a character in Times-Roman, in thousandths of an em
///
/// Widths follow the standard Times-Roman metrics for the WinAnsi range.
/// Characters the font cannot encode are drawn as `?` and measured as such.
fn glyph_units(c: char) -> u32 {
    match c {
        ' ' | ',' | '.' | '\u{a0}' => 250,
        '!' | '(' | ')' | '-' | '[' | ']' | '`' | 'f' | 'r' | 'I' => 333,
        '"' => 408,
        '#' | '$' | '*' | '_' | '0'..='9' => 500,
        '%' => 833,
        '&' => 778,
        '\'' => 180,
        '+' | '<' | '=' | '>' | '×' | '÷' => 564,
        '/' | ':' | ';' | '\\' => 278,
        '?' => 444,
        '@' => 921,
        '^' => 469,
        '{' | '}' => 480,
        '|' => 200,
        '~' => 541,
        'A' | 'D' | 'G' | 'H' | 'K' | 'N' | 'O' | 'Q' | 'U' | 'V' | 'X' | 'Y' => 722,
        'B' | 'C' | 'R' => 667,
        'E' | 'L' | 'T' | 'Z' => 611,
        'F' | 'P' | 'S' => 556,
        'J' => 389,
        'M' => 889,
        'W' => 944,
        'a' | 'c' | 'e' | 'z' => 444,
        'b' | 'd' | 'g' | 'h' | 'k' | 'n' | 'o' | 'p' | 'q' | 'u' | 'v' | 'x' | 'y' => 500,
        'i' | 'j' | 'l' | 't' => 278,
        'm' => 778,
        's' => 389,
        'w' => 722,
        'À'..='Å' | 'Ð' | 'Ñ' | 'Ò'..='Ö' | 'Ø'..='Ý' => 722,
        'Æ' => 889,
        'Ç' => 667,
        'È'..='Ë' => 611,
        'Ì'..='Ï' => 333,
        'Þ' => 556,
        'à'..='å' | 'ç'..='ë' => 444,
        'æ' => 667,
        'ì'..='ï' => 278,
        'ß' | 'ð'..='ö' | 'ø'..='ÿ' => 500,
        c if is_encodable(c) => 500,
        _ => 444,
    }
}

/// Width of a string in points
pub(crate) fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(glyph_units).sum();
    units as f64 * font_size / 1000.0
}

/// Whether the WinAnsi-encoded standard font can draw `c`
fn is_encodable(c: char) -> bool {
    (c.is_ascii() && !c.is_ascii_control()) || ('\u{a0}'..='\u{ff}').contains(&c)
}

/// Characters of `text` that will be drawn as `?`
pub(crate) fn unencodable(text: &str) -> Vec<char> {
    text.chars()
        .filter(|&c| !c.is_whitespace() && !is_encodable(c))
        .collect()
}

/// Break text into lines no wider than `max_width`
///
/// Explicit newlines always break. A single word wider than the box gets a
/// line of its own.
pub(crate) fn wrap_lines(text: &str, font_size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    lines
}

/// Content stream operators drawing `text` into a box
///
/// `left` and `top` are in PDF user space (y grows upward). Lines that do not
/// fit the box height are dropped.
pub(crate) fn text_operators(
    text: &str,
    font_resource: &str,
    style: &TextStyle,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    let missing = unencodable(text);
    if !missing.is_empty() {
        warn!(
            "text '{}' has characters the font cannot draw, replaced with '?': {:?}",
            text, missing
        );
    }

    let mut lines = wrap_lines(text, style.font_size, width);
    let leading = style.leading();

    let fitting = if leading > 0.0 {
        (((height - style.font_size) / leading).floor() as i64 + 1).max(0) as usize
    } else {
        lines.len()
    };
    if lines.len() > fitting {
        warn!(
            "text '{}' needs {} lines but only {} fit its box",
            text,
            lines.len(),
            fitting
        );
        lines.truncate(fitting);
    }

    let mut ops = String::from("q\n0 g\nBT\n");
    ops.push_str(&format!("/{} {} Tf\n", font_resource, num(style.font_size)));
    ops.push_str(&format!("{} TL\n", num(leading)));
    ops.push_str(&format!("{} {} Td\n", num(left), num(top - style.font_size)));
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ops.push_str("T* ");
        }
        ops.push_str(&literal(line));
        ops.push_str(" Tj\n");
    }
    ops.push_str("ET\nQ\n");
    ops.into_bytes()
}

/// Format a number for a content stream
pub(crate) fn num(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Encode a string as a PDF literal string in WinAnsi (Latin-1 subset)
fn literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if is_encodable(c) => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(11.0 * 1.2), "13.2");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(0.5), "0.5");
    }

    #[test]
    fn test_literal_escaping() {
        assert_eq!(literal("a (b) \\c"), "(a \\(b\\) \\\\c)");
        assert_eq!(literal("café"), "(caf\\351)");
        assert_eq!(literal("→"), "(?)");
    }

    #[test]
    fn test_wrap_respects_width() {
        // "aaaa aaaa" is 38.02 points wide at 10pt
        let lines = wrap_lines("aaaa aaaa aaaa", 10.0, 39.0);
        assert_eq!(lines, vec!["aaaa aaaa", "aaaa"]);
    }

    #[test]
    fn test_widths_follow_font_metrics() {
        assert_eq!(text_width("W", 1000.0), 944.0);
        assert_eq!(text_width("Wave", 10.0), 23.32);
        assert_eq!(text_width("café", 10.0), text_width("cafe", 10.0));
    }

    #[test]
    fn test_wide_capitals_wrap() {
        // each word is 47.2 points at 10pt, so both need 96.9
        let lines = wrap_lines("WWWWW WWWWW", 10.0, 90.0);
        assert_eq!(lines, vec!["WWWWW", "WWWWW"]);
    }

    #[test]
    fn test_unencodable_characters_are_reported() {
        assert_eq!(unencodable("Jane Doe, café"), Vec::<char>::new());
        assert_eq!(unencodable("Zoë → 签名"), vec!['→', '签', '名']);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_lines("Jane Doe\n9/12/2019", 11.0, 500.0);
        assert_eq!(lines, vec!["Jane Doe", "9/12/2019"]);
    }

    #[test]
    fn test_single_line_operators() {
        let ops = text_operators("Alice", "SHF1", &TextStyle::default(), 10.0, 772.0, 500.0, 100.0);
        let ops = String::from_utf8(ops).unwrap();
        insta::assert_snapshot!(ops.trim_end(), @r"
        q
        0 g
        BT
        /SHF1 11 Tf
        13.2 TL
        10 761 Td
        (Alice) Tj
        ET
        Q
        ");
    }

    #[test]
    fn test_overflowing_lines_are_dropped() {
        let style = TextStyle::default().with_box_size(500.0, 20.0);
        // 20pt box: first line needs 11, a second would need 24.2
        let ops = text_operators("one\ntwo\nthree", "F", &style, 0.0, 100.0, 500.0, 20.0);
        let ops = String::from_utf8(ops).unwrap();
        assert!(ops.contains("(one) Tj"));
        assert!(!ops.contains("(two)"));
    }
}
