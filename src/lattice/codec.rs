//! Lattice ↔ text conversion for hand-editing ASCII art.
//!
//! The styled form is a line-per-row text where default cells are bare glyphs
//! and every other cell is a `<span>` carrying `class` and an inline `style`
//! with `color`, `background-color` and `opacity` declarations.

use std::fmt::Write as _;

use crate::{
    color::math::{DEFAULT_TEXT_COLOR, TRANSPARENT, parse_css_color},
    lattice::model::{CharacterCell, Lattice},
};

/// Glyphs only, rows joined by `\n`; styling is discarded.
pub fn to_plain_text(lattice: &Lattice) -> String {
    lattice
        .cells
        .iter()
        .map(|row| row.iter().map(|cell| cell.ch).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Styled markup for `lattice`; every row ends with `\n`.
///
/// `parse(&to_styled_text(l)) == l` for any lattice whose colors are written
/// in the form `parse` keeps verbatim (hex or `transparent`).
pub fn to_styled_text(lattice: &Lattice) -> String {
    let mut out = String::new();
    for row in &lattice.cells {
        for cell in row {
            write_styled_cell(&mut out, cell);
        }
        out.push('\n');
    }
    out
}

/// Append one cell: a bare escaped glyph when fully default, else a `<span>`.
pub(crate) fn write_styled_cell(out: &mut String, cell: &CharacterCell) {
    if cell.has_default_style() {
        push_escaped_glyph(out, cell.ch);
        return;
    }

    out.push_str("<span");
    if let Some(class) = &cell.class_name {
        let _ = write!(out, " class=\"{}\"", escape_attr(class));
    }

    let mut decls = Vec::with_capacity(3);
    if cell.text_color != DEFAULT_TEXT_COLOR {
        decls.push(format!("color: {};", cell.text_color));
    }
    if cell.bg_color != TRANSPARENT {
        decls.push(format!("background-color: {};", cell.bg_color));
    }
    if cell.alpha != 1.0 {
        decls.push(format!("opacity: {};", cell.alpha));
    }
    if !decls.is_empty() {
        let _ = write!(out, " style=\"{}\"", escape_attr(&decls.join(" ")));
    }

    out.push('>');
    push_escaped_glyph(out, cell.ch);
    out.push_str("</span>");
}

pub(crate) fn push_escaped_glyph(out: &mut String, ch: char) {
    match ch {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        c => out.push(c),
    }
}

pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            c => out.push(c),
        }
    }
    out
}

/// Parse plain or styled text into a lattice.
///
/// Height is the number of lines (one trailing newline is ignored), width the
/// longest line's visible character count. Short rows are padded with plain
/// spaces. Never fails: unterminated markup turns the rest of its line into
/// literal text.
pub fn parse(text: &str) -> Lattice {
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return Lattice::empty();
    }

    let mut rows: Vec<Vec<CharacterCell>> = text
        .split('\n')
        .map(|line| parse_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, CharacterCell::plain(' '));
    }

    Lattice {
        width,
        height: rows.len(),
        cells: rows,
    }
}

fn parse_line(line: &str) -> Vec<CharacterCell> {
    let mut cells = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        if looks_like_tag(rest) {
            match read_markup(rest) {
                Some(Markup::Span { cells: styled, len }) => {
                    cells.extend(styled);
                    rest = &rest[len..];
                    continue;
                }
                Some(Markup::Skip { len }) => {
                    rest = &rest[len..];
                    continue;
                }
                None => {
                    tracing::debug!(remainder = rest, "unterminated markup, reading as text");
                    cells.extend(decode_text(rest).chars().map(CharacterCell::plain));
                    break;
                }
            }
        }

        let (ch, len) = decode_char(rest);
        cells.push(CharacterCell::plain(ch));
        rest = &rest[len..];
    }

    cells
}

enum Markup {
    Span { cells: Vec<CharacterCell>, len: usize },
    Skip { len: usize },
}

fn looks_like_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<')
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/')
}

/// Read one tag starting at `s[0] == '<'`. `None` means malformed.
fn read_markup(s: &str) -> Option<Markup> {
    let open_end = find_tag_end(s)?;
    let body = &s[1..open_end];
    let name_end = body
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_whitespace() || *c == '/')
        .map_or(body.len(), |(i, _)| i);

    if !body[..name_end].eq_ignore_ascii_case("span") {
        return Some(Markup::Skip { len: open_end + 1 });
    }

    let attrs = parse_attributes(&body[name_end..]);
    let content_start = open_end + 1;
    let close_rel = find_ignore_case(&s[content_start..], "</span>")?;
    let content = strip_tags(&s[content_start..content_start + close_rel]);

    let mut template = CharacterCell::plain(' ');
    apply_attributes(&mut template, &attrs);

    let cells = decode_text(&content)
        .chars()
        .map(|ch| CharacterCell {
            ch,
            ..template.clone()
        })
        .collect();

    Some(Markup::Span {
        cells,
        len: content_start + close_rel + "</span>".len(),
    })
}

/// Index of the `>` closing the tag at the start of `s`, honoring quotes.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, '<') => return None,
            (None, _) => {}
        }
    }
    None
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if looks_like_tag(rest)
            && let Some(end) = find_tag_end(rest)
        {
            rest = &rest[end + 1..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        if name_len == 0 {
            rest = rest[1..].trim_start();
            continue;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let inner = &after_eq[1..];
                    let end = inner.find(q).unwrap_or(inner.len());
                    value = decode_text(&inner[..end]);
                    rest = inner.get(end + 1..).unwrap_or("");
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    value = decode_text(&after_eq[..end]);
                    rest = &after_eq[end..];
                }
            }
        }

        attrs.push((name, value));
        rest = rest.trim_start();
    }

    attrs
}

fn apply_attributes(cell: &mut CharacterCell, attrs: &[(String, String)]) {
    let mut opacity: Option<f64> = None;
    let mut color_alpha = 1.0;

    for (name, value) in attrs {
        match name.as_str() {
            "class" => {
                let class = value.trim();
                cell.class_name = (!class.is_empty()).then(|| class.to_owned());
            }
            "style" => {
                for decl in value.split(';') {
                    let Some((prop, val)) = decl.split_once(':') else {
                        continue;
                    };
                    let val = val.trim();
                    match prop.trim().to_ascii_lowercase().as_str() {
                        "color" => {
                            let (color, alpha) = css_color_value(val);
                            cell.text_color = color;
                            color_alpha = alpha;
                        }
                        "background-color" | "background" => {
                            cell.bg_color = css_color_value(val).0;
                        }
                        "opacity" => {
                            if let Ok(v) = val.parse::<f64>() {
                                opacity = Some(v.clamp(0.0, 1.0));
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    cell.alpha = opacity.unwrap_or(1.0) * color_alpha;
}

/// Functional `rgb()`/`rgba()` values are normalized to hex; anything else is kept verbatim.
fn css_color_value(val: &str) -> (String, f64) {
    if val.to_ascii_lowercase().starts_with("rgb")
        && let Some(parsed) = parse_css_color(val)
    {
        return parsed;
    }
    (val.to_owned(), 1.0)
}

fn decode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while !rest.is_empty() {
        let (ch, len) = decode_char(rest);
        out.push(ch);
        rest = &rest[len..];
    }
    out
}

/// Decode one visible character (a literal or an entity) from the front of `s`.
fn decode_char(s: &str) -> (char, usize) {
    let Some(first) = s.chars().next() else {
        return (' ', 0);
    };
    if first != '&' {
        return (first, first.len_utf8());
    }

    let Some(semi) = s[1..].find(';').filter(|&i| i <= 10) else {
        return ('&', 1);
    };
    let name = &s[1..1 + semi];
    let decoded = match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    };

    match decoded {
        Some(ch) => (ch, semi + 2),
        None => ('&', 1),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lattice/codec.rs"]
mod tests;
