/// Normalizes extracted document text.
///
/// Typographic punctuation is folded to ASCII, control and other non-printable characters are
/// dropped, and every whitespace run collapses to a single space. The result never contains
/// leading/trailing whitespace or multi-space runs.
pub fn normalize_text(raw: &str) -> String {
    let mut kept = String::with_capacity(raw.len());
    for c in raw.chars() {
        match fold_typography(c) {
            Folded::Char(c) if c.is_whitespace() => kept.push(' '),
            Folded::Char(c) if is_printable(c) => kept.push(c),
            Folded::Char(_) => {}
            Folded::Str(s) => kept.push_str(s),
        }
    }

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

enum Folded {
    Char(char),
    Str(&'static str),
}

// PDF extraction surfaces these often; without folding they would be stripped and glue words together.
fn fold_typography(c: char) -> Folded {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' => Folded::Char('\''),
        '\u{201C}' | '\u{201D}' | '\u{201E}' => Folded::Char('"'),
        '\u{2010}'..='\u{2013}' | '\u{2212}' => Folded::Char('-'),
        '\u{2014}' | '\u{2015}' => Folded::Str("--"),
        '\u{2026}' => Folded::Str("..."),
        '\u{2022}' | '\u{25CF}' | '\u{25AA}' | '\u{00A0}' => Folded::Char(' '),
        '\u{FB00}' => Folded::Str("ff"),
        '\u{FB01}' => Folded::Str("fi"),
        '\u{FB02}' => Folded::Str("fl"),
        '\u{FB03}' => Folded::Str("ffi"),
        '\u{FB04}' => Folded::Str("ffl"),
        other => Folded::Char(other),
    }
}

fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || c.is_alphanumeric()
}
