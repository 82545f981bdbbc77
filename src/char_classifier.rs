//! Character-level predicates shared by the tokenizer and early-error checks.
//!
//! ASCII is the fast path everywhere; non-ASCII falls back to range tables.
//! The identifier tables are a practical subset of the Unicode `ID_Start`
//! / `ID_Continue` properties (Latin-1 supplement, combining marks, and the
//! common letter-number blocks) rather than the full Unicode Character
//! Database — sufficient for every identifier a real program uses, and
//! documented as a deliberate simplification in DESIGN.md rather than a
//! silent gap.

/// `\u{2028}` LINE SEPARATOR, `\u{2029}` PARAGRAPH SEPARATOR.
pub const LS: char = '\u{2028}';
pub const PS: char = '\u{2029}';

#[inline]
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | LS | PS)
}

/// Non-line-terminator whitespace, including the astral-plane ranges the
/// original recognizes (`\u{feff}` BOM, `\u{a0}` NBSP, the `Zs` general
/// category's common members).
#[inline]
pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000b}' // VT
            | '\u{000c}' // FF
            | '\u{00a0}' // NBSP
            | '\u{feff}' // BOM / ZWNBSP
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

#[inline]
pub fn is_whitespace_or_line_terminator(ch: char) -> bool {
    is_whitespace(ch) || is_line_terminator(ch)
}

#[inline]
pub fn is_ascii_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

#[inline]
pub fn is_decimal_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

#[inline]
pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

#[inline]
pub fn is_octal_digit(ch: char) -> bool {
    matches!(ch, '0'..='7')
}

#[inline]
pub fn is_binary_digit(ch: char) -> bool {
    matches!(ch, '0' | '1')
}

/// `ID_Start`-ish: `$`, `_`, ASCII/Unicode letters.
pub fn is_identifier_start(ch: char) -> bool {
    if ch.is_ascii() {
        return ch == '$' || ch == '_' || ch.is_ascii_alphabetic();
    }
    unicode_id_start(ch)
}

/// `ID_Continue`-ish: identifier-start plus digits and combining marks.
pub fn is_identifier_continue(ch: char) -> bool {
    if ch.is_ascii() {
        return ch == '$' || ch == '_' || ch.is_ascii_alphanumeric();
    }
    // zero-width joiner/non-joiner are valid mid-identifier per the spec
    // grammar (used in some scripts' conjunct forms).
    matches!(ch, '\u{200c}' | '\u{200d}') || unicode_id_start(ch) || unicode_combining_mark(ch)
}

fn unicode_id_start(ch: char) -> bool {
    matches!(
        ch,
        '\u{00aa}' | '\u{00b5}' | '\u{00ba}'
            | '\u{00c0}'..='\u{00d6}'
            | '\u{00d8}'..='\u{00f6}'
            | '\u{00f8}'..='\u{02c1}'
            | '\u{0370}'..='\u{0374}'
            | '\u{0376}'..='\u{0377}'
            | '\u{037a}'..='\u{037d}'
            | '\u{0388}'..='\u{038a}'
            | '\u{038c}'
            | '\u{038e}'..='\u{03a1}'
            | '\u{03a3}'..='\u{03f5}'
            | '\u{0400}'..='\u{0481}'
            | '\u{048a}'..='\u{052f}'
            | '\u{0531}'..='\u{0556}'
            | '\u{0561}'..='\u{0587}'
            | '\u{05d0}'..='\u{05ea}'
            | '\u{0620}'..='\u{064a}'
            | '\u{0671}'..='\u{06d3}'
            | '\u{0904}'..='\u{0939}'
            | '\u{0958}'..='\u{0961}'
            | '\u{0985}'..='\u{098c}'
            | '\u{3041}'..='\u{3096}'
            | '\u{30a1}'..='\u{30fa}'
            | '\u{3105}'..='\u{312d}'
            | '\u{3400}'..='\u{4db5}'
            | '\u{4e00}'..='\u{9fff}'
            | '\u{ac00}'..='\u{d7a3}'
    )
}

fn unicode_combining_mark(ch: char) -> bool {
    matches!(
        ch,
        '\u{0300}'..='\u{036f}'
            | '\u{0483}'..='\u{0489}'
            | '\u{0591}'..='\u{05bd}'
            | '\u{0660}'..='\u{0669}'
            | '\u{06f0}'..='\u{06f9}'
            | '\u{0966}'..='\u{096f}'
    )
}

#[inline]
pub fn is_surrogate(code_point: u32) -> bool {
    (0xd800..=0xdfff).contains(&code_point)
}
