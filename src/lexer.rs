//! The hand-rolled character-cursor tokenizer (spec §2 component 4, §4.1).
//!
//! Deliberately not built on a generated/table-driven lexer (see
//! `token.rs`'s module doc for the sibling decision on `updateContext`):
//! regex-vs-divide, template-interpolation boundaries, and (with the
//! markup dialect) tag-vs-expression all depend on the *parser's* current
//! context, not on the characters alone, so a one-shot whole-input lexer
//! can't make these calls — the tokenizer here is driven one token at a
//! time by the parser, consulting [`crate::context::ContextStack`] before
//! each decision the same way the original's context-aware `readToken`
//! does.
//!
//! The lexer itself is stateless between calls: it takes a byte offset
//! and returns a token plus the new offset, rather than owning a private
//! cursor. The single mutable cursor lives on `ParserState` (see
//! `state.rs`), which is what speculative-parse checkpoint/restore
//! actually snapshots.

use crate::char_classifier::*;
use crate::comments::{CommentAttacher, CommentKind};
use crate::context::ContextStack;
use crate::error::{ParseError, ParseResult};
use crate::position::LineIndex;
use crate::token::{keyword_kind, Token, TokenKind, TokenValue};
use rowan::{TextRange, TextSize};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    len: u32,
}

fn tok(kind: TokenKind, start: u32, end: u32, value: TokenValue, contains_esc: bool, newline: bool) -> Token {
    Token {
        kind,
        span: TextRange::new(TextSize::from(start), TextSize::from(end)),
        value,
        contains_esc,
        preceded_by_newline: newline,
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            len: source.len() as u32,
        }
    }

    fn byte(&self, pos: u32) -> Option<u8> {
        self.bytes.get(pos as usize).copied()
    }

    fn char_at(&self, pos: u32) -> Option<(char, u32)> {
        let rest = self.source.get(pos as usize..)?;
        let ch = rest.chars().next()?;
        Some((ch, ch.len_utf8() as u32))
    }

    fn err(&self, offset: u32, lines: &LineIndex, message: impl Into<String>) -> ParseError {
        ParseError::new(offset, lines.position(offset), message)
    }

    /// Skip the `#!...` hashbang line, only legal at offset 0.
    pub fn skip_hashbang(&self, pos: u32) -> u32 {
        if pos == 0 && self.bytes.starts_with(b"#!") {
            let mut p = 2;
            while let Some((ch, w)) = self.char_at(p) {
                if is_line_terminator(ch) {
                    break;
                }
                p += w;
            }
            p
        } else {
            pos
        }
    }

    /// Advance past whitespace and comments, recording comments and line
    /// starts. Returns `(new_pos, saw_newline)`.
    fn skip_trivia(
        &self,
        mut pos: u32,
        in_module: bool,
        ctx: &ContextStack,
        comments: &mut CommentAttacher,
        lines: &mut LineIndex,
    ) -> ParseResult<(u32, bool)> {
        let mut newline = false;
        // Trivia is never skipped while lexing template raw text.
        if ctx.in_template_quasi() {
            return Ok((pos, false));
        }
        loop {
            match self.char_at(pos) {
                None => break,
                Some((ch, w)) => {
                    if is_line_terminator(ch) {
                        newline = true;
                        lines.advance(&self.source[pos as usize..(pos + w) as usize], pos);
                        pos += w;
                        continue;
                    }
                    if is_whitespace(ch) {
                        pos += w;
                        continue;
                    }
                    if ch == '/' && self.byte(pos + 1) == Some(b'/') {
                        let start = pos;
                        pos += 2;
                        while let Some((c, cw)) = self.char_at(pos) {
                            if is_line_terminator(c) {
                                break;
                            }
                            pos += cw;
                        }
                        let id = comments.push(CommentKind::Line, start, pos);
                        let _ = id;
                        continue;
                    }
                    if ch == '/' && self.byte(pos + 1) == Some(b'*') {
                        let start = pos;
                        pos += 2;
                        let mut closed = false;
                        while let Some((c, cw)) = self.char_at(pos) {
                            if is_line_terminator(c) {
                                newline = true;
                                lines.advance(&self.source[pos as usize..(pos + cw) as usize], pos);
                            }
                            if c == '*' && self.byte(pos + cw as u32) == Some(b'/') {
                                pos += cw + 1;
                                closed = true;
                                break;
                            }
                            pos += cw;
                        }
                        if !closed {
                            return Err(self.err(start, lines, "unterminated comment"));
                        }
                        comments.push(CommentKind::Block, start, pos);
                        continue;
                    }
                    // Non-module HTML-style comments (spec §4.1).
                    if !in_module && ch == '<' && self.bytes[pos as usize..].starts_with(b"<!--") {
                        let start = pos;
                        pos += 4;
                        while let Some((c, cw)) = self.char_at(pos) {
                            if is_line_terminator(c) {
                                break;
                            }
                            pos += cw;
                        }
                        comments.push(CommentKind::Line, start, pos);
                        continue;
                    }
                    if !in_module && ch == '-' && newline && self.bytes[pos as usize..].starts_with(b"-->") {
                        let start = pos;
                        pos += 3;
                        while let Some((c, cw)) = self.char_at(pos) {
                            if is_line_terminator(c) {
                                break;
                            }
                            pos += cw;
                        }
                        comments.push(CommentKind::Line, start, pos);
                        continue;
                    }
                    break;
                }
            }
        }
        Ok((pos, newline))
    }

    /// Produce the next significant token starting at `pos`. `prev` is
    /// the previous token's kind, consulted for `braceIsBlock` and the
    /// `name`-after-declarator ASI corner (spec §4.1); `prev_text` is its
    /// exact spelling, needed only to recognize `let` in that same corner.
    pub fn next_token(
        &self,
        pos: u32,
        prev: Option<TokenKind>,
        prev_text: Option<&str>,
        in_module: bool,
        in_strict: bool,
        ctx: &mut ContextStack,
        comments: &mut CommentAttacher,
        lines: &mut LineIndex,
    ) -> ParseResult<Token> {
        let (start, newline) = self.skip_trivia(pos, in_module, ctx, comments, lines)?;

        let token = if ctx.in_template_quasi() {
            self.read_template_chunk(start, lines, newline)?
        } else {
            match self.char_at(start) {
                None => tok(TokenKind::Eof, start, start, TokenValue::None, false, newline),
                Some((ch, _)) => self.read_token(ch, start, prev, ctx, in_strict, lines, newline)?,
            }
        };

        if token.kind == TokenKind::Template {
            let tail = matches!(&token.value, TokenValue::Template { tail, .. } if *tail);
            ctx.update_context_template(tail);
        } else {
            ctx.update_context(token.kind, prev, prev_text, newline);
        }
        Ok(token)
    }

    fn read_token(
        &self,
        ch: char,
        start: u32,
        prev: Option<TokenKind>,
        ctx: &ContextStack,
        in_strict: bool,
        lines: &LineIndex,
        newline: bool,
    ) -> ParseResult<Token> {
        if is_identifier_start(ch) || ch == '\\' {
            return self.read_identifier_or_keyword(start, in_strict, lines, newline);
        }
        if ch == '#' {
            if self.byte(start + 1).map(|b| b == b'!').unwrap_or(false) {
                // Handled only at offset 0 by `skip_hashbang`; elsewhere `#!`
                // is just `#` followed by `!`.
            }
            let (next, _) = self.char_at(start + 1).unwrap_or(('\0', 0));
            if is_identifier_start(next) {
                let ident = self.read_identifier_or_keyword(start + 1, in_strict, lines, newline)?;
                let end = ident.end();
                return Ok(tok(TokenKind::PrivateName, start, end, TokenValue::None, false, newline));
            }
            return Ok(tok(TokenKind::Hash, start, start + 1, TokenValue::None, false, newline));
        }
        if is_decimal_digit(ch) || (ch == '.' && self.byte(start + 1).map(is_ascii_digit_byte).unwrap_or(false)) {
            return self.read_number(start, in_strict, lines, newline);
        }
        if ch == '\'' || ch == '"' {
            return self.read_string(start, ch, lines, newline);
        }
        if ch == '`' {
            return Ok(tok(TokenKind::Backtick, start, start + 1, TokenValue::None, false, newline));
        }
        if ch == '/' && ctx.expr_allowed {
            return self.read_regex(start, lines, newline);
        }
        self.read_punctuator(ch, start, prev, lines, newline)
    }

    fn read_identifier_or_keyword(
        &self,
        start: u32,
        in_strict: bool,
        lines: &LineIndex,
        newline: bool,
    ) -> ParseResult<Token> {
        let mut pos = start;
        let mut text = String::new();
        let mut contains_esc = false;
        let mut first = true;
        loop {
            if self.byte(pos) == Some(b'\\') && self.byte(pos + 1) == Some(b'u') {
                contains_esc = true;
                let (ch, next) = self.read_unicode_escape(pos + 2, lines)?;
                let ok = if first { is_identifier_start(ch) } else { is_identifier_continue(ch) };
                if !ok {
                    return Err(self.err(pos, lines, "invalid unicode escape in identifier"));
                }
                text.push(ch);
                pos = next;
                first = false;
                continue;
            }
            match self.char_at(pos) {
                Some((ch, w)) if (first && is_identifier_start(ch)) || (!first && is_identifier_continue(ch)) => {
                    text.push(ch);
                    pos += w;
                    first = false;
                }
                _ => break,
            }
        }
        if first {
            return Err(self.err(start, lines, "unexpected character"));
        }
        let kind = if !contains_esc {
            keyword_kind(&text).unwrap_or(TokenKind::Name)
        } else {
            TokenKind::Name
        };
        let _ = in_strict;
        Ok(tok(kind, start, pos, TokenValue::Str(text), contains_esc, newline))
    }

    fn read_unicode_escape(&self, pos: u32, lines: &LineIndex) -> ParseResult<(char, u32)> {
        if self.byte(pos) == Some(b'{') {
            let mut p = pos + 1;
            let mut value: u32 = 0;
            let digit_start = p;
            while let Some(d) = self.byte(p).and_then(|b| (b as char).to_digit(16)) {
                value = value
                    .checked_mul(16)
                    .and_then(|v| v.checked_add(d))
                    .ok_or_else(|| self.err(pos, lines, "code point out of range"))?;
                p += 1;
            }
            if p == digit_start || self.byte(p) != Some(b'}') {
                return Err(self.err(pos, lines, "invalid unicode escape"));
            }
            let c = char::from_u32(value).ok_or_else(|| self.err(pos, lines, "code point out of range"))?;
            Ok((c, p + 1))
        } else {
            let mut value: u32 = 0;
            let mut p = pos;
            for _ in 0..4 {
                let d = self
                    .byte(p)
                    .and_then(|b| (b as char).to_digit(16))
                    .ok_or_else(|| self.err(pos, lines, "invalid unicode escape"))?;
                value = value * 16 + d;
                p += 1;
            }
            let c = char::from_u32(value).ok_or_else(|| self.err(pos, lines, "code point out of range"))?;
            Ok((c, p))
        }
    }

    fn read_number(&self, start: u32, in_strict: bool, lines: &LineIndex, newline: bool) -> ParseResult<Token> {
        let mut pos = start;
        let mut is_float = false;
        let mut is_legacy_octal = false;

        let radix_digit = |b: u8| is_ascii_digit_byte(b);
        let is_radix_prefix = self.byte(pos) == Some(b'0')
            && matches!(self.byte(pos + 1), Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B'));

        if is_radix_prefix {
            pos += 2;
            let digit_ok: fn(u8) -> bool = match self.byte(start + 1).unwrap() {
                b'x' | b'X' => |b| (b as char).is_ascii_hexdigit(),
                b'o' | b'O' => |b| (b'0'..=b'7').contains(&b),
                _ => |b| b == b'0' || b == b'1',
            };
            let mut last_was_sep = true;
            let digits_start = pos;
            while let Some(b) = self.byte(pos) {
                if digit_ok(b) {
                    pos += 1;
                    last_was_sep = false;
                } else if b == b'_' {
                    if last_was_sep {
                        return Err(self.err(pos, lines, "numeric separator not allowed here"));
                    }
                    pos += 1;
                    last_was_sep = true;
                } else {
                    break;
                }
            }
            if pos == digits_start || last_was_sep {
                return Err(self.err(start, lines, "invalid numeric literal"));
            }
        } else {
            if self.byte(pos) == Some(b'0') && self.byte(pos + 1).map(radix_digit).unwrap_or(false) {
                is_legacy_octal = true;
                if in_strict {
                    return Err(self.err(start, lines, "legacy octal literal not allowed in strict mode"));
                }
            }
            let mut last_was_sep = true;
            while let Some(b) = self.byte(pos) {
                if radix_digit(b) {
                    pos += 1;
                    last_was_sep = false;
                } else if b == b'_' && !is_legacy_octal {
                    if last_was_sep {
                        return Err(self.err(pos, lines, "numeric separator not allowed here"));
                    }
                    pos += 1;
                    last_was_sep = true;
                } else {
                    break;
                }
            }
            if self.byte(pos) == Some(b'.') {
                is_float = true;
                is_legacy_octal = false;
                pos += 1;
                while let Some(b) = self.byte(pos) {
                    if radix_digit(b) || b == b'_' {
                        pos += 1;
                    } else {
                        break;
                    }
                }
            }
            if matches!(self.byte(pos), Some(b'e' | b'E')) {
                is_float = true;
                is_legacy_octal = false;
                pos += 1;
                if matches!(self.byte(pos), Some(b'+' | b'-')) {
                    pos += 1;
                }
                while let Some(b) = self.byte(pos) {
                    if radix_digit(b) || b == b'_' {
                        pos += 1;
                    } else {
                        break;
                    }
                }
            }
        }

        if self.byte(pos) == Some(b'n') {
            if is_float || is_legacy_octal {
                return Err(self.err(start, lines, "invalid BigInt literal"));
            }
            let raw: String = self.source[start as usize..pos as usize]
                .chars()
                .filter(|c| *c != '_')
                .collect();
            pos += 1;
            if let Some((c, _)) = self.char_at(pos) {
                if is_identifier_start(c) {
                    return Err(self.err(pos, lines, "identifier directly after number"));
                }
            }
            return Ok(tok(TokenKind::BigInt, start, pos, TokenValue::BigInt(raw), false, newline));
        }

        if let Some((c, _)) = self.char_at(pos) {
            if is_identifier_start(c) || is_decimal_digit(c) {
                return Err(self.err(pos, lines, "identifier directly after number"));
            }
        }

        let raw = &self.source[start as usize..pos as usize];
        let value = parse_numeric_value(raw);
        Ok(tok(TokenKind::Num, start, pos, TokenValue::Num(value), false, newline))
    }

    fn read_string(&self, start: u32, quote: char, lines: &LineIndex, newline: bool) -> ParseResult<Token> {
        let mut pos = start + 1;
        let mut value = String::new();
        loop {
            match self.char_at(pos) {
                None => return Err(self.err(start, lines, "unterminated string literal")),
                Some((ch, w)) if ch == quote => {
                    pos += w;
                    break;
                }
                Some((ch, _)) if is_line_terminator(ch) => {
                    return Err(self.err(pos, lines, "unterminated string literal"))
                }
                Some(('\\', w)) => {
                    let (cooked, next) = self.read_escape_sequence(pos + w, lines)?;
                    if let Some(c) = cooked {
                        value.push(c);
                    }
                    pos = next;
                }
                Some((ch, w)) => {
                    value.push(ch);
                    pos += w;
                }
            }
        }
        Ok(tok(TokenKind::Str, start, pos, TokenValue::Str(value), false, newline))
    }

    /// Cook one escape sequence starting just past the backslash. Returns
    /// `None` for a line-continuation (backslash-newline, which cooks to
    /// nothing).
    fn read_escape_sequence(&self, pos: u32, lines: &LineIndex) -> ParseResult<(Option<char>, u32)> {
        let (ch, w) = self
            .char_at(pos)
            .ok_or_else(|| self.err(pos, lines, "unterminated escape sequence"))?;
        Ok(match ch {
            'n' => (Some('\n'), pos + w),
            'r' => (Some('\r'), pos + w),
            't' => (Some('\t'), pos + w),
            'b' => (Some('\u{8}'), pos + w),
            'f' => (Some('\u{c}'), pos + w),
            'v' => (Some('\u{b}'), pos + w),
            '0' if !self.byte(pos + 1).map(is_ascii_digit_byte).unwrap_or(false) => (Some('\0'), pos + w),
            'x' => {
                let mut v = 0u32;
                let mut p = pos + 1;
                for _ in 0..2 {
                    let d = self
                        .byte(p)
                        .and_then(|b| (b as char).to_digit(16))
                        .ok_or_else(|| self.err(pos, lines, "invalid hex escape"))?;
                    v = v * 16 + d;
                    p += 1;
                }
                (char::from_u32(v), p)
            }
            'u' => {
                let (c, next) = self.read_unicode_escape(pos + 1, lines)?;
                (Some(c), next)
            }
            c if is_line_terminator(c) => (None, pos + w),
            '1'..='7' => {
                // Legacy octal escape; accepted here (strict-mode/template
                // rejection is the caller's early-error check, per spec §4.1).
                let mut v = ch as u32 - '0' as u32;
                let mut p = pos + w;
                for _ in 0..2 {
                    if let Some(d) = self.byte(p).filter(|b| (b'0'..=b'7').contains(b)) {
                        v = v * 8 + (d - b'0') as u32;
                        p += 1;
                    } else {
                        break;
                    }
                }
                (char::from_u32(v), p)
            }
            other => (Some(other), pos + w),
        })
    }

    fn read_template_chunk(&self, start: u32, lines: &LineIndex, newline: bool) -> ParseResult<Token> {
        let mut pos = start;
        let mut cooked = String::new();
        let mut invalid_escape = false;
        loop {
            match self.char_at(pos) {
                None => return Err(self.err(start, lines, "unterminated template literal")),
                Some(('`', _)) => {
                    return Ok(self.finish_template(start, pos, pos, cooked, invalid_escape, true, newline));
                }
                Some(('$', w)) if self.byte(pos + w) == Some(b'{') => {
                    return Ok(self.finish_template(start, pos, pos, cooked, invalid_escape, false, newline));
                }
                Some(('\\', w)) => match self.read_escape_sequence(pos + w, lines) {
                    Ok((c, next)) => {
                        if let Some(c) = c {
                            cooked.push(c);
                        }
                        pos = next;
                    }
                    Err(_) => {
                        invalid_escape = true;
                        pos += w;
                    }
                },
                Some(('\r', w)) => {
                    cooked.push('\n');
                    pos += w;
                    if self.byte(pos) == Some(b'\n') {
                        pos += 1;
                    }
                }
                Some((ch, w)) => {
                    cooked.push(ch);
                    pos += w;
                }
            }
        }
    }

    fn finish_template(
        &self,
        start: u32,
        content_end: u32,
        resume_from: u32,
        cooked: String,
        invalid_escape: bool,
        tail: bool,
        newline: bool,
    ) -> Token {
        let raw = self.source[start as usize..content_end as usize].to_string();
        let end = if tail { resume_from + 1 } else { resume_from + 2 };
        let value = TokenValue::Template {
            cooked: if invalid_escape { None } else { Some(cooked) },
            raw,
            tail,
        };
        tok(TokenKind::Template, start, end, value, false, newline)
    }

    fn read_regex(&self, start: u32, lines: &LineIndex, newline: bool) -> ParseResult<Token> {
        let mut pos = start + 1;
        let mut in_class = false;
        loop {
            match self.char_at(pos) {
                None => return Err(self.err(start, lines, "unterminated regular expression")),
                Some((ch, _)) if is_line_terminator(ch) => {
                    return Err(self.err(start, lines, "unterminated regular expression"))
                }
                Some(('\\', w)) => {
                    pos += w;
                    if let Some((_, w2)) = self.char_at(pos) {
                        pos += w2;
                    }
                }
                Some(('[', w)) => {
                    in_class = true;
                    pos += w;
                }
                Some((']', w)) => {
                    in_class = false;
                    pos += w;
                }
                Some(('/', w)) if !in_class => {
                    let pattern = self.source[(start + 1) as usize..pos as usize].to_string();
                    pos += w;
                    let flags_start = pos;
                    while let Some((c, w2)) = self.char_at(pos) {
                        if is_identifier_continue(c) {
                            pos += w2;
                        } else {
                            break;
                        }
                    }
                    let flags = self.source[flags_start as usize..pos as usize].to_string();
                    if !flags.chars().all(|c| "gmsiyu".contains(c)) {
                        return Err(self.err(flags_start, lines, "invalid regular expression flags"));
                    }
                    return Ok(tok(
                        TokenKind::Regex,
                        start,
                        pos,
                        TokenValue::Regex { pattern, flags },
                        false,
                        newline,
                    ));
                }
                Some((_, w)) => pos += w,
            }
        }
    }

    fn read_punctuator(
        &self,
        ch: char,
        start: u32,
        _prev: Option<TokenKind>,
        lines: &LineIndex,
        newline: bool,
    ) -> ParseResult<Token> {
        let b1 = self.byte(start + 1);
        let b2 = self.byte(start + 2);
        macro_rules! t {
            ($kind:expr, $width:expr) => {
                Ok(tok($kind, start, start + $width, TokenValue::None, false, newline))
            };
        }
        use TokenKind::*;
        match ch {
            '{' => t!(BraceL, 1),
            '}' => t!(BraceR, 1),
            '(' => t!(ParenL, 1),
            ')' => t!(ParenR, 1),
            '[' => t!(BracketL, 1),
            ']' => t!(BracketR, 1),
            ',' => t!(Comma, 1),
            ';' => t!(Semi, 1),
            '@' => t!(At, 1),
            '~' => t!(Tilde, 1),
            ':' => {
                if b1 == Some(b':') {
                    t!(DoubleColon, 2)
                } else {
                    t!(Colon, 1)
                }
            }
            '.' => {
                if b1 == Some(b'.') && b2 == Some(b'.') {
                    t!(Ellipsis, 3)
                } else {
                    t!(Dot, 1)
                }
            }
            '?' => {
                if b1 == Some(b'.') && !b2.map(is_ascii_digit_byte).unwrap_or(false) {
                    t!(QuestionDot, 2)
                } else if b1 == Some(b'?') {
                    t!(Nullish, 2)
                } else {
                    t!(Question, 1)
                }
            }
            '=' => {
                if b1 == Some(b'>') {
                    t!(Arrow, 2)
                } else if b1 == Some(b'=') && b2 == Some(b'=') {
                    t!(Equality, 3)
                } else if b1 == Some(b'=') {
                    t!(Equality, 2)
                } else {
                    t!(Eq, 1)
                }
            }
            '!' => {
                if b1 == Some(b'=') && b2 == Some(b'=') {
                    t!(Equality, 3)
                } else if b1 == Some(b'=') {
                    t!(Equality, 2)
                } else {
                    t!(Bang, 1)
                }
            }
            '+' | '-' => {
                if b1 == Some(ch as u8) {
                    t!(IncDec, 2)
                } else if b1 == Some(b'=') {
                    t!(Assign, 2)
                } else {
                    t!(Arith, 1)
                }
            }
            '*' => {
                if b1 == Some(b'*') {
                    if b2 == Some(b'=') {
                        t!(Assign, 3)
                    } else {
                        t!(StarStar, 2)
                    }
                } else if b1 == Some(b'=') {
                    t!(Assign, 2)
                } else {
                    t!(Star, 1)
                }
            }
            '/' => {
                if b1 == Some(b'=') {
                    t!(Assign, 2)
                } else {
                    t!(Slash, 1)
                }
            }
            '%' => {
                if b1 == Some(b'=') {
                    t!(Assign, 2)
                } else {
                    t!(Modulo, 1)
                }
            }
            '&' => {
                if b1 == Some(b'&') {
                    t!(LogicalAnd, 2)
                } else if b1 == Some(b'=') {
                    t!(Assign, 2)
                } else {
                    t!(BitwiseAnd, 1)
                }
            }
            '|' => {
                if b1 == Some(b'|') {
                    t!(LogicalOr, 2)
                } else if b1 == Some(b'=') {
                    t!(Assign, 2)
                } else {
                    t!(BitwiseOr, 1)
                }
            }
            '^' => {
                if b1 == Some(b'=') {
                    t!(Assign, 2)
                } else {
                    t!(BitwiseXor, 1)
                }
            }
            '<' => {
                if b1 == Some(b'<') {
                    if b2 == Some(b'=') {
                        t!(Assign, 3)
                    } else {
                        t!(BitShift, 2)
                    }
                } else if b1 == Some(b'=') {
                    t!(Relational, 2)
                } else {
                    t!(Relational, 1)
                }
            }
            '>' => {
                if b1 == Some(b'>') && b2 == Some(b'>') {
                    t!(BitShift, 3)
                } else if b1 == Some(b'>') {
                    t!(BitShift, 2)
                } else if b1 == Some(b'=') {
                    t!(Relational, 2)
                } else {
                    t!(Relational, 1)
                }
            }
            _ => Err(self.err(start, lines, format!("unexpected character '{ch}'"))),
        }
    }

    pub fn len(&self) -> u32 {
        self.len
    }
}

fn is_ascii_digit_byte(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Cook a decimal/hex/octal/binary literal's text into its `f64` value
/// (spec §9's "literal cooking" non-goal exemption).
fn parse_numeric_value(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return u128::from_str_radix(hex, 16).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    if let Some(oct) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
        return u128::from_str_radix(oct, 8).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return u128::from_str_radix(bin, 2).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().all(|c| c.is_ascii_digit()) {
        return u128::from_str_radix(&cleaned, 8).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    cleaned.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::CommentAttacher;
    use crate::context::ContextStack;

    fn lex_all(src: &str) -> Vec<TokenKind> {
        let lexer = Lexer::new(src);
        let mut ctx = ContextStack::new();
        let mut comments = CommentAttacher::new();
        let mut lines = LineIndex::new(1);
        let mut pos = lexer.skip_hashbang(0);
        let mut prev = None;
        let mut kinds = Vec::new();
        loop {
            let token = lexer
                .next_token(pos, prev, None, false, false, &mut ctx, &mut comments, &mut lines)
                .unwrap();
            pos = token.end();
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                break;
            }
            prev = Some(token.kind);
        }
        kinds
    }

    #[test]
    fn tokenizes_simple_arithmetic() {
        let kinds = lex_all("1 + 2 * 3");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Num,
                TokenKind::Arith,
                TokenKind::Num,
                TokenKind::Star,
                TokenKind::Num,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn slash_after_number_is_division_not_regex() {
        let lexer = Lexer::new("x / y");
        let mut ctx = ContextStack::new();
        let mut comments = CommentAttacher::new();
        let mut lines = LineIndex::new(1);
        let t1 = lexer
            .next_token(0, None, None, false, false, &mut ctx, &mut comments, &mut lines)
            .unwrap();
        let t2 = lexer
            .next_token(t1.end(), Some(t1.kind), None, false, false, &mut ctx, &mut comments, &mut lines)
            .unwrap();
        assert_eq!(t2.kind, TokenKind::Slash);
    }

    #[test]
    fn slash_after_operator_is_regex() {
        let lexer = Lexer::new("= /abc/g");
        let mut ctx = ContextStack::new();
        let mut comments = CommentAttacher::new();
        let mut lines = LineIndex::new(1);
        let t1 = lexer
            .next_token(0, None, None, false, false, &mut ctx, &mut comments, &mut lines)
            .unwrap();
        let t2 = lexer
            .next_token(t1.end(), Some(t1.kind), None, false, false, &mut ctx, &mut comments, &mut lines)
            .unwrap();
        assert_eq!(t2.kind, TokenKind::Regex);
    }

    #[test]
    fn legacy_octal_rejected_in_strict_mode() {
        let lexer = Lexer::new("017");
        let mut ctx = ContextStack::new();
        let mut comments = CommentAttacher::new();
        let mut lines = LineIndex::new(1);
        let result = lexer.next_token(0, None, None, false, true, &mut ctx, &mut comments, &mut lines);
        assert!(result.is_err());
    }

    #[test]
    fn bigint_rejects_fractional_literal() {
        let lexer = Lexer::new("0.0n");
        let mut ctx = ContextStack::new();
        let mut comments = CommentAttacher::new();
        let mut lines = LineIndex::new(1);
        assert!(lexer
            .next_token(0, None, None, false, false, &mut ctx, &mut comments, &mut lines)
            .is_err());
    }

    #[test]
    fn hashbang_is_skipped_only_at_offset_zero() {
        let lexer = Lexer::new("#!/usr/bin/env node\n1");
        let pos = lexer.skip_hashbang(0);
        let mut ctx = ContextStack::new();
        let mut comments = CommentAttacher::new();
        let mut lines = LineIndex::new(1);
        let token = lexer
            .next_token(pos, None, None, false, false, &mut ctx, &mut comments, &mut lines)
            .unwrap();
        assert_eq!(token.kind, TokenKind::Num);
    }
}
