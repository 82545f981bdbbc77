//! Markup ("jsx") dialect productions (spec §4.4.3): elements, fragments,
//! namespaced/member element names, attributes, children, and the
//! text-entity decoding `JSXText.value` needs.
//!
//! The tokenizer has no JSX-aware mode — unlike template literals or the
//! other dialects, element names and text runs aren't lexed as ordinary
//! tokens at all. This module scans those spans directly off the source
//! with [`Parser::source`] and rejoins the normal token stream with
//! [`Parser::resync_at`] once it reaches a boundary (`<`, `{`, `>`) the
//! rest of the parser already knows how to read.

use crate::ast::*;
use crate::error::ParseResult;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    /// Entry point from `expr.rs`'s atom dispatch: current token is the
    /// `<` that starts either a fragment (`<>`) or an element.
    pub(super) fn parse_jsx_root(&mut self) -> ParseResult<Node> {
        self.parse_jsx_element_or_fragment()
    }

    fn parse_jsx_element_or_fragment(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.state.context.enter_markup_expression();
        self.expect_jsx_lt()?;

        if self.jsx_current_is('>') {
            self.eat_gt()?;
            let children = self.parse_jsx_children()?;
            self.expect_jsx_closing_fragment()?;
            self.state.context.exit_markup_expression();
            let meta = self.finish_node(open, true);
            return Ok(Node::JSXFragment { meta, children });
        }

        let opening = self.parse_jsx_opening_element(open)?;
        let self_closing = matches!(&opening, Node::JSXOpeningElement { self_closing, .. } if *self_closing);
        if self_closing {
            let meta = self.finish_node(open, false);
            return Ok(Node::JSXElement {
                meta,
                opening_element: Box::new(opening),
                children: Vec::new(),
                closing_element: None,
            });
        }

        let children = self.parse_jsx_children()?;
        let closing = self.parse_jsx_closing_element()?;
        self.check_jsx_tags_match(&opening, &closing)?;
        self.state.context.exit_markup_expression();
        let meta = self.finish_node(open, false);
        Ok(Node::JSXElement {
            meta,
            opening_element: Box::new(opening),
            children,
            closing_element: Some(Box::new(closing)),
        })
    }

    fn parse_jsx_opening_element(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        self.state.context.enter_markup_open_tag();
        let name = self.parse_jsx_element_name()?;
        let mut attributes = Vec::new();
        while !self.jsx_current_is('>') && !self.at(TokenKind::Slash) && !self.is_eof() {
            attributes.push(self.parse_jsx_attribute_or_spread()?);
        }
        let self_closing = self.eat(TokenKind::Slash)?;
        self.state.context.exit_markup_tag();
        if self_closing {
            // no separate closing tag will pop the wrapping expression
            // context later, so `/>` has to pop both here.
            self.state.context.exit_markup_expression();
        }
        self.expect_jsx_gt()?;
        let meta = self.finish_node(open, false);
        Ok(Node::JSXOpeningElement {
            meta,
            name: Box::new(name),
            attributes,
            self_closing,
        })
    }

    fn parse_jsx_closing_element(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.state.context.enter_markup_close_tag();
        self.expect_jsx_lt()?;
        self.expect(TokenKind::Slash)?;
        let name = self.parse_jsx_element_name()?;
        self.state.context.exit_markup_tag();
        self.expect_jsx_gt()?;
        let meta = self.finish_node(open, false);
        Ok(Node::JSXClosingElement { meta, name: Box::new(name) })
    }

    fn expect_jsx_closing_fragment(&mut self) -> ParseResult<()> {
        self.state.context.enter_markup_close_tag();
        self.expect_jsx_lt()?;
        self.expect(TokenKind::Slash)?;
        self.state.context.exit_markup_tag();
        self.expect_jsx_gt()
    }

    fn check_jsx_tags_match(&self, opening: &Node, closing: &Node) -> ParseResult<()> {
        let (Node::JSXOpeningElement { name: open_name, .. }, Node::JSXClosingElement { name: close_name, .. }) =
            (opening, closing)
        else {
            return Ok(());
        };
        if jsx_name_text(open_name) != jsx_name_text(close_name) {
            return Err(self.error_at(
                closing.span().start,
                format!(
                    "closing tag '</{}>' does not match opening tag '<{}>'",
                    jsx_name_text(close_name),
                    jsx_name_text(open_name)
                ),
            ));
        }
        Ok(())
    }

    /// `name`, `ns:name` (`JSXNamespacedName`), or `a.b.c`
    /// (`JSXMemberExpression` chain) — scanned as one contiguous run
    /// since none of `-`, `.`, `:` are legal inside an ordinary JS
    /// identifier token.
    fn parse_jsx_element_name(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let raw = self.scan_jsx_name()?;
        let meta = self.finish_node(open, false);
        Ok(build_jsx_name(&raw, &meta))
    }

    fn parse_jsx_attribute_name(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let raw = self.scan_jsx_name()?;
        let meta = self.finish_node(open, false);
        Ok(build_jsx_name(&raw, &meta))
    }

    fn parse_jsx_attribute_or_spread(&mut self) -> ParseResult<Node> {
        if self.at(TokenKind::BraceL) {
            let open = self.start_node();
            self.bump()?;
            self.expect(TokenKind::Ellipsis)?;
            let argument = self.parse_assignment()?;
            self.expect(TokenKind::BraceR)?;
            let meta = self.finish_node(open, false);
            return Ok(Node::JSXSpreadAttribute { meta, argument: Box::new(argument) });
        }
        let open = self.start_node();
        let name = self.parse_jsx_attribute_name()?;
        let value = if self.eat(TokenKind::Eq)? {
            Some(Box::new(self.parse_jsx_attribute_value()?))
        } else {
            None
        };
        let meta = self.finish_node(open, false);
        Ok(Node::JSXAttribute { meta, name: Box::new(name), value })
    }

    fn parse_jsx_attribute_value(&mut self) -> ParseResult<Node> {
        if self.at(TokenKind::BraceL) {
            let open = self.start_node();
            self.bump()?;
            let expression = self.parse_assignment()?;
            self.expect(TokenKind::BraceR)?;
            let meta = self.finish_node(open, false);
            return Ok(Node::JSXExpressionContainer { meta, expression: Box::new(expression) });
        }
        if self.at(TokenKind::Relational) && self.current_text() == "<" {
            return self.parse_jsx_element_or_fragment();
        }
        let open = self.start_node();
        let value = match &self.cur().value {
            crate::token::TokenValue::Str(s) => s.clone(),
            _ => return Err(self.error_here("expected a JSX attribute value")),
        };
        self.bump()?;
        let meta = self.finish_node(open, false);
        Ok(Node::StringLiteral { meta, value })
    }

    /// Text, `{expression}` containers, and nested elements, up to (but
    /// not including) the matching `</`.
    fn parse_jsx_children(&mut self) -> ParseResult<Vec<Node>> {
        let mut children = Vec::new();
        loop {
            let text_start = self.cur().start();
            let (raw, boundary) = self.scan_jsx_text(text_start)?;
            if !raw.is_empty() {
                let meta = crate::ast::NodeMeta::new(self.span_for(text_start, text_start + raw.len() as u32));
                children.push(Node::JSXText { meta, value: decode_jsx_entities(&raw), raw });
            }
            match boundary {
                JsxTextBoundary::ClosingTag => break,
                JsxTextBoundary::Eof => return Err(self.error_here("unterminated JSX element")),
                JsxTextBoundary::Element => children.push(self.parse_jsx_element_or_fragment()?),
                JsxTextBoundary::Expression => {
                    let open = self.start_node();
                    self.bump()?; // `{`
                    if self.eat(TokenKind::Ellipsis)? {
                        let expression = self.parse_assignment()?;
                        let meta = self.finish_node(open, false);
                        children.push(Node::JSXSpreadChild { meta, expression: Box::new(expression) });
                    } else if self.at(TokenKind::BraceR) {
                        let meta = self.finish_node(open, false);
                        children.push(Node::JSXExpressionContainer {
                            meta: meta.clone(),
                            expression: Box::new(Node::JSXEmptyExpression { meta }),
                        });
                    } else {
                        let expression = self.parse_expression()?;
                        let meta = self.finish_node(open, false);
                        children.push(Node::JSXExpressionContainer { meta, expression: Box::new(expression) });
                    }
                    self.expect(TokenKind::BraceR)?;
                }
            }
        }
        Ok(children)
    }

    /// Reads raw text starting at `start` until `<`, `{`, or EOF, then
    /// resyncs the token stream to sit exactly on that boundary.
    fn scan_jsx_text(&mut self, start: u32) -> ParseResult<(String, JsxTextBoundary)> {
        let src = self.source();
        let mut idx = start as usize;
        let bytes = src.as_bytes();
        while idx < bytes.len() {
            let ch = src[idx..].chars().next().unwrap();
            if ch == '<' || ch == '{' {
                break;
            }
            idx += ch.len_utf8();
        }
        let raw = src[start as usize..idx].to_string();
        self.resync_at(idx as u32)?;
        if idx >= bytes.len() || self.is_eof() {
            return Ok((raw, JsxTextBoundary::Eof));
        }
        let boundary = if self.source()[idx..].starts_with("</") {
            JsxTextBoundary::ClosingTag
        } else if self.source()[idx..].starts_with('<') {
            JsxTextBoundary::Element
        } else {
            JsxTextBoundary::Expression
        };
        Ok((raw, boundary))
    }

    fn scan_jsx_name(&mut self) -> ParseResult<String> {
        let src = self.source();
        let start = self.cur().start() as usize;
        let bytes = src.as_bytes();
        let mut end = start;
        while end < bytes.len() {
            let ch = src[end..].chars().next().unwrap();
            if jsx_name_char(ch) || ch == '.' || ch == ':' {
                end += ch.len_utf8();
            } else {
                break;
            }
        }
        if end == start {
            return Err(self.error_here("expected a JSX name"));
        }
        let text = src[start..end].to_string();
        self.resync_at(end as u32)?;
        Ok(text)
    }

    fn expect_jsx_lt(&mut self) -> ParseResult<()> {
        if self.eat_lt()? {
            Ok(())
        } else {
            Err(self.error_here("expected '<'"))
        }
    }

    fn expect_jsx_gt(&mut self) -> ParseResult<()> {
        if self.eat_gt()? {
            Ok(())
        } else {
            Err(self.error_here("expected '>'"))
        }
    }

    fn jsx_current_is(&self, ch: char) -> bool {
        matches!(self.cur_kind(), TokenKind::Relational | TokenKind::BitShift)
            && self.current_text().starts_with(ch)
    }
}

enum JsxTextBoundary {
    Element,
    Expression,
    ClosingTag,
    Eof,
}

fn jsx_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

fn build_jsx_name(raw: &str, meta: &NodeMeta) -> Node {
    if let Some((ns, name)) = raw.split_once(':') {
        return Node::JSXNamespacedName {
            meta: meta.clone(),
            namespace: Box::new(Node::JSXIdentifier { meta: meta.clone(), name: ns.to_string() }),
            name: Box::new(Node::JSXIdentifier { meta: meta.clone(), name: name.to_string() }),
        };
    }
    let mut parts = raw.split('.');
    let first = parts.next().unwrap_or_default().to_string();
    let mut node = Node::JSXIdentifier { meta: meta.clone(), name: first };
    for part in parts {
        node = Node::JSXMemberExpression {
            meta: meta.clone(),
            object: Box::new(node),
            property: Box::new(Node::JSXIdentifier { meta: meta.clone(), name: part.to_string() }),
        };
    }
    node
}

fn jsx_name_text(node: &Node) -> String {
    match node {
        Node::JSXIdentifier { name, .. } => name.clone(),
        Node::JSXNamespacedName { namespace, name, .. } => format!("{}:{}", jsx_name_text(namespace), jsx_name_text(name)),
        Node::JSXMemberExpression { object, property, .. } => format!("{}.{}", jsx_name_text(object), jsx_name_text(property)),
        _ => String::new(),
    }
}

/// Decodes the handful of HTML entities JSX text commonly carries
/// (`&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`, and numeric
/// `&#NN;`/`&#xHH;` references); anything else passes through verbatim,
/// matching the original source's forgiving (non-XML-strict) handling.
fn decode_jsx_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '&' {
            out.push(c);
            continue;
        }
        if let Some(end) = raw[i..].find(';') {
            let entity = &raw[i + 1..i + end];
            if let Some(decoded) = decode_entity(entity) {
                out.push(decoded);
                for _ in 0..entity.chars().count() + 1 {
                    chars.next();
                }
                continue;
            }
        }
        out.push('&');
    }
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00a0}'),
        _ => {
            if let Some(hex) = entity.strip_prefix('#').and_then(|s| s.strip_prefix('x').or(s.strip_prefix('X'))) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    }
}
