//! Class declarations/expressions, decorators, private fields and static
//! blocks (spec §4.3's class productions, spec §4.4's decorator-stage
//! handling).

use crate::ast::*;
use crate::error::ParseResult;
use crate::options::Plugin;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_class_declaration(&mut self) -> ParseResult<Node> {
        let decorators = std::mem::take(&mut self.state.pending_decorators);
        let open = self.start_node();
        self.expect(TokenKind::KwClass)?;
        let id = if self.at(TokenKind::Name) {
            Some(Box::new(self.parse_binding_identifier()?))
        } else {
            None
        };
        let (super_class, body) = self.parse_class_tail()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ClassDeclaration {
            meta,
            id,
            super_class,
            body: Box::new(body),
            decorators,
            declare: false,
        })
    }

    pub(super) fn parse_class_expression(&mut self) -> ParseResult<Node> {
        let decorators = std::mem::take(&mut self.state.pending_decorators);
        let open = self.start_node();
        self.expect(TokenKind::KwClass)?;
        let id = if self.at(TokenKind::Name) {
            Some(Box::new(self.parse_binding_identifier()?))
        } else {
            None
        };
        let (super_class, body) = self.parse_class_tail()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ClassExpression {
            meta,
            id,
            super_class,
            body: Box::new(body),
            decorators,
        })
    }

    /// `@decorator class ...` and `@decorator export class ...` (spec
    /// §4.4): decorators are parsed first and stashed on `ParserState` so
    /// whichever declaration follows — possibly after an intervening
    /// `export`/`export default` — can reparent its start to the
    /// decorator list and pick the stash back up.
    pub(super) fn parse_decorated_declaration(&mut self) -> ParseResult<Node> {
        let mut decorators = Vec::new();
        while self.at(TokenKind::At) {
            decorators.push(self.parse_decorator()?);
        }
        self.state.pending_decorators = decorators;
        match self.cur_kind() {
            TokenKind::KwClass => self.parse_class_declaration(),
            TokenKind::KwExport => self.parse_export_declaration(),
            _ => Err(self.error_here("decorators are only valid before a class or export declaration")),
        }
    }

    fn parse_decorator(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::At)?;
        let expression = self.parse_decorator_expression()?;
        let meta = self.finish_node(open, false);
        Ok(Node::Decorator {
            meta,
            expression: Box::new(expression),
        })
    }

    /// The expression after `@`: a bare reference, possibly followed by
    /// member accesses and/or a single call (`@foo.bar(1, 2)`), parsed at
    /// subscript precedence rather than full assignment so `@a, @b` on
    /// separate statements never merges into a sequence expression.
    pub(super) fn parse_decorator_expression(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let ident = self.parse_identifier_name()?;
        let mut expr = ident;
        loop {
            if self.eat(TokenKind::Dot)? {
                let prop = self.parse_identifier_name()?;
                let meta = self.finish_node(open, false);
                expr = Node::MemberExpression {
                    meta,
                    object: Box::new(expr),
                    property: Box::new(prop),
                    computed: false,
                    optional: false,
                };
            } else if self.at(TokenKind::ParenL) {
                let arguments = self.parse_call_arguments()?;
                let meta = self.finish_node(open, false);
                expr = Node::CallExpression {
                    meta,
                    callee: Box::new(expr),
                    arguments,
                    optional: false,
                };
                break;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_class_tail(&mut self) -> ParseResult<(Option<BNode>, Node)> {
        let type_parameters = self.parse_optional_type_parameters()?;
        let super_class = if self.eat(TokenKind::KwExtends)? {
            Some(Box::new(self.parse_subscripts_no_call()?))
        } else {
            None
        };
        if self.has_plugin(Plugin::TypeScript) && self.current_text() == "implements" {
            self.bump()?;
            loop {
                let _ = self.parse_type()?;
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        let _ = type_parameters;
        let body = self.parse_class_body()?;
        Ok((super_class, body))
    }

    fn parse_class_body(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::BraceL)?;
        self.state.class_level += 1;
        let mut body = Vec::new();
        while !self.at(TokenKind::BraceR) && !self.is_eof() {
            if self.eat(TokenKind::Semi)? {
                continue;
            }
            body.push(self.parse_class_member()?);
        }
        self.state.class_level -= 1;
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::ClassBody { meta, body })
    }

    fn parse_class_member(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let mut decorators = Vec::new();
        while self.at(TokenKind::At) {
            decorators.push(self.parse_decorator()?);
        }

        if self.current_text() == "static" && self.peek_starts_static_block()? {
            self.bump()?;
            return self.parse_static_block(open);
        }

        let is_static = self.current_text() == "static" && self.peek_is_member_start()?;
        if is_static {
            self.bump()?;
        }

        let declare = self.has_plugin(Plugin::TypeScript) && self.current_text() == "declare" && self.peek_is_member_start()?;
        if declare {
            self.bump()?;
        }
        let readonly = self.has_plugin(Plugin::TypeScript) && self.current_text() == "readonly" && self.peek_is_member_start()?;
        if readonly {
            self.bump()?;
        }

        let mut kind = PropertyKind::Init;
        if self.current_text() == "get" && self.peek_is_member_start()? {
            self.bump()?;
            kind = PropertyKind::Get;
        } else if self.current_text() == "set" && self.peek_is_member_start()? {
            self.bump()?;
            kind = PropertyKind::Set;
        }

        let is_async = self.current_text() == "async" && self.peek_is_member_start_no_newline()?;
        if is_async {
            self.bump()?;
        }
        let generator = self.eat(TokenKind::Star)?;

        let (key, computed) = if self.at(TokenKind::PrivateName) {
            (self.parse_private_name()?, false)
        } else {
            (self.parse_property_key(self.at(TokenKind::BracketL))?, self.cur_kind() == TokenKind::BracketL)
        };

        if self.at(TokenKind::ParenL) || !matches!(kind, PropertyKind::Init) || generator || is_async {
            let function = self.parse_method_rest(generator, is_async)?;
            let meta = self.finish_node(open, false);
            return Ok(Node::ClassMethod {
                member: ClassMember {
                    meta,
                    key: Box::new(key),
                    computed,
                    r#static: is_static,
                    decorators,
                },
                kind,
                function,
            });
        }

        let type_annotation = self.parse_optional_type_annotation()?;
        let value = if self.eat(TokenKind::Eq)? {
            let outer = self.state.scope.in_class_field_init;
            self.state.scope.in_class_field_init = true;
            let v = self.parse_assignment();
            self.state.scope.in_class_field_init = outer;
            Some(Box::new(v?))
        } else {
            None
        };
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        let member = ClassMember {
            meta,
            key: Box::new(key),
            computed,
            r#static: is_static,
            decorators,
        };
        if matches!(&member.key.as_ref(), Node::PrivateName { .. }) {
            Ok(Node::ClassPrivateProperty { member, value })
        } else {
            Ok(Node::ClassProperty {
                member,
                value,
                type_annotation,
                declare,
                readonly,
            })
        }
    }

    fn parse_private_name(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let span = self.cur().span;
        let name = self.source_slice(u32::from(span.start()) + 1, u32::from(span.end())).to_string();
        self.bump()?;
        let meta = self.finish_node(open, false);
        Ok(Node::PrivateName { meta, name })
    }

    fn parse_method_rest(&mut self, generator: bool, is_async: bool) -> ParseResult<FunctionShape> {
        let type_parameters = self.parse_optional_type_parameters()?;
        let outer = self.state.scope;
        self.state.scope = crate::state::ScopeFlags {
            in_function: true,
            in_generator: generator,
            in_async: is_async,
            allow_super: true,
            allow_new_target: true,
            ..crate::state::ScopeFlags::default()
        };
        let shape = self.parse_method_signature_and_body(generator, is_async, type_parameters);
        self.state.scope = outer;
        shape
    }

    fn parse_method_signature_and_body(
        &mut self,
        generator: bool,
        is_async: bool,
        type_parameters: Option<BNode>,
    ) -> ParseResult<FunctionShape> {
        self.expect(TokenKind::ParenL)?;
        let mut params = Vec::new();
        while !self.at(TokenKind::ParenR) {
            params.push(self.parse_binding_element()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::ParenR)?;
        let return_type = if self.at(TokenKind::Colon) && (self.has_plugin(Plugin::Flow) || self.has_plugin(Plugin::TypeScript)) {
            self.bump()?;
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };
        let body = Box::new(self.parse_block_statement()?);
        Ok(FunctionShape {
            id: None,
            params,
            body,
            generator,
            r#async: is_async,
            return_type,
            type_parameters,
        })
    }

    fn parse_static_block(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        self.expect(TokenKind::BraceL)?;
        let mut body = Vec::new();
        while !self.at(TokenKind::BraceR) && !self.is_eof() {
            body.push(self.parse_statement_list_item()?);
        }
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::StaticBlock { meta, body })
    }

    fn peek_starts_static_block(&mut self) -> ParseResult<bool> {
        Ok(matches!(self.lookahead()?.kind, TokenKind::BraceL))
    }

    /// Whether the token after a modifier-like contextual keyword (`get`,
    /// `set`, `static`, `async`, `declare`, `readonly`) still starts a
    /// member name, distinguishing the modifier from a member literally
    /// named e.g. `static` (`static() {}`).
    fn peek_is_member_start(&mut self) -> ParseResult<bool> {
        let next = self.lookahead()?;
        Ok(!matches!(
            next.kind,
            TokenKind::ParenL | TokenKind::Eq | TokenKind::Semi | TokenKind::BraceR
        ))
    }

    fn peek_is_member_start_no_newline(&mut self) -> ParseResult<bool> {
        let next = self.lookahead()?;
        Ok(!next.preceded_by_newline
            && !matches!(
                next.kind,
                TokenKind::ParenL | TokenKind::Eq | TokenKind::Semi | TokenKind::BraceR
            ))
    }
}
