//! Function declarations/expressions: params, body, and the
//! generator/async flag threading that governs `yield`/`await` legality
//! inside them (spec §4.3's function productions).

use crate::ast::*;
use crate::error::ParseResult;
use crate::options::Plugin;
use crate::state::ScopeFlags;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_function_declaration(&mut self, is_async: bool) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::KwFunction)?;
        let generator = self.eat(TokenKind::Star)?;
        let id = if self.at(TokenKind::Name) {
            Some(Box::new(self.parse_binding_identifier()?))
        } else {
            None
        };
        let function = self.parse_function_rest(generator, is_async)?;
        let meta = self.finish_node(open, false);
        Ok(Node::FunctionDeclaration {
            meta,
            function: FunctionShape { id, ..function },
            declare: false,
        })
    }

    pub(super) fn parse_function_expression(&mut self, is_async: bool) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::KwFunction)?;
        let generator = self.eat(TokenKind::Star)?;
        let id = if self.at(TokenKind::Name) {
            Some(Box::new(self.parse_binding_identifier()?))
        } else {
            None
        };
        let function = self.parse_function_rest(generator, is_async)?;
        let meta = self.finish_node(open, false);
        Ok(Node::FunctionExpression {
            meta,
            function: FunctionShape { id, ..function },
        })
    }

    /// Params, optional return-type annotation, and body, with the new
    /// function's scope flags active for all three (spec §4.3: a plain
    /// function boundary resets `super`/`new.target`/`arguments` binding,
    /// unlike an arrow function, which captures the enclosing scope's).
    fn parse_function_rest(&mut self, generator: bool, is_async: bool) -> ParseResult<FunctionShape> {
        let type_parameters = self.parse_optional_type_parameters()?;
        let outer = self.state.scope;
        let outer_strict = self.state.in_strict_mode;
        self.state.scope = ScopeFlags {
            in_function: true,
            in_generator: generator,
            in_async: is_async,
            allow_new_target: true,
            ..ScopeFlags::default()
        };
        let params = self.parse_param_list()?;
        self.check_duplicate_params(&params)?;
        let return_type = self.parse_optional_return_type()?;
        let body = Box::new(self.parse_block_statement()?);
        self.state.scope = outer;
        self.state.in_strict_mode = outer_strict;
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

    fn parse_param_list(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::ParenL)?;
        let mut params = Vec::new();
        while !self.at(TokenKind::ParenR) {
            if self.at(TokenKind::At) && (self.has_plugin(Plugin::Decorators) || self.has_plugin(Plugin::Decorators2)) {
                // Parameter decorators are consumed but not modeled as a
                // distinct node tag; ordinary decorator parsing handles
                // class members, this just skips past them on params.
                while self.eat(TokenKind::At)? {
                    let _ = self.parse_decorator_expression()?;
                }
            }
            params.push(self.parse_binding_element()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::ParenR)?;
        Ok(params)
    }

    /// Spec §8 invariant 6: in strict mode, no two parameters of the same
    /// function share a name. Only checked when strict mode is already
    /// active at the parameter list (an inner `"use strict"` directive
    /// discovered later in the body is not retroactively checked).
    fn check_duplicate_params(&self, params: &[Node]) -> ParseResult<()> {
        if !self.state.in_strict_mode {
            return Ok(());
        }
        let mut seen: Vec<&str> = Vec::new();
        for param in params {
            if let Node::Identifier(id) = param {
                if seen.contains(&id.name.as_str()) {
                    return Err(self.error_at(
                        id.meta.span.start,
                        format!("duplicate parameter name '{}' not allowed in strict mode", id.name),
                    ));
                }
                seen.push(&id.name);
            }
        }
        Ok(())
    }

    fn parse_optional_return_type(&mut self) -> ParseResult<Option<BNode>> {
        if !self.at(TokenKind::Colon) {
            return Ok(None);
        }
        if !self.has_plugin(Plugin::Flow) && !self.has_plugin(Plugin::TypeScript) {
            return Ok(None);
        }
        self.bump()?;
        Ok(Some(Box::new(self.parse_type()?)))
    }

    pub(super) fn parse_optional_type_parameters(&mut self) -> ParseResult<Option<BNode>> {
        if !self.at(TokenKind::Relational) || self.current_text() != "<" {
            return Ok(None);
        }
        if !self.has_plugin(Plugin::Flow) && !self.has_plugin(Plugin::TypeScript) {
            return Ok(None);
        }
        Ok(Some(Box::new(self.parse_type_parameter_declaration()?)))
    }
}
