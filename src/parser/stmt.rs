//! Statements and declarations (spec §4.3), directive prologue detection,
//! and the top-level driver `parse_top_level` spec §6's `parse()` calls
//! into.

use crate::ast::*;
use crate::error::ParseResult;
use crate::options::Plugin;
use crate::state::LabelEntry;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    /// Parses the program body, splitting off the leading directive
    /// prologue (spec §4.3: `"use strict"` and other string-literal
    /// expression statements before the first non-directive statement)
    /// and activating strict mode when one is `"use strict"`.
    pub(super) fn parse_top_level(&mut self) -> ParseResult<(Vec<Node>, Vec<Node>)> {
        let directives = self.parse_directive_prologue()?;
        let mut body = Vec::new();
        while !self.is_eof() {
            body.push(self.parse_statement_list_item()?);
        }
        Ok((body, directives))
    }

    fn parse_directive_prologue(&mut self) -> ParseResult<Vec<Node>> {
        let mut directives = Vec::new();
        loop {
            if self.is_eof() || self.cur_kind() != TokenKind::Str {
                break;
            }
            let checkpoint = self.state.checkpoint();
            let open = self.start_node();
            let lit_open = self.start_node();
            let raw_span = self.cur().span;
            let raw = self.source_slice(raw_span.start().into(), raw_span.end().into()).to_string();
            let value = match &self.cur().value {
                crate::token::TokenValue::Str(s) => s.clone(),
                _ => String::new(),
            };
            self.bump()?;
            if !self.at(TokenKind::Semi) && !self.at(TokenKind::BraceR) && !self.is_eof() && !self.cur().preceded_by_newline {
                // Not actually a standalone directive (e.g. `"use strict".length`).
                self.state.restore(checkpoint);
                break;
            }
            self.semicolon()?;
            let lit_meta = self.finish_node(lit_open, false);
            let meta = self.finish_node(open, false);
            if value == "use strict" {
                self.state.in_strict_mode = true;
            }
            directives.push(Node::Directive {
                meta,
                value: Box::new(Node::DirectiveLiteral {
                    meta: lit_meta,
                    value: raw.trim_matches(|c| c == '"' || c == '\'').to_string(),
                }),
            });
            let _ = value;
        }
        Ok(directives)
    }

    pub(super) fn parse_statement_list_item(&mut self) -> ParseResult<Node> {
        match self.cur_kind() {
            TokenKind::KwImport => self.parse_import_declaration(),
            TokenKind::KwExport => self.parse_export_declaration(),
            _ => self.parse_statement(),
        }
    }

    pub(super) fn parse_statement(&mut self) -> ParseResult<Node> {
        match self.cur_kind() {
            TokenKind::BraceL => self.parse_block_statement(),
            TokenKind::Semi => {
                let open = self.start_node();
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::EmptyStatement { meta })
            }
            TokenKind::KwDebugger => {
                let open = self.start_node();
                self.bump()?;
                self.semicolon()?;
                let meta = self.finish_node(open, false);
                Ok(Node::DebuggerStatement { meta })
            }
            TokenKind::KwVar => self.parse_variable_statement(),
            TokenKind::KwConst if self.is_const_enum_start() => self.parse_enum_declaration(true),
            TokenKind::KwConst => self.parse_variable_statement(),
            TokenKind::Name if self.let_starts_declaration() => self.parse_variable_statement(),
            TokenKind::KwFunction => self.parse_function_declaration(false),
            TokenKind::Name if self.async_starts_function_declaration() => {
                self.bump()?;
                self.parse_function_declaration(true)
            }
            TokenKind::KwClass => self.parse_class_declaration(),
            TokenKind::KwIf => self.parse_if_statement(),
            TokenKind::KwReturn => self.parse_return_statement(),
            TokenKind::KwThrow => self.parse_throw_statement(),
            TokenKind::KwTry => self.parse_try_statement(),
            TokenKind::KwWhile => self.parse_while_statement(),
            TokenKind::KwDo => self.parse_do_while_statement(),
            TokenKind::KwFor => self.parse_for_statement(),
            TokenKind::KwSwitch => self.parse_switch_statement(),
            TokenKind::KwBreak => self.parse_break_statement(),
            TokenKind::KwContinue => self.parse_continue_statement(),
            TokenKind::KwWith => self.parse_with_statement(),
            TokenKind::At if self.has_plugin(Plugin::Decorators) || self.has_plugin(Plugin::Decorators2) => {
                self.parse_decorated_declaration()
            }
            TokenKind::Name if self.is_interface_start() => self.parse_interface_declaration(),
            TokenKind::Name if self.is_type_alias_start() => self.parse_type_alias(),
            TokenKind::Name if self.is_declare_start() => self.parse_declare_declaration(),
            TokenKind::Name if self.is_enum_start() => self.parse_enum_declaration(false),
            _ => self.parse_labeled_or_expression_statement(),
        }
    }

    fn let_starts_declaration(&mut self) -> bool {
        self.current_text() == "let"
            && matches!(
                self.lookahead().map(|t| t.kind),
                Ok(TokenKind::Name | TokenKind::BraceL | TokenKind::BracketL)
            )
    }

    fn async_starts_function_declaration(&mut self) -> bool {
        self.current_text() == "async"
            && matches!(self.lookahead(), Ok(t) if t.kind == TokenKind::KwFunction && !t.preceded_by_newline)
    }

    fn is_interface_start(&self) -> bool {
        (self.has_plugin(Plugin::Flow) || self.has_plugin(Plugin::TypeScript))
            && self.current_text() == "interface"
    }

    fn is_type_alias_start(&self) -> bool {
        (self.has_plugin(Plugin::Flow) || self.has_plugin(Plugin::TypeScript))
            && self.current_text() == "type"
    }

    fn is_declare_start(&self) -> bool {
        (self.has_plugin(Plugin::Flow) || self.has_plugin(Plugin::TypeScript))
            && self.current_text() == "declare"
    }

    fn is_enum_start(&self) -> bool {
        self.has_plugin(Plugin::TypeScript) && self.current_text() == "enum"
    }

    /// `const enum Foo {}` — the `const` branch of the statement dispatch
    /// would otherwise swallow this as a variable declaration before the
    /// plain `enum` check below ever runs.
    fn is_const_enum_start(&mut self) -> bool {
        self.has_plugin(Plugin::TypeScript)
            && matches!(self.lookahead(), Ok(t) if self.token_text(&t) == "enum")
    }

    pub(super) fn parse_block_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::BraceL)?;
        let directives = self.parse_directive_prologue()?;
        let mut body = Vec::new();
        while !self.at(TokenKind::BraceR) && !self.is_eof() {
            body.push(self.parse_statement_list_item()?);
        }
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::BlockStatement { meta, body, directives })
    }

    fn parse_variable_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let decl = self.parse_variable_declaration()?;
        self.semicolon()?;
        let _ = open;
        Ok(decl)
    }

    pub(super) fn parse_variable_declaration(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let kind = match self.cur_kind() {
            TokenKind::KwVar => VariableKind::Var,
            TokenKind::KwConst => VariableKind::Const,
            _ => VariableKind::Let,
        };
        self.bump()?;
        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_declarator()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        let meta = self.finish_node(open, false);
        Ok(Node::VariableDeclaration {
            meta,
            kind,
            declarations,
        })
    }

    fn parse_variable_declarator(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let id = self.parse_binding_target()?;
        let init = if self.eat(TokenKind::Eq)? {
            Some(Box::new(self.parse_assignment()?))
        } else {
            None
        };
        let meta = self.finish_node(open, false);
        Ok(Node::VariableDeclarator {
            meta,
            id: Box::new(id),
            init,
        })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        self.expect(TokenKind::ParenL)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat(TokenKind::KwElse)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        let meta = self.finish_node(open, false);
        Ok(Node::IfStatement {
            meta,
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
        })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Node> {
        if !self.state.scope.in_function && !self.options.allow_return_outside_function {
            return Err(self.error_here("'return' outside of function"));
        }
        let open = self.start_node();
        self.bump()?;
        let argument = if self.at(TokenKind::Semi)
            || self.at(TokenKind::BraceR)
            || self.is_eof()
            || self.cur().preceded_by_newline
        {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ReturnStatement { meta, argument })
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        if self.cur().preceded_by_newline {
            return Err(self.error_here("no line break allowed after 'throw'"));
        }
        let argument = self.parse_expression()?;
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ThrowStatement {
            meta,
            argument: Box::new(argument),
        })
    }

    fn parse_try_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        let block = self.parse_block_statement()?;
        let handler = if self.eat(TokenKind::KwCatch)? {
            let catch_open = self.start_node();
            let param = if self.eat(TokenKind::ParenL)? {
                let p = self.parse_binding_target()?;
                self.expect(TokenKind::ParenR)?;
                Some(Box::new(p))
            } else {
                None
            };
            let body = self.parse_block_statement()?;
            let catch_meta = self.finish_node(catch_open, false);
            Some(Box::new(Node::CatchClause {
                meta: catch_meta,
                param,
                body: Box::new(body),
            }))
        } else {
            None
        };
        let finalizer = if self.eat(TokenKind::KwFinally)? {
            Some(Box::new(self.parse_block_statement()?))
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_here("missing catch or finally clause"));
        }
        let meta = self.finish_node(open, false);
        Ok(Node::TryStatement {
            meta,
            block: Box::new(block),
            handler,
            finalizer,
        })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        self.expect(TokenKind::ParenL)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        let body = self.parse_loop_body()?;
        let meta = self.finish_node(open, false);
        Ok(Node::WhileStatement {
            meta,
            test: Box::new(test),
            body: Box::new(body),
        })
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        let body = self.parse_loop_body()?;
        self.expect(TokenKind::KwWhile)?;
        self.expect(TokenKind::ParenL)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        let _ = self.eat(TokenKind::Semi)?;
        let meta = self.finish_node(open, false);
        Ok(Node::DoWhileStatement {
            meta,
            body: Box::new(body),
            test: Box::new(test),
        })
    }

    fn parse_loop_body(&mut self) -> ParseResult<Node> {
        self.state.labels.push(LabelEntry {
            name: String::new(),
            is_loop: true,
        });
        let body = self.parse_statement();
        self.state.labels.pop();
        body
    }

    /// Disambiguates `for (`, `for-in`, `for-of`, and `for await (` (spec
    /// §4.3's enumerated edge case) by speculatively parsing the init
    /// clause with the `noIn` flag set, then checking what follows.
    fn parse_for_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        let is_await = self.has_plugin(Plugin::AsyncGenerators) && self.eat(TokenKind::KwAwait)?;
        self.expect(TokenKind::ParenL)?;

        let init = if self.at(TokenKind::Semi) {
            None
        } else if matches!(self.cur_kind(), TokenKind::KwVar | TokenKind::KwConst) || self.let_starts_declaration() {
            self.state.no_in = true;
            let decl = self.parse_variable_declaration()?;
            self.state.no_in = false;
            Some(decl)
        } else {
            self.state.no_in = true;
            let expr = self.parse_expression()?;
            self.state.no_in = false;
            Some(Node::ExpressionStatement {
                meta: crate::node_factory::NodeFactory::shallow_clone_meta(expr.meta()),
                expression: Box::new(expr),
            })
        };

        if self.at(TokenKind::KwIn) || self.current_text() == "of" {
            let is_of = self.current_text() == "of";
            self.bump()?;
            let left = init.ok_or_else(|| self.error_here("missing left-hand side of for-in/for-of"))?;
            let left = self.for_head_to_pattern(left)?;
            let right = if is_of {
                self.parse_assignment()?
            } else {
                self.parse_expression()?
            };
            self.expect(TokenKind::ParenR)?;
            let body = self.parse_loop_body()?;
            let meta = self.finish_node(open, false);
            return Ok(if is_of {
                Node::ForOfStatement {
                    meta,
                    left: Box::new(left),
                    right: Box::new(right),
                    body: Box::new(body),
                    r#await: is_await,
                }
            } else {
                Node::ForInStatement {
                    meta,
                    left: Box::new(left),
                    right: Box::new(right),
                    body: Box::new(body),
                }
            });
        }

        self.expect(TokenKind::Semi)?;
        let test = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::Semi)?;
        let update = if self.at(TokenKind::ParenR) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::ParenR)?;
        let body = self.parse_loop_body()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ForStatement {
            meta,
            init: init.map(Box::new),
            test,
            update,
            body: Box::new(body),
        })
    }

    fn for_head_to_pattern(&self, node: Node) -> ParseResult<Node> {
        match node {
            Node::VariableDeclaration { .. } => Ok(node),
            Node::ExpressionStatement { expression, .. } => self.to_assignable(*expression),
            other => Ok(other),
        }
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        self.expect(TokenKind::ParenL)?;
        let discriminant = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        self.expect(TokenKind::BraceL)?;
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.at(TokenKind::BraceR) {
            let case_open = self.start_node();
            let test = if self.eat(TokenKind::KwCase)? {
                let t = self.parse_expression()?;
                self.expect(TokenKind::Colon)?;
                Some(Box::new(t))
            } else {
                self.expect(TokenKind::KwDefault)?;
                self.expect(TokenKind::Colon)?;
                if seen_default {
                    return Err(self.error_here("multiple default clauses in switch"));
                }
                seen_default = true;
                None
            };
            let mut consequent = Vec::new();
            while !matches!(self.cur_kind(), TokenKind::KwCase | TokenKind::KwDefault | TokenKind::BraceR) {
                consequent.push(self.parse_statement_list_item()?);
            }
            let case_meta = self.finish_node(case_open, false);
            cases.push(Node::SwitchCase {
                meta: case_meta,
                test,
                consequent,
            });
        }
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::SwitchStatement {
            meta,
            discriminant: Box::new(discriminant),
            cases,
        })
    }

    fn parse_break_statement(&mut self) -> ParseResult<Node> {
        self.parse_break_or_continue(true)
    }

    fn parse_continue_statement(&mut self) -> ParseResult<Node> {
        self.parse_break_or_continue(false)
    }

    fn parse_break_or_continue(&mut self, is_break: bool) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        let label = if !self.cur().preceded_by_newline && self.cur_kind() == TokenKind::Name {
            let ident = self.parse_binding_identifier_no_type()?;
            Some(Box::new(ident))
        } else {
            None
        };
        if let Some(label) = &label {
            let name = match label.as_ref() {
                Node::Identifier(id) => id.name.clone(),
                _ => String::new(),
            };
            match self.state.current_label_is_loop(&name) {
                None => return Err(self.error_here(format!("undefined label '{name}'"))),
                Some(false) if is_break => {}
                Some(is_loop) if !is_break && !is_loop => {
                    return Err(self.error_here(format!("'continue' target '{name}' is not a loop")));
                }
                _ => {}
            }
        } else if !is_break && self.state.labels.is_empty() {
            return Err(self.error_here("'continue' outside of a loop"));
        } else if is_break && self.state.labels.is_empty() {
            return Err(self.error_here("'break' outside of a loop or switch"));
        }
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        Ok(if is_break {
            Node::BreakStatement { meta, label }
        } else {
            Node::ContinueStatement { meta, label }
        })
    }

    fn parse_binding_identifier_no_type(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let name = self.current_text().to_string();
        self.bump()?;
        let meta = self.finish_node(open, false);
        Ok(plain_identifier(name, meta.span))
    }

    fn parse_with_statement(&mut self) -> ParseResult<Node> {
        if self.state.in_strict_mode {
            return Err(self.error_here("'with' statement not allowed in strict mode"));
        }
        let open = self.start_node();
        self.bump()?;
        self.expect(TokenKind::ParenL)?;
        let object = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        let body = self.parse_statement()?;
        let meta = self.finish_node(open, false);
        Ok(Node::WithStatement {
            meta,
            object: Box::new(object),
            body: Box::new(body),
        })
    }

    fn parse_labeled_or_expression_statement(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        if self.cur_kind() == TokenKind::Name {
            if let Ok(next) = self.lookahead() {
                if next.kind == TokenKind::Colon {
                    let name = self.current_text().to_string();
                    self.bump()?; // name
                    self.bump()?; // `:`
                    let is_loop = matches!(self.cur_kind(), TokenKind::KwFor | TokenKind::KwWhile | TokenKind::KwDo);
                    self.state.labels.push(LabelEntry {
                        name: name.clone(),
                        is_loop,
                    });
                    let body = self.parse_statement()?;
                    self.state.labels.pop();
                    let label_meta = crate::node_factory::NodeFactory::shallow_clone_meta(body.meta());
                    let meta = self.finish_node(open, false);
                    return Ok(Node::LabeledStatement {
                        meta,
                        label: Box::new(plain_identifier(name, label_meta.span)),
                        body: Box::new(body),
                    });
                }
            }
        }
        let expression = self.parse_expression()?;
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ExpressionStatement {
            meta,
            expression: Box::new(expression),
        })
    }
}
