//! Expression grammar (spec §4.2): atom → subscript → unary → binary
//! (operator-precedence climbing) → conditional → assignment → sequence.

use crate::ast::*;
use crate::error::ParseResult;
use crate::options::Plugin;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    pub fn parse_expression(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let first = self.parse_assignment()?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(TokenKind::Comma)? {
            expressions.push(self.parse_assignment()?);
        }
        let meta = self.finish_node(open, false);
        Ok(Node::SequenceExpression { meta, expressions })
    }

    /// Assignment level, including lazy arrow-function recognition (spec
    /// §4.2: "when a parenthesized expression is followed by `=>`").
    pub fn parse_assignment(&mut self) -> ParseResult<Node> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        if self.at(TokenKind::KwYield) {
            return self.parse_yield();
        }
        let open = self.start_node();
        let left = self.parse_conditional()?;
        let operator = match self.cur_kind() {
            TokenKind::Eq => "=",
            TokenKind::Assign => self.assign_operator_text(),
            _ => return Ok(left),
        };
        self.bump()?;
        let left = self.to_assignable(left)?;
        let right = self.parse_assignment()?;
        let meta = self.finish_node(open, false);
        Ok(Node::AssignmentExpression {
            meta,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn assign_operator_text(&self) -> &'static str {
        // The lexer folds all `<op>=` compound assignments into `Assign`;
        // recovering the exact operator text from the source keeps the
        // AST's `operator` field accurate without a TokenKind per op.
        let span = self.cur().span;
        let text = &self.source_slice(span.start().into(), span.end().into());
        match *text {
            "+=" => "+=",
            "-=" => "-=",
            "*=" => "*=",
            "/=" => "/=",
            "%=" => "%=",
            "**=" => "**=",
            "<<=" => "<<=",
            ">>=" => ">>=",
            ">>>=" => ">>>=",
            "&=" => "&=",
            "|=" => "|=",
            "^=" => "^=",
            "&&=" => "&&=",
            "||=" => "||=",
            "??=" => "??=",
            _ => "=",
        }
    }

    fn parse_yield(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        if !self.state.scope.in_generator {
            let meta = self.finish_node(open, false);
            return Ok(plain_identifier("yield", meta.span));
        }
        let delegate = self.eat(TokenKind::Star)?;
        let argument = if self.cur_kind().info().starts_expr && !self.cur().preceded_by_newline {
            Some(Box::new(self.parse_assignment()?))
        } else {
            None
        };
        let meta = self.finish_node(open, false);
        Ok(Node::YieldExpression {
            meta,
            argument,
            delegate,
        })
    }

    fn parse_conditional(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let test = self.parse_binary(1)?;
        if !self.eat(TokenKind::Question)? {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ConditionalExpression {
            meta,
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    /// Operator-precedence climbing across levels 1..11, `**`
    /// right-associative (spec §4.2).
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Node> {
        let open = self.start_node();
        let mut left = self.parse_unary()?;
        loop {
            let info = self.cur_kind().info();
            let Some(prec) = info.binop else { break };
            if prec < min_prec {
                break;
            }
            if self.at(TokenKind::KwIn) && self.state.in_for_init_no_in() {
                break;
            }
            let operator = self.binop_text();
            let logical = matches!(self.cur_kind(), TokenKind::LogicalOr | TokenKind::LogicalAnd | TokenKind::Nullish);
            self.bump()?;
            let next_min = if info.right_associative { prec } else { prec + 1 };
            let right = self.parse_binary(next_min)?;
            let meta = self.finish_node(open, false);
            left = if logical {
                Node::LogicalExpression {
                    meta,
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            } else {
                Node::BinaryExpression {
                    meta,
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            };
        }
        Ok(left)
    }

    fn binop_text(&self) -> &'static str {
        use TokenKind::*;
        match self.cur_kind() {
            LogicalOr => "||",
            LogicalAnd => "&&",
            Nullish => "??",
            BitwiseOr => "|",
            BitwiseXor => "^",
            BitwiseAnd => "&",
            Equality => self.equality_text(),
            Relational => self.relational_text(),
            BitShift => self.bitshift_text(),
            Arith => self.arith_text(),
            Modulo => "%",
            Star => "*",
            Slash => "/",
            StarStar => "**",
            KwIn => "in",
            KwInstanceof => "instanceof",
            _ => "?",
        }
    }

    fn equality_text(&self) -> &'static str {
        match self.source_slice(self.cur().start(), self.cur().end()) {
            "==" => "==",
            "!=" => "!=",
            "===" => "===",
            _ => "!==",
        }
    }
    fn relational_text(&self) -> &'static str {
        match self.source_slice(self.cur().start(), self.cur().end()) {
            "<" => "<",
            ">" => ">",
            "<=" => "<=",
            _ => ">=",
        }
    }
    fn bitshift_text(&self) -> &'static str {
        match self.source_slice(self.cur().start(), self.cur().end()) {
            "<<" => "<<",
            ">>" => ">>",
            _ => ">>>",
        }
    }
    fn arith_text(&self) -> &'static str {
        if self.source_slice(self.cur().start(), self.cur().end()) == "+" {
            "+"
        } else {
            "-"
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        if self.at(TokenKind::KwAwait) {
            self.bump()?;
            let argument = self.parse_unary()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::AwaitExpression {
                meta,
                argument: Box::new(argument),
            });
        }
        let prefix_kind = self.cur_kind();
        if prefix_kind.info().prefix && prefix_kind != TokenKind::IncDec {
            let operator = self.unary_operator_text();
            self.bump()?;
            let argument = self.parse_unary()?;
            self.reject_unparenthesized_exponent_base(&argument)?;
            let meta = self.finish_node(open, false);
            return Ok(Node::UnaryExpression {
                meta,
                operator,
                prefix: true,
                argument: Box::new(argument),
            });
        }
        if prefix_kind == TokenKind::IncDec {
            let operator = if self.source_slice(self.cur().start(), self.cur().end()) == "++" {
                "++"
            } else {
                "--"
            };
            self.bump()?;
            let argument = self.parse_unary()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::UpdateExpression {
                meta,
                operator,
                prefix: true,
                argument: Box::new(argument),
            });
        }
        let mut expr = self.parse_subscripts()?;
        if self.at(TokenKind::IncDec) && !self.cur().preceded_by_newline {
            let operator = if self.source_slice(self.cur().start(), self.cur().end()) == "++" {
                "++"
            } else {
                "--"
            };
            self.bump()?;
            let meta = self.finish_node(open, false);
            expr = Node::UpdateExpression {
                meta,
                operator,
                prefix: false,
                argument: Box::new(expr),
            };
        }
        Ok(expr)
    }

    fn unary_operator_text(&self) -> &'static str {
        use TokenKind::*;
        match self.cur_kind() {
            Bang => "!",
            Tilde => "~",
            Arith => self.arith_text(),
            KwTypeof => "typeof",
            KwVoid => "void",
            KwDelete => "delete",
            _ => "?",
        }
    }

    /// `-2**2` is a fatal ambiguity unless the base is parenthesized
    /// (spec §4.2 tie-break).
    fn reject_unparenthesized_exponent_base(&self, argument: &Node) -> ParseResult<()> {
        if self.at(TokenKind::StarStar) && !argument.meta().extra.parenthesized {
            return Err(self.error_here("unary expression cannot appear on the left side of '**' without parentheses"));
        }
        Ok(())
    }

    fn parse_subscripts(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let mut expr = self.parse_atom()?;
        loop {
            let continues = match self.cur_kind() {
                TokenKind::Dot => {
                    self.bump()?;
                    let property = self.parse_identifier_name()?;
                    let meta = self.finish_node(open, false);
                    expr = Node::MemberExpression {
                        meta,
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: false,
                        optional: false,
                    };
                    true
                }
                TokenKind::QuestionDot => {
                    self.bump()?;
                    if self.at(TokenKind::ParenL) {
                        let arguments = self.parse_call_arguments()?;
                        let meta = self.finish_node(open, false);
                        expr = Node::CallExpression {
                            meta,
                            callee: Box::new(expr),
                            arguments,
                            optional: true,
                        };
                    } else if self.eat(TokenKind::BracketL)? {
                        let property = self.parse_expression()?;
                        self.expect(TokenKind::BracketR)?;
                        let meta = self.finish_node(open, false);
                        expr = Node::MemberExpression {
                            meta,
                            object: Box::new(expr),
                            property: Box::new(property),
                            computed: true,
                            optional: true,
                        };
                    } else {
                        let property = self.parse_identifier_name()?;
                        let meta = self.finish_node(open, false);
                        expr = Node::MemberExpression {
                            meta,
                            object: Box::new(expr),
                            property: Box::new(property),
                            computed: false,
                            optional: true,
                        };
                    }
                    true
                }
                TokenKind::BracketL => {
                    self.bump()?;
                    let property = self.parse_expression()?;
                    self.expect(TokenKind::BracketR)?;
                    let meta = self.finish_node(open, false);
                    expr = Node::MemberExpression {
                        meta,
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: true,
                        optional: false,
                    };
                    true
                }
                TokenKind::ParenL => {
                    let arguments = self.parse_call_arguments()?;
                    let meta = self.finish_node(open, false);
                    expr = Node::CallExpression {
                        meta,
                        callee: Box::new(expr),
                        arguments,
                        optional: false,
                    };
                    true
                }
                TokenKind::Backtick => {
                    let quasi = self.parse_template_literal(true)?;
                    let meta = self.finish_node(open, false);
                    expr = Node::TaggedTemplateExpression {
                        meta,
                        tag: Box::new(expr),
                        quasi: Box::new(quasi),
                    };
                    true
                }
                TokenKind::DoubleColon if self.has_plugin(Plugin::FunctionBind) => {
                    self.bump()?;
                    let callee = self.parse_subscripts()?;
                    let meta = self.finish_node(open, false);
                    expr = Node::BindExpression {
                        meta,
                        object: Some(Box::new(expr)),
                        callee: Box::new(callee),
                    };
                    false
                }
                TokenKind::Bang if self.has_plugin(Plugin::TypeScript) && !self.cur().preceded_by_newline => {
                    self.bump()?;
                    let meta = self.finish_node(open, false);
                    expr = Node::TSNonNullExpression {
                        meta,
                        expression: Box::new(expr),
                    };
                    true
                }
                TokenKind::Name if self.current_text() == "as" && self.has_plugin(Plugin::TypeScript) && !self.cur().preceded_by_newline => {
                    self.bump()?;
                    let type_annotation = self.parse_type()?;
                    let meta = self.finish_node(open, false);
                    expr = Node::TSAsExpression {
                        meta,
                        expression: Box::new(expr),
                        type_annotation: Box::new(type_annotation),
                    };
                    true
                }
                _ => false,
            };
            if !continues {
                break;
            }
        }
        Ok(expr)
    }

    pub(super) fn parse_call_arguments(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::ParenL)?;
        let mut args = Vec::new();
        while !self.at(TokenKind::ParenR) {
            if self.at(TokenKind::Ellipsis) {
                let open = self.start_node();
                self.bump()?;
                let argument = self.parse_assignment()?;
                let meta = self.finish_node(open, false);
                args.push(Node::SpreadElement {
                    meta,
                    argument: Box::new(argument),
                });
            } else {
                args.push(self.parse_assignment()?);
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::ParenR)?;
        Ok(args)
    }

    pub(super) fn parse_identifier_name(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        if self.at(TokenKind::Hash) {
            // unreachable in practice (private names are lexed whole) but
            // kept defensive for a bare `#` recovery path.
        }
        let name = self.current_identifier_text()?;
        self.bump()?;
        let meta = self.finish_node(open, false);
        Ok(plain_identifier(name, meta.span))
    }

    fn current_identifier_text(&self) -> ParseResult<String> {
        if self.cur_kind() == TokenKind::PrivateName {
            return Ok(self.source_slice(self.cur().start() + 1, self.cur().end()).to_string());
        }
        if self.cur_kind() == TokenKind::Name || self.cur_kind().is_keyword() {
            return Ok(self.source_slice(self.cur().start(), self.cur().end()).to_string());
        }
        Err(self.error_here("expected an identifier"))
    }

    /// Atoms: literals, identifiers, `this`/`super`, parenthesized
    /// expressions, arrays, objects, functions, classes, templates,
    /// `new`, `import(...)`, `import.meta`, markup elements.
    fn parse_atom(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        match self.cur_kind() {
            TokenKind::Num => {
                let text = self.source_slice(self.cur().start(), self.cur().end());
                let value = match &self.cur().value {
                    crate::token::TokenValue::Num(v) => *v,
                    _ => 0.0,
                };
                let raw = text.to_string();
                self.bump()?;
                let mut meta = self.finish_node(open, false);
                meta.extra.raw = Some(raw);
                Ok(Node::NumericLiteral { meta, value })
            }
            TokenKind::BigInt => {
                let value = match &self.cur().value {
                    crate::token::TokenValue::BigInt(s) => s.clone(),
                    _ => String::new(),
                };
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::BigIntLiteral { meta, value })
            }
            TokenKind::Str => {
                let value = match &self.cur().value {
                    crate::token::TokenValue::Str(s) => s.clone(),
                    _ => String::new(),
                };
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::StringLiteral { meta, value })
            }
            TokenKind::Regex => {
                let (pattern, flags) = match &self.cur().value {
                    crate::token::TokenValue::Regex { pattern, flags } => (pattern.clone(), flags.clone()),
                    _ => (String::new(), String::new()),
                };
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::RegExpLiteral { meta, pattern, flags })
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                let value = self.cur_kind() == TokenKind::KwTrue;
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::BooleanLiteral { meta, value })
            }
            TokenKind::KwNull => {
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::NullLiteral { meta })
            }
            TokenKind::KwThis => {
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::ThisExpression { meta })
            }
            TokenKind::KwSuper => {
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::Super { meta })
            }
            TokenKind::Backtick => self.parse_template_literal(false),
            TokenKind::BracketL => self.parse_array_expression(),
            TokenKind::BraceL => self.parse_object_expression(),
            TokenKind::ParenL => self.parse_parenthesized(),
            TokenKind::KwFunction => self.parse_function_expression(false),
            TokenKind::KwClass => self.parse_class_expression(),
            TokenKind::KwNew => self.parse_new_expression(),
            TokenKind::KwImport => self.parse_import_atom(),
            TokenKind::KwYield => self.parse_yield(),
            TokenKind::Relational if self.has_plugin(Plugin::Jsx) => self.parse_jsx_root(),
            TokenKind::Name if self.current_text() == "async" => self.parse_async_atom(),
            TokenKind::Name => {
                let name = self.current_identifier_text()?;
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(plain_identifier(name, meta.span))
            }
            _ if self.cur_kind().is_keyword() => {
                let name = self.current_identifier_text()?;
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(plain_identifier(name, meta.span))
            }
            _ => Err(self.error_here(format!("unexpected token '{}'", self.cur_kind().info().label))),
        }
    }

    fn parse_async_atom(&mut self) -> ParseResult<Node> {
        let checkpoint_lookahead = self.lookahead()?;
        if checkpoint_lookahead.kind == TokenKind::KwFunction && !checkpoint_lookahead.preceded_by_newline {
            self.bump()?; // `async`
            return self.parse_function_expression(true);
        }
        if let Some(arrow) = self.try_parse_async_arrow()? {
            return Ok(arrow);
        }
        let open = self.start_node();
        let name = self.current_identifier_text()?;
        self.bump()?;
        let meta = self.finish_node(open, false);
        Ok(plain_identifier(name, meta.span))
    }

    fn parse_new_expression(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        if self.at(TokenKind::Dot) {
            self.bump()?;
            let meta_ident_open = self.start_node();
            self.bump()?; // `target`
            let property_meta = self.finish_node(meta_ident_open, false);
            let meta = self.finish_node(open, false);
            return Ok(Node::MetaProperty {
                meta,
                meta_object: Box::new(plain_identifier("new", property_meta.span.clone())),
                property: Box::new(plain_identifier("target", property_meta.span)),
            });
        }
        let callee = self.parse_subscripts_no_call()?;
        let arguments = if self.at(TokenKind::ParenL) {
            self.parse_call_arguments()?
        } else {
            Vec::new()
        };
        let meta = self.finish_node(open, false);
        Ok(Node::NewExpression {
            meta,
            callee: Box::new(callee),
            arguments,
        })
    }

    /// `new Foo.Bar()`'s callee parses member access but not a call (the
    /// parens belong to `new`, not a nested call on the callee).
    pub(super) fn parse_subscripts_no_call(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let mut expr = self.parse_atom()?;
        loop {
            match self.cur_kind() {
                TokenKind::Dot => {
                    self.bump()?;
                    let property = self.parse_identifier_name()?;
                    let meta = self.finish_node(open, false);
                    expr = Node::MemberExpression {
                        meta,
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: false,
                        optional: false,
                    };
                }
                TokenKind::BracketL => {
                    self.bump()?;
                    let property = self.parse_expression()?;
                    self.expect(TokenKind::BracketR)?;
                    let meta = self.finish_node(open, false);
                    expr = Node::MemberExpression {
                        meta,
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: true,
                        optional: false,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_import_atom(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        if self.eat(TokenKind::Dot)? {
            let prop_open = self.start_node();
            self.bump()?; // `meta`
            let property_meta = self.finish_node(prop_open, false);
            let meta = self.finish_node(open, false);
            return Ok(Node::MetaProperty {
                meta,
                meta_object: Box::new(plain_identifier("import", property_meta.span.clone())),
                property: Box::new(plain_identifier("meta", property_meta.span)),
            });
        }
        if !self.has_plugin(Plugin::DynamicImport) {
            return Err(self.error_here("dynamic import requires the dynamicImport plugin"));
        }
        self.expect(TokenKind::ParenL)?;
        let source = self.parse_assignment()?;
        self.expect(TokenKind::ParenR)?;
        let meta = self.finish_node(open, false);
        Ok(Node::ImportExpression {
            meta,
            source: Box::new(source),
        })
    }

    fn parse_parenthesized(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        let mut meta = self.finish_node(open, false);
        meta.extra.parenthesized = true;
        meta.extra.paren_start = Some(meta.span.start);
        Ok(Node::ParenthesizedExpression {
            meta,
            expression: Box::new(expr),
        })
    }

    fn parse_array_expression(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        let mut elements = Vec::new();
        while !self.at(TokenKind::BracketR) {
            if self.at(TokenKind::Comma) {
                elements.push(None);
                self.bump()?;
                continue;
            }
            if self.at(TokenKind::Ellipsis) {
                let spread_open = self.start_node();
                self.bump()?;
                let argument = self.parse_assignment()?;
                let meta = self.finish_node(spread_open, false);
                elements.push(Some(Node::SpreadElement {
                    meta,
                    argument: Box::new(argument),
                }));
            } else {
                elements.push(Some(self.parse_assignment()?));
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BracketR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::ArrayExpression { meta, elements })
    }

    fn parse_object_expression(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?;
        let mut properties = Vec::new();
        let mut plain_key_seen = false;
        while !self.at(TokenKind::BraceR) {
            if self.at(TokenKind::Ellipsis) {
                if !self.has_plugin(Plugin::ObjectRestSpread) {
                    return Err(self.error_here("object spread requires the objectRestSpread plugin"));
                }
                let spread_open = self.start_node();
                self.bump()?;
                let argument = self.parse_assignment()?;
                let meta = self.finish_node(spread_open, false);
                properties.push(Node::SpreadElement {
                    meta,
                    argument: Box::new(argument),
                });
            } else {
                let (prop, is_plain_proto) = self.parse_object_member()?;
                if is_plain_proto {
                    if plain_key_seen {
                        return Err(self.error_here("duplicate __proto__ property in object literal"));
                    }
                    plain_key_seen = true;
                }
                properties.push(prop);
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::ObjectExpression { meta, properties })
    }

    /// Returns `(node, is_plain_non_computed_non_shorthand___proto__)` so
    /// the caller can enforce the duplicate-`__proto__` invariant (spec
    /// §3, testable property 5).
    fn parse_object_member(&mut self) -> ParseResult<(Node, bool)> {
        let open = self.start_node();
        let r#async = self.current_text() == "async" && !self.peek_is_member_terminator()?;
        if r#async {
            self.bump()?;
        }
        let generator = self.eat(TokenKind::Star)?;
        let is_getter = !r#async && !generator && self.current_text() == "get" && !self.peek_is_member_terminator()?;
        let is_setter = !r#async && !generator && self.current_text() == "set" && !self.peek_is_member_terminator()?;
        if is_getter || is_setter {
            self.bump()?;
        }
        let computed = self.at(TokenKind::BracketL);
        let key = self.parse_property_key(computed)?;
        let is_plain_proto = !computed && matches!(&key, Node::StringLiteral { value, .. } if value == "__proto__")
            || matches!(&key, Node::Identifier(id) if id.name == "__proto__");

        if self.at(TokenKind::ParenL) || is_getter || is_setter || generator || r#async {
            let function = self.parse_method_body(generator, r#async)?;
            let kind = if is_getter {
                PropertyKind::Get
            } else if is_setter {
                PropertyKind::Set
            } else {
                PropertyKind::Method
            };
            let meta = self.finish_node(open, false);
            return Ok((
                Node::ObjectMethod {
                    meta,
                    key: Box::new(key),
                    computed,
                    kind,
                    function,
                },
                false,
            ));
        }

        if self.eat(TokenKind::Colon)? {
            let value = self.parse_assignment()?;
            let meta = self.finish_node(open, false);
            return Ok((
                Node::Property(Property {
                    meta,
                    key: Box::new(key),
                    value: Box::new(value),
                    kind: PropertyKind::Init,
                    computed,
                    method: false,
                    shorthand: false,
                }),
                is_plain_proto,
            ));
        }

        // Shorthand property, possibly with a pattern default (`{x = 1}`).
        let value = if self.eat(TokenKind::Eq)? {
            let default = self.parse_assignment()?;
            let shorthand_meta = crate::node_factory::NodeFactory::shallow_clone_meta(key.meta());
            Node::AssignmentPattern {
                meta: shorthand_meta,
                left: Box::new(key.clone()),
                right: Box::new(default),
            }
        } else {
            key.clone()
        };
        let mut meta = self.finish_node(open, false);
        meta.extra.shorthand = true;
        Ok((
            Node::Property(Property {
                meta,
                key: Box::new(key),
                value: Box::new(value),
                kind: PropertyKind::Init,
                computed,
                method: false,
                shorthand: true,
            }),
            is_plain_proto,
        ))
    }

    fn peek_is_member_terminator(&mut self) -> ParseResult<bool> {
        let next = self.lookahead()?;
        Ok(matches!(
            next.kind,
            TokenKind::Colon | TokenKind::ParenL | TokenKind::Comma | TokenKind::BraceR | TokenKind::Eq
        ))
    }

    pub(super) fn parse_property_key(&mut self, computed: bool) -> ParseResult<Node> {
        if computed {
            self.bump()?; // `[`
            let key = self.parse_assignment()?;
            self.expect(TokenKind::BracketR)?;
            return Ok(key);
        }
        let open = self.start_node();
        match self.cur_kind() {
            TokenKind::Str => {
                let value = match &self.cur().value {
                    crate::token::TokenValue::Str(s) => s.clone(),
                    _ => String::new(),
                };
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::StringLiteral { meta, value })
            }
            TokenKind::Num => {
                let value = match &self.cur().value {
                    crate::token::TokenValue::Num(v) => *v,
                    _ => 0.0,
                };
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::NumericLiteral { meta, value })
            }
            _ => {
                let name = self.current_identifier_text()?;
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(plain_identifier(name, meta.span))
            }
        }
    }

    /// `tagged` is spec §8's boundary behavior switch: an invalid
    /// `\u{...}` escape (lexed with `cooked: None`) is accepted in a
    /// tagged template (the tag function sees a null cooked value) and
    /// rejected outright in an untagged one.
    fn parse_template_literal(&mut self, tagged: bool) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::Backtick)?;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let chunk_open = self.start_node();
            let (cooked, raw, is_tail) = match &self.cur().value {
                crate::token::TokenValue::Template { cooked, raw, tail } => (cooked.clone(), raw.clone(), *tail),
                _ => return Err(self.error_here("expected a template chunk")),
            };
            if !tagged && cooked.is_none() {
                return Err(self.error_here("invalid escape sequence in untagged template literal"));
            }
            self.bump()?;
            let meta = self.finish_node(chunk_open, false);
            quasis.push(Node::TemplateElement(TemplateElement {
                meta,
                cooked,
                raw,
                tail: is_tail,
            }));
            if is_tail {
                break;
            }
            expressions.push(self.parse_expression()?);
            self.expect(TokenKind::BraceR)?;
        }
        let meta = self.finish_node(open, true);
        Ok(Node::TemplateLiteral {
            meta,
            quasis,
            expressions,
        })
    }

    fn try_parse_arrow(&mut self) -> ParseResult<Option<Node>> {
        if !matches!(self.cur_kind(), TokenKind::ParenL | TokenKind::Name) {
            return Ok(None);
        }
        let attempt = self.try_parse(|p| {
            let open = p.start_node();
            let params = if p.at(TokenKind::ParenL) {
                p.parse_arrow_params_parenthesized()?
            } else {
                vec![p.parse_binding_identifier()?]
            };
            if p.cur().preceded_by_newline {
                return Err(p.error_here("no line break allowed before '=>'"));
            }
            p.expect(TokenKind::Arrow)?;
            p.finish_arrow_body(open, params, false)
        });
        match attempt {
            Ok(node) => Ok(Some(node)),
            Err(_) => Ok(None),
        }
    }

    /// Called only once the caller has confirmed the current token's text
    /// is `"async"` (see `parse_async_atom`).
    fn try_parse_async_arrow(&mut self) -> ParseResult<Option<Node>> {
        let attempt = self.try_parse(|p| {
            let open = p.start_node();
            p.bump()?; // `async`
            if p.cur().preceded_by_newline {
                return Err(p.error_here("no line break allowed after 'async'"));
            }
            let params = if p.at(TokenKind::ParenL) {
                p.parse_arrow_params_parenthesized()?
            } else {
                vec![p.parse_binding_identifier()?]
            };
            if p.cur().preceded_by_newline {
                return Err(p.error_here("no line break allowed before '=>'"));
            }
            p.expect(TokenKind::Arrow)?;
            p.finish_arrow_body(open, params, true)
        });
        match attempt {
            Ok(node) => Ok(Some(node)),
            Err(_) => Ok(None),
        }
    }

    fn parse_arrow_params_parenthesized(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::ParenL)?;
        let mut params = Vec::new();
        while !self.at(TokenKind::ParenR) {
            params.push(self.parse_binding_element()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::ParenR)?;
        Ok(params)
    }

    fn finish_arrow_body(&mut self, open: crate::node_factory::OpenNode, params: Vec<Node>, is_async: bool) -> ParseResult<Node> {
        let (body, expression) = if self.at(TokenKind::BraceL) {
            (self.parse_block_statement()?, false)
        } else {
            (self.parse_assignment()?, true)
        };
        let meta = self.finish_node(open, false);
        Ok(Node::ArrowFunctionExpression {
            meta,
            function: FunctionShape {
                id: None,
                params,
                body: Box::new(body),
                generator: false,
                r#async: is_async,
                return_type: None,
                type_parameters: None,
            },
            expression,
        })
    }
}
