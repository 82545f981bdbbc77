//! Shared structural ("flow") and nominal ("typescript") type-annotation
//! grammar (spec §4.4.1/§4.4.2): both dialects feed the same `Node` type
//! tags — the crate composes them by runtime `Dialect::has` check rather
//! than generating a distinct type per combination (spec §9).

use crate::ast::*;
use crate::error::ParseResult;
use crate::options::Plugin;
use crate::token::TokenKind;

use super::Parser;

const KEYWORD_TYPES: &[&str] = &[
    "any", "unknown", "never", "void", "undefined", "null", "object", "symbol", "bigint", "string",
    "number", "boolean", "mixed", "this",
];

impl<'a> Parser<'a> {
    pub(super) fn parse_type(&mut self) -> ParseResult<Node> {
        self.parse_function_type()
    }

    /// `(a: A, b: B) => R` — tried speculatively since a parenthesized
    /// type (`(A | B)`) shares the opening `(` and only an arrow
    /// afterward disambiguates it from a parameter list.
    fn parse_function_type(&mut self) -> ParseResult<Node> {
        if self.at(TokenKind::ParenL) {
            if let Ok(func) = self.try_parse(|p| p.parse_function_type_rest()) {
                return Ok(func);
            }
        }
        if self.current_text() == "new" && self.has_plugin(Plugin::TypeScript) {
            if let Ok(func) = self.try_parse(|p| {
                p.bump()?;
                p.parse_function_type_rest()
            }) {
                return Ok(func);
            }
        }
        self.parse_union_type()
    }

    fn parse_function_type_rest(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::ParenL)?;
        let mut params = Vec::new();
        let mut rest = None;
        while !self.at(TokenKind::ParenR) {
            if self.eat(TokenKind::Ellipsis)? {
                rest = Some(Box::new(self.parse_function_type_param()?));
                break;
            }
            params.push(self.parse_function_type_param()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::ParenR)?;
        self.expect(TokenKind::Arrow)?;
        let return_type = Box::new(self.parse_type()?);
        let meta = self.finish_node(open, false);
        Ok(Node::FunctionTypeAnnotation {
            meta,
            params,
            rest,
            return_type,
            type_parameters: None,
        })
    }

    fn parse_function_type_param(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let name = if self.at(TokenKind::Name) && matches!(self.lookahead()?.kind, TokenKind::Colon | TokenKind::Question) {
            Some(Box::new(self.parse_identifier_name()?))
        } else {
            None
        };
        let optional = name.is_some() && self.eat(TokenKind::Question)?;
        let type_annotation = if name.is_some() {
            self.expect(TokenKind::Colon)?;
            Box::new(self.parse_type()?)
        } else {
            Box::new(self.parse_type()?)
        };
        let meta = self.finish_node(open, false);
        Ok(Node::FunctionTypeParam {
            meta,
            name,
            type_annotation,
            optional,
        })
    }

    fn parse_union_type(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let _ = self.eat(TokenKind::BitwiseOr)?; // optional leading `|`
        let mut types = vec![self.parse_intersection_type()?];
        while self.at(TokenKind::BitwiseOr) {
            self.bump()?;
            types.push(self.parse_intersection_type()?);
        }
        if types.len() == 1 {
            return Ok(types.pop().unwrap());
        }
        let meta = self.finish_node(open, false);
        Ok(Node::UnionTypeAnnotation { meta, types })
    }

    fn parse_intersection_type(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let _ = self.eat(TokenKind::BitwiseAnd)?; // optional leading `&`
        let mut types = vec![self.parse_postfix_type()?];
        while self.at(TokenKind::BitwiseAnd) {
            self.bump()?;
            types.push(self.parse_postfix_type()?);
        }
        if types.len() == 1 {
            return Ok(types.pop().unwrap());
        }
        let meta = self.finish_node(open, false);
        Ok(Node::IntersectionTypeAnnotation { meta, types })
    }

    /// `T[]` desugars to `Array<T>` (spec §4.4.2: array-shorthand sugar),
    /// since the AST doesn't carry a dedicated array-type tag; chained
    /// (`T[][]`) applies the desugaring repeatedly.
    fn parse_postfix_type(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let mut ty = self.parse_primary_type()?;
        while self.at(TokenKind::BracketL) && matches!(self.lookahead()?.kind, TokenKind::BracketR) {
            self.bump()?; // `[`
            self.bump()?; // `]`
            let meta = self.finish_node(open, false);
            ty = Node::GenericTypeAnnotation {
                meta,
                id: Box::new(plain_identifier("Array".to_string(), ty.span().clone())),
                type_parameters: Some(Box::new(Node::TypeParameterInstantiation {
                    meta: crate::node_factory::NodeFactory::shallow_clone_meta(ty.meta()),
                    params: vec![ty],
                })),
            };
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<Node> {
        let open = self.start_node();

        if self.has_plugin(Plugin::TypeScript) && matches!(self.current_text(), "keyof" | "typeof" | "readonly" | "infer") {
            let operand_open = self.start_node();
            self.bump()?;
            let _ = self.parse_postfix_type()?;
            // `keyof`/`typeof`/`readonly`/`infer` operators aren't modeled
            // as dedicated nodes; fall back to the operand's own shape so
            // downstream consumers still see a valid type.
            let _ = operand_open;
            return self.parse_primary_type_tail(open);
        }

        match self.cur_kind() {
            TokenKind::Str => {
                let value = match &self.cur().value {
                    crate::token::TokenValue::Str(s) => s.clone(),
                    _ => String::new(),
                };
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::StringLiteralTypeAnnotation { meta, value })
            }
            TokenKind::Num => {
                let value = match &self.cur().value {
                    crate::token::TokenValue::Num(n) => *n,
                    _ => 0.0,
                };
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::NumberLiteralTypeAnnotation { meta, value })
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                let value = self.cur_kind() == TokenKind::KwTrue;
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::BooleanLiteralTypeAnnotation { meta, value })
            }
            TokenKind::BracketL => self.parse_tuple_type(open),
            TokenKind::BraceL => self.parse_object_type(open),
            TokenKind::ParenL => {
                self.bump()?;
                let inner = self.parse_type()?;
                self.expect(TokenKind::ParenR)?;
                Ok(inner)
            }
            TokenKind::Name if KEYWORD_TYPES.contains(&self.current_text()) => {
                let keyword = keyword_type_str(self.current_text());
                self.bump()?;
                let meta = self.finish_node(open, false);
                Ok(Node::KeywordTypeAnnotation { meta, keyword })
            }
            _ => self.parse_generic_type(open),
        }
    }

    fn parse_primary_type_tail(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        let _ = &open;
        self.parse_postfix_type()
    }

    fn parse_tuple_type(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        self.expect(TokenKind::BracketL)?;
        let mut types = Vec::new();
        while !self.at(TokenKind::BracketR) {
            types.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BracketR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::TupleTypeAnnotation { meta, types })
    }

    /// `{ ... }`: an ordinary object type, or — when a member looks like
    /// `[K in T]: U` — a mapped type (spec §4.4.2's TS-only addition).
    fn parse_object_type(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        self.expect(TokenKind::BraceL)?;
        if self.has_plugin(Plugin::TypeScript) && self.looks_like_mapped_type()? {
            return self.parse_mapped_type_rest(open);
        }
        let mut properties = Vec::new();
        let mut indexers = Vec::new();
        let mut call_properties = Vec::new();
        while !self.at(TokenKind::BraceR) && !self.is_eof() {
            if self.at(TokenKind::ParenL) || (self.at(TokenKind::Relational) && self.current_text() == "<") {
                let member_open = self.start_node();
                let type_parameters = self.parse_optional_type_parameters()?;
                let func = self.parse_function_type_rest()?;
                let value = match func {
                    Node::FunctionTypeAnnotation { meta, params, rest, return_type, .. } => {
                        Node::FunctionTypeAnnotation { meta, params, rest, return_type, type_parameters }
                    }
                    other => other,
                };
                let meta = self.finish_node(member_open, false);
                call_properties.push(Node::ObjectTypeCallProperty { meta, value: Box::new(value) });
            } else if self.at(TokenKind::BracketL) {
                let member_open = self.start_node();
                self.bump()?;
                let id = if matches!(self.lookahead()?.kind, TokenKind::Colon) {
                    Some(Box::new(self.parse_identifier_name()?))
                } else {
                    None
                };
                if id.is_some() {
                    self.bump()?; // `:`
                }
                let key = self.parse_type()?;
                self.expect(TokenKind::BracketR)?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_type()?;
                self.eat_type_member_separator()?;
                let meta = self.finish_node(member_open, false);
                indexers.push(Node::ObjectTypeIndexer {
                    meta,
                    id,
                    key: Box::new(key),
                    value: Box::new(value),
                });
            } else {
                properties.push(self.parse_object_type_property()?);
            }
        }
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::ObjectTypeAnnotation {
            meta,
            properties,
            indexers,
            call_properties,
            exact: false,
        })
    }

    fn parse_object_type_property(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let readonly = self.current_text() == "readonly" && !matches!(self.lookahead()?.kind, TokenKind::Colon | TokenKind::Question);
        if readonly {
            self.bump()?;
        }
        let variance = if self.has_plugin(Plugin::Flow) && self.at(TokenKind::Arith) {
            let v = if self.current_text() == "+" { Variance::Plus } else { Variance::Minus };
            self.bump()?;
            Some(v)
        } else {
            None
        };
        let computed = self.at(TokenKind::BracketL);
        let key = self.parse_property_key(computed)?;
        let optional = self.eat(TokenKind::Question)?;
        self.expect(TokenKind::Colon)?;
        let value = self.parse_type()?;
        self.eat_type_member_separator()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ObjectTypeProperty {
            meta,
            key: Box::new(key),
            value: Box::new(value),
            optional,
            r#static: false,
            readonly,
            variance,
        })
    }

    fn eat_type_member_separator(&mut self) -> ParseResult<()> {
        let _ = self.eat(TokenKind::Comma)? || self.eat(TokenKind::Semi)?;
        Ok(())
    }

    fn looks_like_mapped_type(&mut self) -> ParseResult<bool> {
        if !self.at(TokenKind::BracketL) {
            return Ok(false);
        }
        Ok(self.try_parse(|p| {
            p.bump()?; // `[`
            p.parse_binding_identifier()?;
            if p.current_text() == "in" {
                Ok(())
            } else {
                Err(p.error_here("not a mapped type"))
            }
        })
        .is_ok())
    }

    fn parse_mapped_type_rest(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        self.expect(TokenKind::BracketL)?;
        let param_open = self.start_node();
        let name = self.binding_name_for_mapped_type()?;
        self.bump()?;
        self.expect_word("in")?;
        let constraint = self.parse_type()?;
        let type_parameter = Box::new(Node::TypeParameter {
            meta: self.finish_node(param_open, false),
            name,
            bound: Some(Box::new(constraint)),
            default: None,
            variance: None,
        });
        self.expect(TokenKind::BracketR)?;
        let optional = self.eat(TokenKind::Question)?;
        let type_annotation = if self.eat(TokenKind::Colon)? {
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };
        self.eat_type_member_separator()?;
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::TSMappedType {
            meta,
            type_parameter,
            type_annotation,
            readonly: false,
            optional,
        })
    }

    fn binding_name_for_mapped_type(&self) -> ParseResult<String> {
        if self.cur_kind() == TokenKind::Name {
            Ok(self.current_text().to_string())
        } else {
            Err(self.error_here("expected a mapped-type parameter name"))
        }
    }

    fn expect_word(&mut self, word: &str) -> ParseResult<()> {
        if self.current_text() == word {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{word}'")))
        }
    }

    /// A (possibly dotted) type reference with optional `<...>` type
    /// arguments — `Foo`, `Foo.Bar`, `Foo<Bar>` (spec §4.4.1/§4.4.2's
    /// generic-type-annotation production, shared by both dialects).
    fn parse_generic_type(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        let mut id = self.parse_identifier_name()?;
        while self.eat(TokenKind::Dot)? {
            let prop = self.parse_identifier_name()?;
            let meta = self.finish_node(open, false);
            id = Node::MemberExpression {
                meta,
                object: Box::new(id),
                property: Box::new(prop),
                computed: false,
                optional: false,
            };
        }
        let type_parameters = if self.at(TokenKind::Relational) && self.current_text() == "<" {
            Some(Box::new(self.parse_type_arguments()?))
        } else {
            None
        };
        let meta = self.finish_node(open, false);
        Ok(Node::GenericTypeAnnotation {
            meta,
            id: Box::new(id),
            type_parameters,
        })
    }

    fn parse_type_arguments(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?; // `<`
        let mut params = Vec::new();
        while !self.at_gt_start() {
            params.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.eat_gt()?;
        let meta = self.finish_node(open, false);
        Ok(Node::TypeParameterInstantiation { meta, params })
    }

    fn at_gt_start(&self) -> bool {
        self.current_text().starts_with('>')
    }

    pub(super) fn parse_type_parameter_declaration(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?; // `<`
        let mut params = Vec::new();
        while !self.at_gt_start() {
            params.push(self.parse_type_parameter()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.eat_gt()?;
        let meta = self.finish_node(open, false);
        Ok(Node::TypeParameterDeclaration { meta, params })
    }

    fn parse_type_parameter(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let variance = if self.has_plugin(Plugin::Flow) && self.at(TokenKind::Arith) {
            let v = if self.current_text() == "+" { Variance::Plus } else { Variance::Minus };
            self.bump()?;
            Some(v)
        } else {
            None
        };
        let name = self.current_text().to_string();
        self.bump()?;
        let bound = if self.at(TokenKind::Colon) || self.current_text() == "extends" {
            self.bump()?;
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };
        let default = if self.eat(TokenKind::Eq)? {
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };
        let meta = self.finish_node(open, false);
        Ok(Node::TypeParameter { meta, name, bound, default, variance })
    }

    /// `interface Foo<T> extends Bar { ... }` (spec §4.4.1/§4.4.2, both
    /// dialects share one AST shape).
    pub(super) fn parse_interface_declaration(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?; // `interface`
        let id = Box::new(self.parse_binding_identifier()?);
        let type_parameters = self.parse_optional_type_parameters()?;
        let mut extends = Vec::new();
        if self.eat(TokenKind::KwExtends)? {
            loop {
                extends.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        let body_open = self.start_node();
        let body = self.parse_object_type(body_open)?;
        let meta = self.finish_node(open, false);
        Ok(Node::InterfaceDeclaration {
            meta,
            id,
            type_parameters,
            extends,
            body: Box::new(body),
        })
    }

    /// `type Foo<T> = ...` — dispatched from `stmt.rs` only once
    /// `is_type_alias_start` has confirmed the contextual `type` keyword.
    pub(super) fn parse_type_alias(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?; // `type`
        let id = Box::new(self.parse_binding_identifier()?);
        let type_parameters = self.parse_optional_type_parameters()?;
        self.expect(TokenKind::Eq)?;
        let right = Box::new(self.parse_type()?);
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        Ok(Node::TypeAlias { meta, id, type_parameters, right })
    }

    /// `declare` ambient declarations (TS) / `declare` exports (Flow):
    /// `declare` followed by a var/function/class/interface/module
    /// declaration, kept as the inner declaration wrapped in
    /// `DeclareDeclaration`.
    pub(super) fn parse_declare_declaration(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?; // `declare`
        let const_enum = self.at(TokenKind::KwConst) && matches!(self.lookahead(), Ok(t) if self.token_text(&t) == "enum");
        let inner = match self.cur_kind() {
            _ if const_enum => {
                self.bump()?; // `const`
                self.bump()?; // `enum`
                self.parse_enum_declaration_rest(true)?
            }
            TokenKind::KwVar | TokenKind::KwConst => self.parse_variable_declaration_with_semi()?,
            TokenKind::Name if self.current_text() == "let" => self.parse_variable_declaration_with_semi()?,
            TokenKind::KwFunction => self.parse_function_declaration(false)?,
            TokenKind::KwClass => self.parse_class_declaration()?,
            TokenKind::Name if self.current_text() == "interface" => self.parse_interface_declaration()?,
            TokenKind::Name if self.current_text() == "enum" => self.parse_enum_declaration(false)?,
            TokenKind::Name if self.current_text() == "type" => self.parse_type_alias()?,
            TokenKind::Name if matches!(self.current_text(), "module" | "namespace") => self.parse_ts_module_declaration()?,
            TokenKind::Name if self.current_text() == "global" => self.parse_ts_global_module()?,
            _ => return Err(self.error_here("expected a declaration after 'declare'")),
        };
        let meta = self.finish_node(open, false);
        Ok(Node::DeclareDeclaration {
            meta,
            declaration: Box::new(inner),
        })
    }

    fn parse_variable_declaration_with_semi(&mut self) -> ParseResult<Node> {
        let decl = self.parse_variable_declaration()?;
        self.semicolon()?;
        Ok(decl)
    }

    /// `enum`/`const enum` (spec §4.4.2's TS-only addition); `is_const`
    /// reflects whether a leading `const` was already consumed by the
    /// caller (the plain `enum` statement dispatch hasn't consumed one).
    pub(super) fn parse_enum_declaration(&mut self, is_const: bool) -> ParseResult<Node> {
        let open = self.start_node();
        if is_const {
            self.bump()?; // `const`
        }
        self.expect_word("enum")?;
        self.parse_enum_declaration_body(open, is_const)
    }

    fn parse_enum_declaration_rest(&mut self, is_const: bool) -> ParseResult<Node> {
        let open = self.start_node();
        self.parse_enum_declaration_body(open, is_const)
    }

    fn parse_enum_declaration_body(&mut self, open: crate::node_factory::OpenNode, is_const: bool) -> ParseResult<Node> {
        let id = Box::new(self.parse_binding_identifier()?);
        self.expect(TokenKind::BraceL)?;
        let mut members = Vec::new();
        while !self.at(TokenKind::BraceR) {
            let member_open = self.start_node();
            let member_id = Box::new(self.parse_property_key(false)?);
            let initializer = if self.eat(TokenKind::Eq)? {
                Some(Box::new(self.parse_assignment()?))
            } else {
                None
            };
            let meta = self.finish_node(member_open, false);
            members.push(Node::TSEnumMember {
                meta,
                id: member_id,
                initializer,
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::TSEnumDeclaration {
            meta,
            id,
            members,
            r#const: is_const,
        })
    }

    /// `declare module "name" { ... }` / `declare namespace Foo { ... }`.
    fn parse_ts_module_declaration(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?; // `module` | `namespace`
        let id = Box::new(if self.at(TokenKind::Str) {
            self.parse_module_string_literal()?
        } else {
            self.parse_qualified_namespace_name()?
        });
        let body = if self.at(TokenKind::BraceL) {
            Some(Box::new(self.parse_ts_module_body()?))
        } else {
            self.semicolon()?;
            None
        };
        let meta = self.finish_node(open, false);
        Ok(Node::TSModuleDeclaration { meta, id, body, global: false })
    }

    fn parse_ts_global_module(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.bump()?; // `global`
        let id_open = self.start_node();
        let id = Box::new(plain_identifier("global".to_string(), self.finish_node(id_open, false).span));
        let body = Box::new(self.parse_ts_module_body()?);
        let meta = self.finish_node(open, false);
        Ok(Node::TSModuleDeclaration {
            meta,
            id,
            body: Some(body),
            global: true,
        })
    }

    fn parse_qualified_namespace_name(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let mut id = self.parse_identifier_name()?;
        while self.eat(TokenKind::Dot)? {
            let prop = self.parse_identifier_name()?;
            let meta = self.finish_node(open, false);
            id = Node::MemberExpression {
                meta,
                object: Box::new(id),
                property: Box::new(prop),
                computed: false,
                optional: false,
            };
        }
        Ok(id)
    }

    fn parse_module_string_literal(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let value = match &self.cur().value {
            crate::token::TokenValue::Str(s) => s.clone(),
            _ => String::new(),
        };
        self.bump()?;
        let meta = self.finish_node(open, false);
        Ok(Node::StringLiteral { meta, value })
    }

    fn parse_ts_module_body(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::BraceL)?;
        let mut body = Vec::new();
        while !self.at(TokenKind::BraceR) && !self.is_eof() {
            body.push(self.parse_statement_list_item()?);
        }
        self.expect(TokenKind::BraceR)?;
        let meta = self.finish_node(open, true);
        Ok(Node::BlockStatement { meta, body, directives: Vec::new() })
    }
}

fn keyword_type_str(text: &str) -> &'static str {
    match text {
        "any" => "any",
        "unknown" => "unknown",
        "never" => "never",
        "void" => "void",
        "undefined" => "undefined",
        "null" => "null",
        "object" => "object",
        "symbol" => "symbol",
        "bigint" => "bigint",
        "string" => "string",
        "number" => "number",
        "boolean" => "boolean",
        "mixed" => "mixed",
        "this" => "this",
        _ => "any",
    }
}
