//! Binding patterns and the expression→pattern conversion rules spec §4.2
//! calls out for lazily-recognized arrow parameters and destructuring
//! assignment targets (`toAssignable` in the grounding idiom).

use crate::ast::*;
use crate::error::ParseResult;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    /// A bare identifier binding, optionally followed by a structural/
    /// nominal type annotation (spec §4.4.1/§4.4.2).
    pub(super) fn parse_binding_identifier(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let name = self.binding_name_text()?;
        if self.state.in_strict_mode && (name == "eval" || name == "arguments") {
            return Err(self.error_here(format!("Binding {name} in strict mode")));
        }
        self.bump()?;
        let optional = self.has_plugin(crate::options::Plugin::TypeScript) && self.eat(TokenKind::Question)?;
        let type_annotation = self.parse_optional_type_annotation()?;
        let meta = self.finish_node(open, false);
        Ok(Node::Identifier(Identifier {
            meta,
            name,
            type_annotation,
            optional,
        }))
    }

    fn binding_name_text(&self) -> ParseResult<String> {
        if self.cur_kind() == TokenKind::Name || self.cur_kind().is_keyword() {
            return Ok(self.source_slice(self.cur().start(), self.cur().end()).to_string());
        }
        Err(self.error_here("expected a binding identifier"))
    }

    /// One element of a parameter list, array pattern, or object pattern:
    /// `...rest`, `pattern = default`, or a bare pattern.
    pub(super) fn parse_binding_element(&mut self) -> ParseResult<Node> {
        if self.at(TokenKind::Ellipsis) {
            let open = self.start_node();
            self.bump()?;
            let argument = self.parse_binding_target()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::RestElement {
                meta,
                argument: Box::new(argument),
                type_annotation: None,
            });
        }
        let open = self.start_node();
        let target = self.parse_binding_target()?;
        if self.eat(TokenKind::Eq)? {
            let right = self.parse_assignment()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::AssignmentPattern {
                meta,
                left: Box::new(target),
                right: Box::new(right),
            });
        }
        Ok(target)
    }

    /// A pattern target: identifier, array pattern, or object pattern
    /// (spec §4.2's destructuring grammar, parsed directly rather than via
    /// expression-then-convert when the position is unambiguously a
    /// binding, e.g. `function` parameters and `var`/`let`/`const`
    /// declarators).
    pub(super) fn parse_binding_target(&mut self) -> ParseResult<Node> {
        match self.cur_kind() {
            TokenKind::BracketL => self.parse_array_pattern(),
            TokenKind::BraceL => self.parse_object_pattern(),
            _ => self.parse_binding_identifier(),
        }
    }

    fn parse_array_pattern(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::BracketL)?;
        let mut elements = Vec::new();
        while !self.at(TokenKind::BracketR) {
            if self.at(TokenKind::Comma) {
                elements.push(None);
                self.bump()?;
                continue;
            }
            elements.push(Some(self.parse_binding_element()?));
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BracketR)?;
        let type_annotation = self.parse_optional_type_annotation()?;
        let meta = self.finish_node(open, true);
        Ok(Node::ArrayPattern {
            meta,
            elements,
            type_annotation,
        })
    }

    fn parse_object_pattern(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::BraceL)?;
        let mut properties = Vec::new();
        while !self.at(TokenKind::BraceR) {
            if self.at(TokenKind::Ellipsis) {
                let rest_open = self.start_node();
                self.bump()?;
                let argument = self.parse_binding_identifier()?;
                let meta = self.finish_node(rest_open, false);
                properties.push(Node::RestElement {
                    meta,
                    argument: Box::new(argument),
                    type_annotation: None,
                });
            } else {
                let prop_open = self.start_node();
                let computed = self.at(TokenKind::BracketL);
                let key = self.parse_property_key(computed)?;
                let (value, shorthand) = if self.eat(TokenKind::Colon)? {
                    (self.parse_binding_element_as_value()?, false)
                } else if self.eat(TokenKind::Eq)? {
                    let default = self.parse_assignment()?;
                    let default_meta = crate::node_factory::NodeFactory::shallow_clone_meta(key.meta());
                    (
                        Node::AssignmentPattern {
                            meta: default_meta,
                            left: Box::new(key.clone()),
                            right: Box::new(default),
                        },
                        true,
                    )
                } else {
                    (key.clone(), true)
                };
                let mut meta = self.finish_node(prop_open, false);
                meta.extra.shorthand = shorthand;
                properties.push(Node::Property(Property {
                    meta,
                    key: Box::new(key),
                    value: Box::new(value),
                    kind: PropertyKind::Init,
                    computed,
                    method: false,
                    shorthand,
                }));
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BraceR)?;
        let type_annotation = self.parse_optional_type_annotation()?;
        let meta = self.finish_node(open, true);
        Ok(Node::ObjectPattern {
            meta,
            properties,
            type_annotation,
        })
    }

    /// The value half of `{ key: <here> }`, which may itself carry a
    /// default (`{ key: value = default }`).
    fn parse_binding_element_as_value(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let target = self.parse_binding_target()?;
        if self.eat(TokenKind::Eq)? {
            let right = self.parse_assignment()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::AssignmentPattern {
                meta,
                left: Box::new(target),
                right: Box::new(right),
            });
        }
        Ok(target)
    }

    pub(super) fn parse_optional_type_annotation(&mut self) -> ParseResult<Option<BNode>> {
        if !self.at(TokenKind::Colon) {
            return Ok(None);
        }
        if !self.has_plugin(crate::options::Plugin::Flow) && !self.has_plugin(crate::options::Plugin::TypeScript) {
            return Ok(None);
        }
        let open = self.start_node();
        self.bump()?;
        let inner = self.parse_type()?;
        let meta = self.finish_node(open, false);
        Ok(Some(Box::new(Node::TypeAnnotation {
            meta,
            type_annotation: Box::new(inner),
        })))
    }

    /// Convert an already-parsed expression into a pattern (spec §4.2's
    /// `toAssignable`): the lazy-arrow and destructuring-assignment
    /// positions parse as ordinary expressions first since the grammar is
    /// ambiguous until the `=>` or `=` is seen, then convert in place
    /// rather than re-parsing.
    pub(super) fn to_assignable(&self, node: Node) -> ParseResult<Node> {
        Ok(match node {
            Node::ArrayExpression { meta, elements } => {
                let elements = elements
                    .into_iter()
                    .map(|el| el.map(|e| self.to_assignable(e)).transpose())
                    .collect::<ParseResult<Vec<_>>>()?;
                Node::ArrayPattern {
                    meta,
                    elements,
                    type_annotation: None,
                }
            }
            Node::ObjectExpression { meta, properties } => {
                let properties = properties
                    .into_iter()
                    .map(|p| self.to_assignable(p))
                    .collect::<ParseResult<Vec<_>>>()?;
                Node::ObjectPattern {
                    meta,
                    properties,
                    type_annotation: None,
                }
            }
            Node::Property(mut prop) => {
                prop.value = Box::new(self.to_assignable(*prop.value)?);
                Node::Property(prop)
            }
            Node::SpreadElement { meta, argument } => Node::RestElement {
                meta,
                argument: Box::new(self.to_assignable(*argument)?),
                type_annotation: None,
            },
            Node::AssignmentExpression {
                meta,
                operator: "=",
                left,
                right,
            } => Node::AssignmentPattern {
                meta,
                left: Box::new(self.to_assignable(*left)?),
                right,
            },
            Node::ParenthesizedExpression { expression, .. } => self.to_assignable(*expression)?,
            // Identifiers and member expressions are already valid
            // assignment targets.
            other @ (Node::Identifier(_) | Node::MemberExpression { .. }) => other,
            other => return Err(self.error_at(other.span().start, "invalid destructuring assignment target")),
        })
    }
}
