//! Import/export productions (spec §4.3's module grammar), including
//! dynamic-import/`import.meta` companions living in `expr.rs` and the
//! nominal-types dialect's `import =`/`export =` forms.

use crate::ast::*;
use crate::error::ParseResult;
use crate::options::Plugin;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_import_declaration(&mut self) -> ParseResult<Node> {
        if !self.in_module {
            return Err(self.error_here(
                "'import' and 'export' may appear only with 'sourceType: \"module\"'",
            ));
        }
        let open = self.start_node();
        self.expect(TokenKind::KwImport)?;

        if self.has_plugin(Plugin::TypeScript) && self.at(TokenKind::Name) && self.peek_is_eq()? {
            return self.parse_ts_import_equals(open);
        }

        // `import "side-effect-only"`.
        if self.at(TokenKind::Str) {
            let source = self.parse_string_literal()?;
            self.semicolon()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::ImportDeclaration {
                meta,
                specifiers: Vec::new(),
                source: Box::new(source),
                import_kind: ImportExportKind::Value,
            });
        }

        let import_kind = if self.has_plugin(Plugin::TypeScript) && self.current_text() == "type" && self.peek_starts_import_type_specifiers()? {
            self.bump()?;
            ImportExportKind::Type
        } else {
            ImportExportKind::Value
        };

        let mut specifiers = Vec::new();
        if self.at(TokenKind::Name) {
            specifiers.push(self.parse_import_default_specifier()?);
            if self.eat(TokenKind::Comma)? {
                specifiers.extend(self.parse_import_named_or_namespace()?);
            }
        } else {
            specifiers.extend(self.parse_import_named_or_namespace()?);
        }

        self.expect_contextual("from")?;
        let source = self.parse_string_literal()?;
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ImportDeclaration {
            meta,
            specifiers,
            source: Box::new(source),
            import_kind,
        })
    }

    fn parse_import_named_or_namespace(&mut self) -> ParseResult<Vec<Node>> {
        if self.at(TokenKind::Star) {
            Ok(vec![self.parse_import_namespace_specifier()?])
        } else {
            self.parse_import_named_specifiers()
        }
    }

    fn parse_import_default_specifier(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let local = self.parse_binding_identifier()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ImportDefaultSpecifier {
            meta,
            local: Box::new(local),
        })
    }

    fn parse_import_namespace_specifier(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        self.expect(TokenKind::Star)?;
        self.expect_contextual("as")?;
        let local = self.parse_binding_identifier()?;
        let meta = self.finish_node(open, false);
        Ok(Node::ImportNamespaceSpecifier {
            meta,
            local: Box::new(local),
        })
    }

    fn parse_import_named_specifiers(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::BraceL)?;
        let mut specifiers = Vec::new();
        while !self.at(TokenKind::BraceR) {
            let open = self.start_node();
            let imported = self.parse_module_export_name()?;
            let local = if self.current_text() == "as" {
                self.bump()?;
                self.parse_binding_identifier()?
            } else {
                imported.clone()
            };
            let meta = self.finish_node(open, false);
            specifiers.push(Node::ImportSpecifier {
                meta,
                imported: Box::new(imported),
                local: Box::new(local),
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BraceR)?;
        Ok(specifiers)
    }

    /// `import { default as x }` / `export { "literal" as y }`: a module
    /// export name is either an identifier or (spec's string-export-names
    /// extension) a string literal.
    fn parse_module_export_name(&mut self) -> ParseResult<Node> {
        if self.at(TokenKind::Str) {
            self.parse_string_literal()
        } else {
            self.parse_binding_identifier()
        }
    }

    fn parse_string_literal(&mut self) -> ParseResult<Node> {
        let open = self.start_node();
        let value = match &self.cur().value {
            crate::token::TokenValue::Str(s) => s.clone(),
            _ => return Err(self.error_here("expected a string literal")),
        };
        self.bump()?;
        let meta = self.finish_node(open, false);
        Ok(Node::StringLiteral { meta, value })
    }

    pub(super) fn parse_export_declaration(&mut self) -> ParseResult<Node> {
        if !self.in_module {
            return Err(self.error_here(
                "'import' and 'export' may appear only with 'sourceType: \"module\"'",
            ));
        }
        let decorators = std::mem::take(&mut self.state.pending_decorators);
        let open = self.start_node();
        self.expect(TokenKind::KwExport)?;

        if self.eat(TokenKind::KwDefault)? {
            self.register_default_export(open.start)?;
            let declaration = self.parse_export_default_target(decorators)?;
            let meta = self.finish_node(open, false);
            return Ok(Node::ExportDefaultDeclaration {
                meta,
                declaration: Box::new(declaration),
            });
        }

        if self.eat(TokenKind::Star)? {
            let exported = if self.current_text() == "as" {
                self.bump()?;
                Some(Box::new(self.parse_module_export_name()?))
            } else {
                None
            };
            self.expect_contextual("from")?;
            let source = self.parse_string_literal()?;
            self.semicolon()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::ExportAllDeclaration {
                meta,
                source: Box::new(source),
                exported,
            });
        }

        if self.has_plugin(Plugin::TypeScript) && self.at(TokenKind::Eq) {
            self.bump()?;
            let expression = self.parse_expression()?;
            self.semicolon()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::TSExportAssignment {
                meta,
                expression: Box::new(expression),
            });
        }

        let export_kind = if self.has_plugin(Plugin::TypeScript) && self.current_text() == "type" && self.at_following_brace_or_star()? {
            self.bump()?;
            ImportExportKind::Type
        } else {
            ImportExportKind::Value
        };

        if self.at(TokenKind::BraceL) {
            let specifiers = self.parse_export_named_specifiers()?;
            let source = if self.current_text() == "from" {
                self.bump()?;
                Some(Box::new(self.parse_string_literal()?))
            } else {
                for spec in &specifiers {
                    if let Node::ExportSpecifier { exported, .. } = spec {
                        self.register_export_name(exported)?;
                    }
                }
                None
            };
            self.semicolon()?;
            let meta = self.finish_node(open, false);
            return Ok(Node::ExportNamedDeclaration {
                meta,
                declaration: None,
                specifiers,
                source,
                export_kind,
            });
        }

        let declaration = self.parse_export_inline_declaration(decorators)?;
        self.register_declaration_export_names(&declaration)?;
        let meta = self.finish_node(open, false);
        Ok(Node::ExportNamedDeclaration {
            meta,
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
            export_kind,
        })
    }

    fn parse_export_default_target(&mut self, decorators: Vec<Node>) -> ParseResult<Node> {
        self.state.pending_decorators = decorators;
        let is_async_function = self.current_text() == "async"
            && matches!(self.lookahead(), Ok(t) if t.kind == TokenKind::KwFunction && !t.preceded_by_newline);
        match self.cur_kind() {
            TokenKind::KwFunction => self.parse_function_declaration(false),
            _ if is_async_function => {
                self.bump()?;
                self.parse_function_declaration(true)
            }
            TokenKind::KwClass => self.parse_class_declaration(),
            _ => {
                let expr = self.parse_assignment()?;
                self.semicolon()?;
                Ok(expr)
            }
        }
    }

    fn parse_export_inline_declaration(&mut self, decorators: Vec<Node>) -> ParseResult<Node> {
        self.state.pending_decorators = decorators;
        self.parse_statement_list_item()
    }

    fn parse_export_named_specifiers(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::BraceL)?;
        let mut specifiers = Vec::new();
        while !self.at(TokenKind::BraceR) {
            let open = self.start_node();
            let local = self.parse_module_export_name()?;
            let exported = if self.current_text() == "as" {
                self.bump()?;
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            let meta = self.finish_node(open, false);
            specifiers.push(Node::ExportSpecifier {
                meta,
                local: Box::new(local),
                exported: Box::new(exported),
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::BraceR)?;
        Ok(specifiers)
    }

    /// Reject re-exporting the same binding name twice (spec §3 testable
    /// property 7); suppressed under the nominal-types dialect, which
    /// allows declaration-merging patterns the distillation doesn't model
    /// precisely enough to keep this check sound there.
    /// `export default` also binds the name `"default"` (spec §8 invariant
    /// 7: "every exported name (including `default`)").
    fn register_default_export(&mut self, offset: u32) -> ParseResult<()> {
        if self.has_plugin(Plugin::TypeScript) {
            return Ok(());
        }
        if self.state.exported_names.contains(&"default".to_string()) {
            return Err(self.error_at(offset, "'default' has already been exported".to_string()));
        }
        self.state.exported_names.push("default".to_string());
        Ok(())
    }

    fn register_export_name(&mut self, exported: &Node) -> ParseResult<()> {
        if self.has_plugin(Plugin::TypeScript) {
            return Ok(());
        }
        let name = match exported {
            Node::Identifier(id) => id.name.clone(),
            Node::StringLiteral { value, .. } => value.clone(),
            _ => return Ok(()),
        };
        if self.state.exported_names.contains(&name) {
            return Err(self.error_at(exported.span().start, format!("'{name}' has already been exported")));
        }
        self.state.exported_names.push(name);
        Ok(())
    }

    fn register_declaration_export_names(&mut self, declaration: &Node) -> ParseResult<()> {
        let names = match declaration {
            Node::VariableDeclaration { declarations, .. } => declarations
                .iter()
                .filter_map(|d| match d {
                    Node::VariableDeclarator { id, .. } => binding_names(id),
                    _ => Vec::new(),
                })
                .flatten()
                .collect(),
            Node::FunctionDeclaration { function, .. } => function
                .id
                .as_deref()
                .map(binding_names)
                .unwrap_or_default(),
            Node::ClassDeclaration { id, .. } => id.as_deref().map(binding_names).unwrap_or_default(),
            _ => Vec::new(),
        };
        for name in names {
            if self.has_plugin(Plugin::TypeScript) {
                continue;
            }
            if self.state.exported_names.contains(&name) {
                return Err(self.error_at(declaration.span().start, format!("'{name}' has already been exported")));
            }
            self.state.exported_names.push(name);
        }
        Ok(())
    }

    fn parse_ts_import_equals(&mut self, open: crate::node_factory::OpenNode) -> ParseResult<Node> {
        let id = self.parse_binding_identifier()?;
        self.expect(TokenKind::Eq)?;
        let module_reference = if self.current_text() == "require" {
            let ref_open = self.start_node();
            self.bump()?;
            self.expect(TokenKind::ParenL)?;
            let expression = self.parse_string_literal()?;
            self.expect(TokenKind::ParenR)?;
            let meta = self.finish_node(ref_open, false);
            Node::TSExternalModuleReference {
                meta,
                expression: Box::new(expression),
            }
        } else {
            self.parse_subscripts_no_call()?
        };
        self.semicolon()?;
        let meta = self.finish_node(open, false);
        Ok(Node::TSImportEqualsDeclaration {
            meta,
            id: Box::new(id),
            module_reference: Box::new(module_reference),
        })
    }

    fn peek_is_eq(&mut self) -> ParseResult<bool> {
        Ok(self.lookahead()?.kind == TokenKind::Eq)
    }

    /// Whether the `type` just seen is the import-kind modifier rather
    /// than the default specifier's binding name — `import type from "m"`
    /// binds `type`, so the modifier reading only applies when what
    /// follows isn't itself `from`.
    fn peek_starts_import_type_specifiers(&mut self) -> ParseResult<bool> {
        let next = self.lookahead()?;
        if matches!(next.kind, TokenKind::BraceL | TokenKind::Star) {
            return Ok(true);
        }
        if next.kind != TokenKind::Name {
            return Ok(false);
        }
        Ok(self.source_slice(next.start(), next.end()) != "from")
    }

    fn at_following_brace_or_star(&mut self) -> ParseResult<bool> {
        Ok(matches!(self.lookahead()?.kind, TokenKind::BraceL | TokenKind::Star))
    }

    fn expect_contextual(&mut self, word: &str) -> ParseResult<()> {
        if self.current_text() == word {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{word}'")))
        }
    }
}

/// Bound names introduced by a binding target, for the duplicate-export
/// check — array/object pattern destructuring all count (spec §3 testable
/// property 7 doesn't special-case them).
fn binding_names(node: &Node) -> Vec<String> {
    match node {
        Node::Identifier(id) => vec![id.name.clone()],
        Node::ArrayPattern { elements, .. } => elements
            .iter()
            .filter_map(|e| e.as_ref())
            .flat_map(binding_names)
            .collect(),
        Node::ObjectPattern { properties, .. } => properties.iter().flat_map(binding_names).collect(),
        Node::Property(p) => binding_names(&p.value),
        Node::AssignmentPattern { left, .. } => binding_names(left),
        Node::RestElement { argument, .. } => binding_names(argument),
        _ => Vec::new(),
    }
}
