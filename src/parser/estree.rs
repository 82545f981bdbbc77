//! ESTree-shape tag substitution (spec §4.4.4).
//!
//! Unlike the other three dialects, `estree` doesn't add grammar — every
//! production still goes through the ordinary parser. It only changes
//! what tree comes out: literals unify into one `Literal` tag, object
//! methods fold into `Property`, and directive prologues stop being a
//! separate node layer. This module is a pure post-pass over the already
//! -built tree rather than something threaded through parsing itself,
//! since every substitution is a strict function of the finished node
//! (never of parse-time context).
//!
//! `ClassMethod`/`ClassProperty`/`ClassPrivateProperty` are left as-is:
//! real ESTree wraps methods in a `MethodDefinition` node around a
//! `FunctionExpression`, but this crate's [`crate::ast::Node`] has no such
//! variant, and adding one this late would ripple through every class
//! production for a shape difference the rest of the crate never
//! consumes. Recorded as an accepted gap in `DESIGN.md`.

use crate::ast::{LiteralValue, Node, NodeMeta, Property};

/// Applied once to the whole tree after an ordinary parse, when
/// [`crate::options::Plugin::Estree`] is active.
pub(crate) fn apply(node: Node) -> Node {
    let node = map_children(node);
    substitute(node)
}

fn substitute(node: Node) -> Node {
    match node {
        Node::NumericLiteral { meta, value } => literal(meta, LiteralValue::Number(value), None),
        Node::StringLiteral { meta, value } => literal(meta, LiteralValue::String(value), None),
        Node::BooleanLiteral { meta, value } => literal(meta, LiteralValue::Boolean(value), None),
        Node::NullLiteral { meta } => literal(meta, LiteralValue::Null, None),
        Node::RegExpLiteral { meta, pattern, flags } => {
            literal(meta, LiteralValue::Null, Some((pattern, flags)))
        }
        Node::ObjectMethod { meta, key, computed, kind, function } => Node::Property(Property {
            meta: meta.clone(),
            key,
            value: Box::new(Node::FunctionExpression { meta, function }),
            kind,
            computed,
            method: true,
            shorthand: false,
        }),
        Node::Program { meta, body, directives, source_type } => {
            let mut new_body = directives_to_statements(directives);
            new_body.extend(body);
            Node::Program { meta, body: new_body, directives: Vec::new(), source_type }
        }
        Node::BlockStatement { meta, body, directives } => {
            let mut new_body = directives_to_statements(directives);
            new_body.extend(body);
            Node::BlockStatement { meta, body: new_body, directives: Vec::new() }
        }
        other => other,
    }
}

fn literal(meta: NodeMeta, value: LiteralValue, regex: Option<(String, String)>) -> Node {
    Node::Literal { meta, value, regex }
}

/// `Directive`/`DirectiveLiteral` stop existing as their own tags under
/// `estree`; a directive prologue entry becomes an ordinary
/// `ExpressionStatement` wrapping a string `Literal`, the way the rest of
/// the body is already shaped.
fn directives_to_statements(directives: Vec<Node>) -> Vec<Node> {
    directives
        .into_iter()
        .map(|directive| match directive {
            Node::Directive { meta, value } => {
                let Node::DirectiveLiteral { meta: lit_meta, value: text } = *value else {
                    unreachable!("Directive.value is always a DirectiveLiteral");
                };
                Node::ExpressionStatement {
                    meta,
                    expression: Box::new(Node::Literal {
                        meta: lit_meta,
                        value: LiteralValue::String(text),
                        regex: None,
                    }),
                }
            }
            other => other,
        })
        .collect()
}

fn map_box(n: Box<Node>) -> Box<Node> {
    Box::new(apply(*n))
}

fn map_opt_box(n: Option<Box<Node>>) -> Option<Box<Node>> {
    n.map(map_box)
}

fn map_vec(v: Vec<Node>) -> Vec<Node> {
    v.into_iter().map(apply).collect()
}

fn map_vec_opt(v: Vec<Option<Node>>) -> Vec<Option<Node>> {
    v.into_iter().map(|o| o.map(apply)).collect()
}

fn map_function(f: crate::ast::FunctionShape) -> crate::ast::FunctionShape {
    crate::ast::FunctionShape {
        id: map_opt_box(f.id),
        params: map_vec(f.params),
        body: map_box(f.body),
        generator: f.generator,
        r#async: f.r#async,
        return_type: map_opt_box(f.return_type),
        type_parameters: map_opt_box(f.type_parameters),
    }
}

fn map_member(m: crate::ast::ClassMember) -> crate::ast::ClassMember {
    crate::ast::ClassMember {
        meta: m.meta,
        key: map_box(m.key),
        computed: m.computed,
        r#static: m.r#static,
        decorators: map_vec(m.decorators),
    }
}

/// Recurse into every `Node`-typed child so a literal or object method
/// buried arbitrarily deep (a default parameter value, a nested array
/// element, ...) still gets substituted. Leaves (no `Node` children) fall
/// through the wildcard arm unchanged.
fn map_children(node: Node) -> Node {
    match node {
        Node::Program { meta, body, directives, source_type } => {
            Node::Program { meta, body: map_vec(body), directives: map_vec(directives), source_type }
        }
        Node::Directive { meta, value } => Node::Directive { meta, value: map_box(value) },
        Node::ObjectMethod { meta, key, computed, kind, function } => {
            Node::ObjectMethod { meta, key: map_box(key), computed, kind, function: map_function(function) }
        }
        Node::Identifier(mut id) => {
            id.type_annotation = map_opt_box(id.type_annotation);
            Node::Identifier(id)
        }
        Node::ArrayExpression { meta, elements } => Node::ArrayExpression { meta, elements: map_vec_opt(elements) },
        Node::ObjectExpression { meta, properties } => {
            Node::ObjectExpression { meta, properties: map_vec(properties) }
        }
        Node::FunctionExpression { meta, function } => {
            Node::FunctionExpression { meta, function: map_function(function) }
        }
        Node::ArrowFunctionExpression { meta, function, expression } => {
            Node::ArrowFunctionExpression { meta, function: map_function(function), expression }
        }
        Node::ClassExpression { meta, id, super_class, body, decorators } => Node::ClassExpression {
            meta,
            id: map_opt_box(id),
            super_class: map_opt_box(super_class),
            body: map_box(body),
            decorators: map_vec(decorators),
        },
        Node::TaggedTemplateExpression { meta, tag, quasi } => {
            Node::TaggedTemplateExpression { meta, tag: map_box(tag), quasi: map_box(quasi) }
        }
        Node::TemplateLiteral { meta, quasis, expressions } => {
            Node::TemplateLiteral { meta, quasis: map_vec(quasis), expressions: map_vec(expressions) }
        }
        Node::UnaryExpression { meta, operator, prefix, argument } => {
            Node::UnaryExpression { meta, operator, prefix, argument: map_box(argument) }
        }
        Node::UpdateExpression { meta, operator, prefix, argument } => {
            Node::UpdateExpression { meta, operator, prefix, argument: map_box(argument) }
        }
        Node::BinaryExpression { meta, operator, left, right } => {
            Node::BinaryExpression { meta, operator, left: map_box(left), right: map_box(right) }
        }
        Node::LogicalExpression { meta, operator, left, right } => {
            Node::LogicalExpression { meta, operator, left: map_box(left), right: map_box(right) }
        }
        Node::AssignmentExpression { meta, operator, left, right } => {
            Node::AssignmentExpression { meta, operator, left: map_box(left), right: map_box(right) }
        }
        Node::ConditionalExpression { meta, test, consequent, alternate } => Node::ConditionalExpression {
            meta,
            test: map_box(test),
            consequent: map_box(consequent),
            alternate: map_box(alternate),
        },
        Node::CallExpression { meta, callee, arguments, optional } => {
            Node::CallExpression { meta, callee: map_box(callee), arguments: map_vec(arguments), optional }
        }
        Node::NewExpression { meta, callee, arguments } => {
            Node::NewExpression { meta, callee: map_box(callee), arguments: map_vec(arguments) }
        }
        Node::SequenceExpression { meta, expressions } => {
            Node::SequenceExpression { meta, expressions: map_vec(expressions) }
        }
        Node::MemberExpression { meta, object, property, computed, optional } => Node::MemberExpression {
            meta,
            object: map_box(object),
            property: map_box(property),
            computed,
            optional,
        },
        Node::BindExpression { meta, object, callee } => {
            Node::BindExpression { meta, object: map_opt_box(object), callee: map_box(callee) }
        }
        Node::YieldExpression { meta, argument, delegate } => {
            Node::YieldExpression { meta, argument: map_opt_box(argument), delegate }
        }
        Node::AwaitExpression { meta, argument } => Node::AwaitExpression { meta, argument: map_box(argument) },
        Node::ParenthesizedExpression { meta, expression } => {
            Node::ParenthesizedExpression { meta, expression: map_box(expression) }
        }
        Node::DoExpression { meta, body } => Node::DoExpression { meta, body: map_box(body) },
        Node::MetaProperty { meta, meta_object, property } => {
            Node::MetaProperty { meta, meta_object: map_box(meta_object), property: map_box(property) }
        }
        Node::SpreadElement { meta, argument } => Node::SpreadElement { meta, argument: map_box(argument) },
        Node::ArrayPattern { meta, elements, type_annotation } => Node::ArrayPattern {
            meta,
            elements: map_vec_opt(elements),
            type_annotation: map_opt_box(type_annotation),
        },
        Node::ObjectPattern { meta, properties, type_annotation } => Node::ObjectPattern {
            meta,
            properties: map_vec(properties),
            type_annotation: map_opt_box(type_annotation),
        },
        Node::AssignmentPattern { meta, left, right } => {
            Node::AssignmentPattern { meta, left: map_box(left), right: map_box(right) }
        }
        Node::RestElement { meta, argument, type_annotation } => {
            Node::RestElement { meta, argument: map_box(argument), type_annotation: map_opt_box(type_annotation) }
        }
        Node::Property(p) => Node::Property(Property {
            meta: p.meta,
            key: map_box(p.key),
            value: map_box(p.value),
            kind: p.kind,
            computed: p.computed,
            method: p.method,
            shorthand: p.shorthand,
        }),
        Node::ExpressionStatement { meta, expression } => {
            Node::ExpressionStatement { meta, expression: map_box(expression) }
        }
        Node::BlockStatement { meta, body, directives } => {
            Node::BlockStatement { meta, body: map_vec(body), directives: map_vec(directives) }
        }
        Node::WithStatement { meta, object, body } => {
            Node::WithStatement { meta, object: map_box(object), body: map_box(body) }
        }
        Node::ReturnStatement { meta, argument } => Node::ReturnStatement { meta, argument: map_opt_box(argument) },
        Node::LabeledStatement { meta, label, body } => {
            Node::LabeledStatement { meta, label: map_box(label), body: map_box(body) }
        }
        Node::BreakStatement { meta, label } => Node::BreakStatement { meta, label: map_opt_box(label) },
        Node::ContinueStatement { meta, label } => Node::ContinueStatement { meta, label: map_opt_box(label) },
        Node::IfStatement { meta, test, consequent, alternate } => Node::IfStatement {
            meta,
            test: map_box(test),
            consequent: map_box(consequent),
            alternate: map_opt_box(alternate),
        },
        Node::SwitchStatement { meta, discriminant, cases } => {
            Node::SwitchStatement { meta, discriminant: map_box(discriminant), cases: map_vec(cases) }
        }
        Node::SwitchCase { meta, test, consequent } => {
            Node::SwitchCase { meta, test: map_opt_box(test), consequent: map_vec(consequent) }
        }
        Node::ThrowStatement { meta, argument } => Node::ThrowStatement { meta, argument: map_box(argument) },
        Node::TryStatement { meta, block, handler, finalizer } => Node::TryStatement {
            meta,
            block: map_box(block),
            handler: map_opt_box(handler),
            finalizer: map_opt_box(finalizer),
        },
        Node::CatchClause { meta, param, body } => {
            Node::CatchClause { meta, param: map_opt_box(param), body: map_box(body) }
        }
        Node::WhileStatement { meta, test, body } => {
            Node::WhileStatement { meta, test: map_box(test), body: map_box(body) }
        }
        Node::DoWhileStatement { meta, body, test } => {
            Node::DoWhileStatement { meta, body: map_box(body), test: map_box(test) }
        }
        Node::ForStatement { meta, init, test, update, body } => Node::ForStatement {
            meta,
            init: map_opt_box(init),
            test: map_opt_box(test),
            update: map_opt_box(update),
            body: map_box(body),
        },
        Node::ForInStatement { meta, left, right, body } => {
            Node::ForInStatement { meta, left: map_box(left), right: map_box(right), body: map_box(body) }
        }
        Node::ForOfStatement { meta, left, right, body, r#await } => Node::ForOfStatement {
            meta,
            left: map_box(left),
            right: map_box(right),
            body: map_box(body),
            r#await,
        },
        Node::VariableDeclaration { meta, kind, declarations } => {
            Node::VariableDeclaration { meta, kind, declarations: map_vec(declarations) }
        }
        Node::VariableDeclarator { meta, id, init } => {
            Node::VariableDeclarator { meta, id: map_box(id), init: map_opt_box(init) }
        }
        Node::FunctionDeclaration { meta, function, declare } => {
            Node::FunctionDeclaration { meta, function: map_function(function), declare }
        }
        Node::ClassDeclaration { meta, id, super_class, body, decorators, declare } => Node::ClassDeclaration {
            meta,
            id: map_opt_box(id),
            super_class: map_opt_box(super_class),
            body: map_box(body),
            decorators: map_vec(decorators),
            declare,
        },
        Node::ClassBody { meta, body } => Node::ClassBody { meta, body: map_vec(body) },
        Node::ClassMethod { member, kind, function } => {
            Node::ClassMethod { member: map_member(member), kind, function: map_function(function) }
        }
        Node::ClassProperty { member, value, type_annotation, declare, readonly } => Node::ClassProperty {
            member: map_member(member),
            value: map_opt_box(value),
            type_annotation: map_opt_box(type_annotation),
            declare,
            readonly,
        },
        Node::ClassPrivateProperty { member, value } => {
            Node::ClassPrivateProperty { member: map_member(member), value: map_opt_box(value) }
        }
        Node::StaticBlock { meta, body } => Node::StaticBlock { meta, body: map_vec(body) },
        Node::ImportDeclaration { meta, specifiers, source, import_kind } => Node::ImportDeclaration {
            meta,
            specifiers: map_vec(specifiers),
            source: map_box(source),
            import_kind,
        },
        Node::ImportSpecifier { meta, imported, local } => {
            Node::ImportSpecifier { meta, imported: map_box(imported), local: map_box(local) }
        }
        Node::ImportDefaultSpecifier { meta, local } => {
            Node::ImportDefaultSpecifier { meta, local: map_box(local) }
        }
        Node::ImportNamespaceSpecifier { meta, local } => {
            Node::ImportNamespaceSpecifier { meta, local: map_box(local) }
        }
        Node::ImportExpression { meta, source } => Node::ImportExpression { meta, source: map_box(source) },
        Node::ExportNamedDeclaration { meta, declaration, specifiers, source, export_kind } => {
            Node::ExportNamedDeclaration {
                meta,
                declaration: map_opt_box(declaration),
                specifiers: map_vec(specifiers),
                source: map_opt_box(source),
                export_kind,
            }
        }
        Node::ExportSpecifier { meta, local, exported } => {
            Node::ExportSpecifier { meta, local: map_box(local), exported: map_box(exported) }
        }
        Node::ExportDefaultDeclaration { meta, declaration } => {
            Node::ExportDefaultDeclaration { meta, declaration: map_box(declaration) }
        }
        Node::ExportAllDeclaration { meta, source, exported } => {
            Node::ExportAllDeclaration { meta, source: map_box(source), exported: map_opt_box(exported) }
        }
        Node::Decorator { meta, expression } => Node::Decorator { meta, expression: map_box(expression) },
        Node::JSXElement { meta, opening_element, children, closing_element } => Node::JSXElement {
            meta,
            opening_element: map_box(opening_element),
            children: map_vec(children),
            closing_element: map_opt_box(closing_element),
        },
        Node::JSXFragment { meta, children } => Node::JSXFragment { meta, children: map_vec(children) },
        Node::JSXOpeningElement { meta, name, attributes, self_closing } => Node::JSXOpeningElement {
            meta,
            name: map_box(name),
            attributes: map_vec(attributes),
            self_closing,
        },
        Node::JSXClosingElement { meta, name } => Node::JSXClosingElement { meta, name: map_box(name) },
        Node::JSXNamespacedName { meta, namespace, name } => {
            Node::JSXNamespacedName { meta, namespace: map_box(namespace), name: map_box(name) }
        }
        Node::JSXMemberExpression { meta, object, property } => {
            Node::JSXMemberExpression { meta, object: map_box(object), property: map_box(property) }
        }
        Node::JSXAttribute { meta, name, value } => {
            Node::JSXAttribute { meta, name: map_box(name), value: map_opt_box(value) }
        }
        Node::JSXSpreadAttribute { meta, argument } => {
            Node::JSXSpreadAttribute { meta, argument: map_box(argument) }
        }
        Node::JSXExpressionContainer { meta, expression } => {
            Node::JSXExpressionContainer { meta, expression: map_box(expression) }
        }
        Node::JSXSpreadChild { meta, expression } => Node::JSXSpreadChild { meta, expression: map_box(expression) },
        Node::TypeAnnotation { meta, type_annotation } => {
            Node::TypeAnnotation { meta, type_annotation: map_box(type_annotation) }
        }
        Node::TypeParameterDeclaration { meta, params } => {
            Node::TypeParameterDeclaration { meta, params: map_vec(params) }
        }
        Node::TypeParameter { meta, name, bound, default, variance } => Node::TypeParameter {
            meta,
            name,
            bound: map_opt_box(bound),
            default: map_opt_box(default),
            variance,
        },
        Node::TypeParameterInstantiation { meta, params } => {
            Node::TypeParameterInstantiation { meta, params: map_vec(params) }
        }
        Node::GenericTypeAnnotation { meta, id, type_parameters } => {
            Node::GenericTypeAnnotation { meta, id: map_box(id), type_parameters: map_opt_box(type_parameters) }
        }
        Node::UnionTypeAnnotation { meta, types } => Node::UnionTypeAnnotation { meta, types: map_vec(types) },
        Node::IntersectionTypeAnnotation { meta, types } => {
            Node::IntersectionTypeAnnotation { meta, types: map_vec(types) }
        }
        Node::TupleTypeAnnotation { meta, types } => Node::TupleTypeAnnotation { meta, types: map_vec(types) },
        Node::FunctionTypeAnnotation { meta, params, rest, return_type, type_parameters } => {
            Node::FunctionTypeAnnotation {
                meta,
                params: map_vec(params),
                rest: map_opt_box(rest),
                return_type: map_box(return_type),
                type_parameters: map_opt_box(type_parameters),
            }
        }
        Node::FunctionTypeParam { meta, name, type_annotation, optional } => Node::FunctionTypeParam {
            meta,
            name: map_opt_box(name),
            type_annotation: map_box(type_annotation),
            optional,
        },
        Node::ObjectTypeAnnotation { meta, properties, indexers, call_properties, exact } => {
            Node::ObjectTypeAnnotation {
                meta,
                properties: map_vec(properties),
                indexers: map_vec(indexers),
                call_properties: map_vec(call_properties),
                exact,
            }
        }
        Node::ObjectTypeProperty { meta, key, value, optional, r#static, readonly, variance } => {
            Node::ObjectTypeProperty {
                meta,
                key: map_box(key),
                value: map_box(value),
                optional,
                r#static,
                readonly,
                variance,
            }
        }
        Node::ObjectTypeIndexer { meta, id, key, value } => {
            Node::ObjectTypeIndexer { meta, id: map_opt_box(id), key: map_box(key), value: map_box(value) }
        }
        Node::ObjectTypeCallProperty { meta, value } => Node::ObjectTypeCallProperty { meta, value: map_box(value) },
        Node::TypeAlias { meta, id, type_parameters, right } => Node::TypeAlias {
            meta,
            id: map_box(id),
            type_parameters: map_opt_box(type_parameters),
            right: map_box(right),
        },
        Node::InterfaceDeclaration { meta, id, type_parameters, extends, body } => Node::InterfaceDeclaration {
            meta,
            id: map_box(id),
            type_parameters: map_opt_box(type_parameters),
            extends: map_vec(extends),
            body: map_box(body),
        },
        Node::DeclareDeclaration { meta, declaration } => {
            Node::DeclareDeclaration { meta, declaration: map_box(declaration) }
        }
        Node::TypeCastExpression { meta, expression, type_annotation } => Node::TypeCastExpression {
            meta,
            expression: map_box(expression),
            type_annotation: map_box(type_annotation),
        },
        Node::TSEnumDeclaration { meta, id, members, r#const } => {
            Node::TSEnumDeclaration { meta, id: map_box(id), members: map_vec(members), r#const }
        }
        Node::TSEnumMember { meta, id, initializer } => {
            Node::TSEnumMember { meta, id: map_box(id), initializer: map_opt_box(initializer) }
        }
        Node::TSModuleDeclaration { meta, id, body, global } => {
            Node::TSModuleDeclaration { meta, id: map_box(id), body: map_opt_box(body), global }
        }
        Node::TSMappedType { meta, type_parameter, type_annotation, readonly, optional } => Node::TSMappedType {
            meta,
            type_parameter: map_box(type_parameter),
            type_annotation: map_opt_box(type_annotation),
            readonly,
            optional,
        },
        Node::TSIndexSignature { meta, parameter, type_annotation, readonly } => Node::TSIndexSignature {
            meta,
            parameter: map_box(parameter),
            type_annotation: map_box(type_annotation),
            readonly,
        },
        Node::TSAsExpression { meta, expression, type_annotation } => Node::TSAsExpression {
            meta,
            expression: map_box(expression),
            type_annotation: map_box(type_annotation),
        },
        Node::TSTypeAssertion { meta, expression, type_annotation } => Node::TSTypeAssertion {
            meta,
            expression: map_box(expression),
            type_annotation: map_box(type_annotation),
        },
        Node::TSNonNullExpression { meta, expression } => {
            Node::TSNonNullExpression { meta, expression: map_box(expression) }
        }
        Node::TSImportEqualsDeclaration { meta, id, module_reference } => {
            Node::TSImportEqualsDeclaration { meta, id: map_box(id), module_reference: map_box(module_reference) }
        }
        Node::TSExternalModuleReference { meta, expression } => {
            Node::TSExternalModuleReference { meta, expression: map_box(expression) }
        }
        Node::TSExportAssignment { meta, expression } => {
            Node::TSExportAssignment { meta, expression: map_box(expression) }
        }
        Node::TSNamespaceExportDeclaration { meta, id } => {
            Node::TSNamespaceExportDeclaration { meta, id: map_box(id) }
        }
        // Leaves: no `Node`-typed children to recurse into.
        leaf @ (Node::DirectiveLiteral { .. }
        | Node::NumericLiteral { .. }
        | Node::BigIntLiteral { .. }
        | Node::StringLiteral { .. }
        | Node::BooleanLiteral { .. }
        | Node::NullLiteral { .. }
        | Node::RegExpLiteral { .. }
        | Node::Literal { .. }
        | Node::PrivateName { .. }
        | Node::TemplateElement(_)
        | Node::ThisExpression { .. }
        | Node::Super { .. }
        | Node::EmptyStatement { .. }
        | Node::DebuggerStatement { .. }
        | Node::JSXIdentifier { .. }
        | Node::JSXText { .. }
        | Node::JSXEmptyExpression { .. }
        | Node::KeywordTypeAnnotation { .. }
        | Node::StringLiteralTypeAnnotation { .. }
        | Node::NumberLiteralTypeAnnotation { .. }
        | Node::BooleanLiteralTypeAnnotation { .. }) => leaf,
    }
}
