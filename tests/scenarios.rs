//! End-to-end scenarios against the public `parse`/`parse_expression` API
//! (spec §8's concrete S1-S9 list plus the universal invariants and
//! boundary behaviors named alongside them).

use ecma_parser::ast::Node;
use ecma_parser::options::{Plugin, SourceType};
use ecma_parser::{parse, parse_expression, ParserOptions};

fn opts() -> ParserOptions {
    ParserOptions::default()
}

fn with_plugins(plugins: &[Plugin]) -> ParserOptions {
    ParserOptions {
        plugins: plugins.to_vec(),
        ..ParserOptions::default()
    }
}

fn only_statement(program: &Node) -> &Node {
    let Node::Program { body, .. } = program else {
        panic!("expected Program, got {}", program.tag());
    };
    assert_eq!(body.len(), 1, "expected exactly one top-level statement");
    &body[0]
}

// S1: `1 + 2 * 3` -> BinaryExpression{+, 1, BinaryExpression{*, 2, 3}}, span 0..9.
#[test]
fn s1_binary_precedence() {
    let file = parse("1 + 2 * 3", opts()).expect("parses");
    let stmt = only_statement(&file.program);
    let Node::ExpressionStatement { expression, meta } = stmt else {
        panic!("expected ExpressionStatement, got {}", stmt.tag());
    };
    assert_eq!((meta.span.start, meta.span.end), (0, 9));
    let Node::BinaryExpression { operator, left, right, .. } = expression.as_ref() else {
        panic!("expected BinaryExpression, got {}", expression.tag());
    };
    assert_eq!(*operator, "+");
    assert!(matches!(left.as_ref(), Node::NumericLiteral { value, .. } if *value == 1.0));
    let Node::BinaryExpression { operator: inner_op, left: inner_left, right: inner_right, .. } = right.as_ref() else {
        panic!("expected nested BinaryExpression, got {}", right.tag());
    };
    assert_eq!(*inner_op, "*");
    assert!(matches!(inner_left.as_ref(), Node::NumericLiteral { value, .. } if *value == 2.0));
    assert!(matches!(inner_right.as_ref(), Node::NumericLiteral { value, .. } if *value == 3.0));
}

// S2: `const [a, ...b] = x;` -> VariableDeclaration{kind:"const"} with an
// ArrayPattern{[Identifier"a", RestElement{Identifier"b"}]} id and
// Identifier"x" init.
#[test]
fn s2_array_destructuring_with_rest() {
    let file = parse("const [a, ...b] = x;", opts()).expect("parses");
    let stmt = only_statement(&file.program);
    let Node::VariableDeclaration { kind, declarations, .. } = stmt else {
        panic!("expected VariableDeclaration, got {}", stmt.tag());
    };
    assert_eq!(*kind, ecma_parser::ast::VariableKind::Const);
    assert_eq!(declarations.len(), 1);
    let Node::VariableDeclarator { id, init, .. } = &declarations[0] else {
        panic!("expected VariableDeclarator");
    };
    let Node::ArrayPattern { elements, .. } = id.as_ref() else {
        panic!("expected ArrayPattern, got {}", id.tag());
    };
    assert_eq!(elements.len(), 2);
    assert!(matches!(&elements[0], Some(Node::Identifier(id)) if id.name == "a"));
    match &elements[1] {
        Some(Node::RestElement { argument, .. }) => {
            assert!(matches!(argument.as_ref(), Node::Identifier(id) if id.name == "b"));
        }
        other => panic!("expected RestElement, got {other:?}"),
    }
    let init = init.as_ref().expect("init present");
    assert!(matches!(init.as_ref(), Node::Identifier(id) if id.name == "x"));
}

// S3: `async (x) => x` -> ExpressionStatement with
// ArrowFunctionExpression{async:true, params:[Identifier"x"], body:Identifier"x"}.
#[test]
fn s3_async_arrow() {
    let file = parse("async (x) => x", opts()).expect("parses");
    let stmt = only_statement(&file.program);
    let Node::ExpressionStatement { expression, .. } = stmt else {
        panic!("expected ExpressionStatement");
    };
    let Node::ArrowFunctionExpression { function, .. } = expression.as_ref() else {
        panic!("expected ArrowFunctionExpression, got {}", expression.tag());
    };
    assert!(function.r#async);
    assert_eq!(function.params.len(), 1);
    assert!(matches!(&function.params[0], Node::Identifier(id) if id.name == "x"));
    assert!(matches!(function.body.as_ref(), Node::Identifier(id) if id.name == "x"));
}

// S4: `` `a${1}b${2}c` `` -> quasis [a/a/false, b/b/false, c/c/true],
// expressions [1, 2].
#[test]
fn s4_template_literal_quasis() {
    let file = parse("`a${1}b${2}c`", opts()).expect("parses");
    let stmt = only_statement(&file.program);
    let Node::ExpressionStatement { expression, .. } = stmt else {
        panic!("expected ExpressionStatement");
    };
    let Node::TemplateLiteral { quasis, expressions, .. } = expression.as_ref() else {
        panic!("expected TemplateLiteral, got {}", expression.tag());
    };
    assert_eq!(quasis.len(), 3);
    let expect = [("a", false), ("b", false), ("c", true)];
    for (node, (text, tail)) in quasis.iter().zip(expect) {
        let Node::TemplateElement(el) = node else {
            panic!("expected TemplateElement");
        };
        assert_eq!(el.cooked.as_deref(), Some(text));
        assert_eq!(el.raw, text);
        assert_eq!(el.tail, tail);
    }
    assert_eq!(expressions.len(), 2);
    assert!(matches!(&expressions[0], Node::NumericLiteral { value, .. } if *value == 1.0));
    assert!(matches!(&expressions[1], Node::NumericLiteral { value, .. } if *value == 2.0));
}

// S5: `export default 42` with sourceType:"script" -> fatal error naming
// 'import'/'export' and sourceType:"module", pointing at `export`.
#[test]
fn s5_export_requires_module_source_type() {
    let err = parse("export default 42", opts()).unwrap_err();
    assert!(err.message.contains("'import' and 'export'"));
    assert!(err.message.contains("sourceType"));
    assert_eq!(err.offset, 0);
}

#[test]
fn s5_export_allowed_under_module_source_type() {
    let options = ParserOptions {
        source_type: SourceType::Module,
        ..ParserOptions::default()
    };
    parse("export default 42;", options).expect("allowed under module source type");
}

// S6: `function f() { "use strict"; var eval = 1; }` -> fatal error
// naming `eval` bound in strict mode.
#[test]
fn s6_strict_mode_rejects_eval_binding() {
    let err = parse("function f() { \"use strict\"; var eval = 1; }", opts()).unwrap_err();
    assert!(err.message.contains("eval"), "message was: {}", err.message);
    assert!(err.message.contains("strict mode"));
}

// S7: `<A attr="x">{1}</A>` with plugins=[markup] -> JSXElement with a
// JSXIdentifier"A" opening/closing name, one JSXAttribute, and one
// JSXExpressionContainer child wrapping NumericLiteral 1.
#[test]
fn s7_jsx_element() {
    let file = parse(r#"<A attr="x">{1}</A>"#, with_plugins(&[Plugin::Jsx])).expect("parses");
    let stmt = only_statement(&file.program);
    let Node::ExpressionStatement { expression, .. } = stmt else {
        panic!("expected ExpressionStatement");
    };
    let Node::JSXElement { opening_element, children, closing_element, .. } = expression.as_ref() else {
        panic!("expected JSXElement, got {}", expression.tag());
    };
    let Node::JSXOpeningElement { name, attributes, self_closing, .. } = opening_element.as_ref() else {
        panic!("expected JSXOpeningElement");
    };
    assert!(!self_closing);
    assert!(matches!(name.as_ref(), Node::JSXIdentifier { name, .. } if name == "A"));
    assert_eq!(attributes.len(), 1);
    let Node::JSXAttribute { name: attr_name, value, .. } = &attributes[0] else {
        panic!("expected JSXAttribute");
    };
    assert!(matches!(attr_name.as_ref(), Node::JSXIdentifier { name, .. } if name == "attr"));
    assert!(matches!(value.as_ref().map(|v| v.as_ref()), Some(Node::StringLiteral { value, .. }) if value == "x"));
    assert_eq!(children.len(), 1);
    let Node::JSXExpressionContainer { expression, .. } = &children[0] else {
        panic!("expected JSXExpressionContainer");
    };
    assert!(matches!(expression.as_ref(), Node::NumericLiteral { value, .. } if *value == 1.0));
    let closing = closing_element.as_ref().expect("closing element present");
    let Node::JSXClosingElement { name, .. } = closing.as_ref() else {
        panic!("expected JSXClosingElement");
    };
    assert!(matches!(name.as_ref(), Node::JSXIdentifier { name, .. } if name == "A"));
}

// S8: `let x: number = 1` with plugins=[nominal-types] -> declarator id
// Identifier"x" carrying a type annotation wrapping a keyword type `number`.
#[test]
fn s8_nominal_type_annotation() {
    let file = parse("let x: number = 1", with_plugins(&[Plugin::TypeScript])).expect("parses");
    let stmt = only_statement(&file.program);
    let Node::VariableDeclaration { declarations, .. } = stmt else {
        panic!("expected VariableDeclaration, got {}", stmt.tag());
    };
    let Node::VariableDeclarator { id, .. } = &declarations[0] else {
        panic!("expected VariableDeclarator");
    };
    let Node::Identifier(id) = id.as_ref() else {
        panic!("expected Identifier, got {}", id.tag());
    };
    assert_eq!(id.name, "x");
    id.type_annotation.as_ref().expect("type annotation present");
}

// S9: `/* a */ x /* b */ ; /* c */` -> File with three comments; the
// ExpressionStatement has leading=[block "a"], trailing=[block "b"], and
// "c" trails the Program.
#[test]
fn s9_comment_attachment() {
    let file = parse("/* a */ x /* b */ ; /* c */", opts()).expect("parses");
    assert_eq!(file.comments.len(), 3);
    for comment in &file.comments {
        assert_eq!(comment.kind, ecma_parser::comments::CommentKind::Block);
    }
    assert_eq!(file.comments[0].value, " a ");
    assert_eq!(file.comments[1].value, " b ");
    assert_eq!(file.comments[2].value, " c ");

    let stmt = only_statement(&file.program);
    let meta = stmt.meta();
    assert_eq!(meta.comments.leading, vec![0]);
    assert_eq!(meta.comments.trailing, vec![1]);

    let Node::Program { meta: program_meta, .. } = &file.program else {
        panic!("expected Program");
    };
    assert!(program_meta.comments.trailing.contains(&2) || program_meta.comments.inner.contains(&2));
}

// Boundary: empty input yields a File with an empty Program.
#[test]
fn boundary_empty_input() {
    let file = parse("", opts()).expect("parses");
    let Node::Program { body, directives, .. } = &file.program else {
        panic!("expected Program");
    };
    assert!(body.is_empty());
    assert!(directives.is_empty());
}

// Boundary: a script starting with `#!...\n` skips the hashbang line.
#[test]
fn boundary_hashbang_skipped() {
    let file = parse("#!/usr/bin/env node\n1;", opts()).expect("parses");
    let stmt = only_statement(&file.program);
    let Node::ExpressionStatement { expression, .. } = stmt else {
        panic!("expected ExpressionStatement");
    };
    assert!(matches!(expression.as_ref(), Node::NumericLiteral { value, .. } if *value == 1.0));
}

// Boundary: BigInt `0n` accepted with the plugin; `01n` rejected.
#[test]
fn boundary_bigint_literal() {
    let ok = parse("0n;", with_plugins(&[Plugin::BigInt])).expect("0n parses");
    let stmt = only_statement(&ok.program);
    assert!(matches!(stmt, Node::ExpressionStatement { .. }));

    let err = parse("01n;", with_plugins(&[Plugin::BigInt]));
    assert!(err.is_err(), "01n should be rejected");
}

// Boundary: an invalid `\u{...}` escape is accepted (cooked = null) when
// tagged, rejected when untagged.
#[test]
fn boundary_invalid_template_escape_tagged_vs_untagged() {
    let tagged = parse("tag`\\u{110000}`;", opts()).expect("tagged template accepts invalid escape");
    let stmt = only_statement(&tagged.program);
    let Node::ExpressionStatement { expression, .. } = stmt else {
        panic!("expected ExpressionStatement");
    };
    let Node::TaggedTemplateExpression { quasi, .. } = expression.as_ref() else {
        panic!("expected TaggedTemplateExpression, got {}", expression.tag());
    };
    let Node::TemplateLiteral { quasis, .. } = quasi.as_ref() else {
        panic!("expected TemplateLiteral");
    };
    let Node::TemplateElement(el) = &quasis[0] else {
        panic!("expected TemplateElement");
    };
    assert!(el.cooked.is_none());

    let untagged = parse("`\\u{110000}`;", opts());
    assert!(untagged.is_err(), "untagged template with invalid escape should be rejected");
}

// Round-trip: re-parsing the same input with the same options is
// deterministic.
#[test]
fn invariant_deterministic_reparse() {
    let input = "const x = { a: 1, b: [1, 2, 3] }; function f(a, b) { return a + b; }";
    let first = parse(input, opts()).expect("parses");
    let second = parse(input, opts()).expect("parses");
    assert_eq!(first.program, second.program);
}

// Invariant: every node's span is well-formed (start <= end) and every
// child span is contained within its parent's.
#[test]
fn invariant_span_containment() {
    fn check(node: &Node, parent: Option<(u32, u32)>) {
        let span = node.span();
        assert!(span.start <= span.end, "{}: start > end", node.tag());
        if let Some((pstart, pend)) = parent {
            assert!(
                span.start >= pstart && span.end <= pend,
                "{}: span {}..{} escapes parent {}..{}",
                node.tag(),
                span.start,
                span.end,
                pstart,
                pend
            );
        }
        visit_children(node, (span.start, span.end), &mut check);
    }

    fn visit_children(node: &Node, bounds: (u32, u32), check: &mut dyn FnMut(&Node, Option<(u32, u32)>)) {
        match node {
            Node::Program { body, directives, .. } => {
                directives.iter().chain(body.iter()).for_each(|n| check(n, Some(bounds)));
            }
            Node::ExpressionStatement { expression, .. } => check(expression, Some(bounds)),
            Node::BinaryExpression { left, right, .. } => {
                check(left, Some(bounds));
                check(right, Some(bounds));
            }
            Node::VariableDeclaration { declarations, .. } => {
                declarations.iter().for_each(|n| check(n, Some(bounds)));
            }
            Node::VariableDeclarator { id, init, .. } => {
                check(id, Some(bounds));
                if let Some(init) = init {
                    check(init, Some(bounds));
                }
            }
            Node::ObjectExpression { properties, .. } => {
                properties.iter().for_each(|n| check(n, Some(bounds)));
            }
            Node::Property(p) => {
                check(&p.key, Some(bounds));
                check(&p.value, Some(bounds));
            }
            Node::ArrayExpression { elements, .. } => {
                elements.iter().flatten().for_each(|n| check(n, Some(bounds)));
            }
            Node::FunctionDeclaration { function, .. } | Node::FunctionExpression { function, .. } => {
                if let Some(id) = &function.id {
                    check(id, Some(bounds));
                }
                function.params.iter().for_each(|n| check(n, Some(bounds)));
                check(&function.body, Some(bounds));
            }
            Node::BlockStatement { body, directives, .. } => {
                directives.iter().chain(body.iter()).for_each(|n| check(n, Some(bounds)));
            }
            Node::ReturnStatement { argument, .. } => {
                if let Some(arg) = argument {
                    check(arg, Some(bounds));
                }
            }
            _ => {}
        }
    }

    let input = "const x = { a: 1, b: [1, 2, 3] }; function f(a, b) { return a + b; }";
    let file = parse(input, opts()).expect("parses");
    check(&file.program, None);
}

// Invariant: every exported name (including `default`) appears at most
// once across the file.
#[test]
fn invariant_duplicate_export_rejected() {
    let options = ParserOptions {
        source_type: SourceType::Module,
        ..ParserOptions::default()
    };
    let err = parse("export const a = 1; export const a = 2;", options.clone());
    assert!(err.is_err());

    let err = parse("export default 1; export default 2;", options);
    assert!(err.is_err());
}

// The nominal-types dialect suppresses the duplicate-export check (spec
// §8 invariant 7's parenthetical).
#[test]
fn invariant_duplicate_export_allowed_under_typescript() {
    let options = ParserOptions {
        source_type: SourceType::Module,
        plugins: vec![Plugin::TypeScript],
        ..ParserOptions::default()
    };
    parse("export const a = 1; export const a = 2;", options).expect("suppressed under typescript");
}

// Invariant: no two parameters of the same function share a name in
// strict mode.
#[test]
fn invariant_strict_mode_rejects_duplicate_params() {
    let err = parse("function f(a, a) { \"use strict\"; }", opts());
    assert!(err.is_err());
    parse("function f(a, a) { return a; }", opts()).expect("allowed outside strict mode");
}

// `parse_expression` requires EOF afterward.
#[test]
fn parse_expression_requires_trailing_eof() {
    let expr = parse_expression("1 + 2", opts()).expect("parses");
    assert!(matches!(expr, Node::BinaryExpression { .. }));
    assert!(parse_expression("1 + 2 3", opts()).is_err());
}
