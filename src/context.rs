//! The lexical context stack (spec §2 component 3, §4.1 "Context stack").
//!
//! A stack of named contexts disambiguates tokens whose meaning depends on
//! surrounding syntactic position: whether `{` opens a statement block or an
//! object expression, whether `/` starts a regex or divides, whether `}`
//! closes a template quasi or an ordinary block. Each token kind's
//! "updateContext" behavior is a pure function of `(kind, prev_kind,
//! context_stack)` dispatched by `match` — see the module doc in
//! `token.rs` for why this replaces the original's load-time registry
//! mutation.

use crate::token::TokenKind;

/// A named entry on the context stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokContext {
    /// `{` opening a statement block (`exprAllowed` becomes true inside).
    BraceStatement,
    /// `{` opening an object/expression brace (`exprAllowed` becomes false).
    BraceExpression,
    /// A `function` keyword seen where it parses as an expression, not a
    /// declaration — popped alongside the brace it precedes.
    FunctionExpression,
    /// Inside a template literal's raw-text chunk.
    TemplateQuasi,
    /// Inside a `${ ... }` interpolation within a template.
    TemplateExpression,
    /// Markup dialect: inside `<Name ...` up to the matching `>`.
    MarkupOpenTag,
    /// Markup dialect: inside `</Name>`.
    MarkupCloseTag,
    /// Markup dialect: the implicit wrapper context entered before an
    /// element so the lexer knows `<` at this position starts an element.
    MarkupExpression,
}

impl TokContext {
    /// Whether code immediately following the popped frame is a JS
    /// expression position (only meaningful for brace-like frames).
    fn is_expr(self) -> bool {
        matches!(
            self,
            TokContext::BraceExpression
                | TokContext::TemplateExpression
                | TokContext::FunctionExpression
                | TokContext::MarkupExpression
        )
    }
}

/// The tokenizer-owned context stack plus the `exprAllowed` flag it
/// maintains. Cloned wholesale on speculative-parse snapshot (see
/// `state.rs`) — it's small (bounded by nesting depth) so this is cheap.
#[derive(Debug, Clone)]
pub struct ContextStack {
    stack: Vec<TokContext>,
    /// True when the lexer should prefer an expression-starting
    /// interpretation (regex literal over division, etc.) at the current
    /// position.
    pub expr_allowed: bool,
}

impl Default for ContextStack {
    fn default() -> Self {
        Self {
            stack: vec![TokContext::BraceStatement],
            expr_allowed: true,
        }
    }
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<TokContext> {
        self.stack.last().copied()
    }

    pub fn push(&mut self, ctx: TokContext) {
        self.stack.push(ctx);
    }

    pub fn pop(&mut self) -> Option<TokContext> {
        self.stack.pop()
    }

    pub fn in_template(&self) -> bool {
        matches!(
            self.current(),
            Some(TokContext::TemplateQuasi) | Some(TokContext::TemplateExpression)
        )
    }

    /// True only in a template's raw-text chunk, not inside a `${ ... }`
    /// interpolation (which tokenizes like any other expression).
    pub fn in_template_quasi(&self) -> bool {
        matches!(self.current(), Some(TokContext::TemplateQuasi))
    }

    /// `{` at statement-start position (as opposed to expression position)
    /// opens a block, not an object literal. Mirrors the original's
    /// `braceIsBlock`.
    pub fn brace_is_block(&self, prev: Option<TokenKind>) -> bool {
        match prev {
            None => true,
            Some(TokenKind::KwElse | TokenKind::Semi | TokenKind::BraceR) => true,
            Some(TokenKind::ParenR) => true, // approximation: `if (x) {`
            Some(TokenKind::BraceL) => matches!(self.current(), Some(TokContext::BraceStatement)),
            Some(kind) => !kind.info().before_expr,
        }
    }

    /// Run the context-update hook for a just-emitted token. `prev` is the
    /// kind of the token before it (`None` at start of input); `prev_text`
    /// is its exact spelling, needed only to recognize the contextual `let`
    /// keyword (which lexes as a plain `Name`, not a dedicated `TokenKind`).
    pub fn update_context(
        &mut self,
        kind: TokenKind,
        prev: Option<TokenKind>,
        prev_text: Option<&str>,
        line_break_before: bool,
    ) {
        match kind {
            TokenKind::BraceL => {
                let statement = self.brace_is_block(prev);
                self.push(if statement {
                    TokContext::BraceStatement
                } else {
                    TokContext::BraceExpression
                });
                self.expr_allowed = true;
            }
            TokenKind::BraceR => {
                let popped = self.pop();
                // A function-expression frame sits just inside the brace
                // that follows it; pop it too once its brace closes.
                if matches!(self.current(), Some(TokContext::FunctionExpression)) {
                    self.pop();
                }
                if matches!(popped, Some(TokContext::TemplateExpression)) {
                    // `}` closing a `${ ... }` returns to the template's raw
                    // text, not to an arbitrary enclosing expression.
                    self.push(TokContext::TemplateQuasi);
                    self.expr_allowed = false;
                } else {
                    self.expr_allowed = popped.map(TokContext::is_expr).unwrap_or(true);
                }
            }
            TokenKind::ParenL => {
                self.expr_allowed = true;
            }
            TokenKind::ParenR => {
                self.expr_allowed = false;
            }
            TokenKind::Backtick => {
                if matches!(self.current(), Some(TokContext::TemplateQuasi)) {
                    self.pop();
                } else {
                    self.push(TokContext::TemplateQuasi);
                }
                self.expr_allowed = false;
            }
            // A template chunk's context transition depends on whether it is
            // the tail chunk (closing backtick baked into its span) or a
            // middle chunk (trailing `${` baked into its span); the caller
            // routes these through `update_context_template` instead, since
            // plain `TokenKind` doesn't carry that distinction.
            TokenKind::Template => {}
            TokenKind::KwFunction => {
                if prev.map(|p| p.info().before_expr).unwrap_or(false)
                    && !matches!(self.current(), Some(TokContext::BraceStatement))
                {
                    self.push(TokContext::FunctionExpression);
                }
                self.expr_allowed = false;
            }
            TokenKind::Name => {
                // ASI corner: `let`/`const`/`var` followed by a line break
                // before a name must still allow an expression next (the
                // declarator's initializer), matching the original.
                let after_decl_keyword =
                    matches!(prev, Some(TokenKind::KwConst | TokenKind::KwVar)) || prev_text == Some("let");
                self.expr_allowed = after_decl_keyword && line_break_before;
            }
            other => {
                self.expr_allowed = other.info().before_expr;
            }
        }
    }

    /// Context transition for a just-lexed template chunk, driven by its
    /// `tail` flag (not recoverable from `TokenKind` alone). A middle chunk
    /// swaps the quasi frame for an expression frame so the interpolation
    /// tokenizes normally; a tail chunk (closing backtick baked into its
    /// span) leaves the template context entirely.
    pub fn update_context_template(&mut self, tail: bool) {
        if matches!(self.current(), Some(TokContext::TemplateQuasi)) {
            self.pop();
            if !tail {
                self.push(TokContext::TemplateExpression);
            }
        }
        self.expr_allowed = !tail;
    }

    // --- markup (JSX) dialect context transitions ---

    pub fn enter_markup_expression(&mut self) {
        self.push(TokContext::MarkupExpression);
        self.expr_allowed = false;
    }

    pub fn enter_markup_open_tag(&mut self) {
        self.push(TokContext::MarkupOpenTag);
        self.expr_allowed = false;
    }

    pub fn enter_markup_close_tag(&mut self) {
        self.push(TokContext::MarkupCloseTag);
        self.expr_allowed = false;
    }

    /// `>` closes an open/close tag context; a self-closing `/>` closes both
    /// the tag and its implicit markup-expression wrapper (caller pops
    /// twice in that case).
    pub fn exit_markup_tag(&mut self) {
        if matches!(
            self.current(),
            Some(TokContext::MarkupOpenTag) | Some(TokContext::MarkupCloseTag)
        ) {
            self.pop();
        }
        self.expr_allowed = true;
    }

    pub fn exit_markup_expression(&mut self) {
        if matches!(self.current(), Some(TokContext::MarkupExpression)) {
            self.pop();
        }
    }

    pub fn in_markup_tag(&self) -> bool {
        matches!(
            self.current(),
            Some(TokContext::MarkupOpenTag) | Some(TokContext::MarkupCloseTag)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_after_paren_opens_block() {
        let ctx = ContextStack::new();
        assert!(ctx.brace_is_block(Some(TokenKind::ParenR)));
    }

    #[test]
    fn brace_after_operator_is_expression() {
        let ctx = ContextStack::new();
        assert!(!ctx.brace_is_block(Some(TokenKind::Eq)));
    }

    #[test]
    fn template_context_toggles_on_backtick() {
        let mut ctx = ContextStack::new();
        assert!(!ctx.in_template());
        ctx.update_context(TokenKind::Backtick, None, None, false);
        assert!(ctx.in_template());
        ctx.update_context(TokenKind::Backtick, Some(TokenKind::Template), None, false);
        assert!(!ctx.in_template());
    }
}
