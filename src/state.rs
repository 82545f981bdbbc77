//! Mutable parser state (spec §2 component 5).
//!
//! Everything a speculative parse (the checkpoint/restore mechanism the
//! expression grammar uses for arrow-function and type-annotation
//! disambiguation) needs to snapshot and later discard or commit lives
//! here, gathered into one struct so `Parser::checkpoint`/`restore` can
//! clone and restore it wholesale instead of threading a dozen fields
//! through by hand — the same shape as the teacher's `Parser` state, just
//! carrying this grammar's flags instead of the query-language's.

use crate::context::ContextStack;
use crate::token::Token;

/// A label bound by a labeled statement, tracked so `break`/`continue` can
/// validate their target and loop-ness (spec §4.3 edge cases).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    pub name: String,
    pub is_loop: bool,
}

/// Function-scope flags that change what's legal inside a production,
/// pushed/popped around function bodies, class property initializers and
/// static blocks, and restored verbatim on speculative-parse rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFlags {
    pub in_function: bool,
    pub in_generator: bool,
    pub in_async: bool,
    /// Structural/nominal-type dialects: currently parsing a type
    /// annotation rather than a value expression.
    pub in_type: bool,
    pub in_class_property: bool,
    /// Parsing the key of a property/method (`in_property_name`): governs
    /// whether `yield`/`await` are keywords or plain identifiers there.
    pub in_property_name: bool,
    pub in_class_field_init: bool,
    pub allow_super: bool,
    pub allow_direct_super: bool,
    pub allow_new_target: bool,
}

impl Default for ScopeFlags {
    fn default() -> Self {
        Self {
            in_function: false,
            in_generator: false,
            in_async: false,
            in_type: false,
            in_class_property: false,
            in_property_name: false,
            in_class_field_init: false,
            allow_super: false,
            allow_direct_super: false,
            allow_new_target: false,
        }
    }
}

/// Everything that changes as the parser advances and must round-trip
/// through a speculative-parse checkpoint.
#[derive(Debug, Clone)]
pub struct ParserState {
    /// Byte offset the tokenizer will resume scanning from.
    pub cursor: u32,
    pub prev_token: Option<Token>,
    pub cur_token: Token,
    pub context: ContextStack,

    pub labels: Vec<LabelEntry>,
    /// Decorators parsed before a class/export but not yet attached to the
    /// declaration that follows (spec §4.4's decorator-stage handling).
    pub pending_decorators: Vec<crate::ast::Node>,
    pub scope: ScopeFlags,
    /// Nesting depth of class bodies, for `#private` name validity checks.
    pub class_level: u32,
    pub in_strict_mode: bool,
    /// Names exported so far, to reject duplicate export bindings.
    pub exported_names: Vec<String>,
    /// Set while parsing a `for (init; ...)` head, where a bare `in` must
    /// not be read as the relational operator (it would instead start a
    /// `for-in` head, handled one level up before `parse_binary` is ever
    /// entered with this flag set).
    pub no_in: bool,
    /// Every token consumed so far, recorded only when
    /// `ParserOptions::tokens` is set (spec §6). Lives here rather than on
    /// `Parser` directly so a speculative parse's tokens are discarded
    /// along with the rest of its state on rollback.
    pub recorded_tokens: Vec<Token>,
}

impl ParserState {
    pub fn new(first_token: Token) -> Self {
        Self {
            cursor: first_token.end(),
            prev_token: None,
            cur_token: first_token,
            context: ContextStack::new(),
            labels: Vec::new(),
            pending_decorators: Vec::new(),
            scope: ScopeFlags::default(),
            class_level: 0,
            in_strict_mode: false,
            exported_names: Vec::new(),
            no_in: false,
            recorded_tokens: Vec::new(),
        }
    }

    /// Cheap deep-copy checkpoint: every field here is either `Copy` or a
    /// `Vec`/struct of owned data, so `Clone` alone gives a fully
    /// independent snapshot — no shared mutable state leaks between a
    /// speculative attempt and the state it was forked from.
    pub fn checkpoint(&self) -> Self {
        self.clone()
    }

    pub fn restore(&mut self, checkpoint: Self) {
        *self = checkpoint;
    }

    pub fn in_for_init_no_in(&self) -> bool {
        self.no_in
    }

    pub fn current_label_is_loop(&self, name: &str) -> Option<bool> {
        self.labels
            .iter()
            .rev()
            .find(|l| l.name == name)
            .map(|l| l.is_loop)
    }
}
