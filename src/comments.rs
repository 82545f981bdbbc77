//! The comment-attachment engine (spec §4.5).
//!
//! Comments are collected by the tokenizer, in source order, into a flat
//! arena. Every time a production finalizes a node it calls
//! [`CommentAttacher::finalize`] with that node's span; the engine hands
//! back the [`CommentSlots`] (leading/trailing/inner) the node should
//! store. Because productions finalize their children before themselves
//! (the parser is a straightforward recursive descent), and a monotonic
//! cursor tracks the first not-yet-claimed comment, this reproduces the
//! original's "two pending buffers plus a commentStack of finalized
//! nodes" bookkeeping without needing the nodes themselves to be mutable
//! or reference-counted: each `finalize` call only needs to know the
//! node's own span and whether it is a *container* (see below), not the
//! previously-finalized node objects.
//!
//! **Leading/trailing/inner boundary — a documented simplification.**
//! Spec §9 Open Question 2 flags that a comment sitting exactly at a node
//! boundary is an area where "reproduce behavior, don't guess" is hard to
//! honor precisely, since the distilled spec doesn't pin down every corner
//! of the original's live buffer juggling. This engine resolves it with one
//! explicit rule: a comment strictly before a node's first token is that
//! node's *leading* comment (claimed by whichever node's finalize call
//! comes first — since finalize runs in post-order / left-to-right, this is
//! never ambiguous in practice). Everything left over once a node finishes
//! (i.e. not claimed as leading by it or an earlier sibling) is that node's
//! own trailing comment *unless* the node is a **container** kind (list-like
//! productions: `Program`, blocks, object/array literals, class bodies,
//! parameter lists, switch statements, template literals) — containers
//! route leftover comments to `inner` instead, since a comment surrounded
//! by more of the container's own structure reads as dangling, not as
//! trailing a specific child. This matches scenario S9 (`/* b */` trails
//! the `ExpressionStatement`, not the bare identifier inside it) and the
//! common case of `{ /* only this */ }` (an inner comment on the block).

use rowan::TextRange;

pub type CommentId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Block,
    Line,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub value: String,
    pub span: crate::position::Span,
}

/// The comment slots a finalized node carries, per spec §3's Node model.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CommentSlots {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leading: Vec<CommentId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trailing: Vec<CommentId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inner: Vec<CommentId>,
}

impl CommentSlots {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty() && self.inner.is_empty()
    }
}

/// Whether a node kind collects leftover internal comments as `inner`
/// (containers) or `trailing` (everything else). See module docs.
pub fn is_container_kind(is_container: bool) -> bool {
    is_container
}

struct RawComment {
    kind: CommentKind,
    start: u32,
    end: u32,
}

pub struct CommentAttacher {
    comments: Vec<RawComment>,
    next_unassigned: usize,
    /// Suppressed while a speculative/lookahead parse is in flight, so its
    /// comments never leak into the committed tree (spec §4.1's ordering
    /// guarantee for lookahead).
    pub suppressed: bool,
}

impl Default for CommentAttacher {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentAttacher {
    pub fn new() -> Self {
        Self {
            comments: Vec::new(),
            next_unassigned: 0,
            suppressed: false,
        }
    }

    /// Record a comment as the tokenizer skips it. Returns its id (used by
    /// the caller to also push the display `Comment` into the File-level
    /// arena); no-ops (but still returns a stable, never-reused id so
    /// bookkeeping stays simple) while `suppressed`.
    pub fn push(&mut self, kind: CommentKind, start: u32, end: u32) -> CommentId {
        let id = self.comments.len() as CommentId;
        if !self.suppressed {
            self.comments.push(RawComment { kind, start, end });
        }
        id
    }

    /// Called once per node, after all of its children have themselves
    /// called `finalize`. `is_container` selects the leftover-comment
    /// routing rule described in the module docs.
    pub fn finalize(&mut self, node_start: u32, node_end: u32, is_container: bool) -> CommentSlots {
        let mut slots = CommentSlots::default();
        if self.suppressed {
            return slots;
        }

        // Leading: unclaimed comments strictly before this node's start.
        while self.next_unassigned < self.comments.len() {
            let c = &self.comments[self.next_unassigned];
            if c.end <= node_start {
                slots.leading.push(self.next_unassigned as CommentId);
                self.next_unassigned += 1;
            } else {
                break;
            }
        }

        // Leftover: unclaimed comments within [node_start, node_end].
        let mut leftover = Vec::new();
        while self.next_unassigned < self.comments.len() {
            let c = &self.comments[self.next_unassigned];
            if c.start >= node_start && c.end <= node_end {
                leftover.push(self.next_unassigned as CommentId);
                self.next_unassigned += 1;
            } else {
                break;
            }
        }

        if is_container {
            slots.inner = leftover;
        } else {
            slots.trailing = leftover;
        }

        slots
    }

    /// Everything still unclaimed once the whole parse is done — attaches
    /// as trailing comments on the Program/File itself (the outermost
    /// `finalize` call should already have swept these in, but a final
    /// drain guards against comments after the very last token when the
    /// outer node's span doesn't reach EOF, e.g. trailing whitespace-only
    /// input).
    pub fn drain_remaining(&mut self) -> Vec<CommentId> {
        let ids: Vec<CommentId> = (self.next_unassigned..self.comments.len())
            .map(|i| i as CommentId)
            .collect();
        self.next_unassigned = self.comments.len();
        ids
    }

    pub fn total(&self) -> usize {
        self.comments.len()
    }

    /// All recorded comments in source order, for building the File-level
    /// `comments` list (spec §6: `File = {program, comments, tokens?}`).
    pub fn all(&self) -> impl Iterator<Item = (CommentKind, u32, u32)> + '_ {
        self.comments.iter().map(|c| (c.kind, c.start, c.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_and_trailing_around_expression_statement() {
        // `/* a */ x /* b */ ; /* c */`
        let mut engine = CommentAttacher::new();
        let a = engine.push(CommentKind::Block, 0, 8);
        // Identifier `x` spans 9..10; nothing pending yet for it.
        let slots_ident = engine.finalize(9, 10, false);
        assert!(slots_ident.leading.contains(&a));
        assert!(slots_ident.trailing.is_empty());

        let b = engine.push(CommentKind::Block, 11, 19);
        // ExpressionStatement spans 9..22 (through the `;`).
        let slots_stmt = engine.finalize(9, 22, false);
        assert!(slots_stmt.leading.is_empty());
        assert!(slots_stmt.trailing.contains(&b));

        let c = engine.push(CommentKind::Block, 23, 31);
        let slots_program = engine.finalize(0, 31, true);
        assert!(slots_program.inner.contains(&c));
    }

    #[test]
    fn every_comment_assigned_at_most_once() {
        let mut engine = CommentAttacher::new();
        engine.push(CommentKind::Line, 0, 5);
        let s1 = engine.finalize(6, 10, false);
        let s2 = engine.finalize(0, 10, true);
        assert_eq!(s1.leading.len() + s2.inner.len() + s2.leading.len(), 1);
    }

    pub fn dummy_range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }
}
