//! Node creation and finalization (spec §2 component 8, §3 "Lifecycles").
//!
//! A node is *opened* the moment a production starts (capturing a
//! provisional start offset) and *finalized* when the production closes
//! (capturing the end offset, running the comment-attachment engine, and
//! optionally recording the `[start, end]` `range` duplicate). Productions
//! never construct a [`crate::ast::NodeMeta`] by hand; they go through
//! `NodeFactory::open`/`finish` so every node gets comment attachment and
//! range handling uniformly.

use std::sync::Arc;

use crate::ast::{ExtraFields, NodeMeta};
use crate::comments::CommentAttacher;
use crate::position::{LineIndex, Loc, Span};

/// A provisionally-opened node: just its start offset until `finish`
/// supplies the end.
#[derive(Debug, Clone, Copy)]
pub struct OpenNode {
    pub start: u32,
}

pub struct NodeFactory {
    pub comments: CommentAttacher,
    filename: Option<Arc<str>>,
    ranges: bool,
}

impl NodeFactory {
    pub fn new(filename: Option<Arc<str>>, ranges: bool) -> Self {
        Self {
            comments: CommentAttacher::new(),
            filename,
            ranges,
        }
    }

    pub fn open(&self, start: u32) -> OpenNode {
        OpenNode { start }
    }

    /// Re-parent an already-open node to an earlier start (spec §2
    /// component 8: used when a decorator or type-parameter list precedes
    /// a node whose production had already begun at the wrong offset).
    pub fn reparent_start(&self, node: OpenNode, earlier_start: u32) -> OpenNode {
        debug_assert!(earlier_start <= node.start);
        OpenNode {
            start: earlier_start,
        }
    }

    /// Finalize a node's span, running the comment-attachment engine.
    /// `is_container` is forwarded to [`CommentAttacher::finalize`] — see
    /// its module docs for the leftover-comment routing rule.
    pub fn finish(&mut self, open: OpenNode, end: u32, lines: &LineIndex, is_container: bool) -> NodeMeta {
        let span = Span {
            start: open.start,
            end,
            loc: Loc {
                start: lines.position(open.start),
                end: lines.position(end),
            },
            filename: self.filename.clone(),
        };
        let range = self.ranges.then_some((open.start, end));
        let comments = self.comments.finalize(open.start, end, is_container);
        NodeMeta {
            span,
            range,
            comments,
            extra: ExtraFields::default(),
        }
    }

    /// Shallow clone of a just-finished node's meta, minus comments (spec
    /// §2 component 8: used when a shorthand object-property key doubles
    /// as its value — the two nodes must not share comment attachments).
    pub fn shallow_clone_meta(meta: &NodeMeta) -> NodeMeta {
        NodeMeta {
            span: meta.span.clone(),
            range: meta.range,
            comments: crate::comments::CommentSlots::default(),
            extra: meta.extra.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_captures_span_and_position() {
        let mut lines = LineIndex::new(1);
        lines.advance("ab\ncd", 0);
        let mut factory = NodeFactory::new(None, false);
        let open = factory.open(3);
        let meta = factory.finish(open, 5, &lines, false);
        assert_eq!(meta.span.start, 3);
        assert_eq!(meta.span.end, 5);
        assert_eq!(meta.span.loc.start.line, 2);
    }

    #[test]
    fn ranges_option_populates_duplicate_pair() {
        let lines = LineIndex::new(1);
        let mut factory = NodeFactory::new(None, true);
        let open = factory.open(0);
        let meta = factory.finish(open, 4, &lines, false);
        assert_eq!(meta.range, Some((0, 4)));
    }
}
