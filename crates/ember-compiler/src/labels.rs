//! Jump labels for structured control flow.
//!
//! Loop labels are handed out by a [`LabelGenerator`] threaded through the
//! binding context; the [`LoopStack`] tracks which pair `break` and
//! `continue` refer to while a loop body is being bound.

use std::fmt;
use std::sync::Arc;

/// An opaque, unique jump target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundLabel(Arc<str>);

impl BoundLabel {
    /// Create a label with the given name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The label's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The `break` and `continue` targets of one loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopLabels {
    /// Jump target just past the loop.
    pub break_label: BoundLabel,
    /// Jump target that starts the next iteration.
    pub continue_label: BoundLabel,
}

/// Monotonic label counter for one binding run.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    next: u32,
}

impl LabelGenerator {
    /// Create a generator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh `break{n}`/`continue{n}` pair.
    pub fn next_loop(&mut self) -> LoopLabels {
        let n = self.next;
        self.next += 1;
        LoopLabels {
            break_label: BoundLabel::new(format!("break{}", n)),
            continue_label: BoundLabel::new(format!("continue{}", n)),
        }
    }
}

/// Stack of enclosing loops, innermost last.
#[derive(Debug, Default)]
pub struct LoopStack {
    loops: Vec<LoopLabels>,
}

impl LoopStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a loop body.
    pub fn push(&mut self, labels: LoopLabels) {
        self.loops.push(labels);
    }

    /// Leave the innermost loop body.
    pub fn pop(&mut self) -> Option<LoopLabels> {
        self.loops.pop()
    }

    /// Target of `break` in the innermost loop.
    pub fn break_label(&self) -> Option<&BoundLabel> {
        self.loops.last().map(|l| &l.break_label)
    }

    /// Target of `continue` in the innermost loop.
    pub fn continue_label(&self) -> Option<&BoundLabel> {
        self.loops.last().map(|l| &l.continue_label)
    }

    /// Current loop nesting depth.
    pub fn depth(&self) -> usize {
        self.loops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique_per_run() {
        let mut labels = LabelGenerator::new();
        let first = labels.next_loop();
        let second = labels.next_loop();
        assert_eq!(first.break_label.name(), "break0");
        assert_eq!(first.continue_label.name(), "continue0");
        assert_eq!(second.break_label.name(), "break1");
        assert_ne!(first.break_label, second.break_label);
    }

    #[test]
    fn empty_stack_has_no_targets() {
        let stack = LoopStack::new();
        assert!(stack.break_label().is_none());
        assert!(stack.continue_label().is_none());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn nested_loops_bind_innermost() {
        let mut labels = LabelGenerator::new();
        let mut stack = LoopStack::new();
        stack.push(labels.next_loop());
        stack.push(labels.next_loop());

        assert_eq!(stack.break_label().unwrap().name(), "break1");
        stack.pop();
        assert_eq!(stack.continue_label().unwrap().name(), "continue0");
        assert_eq!(stack.depth(), 1);
    }
}
