//! Control-flow graph over lowered bodies.
//!
//! Uses `petgraph::StableDiGraph` with:
//! - Nodes: [`BasicBlock`]s, plus a synthetic start and end block
//! - Edges: [`FlowEdge`], either unconditional or taken when a condition
//!   evaluates to a given value
//!
//! A block ends right after a goto and right before a label. Conditional
//! gotos with a constant condition keep only the edge that can be taken.
//! Blocks without predecessors are pruned until none remain.

use std::fmt::Write;

use ember_core::{ConstantValue, InternalError, SymbolTable};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use rustc_hash::FxHashMap;

use crate::labels::BoundLabel;
use crate::typed::{Body, Expr, Printer, Stmt};

/// Role of a block in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Start,
    End,
    Body,
}

/// A maximal run of statements with no branch target inside it.
#[derive(Debug, Clone)]
pub struct BasicBlock<'a> {
    pub kind: BlockKind,
    pub statements: Vec<&'a Stmt>,
}

impl<'a> BasicBlock<'a> {
    fn synthetic(kind: BlockKind) -> Self {
        Self {
            kind,
            statements: Vec::new(),
        }
    }

    /// The statement control leaves the block through.
    pub fn terminator(&self) -> Option<&'a Stmt> {
        self.statements.last().copied()
    }
}

/// An edge between two blocks.
#[derive(Debug, Clone, Copy)]
pub enum FlowEdge<'a> {
    Always,
    /// Taken when `condition` evaluates to `value`.
    When { condition: &'a Expr, value: bool },
}

/// The control-flow graph of one lowered body.
pub struct ControlFlowGraph<'a> {
    graph: StableDiGraph<BasicBlock<'a>, FlowEdge<'a>>,
    start: NodeIndex,
    end: NodeIndex,
}

impl<'a> ControlFlowGraph<'a> {
    /// Build the graph of a lowered body.
    ///
    /// A jump to a label the body does not define is an internal error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(body: &'a Body) -> Result<Self, InternalError> {
        let mut graph = StableDiGraph::new();
        let start = graph.add_node(BasicBlock::synthetic(BlockKind::Start));
        let end = graph.add_node(BasicBlock::synthetic(BlockKind::End));

        let nodes: Vec<NodeIndex> = partition(body)
            .into_iter()
            .map(|statements| {
                graph.add_node(BasicBlock {
                    kind: BlockKind::Body,
                    statements,
                })
            })
            .collect();

        let mut labels: FxHashMap<&BoundLabel, NodeIndex> = FxHashMap::default();
        for &node in &nodes {
            if let Some(Stmt::Label(label)) = graph[node].statements.first().copied() {
                labels.insert(label, node);
            }
        }
        let target = |label: &BoundLabel| {
            labels.get(label).copied().ok_or_else(|| InternalError::Invariant {
                message: format!("jump to undefined label {}", label),
            })
        };

        graph.add_edge(start, nodes.first().copied().unwrap_or(end), FlowEdge::Always);

        for (i, &node) in nodes.iter().enumerate() {
            let next = nodes.get(i + 1).copied().unwrap_or(end);
            match graph[node].terminator() {
                Some(Stmt::Goto(label)) => {
                    graph.add_edge(node, target(label)?, FlowEdge::Always);
                }
                Some(Stmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                }) => {
                    let branch = target(label)?;
                    match &condition.constant {
                        Some(ConstantValue::Bool(value)) => {
                            let to = if value == jump_if_true { branch } else { next };
                            graph.add_edge(node, to, FlowEdge::Always);
                        }
                        _ => {
                            graph.add_edge(
                                node,
                                branch,
                                FlowEdge::When {
                                    condition,
                                    value: *jump_if_true,
                                },
                            );
                            graph.add_edge(
                                node,
                                next,
                                FlowEdge::When {
                                    condition,
                                    value: !*jump_if_true,
                                },
                            );
                        }
                    }
                }
                _ => {
                    graph.add_edge(node, next, FlowEdge::Always);
                }
            }
        }

        let mut cfg = Self { graph, start, end };
        cfg.prune();
        Ok(cfg)
    }

    fn prune(&mut self) {
        loop {
            let dead: Vec<NodeIndex> = self
                .graph
                .node_indices()
                .filter(|&n| n != self.start && n != self.end)
                .filter(|&n| {
                    self.graph
                        .neighbors_directed(n, Direction::Incoming)
                        .next()
                        .is_none()
                })
                .collect();
            if dead.is_empty() {
                break;
            }
            for node in dead {
                self.graph.remove_node(node);
            }
        }
    }

    /// Number of blocks, including start and end.
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock<'a>> + '_ {
        self.graph.node_indices().map(|n| &self.graph[n])
    }

    /// Whether every path reaching the end produces a value.
    ///
    /// Each direct predecessor of the end block must finish with an
    /// expression statement.
    pub fn all_paths_return(&self) -> bool {
        self.graph
            .neighbors_directed(self.end, Direction::Incoming)
            .all(|pred| {
                let block = &self.graph[pred];
                block.kind == BlockKind::Body
                    && matches!(block.terminator(), Some(Stmt::Expression(_)))
            })
    }

    /// Render the graph in Graphviz `dot` syntax.
    pub fn to_dot(&self, table: &SymbolTable) -> String {
        let printer = Printer::new(table);
        let mut out = String::from("digraph G {\n");
        for node in self.graph.node_indices() {
            let block = &self.graph[node];
            let label = match block.kind {
                BlockKind::Start => "<Start>".to_string(),
                BlockKind::End => "<End>".to_string(),
                BlockKind::Body => block
                    .statements
                    .iter()
                    .map(|stmt| printer.stmt(stmt))
                    .collect::<Vec<_>>()
                    .join("\\l"),
            };
            let _ = writeln!(
                out,
                "    N{} [label=\"{}\" shape=box]",
                node.index(),
                label.replace('"', "\\\"")
            );
        }
        for edge in self.graph.edge_references() {
            let _ = write!(out, "    N{} -> N{}", edge.source().index(), edge.target().index());
            if let FlowEdge::When { condition, value } = edge.weight() {
                let condition = printer.expr(condition).replace('"', "\\\"");
                let text = if *value {
                    condition
                } else {
                    format!("not {}", condition)
                };
                let _ = write!(out, " [label=\"{}\"]", text);
            }
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

/// Split statements into maximal basic blocks.
fn partition(body: &Body) -> Vec<Vec<&Stmt>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for stmt in &body.statements {
        match stmt {
            Stmt::Label(_) => {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                current.push(stmt);
            }
            Stmt::Goto(_) | Stmt::ConditionalGoto { .. } => {
                current.push(stmt);
                blocks.push(std::mem::take(&mut current));
            }
            _ => current.push(stmt),
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}
