use crate::commands::{
    context::ExecutionContext,
    error::CommandResult,
    spec::{NodeDescriptor, SpecReader},
};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

pub type Executor<E> = dyn Fn(&mut ExecutionContext<'_, E>) -> CommandResult<()> + Send + Sync;

/// A callable bound to a tree node, along with the number of positional
/// arguments it declares. Missing trailing arguments are padded with
/// [`Value::Null`](crate::commands::Value::Null).
pub struct Handler<E> {
    arity: usize,
    executor: Arc<Executor<E>>,
}

impl<E> Handler<E> {
    pub fn new<F>(arity: usize, executor: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_, E>) -> CommandResult<()> + Send + Sync + 'static,
    {
        Self {
            arity,
            executor: Arc::new(executor),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(super) fn invoke(&self, ctx: &mut ExecutionContext<'_, E>) -> CommandResult<()> {
        (self.executor)(ctx)
    }
}

impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self {
            arity: self.arity,
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler(arity={})", self.arity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Execute,
    /// Runs when the matched path dead-ends at or below this node.
    Default,
    Error,
}

struct NodeHandlers<E> {
    execute: Option<Handler<E>>,
    default: Option<Handler<E>>,
    error: Option<Handler<E>>,
}

impl<E> Default for NodeHandlers<E> {
    fn default() -> Self {
        Self {
            execute: None,
            default: None,
            error: None,
        }
    }
}

impl<E> NodeHandlers<E> {
    fn slot(&self, kind: HandlerKind) -> Option<&Handler<E>> {
        match kind {
            HandlerKind::Execute => self.execute.as_ref(),
            HandlerKind::Default => self.default.as_ref(),
            HandlerKind::Error => self.error.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: HandlerKind) -> &mut Option<Handler<E>> {
        match kind {
            HandlerKind::Execute => &mut self.execute,
            HandlerKind::Default => &mut self.default,
            HandlerKind::Error => &mut self.error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
pub struct ArgNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    descriptor: Option<NodeDescriptor>,
}

impl ArgNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn descriptor(&self) -> Option<&NodeDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

pub struct ArgTree<E> {
    nodes: Vec<ArgNode>,
    handlers: FxHashMap<NodeId, NodeHandlers<E>>,
}

impl<E> Default for ArgTree<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ArgTree<E> {
    pub fn new() -> Self {
        Self {
            nodes: vec![ArgNode {
                parent: None,
                children: Vec::new(),
                descriptor: None,
            }],
            handlers: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &ArgNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ArgNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn descriptor(&self, id: NodeId) -> Option<&NodeDescriptor> {
        self.node(id).descriptor.as_ref()
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).parent;
        }
        depth
    }

    pub fn find_child(&self, parent: NodeId, descriptor: &NodeDescriptor) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.descriptor(child) == Some(descriptor))
    }

    fn add_child(&mut self, parent: NodeId, descriptor: NodeDescriptor) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ArgNode {
            parent: Some(parent),
            children: Vec::new(),
            descriptor: Some(descriptor),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Merges `path` below `at`, reusing children whose names match, and
    /// returns the leaves reached. A segment with several alternatives fans
    /// the frontier out, so the result is the cartesian product of all
    /// alternatives.
    pub fn insert(&mut self, at: NodeId, path: &str) -> Vec<NodeId> {
        let mut current = vec![at];

        for segment in SpecReader::new(path) {
            let mut next = Vec::with_capacity(current.len() * segment.len());
            for &node in &current {
                for descriptor in &segment {
                    let child = match self.find_child(node, descriptor) {
                        Some(existing) => existing,
                        None => self.add_child(node, descriptor.clone()),
                    };
                    next.push(child);
                }
            }
            current = next;
        }

        current
    }

    pub fn bind(&mut self, node: NodeId, kind: HandlerKind, handler: Handler<E>) {
        *self.handlers.entry(node).or_default().slot_mut(kind) = Some(handler);
    }

    pub fn handler(&self, node: NodeId, kind: HandlerKind) -> Option<&Handler<E>> {
        self.handlers.get(&node).and_then(|handlers| handlers.slot(kind))
    }

    pub fn walk_tree(&self) -> String {
        let mut out = String::new();
        self.walk_node(self.root(), 0, &mut out);
        out
    }

    fn walk_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let label = match self.descriptor(id) {
            Some(descriptor) => descriptor.to_string(),
            None => "<root>".to_string(),
        };
        let flags = [
            (HandlerKind::Execute, "execute"),
            (HandlerKind::Default, "default"),
            (HandlerKind::Error, "error"),
        ]
        .into_iter()
        .filter(|(kind, _)| self.handler(id, *kind).is_some())
        .map(|(_, name)| name)
        .collect::<Vec<_>>();

        out.push_str(&" ".repeat(depth));
        out.push_str(&label);
        if !flags.is_empty() {
            out.push_str(&format!(" [{}]", flags.join(", ")));
        }
        out.push('\n');

        for &child in self.children(id) {
            self.walk_node(child, depth + 1, out);
        }
    }
}
