//! Graph traversals.
//!
//! [`Graph::dfs`] is the primitive: an iterative pre-order walk with an
//! optional post-order exit callback and a context value threaded from
//! parent to child. [`Graph::traverse`], [`Graph::traverse_ancestors`],
//! [`Graph::bfs`] and the `find_*` helpers are built on top of it or follow
//! the same conventions.
//!
//! Traversals keep their own visited set rather than marking graph state,
//! so one traversal per thread is always safe and visitors may read the
//! graph freely. Visitors must not mutate the graph they are walking other
//! than through `update_node` on an already-visited node.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::adjacency::{EdgeFilter, NodeId};
use crate::graph::{EdgeKind, Graph};
use crate::{Error, Result};

/// Control handle passed to traversal visitors.
#[derive(Debug, Default)]
pub struct TraversalActions {
    stopped: bool,
    skipped: bool,
}

impl TraversalActions {
    /// Abort the whole traversal. No further visitor calls are made, not
    /// even pending exits.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Skip the subtree of the node currently being entered.
    pub fn skip_children(&mut self) {
        self.skipped = true;
    }

    fn reset(&mut self) {
        self.stopped = false;
        self.skipped = false;
    }
}

type EnterFn<'a, C> = dyn FnMut(NodeId, Option<&C>, &mut TraversalActions) -> Option<C> + 'a;
type ExitFn<'a, C> = dyn FnMut(NodeId, Option<&C>, &mut TraversalActions) + 'a;

/// A depth-first visitor: an enter callback, an exit callback, or both.
///
/// `enter` may return a new context value; it replaces the context seen by
/// the node's subtree. Returning `None` keeps the inherited context.
pub struct DfsVisitor<'a, C> {
    pub(crate) enter: Option<Box<EnterFn<'a, C>>>,
    pub(crate) exit: Option<Box<ExitFn<'a, C>>>,
}

impl<'a, C> DfsVisitor<'a, C> {
    /// Visitor with only a pre-order callback.
    pub fn enter(
        enter: impl FnMut(NodeId, Option<&C>, &mut TraversalActions) -> Option<C> + 'a,
    ) -> Self {
        DfsVisitor {
            enter: Some(Box::new(enter)),
            exit: None,
        }
    }

    /// Visitor with only a post-order callback.
    pub fn exit(exit: impl FnMut(NodeId, Option<&C>, &mut TraversalActions) + 'a) -> Self {
        DfsVisitor {
            enter: None,
            exit: Some(Box::new(exit)),
        }
    }

    /// Attach a post-order callback.
    pub fn with_exit(
        mut self,
        exit: impl FnMut(NodeId, Option<&C>, &mut TraversalActions) + 'a,
    ) -> Self {
        self.exit = Some(Box::new(exit));
        self
    }
}

/// Parameters for [`Graph::dfs`].
pub struct DfsParams<'a, C, F> {
    pub visit: DfsVisitor<'a, C>,
    /// Defaults to the graph root. An absent root with no start is an error.
    pub start_node_id: Option<NodeId>,
    pub get_children: F,
}

enum Frame<C> {
    Enter(NodeId, Option<C>),
    Exit(NodeId, Option<C>),
}

impl<N, E: EdgeKind> Graph<N, E> {
    /// Depth-first traversal with explicit child selection.
    ///
    /// Nodes are marked visited on enter and never re-entered, so cyclic
    /// graphs terminate. Returns the context at the stopping node when the
    /// visitor called [`TraversalActions::stop`], otherwise `None` after
    /// the walk completes.
    pub fn dfs<C, F>(&self, params: DfsParams<'_, C, F>) -> Result<Option<C>>
    where
        C: Clone,
        F: FnMut(NodeId) -> Vec<NodeId>,
    {
        let DfsParams {
            mut visit,
            start_node_id,
            mut get_children,
        } = params;

        let start = start_node_id
            .or(self.root_node_id)
            .ok_or(Error::MissingRoot)?;
        if !self.has_node(start) {
            return Err(Error::NodeNotFound(start));
        }

        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut actions = TraversalActions::default();
        let mut stack: Vec<Frame<C>> = vec![Frame::Enter(start, None)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Exit(node, context) => {
                    if let Some(exit) = visit.exit.as_mut() {
                        actions.reset();
                        exit(node, context.as_ref(), &mut actions);
                        if actions.stopped {
                            return Ok(context);
                        }
                    }
                }
                Frame::Enter(node, inherited) => {
                    if !visited.insert(node) {
                        continue;
                    }

                    let mut context = inherited;
                    actions.reset();
                    if let Some(enter) = visit.enter.as_mut() {
                        if let Some(new_context) = enter(node, context.as_ref(), &mut actions) {
                            context = Some(new_context);
                        }
                    }
                    if actions.stopped {
                        return Ok(context);
                    }
                    if actions.skipped {
                        continue;
                    }

                    if visit.exit.is_some() {
                        stack.push(Frame::Exit(node, context.clone()));
                    }
                    let children = get_children(node);
                    for child in children.into_iter().rev() {
                        if !visited.contains(&child) {
                            stack.push(Frame::Enter(child, context.clone()));
                        }
                    }
                }
            }
        }

        Ok(None)
    }

    /// Forward depth-first traversal: children are outbound neighbours
    /// matching `filter`.
    pub fn traverse<C: Clone>(
        &self,
        visit: DfsVisitor<'_, C>,
        start_node_id: Option<NodeId>,
        filter: &EdgeFilter<E>,
    ) -> Result<Option<C>> {
        self.dfs(DfsParams {
            visit,
            start_node_id,
            get_children: |node| self.get_node_ids_connected_from(node, filter),
        })
    }

    /// Backward depth-first traversal: children are inbound neighbours.
    pub fn traverse_ancestors<C: Clone>(
        &self,
        start_node_id: Option<NodeId>,
        visit: DfsVisitor<'_, C>,
        filter: &EdgeFilter<E>,
    ) -> Result<Option<C>> {
        self.dfs(DfsParams {
            visit,
            start_node_id,
            get_children: |node| self.get_node_ids_connected_to(node, filter),
        })
    }

    /// Breadth-first traversal from the root across every edge type.
    ///
    /// Returns the first node for which the visitor returns `true`.
    pub fn bfs(&self, mut visit: impl FnMut(NodeId) -> bool) -> Result<Option<NodeId>> {
        let root = self.root_node_id.ok_or(Error::MissingRoot)?;

        let mut queue = VecDeque::from([root]);
        let mut visited: FxHashSet<NodeId> = FxHashSet::from_iter([root]);
        while let Some(node) = queue.pop_front() {
            if visit(node) {
                return Ok(Some(node));
            }
            for child in self.raw_nodes_connected_from(node) {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        Ok(None)
    }

    /// First ancestor (including `start`) matching the predicate.
    pub fn find_ancestor(
        &self,
        start: NodeId,
        mut predicate: impl FnMut(NodeId) -> bool,
    ) -> Result<Option<NodeId>> {
        let mut found = None;
        self.traverse_ancestors::<()>(
            Some(start),
            DfsVisitor::enter(|node, _, actions| {
                if predicate(node) {
                    found = Some(node);
                    actions.stop();
                }
                None
            }),
            &EdgeFilter::All,
        )?;
        Ok(found)
    }

    /// All ancestors (including `start`) matching the predicate, in
    /// traversal order.
    pub fn find_ancestors(
        &self,
        start: NodeId,
        mut predicate: impl FnMut(NodeId) -> bool,
    ) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        self.traverse_ancestors::<()>(
            Some(start),
            DfsVisitor::enter(|node, _, _| {
                if predicate(node) {
                    found.push(node);
                }
                None
            }),
            &EdgeFilter::All,
        )?;
        Ok(found)
    }

    /// First descendant (including `start`) matching the predicate.
    pub fn find_descendant(
        &self,
        start: NodeId,
        mut predicate: impl FnMut(NodeId) -> bool,
    ) -> Result<Option<NodeId>> {
        let mut found = None;
        self.traverse::<()>(
            DfsVisitor::enter(|node, _, actions| {
                if predicate(node) {
                    found = Some(node);
                    actions.stop();
                }
                None
            }),
            Some(start),
            &EdgeFilter::All,
        )?;
        Ok(found)
    }

    /// All descendants (including `start`) matching the predicate, in
    /// traversal order.
    pub fn find_descendants(
        &self,
        start: NodeId,
        mut predicate: impl FnMut(NodeId) -> bool,
    ) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        self.traverse::<()>(
            DfsVisitor::enter(|node, _, _| {
                if predicate(node) {
                    found.push(node);
                }
                None
            }),
            Some(start),
            &EdgeFilter::All,
        )?;
        Ok(found)
    }
}
