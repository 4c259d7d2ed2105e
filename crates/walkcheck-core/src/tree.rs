//! Arena-backed syntax tree.
//!
//! A [`Tree`] owns every node of one parsed file. Nodes are addressed by
//! [`NodeId`]; parent and sibling links are plain indices into the same
//! arena, so there is no shared ownership between nodes. Checks and the
//! walker only ever see a tree through borrowed [`NodeRef`] handles, which
//! keeps the shape read-only for the duration of a walk.

use std::fmt;

use crate::tokens::TokenKind;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: TokenKind,
    text: String,
    line: usize,
    column: usize,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
}

/// An immutable syntax tree for a single file.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Returns a handle for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.index() < self.nodes.len(), "node id out of range");
        NodeRef { tree: self, id }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// A node could not be added to a [`TreeBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The parent id was not issued by this builder.
    #[error("unknown parent node {0}")]
    UnknownParent(usize),

    /// The arena ran out of node ids.
    #[error("tree exceeds {} nodes", u32::MAX)]
    TooManyNodes,
}

/// Id for the node stored at arena index `len`.
fn next_id(len: usize) -> Result<NodeId, TreeError> {
    u32::try_from(len).map(NodeId).map_err(|_| TreeError::TooManyNodes)
}

/// Builds a [`Tree`] node by node in source order.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    /// Starts a tree with its root node.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            nodes: vec![NodeData {
                kind,
                text: text.into(),
                line,
                column,
                parent: None,
                index_in_parent: 0,
                children: Vec::new(),
            }],
        }
    }

    /// Returns the id of the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a child as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if `parent` was not returned by this builder or
    /// the tree has no node ids left.
    pub fn try_child(
        &mut self,
        parent: NodeId,
        kind: TokenKind,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Result<NodeId, TreeError> {
        if parent.index() >= self.nodes.len() {
            return Err(TreeError::UnknownParent(parent.index()));
        }
        let id = next_id(self.nodes.len())?;
        let index_in_parent = self.nodes[parent.index()].children.len();
        self.nodes.push(NodeData {
            kind,
            text: text.into(),
            line,
            column,
            parent: Some(parent),
            index_in_parent,
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Appends a child as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics where [`try_child`](Self::try_child) would return an error.
    pub fn child(
        &mut self,
        parent: NodeId,
        kind: TokenKind,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> NodeId {
        match self.try_child(parent, kind, text, line, column) {
            Ok(id) => id,
            Err(e) => panic!("{e}"),
        }
    }

    /// Appends a child whose text is its kind name, the convention for
    /// structural nodes such as `OBJBLOCK` or `SLIST`.
    pub fn structural(
        &mut self,
        parent: NodeId,
        kind: TokenKind,
        line: usize,
        column: usize,
    ) -> NodeId {
        self.child(parent, kind, kind.name(), line, column)
    }

    /// Freezes the tree.
    #[must_use]
    pub fn build(self) -> Tree {
        Tree { nodes: self.nodes }
    }
}

/// A borrowed handle to one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    /// Arena id of this node.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    #[must_use]
    pub fn tree(self) -> &'t Tree {
        self.tree
    }

    /// Kind of the node.
    #[must_use]
    pub fn kind(self) -> TokenKind {
        self.tree.data(self.id).kind
    }

    /// Literal text of the node.
    #[must_use]
    pub fn text(self) -> &'t str {
        &self.tree.data(self.id).text
    }

    /// 1-based line of the introducing token.
    #[must_use]
    pub fn line(self) -> usize {
        self.tree.data(self.id).line
    }

    /// 0-based column of the introducing token.
    #[must_use]
    pub fn column(self) -> usize {
        self.tree.data(self.id).column
    }

    /// Returns true if the node has the given kind.
    #[must_use]
    pub fn is(self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.tree.data(self.id).parent.map(|id| self.with(id))
    }

    /// Children in source order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = NodeRef<'t>> + ExactSizeIterator {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// First child.
    #[must_use]
    pub fn first_child(self) -> Option<Self> {
        self.children().next()
    }

    /// Last child.
    #[must_use]
    pub fn last_child(self) -> Option<Self> {
        self.children().next_back()
    }

    /// Following sibling.
    #[must_use]
    pub fn next_sibling(self) -> Option<Self> {
        let data = self.tree.data(self.id);
        let parent = data.parent?;
        self.tree
            .data(parent)
            .children
            .get(data.index_in_parent + 1)
            .map(|&id| self.with(id))
    }

    /// Preceding sibling.
    #[must_use]
    pub fn previous_sibling(self) -> Option<Self> {
        let data = self.tree.data(self.id);
        let parent = data.parent?;
        let index = data.index_in_parent.checked_sub(1)?;
        self.tree
            .data(parent)
            .children
            .get(index)
            .map(|&id| self.with(id))
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.tree.data(self.id).children.len()
    }

    /// Number of direct children of the given kind.
    #[must_use]
    pub fn child_count_of(self, kind: TokenKind) -> usize {
        self.children().filter(|c| c.is(kind)).count()
    }

    /// Returns true if the node has any children.
    #[must_use]
    pub fn has_children(self) -> bool {
        self.child_count() > 0
    }

    /// First direct child of the given kind.
    #[must_use]
    pub fn find_first_token(self, kind: TokenKind) -> Option<Self> {
        self.children().find(|c| c.is(kind))
    }

    /// Returns true if this node or any descendant has the given kind.
    #[must_use]
    pub fn branch_contains(self, kind: TokenKind) -> bool {
        self.is(kind) || self.descendants().any(|d| d.is(kind))
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Descendants in pre-order, excluding this node.
    pub fn descendants(self) -> Descendants<'t> {
        let mut stack: Vec<NodeRef<'t>> = self.children().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Distance from the root (the root has depth 0).
    #[must_use]
    pub fn depth(self) -> usize {
        self.ancestors().count()
    }

    fn with(self, id: NodeId) -> Self {
        NodeRef {
            tree: self.tree,
            id,
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}:{}]",
            self.kind(),
            self.text(),
            self.line(),
            self.column()
        )
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'t> {
    stack: Vec<NodeRef<'t>>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().rev());
        Some(node)
    }
}
