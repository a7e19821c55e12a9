//! A lightweight element tree describing the dashboard's styled regions.
//!
//! egui is immediate mode, so the tree is the retained description of what
//! the dashboard paints: each node carries a class list and an optional inline
//! style, and a [`StyleResolver`] turns that into the rendered colors.

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNode {
    pub tag: String,
    pub style_id: Option<String>,
    pub classes: Vec<String>,
    pub inline_style: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl StyleNode {
    fn new(tag: &str, classes: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            style_id: None,
            classes: classes.split_whitespace().map(str::to_string).collect(),
            inline_style: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTree {
    nodes: Vec<StyleNode>,
}

impl StyleTree {
    pub const ROOT: NodeId = 0;

    pub fn new(tag: &str, classes: &str) -> Self {
        Self {
            nodes: vec![StyleNode::new(tag, classes, None)],
        }
    }

    pub fn add_child(&mut self, parent: NodeId, tag: &str, classes: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(StyleNode::new(tag, classes, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn with_inline_style(&mut self, node: NodeId, style: &str) -> &mut Self {
        self.nodes[node].inline_style = Some(style.to_string());
        self
    }

    pub fn node(&self, id: NodeId) -> &StyleNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut StyleNode {
        &mut self.nodes[id]
    }

    pub fn root_mut(&mut self) -> &mut StyleNode {
        self.node_mut(Self::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Document order (pre-order) starting at `start`, inclusive.
    pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children().iter().rev().copied());
        }
        order
    }

    /// The regions the dashboard paints, with their utility classes.
    pub fn dashboard_layout(background: &str) -> Self {
        let mut tree = Self::new(
            "main",
            &format!("space-y-4 p-4 min-h-screen {background}"),
        );
        let root = Self::ROOT;

        let header = tree.add_child(root, "header", "flex justify-between items-center");
        tree.add_child(header, "h1", "text-2xl font-bold text-gray-900");
        tree.add_child(header, "button", "rounded-full bg-white shadow-sm border-gray-200");

        let balance = tree.add_child(
            root,
            "section",
            "bg-gradient-to-r bg-blue-600 text-white shadow-lg rounded-xl",
        );
        tree.add_child(balance, "p", "text-sm text-white/80");
        tree.add_child(balance, "h2", "text-3xl font-bold");

        let cards = tree.add_child(balance, "div", "flex gap-2 min-w-max");
        tree.with_inline_style(cards, "scrollbar-width: none");
        for accent in ["bg-yellow-500/20", "bg-blue-500/20", "bg-green-500/20", "bg-purple-500/20"] {
            tree.add_child(
                cards,
                "div",
                &format!("{accent} p-2 rounded-lg shadow-md border border-white/10"),
            );
        }

        let actions = tree.add_child(balance, "div", "flex gap-2");
        tree.add_child(actions, "button", "bg-white/90 text-blue-500 shadow-md rounded-full");
        tree.add_child(actions, "button", "bg-white/20 text-white shadow-md rounded-full");

        let wallets = tree.add_child(balance, "div", "bg-white/10 rounded-lg");
        for _ in 0..6 {
            tree.add_child(wallets, "div", "bg-white/10 rounded-lg shadow-md border border-white/10");
        }

        let rates = tree.add_child(root, "section", "bg-white shadow-md rounded-xl");
        tree.add_child(rates, "div", "bg-white border-blue-300 rounded-lg");
        tree.add_child(rates, "span", "bg-green-100 text-green-600");
        tree.add_child(rates, "span", "bg-red-100 text-red-600");

        tree
    }
}

#[cfg(test)]
impl StyleTree {
    pub fn root(&self) -> &StyleNode {
        self.node(Self::ROOT)
    }

    pub fn find_by_style_id(&self, style_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.style_id.as_deref() == Some(style_id))
    }
}

/// Rendered (computed) style of a node, rendered as CSS color strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    pub background_color: String,
    pub color: String,
    pub border_color: String,
    pub box_shadow: String,
}

pub trait StyleResolver {
    fn computed_style(&self, tree: &StyleTree, node: NodeId) -> ComputedStyle;
}
