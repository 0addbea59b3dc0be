//! The generic tagged tree value.
//!
//! Grammar-compiled parsers all produce this one shape: a tag naming the
//! rule path that produced the node, the matched text for leaves (internal
//! nodes carry empty contents by convention), the source position, and an
//! ordered list of children.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::State;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ast {
    pub tag: String,
    pub contents: String,
    #[serde(default)]
    pub state: State,
    pub children: Vec<Ast>,
}

impl Ast {
    pub fn new(tag: &str, contents: &str) -> Ast {
        Ast {
            tag: tag.to_string(),
            contents: contents.to_string(),
            state: State::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(tag: &str, children: Vec<Ast>) -> Ast {
        let mut ast = Ast::new(tag, "");
        ast.children = children;
        ast
    }

    pub fn add_child(&mut self, child: Ast) {
        self.children.push(child);
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_string();
    }

    /// Prefix the tag with `name|`.
    pub fn add_tag(&mut self, name: &str) {
        self.tag = format!("{}|{}", name, self.tag);
    }

    /// Prefix the tag with `name`, or set it outright when still untagged.
    pub fn prefix_tag(&mut self, name: &str) {
        if self.tag.is_empty() {
            self.set_tag(name);
        } else {
            self.add_tag(name);
        }
    }

    /// Prefix a collapsing container's tag onto this node, dropping the
    /// container marker: a parent tagged `name|>` contributes `name|`, the
    /// untagged container `>` contributes nothing.
    pub fn add_root_tag(&mut self, container_tag: &str) {
        let mut prefix = container_tag.to_string();
        prefix.pop();
        if !prefix.is_empty() {
            self.tag = format!("{}{}", prefix, self.tag);
        }
    }

    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Promote to a synthetic untagged root; nodes with fewer than two
    /// children pass through unchanged.
    pub fn add_root(self) -> Ast {
        if self.children.len() >= 2 {
            Ast::with_children(">", vec![self])
        } else {
            self
        }
    }

    /// Structural equality, ignoring source positions.
    pub fn eq_ignoring_state(&self, other: &Ast) -> bool {
        self.tag == other.tag
            && self.contents == other.contents
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.eq_ignoring_state(b))
    }

    pub fn index_by_tag(&self, tag: &str) -> Option<usize> {
        self.index_by_tag_from(tag, 0)
    }

    pub fn index_by_tag_from(&self, tag: &str, from: usize) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, c)| c.tag == tag)
            .map(|(i, _)| i)
    }

    pub fn child_by_tag(&self, tag: &str) -> Option<&Ast> {
        self.child_by_tag_from(tag, 0)
    }

    pub fn child_by_tag_from(&self, tag: &str, from: usize) -> Option<&Ast> {
        self.index_by_tag_from(tag, from).map(|i| &self.children[i])
    }

    /// Pre-order traversal.
    pub fn iter(&self) -> AstIter<'_> {
        AstIter { stack: vec![self] }
    }

    /// Indented rendering: `tag:row:col 'contents'` for leaves with text,
    /// bare tags otherwise.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_depth(0, &mut out);
        out
    }

    fn render_depth(&self, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        if self.contents.is_empty() {
            out.push_str(&format!("{} \n", self.tag));
        } else {
            out.push_str(&format!(
                "{}:{}:{} '{}'\n",
                self.tag,
                self.state.line(),
                self.state.column(),
                self.contents
            ));
        }
        for child in &self.children {
            child.render_depth(depth + 1, out);
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

pub struct AstIter<'a> {
    stack: Vec<&'a Ast>,
}

impl<'a> Iterator for AstIter<'a> {
    type Item = &'a Ast;

    fn next(&mut self) -> Option<&'a Ast> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
