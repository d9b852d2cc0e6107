//! The decision tree produced by a completed search: a flat `Vec<TreeNode>`
//! arena where children are referenced by index, `0` doubling as "no child"
//! since the root always occupies slot `0`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NodeInfos {
    pub test: Option<usize>,
    pub error: f64,
    pub out: Option<usize>,
}

impl Default for NodeInfos {
    fn default() -> Self {
        NodeInfos::new()
    }
}

impl NodeInfos {
    pub fn new() -> NodeInfos {
        NodeInfos {
            test: None,
            error: f64::INFINITY,
            out: None,
        }
    }
}

#[derive(Copy, Clone, Serialize, Deserialize, Debug, Default)]
pub struct TreeNode {
    pub value: NodeInfos,
    pub index: usize,
    pub left: usize,
    pub right: usize,
}

impl TreeNode {
    pub fn new(value: NodeInfos) -> TreeNode {
        TreeNode {
            value,
            index: 0,
            left: 0,
            right: 0,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Tree {
    tree: Vec<TreeNode>,
}

impl Tree {
    pub fn new() -> Self {
        Tree { tree: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn add_node(&mut self, parent: usize, is_left: bool, mut node: TreeNode) -> usize {
        node.index = self.tree.len();
        self.tree.push(node);
        let position = self.tree.len() - 1;
        if position == 0 {
            return position;
        }
        if let Some(parent_node) = self.tree.get_mut(parent) {
            if is_left {
                parent_node.left = position;
            } else {
                parent_node.right = position;
            }
        }
        position
    }

    pub fn add_root(&mut self, root: TreeNode) -> usize {
        self.add_node(0, false, root)
    }

    pub fn add_left_node(&mut self, parent: usize, node: TreeNode) -> usize {
        self.add_node(parent, true, node)
    }

    pub fn add_right_node(&mut self, parent: usize, node: TreeNode) -> usize {
        self.add_node(parent, false, node)
    }

    pub fn get_root_index(&self) -> usize {
        0
    }

    pub fn get_node(&self, index: usize) -> Option<&TreeNode> {
        self.tree.get(index)
    }

    pub fn get_node_mut(&mut self, index: usize) -> Option<&mut TreeNode> {
        self.tree.get_mut(index)
    }

    pub fn get_left_child(&self, node: &TreeNode) -> Option<&TreeNode> {
        if node.left == 0 {
            None
        } else {
            self.tree.get(node.left)
        }
    }

    pub fn get_right_child(&self, node: &TreeNode) -> Option<&TreeNode> {
        if node.right == 0 {
            None
        } else {
            self.tree.get(node.right)
        }
    }

    pub fn print(&self) {
        let mut stack: Vec<(usize, Option<&TreeNode>)> = Vec::new();
        stack.push((0, self.get_node(self.get_root_index())));
        while let Some((depth, node_opt)) = stack.pop() {
            if let Some(node) = node_opt {
                for _ in 0..depth {
                    print!("    ");
                }
                println!("----{:?}", node.value);
                stack.push((depth + 1, self.get_right_child(node)));
                stack.push((depth + 1, self.get_left_child(node)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_starts_empty() {
        let tree = Tree::default();
        assert!(tree.is_empty());
    }

    #[test]
    fn add_root_occupies_slot_zero() {
        let mut tree = Tree::new();
        let root = tree.add_root(TreeNode::new(NodeInfos::default()));
        assert_eq!(root, 0);
        assert_eq!(tree.get_root_index(), 0);
    }

    #[test]
    fn children_are_reachable_from_parent() {
        let mut tree = Tree::new();
        let root = tree.add_root(TreeNode::new(NodeInfos {
            test: Some(3),
            error: 0.0,
            out: None,
        }));
        let left = NodeInfos {
            test: None,
            error: 0.0,
            out: Some(0),
        };
        let right = NodeInfos {
            test: None,
            error: 1.0,
            out: Some(1),
        };
        tree.add_left_node(root, TreeNode::new(left));
        tree.add_right_node(root, TreeNode::new(right));

        let root_node = tree.get_node(root).unwrap();
        assert_eq!(tree.get_left_child(root_node).unwrap().value.out, Some(0));
        assert_eq!(tree.get_right_child(root_node).unwrap().value.out, Some(1));
    }
}
