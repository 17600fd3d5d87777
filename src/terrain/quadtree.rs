//! Depth-bounded quadtree over a Morton-coded grid, with 2:1 balancing.
//!
//! Node identities are `(depth, morton)` pairs, so the tree itself is just a
//! set of occupied identities. Nodes are only ever instantiated in complete
//! sibling groups: inserting a node brings in its three siblings and its
//! ancestors' sibling groups, so the leaf set always partitions the root.
//! Insertion then coarsens outward so no two touching leaves differ by more
//! than one depth level. The root is persistent.

use std::collections::HashSet;

/// 2D Morton (Z-order) curve codes for up to 16 bits per axis.
pub mod morton {
    /// Interleaves the low 16 bits of `x` and `y` into a Z-order code.
    pub fn encode(x: u32, y: u32) -> u32 {
        spread(x) | (spread(y) << 1)
    }

    /// Recovers `(x, y)` from a Z-order code.
    pub fn decode(code: u32) -> (u32, u32) {
        (compact(code), compact(code >> 1))
    }

    fn spread(value: u32) -> u32 {
        let mut v = value & 0x0000_ffff;
        v = (v | (v << 8)) & 0x00ff_00ff;
        v = (v | (v << 4)) & 0x0f0f_0f0f;
        v = (v | (v << 2)) & 0x3333_3333;
        v = (v | (v << 1)) & 0x5555_5555;
        v
    }

    fn compact(value: u32) -> u32 {
        let mut v = value & 0x5555_5555;
        v = (v | (v >> 1)) & 0x3333_3333;
        v = (v | (v >> 2)) & 0x0f0f_0f0f;
        v = (v | (v >> 4)) & 0x00ff_00ff;
        v = (v | (v >> 8)) & 0x0000_ffff;
        v
    }
}

/// Identity of a quadtree node: its depth and its Morton-coded grid cell at
/// that depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub depth: u8,
    pub location: u32,
}

impl NodeId {
    pub fn new(depth: u8, location: u32) -> Self {
        Self { depth, location }
    }

    pub fn from_coords(depth: u8, x: u32, y: u32) -> Self {
        Self {
            depth,
            location: morton::encode(x, y),
        }
    }

    /// Grid coordinates of this node within its depth level.
    pub fn coords(self) -> (u32, u32) {
        morton::decode(self.location)
    }

    /// Cells per axis at the given depth.
    pub fn resolution(depth: u8) -> u32 {
        1 << depth
    }

    /// Containing node one level up, or `None` for the root.
    pub fn parent(self) -> Option<NodeId> {
        if self.depth == 0 {
            None
        } else {
            Some(NodeId {
                depth: self.depth - 1,
                location: self.location >> 2,
            })
        }
    }

    /// The four children, in Morton order.
    pub fn children(self) -> [NodeId; 4] {
        let base = self.location << 2;
        let depth = self.depth + 1;
        [
            NodeId::new(depth, base),
            NodeId::new(depth, base | 1),
            NodeId::new(depth, base | 2),
            NodeId::new(depth, base | 3),
        ]
    }
}

const DIAGONAL_OFFSETS: [(i64, i64); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Region quadtree with a fixed maximum depth and 2:1 leaf balancing.
#[derive(Debug, Clone)]
pub struct Quadtree {
    max_depth: u8,
    nodes: HashSet<NodeId>,
}

impl Quadtree {
    /// Creates a tree holding only the persistent root. `max_depth` is
    /// capped at 15 so node coordinates fit the Morton code.
    pub fn new(max_depth: u8) -> Self {
        debug_assert!(max_depth <= 15);
        let mut nodes = HashSet::new();
        nodes.insert(NodeId::new(0, 0));
        Self { max_depth, nodes }
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// A node is a leaf if it is present and none of its children are.
    pub fn is_leaf(&self, node: NodeId) -> bool {
        if !self.contains(node) {
            return false;
        }
        if node.depth >= self.max_depth {
            return true;
        }
        !node.children().iter().any(|child| self.contains(*child))
    }

    /// All present nodes, interior and leaf, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// All leaves, in arbitrary order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().filter(|node| self.is_leaf(*node))
    }

    /// Erases everything but the persistent root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.insert(NodeId::new(0, 0));
    }

    /// Inserts a node along with its sibling group, its ancestors' sibling
    /// groups, and whatever coarser neighbors are needed to keep touching
    /// leaves within one depth level of each other.
    ///
    /// Balancing works outward: for each inserted node deeper than one, the
    /// diagonal neighbors of each sibling of its parent are inserted at the
    /// parent's depth. Over the four siblings those diagonals cover the full
    /// ring around the parent block, and each ring insertion recurses until
    /// the tree settles.
    pub fn insert(&mut self, node: NodeId) {
        debug_assert!(node.depth <= self.max_depth);

        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if !self.insert_lineage(current) {
                continue;
            }

            if current.depth < 2 {
                continue;
            }

            let parent = NodeId {
                depth: current.depth - 1,
                location: current.location >> 2,
            };
            let grandparent = NodeId {
                depth: current.depth - 2,
                location: current.location >> 4,
            };
            let resolution = i64::from(NodeId::resolution(parent.depth));

            for sibling in grandparent.children() {
                let (x, y) = sibling.coords();
                for (dx, dy) in DIAGONAL_OFFSETS {
                    let nx = i64::from(x) + dx;
                    let ny = i64::from(y) + dy;
                    if nx < 0 || ny < 0 || nx >= resolution || ny >= resolution {
                        continue;
                    }
                    pending.push(NodeId::from_coords(parent.depth, nx as u32, ny as u32));
                }
            }
        }
    }

    /// Inserts a node, its siblings, and each absent ancestor with its
    /// siblings. Returns `false` if the node was already present.
    fn insert_lineage(&mut self, node: NodeId) -> bool {
        if node.depth == 0 || self.nodes.contains(&node) {
            return false;
        }

        let mut current = node;
        loop {
            // The sibling group shares the parent's code prefix.
            let base = current.location & !3;
            for offset in 0..4 {
                self.nodes.insert(NodeId::new(current.depth, base | offset));
            }

            let parent = NodeId {
                depth: current.depth - 1,
                location: current.location >> 2,
            };
            if parent.depth == 0 || self.nodes.contains(&parent) {
                break;
            }
            current = parent;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn morton_roundtrip() {
        for (x, y) in [(0, 0), (1, 0), (0, 1), (5, 9), (1023, 17), (65535, 65535)] {
            assert_eq!(morton::decode(morton::encode(x, y)), (x, y));
        }
    }

    #[test]
    fn morton_interleaving_order() {
        assert_eq!(morton::encode(1, 0), 0b01);
        assert_eq!(morton::encode(0, 1), 0b10);
        assert_eq!(morton::encode(3, 3), 0b1111);
    }

    #[test]
    fn parent_child_roundtrip() {
        let node = NodeId::from_coords(4, 9, 6);
        let children = node.children();
        for child in children {
            assert_eq!(child.parent(), Some(node));
        }
        assert_eq!(NodeId::new(0, 0).parent(), None);
    }

    #[test]
    fn insert_instantiates_ancestors() {
        let mut tree = Quadtree::new(5);
        let node = NodeId::from_coords(5, 17, 12);
        tree.insert(node);

        let mut ancestor = node;
        while let Some(parent) = ancestor.parent() {
            assert!(tree.contains(parent));
            ancestor = parent;
        }
        assert!(tree.contains(node));
        assert!(tree.is_leaf(node));
        assert!(!tree.is_leaf(node.parent().unwrap()));
    }

    #[test]
    fn insertion_completes_sibling_groups() {
        let mut tree = Quadtree::new(3);
        let node = NodeId::from_coords(3, 5, 2);
        tree.insert(node);

        let mut member = node;
        while member.depth > 0 {
            let base = member.location & !3;
            for offset in 0..4 {
                assert!(tree.contains(NodeId::new(member.depth, base | offset)));
            }
            member = member.parent().unwrap();
        }
    }

    #[test]
    fn reinsertion_is_idempotent() {
        let mut tree = Quadtree::new(4);
        let node = NodeId::from_coords(4, 3, 3);
        tree.insert(node);
        let size = tree.len();
        tree.insert(node);
        assert_eq!(tree.len(), size);
    }

    #[test]
    fn clear_keeps_the_persistent_root() {
        let mut tree = Quadtree::new(4);
        let root = NodeId::new(0, 0);
        assert!(tree.contains(root));
        assert!(tree.is_leaf(root));

        tree.insert(NodeId::from_coords(4, 0, 0));
        assert!(!tree.is_leaf(root));

        tree.clear();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_leaf(root));
    }
}
