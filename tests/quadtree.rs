//! Quadtree structure and balance invariants.

use groundworks::terrain::quadtree::{morton, NodeId, Quadtree};

/// Footprint of a node in maximum-depth grid cells, inclusive bounds.
fn footprint(node: NodeId, max_depth: u8) -> (u32, u32, u32, u32) {
    let scale = 1u32 << (max_depth - node.depth);
    let (x, y) = node.coords();
    (x * scale, y * scale, (x + 1) * scale - 1, (y + 1) * scale - 1)
}

/// Whether two footprints touch, sharing an edge or just a corner.
fn touching(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32)) -> bool {
    let horizontal = a.0 <= b.2 + 1 && b.0 <= a.2 + 1;
    let vertical = a.1 <= b.3 + 1 && b.1 <= a.3 + 1;
    horizontal && vertical
}

/// Asserts that no pair of touching leaves differs by more than one depth
/// level, and that leaf footprints do not overlap.
fn assert_balanced(tree: &Quadtree) {
    let leaves: Vec<NodeId> = tree.leaves().collect();
    for (i, a) in leaves.iter().enumerate() {
        let fa = footprint(*a, tree.max_depth());
        for b in &leaves[i + 1..] {
            let fb = footprint(*b, tree.max_depth());
            assert!(
                !(fa.0 <= fb.2 && fb.0 <= fa.2 && fa.1 <= fb.3 && fb.1 <= fa.3),
                "leaf footprints overlap: {a:?} and {b:?}"
            );
            if touching(fa, fb) {
                let difference = i32::from(a.depth) - i32::from(b.depth);
                assert!(
                    difference.abs() <= 1,
                    "touching leaves {a:?} and {b:?} differ by {} levels",
                    difference.abs()
                );
            }
        }
    }
}

/// Small deterministic PRNG, xorshift64*.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, bound: u32) -> u32 {
        (self.next() % u64::from(bound)) as u32
    }
}

#[test]
fn morton_orders_siblings_contiguously() {
    // The four cells of any 2x2 block at even coordinates share a code
    // prefix, which is what makes parent lookup a shift.
    for (x, y) in [(0u32, 0u32), (2, 4), (6, 6), (10, 2)] {
        let codes = [
            morton::encode(x, y),
            morton::encode(x + 1, y),
            morton::encode(x, y + 1),
            morton::encode(x + 1, y + 1),
        ];
        for code in codes {
            assert_eq!(code >> 2, codes[0] >> 2);
        }
    }
}

#[test]
fn single_deep_insert_is_balanced() {
    let mut tree = Quadtree::new(6);
    tree.insert(NodeId::from_coords(6, 33, 17));
    assert_balanced(&tree);
}

#[test]
fn corner_insert_is_balanced() {
    let mut tree = Quadtree::new(5);
    tree.insert(NodeId::from_coords(5, 0, 0));
    assert_balanced(&tree);

    let mut tree = Quadtree::new(5);
    tree.insert(NodeId::from_coords(5, 31, 31));
    assert_balanced(&tree);
}

#[test]
fn randomized_inserts_stay_balanced() {
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);

    for _ in 0..8 {
        let mut tree = Quadtree::new(6);
        for _ in 0..48 {
            let depth = 1 + rng.below(6) as u8;
            let resolution = NodeId::resolution(depth);
            tree.insert(NodeId::from_coords(
                depth,
                rng.below(resolution),
                rng.below(resolution),
            ));
        }
        assert_balanced(&tree);
    }
}

#[test]
fn leaves_partition_the_root_when_root_is_refined() {
    let mut tree = Quadtree::new(4);
    tree.insert(NodeId::from_coords(4, 7, 7));

    // Each cell of the full-depth grid is covered by exactly one leaf.
    let resolution = NodeId::resolution(4);
    let leaves: Vec<NodeId> = tree.leaves().collect();
    for x in 0..resolution {
        for y in 0..resolution {
            let covering = leaves
                .iter()
                .filter(|leaf| {
                    let (x0, y0, x1, y1) = footprint(**leaf, 4);
                    x0 <= x && x <= x1 && y0 <= y && y <= y1
                })
                .count();
            assert_eq!(covering, 1, "cell ({x}, {y}) covered {covering} times");
        }
    }
}

#[test]
fn clearing_and_reinserting_reproduces_the_same_tree() {
    let mut tree = Quadtree::new(5);
    let node = NodeId::from_coords(5, 12, 20);

    tree.insert(node);
    let first: Vec<NodeId> = {
        let mut nodes: Vec<NodeId> = tree.iter().collect();
        nodes.sort();
        nodes
    };

    tree.clear();
    tree.insert(node);
    let second: Vec<NodeId> = {
        let mut nodes: Vec<NodeId> = tree.iter().collect();
        nodes.sort();
        nodes
    };

    assert_eq!(first, second);
}
