#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tilery_layout::{
    Client, LayoutSettings, NewNode, NodeId, Placement, Proportion, Rect, RemainderPolicy,
    SplitAxis, Tree,
};

#[derive(Debug)]
struct Window {
    id: u16,
    rect: Option<Rect>,
}

impl Client for Window {
    type Id = u16;

    fn id(&self) -> u16 {
        self.id
    }

    fn frame_tile(&mut self) {}

    fn move_resize(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Root { split: bool, vertical: bool },
    AddClient { split: u8, first: bool },
    AddSplit { split: u8, vertical: bool, first: bool },
    Subdivide { leaf: u8, vertical: bool },
    RemoveChild { node: u8 },
    Resize { node: u8, permille: u16 },
    Switch { a: u16, b: u16 },
    RemoveClient { id: u16 },
    Place { x: i16, y: i16, width: u16, height: u16 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    absorb_last: bool,
    ops: Vec<Op>,
}

fn axis(vertical: bool) -> SplitAxis {
    if vertical {
        SplitAxis::Vertical
    } else {
        SplitAxis::Horizontal
    }
}

fn placement(first: bool) -> Placement {
    if first {
        Placement::First
    } else {
        Placement::Last
    }
}

fn pick(ids: &[NodeId], index: u8) -> Option<NodeId> {
    if ids.is_empty() {
        return None;
    }
    Some(ids[usize::from(index) % ids.len()])
}

fn splits(tree: &Tree<Window>) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.root().into_iter().collect();
    while let Some(id) = stack.pop() {
        if tree.axis(id).is_some() {
            out.push(id);
            stack.extend_from_slice(tree.children(id));
        }
    }
    out
}

/// Every node that has a parent split, leaves and splits alike.
fn children(tree: &Tree<Window>) -> Vec<NodeId> {
    splits(tree)
        .into_iter()
        .flat_map(|split| tree.children(split).to_vec())
        .collect()
}

fuzz_target!(|input: Input| {
    let policy = if input.absorb_last {
        RemainderPolicy::AbsorbLast
    } else {
        RemainderPolicy::Drift
    };
    let settings = LayoutSettings {
        remainder: policy,
        ..LayoutSettings::default()
    };
    let mut tree: Tree<Window> = Tree::with_settings(settings);
    let mut next_id: u16 = 0;

    for op in input.ops.into_iter().take(256) {
        let mut mint = || {
            next_id = next_id.wrapping_add(1);
            Window {
                id: next_id,
                rect: None,
            }
        };
        match op {
            Op::Root { split, vertical } => {
                let node = if split {
                    NewNode::Split(axis(vertical))
                } else {
                    NewNode::Leaf(mint())
                };
                let leaves = tree.leaf_count();
                if let Ok((_, displaced)) = tree.set_child(node) {
                    assert_eq!(displaced.len(), leaves);
                }
            }
            Op::AddClient { split, first } => {
                if let Some(split) = pick(&splits(&tree), split) {
                    let _ = tree.add_client(split, mint(), placement(first));
                }
            }
            Op::AddSplit {
                split,
                vertical,
                first,
            } => {
                if let Some(split) = pick(&splits(&tree), split) {
                    let _ = tree.add_child(split, NewNode::Split(axis(vertical)), placement(first));
                }
            }
            Op::Subdivide { leaf, vertical } => {
                if let Some(leaf) = pick(&tree.leaves(), leaf) {
                    tree.subdivide(leaf, axis(vertical))
                        .expect("leaf from leaves() subdivides");
                }
            }
            Op::RemoveChild { node } => {
                if let Some(child) = pick(&children(&tree), node) {
                    let parent = tree.parent(child).expect("child has a parent");
                    tree.remove_child(parent, child)
                        .expect("direct child removes");
                }
            }
            Op::Resize { node, permille } => {
                if let Some(child) = pick(&children(&tree), node) {
                    let share = Proportion::new(f64::from(permille % 1001) / 1000.0);
                    let _ = tree.resize_child(child, share);
                }
            }
            Op::Switch { a, b } => tree.switch_clients(a, b),
            Op::RemoveClient { id } => {
                let _ = tree.remove_client(id);
            }
            Op::Place {
                x,
                y,
                width,
                height,
            } => {
                let area = Rect::new(
                    i32::from(x),
                    i32::from(y),
                    u32::from(width),
                    u32::from(height),
                );
                if tree.place(area) {
                    for leaf in tree.leaves() {
                        let rect = tree
                            .client(leaf)
                            .and_then(|window| window.rect)
                            .expect("placed leaf has a rect");
                        assert!(rect.width >= 1 && rect.width <= area.width);
                        assert!(rect.height >= 1 && rect.height <= area.height);
                        assert!(rect.x >= area.x && rect.y >= area.y);
                        match policy {
                            RemainderPolicy::AbsorbLast => assert!(area.contains_rect(&rect)),
                            // One pixel of rounding per node at most.
                            RemainderPolicy::Drift => {
                                let slack = i32::try_from(tree.len()).unwrap_or(i32::MAX);
                                assert!(rect.right() <= area.right().saturating_add(slack));
                                assert!(rect.bottom() <= area.bottom().saturating_add(slack));
                            }
                        }
                    }
                }
            }
        }
        tree.validate().expect("tree stays valid");
    }
});
