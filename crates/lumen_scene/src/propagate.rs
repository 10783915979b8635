use glam::Mat4;
use log::warn;

use crate::scene::Node;

enum Step {
    Enter { index: usize, parent_world: Mat4 },
    Leave(usize),
}

/// Pre-order walk from every root: `world = parent_world * local`.
///
/// A child is only entered from the node its `parent` link names, so a node
/// listed under several parents is walked once, under the parent that won
/// the link. Child indices come from the document and are range-checked
/// before use. A node already on the current path is not entered again,
/// which cuts cycles. Running it twice without edits gives identical results.
pub fn propagate_world_transforms(nodes: &mut [Node], roots: &[usize]) {
    let mut on_path = vec![false; nodes.len()];
    let mut stack = Vec::new();

    for &root in roots {
        if root >= nodes.len() {
            continue;
        }
        stack.push(Step::Enter {
            index: root,
            parent_world: Mat4::IDENTITY,
        });

        while let Some(step) = stack.pop() {
            let (index, parent_world) = match step {
                Step::Enter { index, parent_world } => (index, parent_world),
                Step::Leave(index) => {
                    on_path[index] = false;
                    continue;
                }
            };
            if on_path[index] {
                warn!("Node {index} is its own ancestor, cutting the cycle");
                continue;
            }

            let world = parent_world * nodes[index].local_transform;
            nodes[index].world_transform = world;

            on_path[index] = true;
            stack.push(Step::Leave(index));
            // Reversed so children are entered in document order.
            for &child in nodes[index].children.iter().rev() {
                if child < nodes.len() && nodes[child].parent == Some(index) {
                    stack.push(Step::Enter {
                        index: child,
                        parent_world: world,
                    });
                }
            }
        }
    }
}
