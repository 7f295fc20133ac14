use hashbrown::HashMap;

use super::{Joint, JointTransforms};
use crate::ids::EnumKey;

/// Resolve world transforms by walking `order` (parents first).
///
/// `overrides`, when given, supplies local transforms that take precedence
/// over the stored ones. A root's world transform is its local transform,
/// copied without multiplying by identity.
pub(super) fn resolve_world<J: EnumKey>(
    order: &[J],
    joints: &HashMap<J, Joint<J>>,
    overrides: Option<&JointTransforms<J>>,
) -> JointTransforms<J> {
    let mut world = JointTransforms::with_capacity(order.len());
    for id in order {
        let joint = &joints[id];
        let local = overrides
            .and_then(|o| o.get(id))
            .copied()
            .unwrap_or(joint.local);
        let resolved = match joint.parent {
            None => local,
            Some(parent) => world[&parent] * local,
        };
        world.insert(*id, resolved);
    }
    world
}
