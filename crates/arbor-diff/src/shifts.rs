//! Index-shift bookkeeping for reordered children.

use std::collections::BTreeMap;

use arbor_types::NodeId;

/// Net index shifts of children surviving from `left` to `right`.
///
/// Insertions push later siblings toward the back and removals pull them
/// toward the front; those movements are implied by the add and remove
/// records themselves and must not be reported again. This function
/// subtracts the implied correction from each survivor's raw index delta
/// and returns only the children whose net shift is non-zero, i.e. the
/// genuine reorders.
pub fn compute_index_shifts(left: &[NodeId], right: &[NodeId]) -> BTreeMap<NodeId, i64> {
    let left_pos: BTreeMap<NodeId, i64> = left
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i64))
        .collect();
    let right_pos: BTreeMap<NodeId, i64> = right
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i64))
        .collect();

    let mut correction: BTreeMap<NodeId, i64> = left_pos
        .keys()
        .filter(|id| right_pos.contains_key(id))
        .map(|id| (*id, 0))
        .collect();

    // each insertion shifts every survivor at or behind it by one
    for (index, id) in right.iter().enumerate() {
        if !left_pos.contains_key(id) {
            for (survivor, shift) in correction.iter_mut() {
                if right_pos[survivor] >= index as i64 {
                    *shift += 1;
                }
            }
        }
    }
    // each removal shifts every survivor behind it back by one
    for (index, id) in left.iter().enumerate() {
        if !right_pos.contains_key(id) {
            for (survivor, shift) in correction.iter_mut() {
                if left_pos[survivor] > index as i64 {
                    *shift -= 1;
                }
            }
        }
    }

    correction
        .into_iter()
        .filter_map(|(id, shift)| {
            let net = right_pos[&id] - left_pos[&id] - shift;
            (net != 0).then_some((id, net))
        })
        .collect()
}
