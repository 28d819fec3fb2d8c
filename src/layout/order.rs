//! User ordering of the cards inside a grid.

use super::columns::array_move;

/// Keeps the saved order for ids still present and appends new ids at the
/// end, so cards added later never displace the user's arrangement.
pub fn merge_order<S: AsRef<str>>(saved: &[String], ids: &[S]) -> Vec<String> {
    let known = |x: &str| ids.iter().any(|id| id.as_ref() == x);

    let mut merged: Vec<String> = Vec::with_capacity(ids.len());
    for x in saved {
        if known(x) && !merged.contains(x) {
            merged.push(x.clone());
        }
    }
    for id in ids {
        if !merged.iter().any(|m| m == id.as_ref()) {
            merged.push(id.as_ref().to_string());
        }
    }
    merged
}

/// Moves `active` to the position of `over`. Returns `true` when the order
/// changed.
pub fn move_card(order: &mut Vec<String>, active: &str, over: &str) -> bool {
    if active == over {
        return false;
    }
    let old_index = order.iter().position(|x| x == active);
    let new_index = order.iter().position(|x| x == over);
    match (old_index, new_index) {
        (Some(old), Some(new)) => {
            array_move(order, old, new);
            true
        }
        _ => false,
    }
}
