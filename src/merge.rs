use crate::value::{Object, Value};

/// Merge `incoming` into `target` key by key.
///
/// Objects on both sides merge recursively, arrays on both sides are
/// concatenated (target first), and in every other case the incoming value
/// replaces what was there. Keys new to `target` are appended in the order
/// `incoming` lists them.
pub fn deep_merge(target: &mut Object, incoming: Object) {
    for (key, value) in incoming {
        match target.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

/// Merge a single value into a slot, following the [`deep_merge`] rules.
pub fn merge_value(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(left), Value::Object(right)) => deep_merge(left, right),
        (Value::Array(left), Value::Array(right)) => left.extend(right),
        (slot, other) => *slot = other,
    }
}

/// Overlay `incoming` on `target` one level deep: existing keys are replaced
/// in place, new keys are appended.
pub(crate) fn overlay(target: &mut Object, incoming: Object) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}
