//! Structural walk
//!
//! Walks base and target in parallel. Objects are visited in key order
//! (base keys first, then keys only the target has); arrays are aligned
//! according to [`ArrayAlignment`]. A node whose kinds differ, or two unequal
//! scalars, becomes one `Modified` record: the walk never descends into a
//! subtree that exists on only one side.

use super::ArrayAlignment;
use std::collections::BTreeMap;
use verso_core::{Change, DeltaPath, Value};

/// Changes turning `base` into `target`, in walk order
pub fn diff_values(base: &Value, target: &Value, alignment: ArrayAlignment) -> Vec<Change> {
    let mut out = Vec::new();
    walk(&DeltaPath::root(), base, target, alignment, &mut out);
    out
}

fn walk(
    path: &DeltaPath,
    base: &Value,
    target: &Value,
    alignment: ArrayAlignment,
    out: &mut Vec<Change>,
) {
    if base == target {
        return;
    }
    match (base, target) {
        (Value::Object(b), Value::Object(t)) => walk_object(path, b, t, alignment, out),
        (Value::Array(b), Value::Array(t)) => match alignment {
            ArrayAlignment::Positional => walk_positional(path, b, t, alignment, out),
        },
        _ => out.push(Change::modified(path.clone(), base.clone(), target.clone())),
    }
}

fn walk_object(
    path: &DeltaPath,
    base: &BTreeMap<String, Value>,
    target: &BTreeMap<String, Value>,
    alignment: ArrayAlignment,
    out: &mut Vec<Change>,
) {
    for (key, b) in base {
        let child = path.child_key(key);
        match target.get(key) {
            Some(t) => walk(&child, b, t, alignment, out),
            None => out.push(Change::removed(child, b.clone())),
        }
    }
    for (key, t) in target {
        if !base.contains_key(key) {
            out.push(Change::added(path.child_key(key), t.clone()));
        }
    }
}

fn walk_positional(
    path: &DeltaPath,
    base: &[Value],
    target: &[Value],
    alignment: ArrayAlignment,
    out: &mut Vec<Change>,
) {
    let common = base.len().min(target.len());
    for (i, (b, t)) in base.iter().zip(target).enumerate() {
        walk(&path.child_index(i), b, t, alignment, out);
    }
    for (i, b) in base.iter().enumerate().skip(common) {
        out.push(Change::removed(path.child_index(i), b.clone()));
    }
    for (i, t) in target.iter().enumerate().skip(common) {
        out.push(Change::added(path.child_index(i), t.clone()));
    }
}
