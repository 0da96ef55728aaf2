//! Dotted-path resolution over a JSON view of the state tree.
//!
//! A path such as `"user.stats.rating"` is split on `.` and walked from the
//! root. Object segments match keys; array segments must be a decimal index
//! (`"notifications.0.read"`).

use serde_json::Value;

use crate::error::StateError;

/// Resolve `path` against `root` for reading.
///
/// Returns `None` if any segment does not resolve.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| child(node, segment))
}

/// Replace the value at `path`, which must already exist.
///
/// Every segment but the last must resolve to an existing object or array.
/// The last segment must name an existing key (or in-bounds index) of that
/// container; whatever was stored there is replaced wholesale.
///
/// # Errors
///
/// Returns [`StateError::InvalidPath`] if the path is empty, contains an
/// empty segment, or any segment fails to resolve.
pub fn set_path(root: &mut Value, path: &str, value: Value) -> Result<(), StateError> {
    if path.is_empty() {
        return Err(StateError::invalid_path(path, "path is empty"));
    }

    let segments: Vec<&str> = path.split('.').collect();
    if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
        return Err(StateError::invalid_path(
            path,
            format!("segment {pos} is empty"),
        ));
    }

    let Some((last, parents)) = segments.split_last() else {
        return Err(StateError::invalid_path(path, "path is empty"));
    };

    let mut node = root;
    for segment in parents {
        if !is_container(node) {
            return Err(StateError::invalid_path(
                path,
                format!("cannot descend into `{segment}`: parent is not a mapping"),
            ));
        }
        node = child_mut(node, segment).ok_or_else(|| {
            StateError::invalid_path(path, format!("segment `{segment}` not found"))
        })?;
    }

    if !is_container(node) {
        return Err(StateError::invalid_path(
            path,
            format!("cannot set `{last}`: parent is not a mapping"),
        ));
    }
    let slot = child_mut(node, last)
        .ok_or_else(|| StateError::invalid_path(path, format!("field `{last}` not found")))?;
    *slot = value;
    Ok(())
}

fn is_container(node: &Value) -> bool {
    node.is_object() || node.is_array()
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Value {
        json!({
            "user": { "name": "Alex", "role": "performer", "stats": { "rating": 4.9 } },
            "wallet": { "balance": 10.0 },
            "notifications": [ { "read": false }, { "read": true } ]
        })
    }

    #[test]
    fn set_nested_leaf() {
        let mut root = tree();
        set_path(&mut root, "user.role", json!("customer")).expect("set should succeed");

        assert_eq!(root["user"]["role"], json!("customer"));
        assert_eq!(root["user"]["name"], json!("Alex"));
        assert_eq!(root["wallet"], json!({ "balance": 10.0 }));
    }

    #[test]
    fn set_replaces_whole_subtree() {
        let mut root = tree();
        set_path(&mut root, "user.stats", json!({ "rating": 1.0 })).expect("set subtree");
        assert_eq!(get_path(&root, "user.stats.rating"), Some(&json!(1.0)));
    }

    #[test]
    fn set_through_array_index() {
        let mut root = tree();
        set_path(&mut root, "notifications.0.read", json!(true)).expect("set array item");
        assert_eq!(root["notifications"][0]["read"], json!(true));
    }

    #[test]
    fn top_level_segment() {
        let mut root = tree();
        set_path(&mut root, "wallet", json!({ "balance": 0 })).expect("set top level");
        assert_eq!(root["wallet"]["balance"], json!(0));
    }

    #[test]
    fn missing_intermediate_is_invalid() {
        let mut root = tree();
        let err = set_path(&mut root, "profile.name", json!("x")).expect_err("missing parent");
        assert!(matches!(err, StateError::InvalidPath { .. }));
        assert!(err.to_string().contains("`profile` not found"), "got: {err}");
        assert_eq!(root, tree());
    }

    #[test]
    fn scalar_intermediate_is_invalid() {
        let mut root = tree();
        let err = set_path(&mut root, "user.name.first", json!("x")).expect_err("scalar parent");
        assert!(err.to_string().contains("not a mapping"), "got: {err}");
    }

    #[test]
    fn unknown_final_field_is_invalid() {
        let mut root = tree();
        let err = set_path(&mut root, "user.nickname", json!("x")).expect_err("unknown leaf");
        assert!(err.to_string().contains("`nickname` not found"), "got: {err}");
    }

    #[test]
    fn out_of_bounds_index_is_invalid() {
        let mut root = tree();
        assert!(set_path(&mut root, "notifications.5.read", json!(true)).is_err());
        assert!(set_path(&mut root, "notifications.first.read", json!(true)).is_err());
    }

    #[test]
    fn empty_path_and_segments_are_invalid() {
        let mut root = tree();
        assert!(set_path(&mut root, "", json!(1)).is_err());
        assert!(set_path(&mut root, "user..role", json!(1)).is_err());
        assert!(set_path(&mut root, "user.role.", json!(1)).is_err());
    }

    #[test]
    fn get_path_resolves_or_none() {
        let root = tree();
        assert_eq!(get_path(&root, "user.stats.rating"), Some(&json!(4.9)));
        assert_eq!(get_path(&root, "notifications.1.read"), Some(&json!(true)));
        assert_eq!(get_path(&root, "user.missing"), None);
        assert_eq!(get_path(&root, "wallet.balance.cents"), None);
    }
}
