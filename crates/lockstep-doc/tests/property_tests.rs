use lockstep_doc::fingerprint::Fingerprinter;
use lockstep_doc::leaf::{leaf_paths, matches_mask};
use lockstep_doc::path::{get_path, remove_path, set_path, split_path};
use proptest::prelude::*;
use serde_json::json;

/// Mapping-key segments: non-empty, no separator, never all digits.
fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}"
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segs| segs.join("/"))
}

proptest! {
    #[test]
    fn test_split_join_round_trip(segs in prop::collection::vec(segment(), 1..6)) {
        let path = segs.join("/");
        let split = split_path(&path, "/").unwrap();
        prop_assert_eq!(split, segs);
    }

    #[test]
    fn test_set_then_get_returns_value(path in path(), n in any::<i64>()) {
        let mut doc = json!({});
        set_path(&mut doc, &path, "/", json!(n)).unwrap();
        prop_assert_eq!(get_path(&doc, &path, "/"), Some(&json!(n)));
    }

    #[test]
    fn test_set_then_remove_round_trips(path in path(), n in any::<i64>()) {
        let mut doc = json!({});
        set_path(&mut doc, &path, "/", json!(n)).unwrap();
        prop_assert_eq!(remove_path(&mut doc, &path, "/"), Some(json!(n)));
        prop_assert_eq!(get_path(&doc, &path, "/"), None);
    }

    #[test]
    fn test_single_scalar_set_yields_one_leaf(path in path(), n in any::<i64>()) {
        let mut doc = json!({});
        set_path(&mut doc, &path, "/", json!(n)).unwrap();
        prop_assert_eq!(leaf_paths(&doc, "/"), vec![path]);
    }

    #[test]
    fn test_scalar_fingerprints_injective_on_integers(a in any::<i64>(), b in any::<i64>()) {
        let fp = Fingerprinter::new();
        let equal = fp.fingerprint(&json!(a)) == fp.fingerprint(&json!(b));
        prop_assert_eq!(equal, a == b);
    }

    #[test]
    fn test_mask_matches_itself(path in path()) {
        prop_assert!(matches_mask(&path, &path));
    }

    #[test]
    fn test_prefix_mask_matches_extensions(path in path(), extra in segment()) {
        let pattern = format!("{path}*");
        let longer = format!("{path}/{extra}");
        prop_assert!(matches_mask(&pattern, &path));
        prop_assert!(matches_mask(&pattern, &longer));
    }
}
