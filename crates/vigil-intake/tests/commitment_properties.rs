//! Property tests for complaint commitments.

use proptest::prelude::*;
use vigil_intake::{commit, verify_commitment, ComplaintContent};

fn content_strategy() -> impl Strategy<Value = ComplaintContent> {
    (
        "[a-zA-Z0-9 ]{1,40}",
        "[a-zA-Z0-9 .,]{1,200}",
        "[a-z]{1,16}",
        proptest::option::of("[a-zA-Z0-9 ]{0,40}"),
        proptest::option::of("[0-9-]{0,10}"),
        any::<bool>(),
    )
        .prop_map(|(title, description, category, location, date, anonymous)| {
            ComplaintContent {
                title,
                description,
                category,
                location,
                date,
                anonymous,
            }
        })
}

proptest! {
    #[test]
    fn commitment_is_deterministic(content in content_strategy()) {
        let a = commit(&content).unwrap();
        let b = commit(&content.clone()).unwrap();
        prop_assert_eq!(a, b);
        prop_assert!(verify_commitment(&content, &a.to_hex()));
    }

    #[test]
    fn commitment_survives_json_reordering(content in content_strategy()) {
        let forward = serde_json::to_string(&content).unwrap();
        let value: serde_json::Value = serde_json::from_str(&forward).unwrap();
        let mut entries: Vec<(String, serde_json::Value)> = value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.reverse();
        let reversed = format!(
            "{{{}}}",
            entries
                .iter()
                .map(|(k, v)| format!("{}:{}", serde_json::to_string(k).unwrap(), v))
                .collect::<Vec<_>>()
                .join(",")
        );
        let parsed: ComplaintContent = serde_json::from_str(&reversed).unwrap();
        prop_assert_eq!(commit(&parsed).unwrap(), commit(&content).unwrap());
    }

    #[test]
    fn changed_title_changes_commitment(content in content_strategy(), suffix in "[a-z]{1,5}") {
        let mut altered = content.clone();
        altered.title.push_str(&suffix);
        prop_assert_ne!(commit(&altered).unwrap(), commit(&content).unwrap());
    }
}
