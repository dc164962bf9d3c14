//! Property tests for list and map option semantics.

use keel_config::{BuildSettings, CommonSettings, LogLevel, OptionValue, Platform};
use proptest::prelude::*;
use std::collections::HashSet;

fn entry_strategy() -> impl Strategy<Value = String> {
    "[a-z./*-]{1,12}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Appending keeps insertion order and duplicates.
    #[test]
    fn prop_lists_preserve_order(entries in prop::collection::vec(entry_strategy(), 0..20)) {
        let mut settings = BuildSettings::default();
        for entry in &entries {
            settings.add_external(entry.clone());
            settings.add_entry_point(entry.clone());
            settings.add_pure(entry.clone());
        }
        prop_assert_eq!(&settings.external, &entries);
        prop_assert_eq!(&settings.entry_points, &entries);
        prop_assert_eq!(&settings.pure, &entries);
    }

    /// Maps hold one entry per unique key and keep the last value written.
    #[test]
    fn prop_maps_last_write_wins(
        writes in prop::collection::vec(("[a-c]{1,2}", "[0-9]{1,3}"), 0..30)
    ) {
        let mut settings = CommonSettings::default();
        for (key, value) in &writes {
            settings.set_define(key.clone(), value.clone());
        }

        let unique: HashSet<&String> = writes.iter().map(|(key, _)| key).collect();
        prop_assert_eq!(settings.define.len(), unique.len());
        for key in unique {
            let last = writes.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
            prop_assert_eq!(settings.define.get(key), last);
        }
    }

    /// A rejected enum value never disturbs the stored one.
    #[test]
    fn prop_invalid_enum_is_atomic(name in "[a-z]{1,8}") {
        let mut settings = CommonSettings::default();
        settings.set_platform(Platform::Node);
        settings.set_log_override("module", LogLevel::Error);

        let result = settings.set("platform", name.as_str());
        if Platform::ALL.iter().any(|p| p.to_string() == name) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(settings.get("platform").unwrap(), OptionValue::from(name.as_str()));
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(settings.platform(), Platform::Node);
        }
    }
}
