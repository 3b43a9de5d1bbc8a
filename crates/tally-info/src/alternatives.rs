//! Suggested replacements for well-known packages.

use std::collections::BTreeMap;
use tally_core::{PackageMetadata, PackageName};

const ALTERNATIVES: &[(&str, &[&str])] = &[
    ("moment", &["date-fns", "dayjs", "luxon"]),
    ("request", &["axios", "got", "node-fetch"]),
    ("lodash", &["lodash-es", "ramda"]),
    ("underscore", &["lodash-es", "ramda"]),
    ("jquery", &["cash-dom", "umbrellajs"]),
    ("node-sass", &["sass"]),
    ("tslint", &["eslint"]),
    ("uuid", &["nanoid"]),
];

/// Replacements for `name`; empty for unlisted packages.
pub fn alternatives_for(name: &str) -> &'static [&'static str] {
    ALTERNATIVES
        .iter()
        .find(|(package, _)| *package == name)
        .map(|(_, alternatives)| *alternatives)
        .unwrap_or(&[])
}

/// Fill the `alternatives` of every record, degraded ones included.
pub fn apply_alternatives(metadata: &mut BTreeMap<PackageName, PackageMetadata>) {
    for (name, record) in metadata.iter_mut() {
        record.alternatives = alternatives_for(name.as_str())
            .iter()
            .map(|a| a.to_string())
            .collect();
    }
}
