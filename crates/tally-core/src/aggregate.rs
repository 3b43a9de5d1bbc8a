//! Package usage aggregation.

use crate::types::{PackageName, UsageIndex};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Folds per-file package sets into a package usage index.
///
/// Each file contributes once to every package it references. File lists
/// follow the iteration order of `files`; pass a [`FileMap`](crate::FileMap)
/// for path order. The returned set is the key set of the index.
pub fn aggregate<'a, I>(files: I) -> (UsageIndex, BTreeSet<PackageName>)
where
    I: IntoIterator<Item = (&'a PathBuf, &'a BTreeSet<PackageName>)>,
{
    let mut usage = UsageIndex::new();

    for (path, packages) in files {
        for package in packages {
            let entry = usage.entry(package.clone()).or_default();
            entry.count += 1;
            entry.files.push(path.clone());
        }
    }

    let unique = usage.keys().cloned().collect();
    (usage, unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileMap;

    fn packages(names: &[&str]) -> BTreeSet<PackageName> {
        names
            .iter()
            .map(|n| PackageName::from_specifier(n).unwrap())
            .collect()
    }

    #[test]
    fn test_counts_files_not_statements() {
        let mut files = FileMap::new();
        files.insert(PathBuf::from("/p/a.ts"), packages(&["lodash", "react"]));
        files.insert(PathBuf::from("/p/b/c.js"), packages(&["lodash"]));

        let (usage, unique) = aggregate(&files);

        assert_eq!(unique, packages(&["lodash", "react"]));
        assert_eq!(usage["lodash"].count, 2);
        assert_eq!(
            usage["lodash"].files,
            vec![PathBuf::from("/p/a.ts"), PathBuf::from("/p/b/c.js")]
        );
        assert_eq!(usage["react"].count, 1);
    }

    #[test]
    fn test_file_order_follows_input_order() {
        let entries = vec![
            (PathBuf::from("/p/z.ts"), packages(&["react"])),
            (PathBuf::from("/p/a.ts"), packages(&["react"])),
        ];

        let (usage, _) = aggregate(entries.iter().map(|(path, set)| (path, set)));

        assert_eq!(
            usage["react"].files,
            vec![PathBuf::from("/p/z.ts"), PathBuf::from("/p/a.ts")]
        );
    }

    #[test]
    fn test_empty_input() {
        let (usage, unique) = aggregate(&FileMap::new());
        assert!(usage.is_empty());
        assert!(unique.is_empty());
    }

    #[test]
    fn test_count_matches_file_list_length() {
        let mut files = FileMap::new();
        for i in 0..10 {
            let names: &[&str] = if i % 2 == 0 { &["a", "b"] } else { &["b"] };
            files.insert(PathBuf::from(format!("/p/{i}.js")), packages(names));
        }

        let (usage, _) = aggregate(&files);

        assert_eq!(usage["a"].count, 5);
        assert_eq!(usage["b"].count, 10);
        for entry in usage.values() {
            assert_eq!(entry.count, entry.files.len());
        }
    }
}
