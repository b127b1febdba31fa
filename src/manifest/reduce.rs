use std::collections::HashSet;

use super::PackageRecord;

/// Deduplicate by identifier, keeping the first occurrence, and sort by identifier.
///
/// Identifiers compare byte-wise, so the result (and therefore the install
/// order) is the same every time the same manifest is restored.
pub fn reduce<I>(records: I) -> Vec<PackageRecord>
where
    I: IntoIterator<Item = PackageRecord>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<PackageRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.identifier.clone()))
        .collect();
    unique.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(records: &[PackageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.identifier.as_str()).collect()
    }

    #[test]
    fn test_reduce_keeps_first_duplicate() {
        let input = vec![
            PackageRecord::new("A", "winget").with_version("1.0"),
            PackageRecord::new("B", "winget"),
            PackageRecord::new("A", "msstore").with_version("2.0"),
        ];

        let reduced = reduce(input);

        assert_eq!(
            reduced,
            vec![
                PackageRecord::new("A", "winget").with_version("1.0"),
                PackageRecord::new("B", "winget"),
            ]
        );
    }

    #[test]
    fn test_reduce_sorts_ordinally() {
        let input = vec![
            PackageRecord::new("b.tool", "winget"),
            PackageRecord::new("Zoom.Zoom", "winget"),
            PackageRecord::new("7zip.7zip", "winget"),
            PackageRecord::new("Alacritty.Alacritty", "winget"),
        ];

        let reduced = reduce(input);

        // Uppercase sorts before lowercase in ordinal order
        assert_eq!(
            ids(&reduced),
            vec!["7zip.7zip", "Alacritty.Alacritty", "Zoom.Zoom", "b.tool"]
        );
    }

    #[test]
    fn test_reduce_is_case_sensitive() {
        let input = vec![
            PackageRecord::new("git.git", "winget"),
            PackageRecord::new("Git.Git", "winget"),
        ];
        assert_eq!(ids(&reduce(input)), vec!["Git.Git", "git.git"]);
    }

    #[test]
    fn test_reduce_empty() {
        assert!(reduce(Vec::new()).is_empty());
    }

    fn record_strategy() -> impl Strategy<Value = PackageRecord> {
        (
            prop::sample::select(vec!["A", "B", "C", "Git.Git", "git.git", "Z"]),
            prop::sample::select(vec!["winget", "msstore"]),
            prop::option::of("[0-9]\\.[0-9]"),
        )
            .prop_map(|(id, source, version)| PackageRecord {
                identifier: id.to_string(),
                source_name: source.to_string(),
                version,
            })
    }

    proptest! {
        #[test]
        fn reduce_is_idempotent(input in prop::collection::vec(record_strategy(), 0..20)) {
            let once = reduce(input);
            let twice = reduce(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn reduce_output_is_sorted_and_unique(input in prop::collection::vec(record_strategy(), 0..20)) {
            let reduced = reduce(input);
            for pair in reduced.windows(2) {
                prop_assert!(pair[0].identifier < pair[1].identifier);
            }
        }

        #[test]
        fn reduce_preserves_first_occurrence(input in prop::collection::vec(record_strategy(), 0..20)) {
            let reduced = reduce(input.clone());
            for record in &reduced {
                let first = input.iter().find(|r| r.identifier == record.identifier);
                prop_assert_eq!(Some(record), first);
            }
            let distinct: HashSet<_> = input.iter().map(|r| &r.identifier).collect();
            prop_assert_eq!(reduced.len(), distinct.len());
        }
    }
}
