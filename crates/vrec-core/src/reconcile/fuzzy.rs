//! Nearest reference code by edit distance.

use serde::{Deserialize, Serialize};

use super::reference::ReferenceTable;

/// Closest reference code to an unmatched one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Reference code as typed.
    pub code: String,
    /// Edit distance with hyphens ignored on both sides.
    pub distance: usize,
}

/// Levenshtein distance with unit costs, over characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Pick the reference code closest to `code`, comparing with hyphens removed.
///
/// Ties go to the code that appears first in the table. Returns `None` only
/// for an empty table.
pub fn suggest_code(code: &str, table: &ReferenceTable) -> Option<Suggestion> {
    let target = code.replace('-', "");
    let mut best: Option<Suggestion> = None;

    for entry in table.iter() {
        let distance = edit_distance(&target, &entry.code.replace('-', ""));
        if best.as_ref().is_none_or(|b| distance < b.distance) {
            best = Some(Suggestion {
                code: entry.code.clone(),
                distance,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_edit_distance_basics() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("ABCD1234", "ABCD1234"), 0);
        assert_eq!(edit_distance("ギフト", "ギフド"), 1);
    }

    #[test]
    fn test_edit_distance_symmetric() {
        let codes = ["AAAABBBBCCCCDDDD", "AAAABBBBCCCCDDDE", "0AAABBBBCCCCDDD", "XYZ", ""];
        for a in codes {
            assert_eq!(edit_distance(a, a), 0);
            for b in codes {
                assert_eq!(edit_distance(a, b), edit_distance(b, a), "{a} / {b}");
            }
        }
    }

    #[test]
    fn test_tie_goes_to_first_reference() {
        let table = ReferenceTable::parse("AAAABBBBCCCCDDDD\nAAAABBBBCCCCDDDE");
        let suggestion = suggest_code("AAAABBBBCCCCDDDX", &table).unwrap();
        assert_eq!(suggestion.code, "AAAABBBBCCCCDDDD");
        assert_eq!(suggestion.distance, 1);

        let reversed = ReferenceTable::parse("AAAABBBBCCCCDDDE\nAAAABBBBCCCCDDDD");
        assert_eq!(
            suggest_code("AAAABBBBCCCCDDDX", &reversed).unwrap().code,
            "AAAABBBBCCCCDDDE"
        );
    }

    #[test]
    fn test_hyphens_ignored_but_reported_as_typed() {
        let table = ReferenceTable::parse("ZZZZ-ZZZZ-ZZZZ-ZZZZ\nABCD-EFGH-1234-5678");
        let suggestion = suggest_code("ABCDEFGH12345679", &table).unwrap();
        assert_eq!(suggestion.code, "ABCD-EFGH-1234-5678");
        assert_eq!(suggestion.distance, 1);
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(suggest_code("ABCDEFGH12345678", &ReferenceTable::new()), None);
    }
}
