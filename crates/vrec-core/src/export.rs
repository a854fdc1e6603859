//! Plain-text export views of extraction results.

use crate::models::record::ExtractionRecord;

/// Placeholder for a field that could not be read.
pub const UNKNOWN_PLACEHOLDER: &str = "不明";

/// One code per line, skipping records without a code.
pub fn codes_only(records: &[ExtractionRecord]) -> String {
    records
        .iter()
        .filter_map(|r| r.code.as_ref().map(|c| c.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `code amount` per record, in the format the reference parser reads back.
///
/// Missing codes and amounts (including failed images) are written as
/// [`UNKNOWN_PLACEHOLDER`].
pub fn code_amount_pairs(records: &[ExtractionRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let code = r.code.as_ref().map_or(UNKNOWN_PLACEHOLDER, |c| c.as_str());
            let amount = r
                .amount_digits()
                .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());
            format!("{} {}", code, amount)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Amount;
    use crate::reconcile::ReferenceTable;
    use crate::voucher::rules::validate_code;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<ExtractionRecord> {
        vec![
            ExtractionRecord::new("a.jpg", validate_code("ABCD1234EFGH5678"), Some(Amount::new(1500, "￥"))),
            ExtractionRecord::new("b.jpg", None, Some(Amount::new(300, "￥"))),
            ExtractionRecord::new("c.jpg", validate_code("WXYZ-0000-1111-2"), None),
            ExtractionRecord::failed("d.jpg", "boom"),
        ]
    }

    #[test]
    fn test_codes_only() {
        assert_eq!(codes_only(&records()), "ABCD1234EFGH5678\nWXYZ-0000-1111-2");
        assert_eq!(codes_only(&[]), "");
    }

    #[test]
    fn test_code_amount_pairs() {
        assert_eq!(
            code_amount_pairs(&records()),
            "ABCD1234EFGH5678 1500\n不明 300\nWXYZ-0000-1111-2 不明\n不明 不明"
        );
    }

    #[test]
    fn test_pairs_parse_back_as_reference() {
        let table = ReferenceTable::parse(&code_amount_pairs(&records()));
        assert_eq!(
            table.get("ABCD1234EFGH5678").unwrap().expected_digits.as_deref(),
            Some("1500")
        );
        assert_eq!(table.get("WXYZ-0000-1111-2").unwrap().expected_digits, None);
    }
}
