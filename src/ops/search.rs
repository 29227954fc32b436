use crate::model::checklist::{ChecklistFields, ChecklistRecord};

/// A picker hit: index into the record list plus the matched character
/// positions within the record's label (for highlighting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerHit {
    pub index: usize,
    pub matched: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Subsequence matching
// ---------------------------------------------------------------------------

/// Match `query` as an ordered subsequence of `target`, ignoring case.
/// Returns the matched char indices, or None. An empty query matches
/// everything with no highlighted positions.
pub fn subsequence_match(query: &str, target: &str) -> Option<Vec<usize>> {
    let query_lower: Vec<char> = query.chars().flat_map(|c| c.to_lowercase()).collect();
    if query_lower.is_empty() {
        return Some(Vec::new());
    }

    let mut matched = Vec::with_capacity(query_lower.len());
    let mut qi = 0;
    for (idx, ch) in target.chars().enumerate() {
        if qi == query_lower.len() {
            break;
        }
        // Compare against the first lowercase char only; multi-char
        // lowercase expansions are rare in names
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        if lower == query_lower[qi] {
            matched.push(idx);
            qi += 1;
        }
    }

    if qi == query_lower.len() {
        Some(matched)
    } else {
        None
    }
}

/// Filter records for the picker. Order follows the record list; there is
/// no ranking.
pub fn filter_records<E: ChecklistFields>(
    records: &[ChecklistRecord<E>],
    query: &str,
) -> Vec<PickerHit> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, rec)| {
            subsequence_match(query, rec.label()).map(|matched| PickerHit { index, matched })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::checklist::OnboardingFields;
    use pretty_assertions::assert_eq;

    fn rec(name: &str, department: &str) -> ChecklistRecord<OnboardingFields> {
        ChecklistRecord {
            name: name.into(),
            department: department.into(),
            ..Default::default()
        }
    }

    #[test]
    fn matches_in_order() {
        assert_eq!(subsequence_match("fnc", "Finance"), Some(vec![0, 2, 5]));
        assert_eq!(subsequence_match("cnf", "Finance"), None);
    }

    #[test]
    fn case_insensitive() {
        assert!(subsequence_match("STUDIO", "studio onboarding").is_some());
        assert!(subsequence_match("it", "IT Support").is_some());
    }

    #[test]
    fn spaces_in_query_must_match() {
        assert_eq!(subsequence_match("de s", "Desk setup"), Some(vec![0, 1, 4, 5]));
        assert_eq!(subsequence_match("d s", "Dispatch"), None);
    }

    #[test]
    fn empty_query_matches_all() {
        assert_eq!(subsequence_match("", "anything"), Some(vec![]));
        let records = vec![rec("A", "X"), rec("B", "Y")];
        assert_eq!(filter_records(&records, "").len(), 2);
    }

    #[test]
    fn filter_keeps_record_order() {
        let records = vec![
            rec("Studio artist", "Studio"),
            rec("Finance clerk", "Finance"),
            rec("Sound tech", "Studio"),
        ];
        let hits: Vec<usize> = filter_records(&records, "st")
            .into_iter()
            .map(|h| h.index)
            .collect();
        assert_eq!(hits, vec![0, 2]);
    }

    #[test]
    fn unnamed_records_match_on_department() {
        let records = vec![rec("", "Human Resources")];
        assert_eq!(filter_records(&records, "hr").len(), 1);
    }
}
