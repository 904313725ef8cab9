//! Deduplicating merge of contact sequences: the pure half of the
//! Combine operation (and of single-list dedup on ingest).

use std::collections::HashMap;

use crate::contact::Contact;

/// Merge contact sequences in order, deduplicating on the normalized
/// phone number.
///
/// The first contact seen for a phone wins and keeps its position. A
/// later duplicate only contributes its name, and only when the winner
/// has none (name enrichment); an existing name is never overwritten.
/// Inputs are not modified.
pub fn merge_contacts<'a, I>(sources: I) -> Vec<Contact>
where
    I: IntoIterator<Item = &'a [Contact]>,
{
    let mut index_by_phone: HashMap<&'a str, usize> = HashMap::new();
    let mut merged: Vec<Contact> = Vec::new();

    for source in sources {
        for contact in source {
            match index_by_phone.get(contact.phone.as_str()) {
                Some(&at) => {
                    if merged[at].name.is_none() && contact.name.is_some() {
                        merged[at].name = contact.name.clone();
                    }
                }
                None => {
                    index_by_phone.insert(&contact.phone, merged.len());
                    merged.push(contact.clone());
                }
            }
        }
    }

    merged
}

/// Dedup a single contact sequence, keeping first occurrences.
pub fn dedupe_contacts(contacts: &[Contact]) -> Vec<Contact> {
    merge_contacts([contacts])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn c(phone: &str, name: Option<&str>) -> Contact {
        Contact::new(phone, name.map(String::from))
    }

    #[test]
    fn test_disjoint_lists_concatenate_in_order() {
        let a = vec![c("+919876543210", Some("Alice"))];
        let b = vec![c("+919876543211", Some("Bob"))];
        let merged = merge_contacts([a.as_slice(), b.as_slice()]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].phone, "+919876543210");
        assert_eq!(merged[1].phone, "+919876543211");
    }

    #[test]
    fn test_duplicate_phone_collapses_to_one() {
        let a = vec![c("+919876543210", Some("Alice"))];
        let b = vec![c("+919876543210", None)];
        let merged = merge_contacts([a.as_slice(), b.as_slice()]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_name_backfilled_from_later_duplicate() {
        let a = vec![c("+919876543210", None)];
        let b = vec![c("+919876543210", Some("Alice"))];
        let merged = merge_contacts([a.as_slice(), b.as_slice()]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_first_seen_name_never_overwritten() {
        let a = vec![c("+919876543210", Some("Alice"))];
        let b = vec![c("+919876543210", Some("Alicia"))];
        let merged = merge_contacts([a.as_slice(), b.as_slice()]);

        assert_eq!(merged[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_first_seen_position_kept_across_lists() {
        let a = vec![c("+911111111111", None), c("+912222222222", None)];
        let b = vec![c("+912222222222", Some("Two")), c("+913333333333", None)];
        let merged = merge_contacts([a.as_slice(), b.as_slice()]);

        let phones: Vec<&str> = merged.iter().map(|c| c.phone.as_str()).collect();
        assert_eq!(
            phones,
            vec!["+911111111111", "+912222222222", "+913333333333"]
        );
        assert_eq!(merged[1].name.as_deref(), Some("Two"));
    }

    #[test]
    fn test_dedupe_within_single_list() {
        let contacts = vec![
            c("+919876543210", None),
            c("+919876543211", Some("B")),
            c("+919876543210", Some("A")),
        ];
        let deduped = dedupe_contacts(&contacts);

        assert_eq!(deduped.len(), 2);
        // Backfill applies within a single list too.
        assert_eq!(deduped[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_contacts([]).is_empty());
        assert!(merge_contacts([&[][..], &[][..]]).is_empty());
    }
}
