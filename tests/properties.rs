use hashline::{EditKind, Error, HashEdit, apply_hash_edit, annotate, compute_line_hash, strip, verify_hash};
use proptest::prelude::*;

const PREFIXES: [Option<&str>; 4] = [Some(hashline::DEFAULT_PREFIX), None, Some("> "), Some("+")];

// ===========================================================================
// Annotate / strip round trip
// ===========================================================================

proptest! {
    #[test]
    fn prop_strip_inverts_annotate(
        text in "[a-z0-9 \t\r\n|:#+-]{0,200}",
        length in 3_usize..=4,
        prefix_index in 0_usize..4,
    ) {
        let prefix = PREFIXES[prefix_index];
        let annotated = annotate(&text, Some(length), prefix);
        prop_assert_eq!(strip(&annotated, prefix), text);
    }

    #[test]
    fn prop_every_annotated_line_verifies(text in "[a-z ]{0,12}(\n[a-z ]{0,12}){0,30}") {
        let annotated = annotate(&text, None, None);
        for line in annotated.split('\n') {
            let reference = hashline::normalize_hash_ref(line).unwrap();
            let (number, hash) = reference.split_once(':').unwrap();
            let outcome = verify_hash(number.parse().unwrap(), hash, &text, None, None);
            prop_assert!(outcome.is_fresh(), "{} did not verify", reference);
        }
    }

    #[test]
    fn prop_trailing_whitespace_never_matters(index in 0_usize..10_000, body in "[ -~]{0,40}", pad in "[ \t]{0,5}") {
        let padded = format!("{body}{pad}");
        prop_assert_eq!(compute_line_hash(index, &padded, 3), compute_line_hash(index, &body, 3));
    }
}

// ===========================================================================
// Fixed-length annotation stays editable
// ===========================================================================

proptest! {
    #[test]
    fn prop_every_line_annotated_at_fixed_length_is_editable(lines in prop::collection::vec("[a-z0-9]{0,4}", 1..60)) {
        let content = lines.join("\n");
        let annotated = annotate(&content, Some(3), Some(hashline::DEFAULT_PREFIX));

        for tagged in annotated.split('\n') {
            let edit = HashEdit {
                end_ref: None,
                operation: EditKind::Replace,
                replacement: Some("edited".to_string()),
                start_ref: tagged.to_string(),
            };
            let result = apply_hash_edit(&edit, &content, None);
            prop_assert!(result.is_ok(), "{} was refused: {:?}", tagged, result.err());
        }
    }
}

// ===========================================================================
// Failed edits leave the document alone
// ===========================================================================

proptest! {
    #[test]
    fn prop_stale_edit_is_rejected(lines in prop::collection::vec("[a-z]{1,8}", 1..20), pick in any::<prop::sample::Index>()) {
        let content = lines.join("\n");
        let index = pick.index(lines.len());
        let real = compute_line_hash(index, &lines[index], 3);
        let wrong = if real == "000" { "001" } else { "000" };

        let edit = HashEdit {
            end_ref: None,
            operation: EditKind::Replace,
            replacement: Some("changed".to_string()),
            start_ref: format!("{}:{wrong}", index + 1),
        };
        let is_stale = matches!(apply_hash_edit(&edit, &content, None), Err(Error::StaleReference { .. }));
        prop_assert!(is_stale);
    }
}
