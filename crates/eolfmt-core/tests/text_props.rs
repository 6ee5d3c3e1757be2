use eolfmt_core::{apply_text_edits, normalize_text_edits, LineIndex, TextEdit, TextRange, TextSize};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 256;

fn arb_char() -> impl Strategy<Value = char> {
    // Keep strings readable and shrinking effective by drawing from a small pool
    // of ASCII plus a few Unicode edge cases:
    // - newlines (`\n`, `\r`, and `\r\n` combinations)
    // - multi-byte UTF-8 chars
    prop_oneof![
        12 => prop::sample::select(vec![
            'a', 'b', 'c', 'x', 'y', 'z', '0', '1', '2', ' ', '\t', '.', ',',
        ]),
        3 => Just('\n'),
        2 => Just('\r'),
        2 => Just('é'),        // 2-byte UTF-8
        2 => Just('中'),        // 3-byte UTF-8
        2 => Just('😀'),        // 4-byte UTF-8
        1 => Just('\u{0301}'), // combining acute accent
    ]
}

fn arb_text(min_chars: usize, max_chars: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_char(), min_chars..=max_chars)
        .prop_map(|chars| chars.into_iter().collect())
}

fn char_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    boundaries
}

#[derive(Clone, Debug)]
struct PlanStep {
    insert: bool,
    insert_text: String,
    replace_len: u8,
    replace_text: String,
}

fn arb_plan_step() -> impl Strategy<Value = PlanStep> {
    (any::<bool>(), arb_text(0, 8), 0u8..=4u8, arb_text(0, 8)).prop_map(
        |(insert, insert_text, replace_len, replace_text)| PlanStep {
            insert,
            insert_text,
            replace_len,
            replace_text,
        },
    )
}

/// Build a set of non-overlapping edits over `boundaries`, one optional insert and one optional
/// replacement per boundary.
fn edits_from_plan(boundaries: &[usize], plan: &[PlanStep]) -> Vec<TextEdit> {
    debug_assert_eq!(boundaries.len(), plan.len());

    let mut edits = Vec::new();
    let last = boundaries.len().saturating_sub(1);

    let mut i = 0usize;
    while i <= last {
        let step = &plan[i];
        let start = TextSize::from(boundaries[i] as u32);

        if step.insert && !step.insert_text.is_empty() {
            edits.push(TextEdit::insert(start, step.insert_text.clone()));
        }

        if i == last || step.replace_len == 0 {
            i += 1;
            continue;
        }

        let end_idx = (i + step.replace_len as usize).min(last);
        let end = TextSize::from(boundaries[end_idx] as u32);
        edits.push(TextEdit::new(
            TextRange::new(start, end),
            step.replace_text.clone(),
        ));
        // Skip past the replaced region; the next insert may sit at `end`.
        i = end_idx.max(i + 1);
        if i <= last && plan[i].insert {
            // An insert at the replaced range end would be coalesced, not overlap, but keep the
            // plan simple by starting fresh after the replacement.
            i += 1;
        }
    }

    edits
}

fn arb_text_and_edits() -> impl Strategy<Value = (String, Vec<TextEdit>)> {
    arb_text(0, 48).prop_flat_map(|text| {
        let boundaries = char_boundaries(&text);
        let len = boundaries.len();
        (
            Just(text),
            Just(boundaries),
            prop::collection::vec(arb_plan_step(), len..=len),
        )
            .prop_map(|(text, boundaries, plan)| {
                let edits = edits_from_plan(&boundaries, &plan);
                (text, edits)
            })
    })
}

/// Apply edits one at a time from the back of the text, which keeps earlier offsets valid.
fn apply_sequentially(text: &str, edits: &[TextEdit]) -> String {
    let mut sorted = edits.to_vec();
    sorted.sort_by_key(|e| (e.range.start(), e.range.end()));
    let mut out = text.to_string();
    for edit in sorted.iter().rev() {
        let start = usize::from(edit.range.start());
        let end = usize::from(edit.range.end());
        out.replace_range(start..end, &edit.replacement);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn batch_application_matches_back_to_front_application((text, edits) in arb_text_and_edits()) {
        let batch = apply_text_edits(&text, &edits).expect("plan produces valid edits");
        prop_assert_eq!(batch, apply_sequentially(&text, &edits));
    }

    #[test]
    fn normalized_edits_are_sorted_and_disjoint((text, edits) in arb_text_and_edits()) {
        let mut normalized = edits.clone();
        normalize_text_edits(&text, &mut normalized).expect("plan produces valid edits");
        for pair in normalized.windows(2) {
            prop_assert!(pair[0].range.end() < pair[1].range.start());
        }
        prop_assert_eq!(
            apply_text_edits(&text, &normalized).unwrap(),
            apply_text_edits(&text, &edits).unwrap()
        );
    }

    #[test]
    fn lines_tile_the_text(text in arb_text(0, 64)) {
        let index = LineIndex::new(&text);
        let mut expected_start = TextSize::from(0);
        let mut rebuilt = String::new();
        for line in index.lines() {
            prop_assert_eq!(line.range.start(), expected_start);
            prop_assert_eq!(line.range.end(), line.break_range().start());
            let content = &text[line.range];
            prop_assert!(!content.contains('\n') && !content.contains('\r'));
            let terminator = &text[line.break_range()];
            prop_assert!(matches!(terminator, "" | "\n" | "\r" | "\r\n"));
            rebuilt.push_str(&text[line.range_including_break]);
            expected_start = line.range_including_break.end();
        }
        prop_assert_eq!(expected_start, index.text_len());
        prop_assert_eq!(rebuilt, text);
    }

    #[test]
    fn only_the_last_line_is_unterminated(text in arb_text(0, 64)) {
        let index = LineIndex::new(&text);
        let count = index.line_count();
        for line in 0..count {
            let empty = index.line_break_range(line).unwrap().is_empty();
            prop_assert_eq!(empty, line + 1 == count);
        }
    }
}
