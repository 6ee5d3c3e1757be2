//! Minimal edits between two snapshots of a document.

use eolfmt_core::{LineIndex, TextEdit, TextRange, TextSize};

/// The line diff below is quadratic in the worst case; above this many lines we fall back to a
/// single replacement covering the differing region.
const MAX_MYERS_LINES: usize = 2000;

/// Compute minimal edits that transform `original` into `formatted`.
///
/// The edits are sorted, non-overlapping, and refer to offsets in `original`. When both texts
/// have the same number of lines (the common case for whitespace passes) every changed line gets
/// its own edit.
pub fn minimal_text_edits(original: &str, formatted: &str) -> Vec<TextEdit> {
    if original == formatted {
        return Vec::new();
    }

    let original_lines = LineSlices::new(original);
    let formatted_lines = LineSlices::new(formatted);

    if original_lines.len() == formatted_lines.len() {
        let edits = (0..original_lines.len())
            .filter_map(|idx| line_edit(&original_lines, idx, formatted_lines.lines[idx]))
            .collect();
        return coalesce(edits);
    }

    if original_lines.len().saturating_add(formatted_lines.len()) > MAX_MYERS_LINES {
        return minimal_text_edit(original, formatted).into_iter().collect();
    }

    let ops = myers_diff_ops(&original_lines.lines, &formatted_lines.lines);
    let mut edits = Vec::new();
    for chunk in diff_chunks(&ops) {
        let original_count = chunk.original.len();
        let formatted_count = chunk.formatted.len();

        if original_count == formatted_count {
            for (a, b) in chunk.original.zip(chunk.formatted) {
                edits.extend(line_edit(&original_lines, a, formatted_lines.lines[b]));
            }
        } else {
            let original_start = original_lines.offsets[chunk.original.start];
            let original_end = original_lines.offsets[chunk.original.end];
            let formatted_start = formatted_lines.offsets[chunk.formatted.start];
            let formatted_end = formatted_lines.offsets[chunk.formatted.end];

            let edit = minimal_text_edit(
                &original[original_start..original_end],
                &formatted[formatted_start..formatted_end],
            );
            edits.extend(edit.map(|edit| shifted(edit, original_start)));
        }
    }

    edits.sort_by_key(|edit| (edit.range.start(), edit.range.end()));
    coalesce(edits)
}

/// Merge edits that touch: an insert at the end of one line and an edit at the start of the next
/// would otherwise share an offset.
fn coalesce(edits: Vec<TextEdit>) -> Vec<TextEdit> {
    let mut merged: Vec<TextEdit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if let Some(last) = merged.last_mut() {
            if last.range.end() == edit.range.start() {
                last.range = TextRange::new(last.range.start(), edit.range.end());
                last.replacement.push_str(&edit.replacement);
                continue;
            }
        }
        merged.push(edit);
    }
    merged
}

/// Lines of a text, each including its terminator, with their start offsets.
struct LineSlices<'a> {
    lines: Vec<&'a str>,
    /// `offsets[i]` is where line `i` starts; the final entry is the text length.
    offsets: Vec<usize>,
}

impl<'a> LineSlices<'a> {
    fn new(text: &'a str) -> Self {
        let index = LineIndex::new(text);
        let mut lines = Vec::with_capacity(index.line_count() as usize);
        let mut offsets = Vec::with_capacity(index.line_count() as usize + 1);
        for line in index.lines() {
            offsets.push(usize::from(line.range_including_break.start()));
            lines.push(&text[line.range_including_break]);
        }
        offsets.push(text.len());
        Self { lines, offsets }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }
}

fn line_edit(original: &LineSlices<'_>, idx: usize, formatted_line: &str) -> Option<TextEdit> {
    minimal_text_edit(original.lines[idx], formatted_line)
        .map(|edit| shifted(edit, original.offsets[idx]))
}

fn shifted(edit: TextEdit, base: usize) -> TextEdit {
    let base = TextSize::from(base as u32);
    TextEdit::new(
        TextRange::new(base + edit.range.start(), base + edit.range.end()),
        edit.replacement,
    )
}

fn minimal_text_edit(original: &str, formatted: &str) -> Option<TextEdit> {
    if original == formatted {
        return None;
    }

    let start = common_prefix_len(original, formatted);
    let (orig_end, fmt_end) = common_suffix_ends(original, formatted, start);
    let range = TextRange::new(
        TextSize::from(start as u32),
        TextSize::from(orig_end as u32),
    );

    Some(TextEdit::new(range, &formatted[start..fmt_end]))
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(ac, bc)| ac == bc)
        .map(|(ch, _)| ch.len_utf8())
        .sum()
}

/// End offsets of the differing region once the common suffix (not reaching into the common
/// prefix) is removed.
fn common_suffix_ends(a: &str, b: &str, prefix: usize) -> (usize, usize) {
    let mut a_end = a.len();
    let mut b_end = b.len();

    for ((a_idx, a_ch), (b_idx, b_ch)) in a.char_indices().rev().zip(b.char_indices().rev()) {
        if a_idx < prefix || b_idx < prefix || a_ch != b_ch {
            break;
        }
        a_end = a_idx;
        b_end = b_idx;
    }

    (a_end, b_end)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DiffOp {
    Equal,
    Insert,
    Delete,
}

/// A run of non-equal lines: `original` lines replaced by `formatted` lines.
#[derive(Clone, Debug, PartialEq, Eq)]
struct DiffChunk {
    original: std::ops::Range<usize>,
    formatted: std::ops::Range<usize>,
}

fn diff_chunks(ops: &[DiffOp]) -> Vec<DiffChunk> {
    let mut chunks = Vec::new();
    let mut a_idx = 0usize;
    let mut b_idx = 0usize;
    let mut open: Option<(usize, usize)> = None;

    for op in ops {
        match op {
            DiffOp::Equal => {
                if let Some((sa, sb)) = open.take() {
                    chunks.push(DiffChunk {
                        original: sa..a_idx,
                        formatted: sb..b_idx,
                    });
                }
                a_idx += 1;
                b_idx += 1;
            }
            DiffOp::Delete => {
                open.get_or_insert((a_idx, b_idx));
                a_idx += 1;
            }
            DiffOp::Insert => {
                open.get_or_insert((a_idx, b_idx));
                b_idx += 1;
            }
        }
    }

    if let Some((sa, sb)) = open {
        chunks.push(DiffChunk {
            original: sa..a_idx,
            formatted: sb..b_idx,
        });
    }

    chunks
}

/// Myers' O(ND) diff, returning the edit script from `a` to `b`.
fn myers_diff_ops<T: Eq>(a: &[T], b: &[T]) -> Vec<DiffOp> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = n + m;
    let at = |k: isize| (k + max) as usize;

    let mut v = vec![0isize; 2 * max as usize + 1];
    let mut trace: Vec<Vec<isize>> = Vec::new();
    let mut found_d = 0isize;

    'outer: for d in 0..=max {
        for k in (-d..=d).step_by(2) {
            let mut x = if moves_down(&v, max, k, d) {
                v[at(k + 1)]
            } else {
                v[at(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[at(k)] = x;

            if x >= n && y >= m {
                found_d = d;
                trace.push(v.clone());
                break 'outer;
            }
        }

        trace.push(v.clone());
    }

    let mut x = n;
    let mut y = m;
    let mut ops = Vec::new();

    for d in (1..=found_d).rev() {
        let v = &trace[(d - 1) as usize];
        let k = x - y;
        let prev_k = if moves_down(v, max, k, d) { k + 1 } else { k - 1 };
        let prev_x = v[at(prev_k)];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            ops.push(DiffOp::Equal);
            x -= 1;
            y -= 1;
        }

        if x == prev_x {
            ops.push(DiffOp::Insert);
            y -= 1;
        } else {
            ops.push(DiffOp::Delete);
            x -= 1;
        }
    }

    while x > 0 && y > 0 {
        ops.push(DiffOp::Equal);
        x -= 1;
        y -= 1;
    }
    while x > 0 {
        ops.push(DiffOp::Delete);
        x -= 1;
    }
    while y > 0 {
        ops.push(DiffOp::Insert);
        y -= 1;
    }

    ops.reverse();
    ops
}

/// Whether the furthest path on diagonal `k` is reached by moving down (an insertion) from
/// diagonal `k + 1` rather than right (a deletion) from `k - 1`. `v` is indexed by `k + max`.
fn moves_down(v: &[isize], max: isize, k: isize, d: isize) -> bool {
    let at = |k: isize| (k + max) as usize;
    k == -d || (k != d && v[at(k - 1)] < v[at(k + 1)])
}
