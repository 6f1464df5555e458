//! Line-level diff: compare an actual line sequence against an expected one.
//!
//! Uses the `similar` crate (Myers diff algorithm) to align matching lines.
//! Every maximal run of non-matching lines between two matches becomes one
//! [`Delta`], classified by which side has content in the run.

use std::fmt;
use std::io::Read;
use std::ops::Range;

use avow_types::{split_lines, Charset, FileSubject};
use similar::udiff::UnifiedHunkHeader;
use similar::{capture_diff_slices, group_diff_ops, Algorithm, ChangeTag, DiffTag};
use tracing::debug;

use crate::error::{DiffError, DiffResult};

/// How a run of lines diverges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeltaKind {
    /// Both sides have lines in the run, and they differ.
    Changed,
    /// Only the expected side has lines; the actual side lacks them.
    Missing,
    /// Only the actual side has lines; the expected side lacks them.
    Extra,
}

/// A contiguous block of lines from one side of a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Index of the first line of the block (0-based).
    pub position: usize,
    /// The lines of the block; empty when this side has no content.
    pub lines: Vec<String>,
}

impl Chunk {
    /// Index one past the last line of the block.
    pub fn end(&self) -> usize {
        self.position + self.lines.len()
    }
}

/// One unit of divergence between the expected and actual sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta {
    pub kind: DeltaKind,
    /// The block as it appears in the expected sequence.
    pub expected: Chunk,
    /// The block as it appears in the actual sequence.
    pub actual: Chunk,
}

impl Delta {
    /// The 1-based line in the actual sequence where this delta starts.
    pub fn line_number(&self) -> usize {
        self.actual.position + 1
    }

    /// The 1-based line in the expected sequence where this delta starts.
    pub fn expected_line_number(&self) -> usize {
        self.expected.position + 1
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line_number();
        match self.kind {
            DeltaKind::Changed => write!(
                f,
                "Changed content at line {line}:\nexpecting:\n  {}\nbut was:\n  {}\n",
                format_lines(&self.expected.lines),
                format_lines(&self.actual.lines)
            ),
            DeltaKind::Missing => write!(
                f,
                "Missing content at line {line}:\n  {}\n",
                format_lines(&self.expected.lines)
            ),
            DeltaKind::Extra => write!(
                f,
                "Extra content at line {line}:\n  {}\n",
                format_lines(&self.actual.lines)
            ),
        }
    }
}

/// The ordered deltas that turn the expected sequence into the actual one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patch {
    deltas: Vec<Delta>,
}

impl Patch {
    /// Returns `true` if the sequences were identical.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Number of deltas.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    pub fn into_deltas(self) -> Vec<Delta> {
        self.deltas
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Delta> {
        self.deltas.iter()
    }

    /// Apply the patch to the expected sequence, producing the actual one.
    ///
    /// Fails if the expected side of a delta does not match `expected` at the
    /// recorded position.
    pub fn apply_to<S: AsRef<str>>(&self, expected: &[S]) -> DiffResult<Vec<String>> {
        let mut result = Vec::with_capacity(expected.len());
        let mut cursor = 0;
        for delta in &self.deltas {
            let chunk = &delta.expected;
            if chunk.position < cursor || chunk.end() > expected.len() {
                return Err(DiffError::PatchConflict {
                    line: delta.expected_line_number(),
                    reason: format!(
                        "block {}..{} is outside the unpatched range {}..{}",
                        chunk.position,
                        chunk.end(),
                        cursor,
                        expected.len()
                    ),
                });
            }
            let original = &expected[chunk.position..chunk.end()];
            if !original.iter().map(as_str).eq(chunk.lines.iter().map(String::as_str)) {
                return Err(DiffError::PatchConflict {
                    line: delta.expected_line_number(),
                    reason: "expected lines do not match".into(),
                });
            }
            result.extend(
                expected[cursor..chunk.position]
                    .iter()
                    .map(|l| as_str(l).to_owned()),
            );
            result.extend(delta.actual.lines.iter().cloned());
            cursor = chunk.end();
        }
        result.extend(expected[cursor..].iter().map(|l| as_str(l).to_owned()));
        Ok(result)
    }

    /// Render the patch in unified diff format.
    ///
    /// `expected` must be the sequence the patch was computed against; it
    /// supplies the `context` unchanged lines shown around each hunk. Fails
    /// with [`DiffError::PatchConflict`] if the patch does not apply to it.
    pub fn unified<S: AsRef<str>>(
        &self,
        expected_name: &str,
        actual_name: &str,
        expected: &[S],
        context: usize,
    ) -> DiffResult<String> {
        if self.deltas.is_empty() {
            return Ok(String::new());
        }
        let patched = self.apply_to(expected)?;
        let old: Vec<&str> = expected.iter().map(as_str).collect();
        let new: Vec<&str> = patched.iter().map(String::as_str).collect();

        let mut out = format!("--- {expected_name}\n+++ {actual_name}\n");
        let ops = capture_diff_slices(Algorithm::Myers, &old, &new);
        for group in group_diff_ops(ops, context) {
            out.push_str(&format!("{}\n", UnifiedHunkHeader::new(&group)));
            for op in &group {
                for change in op.iter_changes(&old[..], &new[..]) {
                    let sign = match change.tag() {
                        ChangeTag::Equal => ' ',
                        ChangeTag::Delete => '-',
                        ChangeTag::Insert => '+',
                    };
                    out.push_str(&format!("{sign}{}\n", change.value()));
                }
            }
        }
        Ok(out)
    }
}

fn as_str<S: AsRef<str>>(line: &S) -> &str {
    line.as_ref()
}

/// Render lines one per row, the way failure messages list them.
fn format_lines(lines: &[String]) -> String {
    let items: Vec<String> = lines.iter().map(|l| format!("{l:?}")).collect();
    format!("[{}]", items.join(",\n   "))
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a Delta;
    type IntoIter = std::slice::Iter<'a, Delta>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.iter()
    }
}

impl IntoIterator for Patch {
    type Item = Delta;
    type IntoIter = std::vec::IntoIter<Delta>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.into_iter()
    }
}

/// Compute the deltas between two in-memory line sequences.
///
/// The result is empty if and only if the sequences are identical.
pub fn diff_lines<A: AsRef<str>, E: AsRef<str>>(actual: &[A], expected: &[E]) -> Patch {
    let actual: Vec<&str> = actual.iter().map(as_str).collect();
    let expected: Vec<&str> = expected.iter().map(as_str).collect();

    let mut deltas = Vec::new();
    let mut run: Option<(Range<usize>, Range<usize>)> = None;

    for op in capture_diff_slices(Algorithm::Myers, &expected, &actual) {
        let (tag, old, new) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            if let Some((old, new)) = run.take() {
                deltas.extend(make_delta(&expected, &actual, old, new));
            }
            continue;
        }
        run = Some(match run {
            Some((run_old, run_new)) => (run_old.start..old.end, run_new.start..new.end),
            None => (old, new),
        });
    }
    if let Some((old, new)) = run {
        deltas.extend(make_delta(&expected, &actual, old, new));
    }

    debug!(
        expected_lines = expected.len(),
        actual_lines = actual.len(),
        deltas = deltas.len(),
        "line diff computed"
    );
    Patch { deltas }
}

fn make_delta(
    expected: &[&str],
    actual: &[&str],
    old: Range<usize>,
    new: Range<usize>,
) -> Option<Delta> {
    let kind = match (old.is_empty(), new.is_empty()) {
        (false, false) => DeltaKind::Changed,
        (false, true) => DeltaKind::Missing,
        (true, false) => DeltaKind::Extra,
        (true, true) => return None,
    };
    let chunk = |lines: &[&str], range: Range<usize>| Chunk {
        position: range.start,
        lines: lines[range].iter().map(|l| (*l).to_owned()).collect(),
    };
    Some(Delta {
        kind,
        expected: chunk(expected, old),
        actual: chunk(actual, new),
    })
}

/// Diff two texts line by line.
pub fn diff_texts(actual: &str, expected: &str) -> Patch {
    diff_lines(&split_lines(actual), &split_lines(expected))
}

/// Diff the content of two file subjects, each decoded with its own charset.
pub fn diff_subjects<A, E>(
    actual: &A,
    actual_charset: Charset,
    expected: &E,
    expected_charset: Charset,
) -> DiffResult<Patch>
where
    A: FileSubject + ?Sized,
    E: FileSubject + ?Sized,
{
    let actual_lines = subject_lines(actual, actual_charset)?;
    let expected_lines = subject_lines(expected, expected_charset)?;
    Ok(diff_lines(&actual_lines, &expected_lines))
}

/// Diff the content of a file subject against an in-memory text.
pub fn diff_subject_and_text<A>(actual: &A, expected: &str, charset: Charset) -> DiffResult<Patch>
where
    A: FileSubject + ?Sized,
{
    let actual_lines = subject_lines(actual, charset)?;
    Ok(diff_lines(&actual_lines, &split_lines(expected)))
}

/// Diff two UTF-8 streams line by line.
pub fn diff_readers<A: Read, E: Read>(actual: A, expected: E) -> DiffResult<Patch> {
    let actual_lines = read_lines(actual, Charset::Utf8, "actual stream")?;
    let expected_lines = read_lines(expected, Charset::Utf8, "expected stream")?;
    Ok(diff_lines(&actual_lines, &expected_lines))
}

fn subject_lines<S: FileSubject + ?Sized>(subject: &S, charset: Charset) -> DiffResult<Vec<String>> {
    let name = subject.display_name();
    let stream = subject
        .open()
        .map_err(|e| DiffError::io(format!("unable to open {name}"), e))?;
    read_lines(stream, charset, &name)
}

fn read_lines(mut reader: impl Read, charset: Charset, name: &str) -> DiffResult<Vec<String>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| DiffError::io(format!("unable to read {name}"), e))?;
    let text = charset.decode(&bytes)?;
    Ok(split_lines(&text))
}
