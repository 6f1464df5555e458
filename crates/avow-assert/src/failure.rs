//! Structured assertion failures and their messages.

use std::fmt;

use avow_diff::{BinaryDiffResult, ByteAt, Delta};
use avow_digest::DigestDiff;
use avow_types::Charset;

/// Context shared by all checks of one assertion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssertionInfo {
    description: Option<String>,
}

impl AssertionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a description shown in front of every failure message.
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// `"[description] "`, or nothing without a description.
    pub fn prefix(&self) -> String {
        match &self.description {
            Some(d) => format!("[{d}] "),
            None => String::new(),
        }
    }
}

/// Why a subject failed an assertion.
///
/// Subjects are stored already rendered: a file as `File <name>`, a stream
/// as `InputStream`, a value with its `Debug` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    ActualIsNull,
    ShouldExist {
        actual: String,
    },
    ShouldBeFile {
        actual: String,
    },
    ShouldBeReadable {
        actual: String,
    },
    ShouldHaveDigest {
        subject: String,
        diff: DigestDiff,
    },
    ShouldHaveBinaryContent {
        subject: String,
        offset: u64,
        actual: ByteAt,
        expected: ByteAt,
    },
    ShouldHaveSameContent {
        subject: String,
        expected: String,
        deltas: Vec<Delta>,
        omitted: usize,
    },
    /// Two streams differ; streams have no names to show.
    ShouldHaveSameStreamContent {
        deltas: Vec<Delta>,
        omitted: usize,
    },
    ShouldHaveContent {
        subject: String,
        charset: Charset,
        deltas: Vec<Delta>,
        omitted: usize,
    },
    ShouldBeEmpty {
        subject: String,
    },
    ShouldNotBeEmpty {
        subject: String,
    },
    ShouldBeEqual {
        actual: String,
        expected: String,
        comparison: Option<String>,
    },
    ShouldNotBeEqual {
        actual: String,
        other: String,
        comparison: Option<String>,
    },
    ShouldBeBefore {
        actual: String,
        other: String,
        comparison: Option<String>,
    },
    ShouldBeAfter {
        actual: String,
        other: String,
        comparison: Option<String>,
    },
    ShouldBeIn {
        actual: String,
        values: String,
        comparison: Option<String>,
    },
}

impl Failure {
    /// The failure for a binary diff, or `None` if the contents matched.
    pub fn binary_content(subject: impl Into<String>, result: &BinaryDiffResult) -> Option<Self> {
        match *result {
            BinaryDiffResult::NoDiff => None,
            BinaryDiffResult::Diff {
                offset,
                actual,
                expected,
            } => Some(Self::ShouldHaveBinaryContent {
                subject: subject.into(),
                offset,
                actual,
                expected,
            }),
        }
    }
}

fn write_deltas(f: &mut fmt::Formatter<'_>, deltas: &[Delta], omitted: usize) -> fmt::Result {
    for (i, delta) in deltas.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write!(f, "{delta}")?;
    }
    if omitted > 0 {
        write!(f, "\n... and {omitted} more differences")?;
    }
    Ok(())
}

fn write_comparison(f: &mut fmt::Formatter<'_>, comparison: &Option<String>) -> fmt::Result {
    match comparison {
        Some(description) => write!(f, "\nwhen comparing values using {description}"),
        None => Ok(()),
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActualIsNull => write!(f, "\nExpecting actual not to be null"),
            Self::ShouldExist { actual } => {
                write!(f, "\nExpecting file:\n  <{actual}>\nto exist.")
            }
            Self::ShouldBeFile { actual } => {
                write!(f, "\nExpecting:\n  <{actual}>\nto be an existing file.")
            }
            Self::ShouldBeReadable { actual } => {
                write!(f, "\nExpecting actual:\n  <{actual}>\nto be readable.")
            }
            Self::ShouldHaveDigest { subject, diff } => write!(
                f,
                "\nExpecting {subject} {} digest to be:\n  <{}>\nbut was:\n  <{}>",
                diff.algorithm(),
                diff.expected(),
                diff.actual()
            ),
            Self::ShouldHaveBinaryContent {
                subject,
                offset,
                actual,
                expected,
            } => write!(
                f,
                "\n{subject} does not have expected binary content at offset <{offset}>, \
                 expecting:\n  <{expected}>\nbut was:\n  <{actual}>"
            ),
            Self::ShouldHaveSameContent {
                subject,
                expected,
                deltas,
                omitted,
            } => {
                write!(f, "\n{subject}\nand {expected}\ndo not have same content:\n\n")?;
                write_deltas(f, deltas, *omitted)
            }
            Self::ShouldHaveSameStreamContent { deltas, omitted } => {
                write!(f, "\nInputStreams do not have same content:\n\n")?;
                write_deltas(f, deltas, *omitted)
            }
            Self::ShouldHaveContent {
                subject,
                charset,
                deltas,
                omitted,
            } => {
                write!(
                    f,
                    "\n{subject} read with charset <{charset}> does not have the expected content:\n\n"
                )?;
                write_deltas(f, deltas, *omitted)
            }
            Self::ShouldBeEmpty { subject } => write!(f, "\nExpecting {subject} to be empty"),
            Self::ShouldNotBeEmpty { subject } => write!(f, "\nExpecting {subject} not to be empty"),
            Self::ShouldBeEqual {
                actual,
                expected,
                comparison,
            } => {
                write!(f, "\nexpected: {expected}\n but was: {actual}")?;
                write_comparison(f, comparison)
            }
            Self::ShouldNotBeEqual {
                actual,
                other,
                comparison,
            } => {
                write!(f, "\nExpecting actual:\n  {actual}\nnot to be equal to:\n  {other}")?;
                write_comparison(f, comparison)
            }
            Self::ShouldBeBefore {
                actual,
                other,
                comparison,
            } => {
                write!(f, "\nExpecting actual:\n  {actual}\nto be strictly before:\n  {other}")?;
                write_comparison(f, comparison)
            }
            Self::ShouldBeAfter {
                actual,
                other,
                comparison,
            } => {
                write!(f, "\nExpecting actual:\n  {actual}\nto be strictly after:\n  {other}")?;
                write_comparison(f, comparison)
            }
            Self::ShouldBeIn {
                actual,
                values,
                comparison,
            } => {
                write!(f, "\nExpecting actual:\n  {actual}\nto be in:\n  {values}")?;
                write_comparison(f, comparison)
            }
        }
    }
}
