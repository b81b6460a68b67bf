use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::contracts::{ContractShape, ContractValidator, ShapeMismatchKind};

/// Rejection reason on a verdict line. Serializes to the same snake_case
/// names as `ShapeMismatchKind`, plus `malformed_json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictKind {
    Shape(ShapeMismatchKind),
    MalformedJson,
}

impl VerdictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VerdictKind::Shape(kind) => kind.as_str(),
            VerdictKind::MalformedJson => "malformed_json",
        }
    }
}

impl Serialize for VerdictKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VerdictKind::Shape(kind) => kind.serialize(serializer),
            VerdictKind::MalformedJson => serializer.serialize_str(self.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub line: usize,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<VerdictKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Verdict {
    fn accepted(line: usize) -> Self {
        Self {
            line,
            valid: true,
            kind: None,
            path: None,
            message: None,
        }
    }

    fn rejected(line: usize, kind: VerdictKind, path: Option<String>, message: String) -> Self {
        Self {
            line,
            valid: false,
            kind: Some(kind),
            path,
            message: Some(message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Validates one JSON document per non-blank line of `reader` and writes one
/// verdict line per document to `writer`. Line numbers are 1-based. Lines
/// that are not UTF-8 or not JSON get a `malformed_json` verdict; only I/O
/// errors end the run.
pub fn run_check(
    mut reader: impl BufRead,
    mut writer: impl Write,
    validator: &ContractValidator,
    shape: ContractShape,
) -> Result<CheckSummary> {
    let mut summary = CheckSummary::default();

    let mut line = Vec::new();
    let mut line_number = 0;
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("failed to read input line {}", line_number + 1))?;
        if read == 0 {
            break;
        }
        line_number += 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let verdict = check_line(validator, shape, line_number, &line);
        if verdict.valid {
            summary.accepted += 1;
        } else {
            summary.rejected += 1;
        }

        serde_json::to_writer(&mut writer, &verdict).context("failed to encode verdict")?;
        writer.write_all(b"\n").context("failed to write verdict")?;
    }

    writer.flush().context("failed to flush verdicts")?;
    tracing::info!(
        target: "check",
        shape = shape.as_str(),
        mode = ?validator.mode(),
        accepted = summary.accepted,
        rejected = summary.rejected,
        "check_completed"
    );
    Ok(summary)
}

fn check_line(
    validator: &ContractValidator,
    shape: ContractShape,
    line_number: usize,
    line: &[u8],
) -> Verdict {
    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(target: "check", line = line_number, error = %err, "malformed_line");
            return Verdict::rejected(
                line_number,
                VerdictKind::MalformedJson,
                None,
                err.to_string(),
            );
        }
    };

    let outcome = match shape {
        ContractShape::StructuredResponse => {
            validator.validate_structured_response(&value).map(|_| ())
        }
        ContractShape::Transaction => validator.validate_transaction(&value).map(|_| ()),
    };

    match outcome {
        Ok(()) => Verdict::accepted(line_number),
        Err(mismatch) => Verdict::rejected(
            line_number,
            VerdictKind::Shape(mismatch.kind),
            Some(mismatch.path),
            mismatch.message,
        ),
    }
}
