//! Row → [`StudentRecord`] normalization.

use sha2::{Digest, Sha256};

use crate::model::{Columns, ExamScore, RecordKind, StudentRecord, Subject};
use crate::statistics::round_to;

const SYNTHETIC_ID_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Per-upload settings for exam normalization.
#[derive(Debug, Clone, Copy)]
pub struct ExamContext {
    pub subject: Subject,
    /// Effective total for the subject (scanned, configured or 0).
    pub total_questions: u32,
}

/// Normalize general-upload rows. One record per row, each holding exactly
/// one column per header.
pub fn normalize_general(headers: &[String], rows: &[Vec<String>]) -> Vec<StudentRecord> {
    rows.iter()
        .map(|cells| {
            let columns = Columns::from_row(headers, cells);
            StudentRecord {
                id: first_exact(&columns, &["student_id", "id"]).unwrap_or_default(),
                name: first_exact(&columns, &["name", "student_name"]).unwrap_or_default(),
                kind: RecordKind::General,
                columns,
            }
        })
        .collect()
}

/// First non-empty value whose header equals one of `names`, ignoring case.
fn first_exact(columns: &Columns, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        columns
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(name) && !v.is_empty())
            .map(|(_, v)| v.to_string())
    })
}

/// Normalize one exam-upload data row.
pub fn normalize_exam_row(
    row_index: usize,
    headers: &[String],
    cells: &[String],
    map: &crate::mapper::FieldMap,
    ctx: &ExamContext,
) -> StudentRecord {
    let columns = Columns::from_row(headers, cells);
    let value = |header: &Option<String>| -> Option<String> {
        header
            .as_deref()
            .and_then(|h| columns.get(h))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let name = compose_name(
        [
            value(&map.first_name),
            value(&map.middle_name),
            value(&map.last_name),
        ],
        map.has_name_parts(),
        value(&map.student_name),
    )
    .or_else(|| value(&map.username))
    .unwrap_or_else(|| "Unknown".to_string());

    let id = value(&map.sis_id)
        .or_else(|| value(&map.student_number))
        .or_else(|| value(&map.username))
        .unwrap_or_else(|| {
            let id = synthesize_id(ctx.subject, row_index, &name);
            tracing::warn!(row = row_index, %id, "no student id in row, derived one");
            id
        });

    let score = value(&map.score)
        .and_then(|s| parse_leading_int(&s))
        .unwrap_or(0);

    let total_questions = value(&map.total_questions)
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(ctx.total_questions);

    StudentRecord {
        id,
        name,
        kind: RecordKind::Exam(ExamScore {
            score,
            total_questions,
            percentage: percentage(score, total_questions),
            subject: ctx.subject,
        }),
        columns,
    }
}

fn compose_name(
    parts: [Option<String>; 3],
    has_parts: bool,
    whole: Option<String>,
) -> Option<String> {
    if has_parts {
        let joined = parts
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        (!joined.is_empty()).then_some(joined)
    } else {
        whole
    }
}

/// `score / total * 100` rounded to two decimals; 0 when `total` is 0.
pub fn percentage(score: i64, total_questions: u32) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    round_to(score as f64 / total_questions as f64 * 100.0, 2)
}

/// Parse the leading integer of `s` (`"45.5"` → 45, `"12 pts"` → 12).
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Stable id for a row without any id column: `{subject}_{9 base36 chars}`
/// derived from the subject, the row position and the composed name.
pub fn synthesize_id(subject: Subject, row_index: usize, name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(subject.key().as_bytes());
    hasher.update(row_index.to_le_bytes());
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let mut n = u64::from_le_bytes(bytes) % 36u64.pow(SYNTHETIC_ID_LEN as u32);

    let mut suffix = [b'0'; SYNTHETIC_ID_LEN];
    for slot in suffix.iter_mut().rev() {
        *slot = BASE36[(n % 36) as usize];
        n /= 36;
    }
    format!("{}_{}", subject.key(), String::from_utf8_lossy(&suffix))
}
