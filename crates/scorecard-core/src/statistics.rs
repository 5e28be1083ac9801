//! Dashboard analytics over a flat table of rows.
//!
//! Everything here is a pure function of its input and is recomputed on
//! every call; nothing is cached or stored in state.

use serde::{Deserialize, Serialize};

use crate::model::Columns;

/// Header keywords that mark a column as holding grades.
pub const GRADE_KEYWORDS: [&str; 9] = [
    "grade",
    "score",
    "math",
    "science",
    "english",
    "history",
    "physics",
    "chemistry",
    "biology",
];

const TOP_N: usize = 5;
const STRUGGLING_BELOW: f64 = 70.0;
const PASS_MARK: f64 = 60.0;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Parse the longest numeric prefix of `s`, the way spreadsheet exports are
/// usually read (`"85%"` → 85). Returns `None` when no prefix is numeric.
pub fn parse_grade(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let candidate = &s[..end];
    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Whole-value numeric test used for grade-column detection, following the
/// browser's `Number()` conversion. A blank value counts as numeric (it
/// reads as zero), unsigned `0x`/`0o`/`0b` integers are numbers, and the
/// only spelled-out value accepted is `Infinity`.
pub fn looks_numeric(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return true;
    }
    if let Some((radix, digits)) = radix_literal(s) {
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return true;
    }
    // `str::parse` also takes inf, infinity and nan in any case.
    if unsigned.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return false;
    }
    s.parse::<f64>().is_ok()
}

fn radix_literal(s: &str) -> Option<(u32, &str)> {
    let prefix = s.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &s[2..]))
}

/// Letter band of a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeBand {
    A,
    B,
    C,
    D,
    F,
}

impl GradeBand {
    pub const ALL: [GradeBand; 5] = [
        GradeBand::A,
        GradeBand::B,
        GradeBand::C,
        GradeBand::D,
        GradeBand::F,
    ];

    /// Band for `value`, or `None` outside `[0, 100]`.
    ///
    /// Bands are half-open below 90 so every value in range lands in
    /// exactly one of them.
    pub fn for_value(value: f64) -> Option<GradeBand> {
        if !(0.0..=100.0).contains(&value) {
            return None;
        }
        Some(if value >= 90.0 {
            GradeBand::A
        } else if value >= 80.0 {
            GradeBand::B
        } else if value >= 70.0 {
            GradeBand::C
        } else if value >= 60.0 {
            GradeBand::D
        } else {
            GradeBand::F
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeBand::A => "A (90-100)",
            GradeBand::B => "B (80-89)",
            GradeBand::C => "C (70-79)",
            GradeBand::D => "D (60-69)",
            GradeBand::F => "F (0-59)",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Number of grades in one band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCount {
    pub band: GradeBand,
    pub range: String,
    pub count: usize,
}

/// Average of one grade column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAverage {
    /// Source header.
    pub column: String,
    /// Display label (`_` → space, upper-cased).
    pub subject: String,
    pub average: f64,
    /// Number of values that contributed.
    pub students: usize,
}

/// Average of one row's grade columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAverage {
    pub name: String,
    pub average: f64,
    pub grades_count: usize,
}

/// Aggregate statistics for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    /// Number of rows in the table.
    pub total_students: usize,
    /// Headers detected as grade columns.
    pub grade_columns: Vec<String>,
    /// Mean of every in-range grade, two decimals.
    pub average_grade: f64,
    /// All five bands, A first.
    pub grade_distribution: Vec<BandCount>,
    pub subject_performance: Vec<SubjectAverage>,
    pub top_students: Vec<StudentAverage>,
    pub struggling_students: Vec<StudentAverage>,
    /// Percentage of graded rows averaging at least 60, rounded.
    pub pass_rate: u32,
}

impl Analytics {
    /// Bands holding at least one grade.
    pub fn non_empty_bands(&self) -> impl Iterator<Item = &BandCount> {
        self.grade_distribution.iter().filter(|b| b.count > 0)
    }
}

/// Headers whose name contains a grade keyword or whose first-row value is
/// numeric. Headers come from the first row.
pub fn detect_grade_columns(rows: &[Columns]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .iter()
        .filter(|(header, value)| {
            let lower = header.to_lowercase();
            GRADE_KEYWORDS.iter().any(|k| lower.contains(k)) || looks_numeric(value)
        })
        .map(|(header, _)| header.to_string())
        .collect()
}

/// Compute dashboard analytics for `rows`.
pub fn compute_analytics(rows: &[Columns]) -> Analytics {
    let grade_columns = detect_grade_columns(rows);
    let headers: Vec<&str> = rows.first().map(|r| r.keys().collect()).unwrap_or_default();
    let name_field = headers
        .iter()
        .find(|h| h.to_lowercase().contains("name"))
        .or_else(|| headers.first())
        .map(|h| h.to_string());

    let mut total = 0.0f64;
    let mut count = 0usize;
    let mut bands = [0usize; 5];
    let mut per_subject = vec![(0.0f64, 0usize); grade_columns.len()];
    let mut averages = Vec::new();

    for row in rows {
        let mut row_sum = 0.0f64;
        let mut row_count = 0usize;

        for (i, col) in grade_columns.iter().enumerate() {
            let Some(grade) = row.get(col).and_then(parse_grade) else {
                continue;
            };
            row_sum += grade;
            row_count += 1;

            if let Some(band) = GradeBand::for_value(grade) {
                total += grade;
                count += 1;
                bands[band.index()] += 1;
                per_subject[i].0 += grade;
                per_subject[i].1 += 1;
            }
        }

        if row_count > 0 {
            let name = name_field
                .as_deref()
                .and_then(|f| row.get(f))
                .filter(|n| !n.is_empty())
                .unwrap_or("Unknown");
            averages.push(StudentAverage {
                name: name.to_string(),
                average: round_to(row_sum / row_count as f64, 2),
                grades_count: row_count,
            });
        }
    }

    let subject_performance = grade_columns
        .iter()
        .zip(&per_subject)
        .filter(|(_, (_, n))| *n > 0)
        .map(|(col, (sum, n))| SubjectAverage {
            column: col.clone(),
            subject: col.replace('_', " ").to_uppercase(),
            average: round_to(sum / *n as f64, 2),
            students: *n,
        })
        .collect();

    let pass_rate = if averages.is_empty() {
        0
    } else {
        let passed = averages.iter().filter(|s| s.average >= PASS_MARK).count();
        (passed as f64 / averages.len() as f64 * 100.0).round() as u32
    };

    let mut top_students = averages.clone();
    top_students.sort_by(|a, b| b.average.total_cmp(&a.average));
    top_students.truncate(TOP_N);

    let mut struggling_students: Vec<StudentAverage> = averages
        .into_iter()
        .filter(|s| s.average < STRUGGLING_BELOW)
        .collect();
    struggling_students.sort_by(|a, b| a.average.total_cmp(&b.average));
    struggling_students.truncate(TOP_N);

    Analytics {
        total_students: rows.len(),
        grade_columns,
        average_grade: if count > 0 {
            round_to(total / count as f64, 2)
        } else {
            0.0
        },
        grade_distribution: GradeBand::ALL
            .iter()
            .map(|&band| BandCount {
                band,
                range: band.label().to_string(),
                count: bands[band.index()],
            })
            .collect(),
        subject_performance,
        top_students,
        struggling_students,
        pass_rate,
    }
}
