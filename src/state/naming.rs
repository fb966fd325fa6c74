//! Archive directory naming.
//!
//! All functions here are pure; filesystem existence is passed in as a
//! predicate so collision handling can be tested without a disk.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::workflow::TaskType;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s_-]").expect("valid regex"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_-]+").expect("valid regex"))
}

/// Lowercase, drop anything but ASCII alphanumerics and separators, collapse
/// runs of whitespace, underscores and hyphens into one hyphen, and trim
/// hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let kept = disallowed().replace_all(&lower, "");
    let hyphenated = separators().replace_all(&kept, "-");
    hyphenated.trim_matches('-').to_string()
}

/// `base` if free, otherwise `base-2`, `base-3`, ... until `exists` says no.
pub fn next_free_name(base: &str, exists: impl Fn(&str) -> bool) -> String {
    if !exists(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !exists(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Like [`next_free_name`] but keeps the extension last: `NOTES-2.md`.
pub fn next_free_file_name(file_name: &str, exists: impl Fn(&str) -> bool) -> String {
    if !exists(file_name) {
        return file_name.to_string();
    }
    let (stem, ext) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    };
    (2u32..)
        .map(|n| format!("{stem}-{n}{ext}"))
        .find(|candidate| !exists(candidate))
        .unwrap_or_else(|| file_name.to_string())
}

/// The label part of an archive name: the slugged label, else the slugged
/// task name, else the task type. Inputs that slug to nothing are skipped.
pub fn name_part(label: Option<&str>, task_name: &str, task_type: TaskType) -> String {
    [label.unwrap_or(""), task_name]
        .into_iter()
        .map(slugify)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| task_type.to_string())
}

/// `YYYYMMDD-<type>-<name part>`, with `-aborted` appended for abandoned work.
pub fn archive_base_name(
    date: NaiveDate,
    task_type: TaskType,
    label: Option<&str>,
    task_name: &str,
    aborted: bool,
) -> String {
    let mut name = format!(
        "{}-{}-{}",
        date.format("%Y%m%d"),
        task_type,
        name_part(label, task_name, task_type)
    );
    if aborted {
        name.push_str("-aborted");
    }
    name
}
