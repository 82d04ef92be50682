// src/utils/console.rs

//! Console helpers for run headers, progress and summaries.
//!
//! Output goes to stderr with a timestamp so stdout stays free for records.
//! Everything is suppressed when the logger filters out `info`.

use chrono::Local;

fn enabled() -> bool {
    log::log_enabled!(log::Level::Info)
}

fn emit(message: &str) {
    eprintln!("[{}] {}", Local::now().format("%H:%M:%S"), message);
}

/// Log a header
pub fn header(title: &str) {
    if enabled() {
        eprintln!();
        eprintln!("{}", "═".repeat(60));
        eprintln!("  {}", title);
        eprintln!("{}", "═".repeat(60));
    }
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    if enabled() {
        emit(&format!("[STEP {}/{}] {}", step_num, total, message));
    }
}

/// Log per-page progress as a bar
pub fn progress(page: u32, total: u32, detail: &str) {
    if enabled() {
        const WIDTH: usize = 30;
        let filled = if total == 0 {
            WIDTH
        } else {
            (page as usize * WIDTH) / total as usize
        };
        emit(&format!(
            "[{}{}] {}/{} {}",
            "#".repeat(filled),
            "-".repeat(WIDTH - filled.min(WIDTH)),
            page,
            total,
            detail
        ));
    }
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    if enabled() {
        eprintln!("    {}", message);
    }
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    if enabled() {
        eprintln!();
        emit(&format!("[SUMMARY] {}", title));
        for (key, value) in items {
            eprintln!("    {}: {}", key, value);
        }
    }
}
