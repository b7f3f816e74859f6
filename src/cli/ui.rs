// src/cli/ui.rs
use crate::core::estimator::OffsetFunction;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Render the synchronization report: per-sample similarity, chosen offset
/// mode, variance, and pass count.
pub fn report(
    matches: &[crate::core::aligner::AlignmentMatch],
    offset_fn: &OffsetFunction,
    residual_std_dev: f64,
    passes: u32,
    dry_run: bool,
) {
    println!("{}", "Synchronization report".bold());
    println!("{}", "-".repeat(40));
    for m in matches {
        println!(
            "  sample {:>3}  minute {:>3}  similarity {:.2}",
            m.sample_index, m.minute, m.similarity
        );
    }
    println!("{}", "-".repeat(40));
    match offset_fn {
        OffsetFunction::Uniform(delta) => {
            println!("mode: uniform, offset = {delta:+.3}s");
        }
        OffsetFunction::Interpolated(points) => {
            println!("mode: piecewise-linear ({} anchor points)", points.len());
            for (t, delta) in points {
                println!("  t={t:>8.1}s  delta={delta:+.3}s");
            }
        }
    }
    println!("residual std dev: {residual_std_dev:.3}s");
    println!("passes: {passes}");
    if dry_run {
        print_warning("dry run: subtitle file left unmodified");
    }
}

/// Create a progress bar with the standard indicatif style.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap(),
    );
    pb
}
