use console::style;

use crate::release::{BuildMatrixEntry, ReleaseState};

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Lines describing what a staging run produced
pub fn release_summary(state: &ReleaseState) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(previous) = &state.previous_version {
        lines.push(format!("Previous release: {}", previous));
    }
    if let Some(version) = &state.version {
        lines.push(format!("Release tag:      {}", version));
    }
    if let Some(godoc) = &state.godoc_version {
        lines.push(format!("Godoc tag:        {}", godoc));
    }
    if let Some(dev) = &state.dev_version {
        lines.push(format!("Dev version:      {}", dev));
    }
    if let Some(path) = state.release_notes() {
        lines.push(format!("Release notes:    {}", path.display()));
    }

    lines
}

pub fn display_release_summary(state: &ReleaseState) {
    println!("\n{}", style("Release staged").bold());
    for line in release_summary(state) {
        println!("  {}", line);
    }
}

pub fn display_built_images(image: &str, entries: &[BuildMatrixEntry]) {
    println!("\n{}", style(format!("Pushed {}", image)).bold());
    for entry in entries {
        println!("  {}", style(entry.distribution_tag(image)).green());
    }
    if let Some(last) = entries.last() {
        println!(
            "  {} (from {})",
            style(last.bare_tag(image)).green(),
            last.distribution
        );
    }
}
