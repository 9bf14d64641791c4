//! Console output.
//!
//! Colorized messages, banner, menu and run summaries for the terminal.

use crate::scanner::{Finding, ScanJob, ScanSummary};
use console::style;
use std::net::Ipv4Addr;
use std::path::Path;

const BANNER: &str = r"
   ___ __ _ _ __ ___  _____      _____  ___ _ __
  / __/ _` | '_ ` _ \/ __\ \ /\ / / _ \/ _ \ '_ \
 | (_| (_| | | | | | \__ \\ V  V /  __/  __/ |_) |
  \___\__,_|_| |_| |_|___/ \_/\_/ \___|\___| .__/
                                           |_|";

/// Width of section rules.
const RULE_WIDTH: usize = 50;

/// Longest title shown when a finding is echoed.
const ECHO_TITLE_LEN: usize = 40;

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

fn print_section(title: impl std::fmt::Display) {
    println!();
    println!("{}", style(rule('=')).cyan());
    println!("{}", title);
    println!("{}", style(rule('=')).cyan());
    println!();
}

/// Print the startup banner.
pub fn print_banner() {
    println!("{}", style(BANNER).red());
    println!(
        "{} {} v{}",
        style("[*]").green(),
        style("camsweep").yellow().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
}

/// Print local time, local address and gateway under the banner.
pub fn print_system_info(time: &str, local: Option<Ipv4Addr>, gateway: Option<Ipv4Addr>) {
    println!("{} Time: {}", style("[i]").green(), style(time).yellow());
    println!(
        "{} Your Local IP: {}",
        style("[i]").green(),
        style(display_or_not_found(local)).cyan()
    );
    println!(
        "{} Router Gateway: {}",
        style("[i]").green(),
        style(display_or_not_found(gateway)).cyan()
    );
}

/// Dotted quad, or `Not Found` when discovery failed.
pub fn display_or_not_found(addr: Option<Ipv4Addr>) -> String {
    addr.map(|a| a.to_string())
        .unwrap_or_else(|| "Not Found".to_string())
}

/// Print the interactive menu.
pub fn print_menu() {
    println!();
    println!("{}", style(rule('=')).cyan());
    println!("{}", style("Select Mode:").green());
    println!("{}", style(rule('=')).cyan());
    println!("{} Trace Route", style("1.").yellow());
    println!("{} Camera Scan", style("2.").red());
    println!("{} Exit", style("3.").yellow());
    println!("{}", style(rule('=')).cyan());
    println!();
}

/// Print the section header of the trace route mode.
pub fn print_trace_header(target: &str) {
    print_section(style("[>] TRACE ROUTE MODE").yellow());
    println!("{} Target: {}", style("[i]").green(), style(target).cyan());
    println!("{} Please wait...", style("[*]").yellow());
    println!();
    println!("{}", style(rule('-')).cyan());
    println!();
}

/// Print the footer of a trace, with the hop count when any hop was seen.
pub fn print_trace_footer(hops: usize) {
    println!();
    println!("{}", style(rule('-')).cyan());
    println!("{} Trace complete!", style("[✓]").green());
    if hops > 0 {
        println!("{} Total hops: {}", style("[i]").cyan(), hops);
    }
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(job: &ScanJob, cores: usize, output: Option<&Path>) {
    print_section(style(format!("[*] CAMERA SCAN ({} mode)", job.mode)).red().bold());
    println!(
        "{} Target: {} ({} addresses)",
        style("•").dim(),
        style(job.range).white().bold(),
        job.range.len()
    );
    println!("{} Ports: {}", style("•").dim(), style(&job.ports).white().bold());
    println!("{} CPU Cores: {}", style("•").dim(), cores);
    println!("{} Workers: {}", style("•").dim(), job.workers);
    println!("{} Run: {}", style("•").dim(), style(job.run_id.short()).dim());
    if let Some(path) = output {
        let when = if job.mode.is_live() {
            "as found"
        } else {
            "at the end"
        };
        println!(
            "{} Results saved to {} ({})",
            style("•").dim(),
            style(path.display()).green(),
            when
        );
    }
    println!();
}

/// Print the control keys available during a scan.
pub fn print_controls(pause_supported: bool) {
    println!("{} Controls:", style("[*]").yellow());
    println!("  {} - Stop scan", style("Ctrl+C").red());
    if pause_supported {
        println!("  {} - Pause/Resume scan", style("Ctrl+Z").yellow());
    }
    println!();
}

/// One-line echo of a finding.
pub fn finding_line(finding: &Finding) -> String {
    format!(
        "{} {} found at {} - {}",
        style("[✓]").green().bold(),
        style(&finding.camera_type).green(),
        style(&finding.url).cyan(),
        truncate_string(&finding.title, ECHO_TITLE_LEN)
    )
}

/// Print the stop notice.
pub fn print_stop_notice() {
    eprintln!();
    eprintln!("{} Ctrl+C detected - stopping...", style("[!]").red().bold());
}

/// Print the pause state after a toggle.
pub fn print_pause_state(paused: bool) {
    eprintln!();
    if paused {
        eprintln!(
            "{} SCAN PAUSED - Press Ctrl+Z again to resume...",
            style("[||]").yellow().bold()
        );
    } else {
        eprintln!("{} SCAN RESUMED - Continuing...", style("[>]").green().bold());
    }
}

/// Print the end-of-run summary with every finding.
pub fn print_summary(summary: &ScanSummary) {
    let headline = if summary.stopped {
        style("[!] SCAN STOPPED").yellow().bold()
    } else {
        style("[✓] SCAN COMPLETE").green().bold()
    };
    print_section(headline);

    if summary.findings.is_empty() {
        println!("{} No cameras found", style("[!]").yellow());
    } else {
        println!(
            "{}",
            style(format!("[*] Found {} cameras:", summary.findings.len())).red()
        );
        println!();
        for (idx, finding) in summary.findings.iter().enumerate() {
            println!(
                "{}",
                style(format!("[{}] {}:{}", idx + 1, finding.address, finding.port)).cyan()
            );
            println!("    Title: {}", style(&finding.title).yellow());
            println!("    Server: {}", style(&finding.server).yellow());
            println!("    Type: {}", style(&finding.camera_type).red());
            println!("    URL: {}", finding.url);
            println!();
        }
    }

    println!("{} Total IPs: {}", style("[i]").cyan(), summary.addresses);
    println!(
        "{} Probes: {} of {} queued",
        style("[i]").cyan(),
        summary.processed,
        summary.queued
    );
    println!("{} Cameras found: {}", style("[i]").cyan(), summary.findings.len());
    println!(
        "{} Time taken: {:.2} seconds",
        style("[i]").cyan(),
        summary.elapsed.as_secs_f64()
    );
    println!("{} Speed: {:.0} probes/sec", style("[i]").cyan(), summary.rate());
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate to at most `max_chars` characters.
fn truncate_string(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkItem;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 5), "hello");
        assert_eq!(truncate_string("ÉÉÉÉ", 2), "ÉÉ");
    }

    #[test]
    fn test_finding_line_truncates_title() {
        console::set_colors_enabled(false);
        let item = WorkItem::new(Ipv4Addr::new(10, 1, 1, 1), 80);
        let title = "x".repeat(60);
        let finding = Finding::new(item, title, "Unknown", "http://10.1.1.1", "Camera - Login");

        let line = finding_line(&finding);
        assert!(line.contains("Camera - Login found at http://10.1.1.1"));
        assert!(line.ends_with(&format!("- {}", "x".repeat(40))));
    }

    #[test]
    fn test_display_or_not_found() {
        assert_eq!(display_or_not_found(None), "Not Found");
        assert_eq!(
            display_or_not_found(Some(Ipv4Addr::new(192, 168, 0, 1))),
            "192.168.0.1"
        );
    }
}
