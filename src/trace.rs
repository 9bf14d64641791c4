//! Trace route through the platform's own tool.
//!
//! Output is streamed line by line and colorized by a few textual cues; hop
//! addresses are never parsed.

use crate::output;
use console::style;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

/// How a line of trace output is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A hop that did not answer.
    Timeout,
    /// A hop with a round-trip time.
    Hop,
    /// Banner lines such as `traceroute to ...`.
    Header,
    Plain,
}

/// Classify one trimmed output line.
pub fn classify_line(line: &str) -> LineKind {
    let lower = line.to_lowercase();

    if line.contains('*') || lower.contains("timeout") {
        return LineKind::Timeout;
    }

    if lower.contains("ms") || line.contains("Tracing") || line.contains("traceroute") {
        let timed = line.chars().any(|c| c.is_ascii_digit())
            && (lower.contains("ms") || line.contains('<'));
        return if timed {
            LineKind::Hop
        } else {
            LineKind::Header
        };
    }

    LineKind::Plain
}

/// Program and arguments used to trace to `target`.
pub async fn trace_command(target: &str) -> (String, Vec<String>) {
    let owned = |args: &[&str]| -> Vec<String> {
        args.iter()
            .map(|a| a.to_string())
            .chain(std::iter::once(target.to_string()))
            .collect()
    };

    if cfg!(windows) {
        return ("tracert".into(), owned(&["-d", "-h", "30", "-w", "1000"]));
    }

    let traceroute = ("traceroute".to_string(), owned(&["-n", "-m", "30", "-w", "1"]));

    if probe_tool("traceroute", "--version").await {
        return traceroute;
    }
    if probe_tool("tracepath", "-V").await {
        return ("tracepath".into(), owned(&["-n"]));
    }
    traceroute
}

/// Whether `program` can be launched at all. Its exit status is irrelevant.
async fn probe_tool(program: &str, arg: &str) -> bool {
    let run = Command::new(program)
        .arg(arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    matches!(
        tokio::time::timeout(std::time::Duration::from_secs(2), run).await,
        Ok(Ok(_))
    )
}

/// Run a trace route to `target`, printing each line as it arrives.
///
/// Returns the number of hops seen.
pub async fn trace_route(target: &str) -> io::Result<usize> {
    output::print_trace_header(target);

    let (program, args) = trace_command(target).await;
    debug!(%program, ?args, "starting trace");

    let mut child = match Command::new(&program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            print_install_hints();
            return Ok(0);
        }
        Err(e) => return Err(e),
    };

    let mut hops = 0;
    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match classify_line(line) {
                LineKind::Timeout => println!("{}", style(line).red()),
                LineKind::Hop => {
                    hops += 1;
                    println!("{}", style(format!("[Hop {:2}] {}", hops, line)).green());
                }
                LineKind::Header => println!("{}", style(line).cyan()),
                LineKind::Plain => println!("{}", style(line).white()),
            }
        }
    }

    child.wait().await?;
    output::print_trace_footer(hops);
    Ok(hops)
}

fn print_install_hints() {
    output::print_error("traceroute command not found on this system");
    output::print_info("Debian/Ubuntu: apt install traceroute");
    output::print_info("Termux: pkg install inetutils");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unix_lines() {
        assert_eq!(
            classify_line("traceroute to google.com (142.250.74.46), 30 hops max, 60 byte packets"),
            LineKind::Header
        );
        assert_eq!(
            classify_line("1  192.168.1.1  0.512 ms  0.480 ms  0.455 ms"),
            LineKind::Hop
        );
        assert_eq!(classify_line("2  * * *"), LineKind::Timeout);
    }

    #[test]
    fn test_classify_windows_lines() {
        assert_eq!(
            classify_line("Tracing route to google.com [142.250.74.46]"),
            LineKind::Header
        );
        assert_eq!(
            classify_line("1    <1 ms    <1 ms    <1 ms  192.168.0.1"),
            LineKind::Hop
        );
        assert_eq!(classify_line("Request timed out."), LineKind::Plain);
        assert_eq!(classify_line("Trace complete."), LineKind::Plain);
    }

    #[test]
    fn test_timeout_wins_over_hop() {
        assert_eq!(classify_line("3  10.0.0.1  12.1 ms  *  11.9 ms"), LineKind::Timeout);
        assert_eq!(classify_line("4  no reply (timeout)"), LineKind::Timeout);
    }

    #[tokio::test]
    async fn test_trace_command_targets_last() {
        let (_, args) = trace_command("example.org").await;
        assert_eq!(args.last().map(String::as_str), Some("example.org"));
    }
}
