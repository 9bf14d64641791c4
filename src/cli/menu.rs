//! Interactive menu shown when no subcommand is given.

use crate::cli::scan::{run_plan, ScanPlan};
use crate::config::AppSettings;
use crate::output;
use crate::system;
use crate::trace;
use crate::types::{parse_ipv4, AddressRange};
use console::{style, Term};
use std::io::{self, BufRead, Write};
use tokio::sync::mpsc;

/// Menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    TraceRoute,
    CameraScan,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::TraceRoute),
            "2" => Some(Self::CameraScan),
            "3" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Line input that gives up on Ctrl+C or end of input.
pub struct Input {
    lines: mpsc::UnboundedReceiver<String>,
}

impl Input {
    /// Read lines from stdin on a dedicated thread so a pending read never
    /// holds up the runtime.
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    pub fn from_receiver(lines: mpsc::UnboundedReceiver<String>) -> Self {
        Self { lines }
    }

    /// Show `prompt` and wait for a line. `None` means the operator left.
    pub async fn line(&mut self, prompt: &str) -> Option<String> {
        print!("{}", style(prompt).green());
        let _ = io::stdout().flush();

        tokio::select! {
            line = self.lines.recv() => line.map(|l| l.trim().to_string()),
            _ = tokio::signal::ctrl_c() => None,
        }
    }
}

/// Ask for a start address until one parses, then an optional end.
pub async fn prompt_range(input: &mut Input) -> Option<AddressRange> {
    println!("{}", style("Examples:").cyan());
    println!("  Single IP: 192.168.1.1");
    println!("  IP Range: 192.168.1.1 to 192.168.1.255");
    println!();

    let start = loop {
        let line = input.line("Enter Start IP: ").await?;
        if parse_ipv4(&line).is_ok() {
            break line;
        }
        output::print_error("Invalid IP address format!");
    };

    let end = input.line("Enter End IP (press Enter for single IP): ").await?;

    match AddressRange::parse(&start, Some(&end)) {
        Ok((range, warning)) => {
            if let Some(w) = warning {
                output::print_warning(&w.to_string());
            }
            Some(range)
        }
        Err(e) => {
            output::print_error(&e.to_string());
            None
        }
    }
}

/// Run the menu until the operator exits.
pub async fn run(settings: &AppSettings) {
    let mut input = Input::stdin();

    loop {
        let _ = Term::stdout().clear_screen();
        output::print_banner();
        let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        output::print_system_info(
            &time,
            system::local_address().await,
            system::default_gateway().await,
        );
        output::print_menu();

        let Some(line) = input.line("Enter your choice (1-3): ").await else {
            println!();
            output::print_warning("Interrupted by user");
            return;
        };

        match MenuChoice::parse(&line) {
            Some(MenuChoice::TraceRoute) => {
                if let Err(e) = trace::trace_route(&settings.trace_target).await {
                    output::print_error(&e.to_string());
                }
            }
            Some(MenuChoice::CameraScan) => {
                let Some(range) = prompt_range(&mut input).await else {
                    continue;
                };
                output::print_success(&format!("Total IPs to scan: {}", range.len()));

                let plan = ScanPlan::new(settings, settings.default_mode, range);
                if let Err(e) = run_plan(plan, false).await {
                    output::print_error(&e.to_string());
                }
            }
            Some(MenuChoice::Exit) => {
                println!();
                output::print_success("Goodbye!");
                return;
            }
            None => {
                output::print_error("Invalid choice. Please select 1-3.");
            }
        }

        if input.line("\nPress Enter to continue...").await.is_none() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn scripted(lines: &[&str]) -> Input {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in lines {
            tx.send(line.to_string()).unwrap();
        }
        Input::from_receiver(rx)
    }

    #[test]
    fn test_menu_choice() {
        assert_eq!(MenuChoice::parse(" 1 "), Some(MenuChoice::TraceRoute));
        assert_eq!(MenuChoice::parse("2"), Some(MenuChoice::CameraScan));
        assert_eq!(MenuChoice::parse("3"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("4"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[tokio::test]
    async fn test_prompt_range_reprompts_start() {
        let mut input = scripted(&["abc", "10.0.0.256", "10.0.0.1", "10.0.0.20"]);
        let range = prompt_range(&mut input).await.unwrap();
        assert_eq!(range.start(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(range.len(), 20);
    }

    #[tokio::test]
    async fn test_prompt_range_blank_end() {
        let mut input = scripted(&["192.168.1.7", ""]);
        let range = prompt_range(&mut input).await.unwrap();
        assert_eq!(range, AddressRange::single(Ipv4Addr::new(192, 168, 1, 7)));
    }

    #[tokio::test]
    async fn test_prompt_range_reversed_is_single() {
        let mut input = scripted(&["10.0.0.9", "10.0.0.2"]);
        let range = prompt_range(&mut input).await.unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.start(), Ipv4Addr::new(10, 0, 0, 9));
    }

    #[tokio::test]
    async fn test_end_of_input_gives_up() {
        let mut input = scripted(&["bad"]);
        assert!(prompt_range(&mut input).await.is_none());
    }
}
