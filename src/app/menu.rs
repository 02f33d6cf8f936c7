//! Interactive menu shown when no subcommand is given.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use profile_finder_core::{DEFAULT_CONCURRENCY, OutputFormat, ScanMode};
use tokio::sync::mpsc;
use tracing::debug;

use super::App;

const MIN_THREADS: usize = 1;
const MAX_THREADS: usize = 100;

/// Outcome of one prompt.
enum Line {
    Text(String),
    Eof,
    Interrupted,
}

/// Reads stdin on a plain thread so a pending read never blocks runtime
/// shutdown.
struct StdinLines {
    rx: mpsc::UnboundedReceiver<String>,
}

impl StdinLines {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }
}

/// What the user picked at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Email,
    Username,
    Format,
    Instagram,
    Exit,
}

fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::Email),
        "2" => Some(MenuChoice::Username),
        "3" => Some(MenuChoice::Format),
        "4" => Some(MenuChoice::Instagram),
        "5" => Some(MenuChoice::Exit),
        _ => None,
    }
}

/// Splits a comma separated answer into trimmed, non-empty items.
fn split_items(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Worker count from the prompt; blank or invalid answers use the default.
fn parse_thread_count(input: &str) -> usize {
    match input.trim().parse::<usize>() {
        Ok(count) if (MIN_THREADS..=MAX_THREADS).contains(&count) => count,
        _ => DEFAULT_CONCURRENCY,
    }
}

fn parse_format(input: &str) -> Option<OutputFormat> {
    input.trim().to_ascii_lowercase().parse().ok()
}

fn capitalized(mode: ScanMode) -> &'static str {
    match mode {
        ScanMode::Email => "Email",
        ScanMode::Username => "Username",
    }
}

fn print_menu(format: OutputFormat) {
    println!();
    println!("=== Profile Finder ===");
    println!("1. Search by email");
    println!("2. Search by username");
    println!("3. Output format (current: {format})");
    println!("4. Instagram lookup (session file)");
    println!("5. Exit");
}

impl App {
    /// Runs the menu loop until exit, end of input or an interrupt.
    pub(crate) async fn run_menu(&mut self) -> Result<()> {
        let mut lines = StdinLines::spawn();

        loop {
            print_menu(self.settings.format);
            let choice = match self.prompt(&mut lines, "Choose [1-5]: ").await {
                Line::Text(text) => text,
                Line::Eof => {
                    self.flush_on_exit();
                    return Ok(());
                }
                Line::Interrupted => {
                    self.flush_interrupted();
                    return Ok(());
                }
            };

            match parse_choice(&choice) {
                Some(MenuChoice::Email) => {
                    if !self.prompt_scan(&mut lines, ScanMode::Email).await? {
                        return self.leave_menu();
                    }
                }
                Some(MenuChoice::Username) => {
                    if !self.prompt_scan(&mut lines, ScanMode::Username).await? {
                        return self.leave_menu();
                    }
                }
                Some(MenuChoice::Format) => {
                    let Line::Text(answer) =
                        self.prompt(&mut lines, "Format (json/csv): ").await
                    else {
                        return self.leave_menu();
                    };
                    match parse_format(&answer) {
                        Some(format) => {
                            self.settings.format = format;
                            println!("[i] Output format set to {format}");
                        }
                        None => println!("[!] Unknown format, keeping {}", self.settings.format),
                    }
                }
                Some(MenuChoice::Instagram) => {
                    let Line::Text(path) =
                        self.prompt(&mut lines, "Session cookie file: ").await
                    else {
                        return self.leave_menu();
                    };
                    let Line::Text(target) =
                        self.prompt(&mut lines, "Target username: ").await
                    else {
                        return self.leave_menu();
                    };
                    let (path, target) = (path.trim(), target.trim());
                    if path.is_empty() || target.is_empty() {
                        println!("[!] Session file and username are both required.");
                        continue;
                    }
                    self.run_instagram(&PathBuf::from(path), target).await?;
                }
                Some(MenuChoice::Exit) => {
                    self.flush_on_exit();
                    return Ok(());
                }
                None => println!("[!] Invalid choice."),
            }

            if self.finish_if_interrupted() {
                return Ok(());
            }
        }
    }

    /// Asks for items and a worker count, then runs the scan.
    ///
    /// Returns `false` when input ended or an interrupt arrived at a prompt.
    async fn prompt_scan(&self, lines: &mut StdinLines, mode: ScanMode) -> Result<bool> {
        let label = format!("{}(s), comma separated: ", capitalized(mode));
        let Line::Text(answer) = self.prompt(lines, &label).await else {
            return Ok(false);
        };
        let items = split_items(&answer);
        if items.is_empty() {
            println!("[!] Nothing to search for.");
            return Ok(true);
        }

        let Line::Text(threads) = self
            .prompt(lines, &format!("Threads [{DEFAULT_CONCURRENCY}]: "))
            .await
        else {
            return Ok(false);
        };
        self.run_scan(items, mode, parse_thread_count(&threads)).await?;
        Ok(true)
    }

    /// Exit path for a sub-prompt that hit end of input or an interrupt.
    fn leave_menu(&self) -> Result<()> {
        if self.shutdown.is_requested() {
            self.flush_interrupted();
        } else {
            self.flush_on_exit();
        }
        Ok(())
    }

    async fn prompt(&self, lines: &mut StdinLines, label: &str) -> Line {
        if self.shutdown.is_requested() {
            return Line::Interrupted;
        }
        print!("{label}");
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;
            () = self.shutdown.notified() => Line::Interrupted,
            line = lines.rx.recv() => match line {
                Some(line) => Line::Text(line),
                None => {
                    debug!("stdin closed");
                    Line::Eof
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice(" 1 "), Some(MenuChoice::Email));
        assert_eq!(parse_choice("4"), Some(MenuChoice::Instagram));
        assert_eq!(parse_choice("5"), Some(MenuChoice::Exit));
        assert_eq!(parse_choice("6"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[test]
    fn test_split_items_drops_blanks() {
        assert_eq!(
            split_items(" alice, ,bob ,,"),
            vec!["alice".to_string(), "bob".to_string()]
        );
        assert!(split_items("  ").is_empty());
    }

    #[test]
    fn test_thread_count_falls_back_to_default() {
        assert_eq!(parse_thread_count("12"), 12);
        assert_eq!(parse_thread_count(""), DEFAULT_CONCURRENCY);
        assert_eq!(parse_thread_count("0"), DEFAULT_CONCURRENCY);
        assert_eq!(parse_thread_count("101"), DEFAULT_CONCURRENCY);
        assert_eq!(parse_thread_count("many"), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_parse_format_is_case_insensitive() {
        assert_eq!(parse_format("CSV"), Some(OutputFormat::Csv));
        assert_eq!(parse_format(" json "), Some(OutputFormat::Json));
        assert_eq!(parse_format("xml"), None);
    }
}
