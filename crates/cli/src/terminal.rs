use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rfpcat_core::{DecodedFile, FileKind, TocItem};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const PROMPT: Color = Color::Green;
    const TEXT: Color = Color::Cyan;
    const SELECTED: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Terminal I/O for the interactive session.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, categorizer: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("rfpcat"),
            ResetColor,
            Print(" - RFP categorization workspace\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Categorizer: {}\n", categorizer)),
            Print("Type 'help' for commands, 'quit' to end.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a line of user input with prompt. Returns `None` at end of input.
    pub fn read_input(&self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::PROMPT),
            Print("rfpcat> "),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }

    /// Print the batch, marking selected files with `*`.
    pub fn print_files(&self, files: &[DecodedFile], is_selected: impl Fn(&str) -> bool) -> Result<()> {
        let mut stdout = io::stdout();
        if files.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No files loaded.\n"),
                ResetColor,
            )?;
            return Ok(());
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("  {:<40} {:<12} {:>12}\n", "NAME", "KIND", "SIZE")),
            Print(format!("{}\n", "-".repeat(68))),
            ResetColor,
        )?;

        for file in files {
            let selected = is_selected(&file.name);
            let marker = if selected { "*" } else { " " };
            let color = match (selected, file.kind) {
                (true, _) => Colors::SELECTED,
                (false, FileKind::Unsupported) => Colors::DIM,
                (false, _) => Colors::TEXT,
            };
            execute!(
                stdout,
                SetForegroundColor(color),
                Print(format!(
                    "{} {:<40} {:<12} {:>12}\n",
                    marker,
                    file.name,
                    file.kind,
                    file.display_size()
                )),
                ResetColor,
            )?;
            if file.kind == FileKind::Unsupported {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("    {}\n", file.content)),
                    ResetColor,
                )?;
            }
        }

        stdout.flush()?;
        Ok(())
    }

    /// Print table-of-contents entries with their anchors.
    pub fn print_toc(&self, toc: &[TocItem]) -> Result<()> {
        let mut stdout = io::stdout();
        if toc.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No sections found.\n"),
                ResetColor,
            )?;
            return Ok(());
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("Table of Contents\n"),
            ResetColor,
        )?;
        for item in toc {
            execute!(
                stdout,
                Print(format!("  {} ", item.label)),
                SetForegroundColor(Colors::DIM),
                Print(format!("{}\n", item.href())),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print a block of document text.
    pub fn print_text(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::TEXT),
            Print(text),
            Print("\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show a spinner/waiting indicator. Returns a handle to stop it.
    pub fn start_spinner(&self, message: &str) -> Result<SpinnerHandle> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{} ", message)),
            ResetColor,
        )?;
        stdout.flush()?;

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = std::thread::spawn(move || {
            let frames = ['|', '/', '-', '\\'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stdout = io::stdout();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("\r{} ", frames[i % frames.len()])),
                    ResetColor,
                )
                .ok();
                stdout.flush().ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            let mut stdout = io::stdout();
            execute!(stdout, Print("\r  \r")).ok();
            stdout.flush().ok();
        });

        Ok(SpinnerHandle {
            running,
            thread: Some(handle),
        })
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Handle to a running spinner. Drop or call stop() to terminate it.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Stop the spinner and wait until its line is cleared.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.halt();
    }
}
