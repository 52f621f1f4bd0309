use std::path::PathBuf;

use anyhow::{bail, Result};

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the batch with these files.
    Load(Vec<PathBuf>),
    List,
    Toggle(String),
    Remove(String),
    /// Print the text that `submit` would send.
    Show,
    Paste(PathBuf),
    ClearPaste,
    Submit,
    Toc,
    Export(PathBuf),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  load <paths...>   decode files as a new batch (replaces the current one)
  list              show the batch; * marks selected files
  toggle <name>     select or deselect a file
  remove <name>     drop a file from the batch
  show              print the text that will be submitted
  paste <path>      use the contents of a text file as the RFP text
  clear-paste       forget the pasted text and submit the selection again
  submit            categorize the RFP text
  toc               print the table of contents of the last result
  export <path>     write the last result as an HTML page
  help              this list
  quit              leave";

impl Command {
    /// Parse a prompt line. Blank lines yield `None`.
    ///
    /// File names for `toggle` and `remove` are the rest of the line, so names
    /// with spaces work unquoted.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "load" => {
                if rest.is_empty() {
                    bail!("usage: load <paths...>");
                }
                Command::Load(rest.split_whitespace().map(PathBuf::from).collect())
            }
            "list" | "ls" => Command::List,
            "toggle" => Command::Toggle(required(rest, "toggle <name>")?),
            "remove" | "rm" => Command::Remove(required(rest, "remove <name>")?),
            "show" => Command::Show,
            "paste" => Command::Paste(required(rest, "paste <path>")?.into()),
            "clear-paste" => Command::ClearPaste,
            "submit" => Command::Submit,
            "toc" => Command::Toc,
            "export" => Command::Export(required(rest, "export <path>")?.into()),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "/quit" | "/exit" => Command::Quit,
            other => bail!("unknown command '{}' (type 'help')", other),
        };
        Ok(Some(command))
    }
}

fn required(rest: &str, usage: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn load_takes_every_path() {
        assert_eq!(
            Command::parse("load a.txt  rfp.pdf").unwrap(),
            Some(Command::Load(vec!["a.txt".into(), "rfp.pdf".into()]))
        );
    }

    #[test]
    fn names_keep_their_spaces() {
        assert_eq!(
            Command::parse("toggle Site Survey.docx").unwrap(),
            Some(Command::Toggle("Site Survey.docx".into()))
        );
        assert_eq!(
            Command::parse("rm  old notes.txt ").unwrap(),
            Some(Command::Remove("old notes.txt".into()))
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(Command::parse("SUBMIT").unwrap(), Some(Command::Submit));
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("clear-paste").unwrap(), Some(Command::ClearPaste));
    }

    #[test]
    fn missing_argument_reports_usage() {
        let err = Command::parse("export").unwrap_err();
        assert!(err.to_string().contains("export <path>"));
        assert!(Command::parse("load").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(Command::parse("frobnicate").is_err());
    }
}
