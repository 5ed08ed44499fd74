//! Parsing of interactive commands.

/// A line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Redraw the table.
    List,
    Filter(String),
    Sort(String),
    /// Empty keyword clears the search.
    Search(String),
    Show(String),
    Prefect(String),
    Squad(String),
    Expel(String),
    Counts,
    History,
    /// Re-fetch the family lists and re-derive blood status.
    Refresh,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = rest.to_string();

        match word.to_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "filter" | "f" => Command::Filter(arg),
            "sort" | "s" => Command::Sort(arg),
            "search" | "/" => Command::Search(arg),
            "show" | "info" => Command::Show(arg),
            "prefect" | "p" => Command::Prefect(arg),
            "squad" | "inquisitor" | "i" => Command::Squad(arg),
            "expel" | "x" => Command::Expel(arg),
            "counts" | "c" => Command::Counts,
            "history" | "log" => Command::History,
            "refresh" => Command::Refresh,
            "help" | "?" | "h" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  list                 redraw the table
  filter <f>           *, a house, non-expelled, expelled, prefect, inquisitor
  sort <key>           firstName, lastName, house, bloodStatus (repeat to reverse)
  search [keyword]     match first/middle/last name; no keyword clears
  show <row|name>      student details
  prefect <row|name>   appoint or revoke a prefect
  squad <row|name>     add to or remove from the inquisitorial squad
  expel <row|name>     expel a student (cannot be undone)
  counts               students per house and role
  history              applied role changes
  refresh              re-fetch the family lists
  help                 this text
  quit                 leave";
