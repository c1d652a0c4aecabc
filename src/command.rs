use food::message::Message;

/// A line typed at the item prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Rename { old_title: String, new_title: String },
    Remove(String),
    Clear,
    Search(String),
    Refresh,
    List,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  add <name>              order a food
  rename <old> => <new>   rename an order
  rm <name>               delete an order
  clear                   delete every order
  search [text]           filter the list (no text shows everything)
  refresh                 reload from the server
  list                    show the list again
  help                    show this help
  quit                    leave";

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "add" => Ok(Self::Add(rest.to_string())),
            "rename" => {
                let (old, new) = rest
                    .split_once("=>")
                    .ok_or_else(|| "Usage: rename <old> => <new>".to_string())?;
                Ok(Self::Rename {
                    old_title: old.trim().to_string(),
                    new_title: new.trim().to_string(),
                })
            }
            "rm" | "delete" => {
                if rest.is_empty() {
                    return Err("Usage: rm <name>".to_string());
                }
                Ok(Self::Remove(rest.to_string()))
            }
            "clear" => Ok(Self::Clear),
            "search" => Ok(Self::Search(rest.to_string())),
            "refresh" => Ok(Self::Refresh),
            "list" | "" => Ok(Self::List),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {} (try `help`)", other)),
        }
    }

    /// Messages this command sends to the state, in order.
    pub fn messages(self) -> Vec<Message> {
        match self {
            Self::Add(title) => vec![Message::DraftChanged(title), Message::AddItem],
            Self::Rename {
                old_title,
                new_title,
            } => vec![Message::RenameItem {
                old_title,
                new_title,
            }],
            Self::Remove(title) => vec![Message::DeleteItem(title)],
            Self::Clear => vec![Message::DeleteAllItems],
            Self::Search(query) => vec![Message::SearchChanged(query)],
            Self::Refresh => vec![Message::Refresh],
            Self::List | Self::Help | Self::Quit => Vec::new(),
        }
    }
}
