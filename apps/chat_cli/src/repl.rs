#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Thread,
    History,
    /// 1-based card number from the latest assistant turn with cards.
    View(usize),
    Quit,
    Unknown(String),
    Say(String),
}

pub const HELP: &str = "\
/help        show this help
/thread      print the conversation thread id
/history     re-print the whole conversation
/view <n>    show details for card <n> of the latest recommendations
/quit        leave (also /exit or Ctrl-D)";

pub fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ReplCommand::Say(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("help"), None, None) => ReplCommand::Help,
        (Some("thread"), None, None) => ReplCommand::Thread,
        (Some("history"), None, None) => ReplCommand::History,
        (Some("quit" | "exit"), None, None) => ReplCommand::Quit,
        (Some("view"), Some(n), None) => match n.parse::<usize>() {
            Ok(n) if n > 0 => ReplCommand::View(n),
            _ => ReplCommand::Unknown(trimmed.to_string()),
        },
        _ => ReplCommand::Unknown(trimmed.to_string()),
    }
}
