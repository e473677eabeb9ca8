use std::str::FromStr;

use crate::config::PAGE_LIMITS;
use crate::dto::user_dto::UpdateUserPayload;
use crate::models::user::SortField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    ClearSearch,
    Page(u32),
    NextPage,
    PrevPage,
    Limit(u32),
    Sort(SortField),
    Reset,
    Refresh,
    Edit(String),
    Save(UpdateUserPayload),
    Cancel,
    Show,
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  search <text>   filter by name, email, department or role
  clear           clear the search box
  page <n>        jump to page n
  next | prev     move one page
  limit <n>       rows per page (5, 8, 10, 20)
  sort <field>    name | email | role | status | joinedAt (again to flip order)
  reset           clear search and sorting
  refresh         refetch the current page
  edit <id>       open the edit dialog
  save <json>     save the dialog, e.g. save {\"name\": \"Aria Chen\", \"role\": \"editor\"}
  cancel          close the edit dialog
  show            redraw
  json            print the current page as JSON
  help            this text
  quit";

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head.to_ascii_lowercase().as_str() {
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "clear" => Ok(Command::ClearSearch),
            "page" | "p" => parse_number(rest, "page").and_then(|n| {
                if n == 0 {
                    Err("page must be at least 1".to_string())
                } else {
                    Ok(Command::Page(n))
                }
            }),
            "next" | "n" => Ok(Command::NextPage),
            "prev" => Ok(Command::PrevPage),
            "limit" => parse_number(rest, "limit").and_then(|n| {
                if PAGE_LIMITS.contains(&n) {
                    Ok(Command::Limit(n))
                } else {
                    Err(format!("limit must be one of {:?}", PAGE_LIMITS))
                }
            }),
            "sort" => rest.parse::<SortField>().map(Command::Sort),
            "reset" => Ok(Command::Reset),
            "refresh" | "r" => Ok(Command::Refresh),
            "edit" | "e" if !rest.is_empty() => Ok(Command::Edit(rest.to_string())),
            "edit" | "e" => Err("usage: edit <id>".to_string()),
            "save" => serde_json::from_str::<UpdateUserPayload>(rest)
                .map(Command::Save)
                .map_err(|e| format!("invalid payload: {}", e)),
            "cancel" => Ok(Command::Cancel),
            "show" | "" => Ok(Command::Show),
            "json" => Ok(Command::Json),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command: {} (try `help`)", other)),
        }
    }
}

fn parse_number(raw: &str, what: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| format!("{} expects a number, got `{}`", what, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    #[test]
    fn parses_navigation() {
        assert_eq!("page 3".parse::<Command>(), Ok(Command::Page(3)));
        assert_eq!("next".parse::<Command>(), Ok(Command::NextPage));
        assert_eq!("limit 10".parse::<Command>(), Ok(Command::Limit(10)));
        assert!("limit 7".parse::<Command>().is_err());
        assert!("page 0".parse::<Command>().is_err());
        assert_eq!("sort joinedAt".parse::<Command>(), Ok(Command::Sort(SortField::JoinedAt)));
    }

    #[test]
    fn search_keeps_inner_spaces() {
        assert_eq!(
            "search  aria chen ".parse::<Command>(),
            Ok(Command::Search("aria chen".to_string()))
        );
        assert_eq!("search".parse::<Command>(), Ok(Command::Search(String::new())));
    }

    #[test]
    fn save_parses_partial_json() {
        let cmd: Command = r#"save {"role": "viewer"}"#.parse().unwrap();
        assert_eq!(
            cmd,
            Command::Save(UpdateUserPayload {
                role: Some(UserRole::Viewer),
                ..Default::default()
            })
        );
        assert!(r#"save {"nickname": "x"}"#.parse::<Command>().is_err());
    }
}
