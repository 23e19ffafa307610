//! Line commands typed at the prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    ClearSearch,
    MovePage(i64),
    PageSize(u32),
    Show,
    Stats,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return Ok(Command::Search(text.trim().to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "search" | "s" => Ok(Command::Search(rest.to_string())),
        "clear" => Ok(Command::ClearSearch),
        "next" | "n" => Ok(Command::MovePage(1)),
        "prev" | "p" => Ok(Command::MovePage(-1)),
        "page" => rest
            .parse::<i64>()
            .map(Command::MovePage)
            .map_err(|_| format!("page expects a signed number of pages, got '{rest}'")),
        "size" => rest
            .parse::<u32>()
            .map(Command::PageSize)
            .map_err(|_| format!("size expects a page size, got '{rest}'")),
        "show" | "" => Ok(Command::Show),
        "stats" => Ok(Command::Stats),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// The controller does not clamp page moves, so the prompt does.
pub fn page_move_allowed(page: i64, delta: i64, total_pages: Option<u64>) -> Result<(), String> {
    let target = page.saturating_add(delta);
    if target < 0 {
        return Err("already on the first page".to_string());
    }
    if let Some(total_pages) = total_pages {
        let last = i64::try_from(total_pages).unwrap_or(i64::MAX).saturating_sub(1);
        if target > last.max(0) {
            return Err("already on the last page".to_string());
        }
    }
    Ok(())
}

pub const HELP: &str = "\
commands:
  search <text> | /<text>   filter by name prefix
  clear                     drop the filter
  next | prev | page <n>    move by pages
  size <n>                  change page size
  show                      print the current page
  stats                     request counters
  quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_forms() {
        assert_eq!(
            parse_command("search spider man"),
            Ok(Command::Search("spider man".into()))
        );
        assert_eq!(parse_command("/iron"), Ok(Command::Search("iron".into())));
        assert_eq!(parse_command("search"), Ok(Command::Search(String::new())));
        assert_eq!(parse_command("clear"), Ok(Command::ClearSearch));
    }

    #[test]
    fn parses_paging_commands() {
        assert_eq!(parse_command("next"), Ok(Command::MovePage(1)));
        assert_eq!(parse_command("P"), Ok(Command::MovePage(-1)));
        assert_eq!(parse_command("page -3"), Ok(Command::MovePage(-3)));
        assert_eq!(parse_command("size 25"), Ok(Command::PageSize(25)));
        assert!(parse_command("size big").is_err());
        assert!(parse_command("teleport").is_err());
    }

    #[test]
    fn blank_line_shows_current_page() {
        assert_eq!(parse_command("   "), Ok(Command::Show));
    }

    #[test]
    fn page_moves_stay_in_bounds() {
        assert!(page_move_allowed(0, -1, Some(5)).is_err());
        assert!(page_move_allowed(4, 1, Some(5)).is_err());
        assert!(page_move_allowed(3, 1, Some(5)).is_ok());
        assert!(page_move_allowed(0, 1, None).is_ok());
        assert!(page_move_allowed(0, 0, Some(0)).is_ok());
        assert!(page_move_allowed(0, 1, Some(0)).is_err());
    }
}
