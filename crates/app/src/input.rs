//! Line commands typed during a quiz.

use reading_core::model::OptionLetter;
use services::SessionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Event(SessionEvent),
    Redraw,
    Help,
    Quit,
}

/// Parse one line. Question numbers are 1-based; letters select options.
#[must_use]
pub fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    let input = match line.to_ascii_lowercase().as_str() {
        "" | "r" | "redraw" => Input::Redraw,
        "n" | "next" => Input::Event(SessionEvent::Next),
        "p" | "prev" => Input::Event(SessionEvent::Prev),
        "m" | "mark" => Input::Event(SessionEvent::ToggleMark),
        "s" | "submit" => Input::Event(SessionEvent::RequestSubmit),
        "?" | "h" | "help" => Input::Help,
        "q" | "quit" => Input::Quit,
        other => {
            if let Ok(number) = other.parse::<usize>() {
                return number.checked_sub(1).map(|i| Input::Event(SessionEvent::GoTo(i)));
            }
            let mut chars = line.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return None;
            };
            let letter = OptionLetter::from_char(c).ok()?;
            Input::Event(SessionEvent::Select(letter))
        }
    };
    Some(input)
}

/// Whether a confirmation answer means yes.
#[must_use]
pub fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub const HELP: &str = "\
  a-f        select an option (toggles on multi-select questions)
  n / p      next / previous question
  <number>   jump to question
  m          mark or unmark for review
  s          submit
  r          redraw
  q          quit without submitting";
