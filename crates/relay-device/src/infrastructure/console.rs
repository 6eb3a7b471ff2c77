//! Line-oriented console front end.
//!
//! Stands in for the touch screen: each line typed on stdin becomes one or
//! more [`UiAction`]s.
//!
//! | Line                          | Actions                                  |
//! |-------------------------------|------------------------------------------|
//! | `move <x> <y>`                | `TouchMove`                              |
//! | `lift`                        | `TouchEnd`                               |
//! | `click [left\|right]`         | `Click` (left when omitted)              |
//! | `scroll up\|down`             | `Scroll`                                 |
//! | `key <name>`                  | `Key`                                    |
//! | `text <words…>`               | `EditText` then `SendText`               |
//! | `mic`                         | `ToggleMicrophone`                       |
//! | `connect`                     | `Reconnect`                              |
//! | `connect <url>`               | `ConnectUrl`                             |
//! | `connect <host> <port> <pin>` | `ConnectManual`                          |
//! | `scan <payload>`              | `QrScanned`                              |
//! | `disconnect`                  | `Disconnect`                             |
//! | `help` / `quit`               | handled by the binary                    |

use relay_core::{KeyName, MouseButton, ScrollDirection};
use thiserror::Error;

use crate::application::event_loop::UiAction;

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  connect [<url> | <host> <port> <pin>]   connect (or reconnect)
  scan <payload>                          use a scanned QR payload
  disconnect
  move <x> <y> / lift                     touch-pad contact
  click [left|right]
  scroll up|down
  key <enter|backspace|esc|tab|space|delete|up|down|left|right|home|end>
  text <words...>                         type and send text
  mic                                     toggle the microphone
  help / quit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Actions(Vec<UiAction>),
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    InvalidArgument(String),
}

/// Parses one line of console input.
///
/// # Errors
///
/// Returns [`ConsoleError`] for unknown commands or malformed arguments.
pub fn parse_line(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let trimmed = line.trim();
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let action = match verb.to_ascii_lowercase().as_str() {
        "" => return Ok(ConsoleCommand::Empty),
        "help" | "?" => return Ok(ConsoleCommand::Help),
        "quit" | "exit" => return Ok(ConsoleCommand::Quit),

        "text" => {
            // Keep the text exactly as typed after the verb.
            return Ok(ConsoleCommand::Actions(vec![
                UiAction::EditText(rest.to_string()),
                UiAction::SendText,
            ]));
        }

        "move" => match args.as_slice() {
            [x, y] => UiAction::TouchMove {
                x: parse_coordinate(x)?,
                y: parse_coordinate(y)?,
            },
            _ => return Err(ConsoleError::Usage("move <x> <y>")),
        },
        "lift" => UiAction::TouchEnd,
        "click" => match args.as_slice() {
            [] => UiAction::Click(MouseButton::Left),
            [button] => UiAction::Click(
                button
                    .parse::<MouseButton>()
                    .map_err(ConsoleError::InvalidArgument)?,
            ),
            _ => return Err(ConsoleError::Usage("click [left|right]")),
        },
        "scroll" => match args.as_slice() {
            [direction] => UiAction::Scroll(
                direction
                    .parse::<ScrollDirection>()
                    .map_err(ConsoleError::InvalidArgument)?,
            ),
            _ => return Err(ConsoleError::Usage("scroll up|down")),
        },
        "key" => match args.as_slice() {
            [name] => UiAction::Key(
                name.parse::<KeyName>()
                    .map_err(ConsoleError::InvalidArgument)?,
            ),
            _ => return Err(ConsoleError::Usage("key <name>")),
        },
        "mic" => UiAction::ToggleMicrophone,
        "disconnect" => UiAction::Disconnect,
        "connect" => match args.as_slice() {
            [] => UiAction::Reconnect,
            [url] => UiAction::ConnectUrl((*url).to_string()),
            [host, port, pin] => UiAction::ConnectManual {
                host: (*host).to_string(),
                port: (*port).to_string(),
                pin: (*pin).to_string(),
            },
            _ => return Err(ConsoleError::Usage("connect [<url> | <host> <port> <pin>]")),
        },
        "scan" => {
            if rest.is_empty() {
                return Err(ConsoleError::Usage("scan <payload>"));
            }
            UiAction::QrScanned(rest.to_string())
        }
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };

    Ok(ConsoleCommand::Actions(vec![action]))
}

fn parse_coordinate(raw: &str) -> Result<f64, ConsoleError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConsoleError::InvalidArgument(format!("'{raw}' is not a coordinate")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(line: &str) -> Vec<UiAction> {
        match parse_line(line).unwrap() {
            ConsoleCommand::Actions(actions) => actions,
            other => panic!("expected actions, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_line_is_empty() {
        assert_eq!(parse_line("   ").unwrap(), ConsoleCommand::Empty);
    }

    #[test]
    fn test_help_and_quit() {
        assert_eq!(parse_line("help").unwrap(), ConsoleCommand::Help);
        assert_eq!(parse_line("QUIT").unwrap(), ConsoleCommand::Quit);
    }

    #[test]
    fn test_move_parses_coordinates() {
        assert_eq!(
            actions("move 10.5 -3"),
            vec![UiAction::TouchMove { x: 10.5, y: -3.0 }]
        );
    }

    #[test]
    fn test_move_rejects_non_numeric() {
        assert!(matches!(
            parse_line("move a 1"),
            Err(ConsoleError::InvalidArgument(_))
        ));
        assert_eq!(
            parse_line("move 1"),
            Err(ConsoleError::Usage("move <x> <y>"))
        );
    }

    #[test]
    fn test_click_defaults_to_left() {
        assert_eq!(actions("click"), vec![UiAction::Click(MouseButton::Left)]);
        assert_eq!(
            actions("click right"),
            vec![UiAction::Click(MouseButton::Right)]
        );
    }

    #[test]
    fn test_scroll_and_key() {
        assert_eq!(
            actions("scroll down"),
            vec![UiAction::Scroll(ScrollDirection::Down)]
        );
        assert_eq!(actions("key escape"), vec![UiAction::Key(KeyName::Esc)]);
        assert!(parse_line("key f13").is_err());
    }

    #[test]
    fn test_text_keeps_inner_spacing() {
        assert_eq!(
            actions("text echo  hi"),
            vec![
                UiAction::EditText("echo  hi".to_string()),
                UiAction::SendText
            ]
        );
    }

    #[test]
    fn test_connect_forms() {
        assert_eq!(actions("connect"), vec![UiAction::Reconnect]);
        assert_eq!(
            actions("connect ws://10.0.0.2:8765?pin=1234"),
            vec![UiAction::ConnectUrl("ws://10.0.0.2:8765?pin=1234".into())]
        );
        assert_eq!(
            actions("connect 10.0.0.2 8765 1234"),
            vec![UiAction::ConnectManual {
                host: "10.0.0.2".into(),
                port: "8765".into(),
                pin: "1234".into()
            }]
        );
        assert!(matches!(
            parse_line("connect a b"),
            Err(ConsoleError::Usage(_))
        ));
    }

    #[test]
    fn test_scan_requires_payload() {
        assert_eq!(
            actions("scan ws://h:1?pin=9"),
            vec![UiAction::QrScanned("ws://h:1?pin=9".into())]
        );
        assert_eq!(
            parse_line("scan"),
            Err(ConsoleError::Usage("scan <payload>"))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("dance"),
            Err(ConsoleError::UnknownCommand("dance".to_string()))
        );
    }
}
