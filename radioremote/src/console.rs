//! Line-oriented console mirroring the remote screen's controls.

use anyhow::Result;
use radio_client::{ConnectionManager, ConnectionState, LastKnownStatus};
use radio_protocol::status::UnknownApp;
use radio_protocol::{App, Command, StatusRecord, ViewMode};
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  connect              open the connection (reconnects automatically)
  disconnect           close the connection
  endpoint <url>       set the radio address (while disconnected)
  app <id>             bring radio1, radio2, music or video to the front
  radio1 | radio2 | music | video
                       shorthand for app <id>
  notify <text>        show text on the radio
  status               ask the radio for its status
  show                 print the last status received
  state                print the connection state
  help                 print this text
  quit                 leave";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Connect,
    Disconnect,
    Endpoint(String),
    Send(Command),
    Show,
    State,
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    App(#[from] UnknownApp),
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let argument = |name: &'static str| {
            if rest.is_empty() {
                Err(ParseError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "connect" => Ok(Self::Connect),
            "disconnect" => Ok(Self::Disconnect),
            "endpoint" => Ok(Self::Endpoint(argument("endpoint")?)),
            "app" => {
                let app: App = argument("app")?.parse()?;
                Ok(Self::Send(app.into()))
            }
            "notify" => Ok(Self::Send(Command::Notification(argument("notify")?))),
            "status" => Ok(Self::Send(Command::StatusRequest)),
            "show" => Ok(Self::Show),
            "state" => Ok(Self::State),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => other
                .parse::<App>()
                .map(|app| Self::Send(app.into()))
                .map_err(|_| ParseError::Unknown(word.to_string())),
        }
    }
}

/// Human-readable one-line summary of a status snapshot.
pub fn describe(record: &StatusRecord) -> String {
    match record.app {
        App::Radio1 | App::Radio2 => {
            let station = record.active_station().unwrap_or_default();
            format!("[{}] station {}", record.app, station)
        }
        App::Music => {
            let music = &record.music;
            match music.view_mode {
                ViewMode::Folder if music.album_name.is_empty() => {
                    "[music] browsing folders".to_string()
                }
                ViewMode::Folder => format!("[music] browsing {}", music.album_name),
                ViewMode::Playback if music.album_name.is_empty() => {
                    format!("[music] playing {}", music.current_song_name)
                }
                ViewMode::Playback => format!(
                    "[music] playing {} from {}",
                    music.current_song_name, music.album_name
                ),
            }
        }
        App::Video => {
            if record.video.is_empty() {
                "[video]".to_string()
            } else {
                let fields = record
                    .video
                    .0
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>();
                format!("[video] {}", fields.join(" "))
            }
        }
    }
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run(manager: &ConnectionManager, status: &LastKnownStatus) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    while let Some(line) = lines.next_line().await? {
        let action = match line.parse::<Action>() {
            Ok(action) => action,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match action {
            Action::Quit => break,
            Action::Connect => {
                if let Err(e) = manager.connect() {
                    println!("{e}");
                }
            }
            Action::Disconnect => manager.disconnect(),
            Action::Endpoint(url) => match manager.configure(&url) {
                Ok(()) => println!("Endpoint set to {url}"),
                Err(e) => println!("{e}"),
            },
            Action::Send(command) => {
                if manager.state() != ConnectionState::Connected {
                    println!("Not connected, command dropped");
                }
                manager.send(command.encode());
            }
            Action::Show => match status.get() {
                Some(record) => println!("{}", describe(&record)),
                None => println!("No status received yet"),
            },
            Action::State => println!("{} ({})", manager.state(), manager.lifecycle()),
            Action::Help => println!("{HELP}"),
        }
    }

    Ok(())
}
