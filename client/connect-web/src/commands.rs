//! Terminal command parsing

use pin_placement::{GeoError, GeoPoint};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String, password: String },
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
        is_mentor: bool,
        profile_photo_url: String,
    },
    Logout,
    Posts,
    Click(GeoPoint),
    Reset,
    Confirm,
    Submit(String),
    Open(String),
    Close,
    DeletePost,
    Comment(String),
    DeleteComment(String),
    Mentors,
    Choose(String),
    Toggle,
    Mentee,
    Map,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid coordinates: {0}")]
    Coordinates(#[from] GeoError),
}

pub const HELP: &str = "\
login <username> <password>
register <username> <email> <password> <confirm> <mentor|mentee> <photo-url>
logout
posts                     reload published posts
click <lng> <lat>         click the map
reset                     start pin placement over
confirm                   show the compose sheet
submit <message>          publish your story
open <post-id> | close    post detail panel
delete                    delete the open post
comment <message>         comment on the open post
uncomment <comment-id>
mentors                   mentor candidates for the open post
choose <mentor-id>
toggle                    toggle your mentor availability
mentee                    show your mentee record
map                       dump the map layer as GeoJSON
quit";

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match verb {
            "login" => match args.as_slice() {
                [username, password] => Command::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(CommandError::Usage("login <username> <password>")),
            },
            "register" => match args.as_slice() {
                [username, email, password, confirm, role, photo] => Command::Register {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    confirm_password: confirm.to_string(),
                    is_mentor: match *role {
                        "mentor" => true,
                        "mentee" => false,
                        _ => return Err(CommandError::Usage("role must be mentor or mentee")),
                    },
                    profile_photo_url: photo.to_string(),
                },
                _ => {
                    return Err(CommandError::Usage(
                        "register <username> <email> <password> <confirm> <mentor|mentee> <photo-url>",
                    ))
                }
            },
            "click" => match args.as_slice() {
                [lng, lat] => {
                    let lng: f64 = lng.parse().map_err(|_| CommandError::Usage("click <lng> <lat>"))?;
                    let lat: f64 = lat.parse().map_err(|_| CommandError::Usage("click <lng> <lat>"))?;
                    Command::Click(GeoPoint::new(lng, lat)?)
                }
                _ => return Err(CommandError::Usage("click <lng> <lat>")),
            },
            "submit" if !rest.is_empty() => Command::Submit(rest.to_string()),
            "submit" => return Err(CommandError::Usage("submit <message>")),
            "comment" if !rest.is_empty() => Command::Comment(rest.to_string()),
            "comment" => return Err(CommandError::Usage("comment <message>")),
            "open" => Command::Open(single(&args, "open <post-id>")?),
            "uncomment" => Command::DeleteComment(single(&args, "uncomment <comment-id>")?),
            "choose" => Command::Choose(single(&args, "choose <mentor-id>")?),
            "logout" => Command::Logout,
            "posts" => Command::Posts,
            "reset" => Command::Reset,
            "confirm" => Command::Confirm,
            "close" => Command::Close,
            "delete" => Command::DeletePost,
            "mentors" => Command::Mentors,
            "toggle" => Command::Toggle,
            "mentee" => Command::Mentee,
            "map" => Command::Map,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn single(args: &[&str], usage: &'static str) -> Result<String, CommandError> {
    match args {
        [one] => Ok(one.to_string()),
        _ => Err(CommandError::Usage(usage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_click() {
        assert_eq!(
            Command::parse("click 2.35 48.85").unwrap(),
            Some(Command::Click(GeoPoint::new(2.35, 48.85).unwrap()))
        );
        assert!(matches!(
            Command::parse("click 2.35 95"),
            Err(CommandError::Coordinates(_))
        ));
        assert!(matches!(
            Command::parse("click east north"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn test_parse_free_text() {
        assert_eq!(
            Command::parse("submit  Moved to Tokyo for my degree ").unwrap(),
            Some(Command::Submit("Moved to Tokyo for my degree".into()))
        );
        assert!(Command::parse("comment").is_err());
    }

    #[test]
    fn test_parse_register() {
        let cmd = Command::parse(
            "register arkan arkan@example.com pw pw mentor https://i.imgur.com/bbL3WR6.png",
        )
        .unwrap()
        .unwrap();
        assert!(matches!(cmd, Command::Register { is_mentor: true, .. }));
    }

    #[test]
    fn test_blank_and_unknown() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("fly").unwrap_err(),
            CommandError::Unknown("fly".into())
        );
    }
}
