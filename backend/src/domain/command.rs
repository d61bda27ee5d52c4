use chrono::Weekday;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Subscribe,
    Unsubscribe,
    /// Replace the weekly schedule with exactly these days.
    Schedule(Vec<Weekday>),
    Skip,
    Unskip,
    Status,
    Count,
    Help,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("`{0}` is not a command I know")]
    UnknownCommand(String),
    #[error("`{0}` is not a day of the week")]
    InvalidDay(String),
    #[error("`{command}` only understands `tomorrow`, got `{argument}`")]
    InvalidSkipArgument { command: String, argument: String },
}

impl Command {
    /// Turns a free-form chat message into a command.
    ///
    /// An empty message asks for help. `skip` and `unskip` accept either
    /// `tomorrow` or no argument at all, so a bare `skip` means `skip tomorrow`.
    pub fn parse(message: &str) -> Result<Self, CommandParseError> {
        let lowered = message.to_lowercase();
        let mut words = lowered.split_whitespace();

        let verb = match words.next() {
            Some(verb) => verb,
            None => return Ok(Command::Help),
        };
        let arguments: Vec<&str> = words.collect();

        match verb {
            "subscribe" => Ok(Command::Subscribe),
            "unsubscribe" => Ok(Command::Unsubscribe),
            "status" => Ok(Command::Status),
            "count" => Ok(Command::Count),
            "help" => Ok(Command::Help),
            "schedule" => arguments
                .iter()
                .map(|day| {
                    day.parse::<Weekday>()
                        .map_err(|_| CommandParseError::InvalidDay(day.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Command::Schedule),
            "skip" | "unskip" => {
                match arguments.as_slice() {
                    [] | ["tomorrow"] => {}
                    _ => {
                        return Err(CommandParseError::InvalidSkipArgument {
                            command: verb.to_string(),
                            argument: arguments.join(" "),
                        })
                    }
                }
                if verb == "skip" {
                    Ok(Command::Skip)
                } else {
                    Ok(Command::Unskip)
                }
            }
            other => Err(CommandParseError::UnknownCommand(other.to_string())),
        }
    }
}
