use crate::domain::Recurser;

pub const HELP: &str = "**How to use Pairing Bot:**\n\
* `subscribe` to start getting matched with other Pairing Bot users for pair programming\n\
* `schedule monday wednesday friday` to set your weekly pairing schedule\n  \
* In this example, I've been set to find pairing partners for you on every Monday, Wednesday, and Friday\n  \
* You can schedule pairing for any combination of days in the week\n\
* `skip tomorrow` to skip pairing tomorrow\n  \
* This is valid until matches go out for the day\n\
* `unskip tomorrow` to undo skipping tomorrow\n\
* `status` to show your current schedule, skip status, and name\n\
* `count` to get the current number of subscribers\n\
* `unsubscribe` to stop getting matched entirely";

pub const SUBSCRIBED: &str = "Yay! You're now subscribed to Pairing Bot!\n\
Currently, I'm set to find pair programming partners for you on **Mondays**, **Tuesdays**, **Wednesdays**, **Thursdays**, and **Fridays**.\n\
You can customize your schedule any time with `schedule` :)";

pub const ALREADY_SUBSCRIBED: &str =
    "You're already subscribed! Use `schedule` to set your schedule.";

pub const UNSUBSCRIBED: &str = "You're unsubscribed!\n\
I won't find pairing partners for you unless you `subscribe`.\n\nBe well :)";

pub const NOT_SUBSCRIBED: &str = "You're not subscribed to Pairing Bot <3";

pub const SCHEDULE_SET: &str =
    "Awesome, your new schedule's been set! You can check it with `status`.";

pub const SKIPPING: &str =
    "Tomorrow: cancelled. I feel you. **I will not match you** for pairing tomorrow <3";

pub const UNSKIPPING: &str =
    "Tomorrow: uncancelled! Heckin *yes*! **I will match you** for pairing tomorrow :)";

pub const MATCHED: &str = "Hi you two! You've been matched for pairing :)\n\nHave fun!";

pub const ODD_ONE_OUT: &str = "OK this is awkward.\n\
There were an odd number of people in the match-set today, which means that one person couldn't get paired. \
Unfortunately, it was you -- I'm really sorry :(\n\
I promise it's not personal, it was very much random. Hopefully this doesn't happen again too soon. Enjoy your day! <3";

pub const OFFBOARDED: &str = "Hi! You've been unsubscribed from Pairing Bot.\n\n\
This happens at the end of every batch, when everyone is offboarded even if they're still in batch. \
If you'd like to re-subscribe, just send me a message that says `subscribe`.\n\nBe well! :)";

pub const INTRO: &str = "Hi! I'm Pairing Bot!\n\n\
Send me a PM that says `subscribe` to get started :smiley:\n\n:pear::robot:\n:octopus::octopus:";

pub const MAINTENANCE: &str = "pairing bot is down for maintenance";

pub fn read_error(owner_handle: &str) -> String {
    format!(
        "Something went sideways while reading from the database. You should probably ping {}",
        owner_handle
    )
}

pub fn write_error(owner_handle: &str) -> String {
    format!(
        "Something went sideways while writing to the database. You should probably ping {}",
        owner_handle
    )
}

pub fn offboarding_failed(owner_handle: &str) -> String {
    format!(
        "Uh oh, I was trying to offboard you since it's the end of batch, but something went wrong. \
         Consider messaging {} to let them know this happened.",
        owner_handle
    )
}

pub fn subscriber_count(count: usize) -> String {
    format!(
        "There are currently {} users subscribed to Pairing Bot.",
        count
    )
}

pub fn status(recurser: &Recurser) -> String {
    let skipping = if recurser.is_skipping_tomorrow {
        " "
    } else {
        " not "
    };

    format!(
        "* You're {}\n* You're scheduled for pairing on **{}**\n* **You're{}set to skip** pairing tomorrow",
        recurser.name,
        recurser.schedule.describe(),
        skipping
    )
}
