use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vakit", version, author, about = "Prayer-time countdown and reminders in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and the countdown to the next one
    Times,
    /// Show or change the selected city
    City {
        /// Province name (e.g. "Ankara" or "İzmir"); omit to show the current one
        name: Option<String>,
    },
    /// List the built-in cities, optionally filtered
    Cities {
        /// Case-insensitive filter on the city name
        query: Option<String>,
    },
    /// Reminder preferences
    Notify {
        #[command(subcommand)]
        action: NotifyCommands,
    },
    /// Show the reminders waiting to be delivered
    Reminders,
    /// Deliver due reminders in the foreground until interrupted
    Deliver {
        /// Deliver what is due once and exit
        #[arg(long)]
        once: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotifyCommands {
    /// Show which prayers have reminders enabled
    List,
    /// Flip the reminder for a prayer
    Toggle {
        /// Prayer name (fajr, sunrise, dhuhr, asr, maghrib, isha or the Turkish name)
        prayer: String,
    },
    /// Turn the reminder for a prayer on
    Enable {
        /// Prayer name
        prayer: String,
    },
    /// Turn the reminder for a prayer off
    Disable {
        /// Prayer name
        prayer: String,
    },
}
