use acl_monitor_core::Speaker;
use colored::Colorize;

/// Speaker that prints coaching cues to the terminal
///
/// Utterances complete immediately, so nothing is ever in flight to cancel.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSpeaker {
    echo: bool,
}

impl ConsoleSpeaker {
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }
}

impl Speaker for ConsoleSpeaker {
    fn speak(&mut self, text: &str) {
        if self.echo {
            println!("  {} {}", "coach:".cyan().bold(), text.cyan());
        }
    }

    fn cancel(&mut self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}
