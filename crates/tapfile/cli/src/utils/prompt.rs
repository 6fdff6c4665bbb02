use std::io::{self, Write};

use colored::Colorize;

/// Ask a yes/no question on the terminal; anything but `y`/`yes` declines
pub fn default_confirmation(message: &str) -> bool {
    print!("{} (y/n): ", message.yellow());
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    is_yes(&input)
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}
