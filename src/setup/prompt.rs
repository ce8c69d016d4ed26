//! Line-oriented prompts with defaults
//!
//! Every prompt shows its default in brackets; pressing Enter accepts it.
//! Invalid answers are re-asked. End of input aborts with an error so a
//! closed stdin can never spin a re-prompt loop.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::{SnapError, SnapResult};
use crate::schedule::validate_time_hhmm;

/// Reads answers from `R` and writes questions to `W`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Create a prompter over arbitrary streams
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning the output stream
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print one line
    pub fn say(&mut self, line: &str) -> SnapResult<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> SnapResult<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SnapError::Io("input closed before setup finished".into()));
        }
        Ok(line.trim().to_string())
    }

    /// Free-form answer; empty input yields the default
    pub fn with_default(&mut self, text: &str, default: &str) -> SnapResult<String> {
        let answer = self.ask(&format!("{} [{}]: ", text, default))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Integer answer of at least `min`
    pub fn u32_with_default(&mut self, text: &str, default: u32, min: u32) -> SnapResult<u32> {
        loop {
            let answer = self.ask(&format!("{} [{}]: ", text, default))?;
            if answer.is_empty() {
                return Ok(default);
            }
            if answer.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(value) = answer.parse::<u32>() {
                    if value >= min {
                        return Ok(value);
                    }
                }
            }
            self.say(&format!("Enter an integer >= {}.", min))?;
        }
    }

    /// Yes/no answer
    pub fn yes_no(&mut self, text: &str, default_yes: bool) -> SnapResult<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{} [{}]: ", text, hint))?.to_lowercase();
            match answer.as_str() {
                "" => return Ok(default_yes),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Answer y or n.")?,
            }
        }
    }

    /// 24-hour `HH:MM` answer
    pub fn time_hhmm(&mut self, text: &str, default: &str) -> SnapResult<String> {
        loop {
            let answer = self.with_default(text, default)?;
            if validate_time_hhmm(&answer) {
                return Ok(answer);
            }
            self.say("Use 24-hour HH:MM, e.g., 09:00 or 18:30.")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_default_on_empty() {
        let mut p = prompter("\n");
        assert_eq!(p.with_default("Backup root", "D:/Backup").unwrap(), "D:/Backup");
        let shown = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(shown, "Backup root [D:/Backup]: ");
    }

    #[test]
    fn test_integer_reprompts_until_valid() {
        let mut p = prompter("abc\n0\n-3\n14\n");
        assert_eq!(p.u32_with_default("Retention", 30, 1).unwrap(), 14);
        let shown = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(shown.matches("Enter an integer >= 1.").count(), 3);
    }

    #[test]
    fn test_yes_no() {
        let mut p = prompter("\nmaybe\nYES\nn\n");
        assert!(p.yes_no("Run now?", true).unwrap());
        assert!(p.yes_no("Install?", false).unwrap());
        assert!(!p.yes_no("Stop?", true).unwrap());
    }

    #[test]
    fn test_time_validation() {
        let mut p = prompter("25:00\n7:30\n18:30\n");
        assert_eq!(p.time_hhmm("Start", "09:00").unwrap(), "18:30");
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        let mut p = prompter("");
        assert!(p.yes_no("Run now?", true).is_err());
    }
}
