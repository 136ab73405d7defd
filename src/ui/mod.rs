//! Line-oriented terminal interface.
//!
//! Everything reads from a `BufRead` and writes to a `Write`, so menus run
//! against stdin/stdout in the binary and against in-memory buffers in tests.

pub mod display;
pub mod menu;

use std::io::{self, BufRead, Write};

/// Reads answers and writes prompts.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    /// Prints `question`, reads one line. `None` at end of input.
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Asks until the answer is a number in `1..=max`. `None` at end of
    /// input.
    pub fn choose(&mut self, question: &str, max: usize) -> io::Result<Option<usize>> {
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(Some(n)),
                _ => self.say(format!("Please enter a number from 1 to {}.", max))?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_choose_retries_until_valid() {
        let mut prompt = Prompt::new(Cursor::new("abc\n9\n2\n"), Vec::new());
        assert_eq!(prompt.choose("> ", 3).unwrap(), Some(2));
        let out = String::from_utf8(prompt.into_output()).unwrap();
        assert_eq!(out.matches("Please enter a number from 1 to 3.").count(), 2);
    }

    #[test]
    fn test_ask_at_end_of_input() {
        let mut prompt = Prompt::new(Cursor::new(""), Vec::new());
        assert_eq!(prompt.ask("> ").unwrap(), None);
        assert_eq!(prompt.choose("> ", 2).unwrap(), None);
    }
}
