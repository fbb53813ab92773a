use std::io::{self, BufRead, Write};

/// Line-oriented operator I/O.
///
/// Reads one trimmed line per question and treats end of input as `None`, so
/// the menus can unwind cleanly when stdin closes.
pub struct Prompter<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> Prompter<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// Print `question` without a newline and read the answer.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a stray
    /// Latin-1 character is an ordinary (likely unmatched) answer.
    ///
    /// # Returns
    /// The answer with surrounding whitespace removed, or `None` at end of input
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    pub fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    /// Report a failed operation in the uniform `Error: <message>` form.
    pub fn error(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "Error: {}", message)
    }

    pub fn into_output(self) -> O {
        self.output
    }
}
