//! Y/N operator prompts.

use std::io::{self, BufRead, Write};

/// Print `question` and read one line. Only `y` (trimmed, any case)
/// confirms; anything else, including end of input, declines.
pub fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    writeln!(output, "{question} (Y or N)")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// [`confirm`] on stdin/stdout, or `true` without asking when `assume_yes`.
pub fn ask(question: &str, assume_yes: bool) -> io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    confirm(question, &mut io::stdin().lock(), &mut io::stdout())
}
