//! Interactive decision prompt.

use std::io::{self, BufRead, Stderr, StdinLock, Write};

use polymend::{Decision, DecisionProvider, DecisionRequest};
use tracing::{debug, warn};

/// Unparseable answers tolerated before giving up.
const MAX_ATTEMPTS: usize = 3;

/// Asks the operator on a line-based terminal.
///
/// Any I/O failure, end of input, or too many bad answers count as
/// `cancel`, so nothing is written unless someone said so.
pub struct PromptDecision<R, W> {
    input: R,
    output: W,
}

impl PromptDecision<StdinLock<'static>, Stderr> {
    /// Prompt on stderr, read answers from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptDecision<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt_once(&mut self, request: &DecisionRequest) -> io::Result<Option<String>> {
        write!(
            self.output,
            "{} of {} polygons in layer '{}' are invalid. \
             Try to repair? [cancel/repair/repair-clean]: ",
            request.invalid, request.total, request.layer
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> DecisionProvider for PromptDecision<R, W> {
    fn ask(&mut self, request: &DecisionRequest) -> Decision {
        for _ in 0..MAX_ATTEMPTS {
            let line = match self.prompt_once(request) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input at prompt, cancelling");
                    return Decision::Cancel;
                }
                Err(e) => {
                    warn!("prompt failed: {}", e);
                    return Decision::Cancel;
                }
            };

            match line.parse::<Decision>() {
                Ok(decision) => return decision,
                Err(msg) => {
                    let _ = writeln!(self.output, "{}", msg);
                }
            }
        }
        warn!("no usable answer after {} attempts, cancelling", MAX_ATTEMPTS);
        Decision::Cancel
    }
}
