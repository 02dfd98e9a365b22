use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::FormatError;
use crate::generator::output::Formatter;

/// Formats Go source by piping it through `gofmt`.
#[derive(Debug, Clone)]
pub struct GoFormatter {
    program: String,
}

impl Default for GoFormatter {
    fn default() -> Self {
        Self::new("gofmt")
    }
}

impl GoFormatter {
    /// Use `program` instead of the `gofmt` found on `PATH`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Formatter for GoFormatter {
    fn name(&self) -> &str {
        "gofmt"
    }

    fn format(&self, source: &str) -> Result<String, FormatError> {
        let spawn_err = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let stdin = child.stdin.take();
        // Feed stdin from another thread so a formatter that streams its
        // output cannot block on a full pipe.
        let output = std::thread::scope(|s| {
            let writer = s.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            output.and_then(|out| {
                // A formatter that rejects its input may exit before reading
                // all of it; its status is the more useful error then.
                if out.status.success() {
                    written.map(|()| out)
                } else {
                    Ok(out)
                }
            })
        })
        .map_err(spawn_err)?;

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        debug!(program = %self.program, bytes = output.stdout.len(), "formatted output");
        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}
