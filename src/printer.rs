use std::io::{self, Write};

/// Renders search results either as labeled blocks or as bare lines for piping.
pub struct Printer<W: Write> {
    out: W,
    simple: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, simple: bool) -> Self {
        Self { out, simple }
    }

    /// Simple mode prints only the names; otherwise a blank line, `header:` and one
    /// `- name` per match. An empty list still gets its header outside simple mode.
    pub fn results(&mut self, header: &str, names: &[String]) -> io::Result<()> {
        if self.simple {
            for name in names {
                writeln!(self.out, "{}", name)?;
            }
        } else {
            write!(self.out, "\n{}:\n", header)?;
            for name in names {
                writeln!(self.out, "- {}", name)?;
            }
        }
        self.out.flush()
    }

    /// Errors go to the same stream as results.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
