//! Result emitter.
//!
//! Streams `b` lines as backbones are confirmed, the `b 0` terminator, and
//! the final verdict, flushing after every protocol line so a consumer can
//! follow along. Comment lines carry the `c ` prefix and respect the
//! verbosity level.

use keel_base::{Lit, Result, Verbosity};
use std::io::Write;

/// Writes the `c`/`b`/`s` protocol lines.
#[derive(Debug)]
pub struct Emitter<W: Write> {
    out: W,
    verbosity: Verbosity,
    print_backbones: bool,
}

impl<W: Write> Emitter<W> {
    /// Creates an emitter over the given sink.
    pub fn new(out: W, verbosity: Verbosity, print_backbones: bool) -> Self {
        Self {
            out,
            verbosity,
            print_backbones,
        }
    }

    /// Prints a comment line, unless quiet.
    pub fn msg(&mut self, text: &str) -> Result<()> {
        if self.verbosity.allows_messages() {
            writeln!(self.out, "c {text}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Prints an empty comment line, unless quiet.
    pub fn line(&mut self) -> Result<()> {
        if self.verbosity.allows_messages() {
            writeln!(self.out, "c")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Prints one backbone literal.
    pub fn backbone(&mut self, lit: Lit) -> Result<()> {
        debug_assert!(lit != 0);
        if self.print_backbones {
            writeln!(self.out, "b {lit}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Prints the backbone list terminator.
    pub fn terminator(&mut self) -> Result<()> {
        if self.print_backbones {
            writeln!(self.out, "b 0")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Prints the verdict line; always emitted.
    pub fn verdict(&mut self, satisfiable: bool) -> Result<()> {
        let verdict = if satisfiable {
            "SATISFIABLE"
        } else {
            "UNSATISFIABLE"
        };
        writeln!(self.out, "s {verdict}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Access to the underlying sink.
    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consumes the emitter and returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_order() {
        let mut emitter = Emitter::new(Vec::new(), Verbosity::Default, true);
        emitter.backbone(3).unwrap();
        emitter.backbone(-7).unwrap();
        emitter.terminator().unwrap();
        emitter.verdict(true).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(text, "b 3\nb -7\nb 0\ns SATISFIABLE\n");
    }

    #[test]
    fn test_quiet_suppresses_comments_not_verdict() {
        let mut emitter = Emitter::new(Vec::new(), Verbosity::Quiet, true);
        emitter.msg("hello").unwrap();
        emitter.line().unwrap();
        emitter.verdict(false).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(text, "s UNSATISFIABLE\n");
    }

    #[test]
    fn test_statistics_only_mode() {
        let mut emitter = Emitter::new(Vec::new(), Verbosity::Default, false);
        emitter.backbone(1).unwrap();
        emitter.terminator().unwrap();
        emitter.verdict(true).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(text, "s SATISFIABLE\n");
    }
}
