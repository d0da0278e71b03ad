//! Cursor over an AceSerializer text stream

use crate::{CodecError, Result};

pub(crate) struct StrReader<'s> {
    input: &'s str,
    pos: usize,
}

impl<'s> StrReader<'s> {
    pub fn new(input: &'s str) -> Self {
        Self { input, pos: 0 }
    }

    /// Read a two-byte control pair such as `^S`.
    pub fn read_identifier(&mut self) -> Result<&'s str> {
        let identifier = self.peek_identifier()?;
        self.pos += identifier.len();
        Ok(identifier)
    }

    /// Look at the next control pair without consuming it.
    pub fn peek_identifier(&self) -> Result<&'s str> {
        let rest = &self.input[self.pos..];
        if rest.len() < 2 {
            return Err(CodecError::TruncatedInput);
        }
        let identifier = rest
            .get(..2)
            .ok_or_else(|| CodecError::UnknownControl(first_char(rest)))?;
        if !identifier.starts_with('^') {
            return Err(CodecError::UnknownControl(identifier.into()));
        }
        Ok(identifier)
    }

    /// Read payload bytes up to (not including) the next `^`.
    pub fn read_until_next(&mut self) -> Result<&'s str> {
        let rest = &self.input[self.pos..];
        let end = rest.find('^').unwrap_or(rest.len());
        self.pos += end;
        Ok(&rest[..end])
    }

    /// True when no identifier can be read any more.
    pub fn at_end(&self) -> bool {
        self.peek_identifier().is_err()
    }
}

fn first_char(s: &str) -> String {
    s.chars().take(1).collect()
}
