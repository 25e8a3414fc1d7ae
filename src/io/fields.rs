//! Field scanner for one record line.

use std::str::FromStr;

use crate::model::FourVector;
use crate::{Error, Result};

/// Whitespace-separated fields after the one-letter tag of a line.
pub(crate) struct Fields<'a> {
    line: &'a str,
    pos: usize,
    line_no: usize,
}

impl<'a> Fields<'a> {
    /// Start scanning after the tag character.
    pub(crate) fn new(line: &'a str, line_no: usize) -> Self {
        let pos = line.chars().next().map_or(0, char::len_utf8);
        Self { line, pos, line_no }
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse { line: self.line_no, message: message.into() }
    }

    fn skip_whitespace(&mut self) {
        let line = self.line;
        let rest = &line[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    pub(crate) fn next_token(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let line = self.line;
        let rest = &line[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    /// Next field parsed as `T`; `what` names it in the error.
    pub(crate) fn expect<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next_token().ok_or_else(|| self.error(format!("missing {what}")))?;
        token
            .parse()
            .map_err(|_| self.error(format!("malformed {what} '{token}'")))
    }

    /// Everything after the single separator following the current field.
    pub(crate) fn rest(&mut self) -> Option<&'a str> {
        let line = self.line;
        let rest = &line[self.pos..];
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if c.is_whitespace() => {
                self.pos = self.line.len();
                Some(chars.as_str())
            }
            _ => None,
        }
    }

    /// Remaining fields, unparsed.
    pub(crate) fn remaining(&mut self) -> Vec<&'a str> {
        std::iter::from_fn(|| self.next_token()).collect()
    }

    /// `[a,b,...]`, possibly with blanks, possibly empty.
    pub(crate) fn bracket_list(&mut self, what: &str) -> Result<Vec<i32>> {
        self.skip_whitespace();
        let line = self.line;
        let rest = &line[self.pos..];
        let Some(body) = rest.strip_prefix('[') else {
            return Err(self.error(format!("missing {what}")));
        };
        let Some(close) = body.find(']') else {
            return Err(self.error(format!("unterminated {what}")));
        };
        let list = body[..close]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().map_err(|_| self.error(format!("malformed entry '{s}' in {what}"))))
            .collect::<Result<Vec<i32>>>()?;
        self.pos += 1 + close + 1;
        Ok(list)
    }

    /// `@ x y z t` if present anywhere in the remaining fields.
    pub(crate) fn position(&mut self) -> Result<Option<FourVector>> {
        while let Some(token) = self.next_token() {
            if token == "@" {
                return Ok(Some(FourVector::new(
                    self.expect("position x")?,
                    self.expect("position y")?,
                    self.expect("position z")?,
                    self.expect("position t")?,
                )));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_and_errors() {
        let mut f = Fields::new("E 12 3 abc", 4);
        assert_eq!(f.expect::<i32>("event number").unwrap(), 12);
        assert_eq!(f.expect::<usize>("vertex count").unwrap(), 3);
        let err = f.expect::<usize>("particle count").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 4, ref message } if message.contains("particle count")));
        assert!(matches!(f.expect::<i32>("x"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_bracket_list_and_position() {
        let mut f = Fields::new("V -2 0 [1, 4 ,7] @ 1 2 3 4", 1);
        f.expect::<i32>("id").unwrap();
        f.expect::<i32>("status").unwrap();
        assert_eq!(f.bracket_list("list").unwrap(), vec![1, 4, 7]);
        assert_eq!(f.position().unwrap(), Some(FourVector::new(1.0, 2.0, 3.0, 4.0)));

        let mut g = Fields::new("V -1 0 []", 1);
        g.expect::<i32>("id").unwrap();
        g.expect::<i32>("status").unwrap();
        assert!(g.bracket_list("list").unwrap().is_empty());
        assert_eq!(g.position().unwrap(), None);

        let mut h = Fields::new("V -1 0 [1,2", 1);
        h.expect::<i32>("id").unwrap();
        h.expect::<i32>("status").unwrap();
        assert!(h.bracket_list("list").is_err());
    }

    #[test]
    fn test_rest_keeps_inner_spaces() {
        let mut f = Fields::new("A 0 name  two words ", 1);
        f.expect::<i32>("owner").unwrap();
        assert_eq!(f.next_token(), Some("name"));
        assert_eq!(f.rest(), Some(" two words "));
        let mut g = Fields::new("A 0 name", 1);
        g.expect::<i32>("owner").unwrap();
        g.next_token();
        assert_eq!(g.rest(), None);
    }
}
