//! Command argument parser - Pulls double-quoted fields out of admin commands

/// Iterator over the double-quoted fields of a command line.
///
/// A `"` directly preceded by a backslash does not close a field. The
/// backslash is kept in the yielded text: `/cmd "a\"b"` yields `a\"b`.
/// Iteration stops at the first field that has no opening or closing quote.
pub struct QuotedArgs<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> QuotedArgs<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte index of the next closing quote at or after `from`
    fn closing_quote(&self, mut from: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        loop {
            let idx = from + self.text[from..].find('"')?;
            if idx > 0 && bytes[idx - 1] == b'\\' {
                from = idx + 1;
                continue;
            }
            return Some(idx);
        }
    }
}

impl<'a> Iterator for QuotedArgs<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.text.get(self.pos..)?;
        let start = self.pos + rest.find('"')?;
        let end = self.closing_quote(start + 1)?;

        self.pos = end + 1;
        Some(&self.text[start + 1..end])
    }
}

/// First quoted field of `text`
pub fn parse_one(text: &str) -> Option<&str> {
    QuotedArgs::new(text).next()
}

/// First two quoted fields of `text`
pub fn parse_two(text: &str) -> Option<(&str, &str)> {
    let mut args = QuotedArgs::new(text);
    Some((args.next()?, args.next()?))
}
