//! Quote-aware tokenizer for building command arguments.
//!
//! `"Leather Belt" size small` pops as `Leather Belt`, `size`, `small`.
//! Both double and single quotes group words; an unterminated quote runs to
//! the end of the line.

#[derive(Debug, Clone)]
pub struct StringStack {
    input: String,
    position: usize,
    last: String,
}

impl StringStack {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            position: 0,
            last: String::new(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    /// Length in bytes of the next token (including its quotes) and its unquoted text.
    fn next_token(&self) -> Option<(usize, String)> {
        let rest = &self.input[self.position..];
        let first = rest.chars().next()?;
        if first == '"' || first == '\'' {
            let body = &rest[1..];
            return Some(match body.find(first) {
                Some(end) => (end + 2, body[..end].to_string()),
                None => (rest.len(), body.to_string()),
            });
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        Some((end, rest[..end].to_string()))
    }

    /// Remove and return the next token, or an empty string when the input is exhausted.
    pub fn pop(&mut self) -> String {
        self.skip_whitespace();
        match self.next_token() {
            Some((len, token)) => {
                self.position += len;
                self.last = token.clone();
                token
            }
            None => {
                self.last.clear();
                String::new()
            }
        }
    }

    /// Pop the next token lower-cased, ready to match against verb tables.
    pub fn pop_for_switch(&mut self) -> String {
        self.pop().to_lowercase()
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> String {
        let mut probe = self.clone();
        probe.pop()
    }

    /// The most recently popped token.
    pub fn last(&self) -> &str {
        &self.last
    }

    /// Everything not yet consumed, trimmed, with a single pair of enclosing quotes removed.
    pub fn remaining(&self) -> String {
        let rest = self.input[self.position..].trim();
        for quote in ['"', '\''] {
            if rest.len() >= 2 && rest.starts_with(quote) && rest.ends_with(quote) {
                let inner = &rest[1..rest.len() - 1];
                if !inner.contains(quote) {
                    return inner.to_string();
                }
            }
        }
        rest.to_string()
    }

    /// Consume the rest of the line, as returned by [`remaining`](Self::remaining).
    pub fn pop_remaining(&mut self) -> String {
        let rest = self.remaining();
        self.position = self.input.len();
        self.last = rest.clone();
        rest
    }

    pub fn is_finished(&self) -> bool {
        self.input[self.position..].trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_plain_and_quoted_tokens() {
        let mut ss = StringStack::new(r#"  new belt "Leather Belt" 'it is' done"#);
        assert_eq!(ss.pop(), "new");
        assert_eq!(ss.peek(), "belt");
        assert_eq!(ss.pop_for_switch(), "belt");
        assert_eq!(ss.pop(), "Leather Belt");
        assert_eq!(ss.last(), "Leather Belt");
        assert_eq!(ss.pop(), "it is");
        assert!(!ss.is_finished());
        assert_eq!(ss.pop(), "done");
        assert!(ss.is_finished());
        assert_eq!(ss.pop(), "");
    }

    #[test]
    fn remaining_strips_enclosing_quotes_only() {
        let mut ss = StringStack::new(r#"desc "A sturdy belt.""#);
        ss.pop();
        assert_eq!(ss.remaining(), "A sturdy belt.");

        let mut ss = StringStack::new(r#"emote "on" and "off""#);
        ss.pop();
        assert_eq!(ss.pop_remaining(), r#""on" and "off""#);
        assert!(ss.is_finished());
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let mut ss = StringStack::new("name \"Half open");
        ss.pop();
        assert_eq!(ss.pop(), "Half open");
        assert!(ss.is_finished());
    }
}
