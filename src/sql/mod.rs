//! Query text fragments.
//!
//! A [`Sql`] is a flat chunk list (inline storage for typical fragments via
//! `SmallVec`) that renders to a text/parameter pair in one pass. All
//! translation from the expression model into fragments lives in
//! [`compile`].

pub mod compile;

use crate::value::Value;
use smallvec::SmallVec;
use std::fmt::Write;

/// One piece of a query fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// Raw keyword or punctuation, never derived from user data
    Raw(&'static str),
    /// Quoted identifier
    Ident(String),
    /// Bound parameter, rendered as a placeholder
    Param(Value),
    /// Inline unsigned literal (offsets, limits)
    Number(u64),
}

impl Chunk {
    fn write(&self, buf: &mut String) {
        match self {
            Chunk::Raw(text) => buf.push_str(text),
            Chunk::Ident(name) => {
                buf.push('"');
                buf.push_str(name);
                buf.push('"');
            }
            Chunk::Param(_) => buf.push('?'),
            Chunk::Number(n) => {
                let _ = write!(buf, "{n}");
            }
        }
    }
}

/// Query fragment builder with flat chunk storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sql {
    chunks: SmallVec<[Chunk; 8]>,
}

impl Sql {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn raw(text: &'static str) -> Self {
        Self {
            chunks: smallvec::smallvec![Chunk::Raw(text)],
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            chunks: smallvec::smallvec![Chunk::Ident(name.into())],
        }
    }

    pub fn param(value: Value) -> Self {
        Self {
            chunks: smallvec::smallvec![Chunk::Param(value)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Append another fragment (flat extend).
    pub fn append(mut self, other: Sql) -> Self {
        if self.chunks.is_empty() {
            return other;
        }
        self.chunks.extend(other.chunks);
        self
    }

    /// Push a single chunk.
    pub fn push(mut self, chunk: Chunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    pub fn push_mut(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    pub fn append_mut(&mut self, other: Sql) {
        self.chunks.extend(other.chunks);
    }

    /// Join fragments with a raw separator.
    pub fn join(parts: impl IntoIterator<Item = Sql>, separator: &'static str) -> Sql {
        let mut result = Sql::empty();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                result.chunks.push(Chunk::Raw(separator));
            }
            result.chunks.extend(part.chunks);
        }
        result
    }

    /// Wrap in parentheses: `(self)`
    pub fn parens(self) -> Self {
        Sql::raw("(").append(self).push(Chunk::Raw(")"))
    }

    /// Render to text and collect bound parameters in a single pass.
    pub fn build(self) -> (String, Vec<Value>) {
        let mut buf = String::with_capacity(self.chunks.len().saturating_mul(8).max(64));
        let mut params = Vec::new();
        for i in 0..self.chunks.len() {
            let chunk = &self.chunks[i];
            chunk.write(&mut buf);
            if let Some(next) = self.chunks.get(i + 1)
                && needs_space(chunk, next)
            {
                buf.push(' ');
            }
        }
        for chunk in self.chunks {
            if let Chunk::Param(value) = chunk {
                params.push(value);
            }
        }
        (buf, params)
    }
}

/// Spacing between adjacent chunks. Raw text ending in `(` glues to what
/// follows; closers and separators glue to what precedes them.
fn needs_space(current: &Chunk, next: &Chunk) -> bool {
    if let Chunk::Raw(text) = current
        && (text.ends_with('(') || *text == ".")
    {
        return false;
    }
    if let Chunk::Raw(text) = next
        && matches!(*text, ")" | "," | ".")
    {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_spacing() {
        let sql = Sql::raw("SELECT")
            .append(Sql::ident("u"))
            .push(Chunk::Raw("."))
            .append(Sql::ident("age"))
            .push(Chunk::Raw("FROM"))
            .append(Sql::ident("user"));
        let (text, params) = sql.build();
        assert_eq!(text, r#"SELECT "u"."age" FROM "user""#);
        assert!(params.is_empty());
    }

    #[test]
    fn params_collect_in_order() {
        let sql = Sql::ident("age")
            .push(Chunk::Raw("IN ("))
            .append(Sql::param(Value::Int(1)))
            .push(Chunk::Raw(","))
            .append(Sql::param(Value::Int(2)))
            .push(Chunk::Raw(")"));
        let (text, params) = sql.build();
        assert_eq!(text, r#""age" IN (?, ?)"#);
        assert_eq!(params, vec![Value::Int(1), Value::Int(2)]);
    }
}
