use std::ops::Range;

/// A contiguous range of bytes in a program's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// The byte offset of the first byte in the span.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The length of the span in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The byte offset immediately past the end of the span.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end.saturating_sub(range.start))
    }
}

/// A location in a program's source text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loc {
    /// No location information available, for example for synthesized nodes.
    #[default]
    Synthetic,

    /// The location corresponds to a span in the source text.
    Span(Span),
}

impl Loc {
    /// Returns `true` if the location is synthetic and has no span.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }

    /// Returns the span associated with this location, or `None` if the location is synthetic.
    pub fn span(&self) -> Option<Span> {
        match *self {
            Self::Synthetic => None,
            Self::Span(span) => Some(span),
        }
    }
}

impl From<Span> for Loc {
    fn from(span: Span) -> Self {
        Self::Span(span)
    }
}

impl From<Option<Span>> for Loc {
    fn from(span: Option<Span>) -> Self {
        span.map(Loc::Span).unwrap_or_default()
    }
}

impl From<Loc> for Option<Span> {
    fn from(loc: Loc) -> Self {
        loc.span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_from_range() {
        let span = Span::from(4..10);

        assert_eq!(span.start(), 4);
        assert_eq!(span.len(), 6);
        assert_eq!(span.end(), 10);
    }

    #[test]
    fn loc_conversions() {
        assert!(Loc::from(None::<Span>).is_synthetic());
        assert_eq!(Loc::from(Span::new(1, 2)).span(), Some(Span::new(1, 2)));
    }
}
