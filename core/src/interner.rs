use crate::SharedStr;
use std::collections::HashSet;
use std::sync::Arc;

/// Shares the attribute strings a markup read produces over and over:
/// link targets, colours and font families.
#[derive(Debug, Default)]
pub struct StringInterner {
    seen: HashSet<SharedStr>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> SharedStr {
        if let Some(hit) = self.seen.get(s) {
            return hit.clone();
        }
        let shared: SharedStr = Arc::from(s);
        self.seen.insert(shared.clone());
        shared
    }

    /// Interns a CSS value with runs of whitespace collapsed, so
    /// `rgb(0, 0, 0)` and `rgb(0,  0, 0)` share one string.
    pub fn intern_css(&mut self, value: &str) -> SharedStr {
        let folded = value.split_whitespace().collect::<Vec<_>>().join(" ");
        self.intern(&folded)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_values_share_storage() {
        let mut interner = StringInterner::new();
        let a = interner.intern("#ff0000");
        let b = interner.intern_css("  #ff0000 ");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
    }
}
