//! Compiled character classes.

use pegmatite_foundation::ClassPart;

use crate::options::Optimize;

/// A character class compiled for matching.
///
/// With [`Optimize::Speed`] the ASCII range is precomputed into a bitmap;
/// other characters fall back to scanning the parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharClass {
    parts: Vec<ClassPart>,
    inverted: bool,
    ignore_case: bool,
    ascii: Option<[u64; 2]>,
}

impl CharClass {
    /// Compiles a class.
    #[must_use]
    pub fn new(parts: &[ClassPart], inverted: bool, ignore_case: bool, optimize: Optimize) -> Self {
        let mut class = Self {
            parts: parts.to_vec(),
            inverted,
            ignore_case,
            ascii: None,
        };
        if optimize == Optimize::Speed {
            let mut bitmap = [0u64; 2];
            for code in 0u8..128 {
                if class.in_parts(char::from(code)) {
                    bitmap[usize::from(code / 64)] |= 1u64 << (code % 64);
                }
            }
            class.ascii = Some(bitmap);
        }
        class
    }

    /// Returns true if `c` matches, honoring inversion.
    #[inline]
    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        let in_set = match self.ascii {
            Some(bitmap) if c.is_ascii() => {
                let code = c as u32;
                bitmap[(code / 64) as usize] & (1u64 << (code % 64)) != 0
            }
            _ => self.in_parts(c),
        };
        in_set != self.inverted
    }

    /// Returns true if the ASCII bitmap is in use.
    #[must_use]
    pub fn has_bitmap(&self) -> bool {
        self.ascii.is_some()
    }

    /// The class parts.
    #[must_use]
    pub fn parts(&self) -> &[ClassPart] {
        &self.parts
    }

    /// Whether the class is inverted.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Whether matching ignores case.
    #[must_use]
    pub fn ignores_case(&self) -> bool {
        self.ignore_case
    }

    fn in_parts(&self, c: char) -> bool {
        if self.parts.iter().any(|p| p.contains(c)) {
            return true;
        }
        if !self.ignore_case {
            return false;
        }
        c.to_lowercase()
            .chain(c.to_uppercase())
            .any(|folded| folded != c && self.parts.iter().any(|p| p.contains(folded)))
    }
}
