//! Selector specificity.
//!
//! Only four selector shapes exist, so specificity is a single ordered level
//! rather than a counted tuple:
//!
//! ```text
//! tag (0) < .class (1) < tag.class (2) < #id (3)
//! ```
//!
//! `Ord` follows declaration order of the variants, so sorting or comparing
//! levels gives the cascade order directly. Ties inside one level are broken
//! by source order, which the stylesheet preserves.

/// Selector kind, doubling as its specificity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectorType {
    /// `label`
    Tag,
    /// `.primary`
    Class,
    /// `button.primary`
    TagClass,
    /// `#submit`
    Id,
}

impl SelectorType {
    /// Every level, lowest first. The cascade walks this in order.
    pub const CASCADE_ORDER: [SelectorType; 4] = [
        SelectorType::Tag,
        SelectorType::Class,
        SelectorType::TagClass,
        SelectorType::Id,
    ];

    /// Numeric level, 0 to 3.
    pub fn level(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(SelectorType::Tag < SelectorType::Class);
        assert!(SelectorType::Class < SelectorType::TagClass);
        assert!(SelectorType::TagClass < SelectorType::Id);
    }

    #[test]
    fn test_levels() {
        let levels: Vec<u8> = SelectorType::CASCADE_ORDER.iter().map(|s| s.level()).collect();
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }
}
