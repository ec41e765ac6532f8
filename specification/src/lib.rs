//! This crate provides the core element catalog abstraction used by the ebml-cursor crate.
//!
//! A catalog maps numeric EBML element ids onto the semantic roles a document format assigns them at a given nesting level.
//!

///
/// Different data types defined in the EBML specification.
///
/// # Notes
///
/// `Ascii` and `Utf8` are kept separate because EBML validates them differently: an ASCII string may only contain bytes in the range 0-127.
///
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ElementType {
    Master,
    UnsignedInt,
    Integer,
    Float,
    Date,
    Ascii,
    Utf8,
    Binary,
}

impl ElementType {
    ///
    /// Returns whether elements of this type contain other elements rather than a scalar value.
    ///
    pub fn is_master(&self) -> bool {
        matches!(self, ElementType::Master)
    }
}

///
/// This trait should be implemented to describe which elements a format recognizes at one nesting level.  Typically implemented on an Enum with one variant per known element and an `Unrecognized(u64)` fallback.
///
/// Ids passed to and returned from a catalog always include the vint marker bits, e.g. `0x1a45dfa3` for the EBML header.  This keeps ids that only differ in their encoded length numerically distinct.
///
/// Implementations should resolve ids with a single lookup (a `match` on the id is ideal) rather than chained conditionals.
///
pub trait ElementCatalog: Copy + Eq + std::fmt::Debug {
    ///
    /// Resolves an element id to a catalog entry.
    ///
    /// This function *must not* fail: ids that are not part of the catalog should resolve to the fallback variant.
    ///
    fn from_id(id: u64) -> Self;

    ///
    /// Gets the id of a catalog entry.  Fallback entries return the id they were resolved from.
    ///
    fn get_id(&self) -> u64;

    ///
    /// Gets the declared data type of a catalog entry.
    ///
    /// This function *must* return `None` for the fallback variant.
    ///
    fn element_type(&self) -> Option<ElementType>;

    ///
    /// Returns whether the catalog knows this entry.
    ///
    fn is_recognized(&self) -> bool {
        self.element_type().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Sample {
        Root,
        Count,
        Unrecognized(u64),
    }

    impl ElementCatalog for Sample {
        fn from_id(id: u64) -> Self {
            match id {
                0x1a45dfa3 => Sample::Root,
                0x4100 => Sample::Count,
                other => Sample::Unrecognized(other),
            }
        }

        fn get_id(&self) -> u64 {
            match self {
                Sample::Root => 0x1a45dfa3,
                Sample::Count => 0x4100,
                Sample::Unrecognized(id) => *id,
            }
        }

        fn element_type(&self) -> Option<ElementType> {
            match self {
                Sample::Root => Some(ElementType::Master),
                Sample::Count => Some(ElementType::UnsignedInt),
                Sample::Unrecognized(_) => None,
            }
        }
    }

    #[test]
    fn unrecognized_ids_fall_back() {
        let entry = Sample::from_id(0xec);
        assert_eq!(Sample::Unrecognized(0xec), entry);
        assert!(!entry.is_recognized());
        assert_eq!(0xec, entry.get_id());
    }

    #[test]
    fn recognized_ids_round_trip() {
        let entry = Sample::from_id(0x1a45dfa3);
        assert!(entry.is_recognized());
        assert!(entry.element_type().unwrap().is_master());
        assert_eq!(0x1a45dfa3, entry.get_id());
    }
}
