/// Nesting depth of a list, used to pick indicator glyphs and spacing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ListLevel {
    #[default]
    Root,
    Indented,
    /// Depth two or more. Holds the zero-based depth.
    FurtherIndented(usize),
}

impl ListLevel {
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 => ListLevel::Root,
            1 => ListLevel::Indented,
            n => ListLevel::FurtherIndented(n),
        }
    }

    pub fn depth(self) -> usize {
        match self {
            ListLevel::Root => 0,
            ListLevel::Indented => 1,
            ListLevel::FurtherIndented(n) => n,
        }
    }

    pub fn is_root(self) -> bool {
        self == ListLevel::Root
    }

    /// The level applied to lists nested inside an item at this level.
    pub fn next(self) -> Self {
        Self::from_depth(self.depth().saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_depths() {
        assert_eq!(ListLevel::Root.next(), ListLevel::Indented);
        assert_eq!(ListLevel::Indented.next(), ListLevel::FurtherIndented(2));
        assert_eq!(
            ListLevel::FurtherIndented(2).next(),
            ListLevel::FurtherIndented(3)
        );
        assert!(ListLevel::default().is_root());
    }

    #[test]
    fn depth_round_trips() {
        for depth in 0..6 {
            assert_eq!(ListLevel::from_depth(depth).depth(), depth);
        }
    }
}
