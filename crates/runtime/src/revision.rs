/// Monotonic state revision.
///
/// Every committed mutation of viewer state advances the revision by one, so
/// redraw events can be correlated with the command that caused them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(pub u64);

impl Revision {
    pub const INITIAL: Revision = Revision(0);

    pub fn next(self) -> Self {
        Revision(self.0.wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::Revision;

    #[test]
    fn next_advances_by_one() {
        let r = Revision::INITIAL.next().next();
        assert_eq!(r, Revision(2));
        assert!(r > Revision::INITIAL);
    }
}
