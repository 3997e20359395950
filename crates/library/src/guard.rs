//! Capability checks.

use std::collections::BTreeSet;

/// Which libraries an actor may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryAccess {
    All,
    Only(BTreeSet<String>),
}
impl LibraryAccess {
    pub fn allows(&self, library_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(libraries) => libraries.contains(library_id),
        }
    }
}
impl<S: Into<String>> FromIterator<S> for LibraryAccess {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Only(iter.into_iter().map(Into::into).collect())
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    /// Global capability to mutate items.
    pub can_update: bool,
    pub libraries: LibraryAccess,
}
impl Actor {
    pub fn new(id: impl Into<String>, can_update: bool, libraries: LibraryAccess) -> Self {
        Self {
            id: id.into(),
            can_update,
            libraries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Read an item (or its cover) owned by the given library.
    Read { library_id: &'a str },
    /// Mutate any item.
    Update,
}

/// Decide whether `actor` may perform `operation`. Pure; no side effects.
///
/// ```
/// use folio_library::guard::{Actor, LibraryAccess, Operation, authorize};
/// let reader = Actor::new("usr_1", false, ["lib1"].into_iter().collect());
/// assert!(authorize(&reader, &Operation::Read { library_id: "lib1" }));
/// assert!(!authorize(&reader, &Operation::Read { library_id: "lib2" }));
/// assert!(!authorize(&reader, &Operation::Update));
/// ```
pub fn authorize(actor: &Actor, operation: &Operation<'_>) -> bool {
    match operation {
        Operation::Read { library_id } => actor.libraries.allows(library_id),
        Operation::Update => actor.can_update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn actor(can_update: bool, libraries: LibraryAccess) -> Actor {
        Actor::new("usr_1", can_update, libraries)
    }

    #[rstest]
    #[case(LibraryAccess::All, "lib1", true)]
    #[case(LibraryAccess::All, "anything", true)]
    #[case(["lib1", "lib2"].into_iter().collect(), "lib2", true)]
    #[case(["lib1"].into_iter().collect(), "lib2", false)]
    #[case(LibraryAccess::Only(BTreeSet::new()), "lib1", false)]
    fn test_read_access(#[case] libraries: LibraryAccess, #[case] library_id: &str, #[case] expected: bool) {
        assert_eq!(authorize(&actor(false, libraries), &Operation::Read { library_id }), expected);
    }

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    fn test_update_is_global(#[case] can_update: bool, #[case] expected: bool) {
        // Update capability does not depend on library membership.
        let actor = actor(can_update, LibraryAccess::Only(BTreeSet::new()));
        assert_eq!(authorize(&actor, &Operation::Update), expected);
    }
}
