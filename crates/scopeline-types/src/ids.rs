use facet::Facet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        prefix = $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[facet(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Allocates the next process-local id. Ids start at 1 and are never reused.
            pub fn next() -> Self {
                static NEXT: AtomicU64 = AtomicU64::new(1);
                Self(NEXT.fetch_add(1, Ordering::Relaxed))
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifies one execution branch (the main flow or a forked continuation).
    BranchId,
    prefix = "branch"
);

define_id!(
    /// Identifies one enabled period of a manager. A disable/enable cycle always
    /// moves to a new epoch, which invalidates every frame recorded before it.
    Epoch,
    prefix = "epoch"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_non_zero() {
        let a = BranchId::next();
        let b = BranchId::next();
        assert!(a.get() > 0);
        assert!(b > a);
    }

    #[test]
    fn display_carries_prefix() {
        let epoch = Epoch::next();
        assert_eq!(epoch.to_string(), format!("epoch#{}", epoch.get()));
    }
}
