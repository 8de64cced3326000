//! Dense identifiers of translated variables and constraints.

macro_rules! define_id_type {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            pub fn inner(self) -> u32 {
                self.0
            }

            pub fn new(value: u32) -> Self {
                Self(value)
            }

            /// Position in a zero-based declaration table.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

define_id_type!(VariableId, "v");
define_id_type!(ConstraintId, "c");
