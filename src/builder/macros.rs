//! Macros for ergonomic state declaration.

/// Generate a state enum with its `State` implementation.
///
/// Each variant may name its stored form with `= "name"`; otherwise the
/// variant identifier is used. The generated `from_name` parses that form
/// and `ALL` lists every variant in declaration order.
///
/// # Example
///
/// ```
/// use statekeeper::state_enum;
/// use statekeeper::core::State;
///
/// state_enum! {
///     pub enum ReviewStatus {
///         Draft = "draft",
///         Submitted = "submitted",
///         Approved = "approved",
///     }
/// }
///
/// assert_eq!(ReviewStatus::Submitted.name(), "submitted");
/// assert_eq!(ReviewStatus::from_name("approved"), Some(ReviewStatus::Approved));
/// assert_eq!(ReviewStatus::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (@label $variant:ident $label:literal) => { $label };
    (@label $variant:ident) => { stringify!($variant) };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $label:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $(#[serde(rename = $label)])?
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];

            /// Parse the stored form produced by `State::name`.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|state| $crate::core::State::name(state) == name)
            }
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@label $variant $($label)?)),*
                }
            }
        }
    };
}
