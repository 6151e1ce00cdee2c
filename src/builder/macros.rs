//! Macros for ergonomic state declaration.

/// Declare a fieldless enum and implement [`State`](crate::core::State) for it.
///
/// Each variant's name doubles as the state name used in logs and labels.
///
/// # Example
///
/// ```
/// use tickstate::core::State;
/// use tickstate::state_enum;
///
/// state_enum! {
///     pub enum GameState {
///         Menu,
///         InHand,
///         Flying,
///         Falling,
///     }
/// }
///
/// assert_eq!(GameState::Flying.name(), "Flying");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
