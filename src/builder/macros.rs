//! Macros that generate state and event enumerations.

/// Generate a fieldless state enum and its `State` implementation.
///
/// Declaration order defines each state's index.
///
/// # Example
///
/// ```
/// use statemap::core::State;
/// use statemap::state_enum;
///
/// state_enum! {
///     pub enum MotorState {
///         Idle,
///         Stop,
///         Start,
///         ChangeSpeed,
///     }
/// }
///
/// assert_eq!(MotorState::Start.index(), 2);
/// assert_eq!(MotorState::ChangeSpeed.name(), "ChangeSpeed");
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
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),*];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn index(&self) -> usize {
                *self as usize
            }
        }
    };
}

/// Generate a fieldless event enum and its `Event` implementation.
///
/// # Example
///
/// ```
/// use statemap::core::Event;
/// use statemap::event_enum;
///
/// event_enum! {
///     pub enum MotorEvent {
///         SetSpeed,
///         Halt,
///     }
/// }
///
/// assert_eq!(MotorEvent::ALL.len(), 2);
/// assert_eq!(MotorEvent::Halt.name(), "Halt");
/// ```
#[macro_export]
macro_rules! event_enum {
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

        impl $crate::core::Event for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),*];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
