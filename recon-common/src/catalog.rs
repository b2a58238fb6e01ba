//! Static display-name / API-name catalogs
//!
//! Operators pick fields and document types by their display names; the
//! external systems want API identifiers. Each catalog is a closed enum so
//! both names live in one place and lookups cannot drift.

/// Declare a catalog enum
///
/// ```
/// recon_common::static_catalog! {
///     /// Paint colors
///     pub enum Paint {
///         Red => ("Red", "PAINT_RED"),
///         Blue => ("Blue", "PAINT_BLUE"),
///     }
/// }
///
/// assert_eq!(Paint::from_display_name("blue"), Some(Paint::Blue));
/// assert_eq!(Paint::Red.api_name(), "PAINT_RED");
/// ```
#[macro_export]
macro_rules! static_catalog {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => ($display:literal, $api:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $variant ),+
        }

        impl $name {
            /// Every entry, in menu order
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn display_name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $display ),+
                }
            }

            pub fn api_name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $api ),+
                }
            }

            /// Case-insensitive, whitespace-trimmed lookup
            pub fn from_display_name(name: &str) -> Option<Self> {
                let wanted = name.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|entry| entry.display_name().eq_ignore_ascii_case(wanted))
            }

            /// 1-based position in [`Self::ALL`]
            pub fn from_number(number: usize) -> Option<Self> {
                number.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.display_name())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::from_display_name(s).ok_or_else(|| {
                    let known: Vec<&str> = Self::ALL.iter().map(|e| e.display_name()).collect();
                    format!("unknown {} '{}' (expected one of: {})", stringify!($name), s, known.join(", "))
                })
            }
        }
    };
}
