//! Closed string vocabularies shared with the external engine.
//!
//! Every enum here serializes to the exact spelling the engine expects, so
//! `as_str` values are load-bearing: changing one breaks every previously
//! exported document. Parsing is lenient — unknown strings fall back to the
//! default variant rather than failing an import.

macro_rules! vocab {
    ($(#[$meta:meta])* $name:ident { $default:ident, $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            #[default]
            $default,
            $($variant,)*
        }

        impl $name {
            pub const ALL: &[Self] = &[Self::$default, $(Self::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    Self::$default => stringify!($default),
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            /// Exact-spelling lookup. `None` for anything not in the vocabulary.
            pub fn parse(s: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.as_str() == s)
            }

            /// Lookup with the import fallback: unknown strings become the default.
            pub fn parse_or_default(s: &str) -> Self {
                Self::parse(s).unwrap_or_default()
            }

            /// The next value in declaration order, wrapping. Used by the TUI
            /// to cycle a field through its vocabulary.
            pub fn next(self) -> Self {
                let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
                Self::ALL[(idx + 1) % Self::ALL.len()]
            }

            /// The previous value in declaration order, wrapping.
            pub fn prev(self) -> Self {
                let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
                Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocab! {
    /// Who delivers a dialogue line. `Player` lines carry per-ego text variants.
    Speaker { NPC, Player, Narrator }
}

vocab! {
    /// Global narrative state; selects which dialogue text variant is shown.
    Ego { None, Stable, Fragmented, Ghostly }
}

vocab! {
    Social { None, Aristocrats, Bourgeoisie, Proletariat, Marginals }
}

vocab! {
    Gender { None, Male, Female, Mixed }
}

vocab! {
    Ideology {
        None,
        Romantic,
        Cynical,
        Traditional,
        Progressive,
        Natural,
        Rational,
        Moralistic,
        Hedonistic,
        Hypocratic,
        Alienated,
    }
}

vocab! {
    // The engine enum spells this "Professional"; a "Warrior" variant seen in
    // older authoring builds is not part of the vocabulary.
    Purpose { None, Poet, Lover, Professional, Altruist, Nihilist }
}
