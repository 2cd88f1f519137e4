/// A closed, string-backed enum with case-insensitive `FromStr`; unknown
/// text is a configuration error naming `$header`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $header:expr,
        { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $value]
                $variant,
            )+
        }

        impl $name {
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::SecurityHeadersError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($value) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::error::SecurityHeadersError::invalid_enum($header, s))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;
