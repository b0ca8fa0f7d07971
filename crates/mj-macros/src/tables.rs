// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table-definition macros.
//!
//! Instruction sets and keyword tables are closed, hand-maintained lists.
//! These macros keep each entry on one line and derive the lookup code.

/// Define an instruction set encoded as single bytes.
///
/// Every entry names its byte value, its assembler mnemonic and the widths
/// (in bytes) of the operands that follow the opcode in the code stream.
///
/// # Example
///
/// ```
/// use mj_macros::opcodes;
///
/// opcodes! {
///     /// A tiny instruction set.
///     pub enum Op {
///         Nop = 0 ("nop") [],
///         Load = 1 ("load") [2],
///         Inc = 2 ("inc") [1, 1],
///     }
/// }
///
/// assert_eq!(Op::Load as u8, 1);
/// assert_eq!(Op::try_from(2u8), Ok(Op::Inc));
/// assert_eq!(Op::try_from(9u8), Err(9));
/// assert_eq!(Op::Inc.operand_widths(), &[1, 1]);
/// assert_eq!(Op::Inc.size(), 3);
/// assert_eq!(Op::Load.to_string(), "load");
/// ```
#[macro_export]
macro_rules! opcodes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal ($mnemonic:literal) [$($width:literal),*]
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value
            ),+
        }

        impl TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, u8> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl $name {
            /// The assembler mnemonic of this opcode.
            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic,)+
                }
            }

            /// Widths in bytes of the operands following the opcode.
            pub fn operand_widths(&self) -> &'static [usize] {
                match self {
                    $(Self::$variant => &[$($width),*],)+
                }
            }

            /// Total encoded size of the instruction, opcode byte included.
            pub fn size(&self) -> usize {
                1 + self.operand_widths().iter().sum::<usize>()
            }

            /// Every opcode in declaration order.
            pub fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.mnemonic())
            }
        }
    };
}

/// Define a keyword lookup function.
///
/// The generated function returns `Some(kind)` for a reserved word and
/// `None` for everything else, so the caller can fall back to an
/// identifier token.
///
/// # Example
///
/// ```
/// use mj_macros::keywords;
///
/// #[derive(Debug, PartialEq)]
/// enum Tok { Class, New }
///
/// keywords! {
///     fn reserved -> Tok {
///         "class" => Tok::Class,
///         "new" => Tok::New,
///     }
/// }
///
/// assert_eq!(reserved("new"), Some(Tok::New));
/// assert_eq!(reserved("News"), None);
/// ```
#[macro_export]
macro_rules! keywords {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident -> $ty:ty {
            $($keyword:literal => $kind:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis fn $name(text: &str) -> Option<$ty> {
            match text {
                $($keyword => Some($kind),)+
                _ => None,
            }
        }
    };
}
