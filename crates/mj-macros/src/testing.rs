// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Testing helper macros.
//!
//! Provides macros for writing compiler tests that read like the property
//! they check.

/// Assert that an expression matches a pattern.
///
/// # Example
///
/// ```
/// use mj_macros::assert_matches;
///
/// #[derive(Debug)]
/// enum Slot { Resolved(usize), Pending(Vec<usize>) }
///
/// let slot = Slot::Resolved(12);
/// assert_matches!(slot, Slot::Resolved(adr) if adr > 0);
/// ```
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat) => {
        match $expr {
            $pat => {}
            ref e => panic!(
                "assertion failed: `{}` does not match pattern `{}`\n  value: {:?}",
                stringify!($expr),
                stringify!($pat),
                e
            ),
        }
    };
    ($expr:expr, $pat:pat if $guard:expr) => {
        match $expr {
            $pat if $guard => {}
            ref e => panic!(
                "assertion failed: `{}` does not match pattern `{} if {}`\n  value: {:?}",
                stringify!($expr),
                stringify!($pat),
                stringify!($guard),
                e
            ),
        }
    };
}

/// Assert that a Result is Ok and extract the value.
///
/// # Example
///
/// ```
/// use mj_macros::assert_ok;
///
/// let parsed: Result<i32, std::num::ParseIntError> = "42".parse();
/// assert_eq!(assert_ok!(parsed), 42);
/// ```
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!(
                "assertion failed: expected Ok, got Err\n  expression: `{}`\n  error: {:?}",
                stringify!($expr),
                e
            ),
        }
    };
}

/// Assert that a compilation reported at least one diagnostic of a kind.
///
/// Works with any value exposing a `diagnostics` collection whose items
/// have a comparable `kind` field.
///
/// # Example
///
/// ```
/// use mj_macros::assert_reports;
///
/// #[derive(Debug, PartialEq)]
/// enum Kind { NoVar, NoType }
/// #[derive(Debug)]
/// struct Diagnostic { kind: Kind }
/// struct Compilation { diagnostics: Vec<Diagnostic> }
///
/// let c = Compilation { diagnostics: vec![Diagnostic { kind: Kind::NoVar }] };
/// assert_reports!(c, Kind::NoVar);
/// ```
#[macro_export]
macro_rules! assert_reports {
    ($compilation:expr, $kind:expr) => {{
        let compilation = &$compilation;
        let kind = $kind;
        assert!(
            compilation.diagnostics.iter().any(|d| d.kind == kind),
            "expected a {:?} diagnostic, got {:#?}",
            kind,
            compilation.diagnostics
        );
    }};
}

/// Assert that a compilation reported no diagnostics at all.
///
/// # Example
///
/// ```
/// use mj_macros::assert_clean;
///
/// #[derive(Debug)]
/// struct Diagnostic;
/// struct Compilation { diagnostics: Vec<Diagnostic> }
///
/// assert_clean!(Compilation { diagnostics: Vec::new() });
/// ```
#[macro_export]
macro_rules! assert_clean {
    ($compilation:expr) => {{
        let compilation = &$compilation;
        assert!(
            compilation.diagnostics.is_empty(),
            "expected no diagnostics, got {:#?}",
            compilation.diagnostics
        );
    }};
}
