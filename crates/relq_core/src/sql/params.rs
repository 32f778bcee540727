//! Named parameter allocation and identifier quoting.

use relq_driver::{ScalarValue, SqlParam};

/// Allocates `@p{n}` parameter names for one compilation.
///
/// Names are sequential and never reused, so the same column bound twice in
/// one statement still gets distinct parameters.
#[derive(Debug, Default)]
pub(crate) struct ParamList {
    params: Vec<SqlParam>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` and returns the allocated parameter name.
    pub fn bind(&mut self, value: ScalarValue) -> String {
        let name = format!("@p{}", self.params.len());
        self.params.push((name.clone(), value));
        name
    }

    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

/// Quotes an identifier in brackets.
pub(crate) fn quote(ident: &str) -> String {
    format!("[{ident}]")
}

/// Quotes an alias-qualified column reference.
pub(crate) fn quote_qualified(alias: &str, column: &str) -> String {
    format!("[{alias}].[{column}]")
}

/// Escapes LIKE wildcards and the escape character itself in a needle, so
/// the needle matches literally. Fragments using the result must carry
/// `ESCAPE '\'`.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
