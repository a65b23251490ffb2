//! Identifier encoding for LLVM assembly
//! 
//! Global values carry the `@` sigil and locals the `%` sigil. Names that
//! fall outside the bare identifier alphabet are printed as quoted strings,
//! with `"`, `\` and non-printable bytes escaped as `\XX`.

/// Encode a global identifier, e.g. `@printf` or `@"foo bar"`.
pub fn global(name: &str) -> String {
    format!("@{}", escape_ident(name))
}

/// Encode a named local identifier, e.g. `%x` or `%"1x"`.
pub fn local(name: &str) -> String {
    format!("%{}", escape_ident(name))
}

/// Encode a numbered local identifier, e.g. `%0`.
pub fn local_id(id: u32) -> String {
    format!("%{id}")
}

/// Encode a label definition for a named basic block, e.g. `entry:`.
pub fn label(name: &str) -> String {
    format!("{}:", escape_ident(name))
}

/// Encode a label definition for a numbered basic block, e.g. `0:`.
pub fn label_id(id: u32) -> String {
    format!("{id}:")
}

/// Quote `name` unless it is a bare identifier.
///
/// Names made only of digits are quoted too, since unquoted they would read
/// as numbered slots.
pub fn escape_ident(name: &str) -> String {
    if is_bare_ident(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape(name))
    }
}

/// Escape `"`, `\` and bytes outside printable ASCII as `\XX`.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        match b {
            b'"' | b'\\' => out.push_str(&format!("\\{b:02X}")),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\{b:02X}")),
        }
    }
    out
}

fn is_bare_ident(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if is_ident_head(first) => bytes.all(|b| is_ident_head(b) || b.is_ascii_digit()),
        _ => false,
    }
}

fn is_ident_head(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'-' | b'$' | b'.' | b'_')
}
