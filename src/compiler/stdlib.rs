//! Host functions.
//!
//! Programs reach these through ordinary extern declarations
//! (`extern printd(x)`). Both reference interpreters fall back to this
//! table when a called function has no body. Output is appended to the
//! interpreter's buffer instead of going straight to stdout.

pub type HostFn = fn(&[f64], &mut String) -> f64;

pub struct HostFunction {
    pub name: &'static str,
    pub arity: usize,
    pub call: HostFn,
}

pub const HOST_FUNCTIONS: &[HostFunction] = &[
    HostFunction {
        name: "putchard",
        arity: 1,
        call: putchard,
    },
    HostFunction {
        name: "printd",
        arity: 1,
        call: printd,
    },
];

pub fn lookup_host_function(name: &str) -> Option<&'static HostFunction> {
    HOST_FUNCTIONS.iter().find(|f| f.name == name)
}

/// Appends the character with code `x`; returns 0.
fn putchard(args: &[f64], out: &mut String) -> f64 {
    let code = args[0] as u32;
    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    0.0
}

/// Appends `x` with six decimals and a newline; returns 0.
fn printd(args: &[f64], out: &mut String) -> f64 {
    out.push_str(&format!("{:.6}\n", args[0]));
    0.0
}

#[cfg(test)]
mod tests {
    use super::lookup_host_function;

    #[test]
    fn test_printd_formats_six_decimals() {
        let printd = lookup_host_function("printd").unwrap();
        let mut out = String::new();

        assert_eq!((printd.call)(&[2.5], &mut out), 0.0);
        assert_eq!(out, "2.500000\n");
    }

    #[test]
    fn test_putchard_appends_character() {
        let putchard = lookup_host_function("putchard").unwrap();
        let mut out = String::new();

        (putchard.call)(&[72.0], &mut out);
        (putchard.call)(&[105.0], &mut out);
        assert_eq!(out, "Hi");
    }

    #[test]
    fn test_unknown_host_function() {
        assert!(lookup_host_function("sin").is_none());
    }
}
