//! Extracting the preprocessor's defined-macro set from compile-driver
//! tokens, the one piece of "compile options" the mini preprocessor in
//! [`crate::preprocessor`] actually consults.

use std::collections::HashMap;

/// Parse `-DNAME` / `-DNAME=VALUE` tokens into a macro-name -> value map.
/// Unrecognized tokens (include paths, `-std=`, ...) are ignored; the front
/// end's tooling driver would consume those itself in a fuller adapter.
pub fn defined_macros(compile_options: &[String]) -> HashMap<String, String> {
    let mut macros = HashMap::new();
    for opt in compile_options {
        let Some(def) = opt.strip_prefix("-D") else {
            continue;
        };
        match def.split_once('=') {
            Some((name, value)) => {
                macros.insert(name.to_string(), value.to_string());
            }
            None => {
                macros.insert(def.to_string(), "1".to_string());
            }
        }
    }
    macros
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_valued_defines() {
        let opts = vec!["-DFEATURE".to_string(), "-DLEVEL=2".to_string(), "-Iinclude".to_string()];
        let macros = defined_macros(&opts);
        assert_eq!(macros.get("FEATURE"), Some(&"1".to_string()));
        assert_eq!(macros.get("LEVEL"), Some(&"2".to_string()));
        assert_eq!(macros.len(), 2);
    }
}
