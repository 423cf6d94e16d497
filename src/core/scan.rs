// Single-pass scanner that swaps function literals for quoted placeholders.
use std::collections::HashMap;

/// Reserved prefix for substituted string leaves. Documents must not contain
/// ordinary string values starting with this prefix.
pub const PLACEHOLDER_PREFIX: &str = "__FUNC_PLACEHOLDER_";

const KEYWORD: &[u8] = b"function";

/// Result of one scanner pass over a source document.
#[derive(Debug)]
pub struct Extraction {
    /// The document with every function literal replaced by a quoted
    /// placeholder token, ready for a standard JSON parse.
    pub text: String,
    /// Placeholder lookup keyed by the quoted token, e.g.
    /// `"\"__FUNC_PLACEHOLDER_0\""`, mapping to the verbatim literal.
    pub placeholders: HashMap<String, String>,
    /// True when at least one literal was extracted.
    pub has_functions: bool,
}

/// Replaces function literals with placeholder tokens in one pass.
///
/// JSON string contents are copied wholesale and never scanned, so literal
/// text such as `"function() {}"` inside a string value or key survives
/// untouched. Three literal shapes are recognized: `function` expressions
/// with brace bodies, arrow functions with brace bodies, and arrow functions
/// with expression bodies. Parameter lists must be parenthesized.
///
/// Candidates whose bodies never close are left in place; the later JSON
/// parse then reports the document as malformed. Running the scanner over
/// its own output is an identity: placeholder tokens live inside JSON
/// strings, which are skipped.
pub fn extract(source: &str) -> Extraction {
    let bytes = source.as_bytes();
    let mut text = String::with_capacity(source.len());
    let mut placeholders = HashMap::new();
    let mut counter = 0usize;
    let mut copied = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_json_string(bytes, i),
            b'f' | b'(' => {
                if let Some(end) = match_function_literal(bytes, i) {
                    text.push_str(&source[copied..i]);
                    let token = format!("{PLACEHOLDER_PREFIX}{counter}");
                    counter += 1;
                    placeholders
                        .insert(format!("\"{token}\""), source[i..end].trim_end().to_string());
                    text.push('"');
                    text.push_str(&token);
                    text.push('"');
                    i = end;
                    copied = end;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    text.push_str(&source[copied..]);

    Extraction {
        text,
        placeholders,
        has_functions: counter > 0,
    }
}

/// Index just past the closing quote of the JSON string starting at `start`,
/// or end of input when the string never closes.
fn skip_json_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn match_function_literal(bytes: &[u8], at: usize) -> Option<usize> {
    match bytes[at] {
        b'f' => match_function_keyword(bytes, at),
        b'(' => match_arrow(bytes, at),
        _ => None,
    }
}

fn match_function_keyword(bytes: &[u8], at: usize) -> Option<usize> {
    if !bytes[at..].starts_with(KEYWORD) {
        return None;
    }
    // Reject keyword matches inside identifiers on either side.
    if at > 0 && is_ident_byte(bytes[at - 1]) {
        return None;
    }
    let mut i = at + KEYWORD.len();
    if i < bytes.len() && is_ident_byte(bytes[i]) {
        return None;
    }
    i = skip_ws(bytes, i);
    // Optional name of a named function expression.
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    i = skip_ws(bytes, i);
    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    i = skip_balanced(bytes, i, b'(', b')')?;
    i = skip_ws(bytes, i);
    if bytes.get(i) != Some(&b'{') {
        return None;
    }
    skip_balanced(bytes, i, b'{', b'}')
}

fn match_arrow(bytes: &[u8], at: usize) -> Option<usize> {
    let mut i = skip_balanced(bytes, at, b'(', b')')?;
    i = skip_ws(bytes, i);
    if !bytes[i..].starts_with(b"=>") {
        return None;
    }
    i = skip_ws(bytes, i + 2);
    if bytes.get(i) == Some(&b'{') {
        return skip_balanced(bytes, i, b'{', b'}');
    }
    let end = scan_expression_body(bytes, i);
    if end == i {
        return None;
    }
    Some(end)
}

/// End of an arrow expression body: the first `,`, `}`, or `]` at nesting
/// depth zero, or end of input.
fn scan_expression_body(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        if let Some(end) = skip_js_opaque(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b',' if depth == 0 => return i,
            b'}' | b']' if depth == 0 => return i,
            b')' | b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Index just past the delimiter matching `open` at `open_at`, tracking
/// nesting and skipping opaque regions. `None` when the input ends first.
fn skip_balanced(bytes: &[u8], open_at: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = open_at + 1;
    while i < bytes.len() {
        if let Some(end) = skip_js_opaque(bytes, i) {
            i = end;
            continue;
        }
        let b = bytes[i];
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i + 1);
            }
        }
        i += 1;
    }
    None
}

/// Skips one opaque region of function body text starting at `at`: a
/// string in any of the three quote styles, a line comment, or a block
/// comment. Delimiters inside these regions never count toward nesting.
fn skip_js_opaque(bytes: &[u8], at: usize) -> Option<usize> {
    match bytes[at] {
        quote @ (b'"' | b'\'' | b'`') => {
            let mut i = at + 1;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => i += 2,
                    b if b == quote => return Some(i + 1),
                    _ => i += 1,
                }
            }
            Some(bytes.len())
        }
        b'/' if bytes.get(at + 1) == Some(&b'/') => {
            let mut i = at + 2;
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            Some(i)
        }
        b'/' if bytes.get(at + 1) == Some(&b'*') => {
            let mut i = at + 2;
            while i + 1 < bytes.len() {
                if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                    return Some(i + 2);
                }
                i += 1;
            }
            Some(bytes.len())
        }
        _ => None,
    }
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::{PLACEHOLDER_PREFIX, extract};

    #[test]
    fn extracts_function_keyword_literal() {
        let out = extract(r#"{"fmt": function (value) { return value * 2; }}"#);
        assert_eq!(out.text, r#"{"fmt": "__FUNC_PLACEHOLDER_0"}"#);
        assert_eq!(
            out.placeholders["\"__FUNC_PLACEHOLDER_0\""],
            "function (value) { return value * 2; }"
        );
        assert!(out.has_functions);
    }

    #[test]
    fn extracts_named_function_expression() {
        let out = extract(r#"{"fmt": function double(x) { return x + x; }}"#);
        assert_eq!(out.text, r#"{"fmt": "__FUNC_PLACEHOLDER_0"}"#);
        assert_eq!(
            out.placeholders["\"__FUNC_PLACEHOLDER_0\""],
            "function double(x) { return x + x; }"
        );
    }

    #[test]
    fn extracts_arrow_with_block_body() {
        let out = extract(r#"{"g": (a, b) => { return a + b; }}"#);
        assert_eq!(out.text, r#"{"g": "__FUNC_PLACEHOLDER_0"}"#);
        assert_eq!(
            out.placeholders["\"__FUNC_PLACEHOLDER_0\""],
            "(a, b) => { return a + b; }"
        );
    }

    #[test]
    fn expression_arrow_stops_at_delimiters() {
        let out = extract(r#"{"g": (x) => x + 1, "list": [(a) => a * 2, 3]}"#);
        assert_eq!(
            out.text,
            r#"{"g": "__FUNC_PLACEHOLDER_0", "list": ["__FUNC_PLACEHOLDER_1", 3]}"#
        );
        assert_eq!(out.placeholders["\"__FUNC_PLACEHOLDER_0\""], "(x) => x + 1");
        assert_eq!(out.placeholders["\"__FUNC_PLACEHOLDER_1\""], "(a) => a * 2");
    }

    #[test]
    fn expression_arrow_keeps_nested_object_literal() {
        let out = extract(r#"{"g": (x) => ({a: x})}"#);
        assert_eq!(out.text, r#"{"g": "__FUNC_PLACEHOLDER_0"}"#);
        assert_eq!(out.placeholders["\"__FUNC_PLACEHOLDER_0\""], "(x) => ({a: x})");
    }

    #[test]
    fn body_braces_in_strings_and_comments_do_not_close() {
        let source = concat!(
            r#"{"f": function () { // }"#,
            "\n",
            r#" var s = "}"; /* } */ return '{'; }}"#
        );
        let out = extract(source);
        assert_eq!(out.text, r#"{"f": "__FUNC_PLACEHOLDER_0"}"#);
        let literal = &out.placeholders["\"__FUNC_PLACEHOLDER_0\""];
        assert!(literal.starts_with("function () {"));
        assert!(literal.ends_with("return '{'; }"));
    }

    #[test]
    fn nested_function_stays_inside_outer_literal() {
        let out = extract(
            r#"{"outer": function () { var f = function () { return 2; }; return f(); }}"#,
        );
        assert_eq!(out.text, r#"{"outer": "__FUNC_PLACEHOLDER_0"}"#);
        assert_eq!(out.placeholders.len(), 1);
    }

    #[test]
    fn json_strings_are_never_scanned() {
        let source = r#"{"s": "function () { return 1; }", "(x) => x": "key"}"#;
        let out = extract(source);
        assert_eq!(out.text, source);
        assert!(!out.has_functions);
        assert!(out.placeholders.is_empty());
    }

    #[test]
    fn escaped_quotes_stay_inside_strings() {
        let source = r#"{"s": "say \" function() {} \""}"#;
        let out = extract(source);
        assert_eq!(out.text, source);
        assert!(!out.has_functions);
    }

    #[test]
    fn keyword_fragments_are_not_literals() {
        for source in [
            r#"{"a": false}"#,
            r#"{"a": functional}"#,
            r#"{"a": malfunction}"#,
        ] {
            let out = extract(source);
            assert_eq!(out.text, source);
            assert!(!out.has_functions);
        }
    }

    #[test]
    fn unterminated_body_is_left_in_place() {
        let source = r#"{"f": function () { return 1;"#;
        let out = extract(source);
        assert_eq!(out.text, source);
        assert!(!out.has_functions);
    }

    #[test]
    fn numbering_follows_document_order() {
        let out = extract(r#"{"a": (x) => x, "b": function () { return 1; }, "c": () => 0}"#);
        assert_eq!(
            out.text,
            r#"{"a": "__FUNC_PLACEHOLDER_0", "b": "__FUNC_PLACEHOLDER_1", "c": "__FUNC_PLACEHOLDER_2"}"#
        );
        assert_eq!(out.placeholders.len(), 3);
        for n in 0..3 {
            assert!(
                out.placeholders
                    .contains_key(&format!("\"{PLACEHOLDER_PREFIX}{n}\""))
            );
        }
    }

    #[test]
    fn whole_document_function_becomes_single_placeholder() {
        let out = extract("(x) => x + 1");
        assert_eq!(out.text, r#""__FUNC_PLACEHOLDER_0""#);
        assert_eq!(out.placeholders["\"__FUNC_PLACEHOLDER_0\""], "(x) => x + 1");
    }

    #[test]
    fn default_parameter_parens_stay_balanced() {
        let out = extract(r#"{"f": function (cb = () => 0) { return cb(); }}"#);
        assert_eq!(out.text, r#"{"f": "__FUNC_PLACEHOLDER_0"}"#);
        assert_eq!(
            out.placeholders["\"__FUNC_PLACEHOLDER_0\""],
            "function (cb = () => 0) { return cb(); }"
        );
    }

    #[test]
    fn second_pass_is_identity() {
        let first = extract(r#"{"a": (x) => x, "b": function () { return 1; }}"#);
        let second = extract(&first.text);
        assert_eq!(second.text, first.text);
        assert!(!second.has_functions);
    }

    #[test]
    fn expression_body_trailing_whitespace_is_trimmed() {
        let out = extract("{\"g\": (x) => x + 1   }");
        assert_eq!(out.placeholders["\"__FUNC_PLACEHOLDER_0\""], "(x) => x + 1");
    }
}
