//! Prompt construction for code generation requests.

/// Language requested when none is configured.
pub const DEFAULT_LANGUAGE: &str = "Python";

/// Wraps a free-text description into an instruction asking for code only,
/// fenced in a markdown block tagged with the lowercased language name.
///
/// The description is interpolated as-is; an empty description still yields
/// a complete prompt.
///
/// ```
/// use gemma_codegen::prompt::build_code_generation_prompt;
///
/// let prompt = build_code_generation_prompt("reverse a string", "Rust");
/// assert!(prompt.contains("```rust"));
/// assert!(prompt.ends_with("reverse a string\n"));
/// ```
pub fn build_code_generation_prompt(description: &str, language: &str) -> String {
    format!(
        "Generate {language} code based on the following description.
Please only output the code, enclosed in markdown code blocks (e.g., ```{fence} ... ```).
Do not add any explanations before or after the code block unless the description explicitly asks for comments within the code.

Description:
{description}
",
        language = language,
        fence = language.to_lowercase(),
        description = description,
    )
}

/// Prefixes every line that has visible content, leaving blank lines and
/// line endings untouched.
pub fn indent(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len() + prefix.len() * 8);
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_description_and_fence() {
        let prompt =
            build_code_generation_prompt("a function to check if a number is prime", DEFAULT_LANGUAGE);

        assert!(prompt.contains("a function to check if a number is prime"));
        assert!(prompt.contains("```python"));
        assert!(prompt.starts_with("Generate Python code"));
    }

    #[test]
    fn test_prompt_lowercases_only_the_fence_tag() {
        let prompt = build_code_generation_prompt("hello world", "TypeScript");

        assert!(prompt.contains("Generate TypeScript code"));
        assert!(prompt.contains("```typescript ... ```"));
    }

    #[test]
    fn test_prompt_with_empty_description() {
        let prompt = build_code_generation_prompt("", DEFAULT_LANGUAGE);
        assert!(prompt.ends_with("Description:\n\n"));
    }

    #[test]
    fn test_prompt_does_not_escape_description() {
        let description = "print \"{braces}\" and ```fences```";
        let prompt = build_code_generation_prompt(description, DEFAULT_LANGUAGE);
        assert!(prompt.contains(description));
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        let indented = indent("one\n\n  \ntwo\n", "  ");
        assert_eq!(indented, "  one\n\n  \n  two\n");
    }

    #[test]
    fn test_indent_without_trailing_newline() {
        assert_eq!(indent("a\nb", "> "), "> a\n> b");
        assert_eq!(indent("", "> "), "");
    }
}
