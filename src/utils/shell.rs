/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for shell execution.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
/// - Embedded single quotes are escaped
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    // Characters that require quoting
    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Quote a path for shell execution (always quotes).
pub fn quote_path(path: &str) -> String {
    format!("'{}'", escape_single_quote_content(path))
}

/// Render a structured command (executable plus argument list) into a shell
/// command line. Configuration values are interpolated as discrete, quoted
/// arguments rather than by string concatenation.
pub fn render(program: &str, args: &[&str]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote_arg(arg));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_arg_simple() {
        assert_eq!(quote_arg("migrate"), "migrate");
        assert_eq!(quote_arg("origin/main"), "origin/main");
    }

    #[test]
    fn quote_arg_with_spaces() {
        assert_eq!(quote_arg("two words"), "'two words'");
    }

    #[test]
    fn quote_arg_with_metacharacters() {
        assert_eq!(quote_arg("*.pyc"), "'*.pyc'");
        assert_eq!(
            quote_arg("key_prefix=site&debug=0"),
            "'key_prefix=site&debug=0'"
        );
    }

    #[test]
    fn quote_arg_with_single_quote() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn quote_arg_empty() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn quote_path_simple() {
        assert_eq!(quote_path("/home/www-data/site"), "'/home/www-data/site'");
    }

    #[test]
    fn quote_path_with_quote() {
        assert_eq!(quote_path("/srv/it's"), "'/srv/it'\\''s'");
    }

    #[test]
    fn render_quotes_each_argument() {
        assert_eq!(
            render("psql", &["-c", "CREATE DATABASE demo"]),
            "psql -c 'CREATE DATABASE demo'"
        );
    }

    #[test]
    fn render_plain_arguments_stay_bare() {
        assert_eq!(
            render("git", &["merge", "--ff-only", "origin/main"]),
            "git merge --ff-only origin/main"
        );
    }
}
