//! Shell script actions
//!
//! A script file is a plain POSIX shell module. Every function declared at
//! the top level of the file becomes one action:
//!
//! ```sh
//! do_thing() {
//!     echo "doing the thing"
//! }
//!
//! function run_task {
//!     make -C ~/project
//! }
//! ```
//!
//! Functions that only arrive through `.`/`source` are not declared in the
//! file, so they are never collected. Running an action sources the file
//! in a fresh shell and calls the function; a non-zero exit status is a
//! failure carrying the shell's stderr.
//!
//! Because every run sources the whole file, top-level commands run again
//! on each click, not once at load. Keep the top level to declarations
//! and variable assignments.

use crate::action::{Action, ActionRef};
use crate::error::{ActionError, DeckError, Result};
use crate::safety::{clip_message, MAX_MESSAGE_BYTES};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Shell used when settings do not name one.
pub const DEFAULT_SHELL: &str = "sh";

/// A top-level function found in a script, with the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub line: usize,
}

/// Lexer state carried across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// A here-document whose body starts on the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HereDoc {
    delimiter: String,
    /// `<<-` strips leading tabs before matching the delimiter.
    strip_tabs: bool,
}

/// Characters after which a `#` starts a comment.
fn starts_word(prev: Option<char>) -> bool {
    prev.map_or(true, |c| c.is_whitespace() || ";&|()<>".contains(c))
}

/// Parse the word after `<<`, starting at `start`. Returns the pending
/// here-document (if a delimiter was present) and the index just past it.
fn here_doc_word(chars: &[char], start: usize) -> (Option<HereDoc>, usize) {
    let mut i = start;
    let strip_tabs = chars.get(i) == Some(&'-');
    if strip_tabs {
        i += 1;
    }
    while chars.get(i).is_some_and(|c| *c == ' ' || *c == '\t') {
        i += 1;
    }

    let mut delimiter = String::new();
    while let Some(&c) = chars.get(i) {
        match c {
            '\'' | '"' => {
                i += 1;
                while let Some(&q) = chars.get(i) {
                    i += 1;
                    if q == c {
                        break;
                    }
                    delimiter.push(q);
                }
            }
            '\\' => {
                i += 1;
                if let Some(&escaped) = chars.get(i) {
                    delimiter.push(escaped);
                    i += 1;
                }
            }
            c if c.is_whitespace() || ";&|<>()".contains(c) => break,
            _ => {
                delimiter.push(c);
                i += 1;
            }
        }
    }

    let doc = (!delimiter.is_empty()).then_some(HereDoc { delimiter, strip_tabs });
    (doc, i)
}

/// Scan a script and return its top-level function declarations in
/// declaration order.
///
/// This is not a shell parser. It tracks quotes, comments, here-documents
/// and brace depth well enough to tell top-level declarations from nested
/// code and to reject files whose braces do not balance. Anything subtler
/// is left to the shell's own `-n` check.
pub fn scan_functions(path: &Path, source: &str) -> Result<Vec<FunctionDecl>> {
    let malformed = |line: usize, reason: &str| DeckError::Malformed {
        path: path.to_path_buf(),
        line,
        reason: reason.to_string(),
    };

    let mut decls: Vec<FunctionDecl> = Vec::new();
    let mut seen = HashSet::new();
    let mut open_braces: Vec<usize> = Vec::new();
    let mut quote = Quote::None;
    let mut quote_line = 0;
    let mut here_docs: VecDeque<HereDoc> = VecDeque::new();
    // Depth of `((`/`$((` arithmetic, where `<<` is a shift.
    let mut arith = 0usize;

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(doc) = here_docs.front() {
            let body = if doc.strip_tabs { line.trim_start_matches('\t') } else { line };
            if body == doc.delimiter {
                here_docs.pop_front();
            }
            continue;
        }

        if open_braces.is_empty() && quote == Quote::None {
            if let Some(name) = declaration_name(line) {
                if !is_identifier(name) {
                    return Err(malformed(line_no, &format!("invalid function name '{}'", name)));
                }
                if !seen.insert(name.to_string()) {
                    return Err(malformed(line_no, &format!("function '{}' declared twice", name)));
                }
                decls.push(FunctionDecl { name: name.to_string(), line: line_no });
            }
        }

        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match quote {
                Quote::Single => {
                    if c == '\'' {
                        quote = Quote::None;
                    }
                }
                Quote::Double => match c {
                    '\\' => i += 1,
                    '"' => quote = Quote::None,
                    _ => {}
                },
                Quote::None => match c {
                    '\\' => i += 1,
                    '#' if starts_word(i.checked_sub(1).map(|p| chars[p])) => break,
                    '\'' => {
                        quote = Quote::Single;
                        quote_line = line_no;
                    }
                    '"' => {
                        quote = Quote::Double;
                        quote_line = line_no;
                    }
                    '(' if chars.get(i + 1) == Some(&'(') => {
                        arith += 1;
                        i += 2;
                        continue;
                    }
                    ')' if arith > 0 && chars.get(i + 1) == Some(&')') => {
                        arith -= 1;
                        i += 2;
                        continue;
                    }
                    '<' if arith == 0
                        && (i == 0 || chars[i - 1] != '<')
                        && chars.get(i + 1) == Some(&'<')
                        && chars.get(i + 2) != Some(&'<') =>
                    {
                        let (doc, next) = here_doc_word(&chars, i + 2);
                        here_docs.extend(doc);
                        i = next;
                        continue;
                    }
                    '{' => open_braces.push(line_no),
                    '}' => {
                        if open_braces.pop().is_none() {
                            return Err(malformed(line_no, "unexpected '}'"));
                        }
                    }
                    _ => {}
                },
            }
            i += 1;
        }
    }

    if quote != Quote::None {
        return Err(malformed(quote_line, "unterminated quote"));
    }
    if let Some(line) = open_braces.first() {
        return Err(malformed(*line, "unclosed '{'"));
    }

    Ok(decls)
}

/// If `line` opens a function declaration, return the declared name.
fn declaration_name(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("function") {
        if rest.starts_with(char::is_whitespace) {
            let rest = rest.trim_start();
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(' || c == '{')
                .unwrap_or(rest.len());
            return Some(&rest[..end]);
        }
    }

    let paren = trimmed.find("()")?;
    let name = trimmed[..paren].trim_end();
    if name.is_empty() || name.contains(char::is_whitespace) || name.contains(['=', '"', '\'', '$']) {
        return None;
    }
    Some(name)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Ask the shell to parse the file without running it (`sh -n`).
fn syntax_check(path: &Path, shell: &str) -> Result<()> {
    let output = Command::new(shell)
        .arg("-n")
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| DeckError::ScriptRead { path: path.to_path_buf(), source })?;

    if output.status.success() {
        return Ok(());
    }
    Err(DeckError::SyntaxCheck {
        path: path.to_path_buf(),
        shell: shell.to_string(),
        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// One script file, loaded as an isolated namespace of actions.
#[derive(Debug, Clone)]
pub struct ScriptFile {
    path: PathBuf,
    shell: String,
}

impl ScriptFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), shell: DEFAULT_SHELL.to_string() }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, validate and collect the file's top-level functions.
    pub fn load(&self) -> Result<Vec<ScriptAction>> {
        let source = std::fs::read_to_string(&self.path)
            .map_err(|source| DeckError::ScriptRead { path: self.path.clone(), source })?;

        let decls = scan_functions(&self.path, &source)?;
        syntax_check(&self.path, &self.shell)?;

        tracing::debug!(
            path = %self.path.display(),
            count = decls.len(),
            "scanned script"
        );

        Ok(decls
            .into_iter()
            .map(|decl| ScriptAction {
                name: decl.name,
                script: self.path.clone(),
                shell: self.shell.clone(),
            })
            .collect())
    }
}

/// A shell function exposed as an action.
#[derive(Debug, Clone)]
pub struct ScriptAction {
    name: String,
    script: PathBuf,
    shell: String,
}

impl ScriptAction {
    pub fn into_ref(self) -> ActionRef {
        Arc::new(self)
    }
}

impl Action for ScriptAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> std::result::Result<(), ActionError> {
        // $0 carries the script path so it never needs quoting.
        let body = format!(". \"$0\" && {}", self.name);
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(body)
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            tracing::info!(action = %self.name, "{}", line);
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            Err(ActionError::new(match output.status.code() {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            }))
        } else {
            Err(ActionError::new(clip_message(&stderr, MAX_MESSAGE_BYTES)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn names(source: &str) -> Vec<String> {
        scan_functions(Path::new("test.sh"), source)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect()
    }

    fn scan_err(source: &str) -> String {
        scan_functions(Path::new("test.sh"), source).unwrap_err().to_string()
    }

    #[test]
    fn test_collects_in_declaration_order() {
        let src = "\
zeta() {
    echo z
}

function alpha {
    echo a
}

function mid() {
    echo m
}
";
        assert_eq!(names(src), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_skips_nested_and_sourced_functions() {
        let src = "\
. ./helpers.sh
outer() {
    inner() { echo nested; }
    inner
}
";
        assert_eq!(names(src), vec!["outer"]);
    }

    #[test]
    fn test_ignores_braces_in_comments_and_quotes() {
        let src = "\
# a comment with { brace
do_thing() {
    echo \"}\" '{'  # trailing }
    echo ${HOME}
}
";
        assert_eq!(names(src), vec!["do_thing"]);
    }

    #[test]
    fn test_brace_on_next_line() {
        let src = "do_thing()\n{\n    true\n}\n";
        assert_eq!(names(src), vec!["do_thing"]);
    }

    #[test]
    fn test_empty_script_has_no_actions() {
        assert!(names("# nothing here\nX=1\n").is_empty());
    }

    #[test]
    fn test_unclosed_brace_is_malformed() {
        let err = scan_err("broken() {\n    echo hi\n");
        assert!(err.contains("line 1"), "{}", err);
        assert!(err.contains("unclosed"), "{}", err);
    }

    #[test]
    fn test_stray_close_brace_is_malformed() {
        let err = scan_err("echo hi\n}\n");
        assert!(err.contains("line 2"), "{}", err);
    }

    #[test]
    fn test_duplicate_function_is_malformed() {
        let err = scan_err("a() { true; }\na() { false; }\n");
        assert!(err.contains("declared twice"), "{}", err);
    }

    #[test]
    fn test_invalid_name_is_malformed() {
        let err = scan_err("do-thing() { true; }\n");
        assert!(err.contains("invalid function name"), "{}", err);
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let err = scan_err("a() {\n    echo \"oops\n}\n");
        assert!(err.contains("unterminated quote"), "{}", err);
    }

    #[test]
    fn test_here_doc_body_is_not_code() {
        let src = "\
greet() {
    cat <<EOF
It's done
EOF
}

emit() {
    cat <<'EOF'
}
EOF
}

indent() {
\tcat <<-\"END\"
\t\t{ don't }
\tEND
}
";
        assert_eq!(names(src), vec!["greet", "emit", "indent"]);
    }

    #[test]
    fn test_here_doc_hides_declarations() {
        let src = "cat <<DOC\nfake() {\nDOC\nreal() { true; }\n";
        assert_eq!(names(src), vec!["real"]);
    }

    #[test]
    fn test_arithmetic_shift_is_not_a_here_doc() {
        let src = "shift_it() {\n    echo $((1 << 4))\n}\nafter() { true; }\n";
        assert_eq!(names(src), vec!["shift_it", "after"]);
    }

    #[test]
    fn test_here_string_is_not_a_here_doc() {
        let src = "read_it() {\n    cat <<< \"it's\"\n}\nafter() { true; }\n";
        assert_eq!(names(src), vec!["read_it", "after"]);
    }

    #[test]
    fn test_comment_after_operator() {
        let src = "go() {\n    true;# don't care\n    false&&true|# it's fine\n    true\n}\n";
        assert_eq!(names(src), vec!["go"]);
    }

    #[test]
    fn test_hash_inside_word_is_not_a_comment() {
        let src = "count() {\n    echo ${#HOME} a#'b{'\n}\n";
        assert_eq!(names(src), vec!["count"]);
    }

    #[test]
    fn test_case_arms() {
        let src = "\
pick() {
    case \"$1\" in
        a|b) echo ab ;;
        (c) echo c ;;
        *) echo other ;;
    esac
}
";
        assert_eq!(names(src), vec!["pick"]);
    }

    #[cfg(unix)]
    fn write_script(source: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        file
    }

    #[cfg(unix)]
    #[test]
    fn test_script_action_success_and_failure() {
        let file = write_script(
            "\
ok_step() {
    echo fine
}

bad_step() {
    echo 'no such widget' >&2
    return 3
}

quiet_fail() {
    return 4
}
",
        );
        let actions = ScriptFile::new(file.path()).load().unwrap();
        let by_name = |n: &str| actions.iter().find(|a| a.name() == n).unwrap().clone();

        assert!(by_name("ok_step").run().is_ok());
        assert_eq!(by_name("bad_step").run().unwrap_err().message(), "no such widget");
        assert_eq!(by_name("quiet_fail").run().unwrap_err().message(), "exited with status 4");
    }

    #[cfg(unix)]
    #[test]
    fn test_each_run_is_isolated() {
        let file = write_script(
            "\
COUNT=0
bump() {
    COUNT=$((COUNT + 1))
    [ \"$COUNT\" -eq 1 ] || { echo \"count was $COUNT\" >&2; return 1; }
}
",
        );
        let actions = ScriptFile::new(file.path()).load().unwrap();
        assert!(actions[0].run().is_ok());
        assert!(actions[0].run().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_rejection_is_syntax_error() {
        let file = write_script("a() { if; }\n");
        let err = ScriptFile::new(file.path()).load().unwrap_err();
        assert!(matches!(err, DeckError::SyntaxCheck { .. }), "{:?}", err);
    }

    #[cfg(unix)]
    #[test]
    fn test_loads_script_with_here_docs_and_comments() {
        let file = write_script(
            "\
greet() {
    cat <<EOF
It's done }
EOF
}

tidy() {
    true;# don't care
    case x in x) echo $((2 << 1)) ;; esac
}
",
        );
        let actions = ScriptFile::new(file.path()).load().unwrap();
        let names: Vec<&str> = actions.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["greet", "tidy"]);
        assert!(actions[0].run().is_ok());
        assert!(actions[1].run().is_ok());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = ScriptFile::new("/definitely/not/here.sh").load().unwrap_err();
        assert!(matches!(err, DeckError::ScriptRead { .. }));
    }
}
