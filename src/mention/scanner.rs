//! Single-pass placeholder tokenizer.
//!
//! Placeholders inside code and quotes are left alone:
//! - fenced code: a line starting with three backticks opens or closes a block;
//!   the fence lines and everything between them are skipped
//! - inline code: text between unescaped backticks
//! - block quote: a line whose first non-space character is `>`

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Text,
    InlineCode,
    FencedCode,
    BlockQuote,
}

/// How a line is handled, decided once at its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEntry {
    /// The whole line is excluded. `next` is the state carried into the
    /// following line.
    Skip { state: ScanState, next: ScanState },
    /// The line is scanned character by character starting in this state.
    Scan(ScanState),
}

impl ScanState {
    /// Decide how the line beginning here is handled. `line` excludes the
    /// trailing newline.
    pub fn enter_line(self, line: &str) -> LineEntry {
        match self {
            ScanState::FencedCode if line.starts_with(FENCE) => LineEntry::Skip {
                state: ScanState::FencedCode,
                next: ScanState::Text,
            },
            ScanState::FencedCode => LineEntry::Skip {
                state: ScanState::FencedCode,
                next: ScanState::FencedCode,
            },
            // An open inline span masks fence and quote markers until closed.
            ScanState::InlineCode => LineEntry::Scan(ScanState::InlineCode),
            ScanState::Text | ScanState::BlockQuote => {
                if line.starts_with(FENCE) {
                    LineEntry::Skip {
                        state: ScanState::FencedCode,
                        next: ScanState::FencedCode,
                    }
                } else if line.trim_start_matches(' ').starts_with('>') {
                    LineEntry::Skip {
                        state: ScanState::BlockQuote,
                        next: ScanState::Text,
                    }
                } else {
                    LineEntry::Scan(ScanState::Text)
                }
            }
        }
    }

    /// Transition on an unescaped backtick seen mid-line.
    pub fn on_backtick(self) -> ScanState {
        match self {
            ScanState::Text => ScanState::InlineCode,
            ScanState::InlineCode => ScanState::Text,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderForm {
    /// `@{name}`
    Brace,
    /// `@name`
    NoBrace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    /// Literal text of the placeholder, e.g. `@{alice}`
    pub original: String,
    pub name: String,
    pub form: PlaceholderForm,
    /// Byte offset of the `@`
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_boundary(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r')
}

/// Try to read a placeholder starting at byte `at` (an `@`) inside `line`,
/// which begins at byte `line_start` of the full text.
fn read_placeholder(line: &str, at: usize, line_start: usize) -> Option<PlaceholderToken> {
    let rest = &line[at + 1..];

    if let Some(inner) = rest.strip_prefix('{') {
        let close = inner.find('}')?;
        let name = inner[..close].trim();
        if name.is_empty() {
            return None;
        }
        // '@' + '{' + inner + '}'
        let len = 1 + 1 + close + 1;
        return Some(PlaceholderToken {
            original: line[at..at + len].to_string(),
            name: name.to_string(),
            form: PlaceholderForm::Brace,
            start: line_start + at,
            end: line_start + at + len,
        });
    }

    let name_len: usize = rest
        .chars()
        .take_while(|c| is_name_char(*c))
        .map(char::len_utf8)
        .sum();
    if name_len == 0 {
        return None;
    }

    match rest[name_len..].chars().next() {
        None => {}
        Some(c) if is_boundary(c) => {}
        Some(_) => return None,
    }

    let len = 1 + name_len;
    Some(PlaceholderToken {
        original: line[at..at + len].to_string(),
        name: rest[..name_len].to_string(),
        form: PlaceholderForm::NoBrace,
        start: line_start + at,
        end: line_start + at + len,
    })
}

/// Find every placeholder outside the exclusion zones, in order.
pub fn tokenize(text: &str) -> Vec<PlaceholderToken> {
    let mut tokens = Vec::new();
    let mut state = ScanState::Text;
    let mut line_start = 0;

    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.strip_suffix('\n').unwrap_or(raw_line);

        match state.enter_line(line) {
            LineEntry::Skip { next, .. } => state = next,
            LineEntry::Scan(initial) => {
                state = initial;
                let mut prev: Option<char> = None;
                let mut skip_until = 0;

                for (idx, c) in line.char_indices() {
                    if idx < skip_until {
                        continue;
                    }
                    match c {
                        '`' if prev != Some('\\') => state = state.on_backtick(),
                        '@' if state == ScanState::Text => {
                            if let Some(token) = read_placeholder(line, idx, line_start) {
                                skip_until = token.end - line_start;
                                tokens.push(token);
                            }
                        }
                        _ => {}
                    }
                    prev = Some(c);
                }
            }
        }

        line_start += raw_line.len();
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.name).collect()
    }

    #[test]
    fn test_fence_line_toggles_fenced_state() {
        assert_eq!(
            ScanState::Text.enter_line("```rust"),
            LineEntry::Skip {
                state: ScanState::FencedCode,
                next: ScanState::FencedCode
            }
        );
        assert_eq!(
            ScanState::FencedCode.enter_line("@alice inside"),
            LineEntry::Skip {
                state: ScanState::FencedCode,
                next: ScanState::FencedCode
            }
        );
        assert_eq!(
            ScanState::FencedCode.enter_line("```"),
            LineEntry::Skip {
                state: ScanState::FencedCode,
                next: ScanState::Text
            }
        );
    }

    #[test]
    fn test_quote_state_resets_each_line() {
        assert_eq!(
            ScanState::Text.enter_line("   > quoted"),
            LineEntry::Skip {
                state: ScanState::BlockQuote,
                next: ScanState::Text
            }
        );
        assert_eq!(
            ScanState::BlockQuote.enter_line("plain"),
            LineEntry::Scan(ScanState::Text)
        );
    }

    #[test]
    fn test_indented_fence_is_not_a_fence() {
        assert_eq!(
            ScanState::Text.enter_line("  ```"),
            LineEntry::Scan(ScanState::Text)
        );
    }

    #[test]
    fn test_backtick_transitions() {
        assert_eq!(ScanState::Text.on_backtick(), ScanState::InlineCode);
        assert_eq!(ScanState::InlineCode.on_backtick(), ScanState::Text);
        assert_eq!(ScanState::FencedCode.on_backtick(), ScanState::FencedCode);
    }

    #[test]
    fn test_brace_and_nobrace_forms() {
        let tokens = tokenize("hi @{ alice } and @bob");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "alice");
        assert_eq!(tokens[0].original, "@{ alice }");
        assert_eq!(tokens[0].form, PlaceholderForm::Brace);
        assert_eq!((tokens[0].start, tokens[0].end), (3, 13));
        assert_eq!(tokens[1].name, "bob");
        assert_eq!(tokens[1].form, PlaceholderForm::NoBrace);
        assert_eq!((tokens[1].start, tokens[1].end), (18, 22));
    }

    #[test]
    fn test_empty_or_unterminated_brace_is_literal() {
        assert!(tokenize("@{} and @{   }").is_empty());
        assert!(tokenize("@{alice").is_empty());
        assert!(tokenize("@{alice\n}").is_empty());
    }

    #[test]
    fn test_nobrace_needs_boundary_after_name() {
        assert!(tokenize("Hello @name, world").is_empty());
        assert!(tokenize("Hello @name!").is_empty());
        assert_eq!(names("Hello @name"), vec!["name"]);
        assert_eq!(names("@name\nnext"), vec!["name"]);
        assert!(tokenize("just @ alone").is_empty());
    }

    #[test]
    fn test_no_brace_name_needs_trailing_boundary() {
        assert!(tokenize("write to ops@example.com!").is_empty());
        // The character before '@' is not inspected, so a bare address
        // followed by whitespace still yields a placeholder for its domain
        assert_eq!(names("mail ops@example.com now"), vec!["example.com"]);
    }

    #[test]
    fn test_inline_code_excluded() {
        assert_eq!(names("run `@alice` then @bob"), vec!["bob"]);
        assert_eq!(names(r"escaped \` @alice "), vec!["alice"]);
    }

    #[test]
    fn test_fenced_block_excluded() {
        let text = "@a\n```\n@b\n```\n@c";
        assert_eq!(names(text), vec!["a", "c"]);
    }

    #[test]
    fn test_block_quote_excluded() {
        let text = "> @quoted\n@live";
        assert_eq!(names(text), vec!["live"]);
    }

    #[test]
    fn test_offsets_span_multibyte_text() {
        let text = "héllo @bob";
        let tokens = tokenize(text);
        assert_eq!(&text[tokens[0].start..tokens[0].end], "@bob");
    }
}
