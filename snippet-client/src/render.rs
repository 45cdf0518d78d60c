use std::{fmt::Write, sync::OnceLock};

use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    parsing::SyntaxSet,
    util::{as_24_bit_terminal_escaped, LinesWithEndings},
};

use crate::{api::Snippet, dashboard::View, features::FeatureFlags};

const PREVIEW_CHARS: usize = 100;

const THEME_NAME: &str = "base16-ocean.dark";
const RESET: &str = "\x1b[0m";

const ILLUSTRATION: &str = r#"
      .---------.
      |  {   }  |
      |  < / >  |
      '---------'
"#;

pub fn preview(code: &str) -> String {
    let head: String = code.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

fn badges(snippet: &Snippet) -> String {
    let mut line = format!("[{}]", snippet.language);
    for tag in &snippet.tags {
        let _ = write!(line, " #{}", tag.name);
    }
    line
}

pub fn render_card(snippet: &Snippet) -> String {
    format!(
        "#{} {}\n{}\n{}\n",
        snippet.id,
        snippet.heading,
        indent(&preview(&snippet.code)),
        badges(snippet)
    )
}

pub fn render_view(view: &View<'_>) -> String {
    match view {
        View::Loading { placeholders } => "[ ░░░░░░░░░░ ]\n".repeat(*placeholders),
        View::Error(message) => format!("Error\n{message}\n"),
        View::Empty { illustration } => {
            let mut out = String::new();
            if *illustration {
                out.push_str(ILLUSTRATION);
            }
            out.push_str("Welcome to Your Dashboard!\n");
            out.push_str("It looks like you haven't created any code snippets yet.\n");
            out.push_str("Start your coding journey by creating your first snippet!\n");
            out
        }
        View::Cards(snippets) => snippets
            .iter()
            .map(render_card)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_detail(snippet: &Snippet, copied: bool, features: FeatureFlags) -> String {
    let code = if features.syntax_highlighting {
        highlight(&snippet.code, &snippet.language)
    } else {
        snippet.code.clone()
    };
    let copy_label = if copied { "Copied!" } else { "Copy" };

    format!(
        "{}\n\n{}\n\n{}   ({copy_label})\n",
        snippet.heading,
        indent(&code),
        badges(snippet)
    )
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n")
}

/// Terminal-colored `code`, using the syntax that matches `language` by name
/// or file extension. Unknown languages are shown as plain text.
pub fn highlight(code: &str, language: &str) -> String {
    let syntaxes = syntax_set();
    let syntax = syntaxes
        .find_syntax_by_token(language.trim())
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme());

    let mut out = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, syntaxes) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(err) => {
                log::warn!("highlighting {language} failed: {err}");
                return code.to_string();
            }
        }
    }
    let end = out.trim_end_matches('\n').len();
    out.insert_str(end, RESET);
    out
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| ThemeSet::load_defaults().themes.remove(THEME_NAME).unwrap_or_default())
}
