use std::collections::HashMap;

pub const WELCOME_EMAIL_TEMPLATE: &str = include_str!("../templates/welcome_email.html");
pub const NEWSLETTER_TEMPLATE: &str = include_str!("../templates/newsletter.html");

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("No value was provided for the placeholder '{0}'")]
    MissingValue(String),
    #[error("Unterminated placeholder starting at byte {0}")]
    UnterminatedPlaceholder(usize),
    #[error("Unmatched '}}' at byte {0}")]
    UnmatchedClosingBrace(usize),
}

/// Values bound to the `{name}` placeholders of a template.
#[derive(Debug, Default)]
pub struct TemplateContext<'a> {
    values: HashMap<&'a str, String>,
}

impl<'a> TemplateContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` verbatim. Use it for markup produced by the service itself.
    pub fn insert_raw(mut self, name: &'a str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Binds `value` after escaping it for HTML.
    pub fn insert_escaped(self, name: &'a str, value: &str) -> Self {
        self.insert_raw(name, htmlescape::encode_minimal(value))
    }
}

/// Replaces every `{name}` in `template` with its bound value. `{{` and `}}` render as
/// literal braces.
pub fn render(template: &str, context: &TemplateContext<'_>) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, char)) = chars.next() {
        match char {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                rendered.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;

                for (_, next) in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }

                if !closed {
                    return Err(TemplateError::UnterminatedPlaceholder(position));
                }

                let value = context
                    .values
                    .get(name.trim())
                    .ok_or_else(|| TemplateError::MissingValue(name.trim().to_string()))?;
                rendered.push_str(value);
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                rendered.push('}');
            }
            '}' => return Err(TemplateError::UnmatchedClosingBrace(position)),
            other => rendered.push(other),
        }
    }

    Ok(rendered)
}
