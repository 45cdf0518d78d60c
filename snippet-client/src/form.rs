use thiserror::Error;

use crate::api::NewSnippet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("a submission is already in progress")]
    AlreadySubmitting,
}

/// State of the "create snippet" form.
#[derive(Debug, Default)]
pub struct NewSnippetForm {
    pub heading: String,
    pub code: String,
    pub language: String,
    pub current_tag: String,
    pub(crate) tags: Vec<String>,
    pub(crate) submitting: bool,
}

impl NewSnippetForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Moves `current_tag` into the tag list. Blank or duplicate tags are
    /// ignored and stay in the input.
    pub fn add_tag(&mut self) -> bool {
        let tag = self.current_tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        self.current_tag.clear();
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Validates the form and marks it as submitting.
    pub fn begin_submit(&mut self) -> Result<NewSnippet, FormError> {
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        for (name, value) in [("heading", &self.heading), ("code", &self.code), ("language", &self.language)] {
            if value.trim().is_empty() {
                return Err(FormError::Missing(name));
            }
        }

        self.submitting = true;
        Ok(NewSnippet {
            heading: self.heading.clone(),
            code: self.code.clone(),
            language: self.language.clone(),
            tags: self.tags.clone(),
        })
    }

    /// Clears the form after a successful create; a failure keeps the input for another try.
    pub fn finish_submit(&mut self, succeeded: bool) {
        if succeeded {
            *self = Self::default();
        } else {
            self.submitting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> NewSnippetForm {
        NewSnippetForm {
            heading: "Fib".into(),
            code: "def fib(n): ...".into(),
            language: "python".into(),
            ..NewSnippetForm::default()
        }
    }

    #[test]
    fn tags_are_trimmed_and_unique() {
        let mut form = NewSnippetForm::new();
        form.current_tag = "  math ".into();
        assert!(form.add_tag());
        assert!(form.current_tag.is_empty());

        form.current_tag = "math".into();
        assert!(!form.add_tag());
        form.current_tag = "   ".into();
        assert!(!form.add_tag());

        form.current_tag = "recursion".into();
        form.add_tag();
        form.remove_tag("math");
        assert_eq!(form.tags(), ["recursion".to_string()]);
    }

    #[test]
    fn submit_requires_text_fields() {
        let mut form = NewSnippetForm { language: String::new(), ..filled() };
        assert_eq!(form.begin_submit(), Err(FormError::Missing("language")));
        assert!(!form.is_submitting());
    }

    #[test]
    fn submit_lifecycle() {
        let mut form = filled();
        form.current_tag = "math".into();
        form.add_tag();

        let payload = form.begin_submit().unwrap();
        assert_eq!(payload.tags, vec!["math"]);
        assert!(form.is_submitting());
        assert_eq!(form.begin_submit(), Err(FormError::AlreadySubmitting));

        form.finish_submit(false);
        assert!(!form.is_submitting());
        assert_eq!(form.heading, "Fib");

        form.begin_submit().unwrap();
        form.finish_submit(true);
        assert!(form.heading.is_empty());
        assert!(form.tags().is_empty());
    }
}
