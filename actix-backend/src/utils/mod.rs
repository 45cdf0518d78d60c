mod validation;
pub use validation::{normalize_tags, test_text_field};
