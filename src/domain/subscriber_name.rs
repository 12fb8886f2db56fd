use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 256;

/// A first or last name as typed by the subscriber. Any text is accepted up to
/// `MAX_CHAR_LENGHT` graphemes; values are HTML-escaped when rendered into emails.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubscriberName(String);

impl SubscriberName {
    pub fn parse(name: String) -> Result<SubscriberName, String> {
        if name.graphemes(true).count() > MAX_CHAR_LENGHT {
            return Err(format!(
                "Subscriber names cannot be longer than {} characters",
                MAX_CHAR_LENGHT
            ));
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
