//! Declarative description of where message fields live on a page

use crate::extract::ExtractionError;
use scraper::Selector;

/// CSS locators for the fields of a message page
#[derive(Debug, Clone)]
pub struct PageSchema {
    pub subject: Selector,
    pub sender: Selector,
    pub sent: Selector,
    pub body: Selector,
}

impl PageSchema {
    /// The layout of a pipermail message page:
    ///
    /// ```text
    /// <H1>[list] Subject</H1>
    /// <B>Sender Name</B> <A HREF="mailto:...">sender at example.com</A><BR>
    /// <I>Tue Feb  3 10:20:12 GMT 2009</I>
    /// ...
    /// <PRE>body</PRE>
    /// ```
    pub fn pipermail() -> Result<Self, ExtractionError> {
        Self::new("h1", "h1 + b", "h1 ~ i", "pre")
    }

    /// Builds a schema from CSS selector strings
    pub fn new(subject: &str, sender: &str, sent: &str, body: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            subject: parse_locator(subject)?,
            sender: parse_locator(sender)?,
            sent: parse_locator(sent)?,
            body: parse_locator(body)?,
        })
    }
}

/// Parses a CSS selector, keeping the selector text in the error
pub(crate) fn parse_locator(locator: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(locator)
        .map_err(|e| ExtractionError::InvalidLocator(format!("'{}': {:?}", locator, e)))
}
