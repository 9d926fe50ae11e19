use crate::dom::{Element, MESSAGE_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub fn class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// The `#message` banner: hidden until an action completes, then visible
/// with a severity until its hide timer fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBanner {
    text: String,
    severity: Option<Severity>,
    hidden: bool,
}

impl Default for MessageBanner {
    fn default() -> Self {
        Self {
            text: String::new(),
            severity: None,
            hidden: true,
        }
    }
}

impl MessageBanner {
    pub fn show(&mut self, text: impl Into<String>, severity: Severity) {
        self.text = text.into();
        self.severity = Some(severity);
        self.hidden = false;
    }

    /// Hides the banner; text and severity stay so a later show replaces them.
    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    pub fn class_name(&self) -> String {
        let mut classes = vec!["message"];
        if let Some(severity) = self.severity {
            classes.push(severity.class());
        }
        if self.hidden {
            classes.push("hidden");
        }
        classes.join(" ")
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new("div").with_attr("id", MESSAGE_ID);
        for class in self.class_name().split(' ') {
            element = element.with_class(class);
        }
        element.with_text(self.text.clone())
    }
}
