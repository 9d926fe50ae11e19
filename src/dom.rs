//! Retained element tree for the page.
//!
//! The controller edits this tree and a [`Surface`](crate::page::Surface)
//! turns the edited region into real markup. Click behavior is stored on the
//! element as an [`Action`] value, so a control always refers to the exact
//! activity and participant it was rendered for.

use crate::banner::MessageBanner;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

pub const ACTIVITIES_LIST_ID: &str = "activities-list";
pub const ACTIVITY_SELECT_ID: &str = "activity";
pub const SIGNUP_FORM_ID: &str = "signup-form";
pub const EMAIL_INPUT_ID: &str = "email";
pub const MESSAGE_ID: &str = "message";

/// What a clickable control does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Unregister { activity: String, email: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    on_click: Option<Action>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            on_click: None,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.on_click = Some(action);
        self
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn action(&self) -> Option<&Action> {
        self.on_click.as_ref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Replaces every child with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Keeps text nodes and the child elements matching `keep`.
    pub fn retain_elements(&mut self, keep: impl Fn(&Element) -> bool) {
        self.children.retain(|node| match node {
            Node::Element(element) => keep(element),
            Node::Text(_) => true,
        });
    }

    /// Concatenated text of all descendants, like `textContent`.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Depth-first search over this element and its descendants.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        for child in self.child_elements_mut() {
            if let Some(found) = child.find_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_all(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_matching(pred, &mut found);
        found
    }

    fn collect_matching<'a>(
        &'a self,
        pred: &dyn Fn(&Element) -> bool,
        found: &mut Vec<&'a Element>,
    ) {
        if pred(self) {
            found.push(self);
        }
        for child in self.child_elements() {
            child.collect_matching(pred, found);
        }
    }

    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.find(&|el: &Element| el.has_class(class))
    }

    pub fn find_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        self.find_mut(&|el: &Element| el.has_class(class))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if !self.classes.is_empty() {
            let classes = self.class_name();
            let _ = write!(out, " class=\"{}\"", encode_double_quoted_attribute(&classes));
        }
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, encode_double_quoted_attribute(value));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag) {
            return;
        }
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&encode_text(text)),
                Node::Element(element) => element.write_html(out),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

const VOID_TAGS: &[&str] = &["input", "br", "img"];

/// Current values of the signup form controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub activity: String,
    pub email: String,
}

impl SignupForm {
    pub fn reset(&mut self) {
        self.activity.clear();
        self.email.clear();
    }
}

/// The parts of the page the controller owns.
#[derive(Debug, Clone)]
pub struct Document {
    pub activities_list: Element,
    pub activity_select: Element,
    pub form: SignupForm,
    pub message: MessageBanner,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            activities_list: Element::new("div")
                .with_attr("id", ACTIVITIES_LIST_ID)
                .with_child(Element::new("p").with_text("Loading activities...")),
            activity_select: Element::new("select")
                .with_attr("id", ACTIVITY_SELECT_ID)
                .with_child(
                    Element::new("option")
                        .with_attr("value", "")
                        .with_text("-- Select an activity --"),
                ),
            form: SignupForm::default(),
            message: MessageBanner::default(),
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = &Element> {
        self.activities_list
            .child_elements()
            .filter(|el| el.has_class("activity-card"))
    }

    /// The rendered card whose title is `name`.
    pub fn card(&self, name: &str) -> Option<&Element> {
        self.cards().find(|card| card_title(card).as_deref() == Some(name))
    }

    pub fn card_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.activities_list
            .child_elements_mut()
            .filter(|el| el.has_class("activity-card"))
            .find(|card| card_title(card).as_deref() == Some(name))
    }

    /// Names offered by the activity selector, placeholder excluded.
    pub fn option_names(&self) -> Vec<String> {
        self.activity_select
            .child_elements()
            .filter(|el| el.attr("data-generated").is_some())
            .map(Element::text_content)
            .collect()
    }

    pub fn to_html(&self) -> String {
        let form = Element::new("form")
            .with_attr("id", SIGNUP_FORM_ID)
            .with_child(
                Element::new("input")
                    .with_attr("type", "email")
                    .with_attr("id", EMAIL_INPUT_ID)
                    .with_attr("value", self.form.email.clone()),
            )
            .with_child(self.activity_select.clone());

        let mut out = String::new();
        self.activities_list.write_html(&mut out);
        out.push('\n');
        form.write_html(&mut out);
        out.push('\n');
        self.message.to_element().write_html(&mut out);
        out
    }
}

fn card_title(card: &Element) -> Option<String> {
    card.find(&|el: &Element| el.tag() == "h4").map(Element::text_content)
}
