use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::ActivityApi;
use crate::banner::Severity;
use crate::dom::{Action, Document, Element, SignupForm};
use crate::error::{PageError, Result};
use crate::render;
use crate::timer::Scheduler;

/// Parts of the page that can change independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    ActivityList,
    Selector,
    Message,
    Form,
}

/// Turns a changed region of the [`Document`] into visible output.
pub trait Surface {
    fn present(&self, document: &Document, region: Region);
}

/// A surface with no output, for headless use.
pub struct Headless;

impl Surface for Headless {
    fn present(&self, _document: &Document, region: Region) {
        debug!("Region {:?} updated", region);
    }
}

pub struct PageController<A> {
    api: A,
    document: Rc<RefCell<Document>>,
    surface: Rc<dyn Surface>,
    scheduler: Rc<dyn Scheduler>,
    hide_after: Duration,
}

impl<A: ActivityApi> PageController<A> {
    pub fn new(
        api: A,
        surface: Rc<dyn Surface>,
        scheduler: Rc<dyn Scheduler>,
        hide_after: Duration,
    ) -> Self {
        Self {
            api,
            document: Rc::new(RefCell::new(Document::new())),
            surface,
            scheduler,
            hide_after,
        }
    }

    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    /// Direct access to the tree, for edits made outside the controller
    /// (other page scripts, user agents). Call [`Self::refresh`] afterwards.
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    /// Presents every region again.
    pub fn refresh(&self) {
        for region in [
            Region::ActivityList,
            Region::Selector,
            Region::Message,
            Region::Form,
        ] {
            self.present(region);
        }
    }

    /// Replaces the form control values, as a user typing would.
    pub fn fill_form(&self, activity: &str, email: &str) {
        let mut document = self.document.borrow_mut();
        document.form = SignupForm {
            activity: activity.to_string(),
            email: email.to_string(),
        };
    }

    fn present(&self, region: Region) {
        self.surface.present(&self.document.borrow(), region);
    }

    /// Fetches the whole catalog and rebuilds the card list and the
    /// selector's generated options. On failure only the list region is
    /// replaced, with a fixed notice.
    pub async fn sync(&self) {
        match self.api.list_activities().await {
            Ok(catalog) => {
                render::rebuild(&mut self.document.borrow_mut(), &catalog);
                info!("Rendered {} activities", catalog.len());
                self.present(Region::ActivityList);
                self.present(Region::Selector);
            }
            Err(e) => {
                error!("Error fetching activities: {}", e);
                {
                    let mut document = self.document.borrow_mut();
                    document.activities_list.clear();
                    document
                        .activities_list
                        .push(render::load_failure_notice());
                }
                self.present(Region::ActivityList);
            }
        }
    }

    pub async fn dispatch(&self, action: Action) {
        match action {
            Action::Unregister { activity, email } => self.unregister(&activity, &email).await,
        }
    }

    /// Removes `email` from `activity` and re-syncs on success.
    pub async fn unregister(&self, activity: &str, email: &str) {
        if activity.is_empty() {
            debug!("Ignoring unregister without an activity name");
            return;
        }

        info!("Unregistering {} from {}", email, activity);

        match self.api.unregister(activity, email).await {
            Ok(reply) => {
                let body = reply.body.clone().unwrap_or_default();
                if reply.is_success() {
                    let text = body
                        .message()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{email} unregistered"));
                    self.show_message(text, Severity::Success);
                    self.sync().await;
                } else {
                    warn!("Unregister rejected with status {}", reply.status);
                    let text = body.detail().unwrap_or("Failed to unregister").to_string();
                    self.show_message(text, Severity::Error);
                }
            }
            Err(e) => {
                error!("Error unregistering: {}", e);
                self.show_message("Error unregistering. Try again.", Severity::Error);
            }
        }
    }

    /// Submits the signup form. On success the affected card is patched
    /// right away and then the whole page is re-synced.
    pub async fn submit(&self) {
        let form = self.document.borrow().form.clone();
        info!("Signing up {} for {}", form.email, form.activity);

        let reply = match self.api.signup(&form.activity, &form.email).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error signing up: {}", e);
                self.show_message("Failed to sign up. Please try again.", Severity::Error);
                return;
            }
        };

        let Some(body) = reply.body.as_ref() else {
            error!(
                "Error signing up: unreadable response body (status {})",
                reply.status
            );
            self.show_message("Failed to sign up. Please try again.", Severity::Error);
            return;
        };

        if !reply.is_success() {
            warn!("Signup rejected with status {}", reply.status);
            let text = body.detail().unwrap_or("An error occurred").to_string();
            self.show_message(text, Severity::Error);
            return;
        }

        let text = body
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Signed up {} for {}", form.email, form.activity));
        self.show_message(text, Severity::Success);

        self.document.borrow_mut().form.reset();
        self.present(Region::Form);

        if let Err(e) = self.apply_optimistic_signup(&form.activity, &form.email) {
            error!("Error updating UI optimistically: {}", e);
        }

        self.sync().await;
    }

    /// Adds `email` to the rendered card for `activity` without waiting for
    /// the server: bumps the badge and appends a participant row.
    pub fn apply_optimistic_signup(&self, activity: &str, email: &str) -> Result<()> {
        {
            let mut document = self.document.borrow_mut();
            let Some(card) = document.card_mut(activity) else {
                debug!("No rendered card for {}, skipping optimistic update", activity);
                return Ok(());
            };

            if let Some(badge) = card.find_by_class_mut("badge") {
                let current = badge.text_content();
                let count = match current.trim() {
                    "" => 0,
                    text => text.parse::<usize>().map_err(|_| {
                        PageError::UnexpectedMarkup(format!("badge count {:?}", current))
                    })?,
                };
                let count = count.checked_add(1).ok_or_else(|| {
                    PageError::UnexpectedMarkup(format!("badge count {:?}", current))
                })?;
                badge.set_text(count.to_string());
            }

            let row = render::participant_row(activity, email);
            if let Some(list) = card.find_by_class_mut("participants-list") {
                list.push(row);
            } else {
                let section = card
                    .find_by_class_mut("participants-section")
                    .ok_or_else(|| {
                        PageError::UnexpectedMarkup(format!(
                            "card {:?} has no participants section",
                            activity
                        ))
                    })?;
                section.retain_elements(|el| !el.has_class("participants-empty"));
                section.push(
                    Element::new("ul")
                        .with_class("participants-list")
                        .with_child(row),
                );
            }
        }

        debug!("Optimistically added {} to {}", email, activity);
        self.present(Region::ActivityList);
        Ok(())
    }

    fn show_message(&self, text: impl Into<String>, severity: Severity) {
        self.document.borrow_mut().message.show(text, severity);
        self.present(Region::Message);

        let document = Rc::clone(&self.document);
        let surface = Rc::clone(&self.surface);
        self.scheduler.schedule(
            self.hide_after,
            Box::new(move || {
                document.borrow_mut().message.hide();
                surface.present(&document.borrow(), Region::Message);
            }),
        );
    }
}
