//! Card and participant list rendering. Every function here is a pure
//! function of its arguments.

use crate::dom::{Action, Document, Element};
use crate::models::{initials, Activity, ActivityCatalog};

pub const EMPTY_PARTICIPANTS_TEXT: &str = "No participants yet";
pub const LOAD_FAILURE_TEXT: &str = "Failed to load activities. Please try again later.";

pub fn avatar(email: &str) -> Element {
    Element::new("span")
        .with_class("avatar")
        .with_text(initials(email))
}

/// One roster entry: avatar, identifier and a removal control bound to
/// exactly this `(activity, email)` pair.
pub fn participant_row(activity: &str, email: &str) -> Element {
    let remove = Element::new("button")
        .with_class("delete-btn")
        .with_attr("type", "button")
        .with_attr("aria-label", format!("Unregister {email}"))
        .with_attr("title", "Unregister participant")
        .with_text("✖")
        .with_action(Action::Unregister {
            activity: activity.to_string(),
            email: email.to_string(),
        });

    Element::new("li")
        .with_child(avatar(email))
        .with_child(
            Element::new("span")
                .with_class("participant-email")
                .with_text(email),
        )
        .with_child(remove)
}

pub fn participants_list(activity: &str, participants: &[String]) -> Element {
    if participants.is_empty() {
        return Element::new("div")
            .with_class("participants-empty")
            .with_text(EMPTY_PARTICIPANTS_TEXT);
    }

    participants.iter().fold(
        Element::new("ul").with_class("participants-list"),
        |list, email| list.with_child(participant_row(activity, email)),
    )
}

fn labelled_line(label: &str, value: String) -> Element {
    Element::new("p")
        .with_child(Element::new("strong").with_text(label))
        .with_text(format!(" {value}"))
}

pub fn activity_card(name: &str, activity: &Activity) -> Element {
    let header = Element::new("div")
        .with_class("participants-header")
        .with_text("Participants")
        .with_child(
            Element::new("span")
                .with_class("badge")
                .with_text(activity.participants.len().to_string()),
        );

    let section = Element::new("div")
        .with_class("participants-section")
        .with_child(header)
        .with_child(participants_list(name, &activity.participants));

    Element::new("div")
        .with_class("activity-card")
        .with_child(Element::new("h4").with_text(name))
        .with_child(Element::new("p").with_text(activity.description.clone()))
        .with_child(labelled_line("Schedule:", activity.schedule.clone()))
        .with_child(labelled_line(
            "Availability:",
            format!("{} spots left", activity.spots_left()),
        ))
        .with_child(section)
}

pub fn activity_option(name: &str) -> Element {
    Element::new("option")
        .with_attr("value", name)
        .with_attr("data-generated", "1")
        .with_text(name)
}

pub fn load_failure_notice() -> Element {
    Element::new("p").with_text(LOAD_FAILURE_TEXT)
}

/// Discards every card and generated option and builds fresh ones from
/// `catalog`. The selector's static options are kept.
pub fn rebuild(document: &mut Document, catalog: &ActivityCatalog) {
    document.activities_list.clear();
    document
        .activity_select
        .retain_elements(|option| option.attr("data-generated").is_none());

    for (name, activity) in catalog.iter() {
        document.activities_list.push(activity_card(name, activity));
        document.activity_select.push(activity_option(name));
    }
}
