//! Browser entry point: binds the controller to the page's existing markup
//! (`#activities-list`, `#activity`, `#signup-form`, `#email`, `#message`).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlFormElement, HtmlInputElement, HtmlSelectElement};

use crate::api::ActivitiesClient;
use crate::config::MessageConfig;
use crate::dom::{
    Action, Document, Element, Node, ACTIVITIES_LIST_ID, ACTIVITY_SELECT_ID, EMAIL_INPUT_ID,
    MESSAGE_ID, SIGNUP_FORM_ID,
};
use crate::error::{PageError, Result};
use crate::page::{PageController, Region, Surface};
use crate::timer::{Scheduler, Task};

type Dispatch = Rc<dyn Fn(Action)>;

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        PageError::Browser(format!("{:?}", value))
    }
}

/// Schedules tasks with `setTimeout`.
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task).forget();
    }
}

pub struct BrowserSurface {
    document: web_sys::Document,
    list: web_sys::Element,
    select: HtmlSelectElement,
    form: HtmlFormElement,
    email: HtmlInputElement,
    message: web_sys::Element,
    dispatch: RefCell<Option<Dispatch>>,
    // Click handlers of the currently rendered list; dropped with it.
    listeners: RefCell<Vec<Closure<dyn FnMut()>>>,
}

fn by_id<T: JsCast>(document: &web_sys::Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| PageError::Browser(format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| PageError::Browser(format!("element #{id} has an unexpected type")))
}

impl BrowserSurface {
    pub fn attach(document: web_sys::Document) -> Result<Self> {
        Ok(Self {
            list: by_id(&document, ACTIVITIES_LIST_ID)?,
            select: by_id(&document, ACTIVITY_SELECT_ID)?,
            form: by_id(&document, SIGNUP_FORM_ID)?,
            email: by_id(&document, EMAIL_INPUT_ID)?,
            message: by_id(&document, MESSAGE_ID)?,
            document,
            dispatch: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn set_dispatch(&self, dispatch: Dispatch) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    /// Current `(activity, email)` values of the form controls.
    pub fn read_form(&self) -> (String, String) {
        (self.select.value(), self.email.value())
    }

    fn build(&self, element: &Element) -> Result<web_sys::Element> {
        let node = self.document.create_element(element.tag())?;
        if !element.classes().is_empty() {
            node.set_class_name(&element.class_name());
        }
        for (name, value) in element.attributes() {
            node.set_attribute(name, value)?;
        }
        for child in element.children() {
            match child {
                Node::Text(text) => {
                    node.append_child(&self.document.create_text_node(text))?;
                }
                Node::Element(child) => {
                    node.append_child(&self.build(child)?)?;
                }
            }
        }
        if let Some(action) = element.action() {
            self.bind_click(&node, action.clone())?;
        }
        Ok(node)
    }

    fn bind_click(&self, node: &web_sys::Element, action: Action) -> Result<()> {
        let Some(dispatch) = self.dispatch.borrow().clone() else {
            return Ok(());
        };
        let listener = Closure::<dyn FnMut()>::new(move || dispatch(action.clone()));
        node.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(listener);
        Ok(())
    }

    fn render_list(&self, document: &Document) -> Result<()> {
        self.list.set_inner_html("");
        self.listeners.borrow_mut().clear();
        for child in document.activities_list.children() {
            match child {
                Node::Element(element) => {
                    self.list.append_child(&self.build(element)?)?;
                }
                Node::Text(text) => {
                    self.list
                        .append_child(&self.document.create_text_node(text))?;
                }
            }
        }
        Ok(())
    }

    fn render_selector(&self, document: &Document) -> Result<()> {
        let generated = self.select.query_selector_all("option[data-generated]")?;
        for index in 0..generated.length() {
            if let Some(option) = generated.item(index) {
                if let Some(parent) = option.parent_node() {
                    parent.remove_child(&option)?;
                }
            }
        }
        for option in document
            .activity_select
            .child_elements()
            .filter(|el| el.attr("data-generated").is_some())
        {
            self.select.append_child(&self.build(option)?)?;
        }
        Ok(())
    }

    fn render_message(&self, document: &Document) {
        self.message.set_text_content(Some(document.message.text()));
        self.message.set_class_name(&document.message.class_name());
    }

    fn render_form(&self, document: &Document) {
        if document.form.activity.is_empty() && document.form.email.is_empty() {
            self.form.reset();
        } else {
            self.select.set_value(&document.form.activity);
            self.email.set_value(&document.form.email);
        }
    }
}

impl Surface for BrowserSurface {
    fn present(&self, document: &Document, region: Region) {
        let outcome = match region {
            Region::ActivityList => self.render_list(document),
            Region::Selector => self.render_selector(document),
            Region::Message => {
                self.render_message(document);
                Ok(())
            }
            Region::Form => {
                self.render_form(document);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            error!("Failed to present {:?}: {}", region, e);
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let origin = window.location().origin()?;

    let api = ActivitiesClient::new(&origin).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let surface = Rc::new(
        BrowserSurface::attach(document).map_err(|e| JsValue::from_str(&e.to_string()))?,
    );
    let controller = Rc::new(PageController::new(
        api,
        surface.clone(),
        Rc::new(TimeoutScheduler),
        MessageConfig::default().hide_after(),
    ));

    let weak = Rc::downgrade(&controller);
    surface.set_dispatch(Rc::new(move |action: Action| {
        if let Some(controller) = weak.upgrade() {
            spawn_local(async move { controller.dispatch(action).await });
        }
    }));

    let on_submit = {
        let controller = controller.clone();
        let surface = surface.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            let (activity, email) = surface.read_form();
            let controller = controller.clone();
            spawn_local(async move {
                controller.fill_form(&activity, &email);
                controller.submit().await;
            });
        })
    };
    surface
        .form
        .add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();

    info!("Activity board attached to {}", origin);
    spawn_local(async move { controller.sync().await });
    Ok(())
}
