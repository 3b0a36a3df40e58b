/// Live DOM implementation of the scanner host
use crate::dom::ElementView;
use crate::property::Collection;
use crate::scanner::{ControlState, Host, Placement, PressHandler};
use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent, Node, NodeList, VisibilityState};

const CARD_MARKER: &str = "imobiliare-plus-buttons";
const DETAIL_MARKER: &str = "imobiliare-plus-buttons-detail-page";

const CONTAINER_STYLE: &[(&str, &str)] = &[
    ("display", "flex"),
    ("justify-content", "space-between"),
    ("gap", "10px"),
    ("margin-top", "10px"),
    ("padding", "0 16px 16px"),
    ("font-family", "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, Helvetica, Arial, sans-serif"),
];

const BUTTON_STYLE: &[(&str, &str)] = &[
    ("flex", "1"),
    ("padding", "8px 12px"),
    ("border-radius", "20px"),
    ("cursor", "pointer"),
    ("font-weight", "500"),
    ("font-size", "13px"),
    ("transition", "all 0.2s ease"),
    ("box-shadow", "0 1px 3px rgba(0,0,0,0.08)"),
    ("display", "flex"),
    ("align-items", "center"),
    ("justify-content", "center"),
    ("gap", "6px"),
    ("outline", "none"),
];

fn marker(placement: Placement) -> &'static str {
    match placement {
        Placement::Card => CARD_MARKER,
        Placement::Detail => DETAIL_MARKER,
    }
}

fn button_class(collection: Collection) -> &'static str {
    match collection {
        Collection::Favorites => "imobiliare-plus-favorite",
        Collection::Ignored => "imobiliare-plus-ignore",
    }
}

fn icon(collection: Collection) -> &'static str {
    match collection {
        Collection::Favorites => "★",
        Collection::Ignored => "✕",
    }
}

/// Background, text colour and border for a button.
fn palette(collection: Collection, active: bool) -> [(&'static str, &'static str); 3] {
    match (collection, active) {
        (Collection::Favorites, true) => [
            ("background-color", "#3e8b9c"),
            ("color", "#fff"),
            ("border", "1px solid #3e8b9c"),
        ],
        (Collection::Favorites, false) => [
            ("background-color", "white"),
            ("color", "#42758C"),
            ("border", "1px solid #e0e0e0"),
        ],
        (Collection::Ignored, true) => [
            ("background-color", "#1e2839"),
            ("color", "#fff"),
            ("border", "1px solid #1e2839"),
        ],
        (Collection::Ignored, false) => [
            ("background-color", "white"),
            ("color", "#1e2839"),
            ("border", "1px solid #e0e0e0"),
        ],
    }
}

fn set_styles(element: &Element, styles: &[(&str, &str)]) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let style = html.style();
        for (name, value) in styles {
            let _ = style.set_property(name, value);
        }
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl ElementView for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn text_content(&self) -> String {
        Node::text_content(self).unwrap_or_default()
    }

    fn own_text(&self) -> Vec<String> {
        let children = self.child_nodes();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .filter(|node| node.node_type() == Node::TEXT_NODE)
            .filter_map(|node| node.text_content())
            .collect()
    }

    fn is_match(&self, selector: &str) -> bool {
        self.matches(selector).unwrap_or(false)
    }

    fn select_one(&self, selector: &str) -> Option<Box<dyn ElementView + '_>> {
        let found = self.query_selector(selector).ok().flatten()?;
        Some(Box::new(found))
    }
}

#[derive(Clone)]
pub struct DomHost {
    document: Document,
}

impl DomHost {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(DomHost { document })
    }

    fn button(&self, node: &Element, placement: Placement, collection: Collection) -> Option<Element> {
        let selector = format!(".{} .{}", marker(placement), button_class(collection));
        node.query_selector(&selector).ok().flatten()
    }

    fn create_button(&self, collection: Collection, on_press: PressHandler) -> Option<Element> {
        let button = self.document.create_element("button").ok()?;
        button.set_class_name(button_class(collection));
        let _ = button.set_attribute("type", "button");
        button.set_inner_html(&format!(
            r#"<span class="icon">{}</span> <span class="text">{}</span>"#,
            icon(collection),
            collection.label()
        ));
        set_styles(&button, BUTTON_STYLE);
        set_styles(&button, &palette(collection, false));

        // The controls sit inside links and clickable cards.
        let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            event.prevent_default();
            event.stop_propagation();
            on_press(collection);
        });
        if let Err(e) = button.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref()) {
            warn!("Failed to attach click handler: {:?}", e);
        }
        handler.forget();
        Some(button)
    }
}

impl Host for DomHost {
    type Node = Element;

    fn page_url(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.href().ok())
            .unwrap_or_default()
    }

    fn is_visible(&self) -> bool {
        self.document.visibility_state() == VisibilityState::Visible
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn query_within(&self, root: &Element, selector: &str) -> Vec<Element> {
        root.query_selector_all(selector).map(elements).unwrap_or_default()
    }

    fn has_controls(&self, node: &Element, placement: Placement) -> bool {
        node.query_selector(&format!(".{}", marker(placement)))
            .ok()
            .flatten()
            .is_some()
    }

    fn attach_controls(&self, node: &Element, placement: Placement, on_press: PressHandler) {
        let Ok(container) = self.document.create_element("div") else {
            warn!("Failed to create controls container");
            return;
        };
        container.set_class_name(marker(placement));
        set_styles(&container, CONTAINER_STYLE);

        for collection in Collection::ALL {
            if let Some(button) = self.create_button(collection, on_press.clone()) {
                let _ = container.append_child(&button);
            }
        }
        if let Err(e) = node.append_child(&container) {
            warn!("Failed to attach controls: {:?}", e);
        }
    }

    fn render(&self, node: &Element, placement: Placement, collection: Collection, state: ControlState) {
        let Some(button) = self.button(node, placement, collection) else {
            return;
        };
        let active = state == ControlState::Active;
        set_styles(&button, &palette(collection, active));
        let opacity = if state == ControlState::Pending { "0.6" } else { "1" };
        set_styles(&button, &[("opacity", opacity)]);
        let _ = button.class_list().toggle_with_force("active", active);
    }

    fn set_dimmed(&self, node: &Element, dimmed: bool) {
        set_styles(node, &[("opacity", if dimmed { "0.5" } else { "1" })]);
    }

    fn press_feedback(&self, node: &Element, placement: Placement, collection: Collection) {
        let Some(button) = self.button(node, placement, collection) else {
            return;
        };
        set_styles(&button, &[("transform", "scale(0.95)")]);

        let Some(window) = web_sys::window() else {
            return;
        };
        let release = Closure::once_into_js(move || set_styles(&button, &[("transform", "scale(1)")]));
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(release.unchecked_ref(), 100);
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }
}
