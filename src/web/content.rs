/// Content-script driver: turns scanner directives into observers and timers
use super::bridge::onMessage;
use super::host::DomHost;
use super::messenger::RuntimeMessenger;
use super::storage::load_settings;
use crate::relay::{Message, Reply};
use crate::scanner::{Directive, ScanContext, Session};
use crate::settings::ScanSettings;
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, MutationObserver, MutationObserverInit, MutationRecord};

type Shared = Rc<RefCell<Driver>>;
type Context = ScanContext<DomHost, RuntimeMessenger>;
type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// What an observed subtree reports to.
#[derive(Clone, Copy)]
enum Watch {
    Container,
    Map,
    Detail,
}

/// Everything armed for the current scan-context.
enum Subscription {
    Observer(MutationObserver, ObserverCallback),
    Timeout(i32),
    Interval(i32, Closure<dyn FnMut()>),
    Scroll(Closure<dyn FnMut(Event)>),
}

struct Driver {
    session: Session<DomHost, RuntimeMessenger>,
    subscriptions: Vec<Subscription>,
}

impl Driver {
    fn forget_timeout(&mut self, fired: i32) {
        self.subscriptions
            .retain(|subscription| !matches!(subscription, Subscription::Timeout(id) if *id == fired));
    }

    /// Synchronously disarm everything belonging to the old context.
    fn cancel_all(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for subscription in self.subscriptions.drain(..) {
            match subscription {
                Subscription::Observer(observer, callback) => {
                    observer.disconnect();
                    drop(callback);
                }
                Subscription::Timeout(id) => window.clear_timeout_with_handle(id),
                Subscription::Interval(id, tick) => {
                    window.clear_interval_with_handle(id);
                    drop(tick);
                }
                Subscription::Scroll(listener) => {
                    let _ = window.remove_event_listener_with_callback("scroll", listener.as_ref().unchecked_ref());
                }
            }
        }
    }
}

/// Entry point: load settings, then scan the page for its lifetime.
pub fn run() {
    spawn_local(async {
        let settings = load_settings().await;
        let Some(host) = DomHost::new() else {
            warn!("No document to scan");
            return;
        };
        start(host, settings);
    });
}

fn start(host: DomHost, settings: ScanSettings) {
    let driver = Rc::new(RefCell::new(Driver {
        session: Session::new(host, RuntimeMessenger, settings),
        subscriptions: Vec::new(),
    }));

    listen_for_broadcasts(&driver);
    watch_navigation(&driver);

    let directives = driver.borrow_mut().session.start();
    arm(&driver, directives);
}

fn millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// Run `f` on the current context unless it was torn down since `generation`.
fn with_context<R>(driver: &Shared, generation: u64, f: impl FnOnce(&mut Context) -> R) -> Option<R> {
    let Ok(mut driver) = driver.try_borrow_mut() else {
        debug!("driver busy, dropping callback");
        return None;
    };
    if !driver.session.is_current(generation) {
        return None;
    }
    driver.session.context_mut().map(f)
}

fn arm(driver: &Shared, directives: Vec<Directive<Element>>) {
    let generation = driver.borrow().session.generation();
    for directive in directives {
        match directive {
            Directive::ObserveContainer(node) => observe(driver, generation, &node, Watch::Container),
            Directive::ObserveMap(node) => observe(driver, generation, &node, Watch::Map),
            Directive::WatchDetail(node) => observe(driver, generation, &node, Watch::Detail),
            Directive::WatchScroll(debounce) => watch_scroll(driver, generation, debounce),
            Directive::StartInterval(period) => start_interval(driver, generation, period),
            Directive::RetryContainersAfter(delay) => schedule(driver, delay, move |handle| {
                let directives = with_context(handle, generation, |context| context.on_retry_containers());
                arm(handle, directives.unwrap_or_default());
            }),
            Directive::RetryDetailAfter(delay) => schedule(driver, delay, move |handle| {
                let directives = with_context(handle, generation, |context| context.on_detail_retry());
                arm(handle, directives.unwrap_or_default());
            }),
        }
    }
}

fn schedule(driver: &Shared, delay: Duration, task: impl FnOnce(&Shared) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let handle = driver.clone();
    let armed: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let fired = armed.clone();
    let callback = Closure::once_into_js(move || {
        if let (Some(id), Ok(mut driver)) = (fired.get(), handle.try_borrow_mut()) {
            driver.forget_timeout(id);
        }
        task(&handle)
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis(delay)) {
        Ok(id) => {
            armed.set(Some(id));
            driver.borrow_mut().subscriptions.push(Subscription::Timeout(id));
        }
        Err(e) => warn!("Failed to schedule timer: {:?}", e),
    }
}

fn added_elements(records: &js_sys::Array) -> Vec<Element> {
    records
        .iter()
        .map(|record| record.unchecked_into::<MutationRecord>())
        .flat_map(|record| {
            let nodes = record.added_nodes();
            (0..nodes.length())
                .filter_map(|i| nodes.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn subtree_observer(target: &Element, callback: &ObserverCallback) -> Option<MutationObserver> {
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).ok()?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    if let Err(e) = observer.observe_with_options(target, &options) {
        warn!("Failed to observe subtree: {:?}", e);
        return None;
    }
    Some(observer)
}

fn observe(driver: &Shared, generation: u64, target: &Element, watch: Watch) {
    let handle = driver.clone();
    let callback = ObserverCallback::new(move |records: js_sys::Array, _observer: MutationObserver| match watch {
        Watch::Container => {
            let added = added_elements(&records);
            if !added.is_empty() {
                with_context(&handle, generation, |context| context.on_nodes_added(added));
            }
        }
        Watch::Map => {
            with_context(&handle, generation, |context| context.on_map_changed());
        }
        Watch::Detail => {
            with_context(&handle, generation, |context| context.on_detail_mutation(js_sys::Date::now()));
        }
    });

    if let Some(observer) = subtree_observer(target, &callback) {
        driver
            .borrow_mut()
            .subscriptions
            .push(Subscription::Observer(observer, callback));
    }
}

fn watch_scroll(driver: &Shared, generation: u64, debounce: Duration) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let handle = driver.clone();
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

    let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(id) = pending.take() {
            window.clear_timeout_with_handle(id);
        }
        let handle = handle.clone();
        let pending_done = pending.clone();
        let settled = Closure::once_into_js(move || {
            pending_done.set(None);
            with_context(&handle, generation, |context| context.on_scroll_settled());
        });
        if let Ok(id) = window.set_timeout_with_callback_and_timeout_and_arguments_0(settled.unchecked_ref(), millis(debounce)) {
            pending.set(Some(id));
        }
    });

    if let Err(e) = window.add_event_listener_with_callback("scroll", listener.as_ref().unchecked_ref()) {
        warn!("Failed to watch scrolling: {:?}", e);
        return;
    }
    driver.borrow_mut().subscriptions.push(Subscription::Scroll(listener));
}

fn start_interval(driver: &Shared, generation: u64, period: Duration) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let handle = driver.clone();
    let tick = Closure::<dyn FnMut()>::new(move || {
        with_context(&handle, generation, |context| context.on_interval());
    });

    match window.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), millis(period)) {
        Ok(id) => driver.borrow_mut().subscriptions.push(Subscription::Interval(id, tick)),
        Err(e) => warn!("Failed to start rescan interval: {:?}", e),
    }
}

/// Document-wide watch for SPA route changes. Lives as long as the page.
fn watch_navigation(driver: &Shared) {
    let Some(root) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element())
    else {
        return;
    };

    let handle = driver.clone();
    let callback = ObserverCallback::new(move |_records: js_sys::Array, _observer: MutationObserver| {
        let Ok(mut driver) = handle.try_borrow_mut() else {
            return;
        };
        let Some(settle) = driver.session.on_document_changed() else {
            return;
        };
        driver.cancel_all();
        let generation = driver.session.generation();
        drop(driver);

        schedule(&handle, settle, move |handle| {
            let directives = {
                let Ok(mut driver) = handle.try_borrow_mut() else {
                    return;
                };
                if !driver.session.is_current(generation) {
                    return;
                }
                driver.session.start()
            };
            arm(handle, directives);
        });
    });

    if subtree_observer(&root, &callback).is_some() {
        callback.forget();
    }
}

fn listen_for_broadcasts(driver: &Shared) {
    let handle = driver.clone();
    let listener = Closure::<dyn FnMut(JsValue) -> JsValue>::new(move |raw: JsValue| {
        let reply = match serde_wasm_bindgen::from_value::<Message>(raw) {
            Ok(message) => match handle.try_borrow_mut() {
                Ok(mut driver) => driver.session.on_message(message),
                Err(_) => Reply::failure("Scanner busy"),
            },
            Err(e) => Reply::failure(format!("Failed to parse message: {}", e)),
        };
        serde_wasm_bindgen::to_value(&reply).unwrap_or(JsValue::UNDEFINED)
    });
    onMessage(listener.as_ref().unchecked_ref());
    listener.forget();
}
