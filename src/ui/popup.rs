/// List Manager popup: browse, search, sort and prune saved properties

use crate::error::RelayError;
use crate::listing::{SavedLists, SortOrder, count_by_site, filter_records, sites_by_count, sort_records};
use crate::property::{Collection, PropertyKey, PropertyRecord};
use crate::relay::{Message, ToggleRequest};
use crate::ui::components::{PropertyItem, SortSelect};
use crate::web::messenger::RuntimeMessenger;
use log::warn;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Ready,
    Error(String),
}

enum SavedAction {
    Loaded(SavedLists),
    Removed(Collection, PropertyKey),
}

#[derive(Default, PartialEq)]
struct Saved(SavedLists);

impl Reducible for Saved {
    type Action = SavedAction;

    fn reduce(self: Rc<Self>, action: SavedAction) -> Rc<Self> {
        match action {
            SavedAction::Loaded(lists) => Rc::new(Saved(lists)),
            SavedAction::Removed(collection, key) => {
                let mut lists = self.0.clone();
                lists.remove(collection, &key);
                Rc::new(Saved(lists))
            }
        }
    }
}

async fn load(collection: Collection) -> Result<Vec<PropertyRecord>, String> {
    let reply = RuntimeMessenger::request(&Message::get(collection, None))
        .await
        .and_then(|reply| {
            reply
                .properties()
                .map(<[PropertyRecord]>::to_vec)
                .ok_or(RelayError::UnexpectedReply(collection.storage_key()))
        });
    reply.map_err(|e| format!("Failed to load saved properties: {}", e))
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let saved = use_reducer(Saved::default);
    let active_tab = use_state(|| Collection::Favorites);
    let query = use_state(String::new);
    let order = use_state(SortOrder::default);

    // Load both collections on mount
    {
        let state = state.clone();
        let saved = saved.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let loaded = async { Ok::<_, String>((load(Collection::Favorites).await?, load(Collection::Ignored).await?)) };
                match loaded.await {
                    Ok((favorites, ignored)) => {
                        saved.dispatch(SavedAction::Loaded(SavedLists { favorites, ignored }));
                        state.set(AppState::Ready);
                    }
                    Err(e) => state.set(AppState::Error(e)),
                }
            });
            || ()
        });
    }

    let on_tab_click = {
        let active_tab = active_tab.clone();
        move |collection: Collection| {
            let active_tab = active_tab.clone();
            Callback::from(move |_| active_tab.set(collection))
        }
    };

    let on_search = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                query.set(input.value());
            }
        })
    };

    let on_sort = {
        let order = order.clone();
        Callback::from(move |o: SortOrder| order.set(o))
    };

    let list = saved.0.list(*active_tab);

    let on_remove = {
        let saved = saved.clone();
        let state = state.clone();
        let collection = *active_tab;
        Callback::from(move |key: PropertyKey| {
            let saved = saved.clone();
            let state = state.clone();
            spawn_local(async move {
                let message = Message::toggle(collection, ToggleRequest::by_key(&key));
                match RuntimeMessenger::request(&message).await {
                    Ok(reply) if reply.toggled(collection) == Some(false) => {
                        saved.dispatch(SavedAction::Removed(collection, key));
                    }
                    Ok(reply) => {
                        warn!("Remove of {} not confirmed: {:?}", key.id, reply);
                        state.set(AppState::Error(format!("Failed to remove property {}", key.id)));
                    }
                    Err(e) => state.set(AppState::Error(format!("Failed to remove property {}: {}", key.id, e))),
                }
            });
        })
    };

    let visible = sort_records(&filter_records(list, &query), *order);
    let site_counts = sites_by_count(&count_by_site(list));

    let tab_class = |collection: Collection| {
        if *active_tab == collection { "pf-v5-c-tabs__item pf-m-current" } else { "pf-v5-c-tabs__item" }
    };

    html! {
        <div class="popup-container">
            <h1 class="popup-title">{"ImobiliarePlus"}</h1>

            // Tab navigation
            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    <li class={tab_class(Collection::Favorites)}>
                        <button class="pf-v5-c-tabs__link" onclick={on_tab_click(Collection::Favorites)}>
                            <span class="pf-v5-c-tabs__item-text">{format!("Favorites ({})", saved.0.favorites.len())}</span>
                        </button>
                    </li>
                    <li class={tab_class(Collection::Ignored)}>
                        <button class="pf-v5-c-tabs__link" onclick={on_tab_click(Collection::Ignored)}>
                            <span class="pf-v5-c-tabs__item-text">{format!("Hidden ({})", saved.0.ignored.len())}</span>
                        </button>
                    </li>
                </ul>
            </div>

            {match &*state {
                AppState::Loading => html! {
                    <div class="loading-container">
                        <Spinner />
                        <p class="loading-text">{"Loading saved properties..."}</p>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="error-container">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Ready => html! {
                    <div class="tab-content">
                        <div class="list-controls">
                            <input
                                type="search"
                                class="search-input"
                                placeholder="Search by title, price or site"
                                value={(*query).clone()}
                                oninput={on_search}
                            />
                            <SortSelect value={*order} on_change={on_sort} />
                        </div>

                        if !site_counts.is_empty() {
                            <p class="site-counts">
                                {site_counts
                                    .iter()
                                    .map(|(site, count)| format!("{}: {}", site, count))
                                    .collect::<Vec<_>>()
                                    .join(" · ")}
                            </p>
                        }

                        if visible.is_empty() {
                            <p class="empty-state">
                                {if list.is_empty() { "Nothing saved yet" } else { "No properties match your search" }}
                            </p>
                        } else {
                            <div class="property-list">
                                {for visible.into_iter().map(|record| html! {
                                    <PropertyItem
                                        key={format!("{}@{}", record.id, record.hostname)}
                                        record={record}
                                        on_remove={on_remove.clone()}
                                    />
                                })}
                            </div>
                        }
                    </div>
                },
            }}
        </div>
    }
}
