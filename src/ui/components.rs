/// Reusable List Manager components

use crate::listing::{SortOrder, price_label, site_label};
use crate::property::{PropertyKey, PropertyRecord};
use patternfly_yew::prelude::*;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PropertyItemProps {
    pub record: PropertyRecord,
    pub on_remove: Callback<PropertyKey>,
}

#[function_component(PropertyItem)]
pub fn property_item(props: &PropertyItemProps) -> Html {
    let record = &props.record;
    let on_remove = props.on_remove.reform({
        let key = record.key();
        move |_| key.clone()
    });

    let title = if record.title.is_empty() { record.url.clone() } else { record.title.clone() };
    let price = price_label(&record.price);

    html! {
        <div class="property-item">
            if !record.thumbnail.is_empty() {
                <img class="property-thumbnail" src={record.thumbnail.clone()} alt="" />
            }
            <div class="property-details">
                <a class="property-title" href={record.url.clone()} target="_blank" rel="noopener">{title}</a>
                <div class="property-meta">
                    <span class="property-price">{price}</span>
                    <span class="property-site">{site_label(&record.hostname)}</span>
                </div>
            </div>
            <Button onclick={on_remove} variant={ButtonVariant::Secondary}>
                {"Remove"}
            </Button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SortSelectProps {
    pub value: SortOrder,
    pub on_change: Callback<SortOrder>,
}

#[function_component(SortSelect)]
pub fn sort_select(props: &SortSelectProps) -> Html {
    let onchange = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Some(order) = SortOrder::from_key(&select.value()) {
                    on_change.emit(order);
                }
            }
        })
    };

    html! {
        <select class="sort-select" {onchange}>
            {for SortOrder::ALL.iter().map(|order| html! {
                <option value={order.key()} selected={*order == props.value}>{order.label()}</option>
            })}
        </select>
    }
}
