/// Reusable UI components

use crate::rule::RawRule;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ValueListProps {
    pub values: Vec<String>,
    #[prop_or(AttrValue::Static("(none)"))]
    pub empty_text: AttrValue,
}

#[function_component(ValueList)]
pub fn value_list(props: &ValueListProps) -> Html {
    html! {
        <ul class="value-list">
            if props.values.is_empty() {
                <li class="value-list-empty">{props.empty_text.clone()}</li>
            } else {
                {for props.values.iter().map(|value| html! { <li>{value}</li> })}
            }
        </ul>
    }
}

#[derive(Properties, PartialEq)]
pub struct RuleCardProps {
    pub rule: RawRule,
    #[prop_or(false)]
    pub custom: bool,
}

#[function_component(RuleCard)]
pub fn rule_card(props: &RuleCardProps) -> Html {
    let rule = &props.rule;
    let name = if rule.name.is_empty() {
        "(Unnamed entry)".to_string()
    } else {
        rule.name.clone()
    };

    html! {
        <article class={classes!("entry-card", props.custom.then_some("entry-card-custom"))}>
            <h3>{name}</h3>
            <h4>{"URL patterns"}</h4>
            <ValueList values={rule.url_patterns.clone()} />
            <h4>{"Title must include"}</h4>
            <ValueList values={rule.title_must_include.clone()} />
            <h4>{"Title should include any"}</h4>
            <ValueList values={rule.title_should_include_any.clone()} />
        </article>
    }
}

#[derive(Clone, PartialEq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    pub message: AttrValue,
    #[prop_or(StatusKind::Success)]
    pub kind: StatusKind,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    let color = match props.kind {
        StatusKind::Success => "#1a7f37",
        StatusKind::Error => "#cf222e",
    };

    html! {
        <p class="status" role="status" style={format!("color: {};", color)}>
            {props.message.clone()}
        </p>
    }
}
