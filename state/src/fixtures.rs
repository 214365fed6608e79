//! Shared test state: two users plus derived entries over them

use connect_core::{Derived, Function, Mode, RawMap, RawValue};
use serde_json::json;

use crate::store::Store;

pub(crate) fn raw_state() -> RawMap {
    let users = RawValue::from_json(json!([
        { "profile": { "name": "Jon", "surname": "Snow" } },
        { "profile": { "name": "Jammie", "surname": "Lannister" } }
    ]));
    
    RawMap::new()
        .with("users", users)
        .with(
            "usersLength",
            Derived::new(|ctx| {
                let len = ctx
                    .state()
                    .get("users")
                    .and_then(|users| users.as_list().map(|list| list.len()))
                    .unwrap_or(0);
                Ok(RawValue::from(len))
            }),
        )
        .with(
            "userName",
            Derived::parameterized(|ctx, args| {
                let index = args.first().and_then(RawValue::as_u64).unwrap_or(0);
                Ok(ctx
                    .state()
                    .lookup(&format!("users.{}.profile.name", index))
                    .unwrap_or(RawValue::Null))
            }),
        )
        .with(
            "userProp",
            Derived::parameterized(|ctx, args| {
                let index = args.first().and_then(RawValue::as_u64).unwrap_or(0);
                let prop = args.get(1).and_then(RawValue::as_str).unwrap_or("name");
                let value = ctx
                    .state()
                    .lookup(&format!("users.{}.profile.{}", index, prop))
                    .unwrap_or(RawValue::Null);
                ctx.call_library("capitalize", &[value])
            }),
        )
}

pub(crate) fn libraries() -> RawMap {
    RawMap::new().with(
        "capitalize",
        Function::new(|args| {
            let text = args.first().and_then(RawValue::as_str).unwrap_or_default();
            Ok(RawValue::from(text.to_uppercase()))
        }),
    )
}

pub(crate) fn store_over(state: RawMap, mode: Mode) -> Store {
    Store::builder()
        .state(state)
        .libraries(libraries())
        .mode(mode)
        .build()
}

pub(crate) fn store_with(mode: Mode) -> Store {
    store_over(raw_state(), mode)
}
