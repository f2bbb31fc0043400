use sc_derive::api_model;
use serde_json::json;

#[api_model]
struct PointOfContact {
    contact_name: String,
    email_address: Option<String>,
    phone: Option<String>,
}

#[api_model(omit_null = false)]
struct Explicit {
    maybe_value: Option<u32>,
}

#[api_model(rename_all = "snake_case", deny_unknown_fields = true)]
struct Strict {
    some_field: u8,
}

#[test]
fn keys_are_camel_cased_and_nulls_omitted() {
    let poc = PointOfContact {
        contact_name: "Sue".to_owned(),
        email_address: None,
        phone: Some("555-1212".to_owned()),
    };

    let value = serde_json::to_value(&poc).expect("serialize");
    assert_eq!(value, json!({ "contactName": "Sue", "phone": "555-1212" }));
}

#[test]
fn missing_optional_fields_deserialize_as_none() {
    let poc: PointOfContact =
        serde_json::from_value(json!({ "contactName": "Bob" })).expect("deserialize");
    assert!(poc.email_address.is_none());
    assert!(poc.phone.is_none());
}

#[test]
fn omit_null_can_be_disabled() {
    let value = serde_json::to_value(Explicit { maybe_value: None }).expect("serialize");
    assert_eq!(value, json!({ "maybeValue": null }));
}

#[test]
fn rename_and_strictness_are_configurable() {
    let ok: Strict = serde_json::from_value(json!({ "some_field": 1 })).expect("deserialize");
    assert_eq!(ok.some_field, 1);

    let err = serde_json::from_value::<Strict>(json!({ "some_field": 1, "extra": true }));
    assert!(err.is_err());
}
