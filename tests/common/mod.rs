#![allow(dead_code)]

use num_bigint::BigUint;
use opendata::export::pairing::{id_number, pairing};
use opendata::form::{FieldDefinition as F, FieldType, FormDefinition};
use opendata::submission::SubmissionTree;
use serde_json::{json, Value};

pub const INSTANCE_ID: i64 = 41;

/// Id of the `ordinal`-th child row of a root row.
pub fn child_id(parent: i64, ordinal: u64) -> BigUint {
    pairing(&BigUint::from(parent as u64), ordinal)
}

/// A row id the way it appears in exported JSON.
pub fn id_json(id: &BigUint) -> Value {
    Value::Number(id_number(id).unwrap())
}

/// The tutorial form: scalars, a photo, a geopoint, a select-multiple, one repeat
/// and the meta group.
pub fn tutorial_form() -> FormDefinition {
    FormDefinition {
        id_string: "tutorial_w_repeats".to_string(),
        project_id: 5,
        title: "Tutorial with repeats".to_string(),
        fields: vec![
            F::new("name", FieldType::String),
            F::new("age", FieldType::Integer),
            F::new("picture", FieldType::Photo),
            F::new("has_children", FieldType::SelectOne).with_choices(&["0", "1"]),
            F::new("gps", FieldType::Geopoint),
            F::new("web_browsers", FieldType::Note),
            F::new("browsers", FieldType::SelectMultiple)
                .with_choices(&["firefox", "chrome", "ie", "safari"]),
            F::new("children", FieldType::Repeat).with_children(vec![
                F::new("children/childs_name", FieldType::String),
                F::new("children/childs_age", FieldType::Integer),
            ]),
            F::new("meta", FieldType::Group)
                .with_children(vec![F::new("meta/instanceID", FieldType::Calculate)]),
        ],
    }
}

pub fn tutorial_submission() -> SubmissionTree {
    SubmissionTree::from(json!({
        "_id": INSTANCE_ID,
        "name": "Tom",
        "age": "32",
        "picture": "wotm_01_green_desktop-10_36_1.jpg",
        "has_children": "1",
        "gps": "26.431228 58.157921 0 0",
        "browsers": "firefox chrome ie safari",
        "children": [
            {"children/childs_name": "Harry", "children/childs_age": "2"},
            {"children/childs_name": "Potter", "children/childs_age": "5"}
        ],
        "meta/instanceID": "uuid:729f173c688e482486a48661700455ff",
        "_attachments": []
    }))
}

/// A household survey with a repeat inside a repeat and a sibling repeat.
pub fn household_form() -> FormDefinition {
    FormDefinition {
        id_string: "household".to_string(),
        project_id: 2,
        title: String::new(),
        fields: vec![
            F::new("village", FieldType::String),
            F::new("members", FieldType::Repeat).with_children(vec![
                F::new("members/member_name", FieldType::String),
                F::new("members/pets", FieldType::Repeat).with_children(vec![
                    F::new("members/pets/pet_name", FieldType::String),
                    F::new("members/pets/legs", FieldType::Integer),
                ]),
            ]),
            F::new("visits", FieldType::Repeat)
                .with_children(vec![F::new("visits/visit_date", FieldType::Date)]),
        ],
    }
}

pub fn household_submission(id: i64) -> SubmissionTree {
    SubmissionTree::from(json!({
        "_id": id,
        "village": "Kibera",
        "members": [
            {
                "members/member_name": "Amina",
                "members/pets": [
                    {"members/pets/pet_name": "Simba", "members/pets/legs": "4"},
                    {"members/pets/pet_name": "Kuku", "members/pets/legs": "2"}
                ]
            },
            {"members/member_name": "Otieno"},
            {
                "members/member_name": "Wanjiru",
                "members/pets": [{"members/pets/pet_name": "Samaki"}]
            }
        ],
        "visits": [
            {"visits/visit_date": "2020-02-18"},
            {"visits/visit_date": "2020-03-01"}
        ]
    }))
}
