//! End-to-end flattening tests against the library API

mod common;

use common::*;
use num_bigint::BigUint;
use opendata::export::pairing::pairing;
use opendata::export::{infer_schemas, Flattener};
use opendata::submission::SubmissionTree;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};

#[test]
fn tutorial_schema_matches_tableau_contract() {
    let schemas = infer_schemas(&tutorial_form());
    let value = serde_json::to_value(&schemas).unwrap();

    assert_eq!(schemas.len(), 2);
    assert_eq!(value[0]["table_alias"], "data");
    assert_eq!(value[0]["connection_name"], "5_tutorial_w_repeats");
    assert_eq!(
        value[0]["column_headers"][0],
        json!({"id": "_id", "dataType": "int", "alias": "_id"})
    );
    assert_eq!(
        value[0]["column_headers"][13],
        json!({"id": "meta_instanceID", "dataType": "string", "alias": "meta_instanceID"})
    );
    assert_eq!(value[1]["table_alias"], "children");
    assert_eq!(
        value[1]["connection_name"],
        "5_tutorial_w_repeats_children"
    );
    assert_eq!(
        value[1]["column_headers"],
        json!([
            {"id": "_id", "dataType": "int", "alias": "_id"},
            {"id": "__parent_id", "dataType": "int", "alias": "__parent_id"},
            {"id": "__parent_table", "dataType": "string", "alias": "__parent_table"},
            {"id": "childs_name", "dataType": "string", "alias": "childs_name"},
            {"id": "childs_age", "dataType": "int", "alias": "childs_age"}
        ])
    );
}

#[test]
fn tutorial_row_matches_schema_columns() {
    let form = tutorial_form();
    let schemas = infer_schemas(&form);
    let row = Flattener::new(&form).flatten(&tutorial_submission()).unwrap();

    for column in schemas[0].column_ids() {
        assert!(row.get(column).is_some(), "root row lacks {}", column);
    }
    for child in row.child_rows() {
        for column in schemas[1].column_ids() {
            assert!(child.get(column).is_some(), "child row lacks {}", column);
        }
    }

    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["_id"], INSTANCE_ID);
    assert_eq!(json["age"], 32);
    assert_eq!(json["has_children"], "1");
    assert_eq!(json["_gps_precision"], "0");
    assert_eq!(json["meta_instanceID"], "uuid:729f173c688e482486a48661700455ff");
    assert_eq!(json["children"][0]["__parent_table"], schemas[0].table_alias);
    assert_eq!(json["children"][1]["_id"], id_json(&child_id(INSTANCE_ID, 2)));
    assert_eq!(json["children"][1]["childs_name"], "Potter");
    assert_eq!(json["children"][1]["childs_age"], 5);
}

#[test]
fn n_repeat_elements_give_n_linked_child_rows() {
    let form = tutorial_form();
    for n in 0..6 {
        let children: Vec<Value> = (0..n)
            .map(|i| json!({"children/childs_name": format!("child {}", i)}))
            .collect();
        let tree = SubmissionTree::from(json!({"_id": 100 + n, "children": children}));
        let row = Flattener::new(&form).flatten(&tree).unwrap();

        let rows = row.children("children");
        assert_eq!(rows.len(), n as usize);
        let ids: HashSet<&BigUint> = rows.iter().map(|c| &c.id).collect();
        assert_eq!(ids.len(), n as usize);
        for child in rows {
            let parent = child.parent.as_ref().unwrap();
            assert_eq!(parent.id, row.id);
            assert_eq!(parent.table, "data");
        }
    }
}

#[test]
fn nested_repeats_link_to_the_enclosing_table() {
    let row = Flattener::new(&household_form())
        .flatten(&household_submission(9))
        .unwrap();

    let members = row.rows_in_table("members");
    let pets = row.rows_in_table("pets");
    let visits = row.rows_in_table("visits");
    assert_eq!(members.len(), 3);
    assert_eq!(pets.len(), 3);
    assert_eq!(visits.len(), 2);

    for pet in &pets {
        let parent = pet.parent.as_ref().unwrap();
        assert_eq!(parent.table, "members");
        assert!(members.iter().any(|m| m.id == parent.id));
    }
    for visit in &visits {
        assert_eq!(visit.parent.as_ref().unwrap().table, "data");
    }

    // Child ids are unique across every child table of one parent.
    let root_child_ids: HashSet<&BigUint> = row.child_rows().map(|c| &c.id).collect();
    assert_eq!(root_child_ids.len(), 5);

    // Sibling tables are serialized under their own alias.
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["members"].as_array().unwrap().len(), 3);
    assert_eq!(json["visits"].as_array().unwrap().len(), 2);
    assert!(json.get("children").is_none());

    // Member rows without pets still carry an empty list.
    assert!(members[1].children("pets").is_empty());
    assert_eq!(json["members"][1]["pets"], json!([]));
    assert_eq!(pets[0].get("legs"), Some(json!(4)));
    assert_eq!(pets[2].get("legs"), Some(Value::Null));
}

#[test]
fn nested_repeats_of_large_instances_keep_exact_ids() {
    let flattener = Flattener::new(&household_form());

    for instance_id in [100_000i64, 2_000_000_000, i64::MAX] {
        let row = flattener
            .flatten(&household_submission(instance_id))
            .unwrap();

        let member = child_id(instance_id, 1);
        let pet = pairing(&member, 2);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["members"][0]["_id"], id_json(&member));
        assert_eq!(json["members"][0]["pets"][1]["_id"], id_json(&pet));
        assert_eq!(json["members"][0]["pets"][1]["__parent_id"], id_json(&member));

        // The encoded text carries every digit.
        let text = serde_json::to_string(&row).unwrap();
        assert!(text.contains(&format!("\"_id\":{}", pet)));
    }
}

#[test]
fn exports_are_reproducible() {
    let flattener = Flattener::new(&household_form());
    let first = flattener.flatten(&household_submission(9)).unwrap();
    let second = flattener.flatten(&household_submission(9)).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

const LINKAGE: [&str; 3] = ["_id", "__parent_id", "__parent_table"];

type Tables = BTreeMap<String, Vec<Map<String, Value>>>;

/// Load a serialized row and its descendants into flat tables, the way a
/// relational consumer sees them: list values are child tables named by key.
fn load_tables(row: &Value, table: &str, tables: &mut Tables) {
    let mut flat = Map::new();
    for (key, value) in row.as_object().unwrap() {
        match value {
            Value::Array(children) => {
                for child in children {
                    load_tables(child, key, tables);
                }
            }
            other => {
                flat.insert(key.clone(), other.clone());
            }
        }
    }
    tables.entry(table.to_string()).or_default().push(flat);
}

/// Rebuild the nesting of one row by joining on the linkage columns only.
fn nest(table: &str, row: &Map<String, Value>, tables: &Tables) -> Value {
    let mut out = Map::new();
    for (column, value) in row {
        if !LINKAGE.contains(&column.as_str()) {
            out.insert(column.clone(), value.clone());
        }
    }
    for (child_table, rows) in tables {
        let children: Vec<Value> = rows
            .iter()
            .filter(|c| {
                c.get("__parent_table") == Some(&Value::from(table))
                    && c.get("__parent_id") == row.get("_id")
            })
            .map(|c| nest(child_table, c, tables))
            .collect();
        if !children.is_empty() {
            out.insert(child_table.clone(), Value::Array(children));
        }
    }
    Value::Object(out)
}

#[test]
fn linkage_columns_reconstruct_the_original_nesting() {
    let flattener = Flattener::new(&household_form());
    let mut tables = Tables::new();
    for instance_id in [9, 100_000] {
        let row = flattener
            .flatten(&household_submission(instance_id))
            .unwrap();
        load_tables(&serde_json::to_value(&row).unwrap(), "data", &mut tables);
    }

    assert_eq!(tables["data"].len(), 2);
    assert_eq!(tables["members"].len(), 6);
    assert_eq!(tables["pets"].len(), 6);
    assert_eq!(tables["visits"].len(), 4);

    for root in &tables["data"] {
        assert_eq!(
            nest("data", root, &tables),
            json!({
                "village": "Kibera",
                "members": [
                    {
                        "member_name": "Amina",
                        "pets": [
                            {"pet_name": "Simba", "legs": 4},
                            {"pet_name": "Kuku", "legs": 2}
                        ]
                    },
                    {"member_name": "Otieno"},
                    {
                        "member_name": "Wanjiru",
                        "pets": [{"pet_name": "Samaki", "legs": null}]
                    }
                ],
                "visits": [
                    {"visit_date": "2020-02-18"},
                    {"visit_date": "2020-03-01"}
                ]
            })
        );
    }
}
