//! Testing utilities for the fieldlock workspace
//!
//! Shared fixtures, generators, and store setups.

#![allow(missing_docs)]

use fieldlock_document::FieldPath;
use fieldlock_ownership::{OwnershipMap, UserId};
use fieldlock_store::{
    DocumentStore, InMemoryRepository, ProjectMembers, StaticAccessDirectory, StepKey,
    StepRepository, StoreConfig,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

pub const PROJECT: &str = "workbook-demo";
pub const AUTHOR: &str = "ada";
pub const MEMBER_A: &str = "grace";
pub const MEMBER_B: &str = "linus";
pub const OUTSIDER: &str = "mallory";

pub fn user(id: &str) -> UserId {
    UserId::from(id)
}

pub fn path(rendered: &str) -> FieldPath {
    rendered.parse().unwrap()
}

pub fn step(number: u32) -> StepKey {
    StepKey::new(PROJECT, number)
}

pub fn ownership(entries: &[(&str, &str)]) -> OwnershipMap {
    entries
        .iter()
        .map(|(p, u)| ((*p).to_string(), user(u)))
        .collect()
}

/// A persona step as a team would fill it in
pub fn persona_step() -> Value {
    json!({
        "personaName": "Budget-conscious parent",
        "age": 38,
        "goals": ["save time", "eat well"],
        "channels": {"primary": "Instagram", "secondary": ""},
        "budget": {"lines": [{"label": "Ads", "amount": 1200}]}
    })
}

/// Membership table for [`PROJECT`]: author plus two members
pub fn team_directory() -> StaticAccessDirectory {
    let directory = StaticAccessDirectory::new();
    directory.register(
        PROJECT,
        ProjectMembers::new(AUTHOR)
            .with_member(MEMBER_A)
            .with_member(MEMBER_B),
    );
    directory
}

pub fn setup_store_with(repository: Arc<dyn StepRepository>, config: StoreConfig) -> DocumentStore {
    DocumentStore::new(repository, Arc::new(team_directory()), config)
}

pub fn setup_store() -> (DocumentStore, Arc<InMemoryRepository>) {
    let repository = Arc::new(InMemoryRepository::new());
    let store = setup_store_with(repository.clone(), StoreConfig::new());
    (store, repository)
}

/// Arbitrary JSON documents, keys may be reserved
pub fn arb_document() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1000.0f64..1000.0).prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("_?[a-z]{1,6}", inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Arbitrary record-rooted documents without a top-level metadata key
pub fn arb_content() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,6}", arb_document(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// Arbitrary ownership maps, possibly empty
pub fn arb_ownership() -> impl Strategy<Value = OwnershipMap> {
    prop::collection::btree_map("[a-z]{1,4}(\\[[0-9]\\])?(\\.[a-z]{1,4})?", "u[0-9]", 0..6)
        .prop_map(|m| m.into_iter().map(|(p, u)| (p, UserId::from(u))).collect())
}
