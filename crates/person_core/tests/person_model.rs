use person_core::{NewPerson, Person, PersonField, PersonValidationError, Projection};
use uuid::Uuid;

#[test]
fn new_person_builder_sets_fields() {
    let person = NewPerson::new("Mario")
        .with_age(32)
        .with_foods(["Pizza", "Pasta"]);

    assert_eq!(person.name, "Mario");
    assert_eq!(person.age, Some(32));
    assert_eq!(person.favorite_foods, vec!["Pizza", "Pasta"]);
    person.validate().unwrap();
}

#[test]
fn validate_rejects_blank_name() {
    let err = NewPerson::new("   ").validate().unwrap_err();
    assert_eq!(err, PersonValidationError::MissingName);
}

#[test]
fn validate_accepts_empty_food_entries() {
    NewPerson::new("Link")
        .with_foods(["Mushroom", "", "Mushroom"])
        .validate()
        .unwrap();
}

#[test]
fn new_person_without_name_decodes_then_fails_validation() {
    let person: NewPerson = serde_json::from_value(serde_json::json!({
        "age": 17,
        "favoriteFoods": ["Mushroom"]
    }))
    .unwrap();

    assert_eq!(person.age, Some(17));
    assert_eq!(
        person.validate().unwrap_err(),
        PersonValidationError::MissingName
    );
}

#[test]
fn person_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let person = Person {
        id,
        name: "Satosh".to_string(),
        age: Some(19),
        favorite_foods: vec!["Chocolate".to_string(), "Banana".to_string()],
    };

    let json = serde_json::to_value(&person).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["name"], "Satosh");
    assert_eq!(json["age"], 19);
    assert_eq!(json["favoriteFoods"], serde_json::json!(["Chocolate", "Banana"]));

    let decoded: Person = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, person);
}

#[test]
fn deserialize_rejects_nil_id() {
    let value = serde_json::json!({
        "id": "00000000-0000-0000-0000-000000000000",
        "name": "ghost",
        "age": null,
        "favoriteFoods": []
    });

    let err = serde_json::from_value::<Person>(value).unwrap_err();
    assert!(
        err.to_string().contains("person id must not be nil"),
        "unexpected error: {err}"
    );
}

#[test]
fn projection_drops_excluded_fields_but_keeps_id() {
    let person = Person {
        id: Uuid::new_v4(),
        name: "Mario".to_string(),
        age: Some(32),
        favorite_foods: vec!["burrito".to_string()],
    };

    let document = person
        .clone()
        .project(&Projection::all().exclude(PersonField::Age));
    assert_eq!(document.id, person.id);
    assert_eq!(document.name.as_deref(), Some("Mario"));
    assert_eq!(document.age, None);
    assert_eq!(document.favorite_foods, Some(person.favorite_foods.clone()));

    let json = serde_json::to_value(&document).unwrap();
    assert!(json.get("age").is_none());
    assert_eq!(json["favoriteFoods"], serde_json::json!(["burrito"]));
}
