use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use tidal_core::decode::{self, field, int, list, optional, string};
use tidal_core::{decode_json, Decoder, Schema};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Todo {
    user_id: u32,
    id: u32,
    title: String,
    completed: bool,
}

fn todo_schema() -> Schema {
    Schema::object([
        ("userId", Schema::Number),
        ("id", Schema::Number),
        ("title", Schema::String),
        ("completed", Schema::Boolean),
    ])
}

fn todo_payload() -> serde_json::Value {
    json!({"userId": 1, "id": 1, "title": "delectus aut autem", "completed": false})
}

#[test]
fn schema_decoder_yields_typed_value() {
    let decoder = Decoder::<Todo>::from_schema(todo_schema());

    let todo = decoder.decode(&todo_payload()).expect("valid todo");
    assert_eq!(
        todo,
        Todo {
            user_id: 1,
            id: 1,
            title: "delectus aut autem".to_string(),
            completed: false,
        }
    );
}

#[test]
fn schema_decoder_joins_every_field_error_with_newlines() {
    let decoder = Decoder::<Todo>::from_schema(todo_schema());
    let payload = json!({"userId": "1", "id": 1, "completed": "no"});

    let err = decoder.decode(&payload).unwrap_err();
    let lines = err.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with(r#"Invalid value "1" supplied to : {"#));
    assert!(lines[0].ends_with("/userId: number"));
    assert!(lines[1].starts_with("Invalid value undefined"));
    assert!(lines[1].ends_with("/title: string"));
    assert!(lines[2].ends_with("/completed: boolean"));
}

#[test]
fn string_schema_against_object_mentions_string() {
    let decoder = Decoder::<String>::from_schema(Schema::String);

    let err = decoder.decode(&todo_payload()).unwrap_err();
    assert_eq!(
        err,
        r#"Invalid value {"userId":1,"id":1,"title":"delectus aut autem","completed":false} supplied to : string"#
    );
}

#[test]
fn serde_decoder_reports_serde_message() {
    let decoder = Decoder::<String>::from_type();

    let err = decoder.decode(&todo_payload()).unwrap_err();
    assert!(err.contains("string"), "{err}");
    assert_eq!(decoder.decode(&json!("hi")), Ok("hi".to_string()));
}

#[test]
fn decoding_is_deterministic() {
    let decoders = [
        Decoder::<Todo>::from_schema(todo_schema()).map(|todo| todo.title),
        Decoder::<String>::from_schema(Schema::String),
        field("title", string()),
    ];
    let inputs = [todo_payload(), json!("text"), json!(null), json!([1, 2])];

    for decoder in &decoders {
        for input in &inputs {
            assert_eq!(decoder.decode(input), decoder.decode(input));
        }
    }
}

#[test]
fn combinators_compose_into_record_decoders() {
    let title = field("title", string());
    let ids = field("ids", list(int()));
    let note = field("note", optional(string()));
    let payload = json!({"title": "t", "ids": [3, 1, 2], "note": null});

    assert_eq!(title.decode(&payload), Ok("t".to_string()));
    assert_eq!(ids.decode(&payload), Ok(vec![3, 1, 2]));
    assert_eq!(note.decode(&payload), Ok(None));
    assert_eq!(decode_json(&decode::value(), &payload), Ok(payload.clone()));

    let err = ids.decode(&json!({"ids": [1, "x"]})).unwrap_err();
    assert_eq!(
        err,
        r#"field "ids": index 1: Invalid value "x" supplied to : Integer"#
    );
}

#[test]
fn and_then_can_reject_decoded_values() {
    let positive = int().and_then(|n| {
        if n > 0 {
            Ok(n as u64)
        } else {
            Err(format!("expected a positive number, got {n}"))
        }
    });

    assert_eq!(positive.decode(&json!(5)), Ok(5));
    assert_eq!(
        positive.decode(&json!(-1)),
        Err("expected a positive number, got -1".to_string())
    );
}
