//! Converts `schemars` output into the OpenAPI subset Gemini accepts as a
//! `responseSchema`.

use schemars::JsonSchema;
use schemars::schema_for;
use serde_json::{Map, Value, json};

/// Keywords Gemini understands. Anything else is dropped.
const SUPPORTED_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minItems",
    "maxItems",
    "minimum",
    "maximum",
    "anyOf",
];

const SUPPORTED_FORMATS: &[&str] = &["int32", "int64", "float", "double", "enum", "date-time"];

const MAX_DEPTH: usize = 20;

/// Derives a Gemini response schema for `T`.
pub fn response_schema<T: JsonSchema>() -> serde_json::Result<Value> {
    clean_schema(schema_for!(T))
}

pub fn clean_schema<S: serde::Serialize>(root: S) -> serde_json::Result<Value> {
    let mut root_val = serde_json::to_value(root)?;

    let definitions = root_val
        .get("definitions")
        .or_else(|| root_val.get("$defs"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    simplify(&mut root_val, &definitions, 0);
    Ok(root_val)
}

fn simplify(node: &mut Value, definitions: &Map<String, Value>, depth: usize) {
    if depth > MAX_DEPTH {
        *node = json!({ "type": "object", "nullable": true });
        return;
    }

    inline_references(node, definitions);

    // `true` means "anything"; Gemini needs a concrete type.
    if let Value::Bool(allow_all) = *node {
        *node = if allow_all {
            json!({ "type": "string", "nullable": true })
        } else {
            json!({ "type": "object", "nullable": true })
        };
    }

    let Value::Object(map) = node else {
        return;
    };

    // schemars wraps a described $ref as `allOf: [ref]`; fold it back in.
    if let Some(Value::Array(mut parts)) = map.remove("allOf") {
        if parts.len() == 1 {
            let mut inner = parts.remove(0);
            inline_references(&mut inner, definitions);
            if let Value::Object(inner_map) = inner {
                for (key, value) in inner_map {
                    map.entry(key).or_insert(value);
                }
            }
        } else {
            map.insert("anyOf".to_string(), Value::Array(parts));
        }
    }

    map.retain(|key, _| SUPPORTED_KEYS.contains(&key.as_str()));

    if let Some(Value::Array(types)) = map.get("type").cloned() {
        let concrete: Vec<&Value> = types.iter().filter(|t| *t != "null").collect();
        if concrete.len() < types.len() {
            map.insert("nullable".to_string(), Value::Bool(true));
        }
        let first = concrete.first().map(|t| (*t).clone()).unwrap_or(json!("string"));
        map.insert("type".to_string(), first);
    }

    let unsupported_format = map
        .get("format")
        .and_then(Value::as_str)
        .is_some_and(|f| !SUPPORTED_FORMATS.contains(&f));
    if unsupported_format {
        map.remove("format");
    }

    if let Some(Value::Object(props)) = map.get_mut("properties") {
        for value in props.values_mut() {
            simplify(value, definitions, depth + 1);
        }
    }

    if let Some(items) = map.get_mut("items") {
        simplify(items, definitions, depth + 1);
    }

    if let Some(Value::Array(variants)) = map.get_mut("anyOf") {
        for variant in variants.iter_mut() {
            simplify(variant, definitions, depth + 1);
        }
    }
}

/// Replaces a `$ref` node with its definition, following chains of refs.
fn inline_references(node: &mut Value, definitions: &Map<String, Value>) {
    for _ in 0..10 {
        let target = node
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.rsplit('/').next())
            .map(str::to_string);

        let Some(name) = target else {
            return;
        };

        let mut resolved = definitions
            .get(&name)
            .cloned()
            .unwrap_or_else(|| json!({ "type": "object", "description": "Unresolvable reference" }));

        // Keep metadata written next to the ref (e.g. a field description).
        if let (Value::Object(outer), Value::Object(inner)) = (&*node, &mut resolved) {
            for (key, value) in outer {
                if key != "$ref" {
                    inner.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        *node = resolved;
    }
}
