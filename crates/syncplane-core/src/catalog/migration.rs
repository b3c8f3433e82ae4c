//! Type vocabulary migration between protocol v0 and v1 JSON schemas.
//!
//! Protocol v0 declares primitive types inline (`type`, `format`, `airbyte_type`,
//! `contentEncoding`); v1 replaces them with references into `WellKnownTypes.json`.
//! Both transforms only rewrite type declarations and keep every other key of a schema node.

use serde_json::{json, Map, Value as JsonValue};

use super::model::CatalogDocument;
use crate::error::AppError;

const WELL_KNOWN_TYPES_PREFIX: &str = "WellKnownTypes.json#/definitions/";
const REF_KEY: &str = "$ref";
const TYPE_KEY: &str = "type";
const FORMAT_KEY: &str = "format";
const AIRBYTE_TYPE_KEY: &str = "airbyte_type";
const CONTENT_ENCODING_KEY: &str = "contentEncoding";
const COMPOSITION_KEYS: [&str; 3] = ["oneOf", "anyOf", "allOf"];

crate::stored_enum! {
    /// Which transform runs on catalogs read from the store.
    pub enum CatalogMigrationMode {
        Downgrade => "downgrade",
        Upgrade => "upgrade",
        Disabled => "disabled",
    }
}

impl Default for CatalogMigrationMode {
    fn default() -> Self {
        CatalogMigrationMode::Downgrade
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WellKnownType {
    String,
    BinaryData,
    Boolean,
    Date,
    TimestampWithTimezone,
    TimestampWithoutTimezone,
    TimeWithTimezone,
    TimeWithoutTimezone,
    Number,
    Integer,
}

impl WellKnownType {
    const ALL: [WellKnownType; 10] = [
        WellKnownType::String,
        WellKnownType::BinaryData,
        WellKnownType::Boolean,
        WellKnownType::Date,
        WellKnownType::TimestampWithTimezone,
        WellKnownType::TimestampWithoutTimezone,
        WellKnownType::TimeWithTimezone,
        WellKnownType::TimeWithoutTimezone,
        WellKnownType::Number,
        WellKnownType::Integer,
    ];

    fn definition_name(self) -> &'static str {
        match self {
            WellKnownType::String => "String",
            WellKnownType::BinaryData => "BinaryData",
            WellKnownType::Boolean => "Boolean",
            WellKnownType::Date => "Date",
            WellKnownType::TimestampWithTimezone => "TimestampWithTimezone",
            WellKnownType::TimestampWithoutTimezone => "TimestampWithoutTimezone",
            WellKnownType::TimeWithTimezone => "TimeWithTimezone",
            WellKnownType::TimeWithoutTimezone => "TimeWithoutTimezone",
            WellKnownType::Number => "Number",
            WellKnownType::Integer => "Integer",
        }
    }

    fn reference(self) -> String {
        format!("{}{}", WELL_KNOWN_TYPES_PREFIX, self.definition_name())
    }

    fn from_reference(reference: &str) -> Result<Option<Self>, AppError> {
        let Some(name) = reference.strip_prefix(WELL_KNOWN_TYPES_PREFIX) else {
            return Ok(None);
        };
        Self::ALL
            .into_iter()
            .find(|t| t.definition_name() == name)
            .map(Some)
            .ok_or_else(|| {
                AppError::CatalogValidation(format!("unknown well-known type reference '{}'", reference))
            })
    }

    /// Inline protocol v0 declaration.
    fn v0_declaration(self) -> Map<String, JsonValue> {
        let value = match self {
            WellKnownType::String => json!({"type": "string"}),
            WellKnownType::BinaryData => json!({"type": "string", "contentEncoding": "base64"}),
            WellKnownType::Boolean => json!({"type": "boolean"}),
            WellKnownType::Date => json!({"type": "string", "format": "date"}),
            WellKnownType::TimestampWithTimezone => json!({
                "type": "string",
                "format": "date-time",
                "airbyte_type": "timestamp_with_timezone"
            }),
            WellKnownType::TimestampWithoutTimezone => json!({
                "type": "string",
                "format": "date-time",
                "airbyte_type": "timestamp_without_timezone"
            }),
            WellKnownType::TimeWithTimezone => json!({
                "type": "string",
                "format": "time",
                "airbyte_type": "time_with_timezone"
            }),
            WellKnownType::TimeWithoutTimezone => json!({
                "type": "string",
                "format": "time",
                "airbyte_type": "time_without_timezone"
            }),
            WellKnownType::Number => json!({"type": "number"}),
            WellKnownType::Integer => json!({"type": "number", "airbyte_type": "integer"}),
        };
        match value {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Recognises a single primitive v0 type name together with its qualifiers on `node`.
    /// Returns the type and the qualifier keys it consumed.
    fn from_v0(type_name: &str, node: &Map<String, JsonValue>) -> Option<(Self, Vec<&'static str>)> {
        let qualifier = |key: &str| node.get(key).and_then(JsonValue::as_str);
        match type_name {
            "string" => {
                if qualifier(CONTENT_ENCODING_KEY) == Some("base64") {
                    return Some((WellKnownType::BinaryData, vec![CONTENT_ENCODING_KEY]));
                }
                let airbyte_type = qualifier(AIRBYTE_TYPE_KEY);
                let consumed = vec![FORMAT_KEY, AIRBYTE_TYPE_KEY];
                match qualifier(FORMAT_KEY) {
                    Some("date") => Some((WellKnownType::Date, consumed)),
                    Some("date-time") if airbyte_type == Some("timestamp_without_timezone") => {
                        Some((WellKnownType::TimestampWithoutTimezone, consumed))
                    }
                    Some("date-time") => Some((WellKnownType::TimestampWithTimezone, consumed)),
                    Some("time") if airbyte_type == Some("time_without_timezone") => {
                        Some((WellKnownType::TimeWithoutTimezone, consumed))
                    }
                    Some("time") => Some((WellKnownType::TimeWithTimezone, consumed)),
                    _ => Some((WellKnownType::String, vec![])),
                }
            }
            "boolean" => Some((WellKnownType::Boolean, vec![])),
            "integer" => Some((WellKnownType::Integer, vec![AIRBYTE_TYPE_KEY])),
            "number" if qualifier(AIRBYTE_TYPE_KEY) == Some("integer") => {
                Some((WellKnownType::Integer, vec![AIRBYTE_TYPE_KEY]))
            }
            "number" => Some((WellKnownType::Number, vec![])),
            _ => None,
        }
    }
}

fn ref_node(t: WellKnownType) -> JsonValue {
    json!({ "$ref": t.reference() })
}

/// Applies `f` to every direct sub-schema of `node`.
fn for_each_subschema(
    node: &mut Map<String, JsonValue>,
    f: &mut dyn FnMut(&mut JsonValue) -> Result<(), AppError>,
) -> Result<(), AppError> {
    for key in ["properties", "patternProperties"] {
        if let Some(JsonValue::Object(children)) = node.get_mut(key) {
            for child in children.values_mut() {
                f(child)?;
            }
        }
    }
    for key in ["additionalProperties", "not"] {
        if let Some(child) = node.get_mut(key) {
            if child.is_object() {
                f(child)?;
            }
        }
    }
    // Keywords holding either one schema or a list of schemas
    for key in ["items", "additionalItems", "contains"] {
        match node.get_mut(key) {
            Some(child @ JsonValue::Object(_)) => f(child)?,
            Some(JsonValue::Array(children)) => {
                for child in children {
                    f(child)?;
                }
            }
            _ => {}
        }
    }
    for key in COMPOSITION_KEYS {
        if let Some(JsonValue::Array(options)) = node.get_mut(key) {
            for option in options {
                f(option)?;
            }
        }
    }
    Ok(())
}

/// Rewrites v1 well-known type references into inline v0 declarations.
pub fn downgrade_schema(schema: &JsonValue) -> Result<JsonValue, AppError> {
    let mut out = schema.clone();
    downgrade_node(&mut out)?;
    Ok(out)
}

fn downgrade_node(value: &mut JsonValue) -> Result<(), AppError> {
    let JsonValue::Object(node) = value else {
        return Ok(());
    };

    let well_known = match node.get(REF_KEY).and_then(JsonValue::as_str) {
        Some(reference) => WellKnownType::from_reference(reference)?,
        None => None,
    };
    if let Some(t) = well_known {
        node.remove(REF_KEY);
        for (key, v) in t.v0_declaration() {
            node.insert(key, v);
        }
    }

    // oneOf over plain primitives collapses back into a v0 type list
    let collapsed = match node.get("oneOf") {
        Some(options) => collapsible_one_of(options)?,
        None => None,
    };
    if let Some(types) = collapsed {
        node.remove("oneOf");
        node.insert(TYPE_KEY.to_string(), JsonValue::Array(types));
    }

    for_each_subschema(node, &mut downgrade_node)
}

fn collapsible_one_of(options: &JsonValue) -> Result<Option<Vec<JsonValue>>, AppError> {
    let JsonValue::Array(options) = options else {
        return Ok(None);
    };
    if options.is_empty() {
        return Ok(None);
    }

    let mut types = Vec::with_capacity(options.len());
    for option in options {
        let Some(obj) = option.as_object() else {
            return Ok(None);
        };
        if obj.len() != 1 {
            return Ok(None);
        }
        let Some(t) = obj
            .get(REF_KEY)
            .and_then(JsonValue::as_str)
            .map(WellKnownType::from_reference)
            .transpose()?
            .flatten()
        else {
            return Ok(None);
        };
        let declaration = t.v0_declaration();
        if declaration.len() != 1 {
            return Ok(None);
        }
        if let Some(type_name) = declaration.get(TYPE_KEY) {
            if !types.contains(type_name) {
                types.push(type_name.clone());
            }
        }
    }
    Ok(Some(types))
}

/// Rewrites inline v0 primitive declarations into v1 well-known type references.
pub fn upgrade_schema(schema: &JsonValue) -> Result<JsonValue, AppError> {
    let mut out = schema.clone();
    upgrade_node(&mut out)?;
    Ok(out)
}

fn upgrade_node(value: &mut JsonValue) -> Result<(), AppError> {
    let JsonValue::Object(node) = value else {
        return Ok(());
    };

    match node.get(TYPE_KEY).cloned() {
        Some(JsonValue::String(type_name)) => {
            if let Some((t, consumed)) = WellKnownType::from_v0(&type_name, node) {
                strip_v0_keys(node, &consumed);
                node.insert(REF_KEY.to_string(), JsonValue::String(t.reference()));
            }
        }
        Some(JsonValue::Array(type_names)) => {
            let names: Vec<&str> = type_names
                .iter()
                .filter_map(JsonValue::as_str)
                .filter(|name| *name != "null")
                .collect();
            let resolved: Option<Vec<(WellKnownType, Vec<&'static str>)>> = names
                .iter()
                .map(|name| WellKnownType::from_v0(name, node))
                .collect();
            // Arrays mixing primitives with object/array types are left as they are
            if let Some(resolved) = resolved.filter(|r| !r.is_empty()) {
                let consumed: Vec<&'static str> =
                    resolved.iter().flat_map(|(_, c)| c.iter().copied()).collect();
                strip_v0_keys(node, &consumed);
                if let [(t, _)] = resolved.as_slice() {
                    node.insert(REF_KEY.to_string(), JsonValue::String(t.reference()));
                } else {
                    let mut options: Vec<JsonValue> = Vec::with_capacity(resolved.len());
                    for (t, _) in &resolved {
                        let option = ref_node(*t);
                        if !options.contains(&option) {
                            options.push(option);
                        }
                    }
                    node.insert("oneOf".to_string(), JsonValue::Array(options));
                }
            }
        }
        _ => {}
    }

    for_each_subschema(node, &mut upgrade_node)
}

fn strip_v0_keys(node: &mut Map<String, JsonValue>, consumed: &[&str]) {
    node.remove(TYPE_KEY);
    for key in consumed {
        node.remove(*key);
    }
}

fn contains_v1_types(value: &JsonValue) -> bool {
    match value {
        JsonValue::Object(node) => {
            let is_ref = node
                .get(REF_KEY)
                .and_then(JsonValue::as_str)
                .is_some_and(|r| r.starts_with(WELL_KNOWN_TYPES_PREFIX));
            is_ref || node.values().any(contains_v1_types)
        }
        JsonValue::Array(items) => items.iter().any(contains_v1_types),
        _ => false,
    }
}

fn contains_v0_types(value: &JsonValue) -> bool {
    match value {
        JsonValue::Object(node) => {
            let declares_primitive = match node.get(TYPE_KEY) {
                Some(JsonValue::String(name)) => WellKnownType::from_v0(name, node).is_some(),
                Some(JsonValue::Array(names)) => names
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .any(|name| name != "null" && WellKnownType::from_v0(name, node).is_some()),
                _ => false,
            };
            declares_primitive || node.values().any(contains_v0_types)
        }
        JsonValue::Array(items) => items.iter().any(contains_v0_types),
        _ => false,
    }
}

fn migrate_schemas<C: CatalogDocument>(
    mut catalog: C,
    transform: fn(&JsonValue) -> Result<JsonValue, AppError>,
) -> Result<C, AppError> {
    // Transform into a fresh vector first so a failure never leaves a half-migrated catalog
    let migrated: Vec<JsonValue> = catalog
        .schemas()
        .map(transform)
        .collect::<Result<_, _>>()?;
    for (slot, schema) in catalog.schemas_mut().zip(migrated) {
        *slot = schema;
    }
    Ok(catalog)
}

/// Downgrades every stream schema when the catalog carries any v1 type reference.
pub fn downgrade_catalog_if_needed<C: CatalogDocument>(catalog: C) -> Result<C, AppError> {
    if !catalog.schemas().any(contains_v1_types) {
        return Ok(catalog);
    }
    tracing::debug!(kind = C::KIND, "downgrading catalog schemas to protocol v0");
    migrate_schemas(catalog, downgrade_schema)
}

/// Upgrades every stream schema when the catalog carries any v0 primitive declaration.
pub fn upgrade_catalog_if_needed<C: CatalogDocument>(catalog: C) -> Result<C, AppError> {
    if !catalog.schemas().any(contains_v0_types) {
        return Ok(catalog);
    }
    tracing::debug!(kind = C::KIND, "upgrading catalog schemas to protocol v1");
    migrate_schemas(catalog, upgrade_schema)
}

/// Runs the transform selected by `mode`.
pub fn migrate_catalog<C: CatalogDocument>(
    mode: CatalogMigrationMode,
    catalog: C,
) -> Result<C, AppError> {
    match mode {
        CatalogMigrationMode::Downgrade => downgrade_catalog_if_needed(catalog),
        CatalogMigrationMode::Upgrade => upgrade_catalog_if_needed(catalog),
        CatalogMigrationMode::Disabled => Ok(catalog),
    }
}
