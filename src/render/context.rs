//! Render context: template variables, entity references and explicit query arguments.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tera::Context as TeraContext;

/// Key marking a JSON object as an entity reference in context files.
pub const ENTITY_MARKER: &str = "$entity";

/// Context key holding explicit query arguments supplied by routes or blocks.
pub const ARGUMENTS_KEY: &str = "graphql_arguments";

/// A reference to a content entity.
///
/// Templates see the entity's fields plus `id` and `entity_type`; query arguments
/// only ever see its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub id: Value,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl EntityRef {
    /// Reference to entity `id` of `entity_type`.
    pub fn new(entity_type: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Add a field visible to templates.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    fn template_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert("id".to_string(), self.id.clone());
        object.insert("entity_type".to_string(), Value::String(self.entity_type.clone()));
        Value::Object(object)
    }

    /// Parse `{"$entity": "<type>", "id": ..., ...fields}`.
    fn from_marked(object: &Map<String, Value>) -> Option<Self> {
        let entity_type = object.get(ENTITY_MARKER)?.as_str()?.to_string();
        let id = object.get("id").cloned().unwrap_or(Value::Null);
        let fields = object
            .iter()
            .filter(|(key, _)| key.as_str() != ENTITY_MARKER && key.as_str() != "id")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self {
            entity_type,
            id,
            fields,
        })
    }
}

/// One top-level context variable.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Plain(Value),
    Entity(EntityRef),
}

impl ContextValue {
    /// The value as a query argument: entities collapse to their id.
    #[must_use]
    pub fn argument_value(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Entity(entity) => entity.id.clone(),
        }
    }

    /// The value as templates see it.
    #[must_use]
    pub fn template_value(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Entity(entity) => entity.template_value(),
        }
    }
}

/// Variables of one template render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderContext {
    values: BTreeMap<String, ContextValue>,
    arguments: Map<String, Value>,
}

impl RenderContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object.
    ///
    /// Top-level objects carrying an `$entity` key become [`EntityRef`]s and a
    /// `graphql_arguments` object becomes the explicit query arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object or `graphql_arguments` is not an
    /// object.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(object) = value else {
            bail!("Render context must be a JSON object");
        };

        let mut context = Self::new();
        for (name, value) in object {
            if name == ARGUMENTS_KEY {
                let Value::Object(arguments) = value else {
                    bail!("'{ARGUMENTS_KEY}' must be a JSON object");
                };
                context.arguments = arguments;
                continue;
            }

            let entity = match &value {
                Value::Object(fields) => EntityRef::from_marked(fields),
                _ => None,
            };
            match entity {
                Some(entity) => context.insert_entity(name, entity),
                None => context.insert(name, value),
            }
        }
        Ok(context)
    }

    /// Set template variable `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), ContextValue::Plain(value.into()));
    }

    /// Set template variable `name` to an entity reference.
    pub fn insert_entity(&mut self, name: impl Into<String>, entity: EntityRef) {
        self.values.insert(name.into(), ContextValue::Entity(entity));
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder form of [`Self::insert_entity`].
    #[must_use]
    pub fn with_entity(mut self, name: impl Into<String>, entity: EntityRef) -> Self {
        self.insert_entity(name, entity);
        self
    }

    /// Set an explicit query argument.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// The value of template variable `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.values.get(name)
    }

    /// `true` if template variable `name` is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Explicit query arguments.
    #[must_use]
    pub const fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// Tera context with every variable, entities expanded to their fields.
    #[must_use]
    pub fn to_tera(&self) -> TeraContext {
        let mut context = TeraContext::new();
        for (name, value) in &self.values {
            context.insert(name.as_str(), &value.template_value());
        }
        if !self.arguments.is_empty() {
            context.insert(ARGUMENTS_KEY, &self.arguments);
        }
        context
    }
}
