//! Per-type property tables

use crate::errors::Result;
use crate::typer::PropertyTyper;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// Reads a property off an entity
pub type Getter<E> = fn(&E) -> Value;

/// Writes a property onto an entity, converting the value as needed
pub type Setter<E> = fn(&mut E, Value) -> Result<()>;

/// A declared property: name, getter and optional setter
pub struct Property<E> {
    name: &'static str,
    getter: Getter<E>,
    setter: Option<Setter<E>>,
}

impl<E> Property<E> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, entity: &E) -> Value {
        (self.getter)(entity)
    }

    pub fn setter(&self) -> Option<Setter<E>> {
        self.setter
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }
}

impl<E> fmt::Debug for Property<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("has_setter", &self.has_setter())
            .finish()
    }
}

/// Everything the mapping layer knows about an entity type
///
/// Built once per type and handed out as a `&'static` reference from
/// [`Entity::descriptor`](crate::entity::Entity::descriptor).
///
/// # Example
///
/// ```
/// use rowkeeper_core::entity::EntityDescriptor;
/// use rowkeeper_core::typer::IntegerTyper;
/// use rowkeeper_core::value::Value;
///
/// #[derive(Default)]
/// struct Tag {
///     id: Option<i64>,
///     label: String,
/// }
///
/// let descriptor = EntityDescriptor::<Tag>::builder("Tag")
///     .property("id", |t: &Tag| t.id.into(), Some(|t: &mut Tag, v: Value| {
///         t.id = v.into_opt()?;
///         Ok(())
///     }))
///     .property("label", |t: &Tag| t.label.clone().into(), None)
///     .typed("id", IntegerTyper)
///     .build();
///
/// assert_eq!(descriptor.property_names().collect::<Vec<_>>(), vec!["id", "label"]);
/// assert!(descriptor.typer("id").is_some());
/// ```
pub struct EntityDescriptor<E> {
    name: &'static str,
    properties: Vec<Property<E>>,
    typers: HashMap<&'static str, Box<dyn PropertyTyper>>,
}

impl<E> EntityDescriptor<E> {
    pub fn builder(name: &'static str) -> EntityDescriptorBuilder<E> {
        EntityDescriptorBuilder {
            descriptor: EntityDescriptor {
                name,
                properties: Vec::new(),
                typers: HashMap::new(),
            },
        }
    }

    /// Entity name used in error messages
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn property(&self, name: &str) -> Option<&Property<E>> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property<E>> {
        self.properties.iter()
    }

    pub fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(|p| p.name)
    }

    pub fn typer(&self, property: &str) -> Option<&dyn PropertyTyper> {
        self.typers.get(property).map(|t| t.as_ref())
    }

    pub fn has_typed_properties(&self) -> bool {
        !self.typers.is_empty()
    }
}

impl<E> fmt::Debug for EntityDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("typers", &self.typers)
            .finish()
    }
}

pub struct EntityDescriptorBuilder<E> {
    descriptor: EntityDescriptor<E>,
}

impl<E> EntityDescriptorBuilder<E> {
    /// Declare a property; a later declaration with the same name replaces it
    pub fn property(
        mut self,
        name: &'static str,
        getter: Getter<E>,
        setter: Option<Setter<E>>,
    ) -> Self {
        let property = Property {
            name,
            getter,
            setter,
        };
        let properties = &mut self.descriptor.properties;
        match properties.iter().position(|p| p.name == name) {
            Some(index) => properties[index] = property,
            None => properties.push(property),
        }
        self
    }

    /// Attach a typer to a property
    pub fn typed(mut self, name: &'static str, typer: impl PropertyTyper + 'static) -> Self {
        self.descriptor.typers.insert(name, Box::new(typer));
        self
    }

    pub fn build(self) -> EntityDescriptor<E> {
        self.descriptor
    }
}
