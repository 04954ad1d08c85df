//! Prototype classes
//!
//! A [`Class`] is a named, mutable method table shared by every instance it
//! allocates. Instances resolve fields they do not hold themselves through
//! their class table, one level deep.
//!
//! Variants are snapshots: [`Class::make_variant`] copies the ancestor's
//! table at creation time and keeps no link to it afterwards. Copies are
//! shallow, so shared values (lists, maps, instances) are shared by both
//! tables.

use crate::error::{RuntimeError, RuntimeResult};
use crate::instance::Instance;
use crate::value::{Method, Value};
use peerbind_collections::List;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Key under which an instance exposes its class name
pub const NAME_FIELD: &str = "__name";

/// Type-tag key
pub const CLASS_FIELD: &str = "__class";

/// Keys that can never be stored in a class table or in instance fields
pub const RESERVED_FIELDS: [&str; 2] = [NAME_FIELD, CLASS_FIELD];

/// Hook run on every freshly allocated instance
pub type Initializer = dyn Fn(&Instance);

pub(crate) fn check_field_name(key: &str) -> RuntimeResult<()> {
    if RESERVED_FIELDS.contains(&key) {
        return Err(RuntimeError::ReservedField(key.to_string()));
    }
    Ok(())
}

/// Class descriptor (shared handle)
///
/// Cloning a `Class` clones the handle, not the table: both handles see the
/// same fields. Use [`Class::make_variant`] for an independent copy.
#[derive(Clone)]
pub struct Class {
    inner: Rc<ClassInner>,
}

struct ClassInner {
    name: String,
    table: RefCell<FxHashMap<String, Value>>,
    initializer: Option<Rc<Initializer>>,
}

impl Class {
    /// Create an empty class
    pub fn make(name: impl Into<String>) -> Self {
        Self::from_parts(name.into(), FxHashMap::default(), None)
    }

    /// Create a class whose table starts as a copy of `ancestor`'s
    pub fn make_variant(name: impl Into<String>, ancestor: &Class) -> Self {
        let name = name.into();
        debug!(class = %name, ancestor = %ancestor.name(), "creating variant");
        Self::from_parts(
            name,
            ancestor.snapshot_table(),
            ancestor.inner.initializer.clone(),
        )
    }

    /// Start building a class
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    fn from_parts(
        name: String,
        table: FxHashMap<String, Value>,
        initializer: Option<Rc<Initializer>>,
    ) -> Self {
        debug!(class = %name, fields = table.len(), "class created");
        Self {
            inner: Rc::new(ClassInner {
                name,
                table: RefCell::new(table),
                initializer,
            }),
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Allocate a fresh instance tagged with this class
    pub fn make_instance(&self) -> Instance {
        let instance = Instance::new(self.clone());
        if let Some(init) = &self.inner.initializer {
            init(&instance);
        }
        instance
    }

    /// Store a value in the class table, returning the one it replaced
    pub fn set_field(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> RuntimeResult<Option<Value>> {
        let key = key.into();
        check_field_name(&key)?;
        Ok(self.inner.table.borrow_mut().insert(key, value.into()))
    }

    /// Store a native method under `name`
    #[track_caller]
    pub fn define_method<F>(
        &self,
        name: &str,
        arity: usize,
        body: F,
    ) -> RuntimeResult<Option<Value>>
    where
        F: Fn(&Instance, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        self.set_field(name, Method::new(name, arity, body))
    }

    /// Look up a value in the class table
    pub fn field(&self, key: &str) -> Option<Value> {
        self.inner.table.borrow().get(key).cloned()
    }

    /// Check if the class table holds `key`
    pub fn has_field(&self, key: &str) -> bool {
        self.inner.table.borrow().contains_key(key)
    }

    /// Remove a value from the class table
    pub fn remove_field(&self, key: &str) -> Option<Value> {
        self.inner.table.borrow_mut().remove(key)
    }

    /// Sorted names of every field in the class table
    pub fn field_names(&self) -> List<String> {
        let mut names: List<String> = self.inner.table.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of fields in the class table
    pub fn field_count(&self) -> usize {
        self.inner.table.borrow().len()
    }

    /// Check if both handles refer to the same class
    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn snapshot_table(&self) -> FxHashMap<String, Value> {
        self.inner
            .table
            .borrow()
            .iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// One-line summary of the class for diagnostics
    ///
    /// Lists every field in key order as `data` or
    /// `method/<arity> @ <file>:<line>`.
    pub fn describe(&self) -> String {
        let table = self.inner.table.borrow();
        let mut keys: Vec<&String> = table.keys().collect();
        keys.sort();

        let fields: Vec<String> = keys
            .into_iter()
            .map(|key| match &table[key] {
                Value::Method(m) => format!(
                    "{}: method/{} @ {}:{}",
                    key,
                    m.arity(),
                    m.site().file(),
                    m.site().line()
                ),
                _ => format!("{}: data", key),
            })
            .collect();

        if fields.is_empty() {
            format!("{} {{}}", self.inner.name)
        } else {
            format!("{} {{ {} }}", self.inner.name, fields.join(", "))
        }
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Builder for classes with fields, methods and an initializer
pub struct ClassBuilder {
    name: String,
    table: FxHashMap<String, Value>,
    initializer: Option<Rc<Initializer>>,
    error: Option<RuntimeError>,
}

impl ClassBuilder {
    /// Create a builder for a class called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: FxHashMap::default(),
            initializer: None,
            error: None,
        }
    }

    /// Copy every field (and the initializer) of `ancestor`
    ///
    /// Entries set explicitly on the builder win over copied ones,
    /// whichever order the calls are made in.
    pub fn variant_of(mut self, ancestor: &Class) -> Self {
        for (key, value) in ancestor.snapshot_table() {
            self.table.entry(key).or_insert(value);
        }
        if self.initializer.is_none() {
            self.initializer = ancestor.inner.initializer.clone();
        }
        self
    }

    /// Add a data field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        match check_field_name(&key) {
            Ok(()) => {
                self.table.insert(key, value.into());
            }
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Add a native method
    #[track_caller]
    pub fn method<F>(self, name: &str, arity: usize, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        let method = Method::new(name, arity, body);
        self.field(name, method)
    }

    /// Run `init` on every instance the class allocates
    pub fn initializer<F>(mut self, init: F) -> Self
    where
        F: Fn(&Instance) + 'static,
    {
        self.initializer = Some(Rc::new(init));
        self
    }

    /// Finish the class
    ///
    /// Fails with the first error recorded while building, e.g. a reserved
    /// field name.
    pub fn build(self) -> RuntimeResult<Class> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(Class::from_parts(self.name, self.table, self.initializer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_creation() {
        let class = Class::make("Point");
        assert_eq!(class.name(), "Point");
        assert_eq!(class.field_count(), 0);
    }

    #[test]
    fn test_class_table_operations() {
        let class = Class::make("Point");
        assert_eq!(class.set_field("x", 1), Ok(None));
        assert_eq!(class.set_field("x", 2), Ok(Some(Value::Int(1))));
        assert!(class.has_field("x"));
        assert_eq!(class.field("x"), Some(Value::Int(2)));
        assert_eq!(class.remove_field("x"), Some(Value::Int(2)));
        assert!(!class.has_field("x"));
    }

    #[test]
    fn test_reserved_fields_rejected() {
        let class = Class::make("Point");
        assert_eq!(
            class.set_field(NAME_FIELD, "other"),
            Err(RuntimeError::ReservedField(NAME_FIELD.to_string()))
        );
        assert!(Class::builder("Bad").field(CLASS_FIELD, 1).build().is_err());
    }

    #[test]
    fn test_clone_shares_table() {
        let class = Class::make("Shared");
        let handle = class.clone();
        handle.set_field("k", true).unwrap();
        assert_eq!(class.field("k"), Some(Value::Bool(true)));
        assert_eq!(class, handle);
    }

    #[test]
    fn test_variant_is_snapshot() {
        let base = Class::make("Base");
        base.set_field("color", "red").unwrap();

        let variant = Class::make_variant("Variant", &base);
        assert_eq!(variant.name(), "Variant");
        assert_eq!(variant.field("color"), Some(Value::str("red")));

        base.set_field("color", "blue").unwrap();
        base.set_field("added", 1).unwrap();
        variant.set_field("own", 2).unwrap();

        assert_eq!(variant.field("color"), Some(Value::str("red")));
        assert!(!variant.has_field("added"));
        assert!(!base.has_field("own"));
    }

    #[test]
    fn test_builder_variant_keeps_explicit_fields() {
        let base = Class::builder("Base")
            .field("width", 1)
            .field("height", 1)
            .build()
            .unwrap();
        let wide = Class::builder("Wide")
            .field("width", 10)
            .variant_of(&base)
            .build()
            .unwrap();

        assert_eq!(wide.field("width"), Some(Value::Int(10)));
        assert_eq!(wide.field("height"), Some(Value::Int(1)));
    }

    #[test]
    fn test_initializer_runs_per_instance() {
        let class = Class::builder("Counter")
            .initializer(|instance| {
                instance.set("count", 0).unwrap();
            })
            .build()
            .unwrap();

        let a = class.make_instance();
        let b = class.make_instance();
        a.set("count", 5).unwrap();
        assert_eq!(a.get("count"), Some(Value::Int(5)));
        assert_eq!(b.get("count"), Some(Value::Int(0)));
    }

    #[test]
    fn test_variant_copies_initializer() {
        let base = Class::builder("Base")
            .initializer(|instance| {
                instance.set("ready", true).unwrap();
            })
            .build()
            .unwrap();
        let variant = Class::make_variant("Variant", &base);
        assert_eq!(variant.make_instance().get("ready"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_field_names_sorted() {
        let class = Class::builder("Tuple")
            .field("b", 1)
            .field("a", 2)
            .field("c", 3)
            .build()
            .unwrap();
        assert_eq!(class.field_names().as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn test_describe() {
        let class = Class::builder("Label")
            .field("text", "hi")
            .method("draw", 2, |_, _| Ok(Value::Nil))
            .build()
            .unwrap();

        let description = class.describe();
        assert!(description.starts_with("Label { draw: method/2 @ "));
        assert!(description.contains(file!()));
        assert!(description.ends_with("text: data }"));
        assert_eq!(Class::make("Empty").describe(), "Empty {}");
    }
}
