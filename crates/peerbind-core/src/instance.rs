//! Class instances

use crate::class::{check_field_name, Class, NAME_FIELD};
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;
use peerbind_collections::List;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Object instance (shared handle)
///
/// The owning class is fixed at allocation. Everything else is free-form
/// key/value storage; lookups that miss the instance fall back to the class
/// table. Two handles are equal only if they refer to the same instance.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

struct InstanceInner {
    class: Class,
    fields: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    pub(crate) fn new(class: Class) -> Self {
        Self {
            inner: Rc::new(InstanceInner {
                class,
                fields: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// Owning class
    pub fn class(&self) -> &Class {
        &self.inner.class
    }

    /// Check if this instance was allocated by `class`
    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.inner.class.ptr_eq(class)
    }

    /// Resolve `key` on the instance, then on its class
    ///
    /// `__name` resolves to the class name.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == NAME_FIELD {
            return Some(Value::str(self.inner.class.name()));
        }
        if let Some(value) = self.inner.fields.borrow().get(key) {
            return Some(value.clone());
        }
        self.inner.class.field(key)
    }

    /// Look up `key` on the instance only
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.inner.fields.borrow().get(key).cloned()
    }

    /// Check if `key` resolves on the instance or its class
    pub fn has(&self, key: &str) -> bool {
        self.inner.fields.borrow().contains_key(key) || self.inner.class.has_field(key)
    }

    /// Store a field on the instance, returning the one it replaced
    ///
    /// The class table is never touched; the new value shadows any class
    /// field of the same name.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> RuntimeResult<Option<Value>> {
        let key = key.into();
        check_field_name(&key)?;
        Ok(self.inner.fields.borrow_mut().insert(key, value.into()))
    }

    /// Remove an instance field, uncovering the class field if there is one
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.fields.borrow_mut().remove(key)
    }

    /// Sorted names of the fields stored on the instance itself
    pub fn own_field_names(&self) -> List<String> {
        let mut names: List<String> = self.inner.fields.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Call the method stored under `name`
    pub fn call(&self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        match self.get(name) {
            Some(Value::Method(method)) => method.call(self, args),
            Some(other) => Err(RuntimeError::NotCallable {
                class: self.inner.class.name().to_string(),
                field: name.to_string(),
                kind: other.kind(),
            }),
            None => Err(RuntimeError::MissingField {
                class: self.inner.class.name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Check if both handles refer to the same instance
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.inner.fields.borrow();
        let mut keys: Vec<&String> = fields.keys().collect();
        keys.sort();

        let mut s = f.debug_struct(self.inner.class.name());
        for key in keys {
            s.field(key, &fields[key]);
        }
        s.finish()
    }
}
