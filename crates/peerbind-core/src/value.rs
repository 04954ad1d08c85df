//! Dynamic values stored in class tables and instance fields

use crate::error::{RuntimeError, RuntimeResult};
use crate::instance::Instance;
use peerbind_collections::{List, Map};
use std::cell::RefCell;
use std::fmt;
use std::panic::Location;
use std::rc::Rc;

/// Native method body: receives the instance and the call arguments
pub type MethodFn = dyn Fn(&Instance, &[Value]) -> RuntimeResult<Value>;

/// Callable value with a fixed arity
///
/// The declaration site is captured when the method is created, so class
/// descriptions can point at the code that defined each method.
#[derive(Clone)]
pub struct Method {
    inner: Rc<MethodInner>,
}

struct MethodInner {
    name: String,
    arity: usize,
    site: &'static Location<'static>,
    body: Box<MethodFn>,
}

impl Method {
    /// Create a method taking exactly `arity` arguments
    #[track_caller]
    pub fn new<F>(name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        Self {
            inner: Rc::new(MethodInner {
                name: name.into(),
                arity,
                site: Location::caller(),
                body: Box::new(body),
            }),
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of arguments the method takes
    pub fn arity(&self) -> usize {
        self.inner.arity
    }

    /// Source location the method was declared at
    pub fn site(&self) -> &'static Location<'static> {
        self.inner.site
    }

    /// Invoke the method on `receiver`
    pub fn call(&self, receiver: &Instance, args: &[Value]) -> RuntimeResult<Value> {
        if args.len() != self.inner.arity {
            return Err(RuntimeError::ArityMismatch {
                method: self.inner.name.clone(),
                expected: self.inner.arity,
                got: args.len(),
            });
        }
        (self.inner.body)(receiver, args)
    }

    /// Check if both handles refer to the same method
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "method {}/{} @ {}:{}",
            self.inner.name,
            self.inner.arity,
            self.inner.site.file(),
            self.inner.site.line()
        )
    }
}

/// Dynamic value
///
/// Scalars compare by value; methods, instances, lists and maps compare by
/// identity.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Callable
    Method(Method),
    /// Object instance
    Instance(Instance),
    /// Shared sequence
    List(Rc<RefCell<List<Value>>>),
    /// Shared string-keyed map
    Map(Rc<RefCell<Map<String, Value>>>),
}

impl Value {
    /// Create a string value
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    /// Wrap a list so it can be shared between fields
    pub fn list(list: List<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(list)))
    }

    /// Wrap a map so it can be shared between fields
    pub fn map(map: Map<String, Value>) -> Self {
        Value::Map(Rc::new(RefCell::new(map)))
    }

    /// Short name of the value's kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Method(_) => "method",
            Value::Instance(_) => "instance",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Check if this is `Nil`
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Check if this value can be called
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Method(_))
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    /// Get as method
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Get as instance
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(i) => Some(i),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => a.ptr_eq(b),
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Method(m) => fmt::Debug::fmt(m, f),
            Value::Instance(i) => write!(f, "<{} instance>", i.class().name()),
            Value::List(l) => write!(f, "list({})", l.borrow().count()),
            Value::Map(m) => write!(f, "map({})", m.borrow().count()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Method> for Value {
    fn from(m: Method) -> Self {
        Value::Method(m)
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Value::Instance(i)
    }
}

impl From<List<Value>> for Value {
    fn from(list: List<Value>) -> Self {
        Value::list(list)
    }
}

impl From<Map<String, Value>> for Value {
    fn from(map: Map<String, Value>) -> Self {
        Value::map(map)
    }
}
