//! Runtime value representation.
//!
//! One tagged sum over everything evaluation produces and consumes. There is
//! no distinct array tag: an "array" is an object whose keys are sequential
//! decimal index strings, so index-based utilities keep working on both.

use crate::ast::Stmt;
use crate::environment::Environment;
use crate::error::Result;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Calling convention every host-supplied native function satisfies: the
/// evaluated arguments plus the call-site environment.
pub type NativeFn = fn(&[Value], &Rc<RefCell<Environment>>) -> Result<Value>;

/// An externally supplied function exposed as an ordinary callable value.
/// The evaluator never inspects its internals.
#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A user-defined function bundled with the environment active at its
/// declaration site (the closure). The body is shared with the declaring
/// AST node; function equality is pointer identity on that allocation.
pub struct KinFunction {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub declaration_env: Rc<RefCell<Environment>>,
}

impl fmt::Debug for KinFunction {
    // The declaration environment is omitted: closures routinely form
    // reference cycles back to the function value itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KinFunction")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// An insertion-ordered string-keyed mapping, Kin's object (and array)
/// storage. Key order is observable through printing and iteration, so
/// insertion order must be preserved.
#[derive(Debug, Default)]
pub struct KinObject {
    entries: Vec<(String, Value)>,
}

impl KinObject {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert or overwrite; first insertion fixes the key's position.
    pub fn set(&mut self, key: String, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }
}

/// The tagged set of runtime values.
#[derive(Debug, Clone)]
pub enum Value {
    /// Kin's single numeric type; integer and float literals both land here.
    Number(f64),

    String(String),

    Bool(bool),

    Null,

    /// Ordered-key object, doubling as an array.
    Object(Rc<RefCell<KinObject>>),

    /// User-defined function closure.
    Function(Rc<KinFunction>),

    /// Host-supplied callable.
    NativeFunction(NativeFunction),
}

impl Value {
    /// Wrap a fresh object map.
    pub fn object(map: KinObject) -> Self {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    /// Human-readable kind name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::NativeFunction(_) => "native function",
        }
    }

    /// Coerce a value into an object property key. Numbers use their
    /// decimal form (integral values without a fractional part, so `arr[1]`
    /// reads the `"1"` slot); anything else but a string has no key form.
    pub fn property_key(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();

                    Some(buf.format(*n as i64).to_string())
                } else {
                    Some(n.to_string())
                }
            }

            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Type-directed equality: primitives compare by value, objects and
    /// functions by reference identity of their underlying storage, natives
    /// by function-pointer identity. Mismatched kinds are never equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(&a.body, &b.body),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => {
                a.func as usize == b.func as usize
            }
            _ => false,
        }
    }
}

impl Value {
    /// Recursive display worker. `seen` tracks the object allocations on the
    /// current rendering path, so a self-referential object prints as `{...}`
    /// instead of recursing without bound.
    fn fmt_with(
        &self,
        f: &mut fmt::Formatter<'_>,
        seen: &mut Vec<*const RefCell<KinObject>>,
    ) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();

                    f.write_str(buf.format(*n as i64))
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => f.write_str(s),

            Value::Bool(b) => f.write_str(if *b { "nibyo" } else { "sibyo" }),

            Value::Null => f.write_str("ubusa"),

            Value::Object(map) => {
                let ptr: *const RefCell<KinObject> = Rc::as_ptr(map);

                if seen.contains(&ptr) {
                    return f.write_str("{...}");
                }

                seen.push(ptr);

                write!(f, "{{")?;

                for (i, (key, value)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{}: ", key)?;
                    value.fmt_with(f, seen)?;
                }

                write!(f, "}}")?;

                seen.pop();

                Ok(())
            }

            Value::Function(func) => write!(f, "<porogaramu_ntoya {}>", func.name),

            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, &mut Vec::new())
    }
}
