use crate::core::{Collect, EnvPtr, Gc, GcPtr, GcTrace, MutationContext, Statement, new_gc_cell_ptr};
use crate::unicode::{utf8_to_utf16, utf16_to_utf8};
use crate::{JSError, raise_range_error};
use std::rc::Rc;

pub type JSObjectDataPtr<'gc> = GcPtr<'gc, JSObjectData<'gc>>;

#[inline]
pub fn new_js_object_data<'gc>(mc: &MutationContext<'gc>) -> JSObjectDataPtr<'gc> {
    new_gc_cell_ptr(mc, JSObjectData::new())
}

#[derive(Clone, Default)]
pub enum ObjectKind<'gc> {
    #[default]
    Ordinary,
    /// Array storage: canonical index keys map onto this vector and `length` is its size.
    Array(Vec<Value<'gc>>),
}

#[derive(Clone, Default)]
pub struct JSObjectData<'gc> {
    pub properties: indexmap::IndexMap<String, Value<'gc>>,
    pub prototype: Option<JSObjectDataPtr<'gc>>,
    pub kind: ObjectKind<'gc>,
}

unsafe impl<'gc> Collect<'gc> for JSObjectData<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        for v in self.properties.values() {
            v.trace(cc);
        }
        if let Some(p) = &self.prototype {
            p.trace(cc);
        }
        if let ObjectKind::Array(elements) = &self.kind {
            for v in elements {
                v.trace(cc);
            }
        }
    }
}

/// Parse a canonical array index ("0", "17"; not "01", "-1" or "1.5").
/// Indices end at 2^32 - 2; larger integer keys are ordinary properties.
pub fn array_index(key: &str) -> Option<usize> {
    let idx = key.parse::<u32>().ok()?;
    if idx != u32::MAX && idx.to_string() == key { Some(idx as usize) } else { None }
}

/// Element storage is dense, so arrays may not grow past this many elements.
pub const MAX_ARRAY_ELEMENTS: usize = 1 << 22;

impl<'gc> JSObjectData<'gc> {
    pub fn new() -> Self {
        JSObjectData::default()
    }

    pub fn new_array(elements: Vec<Value<'gc>>) -> Self {
        JSObjectData {
            kind: ObjectKind::Array(elements),
            ..JSObjectData::default()
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array(_))
    }

    pub fn elements(&self) -> Option<&Vec<Value<'gc>>> {
        match &self.kind {
            ObjectKind::Array(elements) => Some(elements),
            ObjectKind::Ordinary => None,
        }
    }

    pub fn elements_mut(&mut self) -> Option<&mut Vec<Value<'gc>>> {
        match &mut self.kind {
            ObjectKind::Array(elements) => Some(elements),
            ObjectKind::Ordinary => None,
        }
    }

    /// Own property read. Array indices and `length` come from the element vector.
    pub fn get_own(&self, key: &str) -> Option<Value<'gc>> {
        if let ObjectKind::Array(elements) = &self.kind {
            if key == "length" {
                return Some(Value::Number(elements.len() as f64));
            }
            if let Some(idx) = array_index(key) {
                return elements.get(idx).cloned();
            }
        }
        self.properties.get(key).cloned()
    }

    pub fn has_own(&self, key: &str) -> bool {
        if let ObjectKind::Array(elements) = &self.kind {
            if key == "length" {
                return true;
            }
            if let Some(idx) = array_index(key) {
                return idx < elements.len();
            }
        }
        self.properties.contains_key(key)
    }

    /// Own keys: array indices first, then named properties in insertion order.
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match &self.kind {
            ObjectKind::Array(elements) => (0..elements.len()).map(|i| i.to_string()).collect(),
            ObjectKind::Ordinary => Vec::new(),
        };
        keys.extend(self.properties.keys().cloned());
        keys
    }
}

#[derive(Clone)]
pub struct ClosureData<'gc> {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Vec<Statement>>,
    /// Environment active when the function expression was evaluated.
    pub env: EnvPtr<'gc>,
}

unsafe impl<'gc> Collect<'gc> for ClosureData<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        self.env.trace(cc);
    }
}

impl<'gc> ClosureData<'gc> {
    pub fn new(name: Option<String>, params: &[String], body: &Rc<Vec<Statement>>, env: EnvPtr<'gc>) -> Self {
        ClosureData {
            name,
            params: params.to_vec(),
            body: Rc::clone(body),
            env,
        }
    }
}

#[derive(Clone)]
pub enum Value<'gc> {
    Number(f64),
    String(Vec<u16>),
    Boolean(bool),
    Undefined,
    Null,
    Object(JSObjectDataPtr<'gc>),
    Closure(Gc<'gc, ClosureData<'gc>>),
    /// Built-in function, dispatched by its qualified name (e.g. `Array.prototype.forEach`).
    Function(&'static str),
}

unsafe impl<'gc> Collect<'gc> for Value<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        match self {
            Value::Object(obj) => obj.trace(cc),
            Value::Closure(cl) => cl.trace(cc),
            _ => {}
        }
    }
}

impl Value<'_> {
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Function(_))
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Value::String(utf8_to_utf16(s))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::String(utf8_to_utf16(&s))
    }
}

impl<'gc> std::fmt::Debug for Value<'gc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", utf16_to_utf8(s)),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Null => write!(f, "Null"),
            Value::Undefined => write!(f, "Undefined"),
            Value::Object(obj) => write!(f, "Object({:p})", Gc::as_ptr(*obj)),
            Value::Closure(cl) => write!(f, "Closure({})", cl.name.as_deref().unwrap_or("anonymous")),
            Value::Function(name) => write!(f, "Function({})", name),
        }
    }
}

pub fn value_to_string<'gc>(val: &Value<'gc>) -> String {
    value_to_string_guarded(val, &mut Vec::new())
}

/// String conversion for nested values. An array already being converted
/// further up renders as the empty string.
pub fn value_to_string_guarded<'gc>(val: &Value<'gc>, seen: &mut Vec<JSObjectDataPtr<'gc>>) -> String {
    match val {
        Value::Number(n) => format_js_number(*n),
        Value::String(s) => utf16_to_utf8(s),
        Value::Boolean(b) => b.to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Object(obj) => {
            if seen.iter().any(|o| Gc::ptr_eq(*o, *obj)) {
                return String::new();
            }
            let borrowed = obj.borrow();
            match borrowed.elements() {
                // Array.prototype.toString is join(",") with holes/null/undefined as empty
                Some(elements) => {
                    seen.push(*obj);
                    let parts: Vec<String> = elements
                        .iter()
                        .map(|v| if v.is_null_or_undefined() { String::new() } else { value_to_string_guarded(v, seen) })
                        .collect();
                    seen.pop();
                    parts.join(",")
                }
                None => "[object Object]".to_string(),
            }
        }
        Value::Closure(cl) => format!("function {}() {{ [code] }}", cl.name.as_deref().unwrap_or("")),
        Value::Function(name) => format!("function {}() {{ [native code] }}", name.rsplit('.').next().unwrap_or(name)),
    }
}

pub fn format_js_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n.is_sign_negative() { "-Infinity" } else { "Infinity" }.to_string();
    }
    // ToString(-0) is "0"
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let s = format!("{:e}", n);
        if let Some((mant, exp)) = s.split_once('e')
            && let Ok(exp_int) = exp.parse::<i32>()
        {
            return format!("{}e{:+}", mant, exp_int);
        }
        return s;
    }
    let mut s = format!("{}", n);
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    s
}

pub fn to_boolean<'gc>(val: &Value<'gc>) -> bool {
    match val {
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Null | Value::Undefined => false,
        Value::Object(_) | Value::Closure(_) | Value::Function(_) => true,
    }
}

pub fn to_number<'gc>(val: &Value<'gc>) -> f64 {
    match val {
        Value::Number(n) => *n,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::String(s) => {
            let s = utf16_to_utf8(s);
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Object(obj) => {
            // arrays of zero or one element convert through their string form
            let text = value_to_string(&Value::Object(*obj));
            to_number(&Value::String(utf8_to_utf16(&text)))
        }
        Value::Undefined | Value::Closure(_) | Value::Function(_) => f64::NAN,
    }
}

pub fn type_of<'gc>(val: &Value<'gc>) -> &'static str {
    match val {
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Boolean(_) => "boolean",
        Value::Undefined => "undefined",
        Value::Null | Value::Object(_) => "object",
        Value::Closure(_) | Value::Function(_) => "function",
    }
}

pub fn values_strict_equal<'gc>(v1: &Value<'gc>, v2: &Value<'gc>) -> bool {
    match (v1, v2) {
        (Value::Number(n1), Value::Number(n2)) => n1 == n2,
        (Value::String(s1), Value::String(s2)) => s1 == s2,
        (Value::Boolean(b1), Value::Boolean(b2)) => b1 == b2,
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Object(o1), Value::Object(o2)) => Gc::ptr_eq(*o1, *o2),
        (Value::Closure(c1), Value::Closure(c2)) => Gc::ptr_eq(*c1, *c2),
        (Value::Function(f1), Value::Function(f2)) => f1 == f2,
        _ => false,
    }
}

/// Loose equality limited to the primitive coercions this engine models.
pub fn values_loosely_equal<'gc>(v1: &Value<'gc>, v2: &Value<'gc>) -> bool {
    match (v1, v2) {
        (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
        (Value::Null | Value::Undefined, _) | (_, Value::Null | Value::Undefined) => false,
        (Value::Number(_), Value::String(_) | Value::Boolean(_)) | (Value::String(_) | Value::Boolean(_), Value::Number(_)) => {
            to_number(v1) == to_number(v2)
        }
        (Value::Boolean(_), Value::String(_)) | (Value::String(_), Value::Boolean(_)) => to_number(v1) == to_number(v2),
        _ => values_strict_equal(v1, v2),
    }
}

/// Prototype-chain lookup: own property first, then each prototype in turn.
pub fn object_get_key_value<'gc>(obj: &JSObjectDataPtr<'gc>, key: &str) -> Option<Value<'gc>> {
    let mut current = Some(*obj);
    while let Some(cur) = current {
        let borrowed = cur.borrow();
        if let Some(val) = borrowed.get_own(key) {
            return Some(val);
        }
        current = borrowed.prototype;
    }
    None
}

pub fn get_own_property<'gc>(obj: &JSObjectDataPtr<'gc>, key: &str) -> Option<Value<'gc>> {
    obj.borrow().get_own(key)
}

/// Ordinary assignment: always creates or updates an own property of `obj`.
pub fn object_set_key_value<'gc>(mc: &MutationContext<'gc>, obj: &JSObjectDataPtr<'gc>, key: &str, val: Value<'gc>) -> Result<(), JSError> {
    let is_array = obj.borrow().is_array();
    if is_array && key == "length" {
        // converting `val` may read this very array, so no mutable borrow yet
        let new_len = array_length_from(&val)?;
        if let Some(elements) = obj.borrow_mut(mc).elements_mut() {
            elements.resize(new_len, Value::Undefined);
        }
        return Ok(());
    }
    if is_array && let Some(idx) = array_index(key) {
        if idx >= MAX_ARRAY_ELEMENTS {
            return Err(raise_range_error!(format!(
                "Array index {idx} is beyond the supported length {MAX_ARRAY_ELEMENTS}"
            )));
        }
        if let Some(elements) = obj.borrow_mut(mc).elements_mut() {
            if idx >= elements.len() {
                elements.resize(idx + 1, Value::Undefined);
            }
            elements[idx] = val;
        }
        return Ok(());
    }
    log::trace!("object_set_key_value: obj={:p} key={}", Gc::as_ptr(*obj), key);
    obj.borrow_mut(mc).properties.insert(key.to_string(), val);
    Ok(())
}

// ToNumber, then the uint32 check of an array length write.
fn array_length_from(val: &Value<'_>) -> Result<usize, JSError> {
    let n = to_number(val);
    if !(n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64) {
        return Err(raise_range_error!(format!("Invalid array length: {}", format_js_number(n))));
    }
    let len = n as usize;
    if len > MAX_ARRAY_ELEMENTS {
        return Err(raise_range_error!(format!(
            "Array length {len} is beyond the supported length {MAX_ARRAY_ELEMENTS}"
        )));
    }
    Ok(len)
}

/// Replace the prototype link of `obj`, rejecting links that would make the
/// prototype graph cyclic.
pub fn set_prototype<'gc>(mc: &MutationContext<'gc>, obj: &JSObjectDataPtr<'gc>, proto: Option<JSObjectDataPtr<'gc>>) -> Result<(), JSError> {
    let mut current = proto;
    while let Some(cur) = current {
        if Gc::ptr_eq(cur, *obj) {
            log::debug!("set_prototype: rejected cycle through obj={:p}", Gc::as_ptr(*obj));
            return Err(JSError::CyclicPrototype);
        }
        current = cur.borrow().prototype;
    }
    obj.borrow_mut(mc).prototype = proto;
    Ok(())
}
