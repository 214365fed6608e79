//! Raw state tree types
//!
//! The raw tree is plain application data: maps, lists, primitives and
//! callables. Maps and lists are shared handles, so one value can be reachable
//! from several places and two handles can be compared by identity.
//!
//! Trees must stay acyclic: a map or list that holds itself, directly or
//! further down, makes every recursive walk (`to_json`, path listing) loop
//! without end. Writes through the state facade refuse to build such a cycle.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::StateError;
use crate::path::{split, Key};
use crate::traits::{Container, StateResult};

/// A node of the raw state tree
///
/// Equality follows reference semantics for shared values: primitives compare
/// by value, while maps, lists and callables compare by identity.
#[derive(Clone)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(RawList),
    Map(RawMap),
    /// Computed entry, resolved against the store on every read
    Derived(Derived),
    /// Plain callable, e.g. a library helper or a parameterized accessor
    Function(Function),
}

impl RawValue {
    /// Build a raw tree from JSON. Maps keep the document's key order.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => RawValue::Number(n),
            Value::String(s) => RawValue::String(s),
            Value::Array(items) => RawValue::List(items.into_iter().map(RawValue::from_json).collect()),
            Value::Object(entries) => RawValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, RawValue::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Render the tree as JSON.
    ///
    /// Callables are data-less: they are left out of maps and become `null`
    /// inside lists.
    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Number(n) => Value::Number(n.clone()),
            RawValue::String(s) => Value::String(s.clone()),
            RawValue::List(list) => list.to_json(),
            RawValue::Map(map) => map.to_json(),
            RawValue::Derived(_) | RawValue::Function(_) => Value::Null,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::List(_) => "list",
            RawValue::Map(_) => "map",
            RawValue::Derived(_) => "derived",
            RawValue::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            RawValue::Null | RawValue::Bool(_) | RawValue::Number(_) | RawValue::String(_)
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(self, RawValue::List(_) | RawValue::Map(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, RawValue::Derived(_) | RawValue::Function(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RawValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            RawValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&RawList> {
        match self {
            RawValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_derived(&self) -> Option<&Derived> {
        match self {
            RawValue::Derived(derived) => Some(derived),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            RawValue::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Keyed view over this value, if it is a map or a list
    pub fn as_container(&self) -> Option<&dyn Container> {
        match self {
            RawValue::Map(map) => Some(map as &dyn Container),
            RawValue::List(list) => Some(list as &dyn Container),
            _ => None,
        }
    }

    /// Read a direct child
    pub fn get(&self, key: impl Into<Key>) -> Option<RawValue> {
        let key = key.into();
        self.as_container().and_then(|container| container.get_key(&key))
    }

    /// Walk a dotted path relative to this value, e.g. `users.0.profile.name`
    pub fn lookup(&self, path: &str) -> Option<RawValue> {
        split(path)
            .into_iter()
            .try_fold(self.clone(), |current, key| current.get(key))
    }
}

impl PartialEq for RawValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RawValue::Null, RawValue::Null) => true,
            (RawValue::Bool(a), RawValue::Bool(b)) => a == b,
            (RawValue::Number(a), RawValue::Number(b)) => a == b,
            (RawValue::String(a), RawValue::String(b)) => a == b,
            (RawValue::List(a), RawValue::List(b)) => a.ptr_eq(b),
            (RawValue::Map(a), RawValue::Map(b)) => a.ptr_eq(b),
            (RawValue::Derived(a), RawValue::Derived(b)) => a.ptr_eq(b),
            (RawValue::Function(a), RawValue::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("Null"),
            RawValue::Bool(b) => write!(f, "Bool({})", b),
            RawValue::Number(n) => write!(f, "Number({})", n),
            RawValue::String(s) => write!(f, "String({:?})", s),
            RawValue::List(list) => fmt::Debug::fmt(list, f),
            RawValue::Map(map) => fmt::Debug::fmt(map, f),
            RawValue::Derived(derived) => fmt::Debug::fmt(derived, f),
            RawValue::Function(function) => fmt::Debug::fmt(function, f),
        }
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawValue::from_json)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::from_json(value)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::Number(n.into())
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n.into())
    }
}

impl From<u64> for RawValue {
    fn from(n: u64) -> Self {
        RawValue::Number(n.into())
    }
}

impl From<usize> for RawValue {
    fn from(n: usize) -> Self {
        RawValue::Number((n as u64).into())
    }
}

impl From<f64> for RawValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(RawValue::Number).unwrap_or(RawValue::Null)
    }
}

impl From<RawMap> for RawValue {
    fn from(map: RawMap) -> Self {
        RawValue::Map(map)
    }
}

impl From<RawList> for RawValue {
    fn from(list: RawList) -> Self {
        RawValue::List(list)
    }
}

impl From<Derived> for RawValue {
    fn from(derived: Derived) -> Self {
        RawValue::Derived(derived)
    }
}

impl From<Function> for RawValue {
    fn from(function: Function) -> Self {
        RawValue::Function(function)
    }
}

/// Shared, insertion-ordered map of raw values
#[derive(Clone, Default)]
pub struct RawMap(Arc<RwLock<IndexMap<String, RawValue>>>);

impl RawMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert for building trees
    pub fn with(self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<RawValue> {
        self.0.read().get(key).cloned()
    }

    /// Insert or replace an entry. Replacing keeps the key's position.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.0.write().insert(key.into(), value.into())
    }

    /// Remove an entry, keeping the order of the rest
    pub fn remove(&self, key: &str) -> Option<RawValue> {
        self.0.write().shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, RawValue)> {
        self.0
            .read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Same underlying map
    pub fn ptr_eq(&self, other: &RawMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn lookup(&self, path: &str) -> Option<RawValue> {
        RawValue::Map(self.clone()).lookup(path)
    }

    pub fn to_json(&self) -> Value {
        let entries = self.0.read();
        let mut map = Map::with_capacity(entries.len());
        for (key, value) in entries.iter() {
            if !value.is_callable() {
                map.insert(key.clone(), value.to_json());
            }
        }
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        RawMap(Arc::new(RwLock::new(entries)))
    }
}

impl fmt::Debug for RawMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.read().iter()).finish()
    }
}

/// Shared list of raw values
#[derive(Clone, Default)]
pub struct RawList(Arc<RwLock<Vec<RawValue>>>);

impl RawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<RawValue> {
        self.0.read().get(index).cloned()
    }

    /// Write at `index`, returning the previous entry.
    ///
    /// Writing at `len()` appends. Indices further out would leave a gap and
    /// are rejected.
    pub fn set(&self, index: usize, value: impl Into<RawValue>) -> StateResult<Option<RawValue>> {
        let mut items = self.0.write();
        let value = value.into();
        match index.cmp(&items.len()) {
            Ordering::Less => Ok(Some(std::mem::replace(&mut items[index], value))),
            Ordering::Equal => {
                items.push(value);
                Ok(None)
            }
            Ordering::Greater => Err(StateError::InvalidKey {
                key: index.to_string(),
                reason: "list writes may append but not leave gaps",
            }),
        }
    }

    pub fn push(&self, value: impl Into<RawValue>) {
        self.0.write().push(value.into());
    }

    /// Remove the entry at `index`, shifting later entries down
    pub fn remove(&self, index: usize) -> Option<RawValue> {
        let mut items = self.0.write();
        if index < items.len() {
            Some(items.remove(index))
        } else {
            None
        }
    }

    /// Exchange two entries in place
    pub fn swap(&self, a: usize, b: usize) -> bool {
        let mut items = self.0.write();
        if a < items.len() && b < items.len() {
            items.swap(a, b);
            true
        } else {
            false
        }
    }

    pub fn items(&self) -> Vec<RawValue> {
        self.0.read().clone()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Same underlying list
    pub fn ptr_eq(&self, other: &RawList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.0.read().iter().map(RawValue::to_json).collect())
    }
}

impl<V: Into<RawValue>> FromIterator<V> for RawList {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let items = iter.into_iter().map(Into::into).collect();
        RawList(Arc::new(RwLock::new(items)))
    }
}

impl fmt::Debug for RawList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.read().iter()).finish()
    }
}

type DerivedFn = dyn Fn(&DerivedContext) -> anyhow::Result<RawValue> + Send + Sync;

/// A computed entry of the raw tree
///
/// Invoked with the store's [`DerivedContext`] each time it is read. A derived
/// entry may compute a value directly, or return a [`Function`] that takes
/// explicit arguments (see [`Derived::parameterized`]).
#[derive(Clone)]
pub struct Derived(Arc<DerivedFn>);

impl Derived {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&DerivedContext) -> anyhow::Result<RawValue> + Send + Sync + 'static,
    {
        Derived(Arc::new(f))
    }

    /// Two-stage derived entry: reading it yields an accessor that computes
    /// `f(context, args)` when called.
    pub fn parameterized<F>(f: F) -> Self
    where
        F: Fn(&DerivedContext, &[RawValue]) -> anyhow::Result<RawValue> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Derived::new(move |ctx| {
            let ctx = ctx.clone();
            let f = Arc::clone(&f);
            Ok(RawValue::Function(Function::new(move |args| (*f)(&ctx, args))))
        })
    }

    pub fn call(&self, ctx: &DerivedContext) -> anyhow::Result<RawValue> {
        (self.0)(ctx)
    }

    pub fn ptr_eq(&self, other: &Derived) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Derived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Derived(..)")
    }
}

type FunctionFn = dyn Fn(&[RawValue]) -> anyhow::Result<RawValue> + Send + Sync;

/// A callable taking explicit arguments
#[derive(Clone)]
pub struct Function(Arc<FunctionFn>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[RawValue]) -> anyhow::Result<RawValue> + Send + Sync + 'static,
    {
        Function(Arc::new(f))
    }

    pub fn call(&self, args: &[RawValue]) -> anyhow::Result<RawValue> {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(..)")
    }
}

/// What a derived entry sees when invoked
///
/// Holds live handles, not copies: reads through the context observe the
/// current raw tree.
#[derive(Debug, Clone)]
pub struct DerivedContext {
    state: RawMap,
    actions: RawMap,
    libraries: RawMap,
}

impl DerivedContext {
    pub fn new(state: RawMap, actions: RawMap, libraries: RawMap) -> Self {
        Self {
            state,
            actions,
            libraries,
        }
    }

    /// Root of the raw state branch
    pub fn state(&self) -> &RawMap {
        &self.state
    }

    pub fn actions(&self) -> &RawMap {
        &self.actions
    }

    pub fn libraries(&self) -> &RawMap {
        &self.libraries
    }

    /// Call a function stored in the libraries bag
    pub fn call_library(&self, name: &str, args: &[RawValue]) -> anyhow::Result<RawValue> {
        call_bag_entry(&self.libraries, "library", name, args)
    }

    /// Call a function stored in the actions bag
    pub fn call_action(&self, name: &str, args: &[RawValue]) -> anyhow::Result<RawValue> {
        call_bag_entry(&self.actions, "action", name, args)
    }
}

fn call_bag_entry(bag: &RawMap, bag_name: &str, name: &str, args: &[RawValue]) -> anyhow::Result<RawValue> {
    match bag.lookup(name) {
        Some(RawValue::Function(function)) => function.call(args),
        Some(other) => anyhow::bail!("{} `{}` is not a function ({})", bag_name, name, other.kind()),
        None => anyhow::bail!("{} `{}` not found", bag_name, name),
    }
}

/// Debug-only token identifying a consumer of a store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl Owner {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Owner of kind `debug`
    pub fn debug(name: impl Into<String>) -> Self {
        Self::new("debug", name)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}
