//! A keyed bag of values.

use std::collections::HashMap;

/// A map from names to lists of values. Empty lists never remain as values;
/// deleting the last entry removes the key.
#[derive(Debug, Clone)]
pub struct MultiMap<T> {
    map: HashMap<String, Vec<T>>,
}

impl<T> Default for MultiMap<T> {
    fn default() -> Self {
        MultiMap {
            map: HashMap::new(),
        }
    }
}

impl<T> MultiMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The values associated with `name`; empty if none.
    pub fn lookup(&self, name: &str) -> &[T] {
        self.map.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append one value to the list associated with `name`.
    pub fn add(&mut self, name: impl Into<String>, value: T) {
        self.map.entry(name.into()).or_default().push(value);
    }

    /// Append several values to the list associated with `name`. An empty
    /// iterator leaves the map untouched.
    pub fn add_all(&mut self, name: impl Into<String>, values: impl IntoIterator<Item = T>) {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return;
        }
        self.map.entry(name.into()).or_default().extend(values);
    }

    /// Remove the entries under `name` matching `pred`; drop the key when
    /// the list becomes empty.
    pub fn delete_func(&mut self, name: &str, pred: impl Fn(&T) -> bool) {
        if let Some(list) = self.map.get_mut(name) {
            list.retain(|v| !pred(v));
            if list.is_empty() {
                self.map.remove(name);
            }
        }
    }

    /// Move the entries under `name` matching `pred` to `new_name`.
    pub fn rename(&mut self, name: &str, pred: impl Fn(&T) -> bool, new_name: &str) {
        let mut moved = Vec::new();
        if let Some(list) = self.map.get_mut(name) {
            let mut i = 0;
            while i < list.len() {
                if pred(&list[i]) {
                    moved.push(list.remove(i));
                } else {
                    i += 1;
                }
            }
            if list.is_empty() {
                self.map.remove(name);
            }
        }
        if !moved.is_empty() {
            self.map.entry(new_name.to_string()).or_default().extend(moved);
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
