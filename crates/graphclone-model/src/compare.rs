//! Structural equality over value graphs

use rustc_hash::FxHashSet;

use crate::value::{Key, Value};

impl Value {
    /// Compare two graphs by shape and content rather than by identity
    ///
    /// Instances compare equal when they share a class and their storage
    /// slots are pairwise equal. Mapping keys must match by [`Key`]
    /// equality. Cycles are handled by assuming a pair under comparison is
    /// equal when it is reached again.
    pub fn structurally_eq(&self, other: &Value) -> bool {
        let mut visiting = FxHashSet::default();
        eq_values(self, other, &mut visiting)
    }
}

fn eq_values(a: &Value, b: &Value, visiting: &mut FxHashSet<(usize, usize)>) -> bool {
    if let (Some(x), Some(y)) = (a.identity(), b.identity()) {
        if !visiting.insert((x, y)) {
            return true;
        }
    }

    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => {
            x.class().id() == y.class().id() && eq_all(&x.slots(), &y.slots(), visiting)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.dims() == y.dims()
                && x.element_type() == y.element_type()
                && eq_all(&x.items(), &y.items(), visiting)
        }
        (Value::List(x), Value::List(y)) => {
            x.class().map(|c| c.id()) == y.class().map(|c| c.id())
                && eq_all(&x.items(), &y.items(), visiting)
                && eq_all(&x.slots(), &y.slots(), visiting)
        }
        (Value::Map(x), Value::Map(y)) => {
            x.class().map(|c| c.id()) == y.class().map(|c| c.id())
                && x.len() == y.len()
                && x.entries().iter().all(|(key, value)| {
                    y.get(key.value())
                        .is_some_and(|other| eq_values(value, &other, visiting))
                })
        }
        (Value::Record(x), Value::Record(y)) => {
            let (xs, ys) = (x.entries(), y.entries());
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(&ys)
                    .all(|((xn, xv), (yn, yv))| xn == yn && eq_values(xv, yv, visiting))
        }
        (x, y) => Key::new(x.clone()) == Key::new(y.clone()),
    }
}

fn eq_all(xs: &[Value], ys: &[Value], visiting: &mut FxHashSet<(usize, usize)>) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| eq_values(x, y, visiting))
}
