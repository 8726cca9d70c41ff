//! Typed, type-erased attribute arrays.
//!
//! # Design
//!
//! Every per-person attribute and every extra edge column is a [`Column`]: a
//! closed enum over the four element kinds the engine supports.  A column
//! never changes kind after it is created; values written into it are
//! coerced to its kind with the same rules as [`Value::cast`].
//!
//! Hot loops should not match on `Column` per element.  Borrow the typed
//! slice once with [`Element::slice`] / [`Element::slice_mut`] and index it:
//!
//! ```rust
//! use cv_core::{Column, Element};
//!
//! let mut col = Column::from(vec![0.0_f32; 4]);
//! let ages = f32::slice_mut(&mut col).expect("f32 column");
//! ages[2] = 41.0;
//! assert_eq!(f32::slice(&col).unwrap()[2], 41.0);
//! ```

use std::fmt;

// ── AttrKind ──────────────────────────────────────────────────────────────────

/// Element kind of an attribute or extra edge column.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrKind {
    F32,
    F64,
    I32,
    Bool,
}

// ── Value ─────────────────────────────────────────────────────────────────────

/// A single attribute value, used by per-person snapshots and slow paths.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    F32(f32),
    F64(f64),
    I32(i32),
    Bool(bool),
}

impl Value {
    pub fn kind(self) -> AttrKind {
        match self {
            Value::F32(_) => AttrKind::F32,
            Value::F64(_) => AttrKind::F64,
            Value::I32(_) => AttrKind::I32,
            Value::Bool(_) => AttrKind::Bool,
        }
    }

    /// Numeric view; `true` is 1.0.
    pub fn as_f64(self) -> f64 {
        match self {
            Value::F32(v) => v as f64,
            Value::F64(v) => v,
            Value::I32(v) => v as f64,
            Value::Bool(v) => v as u8 as f64,
        }
    }

    /// Nonzero test used by `select_true`.  NaN counts as nonzero.
    pub fn is_nonzero(self) -> bool {
        match self {
            Value::F32(v) => v != 0.0,
            Value::F64(v) => v != 0.0,
            Value::I32(v) => v != 0,
            Value::Bool(v) => v,
        }
    }

    /// Coerce to `kind`.  Floats truncate toward zero (saturating) when cast
    /// to `I32`; anything nonzero becomes `true`.
    pub fn cast(self, kind: AttrKind) -> Value {
        match kind {
            AttrKind::F32 => Value::F32(f32::from_value(self)),
            AttrKind::F64 => Value::F64(f64::from_value(self)),
            AttrKind::I32 => Value::I32(i32::from_value(self)),
            AttrKind::Bool => Value::Bool(bool::from_value(self)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{}", *v as u8),
        }
    }
}

// ── Element ───────────────────────────────────────────────────────────────────

/// A primitive type that can live in a [`Column`].
///
/// Sealed: the set of kinds is closed so that every column can be matched
/// exhaustively.
pub trait Element: Copy + Default + PartialOrd + Send + Sync + 'static + sealed::Sealed {
    const KIND: AttrKind;

    fn from_value(v: Value) -> Self;
    fn into_value(self) -> Value;

    /// The column's data if it holds `Self`.
    fn slice(col: &Column) -> Option<&[Self]>;

    /// Fixed-length mutable view of the column's data if it holds `Self`.
    fn slice_mut(col: &mut Column) -> Option<&mut [Self]>;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for i32 {}
    impl Sealed for bool {}
}

macro_rules! element {
    ($ty:ty, $variant:ident, |$v:ident| $from:expr) => {
        impl Element for $ty {
            const KIND: AttrKind = AttrKind::$variant;

            #[inline]
            fn from_value($v: Value) -> Self {
                $from
            }

            #[inline]
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            #[inline]
            fn slice(col: &Column) -> Option<&[Self]> {
                match col {
                    Column::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            #[inline]
            fn slice_mut(col: &mut Column) -> Option<&mut [Self]> {
                match col {
                    Column::$variant(v) => Some(v.as_mut_slice()),
                    _ => None,
                }
            }
        }

        impl From<Vec<$ty>> for Column {
            fn from(v: Vec<$ty>) -> Column {
                Column::$variant(v)
            }
        }
    };
}

element!(f32, F32, |v| match v {
    Value::F32(x) => x,
    other => other.as_f64() as f32,
});
element!(f64, F64, |v| v.as_f64());
element!(i32, I32, |v| match v {
    Value::I32(x) => x,
    Value::Bool(x) => x as i32,
    Value::F32(x) => x as i32,
    Value::F64(x) => x as i32,
});
element!(bool, Bool, |v| v.is_nonzero());

// ── Column ────────────────────────────────────────────────────────────────────

/// One contiguous array of a single element kind.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Column {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    Bool(Vec<bool>),
}

/// Apply the same expression to the inner `Vec` whatever its kind.
macro_rules! each {
    ($col:expr, |$v:ident| $body:expr) => {
        match $col {
            Column::F32($v) => $body,
            Column::F64($v) => $body,
            Column::I32($v) => $body,
            Column::Bool($v) => $body,
        }
    };
}

impl Column {
    /// `n` zero / `false` values of `kind`.
    pub fn zeros(kind: AttrKind, n: usize) -> Column {
        match kind {
            AttrKind::F32 => Column::F32(vec![0.0; n]),
            AttrKind::F64 => Column::F64(vec![0.0; n]),
            AttrKind::I32 => Column::I32(vec![0; n]),
            AttrKind::Bool => Column::Bool(vec![false; n]),
        }
    }

    pub fn kind(&self) -> AttrKind {
        match self {
            Column::F32(_) => AttrKind::F32,
            Column::F64(_) => AttrKind::F64,
            Column::I32(_) => AttrKind::I32,
            Column::Bool(_) => AttrKind::Bool,
        }
    }

    pub fn len(&self) -> usize {
        each!(self, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<Value> {
        each!(self, |v| v.get(i).map(|x| x.into_value()))
    }

    /// Overwrite element `i` with `value` coerced to this column's kind.
    /// Returns `false` (and writes nothing) if `i` is past the end.
    pub fn set(&mut self, i: usize, value: Value) -> bool {
        each!(self, |v| match v.get_mut(i) {
            Some(slot) => {
                *slot = Element::from_value(value);
                true
            }
            None => false,
        })
    }

    /// Iterator over every element as a [`Value`].
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Truncate or zero-extend to exactly `n` elements.
    pub fn resize(&mut self, n: usize) {
        each!(self, |v| v.resize(n, Default::default()))
    }

    /// A copy coerced to `kind`.  Cheap clone when the kind already matches.
    pub fn cast(&self, kind: AttrKind) -> Column {
        if self.kind() == kind {
            return self.clone();
        }
        match kind {
            AttrKind::F32 => Column::F32(self.values().map(f32::from_value).collect()),
            AttrKind::F64 => Column::F64(self.values().map(f64::from_value).collect()),
            AttrKind::I32 => Column::I32(self.values().map(i32::from_value).collect()),
            AttrKind::Bool => Column::Bool(self.values().map(bool::from_value).collect()),
        }
    }

    /// Append `other`, coercing it to this column's kind first.
    pub fn extend_from(&mut self, other: &Column) {
        let other = other.cast(self.kind());
        match (self, other) {
            (Column::F32(a), Column::F32(b)) => a.extend(b),
            (Column::F64(a), Column::F64(b)) => a.extend(b),
            (Column::I32(a), Column::I32(b)) => a.extend(b),
            (Column::Bool(a), Column::Bool(b)) => a.extend(b),
            _ => unreachable!("cast() returns the requested kind"),
        }
    }

    /// New column holding the elements at `indices`, in that order.
    pub fn gather(&self, indices: &[usize]) -> Column {
        each!(self, |v| indices.iter().map(|&i| v[i]).collect::<Vec<_>>().into())
    }

    /// Ascending positions of nonzero elements.
    pub fn nonzero_indices(&self) -> Vec<usize> {
        each!(self, |v| v
            .iter()
            .enumerate()
            .filter(|(_, x)| x.into_value().is_nonzero())
            .map(|(i, _)| i)
            .collect())
    }

    /// Ascending positions of zero / `false` elements.
    pub fn zero_indices(&self) -> Vec<usize> {
        each!(self, |v| v
            .iter()
            .enumerate()
            .filter(|(_, x)| !x.into_value().is_nonzero())
            .map(|(i, _)| i)
            .collect())
    }

    /// Number of elements strictly greater than zero (`true` counts as 1).
    pub fn count_positive(&self) -> usize {
        each!(self, |v| v.iter().filter(|x| x.into_value().as_f64() > 0.0).count())
    }

    /// Element `i` widened to `f32` for matrix export.
    pub fn get_f32(&self, i: usize) -> Option<f32> {
        self.get(i).map(f32::from_value)
    }
}
