//! Attribute schema: the fixed, ordered set of per-person (or per-edge)
//! attribute names, their element kinds, and their logical groups.
//!
//! A schema is immutable once built.  Stores, layers and snapshots share it
//! behind an `Arc`; nothing ever mutates it through that handle.
//!
//! ```rust
//! use cv_core::{AttrKind, AttributeSchema};
//!
//! let schema = AttributeSchema::builder()
//!     .group("person", [("uid", AttrKind::I32), ("age", AttrKind::F32)])
//!     .group("states", [("infectious", AttrKind::Bool)])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.all_attribute_names().collect::<Vec<_>>(), ["uid", "age", "infectious"]);
//! assert_eq!(schema.type_of("age").unwrap(), AttrKind::F32);
//! assert!(schema.type_of("height").is_err());
//! ```

use rustc_hash::FxHashMap;

use crate::{AttrId, AttrKind, PopError, PopResult};

/// Ordered attribute registry with named groups.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSchema {
    names:  Vec<String>,
    kinds:  Vec<AttrKind>,
    groups: Vec<(String, Vec<AttrId>)>,
    lookup: FxHashMap<String, AttrId>,
}

impl AttributeSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// A schema with no attributes.  The default edge-extra schema.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default epidemic person schema.
    ///
    /// | Group    | Kind   | Attributes                                          |
    /// |----------|--------|-----------------------------------------------------|
    /// | `person` | mixed  | `uid`, `age`, `sex`, outcome probabilities, `rel_*` |
    /// | `states` | bool   | disease, testing and quarantine flags               |
    /// | `dates`  | f32    | `date_<state>` for every state but `susceptible`    |
    /// | `durs`   | f32    | stage durations                                     |
    pub fn people() -> Self {
        use AttrKind::*;

        const STATES: [&str; 12] = [
            "susceptible", "exposed", "infectious", "symptomatic", "severe", "critical",
            "tested", "diagnosed", "recovered", "dead", "known_contact", "quarantined",
        ];
        const DURS: [&str; 5] =
            ["dur_exp2inf", "dur_inf2sym", "dur_sym2sev", "dur_sev2crit", "dur_disease"];

        let person = [
            ("uid", I32),
            ("age", F32),
            ("sex", I32),
            ("symp_prob", F32),
            ("severe_prob", F32),
            ("crit_prob", F32),
            ("death_prob", F32),
            ("rel_trans", F32),
            ("rel_sus", F32),
        ];
        let dates: Vec<(String, AttrKind)> = STATES[1..]
            .iter()
            .map(|s| (format!("date_{s}"), F32))
            .chain(std::iter::once(("date_end_quarantine".to_owned(), F32)))
            .collect();

        let built = SchemaBuilder::default()
            .group("person", person)
            .group("states", STATES.map(|s| (s, Bool)))
            .group("dates", dates)
            .group("durs", DURS.map(|s| (s, F32)))
            .build();
        match built {
            Ok(schema) => schema,
            Err(e) => unreachable!("built-in people schema is invalid: {e}"),
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Every attribute name in declaration order.
    pub fn all_attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Names in group `group`, in declaration order.
    pub fn group(&self, group: &str) -> PopResult<Vec<&str>> {
        self.groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, ids)| ids.iter().map(|&id| self.name(id)).collect())
            .ok_or_else(|| PopError::UnknownAttribute(group.to_owned()))
    }

    /// Group names in declaration order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(|(g, _)| g.as_str())
    }

    pub fn type_of(&self, name: &str) -> PopResult<AttrKind> {
        self.id(name).map(|id| self.kind(id))
    }

    /// Resolve `name` to its dense index.
    #[inline]
    pub fn id(&self, name: &str) -> PopResult<AttrId> {
        self.lookup
            .get(name)
            .copied()
            .ok_or_else(|| PopError::UnknownAttribute(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Name of `id`.  Panics if `id` did not come from this schema.
    #[inline]
    pub fn name(&self, id: AttrId) -> &str {
        &self.names[id.index()]
    }

    /// Kind of `id`.  Panics if `id` did not come from this schema.
    #[inline]
    pub fn kind(&self, id: AttrId) -> AttrKind {
        self.kinds[id.index()]
    }

    /// `(id, name, kind)` for every attribute in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (AttrId, &str, AttrKind)> + '_ {
        self.names
            .iter()
            .zip(&self.kinds)
            .enumerate()
            .map(|(i, (n, &k))| (AttrId(i as u16), n.as_str(), k))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `true` if both schemas declare the same names with the same kinds in
    /// the same order.  Grouping is ignored.
    pub fn same_attributes(&self, other: &AttributeSchema) -> bool {
        self.names == other.names && self.kinds == other.kinds
    }
}

// ── SchemaBuilder ─────────────────────────────────────────────────────────────

/// Collects groups of `(name, kind)` pairs; [`build`](Self::build) checks that
/// every name is unique.
#[derive(Default)]
pub struct SchemaBuilder {
    groups: Vec<(String, Vec<(String, AttrKind)>)>,
}

impl SchemaBuilder {
    /// Append a group.  Declaring the same group name twice extends it.
    pub fn group<I, S>(mut self, group: &str, attrs: I) -> Self
    where
        I: IntoIterator<Item = (S, AttrKind)>,
        S: Into<String>,
    {
        let attrs = attrs.into_iter().map(|(n, k)| (n.into(), k));
        match self.groups.iter_mut().find(|(g, _)| g == group) {
            Some((_, existing)) => existing.extend(attrs),
            None => self.groups.push((group.to_owned(), attrs.collect())),
        }
        self
    }

    pub fn build(self) -> PopResult<AttributeSchema> {
        let mut schema = AttributeSchema::default();
        for (group, attrs) in self.groups {
            let mut ids = Vec::with_capacity(attrs.len());
            for (name, kind) in attrs {
                if schema.lookup.contains_key(&name) {
                    return Err(PopError::DuplicateAttribute(name));
                }
                let id = AttrId::try_from(schema.names.len())
                    .map_err(|_| PopError::Config("too many attributes".to_owned()))?;
                schema.lookup.insert(name.clone(), id);
                schema.names.push(name);
                schema.kinds.push(kind);
                ids.push(id);
            }
            schema.groups.push((group, ids));
        }
        Ok(schema)
    }
}
