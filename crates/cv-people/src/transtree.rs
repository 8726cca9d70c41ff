//! Who infected whom.
//!
//! `sources[p]` is the person who infected `p` (`None` for people never
//! infected and for seeded infections); `targets[p]` lists everyone `p`
//! infected, in the order the infections were recorded.
//!
//! History is append-only.  If a person is infected a second time the new
//! source replaces the old one in `sources`, but the old source keeps the
//! person in its `targets` list.

use cv_core::{PersonId, PopResult, check_index};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransmissionLedger {
    sources: Vec<Option<PersonId>>,
    targets: Vec<Vec<PersonId>>,
}

impl TransmissionLedger {
    /// Empty ledger for `pop_size` people.
    pub fn new(pop_size: usize) -> Self {
        Self {
            sources: vec![None; pop_size],
            targets: vec![Vec::new(); pop_size],
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Record that `source` (or an external seed, if `None`) infected `target`.
    pub fn record_infection(&mut self, target: PersonId, source: Option<PersonId>) -> PopResult<()> {
        check_index(target.index(), self.len())?;
        if let Some(s) = source {
            check_index(s.index(), self.len())?;
        }

        let slot = &mut self.sources[target.index()];
        if let Some(previous) = *slot {
            tracing::debug!(%target, %previous, new = ?source, "re-infection overwrites source");
        }
        *slot = source;
        if let Some(s) = source {
            self.targets[s.index()].push(target);
        }
        Ok(())
    }

    /// The most recent recorded source of `target`.
    pub fn infected_by(&self, target: PersonId) -> PopResult<Option<PersonId>> {
        check_index(target.index(), self.len())?;
        Ok(self.sources[target.index()])
    }

    /// Everyone `source` infected, oldest first.
    pub fn infected_targets_of(&self, source: PersonId) -> PopResult<&[PersonId]> {
        check_index(source.index(), self.len())?;
        Ok(&self.targets[source.index()])
    }

    /// Number of people with a recorded (non-seed) source.
    pub fn n_infected(&self) -> usize {
        self.sources.iter().filter(|s| s.is_some()).count()
    }

    pub fn sources(&self) -> &[Option<PersonId>] {
        &self.sources
    }

    pub fn targets(&self) -> &[Vec<PersonId>] {
        &self.targets
    }

    /// Extend to at least `n` entries.  Never shrinks.
    pub fn grow_to(&mut self, n: usize) {
        if n > self.len() {
            self.sources.resize(n, None);
            self.targets.resize_with(n, Vec::new);
        }
    }

    /// Clear every entry for people `>= n` and every reference to them,
    /// keeping the length.
    pub fn forget_from(&mut self, n: usize) {
        for (i, s) in self.sources.iter_mut().enumerate() {
            if i >= n || s.is_some_and(|p| p.index() >= n) {
                *s = None;
            }
        }
        for (i, t) in self.targets.iter_mut().enumerate() {
            if i >= n {
                t.clear();
            } else {
                t.retain(|p| p.index() < n);
            }
        }
    }

    /// Copy of the first `n` entries, dropping references to people `>= n`.
    pub fn restricted_to(&self, n: usize) -> Self {
        let mut out = self.clone();
        out.grow_to(n);
        out.sources.truncate(n);
        out.targets.truncate(n);
        out.forget_from(n);
        out
    }

    /// Append `other`'s entries with every person shifted by `offset`.
    ///
    /// `offset` is normally `self.len()`, so `other`'s people land right
    /// after this ledger's.
    pub fn absorb(&mut self, other: TransmissionLedger, offset: u32) {
        let shift = |p: PersonId| PersonId(p.0 + offset);
        self.sources
            .extend(other.sources.into_iter().map(|s| s.map(shift)));
        self.targets
            .extend(other.targets.into_iter().map(|t| t.into_iter().map(shift).collect()));
    }
}
