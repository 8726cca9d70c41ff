//! Unit tests for cv-people.

#[cfg(test)]
mod ledger {
    use cv_core::{PersonId, PopError};

    use crate::TransmissionLedger;

    #[test]
    fn record_and_query() {
        let mut tree = TransmissionLedger::new(10);
        tree.record_infection(PersonId(5), Some(PersonId(2))).unwrap();
        assert_eq!(tree.infected_by(PersonId(5)).unwrap(), Some(PersonId(2)));
        assert!(tree.infected_targets_of(PersonId(2)).unwrap().contains(&PersonId(5)));
        assert_eq!(tree.n_infected(), 1);
    }

    #[test]
    fn seeded_infection_has_no_source() {
        let mut tree = TransmissionLedger::new(3);
        tree.record_infection(PersonId(1), None).unwrap();
        assert_eq!(tree.infected_by(PersonId(1)).unwrap(), None);
        assert!(tree.targets().iter().all(Vec::is_empty));
    }

    #[test]
    fn indices_are_bounds_checked() {
        let mut tree = TransmissionLedger::new(10);
        assert_eq!(
            tree.record_infection(PersonId(10), None),
            Err(PopError::IndexOutOfRange { index: 10, len: 10 })
        );
        assert_eq!(
            tree.record_infection(PersonId(1), Some(PersonId(12))),
            Err(PopError::IndexOutOfRange { index: 12, len: 10 })
        );
        assert!(tree.infected_by(PersonId(99)).is_err());
        assert!(tree.infected_targets_of(PersonId(99)).is_err());
        // Nothing was written.
        assert_eq!(tree, TransmissionLedger::new(10));
    }

    #[test]
    fn reinfection_overwrites_source_and_keeps_history() {
        let mut tree = TransmissionLedger::new(10);
        tree.record_infection(PersonId(5), Some(PersonId(2))).unwrap();
        tree.record_infection(PersonId(5), Some(PersonId(3))).unwrap();
        assert_eq!(tree.infected_by(PersonId(5)).unwrap(), Some(PersonId(3)));
        assert_eq!(tree.infected_targets_of(PersonId(2)).unwrap(), [PersonId(5)]);
        assert_eq!(tree.infected_targets_of(PersonId(3)).unwrap(), [PersonId(5)]);
    }

    #[test]
    fn targets_are_chronological() {
        let mut tree = TransmissionLedger::new(10);
        for t in [7, 1, 4] {
            tree.record_infection(PersonId(t), Some(PersonId(0))).unwrap();
        }
        assert_eq!(
            tree.infected_targets_of(PersonId(0)).unwrap(),
            [PersonId(7), PersonId(1), PersonId(4)]
        );
    }

    #[test]
    fn grow_to_never_shrinks() {
        let mut tree = TransmissionLedger::new(4);
        tree.grow_to(2);
        assert_eq!(tree.len(), 4);
        tree.grow_to(6);
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.targets().len(), 6);
    }

    #[test]
    fn absorb_shifts_people() {
        let mut a = TransmissionLedger::new(3);
        a.record_infection(PersonId(1), Some(PersonId(0))).unwrap();
        let mut b = TransmissionLedger::new(2);
        b.record_infection(PersonId(0), Some(PersonId(1))).unwrap();
        a.absorb(b, 3);
        assert_eq!(a.len(), 5);
        assert_eq!(a.infected_by(PersonId(3)).unwrap(), Some(PersonId(4)));
        assert_eq!(a.infected_targets_of(PersonId(4)).unwrap(), [PersonId(3)]);
        assert_eq!(a.infected_by(PersonId(1)).unwrap(), Some(PersonId(0)));
    }

    #[test]
    fn forget_from_clears_tail_and_references() {
        let mut tree = TransmissionLedger::new(6);
        tree.record_infection(PersonId(4), Some(PersonId(1))).unwrap();
        tree.record_infection(PersonId(2), Some(PersonId(5))).unwrap();
        tree.record_infection(PersonId(5), Some(PersonId(3))).unwrap();
        tree.record_infection(PersonId(0), Some(PersonId(1))).unwrap();
        tree.forget_from(4);
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.infected_by(PersonId(4)).unwrap(), None);
        assert_eq!(tree.infected_by(PersonId(5)).unwrap(), None);
        assert_eq!(tree.infected_by(PersonId(2)).unwrap(), None);
        assert_eq!(tree.infected_targets_of(PersonId(1)).unwrap(), [PersonId(0)]);
        assert!(tree.infected_targets_of(PersonId(3)).unwrap().is_empty());
        assert_eq!(tree.n_infected(), 1);
    }

    #[test]
    fn restricted_to_drops_outside_references() {
        let mut tree = TransmissionLedger::new(6);
        tree.record_infection(PersonId(1), Some(PersonId(5))).unwrap();
        tree.record_infection(PersonId(5), Some(PersonId(0))).unwrap();
        tree.record_infection(PersonId(2), Some(PersonId(0))).unwrap();
        let head = tree.restricted_to(3);
        assert_eq!(head.len(), 3);
        assert_eq!(head.infected_by(PersonId(1)).unwrap(), None);
        assert_eq!(head.infected_targets_of(PersonId(0)).unwrap(), [PersonId(2)]);
    }
}

#[cfg(test)]
mod builder {
    use cv_core::{AttrKind, AttributeSchema, Parameters, PopError};

    use crate::{PopulationBuilder, PopulationStore, StoreState};

    #[test]
    fn every_attribute_has_pop_size_elements() {
        for n in [0, 1, 37] {
            let people = PopulationStore::initialize(Parameters::default(), Some(n)).unwrap();
            assert_eq!(people.len(), n);
            for key in people.keys(None).unwrap() {
                assert_eq!(people.get(key).unwrap().len(), n, "{key}");
            }
            assert_eq!(people.transtree().len(), n);
            assert_eq!(people.state(), StoreState::Initialized);
        }
    }

    #[test]
    fn pop_size_defaults_to_parameters() {
        let people = PopulationStore::initialize(Parameters::default().with_pop_size(50), None).unwrap();
        assert_eq!(people.len(), 50);
    }

    #[test]
    fn arrays_start_zeroed() {
        let people = PopulationStore::initialize(Parameters::default(), Some(5)).unwrap();
        assert_eq!(people.slice::<f32>("age").unwrap(), [0.0; 5]);
        assert_eq!(people.slice::<bool>("dead").unwrap(), [false; 5]);
        assert_eq!(people.slice::<i32>("uid").unwrap(), [0; 5]);
    }

    #[test]
    fn contacts_are_keyed_by_configured_layers() {
        let people = PopulationStore::initialize(Parameters::hybrid(), Some(10)).unwrap();
        assert_eq!(people.contacts().layer_names().collect::<Vec<_>>(), ["h", "s", "w", "c"]);
        assert_eq!(people.contact_keys().collect::<Vec<_>>(), ["h", "s", "w", "c"]);
        assert_eq!(people.contacts().total_edges(), 0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut pars = Parameters::hybrid();
        pars.beta_layer.insert("h".to_owned(), -1.0);
        assert!(matches!(
            PopulationStore::initialize(pars, Some(10)),
            Err(PopError::Config(_))
        ));
    }

    #[test]
    fn custom_schemas() {
        let schema = AttributeSchema::builder()
            .group("person", [("uid", AttrKind::I32), ("weight", AttrKind::F64)])
            .build()
            .unwrap();
        let edges = AttributeSchema::builder()
            .group("contacts", [("duration", AttrKind::F32)])
            .build()
            .unwrap();
        let people = PopulationBuilder::new(Parameters::default())
            .pop_size(4)
            .schema(schema)
            .edge_schema(edges)
            .build()
            .unwrap();
        assert_eq!(people.keys(None).unwrap(), ["uid", "weight"]);
        assert!(people.get("age").is_err());
        assert_eq!(people.contacts().get("a").unwrap().extra("duration").unwrap().len(), 0);
    }
}

#[cfg(test)]
mod store {
    use cv_contacts::EdgeBatch;
    use cv_core::{Column, Parameters, PersonId, PopError, Value};

    use crate::{PopulationStore, StoreState};

    fn people(n: usize) -> PopulationStore {
        PopulationStore::initialize(Parameters::hybrid(), Some(n)).unwrap()
    }

    fn ids(v: &[u32]) -> Vec<PersonId> {
        v.iter().map(|&i| PersonId(i)).collect()
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let mut p = people(3);
        assert_eq!(p.get("height"), Err(PopError::UnknownAttribute("height".into())));
        assert!(p.set("height", vec![1.0_f32; 3]).is_err());
        assert!(p.select_true("height").is_err());
        assert!(p.keys(Some("nope")).is_err());
    }

    #[test]
    fn set_coerces_to_declared_kind() {
        let mut p = people(3);
        p.set("age", vec![30_i32, 40, 50]).unwrap();
        assert_eq!(p.get("age").unwrap(), &Column::F32(vec![30.0, 40.0, 50.0]));
        p.set("symptomatic", vec![0.0_f64, 2.5, 0.0]).unwrap();
        assert_eq!(p.slice::<bool>("symptomatic").unwrap(), [false, true, false]);
    }

    #[test]
    fn set_with_wrong_length_fails() {
        let mut p = people(4);
        let err = p.set("age", vec![1.0_f32; 3]).unwrap_err();
        assert_eq!(
            err,
            PopError::LengthMismatch { what: "age".into(), expected: 4, got: 3 }
        );
        assert_eq!(p.get("age").unwrap().len(), 4);
    }

    #[test]
    fn strict_validate_locks_until_repaired() {
        let mut p = people(4);
        p.set_allow_mismatch("age", vec![1.0_f32; 6]).unwrap();
        assert!(matches!(p.validate(true), Err(PopError::LengthMismatch { .. })));
        assert_eq!(p.state(), StoreState::Invalid);
        assert_eq!(p.materialize_one(PersonId(0)), Err(PopError::InvalidState));
        assert_eq!(p.to_array(), Err(PopError::InvalidState));
        assert!(matches!(p.combine(&people(1)), Err(PopError::InvalidState)));

        p.set_allow_mismatch("age", vec![1.0_f32; 4]).unwrap();
        p.validate(true).unwrap();
        assert_eq!(p.state(), StoreState::Initialized);
        assert!(p.materialize_one(PersonId(0)).is_ok());
    }

    #[test]
    fn lenient_validate_resizes() {
        let mut p = people(5);
        p.set_allow_mismatch("age", vec![1.0_f32; 3]).unwrap();
        p.set_allow_mismatch("sex", vec![1_i32; 8]).unwrap();
        p.validate(false).unwrap();
        assert_eq!(p.slice::<f32>("age").unwrap(), [1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(p.slice::<i32>("sex").unwrap(), [1; 5]);
        assert_eq!(p.state(), StoreState::Initialized);
    }

    #[test]
    fn typed_slices() {
        let mut p = people(4);
        p.slice_mut::<f32>("age").unwrap()[2] = 70.0;
        assert_eq!(p.slice::<f32>("age").unwrap()[2], 70.0);
        assert!(matches!(p.slice::<i32>("age"), Err(PopError::KindMismatch { .. })));
        assert!(matches!(p.slice_mut::<f64>("dead"), Err(PopError::KindMismatch { .. })));

        let id = p.schema().id("age").unwrap();
        assert_eq!(p.column(id).get(2), Some(Value::F32(70.0)));
    }

    #[test]
    fn select_and_count() {
        let mut p = people(6);
        p.set("infectious", vec![false, true, false, true, true, false]).unwrap();
        assert_eq!(p.select_true("infectious").unwrap(), ids(&[1, 3, 4]));
        assert_eq!(p.select_false("infectious").unwrap(), ids(&[0, 2, 5]));
        assert_eq!(p.count("infectious").unwrap(), 3);

        p.set("date_dead", vec![-1.0_f32, 0.0, 3.0, f32::NAN, 0.5, 0.0]).unwrap();
        assert_eq!(p.select_true("date_dead").unwrap(), ids(&[0, 2, 3, 4]));
        assert_eq!(p.select_false("date_dead").unwrap(), ids(&[1, 5]));
        // Negative and NaN entries are nonzero but not positive.
        assert_eq!(p.count("date_dead").unwrap(), 2);
    }

    #[test]
    fn keys_by_group() {
        let p = people(1);
        let states = p.keys(Some("states")).unwrap();
        assert_eq!(states.first(), Some(&"susceptible"));
        assert!(states.contains(&"quarantined"));
        assert_eq!(p.keys(None).unwrap().len(), p.schema().len());
        assert_eq!(p.indices().collect::<Vec<_>>(), ids(&[0]));
    }

    #[test]
    fn resize_smaller_truncates() {
        let mut p = people(10);
        p.set("age", (0..10).map(|i| i as f32).collect::<Vec<_>>()).unwrap();
        p.resize(4, None).unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p.slice::<f32>("age").unwrap(), [0.0, 1.0, 2.0, 3.0]);
        for key in p.keys(None).unwrap() {
            assert_eq!(p.get(key).unwrap().len(), 4);
        }
        // The ledger keeps its history but infections are bounded by the
        // new size.
        assert_eq!(p.transtree().len(), 10);
        assert!(p.record_infection(PersonId(7), None).is_err());
    }

    #[test]
    fn resize_larger_zero_extends_listed_names() {
        let mut p = people(2);
        p.set("age", vec![5.0_f32, 6.0]).unwrap();
        p.resize(4, Some(&["age"][..])).unwrap();
        assert_eq!(p.slice::<f32>("age").unwrap(), [5.0, 6.0, 0.0, 0.0]);
        assert_eq!(p.get("sex").unwrap().len(), 2);
        assert!(p.validate(true).is_err());
        p.validate(false).unwrap();
        assert_eq!(p.get("sex").unwrap().len(), 4);
        assert_eq!(p.transtree().len(), 4);
        assert!(p.resize(4, Some(&["height"][..])).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn populations_are_bounded_by_person_ids() {
        use crate::store::person_bound;

        assert_eq!(person_bound(7).unwrap(), 7);
        assert_eq!(person_bound(u32::MAX as usize).unwrap(), u32::MAX);
        assert!(matches!(person_bound(u32::MAX as usize + 1), Err(PopError::Config(_))));
        assert_eq!(people(3).indices().collect::<Vec<_>>(), ids(&[0, 1, 2]));
    }

    #[test]
    fn regrowing_forgets_removed_people() {
        let mut p = people(10);
        p.record_infection(PersonId(7), Some(PersonId(2))).unwrap();
        p.record_infection(PersonId(3), Some(PersonId(8))).unwrap();
        p.record_infection(PersonId(4), Some(PersonId(1))).unwrap();
        p.resize(5, None).unwrap();
        p.resize(10, None).unwrap();

        assert_eq!(p.slice::<f32>("age").unwrap()[7], 0.0);
        assert_eq!(p.infected_by(PersonId(7)).unwrap(), None);
        assert!(p.infected_targets_of(PersonId(2)).unwrap().is_empty());
        assert_eq!(p.infected_by(PersonId(3)).unwrap(), None);
        assert!(p.infected_targets_of(PersonId(8)).unwrap().is_empty());
        // History among surviving people is kept.
        assert_eq!(p.infected_by(PersonId(4)).unwrap(), Some(PersonId(1)));
        assert_eq!(p.infected_targets_of(PersonId(1)).unwrap(), [PersonId(4)]);
    }

    #[test]
    fn combine_rejects_dangling_edges() {
        let mut a = people(10);
        a.add_contacts(EdgeBatch::from_pairs([(3, 8), (1, 2)]), Some("h"), None).unwrap();
        a.resize(5, None).unwrap();
        let b = people(5);

        assert_eq!(a.combine(&b), Err(PopError::IndexOutOfRange { index: 8, len: 5 }));
        assert_eq!(b.combine(&a), Err(PopError::IndexOutOfRange { index: 8, len: 5 }));

        assert_eq!(a.contacts_mut().retain_within(5), 1);
        let c = a.combine(&b).unwrap();
        let h = c.contacts().get("h").unwrap();
        assert_eq!(h.p1, ids(&[1]));
        assert_eq!(h.p2, ids(&[2]));
        c.contacts().check_indices(c.len()).unwrap();
    }

    #[test]
    fn combine_concatenates_and_renumbers() {
        let mut a = people(3);
        a.set("age", vec![10.0_f32, 20.0, 30.0]).unwrap();
        a.set("uid", vec![7_i32, 8, 9]).unwrap();
        a.add_contacts(EdgeBatch::from_pairs([(0, 1)]), Some("h"), None).unwrap();
        a.record_infection(PersonId(1), Some(PersonId(0))).unwrap();

        let mut b = people(2);
        b.set("age", vec![40.0_f32, 50.0]).unwrap();
        b.set("uid", vec![100_i32, 100]).unwrap();
        b.add_contacts(EdgeBatch::from_pairs([(0, 1)]), Some("h"), None).unwrap();
        b.record_infection(PersonId(0), Some(PersonId(1))).unwrap();

        let c = a.combine(&b).unwrap();
        assert_eq!(c.len(), 5);
        assert_eq!(c.slice::<i32>("uid").unwrap(), [0, 1, 2, 3, 4]);
        assert_eq!(c.slice::<f32>("age").unwrap(), [10.0, 20.0, 30.0, 40.0, 50.0]);

        let h = c.contacts().get("h").unwrap();
        let pairs: Vec<_> = h.p1.iter().zip(&h.p2).map(|(x, y)| (x.0, y.0)).collect();
        assert_eq!(pairs, [(0, 1), (3, 4)]);

        assert_eq!(c.infected_by(PersonId(1)).unwrap(), Some(PersonId(0)));
        assert_eq!(c.infected_by(PersonId(3)).unwrap(), Some(PersonId(4)));

        // Inputs are untouched.
        assert_eq!(a.len(), 3);
        assert_eq!(a.slice::<i32>("uid").unwrap(), [7, 8, 9]);

        assert_eq!((&a + &b).unwrap(), c);
    }

    #[test]
    fn combine_rejects_different_schemas() {
        use cv_core::{AttrKind, AttributeSchema};

        let other = crate::PopulationBuilder::new(Parameters::hybrid())
            .pop_size(2)
            .schema(
                AttributeSchema::builder()
                    .group("person", [("uid", AttrKind::I32)])
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert!(matches!(people(2).combine(&other), Err(PopError::SchemaMismatch(_))));
    }

    #[test]
    fn to_array_uses_row_index_for_uid() {
        let mut p = people(3);
        p.set("uid", vec![9_i32, 9, 9]).unwrap();
        p.set("age", vec![1.5_f32, 2.5, 3.5]).unwrap();
        p.set("dead", vec![false, true, false]).unwrap();
        let rows = p.to_array().unwrap();
        let uid = p.schema().id("uid").unwrap().index();
        let age = p.schema().id("age").unwrap().index();
        let dead = p.schema().id("dead").unwrap().index();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == p.schema().len()));
        assert_eq!(rows.iter().map(|r| r[uid]).collect::<Vec<_>>(), [0.0, 1.0, 2.0]);
        assert_eq!(rows[2][age], 3.5);
        assert_eq!(rows[1][dead], 1.0);
    }

    #[test]
    fn snapshots_are_detached() {
        let mut p = people(3);
        p.set("age", vec![1.0_f32, 2.0, 3.0]).unwrap();
        let snap = p.materialize_one(PersonId(1)).unwrap();
        p.slice_mut::<f32>("age").unwrap()[1] = 99.0;
        assert_eq!(snap.get("age").unwrap(), Value::F32(2.0));
        assert_eq!(snap.index(), PersonId(1));
        assert_eq!(
            p.materialize_one(PersonId(3)),
            Err(PopError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn rebuild_from_snapshots_round_trip() {
        let mut p = people(3);
        p.set("age", vec![1.0_f32, 2.0, 3.0]).unwrap();
        let mut snaps = p.to_people().unwrap();
        snaps[0].set("age", Value::I32(42)).unwrap();
        snaps.pop();

        let mut q = people(10);
        q.rebuild_from_snapshots(&snaps, true).unwrap();
        assert_eq!(q.len(), 2);
        assert_eq!(q.slice::<f32>("age").unwrap(), [42.0, 2.0]);
    }

    #[test]
    fn rebuild_without_resize_needs_room() {
        let snaps = people(3).to_people().unwrap();
        let mut q = people(2);
        assert!(matches!(
            q.rebuild_from_snapshots(&snaps, false),
            Err(PopError::IndexOutOfRange { .. })
        ));
        let mut q = people(5);
        q.rebuild_from_snapshots(&snaps, false).unwrap();
        assert_eq!(q.len(), 5);
    }

    #[test]
    fn dynamic_layers_are_removed_and_reinitialized() {
        let mut p = people(10);
        p.add_contacts(EdgeBatch::from_pairs([(0, 1)]), Some("c"), None).unwrap();
        assert_eq!(p.remove_dynamic_contacts(), 1);
        assert!(!p.contacts().contains("c"));
        assert_eq!(p.contacts().layer_names().count(), 4);

        p.init_contacts(Some(&["c"][..]));
        assert_eq!(p.contacts().get("c").unwrap().edge_count(), 0);
    }

    #[test]
    fn store_level_infections() {
        let mut p = people(10);
        p.record_infection(PersonId(5), Some(PersonId(2))).unwrap();
        assert_eq!(p.infected_by(PersonId(5)).unwrap(), Some(PersonId(2)));
        assert!(p.infected_targets_of(PersonId(2)).unwrap().contains(&PersonId(5)));
        assert!(p.record_infection(PersonId(10), None).is_err());
    }
}
