//! Delegates driven by TOML configuration.

use std::cell::RefCell;
use std::rc::Rc;

use multicast::{Delegate, DelegateConfig, DelegateError, OperationTable, Receiver};
use pretty_assertions::assert_eq;

struct Lamp {
    on: bool,
}

impl Receiver for Lamp {
    fn operations() -> OperationTable<Self> {
        OperationTable::new()
            .method("toggle", |l: &mut Lamp, (): ()| {
                l.on = !l.on;
                l.on
            })
            .method("is_on", |l: &mut Lamp, (): ()| l.on)
            .method("brightness", |l: &mut Lamp, (): ()| if l.on { 100u8 } else { 0 })
    }
}

fn lamp() -> Rc<RefCell<Lamp>> {
    Rc::new(RefCell::new(Lamp { on: false }))
}

#[test]
fn atomic_config_rejects_whole_merge() {
    let config = DelegateConfig::from_toml_str("mutation_policy = \"atomic\"").unwrap();
    let hall = lamp();
    let porch = lamp();

    let toggles = {
        let mut d = Delegate::bound(&hall, "toggle").unwrap();
        d.bind(&porch, "toggle").unwrap();
        d
    };
    let levels = Delegate::bound(&porch, "brightness").unwrap();

    let mut target = Delegate::with_config(config);
    target.bind(&hall, "is_on").unwrap();

    let incoming = toggles
        .iter()
        .chain(levels.iter())
        .cloned()
        .collect::<Vec<_>>();
    let err = target.merge_bindings(incoming).unwrap_err();

    assert!(matches!(err, DelegateError::SignatureMismatch { .. }));
    assert_eq!(target.len(), 1);
}

#[test]
fn partial_config_keeps_accepted_bindings() {
    let config = DelegateConfig::from_toml_str("mutation_policy = \"partial\"").unwrap();
    let hall = lamp();
    let porch = lamp();

    let toggles = Delegate::bound(&hall, "toggle").unwrap();
    let levels = Delegate::bound(&porch, "brightness").unwrap();

    let mut target = Delegate::with_config(config);
    let incoming = toggles
        .iter()
        .chain(levels.iter())
        .cloned()
        .collect::<Vec<_>>();
    assert!(target.merge_bindings(incoming).is_err());
    assert_eq!(target.len(), 1);

    assert_eq!(target.call::<bool, _>(()).unwrap(), Some(true));
    assert!(hall.borrow().on);
}

#[test]
fn skip_config_tolerates_dropped_receivers() {
    let config = DelegateConfig::from_toml_str("dead_receivers = \"skip\"").unwrap();
    let hall = lamp();
    let porch = lamp();

    let mut toggles = Delegate::with_config(config);
    toggles.bind(&hall, "toggle").unwrap();
    toggles.bind(&porch, "toggle").unwrap();
    drop(porch);

    assert_eq!(toggles.call::<bool, _>(()).unwrap(), Some(true));
    assert_eq!(toggles.prune_dead(), 1);
}

#[test]
fn copies_inherit_configuration() {
    let config = DelegateConfig::from_toml_str("dead_receivers = \"skip\"").unwrap();
    let hall = lamp();

    let mut source = Delegate::with_config(config);
    source.bind(&hall, "toggle").unwrap();

    let copy = Delegate::from_delegate(&source).unwrap();
    assert_eq!(copy.config(), &config);
}
