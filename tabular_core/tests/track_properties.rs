//! Property tests for no-op tracking
//!
//! Whatever name is requested, when it does not resolve to a usable backend
//! the wrapped iterator must yield the input unchanged.

use proptest::prelude::*;
use tabular_core::progress::{BackendKind, BackendRegistry, ProgressFacade, TrackSpec};

fn unknown_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _-]{0,16}".prop_filter("must not name a known backend", |name| {
        BackendKind::normalize(Some(name)).is_err()
    })
}

proptest! {
    #[test]
    fn unknown_backend_is_identity(name in unknown_name(), items in prop::collection::vec(any::<i64>(), 0..64)) {
        let facade = ProgressFacade::new();
        let tracked: Vec<i64> = facade
            .track(Some(&name), items.clone(), TrackSpec::new())
            .unwrap()
            .collect();
        prop_assert_eq!(tracked, items);
    }

    #[test]
    fn missing_backend_is_identity(kind in prop::sample::select(BackendKind::ALL.to_vec()), items in prop::collection::vec(any::<u8>(), 0..64)) {
        let facade = ProgressFacade::with_registry(BackendRegistry::empty());
        let tracked: Vec<u8> = facade
            .track(Some(kind.as_str()), items.clone(), TrackSpec::new())
            .unwrap()
            .collect();
        prop_assert_eq!(tracked, items);
    }
}
