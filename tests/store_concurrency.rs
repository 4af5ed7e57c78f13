//! Writers with separate engines on one on-disk store.

use std::thread;

use folio::context::ServiceContext;
use folio::model::ResourceFields;
use folio::Engine;

#[test]
fn separate_engines_never_lose_commits() {
    let dir = std::env::temp_dir().join(format!("folio_concurrent_store_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let setup = Engine::new(ServiceContext::live(), &dir);
    let collection = setup.create_collection("Atlas", "").unwrap().id;
    setup.get_or_create_draft(&collection).unwrap();

    let failures: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|writer| {
                let (dir, collection) = (&dir, &collection);
                s.spawn(move || {
                    // No shared in-process lock table: only the store lock applies.
                    let engine = Engine::new(ServiceContext::live(), dir);
                    (0..15)
                        .filter(|i| {
                            let fields =
                                ResourceFields { title: format!("w{writer}-{i}"), ..ResourceFields::default() };
                            engine.add_resource(collection, fields).is_err()
                        })
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    let record = setup.record(&collection).unwrap();
    assert_eq!(failures, 0);
    assert_eq!(record.resources.len(), 90);
    assert_eq!(record.revision, 91);

    let _ = std::fs::remove_dir_all(&dir);
}
