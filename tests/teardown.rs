use std::sync::{Arc, Mutex};

use wirebox::{ComponentBuilder, Injector};

type DropLog = Arc<Mutex<Vec<&'static str>>>;

struct Tracked {
    name: &'static str,
    log: DropLog,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(self.name);
    }
}

// Wrapper types so each binding gets its own key.
struct Config(Tracked);
struct Database(Tracked, Arc<Config>);
struct Server(Tracked, Arc<Database>);

#[test]
fn test_values_release_in_reverse_construction_order() {
    let log: DropLog = Arc::new(Mutex::new(Vec::new()));
    let (config_log, db_log, server_log) = (log.clone(), log.clone(), log.clone());

    let component = ComponentBuilder::new()
        .register_provider(move || {
            Some(Config(Tracked {
                name: "config",
                log: config_log.clone(),
            }))
        })
        .register_provider(move |config: Arc<Config>| {
            Some(Database(
                Tracked {
                    name: "database",
                    log: db_log.clone(),
                },
                config,
            ))
        })
        .register_provider(move |db: Arc<Database>| {
            Some(Server(
                Tracked {
                    name: "server",
                    log: server_log.clone(),
                },
                db,
            ))
        })
        .finalize()
        .unwrap();

    let injector = Injector::new(&component).unwrap();
    {
        let server = injector.get::<Server>().unwrap();
        assert_eq!(server.1 .1 .0.name, "config");
    }
    assert!(log.lock().unwrap().is_empty()); // Still cached by the injector

    drop(injector);
    assert_eq!(*log.lock().unwrap(), vec!["server", "database", "config"]);
}

#[test]
fn test_independent_values_release_in_reverse_resolution_order() {
    struct First(Tracked);
    struct Second(Tracked);

    let log: DropLog = Arc::new(Mutex::new(Vec::new()));
    let (first_log, second_log) = (log.clone(), log.clone());

    // Registration order says First then Second; resolution order is the
    // other way round, and teardown follows resolution.
    let component = ComponentBuilder::new()
        .register_provider(move || {
            Some(First(Tracked {
                name: "first",
                log: first_log.clone(),
            }))
        })
        .register_provider(move || {
            Some(Second(Tracked {
                name: "second",
                log: second_log.clone(),
            }))
        })
        .finalize()
        .unwrap();

    let injector = Injector::new(&component).unwrap();
    let _ = injector.get::<Second>().unwrap();
    let _ = injector.get::<First>().unwrap();

    drop(injector);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn test_values_held_elsewhere_survive_teardown() {
    struct Cache(Tracked);

    let log: DropLog = Arc::new(Mutex::new(Vec::new()));
    let cache_log = log.clone();

    let component = ComponentBuilder::new()
        .register_provider(move || {
            Some(Cache(Tracked {
                name: "cache",
                log: cache_log.clone(),
            }))
        })
        .finalize()
        .unwrap();

    let injector = Injector::new(&component).unwrap();
    let held = injector.get::<Cache>().unwrap();

    drop(injector);
    assert!(log.lock().unwrap().is_empty()); // The outstanding Arc keeps it alive

    drop(held);
    assert_eq!(*log.lock().unwrap(), vec!["cache"]);
}

#[test]
fn test_instance_bindings_are_not_torn_down() {
    struct External(Tracked);

    let log: DropLog = Arc::new(Mutex::new(Vec::new()));
    let external = Arc::new(External(Tracked {
        name: "external",
        log: log.clone(),
    }));

    let component = ComponentBuilder::new()
        .bind_instance(external.clone())
        .finalize()
        .unwrap();

    let injector = Injector::new(&component).unwrap();
    let resolved = injector.get::<External>().unwrap();
    assert!(Arc::ptr_eq(&resolved, &external));
    drop(resolved);

    drop(injector);
    // Externally owned values outlive the injector untouched.
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(external.0.name, "external");
}

#[test]
fn test_unresolved_bindings_have_nothing_to_release() {
    struct Lazy(Tracked);

    let log: DropLog = Arc::new(Mutex::new(Vec::new()));
    let lazy_log = log.clone();

    let component = ComponentBuilder::new()
        .register_provider(move || {
            Some(Lazy(Tracked {
                name: "lazy",
                log: lazy_log.clone(),
            }))
        })
        .finalize()
        .unwrap();

    let injector = Injector::new(&component).unwrap();
    drop(injector); // Never resolved, never constructed, never dropped here

    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_last_clone_triggers_teardown() {
    struct Shared(Tracked);

    let log: DropLog = Arc::new(Mutex::new(Vec::new()));
    let shared_log = log.clone();

    let component = ComponentBuilder::new()
        .register_provider(move || {
            Some(Shared(Tracked {
                name: "shared",
                log: shared_log.clone(),
            }))
        })
        .finalize()
        .unwrap();

    let injector = Injector::new(&component).unwrap();
    let clone = injector.clone();
    let _ = injector.get::<Shared>().unwrap();

    drop(injector);
    assert!(log.lock().unwrap().is_empty()); // A clone still owns the state

    drop(clone);
    assert_eq!(*log.lock().unwrap(), vec!["shared"]);
}

#[test]
fn test_multibinding_contributions_are_torn_down_too() {
    struct Hook(Tracked);

    let log: DropLog = Arc::new(Mutex::new(Vec::new()));
    let (a_log, b_log) = (log.clone(), log.clone());

    let component = ComponentBuilder::new()
        .add_multibinding_provider(move || {
            Some(Hook(Tracked {
                name: "hook-a",
                log: a_log.clone(),
            }))
        })
        .add_multibinding_provider(move || {
            Some(Hook(Tracked {
                name: "hook-b",
                log: b_log.clone(),
            }))
        })
        .finalize()
        .unwrap();

    let injector = Injector::new(&component).unwrap();
    let _ = injector.get_multibindings::<Hook>().unwrap();

    drop(injector);
    assert_eq!(*log.lock().unwrap(), vec!["hook-b", "hook-a"]);
}
