use std::sync::Arc;

use wirebox::{ComponentBuilder, DiError, Factory, Injector, Signature};

#[derive(Debug)]
struct Request {
    route: String,
    body: Vec<u8>,
}

struct Router {
    base: String,
}

#[test]
fn test_factory_combines_required_and_assisted_params() {
    let component = ComponentBuilder::new()
        .bind_instance(Arc::new(Router {
            base: "/api".to_string(),
        }))
        .register_factory::<Request, (String, Vec<u8>), _>(
            Signature::new()
                .required::<Router>()
                .assisted::<String>()
                .assisted::<Vec<u8>>(),
            |params, (path, body)| {
                let router = params.take::<Router>()?;
                Ok(Request {
                    route: format!("{}{}", router.base, path),
                    body,
                })
            },
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let factory = injector.get_factory::<(String, Vec<u8>), Request>().unwrap();
    let request = factory
        .create(("/users".to_string(), vec![1, 2, 3]))
        .unwrap();

    assert_eq!(request.route, "/api/users");
    assert_eq!(request.body, vec![1, 2, 3]);
}

#[test]
fn test_each_create_builds_a_fresh_value() {
    struct Session {
        id: u32,
    }

    let component = ComponentBuilder::new()
        .register_factory::<Session, (u32,), _>(
            Signature::new().assisted::<u32>(),
            |_params, (id,)| Ok(Session { id }),
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let factory = injector.get_factory::<(u32,), Session>().unwrap();
    let a = factory.create((1,)).unwrap();
    let b = factory.create((2,)).unwrap();

    assert_eq!(a.id, 1);
    assert_eq!(b.id, 2); // Products are plain values, not cached
}

#[test]
fn test_factory_value_itself_is_memoized() {
    let component = ComponentBuilder::new()
        .register_factory::<u64, (u64,), _>(
            Signature::new().assisted::<u64>(),
            |_params, (n,)| Ok(n * 2),
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let first = injector.get_factory::<(u64,), u64>().unwrap();
    let second = injector.get_factory::<(u64,), u64>().unwrap();
    assert!(Arc::ptr_eq(&first, &second)); // The factory is a singleton like any binding
}

#[test]
fn test_required_params_are_captured_eagerly() {
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Config {
        greeting: String,
        banners_made: AtomicU32,
    }

    struct Banner {
        text: String,
    }

    let component = ComponentBuilder::new()
        .bind_instance(Arc::new(Config {
            greeting: "hello".to_string(),
            banners_made: AtomicU32::new(0),
        }))
        .register_factory::<Banner, (String,), _>(
            Signature::new().required::<Config>().assisted::<String>(),
            |params, (name,)| {
                let config = params.take::<Config>()?;
                config.banners_made.fetch_add(1, Ordering::SeqCst);
                Ok(Banner {
                    text: format!("{} {}", config.greeting, name),
                })
            },
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let factory = injector.get_factory::<(String,), Banner>().unwrap();
    let banner = factory.create(("world".to_string(),)).unwrap();
    assert_eq!(banner.text, "hello world");

    // The factory captured the same memoized Config the injector hands out.
    let config = injector.get::<Config>().unwrap();
    assert_eq!(config.banners_made.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_with_no_assisted_params() {
    struct Job {
        runs: u32,
    }

    let component = ComponentBuilder::new()
        .bind_instance(Arc::new(4u32))
        .register_factory::<Job, (), _>(
            Signature::new().required::<u32>(),
            |params, ()| {
                let runs = params.take::<u32>()?;
                Ok(Job { runs: *runs })
            },
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let factory = injector.get_factory::<(), Job>().unwrap();
    assert_eq!(factory.create(()).unwrap().runs, 4);
}

#[test]
fn test_product_reports_the_produced_type() {
    let component = ComponentBuilder::new()
        .register_factory::<Request, (String, Vec<u8>), _>(
            Signature::new().assisted::<String>().assisted::<Vec<u8>>(),
            |_params, (route, body)| Ok(Request { route, body }),
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let factory = injector.get_factory::<(String, Vec<u8>), Request>().unwrap();
    assert!(factory.product().ends_with("Request"));
}

#[test]
fn test_deferred_param_fails_after_injector_drop() {
    // A factory whose captured param was deferred (cycle through Holder)
    // needs the injector alive at create time.
    struct Holder {
        factory: Arc<Factory<(), Tick>>,
    }
    struct Tick {
        _holder: Arc<Holder>,
    }

    let component = ComponentBuilder::new()
        .register_provider(|factory: Arc<Factory<(), Tick>>| Some(Holder { factory }))
        .register_factory::<Tick, (), _>(
            Signature::new().required::<Holder>(),
            |params, ()| {
                Ok(Tick {
                    _holder: params.take::<Holder>()?,
                })
            },
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let holder = injector.get::<Holder>().unwrap();
    let factory = holder.factory.clone();
    assert!(factory.create(()).is_ok()); // Injector alive: deferred param resolves

    drop(holder);
    drop(injector);

    match factory.create(()) {
        Err(DiError::InjectorDropped(product)) => assert!(product.ends_with("Tick")),
        other => panic!("Expected InjectorDropped, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_factory_outliving_injector_with_ready_params_still_works() {
    struct Stamp {
        label: String,
    }

    let component = ComponentBuilder::new()
        .bind_instance(Arc::new("v1".to_string()))
        .register_factory::<Stamp, (String,), _>(
            Signature::new().required::<String>().assisted::<String>(),
            |params, (name,)| {
                let version = params.take::<String>()?;
                Ok(Stamp {
                    label: format!("{}-{}", name, version),
                })
            },
        )
        .finalize()
        .unwrap();
    let injector = Injector::new(&component).unwrap();

    let factory = injector.get_factory::<(String,), Stamp>().unwrap();
    drop(injector);

    // No deferred slots here; the capture keeps the params alive on its own.
    let stamp = factory.create(("build".to_string(),)).unwrap();
    assert_eq!(stamp.label, "build-v1");
}
