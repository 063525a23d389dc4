use std::future::{ready, Ready};
use std::sync::{Arc, Mutex};

use event_horizon::{
    ErrorCode, ExistenceIndex, HandlerError, Horizon, HorizonError, Message, Payload, Resolver,
    Scope, ScopeSpec,
};

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(
    log: &Log,
    tag: &'static str,
) -> impl Fn(Message) -> Ready<Result<(), HandlerError>> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |msg: Message| {
        log.lock().unwrap().push(format!("{tag}:{}", msg.kind()));
        ready(Ok(()))
    }
}

fn seen(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn sibling_name_is_not_in_scope_until_torn_down() {
    let root = Scope::root_isolated();
    let s1 = root.establish(ScopeSpec::named("inbox"));
    let s2 = root.establish(ScopeSpec::named("outbox"));

    assert!(s1.named("inbox").is_ok());
    assert_eq!(
        s2.named("inbox").unwrap_err(),
        HorizonError::NotInScope {
            name: "inbox".into()
        }
    );

    drop(s1);
    assert_eq!(
        s2.named("inbox").unwrap_err(),
        HorizonError::NotFound {
            name: "inbox".into()
        }
    );
}

#[test]
fn ancestor_name_outlives_its_handle_while_descendants_remain() {
    let root = Scope::root_isolated();
    let app = root.establish(ScopeSpec::named("app"));
    let panel = app.establish(ScopeSpec::named("panel"));
    let sibling = root.establish(ScopeSpec::new());

    drop(app);
    assert!(root.resolver().index().exists("app"));
    assert!(panel.named("app").is_ok());
    assert_eq!(
        sibling.named("app").unwrap_err(),
        HorizonError::NotInScope {
            name: "app".into()
        }
    );

    drop(panel);
    assert_eq!(
        sibling.named("app").unwrap_err(),
        HorizonError::NotFound {
            name: "app".into()
        }
    );
}

#[test]
fn unqualified_lookup_outside_any_scope() {
    let root = Scope::root_isolated();
    assert_eq!(root.horizon().unwrap_err(), HorizonError::NoActiveScope);
    assert_eq!(
        Resolver::resolve_current(root.current()).unwrap_err().code(),
        ErrorCode::NoActiveScope
    );
}

#[test]
fn deeper_rebinding_shadows_only_its_subtree() {
    let root = Scope::root_isolated();
    let outer = root.establish(ScopeSpec::named("app"));
    let middle = outer.establish(ScopeSpec::named("panel"));
    let inner = middle.establish(ScopeSpec::named("app"));
    let sibling = outer.establish(ScopeSpec::new());

    let outer_bus = outer.horizon().unwrap();
    let inner_bus = inner.horizon().unwrap();

    assert!(Horizon::ptr_eq(&inner.named("app").unwrap(), &inner_bus));
    assert!(Horizon::ptr_eq(&middle.named("app").unwrap(), &outer_bus));
    assert!(Horizon::ptr_eq(&sibling.named("app").unwrap(), &outer_bus));
    assert_eq!(root.resolver().index().count("app"), 2);

    drop(inner);
    assert!(root.resolver().index().exists("app"));
    assert!(Horizon::ptr_eq(&middle.named("app").unwrap(), &outer_bus));
}

#[test]
fn trees_sharing_an_index_see_each_others_names() {
    let index = Arc::new(ExistenceIndex::new());
    let a = Scope::root_with(Resolver::new(Arc::clone(&index)));
    let b = Scope::root_with(Resolver::new(Arc::clone(&index)));

    let _toolbar = a.establish(ScopeSpec::named("toolbar"));
    let canvas = b.establish(ScopeSpec::named("canvas"));

    let failure = canvas
        .emit_to_safe("toolbar", "zoom", Payload::new(2.0f64))
        .unwrap_err();
    assert_eq!(failure.code, ErrorCode::NotInScope);
    assert_eq!(
        failure.message,
        "Horizon \"toolbar\" exists but is out of scope here."
    );
}

#[test]
fn global_index_backs_default_roots() {
    let root = Scope::root();
    let name = "global_index_backs_default_roots";
    let region = root.establish(ScopeSpec::named(name));
    assert!(ExistenceIndex::global().exists(name));

    let other = Scope::root().establish(ScopeSpec::new());
    assert!(matches!(
        other.named(name),
        Err(HorizonError::NotInScope { .. })
    ));

    drop(region);
    assert!(!ExistenceIndex::global().exists(name));
}

#[tokio::test]
async fn named_emit_reaches_ancestor_breadth_first() {
    let root = Scope::root_isolated();
    let app = root.establish(ScopeSpec::named("app").with_log(true));
    let form = app.establish(ScopeSpec::named("form"));
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let bus = app.horizon().unwrap();
    let (l, relay) = (Arc::clone(&log), bus.downgrade());
    let _submit = bus.on_fn("submit", move |msg: Message| {
        let (l, relay) = (Arc::clone(&l), relay.upgrade());
        async move {
            l.lock().unwrap().push("submit-start".to_string());
            if let Some(relay) = relay {
                relay.emit("saved", msg.payload().clone());
            }
            tokio::task::yield_now().await;
            l.lock().unwrap().push("submit-end".to_string());
            Ok::<_, HandlerError>(())
        }
    });
    let _saved = app.on_fn("saved", recorder(&log, "app")).unwrap();

    form.emit_to("app", "submit", Payload::new(1u32)).unwrap();
    bus.settled().await;

    assert_eq!(seen(&log), vec!["submit-start", "submit-end", "app:saved"]);
}

#[tokio::test]
async fn on_named_subscription_is_effect_cleanup() {
    let root = Scope::root_isolated();
    let app = root.establish(ScopeSpec::named("app"));
    let child = app.establish(ScopeSpec::new());
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let handler = event_horizon::HandlerFn::arc("child", recorder(&log, "child"));
    let sub = child.on_named("app", "tick", handler).unwrap();
    let cleanup = sub.into_cleanup();

    app.emit("tick", Payload::empty()).unwrap();
    app.horizon().unwrap().settled().await;

    cleanup();
    app.emit("tick", Payload::empty()).unwrap();
    app.horizon().unwrap().settled().await;

    assert_eq!(seen(&log), vec!["child:tick"]);
    assert!(!app.horizon().unwrap().has_listeners("tick"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pause_holds_messages_across_threads() {
    let root = Scope::root_isolated();
    let region = root.establish(ScopeSpec::named("worker"));
    let bus = region.horizon().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let l = Arc::clone(&log);
    let _sub = bus.on_fn("job", move |msg: Message| {
        let l = Arc::clone(&l);
        async move {
            let n = msg.payload().downcast_ref::<u32>().copied().unwrap_or_default();
            l.lock().unwrap().push(n.to_string());
            Ok::<_, HandlerError>(())
        }
    });

    bus.pause();
    let producer = {
        let region = region.clone();
        tokio::spawn(async move {
            for n in 0..5u32 {
                region.emit_to("worker", "job", Payload::new(n)).unwrap();
            }
        })
    };
    producer.await.unwrap();
    bus.settled().await;
    assert!(seen(&log).is_empty());
    assert_eq!(bus.queued_len(), 5);

    bus.resume();
    bus.settled().await;
    assert_eq!(seen(&log), vec!["0", "1", "2", "3", "4"]);
}
