//! # Scoped horizons demo
//!
//! Builds a small scope tree, emits across it and shows the three lookup failures.
//!
//! ## Run
//! ```bash
//! RUST_LOG=event_horizon=debug cargo run --example scoped
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use event_horizon::{HandlerError, Message, Payload, Scope, ScopeSpec};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let root = Scope::root();
    let app = root.establish(ScopeSpec::named("app").with_log(true));
    let editor = app.establish(ScopeSpec::named("editor"));
    let sidebar = app.establish(ScopeSpec::named("sidebar"));

    let saves = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&saves);
    let _on_save = app.on_fn("saved", move |msg: Message| {
        let counter = Arc::clone(&counter);
        async move {
            let doc = msg.payload().downcast_ref::<String>().cloned().unwrap_or_default();
            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
            println!("[app] saved {doc:?} (total {n})");
            Ok::<_, HandlerError>(())
        }
    })?;

    let _broken = app.on_fn("saved", |_msg: Message| async move {
        Err(HandlerError::failed("audit backend unavailable"))
    })?;

    editor.emit_to("app", "saved", Payload::new(String::from("notes.md")))?;

    match sidebar.emit_to_safe("editor", "focus", Payload::empty()) {
        Ok(()) => println!("[sidebar] focused editor"),
        Err(failure) => println!("[sidebar] {failure}"),
    }

    if let Err(err) = root.horizon() {
        println!("[root] {} ({})", err, err.as_label());
    }

    app.horizon()?.settled().await;
    drop(editor);

    if let Err(err) = sidebar.named("editor") {
        println!("[sidebar] after teardown: {}", err.as_message());
    }

    println!("saves delivered: {}", saves.load(Ordering::Relaxed));
    Ok(())
}
