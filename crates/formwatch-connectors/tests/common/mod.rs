#![allow(dead_code)]

use axum::Router;
use std::net::TcpListener;

/// Serve `router` on an ephemeral port from a background thread.
///
/// The connectors use blocking HTTP clients, so the stub runs on its own
/// runtime rather than inside the test's thread.
pub fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().expect("local addr");

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("stub runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, router).await.expect("stub server");
        });
    });

    format!("http://{}", addr)
}
