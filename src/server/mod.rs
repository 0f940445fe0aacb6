mod page;
mod routes;

pub use page::{PageOptions, render_page, render_static_page};
pub use routes::{AppState, router};

use crate::runtime::VoyagerHandle;
use crate::style;
use std::sync::Arc;
use tracing::info;

/// Start the HTTP server for the interactive diagram
pub async fn serve(
    handle: VoyagerHandle,
    page: PageOptions,
    port: u16,
    open_browser: bool,
) -> std::io::Result<()> {
    let app = router(Arc::new(AppState { handle, page }));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let url = format!("http://{}", listener.local_addr()?);
    info!(%url, "server listening");

    style::status("Starting schemamap server...");
    println!("Open in browser: {}", style::url(&url));
    println!("Press Ctrl+C to stop");

    if open_browser {
        if let Err(e) = open::that(&url) {
            style::warning(&format!("Could not open browser: {}", e));
        }
    }

    axum::serve(listener, app).await
}
