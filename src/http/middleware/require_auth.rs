//! Authentication middleware.
//! Guards an application router with the gate.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/private/data", get(handler))
//!     .layer(middleware::from_fn_with_state(gate.clone(), require_auth));
//! ```

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::gate::{SharedGate, Verdict};

pub async fn require_auth(State(gate): State<SharedGate>, req: Request<Body>, next: Next) -> Response {
    let gate = gate.load_full();

    let (parts, body) = req.into_parts();
    let verdict = gate.check(parts.uri.path(), &parts).await;

    match verdict {
        Verdict::Allow => next.run(Request::from_parts(parts, body)).await,
        Verdict::Challenge => gate.challenge_response(),
    }
}
