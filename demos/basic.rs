//! Minimal tsu-bearer demo: a protected endpoint and a reactive pipeline.
//!
//! A tiny hyper server answers `401` unless it sees `Bearer demo-token`.
//! The pipeline sends the request bare, gets the `401`, asks the identity
//! hub for a token and retries once.
//!
//! Run with:
//!   cargo run --example basic

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tsu_bearer::{
    AuthStateHub, BearerAuth, HyperFetch, Location, Options, Pipeline, Request, StaticIdentity,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(serve(listener));
    info!(%addr, "protected api listening");

    let here = Location::parse(&format!("http://{addr}/"))?;
    let transport = Arc::new(HyperFetch::new().with_location(here.clone()));

    // Sign-in happened elsewhere; publish the result.
    let hub = AuthStateHub::new();
    hub.set(Some(Arc::new(StaticIdentity::new("demo-token"))));

    let options = Options::from_json(
        r#"{
            "awaitResponse": true,
            "constraints": { "types": ["application/json"], "ignorePaths": ["/public"] }
        }"#,
    )?;
    let auth = BearerAuth::new(options, here, Arc::new(hub), transport.clone());
    let pipeline = Pipeline::new(transport).with(auth);

    for path in ["/api/me", "/public/me"] {
        let req = Request::builder()
            .uri(path)
            .header("accept", "application/json")
            .build()?;
        let res = pipeline.fetch(req).await?;
        info!(path, status = res.status().as_u16(), body = %String::from_utf8_lossy(res.body()), "done");
    }

    Ok(())
}

async fn serve(listener: TcpListener) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };

        tokio::spawn(async move {
            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service_fn(protected))
                .await
            {
                error!(%peer, "connection error: {e}");
            }
        });
    }
}

// GET anything → 200 with a bearer token, 401 without.
async fn protected(req: hyper::Request<Incoming>) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let authorized = req
        .headers()
        .get_all(AUTHORIZATION)
        .iter()
        .any(|v| v == "Bearer demo-token");

    let (status, body) = if authorized {
        (StatusCode::OK, r#"{"user":"demo"}"#)
    } else {
        (StatusCode::UNAUTHORIZED, r#"{"error":"sign in"}"#)
    };

    let mut res = http::Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *res.status_mut() = status;
    Ok(res)
}
