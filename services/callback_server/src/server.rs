//! HTTP callback server

use crate::context::AppContext;
use crate::error::{Result, ServerError};
use crate::router::handle_request;
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tracing::{error, info};

pub struct AppServer {
    ctx: AppContext,
}

impl AppServer {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Bind `addr` and return the bound address with the serving future.
    ///
    /// The future resolves once `shutdown` completes and in-flight requests
    /// have drained.
    pub fn bind<F>(
        self,
        addr: SocketAddr,
        shutdown: F,
    ) -> Result<(SocketAddr, impl Future<Output = Result<()>>)>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ctx = self.ctx;
        let make_svc = make_service_fn(move |_conn| {
            let ctx = ctx.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle_request(req, ctx.clone())))
            }
        });

        let server = Server::try_bind(&addr)
            .map_err(|source| ServerError::Bind { addr, source })?
            .serve(make_svc);
        let local_addr = server.local_addr();

        info!("Callback server listening on http://{}", local_addr);

        let serving = async move {
            server.with_graceful_shutdown(shutdown).await.map_err(|e| {
                error!("Callback server error: {}", e);
                ServerError::from(e)
            })?;
            info!("Callback server stopped");
            Ok::<(), ServerError>(())
        };

        Ok((local_addr, serving))
    }

    /// Serve until `shutdown` completes
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (_, serving) = self.bind(addr, shutdown)?;
        serving.await
    }
}
