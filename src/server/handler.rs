//! The user handler seam.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::Request;
use crate::server::{Error, Response};

/// Type alias for the boxed future a handler returns.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

/// Handles one request per call.
///
/// The request and response are only valid for the duration of the call. Write
/// the status and body into `res`; the connection flushes it afterwards unless
/// the handler already did.
///
/// ```
/// use minihttp_rs::{Handler, HandlerFuture, Request, Response};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     fn handle<'a>(&'a self, res: &'a mut Response<'_>, req: Request<'a>) -> HandlerFuture<'a> {
///         Box::pin(async move {
///             res.write(format!("hello from {}", req.path()));
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle<'a>(&'a self, res: &'a mut Response<'_>, req: Request<'a>) -> HandlerFuture<'a>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle<'a>(&'a self, res: &'a mut Response<'_>, req: Request<'a>) -> HandlerFuture<'a> {
        (**self).handle(res, req)
    }
}
