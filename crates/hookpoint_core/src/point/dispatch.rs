//! Dispatch over the enabled, resolved order.
//!
//! `invoke` fans out and never fails; `exec` threads each result into the
//! next call and stops at the first failure.

use crate::config::FanOutPolicy;
use crate::logging::{sanitize_message, MAX_LOGGED_ERROR_CHARS};
use crate::point::error::DispatchError;
use crate::point::Point;
use log::{error, warn};
use serde_json::Value;

impl<C> Point<C> {
    /// Calls `method` on every enabled extension in order.
    ///
    /// Returns the last extension's result, or `None` when the enabled list is
    /// empty, the last extension lacks the method or failed. Failures are
    /// logged and handled according to the point's `FanOutPolicy`; they never
    /// reach the caller.
    pub fn invoke(&self, method: &str, context: &mut C, args: &[Value]) -> Option<Value> {
        let mut last = None;
        for ext in self.list() {
            match ext.try_invoke(method, context, args) {
                Ok(value) => last = value,
                Err(err) => {
                    error!(
                        "event=dispatch_failed module=point status=error point={} extension={} method={} error={}",
                        self.id,
                        ext.id(),
                        method,
                        sanitize_message(err.message(), MAX_LOGGED_ERROR_CHARS)
                    );
                    last = None;
                    if self.config.fan_out == FanOutPolicy::StopOnFirstError {
                        warn!(
                            "event=dispatch_truncated module=point status=degraded point={} extension={} method={}",
                            self.id,
                            ext.id(),
                            method
                        );
                        return None;
                    }
                }
            }
        }
        last
    }

    /// Chains `method` across enabled extensions.
    ///
    /// Each call receives `[prev, args...]`; `prev` is `Value::Null` for the
    /// first extension and whenever the previous one returned nothing.
    ///
    /// # Errors
    /// - Returns `DispatchError` for the first failing extension; later
    ///   extensions are not called.
    pub fn exec(
        &self,
        method: &str,
        context: &mut C,
        args: &[Value],
    ) -> Result<Option<Value>, DispatchError> {
        let mut prev: Option<Value> = None;
        let mut call_args = Vec::with_capacity(args.len() + 1);

        for ext in self.list() {
            call_args.clear();
            call_args.push(prev.take().unwrap_or(Value::Null));
            call_args.extend_from_slice(args);

            prev = ext
                .try_invoke(method, context, &call_args)
                .map_err(|source| DispatchError {
                    point: self.id.clone(),
                    extension: ext.id().to_string(),
                    method: method.to_string(),
                    source,
                })?;
        }
        Ok(prev)
    }
}
