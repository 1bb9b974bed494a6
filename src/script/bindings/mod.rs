//! Per-family script bindings. Each module builds one subtable of the global
//! `cloud` object; methods block the scripting thread on the client future
//! and convert both directions through [`codec`](super::codec).

use crate::api::{paginate, ApiError};
use crate::script::{codec, ScriptHost};
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub mod accounts;
pub mod actions;
pub mod domains;
pub mod droplets;
pub mod firewalls;
pub mod floating_ips;
pub mod images;
pub mod keys;
pub mod load_balancers;
pub mod regions;
pub mod sizes;
pub mod snapshots;
pub mod tags;
pub mod volumes;

/// Start a listing under a call-scoped token and drain it to completion.
/// The drop guard cancels the producer if collection bails early.
pub(crate) fn drain<T, F>(host: &ScriptHost, start: F) -> mlua::Result<Vec<T>>
where
    F: FnOnce(CancellationToken) -> (Receiver<T>, Receiver<ApiError>),
{
    let cancel = host.child_token();
    let _guard = cancel.clone().drop_guard();
    host.run(async {
        let (items, errs) = start(cancel.clone());
        paginate::collect(items, errs).await
    })
    .map_err(codec::api_err)
}
