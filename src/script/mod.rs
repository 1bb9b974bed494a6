//! The scripting runtime: a Lua interpreter with a global `cloud` object
//! whose methods drive the API clients.
//!
//! Lua is synchronous; the clients are not. [`ScriptHost`] carries a handle
//! to the shared runtime so bindings can block the scripting thread on a
//! future without owning a runtime of their own.

use crate::cloud::Cloud;
use mlua::Lua;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

pub mod bindings;
pub mod codec;
pub mod root;

#[derive(Clone)]
pub struct ScriptHost {
    pub cloud: Arc<dyn Cloud>,
    handle: Handle,
    cancel: CancellationToken,
}

impl ScriptHost {
    pub fn new(cloud: Arc<dyn Cloud>, handle: Handle, cancel: CancellationToken) -> Self {
        Self {
            cloud,
            handle,
            cancel,
        }
    }

    /// Drive `fut` to completion from the scripting thread.
    pub fn run<F: Future>(&self, fut: F) -> F::Output {
        self.handle.block_on(fut)
    }

    /// A token scoped to one script call; cancelling it stops background
    /// pagination without touching the session token.
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Load the stdlib supplements and hang the `cloud` global off the runtime.
pub fn install(lua: &Lua, host: &ScriptHost) -> mlua::Result<()> {
    lua.load(include_str!("prelude.lua"))
        .set_name("prelude")
        .exec()?;
    let cloud = root::build(lua, host)?;
    lua.globals().set("cloud", cloud)?;
    Ok(())
}
