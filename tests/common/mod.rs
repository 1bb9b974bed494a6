//! Shared harness: a Lua runtime wired to a [`MockCloud`], the way the
//! binary wires one to the live client.

use dolua::cloud::mock::MockCloud;
use dolua::cloud::Cloud;
use dolua::script::{self, ScriptHost};
use mlua::Lua;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

pub struct Harness {
    pub mock: Arc<MockCloud>,
    lua: Lua,
    // Listings spawn onto this runtime; it must outlive every script call.
    _runtime: Runtime,
}

impl Harness {
    pub fn new() -> Self {
        let runtime = Runtime::new().expect("building a runtime");
        let mock = MockCloud::new();
        let host = ScriptHost::new(
            mock.clone() as Arc<dyn Cloud>,
            runtime.handle().clone(),
            CancellationToken::new(),
        );
        let lua = Lua::new();
        script::install(&lua, &host).expect("installing the cloud global");
        Self {
            mock,
            lua,
            _runtime: runtime,
        }
    }

    /// Run a script, panicking with the Lua error if it fails.
    pub fn exec(&self, src: &str) {
        if let Err(e) = self.lua.load(src).set_name("test script").exec() {
            panic!("script failed: {e}");
        }
    }

    /// Run a script that is expected to fail, returning the error text.
    pub fn exec_err(&self, src: &str) -> String {
        match self.lua.load(src).set_name("test script").exec() {
            Ok(()) => panic!("script succeeded but an error was expected"),
            Err(e) => e.to_string(),
        }
    }
}
