//! Assembly of the global `cloud` table.

use super::{bindings, ScriptHost};
use mlua::{Lua, Table};

type Binder = for<'l> fn(&'l Lua, &ScriptHost) -> mlua::Result<Table<'l>>;

const SERVICES: &[(&str, Binder)] = &[
    ("accounts", bindings::accounts::apply),
    ("actions", bindings::actions::apply),
    ("domains", bindings::domains::apply),
    ("droplets", bindings::droplets::apply),
    ("firewalls", bindings::firewalls::apply),
    ("floating_ips", bindings::floating_ips::apply),
    ("images", bindings::images::apply),
    ("keys", bindings::keys::apply),
    ("load_balancers", bindings::load_balancers::apply),
    ("regions", bindings::regions::apply),
    ("sizes", bindings::sizes::apply),
    ("snapshots", bindings::snapshots::apply),
    ("tags", bindings::tags::apply),
    ("volumes", bindings::volumes::apply),
];

pub fn build<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let cloud = lua.create_table()?;
    for (name, apply) in SERVICES {
        let service = apply(lua, host).map_err(|e| {
            mlua::Error::RuntimeError(format!("preparing cloud {name} service: {e}"))
        })?;
        cloud.set(*name, service)?;
    }
    Ok(cloud)
}
