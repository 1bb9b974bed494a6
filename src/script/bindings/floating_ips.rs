use super::drain;
use crate::cloud::floating_ips::use_request;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create",
        lua.create_function(move |lua, v: Value| {
            let req = codec::arg_floating_ip_create(&v)?;
            let ip = h
                .run(h.cloud.floating_ips().create(vec![use_request(req)]))
                .map_err(codec::api_err)?;
            codec::floating_ip_to_lua(lua, &ip)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let ip = codec::arg_floating_ip(&v)?;
            let fip = h
                .run(h.cloud.floating_ips().get(&ip))
                .map_err(codec::api_err)?;
            codec::floating_ip_to_lua(lua, &fip)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let ip = codec::arg_floating_ip(&v)?;
            h.run(h.cloud.floating_ips().delete(&ip))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let ips = drain(&h, |cancel| h.cloud.floating_ips().list(cancel))?;
            let out = lua.create_table()?;
            for (i, fip) in ips.iter().enumerate() {
                out.set(i + 1, codec::floating_ip_to_lua(lua, fip)?)?;
            }
            Ok(out)
        })?,
    )?;

    let actions = lua.create_table()?;

    let h = host.clone();
    actions.set(
        "assign",
        lua.create_function(move |_, (v, d): (Value, Value)| {
            let ip = codec::arg_floating_ip(&v)?;
            let droplet_id = codec::arg_droplet_id(&d)?;
            h.run(h.cloud.floating_ips().actions().assign(&ip, droplet_id))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    actions.set(
        "unassign",
        lua.create_function(move |_, v: Value| {
            let ip = codec::arg_floating_ip(&v)?;
            h.run(h.cloud.floating_ips().actions().unassign(&ip))
                .map_err(codec::api_err)
        })?,
    )?;

    t.set("actions", actions)?;

    Ok(t)
}
