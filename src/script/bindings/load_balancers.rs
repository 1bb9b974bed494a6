use super::drain;
use crate::cloud::load_balancers::use_request;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create",
        lua.create_function(move |lua, v: Value| {
            let req = codec::arg_load_balancer_request(&v)?;
            let (name, region) = (req.name.clone(), req.region.clone());
            let rules = req.forwarding_rules.clone();
            let lb = h
                .run(h.cloud.load_balancers().create(
                    &name,
                    &region,
                    rules,
                    vec![use_request(req)],
                ))
                .map_err(codec::api_err)?;
            codec::load_balancer_to_lua(lua, &lb)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let id = codec::arg_load_balancer_id(&v)?;
            let lb = h
                .run(h.cloud.load_balancers().get(&id))
                .map_err(codec::api_err)?;
            codec::load_balancer_to_lua(lua, &lb)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "update",
        lua.create_function(move |lua, (v, spec): (Value, Value)| {
            let id = codec::arg_load_balancer_id(&v)?;
            let req = codec::arg_load_balancer_request(&spec)?;
            let lb = h
                .run(h.cloud.load_balancers().update(&id, vec![use_request(req)]))
                .map_err(codec::api_err)?;
            codec::load_balancer_to_lua(lua, &lb)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let id = codec::arg_load_balancer_id(&v)?;
            h.run(h.cloud.load_balancers().delete(&id))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let lbs = drain(&h, |cancel| h.cloud.load_balancers().list(cancel))?;
            let out = lua.create_table()?;
            for (i, lb) in lbs.iter().enumerate() {
                out.set(i + 1, codec::load_balancer_to_lua(lua, lb)?)?;
            }
            Ok(out)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "add_droplets",
        lua.create_function(move |_, (v, droplets): (Value, Value)| {
            let id = codec::arg_load_balancer_id(&v)?;
            let ids = codec::arg_droplet_ids(&droplets)?;
            h.run(h.cloud.load_balancers().add_droplets(&id, ids))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "remove_droplets",
        lua.create_function(move |_, (v, droplets): (Value, Value)| {
            let id = codec::arg_load_balancer_id(&v)?;
            let ids = codec::arg_droplet_ids(&droplets)?;
            h.run(h.cloud.load_balancers().remove_droplets(&id, ids))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "add_forwarding_rules",
        lua.create_function(move |_, (v, rules): (Value, Value)| {
            let id = codec::arg_load_balancer_id(&v)?;
            let rules = codec::arg_forwarding_rules(&rules)?;
            h.run(h.cloud.load_balancers().add_forwarding_rules(&id, rules))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "remove_forwarding_rules",
        lua.create_function(move |_, (v, rules): (Value, Value)| {
            let id = codec::arg_load_balancer_id(&v)?;
            let rules = codec::arg_forwarding_rules(&rules)?;
            h.run(h.cloud.load_balancers().remove_forwarding_rules(&id, rules))
                .map_err(codec::api_err)
        })?,
    )?;

    Ok(t)
}
